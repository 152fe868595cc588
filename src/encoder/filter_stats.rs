//! Deblocking-strength statistics.
//!
//! For every coded macroblock the prober filters a copy of the
//! reconstruction at a handful of levels around the segment's base level
//! and accumulates the SSIM against the source per level. The frame driver
//! reads [`FilterStats`] once the picture is done and picks one level.

use super::config::IntraConfig;
use super::cost::ModeScore;
use super::loop_filter::{filter_internal_edges, FilterParams};
use super::segment::{SegmentParams, NUM_SEGMENTS};
use super::vp8::MacroblockPixels;

/// Number of loop-filter levels.
pub const MAX_LF_LEVELS: usize = 64;

const SSIM_KERNEL: usize = 3;
const SSIM_WEIGHTS: [u32; 2 * SSIM_KERNEL + 1] = [1, 2, 3, 4, 3, 2, 1];

/// Weighted moments of a window over two blocks.
#[derive(Clone, Copy, Debug, Default)]
struct DistoStats {
    w: u32,
    xm: u32,
    ym: u32,
    xxm: u32,
    xym: u32,
    yym: u32,
}

impl DistoStats {
    /// SSIM from integer moments; regions too dark to matter score 1.
    fn ssim(&self) -> f64 {
        let n = u64::from(self.w);
        let w2 = n * n;
        let c1 = 20 * w2;
        let c2 = 60 * w2;
        let c3 = 8 * 8 * w2;
        let xmxm = u64::from(self.xm) * u64::from(self.xm);
        let ymym = u64::from(self.ym) * u64::from(self.ym);
        if xmxm + ymym < c3 {
            return 1.0;
        }
        let xmym = i64::from(self.xm) * i64::from(self.ym);
        let sxy = i64::from(self.xym) * n as i64 - xmym;
        let sxx = u64::from(self.xxm) * n - xmxm;
        let syy = u64::from(self.yym) * n - ymym;
        // Descale by 8 so the products below stay within 64 bits.
        let num_s = (2 * sxy.max(0) as u64 + c2) >> 8;
        let den_s = (sxx + syy + c2) >> 8;
        let fnum = (2 * xmym as u64 + c1) * num_s;
        let fden = (xmxm + ymym + c1) * den_s;
        fnum as f64 / fden as f64
    }
}

/// SSIM of the 7x7 window centred on `(xo, yo)`, clipped to a `size` x
/// `size` block.
pub fn ssim_clipped(a: &[u8], b: &[u8], size: usize, xo: usize, yo: usize) -> f64 {
    let ymin = yo.saturating_sub(SSIM_KERNEL);
    let ymax = (yo + SSIM_KERNEL).min(size - 1);
    let xmin = xo.saturating_sub(SSIM_KERNEL);
    let xmax = (xo + SSIM_KERNEL).min(size - 1);

    let mut stats = DistoStats::default();
    for y in ymin..=ymax {
        let wy = SSIM_WEIGHTS[SSIM_KERNEL + y - yo];
        for x in xmin..=xmax {
            let w = SSIM_WEIGHTS[SSIM_KERNEL + x - xo] * wy;
            let s1 = u32::from(a[y * size + x]);
            let s2 = u32::from(b[y * size + x]);
            stats.w += w;
            stats.xm += w * s1;
            stats.ym += w * s2;
            stats.xxm += w * s1 * s1;
            stats.xym += w * s1 * s2;
            stats.yym += w * s2 * s2;
        }
    }
    stats.ssim()
}

/// Summed SSIM of a macroblock over the interior window centres of its
/// three planes.
pub fn mb_ssim(a: &MacroblockPixels, b: &MacroblockPixels) -> f64 {
    let mut sum = 0.0;
    for y in SSIM_KERNEL..16 - SSIM_KERNEL {
        for x in SSIM_KERNEL..16 - SSIM_KERNEL {
            sum += ssim_clipped(&a.y, &b.y, 16, x, y);
        }
    }
    for x in 1..7 {
        for y in 1..7 {
            sum += ssim_clipped(&a.u, &b.u, 8, x, y);
            sum += ssim_clipped(&a.v, &b.v, 8, x, y);
        }
    }
    sum
}

/// Filter a copy of `recon` at `level` (interior edges only).
pub fn filter_macroblock(
    recon: &MacroblockPixels,
    level: u8,
    sharpness: u8,
    simple: bool,
) -> MacroblockPixels {
    let params = FilterParams::new(level, sharpness);
    let mut out = recon.clone();
    filter_internal_edges(&mut out.y, 16, &params, simple);
    // The simple filter only applies to luma.
    if !simple {
        filter_internal_edges(&mut out.u, 8, &params, false);
        filter_internal_edges(&mut out.v, 8, &params, false);
    }
    out
}

/// Per-segment, per-level accumulated SSIM.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterStats {
    stats: [[f64; MAX_LF_LEVELS]; NUM_SEGMENTS],
}

impl Default for FilterStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStats {
    /// Zeroed statistics.
    pub fn new() -> Self {
        Self {
            stats: [[0.0; MAX_LF_LEVELS]; NUM_SEGMENTS],
        }
    }

    /// Accumulated SSIM of `segment` at `level`; level 0 is unfiltered.
    pub fn get(&self, segment: usize, level: usize) -> f64 {
        self.stats[segment][level]
    }

    /// All levels of one segment.
    pub fn segment(&self, segment: usize) -> &[f64; MAX_LF_LEVELS] {
        &self.stats[segment]
    }

    /// Measure a finished macroblock and accumulate its SSIM per level.
    ///
    /// Skipped 16x16 macroblocks are not measured.
    pub fn probe(
        &mut self,
        segment: usize,
        params: &SegmentParams,
        config: &IntraConfig,
        src: &MacroblockPixels,
        recon: &MacroblockPixels,
        result: &ModeScore,
    ) {
        if !result.is_i4() && result.is_skip() {
            return;
        }
        let row = &mut self.stats[segment];
        row[0] += mb_ssim(src, recon);

        let level0 = i32::from(params.filter_level);
        let quant = i32::from(params.quant);
        let step = if 2 * quant >= 4 { 4 } else { 1 };
        for d in (-quant..=quant).step_by(step) {
            let level = level0 + d;
            if level <= 0 || level >= MAX_LF_LEVELS as i32 {
                continue;
            }
            let filtered =
                filter_macroblock(recon, level as u8, config.filter_sharpness, config.simple_filter);
            row[level as usize] += mb_ssim(src, &filtered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::LumaMode;

    fn textured(seed: u32) -> MacroblockPixels {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            (state >> 16) as u8
        };
        MacroblockPixels {
            y: core::array::from_fn(|_| next()),
            u: core::array::from_fn(|_| next()),
            v: core::array::from_fn(|_| next()),
        }
    }

    #[test]
    fn identical_blocks_score_one() {
        let a = textured(1);
        assert!((ssim_clipped(&a.y, &a.y, 16, 8, 8) - 1.0).abs() < 1e-12);
        // 100 luma windows + 2 * 36 chroma windows.
        assert!((mb_ssim(&a, &a) - 172.0).abs() < 1e-9);
    }

    #[test]
    fn dark_windows_score_one() {
        let a = [0u8; 64];
        let b = [3u8; 64];
        assert_eq!(ssim_clipped(&a, &b, 8, 0, 0), 1.0);
    }

    #[test]
    fn different_blocks_score_below_one() {
        let a = textured(1);
        let b = textured(2);
        let s = ssim_clipped(&a.y, &b.y, 16, 8, 8);
        assert!((0.0..1.0).contains(&s), "{s}");
    }

    #[test]
    fn clipped_corner_window_uses_partial_weights() {
        let a = textured(3);
        let b = textured(4);
        let corner = ssim_clipped(&a.y, &b.y, 16, 0, 0);
        assert!((0.0..=1.0).contains(&corner));
    }

    #[test]
    fn probe_accumulates_and_skips() {
        let config = IntraConfig::default();
        let params = SegmentParams::new(40, &config).unwrap();
        let src = textured(5);
        let recon = textured(6);

        let mut result = ModeScore::new();
        result.luma_mode = LumaMode::DC;
        result.nz = 0;

        let mut stats = FilterStats::new();
        stats.probe(1, &params, &config, &src, &recon, &result);
        assert_eq!(stats, FilterStats::new());

        result.nz = 1;
        stats.probe(1, &params, &config, &src, &recon, &result);
        let once = stats.get(1, 0);
        assert!(once > 0.0);
        stats.probe(1, &params, &config, &src, &recon, &result);
        assert!((stats.get(1, 0) - 2.0 * once).abs() < 1e-9);
        assert!(stats.segment(0).iter().all(|&v| v == 0.0));

        let probed = stats.segment(1).iter().skip(1).filter(|&&v| v > 0.0).count();
        assert!(probed > 0);
    }
}
