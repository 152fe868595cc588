//! Scalar loop-filter kernels for the interior edges of one macroblock.
//!
//! The prober only ever filters the 4x4 sub-block edges inside a
//! macroblock, never its outer edges: the neighbours are not final yet.
//! Luma has edges at offsets 4, 8 and 12, chroma at offset 4.

use super::cost::interior_limit;

/// Thresholds for one filter level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterParams {
    /// Limit on the step across the edge.
    pub edge_limit: i32,
    /// Limit on the steps on either side of the edge.
    pub interior_limit: i32,
    /// Steps above this mark a high edge variance.
    pub hev_threshold: i32,
}

impl FilterParams {
    /// Thresholds for interior sub-block edges at `level` (1-63).
    pub fn new(level: u8, sharpness: u8) -> Self {
        let ilevel = interior_limit(sharpness, level);
        let hev_threshold = if level >= 40 {
            2
        } else if level >= 15 {
            1
        } else {
            0
        };
        Self {
            edge_limit: 2 * i32::from(level) + i32::from(ilevel),
            interior_limit: i32::from(ilevel),
            hev_threshold,
        }
    }
}

/// Clamp signed value to [-128, 127] range
#[inline]
fn c(v: i32) -> i32 {
    v.clamp(-128, 127)
}

#[inline]
fn u2s(v: u8) -> i32 {
    i32::from(v) - 128
}

#[inline]
fn s2u(v: i32) -> u8 {
    (c(v) + 128) as u8
}

/// Adjust p0/q0 across the edge at `point` and return the filter value.
#[inline]
fn common_adjust(use_outer_taps: bool, buf: &mut [u8], point: usize, step: usize) -> i32 {
    let p1 = u2s(buf[point - 2 * step]);
    let p0 = u2s(buf[point - step]);
    let q0 = u2s(buf[point]);
    let q1 = u2s(buf[point + step]);

    let outer = if use_outer_taps { c(p1 - q1) } else { 0 };
    let a = c(outer + 3 * (q0 - p0));
    let b = c(a + 3) >> 3;
    let a = c(a + 4) >> 3;

    buf[point] = s2u(q0 - a);
    buf[point - step] = s2u(p0 + b);
    a
}

#[inline]
fn simple_threshold(edge_limit: i32, buf: &[u8], point: usize, step: usize) -> bool {
    let p1 = i32::from(buf[point - 2 * step]);
    let p0 = i32::from(buf[point - step]);
    let q0 = i32::from(buf[point]);
    let q1 = i32::from(buf[point + step]);
    (p0 - q0).abs() * 2 + ((p1 - q1).abs() >> 1) <= edge_limit
}

#[inline]
fn should_filter(params: &FilterParams, buf: &[u8], point: usize, step: usize) -> bool {
    let px = |k: isize| i32::from(buf[(point as isize + k * step as isize) as usize]);
    let (p3, p2, p1, p0) = (px(-4), px(-3), px(-2), px(-1));
    let (q0, q1, q2, q3) = (px(0), px(1), px(2), px(3));
    let i = params.interior_limit;

    simple_threshold(params.edge_limit, buf, point, step)
        && (p3 - p2).abs() <= i
        && (p2 - p1).abs() <= i
        && (p1 - p0).abs() <= i
        && (q3 - q2).abs() <= i
        && (q2 - q1).abs() <= i
        && (q1 - q0).abs() <= i
}

#[inline]
fn high_edge_variance(threshold: i32, buf: &[u8], point: usize, step: usize) -> bool {
    let p1 = i32::from(buf[point - 2 * step]);
    let p0 = i32::from(buf[point - step]);
    let q0 = i32::from(buf[point]);
    let q1 = i32::from(buf[point + step]);
    (p1 - p0).abs() > threshold || (q1 - q0).abs() > threshold
}

/// Simple filter across one edge position. `step` crosses the edge.
pub(crate) fn simple_segment(edge_limit: i32, buf: &mut [u8], point: usize, step: usize) {
    if simple_threshold(edge_limit, buf, point, step) {
        common_adjust(true, buf, point, step);
    }
}

/// Normal filter across one interior edge position.
pub(crate) fn subblock_filter(params: &FilterParams, buf: &mut [u8], point: usize, step: usize) {
    if !should_filter(params, buf, point, step) {
        return;
    }
    let hv = high_edge_variance(params.hev_threshold, buf, point, step);
    let a = (common_adjust(hv, buf, point, step) + 1) >> 1;
    if !hv {
        let q1 = u2s(buf[point + step]);
        let p1 = u2s(buf[point - 2 * step]);
        buf[point + step] = s2u(q1 - a);
        buf[point - 2 * step] = s2u(p1 + a);
    }
}

/// Filter the interior edges of a square `size` x `size` block: first the
/// vertical edges (filtering horizontally), then the horizontal ones.
pub(crate) fn filter_internal_edges(
    buf: &mut [u8],
    size: usize,
    params: &FilterParams,
    simple: bool,
) {
    debug_assert!(size == 8 || size == 16);
    debug_assert!(buf.len() >= size * size);

    let apply = |buf: &mut [u8], point: usize, step: usize| {
        if simple {
            simple_segment(params.edge_limit, buf, point, step);
        } else {
            subblock_filter(params, buf, point, step);
        }
    };

    for x in (4..size).step_by(4) {
        for y in 0..size {
            apply(buf, y * size + x, 1);
        }
    }
    for y in (4..size).step_by(4) {
        for x in 0..size {
            apply(buf, y * size + x, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_by_level() {
        let p = FilterParams::new(20, 0);
        assert_eq!(p.edge_limit, 60);
        assert_eq!(p.interior_limit, 20);
        assert_eq!(p.hev_threshold, 1);
        assert_eq!(FilterParams::new(40, 0).hev_threshold, 2);
        assert_eq!(FilterParams::new(14, 0).hev_threshold, 0);
        assert_eq!(FilterParams::new(40, 6).interior_limit, 3);
    }

    #[test]
    fn simple_filter_softens_small_step() {
        let mut row = [100u8, 100, 110, 110];
        simple_segment(40, &mut row, 2, 1);
        // a = (p1 - q1) + 3 * (q0 - p0) = 20; q0 -= 24 >> 3, p0 += 23 >> 3.
        assert_eq!(row, [100, 102, 107, 110]);
    }

    #[test]
    fn simple_filter_keeps_real_edges() {
        let mut row = [0u8, 0, 200, 200];
        simple_segment(40, &mut row, 2, 1);
        assert_eq!(row, [0, 0, 200, 200]);
    }

    #[test]
    fn normal_filter_touches_outer_taps_without_hev() {
        let mut row = [100u8, 100, 100, 100, 104, 104, 104, 104];
        let params = FilterParams::new(20, 0);
        subblock_filter(&params, &mut row, 4, 1);
        // a = 12 -> q0 -= 2, p0 += 1; then (2 + 1) >> 1 = 1 on the outer taps.
        assert_eq!(row, [100, 100, 101, 101, 102, 103, 104, 104]);
    }

    #[test]
    fn flat_block_is_unchanged() {
        let mut block = [90u8; 256];
        filter_internal_edges(&mut block, 16, &FilterParams::new(63, 0), false);
        assert!(block.iter().all(|&v| v == 90));
        let mut chroma = [17u8; 64];
        filter_internal_edges(&mut chroma, 8, &FilterParams::new(63, 0), true);
        assert!(chroma.iter().all(|&v| v == 17));
    }

    #[test]
    fn outer_edges_are_never_read_past() {
        // The first and last columns sit on the macroblock border.
        let mut block = [0u8; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = if i % 8 < 4 { 60 } else { 64 };
        }
        filter_internal_edges(&mut block, 8, &FilterParams::new(30, 0), false);
        for row in block.chunks_exact(8) {
            assert_eq!(row[0], 60);
            assert_eq!(row[7], 64);
            assert!(row[3] > 60 && row[4] < 64);
        }
    }
}
