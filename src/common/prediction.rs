//! Intra predictors for 16x16 luma, 8x8 chroma and 4x4 luma sub-blocks.
//!
//! Whole-block predictors take their edges as `Option`s: an edge is
//! `None` when the macroblock sits on the top row or left column of the
//! picture. Missing edges fall back to the codec's fill values (127 above,
//! 129 to the left, 128 for DC with no edges at all).
//!
//! The 4x4 predictors read from a bordered [`LumaWorkspace`] holding the
//! macroblock's boundary samples and, as the sub-block search progresses,
//! the already reconstructed sub-blocks.

use super::types::{ChromaMode, IntraMode, LumaMode};

/// Luma prediction block stride - 32 bytes for cache alignment
/// Layout: 1 border pixel + 16 luma pixels + 4 top-right + padding to 32
pub(crate) const LUMA_STRIDE: usize = 32;
/// Luma prediction block size: 17 rows (1 border + 16) × 32 byte stride
pub(crate) const LUMA_BLOCK_SIZE: usize = LUMA_STRIDE * (1 + 16);

/// Boundary samples for one whole-block prediction.
#[derive(Clone, Copy, Debug)]
pub struct Edges<'a> {
    /// Row above the block, `None` on the first macroblock row.
    pub top: Option<&'a [u8]>,
    /// Column left of the block, `None` on the first macroblock column.
    pub left: Option<&'a [u8]>,
    /// Sample above and to the left. Only read when both edges exist.
    pub top_left: u8,
}

#[inline]
fn avg3(left: u8, this: u8, right: u8) -> u8 {
    let avg = (u16::from(left) + 2 * u16::from(this) + u16::from(right) + 2) >> 2;
    avg as u8
}

#[inline]
fn avg2(this: u8, right: u8) -> u8 {
    let avg = (u16::from(this) + u16::from(right) + 1) >> 1;
    avg as u8
}

//------------------------------------------------------------------------------
// Whole-block predictors (stride == size)

fn vertical_pred(dst: &mut [u8], top: Option<&[u8]>, size: usize) {
    match top {
        Some(top) => {
            for row in dst.chunks_exact_mut(size).take(size) {
                row.copy_from_slice(&top[..size]);
            }
        }
        None => dst[..size * size].fill(127),
    }
}

fn horizontal_pred(dst: &mut [u8], left: Option<&[u8]>, size: usize) {
    match left {
        Some(left) => {
            for (row, &l) in dst.chunks_exact_mut(size).zip(left.iter()).take(size) {
                row.fill(l);
            }
        }
        None => dst[..size * size].fill(129),
    }
}

/// `shift` is log2 of twice the block size, so a single available edge is
/// counted twice.
fn dc_pred(dst: &mut [u8], edges: &Edges<'_>, size: usize, shift: u32) {
    let sum = |s: &[u8]| s[..size].iter().map(|&v| u32::from(v)).sum::<u32>();
    let round = 1u32 << (shift - 1);
    let dc = match (edges.top, edges.left) {
        (Some(top), Some(left)) => (sum(top) + sum(left) + round) >> shift,
        (Some(edge), None) | (None, Some(edge)) => (2 * sum(edge) + round) >> shift,
        (None, None) => 0x80,
    };
    dst[..size * size].fill(dc as u8);
}

fn true_motion_pred(dst: &mut [u8], edges: &Edges<'_>, size: usize) {
    match (edges.top, edges.left) {
        (Some(top), Some(left)) => {
            let tl = i32::from(edges.top_left);
            for (row, &l) in dst.chunks_exact_mut(size).zip(left.iter()).take(size) {
                let l = i32::from(l) - tl;
                for (d, &t) in row.iter_mut().zip(top.iter()) {
                    *d = (l + i32::from(t)).clamp(0, 255) as u8;
                }
            }
        }
        (None, Some(left)) => horizontal_pred(dst, Some(left), size),
        // Without a left edge the 129 default cancels the top-left term,
        // leaving the top row (or the 129 fill when there is no top either).
        (Some(top), None) => vertical_pred(dst, Some(top), size),
        (None, None) => dst[..size * size].fill(129),
    }
}

/// Predict a 16x16 luma block into `dst` (stride 16).
///
/// `mode` is one of [`LumaMode::I16_MODES`].
pub(crate) fn predict_luma16(mode: LumaMode, edges: &Edges<'_>, dst: &mut [u8; 256]) {
    match mode {
        LumaMode::DC => dc_pred(dst, edges, 16, 5),
        LumaMode::V => vertical_pred(dst, edges.top, 16),
        LumaMode::H => horizontal_pred(dst, edges.left, 16),
        LumaMode::TM => true_motion_pred(dst, edges, 16),
        LumaMode::B => unreachable!("4x4 prediction is done per sub-block"),
    }
}

/// Predict an 8x8 chroma block into `dst` (stride 8).
pub fn predict_chroma8(mode: ChromaMode, edges: &Edges<'_>, dst: &mut [u8; 64]) {
    match mode {
        ChromaMode::DC => dc_pred(dst, edges, 8, 4),
        ChromaMode::V => vertical_pred(dst, edges.top, 8),
        ChromaMode::H => horizontal_pred(dst, edges.left, 8),
        ChromaMode::TM => true_motion_pred(dst, edges, 8),
    }
}

//------------------------------------------------------------------------------
// 4x4 sub-block prediction

/// Bordered luma buffer used while searching 4x4 modes.
///
/// Row 0 holds the 16 top samples plus 4 top-right samples, column 0 the
/// 16 left samples, and `[0]` the top-left corner. The top-right samples
/// are repeated at rows 4, 8 and 12 so the right-hand sub-blocks of lower
/// rows see the macroblock's top-right row, as VP8 requires.
#[derive(Clone)]
pub(crate) struct LumaWorkspace {
    ws: [u8; LUMA_BLOCK_SIZE],
}

impl LumaWorkspace {
    /// Build the workspace from a macroblock's boundary samples.
    pub(crate) fn new(top: &[u8; 20], left: &[u8; 16], top_left: u8) -> Self {
        let stride = LUMA_STRIDE;
        let mut ws = [0u8; LUMA_BLOCK_SIZE];

        ws[0] = top_left;
        ws[1..21].copy_from_slice(top);
        for i in 17usize..21 {
            ws[4 * stride + i] = ws[i];
            ws[8 * stride + i] = ws[i];
            ws[12 * stride + i] = ws[i];
        }
        for (i, &l) in left.iter().enumerate() {
            ws[(i + 1) * stride] = l;
        }

        Self { ws }
    }

    /// Top-left position of sub-block `n` inside the workspace.
    #[inline]
    fn origin(n: usize) -> (usize, usize) {
        debug_assert!(n < 16);
        (1 + (n & 3) * 4, 1 + (n >> 2) * 4)
    }

    /// All ten 4x4 predictions for sub-block `n`, indexed by `IntraMode`.
    pub(crate) fn predict4(&self, n: usize) -> [[u8; 16]; IntraMode::COUNT] {
        let (x0, y0) = Self::origin(n);
        predict_intra4_all(&self.ws, x0, y0, LUMA_STRIDE)
    }

    /// Commit the reconstruction of sub-block `n` as context for later ones.
    pub(crate) fn store4(&mut self, n: usize, pixels: &[u8; 16]) {
        let (x0, y0) = Self::origin(n);
        for (y, row) in pixels.chunks_exact(4).enumerate() {
            self.ws[(y0 + y) * LUMA_STRIDE + x0..][..4].copy_from_slice(row);
        }
    }
}

/// Compute every 4x4 prediction for the block at `(x0, y0)` of `src`.
///
/// Reads the 4 left, 8 top (4 + 4 top-right) and top-left samples around
/// the block.
pub(crate) fn predict_intra4_all(
    src: &[u8],
    x0: usize,
    y0: usize,
    stride: usize,
) -> [[u8; 16]; IntraMode::COUNT] {
    let top_pos = (y0 - 1) * stride + x0;
    let a: [u8; 8] = core::array::from_fn(|i| src[top_pos + i]);
    let l: [u8; 4] = core::array::from_fn(|i| src[(y0 + i) * stride + x0 - 1]);
    let p = src[top_pos - 1];

    // Edge running from the bottom-left sample, through the corner, to the
    // last top-right sample: L3 L2 L1 L0 P A0 .. A7.
    let e = [l[3], l[2], l[1], l[0], p, a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7]];

    let mut out = [[0u8; 16]; IntraMode::COUNT];

    let dc = (a[..4].iter().chain(l.iter()).map(|&v| u32::from(v)).sum::<u32>() + 4) >> 3;
    out[IntraMode::DC.index()] = [dc as u8; 16];

    let tm = &mut out[IntraMode::TM.index()];
    for y in 0..4 {
        let base = i32::from(l[y]) - i32::from(p);
        for x in 0..4 {
            tm[y * 4 + x] = (base + i32::from(a[x])).clamp(0, 255) as u8;
        }
    }

    let ve = [
        avg3(p, a[0], a[1]),
        avg3(a[0], a[1], a[2]),
        avg3(a[1], a[2], a[3]),
        avg3(a[2], a[3], a[4]),
    ];
    let he = [
        avg3(p, l[0], l[1]),
        avg3(l[0], l[1], l[2]),
        avg3(l[1], l[2], l[3]),
        avg3(l[2], l[3], l[3]),
    ];
    for y in 0..4 {
        out[IntraMode::VE.index()][y * 4..][..4].copy_from_slice(&ve);
        out[IntraMode::HE.index()][y * 4..][..4].fill(he[y]);
    }

    // Down-left runs along the top edge, clamping past A7.
    let ld: [u8; 7] = core::array::from_fn(|i| avg3(a[i], a[i + 1], a[(i + 2).min(7)]));
    // Down-right runs along the whole edge array.
    let rd: [u8; 7] = core::array::from_fn(|i| avg3(e[i], e[i + 1], e[i + 2]));
    for y in 0..4 {
        out[IntraMode::LD.index()][y * 4..][..4].copy_from_slice(&ld[y..y + 4]);
        out[IntraMode::RD.index()][y * 4..][..4].copy_from_slice(&rd[3 - y..7 - y]);
    }

    #[rustfmt::skip]
    let vr = [
        avg2(e[4], e[5]),         avg2(e[5], e[6]),         avg2(e[6], e[7]),         avg2(e[7], e[8]),
        avg3(e[3], e[4], e[5]),   avg3(e[4], e[5], e[6]),   avg3(e[5], e[6], e[7]),   avg3(e[6], e[7], e[8]),
        avg3(e[2], e[3], e[4]),   avg2(e[4], e[5]),         avg2(e[5], e[6]),         avg2(e[6], e[7]),
        avg3(e[1], e[2], e[3]),   avg3(e[3], e[4], e[5]),   avg3(e[4], e[5], e[6]),   avg3(e[5], e[6], e[7]),
    ];
    out[IntraMode::VR.index()] = vr;

    #[rustfmt::skip]
    let vl = [
        avg2(a[0], a[1]),         avg2(a[1], a[2]),         avg2(a[2], a[3]),         avg2(a[3], a[4]),
        avg3(a[0], a[1], a[2]),   avg3(a[1], a[2], a[3]),   avg3(a[2], a[3], a[4]),   avg3(a[3], a[4], a[5]),
        avg2(a[1], a[2]),         avg2(a[2], a[3]),         avg2(a[3], a[4]),         avg3(a[4], a[5], a[6]),
        avg3(a[1], a[2], a[3]),   avg3(a[2], a[3], a[4]),   avg3(a[3], a[4], a[5]),   avg3(a[5], a[6], a[7]),
    ];
    out[IntraMode::VL.index()] = vl;

    #[rustfmt::skip]
    let hd = [
        avg2(e[3], e[4]),         avg3(e[3], e[4], e[5]),   avg3(e[4], e[5], e[6]),   avg3(e[5], e[6], e[7]),
        avg2(e[2], e[3]),         avg3(e[2], e[3], e[4]),   avg2(e[3], e[4]),         avg3(e[3], e[4], e[5]),
        avg2(e[1], e[2]),         avg3(e[1], e[2], e[3]),   avg2(e[2], e[3]),         avg3(e[2], e[3], e[4]),
        avg2(e[0], e[1]),         avg3(e[0], e[1], e[2]),   avg2(e[1], e[2]),         avg3(e[1], e[2], e[3]),
    ];
    out[IntraMode::HD.index()] = hd;

    #[rustfmt::skip]
    let hu = [
        avg2(l[0], l[1]),         avg3(l[0], l[1], l[2]),   avg2(l[1], l[2]),         avg3(l[1], l[2], l[3]),
        avg2(l[1], l[2]),         avg3(l[1], l[2], l[3]),   avg2(l[2], l[3]),         avg3(l[2], l[3], l[3]),
        avg2(l[2], l[3]),         avg3(l[2], l[3], l[3]),   l[3],                     l[3],
        l[3],                     l[3],                     l[3],                     l[3],
    ];
    out[IntraMode::HU.index()] = hu;

    out
}
