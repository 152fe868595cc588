//! Raster-scan macroblock iterator.
//!
//! The iterator owns everything that flows between macroblocks: the
//! reconstructed row above (`top` caches, one entry per column), the
//! reconstructed column to the left, the top-left corners and the chroma
//! diffusion caches. Pictures start with the codec's defaults: 127 above
//! the first row, 129 left of the first column.

use alloc::vec;
use alloc::vec::Vec;

use crate::common::prediction::Edges;

use super::api::FrameView;
use super::vp8::diffusion::DiffusionErrorState;
use super::vp8::MacroblockPixels;

/// Sample value above the first macroblock row.
const TOP_DEFAULT: u8 = 127;
/// Sample value left of the first macroblock column.
const LEFT_DEFAULT: u8 = 129;

/// Neighbour samples of one macroblock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryContext {
    /// 16 samples above the macroblock plus 4 top-right lookahead samples.
    pub y_top: [u8; 20],
    /// 16 samples left of the macroblock.
    pub y_left: [u8; 16],
    /// Luma sample above and to the left.
    pub y_top_left: u8,
    /// 8 samples above the U block.
    pub u_top: [u8; 8],
    /// 8 samples left of the U block.
    pub u_left: [u8; 8],
    /// U sample above and to the left.
    pub u_top_left: u8,
    /// 8 samples above the V block.
    pub v_top: [u8; 8],
    /// 8 samples left of the V block.
    pub v_left: [u8; 8],
    /// V sample above and to the left.
    pub v_top_left: u8,
    /// Whether the macroblock has a row above it.
    pub has_top: bool,
    /// Whether the macroblock has a column to its left.
    pub has_left: bool,
}

impl BoundaryContext {
    fn edges<'a>(&self, top: &'a [u8], left: &'a [u8], top_left: u8) -> Edges<'a> {
        Edges {
            top: self.has_top.then_some(top),
            left: self.has_left.then_some(left),
            top_left,
        }
    }

    /// Edges for the 16x16 luma predictors.
    pub fn luma_edges(&self) -> Edges<'_> {
        self.edges(&self.y_top[..16], &self.y_left, self.y_top_left)
    }

    /// Edges for the U predictors.
    pub fn u_edges(&self) -> Edges<'_> {
        self.edges(&self.u_top, &self.u_left, self.u_top_left)
    }

    /// Edges for the V predictors.
    pub fn v_edges(&self) -> Edges<'_> {
        self.edges(&self.v_top, &self.v_left, self.v_top_left)
    }
}

/// Raster position, neighbour caches and remaining-macroblock countdown
/// for one picture.
#[derive(Clone, Debug)]
pub struct MacroblockIterator {
    x: usize,
    y: usize,
    mb_w: usize,
    mb_h: usize,
    count_down: usize,
    y_top: Vec<u8>,
    u_top: Vec<u8>,
    v_top: Vec<u8>,
    y_left: [u8; 16],
    u_left: [u8; 8],
    v_left: [u8; 8],
    y_top_left: u8,
    u_top_left: u8,
    v_top_left: u8,
    diffusion: DiffusionErrorState,
}

impl MacroblockIterator {
    /// Iterator over an `mb_w` x `mb_h` grid, positioned on the first
    /// macroblock.
    pub fn new(mb_w: usize, mb_h: usize) -> Self {
        debug_assert!(mb_w > 0 && mb_h > 0);
        let mut it = Self {
            x: 0,
            y: 0,
            mb_w,
            mb_h,
            count_down: mb_w * mb_h,
            y_top: vec![TOP_DEFAULT; mb_w * 16],
            u_top: vec![TOP_DEFAULT; mb_w * 8],
            v_top: vec![TOP_DEFAULT; mb_w * 8],
            y_left: [LEFT_DEFAULT; 16],
            u_left: [LEFT_DEFAULT; 8],
            v_left: [LEFT_DEFAULT; 8],
            y_top_left: TOP_DEFAULT,
            u_top_left: TOP_DEFAULT,
            v_top_left: TOP_DEFAULT,
            diffusion: DiffusionErrorState::new(mb_w),
        };
        it.reset();
        it
    }

    /// Rewind to the first macroblock and restore the picture defaults.
    pub fn reset(&mut self) {
        self.count_down = self.mb_w * self.mb_h;
        self.y_top.fill(TOP_DEFAULT);
        self.u_top.fill(TOP_DEFAULT);
        self.v_top.fill(TOP_DEFAULT);
        self.diffusion.reset();
        self.set_row(0);
    }

    fn set_row(&mut self, y: usize) {
        self.x = 0;
        self.y = y;
        self.init_left();
    }

    fn init_left(&mut self) {
        let corner = if self.y > 0 { LEFT_DEFAULT } else { TOP_DEFAULT };
        self.y_top_left = corner;
        self.u_top_left = corner;
        self.v_top_left = corner;
        self.y_left = [LEFT_DEFAULT; 16];
        self.u_left = [LEFT_DEFAULT; 8];
        self.v_left = [LEFT_DEFAULT; 8];
        self.diffusion.reset_left();
    }

    /// Current macroblock position `(x, y)`.
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Macroblocks still to be visited, including the current one.
    pub fn count_down(&self) -> usize {
        self.count_down
    }

    /// Whether every macroblock has been visited.
    pub fn is_done(&self) -> bool {
        self.count_down == 0
    }

    /// Chroma diffusion caches, for committing a macroblock's errors.
    pub fn diffusion_mut(&mut self) -> &mut DiffusionErrorState {
        &mut self.diffusion
    }

    /// Copy the current macroblock's source samples out of `frame`.
    ///
    /// Samples beyond the right or bottom picture edge replicate the last
    /// valid column or row.
    pub fn import(&self, frame: &FrameView<'_>) -> MacroblockPixels {
        let mut mb = MacroblockPixels::default();
        let (uv_w, uv_h) = frame.chroma_size();
        import_block(
            frame.y(),
            frame.y_stride(),
            self.x * 16,
            self.y * 16,
            frame.width(),
            frame.height(),
            &mut mb.y,
            16,
        );
        let (x0, y0) = (self.x * 8, self.y * 8);
        import_block(frame.u(), frame.uv_stride(), x0, y0, uv_w, uv_h, &mut mb.u, 8);
        import_block(frame.v(), frame.uv_stride(), x0, y0, uv_w, uv_h, &mut mb.v, 8);
        mb
    }

    /// Neighbour samples of the current macroblock.
    pub fn context(&self) -> BoundaryContext {
        let x = self.x;
        let mut y_top = [0u8; 20];
        y_top[..16].copy_from_slice(&self.y_top[x * 16..x * 16 + 16]);
        if x + 1 < self.mb_w {
            y_top[16..].copy_from_slice(&self.y_top[x * 16 + 16..x * 16 + 20]);
        } else {
            // Replicate the last top sample on the far right of the picture.
            let last = y_top[15];
            y_top[16..].fill(last);
        }

        let mut u_top = [0u8; 8];
        let mut v_top = [0u8; 8];
        u_top.copy_from_slice(&self.u_top[x * 8..x * 8 + 8]);
        v_top.copy_from_slice(&self.v_top[x * 8..x * 8 + 8]);

        BoundaryContext {
            y_top,
            y_left: self.y_left,
            y_top_left: self.y_top_left,
            u_top,
            u_left: self.u_left,
            u_top_left: self.u_top_left,
            v_top,
            v_left: self.v_left,
            v_top_left: self.v_top_left,
            has_top: self.y > 0,
            has_left: x > 0,
        }
    }

    /// Save the reconstruction's right column and bottom row as context for
    /// the neighbours to the right and below.
    pub fn save_boundary(&mut self, recon: &MacroblockPixels) {
        let x = self.x;
        if x + 1 < self.mb_w {
            for (i, l) in self.y_left.iter_mut().enumerate() {
                *l = recon.y[i * 16 + 15];
            }
            for i in 0..8 {
                self.u_left[i] = recon.u[i * 8 + 7];
                self.v_left[i] = recon.v[i * 8 + 7];
            }
            // The corner comes from the old top row, before it is replaced.
            self.y_top_left = self.y_top[x * 16 + 15];
            self.u_top_left = self.u_top[x * 8 + 7];
            self.v_top_left = self.v_top[x * 8 + 7];
        }
        if self.y + 1 < self.mb_h {
            self.y_top[x * 16..x * 16 + 16].copy_from_slice(&recon.y[15 * 16..]);
            self.u_top[x * 8..x * 8 + 8].copy_from_slice(&recon.u[7 * 8..]);
            self.v_top[x * 8..x * 8 + 8].copy_from_slice(&recon.v[7 * 8..]);
        }
    }

    /// Move to the next macroblock in raster order.
    ///
    /// Returns `false` once the countdown reaches zero.
    pub fn advance(&mut self) -> bool {
        if self.count_down == 0 {
            return false;
        }
        self.x += 1;
        if self.x == self.mb_w {
            self.set_row(self.y + 1);
        }
        self.count_down -= 1;
        self.count_down > 0
    }
}

/// Copy a `size` x `size` block at `(x0, y0)` out of a plane of `w` x `h`
/// samples, replicating the last column and row past the edges.
#[allow(clippy::too_many_arguments)]
fn import_block(
    plane: &[u8],
    stride: usize,
    x0: usize,
    y0: usize,
    w: usize,
    h: usize,
    dst: &mut [u8],
    size: usize,
) {
    let cols = w.saturating_sub(x0).min(size);
    let rows = h.saturating_sub(y0).min(size);
    debug_assert!(cols > 0 && rows > 0);

    for (j, row) in dst.chunks_exact_mut(size).enumerate() {
        let sy = y0 + j.min(rows - 1);
        let src = &plane[sy * stride + x0..][..cols];
        row[..cols].copy_from_slice(src);
        let last = src[cols - 1];
        row[cols..].fill(last);
    }
}
