//! Floyd-Steinberg-like diffusion of chroma DC quantization error.
//!
//! Each chroma plane of a macroblock is a 2x2 grid of 4x4 blocks:
//! ```text
//!           | top[0] | top[1]
//! ----------+--------+--------
//!   left[0] |  c[0]  |  c[1]      err0  err1
//!   left[1] |  c[2]  |  c[3]      err2  err3
//! ```
//! Before a block's DC is quantized it receives `7/16` of the error above
//! it and `8/16` of the error to its left. Block 3 takes err2 as its upper
//! input and err1 as its left input.

use alloc::vec;
use alloc::vec::Vec;

use crate::encoder::quantize::{VP8Matrix, DSCALE};

/// Weight of the upper error, in 1/16.
const C1: i32 = 7;
/// Weight of the left error, in 1/16.
const C2: i32 = 8;
const DSHIFT: u32 = 4;

/// Diffusion caches carried between macroblocks.
///
/// `top[x][ch]` holds the errors flowing down out of column `x`;
/// `left[ch]` the errors flowing right within the current row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffusionErrorState {
    top: Vec<[[i8; 2]; 2]>,
    left: [[i8; 2]; 2],
}

impl DiffusionErrorState {
    /// Zeroed state for a row of `mb_w` macroblocks.
    pub fn new(mb_w: usize) -> Self {
        Self {
            top: vec![[[0; 2]; 2]; mb_w],
            left: [[0; 2]; 2],
        }
    }

    /// Clear the left caches; called at the start of every macroblock row.
    pub fn reset_left(&mut self) {
        self.left = [[0; 2]; 2];
    }

    /// Clear every cache; called at the start of a picture.
    pub fn reset(&mut self) {
        self.top.fill([[0; 2]; 2]);
        self.reset_left();
    }

    /// Errors above column `x`, per chroma plane.
    pub fn top(&self, x: usize) -> [[i8; 2]; 2] {
        self.top[x]
    }

    /// Errors to the left of the current macroblock, per chroma plane.
    pub fn left(&self) -> [[i8; 2]; 2] {
        self.left
    }

    /// Pre-correct and quantize the DC terms of the eight chroma blocks of
    /// column `x` (U blocks 0..4, V blocks 4..8).
    ///
    /// Each DC is replaced by its dequantized value. Returns the errors
    /// `[err1, err2, err3]` of each plane, to be committed with
    /// [`store`](Self::store) if this candidate wins.
    pub fn correct_dc_values(
        &self,
        x: usize,
        uv: &VP8Matrix,
        coeffs: &mut [[i32; 16]; 8],
    ) -> [[i8; 3]; 2] {
        let mut derr = [[0i8; 3]; 2];
        for (ch, out) in derr.iter_mut().enumerate() {
            let top = self.top[x][ch];
            let left = self.left[ch];
            let c = &mut coeffs[ch * 4..ch * 4 + 4];

            let err0 = diffuse_dc(&mut c[0][0], top[0], left[0], uv);
            let err1 = diffuse_dc(&mut c[1][0], top[1], err0, uv);
            let err2 = diffuse_dc(&mut c[2][0], err0, left[1], uv);
            let err3 = diffuse_dc(&mut c[3][0], err2, err1, uv);

            *out = [err1, err2, err3].map(|e| e as i8);
        }
        derr
    }

    /// Commit a macroblock's errors as context for its right and lower
    /// neighbours.
    pub fn store(&mut self, x: usize, derr: &[[i8; 3]; 2]) {
        for (ch, &[err1, err2, err3]) in derr.iter().enumerate() {
            let left1 = ((3 * i32::from(err3)) >> 2) as i8;
            self.left[ch] = [err1, left1];
            self.top[x][ch] = [err2, (i32::from(err3) - i32::from(left1)) as i8];
        }
    }
}

/// Add the diffused error to a DC term and quantize it, returning the new
/// error.
#[inline]
fn diffuse_dc(dc: &mut i32, top: impl Into<i32>, left: impl Into<i32>, uv: &VP8Matrix) -> i32 {
    *dc += (C1 * top.into() + C2 * left.into()) >> (DSHIFT - DSCALE);
    uv.quantize_single(dc).clamp(-128, 127)
}
