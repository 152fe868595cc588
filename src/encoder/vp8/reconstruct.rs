//! Transform, quantize and reconstruct candidate predictions.
//!
//! Every function takes the source and the prediction as contiguous blocks
//! (stride = block width), writes the quantized levels and the clipped
//! reconstruction, and returns the nonzero flags of the blocks it coded.

use crate::common::transform::{add_residue, dct4x4, fwht4x4, idct4x4, iwht4x4, residual4x4};
use crate::encoder::cost::{NZ_UV_SHIFT, NZ_Y2_BIT};
use crate::encoder::quantize::VP8Matrix;

use super::diffusion::DiffusionErrorState;

/// Offset of 4x4 block `n` inside a contiguous square block of `width`.
#[inline]
fn block_offset(n: usize, width: usize) -> usize {
    let per_row = width / 4;
    (n / per_row) * 4 * width + (n % per_row) * 4
}

/// Reconstruct one 4x4 luma sub-block.
///
/// Returns whether any level is nonzero.
pub fn reconstruct_intra4(
    src: &[u8; 16],
    pred: &[u8; 16],
    y1: &VP8Matrix,
    levels: &mut [i32; 16],
    recon: &mut [u8; 16],
) -> bool {
    let mut coeffs = residual4x4(src, 4, pred, 4);
    dct4x4(&mut coeffs);
    let nz = y1.quantize_block(&mut coeffs, levels).is_nonzero();
    idct4x4(&mut coeffs);
    add_residue(pred, 4, &coeffs, recon, 4);
    nz
}

/// Reconstruct a 16x16 luma block through the DC/AC split.
///
/// The sixteen DC terms go through the WHT and are quantized together with
/// `y2`; the remaining AC terms are quantized per sub-block with `y1`.
/// Returns nz bits 0..16 for the sub-blocks and bit 24 for the DC block.
pub fn reconstruct_intra16(
    src: &[u8; 256],
    pred: &[u8; 256],
    y1: &VP8Matrix,
    y2: &VP8Matrix,
    dc_levels: &mut [i32; 16],
    ac_levels: &mut [[i32; 16]; 16],
    recon: &mut [u8; 256],
) -> u32 {
    let mut blocks = [[0i32; 16]; 16];
    let mut dc = [0i32; 16];
    for (n, block) in blocks.iter_mut().enumerate() {
        let off = block_offset(n, 16);
        *block = residual4x4(&src[off..], 16, &pred[off..], 16);
        dct4x4(block);
        dc[n] = block[0];
    }

    let mut nz = 0u32;
    let mut dc_coeffs = fwht4x4(&dc);
    if y2.quantize_block(&mut dc_coeffs, dc_levels).is_nonzero() {
        nz |= 1 << NZ_Y2_BIT;
    }

    for (n, (block, levels)) in blocks.iter_mut().zip(ac_levels.iter_mut()).enumerate() {
        // The DC travels through the WHT block instead.
        block[0] = 0;
        if y1.quantize_block(block, levels).is_nonzero() {
            nz |= 1 << n;
        }
    }

    iwht4x4(&mut dc_coeffs);
    for (n, block) in blocks.iter_mut().enumerate() {
        block[0] = dc_coeffs[n];
        idct4x4(block);
        let off = block_offset(n, 16);
        add_residue(&pred[off..], 16, block, &mut recon[off..], 16);
    }
    nz
}

/// Chroma DC diffusion inputs for one macroblock.
#[derive(Clone, Copy, Debug)]
pub struct DiffusionInput<'a> {
    /// Caches carried from the left and upper macroblocks.
    pub state: &'a DiffusionErrorState,
    /// Macroblock column.
    pub x: usize,
}

/// Reconstruct both 8x8 chroma planes.
///
/// `levels[0..4]` receive the U blocks and `levels[4..8]` the V blocks.
/// With `diffusion`, the DC terms are pre-corrected before quantization
/// and the resulting errors are written to `derr`.
/// Returns nz bits 16..24.
#[allow(clippy::too_many_arguments)]
pub fn reconstruct_uv(
    src_u: &[u8; 64],
    src_v: &[u8; 64],
    pred_u: &[u8; 64],
    pred_v: &[u8; 64],
    uv: &VP8Matrix,
    diffusion: Option<DiffusionInput<'_>>,
    levels: &mut [[i32; 16]; 8],
    derr: &mut [[i8; 3]; 2],
    recon_u: &mut [u8; 64],
    recon_v: &mut [u8; 64],
) -> u32 {
    let planes = [(src_u, pred_u), (src_v, pred_v)];
    let mut blocks = [[0i32; 16]; 8];
    for (n, block) in blocks.iter_mut().enumerate() {
        let (src, pred) = planes[n / 4];
        let off = block_offset(n % 4, 8);
        *block = residual4x4(&src[off..], 8, &pred[off..], 8);
        dct4x4(block);
    }

    *derr = match diffusion {
        Some(DiffusionInput { state, x }) => state.correct_dc_values(x, uv, &mut blocks),
        None => [[0; 3]; 2],
    };

    let mut nz = 0u32;
    for (n, (block, lv)) in blocks.iter_mut().zip(levels.iter_mut()).enumerate() {
        if uv.quantize_block(block, lv).is_nonzero() {
            nz |= 1 << (NZ_UV_SHIFT as usize + n);
        }
    }

    for (n, block) in blocks.iter_mut().enumerate() {
        idct4x4(block);
        let off = block_offset(n % 4, 8);
        let (pred, recon) = if n < 4 {
            (pred_u, &mut *recon_u)
        } else {
            (pred_v, &mut *recon_v)
        };
        add_residue(&pred[off..], 8, block, &mut recon[off..], 8);
    }
    nz
}
