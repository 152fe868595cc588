//! Lambda calculation for rate-distortion optimization.
//!
//! Lambda values control the rate-distortion trade-off in mode selection.
//! Higher lambda = prefer lower rate.
//! Lower lambda = prefer lower distortion.
//!
//! Every lambda is derived from an average quantizer step `q` of the
//! segment's matrices.

use super::super::tables::{AC_QUANT, LEVELS_FROM_DELTA, MAX_DELTA_SIZE};

//------------------------------------------------------------------------------
// Dynamic lambda calculation (based on quantization)

/// Calculate lambda_i4 based on quantization: (3 * q²) >> 7
#[inline]
pub fn calc_lambda_i4(q: u32) -> u32 {
    ((3 * q * q) >> 7).max(1)
}

/// Calculate lambda_i16 based on quantization: 3 * q²
#[inline]
pub fn calc_lambda_i16(q: u32) -> u32 {
    (3 * q * q).max(1)
}

/// Calculate lambda_uv based on quantization: (3 * q²) >> 6
#[inline]
pub fn calc_lambda_uv(q: u32) -> u32 {
    ((3 * q * q) >> 6).max(1)
}

/// Calculate lambda_mode based on quantization: (1 * q²) >> 7
#[inline]
pub fn calc_lambda_mode(q: u32) -> u32 {
    ((q * q) >> 7).max(1)
}

/// Calculate tlambda (spectral distortion weight) from SNS strength and quant.
///
/// tlambda = (sns_strength * q) >> 5
///
/// # Arguments
/// * `sns_strength` - Spatial noise shaping strength (0-100)
/// * `q` - Average luma quantizer step
#[inline]
pub fn calc_tlambda(sns_strength: u32, q: u32) -> u32 {
    (sns_strength * q) >> 5
}

//------------------------------------------------------------------------------
// Filter level calculation

/// Cutoff for very small filter strengths (have close to no visual effect)
const FSTRENGTH_CUTOFF: u32 = 2;

/// Highest loop-filter level.
pub const MAX_FILTER_LEVEL: u8 = 63;

/// Interior limit of the loop filter for a given sharpness and level.
#[inline]
pub fn interior_limit(sharpness: u8, level: u8) -> u8 {
    let mut ilevel = level;
    if sharpness > 0 {
        ilevel >>= if sharpness > 4 { 2 } else { 1 };
        ilevel = ilevel.min(9 - sharpness.min(7));
    }
    ilevel.max(1)
}

/// Smallest filter level that filters an edge step of height `delta`.
#[inline]
pub fn filter_strength_from_delta(sharpness: u8, delta: u8) -> u8 {
    let pos = usize::from(delta).min(MAX_DELTA_SIZE - 1);
    let sharpness_idx = usize::from(sharpness).min(7);
    LEVELS_FROM_DELTA[sharpness_idx][pos]
}

/// Base filter level for a segment.
///
/// 1. Compute qstep from the AC quantizer
/// 2. Get base strength from the delta table
/// 3. Scale by the configured filter strength (0-100)
#[inline]
pub fn compute_filter_level(quant_index: u8, sharpness: u8, filter_strength: u8) -> u8 {
    // level0 is in [0..500].
    let level0 = 5 * u32::from(filter_strength);
    let qstep = (AC_QUANT[usize::from(quant_index.min(127))] >> 2) as u8;
    let base_strength = u32::from(filter_strength_from_delta(sharpness, qstep));

    let f = (base_strength * level0) >> 8;
    if f < FSTRENGTH_CUTOFF {
        0
    } else {
        f.min(u32::from(MAX_FILTER_LEVEL)) as u8
    }
}
