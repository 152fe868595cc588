//! Per-segment quantization and rate-distortion parameters.

use super::api::{EncodeError, EncodeResult};
use super::config::IntraConfig;
use super::cost::{
    calc_lambda_i16, calc_lambda_i4, calc_lambda_mode, calc_lambda_uv, calc_tlambda,
    compute_filter_level,
};
use super::quantize::{MatrixType, VP8Matrix};
use super::tables::{AC_QUANT, DC_QUANT, MAX_UV_DC_INDEX};

/// Number of coding segments a picture may be split into.
pub const NUM_SEGMENTS: usize = 4;

/// Highest quantizer index.
pub const MAX_QUANT_INDEX: u8 = 127;

/// Quantizers, lambdas and filter scalars shared by every macroblock of one
/// segment.
///
/// Read-only while a macroblock is processed, except [`max_edge`], which
/// the mode search raises.
///
/// [`max_edge`]: SegmentParams::max_edge
#[derive(Clone, Debug)]
pub struct SegmentParams {
    /// Luma AC matrix (also luma DC for 4x4 prediction).
    pub y1: VP8Matrix,
    /// Luma DC matrix for the WHT block of 16x16 prediction.
    pub y2: VP8Matrix,
    /// Chroma matrix.
    pub uv: VP8Matrix,
    /// Lambda for ranking 4x4 sub-block candidates.
    pub lambda_i4: u32,
    /// Lambda for ranking 16x16 candidates.
    pub lambda_i16: u32,
    /// Lambda for ranking chroma candidates.
    pub lambda_uv: u32,
    /// Lambda for comparing 16x16 against 4x4 prediction.
    pub lambda_mode: u32,
    /// Spectral distortion weight, 0 when TDisto is disabled.
    pub tlambda: u32,
    /// Quantizer index (0-127).
    pub quant: u8,
    /// Base loop filter level (0-63).
    pub filter_level: u8,
    /// Distortion a DC-only 16x16 macroblock must exceed to raise
    /// [`max_edge`](SegmentParams::max_edge).
    pub min_disto: i64,
    /// Largest first-order DC level seen so far (WHT positions 1, 2, 4).
    pub max_edge: i32,
    /// Cap on the total header bits of a 4x4 macroblock.
    pub max_i4_header_bits: i64,
}

impl SegmentParams {
    /// Derive a segment's parameters from its quantizer index.
    pub fn new(quant_index: u8, config: &IntraConfig) -> EncodeResult<Self> {
        if quant_index > MAX_QUANT_INDEX {
            return Err(EncodeError::InvalidParameter(alloc::format!(
                "quantizer index {} outside 0..={}",
                quant_index,
                MAX_QUANT_INDEX
            )));
        }
        let q = usize::from(quant_index);

        let y1 = VP8Matrix::new(DC_QUANT[q], AC_QUANT[q], MatrixType::Y1);
        let y2_ac = (u32::from(AC_QUANT[q]) * 155 / 100).max(8) as u16;
        let y2 = VP8Matrix::new(DC_QUANT[q] * 2, y2_ac, MatrixType::Y2);
        let uv = VP8Matrix::new(DC_QUANT[q.min(MAX_UV_DC_INDEX)], AC_QUANT[q], MatrixType::UV);

        let q_i4 = y1.average_q();
        let q_i16 = y2.average_q();
        let q_uv = uv.average_q();

        let tlambda = if config.use_tdisto() {
            calc_tlambda(u32::from(config.sns_strength), q_i4)
        } else {
            0
        };

        let limit = 100 - i64::from(config.partition_limit.min(100));
        let max_i4_header_bits = 256 * 16 * 16 * limit * limit / (100 * 100);

        Ok(Self {
            lambda_i4: calc_lambda_i4(q_i4),
            lambda_i16: calc_lambda_i16(q_i16),
            lambda_uv: calc_lambda_uv(q_uv),
            lambda_mode: calc_lambda_mode(q_i4),
            tlambda,
            quant: quant_index,
            filter_level: compute_filter_level(
                quant_index,
                config.filter_sharpness,
                config.filter_strength,
            ),
            min_disto: 20 * i64::from(y1.q[0]),
            max_edge: 0,
            max_i4_header_bits,
            y1,
            y2,
            uv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_quantizer() {
        let err = SegmentParams::new(128, &IntraConfig::default()).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidParameter(_)));
    }

    #[test]
    fn matrices_follow_quant_tables() {
        let seg = SegmentParams::new(127, &IntraConfig::default()).unwrap();
        assert_eq!(seg.y1.q[0], DC_QUANT[127]);
        assert_eq!(seg.y1.q[1], AC_QUANT[127]);
        assert_eq!(seg.y2.q[0], 2 * DC_QUANT[127]);
        assert_eq!(seg.y2.q[1], (u32::from(AC_QUANT[127]) * 155 / 100) as u16);
        assert_eq!(seg.uv.q[0], DC_QUANT[MAX_UV_DC_INDEX]);

        let low = SegmentParams::new(0, &IntraConfig::default()).unwrap();
        assert_eq!(low.y2.q[1], 8);
    }

    #[test]
    fn tdisto_follows_method() {
        let on = SegmentParams::new(40, &IntraConfig::new().with_method(4)).unwrap();
        let off = SegmentParams::new(40, &IntraConfig::new().with_method(3)).unwrap();
        assert!(on.tlambda > 0);
        assert_eq!(off.tlambda, 0);
        assert_eq!(on.lambda_mode, off.lambda_mode);
    }

    #[test]
    fn scalar_defaults() {
        let seg = SegmentParams::new(30, &IntraConfig::default()).unwrap();
        assert_eq!(seg.min_disto, 20 * i64::from(DC_QUANT[30]));
        assert_eq!(seg.max_edge, 0);
        assert_eq!(seg.max_i4_header_bits, 256 * 16 * 16);
        assert!(seg.lambda_i16 > seg.lambda_uv && seg.lambda_uv > seg.lambda_i4);

        let capped = SegmentParams::new(30, &IntraConfig::new().with_partition_limit(100)).unwrap();
        assert_eq!(capped.max_i4_header_bits, 0);
    }
}
