//! Quantization matrix and coefficient quantization.
//!
//! [`VP8Matrix`] holds the per-coefficient step, reciprocal, rounding bias,
//! zero threshold and sharpening boost for one coding plane of a segment.
//! Quantization visits coefficients in zigzag order and replaces each input
//! coefficient with its dequantized value so the caller can inverse
//! transform the same buffer.

use super::tables::{MAX_LEVEL, VP8_FREQ_SHARPENING, ZIGZAG};

//------------------------------------------------------------------------------
// Quantization constants

/// Fixed-point precision for quantization
pub const QFIX: u32 = 17;

/// Shift applied to sharpening boosts.
const SHARPEN_BITS: u32 = 11;

/// Storage descale for diffusion errors, so they fit an `i8`.
pub const DSCALE: u32 = 1;

/// Bias calculation macro equivalent
#[inline]
pub const fn quantization_bias(b: u32) -> u32 {
    ((b << QFIX) + 128) >> 8
}

/// Quantization division: (coeff * iq + bias) >> QFIX
#[inline]
pub fn quantdiv(coeff: u32, iq: u32, bias: u32) -> i32 {
    ((u64::from(coeff) * u64::from(iq) + u64::from(bias)) >> QFIX) as i32
}

//------------------------------------------------------------------------------
// Quantization matrix

/// Matrix type for bias selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixType {
    /// Luma AC coefficients
    Y1,
    /// Luma DC (WHT) coefficients
    Y2,
    /// Chroma coefficients
    UV,
}

impl MatrixType {
    /// Rounding bias for the (DC, AC) positions, in 1/256.
    const fn bias(self) -> (u32, u32) {
        match self {
            MatrixType::Y1 => (96, 110),
            MatrixType::Y2 => (96, 108),
            MatrixType::UV => (110, 115),
        }
    }
}

/// Quantization matrix for a coefficient type (Y1, Y2, UV)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VP8Matrix {
    /// Quantizer steps for each coefficient position
    pub q: [u16; 16],
    /// Reciprocals (1 << QFIX) / q, for fast division
    pub iq: [u32; 16],
    /// Rounding bias for quantization
    pub bias: [u32; 16],
    /// Zero threshold: coefficients at or below this are quantized to 0
    pub zthresh: [u32; 16],
    /// Sharpening boost for high-frequency coefficients
    pub sharpen: [u16; 16],
}

/// Outcome of quantizing one 4x4 block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct QuantizedBlock {
    /// Scan index of the last nonzero level, `None` for an all-zero block.
    pub last: Option<usize>,
}

impl QuantizedBlock {
    /// Whether any level is nonzero.
    #[inline]
    pub fn is_nonzero(self) -> bool {
        self.last.is_some()
    }
}

impl VP8Matrix {
    /// Create a new quantization matrix from DC and AC quantizer values
    pub fn new(q_dc: u16, q_ac: u16, matrix_type: MatrixType) -> Self {
        debug_assert!(q_dc > 0 && q_ac > 0, "quantizer step must be positive");
        let (dc_bias, ac_bias) = matrix_type.bias();

        let mut m = Self {
            q: [q_ac; 16],
            iq: [0; 16],
            bias: [0; 16],
            zthresh: [0; 16],
            sharpen: [0; 16],
        };
        m.q[0] = q_dc;

        for pos in 0..16 {
            let b = if pos == 0 { dc_bias } else { ac_bias };
            m.iq[pos] = (1u32 << QFIX) / u32::from(m.q[pos]);
            m.bias[pos] = quantization_bias(b);
            m.zthresh[pos] = ((1 << QFIX) - 1 - m.bias[pos]) / m.iq[pos];
        }

        if matrix_type == MatrixType::Y1 {
            for (pos, &boost) in VP8_FREQ_SHARPENING.iter().enumerate() {
                m.sharpen[pos] = ((u32::from(boost) * u32::from(m.q[pos])) >> SHARPEN_BITS) as u16;
            }
        }

        m
    }

    /// Average quantizer step, the base for the segment lambdas.
    pub fn average_q(&self) -> u32 {
        let sum: u32 = self.q.iter().map(|&x| u32::from(x)).sum();
        (sum + 8) >> 4
    }

    /// Quantize one coefficient at natural position `pos`.
    #[inline]
    pub fn quantize_coeff(&self, coeff: i32, pos: usize) -> i32 {
        let magnitude = coeff.unsigned_abs() + u32::from(self.sharpen[pos]);
        if magnitude <= self.zthresh[pos] {
            return 0;
        }
        let level = quantdiv(magnitude, self.iq[pos], self.bias[pos]).min(MAX_LEVEL);
        if coeff < 0 {
            -level
        } else {
            level
        }
    }

    /// Dequantize a coefficient
    #[inline]
    pub fn dequantize(&self, level: i32, pos: usize) -> i32 {
        level * i32::from(self.q[pos])
    }

    /// Quantize a 4x4 block.
    ///
    /// Coefficients are visited in zigzag order. `levels` receives the
    /// quantized levels in natural order and `coeffs` is overwritten with
    /// `level * q`, ready for the inverse transform.
    pub fn quantize_block(&self, coeffs: &mut [i32; 16], levels: &mut [i32; 16]) -> QuantizedBlock {
        let mut last = None;
        for (n, &pos) in ZIGZAG.iter().enumerate() {
            let level = self.quantize_coeff(coeffs[pos], pos);
            levels[pos] = level;
            coeffs[pos] = self.dequantize(level, pos);
            if level != 0 {
                last = Some(n);
            }
        }
        QuantizedBlock { last }
    }

    /// Quantize only the DC coefficient, in place, with the DC parameters.
    ///
    /// Returns the signed quantization error `coeff - level * q`, descaled
    /// by [`DSCALE`].
    pub fn quantize_single(&self, coeff: &mut i32) -> i32 {
        let v = *coeff;
        let magnitude = v.unsigned_abs();
        let sign = v < 0;
        if magnitude > self.zthresh[0] {
            let level = quantdiv(magnitude, self.iq[0], self.bias[0]).min(MAX_LEVEL);
            let qv = level * i32::from(self.q[0]);
            let err = magnitude as i32 - qv;
            *coeff = if sign { -qv } else { qv };
            (if sign { -err } else { err }) >> DSCALE
        } else {
            *coeff = 0;
            v >> DSCALE
        }
    }
}
