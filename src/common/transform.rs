//! 4x4 integer DCT and Walsh-Hadamard transforms.
//!
//! All transforms work in place on `[i32; 16]` blocks in natural raster
//! order. The forward DCT takes a residual (`source - prediction`) in
//! `[-255, 255]`; the inverse DCT produces a residual that the caller adds
//! back onto the prediction with [`add_residue`].

/// 16 bit fixed point version of cos(PI/8) * sqrt(2) - 1
const CONST1: i64 = 20091;
/// 16 bit fixed point version of sin(PI/8) * sqrt(2)
const CONST2: i64 = 35468;

/// Largest magnitude a forward-transform output may reach (12 bits signed).
const MAX_COEFF: i32 = 1 << 12;

/// Compute `src - pred` for a 4x4 block read from two strided buffers.
#[inline]
pub fn residual4x4(
    src: &[u8],
    src_stride: usize,
    pred: &[u8],
    pred_stride: usize,
) -> [i32; 16] {
    let mut out = [0i32; 16];
    for y in 0..4 {
        let s = &src[y * src_stride..][..4];
        let p = &pred[y * pred_stride..][..4];
        for x in 0..4 {
            out[y * 4 + x] = i32::from(s[x]) - i32::from(p[x]);
        }
    }
    out
}

/// Forward DCT: horizontal pass then vertical pass.
pub fn dct4x4(block: &mut [i32; 16]) {
    debug_assert!(
        block.iter().all(|v| (-255..=255).contains(v)),
        "dct input is not a pixel residual"
    );

    let mut tmp = [0i32; 16];
    for (row, out) in block.chunks_exact(4).zip(tmp.chunks_exact_mut(4)) {
        let a0 = row[0] + row[3];
        let a1 = row[1] + row[2];
        let a2 = row[1] - row[2];
        let a3 = row[0] - row[3];

        out[0] = (a0 + a1) * 8;
        out[1] = (a2 * 2217 + a3 * 5352 + 1812) >> 9;
        out[2] = (a0 - a1) * 8;
        out[3] = (a3 * 2217 - a2 * 5352 + 937) >> 9;
    }

    for i in 0..4 {
        let a0 = tmp[i] + tmp[12 + i];
        let a1 = tmp[4 + i] + tmp[8 + i];
        let a2 = tmp[4 + i] - tmp[8 + i];
        let a3 = tmp[i] - tmp[12 + i];

        block[i] = (a0 + a1 + 7) >> 4;
        block[4 + i] = ((a2 * 2217 + a3 * 5352 + 12000) >> 16) + i32::from(a3 != 0);
        block[8 + i] = (a0 - a1 + 7) >> 4;
        block[12 + i] = (a3 * 2217 - a2 * 5352 + 51000) >> 16;
    }

    debug_assert!(block.iter().all(|v| v.abs() <= MAX_COEFF));
}

/// Inverse DCT, producing the residual to add onto the prediction.
pub fn idct4x4(block: &mut [i32; 16]) {
    // The intermediate results may overflow the types, so we stretch the type.
    fn fetch(block: &[i32], idx: usize) -> i64 {
        i64::from(block[idx])
    }

    let mut tmp = [0i64; 16];
    for i in 0usize..4 {
        let a = fetch(block, i) + fetch(block, 8 + i);
        let b = fetch(block, i) - fetch(block, 8 + i);
        let c = ((fetch(block, 4 + i) * CONST2) >> 16)
            - (fetch(block, 12 + i) + ((fetch(block, 12 + i) * CONST1) >> 16));
        let d = (fetch(block, 4 + i) + ((fetch(block, 4 + i) * CONST1) >> 16))
            + ((fetch(block, 12 + i) * CONST2) >> 16);

        tmp[4 * i] = a + d;
        tmp[4 * i + 1] = b + c;
        tmp[4 * i + 2] = b - c;
        tmp[4 * i + 3] = a - d;
    }

    for i in 0usize..4 {
        let dc = tmp[i] + 4;
        let a = dc + tmp[8 + i];
        let b = dc - tmp[8 + i];
        let c = ((tmp[4 + i] * CONST2) >> 16) - (tmp[12 + i] + ((tmp[12 + i] * CONST1) >> 16));
        let d = (tmp[4 + i] + ((tmp[4 + i] * CONST1) >> 16)) + ((tmp[12 + i] * CONST2) >> 16);

        block[4 * i] = ((a + d) >> 3) as i32;
        block[4 * i + 1] = ((b + c) >> 3) as i32;
        block[4 * i + 2] = ((b - c) >> 3) as i32;
        block[4 * i + 3] = ((a - d) >> 3) as i32;
    }
}

/// Forward Walsh-Hadamard transform of the sixteen luma DC coefficients.
///
/// `dc[n]` is the DC term of sub-block `n` (raster order).
pub fn fwht4x4(dc: &[i32; 16]) -> [i32; 16] {
    let mut tmp = [0i32; 16];
    for (row, out) in dc.chunks_exact(4).zip(tmp.chunks_exact_mut(4)) {
        let a0 = row[0] + row[2];
        let a1 = row[1] + row[3];
        let a2 = row[1] - row[3];
        let a3 = row[0] - row[2];
        out[0] = a0 + a1;
        out[1] = a3 + a2;
        out[2] = a3 - a2;
        out[3] = a0 - a1;
    }

    let mut out = [0i32; 16];
    for i in 0..4 {
        let a0 = tmp[i] + tmp[8 + i];
        let a1 = tmp[4 + i] + tmp[12 + i];
        let a2 = tmp[4 + i] - tmp[12 + i];
        let a3 = tmp[i] - tmp[8 + i];
        out[i] = (a0 + a1) >> 1;
        out[4 + i] = (a3 + a2) >> 1;
        out[8 + i] = (a3 - a2) >> 1;
        out[12 + i] = (a0 - a1) >> 1;
    }
    out
}

/// Inverse Walsh-Hadamard transform. On return `block[n]` is the DC term
/// for luma sub-block `n`.
pub fn iwht4x4(block: &mut [i32; 16]) {
    for i in 0usize..4 {
        let a1 = block[i] + block[12 + i];
        let b1 = block[4 + i] + block[8 + i];
        let c1 = block[4 + i] - block[8 + i];
        let d1 = block[i] - block[12 + i];

        block[i] = a1 + b1;
        block[4 + i] = c1 + d1;
        block[8 + i] = a1 - b1;
        block[12 + i] = d1 - c1;
    }

    for row in block.chunks_exact_mut(4) {
        let dc = row[0] + 3;
        let a = dc + row[3];
        let b = row[1] + row[2];
        let c = row[1] - row[2];
        let d = dc - row[3];

        row[0] = (a + b) >> 3;
        row[1] = (d + c) >> 3;
        row[2] = (a - b) >> 3;
        row[3] = (d - c) >> 3;
    }
}

/// Add an inverse-transformed residual onto a 4x4 prediction, saturating
/// to `[0, 255]`.
#[inline]
pub fn add_residue(
    pred: &[u8],
    pred_stride: usize,
    residue: &[i32; 16],
    dst: &mut [u8],
    dst_stride: usize,
) {
    for y in 0..4 {
        let p = &pred[y * pred_stride..][..4];
        let d = &mut dst[y * dst_stride..][..4];
        for x in 0..4 {
            d[x] = (i32::from(p[x]) + residue[y * 4 + x]).clamp(0, 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dct_inverse() {
        const BLOCK: [i32; 16] = [
            38, 6, 210, 107, 42, 125, 185, 151, 241, 224, 125, 233, 227, 8, 57, 96,
        ];

        let mut dct_block = BLOCK;

        dct4x4(&mut dct_block);

        let mut inverse_dct_block = dct_block;

        idct4x4(&mut inverse_dct_block);

        assert_eq!(BLOCK, inverse_dct_block);
    }

    #[test]
    fn zero_residual_leaves_only_rounding_bias() {
        // The rounding terms leave at most a unit in the AC positions, which
        // every quantizer's zero threshold absorbs.
        let mut block = [0i32; 16];
        dct4x4(&mut block);
        assert_eq!(block[0], 0);
        assert!(block.iter().all(|c| c.abs() <= 1), "{block:?}");

        let mut zero = [0i32; 16];
        idct4x4(&mut zero);
        assert_eq!(zero, [0; 16]);
    }

    #[test]
    fn flat_residual_is_dc_dominated() {
        let mut block = [-20i32; 16];
        dct4x4(&mut block);
        assert_eq!(block[0], -160);
        assert!(block[1..].iter().all(|c| c.abs() <= 1), "{block:?}");
    }

    #[test]
    fn wht_roundtrip_is_close() {
        #[rustfmt::skip]
        let dc: [i32; 16] = [
            120, -40,   8,   0,
             64,  12, -99,  17,
              3,   3,   3,   3,
            -250, 200, 31, -7,
        ];
        let mut coeffs = fwht4x4(&dc);
        iwht4x4(&mut coeffs);
        for (a, b) in dc.iter().zip(coeffs.iter()) {
            assert!((a - b).abs() <= 1, "{dc:?} vs {coeffs:?}");
        }
    }

    #[test]
    fn wht_of_constant_has_single_coefficient() {
        let out = fwht4x4(&[10; 16]);
        assert_eq!(out[0], 80);
        assert!(out[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn add_residue_saturates() {
        let pred = [250u8; 16];
        let mut res = [0i32; 16];
        res[0] = 100;
        res[1] = -300;
        let mut out = [0u8; 16];
        add_residue(&pred, 4, &res, &mut out, 4);
        assert_eq!(out[0], 255);
        assert_eq!(out[1], 0);
        assert_eq!(out[2], 250);
    }
}
