//! Pixel-domain and spectral distortion measures.
//!
//! - [`sse`]: sum of squared differences over any block footprint
//! - [`t_transform`]: weighted 4x4 Hadamard energy
//! - [`tdisto_4x4`], [`tdisto_16x16`]: spectral distortion (TDisto)

/// Sum of squared errors between two equally sized blocks.
#[inline]
pub fn sse(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

/// Hadamard transform for a 4x4 block, weighted by w[].
/// Returns the sum of |transformed_coeff| * weight.
///
/// # Arguments
/// * `input` - 4x4 block of pixels (accessed with given stride)
/// * `stride` - Row stride of input buffer
/// * `w` - 16 weights for frequency weighting
pub fn t_transform(input: &[u8], stride: usize, w: &[u16; 16]) -> i32 {
    let mut tmp = [0i32; 16];

    for (i, out) in tmp.chunks_exact_mut(4).enumerate() {
        let row = &input[i * stride..][..4];
        let a0 = i32::from(row[0]) + i32::from(row[2]);
        let a1 = i32::from(row[1]) + i32::from(row[3]);
        let a2 = i32::from(row[1]) - i32::from(row[3]);
        let a3 = i32::from(row[0]) - i32::from(row[2]);
        out[0] = a0 + a1;
        out[1] = a3 + a2;
        out[2] = a3 - a2;
        out[3] = a0 - a1;
    }

    let mut sum = 0i32;
    for i in 0..4 {
        let a0 = tmp[i] + tmp[8 + i];
        let a1 = tmp[4 + i] + tmp[12 + i];
        let a2 = tmp[4 + i] - tmp[12 + i];
        let a3 = tmp[i] - tmp[8 + i];

        sum += i32::from(w[i]) * (a0 + a1).abs();
        sum += i32::from(w[4 + i]) * (a3 + a2).abs();
        sum += i32::from(w[8 + i]) * (a3 - a2).abs();
        sum += i32::from(w[12 + i]) * (a0 - a1).abs();
    }
    sum
}

/// Spectral distortion between two 4x4 blocks sharing a stride:
/// `|T(b) - T(a)| >> 5`.
#[inline]
pub fn tdisto_4x4(a: &[u8], b: &[u8], stride: usize, w: &[u16; 16]) -> i32 {
    let sum1 = t_transform(a, stride, w);
    let sum2 = t_transform(b, stride, w);
    (sum2 - sum1).abs() >> 5
}

/// Spectral distortion of a 16x16 block, summed over its sixteen 4x4
/// sub-blocks.
pub fn tdisto_16x16(a: &[u8], b: &[u8], stride: usize, w: &[u16; 16]) -> i32 {
    let mut d = 0i32;
    for y in 0..4 {
        for x in 0..4 {
            let offset = y * 4 * stride + x * 4;
            d += tdisto_4x4(&a[offset..], &b[offset..], stride, w);
        }
    }
    d
}
