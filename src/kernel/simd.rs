//! SIMD row operations using the `wide` crate.
//!
//! Same contracts as the scalar row operations; eight samples are processed
//! per step and the tail falls back to scalar code. Results are bitwise
//! identical to the scalar versions since each lane does the same IEEE
//! operations.

use crate::kernel::scalar;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn apply_row(
    a: &[f32],
    b: &[f32],
    out: &mut [f32],
    lanes: impl Fn(f32x8, f32x8) -> f32x8,
    tail: fn(&[f32], &[f32], &mut [f32]),
) {
    let n = out.len().min(a.len()).min(b.len());
    let simd_end = n / LANES * LANES;
    let mut i = 0;
    while i < simd_end {
        let v = lanes(load_f32x8(&a[i..]), load_f32x8(&b[i..]));
        out[i..i + LANES].copy_from_slice(&v.to_array());
        i += LANES;
    }
    tail(&a[simd_end..n], &b[simd_end..n], &mut out[simd_end..n]);
}

pub(crate) use scalar::copy_row;

#[inline]
pub(crate) fn abs_diff_row(a: &[f32], b: &[f32], out: &mut [f32]) {
    apply_row(a, b, out, |x, y| (x - y).abs(), scalar::abs_diff_row);
}

#[inline]
pub(crate) fn sq_diff_row(a: &[f32], b: &[f32], out: &mut [f32]) {
    apply_row(
        a,
        b,
        out,
        |x, y| {
            let d = x - y;
            d * d
        },
        scalar::sq_diff_row,
    );
}

#[inline]
pub(crate) fn mul_row(a: &[f32], b: &[f32], out: &mut [f32]) {
    apply_row(a, b, out, |x, y| x * y, scalar::mul_row);
}

#[cfg(test)]
mod tests {
    use super::{abs_diff_row, mul_row, sq_diff_row};
    use crate::kernel::scalar;

    #[test]
    fn simd_rows_match_scalar_rows() {
        let a: Vec<f32> = (0..21).map(|i| (i as f32 * 1.7).sin() * 40.0).collect();
        let b: Vec<f32> = (0..21).map(|i| (i as f32 * 0.3).cos() * 25.0).collect();
        let mut fast = vec![0.0f32; 21];
        let mut slow = vec![0.0f32; 21];

        abs_diff_row(&a, &b, &mut fast);
        scalar::abs_diff_row(&a, &b, &mut slow);
        assert_eq!(fast, slow);

        sq_diff_row(&a, &b, &mut fast);
        scalar::sq_diff_row(&a, &b, &mut slow);
        assert_eq!(fast, slow);

        mul_row(&a, &b, &mut fast);
        scalar::mul_row(&a, &b, &mut slow);
        assert_eq!(fast, slow);
    }

    #[test]
    fn short_rows_use_the_scalar_tail() {
        let a = [3.0f32, -1.5, 8.0];
        let b = [1.0f32, 2.5, 8.0];
        let mut out = [0.0f32; 3];
        abs_diff_row(&a, &b, &mut out);
        assert_eq!(out, [2.0, 4.0, 0.0]);
        sq_diff_row(&a, &b, &mut out);
        assert_eq!(out, [4.0, 16.0, 0.0]);
        mul_row(&a, &b, &mut out);
        assert_eq!(out, [3.0, -3.75, 64.0]);
        super::copy_row(&a, &b, &mut out);
        assert_eq!(out, a);
    }
}
