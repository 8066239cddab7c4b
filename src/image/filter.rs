//! Separable filtering, window sums and subsampling.
//!
//! All convolutions replicate border samples, so the output has the same size
//! as the input. Window sums are "valid" sums: the output shrinks by
//! `kernel - 1` along each axis.

use crate::image::{ImageView, OwnedImage};
use crate::util::{StereoCorrError, StereoCorrResult};

/// Normalized 5-tap binomial filter `[1, 4, 6, 4, 1] / 16`.
pub const BINOMIAL_5TAP: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Applies the same 1D `taps` along rows then columns.
///
/// `taps` must have odd length; the centre tap is aligned with the output
/// sample.
pub fn separable_convolve(src: ImageView<'_, f32>, taps: &[f32]) -> StereoCorrResult<OwnedImage> {
    if taps.is_empty() || taps.len() % 2 == 0 {
        return Err(StereoCorrError::InvalidInput(
            "separable filter taps must have odd length",
        ));
    }
    let width = src.width();
    let height = src.height();
    let radius = (taps.len() / 2) as isize;
    let clamp_x = |x: isize| x.clamp(0, width as isize - 1) as usize;
    let clamp_y = |y: isize| y.clamp(0, height as isize - 1) as usize;

    let mut horiz = vec![0.0f32; width * height];
    for y in 0..height {
        let row = src
            .row(y)
            .ok_or(StereoCorrError::InvalidInput("row outside view"))?;
        let out = &mut horiz[y * width..(y + 1) * width];
        for (x, dst) in out.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                acc += tap * row[clamp_x(x as isize + k as isize - radius)];
            }
            *dst = acc;
        }
    }

    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        let dst = &mut out[y * width..(y + 1) * width];
        for (k, &tap) in taps.iter().enumerate() {
            let sy = clamp_y(y as isize + k as isize - radius);
            let src_row = &horiz[sy * width..(sy + 1) * width];
            for (d, &s) in dst.iter_mut().zip(src_row) {
                *d += tap * s;
            }
        }
    }
    OwnedImage::new(out, width, height)
}

/// Keeps every second sample along both axes, starting at `(0, 0)`.
///
/// Output size is `ceil(width / 2) x ceil(height / 2)`.
pub fn subsample2(src: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
    let width = src.width().div_ceil(2);
    let height = src.height().div_ceil(2);
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = src
            .row(2 * y)
            .ok_or(StereoCorrError::InvalidInput("row outside view"))?;
        data.extend(row.iter().step_by(2).copied());
    }
    OwnedImage::new(data, width, height)
}

/// Smooths with the binomial kernel and subsamples by two.
pub fn downsample_binomial(src: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
    let smoothed = separable_convolve(src, &BINOMIAL_5TAP)?;
    subsample2(smoothed.view())
}

/// Normalized Gaussian taps with radius `ceil(3 * sigma)`.
pub fn gaussian_taps(sigma: f32) -> StereoCorrResult<Vec<f32>> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(StereoCorrError::InvalidInput("gaussian sigma must be positive"));
    }
    let radius = (3.0 * sigma).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for tap in &mut taps {
        *tap /= sum;
    }
    Ok(taps)
}

/// Sums every `kernel_w x kernel_h` window of a row-major buffer.
///
/// `out` receives `(width - kernel_w + 1) * (height - kernel_h + 1)` sums in
/// row-major order; `scratch` holds the horizontal pass. Each sum is
/// accumulated directly (no running differences), so identical windows give
/// identical sums regardless of position.
pub(crate) fn window_sums(
    src: &[f32],
    width: usize,
    height: usize,
    kernel_w: usize,
    kernel_h: usize,
    scratch: &mut Vec<f32>,
    out: &mut Vec<f32>,
) {
    let out_w = width + 1 - kernel_w;
    let out_h = height + 1 - kernel_h;

    scratch.clear();
    scratch.resize(out_w * height, 0.0);
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        let dst = &mut scratch[y * out_w..(y + 1) * out_w];
        for (x, d) in dst.iter_mut().enumerate() {
            *d = row[x..x + kernel_w].iter().sum();
        }
    }

    out.clear();
    out.resize(out_w * out_h, 0.0);
    for y in 0..out_h {
        let dst = &mut out[y * out_w..(y + 1) * out_w];
        for ky in 0..kernel_h {
            let src_row = &scratch[(y + ky) * out_w..(y + ky + 1) * out_w];
            for (d, &s) in dst.iter_mut().zip(src_row) {
                *d += s;
            }
        }
    }
}
