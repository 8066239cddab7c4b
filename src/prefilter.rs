//! Image pre-filters applied before cost evaluation.
//!
//! A pre-filter maps an image to a same-sized, pre-processed image. The flat
//! correlator filters each source image once; the pyramid correlator filters
//! every pyramid level independently after the level has been built.

use crate::image::filter::{gaussian_taps, separable_convolve};
use crate::image::{ImageView, OwnedImage};
use crate::util::StereoCorrResult;

/// Image-to-image transform applied before matching.
pub trait PreFilter: Sync {
    /// Returns the filtered image; output size equals input size.
    fn filter(&self, image: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage>;
}

/// Identity filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFilter;

impl PreFilter for NullFilter {
    fn filter(&self, image: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
        OwnedImage::from_view(image)
    }
}

/// Subtracts a Gaussian-blurred copy, removing slow brightness changes.
#[derive(Clone, Copy, Debug)]
pub struct SubtractedMean {
    /// Standard deviation of the blur, in pixels.
    pub sigma: f32,
}

impl PreFilter for SubtractedMean {
    fn filter(&self, image: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
        let taps = gaussian_taps(self.sigma)?;
        let blurred = separable_convolve(image, &taps)?;
        let mut out = OwnedImage::from_view(image)?;
        for (v, &b) in out.data_mut().iter_mut().zip(blurred.data()) {
            *v -= b;
        }
        Ok(out)
    }
}

/// Gaussian blur followed by the 5-point Laplacian.
#[derive(Clone, Copy, Debug)]
pub struct LaplacianOfGaussian {
    /// Standard deviation of the blur, in pixels.
    pub sigma: f32,
}

impl PreFilter for LaplacianOfGaussian {
    fn filter(&self, image: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
        let taps = gaussian_taps(self.sigma)?;
        let blurred = separable_convolve(image, &taps)?;
        let width = blurred.width();
        let height = blurred.height();
        let at = |x: isize, y: isize| {
            let cx = x.clamp(0, width as isize - 1) as usize;
            let cy = y.clamp(0, height as isize - 1) as usize;
            blurred.at(cx, cy)
        };
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height as isize {
            for x in 0..width as isize {
                let around = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1);
                data.push(around - 4.0 * at(x, y));
            }
        }
        OwnedImage::new(data, width, height)
    }
}

/// Adapts a closure into a [`PreFilter`].
#[derive(Clone, Copy, Debug)]
pub struct FnFilter<F>(pub F);

impl<F> FnFilter<F>
where
    F: Fn(ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> + Sync,
{
    /// Wraps `f`, pinning down the closure signature for inference.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PreFilter for FnFilter<F>
where
    F: Fn(ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> + Sync,
{
    fn filter(&self, image: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
        (self.0)(image)
    }
}

impl<T: PreFilter + ?Sized> PreFilter for &T {
    fn filter(&self, image: ImageView<'_, f32>) -> StereoCorrResult<OwnedImage> {
        (**self).filter(image)
    }
}
