//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{StereoCorrError, StereoCorrResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> StereoCorrResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned `f32` image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> StereoCorrResult<OwnedImage> {
    OwnedImage::from_u8(view_from_gray_image(img)?)
}

/// Loads an image from disk and converts it to a grayscale `f32` image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> StereoCorrResult<OwnedImage> {
    let img = image::open(path).map_err(|err| StereoCorrError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}
