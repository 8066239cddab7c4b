//! Image views, owned buffers and the crop primitives used by the correlators.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Correlation works on `f32` samples; `OwnedImage` is the contiguous `f32`
//! buffer produced by crops, filters and pyramid levels.

use crate::geom::{BBox, Vec2};
use crate::util::{StereoCorrError, StereoCorrResult};

pub mod filter;
#[cfg(feature = "image-io")]
pub mod io;
pub mod pyramid;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> StereoCorrResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> StereoCorrResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(StereoCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the image size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as i32, self.height as i32)
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> StereoCorrResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(StereoCorrError::InvalidDimensions { width, height });
        }
        let out_of_bounds = StereoCorrError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or(out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or(out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self
            .data
            .get(start..)
            .ok_or(StereoCorrError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;
        ImageView::new(data, width, height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> StereoCorrResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoCorrError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(StereoCorrError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(StereoCorrError::InvalidDimensions { width, height })
}

/// Owned contiguous single-channel `f32` image.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> StereoCorrResult<Self> {
        if width == 0 || height == 0 {
            return Err(StereoCorrError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(StereoCorrError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(StereoCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(StereoCorrError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image filled with `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> StereoCorrResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(StereoCorrError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Converts an 8-bit grayscale view into `f32` samples.
    pub fn from_u8(view: ImageView<'_, u8>) -> StereoCorrResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for y in 0..view.height() {
            let row = view.row(y).ok_or(StereoCorrError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: 0,
            })?;
            data.extend(row.iter().map(|&v| f32::from(v)));
        }
        Self::new(data, view.width(), view.height())
    }

    /// Copies an `f32` view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, f32>) -> StereoCorrResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for y in 0..view.height() {
            let row = view.row(y).ok_or(StereoCorrError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: 0,
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height())
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the row-major samples mutably.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the sample at `(x, y)`.
    ///
    /// # Panics
    /// Panics when the coordinates are out of bounds.
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

/// Copies `region` out of `src`, replicating border samples outside the image.
///
/// The region is expressed in `src` pixel coordinates and may extend past
/// any edge; the output always has exactly `region.size()` samples.
pub fn crop_edge_extended(src: ImageView<'_, f32>, region: BBox) -> StereoCorrResult<OwnedImage> {
    if region.is_empty() {
        return Err(StereoCorrError::InvalidDimensions {
            width: region.width().max(0) as usize,
            height: region.height().max(0) as usize,
        });
    }
    let width = region.width() as usize;
    let height = region.height() as usize;
    let max_x = src.width() as i64 - 1;
    let max_y = src.height() as i64 - 1;

    let col_index: Vec<usize> = (region.min.x..region.max.x)
        .map(|x| i64::from(x).clamp(0, max_x) as usize)
        .collect();

    let mut data = Vec::with_capacity(width * height);
    for y in region.min.y..region.max.y {
        let sy = i64::from(y).clamp(0, max_y) as usize;
        let row = src.row(sy).ok_or(StereoCorrError::BufferTooSmall {
            needed: (sy + 1) * src.stride(),
            got: 0,
        })?;
        data.extend(col_index.iter().map(|&sx| row[sx]));
    }
    OwnedImage::new(data, width, height)
}

#[cfg(test)]
mod tests {
    use super::{crop_edge_extended, ImageView, OwnedImage};
    use crate::geom::BBox;

    #[test]
    fn crop_inside_copies_samples() {
        let data: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let crop = crop_edge_extended(view, BBox::from_xywh(1, 1, 2, 2)).unwrap();
        assert_eq!(crop.data(), &[5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn crop_outside_replicates_edges() {
        let data: Vec<f32> = (0..4).map(|v| v as f32).collect();
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let crop = crop_edge_extended(view, BBox::from_xywh(-1, -1, 4, 4)).unwrap();
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 4);
        assert_eq!(
            crop.data(),
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 2.0, 2.0, 3.0, 3.0]
        );
    }

    #[test]
    fn from_u8_widens_samples() {
        let data = [0u8, 128, 255, 7];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let img = OwnedImage::from_u8(view).unwrap();
        assert_eq!(img.data(), &[0.0, 128.0, 255.0, 7.0]);
        assert_eq!(img.at(1, 1), 7.0);
    }
}
