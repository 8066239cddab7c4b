//! Masked displacement pixels and dense disparity maps.

use crate::geom::{BBox, Vec2};
use crate::util::{StereoCorrError, StereoCorrResult};

/// Integer displacement plus a validity flag.
///
/// Invalid pixels carry no usable displacement; their `disparity` field is
/// meaningless and must not be read without checking `valid`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaskedDisparity {
    /// Displacement from the left pixel to its right-image match.
    pub disparity: Vec2,
    /// Whether a reliable match exists.
    pub valid: bool,
}

impl MaskedDisparity {
    /// A valid pixel carrying `disparity`.
    pub const fn valid(disparity: Vec2) -> Self {
        Self {
            disparity,
            valid: true,
        }
    }

    /// An invalid pixel.
    pub const fn invalid() -> Self {
        Self {
            disparity: Vec2::new(0, 0),
            valid: false,
        }
    }

    /// Returns the displacement when the pixel is valid.
    pub fn get(&self) -> Option<Vec2> {
        self.valid.then_some(self.disparity)
    }
}

/// Dense row-major grid of masked displacements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisparityMap {
    data: Vec<MaskedDisparity>,
    width: usize,
    height: usize,
}

impl DisparityMap {
    /// Creates a map with every pixel invalid.
    pub fn new_invalid(width: usize, height: usize) -> Self {
        Self {
            data: vec![MaskedDisparity::invalid(); width * height],
            width,
            height,
        }
    }

    /// Wraps a row-major pixel buffer.
    pub fn from_vec(
        data: Vec<MaskedDisparity>,
        width: usize,
        height: usize,
    ) -> StereoCorrResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(StereoCorrError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(StereoCorrError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the map width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the map height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the map size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as i32, self.height as i32)
    }

    /// Box covering the whole map in local coordinates.
    pub fn bounding_box(&self) -> BBox {
        BBox::from_size(self.size())
    }

    /// Returns the row-major pixels.
    pub fn pixels(&self) -> &[MaskedDisparity] {
        &self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<MaskedDisparity> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns the pixel at signed coordinates, `None` outside the map.
    pub fn get_at(&self, p: Vec2) -> Option<MaskedDisparity> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        self.get(p.x as usize, p.y as usize)
    }

    /// Overwrites the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: MaskedDisparity) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Marks the pixel at `(x, y)` invalid.
    pub fn invalidate(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x].valid = false;
        }
    }

    /// Adds `offset` to every valid displacement.
    pub fn offset_valid(&mut self, offset: Vec2) {
        for px in self.data.iter_mut().filter(|px| px.valid) {
            px.disparity += offset;
        }
    }

    /// Number of valid pixels.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|px| px.valid).count()
    }

    /// Copies `src` into this map with its top-left corner at `origin`.
    ///
    /// The destination rectangle must lie inside the map.
    pub fn paste(&mut self, origin: Vec2, src: &DisparityMap) -> StereoCorrResult<()> {
        let target = BBox::new(origin, origin + src.size());
        if !self.bounding_box().contains_box(&target) {
            return Err(StereoCorrError::RoiOutOfBounds {
                x: origin.x.max(0) as usize,
                y: origin.y.max(0) as usize,
                width: src.width,
                height: src.height,
                img_width: self.width,
                img_height: self.height,
            });
        }
        let x0 = origin.x as usize;
        for y in 0..src.height {
            let dst_start = (origin.y as usize + y) * self.width + x0;
            self.data[dst_start..dst_start + src.width]
                .copy_from_slice(&src.data[y * src.width..(y + 1) * src.width]);
        }
        Ok(())
    }

    /// Tight window of valid displacements inside `region`.
    ///
    /// The window spans `[min, max + 1)` so it can be used directly as a
    /// half-open search window. Returns `None` when `region` holds no valid
    /// pixel. The region is clipped to the map.
    pub fn observed_window(&self, region: BBox) -> Option<BBox> {
        let clipped = region.intersection(&self.bounding_box())?;
        let mut lo = Vec2::splat(i32::MAX);
        let mut hi = Vec2::splat(i32::MIN);
        let mut any = false;
        for y in clipped.min.y..clipped.max.y {
            let start = y as usize * self.width;
            let row = &self.data[start + clipped.min.x as usize..start + clipped.max.x as usize];
            for px in row.iter().filter(|px| px.valid) {
                lo = lo.min(px.disparity);
                hi = hi.max(px.disparity);
                any = true;
            }
        }
        any.then(|| BBox::new(lo, hi + Vec2::splat(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::{DisparityMap, MaskedDisparity};
    use crate::geom::{BBox, Vec2};

    #[test]
    fn observed_window_spans_valid_values() {
        let mut map = DisparityMap::new_invalid(4, 4);
        map.set(0, 0, MaskedDisparity::valid(Vec2::new(2, -1)));
        map.set(3, 3, MaskedDisparity::valid(Vec2::new(-3, 4)));
        map.set(1, 1, MaskedDisparity::invalid());
        let window = map.observed_window(map.bounding_box()).unwrap();
        assert_eq!(window, BBox::new(Vec2::new(-3, -1), Vec2::new(3, 5)));
        assert_eq!(map.observed_window(BBox::from_xywh(1, 1, 2, 2)), None);
    }

    #[test]
    fn offset_skips_invalid_pixels() {
        let mut map = DisparityMap::new_invalid(2, 1);
        map.set(0, 0, MaskedDisparity::valid(Vec2::new(1, 1)));
        map.offset_valid(Vec2::new(-5, 2));
        assert_eq!(map.get(0, 0).unwrap().get(), Some(Vec2::new(-4, 3)));
        assert_eq!(map.get(1, 0).unwrap(), MaskedDisparity::invalid());
    }

    #[test]
    fn paste_checks_bounds() {
        let mut dst = DisparityMap::new_invalid(4, 3);
        let mut src = DisparityMap::new_invalid(2, 2);
        src.set(1, 1, MaskedDisparity::valid(Vec2::new(7, 7)));
        dst.paste(Vec2::new(2, 1), &src).unwrap();
        assert_eq!(dst.get(3, 2).unwrap().get(), Some(Vec2::new(7, 7)));
        assert!(dst.paste(Vec2::new(3, 0), &src).is_err());
    }
}
