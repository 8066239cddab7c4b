//! Image pyramid construction for correlation.
//!
//! Each coarser level is the previous (unfiltered) level smoothed with the
//! 5-tap binomial kernel `[1, 4, 6, 4, 1] / 16` and subsampled by two. The
//! pre-filter is applied to every level independently once the chain is
//! built, so filtering never feeds into downsampling.

use crate::image::filter::downsample_binomial;
use crate::image::{ImageView, OwnedImage};
use crate::prefilter::PreFilter;
use crate::util::StereoCorrResult;

/// Owned image pyramid; level 0 is the base resolution.
#[derive(Clone, Debug)]
pub struct ImagePyramid {
    levels: Vec<OwnedImage>,
}

impl ImagePyramid {
    /// Builds `max_level + 1` unfiltered levels from `base`.
    pub fn build(base: OwnedImage, max_level: usize) -> StereoCorrResult<Self> {
        let mut levels = Vec::with_capacity(max_level + 1);
        levels.push(base);
        for _ in 0..max_level {
            let next = match levels.last() {
                Some(prev) => downsample_binomial(prev.view())?,
                None => break,
            };
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Builds `max_level + 1` levels and pre-filters each one.
    pub fn build_filtered<F: PreFilter + ?Sized>(
        base: OwnedImage,
        max_level: usize,
        prefilter: &F,
    ) -> StereoCorrResult<Self> {
        let raw = Self::build(base, max_level)?;
        let levels = raw
            .levels
            .iter()
            .map(|level| prefilter.filter(level.view()))
            .collect::<StereoCorrResult<Vec<_>>>()?;
        Ok(Self { levels })
    }

    /// Returns all pyramid levels (level 0 is the base resolution).
    pub fn levels(&self) -> &[OwnedImage] {
        &self.levels
    }

    /// Returns the number of levels, including the base.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Returns a view for a specific pyramid level.
    pub fn level(&self, index: usize) -> Option<ImageView<'_, f32>> {
        self.levels.get(index).map(|level| level.view())
    }
}
