//! Exhaustive block matching over a rectangular search volume.
//!
//! Every displacement `d` in `[0, volume)` is scored for every output pixel
//! and the best one per pixel wins. Ties keep the displacement with the
//! smallest row-major index, so sequential and parallel scans agree exactly.

use crate::cost::{AbsoluteCost, CostFunction, CostMetric, NccCost, SquaredCost};
use crate::disparity::{DisparityMap, MaskedDisparity};
use crate::geom::Vec2;
use crate::image::ImageView;
use crate::util::{StereoCorrError, StereoCorrResult};

#[cfg(feature = "rayon")]
use crate::kernel::rayon::best_of_search_par;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Block-matching parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchParams {
    /// Kernel (window) size in pixels.
    pub kernel: Vec2,
    /// Number of displacements along each axis.
    pub search_volume: Vec2,
}

/// Validated geometry shared by the scalar and parallel scans.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SearchLayout {
    pub(crate) out_width: usize,
    pub(crate) out_height: usize,
    pub(crate) volume: Vec2,
}

impl SearchLayout {
    pub(crate) fn new(
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        params: SearchParams,
    ) -> StereoCorrResult<Self> {
        let SearchParams {
            kernel,
            search_volume: volume,
        } = params;
        if kernel.x <= 0 || kernel.y <= 0 {
            return Err(StereoCorrError::InvalidKernel {
                width: kernel.x,
                height: kernel.y,
            });
        }
        if volume.x <= 0 || volume.y <= 0 {
            return Err(StereoCorrError::EmptySearchRegion);
        }
        let (kw, kh) = (kernel.x as usize, kernel.y as usize);
        if left.width() < kw || left.height() < kh {
            return Err(StereoCorrError::InvalidInput(
                "left image smaller than the kernel",
            ));
        }
        if right.width() < left.width() + volume.x as usize - 1
            || right.height() < left.height() + volume.y as usize - 1
        {
            return Err(StereoCorrError::InvalidInput(
                "right image does not cover the search volume",
            ));
        }
        Ok(Self {
            out_width: left.width() + 1 - kw,
            out_height: left.height() + 1 - kh,
            volume,
        })
    }

    pub(crate) fn out_len(&self) -> usize {
        self.out_width * self.out_height
    }

    pub(crate) fn candidates(&self) -> u32 {
        (self.volume.x * self.volume.y) as u32
    }

    pub(crate) fn displacement(&self, index: u32) -> Vec2 {
        let idx = index as i32;
        Vec2::new(idx % self.volume.x, idx / self.volume.x)
    }

    /// Right-image window aligned with displacement `index`.
    pub(crate) fn shifted<'a>(
        &self,
        left: ImageView<'_, f32>,
        right: ImageView<'a, f32>,
        index: u32,
    ) -> StereoCorrResult<ImageView<'a, f32>> {
        let d = self.displacement(index);
        right.roi(d.x as usize, d.y as usize, left.width(), left.height())
    }
}

/// Per-pixel best score and displacement index.
#[derive(Clone, Debug)]
pub(crate) struct BestMatches {
    scores: Vec<f32>,
    index: Vec<u32>,
}

impl BestMatches {
    pub(crate) const NO_MATCH: u32 = u32::MAX;

    pub(crate) fn new(len: usize) -> Self {
        Self {
            scores: vec![f32::NAN; len],
            index: vec![Self::NO_MATCH; len],
        }
    }

    /// Folds the scores of displacement `index` into the running best.
    pub(crate) fn update<C: CostFunction + ?Sized>(
        &mut self,
        cost: &C,
        index: u32,
        scores: &[f32],
    ) {
        for ((best, idx), &s) in self.scores.iter_mut().zip(&mut self.index).zip(scores) {
            if !s.is_finite() {
                continue;
            }
            if *idx == Self::NO_MATCH || cost.is_better(s, *best) {
                *best = s;
                *idx = index;
            }
        }
    }

    /// Combines two partial results; ties resolve to the smaller index.
    pub(crate) fn merge<C: CostFunction + ?Sized>(mut self, other: Self, cost: &C) -> Self {
        for ((best, idx), (&s, &i)) in self
            .scores
            .iter_mut()
            .zip(&mut self.index)
            .zip(other.scores.iter().zip(&other.index))
        {
            if i == Self::NO_MATCH {
                continue;
            }
            let take = *idx == Self::NO_MATCH
                || cost.is_better(s, *best)
                || (!cost.is_better(*best, s) && i < *idx);
            if take {
                *best = s;
                *idx = i;
            }
        }
        self
    }

    pub(crate) fn into_map(self, layout: &SearchLayout) -> StereoCorrResult<DisparityMap> {
        let data = self
            .index
            .iter()
            .map(|&i| {
                if i == Self::NO_MATCH {
                    MaskedDisparity::invalid()
                } else {
                    MaskedDisparity::valid(layout.displacement(i))
                }
            })
            .collect();
        DisparityMap::from_vec(data, layout.out_width, layout.out_height)
    }
}

/// Runs the block matcher for `metric`.
///
/// `left` must be at least `kernel` in size and `right` must extend `left` by
/// `search_volume - 1` along each axis. The result is
/// `left.size() - kernel + 1` pixels with displacements in `[0, volume)`.
/// Pixels without any finite score are invalid.
pub fn best_of_search(
    metric: CostMetric,
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    params: SearchParams,
    parallel: bool,
) -> StereoCorrResult<DisparityMap> {
    match metric {
        CostMetric::AbsoluteDifference => dispatch(&AbsoluteCost, left, right, params, parallel),
        CostMetric::SquaredDifference => dispatch(&SquaredCost, left, right, params, parallel),
        CostMetric::CrossCorrelation => dispatch(&NccCost, left, right, params, parallel),
    }
}

fn dispatch<C: CostFunction>(
    cost: &C,
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    params: SearchParams,
    parallel: bool,
) -> StereoCorrResult<DisparityMap> {
    #[cfg(feature = "rayon")]
    if parallel {
        return best_of_search_par(cost, left, right, params);
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    scalar::best_of_search_seq(cost, left, right, params)
}

#[cfg(test)]
mod tests {
    use super::{best_of_search, SearchParams};
    use crate::cost::CostMetric;
    use crate::geom::Vec2;
    use crate::image::ImageView;
    use crate::util::StereoCorrError;

    fn texture(width: usize, height: usize) -> Vec<f32> {
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                ((x * 31 + y * 17 + x * y * 7) % 53) as f32
            })
            .collect()
    }

    #[test]
    fn recovers_a_known_offset() {
        let (rw, rh) = (20, 18);
        let right = texture(rw, rh);
        let right_view = ImageView::from_slice(&right, rw, rh).unwrap();
        let left_view = right_view.roi(3, 2, 12, 10).unwrap();
        let params = SearchParams {
            kernel: Vec2::new(3, 3),
            search_volume: Vec2::new(9, 9),
        };
        for metric in [
            CostMetric::AbsoluteDifference,
            CostMetric::SquaredDifference,
            CostMetric::CrossCorrelation,
        ] {
            let map = best_of_search(metric, left_view, right_view, params, false).unwrap();
            assert_eq!((map.width(), map.height()), (10, 8));
            for px in map.pixels() {
                assert_eq!(px.get(), Some(Vec2::new(3, 2)), "{metric:?}");
            }
        }
    }

    #[test]
    fn ties_prefer_the_first_displacement() {
        let flat = vec![1.0f32; 64];
        let view = ImageView::from_slice(&flat, 8, 8).unwrap();
        let left = view.roi(0, 0, 5, 5).unwrap();
        let params = SearchParams {
            kernel: Vec2::new(3, 3),
            search_volume: Vec2::new(4, 4),
        };
        let map =
            best_of_search(CostMetric::AbsoluteDifference, left, view, params, false).unwrap();
        assert!(map.pixels().iter().all(|px| px.get() == Some(Vec2::new(0, 0))));
    }

    #[test]
    fn flat_windows_are_invalid_under_ncc() {
        let flat = vec![3.0f32; 64];
        let view = ImageView::from_slice(&flat, 8, 8).unwrap();
        let left = view.roi(0, 0, 5, 5).unwrap();
        let params = SearchParams {
            kernel: Vec2::new(3, 3),
            search_volume: Vec2::new(2, 2),
        };
        let map = best_of_search(CostMetric::CrossCorrelation, left, view, params, false).unwrap();
        assert_eq!(map.valid_count(), 0);
    }

    #[test]
    fn rejects_short_right_images() {
        let data = texture(8, 8);
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let left = view.roi(0, 0, 6, 6).unwrap();
        let params = SearchParams {
            kernel: Vec2::new(3, 3),
            search_volume: Vec2::new(4, 1),
        };
        let err = best_of_search(CostMetric::AbsoluteDifference, left, view, params, false);
        assert!(matches!(err, Err(StereoCorrError::InvalidInput(_))));
        let empty = SearchParams {
            search_volume: Vec2::new(0, 1),
            ..params
        };
        let err = best_of_search(CostMetric::AbsoluteDifference, left, view, empty, false);
        assert_eq!(err, Err(StereoCorrError::EmptySearchRegion));
    }
}
