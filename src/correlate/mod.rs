//! Correlators: configuration, the per-zone matching step and the tiled
//! view contract shared by the flat and pyramid correlators.
//!
//! Displacements are reported in global units: a valid pixel `d` at left
//! position `p` means the left pixel `p` matches the right pixel `p + d`,
//! with `search_region.min <= d <= search_region.max` on both axes.

use crate::consistency::{ConsistencyCheck, ConsistencyDistance};
use crate::cost::CostMetric;
use crate::disparity::{DisparityMap, MaskedDisparity};
use crate::geom::{BBox, Vec2};
use crate::image::{crop_edge_extended, ImageView};
use crate::kernel::{best_of_search, SearchParams};
use crate::util::{StereoCorrError, StereoCorrResult};

pub mod flat;
pub mod pyramid;
pub mod subdivide;

/// Immutable correlation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrelationConfig {
    /// Allowed displacements; both corners are inclusive.
    pub search_region: BBox,
    /// Matching window size; both components must be odd and positive.
    pub kernel_size: Vec2,
    /// Patch cost metric.
    pub cost: CostMetric,
    /// Round-trip tolerance; negative disables the consistency check.
    pub consistency_threshold: f32,
    /// Distance used by the consistency check.
    pub consistency_distance: ConsistencyDistance,
    /// Use rayon for block matching and zones when the feature is enabled.
    pub parallel: bool,
}

impl CorrelationConfig {
    /// Creates a configuration with absolute-difference cost and no
    /// consistency check.
    pub fn new(search_region: BBox, kernel_size: Vec2) -> Self {
        Self {
            search_region,
            kernel_size,
            cost: CostMetric::default(),
            consistency_threshold: -1.0,
            consistency_distance: ConsistencyDistance::default(),
            parallel: false,
        }
    }

    /// Validates kernel and search region.
    pub fn validate(&self) -> StereoCorrResult<()> {
        let k = self.kernel_size;
        if k.x <= 0 || k.y <= 0 || k.x % 2 == 0 || k.y % 2 == 0 {
            return Err(StereoCorrError::InvalidKernel {
                width: k.x,
                height: k.y,
            });
        }
        let s = self.search_region;
        if s.max.x < s.min.x || s.max.y < s.min.y {
            return Err(StereoCorrError::EmptySearchRegion);
        }
        if self.consistency_threshold.is_nan() {
            return Err(StereoCorrError::InvalidInput(
                "consistency threshold must not be NaN",
            ));
        }
        Ok(())
    }

    /// Half the kernel size, rounded down.
    pub fn half_kernel(&self) -> Vec2 {
        self.kernel_size / 2
    }

    /// Distance between the search corners (`max - min`).
    pub fn search_extent(&self) -> Vec2 {
        self.search_region.max - self.search_region.min
    }

    /// The consistency check, when enabled.
    pub fn consistency(&self) -> Option<ConsistencyCheck> {
        ConsistencyCheck::new(self.consistency_threshold, self.consistency_distance)
    }
}

/// A computed disparity tile and the region it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisparityTile {
    /// Region of the output image, in pixel coordinates.
    pub bbox: BBox,
    /// One pixel per `bbox` pixel; `(0, 0)` is `bbox.min`.
    pub disparity: DisparityMap,
}

/// Pull-based disparity producer consumed by the tiled execution engine.
pub trait TiledView: Sync {
    /// Output width in pixels.
    fn cols(&self) -> usize;

    /// Output height in pixels.
    fn rows(&self) -> usize;

    /// Number of planes per pixel.
    fn planes(&self) -> usize {
        1
    }

    /// Computes the disparity for `bbox`.
    fn compute_tile(&self, bbox: BBox) -> StereoCorrResult<DisparityTile>;

    /// Point-wise evaluation is unsupported; always fails.
    fn pixel(&self, _x: usize, _y: usize) -> StereoCorrResult<MaskedDisparity> {
        Err(StereoCorrError::NotImplemented(
            "point-wise disparity evaluation; compute a tile instead",
        ))
    }
}

/// Matching step shared by the correlators.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ZoneMatcher {
    cost: CostMetric,
    kernel: Vec2,
    consistency: Option<ConsistencyCheck>,
    parallel: bool,
}

/// Outcome of matching one region.
#[derive(Debug)]
pub(crate) struct ZoneMatch {
    pub(crate) disparity: DisparityMap,
    pub(crate) rejected: usize,
}

impl ZoneMatcher {
    pub(crate) fn new(config: &CorrelationConfig) -> Self {
        Self {
            cost: config.cost,
            kernel: config.kernel_size,
            consistency: config.consistency(),
            parallel: config.parallel,
        }
    }

    /// Matches `region` of `left` against displacements in `window`.
    ///
    /// `window` is half-open and expressed in the frame where right pixel
    /// `p + d` matches left pixel `p`. The result covers `region` exactly
    /// and holds displacements inside `window`. `check` enables the reverse
    /// match and consistency check when one is configured.
    pub(crate) fn match_region(
        &self,
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        region: BBox,
        window: BBox,
        check: bool,
    ) -> StereoCorrResult<ZoneMatch> {
        let volume = window.size();
        if volume.x <= 0 || volume.y <= 0 {
            return Err(StereoCorrError::EmptySearchRegion);
        }
        let half = self.kernel / 2;
        let one = Vec2::splat(1);

        let left_patch = crop_edge_extended(left, region.expand_by(half))?;
        let right_patch = crop_edge_extended(
            right,
            BBox::new(
                region.min - half + window.min,
                region.max + half + window.max - one,
            ),
        )?;
        let params = SearchParams {
            kernel: self.kernel,
            search_volume: volume,
        };
        let mut disparity = best_of_search(
            self.cost,
            left_patch.view(),
            right_patch.view(),
            params,
            self.parallel,
        )?;

        let mut rejected = 0;
        if let Some(consistency) = self.consistency.filter(|_| check) {
            // Right patch pixel q sits at forward output q; its round trip
            // back to the left image lands in `q - (volume - 1) ..= q`.
            let reach = volume - one;
            let mirrored = crop_edge_extended(
                left,
                BBox::new(region.min - half - reach, region.max + half + reach),
            )?;
            let reverse_params = SearchParams {
                kernel: self.kernel,
                search_volume: volume,
            };
            let mut reverse = best_of_search(
                self.cost,
                right_patch.view(),
                mirrored.view(),
                reverse_params,
                self.parallel,
            )?;
            reverse.offset_valid(-reach);
            rejected = consistency.apply(&mut disparity, &reverse);
        }

        disparity.offset_valid(window.min);
        if disparity.size() != region.size() {
            return Err(StereoCorrError::TileSizeMismatch {
                expected_width: region.width().max(0) as usize,
                expected_height: region.height().max(0) as usize,
                width: disparity.width(),
                height: disparity.height(),
            });
        }
        Ok(ZoneMatch {
            disparity,
            rejected,
        })
    }
}
