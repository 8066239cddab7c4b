//! Single-resolution correlator.

use crate::correlate::{CorrelationConfig, DisparityTile, TiledView, ZoneMatcher};
use crate::disparity::DisparityMap;
use crate::geom::{BBox, Vec2};
use crate::image::{ImageView, OwnedImage};
use crate::prefilter::PreFilter;
use crate::trace::{trace_event, trace_span};
use crate::util::{StereoCorrError, StereoCorrResult};

/// Exhaustive matcher over the full search region at base resolution.
///
/// Both images are pre-filtered once when the correlator is created.
#[derive(Clone, Debug)]
pub struct FlatCorrelator {
    left: OwnedImage,
    right: OwnedImage,
    config: CorrelationConfig,
    matcher: ZoneMatcher,
}

impl FlatCorrelator {
    /// Validates `config` and pre-filters both images.
    ///
    /// Takes the same arguments as [`PyramidCorrelator::new`]; the filter is
    /// applied here and not kept.
    ///
    /// [`PyramidCorrelator::new`]: crate::PyramidCorrelator::new
    pub fn new<F: PreFilter>(
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        prefilter: F,
        config: CorrelationConfig,
    ) -> StereoCorrResult<Self> {
        config.validate()?;
        Ok(Self {
            left: prefilter.filter(left)?,
            right: prefilter.filter(right)?,
            matcher: ZoneMatcher::new(&config),
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Computes the disparity of `bbox` (left-image pixel coordinates).
    pub fn correlate(&self, bbox: BBox) -> StereoCorrResult<DisparityMap> {
        if bbox.is_empty() {
            return Err(StereoCorrError::InvalidDimensions {
                width: bbox.width().max(0) as usize,
                height: bbox.height().max(0) as usize,
            });
        }
        let _span = trace_span!(
            "flat_correlate",
            x = bbox.min.x,
            y = bbox.min.y,
            width = bbox.width(),
            height = bbox.height()
        )
        .entered();

        let search = self.config.search_region;
        let window = BBox::new(search.min, search.max + Vec2::splat(1));
        let result = self.matcher.match_region(
            self.left.view(),
            self.right.view(),
            bbox,
            window,
            true,
        )?;
        trace_event!(
            "flat_result",
            valid = result.disparity.valid_count(),
            rejected = result.rejected
        );
        Ok(result.disparity)
    }
}

impl TiledView for FlatCorrelator {
    fn cols(&self) -> usize {
        self.left.width()
    }

    fn rows(&self) -> usize {
        self.left.height()
    }

    fn compute_tile(&self, bbox: BBox) -> StereoCorrResult<DisparityTile> {
        Ok(DisparityTile {
            bbox,
            disparity: self.correlate(bbox)?,
        })
    }
}
