//! Coarse-to-fine pyramid correlator.
//!
//! Each tile builds its own pyramids, matches the coarsest level against the
//! whole (scaled) search region, then walks down one level at a time: the
//! estimate from level `n` is partitioned into zones by
//! [`subdivide_regions`], and each zone is matched at level `n - 1` with its
//! window doubled and widened by one pixel on every side.
//!
//! Inside the loop displacements are local: zero corresponds to
//! `search_region.min`. The global offset is added once, at the end.

use crate::correlate::subdivide::{subdivide_regions, Zone};
use crate::correlate::{CorrelationConfig, DisparityTile, TiledView, ZoneMatch, ZoneMatcher};
use crate::disparity::DisparityMap;
use crate::geom::{BBox, Vec2};
use crate::image::pyramid::ImagePyramid;
use crate::image::{crop_edge_extended, ImageView};
use crate::prefilter::PreFilter;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{floor_log2, max_doublings};
use crate::util::{StereoCorrError, StereoCorrResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Pyramid correlator over borrowed source images.
#[derive(Clone, Debug)]
pub struct PyramidCorrelator<'a, F> {
    left: ImageView<'a, f32>,
    right: ImageView<'a, f32>,
    prefilter: F,
    config: CorrelationConfig,
    matcher: ZoneMatcher,
}

impl<'a, F: PreFilter> PyramidCorrelator<'a, F> {
    /// Validates `config` and wraps the source images.
    pub fn new(
        left: ImageView<'a, f32>,
        right: ImageView<'a, f32>,
        prefilter: F,
        config: CorrelationConfig,
    ) -> StereoCorrResult<Self> {
        config.validate()?;
        Ok(Self {
            left,
            right,
            prefilter,
            matcher: ZoneMatcher::new(&config),
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Deepest level allowed by the search region: `floor(log2(S)) - 1`
    /// for the largest search extent `S`, clamped at zero.
    pub fn max_level_by_search(&self) -> usize {
        let largest = self.config.search_extent().max_elem().max(0) as u64;
        floor_log2(largest).map_or(0, |n| n.saturating_sub(1) as usize)
    }

    /// Deepest level at which the kernel still fits `2^n` times into the
    /// shorter side of `bbox`.
    pub fn max_level_by_tile(&self, bbox: BBox) -> usize {
        let smallest = bbox.size().min_elem().max(0) as u64;
        let largest_kernel = self.config.kernel_size.max_elem().max(0) as u64;
        max_doublings(largest_kernel, smallest).map_or(0, |n| n as usize)
    }

    /// Number of levels above the base used for `bbox`.
    pub fn pyramid_depth(&self, bbox: BBox) -> usize {
        self.max_level_by_search().min(self.max_level_by_tile(bbox))
    }

    /// Computes the disparity of `bbox` (left-image pixel coordinates).
    pub fn correlate(&self, bbox: BBox) -> StereoCorrResult<DisparityMap> {
        if bbox.is_empty() {
            return Err(StereoCorrError::InvalidDimensions {
                width: bbox.width().max(0) as usize,
                height: bbox.height().max(0) as usize,
            });
        }
        let depth = self.pyramid_depth(bbox);
        let _span = trace_span!(
            "pyramid_correlate",
            x = bbox.min.x,
            y = bbox.min.y,
            width = bbox.width(),
            height = bbox.height(),
            depth = depth
        )
        .entered();

        let one = Vec2::splat(1);
        let upscale = 1i32 << depth;
        let half = self.config.half_kernel();
        let search = self.config.search_region;
        let extent = self.config.search_extent();
        let tile = bbox.size();

        let left_region = bbox.expand_by(half * upscale);
        let right_region = BBox::new(
            left_region.min + search.min,
            left_region.max + search.min + extent + Vec2::splat(upscale),
        );
        let left_pyramid = ImagePyramid::build_filtered(
            crop_edge_extended(self.left, left_region)?,
            depth,
            &self.prefilter,
        )?;
        let right_pyramid = ImagePyramid::build_filtered(
            crop_edge_extended(self.right, right_region)?,
            depth,
            &self.prefilter,
        )?;

        let mut zones = vec![Zone::new(
            BBox::from_size(tile / upscale),
            BBox::from_size(extent / upscale + one),
        )];
        let mut disparity = DisparityMap::new_invalid(0, 0);
        for level in (0..=depth).rev() {
            let scale = 1i32 << level;
            let level_size = tile / scale;
            let _level_span =
                trace_span!("pyramid_level", level = level, zones = zones.len()).entered();

            let (left_level, right_level) =
                match (left_pyramid.level(level), right_pyramid.level(level)) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Err(StereoCorrError::InvalidInput("pyramid level missing")),
                };
            let pad = half * (upscale / scale);
            let matches = self.match_zones(left_level, right_level, &zones, pad, level == 0)?;

            disparity = DisparityMap::new_invalid(level_size.x as usize, level_size.y as usize);
            let mut rejected = 0usize;
            for (zone, result) in zones.iter().zip(matches) {
                disparity.paste(zone.region.min, &result.disparity)?;
                rejected += result.rejected;
            }
            trace_event!(
                "pyramid_level_done",
                level = level,
                valid = disparity.valid_count(),
                rejected = rejected
            );

            if level > 0 {
                let finer = scale / 2;
                let next = subdivide_regions(
                    &disparity,
                    disparity.bounding_box(),
                    self.config.kernel_size,
                );
                zones = rescale_zones(
                    next,
                    level_size,
                    tile / finer,
                    BBox::from_size(extent / finer + one),
                );
            }
        }

        if disparity.size() != tile {
            return Err(StereoCorrError::TileSizeMismatch {
                expected_width: tile.x as usize,
                expected_height: tile.y as usize,
                width: disparity.width(),
                height: disparity.height(),
            });
        }
        disparity.offset_valid(search.min);
        Ok(disparity)
    }

    fn match_zones(
        &self,
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        zones: &[Zone],
        pad: Vec2,
        check: bool,
    ) -> StereoCorrResult<Vec<ZoneMatch>> {
        let run = |zone: &Zone| {
            self.matcher
                .match_region(left, right, zone.region + pad, zone.window, check)
        };
        #[cfg(feature = "rayon")]
        if self.config.parallel {
            return zones.par_iter().map(run).collect();
        }
        zones.iter().map(run).collect()
    }
}

/// Maps zones from one level to the next finer one.
///
/// Regions double; regions touching the coarse tile's max edge stretch to
/// the fine tile's edge, which is one pixel further when the fine size is
/// odd. Windows double, widen by one on every side and are clipped to
/// `limit`. Zones whose window is or becomes empty are dropped.
pub(crate) fn rescale_zones(zones: Vec<Zone>, coarse: Vec2, fine: Vec2, limit: BBox) -> Vec<Zone> {
    zones
        .into_iter()
        .filter(|zone| !zone.window.is_empty())
        .filter_map(|zone| {
            let mut region = zone.region * 2;
            if zone.region.max.x == coarse.x {
                region.max.x = fine.x;
            }
            if zone.region.max.y == coarse.y {
                region.max.y = fine.y;
            }
            let window = (zone.window * 2).expand(1).intersection(&limit)?;
            Some(Zone::new(region, window))
        })
        .collect()
}

impl<F: PreFilter> TiledView for PyramidCorrelator<'_, F> {
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

#[cfg(test)]
mod tests {
    use super::{rescale_zones, PyramidCorrelator};
    use crate::correlate::subdivide::Zone;
    use crate::correlate::CorrelationConfig;
    use crate::geom::{BBox, Vec2};
    use crate::image::ImageView;
    use crate::prefilter::NullFilter;

    fn correlator(data: &[f32], search: BBox, kernel: i32) -> PyramidCorrelator<'_, NullFilter> {
        let view = ImageView::from_slice(data, 8, 8).unwrap();
        let config = CorrelationConfig::new(search, Vec2::splat(kernel));
        PyramidCorrelator::new(view, view, NullFilter, config).unwrap()
    }

    #[test]
    fn depth_follows_search_and_tile_limits() {
        let data = vec![0.0f32; 64];
        let wide = correlator(&data, BBox::new(Vec2::splat(-10), Vec2::splat(10)), 7);
        assert_eq!(wide.max_level_by_search(), 3);
        assert_eq!(wide.max_level_by_tile(BBox::from_xywh(0, 0, 64, 64)), 3);
        assert_eq!(wide.max_level_by_tile(BBox::from_xywh(0, 0, 64, 27)), 1);
        assert_eq!(wide.max_level_by_tile(BBox::from_xywh(0, 0, 5, 64)), 0);
        assert_eq!(wide.pyramid_depth(BBox::from_xywh(0, 0, 512, 512)), 3);

        let narrow = correlator(&data, BBox::new(Vec2::new(0, 0), Vec2::new(3, 1)), 3);
        assert_eq!(narrow.max_level_by_search(), 0);
        let point = correlator(&data, BBox::new(Vec2::splat(2), Vec2::splat(2)), 3);
        assert_eq!(point.max_level_by_search(), 0);
    }

    #[test]
    fn rescale_doubles_widens_and_clips() {
        let zones = vec![
            Zone::new(BBox::from_xywh(0, 0, 4, 5), BBox::new(Vec2::new(0, 2), Vec2::new(3, 4))),
            Zone::new(BBox::from_xywh(4, 0, 3, 5), BBox::default()),
        ];
        let out = rescale_zones(
            zones,
            Vec2::new(7, 5),
            Vec2::new(15, 10),
            BBox::from_size(Vec2::new(6, 6)),
        );
        assert_eq!(
            out,
            vec![Zone::new(
                BBox::new(Vec2::new(0, 0), Vec2::new(8, 10)),
                BBox::new(Vec2::new(0, 3), Vec2::new(6, 6)),
            )]
        );
    }
}
