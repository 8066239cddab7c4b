//! Low-level building blocks for custom correlation pipelines.
//!
//! These expose the block matcher, cost strategies, zone subdivision and the
//! image primitives the correlators are built from. Most users should prefer
//! [`FlatCorrelator`](crate::FlatCorrelator),
//! [`PyramidCorrelator`](crate::PyramidCorrelator) and
//! [`rasterize`](crate::rasterize).

pub use crate::consistency::{cross_corr_consistency_check, ConsistencyCheck};
pub use crate::correlate::subdivide::{
    quadrants, subdivide_regions, Zone, MIN_SPLIT_AREA, MIN_SPLIT_SIDE, SPLIT_GAIN,
};
pub use crate::cost::{AbsoluteCost, CostFunction, CostScratch, NccCost, NccPlan, SquaredCost};
pub use crate::image::filter::{
    downsample_binomial, gaussian_taps, separable_convolve, subsample2, BINOMIAL_5TAP,
};
pub use crate::image::crop_edge_extended;
pub use crate::kernel::scalar::best_of_search_seq;
pub use crate::kernel::{best_of_search, SearchParams};
pub use crate::raster::tile_grid;

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::best_of_search_par;
