//! StereoCorr computes dense disparity maps between rectified stereo pairs.
//!
//! Two correlators share one matching step: [`FlatCorrelator`] searches the
//! whole displacement range at full resolution, while [`PyramidCorrelator`]
//! works coarse-to-fine and narrows the search per zone as resolution
//! increases. Both implement [`TiledView`], so [`rasterize`] can compute a
//! full image tile by tile, optionally in parallel with the `rayon` feature.
//!
//! ```no_run
//! use stereocorr::{BBox, CorrelationConfig, NullFilter, OwnedImage, PyramidCorrelator, Vec2};
//!
//! # fn main() -> stereocorr::StereoCorrResult<()> {
//! let left = OwnedImage::filled(128, 128, 0.0)?;
//! let right = OwnedImage::filled(128, 128, 0.0)?;
//! let search = BBox::new(Vec2::new(-16, -4), Vec2::new(16, 4));
//! let config = CorrelationConfig::new(search, Vec2::new(7, 7));
//! let correlator = PyramidCorrelator::new(left.view(), right.view(), NullFilter, config)?;
//! let disparity = stereocorr::rasterize(&correlator, Vec2::new(64, 64), false)?;
//! println!("{} valid pixels", disparity.valid_count());
//! # Ok(())
//! # }
//! ```

pub mod consistency;
pub mod correlate;
pub mod cost;
pub mod disparity;
pub mod geom;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod prefilter;
pub mod raster;
mod trace;
pub mod util;

pub use consistency::ConsistencyDistance;
pub use correlate::flat::FlatCorrelator;
pub use correlate::pyramid::PyramidCorrelator;
pub use correlate::{CorrelationConfig, DisparityTile, TiledView};
pub use cost::CostMetric;
pub use disparity::{DisparityMap, MaskedDisparity};
pub use geom::{BBox, Vec2};
pub use image::pyramid::ImagePyramid;
pub use image::{ImageView, OwnedImage};
pub use prefilter::{FnFilter, LaplacianOfGaussian, NullFilter, PreFilter, SubtractedMean};
pub use raster::rasterize;
pub use util::{StereoCorrError, StereoCorrResult};
