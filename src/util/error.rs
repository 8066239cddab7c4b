//! Error types for stereocorr.

use thiserror::Error;

/// Result alias for stereocorr operations.
pub type StereoCorrResult<T> = std::result::Result<T, StereoCorrError>;

/// Errors that can occur when running stereocorr algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StereoCorrError {
    /// Width or height is zero, or the buffer size overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too short for the requested layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested ROI does not fit inside the image.
    #[error(
        "roi ({x}, {y}, {width}x{height}) out of bounds for image {img_width}x{img_height}"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Kernel dimensions must be odd and positive.
    #[error("invalid kernel size {width}x{height}: dimensions must be odd and positive")]
    InvalidKernel { width: i32, height: i32 },
    /// The search region or a zone window has no displacement to evaluate.
    #[error("search region is empty or inverted")]
    EmptySearchRegion,
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A computed tile does not match the requested size.
    #[error(
        "tile size mismatch: requested {expected_width}x{expected_height}, produced {width}x{height}"
    )]
    TileSizeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// Operation exists only to satisfy an interface and must not be called.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    /// Image decoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}
