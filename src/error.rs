//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the stereo crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Reference image is {0}x{1} but target image is {2}x{3}")]
    DimensionMismatch(u32, u32, u32, u32),

    #[error("Window size must be positive")]
    ZeroWindowSize,

    #[error("Window of size {window_size} does not fit in a {width}x{height} image")]
    WindowTooLarge {
        window_size: usize,
        width: u32,
        height: u32
    },

    #[error("Occlusion weight must be finite and non-negative, got {0}")]
    InvalidOcclusionWeight(f64),

    #[error("Disparity scale must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("Disparity {value} at ({x}, {y}) does not fit in an 8-bit sample")]
    Saturated {
        x: usize,
        y: usize,
        value: f32
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[cfg(feature = "statistics")]
    #[error("Statistics plotting failed: {0}")]
    Statistics(String)
}
