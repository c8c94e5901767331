//! # Scanline Stereo
//!
//! This crate provides dense disparity estimation for rectified stereo pairs, with a brute force
//! block matcher and a per-scanline dynamic programming matcher that models occlusions, plus
//! reconstruction of a point cloud from the resulting disparity map.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod block;
pub mod config;
mod disparity;
mod error;
pub mod patch;
pub mod reconstruction;
pub mod scanline;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::config::{Camera, Config, Params, SaturationPolicy};
    pub use crate::disparity::{DisparityAlgorithm, DisparityMap, Progress, StereoFrame};
}
