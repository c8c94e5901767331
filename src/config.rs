//! # Configuration
//!
//! Parameters for the matching algorithms, the camera used for reconstruction, and the output
//! encoding policy. Everything here can be deserialised, so a whole run can be described by a
//! single JSON file.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use serde::Deserialize;

use crate::disparity::StereoFrame;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Matching parameters shared by both disparity algorithms.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Side length of the square correlation window.
    pub window_size: usize,

    /// Cost of leaving a single position unmatched. Only used by the scanline DP matcher.
    #[serde(default = "default_occlusion_weight")]
    pub occlusion_weight: f64,

    /// Factor applied to every disparity magnitude before it is stored.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Distribute rows over the rayon thread pool.
    #[serde(default)]
    pub parallel: bool
}

/// Rectified stereo camera geometry used to project disparities into 3D.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub focal_length: f64,
    pub baseline: f64,

    /// Disparity removed from the images by cropping, added back before projection.
    pub dmin: i32
}

/// What to do with disparities that do not fit in an 8-bit output sample.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaturationPolicy {
    /// Clamp to `[0, 255]`.
    Clamp,

    /// Fail with [`Error::Saturated`].
    Reject
}

/// A full run description.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub camera: Camera,

    #[serde(default)]
    pub saturation: SaturationPolicy
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Params {
    /// Check the parameters against a frame, failing on anything that would make the
    /// algorithms read outside the images or produce meaningless costs.
    pub fn validate(&self, frame: &StereoFrame) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::ZeroWindowSize);
        }

        if self.window_size > frame.width() as usize || self.window_size > frame.height() as usize {
            return Err(Error::WindowTooLarge {
                window_size: self.window_size,
                width: frame.width(),
                height: frame.height()
            });
        }

        if !self.occlusion_weight.is_finite() || self.occlusion_weight < 0.0 {
            return Err(Error::InvalidOcclusionWeight(self.occlusion_weight));
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidScale(self.scale));
        }

        Ok(())
    }

    /// Dimensions `(width, height)` of the disparity map produced for a frame.
    ///
    /// Only meaningful once [`Params::validate`] has accepted the frame.
    pub(crate) fn output_dimensions(&self, frame: &StereoFrame) -> (usize, usize) {
        (
            frame.width() as usize - self.window_size + 1,
            frame.height() as usize - self.window_size + 1
        )
    }
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;

        Ok(config)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            window_size: 5,
            occlusion_weight: default_occlusion_weight(),
            scale: default_scale(),
            parallel: false
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            focal_length: 3740.0,
            baseline: 160.0,
            dmin: 67
        }
    }
}

impl Default for SaturationPolicy {
    fn default() -> Self {
        SaturationPolicy::Clamp
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            params: Params::default(),
            camera: Camera::default(),
            saturation: SaturationPolicy::default()
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn default_occlusion_weight() -> f64 {
    500.0
}

fn default_scale() -> f64 {
    1.0
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
