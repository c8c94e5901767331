//! # General disparity objects
//!
//! This module provides generic disparity traits and structures for use by different algorithms.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::GrayImage;
use log::trace;

use crate::config::SaturationPolicy;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Callback receiving the completion percentage of a running algorithm.
pub type Progress = Box<dyn Fn(f32) + Send + Sync>;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A rectified pair of grayscale images with identical dimensions.
pub struct StereoFrame {
    pub left: GrayImage,
    pub right: GrayImage
}

/// A generic floating point disparity map.
///
/// Stored values are disparity magnitudes already multiplied by the algorithm's scale. Cells
/// default to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DisparityMap {
    data: Vec<f32>,
    width: usize,
    height: usize,
    pub max_disp: Option<f32>,
    pub min_disp: Option<f32>
}

/// Shared progress bookkeeping for row based algorithms.
pub(crate) struct RowProgress<'a> {
    name: &'static str,
    total: usize,
    done: AtomicUsize,
    callback: Option<&'a Progress>
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity map of the given stereo frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl StereoFrame {
    /// Pair two images, rejecting them if their dimensions differ.
    pub fn new(left: GrayImage, right: GrayImage) -> Result<Self> {
        if left.dimensions() != right.dimensions() {
            return Err(Error::DimensionMismatch(
                left.width(),
                left.height(),
                right.width(),
                right.height()
            ));
        }

        Ok(Self { left, right })
    }

    /// Load both images from disk, converting them to grayscale.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(left: P, right: Q) -> Result<Self> {
        let left = image::open(left)?.to_luma8();
        let right = image::open(right)?.to_luma8();

        Self::new(left, right)
    }

    pub fn width(&self) -> u32 {
        self.left.width()
    }

    pub fn height(&self) -> u32 {
        self.left.height()
    }
}

impl DisparityMap {
    pub fn new(width: usize, height: usize) -> Self {
        DisparityMap {
            data: vec![0.0; width * height],
            width,
            height,
            min_disp: None,
            max_disp: None
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn put(&mut self, x: usize, y: usize, val: f32) {
        self.data[y * self.width + x] = val
    }

    /// A single row of the map.
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// All cells in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Record the smallest and largest stored values in `min_disp` and `max_disp`.
    pub(crate) fn update_range(&mut self) {
        let mut iter = self.data.iter().copied();

        if let Some(first) = iter.next() {
            let (min, max) = iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
            self.min_disp = Some(min);
            self.max_disp = Some(max);
        }
    }

    /// Converts the map into a Luma8 image, clamping values outside `[0, 255]`.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let val = self.get(x as usize, y as usize).max(0.0).min(255.0);
            image::Luma([val as u8])
        })
    }

    /// Converts the map into a Luma8 image, failing on the first value that does not fit.
    pub fn try_to_luma(&self) -> Result<GrayImage> {
        if let Some(idx) = self.data.iter().position(|&v| !(0.0..=255.0).contains(&v)) {
            return Err(Error::Saturated {
                x: idx % self.width,
                y: idx / self.width,
                value: self.data[idx]
            });
        }

        Ok(self.to_luma())
    }

    /// Converts the map into a Luma8 image following the given saturation policy.
    pub fn encode(&self, policy: SaturationPolicy) -> Result<GrayImage> {
        match policy {
            SaturationPolicy::Clamp => Ok(self.to_luma()),
            SaturationPolicy::Reject => self.try_to_luma()
        }
    }

    /// Converts the image to a normalised GrayImage.
    ///
    /// Normalises by the maximum observed disparity in the map. If the maximum disparity is not
    /// set, or is zero, then the function is equivalent to `.to_luma()`.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let mult = match self.max_disp {
            Some(d) if d > 0.0 => 255.0 / d,
            _ => 1.0
        };

        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let val = (self.get(x as usize, y as usize) * mult).max(0.0).min(255.0);
            image::Luma([val as u8])
        })
    }

    /// Encode the map and write it to disk, the format being chosen from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P, policy: SaturationPolicy) -> Result<()> {
        self.encode(policy)?.save(path)?;
        Ok(())
    }
}

impl<'a> RowProgress<'a> {
    pub fn new(name: &'static str, total: usize, callback: Option<&'a Progress>) -> Self {
        Self {
            name,
            total,
            done: AtomicUsize::new(0),
            callback
        }
    }

    /// Mark one more row as complete.
    pub fn row_done(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let percent = 100.0 * done as f32 / self.total.max(1) as f32;

        trace!("{}: {}/{} rows ({:.0}%)", self.name, done, self.total, percent);

        if let Some(cb) = self.callback {
            cb(percent);
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
