//! # Naive block matching
//!
//! Brute force baseline: every window in the reference image is compared against every window
//! on the same row of the target image, and the shift with the smallest SSD wins. No disparity
//! range is assumed, so both positive and negative shifts are searched.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::{debug, info};
use rayon::prelude::*;

use crate::config::Params;
use crate::disparity::{DisparityAlgorithm, DisparityMap, Progress, RowProgress, StereoFrame};
use crate::error::*;
use crate::patch;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct BlockMatcher {
    params: Params,
    progress: Option<Progress>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl BlockMatcher {
    /// Create a new instance of the algorithm with the given parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            progress: None
        }
    }

    /// Report the completion percentage to `callback` after every row.
    pub fn with_progress(mut self, callback: Progress) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Signed shift of the best matching target window for the reference window centred on
    /// `(col, row)`.
    ///
    /// Shifts are scanned from the most negative feasible one upwards and only a strictly
    /// smaller SSD replaces the current best, so ties go to the first shift scanned.
    fn best_shift(&self, frame: &StereoFrame, row: usize, col: usize) -> isize {
        let window_size = self.params.window_size;
        let half = window_size / 2;
        let last_centre = frame.width() as usize - window_size + half;

        let mut min_ssd = u64::MAX;
        let mut disparity = 0isize;

        for target_col in half..=last_centre {
            let ssd = patch::ssd(&frame.left, &frame.right, window_size, row, col, target_col);

            if ssd < min_ssd {
                min_ssd = ssd;
                disparity = target_col as isize - col as isize;
            }
        }

        disparity
    }

    /// Fill one output row.
    fn match_row(&self, frame: &StereoFrame, top: usize, row: &mut [f32]) {
        let scale = self.params.scale;
        let half = self.params.window_size / 2;

        for (left, cell) in row.iter_mut().enumerate() {
            let d = self.best_shift(frame, top + half, left + half);
            *cell = (d.abs() as f64 * scale) as f32;
        }
    }
}

impl DisparityAlgorithm for BlockMatcher {
    /// Compute the disparity map for the given frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap> {
        self.params.validate(frame)?;

        debug!("Computing naive disparity with following parameters: {:?}", self.params);

        let (width, height) = self.params.output_dimensions(frame);
        let mut disp_map = DisparityMap::new(width, height);
        let progress = RowProgress::new("naive", height, self.progress.as_ref());

        let this = &*self;

        // Output row `top` holds the windows centred on image row `top + window_size / 2`
        if self.params.parallel {
            disp_map
                .as_mut_slice()
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(top, row)| {
                    this.match_row(frame, top, row);
                    progress.row_done();
                });
        }
        else {
            for (top, row) in disp_map.as_mut_slice().chunks_mut(width).enumerate() {
                this.match_row(frame, top, row);
                progress.row_done();
            }
        }

        disp_map.update_range();

        info!(
            "Naive disparity complete: {}x{}, range {:?}..{:?}",
            width, height, disp_map.min_disp, disp_map.max_disp
        );

        Ok(disp_map)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn params(window_size: usize) -> Params {
        Params {
            window_size,
            ..Params::default()
        }
    }

    #[test]
    fn ties_go_to_most_negative_shift() {
        // Flat images match equally everywhere, so the first window scanned wins
        let frame = StereoFrame::new(
            GrayImage::from_pixel(6, 3, Luma([9])),
            GrayImage::from_pixel(6, 3, Luma([9]))
        ).unwrap();

        let map = BlockMatcher::new(params(3)).compute(&frame).unwrap();

        assert_eq!(map.row(0), &[0.0f32, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn searches_positive_and_negative_shifts() {
        let mut left = GrayImage::new(7, 1);
        let mut right = GrayImage::new(7, 1);
        left.put_pixel(1, 0, Luma([200]));
        right.put_pixel(5, 0, Luma([200]));

        let map = BlockMatcher::new(params(1)).compute(&StereoFrame::new(left, right).unwrap())
            .unwrap();

        // Pixel 1 finds its partner four columns to the right
        assert_eq!(map.get(1, 0), 4.0);
        // Pixel 5 is dark and its first dark partner is column 0
        assert_eq!(map.get(5, 0), 5.0);
    }

    #[test]
    fn even_window_output_follows_top_left_corner() {
        let left = GrayImage::from_fn(6, 2, |x, _| Luma([if (1..3).contains(&x) { 200 } else { 0 }]));
        let right = GrayImage::from_fn(6, 2, |x, _| Luma([if (3..5).contains(&x) { 200 } else { 0 }]));

        let map = BlockMatcher::new(params(2)).compute(&StereoFrame::new(left, right).unwrap())
            .unwrap();

        assert_eq!(map.width(), 5);
        assert_eq!(map.get(0, 0), 2.0);
        assert_eq!(map.get(1, 0), 2.0);
    }

    #[test]
    fn scale_multiplies_magnitude() {
        let left = GrayImage::from_fn(5, 1, |x, _| Luma([(x * 40) as u8]));
        let right = GrayImage::from_fn(5, 1, |x, _| Luma([((x + 1).min(4) * 40) as u8]));
        let frame = StereoFrame::new(left, right).unwrap();

        let map = BlockMatcher::new(Params { window_size: 1, scale: 2.5, ..Params::default() })
            .compute(&frame)
            .unwrap();

        assert_eq!(map.get(2, 0), 2.5);
        assert_eq!(map.max_disp, Some(2.5));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let frame = StereoFrame::new(GrayImage::new(4, 4), GrayImage::new(4, 4)).unwrap();
        assert!(BlockMatcher::new(params(0)).compute(&frame).is_err());
        assert!(BlockMatcher::new(params(5)).compute(&frame).is_err());
    }
}
