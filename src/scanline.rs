//! # Scanline dynamic programming disparity
//!
//! Each row is matched independently. For a row with `n` valid window positions a padded
//! `(n + 1) x (n + 1)` cost matrix is filled, where cell `(i + 1, j + 1)` is the cheapest way of
//! explaining reference positions `0..=i` and target positions `0..=j` using matches (costed by
//! the mean squared window difference) and occlusions (costed by a fixed weight). The choice made
//! at every cell is recorded and the optimal path is decoded backwards from the bottom-right
//! corner into disparities for the reference row.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::{debug, info};
use rayon::prelude::*;

use crate::config::Params;
use crate::disparity::{DisparityAlgorithm, DisparityMap, Progress, RowProgress, StereoFrame};
use crate::error::*;
use crate::patch;

#[cfg(feature = "statistics")]
use plotters::prelude::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct ScanlineDp {
    params: Params,
    progress: Option<Progress>
}

/// Transition chosen at a cell of the cost matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Reference position `i` matches target position `j`.
    Match,

    /// Reference position `i` has no partner in the target row.
    OccludeReference,

    /// Target position `j` has no partner in the reference row.
    OccludeTarget
}

/// Cost and choice matrices for a single row.
///
/// The buffers are sized once for a row length and re-initialised by every call to
/// [`RowCosts::fill`], so one instance can be reused for all rows of an image.
pub struct RowCosts {
    n: usize,
    cost: Vec<f64>,
    choice: Vec<Choice>
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Pick the transition for one cell.
///
/// A match must be strictly cheaper than both occlusions. Between the occlusions the reference
/// one must be strictly cheaper, so every tie resolves to [`Choice::OccludeTarget`].
pub fn decide(match_cost: f64, occlude_reference: f64, occlude_target: f64) -> (Choice, f64) {
    if match_cost < occlude_reference && match_cost < occlude_target {
        (Choice::Match, match_cost)
    }
    else if occlude_reference < occlude_target {
        (Choice::OccludeReference, occlude_reference)
    }
    else {
        (Choice::OccludeTarget, occlude_target)
    }
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl RowCosts {
    /// Allocate matrices for rows with `n` window positions.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cost: vec![0.0; (n + 1) * (n + 1)],
            choice: vec![Choice::OccludeTarget; n * n]
        }
    }

    /// Number of window positions in a row.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Value of the padded cost matrix. Row and column 0 are the boundary.
    pub fn cost(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row <= self.n && col <= self.n);
        self.cost[row * (self.n + 1) + col]
    }

    /// Transition chosen for reference position `i` and target position `j`.
    pub fn choice(&self, i: usize, j: usize) -> Choice {
        debug_assert!(i < self.n && j < self.n);
        self.choice[i * self.n + j]
    }

    fn set(&mut self, i: usize, j: usize, choice: Choice, cost: f64) {
        self.cost[(i + 1) * (self.n + 1) + j + 1] = cost;
        self.choice[i * self.n + j] = choice;
    }

    /// Boundary entry `k` of the first row and column costs `(k - 1) * weight`, with the corner
    /// at zero.
    fn reset_boundary(&mut self, weight: f64) {
        let stride = self.n + 1;

        self.cost[0] = 0.0;
        for k in 1..stride {
            let val = (k - 1) as f64 * weight;
            self.cost[k] = val;
            self.cost[k * stride] = val;
        }
    }

    /// Fill both matrices for the row of windows whose top edge is image row `top`.
    pub fn fill(&mut self, frame: &StereoFrame, window_size: usize, top: usize, weight: f64) {
        debug_assert_eq!(self.n, frame.width() as usize + 1 - window_size);

        self.reset_boundary(weight);

        let num_elements_in_window = (window_size * window_size) as f64;

        for i in 0..self.n {
            for j in 0..self.n {
                let occlude_reference = self.cost(i, j + 1) + weight;
                let occlude_target = self.cost(i + 1, j) + weight;
                let ssd = patch::ssd_at(&frame.left, &frame.right, window_size, top, i, j);
                let match_cost = self.cost(i, j) + ssd as f64 / num_elements_in_window;

                let (choice, cost) = decide(match_cost, occlude_reference, occlude_target);
                self.set(i, j, choice, cost);
            }
        }
    }

    /// Walk the optimal path back from the last positions and write the reference row's
    /// disparities into `out`, which must hold `n` zeroed cells.
    ///
    /// Matched positions get `|i - j| * scale`. Occluded reference positions copy the value of
    /// their right neighbour, except the last position which keeps its zero.
    pub fn decode(&self, scale: f64, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.n);

        let n = self.n as isize;
        let mut i = n - 1;
        let mut j = n - 1;

        while i >= 0 && j >= 0 {
            let (iu, ju) = (i as usize, j as usize);

            match self.choice(iu, ju) {
                Choice::Match => {
                    out[iu] = ((i - j).abs() as f64 * scale) as f32;
                    i -= 1;
                    j -= 1;
                }
                Choice::OccludeReference => {
                    if i != n - 1 {
                        out[iu] = out[iu + 1];
                    }
                    i -= 1;
                }
                Choice::OccludeTarget => {
                    j -= 1;
                }
            }
        }

        // Target row exhausted, the remaining reference positions inherit from the right
        while i >= 0 {
            let iu = i as usize;
            out[iu] = out.get(iu + 1).copied().unwrap_or(0.0);
            i -= 1;
        }
    }
}

impl ScanlineDp {
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

    fn match_row(&self, frame: &StereoFrame, costs: &mut RowCosts, top: usize, row: &mut [f32]) {
        costs.fill(frame, self.params.window_size, top, self.params.occlusion_weight);
        costs.decode(self.params.scale, row);
    }
}

impl DisparityAlgorithm for ScanlineDp {
    /// Compute the disparity map for the given frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap> {
        self.params.validate(frame)?;

        debug!("Computing scanline DP disparity with following parameters: {:?}", self.params);

        let (width, height) = self.params.output_dimensions(frame);
        let mut disp_map = DisparityMap::new(width, height);
        let progress = RowProgress::new("scanline dp", height, self.progress.as_ref());
        let this = &*self;

        if self.params.parallel {
            disp_map
                .as_mut_slice()
                .par_chunks_mut(width)
                .enumerate()
                .for_each_init(
                    || RowCosts::new(width),
                    |costs, (top, row)| {
                        this.match_row(frame, costs, top, row);
                        progress.row_done();
                    }
                );
        }
        else {
            let mut costs = RowCosts::new(width);

            for (top, row) in disp_map.as_mut_slice().chunks_mut(width).enumerate() {
                this.match_row(frame, &mut costs, top, row);
                progress.row_done();
            }
        }

        disp_map.update_range();

        info!(
            "Scanline DP disparity complete: {}x{}, range {:?}..{:?}",
            width, height, disp_map.min_disp, disp_map.max_disp
        );

        // ---- PLOTTING ----
        #[cfg(feature = "statistics")]
        plot_row_means(&disp_map)?;

        Ok(disp_map)
    }
}

#[cfg(feature = "statistics")]
fn plot_row_means(disp_map: &DisparityMap) -> Result<()> {
    std::fs::create_dir_all("plots/scanline_dp")?;

    let means: Vec<(usize, f32)> = (0..disp_map.height())
        .map(|y| {
            let row = disp_map.row(y);
            (y, row.iter().sum::<f32>() / row.len() as f32)
        })
        .collect();
    let max_mean = means.iter().map(|&(_, m)| m).fold(1.0f32, f32::max);

    let area = BitMapBackend::new("plots/scanline_dp/row_mean.png", (800, 600))
        .into_drawing_area();
    area.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&area)
        .caption("Mean disparity per row", ("sans-serif", 20).into_font())
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_ranged(0..disp_map.height(), 0f32..max_mean)
        .map_err(plot_err)?;

    chart.configure_mesh().draw().map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(means, &RED))
        .map_err(plot_err)?
        .label("Mean disparity")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    debug!("Row mean plot written");

    Ok(())
}

#[cfg(feature = "statistics")]
fn plot_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Statistics(format!("{:?}", e))
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
