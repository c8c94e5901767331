//! Worked 10x10 scenarios with window size 3 and occlusion weight 20.
//!
//! Every image row is identical, so every output row must equal the worked row.

use image::{GrayImage, Luma};
use scanline_stereo::{
    block::BlockMatcher,
    prelude::*,
    scanline::{Choice, RowCosts, ScanlineDp}
};

// -----------------------------------------------------------------------------------------------
// HELPERS
// -----------------------------------------------------------------------------------------------

fn column_varying(row: &[u8; 10]) -> GrayImage {
    GrayImage::from_fn(10, 10, |x, _| Luma([row[x as usize]]))
}

fn params() -> Params {
    Params {
        window_size: 3,
        occlusion_weight: 20.0,
        scale: 1.0,
        parallel: false
    }
}

fn assert_costs(costs: &RowCosts, expected: &[[f64; 9]; 9]) {
    for (r, row) in expected.iter().enumerate() {
        for (c, &e) in row.iter().enumerate() {
            assert_eq!(costs.cost(r, c), e, "cost mismatch at ({}, {})", r, c);
        }
    }
}

fn assert_path(costs: &RowCosts, path: &[(usize, usize, Choice)]) {
    for &(i, j, choice) in path {
        assert_eq!(costs.choice(i, j), choice, "choice mismatch at ({}, {})", i, j);
    }
}

// -----------------------------------------------------------------------------------------------
// SCENARIOS
// -----------------------------------------------------------------------------------------------

/// Target is the reference shifted left by two with the last column replicated.
#[test]
fn uniform_shift_of_two() {
    let reference = [10, 40, 80, 120, 160, 200, 240, 200, 120, 60];
    let target = [80, 120, 160, 200, 240, 200, 120, 60, 60, 60];
    let frame = StereoFrame::new(column_varying(&reference), column_varying(&target)).unwrap();

    let mut costs = RowCosts::new(8);
    costs.fill(&frame, 3, 0, 20.0);

    assert_costs(&costs, &[
        [0.0, 0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0],
        [0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0],
        [20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0],
        [40.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0],
        [60.0, 40.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0],
        [80.0, 60.0, 40.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0],
        [100.0, 80.0, 60.0, 40.0, 20.0, 40.0, 60.0, 80.0, 100.0],
        [120.0, 100.0, 80.0, 60.0, 40.0, 20.0, 40.0, 60.0, 80.0],
        [140.0, 120.0, 100.0, 80.0, 60.0, 40.0, 20.0, 40.0, 60.0]
    ]);

    assert_path(&costs, &[
        (7, 7, Choice::OccludeTarget),
        (7, 6, Choice::OccludeTarget),
        (7, 5, Choice::Match),
        (6, 4, Choice::Match),
        (5, 3, Choice::Match),
        (4, 2, Choice::Match),
        (3, 1, Choice::Match),
        (2, 0, Choice::Match)
    ]);

    let mut row = vec![0.0f32; 8];
    costs.decode(1.0, &mut row);
    assert_eq!(row, vec![2.0f32; 8]);

    let dp = ScanlineDp::new(params()).compute(&frame).unwrap();
    assert_eq!((dp.width(), dp.height()), (8, 8));
    for y in 0..8 {
        assert_eq!(dp.row(y), &[2.0f32; 8][..]);
    }

    let naive = BlockMatcher::new(params()).compute(&frame).unwrap();
    for y in 0..8 {
        assert_eq!(naive.row(y), &[7.0f32, 6.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0][..]);
    }
}

/// The reference contains a patch with no partner in the target, forcing reference occlusions.
#[test]
fn occluded_reference_patch() {
    let reference = [12, 200, 35, 90, 240, 18, 150, 77, 210, 5];
    let target = [90, 240, 18, 150, 77, 77, 210, 5, 130, 60];
    let frame = StereoFrame::new(column_varying(&reference), column_varying(&target)).unwrap();

    let mut costs = RowCosts::new(8);
    costs.fill(&frame, 3, 3, 20.0);

    assert_costs(&costs, &[
        [0.0, 0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0],
        [0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0],
        [20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0],
        [40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0],
        [60.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0],
        [80.0, 60.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0],
        [100.0, 80.0, 60.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0],
        [120.0, 100.0, 80.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0],
        [140.0, 120.0, 100.0, 80.0, 100.0, 120.0, 100.0, 120.0, 140.0]
    ]);

    assert_path(&costs, &[
        (7, 7, Choice::OccludeTarget),
        (7, 6, Choice::OccludeTarget),
        (7, 5, Choice::Match),
        (6, 4, Choice::OccludeTarget),
        (6, 3, Choice::OccludeTarget),
        (6, 2, Choice::OccludeReference),
        (5, 2, Choice::Match),
        (4, 1, Choice::Match),
        (3, 0, Choice::Match)
    ]);

    let expected: [f32; 8] = [3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 2.0, 2.0];

    let mut row = vec![0.0f32; 8];
    costs.decode(1.0, &mut row);
    assert_eq!(row, expected.to_vec());

    let dp = ScanlineDp::new(params()).compute(&frame).unwrap();
    for y in 0..8 {
        assert_eq!(dp.row(y), &expected[..]);
    }
    assert_eq!(dp.min_disp, Some(2.0));
    assert_eq!(dp.max_disp, Some(3.0));

    let naive = BlockMatcher::new(params()).compute(&frame).unwrap();
    assert_eq!(naive.row(4), &[2.0f32, 5.0, 2.0, 3.0, 3.0, 3.0, 2.0, 2.0][..]);
}

/// Scaled DP output propagates the scaled value across occlusions.
#[test]
fn scale_applies_before_propagation() {
    let reference = [12, 200, 35, 90, 240, 18, 150, 77, 210, 5];
    let target = [90, 240, 18, 150, 77, 77, 210, 5, 130, 60];
    let frame = StereoFrame::new(column_varying(&reference), column_varying(&target)).unwrap();

    let dp = ScanlineDp::new(Params { scale: 4.0, ..params() }).compute(&frame).unwrap();
    assert_eq!(dp.row(0), &[12.0f32, 12.0, 12.0, 12.0, 12.0, 12.0, 8.0, 8.0][..]);

    let camera = Camera {
        focal_length: 100.0,
        baseline: 10.0,
        dmin: 0
    };
    let points = scanline_stereo::reconstruction::project(&dp, &camera, 4.0);
    assert_eq!(points.len(), 64);
    assert_eq!(points[0].z, 10.0 * 100.0 / 3.0);
}
