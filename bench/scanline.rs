use criterion::{black_box, criterion_group, criterion_main, Criterion};

use image::{GrayImage, Luma};
use scanline_stereo::{
    block::BlockMatcher,
    prelude::*,
    scanline::ScanlineDp
};

fn synthetic_frame(width: u32, height: u32, shift: u32) -> StereoFrame {
    let pattern = |x: u32, y: u32| Luma([((x * 37 + y * 11) ^ (x * y)) as u8]);

    let left = GrayImage::from_fn(width, height, pattern);
    let right = GrayImage::from_fn(width, height, |x, y| pattern((x + shift).min(width - 1), y));

    StereoFrame::new(left, right).unwrap()
}

fn disparity_bench(c: &mut Criterion) {

    // Build frame
    let frame = synthetic_frame(96, 48, 4);

    let params = Params {
        window_size: 5,
        occlusion_weight: 500.0,
        scale: 1.0,
        parallel: false
    };

    // Build disparity algs
    let mut naive = BlockMatcher::new(params);
    let mut dp = ScanlineDp::new(params);
    let mut dp_par = ScanlineDp::new(Params { parallel: true, ..params });

    // Benchmark compute functions
    c.bench_function("naive 96x48", |b| b.iter(|| naive.compute(black_box(&frame))));
    c.bench_function("scanline dp 96x48", |b| b.iter(|| dp.compute(black_box(&frame))));
    c.bench_function("scanline dp parallel 96x48", |b| {
        b.iter(|| dp_par.compute(black_box(&frame)))
    });
}

criterion_group!(benches, disparity_bench);
criterion_main!(benches);
