//! # Scanline stereo command line
//!
//! Computes naive and scanline DP disparity maps for a stereo pair, saves both as images and
//! reconstructs a point cloud from the DP map.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use scanline_stereo::{
    block::BlockMatcher,
    prelude::*,
    reconstruction,
    scanline::ScanlineDp,
    Result
};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Naive and scanline DP disparity for a rectified stereo pair.
#[derive(Debug, Parser)]
#[command(author, version, about = "Naive and scanline DP stereo disparity with point cloud output")]
struct Args {
    /// Left (reference) image.
    image1: PathBuf,

    /// Right (target) image.
    image2: PathBuf,

    /// Prefix of the written `_naive.png`, `_dp.png` and `.xyz` files.
    output_name: String,

    /// Focal length in pixels. Must be followed by BASELINE and DMIN.
    #[arg(requires = "dmin")]
    focal_length: Option<f64>,

    /// Distance between the two camera centres.
    baseline: Option<f64>,

    /// Disparity removed from the images by cropping.
    #[arg(allow_negative_numbers = true)]
    dmin: Option<i32>,

    /// Side length of the correlation window. Must be followed by WEIGHT.
    #[arg(requires = "weight")]
    window_size: Option<usize>,

    /// Occlusion weight of the scanline DP matcher.
    weight: Option<f64>,

    /// JSON run description. Defaults are used for anything it omits.
    #[arg(long, conflicts_with_all = ["focal_length", "window_size"])]
    config: Option<PathBuf>
}

// -----------------------------------------------------------------------------------------------
// MAIN
// -----------------------------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = try_main() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;

    let frame = StereoFrame::open(&args.image1, &args.image2)?;

    info!("------------------ Parameters -------------------");
    info!("image size = {}x{}", frame.width(), frame.height());
    info!("focal_length = {}", config.camera.focal_length);
    info!("baseline = {}", config.camera.baseline);
    info!("disparity added due to image cropping = {}", config.camera.dmin);
    info!("window_size = {}", config.params.window_size);
    info!("occlusion weights = {}", config.params.occlusion_weight);
    info!("scaling of disparity images to show = {}", config.params.scale);
    info!("output filename = {}", args.output_name);
    info!("-------------------------------------------------");

    let naive = BlockMatcher::new(config.params)
        .with_progress(console_progress("naive"))
        .compute(&frame)?;
    eprintln!();

    let dp = ScanlineDp::new(config.params)
        .with_progress(console_progress("dynamic"))
        .compute(&frame)?;
    eprintln!();

    reconstruction::save_xyz(
        format!("{}.xyz", args.output_name),
        &dp,
        &config.camera,
        config.params.scale
    )?;

    naive.save(format!("{}_naive.png", args.output_name), config.saturation)?;
    dp.save(format!("{}_dp.png", args.output_name), config.saturation)?;

    Ok(())
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Args {
    /// Build the run configuration: the JSON file if given, otherwise the defaults overridden by
    /// whichever positional values were supplied.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default()
        };

        match (self.focal_length, self.baseline, self.dmin) {
            (Some(focal_length), Some(baseline), Some(dmin)) => {
                config.camera = Camera { focal_length, baseline, dmin };
            }
            _ if self.config.is_none() => info!(
                "Using default focal length ({}), baseline ({}), dmin ({})",
                config.camera.focal_length, config.camera.baseline, config.camera.dmin
            ),
            _ => ()
        }

        match (self.window_size, self.weight) {
            (Some(window_size), Some(weight)) => {
                config.params.window_size = window_size;
                config.params.occlusion_weight = weight;
            }
            _ if self.config.is_none() => info!(
                "Using default window size ({}), weight ({})",
                config.params.window_size, config.params.occlusion_weight
            ),
            _ => ()
        }

        Ok(config)
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Progress callback overwriting a single console line.
fn console_progress(name: &'static str) -> Progress {
    Box::new(move |percent| {
        eprint!("\rCalculating disparities for the {} approach... {:.0}%", name, percent);
        std::io::stderr().flush().ok();
    })
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
