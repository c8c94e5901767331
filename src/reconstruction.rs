//! # Point cloud reconstruction
//!
//! Projects a disparity map into 3D using the rectified camera geometry and writes the result as
//! a plain `.xyz` point list.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::config::Camera;
use crate::disparity::DisparityMap;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Project every cell of `disp_map` into 3D.
///
/// The stored value is divided by `scale`, offset by the camera's `dmin` and truncated to an
/// integer disparity `d`. Cells where `d` is zero have no defined depth and are skipped.
pub fn project(disp_map: &DisparityMap, camera: &Camera, scale: f64) -> Vec<Point> {
    let mut points = Vec::with_capacity(disp_map.width() * disp_map.height());

    for row in 0..disp_map.height() {
        for col in 0..disp_map.width() {
            let d = (disp_map.get(col, row) as f64 / scale + camera.dmin as f64) as i32;

            if d == 0 {
                continue;
            }

            let d = d as f64;
            points.push(Point {
                x: camera.baseline * (2.0 * col as f64 + d) / (2.0 * d),
                y: camera.baseline * row as f64 / d,
                z: camera.baseline * camera.focal_length / d
            });
        }
    }

    points
}

/// Write one `X Y Z` line per point.
pub fn write_xyz<W: Write>(writer: W, points: &[Point]) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    for p in points {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    writer.flush()?;
    Ok(())
}

/// Project `disp_map` and write the points to `path`.
pub fn save_xyz<P: AsRef<Path>>(
    path: P,
    disp_map: &DisparityMap,
    camera: &Camera,
    scale: f64
) -> Result<usize> {
    let points = project(disp_map, camera, scale);
    write_xyz(std::fs::File::create(path.as_ref())?, &points)?;

    info!("Wrote {} points to {}", points.len(), path.as_ref().display());

    Ok(points.len())
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
