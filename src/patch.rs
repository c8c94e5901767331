//! # Patch similarity
//!
//! Sum of squared differences between two equally sized square windows, the matching criterion
//! shared by every algorithm in this crate.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Sum of squared differences between the `window_size` square windows centred on
/// `(reference_col, row)` in `reference` and `(target_col, row)` in `target`.
///
/// Windows start `window_size / 2` pixels above and to the left of their centre, so even sized
/// windows extend one pixel further up and left. Both windows must lie entirely inside their
/// image; this is the caller's responsibility and is only checked in debug builds.
///
/// Thin wrapper over `ssd_at`, which the scanline matcher calls directly with top-left corners.
pub fn ssd(
    reference: &GrayImage,
    target: &GrayImage,
    window_size: usize,
    row: usize,
    reference_col: usize,
    target_col: usize
) -> u64 {
    let half = window_size / 2;
    ssd_at(
        reference,
        target,
        window_size,
        row - half,
        reference_col - half,
        target_col - half
    )
}

/// Same as [`ssd`] but addressed by the top-left corner of each window.
pub(crate) fn ssd_at(
    reference: &GrayImage,
    target: &GrayImage,
    window_size: usize,
    top: usize,
    reference_left: usize,
    target_left: usize
) -> u64 {
    let stride = reference.width() as usize;

    debug_assert_eq!(reference.dimensions(), target.dimensions());
    debug_assert!(top + window_size <= reference.height() as usize);
    debug_assert!(reference_left + window_size <= stride);
    debug_assert!(target_left + window_size <= stride);

    let ref_raw: &[u8] = reference.as_raw();
    let tgt_raw: &[u8] = target.as_raw();

    let mut acc = 0u64;

    for y in top..(top + window_size) {
        let ref_start = y * stride + reference_left;
        let tgt_start = y * stride + target_left;

        acc += ref_raw[ref_start..ref_start + window_size]
            .iter()
            .zip(&tgt_raw[tgt_start..tgt_start + window_size])
            .map(|(&a, &b)| {
                let diff = a as i64 - b as i64;
                (diff * diff) as u64
            })
            .sum::<u64>();
    }

    acc
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
