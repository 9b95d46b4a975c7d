// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scan-line extraction of raw wall segments
//!
//! Rows and columns are sampled on a coarse lattice. Each contiguous run of
//! dark samples longer than the minimum length becomes one axis-aligned
//! segment. Both passes see the same strokes, so thick walls produce several
//! parallel segments and crossings produce duplicates; later stages merge them.

use crate::types::{Point2D, Segment};
use image::GrayImage;

/// Scan-line parameters, usually taken from [`FloorPlanConfig`](crate::types::FloorPlanConfig)
#[derive(Debug, Clone, Copy)]
pub struct ScanParams {
    /// Darkness threshold as a fraction of full white
    pub threshold: f64,
    pub min_segment_length: f64,
    pub scan_step: u32,
    pub sample_stride: u32,
}

/// Extract horizontal then vertical segments from a grayscale image
pub fn scan_segments(image: &GrayImage, params: &ScanParams) -> Vec<Segment> {
    let width = image.width();
    let height = image.height();
    let cutoff = params.threshold * 255.0;
    let step = params.scan_step.max(1) as usize;
    let stride = params.sample_stride.max(1) as usize;

    let is_dark = |x: u32, y: u32| f64::from(image.get_pixel(x, y).0[0]) < cutoff;

    let mut segments = Vec::new();

    for y in (0..height).step_by(step) {
        for (start, end) in dark_runs(width, stride, |x| is_dark(x, y), params.min_segment_length) {
            segments.push(Segment::new(
                Point2D::new(start as f64, y as f64),
                Point2D::new(end as f64, y as f64),
            ));
        }
    }

    for x in (0..width).step_by(step) {
        for (start, end) in dark_runs(height, stride, |y| is_dark(x, y), params.min_segment_length)
        {
            segments.push(Segment::new(
                Point2D::new(x as f64, start as f64),
                Point2D::new(x as f64, end as f64),
            ));
        }
    }

    segments
}

/// Find dark runs along one line of `len` pixels.
///
/// A run ends at the first light sample; a run still open at the border ends
/// at `len`. Only runs strictly longer than `min_length` are returned.
fn dark_runs(
    len: u32,
    stride: usize,
    mut is_dark: impl FnMut(u32) -> bool,
    min_length: f64,
) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut run_start: Option<u32> = None;

    for i in (0..len).step_by(stride) {
        let dark = is_dark(i);
        match (dark, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                if f64::from(i - start) > min_length {
                    runs.push((start, i));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if f64::from(len - start) > min_length {
            runs.push((start, len));
        }
    }

    runs
}
