// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image preparation before scanning

use crate::error::{Error, Result};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;

/// Wrap a row-major 8-bit grayscale buffer as an image
pub fn grayscale_from_raw(buffer: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }

    let expected = width as usize * height as usize;
    if buffer.len() != expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: buffer.len(),
        });
    }

    GrayImage::from_raw(width, height, buffer.to_vec()).ok_or(Error::BufferSizeMismatch {
        expected,
        actual: buffer.len(),
    })
}

/// Convert RGBA bytes to grayscale image
pub fn rgba_to_grayscale(rgba: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }

    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }

    let mut gray = GrayImage::new(width, height);
    for (pixel, chunk) in gray.pixels_mut().zip(rgba.chunks_exact(4)) {
        let r = chunk[0] as f32;
        let g = chunk[1] as f32;
        let b = chunk[2] as f32;
        // Standard luminance formula (ITU-R BT.601)
        let luma = (0.299 * r + 0.587 * g + 0.114 * b) as u8;
        *pixel = Luma([luma]);
    }

    Ok(gray)
}

/// Otsu's level expressed as a darkness threshold fraction.
///
/// Pixels at or below the Otsu level count as dark.
pub fn otsu_threshold_fraction(image: &GrayImage) -> f64 {
    let level = imageproc::contrast::otsu_level(image);
    ((f64::from(level) + 1.0) / 255.0).min(1.0)
}

/// Fill light specks inside dark strokes.
///
/// Walls are dark on a light background, so an opening of the light
/// foreground removes light islands smaller than the structuring element.
pub fn fill_pinholes(image: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return image.clone();
    }
    imageproc::morphology::open(image, Norm::LInf, radius)
}
