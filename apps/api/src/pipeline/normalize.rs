//! Image normalization for OCR input.
//!
//! Raw upload bytes go through a fixed sequence: decode, 2x upscale,
//! grayscale, adaptive thresholding, median denoising, and best-effort
//! skew correction. OCR engines read larger glyphs measurably better,
//! and a locally adaptive threshold tolerates uneven lighting across a
//! photographed page where a single global cutoff does not.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::median_filter;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use tracing::debug;

use crate::pipeline::PipelineError;

/// Upscale factor applied before thresholding.
const UPSCALE_FACTOR: u32 = 2;

/// Side length of the local mean window used for thresholding.
const THRESHOLD_WINDOW: u32 = 11;

/// Constant subtracted from the local mean before comparing a pixel.
const THRESHOLD_OFFSET: i64 = 2;

/// Median filter radius for speckle removal. Kept small so thin
/// character strokes survive.
const MEDIAN_RADIUS: u32 = 1;

/// Skew below this magnitude (degrees) is left alone.
const MIN_SKEW_DEG: f32 = 0.5;

/// Pixel value for foreground (ink) in the binary output.
pub const INK: u8 = 0;
/// Pixel value for background in the binary output.
pub const BACKGROUND: u8 = 255;

/// Turns raw encoded image bytes into a clean binary raster ready for
/// OCR. Stateless; all parameters are fixed constants.
#[derive(Debug, Default)]
pub struct ImageNormalizer;

impl ImageNormalizer {
    /// Normalize `bytes` into a binary, upscaled, deskewed raster.
    ///
    /// Fails only on undecodable input. Skew correction is best-effort:
    /// if it cannot run (e.g. a blank page with no ink pixels), the
    /// unrotated thresholded image is returned instead.
    pub fn normalize(&self, bytes: &[u8]) -> Result<GrayImage, PipelineError> {
        let color: RgbImage = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = color.dimensions();

        let upscaled = imageops::resize(
            &color,
            width * UPSCALE_FACTOR,
            height * UPSCALE_FACTOR,
            FilterType::CatmullRom,
        );
        let gray = imageops::grayscale(&upscaled);
        let binary = adaptive_mean_threshold(&gray, THRESHOLD_WINDOW, THRESHOLD_OFFSET);
        let denoised = median_filter(&binary, MEDIAN_RADIUS, MEDIAN_RADIUS);

        Ok(self.deskew(denoised))
    }

    /// Best-effort skew correction via the minimal bounding rectangle
    /// over ink pixels. Never fails: any degenerate geometry falls back
    /// to the input image, logged for OCR-accuracy diagnosis.
    fn deskew(&self, binary: GrayImage) -> GrayImage {
        let ink: Vec<Point<i32>> = binary
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == INK)
            .map(|(x, y, _)| Point::new(x as i32, y as i32))
            .collect();

        if ink.len() < 3 {
            debug!(ink_pixels = ink.len(), "skew correction skipped: not enough ink");
            return binary;
        }

        // Axis-degenerate point sets (single row/column of ink) have no
        // meaningful minimal rectangle.
        let collinear = ink.iter().all(|p| p.x == ink[0].x) || ink.iter().all(|p| p.y == ink[0].y);
        if collinear {
            debug!("skew correction skipped: collinear ink pixels");
            return binary;
        }

        let corners = min_area_rect(&ink);
        let angle = skew_angle(&corners);
        if angle.abs() <= MIN_SKEW_DEG {
            return binary;
        }

        debug!(angle, "correcting page skew");
        // Counterclockwise-positive rotation about the image center,
        // exposed borders filled with background white.
        rotate_about_center(
            &binary,
            -angle.to_radians(),
            Interpolation::Bilinear,
            Luma([BACKGROUND]),
        )
    }
}

/// Rotation angle (degrees) needed to straighten the text block whose
/// minimal bounding rectangle has the given corners.
///
/// The raw edge angle is first normalized into [-90, 0), the
/// minAreaRect convention, then folded: angles beyond -45 are mapped to
/// the complementary angle so a page is never spun by a near-right
/// angle to fix a slight tilt.
fn skew_angle(corners: &[Point<i32>; 4]) -> f32 {
    let dx = (corners[1].x - corners[0].x) as f32;
    let dy = (corners[1].y - corners[0].y) as f32;
    let mut angle = dy.atan2(dx).to_degrees() % 90.0;
    if angle >= 0.0 {
        angle -= 90.0;
    }

    if angle < -45.0 {
        -(90.0 + angle)
    } else {
        -angle
    }
}

/// Local adaptive mean thresholding over a square window, with a
/// constant offset biasing ties toward background.
///
/// Implemented over an integral image so the window mean is O(1) per
/// pixel. `imageproc`'s built-in adaptive threshold has no offset
/// parameter, and the offset is part of the contract here.
fn adaptive_mean_threshold(gray: &GrayImage, window: u32, offset: i64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);

    // integral[(y + 1) * (w + 1) + (x + 1)] = sum of pixels in [0, y] x [0, x]
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += u64::from(gray.get_pixel(x as u32, y as u32)[0]);
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }

    let radius = i64::from(window / 2);
    let mut out = GrayImage::new(width, height);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let x0 = (x - radius).max(0) as usize;
            let y0 = (y - radius).max(0) as usize;
            let x1 = (x + radius + 1).min(w as i64) as usize;
            let y1 = (y + radius + 1).min(h as i64) as usize;

            let count = ((x1 - x0) * (y1 - y0)) as i64;
            let sum = (integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0]) as i64;
            let mean = sum / count;

            let value = i64::from(gray.get_pixel(x as u32, y as u32)[0]);
            let pixel = if value > mean - offset { BACKGROUND } else { INK };
            out.put_pixel(x as u32, y as u32, Luma([pixel]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    fn white_page(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    /// White page with a horizontal black bar, an axis-aligned text
    /// block stand-in that needs no rotation.
    fn page_with_bar(width: u32, height: u32) -> RgbImage {
        let mut img = white_page(width, height);
        for y in height / 3..height / 2 {
            for x in 2..width - 2 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn test_dimensions_are_doubled() {
        let bytes = encode_png(&page_with_bar(20, 10));
        let normalized = ImageNormalizer.normalize(&bytes).unwrap();
        assert_eq!(normalized.dimensions(), (40, 20));
    }

    #[test]
    fn test_output_is_strictly_binary() {
        let bytes = encode_png(&page_with_bar(24, 12));
        let normalized = ImageNormalizer.normalize(&bytes).unwrap();
        assert!(normalized.pixels().all(|p| p[0] == INK || p[0] == BACKGROUND));
    }

    #[test]
    fn test_blank_page_completes_without_rotation() {
        // No ink pixels at all: skew correction must be skipped, not fail.
        let bytes = encode_png(&white_page(16, 16));
        let normalized = ImageNormalizer.normalize(&bytes).unwrap();
        assert_eq!(normalized.dimensions(), (32, 32));
        assert!(normalized.pixels().all(|p| p[0] == BACKGROUND));
    }

    #[test]
    fn test_malformed_bytes_fail_with_decode_error() {
        let result = ImageNormalizer.normalize(b"definitely not an image");
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let bytes = encode_png(&page_with_bar(20, 14));
        let first = ImageNormalizer.normalize(&bytes).unwrap();
        let second = ImageNormalizer.normalize(&bytes).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_uniform_gray_page_thresholds_to_background() {
        let bytes = encode_png(&RgbImage::from_pixel(12, 12, Rgb([128, 128, 128])));
        let normalized = ImageNormalizer.normalize(&bytes).unwrap();
        // Every pixel sits at the local mean, so the offset pushes all
        // of them to background.
        assert!(normalized.pixels().all(|p| p[0] == BACKGROUND));
    }

    #[test]
    fn test_skew_angle_folds_beyond_45_degrees() {
        // A perfectly axis-aligned rectangle reports -90 under the
        // minAreaRect convention and must fold to zero correction.
        let corners = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(0, 5),
        ];
        assert!(skew_angle(&corners).abs() < f32::EPSILON);
    }

    #[test]
    fn test_skew_angle_detects_small_tilt() {
        // Rectangle tilted ~5.7 degrees (slope 1/10).
        let corners = [
            Point::new(0, 0),
            Point::new(100, 10),
            Point::new(95, 60),
            Point::new(-5, 50),
        ];
        let angle = skew_angle(&corners);
        assert!(
            (angle.abs() - 5.71).abs() < 0.2,
            "expected ~5.71 degree correction, got {angle}"
        );
    }
}
