use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::morphology::dilate;

/// Convert image to single-channel luminance
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Edge-preserving bilateral smoothing.
///
/// `diameter` is the full neighbourhood width and `sigma` is used for both
/// the intensity range and the spatial falloff. A diameter below 2 returns
/// the input unchanged.
pub fn bilateral_smooth(img: &GrayImage, diameter: u32, sigma: f32) -> GrayImage {
    let radius = (diameter / 2) as i64;
    if radius == 0 || sigma <= 0.0 {
        return img.clone();
    }

    let (width, height) = img.dimensions();
    let color_coeff = -0.5 / (sigma * sigma);
    let space_coeff = -0.5 / (sigma * sigma);

    let color_weights: Vec<f32> = (0..256)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let mut kernel = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2 <= (radius * radius) as f32 {
                kernel.push((dx, dy, (r2 * space_coeff).exp()));
            }
        }
    }

    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    GrayImage::from_fn(width, height, |x, y| {
        let center = img.get_pixel(x, y)[0];
        let mut sum = 0.0f32;
        let mut norm = 0.0f32;

        for &(dx, dy, spatial) in &kernel {
            let sx = (x as i64 + dx).clamp(0, max_x) as u32;
            let sy = (y as i64 + dy).clamp(0, max_y) as u32;
            let value = img.get_pixel(sx, sy)[0];
            let weight = spatial * color_weights[center.abs_diff(value) as usize];
            sum += weight * value as f32;
            norm += weight;
        }

        Luma([(sum / norm).round().clamp(0.0, 255.0) as u8])
    })
}

/// Binary threshold: pixels strictly above `level` become 255, the rest 0
pub fn binarize(img: &GrayImage, level: u8) -> GrayImage {
    threshold(img, level, ThresholdType::Binary)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Grow edges with a 3x3 square element, once per iteration
pub fn dilate_edges(edges: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return edges.clone();
    }
    dilate(edges, Norm::LInf, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image() -> GrayImage {
        GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([40]) } else { Luma([220]) })
    }

    #[test]
    fn test_bilateral_keeps_strong_edges() {
        let smoothed = bilateral_smooth(&step_image(), 5, 15.0);
        assert_eq!(smoothed.get_pixel(9, 5)[0], 40);
        assert_eq!(smoothed.get_pixel(10, 5)[0], 220);
    }

    #[test]
    fn test_bilateral_flattens_small_noise() {
        let mut noisy = GrayImage::from_pixel(9, 9, Luma([100]));
        noisy.put_pixel(4, 4, Luma([110]));
        let smoothed = bilateral_smooth(&noisy, 5, 50.0);
        let center = smoothed.get_pixel(4, 4)[0];
        assert!(center < 110 && center >= 100, "center = {center}");
    }

    #[test]
    fn test_small_aperture_is_identity() {
        let img = step_image();
        assert_eq!(bilateral_smooth(&img, 1, 15.0), img);
    }

    #[test]
    fn test_binarize_is_strict() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([149 + x as u8]));
        let bin = binarize(&img, 150);
        assert_eq!(bin.as_raw(), &vec![0, 0, 255]);
    }

    #[test]
    fn test_edges_found_on_step() {
        let edges = detect_edges(&step_image(), 75.0, 100.0);
        assert!(edges.pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn test_dilation_grows_single_pixel() {
        let mut edges = GrayImage::new(5, 5);
        edges.put_pixel(2, 2, Luma([255]));
        let grown = dilate_edges(&edges, 1);
        assert_eq!(grown.pixels().filter(|p| p[0] == 255).count(), 9);
        assert_eq!(grown.get_pixel(1, 1)[0], 255);
        assert_eq!(grown.get_pixel(0, 0)[0], 0);
    }
}
