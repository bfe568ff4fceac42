//! Frame overlays for detected cards

use crate::detection::FrameReport;
use crate::models::Quadrilateral;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_line_segment_mut};

pub const MATCH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const SKIPPED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

pub fn draw_quad(canvas: &mut RgbImage, quad: &Quadrilateral, color: Rgb<u8>) {
    let points = quad.control_points();
    for i in 0..4 {
        draw_line_segment_mut(canvas, points[i], points[(i + 1) % 4], color);
    }
}

/// Copy of `frame` with classified outlines and centroid crosses in green,
/// skipped candidates in red.
pub fn annotate(frame: &DynamicImage, report: &FrameReport) -> RgbImage {
    let mut canvas = frame.to_rgb8();

    for skipped in report.skipped() {
        draw_quad(&mut canvas, &skipped.quad, SKIPPED_COLOR);
    }
    for result in report.results() {
        draw_quad(&mut canvas, &result.quad, MATCH_COLOR);
        draw_cross_mut(
            &mut canvas,
            MATCH_COLOR,
            result.position.x.round() as i32,
            result.position.y.round() as i32,
        );
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassificationResult, Rotation};
    use image::GrayImage;

    #[test]
    fn test_outline_and_centroid_are_drawn() {
        let frame = DynamicImage::ImageLuma8(GrayImage::new(40, 40));
        let quad = Quadrilateral::from_coords([(5.0, 5.0), (5.0, 30.0), (30.0, 30.0), (30.0, 5.0)]);
        let mut report = FrameReport::default();
        report.push(Ok(ClassificationResult {
            identity: "Ace of Hearts".into(),
            position: quad.centroid(),
            distance: 0.1,
            rotation: Rotation::Deg0,
            quad,
        }));

        let out = annotate(&frame, &report);
        assert_eq!(*out.get_pixel(5, 15), MATCH_COLOR);
        assert_eq!(*out.get_pixel(18, 18), MATCH_COLOR);
        assert_eq!(*out.get_pixel(12, 20), Rgb([0, 0, 0]));
    }
}
