use crate::models::Quadrilateral;
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Outer borders that are not nested inside any other border
pub fn external_contours(edges: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Douglas-Peucker simplification with tolerance `factor` x perimeter
pub fn approximate_polygon(contour: &[Point<i32>], factor: f64) -> Vec<Point<i32>> {
    if contour.len() < 3 {
        return contour.to_vec();
    }
    let epsilon = arc_length(contour, true) * factor;
    if epsilon <= 0.0 {
        return contour.to_vec();
    }
    approximate_polygon_dp(contour, epsilon, true)
}

/// Every external contour whose simplified polygon has exactly four vertices
pub fn find_quadrilaterals(edges: &GrayImage, factor: f64) -> Vec<Quadrilateral> {
    external_contours(edges)
        .iter()
        .filter_map(|contour| Quadrilateral::from_polygon(&approximate_polygon(contour, factor)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    fn outlined_rect(x: i32, y: i32, w: u32, h: u32) -> GrayImage {
        let mut img = GrayImage::new(200, 200);
        draw_hollow_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), Luma([255]));
        img
    }

    #[test]
    fn test_rectangle_outline_gives_one_quad() {
        let quads = find_quadrilaterals(&outlined_rect(20, 30, 80, 110), 0.02);
        assert_eq!(quads.len(), 1);

        let (min_x, min_y, max_x, max_y) = quads[0].bounds();
        assert!((min_x - 20.0).abs() <= 1.0 && (min_y - 30.0).abs() <= 1.0);
        assert!((max_x - 99.0).abs() <= 1.0 && (max_y - 139.0).abs() <= 1.0);
    }

    #[test]
    fn test_nested_outline_is_not_external() {
        let mut img = outlined_rect(10, 10, 150, 150);
        draw_hollow_rect_mut(&mut img, Rect::at(50, 50).of_size(40, 40), Luma([255]));

        let outer = external_contours(&img);
        assert_eq!(outer.len(), 1);
        assert_eq!(find_quadrilaterals(&img, 0.02).len(), 1);
    }

    #[test]
    fn test_blank_image_has_no_quads() {
        assert!(find_quadrilaterals(&GrayImage::new(50, 50), 0.02).is_empty());
    }

    #[test]
    fn test_approximation_collapses_straight_runs() {
        let line: Vec<Point<i32>> = (0..10)
            .map(|x| Point::new(x, 0))
            .chain((0..10).map(|y| Point::new(10, y)))
            .chain((0..=10).rev().map(|x| Point::new(x, 10)))
            .chain((1..10).rev().map(|y| Point::new(0, y)))
            .collect();
        let poly = approximate_polygon(&line, 0.02);
        assert_eq!(poly.len(), 4);
    }
}
