use crate::error::GeometryError;
use crate::models::{CandidateRegion, Quadrilateral};
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

/// Minimum separation, in pixels, between two vertices
const MIN_VERTEX_DISTANCE: f64 = 1.0;
/// Minimum area, in squared pixels, of the triangle spanned by any three vertices
const MIN_TRIANGLE_AREA: f64 = 1.0;

/// Corners of the `size` x `size` canonical square, in the order P0..P3 map onto them
pub fn canonical_corners(size: u32) -> [(f32, f32); 4] {
    let s = size.saturating_sub(1) as f32;
    [(0.0, 0.0), (0.0, s), (s, s), (s, 0.0)]
}

/// Reject vertex sets that make the homography ill-conditioned
pub fn check_quad(quad: &Quadrilateral) -> Result<(), GeometryError> {
    let v = &quad.vertices;

    for i in 0..4 {
        for j in (i + 1)..4 {
            let dx = v[i].x - v[j].x;
            let dy = v[i].y - v[j].y;
            if (dx * dx + dy * dy).sqrt() < MIN_VERTEX_DISTANCE {
                return Err(GeometryError::DuplicateVertices(i, j));
            }
        }
    }

    for (i, j, k) in [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)] {
        let cross = (v[j].x - v[i].x) * (v[k].y - v[i].y) - (v[j].y - v[i].y) * (v[k].x - v[i].x);
        if cross.abs() / 2.0 < MIN_TRIANGLE_AREA {
            return Err(GeometryError::CollinearVertices(i, j, k));
        }
    }

    Ok(())
}

/// Projective transform taking P0..P3 onto the canonical square corners
pub fn rectifying_projection(quad: &Quadrilateral, size: u32) -> Result<Projection, GeometryError> {
    check_quad(quad)?;
    Projection::from_control_points(quad.control_points(), canonical_corners(size))
        .ok_or(GeometryError::IllConditioned)
}

/// Warp the quadrilateral region of `frame` into a `size` x `size` image.
///
/// Pixels that map outside the frame are black.
pub fn rectify(
    frame: &GrayImage,
    quad: &Quadrilateral,
    size: u32,
) -> Result<GrayImage, GeometryError> {
    let projection = rectifying_projection(quad, size)?;
    let mut out = GrayImage::new(size, size);
    warp_into(frame, &projection, Interpolation::Bilinear, Luma([0]), &mut out);
    Ok(out)
}

/// Rectify a candidate, optionally flipping its winding first so the result is never mirrored
pub fn extract_region(
    frame: &GrayImage,
    quad: &Quadrilateral,
    size: u32,
    normalize_winding: bool,
) -> Result<CandidateRegion, GeometryError> {
    let quad = if normalize_winding && quad.signed_area() > 0.0 {
        quad.reversed_winding()
    } else {
        *quad
    };

    let image = rectify(frame, &quad, size)?;
    Ok(CandidateRegion {
        quad,
        image,
        centroid: quad.centroid(),
    })
}
