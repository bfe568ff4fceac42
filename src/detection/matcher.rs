//! Rotation-invariant template matching by normalized L2 distance

use crate::error::MatchError;
use crate::library::TemplateLibrary;
use crate::models::{CardMatch, CardTemplate, Rotation};
use image::GrayImage;
use std::sync::Arc;

/// `||a - b||_2 / (width * height)`, or `None` when the sizes differ.
pub fn normalized_l2(a: &GrayImage, b: &GrayImage) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return Some(0.0);
    }

    let sum_sq: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&p, &q)| {
            let d = p.abs_diff(q) as u64;
            d * d
        })
        .sum();

    Some((sum_sq as f64).sqrt() / (width as f64 * height as f64))
}

/// Smallest distance over the four cardinal rotations of one template
fn best_rotation(template: &CardTemplate, region: &GrayImage) -> (Rotation, f64) {
    let mut best = (Rotation::Deg0, f64::INFINITY);
    for (rotation, rotated) in template.rotations() {
        // Sizes are checked by the caller
        let distance = normalized_l2(rotated, region).unwrap_or(f64::INFINITY);
        if distance < best.1 {
            best = (rotation, distance);
        }
    }
    best
}

/// Matches rectified regions against a shared template library
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    library: Arc<TemplateLibrary>,
}

impl TemplateMatcher {
    pub fn new(library: Arc<TemplateLibrary>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Per-template best distance, in library order
    pub fn score_all(&self, region: &GrayImage) -> Result<Vec<(Rotation, f64)>, MatchError> {
        let size = self.library.canonical_size();
        if region.dimensions() != (size, size) {
            return Err(MatchError::SizeMismatch {
                expected: (size, size),
                actual: region.dimensions(),
            });
        }

        let templates = self.library.as_slice();

        #[cfg(feature = "parallel")]
        let scores = {
            use rayon::prelude::*;
            templates
                .par_iter()
                .map(|template| best_rotation(template, region))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let scores = templates
            .iter()
            .map(|template| best_rotation(template, region))
            .collect();

        Ok(scores)
    }

    /// Identity with the globally smallest distance. There is no cutoff:
    /// some template always wins. Ties go to the earlier template.
    pub fn classify(&self, region: &GrayImage) -> Result<CardMatch, MatchError> {
        let scores = self.score_all(region)?;

        let (index, (rotation, distance)) = scores
            .into_iter()
            .enumerate()
            .fold(None, |best: Option<(usize, (Rotation, f64))>, (i, score)| match best {
                Some((_, (_, d))) if d <= score.1 => best,
                _ => Some((i, score)),
            })
            .ok_or(MatchError::EmptyLibrary)?;

        let identity = self.library.as_slice()[index].identity.clone();
        log::debug!(
            "Best match {:?} at {}° with distance {:.5}",
            identity,
            rotation.degrees(),
            distance
        );

        Ok(CardMatch {
            identity,
            distance,
            rotation,
            template_index: index,
        })
    }
}
