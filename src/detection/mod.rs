pub mod preprocessing;
pub mod contours;
pub mod shape;
pub mod rectify;
pub mod matcher;
pub mod steps;

use crate::config::DetectorConfig;
use crate::error::CandidateError;
use crate::library::TemplateLibrary;
use crate::models::{ClassificationResult, Quadrilateral};
use image::{DynamicImage, GrayImage};
use matcher::TemplateMatcher;
use std::sync::Arc;

/// A candidate that was dropped from the frame, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCandidate {
    pub quad: Quadrilateral,
    pub error: CandidateError,
}

pub type CandidateOutcome = Result<ClassificationResult, SkippedCandidate>;

/// Everything one frame produced, in contour discovery order
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub outcomes: Vec<CandidateOutcome>,
}

impl FrameReport {
    pub fn push(&mut self, outcome: CandidateOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn results(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedCandidate> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Results whose distance is within `max_distance` (all of them for `None`)
    pub fn confident(&self, max_distance: Option<f64>) -> impl Iterator<Item = &ClassificationResult> {
        self.results().filter(move |r| r.is_confident(max_distance))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when nothing card-shaped was found in the frame
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Finds and identifies playing cards in single frames
pub struct CardDetector {
    config: DetectorConfig,
    matcher: TemplateMatcher,
}

impl CardDetector {
    /// Candidates are rectified at the library's canonical size, which
    /// replaces `config.canonical_size` when the two differ.
    pub fn new(mut config: DetectorConfig, library: Arc<TemplateLibrary>) -> Self {
        if library.canonical_size() != config.canonical_size {
            log::info!(
                "Rectifying at template size {} instead of configured {}",
                library.canonical_size(),
                config.canonical_size
            );
            config.canonical_size = library.canonical_size();
        }
        Self {
            config,
            matcher: TemplateMatcher::new(library),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn matcher(&self) -> &TemplateMatcher {
        &self.matcher
    }

    /// Binary edge map: grayscale → smoothing → optional threshold → canny → dilation
    pub fn edge_map(&self, gray: &GrayImage) -> GrayImage {
        let smoothed = preprocessing::bilateral_smooth(
            gray,
            self.config.smoothing_aperture,
            self.config.smoothing_sigma,
        );
        let binary = match self.config.binary_threshold {
            Some(level) => preprocessing::binarize(&smoothed, level),
            None => smoothed,
        };
        let edges = preprocessing::detect_edges(
            &binary,
            self.config.edge_low_threshold,
            self.config.edge_high_threshold,
        );
        preprocessing::dilate_edges(&edges, self.config.dilation_iterations)
    }

    /// Card-shaped quadrilaterals of a grayscale frame
    pub fn find_candidates_gray(&self, gray: &GrayImage) -> Vec<Quadrilateral> {
        if gray.width() == 0 || gray.height() == 0 {
            return Vec::new();
        }

        let edges = self.edge_map(gray);
        let quads = contours::find_quadrilaterals(&edges, self.config.approximation_factor);
        let cards = shape::filter_cards(&quads, &self.config.shape);

        log::debug!(
            "Found {} quadrilaterals, {} card-shaped",
            quads.len(),
            cards.len()
        );
        cards
    }

    pub fn find_candidates(&self, frame: &DynamicImage) -> Vec<Quadrilateral> {
        self.find_candidates_gray(&preprocessing::to_grayscale(frame))
    }

    /// Rectify and classify one candidate
    pub fn classify_candidate(
        &self,
        gray: &GrayImage,
        quad: &Quadrilateral,
    ) -> Result<ClassificationResult, CandidateError> {
        let region = rectify::extract_region(
            gray,
            quad,
            self.config.canonical_size,
            self.config.normalize_winding,
        )?;
        let card = self.matcher.classify(&region.image)?;
        Ok(ClassificationResult::from_match(&region, card))
    }

    /// Run the whole pipeline on one frame. A candidate that fails is
    /// recorded as skipped and the rest of the frame carries on.
    pub fn process_frame(&self, frame: &DynamicImage) -> FrameReport {
        let gray = preprocessing::to_grayscale(frame);
        let candidates = self.find_candidates_gray(&gray);
        self.process_candidates(&gray, candidates)
    }

    /// Rectify and classify each quad in order, one outcome per quad
    pub fn process_candidates<I>(&self, gray: &GrayImage, quads: I) -> FrameReport
    where
        I: IntoIterator<Item = Quadrilateral>,
    {
        let mut report = FrameReport::default();

        for quad in quads {
            match self.classify_candidate(gray, &quad) {
                Ok(result) => {
                    log::debug!(
                        "Classified {:?} at ({:.1}, {:.1})",
                        result.identity,
                        result.position.x,
                        result.position.y
                    );
                    report.push(Ok(result));
                }
                Err(error) => {
                    log::warn!("Skipping candidate {:?}: {}", quad.vertices, error);
                    report.push(Err(SkippedCandidate { quad, error }));
                }
            }
        }

        report
    }

    /// Results of `process_frame` that pass the configured distance cutoff
    pub fn confident_results(&self, frame: &DynamicImage) -> Vec<ClassificationResult> {
        self.process_frame(frame)
            .confident(self.config.max_distance)
            .cloned()
            .collect()
    }
}
