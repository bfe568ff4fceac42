use crate::config::{DetectorConfig, ShapeFilterConfig};
use crate::detection::matcher::TemplateMatcher;
use crate::detection::{contours, preprocessing, rectify, shape};
use crate::library::TemplateLibrary;
use crate::pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;

/// Apply a grayscale-to-grayscale transform to every item
fn map_gray<F>(data: Vec<PipelineData>, f: F) -> Vec<PipelineData>
where
    F: Fn(&image::GrayImage) -> image::GrayImage,
{
    data.into_iter()
        .map(|item| {
            let out = f(&item.image.to_luma8());
            item.with_image(DynamicImage::ImageLuma8(out))
        })
        .collect()
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let gray = preprocessing::to_grayscale(&item.image);
                item.with_image(DynamicImage::ImageLuma8(gray))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Edge-preserving bilateral smoothing
pub struct SmoothingStep {
    pub aperture: u32,
    pub sigma: f32,
}

impl PipelineStep for SmoothingStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(map_gray(data, |gray| {
            preprocessing::bilateral_smooth(gray, self.aperture, self.sigma)
        }))
    }

    fn name(&self) -> &str {
        "Bilateral Smoothing"
    }
}

/// Fixed-level binarization
pub struct ThresholdStep {
    pub level: u8,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(map_gray(data, |gray| preprocessing::binarize(gray, self.level)))
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(map_gray(data, |gray| {
            preprocessing::detect_edges(gray, self.low_threshold, self.high_threshold)
        }))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Close small gaps in the edge map
pub struct DilationStep {
    pub iterations: u8,
}

impl PipelineStep for DilationStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(map_gray(data, |gray| preprocessing::dilate_edges(gray, self.iterations)))
    }

    fn name(&self) -> &str {
        "Dilation"
    }
}

/// Find card-shaped quadrilaterals - splits one edge map into many candidates
pub struct QuadDetectionStep {
    pub approximation_factor: f64,
    pub shape: ShapeFilterConfig,
}

impl PipelineStep for QuadDetectionStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let edges = item.image.to_luma8();
            let quads = contours::find_quadrilaterals(&edges, self.approximation_factor);
            let cards = shape::filter_cards(&quads, &self.shape);

            if context.verbose {
                println!("  {} quadrilaterals, {} card-shaped", quads.len(), cards.len());
            }

            let (frame_w, frame_h) = (item.original.width(), item.original.height());
            for quad in cards {
                // Crop the candidate's bounding box from the original, clamped to the frame
                let (min_x, min_y, max_x, max_y) = quad.bounds();
                let x = (min_x.max(0.0) as u32).min(frame_w.saturating_sub(1));
                let y = (min_y.max(0.0) as u32).min(frame_h.saturating_sub(1));
                let w = ((max_x.ceil() as u32).min(frame_w.saturating_sub(1)) + 1).saturating_sub(x);
                let h = ((max_y.ceil() as u32).min(frame_h.saturating_sub(1)) + 1).saturating_sub(y);
                let cropped = item.original.crop_imm(x, y, w.max(1), h.max(1));

                let centroid = quad.centroid();
                let candidate = PipelineData::from_candidate(cropped, item.original.clone(), quad)
                    .with_metadata("width", MetadataValue::Float(quad.width()))
                    .with_metadata("height", MetadataValue::Float(quad.height()))
                    .with_metadata("aspect_ratio", MetadataValue::Float(quad.aspect_ratio()))
                    .with_metadata("area", MetadataValue::Float(quad.area()))
                    .with_metadata("centroid_x", MetadataValue::Float(centroid.x))
                    .with_metadata("centroid_y", MetadataValue::Float(centroid.y));
                result.push(candidate);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Quad Detection"
    }
}

/// Metadata key holding the reason a candidate was not classified
pub const SKIPPED_KEY: &str = "skipped";

/// Warp each candidate to the canonical square; degenerate candidates are
/// kept unwarped and tagged with `SKIPPED_KEY`
pub struct RectifyStep {
    pub canonical_size: u32,
    pub normalize_winding: bool,
}

impl PipelineStep for RectifyStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let quad = item
                .quad
                .ok_or_else(|| anyhow::anyhow!("Rectify step needs a candidate quadrilateral"))?;
            let frame = item.original.to_luma8();

            match rectify::extract_region(&frame, &quad, self.canonical_size, self.normalize_winding) {
                Ok(region) => {
                    let mut new_item = item.with_image(DynamicImage::ImageLuma8(region.image));
                    new_item.quad = Some(region.quad);
                    result.push(new_item);
                }
                Err(e) => {
                    log::warn!("Skipping candidate {:?}: {}", quad.vertices, e);
                    result.push(item.with_metadata(SKIPPED_KEY, MetadataValue::String(e.to_string())));
                }
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Rectify"
    }
}

/// Label each rectified candidate with its best-matching template
pub struct ClassifyStep {
    pub matcher: TemplateMatcher,
}

impl PipelineStep for ClassifyStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            if item.get_string(SKIPPED_KEY).is_some() {
                result.push(item);
                continue;
            }

            match self.matcher.classify(&item.image.to_luma8()) {
                Ok(card) => {
                    if context.verbose {
                        println!("  {} (distance {:.5})", card.identity, card.distance);
                    }
                    result.push(
                        item.with_metadata("identity", MetadataValue::String(card.identity))
                            .with_metadata("distance", MetadataValue::Float(card.distance))
                            .with_metadata("rotation", MetadataValue::Int(card.rotation.degrees() as i64)),
                    );
                }
                Err(e) => {
                    log::warn!("Skipping candidate: {}", e);
                    result.push(item.with_metadata(SKIPPED_KEY, MetadataValue::String(e.to_string())));
                }
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Classify"
    }
}

/// Build the standard card pipeline for a configuration.
/// Candidates are rectified at the library's canonical size.
pub fn build_card_pipeline(config: &DetectorConfig, library: Arc<TemplateLibrary>) -> Pipeline {
    let mut pipeline = Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(SmoothingStep {
            aperture: config.smoothing_aperture,
            sigma: config.smoothing_sigma,
        }));

    if let Some(level) = config.binary_threshold {
        pipeline = pipeline.add_step(Arc::new(ThresholdStep { level }));
    }

    pipeline
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: config.edge_low_threshold,
            high_threshold: config.edge_high_threshold,
        }))
        .add_step(Arc::new(DilationStep {
            iterations: config.dilation_iterations,
        }))
        .add_step(Arc::new(QuadDetectionStep {
            approximation_factor: config.approximation_factor,
            shape: config.shape.clone(),
        }))
        .add_step(Arc::new(RectifyStep {
            canonical_size: library.canonical_size(),
            normalize_winding: config.normalize_winding,
        }))
        .add_step(Arc::new(ClassifyStep {
            matcher: TemplateMatcher::new(library),
        }))
}
