use crate::models::{ClassificationResult, Quadrilateral, Rotation};
use anyhow::Result;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Data that flows through the pipeline.
/// Each PipelineData is either the whole frame or one card candidate.
#[derive(Clone)]
pub struct PipelineData {
    /// The current image (frame, edge map, crop or rectified card)
    pub image: DynamicImage,

    /// The input frame, shared by every candidate cut from it
    pub original: Arc<DynamicImage>,

    /// Candidate outline in frame coordinates (None means full frame)
    pub quad: Option<Quadrilateral>,

    /// Per-item measurements and labels (e.g. "aspect_ratio", "identity")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f64),
    String(String),
    Int(i64),
}

impl PipelineData {
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            quad: None,
            metadata: HashMap::new(),
        }
    }

    pub fn from_candidate(image: DynamicImage, original: Arc<DynamicImage>, quad: Quadrilateral) -> Self {
        Self {
            image,
            original,
            quad: Some(quad),
            metadata: HashMap::new(),
        }
    }

    /// Same item with a new image, keeping the lineage
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            original: self.original.clone(),
            quad: self.quad,
            metadata: self.metadata.clone(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// The classification attached by the classify step, if any
    pub fn classification(&self) -> Option<ClassificationResult> {
        let quad = self.quad?;
        let rotation = Rotation::from_degrees(u32::try_from(self.get_int("rotation")?).ok()?)?;
        Some(ClassificationResult {
            identity: self.get_string("identity")?.to_string(),
            position: quad.centroid(),
            distance: self.get_float("distance")?,
            rotation,
            quad,
        })
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in verbose output and debug directories)
    fn name(&self) -> &str;
}

fn step_dir_name(index: usize, name: &str) -> String {
    format!("{:02}_{}", index, name.to_lowercase().replace(' ', "_"))
}

fn save_images(dir: &Path, data: &[PipelineData]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (idx, item) in data.iter().enumerate() {
        let path = dir.join(format!("{:02}.png", idx + 1));
        item.image
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step on a frame
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for inspecting intermediates)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        let mut data = vec![PipelineData::from_image(input)];

        if let Some(debug) = &self.context.debug {
            save_images(&debug.output_dir.join("00_input"), &data)?;
        }

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                println!("Running step: {} (processing {} items)", step.name(), data.len());
            }

            data = step.process(data, &self.context)?;

            if let Some(debug) = &self.context.debug {
                let dir_name = step_dir_name(step_idx + 1, step.name());
                save_images(&debug.output_dir.join(&dir_name), &data)?;
                if self.context.verbose {
                    println!("  Debug: saved {} images to {}/", data.len(), dir_name);
                }
            }

            if self.context.verbose {
                println!("  → {} items", data.len());
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
