pub mod annotate;
pub mod config;
pub mod detection;
pub mod error;
pub mod library;
pub mod models;
pub mod pipeline;

pub use config::{DetectorConfig, ShapeFilterConfig};
pub use detection::{CandidateOutcome, CardDetector, FrameReport, SkippedCandidate};
pub use detection::matcher::TemplateMatcher;
pub use detection::steps::build_card_pipeline;
pub use error::{CandidateError, GeometryError, LibraryError, MatchError};
pub use library::TemplateLibrary;
pub use models::{
    CandidateRegion, CardMatch, CardTemplate, ClassificationResult, Quadrilateral, Rotation,
};
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
