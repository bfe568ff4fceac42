mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from card_classifier for tests
pub use card_classifier::{
    CardDetector, ClassificationResult, DetectorConfig, FrameReport, Quadrilateral, Rotation,
    TemplateLibrary, TemplateMatcher,
};
