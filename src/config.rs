//! Tunables for the card detection pipeline

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Short/long side ratio of a standard 63 x 88 mm playing card.
pub const EXPECTED_RATIO: f64 = 6.30 / 8.75;
pub const RATIO_TOLERANCE: f64 = 0.15;
pub const MINIMUM_AREA: f64 = 5000.0;
pub const CANONICAL_SIZE: u32 = 500;

/// Thresholds deciding whether a quadrilateral is card-shaped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeFilterConfig {
    pub expected_ratio: f64,
    pub ratio_tolerance: f64,
    /// Squared pixels, inclusive
    pub minimum_area: f64,
}

impl Default for ShapeFilterConfig {
    fn default() -> Self {
        Self {
            expected_ratio: EXPECTED_RATIO,
            ratio_tolerance: RATIO_TOLERANCE,
            minimum_area: MINIMUM_AREA,
        }
    }
}

/// Full detector configuration, fixed for the lifetime of a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Bilateral filter diameter in pixels
    pub smoothing_aperture: u32,
    /// Shared range/spatial sigma of the bilateral filter
    pub smoothing_sigma: f32,
    /// Fixed binarization level; `None` skips the threshold stage
    pub binary_threshold: Option<u8>,
    pub edge_low_threshold: f32,
    pub edge_high_threshold: f32,
    pub dilation_iterations: u8,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    pub approximation_factor: f64,
    pub shape: ShapeFilterConfig,
    pub canonical_size: u32,
    /// Reverse clockwise quadrilaterals before rectification so candidates are never mirrored
    pub normalize_winding: bool,
    /// Optional rejection cutoff; `None` always reports the best guess
    pub max_distance: Option<f64>,
}

impl DetectorConfig {
    /// Parameters used for still test photographs
    pub fn still() -> Self {
        Self {
            smoothing_aperture: 4,
            smoothing_sigma: 15.0,
            binary_threshold: Some(150),
            edge_low_threshold: 75.0,
            edge_high_threshold: 100.0,
            dilation_iterations: 1,
            approximation_factor: 0.02,
            shape: ShapeFilterConfig::default(),
            canonical_size: CANONICAL_SIZE,
            normalize_winding: false,
            max_distance: None,
        }
    }

    /// Parameters used for live camera frames (noisier, heavier smoothing)
    pub fn camera() -> Self {
        Self {
            smoothing_aperture: 8,
            smoothing_sigma: 55.0,
            binary_threshold: Some(200),
            ..Self::still()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::still()
    }
}
