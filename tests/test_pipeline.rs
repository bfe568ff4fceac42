mod common;

use card_classifier::build_card_pipeline;
use common::*;
use tempfile::TempDir;

#[test]
fn test_pipeline_agrees_with_detector() -> anyhow::Result<()> {
    let config = DetectorConfig::still();
    let library = test_library();
    let frame = single_card_frame();

    let items = build_card_pipeline(&config, library.clone()).run(frame.clone())?;
    let from_pipeline: Vec<ClassificationResult> =
        items.iter().filter_map(|item| item.classification()).collect();

    let detector = CardDetector::new(config, library);
    let from_detector: Vec<ClassificationResult> =
        detector.process_frame(&frame).results().cloned().collect();

    assert_eq!(from_pipeline.len(), 1);
    assert_eq!(from_pipeline, from_detector);
    Ok(())
}

#[test]
fn test_partial_run_stops_at_edge_map() -> anyhow::Result<()> {
    let config = DetectorConfig::still();
    let frame = single_card_frame();

    // grayscale, smoothing, threshold, edges, dilation
    let items = build_card_pipeline(&config, test_library()).run_partial(frame.clone(), 5)?;
    assert_eq!(items.len(), 1);
    assert!(items[0].quad.is_none());

    let detector = CardDetector::new(config, test_library());
    assert_eq!(items[0].image.to_luma8(), detector.edge_map(&frame.to_luma8()));
    Ok(())
}

#[test]
fn test_debug_mode_saves_every_step() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let debug_dir = temp_dir.path().join("frame");

    build_card_pipeline(&DetectorConfig::still(), test_library())
        .with_debug(debug_dir.clone())?
        .run(single_card_frame())?;

    for step in [
        "00_input",
        "01_grayscale_conversion",
        "02_bilateral_smoothing",
        "03_threshold",
        "04_edge_detection",
        "05_dilation",
    ] {
        assert!(debug_dir.join(step).join("01.png").exists(), "missing {step}");
    }
    assert!(debug_dir.join("07_rectify").join("01.png").exists());
    assert!(debug_dir.join("08_classify").join("01.png").exists());
    Ok(())
}

#[test]
fn test_debug_mode_refuses_non_empty_directory() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("leftover.txt"), "x")?;

    let result = build_card_pipeline(&DetectorConfig::still(), test_library())
        .with_debug(temp_dir.path().to_path_buf());
    assert!(result.is_err());
    Ok(())
}
