use clap::{Parser, ValueEnum};
use image::ImageReader;
use std::path::PathBuf;
use std::sync::Arc;

use card_classifier::{CardDetector, DetectorConfig, TemplateLibrary, annotate, build_card_pipeline};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Still photographs (light smoothing)
    Still,
    /// Live camera frames (heavy smoothing)
    Camera,
}

#[derive(Parser)]
#[command(name = "card-classifier")]
#[command(about = "Find playing cards in images and identify them against reference scans")]
struct Cli {
    /// Images to process
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Directory of reference card scans (e.g. cards_0000_AH.jpg)
    #[arg(short, long, value_name = "DIR")]
    templates: PathBuf,

    /// Parameter preset
    #[arg(long, value_enum, default_value = "still")]
    preset: Preset,

    /// JSON detector configuration (overrides the preset)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report matches farther than this as unknown
    #[arg(long, value_name = "DISTANCE")]
    max_distance: Option<f64>,

    /// Save annotated frames to this directory
    #[arg(long, value_name = "DIR")]
    annotate_out: Option<PathBuf>,

    /// Save intermediate images of every step to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match &args.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => match args.preset {
            Preset::Still => DetectorConfig::still(),
            Preset::Camera => DetectorConfig::camera(),
        },
    };
    if args.max_distance.is_some() {
        config.max_distance = args.max_distance;
    }

    let library = Arc::new(TemplateLibrary::load_dir(&args.templates, config.canonical_size)?);
    let detector = CardDetector::new(config.clone(), library.clone());

    if let Some(dir) = &args.annotate_out {
        std::fs::create_dir_all(dir)?;
    }

    for (index, path) in args.images.iter().enumerate() {
        let img = ImageReader::open(path)?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;

        log::info!("Processing {} ({}x{})", path.display(), img.width(), img.height());

        if let Some(debug_dir) = &args.debug_out {
            let frame_dir = debug_dir.join(format!("{:02}", index + 1));
            build_card_pipeline(&config, library.clone())
                .with_verbose(args.verbose)
                .with_debug(frame_dir)?
                .run(img.clone())?;
        }

        let report = detector.process_frame(&img);

        println!("\n=== {} ===", path.display());
        if report.is_empty() {
            println!("No cards detected.");
        }
        for result in report.results() {
            let label = if result.is_confident(config.max_distance) {
                result.identity.clone()
            } else {
                format!("unknown (best guess: {})", result.identity)
            };
            println!(
                "  {} at ({:.0}, {:.0}) - distance: {:.5}",
                label, result.position.x, result.position.y, result.distance
            );
        }
        for skipped in report.skipped() {
            println!("  skipped candidate: {}", skipped.error);
        }

        if let Some(dir) = &args.annotate_out {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("frame_{:02}", index + 1));
            let out_path = dir.join(format!("{stem}_annotated.png"));
            annotate::annotate(&img, &report)
                .save(&out_path)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", out_path.display(), e))?;
        }
    }

    Ok(())
}
