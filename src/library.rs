//! Reference card templates

use crate::error::LibraryError;
use crate::models::CardTemplate;
use anyhow::Context;
use image::{GrayImage, ImageReader};
use std::fs;
use std::path::Path;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// English name for a two-letter card code such as `AH`, `5H`, `TC` or `JK`.
pub fn card_name(code: &str) -> Option<String> {
    let code = code.to_ascii_uppercase();
    if code == "JK" {
        return Some("Joker".to_string());
    }

    let mut chars = code.chars();
    let (rank, suit) = match (chars.next(), chars.next(), chars.next()) {
        (Some(rank), Some(suit), None) => (rank, suit),
        _ => return None,
    };

    let rank = match rank {
        'A' => "Ace",
        '2' => "Two",
        '3' => "Three",
        '4' => "Four",
        '5' => "Five",
        '6' => "Six",
        '7' => "Seven",
        '8' => "Eight",
        '9' => "Nine",
        'T' => "Ten",
        'J' => "Jack",
        'Q' => "Queen",
        'K' => "King",
        _ => return None,
    };
    let suit = match suit {
        'H' => "Hearts",
        'D' => "Diamonds",
        'C' => "Clubs",
        'S' => "Spades",
        _ => return None,
    };

    Some(format!("{rank} of {suit}"))
}

/// Identity for a scan file stem: `cards_0000_AH` becomes "Ace of Hearts".
pub fn identity_from_stem(stem: &str) -> String {
    stem.rsplit('_')
        .next()
        .and_then(card_name)
        .unwrap_or_else(|| stem.to_string())
}

/// Ordered, immutable set of card templates sharing one canonical size
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<CardTemplate>,
    canonical_size: u32,
}

impl TemplateLibrary {
    /// Build a library from `(identity, image)` pairs, keeping their order.
    pub fn new<I, S>(entries: I, canonical_size: u32) -> Result<Self, LibraryError>
    where
        I: IntoIterator<Item = (S, GrayImage)>,
        S: Into<String>,
    {
        if canonical_size == 0 {
            return Err(LibraryError::ZeroSize);
        }

        let mut templates: Vec<CardTemplate> = Vec::new();
        for (identity, image) in entries {
            let template = CardTemplate::new(identity, &image, canonical_size);
            if templates.iter().any(|t| t.identity == template.identity) {
                return Err(LibraryError::DuplicateIdentity(template.identity));
            }
            templates.push(template);
        }

        if templates.is_empty() {
            return Err(LibraryError::Empty);
        }

        Ok(Self {
            templates,
            canonical_size,
        })
    }

    /// Load every supported image in `dir`, sorted by file name.
    pub fn load_dir<P: AsRef<Path>>(dir: P, canonical_size: u32) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read template directory: {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            let supported = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
            if supported {
                paths.push(path);
            }
        }
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let identity = identity_from_stem(&stem.to_string_lossy());
            let image = ImageReader::open(&path)
                .with_context(|| format!("Failed to open template: {}", path.display()))?
                .decode()
                .with_context(|| format!("Failed to decode template: {}", path.display()))?
                .to_luma8();
            log::debug!("Loaded template {:?} from {}", identity, path.display());
            entries.push((identity, image));
        }

        let library = Self::new(entries, canonical_size)
            .with_context(|| format!("Invalid template directory: {}", dir.display()))?;
        log::info!("Loaded {} card templates", library.len());
        Ok(library)
    }

    pub fn get(&self, identity: &str) -> Option<&CardTemplate> {
        self.templates.iter().find(|t| t.identity == identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardTemplate> {
        self.templates.iter()
    }

    pub fn as_slice(&self) -> &[CardTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn canonical_size(&self) -> u32 {
        self.canonical_size
    }
}
