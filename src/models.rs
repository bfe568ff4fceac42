use image::GrayImage;
use image::imageops::{self, FilterType};
use imageproc::point::Point;

/// Four polygon vertices in the order polygon approximation produced them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    pub vertices: [Point<f64>; 4],
}

fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

impl Quadrilateral {
    pub fn new(vertices: [Point<f64>; 4]) -> Self {
        Self { vertices }
    }

    pub fn from_coords(coords: [(f64, f64); 4]) -> Self {
        Self::new(coords.map(|(x, y)| Point::new(x, y)))
    }

    /// Returns `None` unless the polygon has exactly four vertices.
    pub fn from_polygon(polygon: &[Point<i32>]) -> Option<Self> {
        match polygon {
            [p0, p1, p2, p3] => Some(Self::new(
                [p0, p1, p2, p3].map(|p| Point::new(p.x as f64, p.y as f64)),
            )),
            _ => None,
        }
    }

    /// Mean of |P0-P1| and |P2-P3|
    pub fn width(&self) -> f64 {
        let [p0, p1, p2, p3] = self.vertices;
        (distance(p0, p1) + distance(p2, p3)) / 2.0
    }

    /// Mean of |P0-P2| and |P1-P3|
    pub fn height(&self) -> f64 {
        let [p0, p1, p2, p3] = self.vertices;
        (distance(p0, p2) + distance(p1, p3)) / 2.0
    }

    /// Width over height, or 0.0 when the height collapses to nothing.
    pub fn aspect_ratio(&self) -> f64 {
        let h = self.height();
        if h == 0.0 {
            return 0.0;
        }
        self.width() / h
    }

    /// Width times height. This is a size proxy, not the polygon area.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centroid(&self) -> Point<f64> {
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Shoelace area in image coordinates (y down). Negative when the
    /// vertices run top-left → bottom-left → bottom-right on screen.
    pub fn signed_area(&self) -> f64 {
        let v = &self.vertices;
        (0..4)
            .map(|i| {
                let a = v[i];
                let b = v[(i + 1) % 4];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    /// Same polygon traversed the other way round, still starting at P0.
    pub fn reversed_winding(&self) -> Self {
        let [p0, p1, p2, p3] = self.vertices;
        Self::new([p0, p3, p2, p1])
    }

    /// (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.vertices.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        )
    }

    pub fn control_points(&self) -> [(f32, f32); 4] {
        self.vertices.map(|p| (p.x as f32, p.y as f32))
    }
}

/// Quarter-turn applied to a template before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Rotate clockwise by this amount.
    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        match self {
            Rotation::Deg0 => image.clone(),
            Rotation::Deg90 => imageops::rotate90(image),
            Rotation::Deg180 => imageops::rotate180(image),
            Rotation::Deg270 => imageops::rotate270(image),
        }
    }
}

/// A reference card image with its four cardinal rotations precomputed
#[derive(Debug, Clone)]
pub struct CardTemplate {
    pub identity: String,
    pub image: GrayImage,
    rotations: [GrayImage; 4],
}

impl CardTemplate {
    /// Build a template, resizing the reference to `size` x `size` if needed.
    pub fn new(identity: impl Into<String>, image: &GrayImage, size: u32) -> Self {
        let image = if image.dimensions() == (size, size) {
            image.clone()
        } else {
            imageops::resize(image, size, size, FilterType::Triangle)
        };
        let rotations = Rotation::ALL.map(|r| r.apply(&image));

        Self {
            identity: identity.into(),
            image,
            rotations,
        }
    }

    pub fn rotated(&self, rotation: Rotation) -> &GrayImage {
        &self.rotations[rotation as usize]
    }

    pub fn rotations(&self) -> impl Iterator<Item = (Rotation, &GrayImage)> {
        Rotation::ALL.into_iter().zip(self.rotations.iter())
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }
}

/// A card-shaped quadrilateral and its rectified view
#[derive(Debug, Clone)]
pub struct CandidateRegion {
    pub quad: Quadrilateral,
    pub image: GrayImage,
    pub centroid: Point<f64>,
}

/// Best template for one rectified region
#[derive(Debug, Clone, PartialEq)]
pub struct CardMatch {
    pub identity: String,
    pub distance: f64,
    pub rotation: Rotation,
    pub template_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub identity: String,
    pub position: Point<f64>,
    pub distance: f64,
    pub rotation: Rotation,
    pub quad: Quadrilateral,
}

impl ClassificationResult {
    pub fn from_match(region: &CandidateRegion, card: CardMatch) -> Self {
        Self {
            identity: card.identity,
            position: region.centroid,
            distance: card.distance,
            rotation: card.rotation,
            quad: region.quad,
        }
    }

    /// True when no cutoff is set or the distance stays within it.
    pub fn is_confident(&self, max_distance: Option<f64>) -> bool {
        max_distance.is_none_or(|max| self.distance <= max)
    }
}
