use crate::config::ShapeFilterConfig;
use crate::models::Quadrilateral;

/// Ratio test against the expected short/long side ratio.
///
/// The ratio is measured between fixed vertex pairs, so a card whose outline
/// was traced from a different starting vertex can measure differently.
pub fn fits_ratio(quad: &Quadrilateral, config: &ShapeFilterConfig) -> bool {
    (quad.aspect_ratio() - config.expected_ratio).abs() < config.ratio_tolerance
}

pub fn fits_minimum_size(quad: &Quadrilateral, config: &ShapeFilterConfig) -> bool {
    quad.area() >= config.minimum_area
}

pub fn is_card_shaped(quad: &Quadrilateral, config: &ShapeFilterConfig) -> bool {
    fits_ratio(quad, config) && fits_minimum_size(quad, config)
}

/// Filter quadrilaterals to keep only card-shaped ones
pub fn filter_cards(quads: &[Quadrilateral], config: &ShapeFilterConfig) -> Vec<Quadrilateral> {
    quads
        .iter()
        .filter(|q| is_card_shaped(q, config))
        .copied()
        .collect()
}
