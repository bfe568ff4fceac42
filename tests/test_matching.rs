mod common;

use common::*;
use image::{GrayImage, Luma};

#[test]
fn test_every_template_matches_itself_at_every_rotation() {
    let library = test_library();
    let matcher = TemplateMatcher::new(library.clone());

    for (index, template) in library.iter().enumerate() {
        let upright = template.rotated(Rotation::Deg0);
        for rotation in Rotation::ALL {
            let region = rotation.apply(upright);
            let card = matcher.classify(&region).expect("Classification failed");

            assert_eq!(card.identity, template.identity, "rotated {}°", rotation.degrees());
            assert_eq!(card.template_index, index);
            assert!(card.distance < 1e-12);
        }
    }
}

#[test]
fn test_a_winner_is_always_chosen() {
    let matcher = TemplateMatcher::new(test_library());

    let black = GrayImage::new(SIZE, SIZE);
    let noise = GrayImage::from_fn(SIZE, SIZE, |x, y| {
        Luma([((x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) % 251) as u8])
    });

    for region in [black, noise] {
        let card = matcher.classify(&region).expect("Classification failed");
        assert!(matcher.library().get(&card.identity).is_some());
        assert!(card.distance.is_finite());
    }
}

#[test]
fn test_dark_region_prefers_dark_template() {
    let matcher = TemplateMatcher::new(test_library());
    let card = matcher
        .classify(&GrayImage::from_pixel(SIZE, SIZE, Luma([60])))
        .expect("Classification failed");
    assert_eq!(card.identity, "Joker");
}

#[test]
fn test_scores_follow_library_order() {
    let library = test_library();
    let matcher = TemplateMatcher::new(library.clone());

    let scores = matcher
        .score_all(&queen_of_spades())
        .expect("Scoring failed");

    assert_eq!(scores.len(), library.len());
    let best = scores
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.1.total_cmp(&b.1.1))
        .map(|(i, _)| i);
    assert_eq!(best, Some(2));
}
