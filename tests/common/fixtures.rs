#![allow(dead_code)]

use card_classifier::TemplateLibrary;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use std::sync::Arc;

pub const SIZE: u32 = 500;
pub const PAPER: Luma<u8> = Luma([230]);
pub const INK: Luma<u8> = Luma([30]);
pub const TABLE: Luma<u8> = Luma([25]);

/// Landscape footprint of a card lying sideways, in frame pixels
pub const CARD_LONG: u32 = 264;
pub const CARD_SHORT: u32 = 190;

/// Large central pip plus two opposite corner indices
pub fn ace_of_hearts() -> GrayImage {
    let mut img = GrayImage::from_pixel(SIZE, SIZE, PAPER);
    draw_filled_circle_mut(&mut img, (250, 250), 90, INK);
    draw_filled_circle_mut(&mut img, (80, 80), 25, INK);
    draw_filled_circle_mut(&mut img, (420, 420), 25, INK);
    img
}

/// Four pips in a square
pub fn five_of_hearts() -> GrayImage {
    let mut img = GrayImage::from_pixel(SIZE, SIZE, PAPER);
    for (x, y) in [(150, 150), (350, 150), (150, 350), (350, 350)] {
        draw_filled_circle_mut(&mut img, (x, y), 60, INK);
    }
    img
}

/// Five horizontal bars, inset from the card edge
pub fn queen_of_spades() -> GrayImage {
    let mut img = GrayImage::from_pixel(SIZE, SIZE, PAPER);
    for y in [70, 150, 230, 310, 390] {
        draw_filled_rect_mut(&mut img, Rect::at(60, y).of_size(380, 40), INK);
    }
    img
}

/// Mostly dark face with a light medallion
pub fn joker() -> GrayImage {
    let mut img = GrayImage::from_pixel(SIZE, SIZE, Luma([60]));
    draw_filled_circle_mut(&mut img, (250, 250), 120, PAPER);
    img
}

pub fn template_images() -> Vec<(&'static str, GrayImage)> {
    vec![
        ("Ace of Hearts", ace_of_hearts()),
        ("Five of Hearts", five_of_hearts()),
        ("Queen of Spades", queen_of_spades()),
        ("Joker", joker()),
    ]
}

pub fn test_library() -> Arc<TemplateLibrary> {
    Arc::new(
        TemplateLibrary::new(template_images(), SIZE).expect("Failed to build template library"),
    )
}

/// A dark table of the given size
pub fn table(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, TABLE)
}

/// Place `face` on the table turned a quarter clockwise, so the card lies in
/// landscape with its top-left corner at (x, y).
pub fn lay_card_sideways(frame: &mut GrayImage, face: &GrayImage, x: i64, y: i64) {
    let turned = imageops::rotate90(face);
    let card = imageops::resize(&turned, CARD_LONG, CARD_SHORT, FilterType::Triangle);
    imageops::overlay(frame, &card, x, y);
}

/// 480x400 frame with one sideways Ace of Hearts at (100, 90)
pub fn single_card_frame() -> DynamicImage {
    let mut frame = table(480, 400);
    lay_card_sideways(&mut frame, &ace_of_hearts(), 100, 90);
    DynamicImage::ImageLuma8(frame)
}

/// Smooth pattern used for resampling round trips
pub fn smooth_pattern(size: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        let fx = x as f32 / 18.0;
        let fy = y as f32 / 25.0;
        Luma([(128.0 + 60.0 * fx.sin() * fy.cos() + 0.1 * x as f32) as u8])
    })
}
