use std::collections::HashSet;

use assert_approx_eq::assert_approx_eq;
use image::{GrayImage, Luma, Rgb, RgbImage};

use watermark_remover_lib::removal::{color_hits, most_frequent_color, sharpen};
use watermark_remover_lib::{RemovalMode, RemovalParams, WatermarkError, WatermarkRemovalEngine};

/// Noisy paper with a dominant colour and a light-gray watermark block at 10..20
fn page(seed: u32) -> RgbImage {
    RgbImage::from_fn(40, 40, |x, y| {
        if (10..20).contains(&x) && (10..20).contains(&y) && (x + y) % 3 != 0 {
            Rgb([180, 170, 160])
        } else if (x * 7 + y * 13 + seed) % 11 == 0 {
            Rgb([30, 30, 30])
        } else {
            Rgb([245, 243, 240])
        }
    })
}

fn square_mask() -> GrayImage {
    GrayImage::from_fn(40, 40, |x, y| {
        let inside = (10..20).contains(&x) && (10..20).contains(&y);
        Luma([if inside { 255 } else { 0 }])
    })
}

fn no_progress() -> impl FnMut(f32) {
    |_| {}
}

#[test]
fn fill_replaces_in_band_pixels_inside_the_mask_only() {
    let pages: Vec<RgbImage> = (0..3).map(page).collect();
    let mask = square_mask();
    let params = vec![RemovalParams::default(); 3];
    let engine = WatermarkRemovalEngine::default();

    let cleaned = engine.remove(&pages, &mask, &params, &mut no_progress()).unwrap();
    assert_eq!(cleaned.len(), 3);

    for (before, after) in pages.iter().zip(cleaned.iter()) {
        let dominant = most_frequent_color(before);
        assert_eq!(dominant, Rgb([245, 243, 240]));
        for (x, y, p) in before.enumerate_pixels() {
            let inside = mask.get_pixel(x, y)[0] == 255;
            let in_band = p.0.iter().all(|&c| (90..=240).contains(&c));
            let out = after.get_pixel(x, y);
            if inside && in_band {
                assert_eq!(*out, dominant, "({}, {})", x, y);
            } else {
                assert_eq!(out, p, "({}, {})", x, y);
            }
        }
    }
}

#[test]
fn all_zero_mask_equals_sharpen_only() {
    let pages: Vec<RgbImage> = (0..2).map(page).collect();
    let mask = GrayImage::new(40, 40);
    let params = RemovalParams { sharpen_weight: 1.5, ..RemovalParams::default() };
    let engine = WatermarkRemovalEngine::default();

    let cleaned = engine.remove(&pages, &mask, &[params, params], &mut no_progress()).unwrap();
    for (before, after) in pages.iter().zip(cleaned.iter()) {
        assert_eq!(*after, sharpen(before, 1.5, engine.sharpen_sigma));
    }
}

#[test]
fn zero_weight_and_empty_mask_is_identity() {
    let pages = vec![page(4)];
    let engine = WatermarkRemovalEngine::default();
    let cleaned = engine
        .remove(&pages, &GrayImage::new(40, 40), &[RemovalParams::default()], &mut no_progress())
        .unwrap();
    assert_eq!(cleaned[0], pages[0]);
}

#[test]
fn zero_lower_bound_does_not_match_background_outside_mask() {
    let page = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
    let mut mask = GrayImage::new(10, 10);
    mask.put_pixel(3, 3, Luma([255]));
    let hits = color_hits(&page, &mask, [0, 0, 0], [255, 255, 255]);
    assert_eq!(hits.pixels().filter(|p| p[0] == 255).count(), 1);
    assert_eq!(hits.get_pixel(3, 3)[0], 255);
}

#[test]
fn mismatched_mask_is_resized_not_rejected() {
    let pages = vec![page(0)];
    let small = GrayImage::from_fn(20, 20, |x, y| {
        Luma([if (5..10).contains(&x) && (5..10).contains(&y) { 255 } else { 0 }])
    });
    let engine = WatermarkRemovalEngine::default();
    let cleaned = engine
        .remove(&pages, &small, &[RemovalParams::default()], &mut no_progress())
        .unwrap();
    assert_eq!(cleaned[0].dimensions(), (40, 40));
    assert_eq!(*cleaned[0].get_pixel(14, 14), Rgb([245, 243, 240]));
}

#[test]
fn progress_is_reported_after_every_page() {
    let pages: Vec<RgbImage> = (0..4).map(page).collect();
    let engine = WatermarkRemovalEngine::default();
    let mut seen = Vec::new();
    let mut sink = |f: f32| seen.push(f);
    engine
        .remove(&pages, &square_mask(), &vec![RemovalParams::default(); 4], &mut sink)
        .unwrap();

    assert_eq!(seen.len(), 4);
    for (i, f) in seen.iter().enumerate() {
        assert_approx_eq!(*f, (i + 1) as f32 / 4.0, 1e-6);
    }
}

#[test]
fn parameter_count_must_match_pages() {
    let pages: Vec<RgbImage> = (0..2).map(page).collect();
    let engine = WatermarkRemovalEngine::default();
    let err = engine
        .remove(&pages, &square_mask(), &[RemovalParams::default()], &mut no_progress())
        .unwrap_err();
    assert!(matches!(err, WatermarkError::ParameterCount { pages: 2, params: 1 }));
}

#[test]
fn inpaint_mode_fills_from_surroundings() {
    let pages = vec![page(0)];
    let params = RemovalParams { mode: RemovalMode::Inpaint, ..RemovalParams::default() };
    let engine = WatermarkRemovalEngine::default();
    let cleaned = engine.remove(&pages, &square_mask(), &[params], &mut no_progress()).unwrap();

    let watermark: HashSet<Rgb<u8>> = [Rgb([180, 170, 160])].into_iter().collect();
    let remaining = cleaned[0]
        .enumerate_pixels()
        .filter(|(x, y, p)| (10..20).contains(x) && (10..20).contains(y) && watermark.contains(p))
        .count();
    assert_eq!(remaining, 0);
}

#[test]
fn removal_is_deterministic() {
    let pages: Vec<RgbImage> = (0..2).map(page).collect();
    let params = vec![RemovalParams { sharpen_weight: 0.7, ..RemovalParams::default() }; 2];
    let engine = WatermarkRemovalEngine::default();
    let a = engine.remove(&pages, &square_mask(), &params, &mut no_progress()).unwrap();
    let b = engine.remove(&pages, &square_mask(), &params, &mut no_progress()).unwrap();
    assert_eq!(a, b);
}
