// src/removal.rs - Per-page watermark removal: colour band selection, fill or inpaint, sharpen

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::separable_filter_equal;
use log::{debug, info, warn};

use crate::config::Config;
use crate::errors::{Result, WatermarkError};
use crate::image_utils::{resize_mask_area, rgb_in_range, MASK_ON};
use crate::inpaint::inpaint_telea;
use crate::parameters::{RemovalMode, RemovalParams};

/// Receives the fraction of pages processed, in `[0, 1]`
pub trait ProgressSink {
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn report(&mut self, fraction: f32) {
        self(fraction)
    }
}

/// Progress sink that writes to the log
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, fraction: f32) {
        info!("Removing watermark... {:.0}%", fraction * 100.0);
    }
}

/// Applies the removal algorithm to whole page sets
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkRemovalEngine {
    pub inpaint_radius: f32,
    pub sharpen_sigma: f32,
}

impl Default for WatermarkRemovalEngine {
    fn default() -> Self {
        Self {
            inpaint_radius: 2.0,
            sharpen_sigma: 2.0,
        }
    }
}

impl WatermarkRemovalEngine {
    pub fn from_config(config: &Config) -> Self {
        Self {
            inpaint_radius: config.inpaint_radius,
            sharpen_sigma: config.sharpen_sigma,
        }
    }

    /// Clean every page with its own parameter record.
    ///
    /// `mask` is resized to each page's size when they differ. Pages are processed
    /// in order and progress `(i + 1) / n` is reported after each one. Inputs are
    /// not mutated.
    pub fn remove(
        &self,
        pages: &[RgbImage],
        mask: &GrayImage,
        params: &[RemovalParams],
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<RgbImage>> {
        if params.len() != pages.len() {
            return Err(WatermarkError::ParameterCount {
                pages: pages.len(),
                params: params.len(),
            });
        }

        let total = pages.len();
        info!("Removing watermark from {} pages", total);

        let mut resized: Option<GrayImage> = None;
        let mut cleaned = Vec::with_capacity(total);

        for (i, (page, page_params)) in pages.iter().zip(params.iter()).enumerate() {
            let page_mask = if page.dimensions() == mask.dimensions() {
                mask
            } else {
                let stale = resized
                    .as_ref()
                    .map_or(true, |m| m.dimensions() != page.dimensions());
                if stale {
                    warn!(
                        "Mask is {}x{} but page {} is {}x{}, resizing mask",
                        mask.width(),
                        mask.height(),
                        i,
                        page.width(),
                        page.height()
                    );
                    resized = Some(resize_mask_area(mask, page.dimensions()));
                }
                resized.as_ref().unwrap_or(mask)
            };

            cleaned.push(self.process_page(page, page_mask, page_params));

            let fraction = (i + 1) as f32 / total as f32;
            debug!("Page {}/{} done", i + 1, total);
            progress.report(fraction);
        }

        Ok(cleaned)
    }

    /// Clean a single page; `mask` must match its dimensions
    pub fn process_page(&self, page: &RgbImage, mask: &GrayImage, params: &RemovalParams) -> RgbImage {
        let hits = color_hits(page, mask, params.lower_rgb(), params.upper_rgb());
        let replaced = match params.mode {
            RemovalMode::Fill => fill_most_frequent_color(page, &hits),
            RemovalMode::Inpaint => inpaint_telea(page, &hits, self.inpaint_radius),
        };
        sharpen(&replaced, params.sharpen_weight, self.sharpen_sigma)
    }
}

/// Pixels inside `mask` whose colour lies within `[lower, upper]` per channel.
///
/// The page is first ANDed with the mask, tested against the band, then the
/// result is ANDed with the mask again so that a zero lower bound cannot pick
/// up the blacked-out background.
pub fn color_hits(page: &RgbImage, mask: &GrayImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    let (width, height) = page.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let m = mask.get_pixel(x, y)[0];
        let p = page.get_pixel(x, y);
        let masked = Rgb([p[0] & m, p[1] & m, p[2] & m]);
        let hit = if rgb_in_range(&masked, lower, upper) { MASK_ON } else { 0 };
        Luma([hit & m])
    })
}

/// Per-channel mode of the whole page; ties resolve to the smaller value
pub fn most_frequent_color(image: &RgbImage) -> Rgb<u8> {
    let mut histograms = [[0u32; 256]; 3];
    for p in image.pixels() {
        for c in 0..3 {
            histograms[c][p[c] as usize] += 1;
        }
    }

    let mut color = [0u8; 3];
    for c in 0..3 {
        let mut best = 0usize;
        for v in 1..256 {
            if histograms[c][v] > histograms[c][best] {
                best = v;
            }
        }
        color[c] = best as u8;
    }
    Rgb(color)
}

/// Overwrite every pixel where `hits == 255` with the page's most frequent colour
pub fn fill_most_frequent_color(image: &RgbImage, hits: &GrayImage) -> RgbImage {
    let color = most_frequent_color(image);
    let mut out = image.clone();
    for (x, y, p) in out.enumerate_pixels_mut() {
        if hits.get_pixel(x, y)[0] == MASK_ON {
            *p = color;
        }
    }
    out
}

fn gaussian_kernel3(sigma: f32) -> [f32; 3] {
    let side = (-1.0 / (2.0 * sigma * sigma)).exp();
    let sum = 1.0 + 2.0 * side;
    [side / sum, 1.0 / sum, side / sum]
}

/// 3x3 Gaussian blur, separable, edges clamped
pub fn gaussian_blur3(image: &RgbImage, sigma: f32) -> RgbImage {
    separable_filter_equal(image, &gaussian_kernel3(sigma))
}

/// Unsharp mask: `out = image + weight * (image - blur(image))`, saturated to 8 bits.
/// A zero weight returns the image unchanged.
pub fn sharpen(image: &RgbImage, weight: f32, sigma: f32) -> RgbImage {
    if weight == 0.0 {
        return image.clone();
    }
    let blurred = gaussian_blur3(image, sigma);
    let mut out = image.clone();
    for (o, b) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let diff = o[c] as f32 - b[c] as f32;
            o[c] = (o[c] as f32 + weight * diff).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
