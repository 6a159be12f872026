// src/image_store.rs - Working/original page sets and the cached median image

use std::collections::HashMap;

use image::{GrayImage, RgbImage};
use log::{debug, info};

use crate::config::Config;
use crate::errors::{Result, WatermarkError};
use crate::image_utils::{fit_dimensions, mask_and, resize_mask_nearest, resize_page, to_gray};
use crate::median::{bucket_sample_count, clamp_sample_count, median_image};

/// Holds the page set at both resolutions plus the median image derived from it.
///
/// `working` and `original` always have equal length and index correspondence.
/// Every working page has exactly `working_dimensions()`.
pub struct ImageStore {
    working: Vec<RgbImage>,
    original: Vec<RgbImage>,
    max_width: u32,
    max_height: u32,
    median_cap: usize,
    current_page_index: usize,
    median_sample_count: usize,
    median_bgr: RgbImage,
    median_gray: GrayImage,
    median_cache: HashMap<usize, RgbImage>,
}

impl ImageStore {
    pub fn new(pages: Vec<RgbImage>, max_width: u32, max_height: u32, median_cap: usize) -> Result<Self> {
        let (working, original) = Self::derive_working(pages, max_width, max_height)?;
        let median_bgr = working[0].clone();
        let median_gray = to_gray(&median_bgr);

        info!(
            "Image store ready: {} pages, working size {}x{}",
            working.len(),
            median_bgr.width(),
            median_bgr.height()
        );

        Ok(Self {
            working,
            original,
            max_width,
            max_height,
            median_cap: median_cap.max(1),
            current_page_index: 0,
            median_sample_count: 1,
            median_bgr,
            median_gray,
            median_cache: HashMap::new(),
        })
    }

    pub fn from_config(pages: Vec<RgbImage>, config: &Config) -> Result<Self> {
        Self::new(pages, config.max_width, config.max_height, config.median_cap)
    }

    /// All working pages take the size fitted from the first original page
    fn derive_working(
        pages: Vec<RgbImage>,
        max_width: u32,
        max_height: u32,
    ) -> Result<(Vec<RgbImage>, Vec<RgbImage>)> {
        let first = pages.first().ok_or(WatermarkError::EmptyPageSet)?;
        let dims = fit_dimensions(first.width(), first.height(), max_width, max_height);
        let working = pages.iter().map(|p| resize_page(p, dims)).collect();
        Ok((working, pages))
    }

    /// Replace the whole page set (e.g. with the output of a removal run).
    /// The median cache is dropped and the median is recomputed for the current sample count.
    pub fn replace_pages(&mut self, pages: Vec<RgbImage>) -> Result<()> {
        let (working, original) = Self::derive_working(pages, self.max_width, self.max_height)?;
        self.working = working;
        self.original = original;
        self.median_cache.clear();
        self.current_page_index = self.current_page_index.min(self.working.len() - 1);

        let count = clamp_sample_count(self.median_sample_count, self.working.len(), self.median_cap);
        self.load_median(count)?;
        info!("Page set replaced: {} pages", self.working.len());
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.working.len()
    }

    pub fn working_pages(&self) -> &[RgbImage] {
        &self.working
    }

    pub fn original_pages(&self) -> &[RgbImage] {
        &self.original
    }

    pub fn working_dimensions(&self) -> (u32, u32) {
        self.working[0].dimensions()
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn current_working_page(&self) -> &RgbImage {
        &self.working[self.current_page_index]
    }

    /// Returns true if the index moved
    pub fn prev_page(&mut self) -> bool {
        if self.current_page_index > 0 {
            self.current_page_index -= 1;
            true
        } else {
            false
        }
    }

    /// Returns true if the index moved
    pub fn next_page(&mut self) -> bool {
        if self.current_page_index + 1 < self.working.len() {
            self.current_page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn median_sample_count(&self) -> usize {
        self.median_sample_count
    }

    pub fn median_cap(&self) -> usize {
        self.median_cap
    }

    /// Set how many leading pages feed the median image.
    ///
    /// Counts above 10 are bucketed, then everything is clamped to
    /// `[1, min(page_count, median_cap)]`. Results are cached by effective count.
    pub fn set_median_sample_count(&mut self, requested: usize) -> Result<()> {
        let bucketed = bucket_sample_count(requested);
        let count = clamp_sample_count(bucketed, self.working.len(), self.median_cap);
        if count == self.median_sample_count {
            return Ok(());
        }
        self.load_median(count)
    }

    fn load_median(&mut self, count: usize) -> Result<()> {
        let median = match self.median_cache.get(&count) {
            Some(cached) => {
                debug!("Median image for {} pages served from cache", count);
                cached.clone()
            }
            None => {
                debug!("Computing median image over {} pages", count);
                let computed = median_image(&self.working, count)?;
                self.median_cache.insert(count, computed.clone());
                computed
            }
        };

        self.median_gray = to_gray(&median);
        self.median_bgr = median;
        self.median_sample_count = count;
        Ok(())
    }

    pub fn median_image(&self) -> &RgbImage {
        &self.median_bgr
    }

    pub fn median_gray(&self) -> &GrayImage {
        &self.median_gray
    }

    /// Grayscale median restricted to `mask`
    pub fn masked_median_gray(&self, mask: &GrayImage) -> GrayImage {
        let mask = resize_mask_nearest(mask, self.median_gray.dimensions());
        mask_and(&self.median_gray, &mask)
    }

    /// The image an editor shows: the current page, or the median once more than one page is sampled
    pub fn display_image(&self) -> &RgbImage {
        if self.median_sample_count <= 1 {
            self.current_working_page()
        } else {
            &self.median_bgr
        }
    }

    pub fn cached_median_count(&self) -> usize {
        self.median_cache.len()
    }
}
