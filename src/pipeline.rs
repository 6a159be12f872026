// src/pipeline.rs - Headless batch run: load pages, load mask, remove, save

use std::path::Path;

use log::info;

use crate::config::Config;
use crate::errors::{Result, WatermarkError};
use crate::image_io::{load_pages, save_pages};
use crate::image_store::ImageStore;
use crate::mask_store::MaskStore;
use crate::mode::Mode;
use crate::parameters::{ParameterStore, RemovalMode};
use crate::removal::{ProgressSink, WatermarkRemovalEngine};

/// Command-line adjustments applied on top of the configured default parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamOverrides {
    pub mode: Option<RemovalMode>,
    pub sharpen_weight: Option<f32>,
}

/// Remove the watermark from every page of `config.input_path` and write the result
/// to `config.output_path`. Returns the output size in bytes.
///
/// Parameters come from `<mask>.json` when it exists and matches the page count,
/// otherwise every page uses the configured defaults plus `overrides`. A mask
/// file that is missing or cannot be decoded is an `InvalidPath` error.
pub fn run_headless(
    config: &Config,
    mask_path: &Path,
    overrides: ParamOverrides,
    progress: &mut dyn ProgressSink,
) -> Result<u64> {
    let pages = load_pages(&config.input_path, config.dpi);
    let images = ImageStore::from_config(pages, config)?;
    let (width, height) = images.working_dimensions();

    // a blank mask would only sharpen, so an unusable mask file ends the run
    let mut masks = MaskStore::new(width, height);
    if !masks.load_mask(mask_path) {
        return Err(WatermarkError::InvalidPath(mask_path.to_path_buf()));
    }

    let mut defaults = config.default_parameters;
    if let Some(mode) = overrides.mode {
        defaults.mode = mode;
    }
    if let Some(weight) = overrides.sharpen_weight {
        defaults.sharpen_weight = weight;
    }
    let mut params = ParameterStore::new(images.page_count(), defaults);

    let params_path = mask_path.with_extension("json");
    if params_path.exists() {
        match params.load_json(&params_path) {
            Ok(()) => info!("Per-page parameters loaded from {}", params_path.display()),
            Err(e) => log::warn!("Ignoring {}: {}", params_path.display(), e),
        }
    }

    let engine = WatermarkRemovalEngine::from_config(config);
    let cleaned = engine.remove(
        images.original_pages(),
        &masks.effective_mask(Mode::Adjust),
        params.records(),
        progress,
    )?;

    save_pages(&cleaned, &config.output_path, config.dpi, config.jpeg_quality)
}
