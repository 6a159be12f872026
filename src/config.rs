// src/config.rs - Configuration for the watermark remover, loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{WatermarkError, Result};
use crate::parameters::RemovalParams;

/// Configuration for the watermark remover
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,

    #[serde(default = "default_output_path")]
    pub output_path: String,

    #[serde(default)]
    pub mask_path: Option<String>,

    // Working-image bound used for all interactive editing
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_max_height")]
    pub max_height: u32,

    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Hard cap on the number of pages sampled for the median image
    #[serde(default = "default_median_cap")]
    pub median_cap: usize,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    // Removal engine
    #[serde(default = "default_inpaint_radius")]
    pub inpaint_radius: f32,

    #[serde(default = "default_sharpen_sigma")]
    pub sharpen_sigma: f32,

    // Brush cursor
    #[serde(default = "default_cursor_size")]
    pub cursor_size: u32,

    #[serde(default = "default_cursor_min_size")]
    pub cursor_min_size: u32,

    #[serde(default = "default_cursor_max_size")]
    pub cursor_max_size: u32,

    #[serde(default = "default_cursor_thickness")]
    pub cursor_thickness: u32,

    // Threshold sliders
    #[serde(default = "default_threshold_min")]
    pub threshold_min: u8,

    #[serde(default = "default_threshold_max")]
    pub threshold_max: u8,

    /// Record every page starts with when the page set is (re)loaded
    #[serde(default)]
    pub default_parameters: RemovalParams,
}

fn default_input_path() -> String {
    "./input.pdf".to_string()
}

fn default_output_path() -> String {
    "./output.pdf".to_string()
}

fn default_max_width() -> u32 {
    1920
}

fn default_max_height() -> u32 {
    1080
}

fn default_dpi() -> u32 {
    200
}

fn default_median_cap() -> usize {
    50
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_inpaint_radius() -> f32 {
    2.0
}

fn default_sharpen_sigma() -> f32 {
    2.0
}

fn default_cursor_size() -> u32 {
    10
}

fn default_cursor_min_size() -> u32 {
    1
}

fn default_cursor_max_size() -> u32 {
    50
}

fn default_cursor_thickness() -> u32 {
    2
}

fn default_threshold_min() -> u8 {
    1
}

fn default_threshold_max() -> u8 {
    255
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            mask_path: None,
            max_width: default_max_width(),
            max_height: default_max_height(),
            dpi: default_dpi(),
            median_cap: default_median_cap(),
            jpeg_quality: default_jpeg_quality(),
            inpaint_radius: default_inpaint_radius(),
            sharpen_sigma: default_sharpen_sigma(),
            cursor_size: default_cursor_size(),
            cursor_min_size: default_cursor_min_size(),
            cursor_max_size: default_cursor_max_size(),
            cursor_thickness: default_cursor_thickness(),
            threshold_min: default_threshold_min(),
            threshold_max: default_threshold_max(),
            default_parameters: RemovalParams::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WatermarkError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            WatermarkError::ConfigParse { source, .. } => WatermarkError::ConfigParse {
                source,
                path: path.to_path_buf(),
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| WatermarkError::ConfigParse {
            source,
            path: Default::default(),
        })
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(WatermarkError::Config(
                "max_width and max_height must be > 0".to_string(),
            ));
        }

        if self.dpi == 0 {
            return Err(WatermarkError::Config("dpi must be > 0".to_string()));
        }

        if self.median_cap == 0 {
            return Err(WatermarkError::Config(
                "median_cap must be > 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(WatermarkError::Config(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        if self.inpaint_radius <= 0.0 {
            return Err(WatermarkError::Config(
                "inpaint_radius must be > 0.0".to_string(),
            ));
        }

        if self.sharpen_sigma <= 0.0 {
            return Err(WatermarkError::Config(
                "sharpen_sigma must be > 0.0".to_string(),
            ));
        }

        if self.cursor_min_size == 0 || self.cursor_min_size > self.cursor_max_size {
            return Err(WatermarkError::Config(
                "cursor_min_size must be > 0 and <= cursor_max_size".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            WatermarkError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}
