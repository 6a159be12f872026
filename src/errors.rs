use thiserror::Error;
use std::io;
use std::path::PathBuf;

use crate::mode::Mode;

/// Custom error types for the watermark remover
#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigParse {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Parameter serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected one parameter record per page ({pages} pages), got {params}")]
    ParameterCount { pages: usize, params: usize },

    #[error("Mode transition {from:?} -> {to:?} is not allowed")]
    InvalidTransition { from: Mode, to: Mode },

    #[error("Page set is empty")]
    EmptyPageSet,

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("GUI error: {0}")]
    Gui(String),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, WatermarkError>;
