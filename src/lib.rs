// src/lib.rs - Library interface for the watermark remover

pub mod config;
pub mod cursor;
pub mod errors;
pub mod events;
pub mod gui;
pub mod image_io;
pub mod image_store;
pub mod image_utils;
pub mod inpaint;
pub mod mask_manipulator;
pub mod mask_store;
pub mod median;
pub mod mode;
pub mod morphology;
pub mod parameters;
pub mod pipeline;
pub mod removal;
pub mod session;

// Re-export commonly used types and functions
pub use config::Config;
pub use errors::{Result, WatermarkError};
pub use image_io::{load_pages, save_pages};
pub use image_store::ImageStore;
pub use mask_store::{MaskStore, Snapshot};
pub use median::median_image;
pub use mode::{Mode, ModeStateMachine, MorphologyTarget};
pub use parameters::{ParamField, ParameterStore, RemovalMode, RemovalParams};
pub use pipeline::run_headless;
pub use removal::{ProgressSink, WatermarkRemovalEngine};
pub use session::EditingSession;
