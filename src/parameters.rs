// src/parameters.rs - Per-page removal parameters with optional broadcast

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WatermarkError};

/// How pixels inside the colour band are replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Overwrite with the page's most frequent colour
    Fill,
    /// Reconstruct from surrounding pixels
    Inpaint,
}

/// Removal parameters of one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalParams {
    pub r_min: u8,
    pub r_max: u8,
    pub g_min: u8,
    pub g_max: u8,
    pub b_min: u8,
    pub b_max: u8,
    /// Unsharp-mask weight, practical range 0.0..=2.5
    pub sharpen_weight: f32,
    pub mode: RemovalMode,
}

impl Default for RemovalParams {
    fn default() -> Self {
        Self {
            r_min: 90,
            r_max: 240,
            g_min: 90,
            g_max: 240,
            b_min: 90,
            b_max: 240,
            sharpen_weight: 0.0,
            mode: RemovalMode::Fill,
        }
    }
}

impl RemovalParams {
    /// Lower colour bound as an RGB triple
    pub fn lower_rgb(&self) -> [u8; 3] {
        [self.r_min, self.g_min, self.b_min]
    }

    /// Upper colour bound as an RGB triple
    pub fn upper_rgb(&self) -> [u8; 3] {
        [self.r_max, self.g_max, self.b_max]
    }

    /// Slider positions are tenths of the weight
    pub fn sharpen_from_slider(raw: u32) -> f32 {
        raw as f32 / 10.0
    }
}

/// An editable field of [`RemovalParams`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    RMin,
    RMax,
    GMin,
    GMax,
    BMin,
    BMax,
    Sharpen,
    Mode,
}

impl ParamField {
    pub const ALL: [ParamField; 8] = [
        ParamField::RMin,
        ParamField::RMax,
        ParamField::GMin,
        ParamField::GMax,
        ParamField::BMin,
        ParamField::BMax,
        ParamField::Sharpen,
        ParamField::Mode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamField::RMin => "r_min",
            ParamField::RMax => "r_max",
            ParamField::GMin => "g_min",
            ParamField::GMax => "g_max",
            ParamField::BMin => "b_min",
            ParamField::BMax => "b_max",
            ParamField::Sharpen => "sharpen",
            ParamField::Mode => "mode",
        }
    }

    pub fn next(self) -> ParamField {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Read a field as a slider value (sharpen in tenths, mode 1 = fill)
    pub fn get(self, params: &RemovalParams) -> f32 {
        match self {
            ParamField::RMin => params.r_min as f32,
            ParamField::RMax => params.r_max as f32,
            ParamField::GMin => params.g_min as f32,
            ParamField::GMax => params.g_max as f32,
            ParamField::BMin => params.b_min as f32,
            ParamField::BMax => params.b_max as f32,
            ParamField::Sharpen => params.sharpen_weight * 10.0,
            ParamField::Mode => match params.mode {
                RemovalMode::Fill => 1.0,
                RemovalMode::Inpaint => 0.0,
            },
        }
    }

    /// Write a slider value into a field; colour bounds saturate to 0..=255
    pub fn apply(self, params: &mut RemovalParams, value: f32) {
        let channel = value.round().clamp(0.0, 255.0) as u8;
        match self {
            ParamField::RMin => params.r_min = channel,
            ParamField::RMax => params.r_max = channel,
            ParamField::GMin => params.g_min = channel,
            ParamField::GMax => params.g_max = channel,
            ParamField::BMin => params.b_min = channel,
            ParamField::BMax => params.b_max = channel,
            ParamField::Sharpen => {
                params.sharpen_weight = RemovalParams::sharpen_from_slider(value.max(0.0).round() as u32)
            }
            ParamField::Mode => {
                params.mode = if value >= 0.5 { RemovalMode::Fill } else { RemovalMode::Inpaint }
            }
        }
    }
}

/// One parameter record per page; `current` follows the active page
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    records: Vec<RemovalParams>,
    current: usize,
    apply_same_parameters: bool,
    defaults: RemovalParams,
}

impl ParameterStore {
    pub fn new(page_count: usize, defaults: RemovalParams) -> Self {
        Self {
            records: vec![defaults; page_count.max(1)],
            current: 0,
            apply_same_parameters: false,
            defaults,
        }
    }

    /// Recreate default records for a freshly loaded page set
    pub fn reset(&mut self, page_count: usize) {
        self.records = vec![self.defaults; page_count.max(1)];
        self.current = 0;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RemovalParams] {
        &self.records
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &RemovalParams {
        &self.records[self.current]
    }

    pub fn select(&mut self, index: usize) {
        self.current = index.min(self.records.len() - 1);
    }

    pub fn apply_same_parameters(&self) -> bool {
        self.apply_same_parameters
    }

    /// Flip the broadcast flag; returns the new state
    pub fn toggle_apply_same_parameters(&mut self) -> bool {
        self.apply_same_parameters = !self.apply_same_parameters;
        log::info!("Apply same parameters to all pages: {}", self.apply_same_parameters);
        self.apply_same_parameters
    }

    /// Copy the active record into every other record
    pub fn set_all_parameters_the_same_as_current(&mut self) {
        let current = self.records[self.current];
        self.records.iter_mut().for_each(|r| *r = current);
    }

    /// Mutate one field of the active record, echoing it to all records while broadcasting
    pub fn set_field(&mut self, field: ParamField, value: f32) {
        field.apply(&mut self.records[self.current], value);
        if self.apply_same_parameters {
            self.set_all_parameters_the_same_as_current();
        }
    }

    /// Replace the active record wholesale, honouring the broadcast flag
    pub fn set_current(&mut self, params: RemovalParams) {
        self.records[self.current] = params;
        if self.apply_same_parameters {
            self.set_all_parameters_the_same_as_current();
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load records saved with [`save_json`](Self::save_json); the count must match the page set
    pub fn load_json<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let records: Vec<RemovalParams> = serde_json::from_str(&content)?;
        if records.len() != self.records.len() {
            return Err(WatermarkError::ParameterCount {
                pages: self.records.len(),
                params: records.len(),
            });
        }
        self.records = records;
        Ok(())
    }
}
