// src/mask_store.rs - Mask layers and the undo/redo snapshot stacks

use std::path::Path;

use image::GrayImage;
use log::{info, warn};

use crate::errors::Result;
use crate::image_io::{load_mask_file, save_mask_file};
use crate::image_utils::{binarize, mask_or, resize_mask_nearest};
use crate::mode::Mode;

/// A deep copy of the committed and temporary layers
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub final_mask: GrayImage,
    pub temp_mask: GrayImage,
}

/// Owns every mask layer of an editing session.
///
/// All layers share the working-image dimensions and only ever hold 0 or 255.
pub struct MaskStore {
    width: u32,
    height: u32,
    final_mask: GrayImage,
    temp_mask: GrayImage,
    temp_mask_after_threshold: GrayImage,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    points: Vec<(i32, i32)>,
    generation: u64,
}

impl MaskStore {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            final_mask: GrayImage::new(width, height),
            temp_mask: GrayImage::new(width, height),
            temp_mask_after_threshold: GrayImage::new(width, height),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            points: Vec::new(),
            generation: 0,
        }
    }

    /// Bumped on every change to a mask layer; lets views cache derived images
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn final_mask(&self) -> &GrayImage {
        &self.final_mask
    }

    pub fn temp_mask(&self) -> &GrayImage {
        &self.temp_mask
    }

    pub fn temp_mask_after_threshold(&self) -> &GrayImage {
        &self.temp_mask_after_threshold
    }

    pub(crate) fn final_mask_mut(&mut self) -> &mut GrayImage {
        self.touch();
        &mut self.final_mask
    }

    pub(crate) fn temp_mask_mut(&mut self) -> &mut GrayImage {
        self.touch();
        &mut self.temp_mask
    }

    pub(crate) fn set_final_mask(&mut self, mask: GrayImage) {
        debug_assert_eq!(mask.dimensions(), self.dimensions());
        self.final_mask = mask;
        self.touch();
    }

    pub(crate) fn set_temp_mask(&mut self, mask: GrayImage) {
        debug_assert_eq!(mask.dimensions(), self.dimensions());
        self.temp_mask = mask;
        self.touch();
    }

    pub(crate) fn set_temp_mask_after_threshold(&mut self, mask: GrayImage) {
        debug_assert_eq!(mask.dimensions(), self.dimensions());
        self.temp_mask_after_threshold = mask;
        self.touch();
    }

    /// The pixels currently selected: committed OR the mode's temporary layer
    pub fn effective_mask(&self, mode: Mode) -> GrayImage {
        match mode {
            Mode::Threshold => mask_or(&self.final_mask, &self.temp_mask_after_threshold),
            _ => mask_or(&self.final_mask, &self.temp_mask),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            final_mask: self.final_mask.clone(),
            temp_mask: self.temp_mask.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.final_mask = snapshot.final_mask;
        self.temp_mask = snapshot.temp_mask;
        self.temp_mask_after_threshold = self.temp_mask.clone();
        self.touch();
    }

    /// Push the current layer pair; any pending redo history is invalidated
    pub fn save_state(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
    }

    /// No-op when there is nothing to undo
    pub fn undo(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(previous);
        }
    }

    /// No-op when there is nothing to redo
    pub fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(next);
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear both temporary layers
    pub fn reset_temp(&mut self) {
        self.temp_mask = GrayImage::new(self.width, self.height);
        self.temp_mask_after_threshold = GrayImage::new(self.width, self.height);
        self.touch();
    }

    /// Hard reset: blank layers, no history, no pending points. Not undoable.
    pub fn reset(&mut self) {
        self.final_mask = GrayImage::new(self.width, self.height);
        self.reset_temp();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.points.clear();
        info!("Mask reset");
    }

    /// Resize every layer if the working size changed (e.g. after the page set was replaced)
    pub fn conform_to(&mut self, dimensions: (u32, u32)) {
        if dimensions == self.dimensions() {
            return;
        }
        warn!(
            "Mask size {}x{} differs from working size {}x{}, resizing",
            self.width, self.height, dimensions.0, dimensions.1
        );
        self.final_mask = binarize(&resize_mask_nearest(&self.final_mask, dimensions));
        self.temp_mask = binarize(&resize_mask_nearest(&self.temp_mask, dimensions));
        self.temp_mask_after_threshold =
            binarize(&resize_mask_nearest(&self.temp_mask_after_threshold, dimensions));
        self.width = dimensions.0;
        self.height = dimensions.1;
        self.touch();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.points.clear();
    }

    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    pub(crate) fn push_point(&mut self, point: (i32, i32)) {
        self.points.push(point);
    }

    pub(crate) fn take_points(&mut self) -> Vec<(i32, i32)> {
        std::mem::take(&mut self.points)
    }

    pub(crate) fn clear_points(&mut self) {
        self.points.clear();
    }

    /// Load a mask file into the committed layer.
    ///
    /// A mismatched size is corrected by resizing; a missing or unreadable file
    /// leaves a blank committed mask. Both cases are logged, never raised.
    /// Returns true if the file was used.
    pub fn load_mask<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        let loaded = match load_mask_file(path) {
            Ok(mask) => mask,
            Err(e) => {
                warn!("Could not load mask from {}: {}. Using a blank mask.", path.display(), e);
                self.final_mask = GrayImage::new(self.width, self.height);
                self.reset_temp();
                return false;
            }
        };

        let loaded = if loaded.dimensions() != self.dimensions() {
            warn!(
                "Loaded mask is {}x{}, resizing to working size {}x{}",
                loaded.width(),
                loaded.height(),
                self.width,
                self.height
            );
            resize_mask_nearest(&loaded, self.dimensions())
        } else {
            loaded
        };

        self.final_mask = binarize(&loaded);
        self.reset_temp();
        info!("Mask loaded from {}", path.display());
        true
    }

    /// Save the effective mask (`final OR temp`) as a single-channel PNG
    pub fn save_mask<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let effective = mask_or(&self.final_mask, &self.temp_mask);
        save_mask_file(&effective, path.as_ref())?;
        info!("Mask saved as {}", path.as_ref().display());
        Ok(())
    }
}
