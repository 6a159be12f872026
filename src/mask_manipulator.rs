// src/mask_manipulator.rs - Editing operations that mutate the mask layers

use image::GrayImage;
use log::{debug, info};

use crate::cursor::Cursor;
use crate::image_utils::{in_range_gray, mask_and, mask_or, MASK_OFF, MASK_ON};
use crate::mask_store::MaskStore;
use crate::mode::{Mode, MorphologyTarget};
use crate::morphology::{dilate_mask, erode_mask, fill_polygon, stamp_brush};

/// What a brush stroke does to the layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushAction {
    /// Set pixels in the temporary layer
    Draw,
    /// Clear pixels in both the committed and temporary layers
    Erase,
}

/// One morphological iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    Erode,
    Dilate,
}

impl MorphOp {
    fn apply(self, mask: &GrayImage) -> GrayImage {
        match self {
            MorphOp::Erode => erode_mask(mask),
            MorphOp::Dilate => dilate_mask(mask),
        }
    }
}

/// Start a new polygon stroke; snapshots the layers first
pub fn begin_polygon(store: &mut MaskStore, point: (i32, i32)) {
    store.save_state();
    store.clear_points();
    store.push_point(point);
}

pub fn extend_polygon(store: &mut MaskStore, point: (i32, i32)) {
    store.push_point(point);
}

/// Close the pending polygon into the temporary layer and clear the point buffer.
/// Returns false when there was no pending stroke.
pub fn finish_polygon(store: &mut MaskStore) -> bool {
    let points = store.take_points();
    if points.is_empty() {
        return false;
    }
    fill_polygon(store.temp_mask_mut(), &points, MASK_ON);
    debug!("Polygon with {} points filled into temp mask", points.len());
    true
}

/// `temp_after_threshold = inRange(median_gray, min, max) AND temp`.
///
/// Pure in the committed layer. An inverted range (`min > max`) selects nothing.
pub fn apply_threshold(store: &mut MaskStore, median_gray: &GrayImage, min: u8, max: u8) {
    let in_range = in_range_gray(median_gray, min, max);
    let result = mask_and(&in_range, store.temp_mask());
    store.set_temp_mask_after_threshold(result);
}

/// Merge the threshold result into the committed layer and clear both temporary layers
pub fn commit(store: &mut MaskStore) {
    store.save_state();
    let merged = mask_or(store.final_mask(), store.temp_mask_after_threshold());
    store.set_final_mask(merged);
    store.reset_temp();
    info!("Threshold selection committed");
}

/// Stamp the cursor's brush at its position
pub fn brush_stroke(store: &mut MaskStore, cursor: &Cursor, action: BrushAction) {
    let (center, radius, shape) = (cursor.position, cursor.size(), cursor.shape);
    match action {
        BrushAction::Draw => stamp_brush(store.temp_mask_mut(), center, radius, shape, MASK_ON),
        BrushAction::Erase => {
            stamp_brush(store.final_mask_mut(), center, radius, shape, MASK_OFF);
            stamp_brush(store.temp_mask_mut(), center, radius, shape, MASK_OFF);
        }
    }
}

/// Button press in draw mode: snapshot, then the first stamp
pub fn begin_brush(store: &mut MaskStore, cursor: &Cursor, action: BrushAction) {
    store.save_state();
    brush_stroke(store, cursor, action);
}

/// One erode/dilate iteration on the layers the mode targets
pub fn morph(store: &mut MaskStore, mode: Mode, op: MorphOp) {
    store.save_state();
    match MorphologyTarget::for_mode(mode) {
        MorphologyTarget::ThresholdResult => {
            let result = op.apply(store.temp_mask_after_threshold());
            store.set_temp_mask_after_threshold(result);
        }
        MorphologyTarget::CommittedAndTemp => {
            let final_mask = op.apply(store.final_mask());
            let temp_mask = op.apply(store.temp_mask());
            store.set_final_mask(final_mask);
            store.set_temp_mask(temp_mask);
        }
    }
    debug!("{:?} applied in {:?} mode", op, mode);
}
