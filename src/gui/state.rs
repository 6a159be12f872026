// src/gui/state.rs - GUI state: the editing session plus framebuffer layout

use image::RgbImage;

use crate::parameters::RemovalParams;
use crate::session::EditingSession;

// Constants
pub const WINDOW_WIDTH: usize = 1280;
pub const WINDOW_HEIGHT: usize = 800;

// Colors (in 0xRRGGBB format)
pub const COLOR_BACKGROUND: u32 = 0x303030;  // Dark gray
pub const COLOR_STROKE: u32 = 0x00FF00;      // Green
pub const COLOR_CURSOR: u32 = 0xFF0000;      // Red
pub const COLOR_PAGE_MARK: u32 = 0xD0D0D0;   // Light gray
pub const COLOR_PAGE_CURRENT: u32 = 0xFFFF00; // Yellow

/// Key for the cached ADJUST preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewKey {
    pub page: usize,
    pub params: RemovalParams,
    pub mask_generation: u64,
}

pub struct GuiState {
    pub session: EditingSession,

    // Display state
    pub buffer: Vec<u32>,
    pub scale_factor: f32,
    pub offset_x: usize,
    pub offset_y: usize,

    // Pointer state as last seen from the window
    pub mouse_x: f32,
    pub mouse_y: f32,
    pub left_down: bool,
    pub right_down: bool,

    /// Show gray(median) AND committed mask instead of the page
    pub show_masked_median: bool,

    pub preview: Option<(PreviewKey, RgbImage)>,
}

impl GuiState {
    pub fn new(session: EditingSession) -> Self {
        let mut state = Self {
            session,
            buffer: vec![COLOR_BACKGROUND; WINDOW_WIDTH * WINDOW_HEIGHT],
            scale_factor: 1.0,
            offset_x: 0,
            offset_y: 0,
            mouse_x: 0.0,
            mouse_y: 0.0,
            left_down: false,
            right_down: false,
            show_masked_median: false,
            preview: None,
        };
        state.update_layout();
        state
    }

    /// Fit the working image into the window, keeping the aspect ratio.
    /// Called again after a removal run since the page set may change size.
    pub fn update_layout(&mut self) {
        let (w, h) = self.session.images().working_dimensions();
        let scale_x = WINDOW_WIDTH as f32 / w as f32;
        let scale_y = WINDOW_HEIGHT as f32 / h as f32;
        self.scale_factor = scale_x.min(scale_y);

        let shown_w = (w as f32 * self.scale_factor) as usize;
        let shown_h = (h as f32 * self.scale_factor) as usize;
        self.offset_x = WINDOW_WIDTH.saturating_sub(shown_w) / 2;
        self.offset_y = WINDOW_HEIGHT.saturating_sub(shown_h) / 2;
    }

    /// Window pixel -> working-image pixel (may fall outside the image)
    pub fn to_image_coords(&self, x: f32, y: f32) -> (i32, i32) {
        let ix = (x - self.offset_x as f32) / self.scale_factor;
        let iy = (y - self.offset_y as f32) / self.scale_factor;
        (ix.floor() as i32, iy.floor() as i32)
    }

    /// Working-image pixel -> window pixel
    pub fn to_window_coords(&self, x: i32, y: i32) -> (isize, isize) {
        (
            (x as f32 * self.scale_factor) as isize + self.offset_x as isize,
            (y as f32 * self.scale_factor) as isize + self.offset_y as isize,
        )
    }

    /// The cleaned current page, recomputed only when its inputs changed
    pub fn adjust_preview(&mut self) -> &RgbImage {
        let key = PreviewKey {
            page: self.session.images().current_page_index(),
            params: *self.session.params().current(),
            mask_generation: self.session.masks().generation(),
        };
        let stale = self.preview.as_ref().map_or(true, |(k, _)| *k != key);
        if stale {
            let image = self.session.preview_current_page();
            self.preview = Some((key, image));
        }
        match &self.preview {
            Some((_, image)) => image,
            None => self.session.images().current_working_page(),
        }
    }

    pub fn window_title(&self) -> String {
        let images = self.session.images();
        let (min, max) = self.session.threshold();
        let params = self.session.params().current();
        format!(
            "Watermark Remover | {:?} | page {}/{} | median {} | threshold {}..{} | {} = {} | {}",
            self.session.mode(),
            images.current_page_index() + 1,
            images.page_count(),
            images.median_sample_count(),
            min,
            max,
            self.session.selected_field().name(),
            self.session.selected_field().get(params),
            self.session.status(),
        )
    }
}
