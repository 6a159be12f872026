// src/gui/render.rs - Rendering functions

use image::RgbImage;

use crate::cursor::BrushShape;
use crate::image_utils::{blend_mask, gray_to_rgb, resize_mask_nearest};
use crate::mode::Mode;
use super::components::{draw_circle_outline, draw_line, draw_rect, draw_square_outline, rgb};
use super::state::{
    GuiState, COLOR_BACKGROUND, COLOR_CURSOR, COLOR_PAGE_CURRENT, COLOR_PAGE_MARK, COLOR_STROKE,
    WINDOW_HEIGHT, WINDOW_WIDTH,
};

fn blit(buffer: &mut [u32], image: &RgbImage, scale: f32, offset_x: usize, offset_y: usize) {
    let shown_w = ((image.width() as f32 * scale) as usize).min(WINDOW_WIDTH - offset_x);
    let shown_h = ((image.height() as f32 * scale) as usize).min(WINDOW_HEIGHT - offset_y);

    for dy in 0..shown_h {
        let sy = ((dy as f32 / scale) as u32).min(image.height() - 1);
        for dx in 0..shown_w {
            let sx = ((dx as f32 / scale) as u32).min(image.width() - 1);
            let p = image.get_pixel(sx, sy);
            buffer[(dy + offset_y) * WINDOW_WIDTH + dx + offset_x] = rgb(p[0], p[1], p[2]);
        }
    }
}

/// The image for the current mode before overlays
fn base_image(state: &mut GuiState) -> RgbImage {
    if state.show_masked_median {
        let session = &state.session;
        return gray_to_rgb(&session.images().masked_median_gray(session.masks().final_mask()));
    }
    if state.session.mode() == Mode::Adjust {
        return state.adjust_preview().clone();
    }

    let shown = state.session.images().display_image();
    let mask = state.session.effective_mask();
    let mask = if mask.dimensions() == shown.dimensions() {
        mask
    } else {
        resize_mask_nearest(&mask, shown.dimensions())
    };
    blend_mask(shown, &mask)
}

/// Update the buffer for display
pub fn update_buffer(state: &mut GuiState) {
    for pixel in &mut state.buffer {
        *pixel = COLOR_BACKGROUND;
    }

    let image = base_image(state);
    blit(&mut state.buffer, &image, state.scale_factor, state.offset_x, state.offset_y);

    match state.session.mode() {
        Mode::Select => draw_stroke(state),
        Mode::Draw => draw_cursor(state),
        _ => {}
    }

    draw_page_strip(state);
}

/// Pending polygon points as a polyline
fn draw_stroke(state: &mut GuiState) {
    let points: Vec<(isize, isize)> = state
        .session
        .masks()
        .points()
        .iter()
        .map(|&(x, y)| state.to_window_coords(x, y))
        .collect();

    for pair in points.windows(2) {
        draw_line(&mut state.buffer, pair[0], pair[1], WINDOW_WIDTH, WINDOW_HEIGHT, COLOR_STROKE);
    }
}

fn draw_cursor(state: &mut GuiState) {
    let cursor = state.session.cursor();
    let (x, y) = cursor.position;
    let center = state.to_window_coords(x, y);
    let radius = (cursor.size() as f32 * state.scale_factor).round().max(1.0) as usize;
    let thickness = cursor.thickness as usize;

    match cursor.shape {
        BrushShape::Circle => draw_circle_outline(
            &mut state.buffer, center, radius, thickness, WINDOW_WIDTH, WINDOW_HEIGHT, COLOR_CURSOR,
        ),
        BrushShape::Square => draw_square_outline(
            &mut state.buffer, center, radius, thickness, WINDOW_WIDTH, WINDOW_HEIGHT, COLOR_CURSOR,
        ),
    }
}

/// One tick per page along the bottom edge, the current page highlighted
fn draw_page_strip(state: &mut GuiState) {
    let images = state.session.images();
    let count = images.page_count();
    if count < 2 {
        return;
    }
    let current = images.current_page_index();
    let slot = (WINDOW_WIDTH / count).max(2);
    let tick = slot.saturating_sub(1).max(1);

    for page in 0..count {
        let color = if page == current { COLOR_PAGE_CURRENT } else { COLOR_PAGE_MARK };
        draw_rect(
            &mut state.buffer,
            page * slot,
            WINDOW_HEIGHT - 4,
            tick,
            4,
            WINDOW_WIDTH,
            WINDOW_HEIGHT,
            color,
        );
    }
}
