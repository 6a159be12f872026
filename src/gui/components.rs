// src/gui/components.rs - Framebuffer drawing primitives

use bresenham::Bresenham;

/// Pack an RGB triple as 0xRRGGBB
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn put_pixel(buffer: &mut [u32], x: isize, y: isize, width: usize, height: usize, color: u32) {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return;
    }
    let idx = y as usize * width + x as usize;
    if idx < buffer.len() {
        buffer[idx] = color;
    }
}

/// Draw a line segment
pub fn draw_line(buffer: &mut [u32], from: (isize, isize), to: (isize, isize),
                 width: usize, height: usize, color: u32) {
    for (x, y) in Bresenham::new(from, to) {
        put_pixel(buffer, x, y, width, height, color);
    }
    put_pixel(buffer, to.0, to.1, width, height, color);
}

/// Draw a circle outline `thickness` pixels wide
pub fn draw_circle_outline(buffer: &mut [u32], center: (isize, isize), radius: usize, thickness: usize,
                           width: usize, height: usize, color: u32) {
    let outer = radius as isize;
    let inner = radius.saturating_sub(thickness.max(1)) as isize;
    let (outer_sq, inner_sq) = (outer * outer, inner * inner);

    for dy in -outer..=outer {
        for dx in -outer..=outer {
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= outer_sq && dist_sq > inner_sq {
                put_pixel(buffer, center.0 + dx, center.1 + dy, width, height, color);
            }
        }
    }
}

/// Draw a square outline centred at `center` with half-side `radius`
pub fn draw_square_outline(buffer: &mut [u32], center: (isize, isize), radius: usize, thickness: usize,
                           width: usize, height: usize, color: u32) {
    let r = radius as isize;
    let t = thickness.max(1) as isize;
    for dy in -r..=r {
        for dx in -r..=r {
            let on_edge = dx.abs() > r - t || dy.abs() > r - t;
            if on_edge {
                put_pixel(buffer, center.0 + dx, center.1 + dy, width, height, color);
            }
        }
    }
}

/// Draw a filled rectangle
pub fn draw_rect(buffer: &mut [u32], x: usize, y: usize, width_px: usize, height_px: usize,
             buffer_width: usize, buffer_height: usize, color: u32) {
    for py in y..std::cmp::min(y + height_px, buffer_height) {
        for px in x..std::cmp::min(x + width_px, buffer_width) {
            let idx = py * buffer_width + px;
            if idx < buffer.len() {
                buffer[idx] = color;
            }
        }
    }
}
