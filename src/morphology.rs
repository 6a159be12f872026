use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::cursor::BrushShape;
use crate::image_utils::in_bounds;

/// One iteration of erosion with a 3x3 square structuring element
pub fn erode_mask(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::erode(mask, Norm::LInf, 1)
}

/// One iteration of dilation with a 3x3 square structuring element
pub fn dilate_mask(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::dilate(mask, Norm::LInf, 1)
}

/// Drop consecutive duplicates and any closing points that repeat the first one
fn normalize_polygon(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut poly: Vec<(i32, i32)> = Vec::with_capacity(points.len());
    for &p in points {
        if poly.last() != Some(&p) {
            poly.push(p);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    poly
}

/// Fill the closed polygon through `points` with `value`.
///
/// Degenerate strokes still mark something: a single point sets one pixel and
/// two points draw the segment between them.
pub fn fill_polygon(mask: &mut GrayImage, points: &[(i32, i32)], value: u8) {
    let poly = normalize_polygon(points);
    let color = Luma([value]);

    match poly.len() {
        0 => {}
        1 => {
            let (x, y) = poly[0];
            if in_bounds(x, y, mask.width(), mask.height()) {
                mask.put_pixel(x as u32, y as u32, color);
            }
        }
        2 => {
            let (a, b) = (poly[0], poly[1]);
            draw_line_segment_mut(mask, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), color);
        }
        _ => {
            let vertices: Vec<Point<i32>> = poly.iter().map(|&(x, y)| Point::new(x, y)).collect();
            draw_polygon_mut(mask, &vertices, color);
        }
    }
}

/// Stamp a filled brush of the given radius centred at `center`
pub fn stamp_brush(mask: &mut GrayImage, center: (i32, i32), radius: u32, shape: BrushShape, value: u8) {
    let color = Luma([value]);
    match shape {
        BrushShape::Circle => draw_filled_circle_mut(mask, center, radius as i32, color),
        BrushShape::Square => {
            let r = radius as i32;
            let side = 2 * radius + 1;
            let rect = Rect::at(center.0 - r, center.1 - r).of_size(side, side);
            draw_filled_rect_mut(mask, rect, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_utils::count_selected;

    fn block(size: u32, x0: u32, y0: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let inside = x >= x0 && x < x0 + side && y >= y0 && y < y0 + side;
            Luma([if inside { 255 } else { 0 }])
        })
    }

    #[test]
    fn erode_and_dilate_use_a_3x3_square() {
        let mask = block(11, 3, 3, 5);
        assert_eq!(count_selected(&erode_mask(&mask)), 9);
        assert_eq!(count_selected(&dilate_mask(&mask)), 49);
    }

    #[test]
    fn closing_point_is_dropped_before_filling() {
        let poly = normalize_polygon(&[(1, 1), (1, 1), (8, 1), (8, 8), (1, 8), (1, 1)]);
        assert_eq!(poly, vec![(1, 1), (8, 1), (8, 8), (1, 8)]);
    }

    #[test]
    fn square_polygon_fills_interior() {
        let mut mask = GrayImage::new(12, 12);
        fill_polygon(&mut mask, &[(2, 2), (9, 2), (9, 9), (2, 9), (2, 2)], 255);
        assert_eq!(mask.get_pixel(5, 5)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(11, 11)[0], 0);
    }

    #[test]
    fn square_brush_covers_full_side() {
        let mut mask = GrayImage::new(20, 20);
        stamp_brush(&mut mask, (10, 10), 2, BrushShape::Square, 255);
        assert_eq!(count_selected(&mask), 25);
    }
}
