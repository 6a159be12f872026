// src/inpaint.rs - Fast-marching inpainting in the style of Telea (2004)
//
// Unknown pixels are filled in order of their distance from the known region.
// Each one becomes a weighted average of already-known pixels within `radius`,
// weighted by direction (alignment with the front normal), geometric distance
// and level-set distance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use image::{GrayImage, RgbImage};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flag {
    Known,
    Band,
    Inside,
}

/// Heap entry ordered so that the smallest arrival time pops first
#[derive(Clone, Copy)]
struct Front {
    t: f32,
    idx: usize,
}

impl PartialEq for Front {
    fn eq(&self, other: &Self) -> bool {
        self.t.total_cmp(&other.t) == Ordering::Equal && self.idx == other.idx
    }
}

impl Eq for Front {}

impl PartialOrd for Front {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Front {
    fn cmp(&self, other: &Self) -> Ordering {
        other.t.total_cmp(&self.t).then_with(|| other.idx.cmp(&self.idx))
    }
}

const NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

struct Field {
    width: i32,
    height: i32,
    flags: Vec<Flag>,
    t: Vec<f32>,
}

impl Field {
    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    #[inline]
    fn known_t(&self, x: i32, y: i32) -> f32 {
        match self.index(x, y) {
            Some(i) if self.flags[i] != Flag::Inside => self.t[i],
            _ => f32::INFINITY,
        }
    }

    /// Smallest eikonal solution over the four quadrant pairs around (x, y)
    fn arrival_time(&self, x: i32, y: i32) -> f32 {
        let horizontal = [self.known_t(x - 1, y), self.known_t(x + 1, y)];
        let vertical = [self.known_t(x, y - 1), self.known_t(x, y + 1)];
        let mut best = f32::INFINITY;
        for &a in &horizontal {
            for &b in &vertical {
                best = best.min(solve_eikonal(a, b));
            }
        }
        best
    }

    /// Central-difference gradient of T, falling back to one-sided differences
    fn gradient_t(&self, x: i32, y: i32, t_here: f32) -> (f32, f32) {
        let axis = |prev: f32, next: f32| -> f32 {
            match (prev.is_finite(), next.is_finite()) {
                (true, true) => (next - prev) * 0.5,
                (true, false) => t_here - prev,
                (false, true) => next - t_here,
                (false, false) => 0.0,
            }
        };
        (
            axis(self.known_t(x - 1, y), self.known_t(x + 1, y)),
            axis(self.known_t(x, y - 1), self.known_t(x, y + 1)),
        )
    }
}

fn solve_eikonal(a: f32, b: f32) -> f32 {
    match (a.is_finite(), b.is_finite()) {
        (false, false) => f32::INFINITY,
        (true, false) => a + 1.0,
        (false, true) => b + 1.0,
        (true, true) => {
            let d = 2.0 - (a - b) * (a - b);
            if d > 0.0 {
                let s = (a + b + d.sqrt()) * 0.5;
                if s >= a && s >= b {
                    return s;
                }
            }
            a.min(b) + 1.0
        }
    }
}

/// Inpaint every pixel where `mask` is non-zero using pixels within `radius`.
pub fn inpaint_telea(image: &RgbImage, mask: &GrayImage, radius: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if mask.dimensions() != image.dimensions() || !mask.as_raw().iter().any(|&v| v != 0) {
        return out;
    }

    let n = (width * height) as usize;
    let mut field = Field {
        width: width as i32,
        height: height as i32,
        flags: vec![Flag::Known; n],
        t: vec![0.0; n],
    };

    for (i, &m) in mask.as_raw().iter().enumerate() {
        if m != 0 {
            field.flags[i] = Flag::Inside;
            field.t[i] = f32::INFINITY;
        }
    }

    // Initial narrow band: known pixels touching the hole
    let mut heap = BinaryHeap::new();
    for y in 0..field.height {
        for x in 0..field.width {
            let i = (y * field.width + x) as usize;
            if field.flags[i] != Flag::Known {
                continue;
            }
            let touches_hole = NEIGHBOURS.iter().any(|&(dx, dy)| {
                field
                    .index(x + dx, y + dy)
                    .map_or(false, |j| field.flags[j] == Flag::Inside)
            });
            if touches_hole {
                field.flags[i] = Flag::Band;
                heap.push(Front { t: 0.0, idx: i });
            }
        }
    }

    let reach = radius.ceil().max(1.0) as i32;
    let radius_sq = radius * radius;

    while let Some(Front { idx, .. }) = heap.pop() {
        if field.flags[idx] == Flag::Known {
            continue;
        }
        field.flags[idx] = Flag::Known;
        let px = idx as i32 % field.width;
        let py = idx as i32 / field.width;

        for &(dx, dy) in &NEIGHBOURS {
            let (qx, qy) = (px + dx, py + dy);
            let Some(q) = field.index(qx, qy) else { continue };
            if field.flags[q] != Flag::Inside {
                continue;
            }

            let t = field.arrival_time(qx, qy);
            field.t[q] = t;
            fill_pixel(&mut out, &field, qx, qy, t, reach, radius_sq);
            field.flags[q] = Flag::Band;
            heap.push(Front { t, idx: q });
        }
    }

    out
}

fn fill_pixel(out: &mut RgbImage, field: &Field, x: i32, y: i32, t_here: f32, reach: i32, radius_sq: f32) {
    let (gx, gy) = field.gradient_t(x, y, t_here);
    let mut acc = [0.0f32; 3];
    let mut total = 0.0f32;

    for ny in (y - reach)..=(y + reach) {
        for nx in (x - reach)..=(x + reach) {
            let Some(j) = field.index(nx, ny) else { continue };
            if field.flags[j] == Flag::Inside || (nx == x && ny == y) {
                continue;
            }
            let rx = (x - nx) as f32;
            let ry = (y - ny) as f32;
            let dist_sq = rx * rx + ry * ry;
            if dist_sq > radius_sq {
                continue;
            }

            let dist = dist_sq.sqrt();
            let direction = ((rx * gx + ry * gy) / dist).abs().max(1e-6);
            let geometric = 1.0 / dist_sq;
            let level = 1.0 / (1.0 + (field.t[j] - t_here).abs());
            let w = direction * geometric * level;

            let p = out.get_pixel(nx as u32, ny as u32);
            for c in 0..3 {
                acc[c] += w * p[c] as f32;
            }
            total += w;
        }
    }

    if total > 0.0 {
        let pixel = out.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            pixel[c] = (acc[c] / total).round().clamp(0.0, 255.0) as u8;
        }
    }
}
