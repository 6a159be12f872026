// src/cursor.rs - Brush cursor for manual mask drawing

use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushShape {
    Circle,
    Square,
}

/// Brush shape, size and position in working-image coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub shape: BrushShape,
    pub position: (i32, i32),
    /// Outline thickness of the on-screen preview
    pub thickness: u32,
    size: u32,
    min_size: u32,
    max_size: u32,
}

impl Cursor {
    pub fn new(size: u32, min_size: u32, max_size: u32, thickness: u32) -> Self {
        Self {
            shape: BrushShape::Circle,
            position: (0, 0),
            thickness,
            size: size.max(min_size).min(max_size),
            min_size,
            max_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cursor_size,
            config.cursor_min_size,
            config.cursor_max_size,
            config.cursor_thickness,
        )
    }

    /// Brush radius
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Grow or shrink by one step per wheel notch
    pub fn adjust_size(&mut self, wheel_delta: i32) {
        let size = self.size as i64 + wheel_delta.signum() as i64;
        self.size = size.max(self.min_size as i64).min(self.max_size as i64) as u32;
    }

    pub fn toggle_shape(&mut self) {
        self.shape = match self.shape {
            BrushShape::Circle => BrushShape::Square,
            BrushShape::Square => BrushShape::Circle,
        };
        log::info!("Cursor shape changed to {:?}", self.shape);
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.position = (x, y);
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(10, 1, 50, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_stays_within_bounds() {
        let mut cursor = Cursor::new(2, 1, 3, 2);
        cursor.adjust_size(1);
        cursor.adjust_size(120);
        assert_eq!(cursor.size(), 3);
        cursor.adjust_size(-1);
        cursor.adjust_size(-5);
        cursor.adjust_size(-1);
        assert_eq!(cursor.size(), 1);
    }

    #[test]
    fn toggle_alternates_shape() {
        let mut cursor = Cursor::default();
        assert_eq!(cursor.shape, BrushShape::Circle);
        cursor.toggle_shape();
        assert_eq!(cursor.shape, BrushShape::Square);
        cursor.toggle_shape();
        assert_eq!(cursor.shape, BrushShape::Circle);
    }
}
