use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::CropRect;

/// Number of dials on a register, read left to right (most significant first).
pub const DIAL_COUNT: usize = 5;

/// One located dial: center and radius in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DialRecord {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl DialRecord {
    pub fn new(x: f32, y: f32, r: f32) -> Self {
        Self { x, y, r }
    }

    /// Finite coordinates and a strictly positive radius.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.r.is_finite() && self.r > 0.0
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    /// Square bounding box of side `2r` around the center, clipped to an image
    /// of `width` x `height` pixels.
    ///
    /// Returns `None` when nothing of the box lies inside the image.
    pub fn crop_rect(&self, width: usize, height: usize) -> Option<CropRect> {
        if !self.is_well_formed() {
            return None;
        }
        let x = (self.x - self.r).round().max(0.0) as usize;
        let y = (self.y - self.r).round().max(0.0) as usize;
        if x >= width || y >= height {
            return None;
        }
        let side = (2.0 * self.r).round() as usize;
        let rect = CropRect {
            x,
            y,
            width: side.min(width - x),
            height: side.min(height - y),
        };
        (!rect.is_empty()).then_some(rect)
    }
}

/// Sort dials by ascending `x` (reading order).
pub fn sort_left_to_right(dials: &mut [DialRecord]) {
    dials.sort_by(|a, b| a.x.total_cmp(&b.x));
}
