//! Debug overlay: dial circles and selected pointer lines drawn on the frame.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use meter_dials_core::{DialRecord, PolarLine};
use meter_dials_decoder::ReadingResult;

pub const DIAL_COLOR: Rgb<u8> = Rgb([255, 180, 0]);
pub const POINTER_COLOR: Rgb<u8> = Rgb([80, 200, 120]);

/// Outline every dial (two pixels wide).
pub fn draw_dials(canvas: &mut RgbImage, dials: &[DialRecord]) {
    for d in dials {
        let center = (d.x.round() as i32, d.y.round() as i32);
        let r = d.r.round() as i32;
        draw_hollow_circle_mut(canvas, center, r, DIAL_COLOR);
        if r > 1 {
            draw_hollow_circle_mut(canvas, center, r - 1, DIAL_COLOR);
        }
    }
}

/// Draw `line` as a segment across `dial`.
pub fn draw_pointer(canvas: &mut RgbImage, dial: &DialRecord, line: &PolarLine) {
    let (a, b) = line.segment_around(dial.center(), dial.r);
    draw_line_segment_mut(canvas, (a.x, a.y), (b.x, b.y), POINTER_COLOR);
}

/// Copy of `frame` with the dials and pointer lines of `result` drawn on it.
pub fn render_overlay(frame: &RgbImage, result: &ReadingResult) -> RgbImage {
    let mut canvas = frame.clone();
    let dials: Vec<DialRecord> = result.dial_records().copied().collect();
    draw_dials(&mut canvas, &dials);
    for d in &result.dials {
        draw_pointer(&mut canvas, &d.dial, &d.line);
    }
    canvas
}

pub fn save_overlay(canvas: &RgbImage, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
    canvas.save(path)
}
