//! Synthetic meter faces for integration tests.
#![allow(dead_code)]

use image::{GrayImage, Luma};

pub const BACKGROUND: u8 = 90;
pub const FACE: u8 = 225;
pub const POINTER: u8 = 25;

/// One dial to render: center, radius and the compass angle (0 = top,
/// clockwise) the decoder should report for its pointer.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticDial {
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub angle_deg: f32,
}

/// Render bright dial faces on a darker plate, each crossed by a dark
/// pointer bar through its center.
///
/// The decoder reads a line with normal angle `theta` as compass angle
/// `90 - theta`, so the bar is laid along the line whose normal is
/// `(90 - angle) mod 180`. It is `thickness` pixels wide and reaches `0.92 r`
/// on both sides of the center.
pub fn render_meter(w: u32, h: u32, dials: &[SyntheticDial], thickness: f32) -> GrayImage {
    let half = thickness / 2.0;
    GrayImage::from_fn(w, h, |x, y| {
        let (px, py) = (x as f32, y as f32);
        for d in dials {
            let (dx, dy) = (px - d.cx, py - d.cy);
            if dx * dx + dy * dy > d.r * d.r {
                continue;
            }
            let theta = (90.0 - d.angle_deg).rem_euclid(180.0).to_radians();
            let (s, c) = theta.sin_cos();
            let (ux, uy) = (-s, c);
            let along = dx * ux + dy * uy;
            let across = (dx * uy - dy * ux).abs();
            if across <= half && along.abs() <= 0.92 * d.r {
                return Luma([POINTER]);
            }
            return Luma([FACE]);
        }
        Luma([BACKGROUND])
    })
}

/// Five dials in a row with equal spacing `pitch`, first center at `x0`.
pub fn dial_row(x0: f32, y: f32, pitch: f32, r: f32, angles: [f32; 5]) -> Vec<SyntheticDial> {
    angles
        .iter()
        .enumerate()
        .map(|(i, &angle_deg)| SyntheticDial {
            cx: x0 + pitch * i as f32,
            cy: y,
            r,
            angle_deg,
        })
        .collect()
}

/// Filled disk on a flat background.
pub fn render_disk(w: u32, h: u32, center: [f32; 2], radius: f32, fg: u8, bg: u8) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - center[0];
        let dy = y as f32 - center[1];
        Luma([if dx * dx + dy * dy <= radius * radius {
            fg
        } else {
            bg
        }])
    })
}

/// Gaussian-blur a `GrayImage` via `imageproc`.
pub fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let f = image::ImageBuffer::<Luma<f32>, Vec<f32>>::from_fn(w, h, |x, y| {
        Luma([img.get_pixel(x, y)[0] as f32 / 255.0])
    });
    let blurred = imageproc::filter::gaussian_blur_f32(&f, sigma);
    GrayImage::from_fn(w, h, |x, y| {
        let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
        Luma([(v * 255.0).round() as u8])
    })
}
