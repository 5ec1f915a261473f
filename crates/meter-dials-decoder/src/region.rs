//! Per-dial region extraction.
//!
//! A dial region is the square crop around one dial with everything but an
//! annulus between the hub and the bezel zeroed out, then lightly blurred.
//! The annulus is where the pointer is cleanly visible; the hub and the
//! printed numerals near the rim would otherwise dominate the line votes.

use meter_dials_core::{
    gaussian_blur_3x3, CropRect, DialRecord, GrayImage, GrayImageView, PolarLine,
};
use nalgebra::Point2;

/// Outer annulus radius as a fraction of half the crop's shorter side.
pub const OUTER_RADIUS_FRACTION: f32 = 0.95;
/// Inner annulus radius as a fraction of the outer radius.
pub const INNER_RADIUS_FRACTION: f32 = 0.35;

/// Masked, blurred crop around one dial.
#[derive(Clone, Debug)]
pub struct DialRegion {
    /// Where the crop sits in the frame.
    pub rect: CropRect,
    pub image: GrayImage,
}

impl DialRegion {
    /// Center of the crop in region coordinates.
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.image.width as f32 / 2.0, self.image.height as f32 / 2.0)
    }

    /// Map a line found in region coordinates back to frame coordinates.
    pub fn to_frame_line(&self, line: &PolarLine) -> PolarLine {
        line.translated(self.rect.x as f32, self.rect.y as f32)
    }
}

/// Zero every pixel outside `(inner, outer]` from the image center, in place.
pub fn apply_annulus_mask(img: &mut GrayImage) {
    let (w, h) = (img.width, img.height);
    let outer = OUTER_RADIUS_FRACTION * w.min(h) as f32 / 2.0;
    let inner = INNER_RADIUS_FRACTION * outer;
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let (outer2, inner2) = (outer * outer, inner * inner);

    for y in 0..h {
        let dy = y as f32 - cy;
        for x in 0..w {
            let dx = x as f32 - cx;
            let d2 = dx * dx + dy * dy;
            if d2 > outer2 || d2 <= inner2 {
                img.set(x, y, 0);
            }
        }
    }
}

/// Crop, mask and blur the region around `dial`.
///
/// Returns `None` when the dial's bounding box has no pixels inside the frame.
pub fn extract_dial_region(gray: &GrayImageView<'_>, dial: &DialRecord) -> Option<DialRegion> {
    let rect = dial.crop_rect(gray.width, gray.height)?;
    let mut crop = gray.crop(rect);
    if crop.is_empty() {
        return None;
    }
    apply_annulus_mask(&mut crop);
    let image = gaussian_blur_3x3(&crop.view());
    Some(DialRegion { rect, image })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annulus_keeps_only_the_ring() {
        let mut img = GrayImage::from_raw(40, 40, vec![200; 1600]).expect("image");
        apply_annulus_mask(&mut img);
        // outer = 19, inner = 6.65
        assert_eq!(img.get(20, 20), 0, "hub");
        assert_eq!(img.get(20, 25), 0, "inside inner radius");
        assert_eq!(img.get(20, 30), 200, "ring");
        assert_eq!(img.get(1, 1), 0, "corner");
        assert_eq!(img.get(0, 20), 0, "outside outer radius");
    }

    #[test]
    fn region_has_crop_size_and_offset() {
        let img = GrayImage::from_raw(100, 80, vec![120; 8000]).expect("image");
        let dial = DialRecord::new(50.0, 40.0, 20.0);
        let region = extract_dial_region(&img.view(), &dial).expect("region");
        assert_eq!(
            region.rect,
            CropRect {
                x: 30,
                y: 20,
                width: 40,
                height: 40
            }
        );
        assert_eq!((region.image.width, region.image.height), (40, 40));
        assert_eq!(region.image.get(20, 20), 0);
        assert_eq!(region.image.get(20, 30), 120);
    }

    #[test]
    fn region_near_border_is_clipped() {
        let img = GrayImage::from_raw(60, 60, vec![90; 3600]).expect("image");
        let region = extract_dial_region(&img.view(), &DialRecord::new(55.0, 10.0, 20.0))
            .expect("region");
        assert_eq!(region.rect.x, 35);
        assert_eq!(region.rect.y, 0);
        assert_eq!((region.image.width, region.image.height), (25, 40));
    }

    #[test]
    fn region_outside_frame_is_none() {
        let img = GrayImage::new(30, 30);
        assert!(extract_dial_region(&img.view(), &DialRecord::new(200.0, 10.0, 5.0)).is_none());
    }

    #[test]
    fn frame_line_passes_through_the_same_pixel() {
        let region = DialRegion {
            rect: CropRect {
                x: 100,
                y: 50,
                width: 40,
                height: 40,
            },
            image: GrayImage::new(40, 40),
        };
        // vertical line x = 20 in the crop is x = 120 in the frame
        let line = region.to_frame_line(&PolarLine::new(20.0, 0.0));
        assert!((line.rho - 120.0).abs() < 1e-4);
        assert_eq!(line.theta, 0.0);
    }
}
