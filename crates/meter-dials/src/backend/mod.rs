//! Reference [`VisionBackend`] built on `image` and `imageproc`.

mod circles;

pub use circles::hough_circles;

use meter_dials_core::{DialRecord, GrayImage, GrayImageView, PolarLine};
use meter_dials_decoder::{
    EnhanceParams, HoughCircleParams, HoughLineParams, PrimitiveError, VisionBackend,
};

use crate::detect::{from_image_gray, to_image_gray};

/// Vision primitives backed by `imageproc`.
///
/// Line detection uses `imageproc`'s fixed 1 px / 1 degree accumulator, so
/// only those resolutions are accepted.
#[derive(Clone, Copy, Debug)]
pub struct ImageprocBackend {
    /// Non-maximum suppression radius of the line accumulator, in cells.
    pub line_suppression_radius: u32,
}

impl Default for ImageprocBackend {
    fn default() -> Self {
        Self {
            line_suppression_radius: 4,
        }
    }
}

impl ImageprocBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_thresholds(low: f32, high: f32) -> Result<(), PrimitiveError> {
    if !(low.is_finite() && low >= 0.0) {
        return Err(PrimitiveError::InvalidParameter {
            name: "low_threshold",
            value: low as f64,
        });
    }
    if !(high.is_finite() && high >= low) {
        return Err(PrimitiveError::InvalidParameter {
            name: "high_threshold",
            value: high as f64,
        });
    }
    Ok(())
}

impl VisionBackend for ImageprocBackend {
    fn enhance(
        &self,
        gray: &GrayImageView<'_>,
        params: &EnhanceParams,
    ) -> Result<GrayImage, PrimitiveError> {
        if let Some(bilateral) = &params.bilateral {
            bilateral.validate()?;
        }
        let mut out = if params.equalize && gray.width > 0 && gray.height > 0 {
            let eq = imageproc::contrast::equalize_histogram(&to_image_gray(gray)?);
            from_image_gray(&eq)
        } else {
            GrayImage {
                width: gray.width,
                height: gray.height,
                data: gray.data.to_vec(),
            }
        };
        if let Some(p) = &params.bilateral {
            if !out.is_empty() {
                let smoothed = imageproc::filter::bilateral_filter(
                    &to_image_gray(&out.view())?,
                    p.diameter,
                    p.sigma_color,
                    p.sigma_space,
                );
                out = from_image_gray(&smoothed);
            }
        }
        Ok(out)
    }

    fn detect_circles(
        &self,
        gray: &GrayImageView<'_>,
        params: &HoughCircleParams,
    ) -> Result<Vec<DialRecord>, PrimitiveError> {
        params.validate()?;
        hough_circles(&to_image_gray(gray)?, params)
    }

    fn detect_edges(
        &self,
        gray: &GrayImageView<'_>,
        low_threshold: f32,
        high_threshold: f32,
    ) -> Result<GrayImage, PrimitiveError> {
        check_thresholds(low_threshold, high_threshold)?;
        if gray.width == 0 || gray.height == 0 {
            return Ok(GrayImage::new(gray.width, gray.height));
        }
        let edges = imageproc::edges::canny(&to_image_gray(gray)?, low_threshold, high_threshold);
        Ok(from_image_gray(&edges))
    }

    fn detect_lines(
        &self,
        edges: &GrayImageView<'_>,
        params: &HoughLineParams,
    ) -> Result<Vec<PolarLine>, PrimitiveError> {
        params.validate()?;
        if (params.rho_resolution - 1.0).abs() > 1e-6 {
            return Err(PrimitiveError::InvalidParameter {
                name: "rho_resolution",
                value: params.rho_resolution as f64,
            });
        }
        if (params.theta_resolution - std::f32::consts::PI / 180.0).abs() > 1e-6 {
            return Err(PrimitiveError::InvalidParameter {
                name: "theta_resolution",
                value: params.theta_resolution as f64,
            });
        }
        if edges.width == 0 || edges.height == 0 {
            return Ok(Vec::new());
        }

        let options = imageproc::hough::LineDetectionOptions {
            vote_threshold: params.vote_threshold,
            suppression_radius: self.line_suppression_radius,
        };
        let lines = imageproc::hough::detect_lines(&to_image_gray(edges)?, options);
        Ok(lines
            .into_iter()
            .map(|l| PolarLine::from_degrees(l.r, l.angle_in_degrees as f32))
            .collect())
    }
}
