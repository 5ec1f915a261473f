//! Seam between the decoding pipeline and the image-processing primitives.
//!
//! The decoder never runs circle, edge or line detection itself; it asks a
//! [`VisionBackend`] for them. Backends are expected to validate their
//! parameters and report problems as [`PrimitiveError`] instead of panicking.

use meter_dials_core::{DialRecord, GrayImage, GrayImageView, PolarLine};

use crate::params::{EnhanceParams, HoughCircleParams, HoughLineParams};

/// Failure reported by an image-processing primitive.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PrimitiveError {
    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("{primitive} failed: {reason}")]
    Internal {
        primitive: &'static str,
        reason: String,
    },
}

pub trait VisionBackend {
    /// Whole-frame contrast/denoise pass. The default returns a plain copy.
    fn enhance(
        &self,
        gray: &GrayImageView<'_>,
        params: &EnhanceParams,
    ) -> Result<GrayImage, PrimitiveError> {
        let _ = params;
        Ok(GrayImage {
            width: gray.width,
            height: gray.height,
            data: gray.data.to_vec(),
        })
    }

    /// Candidate circles `(x, y, r)` in image pixels, in any order.
    fn detect_circles(
        &self,
        gray: &GrayImageView<'_>,
        params: &HoughCircleParams,
    ) -> Result<Vec<DialRecord>, PrimitiveError>;

    /// Binary edge map (non-zero = edge) of the same size as the input.
    fn detect_edges(
        &self,
        gray: &GrayImageView<'_>,
        low_threshold: f32,
        high_threshold: f32,
    ) -> Result<GrayImage, PrimitiveError>;

    /// Lines through the non-zero pixels of `edges`, with `theta` in `[0, pi)`.
    fn detect_lines(
        &self,
        edges: &GrayImageView<'_>,
        params: &HoughLineParams,
    ) -> Result<Vec<PolarLine>, PrimitiveError>;
}

impl<B: VisionBackend + ?Sized> VisionBackend for &B {
    fn enhance(
        &self,
        gray: &GrayImageView<'_>,
        params: &EnhanceParams,
    ) -> Result<GrayImage, PrimitiveError> {
        (**self).enhance(gray, params)
    }

    fn detect_circles(
        &self,
        gray: &GrayImageView<'_>,
        params: &HoughCircleParams,
    ) -> Result<Vec<DialRecord>, PrimitiveError> {
        (**self).detect_circles(gray, params)
    }

    fn detect_edges(
        &self,
        gray: &GrayImageView<'_>,
        low_threshold: f32,
        high_threshold: f32,
    ) -> Result<GrayImage, PrimitiveError> {
        (**self).detect_edges(gray, low_threshold, high_threshold)
    }

    fn detect_lines(
        &self,
        edges: &GrayImageView<'_>,
        params: &HoughLineParams,
    ) -> Result<Vec<PolarLine>, PrimitiveError> {
        (**self).detect_lines(edges, params)
    }
}
