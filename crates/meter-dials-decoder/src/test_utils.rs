//! Scripted vision backend for pipeline tests.

use std::cell::Cell;

use meter_dials_core::{normalize_deg, DialRecord, GrayImage, GrayImageView, PolarLine};

use crate::backend::{PrimitiveError, VisionBackend};
use crate::params::{HoughCircleParams, HoughLineParams};

/// Returns fixed circles, and line lists in call order (cycled).
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    pub circles: Vec<DialRecord>,
    pub circle_error: Option<PrimitiveError>,
    pub lines: Vec<Vec<PolarLine>>,
    pub line_calls: Cell<usize>,
}

impl ScriptedBackend {
    pub fn with_circles(circles: Vec<DialRecord>) -> Self {
        Self {
            circles,
            ..Self::default()
        }
    }

    pub fn with_lines(lines: Vec<Vec<PolarLine>>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn line_calls(&self) -> usize {
        self.line_calls.get()
    }
}

impl VisionBackend for ScriptedBackend {
    fn detect_circles(
        &self,
        _gray: &GrayImageView<'_>,
        _params: &HoughCircleParams,
    ) -> Result<Vec<DialRecord>, PrimitiveError> {
        match &self.circle_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.circles.clone()),
        }
    }

    fn detect_edges(
        &self,
        gray: &GrayImageView<'_>,
        _low_threshold: f32,
        _high_threshold: f32,
    ) -> Result<GrayImage, PrimitiveError> {
        Ok(GrayImage::new(gray.width, gray.height))
    }

    fn detect_lines(
        &self,
        _edges: &GrayImageView<'_>,
        _params: &HoughLineParams,
    ) -> Result<Vec<PolarLine>, PrimitiveError> {
        let n = self.line_calls.get();
        self.line_calls.set(n + 1);
        if self.lines.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.lines[n % self.lines.len()].clone())
    }
}

/// Polar line whose normal maps back to compass angle `angle_deg`.
///
/// Only angles in `[0, 90]` and `(270, 360)` are representable with
/// `theta` in `[0, pi)`.
pub(crate) fn line_for_angle(angle_deg: f32) -> PolarLine {
    let a = normalize_deg(angle_deg);
    assert!(a <= 90.0 || a > 270.0, "compass angle {a} not representable");
    let theta_deg = normalize_deg(90.0 - a) % 180.0;
    PolarLine::from_degrees(0.0, theta_deg)
}

/// Compass angle at which a dial shows `digit` plus `frac` of a tick.
pub(crate) fn angle_for(digit: u8, frac: f32, clockwise: bool, zero_offset_deg: f32) -> f32 {
    let a = 36.0 * (digit as f32 + frac);
    let a = if clockwise { a } else { 360.0 - a };
    normalize_deg(a + zero_offset_deg)
}
