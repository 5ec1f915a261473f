use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PrimitiveError;

/// Circle detector settings used to locate the dials.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughCircleParams {
    /// Inverse accumulator resolution (1.0 = same as the image).
    pub dp: f32,
    /// Minimum distance between detected centers, in pixels.
    pub min_dist: f32,
    /// Upper edge threshold; the lower one is half of it.
    pub param1: f32,
    /// Accumulator threshold for accepting a center.
    pub param2: f32,
    pub min_radius: u32,
    /// Zero means "no upper bound" (the larger image side).
    pub max_radius: u32,
}

impl Default for HoughCircleParams {
    fn default() -> Self {
        Self {
            dp: 1.2,
            min_dist: 50.0,
            param1: 80.0,
            param2: 32.0,
            min_radius: 28,
            max_radius: 62,
        }
    }
}

impl HoughCircleParams {
    pub fn validate(&self) -> Result<(), PrimitiveError> {
        positive("dp", self.dp)?;
        positive("min_dist", self.min_dist)?;
        positive("param1", self.param1)?;
        positive("param2", self.param2)?;
        if self.max_radius != 0 && self.max_radius < self.min_radius {
            return Err(PrimitiveError::InvalidParameter {
                name: "max_radius",
                value: self.max_radius as f64,
            });
        }
        Ok(())
    }
}

/// Polar line detector settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughLineParams {
    /// Distance resolution of the accumulator in pixels.
    pub rho_resolution: f32,
    /// Angular resolution of the accumulator in radians.
    pub theta_resolution: f32,
    /// Minimum number of votes for a line.
    pub vote_threshold: u32,
}

impl Default for HoughLineParams {
    fn default() -> Self {
        Self {
            rho_resolution: 1.0,
            theta_resolution: std::f32::consts::PI / 180.0,
            vote_threshold: 55,
        }
    }
}

impl HoughLineParams {
    pub fn validate(&self) -> Result<(), PrimitiveError> {
        positive("rho_resolution", self.rho_resolution)?;
        positive("theta_resolution", self.theta_resolution)?;
        if self.vote_threshold == 0 {
            return Err(PrimitiveError::InvalidParameter {
                name: "vote_threshold",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Pointer estimation settings: edge thresholds followed by line voting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerParams {
    pub canny_low: f32,
    pub canny_high: f32,
    pub lines: HoughLineParams,
}

impl Default for PointerParams {
    fn default() -> Self {
        Self {
            canny_low: 60.0,
            canny_high: 160.0,
            lines: HoughLineParams::default(),
        }
    }
}

/// Edge-preserving smoothing applied to the whole frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BilateralParams {
    /// Neighborhood diameter in pixels.
    pub diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            diameter: 7,
            sigma_color: 50.0,
            sigma_space: 50.0,
        }
    }
}

impl BilateralParams {
    pub fn validate(&self) -> Result<(), PrimitiveError> {
        if self.diameter == 0 {
            return Err(PrimitiveError::InvalidParameter {
                name: "diameter",
                value: 0.0,
            });
        }
        positive("sigma_color", self.sigma_color)?;
        positive("sigma_space", self.sigma_space)
    }
}

/// Frame enhancement run before dial localization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    /// Global histogram equalization.
    pub equalize: bool,
    pub bilateral: Option<BilateralParams>,
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            equalize: true,
            bilateral: Some(BilateralParams::default()),
        }
    }
}

impl EnhanceParams {
    pub fn disabled() -> Self {
        Self {
            equalize: false,
            bilateral: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.equalize && self.bilateral.is_none()
    }
}

/// Printed numbering direction of the five dials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialPattern {
    #[serde(rename = "all-cw")]
    AllClockwise,
    #[serde(rename = "all-ccw")]
    AllCounterClockwise,
    /// Even dials (0, 2, 4) clockwise, odd dials counter-clockwise.
    #[default]
    #[serde(rename = "alt-cw")]
    AlternatingClockwise,
}

impl DialPattern {
    /// Whether the numbers on dial `index` (0-based, left to right) increase clockwise.
    pub fn is_clockwise(self, index: usize) -> bool {
        match self {
            DialPattern::AllClockwise => true,
            DialPattern::AllCounterClockwise => false,
            DialPattern::AlternatingClockwise => index % 2 == 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DialPattern::AllClockwise => "all-cw",
            DialPattern::AllCounterClockwise => "all-ccw",
            DialPattern::AlternatingClockwise => "alt-cw",
        }
    }
}

impl fmt::Display for DialPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dial pattern `{0}` (expected all-cw, all-ccw or alt-cw)")]
pub struct UnknownPatternError(pub String);

impl FromStr for DialPattern {
    type Err = UnknownPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all-cw" => Ok(DialPattern::AllClockwise),
            "all-ccw" => Ok(DialPattern::AllCounterClockwise),
            "alt-cw" => Ok(DialPattern::AlternatingClockwise),
            other => Err(UnknownPatternError(other.to_string())),
        }
    }
}

/// Everything a decode call needs besides the frame and the calibration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderParams {
    pub circles: HoughCircleParams,
    pub pointer: PointerParams,
    pub enhance: EnhanceParams,
    pub pattern: DialPattern,
    /// Angle between the true zero mark and the top of the frame, clockwise.
    pub zero_offset_deg: f32,
}

fn positive(name: &'static str, value: f32) -> Result<(), PrimitiveError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PrimitiveError::InvalidParameter {
            name,
            value: value as f64,
        })
    }
}
