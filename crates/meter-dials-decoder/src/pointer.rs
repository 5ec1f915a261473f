//! Pointer angle estimation on a masked dial region.
//!
//! The pointer is the strongest straight feature left after masking, so the
//! region goes through edge detection and polar line voting, and the
//! "most vertical normal" line is taken as the pointer. This does not check
//! that the line passes near the dial center; a strong printed tick or a
//! glare streak can win instead of the pointer.

use meter_dials_core::{normalize_deg, PolarLine};

use crate::backend::{PrimitiveError, VisionBackend};
use crate::params::PointerParams;
use crate::region::DialRegion;

/// Pointer direction of one dial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEstimate {
    /// Compass angle in `[0, 360)`: 0 = top, increasing clockwise.
    pub angle_deg: f32,
    /// Selected line in region coordinates.
    pub line: PolarLine,
}

/// Pick the line whose normal is closest to horizontal (max `|cos theta|`).
///
/// The first line wins on ties; lines with a non-finite angle are ignored.
pub fn select_pointer_line(lines: &[PolarLine]) -> Option<PolarLine> {
    let mut best: Option<(PolarLine, f32)> = None;
    for line in lines {
        if !line.theta.is_finite() {
            continue;
        }
        let score = line.theta.cos().abs();
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((*line, score)),
        }
    }
    best.map(|(line, _)| line)
}

/// Compass angle for a line normal at `theta` radians.
#[inline]
pub fn compass_angle_from_theta(theta: f32) -> f32 {
    normalize_deg(90.0 - theta.to_degrees())
}

/// Estimate the pointer angle of one region.
///
/// `Ok(None)` means the primitives ran fine but produced no usable line.
pub fn estimate_pointer<B: VisionBackend + ?Sized>(
    backend: &B,
    region: &DialRegion,
    params: &PointerParams,
) -> Result<Option<PointerEstimate>, PrimitiveError> {
    let edges = backend.detect_edges(&region.image.view(), params.canny_low, params.canny_high)?;
    let lines = backend.detect_lines(&edges.view(), &params.lines)?;
    log::trace!("{} line candidates in region {:?}", lines.len(), region.rect);

    Ok(select_pointer_line(&lines).map(|line| PointerEstimate {
        angle_deg: compass_angle_from_theta(line.theta),
        line,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn selects_the_line_with_largest_abs_cos() {
        let lines = [
            PolarLine::from_degrees(3.0, 80.0),
            PolarLine::from_degrees(5.0, 170.0),
            PolarLine::from_degrees(7.0, 20.0),
        ];
        let chosen = select_pointer_line(&lines).expect("line");
        assert_eq!(chosen.rho, 5.0);
    }

    #[test]
    fn first_line_wins_ties() {
        let lines = [
            PolarLine::from_degrees(1.0, 30.0),
            PolarLine::from_degrees(2.0, 30.0),
        ];
        assert_eq!(select_pointer_line(&lines).expect("line").rho, 1.0);
    }

    #[test]
    fn empty_or_non_finite_input_selects_nothing() {
        assert!(select_pointer_line(&[]).is_none());
        assert!(select_pointer_line(&[PolarLine::new(1.0, f32::NAN)]).is_none());
    }

    #[test]
    fn compass_angle_conversion() {
        assert_abs_diff_eq!(compass_angle_from_theta(0.0), 90.0, epsilon = 1e-4);
        assert_abs_diff_eq!(
            compass_angle_from_theta(60f32.to_radians()),
            30.0,
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(
            compass_angle_from_theta(135f32.to_radians()),
            315.0,
            epsilon = 1e-3
        );
    }
}
