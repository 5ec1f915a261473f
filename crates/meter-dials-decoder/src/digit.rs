use meter_dials_core::{normalize_deg, DEGREES_PER_TICK, TICKS_PER_REVOLUTION};
use serde::{Deserialize, Serialize};

use crate::params::DialPattern;

/// Digit under a pointer plus how far the pointer has moved towards the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DigitResult {
    /// `0..=9`
    pub digit: u8,
    /// `[0, 1)`
    pub frac: f32,
}

/// Map a compass angle to a digit.
///
/// The angle is first corrected by `zero_offset_deg` (the compass angle of
/// the printed zero mark) and mirrored for counter-clockwise dials.
pub fn angle_to_digit(angle_deg: f32, clockwise: bool, zero_offset_deg: f32) -> DigitResult {
    let mut a = normalize_deg(angle_deg - zero_offset_deg);
    if !clockwise {
        a = normalize_deg(360.0 - a);
    }
    let pos = a / DEGREES_PER_TICK;
    let whole = pos.floor();
    let mut frac = pos - whole;
    // f32 rounding can push the fraction to exactly 1.0 right below a tick
    if !(0.0..1.0).contains(&frac) {
        frac = 0.0;
    }
    DigitResult {
        digit: (whole as u32 % TICKS_PER_REVOLUTION) as u8,
        frac,
    }
}

/// Numbering direction of dial `index` under `pattern`.
pub fn rotation_for_index(pattern: DialPattern, index: usize) -> bool {
    pattern.is_clockwise(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn clockwise_mapping() {
        let d = angle_to_digit(0.0, true, 0.0);
        assert_eq!(d.digit, 0);
        assert_abs_diff_eq!(d.frac, 0.0);

        let d = angle_to_digit(90.0, true, 0.0);
        assert_eq!(d.digit, 2);
        assert_abs_diff_eq!(d.frac, 0.5, epsilon = 1e-5);

        assert_eq!(angle_to_digit(359.0, true, 0.0).digit, 9);
    }

    #[test]
    fn counter_clockwise_mapping_mirrors_the_angle() {
        let d = angle_to_digit(90.0, false, 0.0);
        assert_eq!(d.digit, 7);
        assert_abs_diff_eq!(d.frac, 0.5, epsilon = 1e-5);
        assert_eq!(angle_to_digit(0.0, false, 0.0).digit, 0);
        assert_eq!(angle_to_digit(10.0, false, 0.0).digit, 9);
    }

    #[test]
    fn zero_offset_is_subtracted_first() {
        assert_eq!(angle_to_digit(40.0, true, 30.0).digit, 0);
        assert_eq!(angle_to_digit(20.0, true, 30.0).digit, 9);
        assert_eq!(angle_to_digit(20.0, false, 30.0).digit, 0);
    }

    #[test]
    fn digit_and_fraction_stay_in_range() {
        for pattern_cw in [true, false] {
            for offset in [-400.0f32, -36.0, 0.0, 17.5, 359.9, 720.0] {
                let mut angle = -720.0f32;
                while angle < 720.0 {
                    let d = angle_to_digit(angle, pattern_cw, offset);
                    assert!(d.digit <= 9, "digit {} for {angle}", d.digit);
                    assert!((0.0..1.0).contains(&d.frac), "frac {} for {angle}", d.frac);
                    angle += 0.37;
                }
            }
        }
    }

    #[test]
    fn rotation_follows_pattern() {
        let alt: Vec<bool> = (0..5)
            .map(|i| rotation_for_index(DialPattern::AlternatingClockwise, i))
            .collect();
        assert_eq!(alt, vec![true, false, true, false, true]);
        assert!((0..5).all(|i| !rotation_for_index(DialPattern::AllCounterClockwise, i)));
    }
}
