//! Reading assembly with odometer-style borrow correction.
//!
//! A dial pointer sitting right on a tick is ambiguous: it may have just
//! reached the digit, or still be a hair short of it. The next, less
//! significant dial settles it. If that dial has not yet passed half a
//! revolution, the more significant dial cannot really have advanced, so its
//! digit is stepped back by one.

use meter_dials_core::DIAL_COUNT;

use crate::digit::DigitResult;

/// A fraction within this distance of a tick counts as "on the tick".
pub const TICK_EPSILON: f32 = 0.02;
/// The less significant dial must be below this fraction to trigger a borrow.
pub const BORROW_THRESHOLD: f32 = 0.5;

/// Apply the borrow correction and return the adjusted digits.
///
/// Conditions are evaluated on the raw fractions of the unadjusted input, so
/// one correction never cascades into the next.
pub fn apply_borrow(raw: &[DigitResult; DIAL_COUNT]) -> [u8; DIAL_COUNT] {
    let mut digits = raw.map(|r| r.digit);
    for i in 0..DIAL_COUNT - 1 {
        let frac = raw[i].frac;
        let on_tick = frac < TICK_EPSILON || frac > 1.0 - TICK_EPSILON;
        if on_tick && raw[i + 1].frac < BORROW_THRESHOLD {
            digits[i] = (digits[i] + 9) % 10;
        }
    }
    digits
}

/// Fold digits (most significant first) into an integer.
pub fn fold_digits(digits: &[u8; DIAL_COUNT]) -> u32 {
    digits.iter().fold(0u32, |acc, &d| acc * 10 + d as u32)
}

/// Borrow-correct and fold, returning the reading and the final digits.
pub fn assemble_reading(raw: &[DigitResult; DIAL_COUNT]) -> (u32, [u8; DIAL_COUNT]) {
    let digits = apply_borrow(raw);
    (fold_digits(&digits), digits)
}

/// Zero-padded five-digit rendering, e.g. `00123`.
pub fn format_reading(reading: u32) -> String {
    format!("{reading:05}")
}
