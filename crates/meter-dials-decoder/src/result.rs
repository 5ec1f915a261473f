use meter_dials_core::{DialRecord, PolarLine, DIAL_COUNT};
use serde::{Deserialize, Serialize};

use crate::digit::DigitResult;
use crate::reading::format_reading;

/// Where the five dial circles of a reading came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialSource {
    Calibration,
    Detected,
}

/// Per-dial breakdown of a successful decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DialReading {
    pub dial: DialRecord,
    pub clockwise: bool,
    /// Compass angle of the pointer, 0 = top, clockwise.
    pub angle_deg: f32,
    /// Selected pointer line in frame coordinates.
    pub line: PolarLine,
    /// Digit and fraction before borrow correction.
    pub raw: DigitResult,
    /// Digit after borrow correction.
    pub digit: u8,
}

/// A decoded register reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingResult {
    /// `0..=99999`
    pub reading: u32,
    /// Final digits, most significant first.
    pub digits: [u8; DIAL_COUNT],
    pub source: DialSource,
    /// Left to right.
    pub dials: Vec<DialReading>,
}

impl ReadingResult {
    /// Zero-padded reading, e.g. `00123`.
    pub fn display(&self) -> String {
        format_reading(self.reading)
    }

    pub fn dial_records(&self) -> impl Iterator<Item = &DialRecord> + '_ {
        self.dials.iter().map(|d| &d.dial)
    }
}
