use meter_dials_core::DIAL_COUNT;

use crate::result::ReadingResult;
use crate::DecodeError;

/// Placeholder shown instead of a reading after a failed decode.
pub const NO_READING: &str = "—";
pub const STATUS_READY: &str = "Ready";

/// What a reading display shows: the last outcome wins.
///
/// A failure blanks the value and digits and keeps its message as status
/// until a later success replaces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadingDisplay {
    pub value: String,
    pub digits: Option<[u8; DIAL_COUNT]>,
    pub status: String,
}

impl Default for ReadingDisplay {
    fn default() -> Self {
        Self {
            value: NO_READING.to_string(),
            digits: None,
            status: String::new(),
        }
    }
}

impl ReadingDisplay {
    pub fn apply(&mut self, outcome: &Result<ReadingResult, DecodeError>) {
        match outcome {
            Ok(res) => {
                self.value = res.display();
                self.digits = Some(res.digits);
                self.status = STATUS_READY.to_string();
            }
            Err(err) => {
                self.value = NO_READING.to_string();
                self.digits = None;
                self.status = err.to_string();
            }
        }
    }
}
