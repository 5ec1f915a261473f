use meter_dials_core::FrameError;

use crate::PrimitiveError;

/// Why a frame could not be decoded into a reading.
///
/// Dial indices are stored 0-based and printed 1-based, matching how the
/// register is labelled for a human reading it left to right.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("could not detect 5 dials (found {found}); try manual calibration")]
    DialsNotFound { found: usize },

    #[error("dial {} lies outside the frame", .dial + 1)]
    DialOutsideFrame { dial: usize },

    #[error("pointer not found on dial {}", .dial + 1)]
    PointerNotFound { dial: usize },

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl DecodeError {
    /// Index of the dial the failure is attributed to, if any.
    pub fn dial_index(&self) -> Option<usize> {
        match self {
            DecodeError::DialOutsideFrame { dial } | DecodeError::PointerNotFound { dial } => {
                Some(*dial)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_one_based_dials() {
        assert_eq!(
            DecodeError::PointerNotFound { dial: 2 }.to_string(),
            "pointer not found on dial 3"
        );
        assert_eq!(
            DecodeError::DialsNotFound { found: 3 }.to_string(),
            "could not detect 5 dials (found 3); try manual calibration"
        );
        assert_eq!(DecodeError::PointerNotFound { dial: 2 }.dial_index(), Some(2));
        assert_eq!(DecodeError::DialsNotFound { found: 0 }.dial_index(), None);
    }
}
