//! Five-dial analog register decoder.
//!
//! The pipeline turns one grayscale frame into a five-digit reading:
//! locate the dials (or take them from a manual [`Calibration`]), mask each
//! dial to an annulus, estimate the pointer angle, map angles to digits and
//! fold the digits with odometer borrow correction.
//!
//! All image-processing primitives go through the [`VisionBackend`] trait, so
//! this crate has no image library dependency. A reference backend lives in
//! the `meter-dials` facade crate.
//!
//! ```no_run
//! use meter_dials_decoder::{DecoderParams, DialDecoder, VisionBackend};
//! use meter_dials_core::GrayImageView;
//!
//! fn read<B: VisionBackend>(backend: B, gray: &GrayImageView<'_>) {
//!     let decoder = DialDecoder::new(backend, DecoderParams::default());
//!     match decoder.decode(gray, None) {
//!         Ok(res) => println!("{}", res.display()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

mod backend;
mod calibration;
mod decoder;
mod digit;
mod display;
mod error;
pub mod io;
mod live;
mod locate;
mod params;
mod pointer;
mod reading;
mod region;
mod result;
mod store;

#[cfg(test)]
mod test_utils;

pub use backend::{PrimitiveError, VisionBackend};
pub use calibration::{
    clear_calibration, restore_calibration, save_calibration, Calibration, CalibrationError,
    CALIBRATION_KEY, CLICK_RADIUS_FRACTION,
};
pub use decoder::DialDecoder;
pub use digit::{angle_to_digit, rotation_for_index, DigitResult};
pub use display::{ReadingDisplay, NO_READING, STATUS_READY};
pub use error::DecodeError;
pub use live::{LiveReader, StopHandle};
pub use locate::{locate_dials, select_dials, ALIGNMENT_TOLERANCE, RADIUS_TOLERANCE};
pub use params::{
    BilateralParams, DecoderParams, DialPattern, EnhanceParams, HoughCircleParams,
    HoughLineParams, PointerParams, UnknownPatternError,
};
pub use pointer::{compass_angle_from_theta, estimate_pointer, select_pointer_line, PointerEstimate};
pub use reading::{
    apply_borrow, assemble_reading, fold_digits, format_reading, BORROW_THRESHOLD, TICK_EPSILON,
};
pub use region::{apply_annulus_mask, extract_dial_region, DialRegion};
pub use result::{DialReading, DialSource, ReadingResult};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
