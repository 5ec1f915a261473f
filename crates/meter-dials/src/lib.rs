//! High-level facade crate for the `meter-dials-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core types and the register decoder
//! - (feature `image`) a reference vision backend built on `imageproc`,
//!   end-to-end helpers from `image` buffers, and debug overlay drawing
//! - (feature `cli`) the `meter-dials` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use meter_dials::detect;
//! use meter_dials::DecoderParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_image("meter.jpg")?.to_luma8();
//! match detect::decode_image(&img, DecoderParams::default(), None) {
//!     Ok(res) => println!("reading: {}", res.display()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `meter_dials::core`: image views, frames, dial records, polar lines, logging.
//! - `meter_dials::decoder`: pipeline, parameters, calibration and stores.
//! - `meter_dials::backend` (feature `image`): `ImageprocBackend`.
//! - `meter_dials::detect` (feature `image`): helpers from `image::GrayImage`.
//! - `meter_dials::overlay` (feature `image`): debug drawing.

pub use meter_dials_core as core;
pub use meter_dials_decoder as decoder;

pub use meter_dials_core::{DialRecord, FrameView, GrayImage, GrayImageView, PixelFormat, PolarLine};
pub use meter_dials_decoder::{
    Calibration, DecodeError, DecoderParams, DialDecoder, DialPattern, ReadingResult,
    VisionBackend,
};

#[cfg(feature = "image")]
pub mod backend;
#[cfg(feature = "image")]
pub mod detect;
#[cfg(feature = "image")]
pub mod overlay;
