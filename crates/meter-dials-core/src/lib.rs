//! Core types and image utilities for reading analog meter dial registers.
//!
//! This crate is intentionally small. It does *not* depend on any concrete
//! image-processing library: frames come in as raw pixel buffers, are
//! converted to lightweight grayscale images, and the geometric records
//! (dial circles, polar lines) are plain serializable structs.

mod angle;
mod dial;
mod frame;
mod image;
mod line;
mod logger;

pub use angle::{normalize_deg, DEGREES_PER_TICK, TICKS_PER_REVOLUTION};
pub use dial::{sort_left_to_right, DialRecord, DIAL_COUNT};
pub use frame::{FrameError, FrameView, OwnedFrame, PixelFormat};
pub use image::{gaussian_blur_3x3, CropRect, GrayImage, GrayImageView};
pub use line::PolarLine;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV_VAR};
