use std::path::Path;

use meter_dials_core::{FrameView, GrayImage, GrayImageView, PixelFormat};
use meter_dials_decoder::{
    Calibration, DecodeError, DecoderParams, DialDecoder, PrimitiveError, ReadingResult,
};

use crate::backend::ImageprocBackend;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level image helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Borrow an `image::GrayImage` as the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a core view into an `image::GrayImage`.
pub fn to_image_gray(view: &GrayImageView<'_>) -> Result<::image::GrayImage, PrimitiveError> {
    let too_large = || PrimitiveError::Internal {
        primitive: "image conversion",
        reason: format!("{}x{} image does not fit", view.width, view.height),
    };
    let w = u32::try_from(view.width).map_err(|_| too_large())?;
    let h = u32::try_from(view.height).map_err(|_| too_large())?;
    ::image::GrayImage::from_raw(w, h, view.data.to_vec()).ok_or_else(too_large)
}

pub fn from_image_gray(img: &::image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Borrow an RGBA image as a raw frame.
pub fn rgba_frame(img: &::image::RgbaImage) -> FrameView<'_> {
    FrameView {
        width: img.width() as usize,
        height: img.height() as usize,
        format: PixelFormat::Rgba,
        data: img.as_raw(),
    }
}

/// Open and decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> Result<::image::DynamicImage, DetectError> {
    let reader = ::image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(::image::ImageError::IoError)?;
    Ok(reader.decode()?)
}

/// Decode a grayscale image with the `imageproc` backend.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, params, calibration),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn decode_image(
    img: &::image::GrayImage,
    params: DecoderParams,
    calibration: Option<&Calibration>,
) -> Result<ReadingResult, DecodeError> {
    let decoder = DialDecoder::new(ImageprocBackend::default(), params);
    decoder.decode(&gray_view(img), calibration)
}

/// Convenience overload with default parameters and no calibration.
pub fn decode_image_default(img: &::image::GrayImage) -> Result<ReadingResult, DecodeError> {
    decode_image(img, DecoderParams::default(), None)
}

/// Load an image file and decode it.
pub fn decode_path(
    path: impl AsRef<Path>,
    params: DecoderParams,
    calibration: Option<&Calibration>,
) -> Result<ReadingResult, DetectError> {
    let img = load_image(path)?.to_luma8();
    Ok(decode_image(&img, params, calibration)?)
}
