//! Raw pixel frames as handed over by a capture device or an image decoder.

use serde::{Deserialize, Serialize};

use crate::GrayImage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Gray,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid {format:?} frame buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer {
        format: PixelFormat,
        expected: usize,
        got: usize,
    },
}

/// Borrowed interleaved raster, row-major, 8 bits per channel.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self, FrameError> {
        let frame = Self {
            width,
            height,
            format,
            data,
        };
        frame.validate()?;
        Ok(frame)
    }

    fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self
            .width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.format.channels()))
            .ok_or(FrameError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        if self.data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                format: self.format,
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }

    /// Convert to 8-bit luminance (`0.299 R + 0.587 G + 0.114 B`); alpha is ignored.
    pub fn to_gray(&self) -> Result<GrayImage, FrameError> {
        self.validate()?;
        let data = match self.format {
            PixelFormat::Gray => self.data.to_vec(),
            PixelFormat::Rgb => self
                .data
                .chunks_exact(3)
                .map(|p| luma(p[0], p[1], p[2]))
                .collect(),
            PixelFormat::Rgba => self
                .data
                .chunks_exact(4)
                .map(|p| luma(p[0], p[1], p[2]))
                .collect(),
        };
        Ok(GrayImage {
            width: self.width,
            height: self.height,
            data,
        })
    }
}

/// Owned counterpart of [`FrameView`], for frame sources that hand out buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedFrame {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl OwnedFrame {
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        FrameView::new(width, height, format, &data)?;
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            format: self.format,
            data: &self.data,
        }
    }
}

impl From<GrayImage> for OwnedFrame {
    fn from(img: GrayImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            format: PixelFormat::Gray,
            data: img.data,
        }
    }
}

// Q14 fixed-point weights, sum = 1 << 14.
const W_R: u32 = 4899;
const W_G: u32 = 9617;
const W_B: u32 = 1868;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * W_R + g as u32 * W_G + b as u32 * W_B + (1 << 13)) >> 14) as u8
}
