use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap a row-major buffer, returning `None` if the length does not match.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Option<Self> {
        (width.checked_mul(height)? == data.len()).then_some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Copy the pixels inside `rect` into a new image.
    ///
    /// The rectangle is clipped to the view, so the copy never reads out of
    /// bounds; a rectangle entirely outside yields an empty image.
    pub fn crop(&self, rect: CropRect) -> GrayImage {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = rect.x.saturating_add(rect.width).min(self.width);
        let y1 = rect.y.saturating_add(rect.height).min(self.height);
        let w = x1 - x0;
        let h = y1 - y0;

        let mut data = Vec::with_capacity(w * h);
        for y in y0..y1 {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + x0..row + x1]);
        }
        GrayImage {
            width: w,
            height: h,
            data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// All-black image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (width.checked_mul(height)? == data.len()).then_some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned pixel rectangle, top-left anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let r = if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    };
    r as usize
}

/// 3x3 Gaussian blur with the binomial kernel `[1 2 1]^T [1 2 1] / 16`.
///
/// Borders are mirrored without repeating the edge pixel (`gfedcb|abcdefgh|gfedcba`).
pub fn gaussian_blur_3x3(src: &GrayImageView<'_>) -> GrayImage {
    let (w, h) = (src.width, src.height);
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }

    // Horizontal pass, kept unnormalized (max 4 * 255).
    let mut tmp = vec![0u16; w * h];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let xl = reflect101(x as isize - 1, w);
            let xr = reflect101(x as isize + 1, w);
            tmp[row + x] = src.data[row + xl] as u16
                + 2 * src.data[row + x] as u16
                + src.data[row + xr] as u16;
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let yu = reflect101(y as isize - 1, h) * w;
        let yc = y * w;
        let yd = reflect101(y as isize + 1, h) * w;
        for x in 0..w {
            let sum = tmp[yu + x] as u32 + 2 * tmp[yc + x] as u32 + tmp[yd + x] as u32;
            out.data[yc + x] = ((sum + 8) >> 4) as u8;
        }
    }
    out
}
