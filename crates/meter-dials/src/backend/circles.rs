//! Gradient-voting Hough circle detector.
//!
//! Every Canny edge pixel votes for possible centers along its gradient
//! direction (both ways) at distances within the radius range. Gradients are
//! taken on the same Gaussian-smoothed image Canny uses internally, so the
//! votes of a rim converge on one cell. Peaks of the 3x3 summed accumulator
//! become center candidates, refined to the vote centroid of their
//! neighbourhood; each candidate then gets its radius from a histogram of
//! edge distances around it. Centers closer than `min_dist` to a stronger one
//! are dropped.

use image::GrayImage;
use meter_dials_core::DialRecord;
use meter_dials_decoder::{HoughCircleParams, PrimitiveError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smoothing `imageproc::edges::canny` applies before its own Sobel pass.
const CANNY_SIGMA: f32 = 1.4;

struct EdgePoint {
    x: f32,
    y: f32,
}

struct Accumulator {
    width: usize,
    height: usize,
    votes: Vec<u32>,
}

impl Accumulator {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            votes: vec![0; width * height],
        }
    }

    /// Cells of the 3x3 block around interior cell `(a, b)` as `(x, y, votes)`.
    fn neighbourhood(
        &self,
        a: usize,
        b: usize,
    ) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        (b - 1..=b + 1).flat_map(move |y| {
            (a - 1..=a + 1).map(move |x| (x, y, self.votes[y * self.width + x]))
        })
    }

    /// Sum of every interior 3x3 neighbourhood; the border ring stays zero.
    fn box_sums(&self) -> Vec<u32> {
        let (w, h) = (self.width, self.height);
        let mut sums = vec![0u32; w * h];
        for b in 1..h - 1 {
            for a in 1..w - 1 {
                sums[b * w + a] = self.neighbourhood(a, b).map(|(_, _, v)| v).sum();
            }
        }
        sums
    }

    /// Local maxima of the summed votes whose strongest single cell exceeds
    /// `threshold`, as `(a, b, summed votes)`. Plateaus keep their first cell
    /// in scan order.
    fn peaks(&self, threshold: f32) -> Vec<(usize, usize, u32)> {
        let (w, h) = (self.width, self.height);
        let sums = self.box_sums();
        let mut peaks = Vec::new();
        for b in 2..h.saturating_sub(2) {
            for a in 2..w - 2 {
                let idx = b * w + a;
                let v = sums[idx];
                if v == 0 {
                    continue;
                }
                let before = [idx - w - 1, idx - w, idx - w + 1, idx - 1];
                let after = [idx + 1, idx + w - 1, idx + w, idx + w + 1];
                if before.iter().any(|&i| sums[i] >= v) || after.iter().any(|&i| sums[i] > v) {
                    continue;
                }
                let strongest = self.neighbourhood(a, b).map(|(_, _, c)| c).max().unwrap_or(0);
                if strongest as f32 > threshold {
                    peaks.push((a, b, v));
                }
            }
        }
        peaks
    }

    /// Vote-weighted center of the 3x3 cells around `(a, b)`, in pixels.
    fn centroid(&self, a: usize, b: usize, dp: f32) -> (f32, f32) {
        let (mut sw, mut sx, mut sy) = (0.0f32, 0.0f32, 0.0f32);
        for (x, y, v) in self.neighbourhood(a, b) {
            let v = v as f32;
            sw += v;
            sx += v * (x as f32 + 0.5);
            sy += v * (y as f32 + 0.5);
        }
        if sw > 0.0 {
            (sx / sw * dp, sy / sw * dp)
        } else {
            ((a as f32 + 0.5) * dp, (b as f32 + 0.5) * dp)
        }
    }
}

/// Detect circles, strongest center first.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(gray, params),
        fields(width = gray.width(), height = gray.height())
    )
)]
pub fn hough_circles(
    gray: &GrayImage,
    params: &HoughCircleParams,
) -> Result<Vec<DialRecord>, PrimitiveError> {
    params.validate()?;
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return Ok(Vec::new());
    }

    let min_r = (params.min_radius as f32).max(1.0);
    let max_r = if params.max_radius == 0 {
        w.max(h) as f32
    } else {
        params.max_radius as f32
    };
    if max_r < min_r {
        return Ok(Vec::new());
    }

    let edges = imageproc::edges::canny(gray, params.param1 / 2.0, params.param1);
    let smoothed = imageproc::filter::gaussian_blur_f32(gray, CANNY_SIGMA);
    let gx = imageproc::gradients::horizontal_sobel(&smoothed);
    let gy = imageproc::gradients::vertical_sobel(&smoothed);

    let dp = params.dp;
    let mut accum = Accumulator::new(
        (w as f32 / dp).ceil() as usize + 2,
        (h as f32 / dp).ceil() as usize + 2,
    );
    let mut points = Vec::new();

    for (x, y, px) in edges.enumerate_pixels() {
        if px[0] == 0 {
            continue;
        }
        let dx = gx.get_pixel(x, y)[0] as f32;
        let dy = gy.get_pixel(x, y)[0] as f32;
        let mag = (dx * dx + dy * dy).sqrt();
        if mag < 1.0 {
            continue;
        }
        let (ux, uy) = (dx / mag, dy / mag);
        let (xf, yf) = (x as f32, y as f32);
        points.push(EdgePoint { x: xf, y: yf });

        for sign in [1.0f32, -1.0] {
            let mut last = usize::MAX;
            let mut r = min_r;
            while r <= max_r {
                let cx = xf + sign * ux * r;
                let cy = yf + sign * uy * r;
                if cx < 0.0 || cy < 0.0 {
                    break;
                }
                let (a, b) = ((cx / dp) as usize, (cy / dp) as usize);
                if a >= accum.width || b >= accum.height {
                    break;
                }
                let idx = b * accum.width + a;
                if idx != last {
                    accum.votes[idx] += 1;
                    last = idx;
                }
                r += dp;
            }
        }
    }

    let threshold = params.param2;
    let mut centers = accum.peaks(threshold);
    centers.sort_by(|p, q| q.2.cmp(&p.2).then((p.1, p.0).cmp(&(q.1, q.0))));

    let bins = (max_r - min_r).floor() as usize + 1;
    let mut hist = vec![0u32; bins];
    let min_dist2 = params.min_dist * params.min_dist;
    let mut circles: Vec<DialRecord> = Vec::new();

    for (a, b, _) in centers {
        let (cx, cy) = accum.centroid(a, b, dp);
        if circles
            .iter()
            .any(|c| (c.x - cx).powi(2) + (c.y - cy).powi(2) < min_dist2)
        {
            continue;
        }

        hist.iter_mut().for_each(|v| *v = 0);
        let distances: Vec<f32> = points
            .iter()
            .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
            .filter(|&d| d >= min_r && d <= max_r)
            .collect();
        for &d in &distances {
            hist[((d - min_r) as usize).min(bins - 1)] += 1;
        }

        let mut best: Option<(usize, u32)> = None;
        for bin in 0..bins {
            let support = hist[bin]
                + if bin > 0 { hist[bin - 1] } else { 0 }
                + hist.get(bin + 1).copied().unwrap_or(0);
            let r = min_r + bin as f32 + 0.5;
            let better = match best {
                None => support > 0,
                Some((best_bin, best_support)) => {
                    let best_r = min_r + best_bin as f32 + 0.5;
                    support as f32 * best_r > best_support as f32 * r
                }
            };
            if better {
                best = Some((bin, support));
            }
        }

        let Some((bin, support)) = best else {
            continue;
        };
        if support as f32 <= threshold {
            continue;
        }
        // mean edge distance over the winning three bins
        let lo = min_r + bin as f32 - 1.0;
        let hi = min_r + bin as f32 + 2.0;
        let (sum, n) = distances
            .iter()
            .filter(|&&d| d >= lo && d < hi)
            .fold((0.0f32, 0u32), |(s, n), &d| (s + d, n + 1));
        let r = if n > 0 {
            sum / n as f32
        } else {
            min_r + bin as f32 + 0.5
        };
        circles.push(DialRecord::new(cx, cy, r));
    }

    log::debug!(
        "hough circles: {} edge points, {} circles",
        points.len(),
        circles.len()
    );
    Ok(circles)
}
