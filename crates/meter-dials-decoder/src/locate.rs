//! Dial localization: raw circle candidates -> five aligned dials.
//!
//! Circle detectors happily report bolts, reflections and printed digits on
//! the faceplate. Real dials sit on one horizontal row and share a radius, so
//! candidates are filtered in two stages:
//! 1. keep circles whose `y` is within `0.35 * mean(r)` of the median `y`,
//! 2. of those, keep circles whose `r` is within `0.25 * mean(r)` of the mean.
//!
//! The second stage is only trusted when it leaves at least five circles;
//! otherwise the alignment-filtered set is used. Statistics are computed once,
//! over all candidates.

use meter_dials_core::{sort_left_to_right, DialRecord, GrayImageView, DIAL_COUNT};

use crate::backend::VisionBackend;
use crate::params::HoughCircleParams;
use crate::DecodeError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Maximum `|y - median_y|` as a fraction of the mean radius.
pub const ALIGNMENT_TOLERANCE: f32 = 0.35;
/// Maximum `|r - mean_r|` as a fraction of the mean radius.
pub const RADIUS_TOLERANCE: f32 = 0.25;

fn median(values: impl Iterator<Item = f32>) -> Option<f32> {
    let mut v: Vec<f32> = values.collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f32::total_cmp);
    let m = v.len() / 2;
    Some(if v.len() % 2 == 1 {
        v[m]
    } else {
        0.5 * (v[m - 1] + v[m])
    })
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, n) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f32)
}

/// Filter circle candidates down to at most five dials, sorted left to right.
///
/// Returns fewer than five records when the candidates cannot support a full
/// register; callers decide how to report that.
pub fn select_dials(candidates: &[DialRecord]) -> Vec<DialRecord> {
    let (Some(median_y), Some(mean_r)) = (
        median(candidates.iter().map(|c| c.y)),
        mean(candidates.iter().map(|c| c.r)),
    ) else {
        return Vec::new();
    };

    let aligned: Vec<DialRecord> = candidates
        .iter()
        .copied()
        .filter(|c| (c.y - median_y).abs() < ALIGNMENT_TOLERANCE * mean_r)
        .collect();
    let consistent: Vec<DialRecord> = aligned
        .iter()
        .copied()
        .filter(|c| (c.r - mean_r).abs() < RADIUS_TOLERANCE * mean_r)
        .collect();

    log::debug!(
        "dial candidates: {} total, {} aligned, {} consistent (median y {:.1}, mean r {:.1})",
        candidates.len(),
        aligned.len(),
        consistent.len(),
        median_y,
        mean_r
    );

    let mut chosen = if consistent.len() >= DIAL_COUNT {
        consistent
    } else {
        aligned
    };
    sort_left_to_right(&mut chosen);
    chosen.truncate(DIAL_COUNT);
    chosen
}

/// Run the circle detector and keep the five most plausible dials.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(backend, gray, params),
        fields(width = gray.width, height = gray.height)
    )
)]
pub fn locate_dials<B: VisionBackend + ?Sized>(
    backend: &B,
    gray: &GrayImageView<'_>,
    params: &HoughCircleParams,
) -> Result<[DialRecord; DIAL_COUNT], DecodeError> {
    let candidates: Vec<DialRecord> = backend
        .detect_circles(gray, params)?
        .into_iter()
        .filter(DialRecord::is_well_formed)
        .collect();
    if candidates.len() < DIAL_COUNT {
        return Err(DecodeError::DialsNotFound {
            found: candidates.len(),
        });
    }

    let chosen = select_dials(&candidates);
    let found = chosen.len();
    chosen
        .try_into()
        .map_err(|_| DecodeError::DialsNotFound { found })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedBackend;
    use meter_dials_core::GrayImage;

    fn row(xs: &[f32], y: f32, r: f32) -> Vec<DialRecord> {
        xs.iter().map(|&x| DialRecord::new(x, y, r)).collect()
    }

    #[test]
    fn keeps_the_five_aligned_dials_sorted_by_x() {
        let mut candidates = row(&[420.0, 100.0, 300.0, 180.0, 500.0], 200.0, 40.0);
        candidates[1].y = 203.0;
        candidates[3].y = 198.0;
        candidates.insert(2, DialRecord::new(250.0, 40.0, 38.0));
        candidates.push(DialRecord::new(60.0, 330.0, 41.0));

        let dials = select_dials(&candidates);
        let xs: Vec<f32> = dials.iter().map(|d| d.x).collect();
        assert_eq!(xs, vec![100.0, 180.0, 300.0, 420.0, 500.0]);
    }

    #[test]
    fn radius_filter_drops_small_circles_on_the_row() {
        let mut candidates = row(&[100.0, 200.0, 300.0, 400.0, 500.0], 100.0, 40.0);
        // a bolt head on the dial row
        candidates.push(DialRecord::new(20.0, 100.0, 12.0));
        let dials = select_dials(&candidates);
        assert_eq!(dials.len(), 5);
        assert!(dials.iter().all(|d| d.r == 40.0));
    }

    #[test]
    fn falls_back_to_aligned_set_when_radii_disagree() {
        // Radii spread so widely that fewer than five pass the consistency test.
        let candidates = vec![
            DialRecord::new(100.0, 100.0, 20.0),
            DialRecord::new(200.0, 100.0, 60.0),
            DialRecord::new(300.0, 100.0, 20.0),
            DialRecord::new(400.0, 100.0, 60.0),
            DialRecord::new(500.0, 100.0, 40.0),
        ];
        let dials = select_dials(&candidates);
        assert_eq!(dials.len(), 5);
        assert_eq!(dials[0].x, 100.0);
        assert_eq!(dials[4].x, 500.0);
    }

    #[test]
    fn takes_the_leftmost_five_when_more_survive() {
        let candidates = row(&[600.0, 100.0, 500.0, 200.0, 400.0, 300.0], 80.0, 30.0);
        let xs: Vec<f32> = select_dials(&candidates).iter().map(|d| d.x).collect();
        assert_eq!(xs, vec![100.0, 200.0, 300.0, 400.0, 500.0]);
    }

    #[test]
    fn too_few_candidates_is_dials_not_found() {
        let backend = ScriptedBackend::with_circles(row(&[1.0, 2.0, 3.0, 4.0], 5.0, 6.0));
        let img = GrayImage::new(8, 8);
        let err = locate_dials(&backend, &img.view(), &HoughCircleParams::default()).unwrap_err();
        assert_eq!(err, DecodeError::DialsNotFound { found: 4 });
    }

    #[test]
    fn scattered_candidates_are_dials_not_found() {
        let candidates = vec![
            DialRecord::new(100.0, 0.0, 10.0),
            DialRecord::new(200.0, 100.0, 10.0),
            DialRecord::new(300.0, 200.0, 10.0),
            DialRecord::new(400.0, 300.0, 10.0),
            DialRecord::new(500.0, 400.0, 10.0),
        ];
        let backend = ScriptedBackend::with_circles(candidates);
        let img = GrayImage::new(8, 8);
        let err = locate_dials(&backend, &img.view(), &HoughCircleParams::default()).unwrap_err();
        assert_eq!(err, DecodeError::DialsNotFound { found: 1 });
    }
}
