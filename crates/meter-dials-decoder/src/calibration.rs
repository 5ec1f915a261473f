//! Manual dial calibration and its persistence.
//!
//! A calibration is five user-supplied dial circles that replace automatic
//! localization. It is persisted as a JSON array of `{x, y, r}` objects under
//! [`CALIBRATION_KEY`]. On restore the stored value is trusted only when it
//! is exactly five well-formed records; anything else counts as "no
//! calibration".

use meter_dials_core::{DialRecord, DIAL_COUNT};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StoreError};

/// Storage key of the persisted calibration.
pub const CALIBRATION_KEY: &str = "au_meter_calibration_v1";

/// Radius estimated from clicked centers, as a fraction of half the
/// smallest distance between neighbouring centers.
pub const CLICK_RADIUS_FRACTION: f32 = 0.9;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("calibration needs exactly 5 dials, got {0}")]
    WrongCount(usize),
    #[error("calibration dial {} is malformed", .index + 1)]
    Malformed { index: usize },
    #[error("calibration points are degenerate (coincident or non-finite)")]
    Degenerate,
}

/// Five dial circles supplied by the user, in the order they were given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DialRecord>", into = "Vec<DialRecord>")]
pub struct Calibration {
    dials: [DialRecord; DIAL_COUNT],
}

impl Calibration {
    pub fn new(dials: [DialRecord; DIAL_COUNT]) -> Result<Self, CalibrationError> {
        if let Some(index) = dials.iter().position(|d| !d.is_well_formed()) {
            return Err(CalibrationError::Malformed { index });
        }
        Ok(Self { dials })
    }

    /// Build a calibration from five clicked dial centers, left to right.
    ///
    /// All dials share one radius: 90% of half the smallest distance between
    /// successive points.
    pub fn from_points(points: &[Point2<f32>]) -> Result<Self, CalibrationError> {
        if points.len() != DIAL_COUNT {
            return Err(CalibrationError::WrongCount(points.len()));
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(CalibrationError::Degenerate);
        }
        let min_gap = points
            .windows(2)
            .map(|w| nalgebra::distance(&w[0], &w[1]))
            .fold(f32::INFINITY, f32::min);
        let r = CLICK_RADIUS_FRACTION * min_gap / 2.0;
        if !(r.is_finite() && r > 0.0) {
            return Err(CalibrationError::Degenerate);
        }

        let dials = std::array::from_fn(|i| DialRecord::new(points[i].x, points[i].y, r));
        Self::new(dials)
    }

    pub fn dials(&self) -> &[DialRecord; DIAL_COUNT] {
        &self.dials
    }

    /// JSON array of the five records, the form kept in the store.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.dials[..])
    }

    /// Parse a persisted value. Anything but five well-formed records is `None`.
    pub fn from_persisted(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Calibration>(raw) {
            Ok(cal) => Some(cal),
            Err(e) => {
                log::warn!("ignoring persisted calibration: {e}");
                None
            }
        }
    }
}

impl TryFrom<Vec<DialRecord>> for Calibration {
    type Error = CalibrationError;

    fn try_from(dials: Vec<DialRecord>) -> Result<Self, Self::Error> {
        let dials: [DialRecord; DIAL_COUNT] = dials
            .try_into()
            .map_err(|v: Vec<DialRecord>| CalibrationError::WrongCount(v.len()))?;
        Self::new(dials)
    }
}

impl From<Calibration> for Vec<DialRecord> {
    fn from(cal: Calibration) -> Self {
        cal.dials.to_vec()
    }
}

/// Load the calibration from `store`, treating anything invalid as absent.
pub fn restore_calibration<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<Calibration>, StoreError> {
    let Some(raw) = store.load(CALIBRATION_KEY)? else {
        return Ok(None);
    };
    let cal = Calibration::from_persisted(&raw);
    if cal.is_some() {
        log::info!("calibration restored");
    }
    Ok(cal)
}

pub fn save_calibration<S: KeyValueStore + ?Sized>(
    store: &mut S,
    calibration: &Calibration,
) -> Result<(), StoreError> {
    store.save(CALIBRATION_KEY, &calibration.to_json()?)?;
    log::info!("calibration saved");
    Ok(())
}

pub fn clear_calibration<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(CALIBRATION_KEY)?;
    log::info!("calibration cleared");
    Ok(())
}
