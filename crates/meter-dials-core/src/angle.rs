/// Number of digit ticks on one full revolution of a register dial.
pub const TICKS_PER_REVOLUTION: u32 = 10;

/// Angular width of one tick sector in degrees.
pub const DEGREES_PER_TICK: f32 = 360.0 / TICKS_PER_REVOLUTION as f32;

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_deg(deg: f32) -> f32 {
    let a = deg.rem_euclid(360.0);
    // rem_euclid may round tiny negative inputs up to exactly 360
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}
