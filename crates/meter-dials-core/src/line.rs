use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Line in Hesse normal form, `x cos(theta) + y sin(theta) = rho`.
///
/// `theta` is in radians and, as produced by a Hough transform, lies in
/// `[0, pi)`. Coordinates are relative to the image the line was found in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarLine {
    pub rho: f32,
    pub theta: f32,
}

impl PolarLine {
    pub fn new(rho: f32, theta: f32) -> Self {
        Self { rho, theta }
    }

    pub fn from_degrees(rho: f32, theta_deg: f32) -> Self {
        Self::new(rho, theta_deg.to_radians())
    }

    pub fn normal(&self) -> Vector2<f32> {
        let (s, c) = self.theta.sin_cos();
        Vector2::new(c, s)
    }

    /// Unit direction along the line.
    pub fn direction(&self) -> Vector2<f32> {
        let (s, c) = self.theta.sin_cos();
        Vector2::new(-s, c)
    }

    /// Point of the line closest to the origin.
    pub fn foot(&self) -> Point2<f32> {
        Point2::origin() + self.normal() * self.rho
    }

    /// Same line expressed in a frame whose origin is at `(-dx, -dy)` of the current one.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let n = self.normal();
        Self::new(self.rho + dx * n.x + dy * n.y, self.theta)
    }

    /// Segment of length `2 * half_len` centered on the projection of `around`.
    pub fn segment_around(&self, around: Point2<f32>, half_len: f32) -> (Point2<f32>, Point2<f32>) {
        let d = self.direction();
        let foot = self.foot();
        let t = (around - foot).dot(&d);
        let mid = foot + d * t;
        (mid - d * half_len, mid + d * half_len)
    }
}
