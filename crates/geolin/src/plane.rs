//! Plane in point–normal form.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// A point on the plane. For fitted planes this is the point centroid.
    pub origin: Point3<f64>,
    /// Unit normal. Its sign is not significant.
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Build from a point and any non-zero normal; the normal is rescaled to
    /// unit length. Returns `None` for a zero or non-finite normal.
    pub fn from_point_normal(origin: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let n = normal.norm();
        if !n.is_finite() || n == 0.0 {
            return None;
        }
        Some(Self {
            origin,
            normal: normal / n,
        })
    }

    /// Signed distance of `p` from the plane, positive on the normal side.
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.normal)
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal * self.signed_distance(p)
    }

    /// Root-mean-square distance of `points` from the plane.
    pub fn rms_distance(&self, points: &[Point3<f64>]) -> Option<f64> {
        if points.is_empty() {
            return None;
        }
        let sum_sq: f64 = points
            .iter()
            .map(|p| {
                let d = self.signed_distance(p);
                d * d
            })
            .sum();
        Some((sum_sq / points.len() as f64).sqrt())
    }

    /// Same plane with the normal reversed.
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }
}
