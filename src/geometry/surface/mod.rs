mod cone;
mod cylinder;
mod plane;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use plane::Plane;

use std::f64::consts::{PI, TAU};

use crate::math::{Point2, Point3};

/// A surface that can be laid flat without stretching.
///
/// `flatten` maps a point on the surface into the surface's 2D development;
/// `lift` is its inverse for points inside the developed region.
pub trait Development {
    /// Maps a 3D point on the surface to its developed 2D position.
    fn flatten(&self, point: &Point3) -> Point2;

    /// Maps a developed 2D position back onto the surface.
    fn lift(&self, point: &Point2) -> Point3;

    /// Flattens an ordered boundary loop.
    ///
    /// Surfaces with an angular parameter override this to unwrap the angle
    /// along the loop so the development stays continuous across the seam.
    fn flatten_loop(&self, points: &[Point3]) -> Vec<Point2> {
        points.iter().map(|p| self.flatten(p)).collect()
    }
}

/// Unwraps a sequence of angles in `(-pi, pi]` into a continuous sequence.
///
/// The first angle is shifted into `[-pi, pi)` relative to zero; each
/// following angle is moved by whole turns to lie within half a turn of its
/// predecessor.
pub(crate) fn unwrap_angles(angles: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for a in angles {
        let next = match out.last() {
            None => wrap_angle(a),
            Some(prev) => prev + wrap_angle(a - prev),
        };
        out.push(next);
    }
    out
}

/// Wraps an angle into `[-pi, pi)`.
pub(crate) fn wrap_angle(a: f64) -> f64 {
    (a + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    #[test]
    fn wrap_keeps_small_angles() {
        assert!((wrap_angle(0.5) - 0.5).abs() < TOLERANCE);
        assert!((wrap_angle(-0.5) + 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn wrap_folds_full_turns() {
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-9);
        assert!((wrap_angle(-TAU - 0.25) + 0.25).abs() < 1e-9);
    }

    #[test]
    fn unwrap_crosses_seam_continuously() {
        let raw = [3.0, -3.0, -2.5];
        let unwrapped = unwrap_angles(raw);
        assert!((unwrapped[0] - 3.0).abs() < TOLERANCE);
        assert!((unwrapped[1] - (TAU - 3.0)).abs() < 1e-9);
        assert!((unwrapped[2] - (TAU - 2.5)).abs() < 1e-9);
    }
}
