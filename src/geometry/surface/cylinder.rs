use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::{unwrap_angles, Development};

/// A cylindrical surface in 3D space.
///
/// Defined by a center point on the axis, radius, axis direction, and
/// a reference direction marking the seam (angle zero).
///
/// `P(u, v) = center + radius * cos(u) * ref_dir + radius * sin(u) * binormal + v * axis`
/// where `binormal = axis x ref_dir`.
///
/// Development: `(radius * u, v)`, i.e. arc length from the seam and the
/// axial coordinate.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Arguments
    ///
    /// * `center` - A point on the cylinder axis
    /// * `radius` - Radius (must be positive)
    /// * `axis` - Axis direction (will be normalized)
    /// * `ref_dir` - Seam direction; its component along the axis is removed
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the axis is zero-length,
    /// or the reference direction is parallel to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if !radius.is_finite() || radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }

        let axis_len = axis.norm();
        if !axis_len.is_finite() || axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;

        let ref_dir = ref_dir - axis * ref_dir.dot(&axis);
        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cylinder seam direction is parallel to the axis".into(),
            )
            .into());
        }
        let ref_dir = ref_dir / ref_len;

        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
        })
    }

    /// Returns the center point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Computes the binormal direction (`axis x ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Computes the (u, v) parameters for a 3D point.
    ///
    /// - `u` = angle from the seam in `(-pi, pi]`
    /// - `v` = signed distance along the axis from the center
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.center;
        let v = dp.dot(&self.axis);
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        (u, v)
    }

    fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let x = self.radius * u.cos();
        let y = self.radius * u.sin();
        self.center + self.ref_dir * x + self.binormal() * y + self.axis * v
    }
}

impl Development for Cylinder {
    fn flatten(&self, point: &Point3) -> Point2 {
        let (u, v) = self.inverse(point);
        Point2::new(self.radius * u, v)
    }

    fn lift(&self, point: &Point2) -> Point3 {
        self.evaluate(point.x / self.radius, point.y)
    }

    fn flatten_loop(&self, points: &[Point3]) -> Vec<Point2> {
        let params: Vec<(f64, f64)> = points.iter().map(|p| self.inverse(p)).collect();
        let angles = unwrap_angles(params.iter().map(|&(u, _)| u));
        angles
            .iter()
            .zip(&params)
            .map(|(u, &(_, v))| Point2::new(self.radius * u, v))
            .collect()
    }
}
