use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::{unwrap_angles, Development};

/// A conical surface in 3D space.
///
/// Defined by an apex point, an axis direction, a half-angle, and a
/// reference direction marking the seam (angle zero).
///
/// `P(u, s) = apex + s * (cos(alpha) * axis + sin(alpha) * (cos(u) * ref_dir + sin(u) * binormal))`
/// where `binormal = axis x ref_dir` and `alpha` is the half-angle.
///
/// The development is a circular sector centred on the apex: a point at
/// slant distance `s` and angle `u` lands at polar coordinates
/// `(s, u * sin(alpha))`. Generator lengths and the arc lengths of parallel
/// circles are preserved.
#[derive(Debug, Clone)]
pub struct Cone {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
    ref_dir: Vector3,
}

impl Cone {
    /// Creates a new cone.
    ///
    /// # Arguments
    ///
    /// * `apex` - The apex (tip) of the cone
    /// * `axis` - Axis direction from apex outward (will be normalized)
    /// * `half_angle` - Half-angle in radians (must be in `(0, pi/2)`)
    /// * `ref_dir` - Seam direction; its component along the axis is removed
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is out of range, the axis is
    /// zero-length, or the reference direction is parallel to the axis.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64, ref_dir: Vector3) -> Result<Self> {
        if !half_angle.is_finite()
            || half_angle <= TOLERANCE
            || half_angle >= std::f64::consts::FRAC_PI_2 - TOLERANCE
        {
            return Err(GeometryError::Degenerate(
                "cone half-angle must be in (0, pi/2)".into(),
            )
            .into());
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
                "cone seam direction is parallel to the axis".into(),
            )
            .into());
        }
        let ref_dir = ref_dir / ref_len;

        Ok(Self {
            apex,
            axis,
            half_angle,
            ref_dir,
        })
    }

    /// Returns the apex point.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Computes the (u, s) parameters for a given 3D point on the surface.
    ///
    /// - `u` = angle around the axis from the seam in `(-pi, pi]`
    /// - `s` = slant distance from the apex (>= 0)
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.apex;
        let s = dp.norm();
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        (u, s)
    }

    fn sector_point(&self, u: f64, s: f64) -> Point2 {
        let phi = u * self.half_angle.sin();
        Point2::new(s * phi.cos(), s * phi.sin())
    }
}

impl Development for Cone {
    fn flatten(&self, point: &Point3) -> Point2 {
        let (u, s) = self.inverse(point);
        self.sector_point(u, s)
    }

    /// Valid for sector angles in `(-pi, pi]`.
    fn lift(&self, point: &Point2) -> Point3 {
        let s = point.coords.norm();
        let u = point.y.atan2(point.x) / self.half_angle.sin();
        let (sin_a, cos_a) = self.half_angle.sin_cos();
        let radial = self.ref_dir * u.cos() + self.binormal() * u.sin();
        self.apex + (self.axis * cos_a + radial * sin_a) * s
    }

    fn flatten_loop(&self, points: &[Point3]) -> Vec<Point2> {
        let params: Vec<(f64, f64)> = points.iter().map(|p| self.inverse(p)).collect();
        let angles = unwrap_angles(params.iter().map(|&(u, _)| u));
        angles
            .iter()
            .zip(&params)
            .map(|(&u, &(_, s))| self.sector_point(u, s))
            .collect()
    }
}
