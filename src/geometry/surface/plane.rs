use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::Development;

/// A plane with an orthonormal in-plane basis.
///
/// `(u_dir, v_dir, normal)` is right-handed, so a loop that winds
/// counter-clockwise about `normal` stays counter-clockwise once flattened.
///
/// Parametric form: `P(x, y) = origin + x * u_dir + y * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// The reference axis is the world axis least aligned with the normal.
    /// `u_dir` is that axis Gram-Schmidt-orthogonalized against the normal,
    /// and `v_dir = normal x u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length or not finite.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if !len.is_finite() || len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        let reference = least_aligned_axis(&normal);
        let projected = reference - normal * reference.dot(&normal);
        let u_len = projected.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::Degenerate("plane basis collapsed".into()).into());
        }
        let u_dir = projected / u_len;
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the unit normal of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project_point(&self, point: &Point3) -> Point3 {
        point - self.normal * (point - self.origin).dot(&self.normal)
    }
}

impl Development for Plane {
    fn flatten(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }

    fn lift(&self, point: &Point2) -> Point3 {
        self.origin + self.u_dir * point.x + self.v_dir * point.y
    }
}

/// Returns the world axis with the smallest absolute component in `n`.
fn least_aligned_axis(n: &Vector3) -> Vector3 {
    let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
    if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    }
}
