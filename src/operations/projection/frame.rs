use crate::geometry::surface::{Cone, Cylinder, Development, Plane};
use crate::math::polygon_3d::is_usable_direction;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};
use crate::topology::{FaceData, SkipReason, SurfaceKind};

/// The local 2D frame a face is developed into.
#[derive(Debug, Clone)]
pub enum FaceFrame {
    /// Orthonormal basis in the face plane.
    Plane(Plane),
    /// Arc-length unrolling around a cylinder axis.
    Cylinder(Cylinder),
    /// Sector development about a cone apex.
    Cone(Cone),
}

impl FaceFrame {
    /// Builds the development frame of a face.
    ///
    /// Curved faces whose boundary was synthesized are developed through a
    /// planar proxy, since the synthetic square does not lie on the surface.
    ///
    /// # Errors
    ///
    /// Returns the skip reason when no stable frame exists: a near-zero
    /// normal or axis, unusable surface parameters, or a non-developable
    /// surface.
    pub fn for_face(face: &FaceData) -> Result<Self, SkipReason> {
        if !face.kind.is_developable() {
            return Err(SkipReason::NonDevelopable);
        }
        if !is_usable_direction(&face.normal) {
            return Err(SkipReason::DegenerateNormal);
        }
        if face.boundary_synthesized {
            return plane_frame(face);
        }

        match face.kind {
            SurfaceKind::Cylinder { radius } => cylinder_frame(face, radius),
            SurfaceKind::Cone { half_angle } => cone_frame(face, half_angle),
            _ => plane_frame(face),
        }
    }

    /// Short name of the development used, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plane(_) => "plane",
            Self::Cylinder(_) => "cylinder",
            Self::Cone(_) => "cone",
        }
    }
}

impl Development for FaceFrame {
    fn flatten(&self, point: &Point3) -> Point2 {
        match self {
            Self::Plane(s) => s.flatten(point),
            Self::Cylinder(s) => s.flatten(point),
            Self::Cone(s) => s.flatten(point),
        }
    }

    fn lift(&self, point: &Point2) -> Point3 {
        match self {
            Self::Plane(s) => s.lift(point),
            Self::Cylinder(s) => s.lift(point),
            Self::Cone(s) => s.lift(point),
        }
    }

    fn flatten_loop(&self, points: &[Point3]) -> Vec<Point2> {
        match self {
            Self::Plane(s) => s.flatten_loop(points),
            Self::Cylinder(s) => s.flatten_loop(points),
            Self::Cone(s) => s.flatten_loop(points),
        }
    }
}

fn plane_frame(face: &FaceData) -> Result<FaceFrame, SkipReason> {
    Plane::from_normal(face.origin, face.normal)
        .map(FaceFrame::Plane)
        .map_err(|_| SkipReason::DegenerateNormal)
}

/// Radial direction of the first boundary vertex, used as the seam.
fn seam_direction(face: &FaceData, axis: &Vector3) -> Option<Vector3> {
    face.boundary_points().find_map(|p| {
        let d = p - face.origin;
        let radial = d - axis * d.dot(axis);
        (radial.norm() > TOLERANCE.sqrt()).then_some(radial)
    })
}

fn cylinder_frame(face: &FaceData, radius: f64) -> Result<FaceFrame, SkipReason> {
    let axis = face.normal.normalize();
    let seam = seam_direction(face, &axis).ok_or(SkipReason::DegenerateSurface)?;
    let radius = if radius.is_finite() && radius > TOLERANCE {
        radius
    } else {
        mean_radial_distance(face, &axis).ok_or(SkipReason::DegenerateSurface)?
    };
    Cylinder::new(face.origin, radius, axis, seam)
        .map(FaceFrame::Cylinder)
        .map_err(|_| SkipReason::DegenerateSurface)
}

fn cone_frame(face: &FaceData, half_angle: f64) -> Result<FaceFrame, SkipReason> {
    let axis = face.normal.normalize();
    let seam = seam_direction(face, &axis).ok_or(SkipReason::DegenerateSurface)?;
    let valid = |a: f64| a.is_finite() && a > TOLERANCE && a < std::f64::consts::FRAC_PI_2;
    let half_angle = if valid(half_angle) {
        half_angle
    } else {
        mean_half_angle(face, &axis)
            .filter(|a| valid(*a))
            .ok_or(SkipReason::DegenerateSurface)?
    };
    Cone::new(face.origin, axis, half_angle, seam)
        .map(FaceFrame::Cone)
        .map_err(|_| SkipReason::DegenerateSurface)
}

fn mean_radial_distance(face: &FaceData, axis: &Vector3) -> Option<f64> {
    mean(face.boundary_points().map(|p| {
        let d = p - face.origin;
        (d - axis * d.dot(axis)).norm()
    }))
    .filter(|r| *r > TOLERANCE)
}

fn mean_half_angle(face: &FaceData, axis: &Vector3) -> Option<f64> {
    mean(face.boundary_points().filter_map(|p| {
        let d = p - face.origin;
        let along = d.dot(axis);
        let radial = (d - axis * along).norm();
        (along > TOLERANCE).then(|| radial.atan2(along))
    }))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / f64::from(count))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ring(radius: f64, z: f64, n: u32) -> Vec<Point3> {
        (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * f64::from(i) / f64::from(n);
                Point3::new(radius * a.cos(), radius * a.sin(), z)
            })
            .collect()
    }

    #[test]
    fn planar_face_gets_plane_frame() {
        let face = FaceData::planar(ring(1.0, 2.0, 6));
        assert!(matches!(FaceFrame::for_face(&face), Ok(FaceFrame::Plane(_))));
    }

    #[test]
    fn zero_normal_is_degenerate() {
        let mut face = FaceData::planar(ring(1.0, 0.0, 4));
        face.normal = Vector3::new(1e-12, 0.0, 0.0);
        assert_eq!(FaceFrame::for_face(&face).err(), Some(SkipReason::DegenerateNormal));
    }

    #[test]
    fn sphere_is_not_developable() {
        let face = FaceData::new(
            SurfaceKind::Sphere { radius: 1.0 },
            Vector3::z(),
            Point3::origin(),
            Point3::origin(),
            vec![ring(1.0, 0.0, 8)],
            4.0,
        );
        assert_eq!(FaceFrame::for_face(&face).err(), Some(SkipReason::NonDevelopable));
    }

    #[test]
    fn cylinder_radius_is_estimated_when_missing() {
        let face = FaceData::new(
            SurfaceKind::Cylinder { radius: 0.0 },
            Vector3::z(),
            Point3::origin(),
            Point3::new(0.0, 0.0, 0.5),
            vec![ring(2.5, 0.0, 8)],
            1.0,
        );
        let Ok(FaceFrame::Cylinder(c)) = FaceFrame::for_face(&face) else {
            panic!("expected a cylinder frame");
        };
        assert!((c.radius() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn cone_half_angle_is_estimated_when_missing() {
        let face = FaceData::new(
            SurfaceKind::Cone { half_angle: f64::NAN },
            Vector3::z(),
            Point3::origin(),
            Point3::new(0.0, 0.0, 1.0),
            vec![ring(1.0, 1.0, 8)],
            1.0,
        );
        let Ok(FaceFrame::Cone(c)) = FaceFrame::for_face(&face) else {
            panic!("expected a cone frame");
        };
        assert!((c.half_angle() - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn boundary_on_the_axis_is_degenerate() {
        let face = FaceData::new(
            SurfaceKind::Cylinder { radius: 1.0 },
            Vector3::z(),
            Point3::origin(),
            Point3::origin(),
            vec![vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 2.0),
            ]],
            1.0,
        );
        assert_eq!(FaceFrame::for_face(&face).err(), Some(SkipReason::DegenerateSurface));
    }

    #[test]
    fn synthesized_curved_face_uses_plane_proxy() {
        let face = FaceData::new(
            SurfaceKind::Cylinder { radius: 1.0 },
            Vector3::z(),
            Point3::origin(),
            Point3::origin(),
            Vec::new(),
            9.0,
        );
        assert!(matches!(FaceFrame::for_face(&face), Ok(FaceFrame::Plane(_))));
    }
}
