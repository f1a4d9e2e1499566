use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::{FaceData, FaceId, FaceStore, SurfaceKind};

/// Inserts a sampled closed cylinder: one lateral face and two planar caps.
///
/// The lateral boundary runs once around the bottom ring, up the seam and
/// back around the top ring, so it develops into a single rectangle.
pub struct MakeCylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    height: f64,
    segments: usize,
}

impl MakeCylinder {
    /// Creates a new `MakeCylinder` operation.
    #[must_use]
    pub fn new(center: Point3, radius: f64, axis: Vector3, height: f64, segments: usize) -> Self {
        Self {
            center,
            radius,
            axis,
            height,
            segments,
        }
    }

    /// Executes the operation, returning `[lateral, bottom_cap, top_cap]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or height is not positive, the axis is
    /// degenerate, or fewer than three segments are requested.
    pub fn execute(&self, store: &mut FaceStore) -> Result<[FaceId; 3]> {
        if self.radius < TOLERANCE || self.height < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cylinder radius and height must be positive".into(),
            )
            .into());
        }
        if self.segments < 3 {
            return Err(GeometryError::Degenerate(
                "cylinder needs at least three segments".into(),
            )
            .into());
        }
        let axis = self
            .axis
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        let ref_dir = perpendicular_dir(&axis);
        let binormal = axis.cross(&ref_dir);

        let n = self.segments;
        #[allow(clippy::cast_precision_loss)]
        let ring = |offset: f64| -> Vec<Point3> {
            (0..n)
                .map(|i| {
                    let a = TAU * i as f64 / n as f64;
                    self.center
                        + (ref_dir * a.cos() + binormal * a.sin()) * self.radius
                        + axis * offset
                })
                .collect()
        };
        let bottom = ring(0.0);
        let top = ring(self.height);

        let mut lateral_loop = Vec::with_capacity(2 * n + 2);
        lateral_loop.extend(bottom.iter().copied());
        lateral_loop.push(bottom[0]);
        lateral_loop.push(top[0]);
        lateral_loop.extend(top.iter().rev().copied());

        let lateral = FaceData::new(
            SurfaceKind::Cylinder {
                radius: self.radius,
            },
            axis,
            self.center,
            self.center + axis * (self.height * 0.5),
            vec![lateral_loop],
            TAU * self.radius * self.height,
        );

        let lateral = store.add_face(lateral);
        let bottom_cap = store.add_face(FaceData::planar(bottom.into_iter().rev().collect()));
        let top_cap = store.add_face(FaceData::planar(top));
        Ok([lateral, bottom_cap, top_cap])
    }
}

fn perpendicular_dir(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    axis.cross(&candidate).normalize()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn caps_face_away_from_each_other() {
        let mut store = FaceStore::new();
        let [lateral, bottom, top] =
            MakeCylinder::new(Point3::origin(), 2.0, Vector3::z(), 5.0, 24)
                .execute(&mut store)
                .unwrap();
        assert!((store.face(bottom).unwrap().normal + Vector3::z()).norm() < 1e-9);
        assert!((store.face(top).unwrap().normal - Vector3::z()).norm() < 1e-9);
        let lateral = store.face(lateral).unwrap();
        assert!(matches!(lateral.kind, SurfaceKind::Cylinder { .. }));
        assert_eq!(lateral.loops[0].len(), 2 * 24 + 2);
    }

    #[test]
    fn ring_points_lie_on_the_surface() {
        let mut store = FaceStore::new();
        let [lateral, _, _] =
            MakeCylinder::new(Point3::new(1.0, 1.0, 1.0), 3.0, Vector3::x(), 2.0, 12)
                .execute(&mut store)
                .unwrap();
        for p in store.face(lateral).unwrap().boundary_points() {
            let d = p - Point3::new(1.0, 1.0, 1.0);
            let radial = d - Vector3::x() * d.x;
            assert!((radial.norm() - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn too_few_segments_is_rejected() {
        let mut store = FaceStore::new();
        assert!(MakeCylinder::new(Point3::origin(), 1.0, Vector3::z(), 1.0, 2)
            .execute(&mut store)
            .is_err());
    }
}
