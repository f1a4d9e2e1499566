use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::surface::{Development, Plane};
use crate::math::polygon_3d::{dedup_points_3d, is_usable_direction};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

slotmap::new_key_type! {
    /// Unique identifier for a face in the face store.
    pub struct FaceId;
}

/// Smallest side length of a synthesized boundary square, in model units.
pub const MIN_SYNTHETIC_SIZE: f64 = 1.0;

/// The kind of surface a face lies on, with the parameters needed to
/// develop it.
///
/// For curved kinds the face's `normal` holds the surface axis and its
/// `origin` a point on that axis (the apex, for cones).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// A planar surface.
    Plane,
    /// A cylindrical surface.
    Cylinder { radius: f64 },
    /// A conical surface.
    Cone { half_angle: f64 },
    /// A spherical surface.
    Sphere { radius: f64 },
    /// Any other (free-form) surface.
    Other,
}

impl SurfaceKind {
    /// Returns `true` if the surface can be flattened without distortion.
    #[must_use]
    pub fn is_developable(&self) -> bool {
        matches!(self, Self::Plane | Self::Cylinder { .. } | Self::Cone { .. })
    }

    /// Returns `true` for planar surfaces.
    #[must_use]
    pub fn is_plane(&self) -> bool {
        matches!(self, Self::Plane)
    }
}

/// Why a face was left out of the unfolding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The extractor flagged the face as not unfoldable.
    MarkedByExtractor,
    /// The plane normal or surface axis is too short to build a frame.
    DegenerateNormal,
    /// The surface parameters (radius, half-angle) are unusable.
    DegenerateSurface,
    /// The outer boundary has fewer than three distinct points.
    TooFewPoints,
    /// Spheres and free-form surfaces cannot be flattened without distortion.
    NonDevelopable,
}

/// Outcome of classifying a face for unfolding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceStatus {
    /// The face is projected, grouped and laid out.
    Unfoldable,
    /// The face is reported but not rendered.
    Skipped(SkipReason),
}

impl FaceStatus {
    /// Returns `true` if the face takes part in the unfolding.
    #[must_use]
    pub fn is_unfoldable(&self) -> bool {
        matches!(self, Self::Unfoldable)
    }
}

/// A boundary surface of the solid, as supplied by the shape extractor.
///
/// Loops are closed implicitly (the last point connects to the first). The
/// first loop is the outer boundary; any further loops are holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceData {
    /// Surface kind and development parameters.
    pub kind: SurfaceKind,
    /// Unit normal for planes, axis direction for curved surfaces.
    pub normal: Vector3,
    /// Origin of the surface (a point on the plane, axis or cone apex).
    pub origin: Point3,
    /// Area centroid of the face.
    pub centroid: Point3,
    /// Boundary loops, outer first.
    pub loops: Vec<Vec<Point3>>,
    /// Approximate face area.
    pub area: f64,
    /// Extractor verdict on whether the face may be unfolded.
    pub unfoldable: bool,
    /// `true` when the boundary was replaced by a synthetic square.
    pub boundary_synthesized: bool,
}

impl FaceData {
    /// Creates a face record, synthesizing a square boundary when the
    /// extractor supplied none.
    ///
    /// The square has side `max(sqrt(area), MIN_SYNTHETIC_SIZE)`, is aligned
    /// with the face plane's basis and centred at the centroid projected onto
    /// the plane through `origin` with normal `normal`.
    #[must_use]
    pub fn new(
        kind: SurfaceKind,
        normal: Vector3,
        origin: Point3,
        centroid: Point3,
        loops: Vec<Vec<Point3>>,
        area: f64,
    ) -> Self {
        let mut loops: Vec<Vec<Point3>> = loops.into_iter().filter(|l| !l.is_empty()).collect();
        let mut boundary_synthesized = false;
        if loops.is_empty() {
            if let Some(square) = synthetic_square(&normal, &origin, &centroid, area) {
                debug!(area, "synthesizing square boundary");
                loops.push(square);
                boundary_synthesized = true;
            }
        }

        Self {
            kind,
            normal,
            origin,
            centroid,
            loops,
            area,
            unfoldable: true,
            boundary_synthesized,
        }
    }

    /// Creates a planar face from its outer loop.
    ///
    /// Normal, centroid and area are derived from the loop (Newell's method),
    /// so the loop should wind counter-clockwise seen from outside.
    #[must_use]
    pub fn planar(outer: Vec<Point3>) -> Self {
        let newell = crate::math::polygon_3d::newell_normal(&outer);
        let area = newell.norm() * 0.5;
        let normal = newell.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        let centroid =
            crate::math::polygon_3d::vertex_centroid(&outer).unwrap_or_else(Point3::origin);
        let origin = outer.first().copied().unwrap_or(centroid);
        Self::new(SurfaceKind::Plane, normal, origin, centroid, vec![outer], area)
    }

    /// Sets the extractor's unfoldable flag.
    #[must_use]
    pub fn with_unfoldable(mut self, unfoldable: bool) -> Self {
        self.unfoldable = unfoldable;
        self
    }

    /// Returns the outer boundary loop, if any.
    #[must_use]
    pub fn outer_loop(&self) -> Option<&[Point3]> {
        self.loops.first().map(Vec::as_slice)
    }

    /// Iterates over every boundary vertex of every loop.
    pub fn boundary_points(&self) -> impl Iterator<Item = &Point3> {
        self.loops.iter().flatten()
    }

    /// Classifies the face from its own record.
    ///
    /// Checks, in order: the extractor flag, the surface kind, the outer
    /// loop and the normal. Surface parameters are checked later, when the
    /// development frame is built.
    #[must_use]
    pub fn status(&self) -> FaceStatus {
        if !self.unfoldable {
            return FaceStatus::Skipped(SkipReason::MarkedByExtractor);
        }
        if !self.kind.is_developable() {
            return FaceStatus::Skipped(SkipReason::NonDevelopable);
        }
        let enough_points = self
            .outer_loop()
            .is_some_and(|outer| dedup_points_3d(outer, TOLERANCE).len() >= 3);
        if !enough_points {
            return FaceStatus::Skipped(SkipReason::TooFewPoints);
        }
        if !is_usable_direction(&self.normal) {
            return FaceStatus::Skipped(SkipReason::DegenerateNormal);
        }
        FaceStatus::Unfoldable
    }
}

/// Side length of the synthetic boundary square for a face of `area`.
#[must_use]
pub fn synthetic_square_side(area: f64) -> f64 {
    let area = if area.is_finite() { area.max(0.0) } else { 0.0 };
    area.sqrt().max(MIN_SYNTHETIC_SIZE)
}

fn synthetic_square(
    normal: &Vector3,
    origin: &Point3,
    centroid: &Point3,
    area: f64,
) -> Option<Vec<Point3>> {
    // A degenerate normal still gets a renderable proxy; classification
    // rejects the face later.
    let plane = Plane::from_normal(*origin, *normal)
        .or_else(|_| Plane::from_normal(*origin, Vector3::z()))
        .ok()?;
    let center = plane.flatten(&plane.project_point(centroid));
    let h = synthetic_square_side(area) * 0.5;
    let corners = [(-h, -h), (h, -h), (h, h), (-h, h)];
    Some(
        corners
            .iter()
            .map(|&(du, dv)| plane.lift(&Point2::new(center.x + du, center.y + dv)))
            .collect(),
    )
}
