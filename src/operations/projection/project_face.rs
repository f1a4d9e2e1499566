use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::surface::Development;
use crate::math::polygon_2d::distinct_point_count;
use crate::math::{Point2, Point3};
use crate::topology::{FaceId, FaceStatus, FaceStore, SkipReason};

use super::frame::FaceFrame;

/// A face developed into its own local 2D frame.
#[derive(Debug, Clone)]
pub struct ProjectedFace {
    /// The source face.
    pub face: FaceId,
    /// Development used for the face.
    pub frame: FaceFrame,
    /// Developed boundary loops, outer first.
    pub loops: Vec<Vec<Point2>>,
    /// The 3D loops the developed loops came from, index for index.
    pub sources: Vec<Vec<Point3>>,
    /// Approximate face area, used to pick traversal roots.
    pub area: f64,
}

impl ProjectedFace {
    /// Local 2D position of a boundary vertex, if `point` is one.
    #[must_use]
    pub fn local_vertex(&self, point: &Point3, tol: f64) -> Option<Point2> {
        self.sources.iter().zip(&self.loops).find_map(|(src, flat)| {
            src.iter()
                .position(|p| (p - point).norm() <= tol)
                .map(|k| flat[k])
        })
    }

    /// Local 2D positions of the segment from `start` to `end`.
    ///
    /// A boundary edge joining the two vertices is preferred, so that
    /// unwrapped seams resolve to the copy that actually bounds the edge.
    #[must_use]
    pub fn local_segment(&self, start: &Point3, end: &Point3, tol: f64) -> (Point2, Point2) {
        for (src, flat) in self.sources.iter().zip(&self.loops) {
            let n = src.len();
            for k in 0..n {
                let next = (k + 1) % n;
                let near = |p: &Point3, q: &Point3| (p - q).norm() <= tol;
                if near(&src[k], start) && near(&src[next], end) {
                    return (flat[k], flat[next]);
                }
                if near(&src[k], end) && near(&src[next], start) {
                    return (flat[next], flat[k]);
                }
            }
        }
        let a = self
            .local_vertex(start, tol)
            .unwrap_or_else(|| self.frame.flatten(start));
        let b = self
            .local_vertex(end, tol)
            .unwrap_or_else(|| self.frame.flatten(end));
        (a, b)
    }
}

/// Classification of a face: developed, or skipped with a reason.
#[derive(Debug, Clone)]
pub enum FaceOutcome {
    Unfoldable(ProjectedFace),
    Skipped(SkipReason),
}

impl FaceOutcome {
    /// The status reported for this face.
    #[must_use]
    pub fn status(&self) -> FaceStatus {
        match self {
            Self::Unfoldable(_) => FaceStatus::Unfoldable,
            Self::Skipped(reason) => FaceStatus::Skipped(*reason),
        }
    }
}

/// Develops one face into its local 2D frame.
///
/// Degenerate faces are not errors: they come back as
/// [`FaceOutcome::Skipped`] and the rest of the request carries on.
pub struct ProjectFace {
    face: FaceId,
    tolerance: f64,
}

impl ProjectFace {
    /// Creates a new `ProjectFace` operation.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self {
            face,
            tolerance: 1e-9,
        }
    }

    /// Sets the distance under which two boundary points are one point.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the projection.
    ///
    /// # Errors
    ///
    /// Returns an error only if the face is not in the store.
    pub fn execute(&self, store: &FaceStore) -> Result<FaceOutcome> {
        let face = store.face(self.face)?;
        let tol = self.tolerance;

        if let FaceStatus::Skipped(reason) = face.status() {
            return Ok(self.skip(reason));
        }
        let frame = match FaceFrame::for_face(face) {
            Ok(frame) => frame,
            Err(reason) => return Ok(self.skip(reason)),
        };

        let mut loops = Vec::with_capacity(face.loops.len());
        let mut sources = Vec::with_capacity(face.loops.len());
        for (i, lp) in face.loops.iter().enumerate() {
            let flat = frame.flatten_loop(lp);
            let finite = flat.iter().all(|p| p.x.is_finite() && p.y.is_finite());
            if !finite || distinct_point_count(&flat, tol) < 3 {
                if i == 0 {
                    return Ok(self.skip(SkipReason::TooFewPoints));
                }
                debug!(face = ?self.face, hole = i, "dropping collapsed hole");
                continue;
            }
            loops.push(flat);
            sources.push(lp.clone());
        }

        debug!(face = ?self.face, frame = frame.name(), loops = loops.len(), "face developed");
        Ok(FaceOutcome::Unfoldable(ProjectedFace {
            face: self.face,
            frame,
            loops,
            sources,
            area: face.area,
        }))
    }

    fn skip(&self, reason: SkipReason) -> FaceOutcome {
        warn!(face = ?self.face, ?reason, "face skipped");
        FaceOutcome::Skipped(reason)
    }
}
