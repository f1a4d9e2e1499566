use serde::{Deserialize, Serialize};

use crate::math::Point3;

use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the face store.
    pub struct EdgeId;
}

/// A boundary curve between faces, reduced to its endpoints.
///
/// Edges are not owned by faces. They only confirm adjacency and supply the
/// exact hinge segment when they name both faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    /// Start point of the edge.
    pub start: Point3,
    /// End point of the edge.
    pub end: Point3,
    /// Faces bordering the edge (at most two).
    pub faces: Vec<FaceId>,
}

impl EdgeData {
    /// Creates an edge with no known bordering faces.
    #[must_use]
    pub fn new(start: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            faces: Vec::new(),
        }
    }

    /// Records the faces on either side of the edge.
    #[must_use]
    pub fn between(mut self, a: FaceId, b: FaceId) -> Self {
        self.faces = vec![a, b];
        self
    }

    /// Returns `true` if the edge names both `a` and `b`.
    #[must_use]
    pub fn borders(&self, a: FaceId, b: FaceId) -> bool {
        a != b && self.faces.contains(&a) && self.faces.contains(&b)
    }

    /// Length of the straight segment between the endpoints.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}
