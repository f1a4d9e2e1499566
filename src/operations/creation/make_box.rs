use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::{EdgeData, FaceData, FaceId, FaceStore};

/// Vertex indices of each box face, counter-clockwise seen from outside.
///
/// Order: bottom, top, front, back, left, right.
const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// The twelve box edges as `(vertex, vertex, face, face)`.
const EDGES: [(usize, usize, usize, usize); 12] = [
    (0, 1, 0, 2),
    (1, 2, 0, 5),
    (2, 3, 0, 3),
    (3, 0, 0, 4),
    (4, 5, 1, 2),
    (5, 6, 1, 5),
    (6, 7, 1, 3),
    (7, 4, 1, 4),
    (0, 4, 2, 4),
    (1, 5, 2, 5),
    (2, 6, 3, 5),
    (3, 7, 3, 4),
];

/// Inserts the six planar faces and twelve edges of an axis-aligned box.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, returning the face IDs in the order
    /// `[bottom, top, front, back, left, right]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the box has zero extent along any axis.
    pub fn execute(&self, store: &mut FaceStore) -> Result<[FaceId; 6]> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        let extent = hi - lo;
        if extent.iter().any(|e| *e < TOLERANCE) {
            return Err(GeometryError::Degenerate(format!(
                "box extent must be positive, got ({}, {}, {})",
                extent.x, extent.y, extent.z
            ))
            .into());
        }

        let v = [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ];

        let ids = FACE_CORNERS.map(|corners| {
            store.add_face(FaceData::planar(corners.iter().map(|&i| v[i]).collect()))
        });

        for &(a, b, fa, fb) in &EDGES {
            store.add_edge(EdgeData::new(v[a], v[b]).between(ids[fa], ids[fb]));
        }

        Ok(ids)
    }
}
