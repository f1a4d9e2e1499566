pub mod edge;
pub mod face;

pub use edge::{EdgeData, EdgeId};
pub use face::{
    synthetic_square_side, FaceData, FaceId, FaceStatus, SkipReason, SurfaceKind,
    MIN_SYNTHETIC_SIZE,
};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns the face and edge records of one request.
///
/// Entities are referenced by typed IDs (generational indices). Records are
/// immutable once inserted, and iteration follows insertion order, which is
/// the extractor's order.
#[derive(Debug, Default)]
pub struct FaceStore {
    faces: SlotMap<FaceId, FaceData>,
    edges: SlotMap<EdgeId, EdgeData>,
}

impl FaceStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("face {id:?}")))
    }

    /// Iterates over all faces in insertion order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    /// Returns all face IDs in insertion order.
    #[must_use]
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().collect()
    }

    /// Number of faces in the store.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Position of a face in insertion order.
    #[must_use]
    pub fn dense_index(&self, id: FaceId) -> Option<usize> {
        self.faces.keys().position(|k| k == id)
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("edge {id:?}")))
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    /// Number of edges in the store.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn triangle(z: f64) -> FaceData {
        FaceData::planar(vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ])
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut store = FaceStore::new();
        let ids: Vec<FaceId> = (0..5).map(|i| store.add_face(triangle(f64::from(i)))).collect();
        assert_eq!(store.face_ids(), ids);
        let zs: Vec<f64> = store.faces().map(|(_, f)| f.loops[0][0].z).collect();
        assert_eq!(zs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(store.dense_index(ids[3]), Some(3));
    }

    #[test]
    fn lookup_of_foreign_id_fails() {
        let mut other = FaceStore::new();
        other.add_face(triangle(0.0));
        let foreign = other.add_face(triangle(1.0));
        let store = FaceStore::new();
        assert!(store.face(foreign).is_err());
    }

    #[test]
    fn edges_record_bordering_faces() {
        let mut store = FaceStore::new();
        let a = store.add_face(triangle(0.0));
        let b = store.add_face(triangle(1.0));
        let e = store.add_edge(
            EdgeData::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).between(a, b),
        );
        let edge = store.edge(e).unwrap();
        assert!(edge.borders(a, b));
        assert!(edge.borders(b, a));
        assert!(!edge.borders(a, a));
        assert!((edge.length() - 1.0).abs() < 1e-12);
        assert_eq!(store.edge_count(), 1);
    }
}
