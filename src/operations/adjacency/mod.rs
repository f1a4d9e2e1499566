//! Face adjacency from shared boundary vertices.
//!
//! Two faces are adjacent when their boundaries share at least two distinct
//! vertices within tolerance, i.e. a real edge and not just a corner.
//! Centroid distance is never consulted: on a cube every centroid pair is
//! equidistant, yet only the pairs sharing an edge are adjacent.

mod vertex_grid;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::math::polygon_3d::dedup_points_3d;
use crate::math::Point3;
use crate::topology::{FaceData, FaceId, FaceStore};

use vertex_grid::VertexGrid;

/// The segment two adjacent faces share, about which one folds onto the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hinge {
    pub start: Point3,
    pub end: Point3,
}

impl Hinge {
    /// Length of the hinge segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Undirected adjacency over a set of faces.
///
/// Faces are addressed by dense slots in the order they were given to
/// [`BuildAdjacency`], which keeps every traversal deterministic.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    faces: Vec<FaceId>,
    slots: SecondaryMap<FaceId, usize>,
    neighbors: Vec<BTreeSet<usize>>,
    hinges: BTreeMap<(usize, usize), Hinge>,
}

impl AdjacencyGraph {
    fn with_faces(faces: Vec<FaceId>) -> Self {
        let mut slots = SecondaryMap::new();
        for (i, id) in faces.iter().enumerate() {
            slots.insert(*id, i);
        }
        let neighbors = vec![BTreeSet::new(); faces.len()];
        Self {
            faces,
            slots,
            neighbors,
            hinges: BTreeMap::new(),
        }
    }

    fn connect(&mut self, a: usize, b: usize, hinge: Hinge) {
        self.neighbors[a].insert(b);
        self.neighbors[b].insert(a);
        self.hinges.insert((a.min(b), a.max(b)), hinge);
    }

    /// Faces in the graph, in slot order.
    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// Dense slot of a face, if it is part of the graph.
    #[must_use]
    pub fn slot(&self, id: FaceId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Returns `true` if `a` and `b` share an edge.
    #[must_use]
    pub fn contains(&self, a: FaceId, b: FaceId) -> bool {
        match (self.slot(a), self.slot(b)) {
            (Some(sa), Some(sb)) => self.neighbors[sa].contains(&sb),
            _ => false,
        }
    }

    /// Neighbours of a face in slot order.
    #[must_use]
    pub fn neighbors(&self, id: FaceId) -> Vec<FaceId> {
        self.slot(id)
            .map(|s| self.neighbor_slots(s).map(|n| self.faces[n]).collect())
            .unwrap_or_default()
    }

    pub(crate) fn neighbor_slots(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[slot].iter().copied()
    }

    /// The shared segment of two adjacent faces.
    #[must_use]
    pub fn hinge(&self, a: FaceId, b: FaceId) -> Option<&Hinge> {
        let (sa, sb) = (self.slot(a)?, self.slot(b)?);
        self.hinges.get(&(sa.min(sb), sa.max(sb)))
    }

    /// All adjacent pairs as `(lower slot, higher slot)`, sorted.
    pub fn slot_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.hinges.keys().copied()
    }

    /// Number of adjacent pairs.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.hinges.len()
    }

    /// Number of faces in the graph.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Decides adjacency of two faces directly, without a graph.
///
/// Each face must own at least two distinct vertices that coincide with
/// vertices of the other within `tol`.
#[must_use]
pub fn are_adjacent(a: &FaceData, b: &FaceData, tol: f64) -> bool {
    let va = face_vertices(a, tol);
    let vb = face_vertices(b, tol);
    let shared = |from: &[Point3], to: &[Point3]| {
        from.iter()
            .filter(|p| to.iter().any(|q| (*p - q).norm() <= tol))
            .count()
    };
    shared(&va, &vb) >= 2 && shared(&vb, &va) >= 2
}

fn face_vertices(face: &FaceData, tol: f64) -> Vec<Point3> {
    let all: Vec<Point3> = face.boundary_points().copied().collect();
    dedup_points_3d(&all, tol)
}

/// Builds the adjacency graph of a set of faces.
pub struct BuildAdjacency {
    faces: Vec<FaceId>,
    tolerance: f64,
}

impl BuildAdjacency {
    /// Creates a new `BuildAdjacency` operation over `faces`.
    #[must_use]
    pub fn new(faces: Vec<FaceId>, tolerance: f64) -> Self {
        Self { faces, tolerance }
    }

    /// Executes the build.
    ///
    /// # Errors
    ///
    /// Returns an error if a face ID is not in the store.
    #[instrument(skip_all, fields(faces = self.faces.len()))]
    pub fn execute(&self, store: &FaceStore) -> Result<AdjacencyGraph> {
        let tol = self.tolerance;
        let mut graph = AdjacencyGraph::with_faces(self.faces.clone());

        let mut records = Vec::with_capacity(self.faces.len());
        for &id in &self.faces {
            records.push(store.face(id)?);
        }
        let vertices: Vec<Vec<Point3>> = records.iter().map(|f| face_vertices(f, tol)).collect();

        let mut grid = VertexGrid::new(tol);
        for (slot, verts) in vertices.iter().enumerate() {
            for (k, p) in verts.iter().enumerate() {
                grid.insert((slot, k), *p);
            }
        }

        // shared[(i, j)] = distinct vertices of face i that coincide with face j
        let mut shared: BTreeMap<(usize, usize), BTreeSet<usize>> = BTreeMap::new();
        for (i, verts) in vertices.iter().enumerate() {
            for (k, p) in verts.iter().enumerate() {
                grid.for_each_near(p, tol, |(j, _)| {
                    if j != i {
                        shared.entry((i, j)).or_default().insert(k);
                    }
                });
            }
        }

        let edge_hinges = self.edge_hinges(store, &graph, &grid);

        for (&(i, j), mine) in &shared {
            if i >= j || mine.len() < 2 {
                continue;
            }
            let theirs = shared.get(&(j, i)).map_or(0, BTreeSet::len);
            if theirs < 2 {
                continue;
            }
            let hinge = edge_hinges
                .get(&(i, j))
                .copied()
                .or_else(|| boundary_hinge(records[i], j, &grid, tol))
                .unwrap_or_else(|| farthest_shared(&vertices[i], mine));
            graph.connect(i, j, hinge);
        }

        debug!(pairs = graph.edge_count(), "adjacency built");
        Ok(graph)
    }

    /// Hinges taken from edge records whose endpoints lie on both faces.
    fn edge_hinges(
        &self,
        store: &FaceStore,
        graph: &AdjacencyGraph,
        grid: &VertexGrid,
    ) -> BTreeMap<(usize, usize), Hinge> {
        let tol = self.tolerance;
        let mut hinges = BTreeMap::new();
        for (edge_id, edge) in store.edges() {
            let [a, b] = edge.faces.as_slice() else {
                continue;
            };
            let (Some(sa), Some(sb)) = (graph.slot(*a), graph.slot(*b)) else {
                continue;
            };
            let on_both = [edge.start, edge.end].iter().all(|p| {
                grid.face_has_near(sa, p, tol) && grid.face_has_near(sb, p, tol)
            });
            if !edge.borders(*a, *b) || edge.length() <= tol || !on_both {
                debug!(?edge_id, "edge record does not confirm adjacency");
                continue;
            }
            hinges.entry((sa.min(sb), sa.max(sb))).or_insert(Hinge {
                start: edge.start,
                end: edge.end,
            });
        }
        hinges
    }
}

/// The longest boundary segment of `face` whose two ends both touch `other`.
fn boundary_hinge(face: &FaceData, other: usize, grid: &VertexGrid, tol: f64) -> Option<Hinge> {
    let mut best: Option<Hinge> = None;
    for lp in &face.loops {
        let n = lp.len();
        for k in 0..n {
            let (p, q) = (lp[k], lp[(k + 1) % n]);
            let len = (q - p).norm();
            if len <= tol || !grid.face_has_near(other, &p, tol) || !grid.face_has_near(other, &q, tol)
            {
                continue;
            }
            if best.map_or(true, |b| len > b.length() + tol) {
                best = Some(Hinge { start: p, end: q });
            }
        }
    }
    best
}

/// The two shared vertices farthest apart.
fn farthest_shared(vertices: &[Point3], shared: &BTreeSet<usize>) -> Hinge {
    let pts: Vec<Point3> = shared.iter().map(|&k| vertices[k]).collect();
    let mut best = (pts[0], pts[1], -1.0);
    for (a, p) in pts.iter().enumerate() {
        for q in &pts[a + 1..] {
            let d = (q - p).norm();
            if d > best.2 {
                best = (*p, *q, d);
            }
        }
    }
    Hinge {
        start: best.0,
        end: best.1,
    }
}
