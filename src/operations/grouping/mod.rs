mod union_find;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::topology::{FaceData, FaceId, FaceStore};

use super::adjacency::AdjacencyGraph;
use union_find::UnionFind;

/// Faces flattened together as one rigid piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceGroup {
    /// Member faces in adjacency-slot order.
    pub faces: Vec<FaceId>,
}

impl FaceGroup {
    /// Number of member faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the group has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns `true` if `id` is a member.
    #[must_use]
    pub fn contains(&self, id: FaceId) -> bool {
        self.faces.contains(&id)
    }
}

/// Partitions the faces of an adjacency graph into flattening groups.
///
/// - grouping disabled: one singleton group per face;
/// - cluster mode: adjacent planar faces whose normals differ by less than
///   the coplanar angle are merged;
/// - net mode: faces are merged regardless of angle, growing each group
///   breadth-first from its largest face.
///
/// No group exceeds `max_group_size`; overflow starts a new group.
pub struct GroupFaces {
    max_group_size: usize,
    enable_grouping: bool,
    net_mode: bool,
    coplanar_angle_deg: f64,
}

impl GroupFaces {
    /// Creates a new `GroupFaces` operation with an 18 degree coplanar angle.
    #[must_use]
    pub fn new(max_group_size: usize, enable_grouping: bool, net_mode: bool) -> Self {
        Self {
            max_group_size: max_group_size.max(1),
            enable_grouping,
            net_mode,
            coplanar_angle_deg: 18.0,
        }
    }

    /// Sets the largest angle between normals that still counts as coplanar.
    #[must_use]
    pub fn with_coplanar_angle(mut self, degrees: f64) -> Self {
        self.coplanar_angle_deg = degrees;
        self
    }

    /// Executes the grouping. Groups are ordered by their first member.
    ///
    /// # Errors
    ///
    /// Returns an error if a face of the graph is missing from the store.
    #[instrument(skip_all, fields(faces = graph.face_count(), net = self.net_mode))]
    pub fn execute(&self, store: &FaceStore, graph: &AdjacencyGraph) -> Result<Vec<FaceGroup>> {
        let mut records = Vec::with_capacity(graph.face_count());
        for &id in graph.faces() {
            records.push(store.face(id)?);
        }

        let sets = if !self.enable_grouping {
            (0..records.len()).map(|s| vec![s]).collect()
        } else if self.net_mode {
            self.grow_nets(&records, graph)
        } else {
            self.cluster_coplanar(&records, graph)
        };

        let groups: Vec<FaceGroup> = sets
            .into_iter()
            .map(|slots| FaceGroup {
                faces: slots.into_iter().map(|s| graph.faces()[s]).collect(),
            })
            .collect();
        debug!(groups = groups.len(), "faces grouped");
        Ok(groups)
    }

    fn cluster_coplanar(&self, records: &[&FaceData], graph: &AdjacencyGraph) -> Vec<Vec<usize>> {
        let min_dot = self.coplanar_angle_deg.to_radians().cos();
        let mut uf = UnionFind::new(records.len());
        for (i, j) in graph.slot_pairs() {
            let (a, b) = (records[i], records[j]);
            if !a.kind.is_plane() || !b.kind.is_plane() {
                continue;
            }
            let (Some(na), Some(nb)) = (a.normal.try_normalize(0.0), b.normal.try_normalize(0.0))
            else {
                continue;
            };
            if na.dot(&nb) < min_dot {
                continue;
            }
            if uf.find(i) != uf.find(j)
                && uf.set_size(i) + uf.set_size(j) > self.max_group_size
            {
                debug!(i, j, "coplanar merge would exceed max group size");
                continue;
            }
            uf.union(i, j);
        }
        uf.sets()
    }

    fn grow_nets(&self, records: &[&FaceData], graph: &AdjacencyGraph) -> Vec<Vec<usize>> {
        let n = records.len();
        let mut by_area: Vec<usize> = (0..n).collect();
        by_area.sort_by(|&a, &b| records[b].area.total_cmp(&records[a].area).then(a.cmp(&b)));

        let mut assigned = vec![false; n];
        let mut sets: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();

        for &seed in &by_area {
            if assigned[seed] {
                continue;
            }
            // A new connected component continues the open group.
            let mut queue = VecDeque::from([seed]);
            assigned[seed] = true;
            while let Some(slot) = queue.pop_front() {
                if current.len() == self.max_group_size {
                    sets.push(std::mem::take(&mut current));
                }
                current.push(slot);
                for next in graph.neighbor_slots(slot) {
                    if !assigned[next] {
                        assigned[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        if !current.is_empty() {
            sets.push(current);
        }

        for set in &mut sets {
            set.sort_unstable();
        }
        sets.sort_by_key(|s| s.first().copied());
        sets
    }
}
