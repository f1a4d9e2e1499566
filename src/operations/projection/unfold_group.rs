use std::collections::VecDeque;

use nalgebra::{Translation2, UnitComplex};
use slotmap::SecondaryMap;
use tracing::{debug, warn};

use crate::error::{Result, UnfoldError};
use crate::geometry::surface::Development;
use crate::math::polygon_2d::Bounds2;
use crate::math::{Isometry2, Point2, Point3, Vector2};
use crate::operations::adjacency::AdjacencyGraph;
use crate::operations::grouping::FaceGroup;
use crate::topology::FaceId;

use super::frame::FaceFrame;
use super::project_face::ProjectedFace;

/// A face placed in its group's shared 2D plane.
#[derive(Debug, Clone)]
pub struct FlatFace {
    pub face: FaceId,
    /// Development from the face surface to its local frame.
    pub frame: FaceFrame,
    /// Rigid motion from the local frame into the group plane.
    pub placement: Isometry2,
    /// Boundary loops in group coordinates, outer first.
    pub loops: Vec<Vec<Point2>>,
}

impl FlatFace {
    /// Maps a point of the group plane back onto the face surface.
    #[must_use]
    pub fn unproject(&self, point: &Point2) -> Point3 {
        self.frame
            .lift(&self.placement.inverse_transform_point(point))
    }

    /// Bounds of the placed loops.
    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        Bounds2::from_points(self.loops.iter().flatten())
    }
}

/// A group of faces unfolded into one rigid 2D piece.
#[derive(Debug, Clone)]
pub struct FlatGroup {
    /// Placed faces, in group order.
    pub faces: Vec<FlatFace>,
    /// The face the unfolding started from; it keeps its local frame.
    pub root: FaceId,
}

impl FlatGroup {
    /// Bounds of every placed loop.
    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        let mut b = Bounds2::empty();
        for f in &self.faces {
            b.union(&f.bounds());
        }
        b
    }

    /// The placed copy of `id`, if it belongs to the group.
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&FlatFace> {
        self.faces.iter().find(|f| f.face == id)
    }
}

/// Lays the faces of one group into a common plane.
///
/// The largest face is the root and keeps its local frame. Every other face
/// is reached breadth-first over the adjacency graph and rotated and
/// translated so that its copy of the shared hinge lands on its parent's.
/// Faces that cannot be reached through a usable hinge start a new piece to
/// the right of everything placed so far.
pub struct UnfoldGroup<'a> {
    group: &'a FaceGroup,
    index: usize,
    tolerance: f64,
}

impl<'a> UnfoldGroup<'a> {
    /// Creates a new `UnfoldGroup` operation for the group at `index`.
    #[must_use]
    pub fn new(group: &'a FaceGroup, index: usize) -> Self {
        Self {
            group,
            index,
            tolerance: 1e-6,
        }
    }

    /// Sets the vertex matching tolerance used to locate hinges.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the unfolding.
    ///
    /// # Errors
    ///
    /// Returns [`UnfoldError::EmptyGroup`] if the group has no faces and
    /// [`UnfoldError::MissingProjection`] if a member has no projection.
    pub fn execute(
        &self,
        projected: &SecondaryMap<FaceId, ProjectedFace>,
        graph: &AdjacencyGraph,
    ) -> Result<FlatGroup> {
        let members: Vec<&ProjectedFace> = self
            .group
            .faces
            .iter()
            .map(|id| {
                projected.get(*id).ok_or_else(|| UnfoldError::MissingProjection {
                    group: self.index,
                    face: format!("{id:?}"),
                })
            })
            .collect::<std::result::Result<_, _>>()?;
        let root = members
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.area.total_cmp(&b.area).then(ib.cmp(ia)))
            .map(|(i, _)| i)
            .ok_or(UnfoldError::EmptyGroup { group: self.index })?;

        let mut placements: Vec<Option<Isometry2>> = vec![None; members.len()];
        let mut next_seed = Some(root);
        while let Some(seed) = next_seed {
            placements[seed] = Some(if seed == root {
                Isometry2::identity()
            } else {
                place_beside(&members, &placements, seed)
            });
            self.spread(&members, graph, &mut placements, seed);
            next_seed = placements.iter().position(Option::is_none);
            if let Some(s) = next_seed {
                warn!(
                    group = self.index,
                    face = ?members[s].face,
                    "face not reachable by a hinge, placed apart"
                );
            }
        }

        let faces = members
            .iter()
            .zip(placements)
            .map(|(m, placement)| {
                let placement = placement.unwrap_or_else(Isometry2::identity);
                FlatFace {
                    face: m.face,
                    frame: m.frame.clone(),
                    placement,
                    loops: m
                        .loops
                        .iter()
                        .map(|lp| lp.iter().map(|p| placement * p).collect())
                        .collect(),
                }
            })
            .collect();

        Ok(FlatGroup {
            faces,
            root: members[root].face,
        })
    }

    /// Breadth-first hinge placement starting from an already placed face.
    fn spread(
        &self,
        members: &[&ProjectedFace],
        graph: &AdjacencyGraph,
        placements: &mut [Option<Isometry2>],
        start: usize,
    ) {
        let mut queue = VecDeque::from([start]);
        while let Some(cur) = queue.pop_front() {
            let Some(parent_iso) = placements[cur] else {
                continue;
            };
            for neighbor in graph.neighbors(members[cur].face) {
                let Some(next) = members.iter().position(|m| m.face == neighbor) else {
                    continue;
                };
                if placements[next].is_some() {
                    continue;
                }
                let Some(hinge) = graph.hinge(members[cur].face, neighbor) else {
                    continue;
                };
                let (pa, pb) = members[cur].local_segment(&hinge.start, &hinge.end, self.tolerance);
                let (qa, qb) = members[next].local_segment(&hinge.start, &hinge.end, self.tolerance);
                let (pa, pb) = (parent_iso * pa, parent_iso * pb);
                match align_segment(pa, pb, qa, qb, self.tolerance) {
                    Some(iso) => {
                        placements[next] = Some(iso);
                        queue.push_back(next);
                    }
                    None => {
                        debug!(face = ?neighbor, "hinge collapses in 2D, trying another parent");
                    }
                }
            }
        }
    }
}

/// Translation that puts `face` to the right of every placed face.
fn place_beside(
    members: &[&ProjectedFace],
    placements: &[Option<Isometry2>],
    face: usize,
) -> Isometry2 {
    let mut placed = Bounds2::empty();
    for (m, iso) in members.iter().zip(placements) {
        if let Some(iso) = iso {
            for p in m.loops.iter().flatten() {
                placed.expand(&(iso * p));
            }
        }
    }
    let local = Bounds2::from_points(members[face].loops.iter().flatten());
    if placed.is_empty() || local.is_empty() {
        return Isometry2::identity();
    }
    let gap = 0.05 * placed.width().max(placed.height()).max(local.width());
    let shift = Vector2::new(
        placed.max.x + gap - local.min.x,
        placed.min.y - local.min.y,
    );
    Isometry2::from_parts(Translation2::from(shift), UnitComplex::identity())
}

/// The rigid motion taking the segment from `qa` to `qb` onto the one
/// from `pa` to `pb`.
///
/// Returns `None` when either segment is shorter than `tol`.
fn align_segment(pa: Point2, pb: Point2, qa: Point2, qb: Point2, tol: f64) -> Option<Isometry2> {
    let (dp, dq) = (pb - pa, qb - qa);
    if dp.norm() <= tol || dq.norm() <= tol {
        return None;
    }
    let rotation = UnitComplex::new(dp.y.atan2(dp.x) - dq.y.atan2(dq.x));
    let translation = pa.coords - rotation * qa.coords;
    Some(Isometry2::from_parts(
        Translation2::from(translation),
        rotation,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PapercutError;
    use crate::math::polygon_2d::signed_area_2d;
    use crate::math::Vector3;
    use crate::operations::adjacency::BuildAdjacency;
    use crate::operations::creation::{MakeBox, MakeCylinder};
    use crate::operations::projection::{FaceOutcome, ProjectFace};
    use crate::topology::{FaceData, FaceStore};

    fn project_all(store: &FaceStore) -> SecondaryMap<FaceId, ProjectedFace> {
        let mut out = SecondaryMap::new();
        for id in store.face_ids() {
            if let FaceOutcome::Unfoldable(p) = ProjectFace::new(id).execute(store).unwrap() {
                out.insert(id, p);
            }
        }
        out
    }

    fn unfold_all(store: &FaceStore) -> (FlatGroup, AdjacencyGraph) {
        let graph = BuildAdjacency::new(store.face_ids(), 1e-6)
            .execute(store)
            .unwrap();
        let group = FaceGroup {
            faces: store.face_ids(),
        };
        let flat = UnfoldGroup::new(&group, 0)
            .execute(&project_all(store), &graph)
            .unwrap();
        (flat, graph)
    }

    #[test]
    fn cube_net_keeps_shared_edges_together() {
        let mut store = FaceStore::new();
        MakeBox::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0))
            .execute(&mut store)
            .unwrap();
        let (flat, graph) = unfold_all(&store);
        assert_eq!(flat.faces.len(), 6);

        for f in &flat.faces {
            assert!((signed_area_2d(&f.loops[0]) - 4.0).abs() < 1e-9);
        }

        // Every hinge used to place a face must coincide in both copies.
        let mut matched = 0;
        for f in &flat.faces {
            for n in graph.neighbors(f.face) {
                let other = flat.face(n).unwrap();
                let h = graph.hinge(f.face, n).unwrap();
                let a = f.unproject(&(f.placement * f.frame.flatten(&h.start)));
                assert!((a - h.start).norm() < 1e-9);
                let same = |x: &FlatFace| {
                    let proj = |p: &Point3| x.placement * x.frame.flatten(p);
                    (proj(&h.start), proj(&h.end))
                };
                let (s1, e1) = same(f);
                let (s2, e2) = same(other);
                if (s1 - s2).norm() < 1e-9 && (e1 - e2).norm() < 1e-9 {
                    matched += 1;
                }
            }
        }
        // A spanning tree over six faces has five hinges, each seen twice.
        assert!(matched >= 10);
    }

    #[test]
    fn unproject_inverts_placement() {
        let mut store = FaceStore::new();
        MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        let (flat, _) = unfold_all(&store);
        for f in &flat.faces {
            let face = store.face(f.face).unwrap();
            for (p2, p3) in f.loops[0].iter().zip(&face.loops[0]) {
                assert!((f.unproject(p2) - p3).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn root_is_the_largest_face() {
        let mut store = FaceStore::new();
        let [bottom, ..] = MakeBox::new(Point3::origin(), Point3::new(4.0, 4.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let (flat, _) = unfold_all(&store);
        assert_eq!(flat.root, bottom);
        assert_eq!(flat.face(bottom).unwrap().placement, Isometry2::identity());
    }

    #[test]
    fn cylinder_with_caps_unrolls_to_circumference() {
        let mut store = FaceStore::new();
        let [lateral, _, _] = MakeCylinder::new(Point3::origin(), 1.0, Vector3::z(), 3.0, 24)
            .execute(&mut store)
            .unwrap();
        let (flat, _) = unfold_all(&store);
        assert_eq!(flat.faces.len(), 3);
        let side = flat.face(lateral).unwrap();
        let b = side.bounds();
        assert!((b.width().max(b.height()) - std::f64::consts::TAU).abs() < 1e-6);
    }

    #[test]
    fn disconnected_face_is_placed_apart() {
        let mut store = FaceStore::new();
        let square = |x: f64| {
            FaceData::planar(vec![
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x + 1.0, 1.0, 0.0),
                Point3::new(x, 1.0, 0.0),
            ])
        };
        store.add_face(square(0.0));
        store.add_face(square(10.0));
        let (flat, _) = unfold_all(&store);
        let a = flat.faces[0].bounds();
        let b = flat.faces[1].bounds();
        assert!(!a.overlaps(&b));
        assert!(b.min.x > a.max.x);
    }

    #[test]
    fn empty_group_is_an_error() {
        let store = FaceStore::new();
        let graph = BuildAdjacency::new(Vec::new(), 1e-6).execute(&store).unwrap();
        let group = FaceGroup { faces: Vec::new() };
        assert!(UnfoldGroup::new(&group, 3)
            .execute(&SecondaryMap::new(), &graph)
            .is_err());
    }

    #[test]
    fn member_without_projection_is_an_error() {
        let mut store = FaceStore::new();
        let ids = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let graph = BuildAdjacency::new(ids.to_vec(), 1e-6).execute(&store).unwrap();
        let mut projected = project_all(&store);
        projected.remove(ids[4]);
        let group = FaceGroup {
            faces: ids.to_vec(),
        };
        let err = UnfoldGroup::new(&group, 2)
            .execute(&projected, &graph)
            .unwrap_err();
        assert!(matches!(
            err,
            PapercutError::Unfold(UnfoldError::MissingProjection { group: 2, .. })
        ));
    }

    #[test]
    fn box_nets_do_not_overlap() {
        for size in [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 2.0, 1.0),
            Point3::new(1.0, 4.0, 2.0),
            Point3::new(5.0, 1.0, 3.0),
        ] {
            let mut store = FaceStore::new();
            MakeBox::new(Point3::origin(), size)
                .execute(&mut store)
                .unwrap();
            let (flat, _) = unfold_all(&store);
            assert_eq!(flat.faces.len(), 6);
            for (i, a) in flat.faces.iter().enumerate() {
                for b in &flat.faces[i + 1..] {
                    assert!(
                        !a.bounds().overlaps(&b.bounds()),
                        "faces {:?} and {:?} overlap in the {size:?} net",
                        a.face,
                        b.face
                    );
                }
            }
        }
    }

    #[test]
    fn align_segment_maps_endpoints() {
        let iso = align_segment(
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            1e-9,
        )
        .unwrap();
        assert!((iso * Point2::new(0.0, 0.0) - Point2::new(1.0, 1.0)).norm() < 1e-12);
        assert!((iso * Point2::new(2.0, 0.0) - Point2::new(1.0, 3.0)).norm() < 1e-12);
        assert!(align_segment(
            Point2::origin(),
            Point2::origin(),
            Point2::origin(),
            Point2::new(1.0, 0.0),
            1e-9
        )
        .is_none());
    }
}
