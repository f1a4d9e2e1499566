use std::collections::HashMap;

use crate::math::Point3;

/// Integer cell coordinate of the grid.
type Cell = [i64; 3];

/// A vertex reference: `(face slot, vertex index within that face)`.
pub(crate) type VertexRef = (usize, usize);

/// Uniform hash grid over boundary vertices.
///
/// The cell size equals the matching tolerance, so any vertex within
/// tolerance of a query point lives in one of the 27 cells around it.
#[derive(Debug)]
pub(crate) struct VertexGrid {
    cell_size: f64,
    cells: HashMap<Cell, Vec<(VertexRef, Point3)>>,
}

impl VertexGrid {
    /// Creates an empty grid. `cell_size` must be positive.
    pub(crate) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, p: &Point3) -> Cell {
        // `as` saturates, so far-out or non-finite coordinates land in edge cells.
        [
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        ]
    }

    /// Adds a vertex under the given reference.
    pub(crate) fn insert(&mut self, vref: VertexRef, p: Point3) {
        let cell = self.cell_of(&p);
        self.cells.entry(cell).or_default().push((vref, p));
    }

    /// Calls `visit` for every stored vertex within `tol` of `p`.
    pub(crate) fn for_each_near(&self, p: &Point3, tol: f64, mut visit: impl FnMut(VertexRef)) {
        let [cx, cy, cz] = self.cell_of(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = [
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    ];
                    let Some(entries) = self.cells.get(&key) else {
                        continue;
                    };
                    for (vref, q) in entries {
                        if (q - p).norm() <= tol {
                            visit(*vref);
                        }
                    }
                }
            }
        }
    }

    /// Returns `true` if face `slot` has a vertex within `tol` of `p`.
    pub(crate) fn face_has_near(&self, slot: usize, p: &Point3, tol: f64) -> bool {
        let mut found = false;
        self.for_each_near(p, tol, |(s, _)| found |= s == slot);
        found
    }
}
