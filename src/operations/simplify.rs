//! Shape-preserving point reduction for closed 2D loops.

use tracing::{debug, warn};

use crate::error::{Result, UnfoldError};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::polygon_2d::farthest_pair;
use crate::math::{Point2, TOLERANCE};

use super::projection::FlatGroup;

/// Simplifies a closed loop with Douglas-Peucker, anchored at the two
/// points farthest apart.
///
/// The two anchors split the loop into two chains; each chain keeps only
/// the points that deviate from their local chord by more than the
/// tolerance. The result:
///
/// - is a subset of the input, in input order;
/// - keeps at least three points when the input has at least three;
/// - leaves every dropped point within the tolerance of the result;
/// - never gains points as the tolerance grows.
pub struct SimplifyLoop {
    tolerance: f64,
}

impl SimplifyLoop {
    /// Creates a new `SimplifyLoop` operation.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    /// Executes the simplification.
    ///
    /// Loops with fewer than three points, and loops whose anchors coincide
    /// numerically, are returned unchanged.
    #[must_use]
    pub fn execute(&self, points: &[Point2]) -> Vec<Point2> {
        let n = points.len();
        if n < 3 {
            return points.to_vec();
        }
        let Some((first, second, span)) = farthest_pair(points) else {
            return points.to_vec();
        };
        if span <= TOLERANCE || !span.is_finite() {
            warn!(span, "loop anchors nearly coincide, skipping simplification");
            return points.to_vec();
        }

        // Rotate so the first anchor sits at 0 and close the ring.
        let ring: Vec<Point2> = (0..=n).map(|k| points[(first + k) % n]).collect();
        let mid = second - first;
        let mut keep = vec![false; n + 1];
        keep[0] = true;
        keep[mid] = true;
        keep[n] = true;
        self.mark(&ring, 0, mid, &mut keep);
        self.mark(&ring, mid, n, &mut keep);

        if keep[..n].iter().filter(|k| **k).count() < 3 {
            // Both chains collapsed onto the chord: restore its farthest point.
            let extra = (1..n)
                .filter(|&k| k != mid)
                .max_by(|&a, &b| {
                    let da = point_to_segment_dist(&ring[a], &ring[0], &ring[mid]);
                    let db = point_to_segment_dist(&ring[b], &ring[0], &ring[mid]);
                    da.total_cmp(&db).then(b.cmp(&a))
                });
            if let Some(k) = extra {
                keep[k] = true;
            }
        }

        let mut kept: Vec<usize> = (0..n).filter(|&k| keep[k]).map(|k| (first + k) % n).collect();
        kept.sort_unstable();
        debug!(before = n, after = kept.len(), "loop simplified");
        kept.into_iter().map(|i| points[i]).collect()
    }

    fn mark(&self, ring: &[Point2], start: usize, end: usize, keep: &mut [bool]) {
        if end <= start + 1 {
            return;
        }
        let mut split = start;
        let mut dmax = -1.0;
        for k in start + 1..end {
            let d = point_to_segment_dist(&ring[k], &ring[start], &ring[end]);
            if d > dmax {
                dmax = d;
                split = k;
            }
        }
        if dmax > self.tolerance {
            keep[split] = true;
            self.mark(ring, start, split, keep);
            self.mark(ring, split, end, keep);
        }
    }
}

/// Simplifies a closed loop. Shorthand for [`SimplifyLoop`].
#[must_use]
pub fn simplify(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    SimplifyLoop::new(tolerance).execute(points)
}

/// Simplifies every loop of an unfolded group.
pub struct SimplifyGroup {
    tolerance: f64,
}

impl SimplifyGroup {
    /// Creates a new `SimplifyGroup` operation.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Executes the simplification in place.
    ///
    /// # Errors
    ///
    /// Returns [`UnfoldError::CollapsedLoop`] if any loop is left with fewer
    /// than three points.
    pub fn execute(&self, group: &mut FlatGroup) -> Result<()> {
        let op = SimplifyLoop::new(self.tolerance);
        for face in &mut group.faces {
            for lp in &mut face.loops {
                let simplified = op.execute(lp);
                if simplified.len() < 3 {
                    return Err(UnfoldError::CollapsedLoop {
                        face: format!("{:?}", face.face),
                        points: simplified.len(),
                    }
                    .into());
                }
                *lp = simplified;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Plane;
    use crate::math::{Isometry2, Point3, Vector3};
    use crate::operations::projection::{FaceFrame, FlatFace};
    use crate::topology::FaceId;

    /// 100 points on a circle of radius 50 with a small deterministic wobble.
    fn wobbly_circle() -> Vec<Point2> {
        (0..100)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / 100.0;
                let r = 50.0 + 0.3 * (7.0 * t).sin();
                Point2::new(r * t.cos(), r * t.sin())
            })
            .collect()
    }

    fn distance_to_loop(p: &Point2, lp: &[Point2]) -> f64 {
        (0..lp.len())
            .map(|i| point_to_segment_dist(p, &lp[i], &lp[(i + 1) % lp.len()]))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn point_count_shrinks_as_tolerance_grows() {
        let circle = wobbly_circle();
        let fine = simplify(&circle, 0.1).len();
        let medium = simplify(&circle, 0.5).len();
        let coarse = simplify(&circle, 2.0).len();
        assert!(coarse <= medium, "{coarse} > {medium}");
        assert!(medium <= fine, "{medium} > {fine}");
        assert!(fine <= 100);
        assert!(coarse < 100);
    }

    #[test]
    fn small_loops_still_shrink_with_tolerance() {
        let circle: Vec<Point2> = (0..100)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / 100.0;
                Point2::new(0.5 * t.cos(), 0.5 * t.sin())
            })
            .collect();
        let counts: Vec<usize> = [0.01, 0.1, 0.5, 2.0, 100.0]
            .iter()
            .map(|tol| simplify(&circle, *tol).len())
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[1] <= pair[0], "{counts:?}");
        }
        assert!(counts[0] < 100);
        assert_eq!(counts[4], 3);
    }

    #[test]
    fn result_is_an_ordered_subset() {
        let circle = wobbly_circle();
        let out = simplify(&circle, 0.5);
        let mut last = None;
        for p in &out {
            let idx = circle.iter().position(|q| q == p).unwrap();
            if let Some(prev) = last {
                assert!(idx > prev);
            }
            last = Some(idx);
        }
    }

    #[test]
    fn dropped_points_stay_within_tolerance() {
        let circle = wobbly_circle();
        for tol in [0.1, 0.5, 2.0, 10.0] {
            let out = simplify(&circle, tol);
            for p in &circle {
                assert!(distance_to_loop(p, &out) <= tol + 1e-9, "tol {tol}");
            }
        }
    }

    #[test]
    fn collinear_points_are_removed() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(10.0, 10.0),
            Point2::new(5.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 5.0),
        ];
        let out = simplify(&square, 0.01);
        assert_eq!(
            out,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ]
        );
    }

    #[test]
    fn huge_tolerance_keeps_a_triangle() {
        let out = simplify(&wobbly_circle(), 1e6);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn short_and_degenerate_loops_are_untouched() {
        let two = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert_eq!(simplify(&two, 1.0), two);
        let blob = vec![Point2::new(1.0, 1.0); 5];
        assert_eq!(simplify(&blob, 0.1), blob);
    }

    #[test]
    fn group_with_a_collapsed_loop_fails() {
        let frame = FaceFrame::Plane(Plane::from_normal(Point3::origin(), Vector3::z()).unwrap());
        let mut group = FlatGroup {
            faces: vec![FlatFace {
                face: FaceId::default(),
                frame,
                placement: Isometry2::identity(),
                loops: vec![vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]],
            }],
            root: FaceId::default(),
        };
        assert!(SimplifyGroup::new(0.1).execute(&mut group).is_err());
    }

    #[test]
    fn group_loops_are_simplified_in_place() {
        let frame = FaceFrame::Plane(Plane::from_normal(Point3::origin(), Vector3::z()).unwrap());
        let mut group = FlatGroup {
            faces: vec![FlatFace {
                face: FaceId::default(),
                frame,
                placement: Isometry2::identity(),
                loops: vec![wobbly_circle()],
            }],
            root: FaceId::default(),
        };
        SimplifyGroup::new(2.0).execute(&mut group).unwrap();
        assert!(group.faces[0].loops[0].len() < 100);
        assert!(group.faces[0].loops[0].len() >= 3);
    }
}
