use serde::{Deserialize, Serialize};

use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a closed 2D polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the indices of the two points farthest apart, `(i, j)` with `i < j`.
///
/// Returns `None` for fewer than two points.
#[must_use]
pub fn farthest_pair(points: &[Point2]) -> Option<(usize, usize, f64)> {
    if points.len() < 2 {
        return None;
    }
    let mut best = (0, 1, -1.0);
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = (points[j] - points[i]).norm_squared();
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }
    Some((best.0, best.1, best.2.sqrt()))
}

/// Counts the points of a loop that are pairwise distinct within `tol`.
#[must_use]
pub fn distinct_point_count(points: &[Point2], tol: f64) -> usize {
    let mut kept: Vec<&Point2> = Vec::with_capacity(points.len());
    for p in points {
        if kept.iter().all(|k| (*k - p).norm() > tol) {
            kept.push(p);
        }
    }
    kept.len()
}

/// An axis-aligned 2D bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Bounds2 {
    /// Returns an empty (inverted) box that any point will expand.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Builds the tight bounds of an iterator of points.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2>,
    {
        let mut b = Self::empty();
        for p in points {
            b.expand(p);
        }
        b
    }

    /// Grows the box to contain `p`.
    pub fn expand(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grows the box to contain `other`.
    pub fn union(&mut self, other: &Bounds2) {
        if other.is_empty() {
            return;
        }
        self.expand(&other.min);
        self.expand(&other.max);
    }

    /// Returns `true` if no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Width along X (zero when empty).
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    /// Height along Y (zero when empty).
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    /// Area of the rectangle.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns a copy translated by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Returns `true` when the two boxes overlap by more than [`TOLERANCE`].
    #[must_use]
    pub fn overlaps(&self, other: &Bounds2) -> bool {
        self.min.x < other.max.x - TOLERANCE
            && other.min.x < self.max.x - TOLERANCE
            && self.min.y < other.max.y - TOLERANCE
            && other.min.y < self.max.y - TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&unit_square()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = unit_square();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[p(0.0, 0.0), p(1.0, 1.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn farthest_pair_is_diagonal() {
        let (i, j, d) = farthest_pair(&unit_square()).unwrap();
        assert_eq!((i, j), (0, 2));
        assert!((d - 2f64.sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn farthest_pair_needs_two_points() {
        assert!(farthest_pair(&[p(1.0, 1.0)]).is_none());
    }

    #[test]
    fn distinct_count_merges_duplicates() {
        let pts = vec![p(0.0, 0.0), p(0.0, 1e-12), p(1.0, 0.0), p(1.0, 0.0)];
        assert_eq!(distinct_point_count(&pts, 1e-9), 2);
    }

    #[test]
    fn bounds_of_square() {
        let b = Bounds2::from_points(&unit_square());
        assert!((b.width() - 1.0).abs() < TOLERANCE);
        assert!((b.height() - 1.0).abs() < TOLERANCE);
        assert!((b.area() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn empty_bounds_have_zero_extent() {
        let b = Bounds2::empty();
        assert!(b.is_empty());
        assert!(b.width().abs() < TOLERANCE);
        assert!(b.area().abs() < TOLERANCE);
    }

    #[test]
    fn union_ignores_empty() {
        let mut b = Bounds2::from_points(&unit_square());
        b.union(&Bounds2::empty());
        assert!((b.area() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Bounds2::from_points(&unit_square());
        let b = a.translated(&Vector2::new(1.0, 0.0));
        assert!(!a.overlaps(&b));
        let c = a.translated(&Vector2::new(0.5, 0.5));
        assert!(a.overlaps(&c));
    }
}
