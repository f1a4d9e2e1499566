use super::{Point3, Vector3, TOLERANCE};

/// Newell's method: an area-weighted normal of a (possibly non-convex) loop.
///
/// The result is not normalized; its length is twice the enclosed area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Removes points that repeat an already kept point within `tol`.
///
/// Order of first occurrence is preserved.
#[must_use]
pub fn dedup_points_3d(points: &[Point3], tol: f64) -> Vec<Point3> {
    let mut kept: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        if kept.iter().all(|k| (k - p).norm() > tol) {
            kept.push(*p);
        }
    }
    kept
}

/// Vertex average of a loop, or `None` when empty.
#[must_use]
pub fn vertex_centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum * inv))
}

/// Returns `true` if `v` is long enough to normalize safely.
#[must_use]
pub fn is_usable_direction(v: &Vector3) -> bool {
    v.iter().all(|c| c.is_finite()) && v.norm() > TOLERANCE.sqrt()
}
