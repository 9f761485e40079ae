//! Polygon simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! [`simplify_chain`] is the classic open-polyline form: the two end
//! points are fixed and interior points survive only when they lie more
//! than `tolerance` away from the chord they would otherwise be replaced
//! by. [`approximate`] applies it to a closed ring by cutting the ring at
//! its first vertex and the vertex farthest from it, simplifying both
//! halves and stitching them back together.

use crate::types::{Point, Polygon};

/// Fraction of the perimeter that one unit of the `epsilon` parameter
/// stands for.
pub const EPSILON_SCALE: f64 = 0.01;

/// Douglas-Peucker tolerance for a ring: `epsilon * perimeter * 0.01`.
#[must_use]
pub fn tolerance_for(polygon: &Polygon, epsilon: f64) -> f64 {
    epsilon * polygon.perimeter() * EPSILON_SCALE
}

/// Simplify a closed ring to within `tolerance` pixels.
///
/// Rings with fewer than 3 vertices are returned unchanged. A ring whose
/// vertices all coincide collapses to a single vertex.
#[must_use = "returns the simplified polygon"]
pub fn approximate(polygon: &Polygon, tolerance: f64) -> Polygon {
    let points = polygon.points();
    let n = points.len();
    if n < 3 {
        return polygon.clone();
    }

    let origin = points[0];
    let (far, far_dist) = points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, p.distance_squared(origin)))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if far_dist == 0.0 {
        return Polygon::new(vec![origin]);
    }

    // First half: origin ..= far. Second half: far ..= last, back to origin.
    let first = simplify_chain(&points[..=far], tolerance);
    let mut second_chain = points[far..].to_vec();
    second_chain.push(origin);
    let second = simplify_chain(&second_chain, tolerance);

    // Both halves share `far`, and the second ends on `origin` again.
    let mut ring = first;
    ring.extend_from_slice(&second[1..second.len() - 1]);
    Polygon::new(ring)
}

/// Simplify an open chain, keeping both end points.
///
/// Chains with fewer than 3 points are returned unchanged (nothing to
/// simplify). A tolerance of 0.0 keeps every point that is not exactly
/// on the chord.
#[must_use = "returns the simplified chain"]
pub fn simplify_chain(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, tolerance, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
