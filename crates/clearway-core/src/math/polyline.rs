//! Polyline measures
//!
//! A polyline is an ordered slice of points; all functions here are pure.

use crate::Vec2;

/// Sum of Euclidean distances between consecutive points
///
/// Returns 0 for fewer than two points.
pub fn path_length(points: &[Vec2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// `n` points evenly spaced on the segment from `a` to `b`, endpoints included
///
/// The first and last points are exactly `a` and `b`.
pub fn linspace(a: &Vec2, b: &Vec2, n: usize) -> Vec<Vec2> {
    match n {
        0 => Vec::new(),
        1 => vec![*a],
        _ => {
            let last = n - 1;
            (0..n)
                .map(|i| {
                    if i == 0 {
                        *a
                    } else if i == last {
                        *b
                    } else {
                        a.lerp(b, i as f64 / last as f64)
                    }
                })
                .collect()
        }
    }
}

/// Distance from point `p` to the closed segment `[a, b]`
pub fn point_segment_distance(p: &Vec2, a: &Vec2, b: &Vec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-20 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Signed lateral offset of `p` from the infinite line through `a` and `b`
///
/// Positive on the left of the direction `a → b`. Falls back to the distance
/// to `a` when the line is degenerate.
pub fn lateral_offset(p: &Vec2, a: &Vec2, b: &Vec2) -> f64 {
    let ab = b - a;
    let len = ab.norm();
    if len < 1e-10 {
        return (p - a).norm();
    }
    let ap = p - a;
    (ab.x * ap.y - ab.y * ap.x) / len
}

/// Largest absolute lateral offset of any point of `points` from the line `a → b`
pub fn max_lateral_deviation(points: &[Vec2], a: &Vec2, b: &Vec2) -> f64 {
    points
        .iter()
        .map(|p| lateral_offset(p, a, b).abs())
        .fold(0.0, f64::max)
}

/// Whether every coordinate of every point is finite
pub fn all_finite(points: &[Vec2]) -> bool {
    points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}
