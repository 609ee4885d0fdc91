//! Line-of-sight shortcutting of grid paths

use clearway_core::{Obstacle, Vec2};

/// Drop intermediate waypoints whose neighbours see each other
///
/// From each kept point, jumps to the furthest later waypoint whose straight
/// segment keeps strictly clear of every inflated obstacle. The first and
/// last waypoints are always kept.
pub fn smooth_los(path: &[Vec2], obstacles: &[Obstacle], clearance: f64) -> Vec<Vec2> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let visible =
        |a: &Vec2, b: &Vec2| obstacles.iter().all(|o| o.segment_is_clear(a, b, clearance));

    let mut smoothed = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let mut furthest = i + 1;
        for j in (i + 2)..path.len() {
            if visible(&path[i], &path[j]) {
                furthest = j;
            }
        }
        smoothed.push(path[furthest]);
        i = furthest;
    }
    smoothed
}
