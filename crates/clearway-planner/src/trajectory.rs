//! Planned path representation and arc-length interpolation

use serde::{Deserialize, Serialize};

use clearway_core::math::path_length;
use clearway_core::Vec2;

use crate::solver::SolveStatistics;

/// Which planner produced the final path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    /// Sampled optimized curve
    Continuous,
    /// Grid cell centers from the A* fallback
    Fallback,
}

/// Final output of one planning call
#[derive(Debug, Clone)]
pub struct PlanningResult {
    /// Ordered path points from start to end
    pub path: Vec<Vec2>,
    /// Polyline length of `path`
    pub length: f64,
    /// Obstacle weight used for the query
    pub lambda_avg: f64,
    pub source: PathSource,
    /// Whether every path point is strictly clear of every inflated obstacle
    pub safe: bool,
    /// Continuous optimizer statistics (also present when the fallback won)
    pub statistics: SolveStatistics,
}

impl PlanningResult {
    pub fn new(
        path: Vec<Vec2>,
        lambda_avg: f64,
        source: PathSource,
        safe: bool,
        statistics: SolveStatistics,
    ) -> Self {
        Self {
            length: path_length(&path),
            path,
            lambda_avg,
            source,
            safe,
            statistics,
        }
    }

    /// Point at arc-length fraction `s ∈ [0, 1]` (clamped)
    pub fn point_at(&self, s: f64) -> Option<Vec2> {
        let first = *self.path.first()?;
        if self.path.len() == 1 || self.length <= 0.0 {
            return Some(first);
        }

        let target = s.clamp(0.0, 1.0) * self.length;
        let mut travelled = 0.0;
        for w in self.path.windows(2) {
            let segment = (w[1] - w[0]).norm();
            if travelled + segment >= target && segment > 0.0 {
                return Some(w[0].lerp(&w[1], (target - travelled) / segment));
            }
            travelled += segment;
        }
        self.path.last().copied()
    }

    /// `n` points evenly spaced by arc length (at least 2)
    pub fn resample(&self, n: usize) -> Vec<Vec2> {
        let n = n.max(2);
        (0..n)
            .filter_map(|i| self.point_at(i as f64 / (n - 1) as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_shape() -> PlanningResult {
        let path = vec![Vec2::new(0.0, 0.0), Vec2::new(30.0, 0.0), Vec2::new(30.0, 10.0)];
        PlanningResult::new(path, 5.0, PathSource::Fallback, true, SolveStatistics::default())
    }

    #[test]
    fn test_length_from_path() {
        let result = l_shape();
        assert_relative_eq!(result.length, 40.0);
        assert_eq!(result.lambda_avg, 5.0);
    }

    #[test]
    fn test_point_at_fraction() {
        let result = l_shape();

        let quarter = result.point_at(0.25).unwrap();
        assert_relative_eq!(quarter.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.y, 0.0, epsilon = 1e-12);

        let late = result.point_at(0.875).unwrap();
        assert_relative_eq!(late.x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(late.y, 5.0, epsilon = 1e-12);

        assert_eq!(result.point_at(2.0), Some(Vec2::new(30.0, 10.0)));
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let result = l_shape();
        let points = result.resample(5);

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vec2::new(0.0, 0.0));
        assert_relative_eq!(points[4].y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_paths() {
        let stats = SolveStatistics::default();
        let empty =
            PlanningResult::new(Vec::new(), 1.0, PathSource::Continuous, true, stats.clone());
        assert_eq!(empty.point_at(0.5), None);
        assert!(empty.resample(3).is_empty());

        let point = Vec2::new(4.0, 4.0);
        let stationary =
            PlanningResult::new(vec![point, point], 1.0, PathSource::Fallback, true, stats);
        assert_eq!(stationary.length, 0.0);
        assert_eq!(stationary.point_at(0.7), Some(point));
    }
}
