//! Obstacle constraints and smoothness regularizer
//!
//! - Log barrier: Σ −ln(φ + ε) over every (sample, obstacle) pair, with
//!   φ = ‖p − c‖ − (r + clearance). Any φ ≤ 0 makes the curve
//!   hard-infeasible and the barrier +∞.
//! - Curvature: Σ ‖pᵢ₋₁ − 2pᵢ + pᵢ₊₁‖² over the control polygon.
//! - Exterior penalty: Σ max(0, margin − φ)², finite everywhere, used to
//!   restore feasibility before the barrier phase.
//! - Validation: strict clearance check of a sampled path.
//!
//! All scores are pure functions of their inputs.

use clearway_core::{Obstacle, Vec2};

use crate::config::ConstraintConfig;

/// Log-barrier score of a sampled curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierScore {
    /// Barrier value (+∞ when hard-infeasible)
    pub value: f64,
    /// Whether some sample violates some inflated obstacle
    pub hard_infeasible: bool,
    /// Smallest signed clearance φ over all pairs (+∞ without obstacles)
    pub min_clearance: f64,
}

/// Log-barrier obstacle penalty
pub fn obstacle_penalty(
    samples: &[Vec2],
    obstacles: &[Obstacle],
    clearance: f64,
    epsilon: f64,
) -> BarrierScore {
    let mut value = 0.0;
    let mut min_clearance = f64::INFINITY;
    let mut hard_infeasible = false;

    for p in samples {
        for obstacle in obstacles {
            let phi = obstacle.signed_clearance(p, clearance);
            min_clearance = min_clearance.min(phi);
            if phi <= 0.0 {
                hard_infeasible = true;
            } else if !hard_infeasible {
                value -= (phi + epsilon).ln();
            }
        }
    }

    BarrierScore {
        value: if hard_infeasible { f64::INFINITY } else { value },
        hard_infeasible,
        min_clearance,
    }
}

/// Second-difference bending energy of a control polygon
///
/// Zero for two or fewer control points.
pub fn curvature(controls: &[Vec2]) -> f64 {
    controls
        .windows(3)
        .map(|w| (w[0] - 2.0 * w[1] + w[2]).norm_squared())
        .sum()
}

/// Squared exterior penalty Σ max(0, margin − φ)²
pub fn exterior_penalty(
    samples: &[Vec2],
    obstacles: &[Obstacle],
    clearance: f64,
    margin: f64,
) -> f64 {
    samples
        .iter()
        .flat_map(|p| {
            obstacles
                .iter()
                .map(move |o| (margin - o.signed_clearance(p, clearance)).max(0.0).powi(2))
        })
        .sum()
}

/// Result of validating a sampled path
#[derive(Debug, Clone)]
pub struct ConstraintEvaluation {
    /// Per-obstacle values `(r + clearance) − min distance` (≥ 0 means violated)
    pub values: Vec<f64>,
    /// Names for debugging
    pub names: Vec<String>,
    /// Whether every sample is strictly clear of every inflated obstacle
    pub all_satisfied: bool,
    /// Maximum violation (0 if all satisfied)
    pub max_violation: f64,
}

impl ConstraintEvaluation {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            names: Vec::new(),
            all_satisfied: true,
            max_violation: 0.0,
        }
    }

    pub fn add(&mut self, name: &str, value: f64) {
        self.names.push(name.to_string());
        self.values.push(value);
        if !(value < 0.0) {
            self.all_satisfied = false;
            self.max_violation = self.max_violation.max(value);
        }
    }

    /// Indices of the obstacles whose constraint is violated
    pub fn violated(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !(**v < 0.0))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for ConstraintEvaluation {
    fn default() -> Self {
        Self::new()
    }
}

/// Check every sample against every inflated obstacle
///
/// A sample lying exactly on an inflated boundary counts as a violation.
pub fn validate_samples(
    samples: &[Vec2],
    obstacles: &[Obstacle],
    clearance: f64,
) -> ConstraintEvaluation {
    let mut eval = ConstraintEvaluation::new();
    for (idx, obstacle) in obstacles.iter().enumerate() {
        let min_distance = samples
            .iter()
            .map(|p| (p - obstacle.center).norm())
            .fold(f64::INFINITY, f64::min);
        eval.add(&format!("obstacle_{}", idx), obstacle.inflated_radius(clearance) - min_distance);
    }
    eval
}

/// Obstacle set bound to a constraint configuration
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    config: ConstraintConfig,
    obstacles: Vec<Obstacle>,
}

impl ConstraintEvaluator {
    pub fn new(config: ConstraintConfig, obstacles: Vec<Obstacle>) -> Self {
        Self { config, obstacles }
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn barrier(&self, samples: &[Vec2]) -> BarrierScore {
        obstacle_penalty(
            samples,
            &self.obstacles,
            self.config.clearance,
            self.config.barrier_epsilon,
        )
    }

    pub fn exterior(&self, samples: &[Vec2]) -> f64 {
        exterior_penalty(
            samples,
            &self.obstacles,
            self.config.clearance,
            self.config.restoration_margin,
        )
    }

    pub fn validate(&self, samples: &[Vec2]) -> ConstraintEvaluation {
        validate_samples(samples, &self.obstacles, self.config.clearance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn horizontal_samples(y: f64) -> Vec<Vec2> {
        (0..=10).map(|i| Vec2::new(i as f64 * 10.0, y)).collect()
    }

    #[test]
    fn test_barrier_free_space() {
        let obstacles = vec![Obstacle::new(Vec2::new(50.0, 100.0), 10.0)];
        let score = obstacle_penalty(&horizontal_samples(0.0), &obstacles, 20.0, 1e-6);

        assert!(!score.hard_infeasible);
        assert!(score.value.is_finite());
        assert_relative_eq!(score.min_clearance, 70.0, epsilon = 1e-12);
    }

    #[test]
    fn test_barrier_hard_infeasible() {
        let obstacles = vec![Obstacle::new(Vec2::new(50.0, 10.0), 10.0)];
        let score = obstacle_penalty(&horizontal_samples(0.0), &obstacles, 20.0, 1e-6);

        assert!(score.hard_infeasible);
        assert_eq!(score.value, f64::INFINITY);
        assert!(score.min_clearance <= 0.0);
    }

    #[test]
    fn test_barrier_decreases_with_clearance() {
        let obstacles = vec![Obstacle::new(Vec2::new(50.0, 0.0), 10.0)];
        let near = obstacle_penalty(&horizontal_samples(35.0), &obstacles, 20.0, 1e-6);
        let far = obstacle_penalty(&horizontal_samples(80.0), &obstacles, 20.0, 1e-6);
        assert!(near.value > far.value);
    }

    #[test]
    fn test_barrier_single_pair_value() {
        let obstacles = vec![Obstacle::new(Vec2::new(0.0, 0.0), 1.0)];
        let samples = vec![Vec2::new(4.0, 0.0)];
        // φ = 4 − (1 + 1) = 2
        let score = obstacle_penalty(&samples, &obstacles, 1.0, 0.0);
        assert_relative_eq!(score.value, -(2.0f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_curvature() {
        let straight: Vec<Vec2> = (0..5).map(|i| Vec2::new(i as f64, 2.0 * i as f64)).collect();
        assert_relative_eq!(curvature(&straight), 0.0, epsilon = 1e-12);

        let bent = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0)];
        // (0,0) − 2(1,1) + (2,0) = (0,−2)
        assert_relative_eq!(curvature(&bent), 4.0);

        assert_eq!(curvature(&bent[..2]), 0.0);
        assert_eq!(curvature(&[]), 0.0);
    }

    #[test]
    fn test_scoring_is_pure() {
        let obstacles = vec![
            Obstacle::new(Vec2::new(30.0, 40.0), 8.0),
            Obstacle::new(Vec2::new(70.0, -45.0), 12.0),
        ];
        let samples = horizontal_samples(0.0);

        let a = obstacle_penalty(&samples, &obstacles, 5.0, 1e-6);
        let b = obstacle_penalty(&samples, &obstacles, 5.0, 1e-6);
        assert_eq!(a, b);
        assert_eq!(curvature(&samples), curvature(&samples));
    }

    #[test]
    fn test_exterior_penalty() {
        let obstacles = vec![Obstacle::new(Vec2::new(50.0, 0.0), 10.0)];
        assert!(exterior_penalty(&horizontal_samples(0.0), &obstacles, 20.0, 2.0) > 0.0);
        assert_eq!(exterior_penalty(&horizontal_samples(100.0), &obstacles, 20.0, 2.0), 0.0);
    }

    #[test]
    fn test_validate_samples() {
        let obstacles = vec![
            Obstacle::new(Vec2::new(50.0, 10.0), 10.0),
            Obstacle::new(Vec2::new(50.0, 200.0), 10.0),
        ];
        let eval = validate_samples(&horizontal_samples(0.0), &obstacles, 20.0);

        assert!(!eval.all_satisfied);
        assert_eq!(eval.violated(), vec![0]);
        assert_relative_eq!(eval.max_violation, 20.0, epsilon = 1e-12);
        assert_eq!(eval.names[1], "obstacle_1");
    }

    #[test]
    fn test_validate_boundary_counts_as_violation() {
        let obstacles = vec![Obstacle::new(Vec2::new(0.0, 0.0), 10.0)];
        let eval = validate_samples(&[Vec2::new(30.0, 0.0)], &obstacles, 20.0);
        assert!(!eval.all_satisfied);
    }
}
