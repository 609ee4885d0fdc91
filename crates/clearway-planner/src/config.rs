//! Planner configuration
//!
//! Tuned parameters for the continuous optimizer, the constraint evaluator,
//! the grid fallback and the orchestrator policy. Every section has a
//! `Default` with the values used by the desktop front end, and the whole
//! configuration round-trips through YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Main planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Objective weights
    #[serde(default)]
    pub weights: CostWeights,
    /// Obstacle clearance and barrier settings
    #[serde(default)]
    pub constraints: ConstraintConfig,
    /// Quasi-Newton solver settings
    #[serde(default)]
    pub solver: SolverConfig,
    /// Curve sampling density
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Grid fallback settings
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// What to do when neither planner yields a safe path
    #[serde(default)]
    pub policy: InfeasiblePolicy,
}

impl PlannerConfig {
    /// Parse a configuration from YAML; missing sections take their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every parameter against its admissible range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        if !w.lambda.is_finite() || w.lambda < 0.0 {
            return Err(ConfigError::invalid(
                "weights.lambda",
                format!("must be finite and >= 0, got {}", w.lambda),
            ));
        }
        if !w.gamma.is_finite() || w.gamma < 0.0 {
            return Err(ConfigError::invalid(
                "weights.gamma",
                format!("must be finite and >= 0, got {}", w.gamma),
            ));
        }

        let c = &self.constraints;
        if !c.clearance.is_finite() || c.clearance < 0.0 {
            return Err(ConfigError::invalid(
                "constraints.clearance",
                format!("must be finite and >= 0, got {}", c.clearance),
            ));
        }
        if !c.barrier_epsilon.is_finite() || c.barrier_epsilon <= 0.0 {
            return Err(ConfigError::invalid(
                "constraints.barrier_epsilon",
                format!("must be > 0, got {}", c.barrier_epsilon),
            ));
        }
        if !c.restoration_margin.is_finite() || c.restoration_margin < 0.0 {
            return Err(ConfigError::invalid(
                "constraints.restoration_margin",
                format!("must be >= 0, got {}", c.restoration_margin),
            ));
        }
        if !c.restoration_weight.is_finite() || c.restoration_weight <= 0.0 {
            return Err(ConfigError::invalid(
                "constraints.restoration_weight",
                format!("must be > 0, got {}", c.restoration_weight),
            ));
        }

        let s = &self.solver;
        if s.num_controls < 1 {
            return Err(ConfigError::invalid(
                "solver.num_controls",
                "at least one control point is required",
            ));
        }
        if s.max_iterations < 1 {
            return Err(ConfigError::invalid("solver.max_iterations", "must be >= 1"));
        }
        if s.memory < 1 {
            return Err(ConfigError::invalid("solver.memory", "must be >= 1"));
        }
        if !s.field_inset.is_finite() || s.field_inset < 0.0 {
            return Err(ConfigError::invalid(
                "solver.field_inset",
                format!("must be >= 0, got {}", s.field_inset),
            ));
        }

        if self.sampling.num_samples < 2 {
            return Err(ConfigError::invalid("sampling.num_samples", "must be >= 2"));
        }

        let f = &self.fallback;
        if !f.cell_size.is_finite() || f.cell_size <= 0.0 {
            return Err(ConfigError::invalid(
                "fallback.cell_size",
                format!("must be > 0, got {}", f.cell_size),
            ));
        }

        Ok(())
    }
}

/// Objective weights
///
/// objective = length + λ · barrier + γ · curvature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostWeights {
    /// Obstacle barrier weight (λ), also reported as `lambda_avg`
    pub lambda: f64,
    /// Control-polygon bending weight (γ)
    pub gamma: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            // The barrier sums over every (sample, obstacle) pair, so a small
            // weight already dominates near the clearance boundary
            lambda: 0.1,
            gamma: 0.01,
        }
    }
}

/// Obstacle clearance and barrier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Required gap between a path point and an obstacle boundary
    pub clearance: f64,
    /// ε in −ln(φ + ε)
    pub barrier_epsilon: f64,
    /// Target signed clearance during feasibility restoration
    pub restoration_margin: f64,
    /// Weight of the exterior penalty during feasibility restoration
    pub restoration_weight: f64,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            clearance: 20.0,
            barrier_epsilon: 1e-6,
            restoration_margin: 2.0,
            restoration_weight: 10.0,
        }
    }
}

/// Quasi-Newton solver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Interior control points (n_ctrl)
    pub num_controls: usize,
    /// Iteration cap per phase
    pub max_iterations: usize,
    /// Number of (s, y) correction pairs kept by L-BFGS
    pub memory: usize,
    /// Control points stay this far inside every field border
    pub field_inset: f64,
    /// Run the exterior-penalty phase when the straight seed is infeasible
    pub restore_feasibility: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_controls: 8,
            max_iterations: 200,
            memory: 7,
            field_inset: 5.0,
            restore_feasibility: true,
        }
    }
}

/// Curve sampling density
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Points sampled along the fitted curve
    pub num_samples: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { num_samples: 100 }
    }
}

/// Grid fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Side length of one occupancy cell
    pub cell_size: f64,
    /// Drop intermediate cell centers that have line of sight past the obstacles
    pub shortcut: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            shortcut: false,
        }
    }
}

/// Outcome when validation fails and the grid fallback finds no path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasiblePolicy {
    /// Report `PlannerError::NoFeasiblePath`
    #[default]
    Reject,
    /// Return the continuous curve flagged `safe = false`
    KeepContinuous,
}
