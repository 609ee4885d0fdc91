//! Clearway Path Planner
//!
//! Near-minimal-length, collision-free paths between two points in a planar
//! field of circular obstacles.
//!
//! # Architecture
//!
//! The continuous stage optimizes the interior control points of an
//! interpolating spline:
//!
//! ```text
//! minimize    J(c) = L(S(c)) + λ Σ −ln(φ + ε) + γ Σ ‖cᵢ₋₁ − 2cᵢ + cᵢ₊₁‖²
//! subject to  c inside the field (box bounds)
//!             φ = ‖p − o‖ − (r + clearance) > 0 for every sample p and obstacle o
//! ```
//!
//! A curve that still violates the clearance after optimization is replaced
//! by an 8-connected A* path over an inflated occupancy grid.
//!
//! # Components
//!
//! - [`config`]: Planner configuration and YAML loading
//! - [`constraints`]: Log barrier, curvature and path validation
//! - [`ocp`]: Objective over the control polygon
//! - [`solver`]: Projected L-BFGS and the restoration/barrier driver
//! - [`fallback`]: Occupancy grid and A* search
//! - [`controller`]: Planning orchestrator
//! - [`trajectory`]: Planning result and arc-length interpolation
//! - [`record`]: Log rows for cost-prediction tooling
//! - [`scenarios`]: Canned planning queries

pub mod config;
pub mod constraints;
pub mod ocp;
pub mod solver;
pub mod fallback;
pub mod controller;
pub mod trajectory;
pub mod record;
pub mod scenarios;

// Re-exports
pub use config::{ConfigError, InfeasiblePolicy, PlannerConfig};
pub use controller::{plan_path, PathPlanner, PlanRequest, PlannerError, PlannerState};
pub use record::PlanningRecord;
pub use solver::{SolveStatistics, SolverError, SolverStatus};
pub use trajectory::{PathSource, PlanningResult};
