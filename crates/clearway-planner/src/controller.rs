//! Planning orchestrator
//!
//! Main entry point of the planner. One call:
//! 1. optimizes the control polygon,
//! 2. validates the sampled curve against the inflated obstacles,
//! 3. falls back to grid A* when validation fails,
//! 4. applies the [`InfeasiblePolicy`] when the grid has no path either.

use log::{debug, info, warn};
use thiserror::Error;

use clearway_core::{Field, Obstacle, Vec2};

use crate::config::{ConfigError, InfeasiblePolicy, PlannerConfig};
use crate::constraints::validate_samples;
use crate::fallback::{plan_on_grid, FallbackError, GridFailure, GridPath};
use crate::solver::{ContinuousOptimizer, SolverBuilder, SolverError};
use crate::trajectory::{PathSource, PlanningResult};

/// Planner errors
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Solver error: {0}")]
    SolverError(#[from] SolverError),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Fallback error: {0}")]
    FallbackError(#[from] FallbackError),
    #[error("Invalid obstacle {index}: center ({x}, {y}), radius {radius}")]
    InvalidObstacle { index: usize, x: f64, y: f64, radius: f64 },
    #[error("Invalid field: {width} x {height}")]
    InvalidField { width: f64, height: f64 },
    #[error("The {which} point ({x}, {y}) is not a finite point inside the field")]
    InvalidPoint { which: &'static str, x: f64, y: f64 },
    #[error("No feasible path ({0:?})")]
    NoFeasiblePath(GridFailure),
}

/// Planning state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// Continuous optimizer running
    Optimizing,
    /// Checking the sampled curve
    Validating,
    /// Curve passed validation
    Accepted,
    /// Grid search running
    FallbackPlanning,
    /// Result or error produced
    Done,
}

/// One planning query
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub start: Vec2,
    pub end: Vec2,
    pub obstacles: Vec<Obstacle>,
    pub field: Field,
}

/// Clearance-aware path planner
///
/// Immutable during planning, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    config: PlannerConfig,
    optimizer: ContinuousOptimizer,
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self, PlannerError> {
        config.validate()?;
        let optimizer = SolverBuilder::new().with_config(config.clone()).build()?;
        Ok(Self { config, optimizer })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a path for `request`
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanningResult, PlannerError> {
        self.plan_traced(request).0
    }

    /// Plan a path and report the states visited
    pub fn plan_traced(
        &self,
        request: &PlanRequest,
    ) -> (Result<PlanningResult, PlannerError>, Vec<PlannerState>) {
        let mut states = Vec::new();
        let result = self.run(request, &mut states);
        (result, states)
    }

    fn run(
        &self,
        request: &PlanRequest,
        states: &mut Vec<PlannerState>,
    ) -> Result<PlanningResult, PlannerError> {
        validate_request(request)?;

        let lambda = self.config.weights.lambda;
        let clearance = self.config.constraints.clearance;
        info!(
            "[Planner] planning ({:.1},{:.1}) -> ({:.1},{:.1}) around {} obstacles",
            request.start.x,
            request.start.y,
            request.end.x,
            request.end.y,
            request.obstacles.len()
        );

        advance(states, PlannerState::Optimizing);
        let solution = self
            .optimizer
            .optimize(request.start, request.end, &request.obstacles, request.field)?;

        advance(states, PlannerState::Validating);
        let check = validate_samples(&solution.samples, &request.obstacles, clearance);
        if check.all_satisfied {
            advance(states, PlannerState::Accepted);
            advance(states, PlannerState::Done);
            return Ok(PlanningResult::new(
                solution.samples,
                lambda,
                PathSource::Continuous,
                true,
                solution.statistics,
            ));
        }
        debug!(
            "[Planner] curve violates obstacles {:?} (max violation {:.3})",
            check.violated(),
            check.max_violation
        );

        advance(states, PlannerState::FallbackPlanning);
        let grid_path = plan_on_grid(
            &request.start,
            &request.end,
            &request.obstacles,
            &request.field,
            clearance,
            &self.config.fallback,
        )?;
        advance(states, PlannerState::Done);

        match grid_path {
            GridPath::Found { mut points, .. } => {
                if points.len() == 1 {
                    // Start and end share a cell
                    points.push(points[0]);
                }
                let safe = validate_samples(&points, &request.obstacles, clearance).all_satisfied;
                Ok(PlanningResult::new(
                    points,
                    lambda,
                    PathSource::Fallback,
                    safe,
                    solution.statistics,
                ))
            }
            GridPath::Failed(reason) => match self.config.policy {
                InfeasiblePolicy::Reject => {
                    warn!("[Planner] no feasible path: {:?}", reason);
                    Err(PlannerError::NoFeasiblePath(reason))
                }
                InfeasiblePolicy::KeepContinuous => {
                    warn!("[Planner] no feasible path ({:?}), keeping the unsafe curve", reason);
                    Ok(PlanningResult::new(
                        solution.samples,
                        lambda,
                        PathSource::Continuous,
                        false,
                        solution.statistics,
                    ))
                }
            },
        }
    }
}

fn advance(states: &mut Vec<PlannerState>, next: PlannerState) {
    match states.last() {
        Some(prev) => debug!("[Planner] {:?} -> {:?}", prev, next),
        None => debug!("[Planner] -> {:?}", next),
    }
    states.push(next);
}

fn validate_request(request: &PlanRequest) -> Result<(), PlannerError> {
    let field = &request.field;
    if !field.is_valid() {
        return Err(PlannerError::InvalidField {
            width: field.width,
            height: field.height,
        });
    }
    for (which, p) in [("start", &request.start), ("end", &request.end)] {
        if !(p.x.is_finite() && p.y.is_finite()) || !field.contains(p) {
            return Err(PlannerError::InvalidPoint { which, x: p.x, y: p.y });
        }
    }
    if let Some((index, o)) = request.obstacles.iter().enumerate().find(|(_, o)| !o.is_valid()) {
        return Err(PlannerError::InvalidObstacle {
            index,
            x: o.center.x,
            y: o.center.y,
            radius: o.radius,
        });
    }
    Ok(())
}

/// Plan with default settings overridden by the main tuning knobs
#[allow(clippy::too_many_arguments)]
pub fn plan_path(
    start: Vec2,
    end: Vec2,
    obstacles: &[Obstacle],
    field_size: (f64, f64),
    n_ctrl: usize,
    lam: f64,
    gamma: f64,
    clearance: f64,
) -> Result<PlanningResult, PlannerError> {
    let mut config = PlannerConfig::default();
    config.solver.num_controls = n_ctrl;
    config.weights.lambda = lam;
    config.weights.gamma = gamma;
    config.constraints.clearance = clearance;

    PathPlanner::new(config)?.plan(&PlanRequest {
        start,
        end,
        obstacles: obstacles.to_vec(),
        field: Field::new(field_size.0, field_size.1),
    })
}
