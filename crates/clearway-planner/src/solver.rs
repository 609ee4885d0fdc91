//! Continuous optimizer
//!
//! Projected limited-memory BFGS over a box, with Armijo backtracking and
//! finite-difference gradients. The objective may return `+∞` (hard
//! obstacle violation); such trial points are simply rejected by the line
//! search.
//!
//! [`ContinuousOptimizer`] drives one planning query: an optional
//! feasibility-restoration phase on the exterior penalty, then the barrier
//! phase on the full objective.

use std::collections::VecDeque;

use log::{debug, trace};
use nalgebra::DVector;
use thiserror::Error;

use clearway_core::{Field, Obstacle, Vec2};

use crate::config::{PlannerConfig, SolverConfig};
use crate::ocp::{BoxBounds, ControlPolygon, PathOcp};

/// Projected-gradient infinity norm below which the solver stops
const PROJECTED_GRADIENT_TOL: f64 = 1e-6;
/// Relative objective decrease below which the solver stops
const OBJECTIVE_TOL: f64 = 1e-10;
/// Sufficient-decrease constant
const ARMIJO_C: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;
/// Relative finite-difference step
const FD_STEP: f64 = 1e-6;

/// Solver errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid decision dimension: expected {expected}, got {got}")]
    InvalidDimension { expected: usize, got: usize },
    #[error("Inconsistent bounds: some lower bound exceeds its upper bound")]
    InconsistentBounds,
    #[error("Initial point contains non-finite values")]
    NonFiniteStart,
    #[error("Invalid solver option: {0}")]
    InvalidOption(&'static str),
}

/// Termination reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverStatus {
    /// Projected gradient or objective decrease vanished
    Converged,
    /// Iteration cap reached
    #[default]
    MaxIterations,
    /// No step along the search direction decreased the objective
    LineSearchStalled,
    /// Objective is `+∞` at the initial point
    InfeasibleStart,
}

/// Solution statistics
#[derive(Debug, Clone, Default)]
pub struct SolveStatistics {
    /// Accepted iterations over all phases
    pub iterations: usize,
    /// Objective evaluations over all phases
    pub evaluations: usize,
    /// Final barrier objective (`+∞` if the barrier phase never became feasible)
    pub objective: f64,
    /// Termination of the barrier phase
    pub status: SolverStatus,
    /// Whether the feasibility-restoration phase ran
    pub restored: bool,
    /// Whether restoration restarted from a bowed detour seed
    pub detoured: bool,
}

/// Configuration for a single solve call
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Iteration cap per phase
    pub max_iterations: usize,
    /// Number of stored correction pairs
    pub memory: usize,
    /// Length of the first search step
    pub initial_step: f64,
    /// Run the exterior-penalty phase when the seed is infeasible
    pub restore_feasibility: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self::from(&SolverConfig::default())
    }
}

impl From<&SolverConfig> for SolveOptions {
    fn from(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            memory: config.memory,
            initial_step: 10.0,
            restore_feasibility: config.restore_feasibility,
        }
    }
}

/// Result of one minimization
#[derive(Debug, Clone)]
pub struct Minimization {
    /// Best point seen
    pub x: DVector<f64>,
    /// Objective at `x`
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub status: SolverStatus,
}

/// Box-constrained L-BFGS with projected Armijo line search
#[derive(Debug, Clone)]
pub struct ProjectedLbfgs {
    options: SolveOptions,
}

impl ProjectedLbfgs {
    pub fn new(options: SolveOptions) -> Result<Self, SolverError> {
        if options.max_iterations == 0 {
            return Err(SolverError::InvalidOption("max_iterations must be >= 1"));
        }
        if options.memory == 0 {
            return Err(SolverError::InvalidOption("memory must be >= 1"));
        }
        if !options.initial_step.is_finite() || options.initial_step <= 0.0 {
            return Err(SolverError::InvalidOption("initial_step must be finite and > 0"));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Minimize `f` over `bounds` starting from the projection of `x0`
    pub fn minimize<F>(
        &self,
        f: F,
        x0: &DVector<f64>,
        bounds: &BoxBounds,
    ) -> Result<Minimization, SolverError>
    where
        F: Fn(&DVector<f64>) -> f64,
    {
        if x0.len() != bounds.dimension() || bounds.upper.len() != bounds.dimension() {
            return Err(SolverError::InvalidDimension {
                expected: bounds.dimension(),
                got: x0.len(),
            });
        }
        if !bounds.is_consistent() {
            return Err(SolverError::InconsistentBounds);
        }
        if x0.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFiniteStart);
        }

        let mut evaluations = 0;
        let mut eval = |x: &DVector<f64>| {
            evaluations += 1;
            f(x)
        };

        let mut x = bounds.project(x0);
        let mut fx = eval(&x);
        if !fx.is_finite() {
            trace!("[Solver] objective is infinite at the initial point");
            return Ok(Minimization {
                x,
                value: fx,
                iterations: 0,
                evaluations,
                status: SolverStatus::InfeasibleStart,
            });
        }

        let mut g = gradient(&mut eval, &x, fx);
        let mut history: VecDeque<(DVector<f64>, DVector<f64>)> =
            VecDeque::with_capacity(self.options.memory);
        let mut status = SolverStatus::MaxIterations;
        let mut iterations = 0;

        while iterations < self.options.max_iterations {
            let pg = projected_gradient(&x, &g, bounds);
            if pg.amax() < PROJECTED_GRADIENT_TOL {
                status = SolverStatus::Converged;
                break;
            }

            let mut direction = -two_loop(&pg, &history);
            // Coordinates pinned at an active bound do not move
            for i in 0..direction.len() {
                if pg[i] == 0.0 {
                    direction[i] = 0.0;
                }
            }
            if direction.dot(&pg) >= 0.0 {
                history.clear();
                direction = -pg.clone();
            }
            if history.is_empty() {
                let norm = direction.norm();
                if norm > self.options.initial_step {
                    direction *= self.options.initial_step / norm;
                }
            }

            let Some((x_new, f_new)) = line_search(&mut eval, &x, fx, &g, &direction, bounds) else {
                status = SolverStatus::LineSearchStalled;
                break;
            };
            iterations += 1;

            let g_new = gradient(&mut eval, &x_new, f_new);
            let s = &x_new - &x;
            let y = &g_new - &g;
            if s.dot(&y) > f64::EPSILON * y.norm_squared() {
                if history.len() == self.options.memory {
                    history.pop_front();
                }
                history.push_back((s, y));
            }

            let decrease = fx - f_new;
            x = x_new;
            g = g_new;
            fx = f_new;
            trace!("[Solver] iteration {}: objective {:.6}", iterations, fx);

            if decrease <= OBJECTIVE_TOL * fx.abs().max(1.0) {
                status = SolverStatus::Converged;
                break;
            }
        }

        Ok(Minimization {
            x,
            value: fx,
            iterations,
            evaluations,
            status,
        })
    }
}

/// Finite-difference gradient
///
/// Central where both neighbours are finite, one-sided where only one is,
/// zero where neither is.
fn gradient<F>(eval: &mut F, x: &DVector<f64>, fx: f64) -> DVector<f64>
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let mut g = DVector::zeros(x.len());
    let mut shifted = x.clone();
    for i in 0..x.len() {
        let h = FD_STEP * x[i].abs().max(1.0);

        shifted[i] = x[i] + h;
        let f_plus = eval(&shifted);
        shifted[i] = x[i] - h;
        let f_minus = eval(&shifted);
        shifted[i] = x[i];

        g[i] = match (f_plus.is_finite(), f_minus.is_finite()) {
            (true, true) => (f_plus - f_minus) / (2.0 * h),
            (true, false) => (f_plus - fx) / h,
            (false, true) => (fx - f_minus) / h,
            (false, false) => 0.0,
        };
    }
    g
}

/// Gradient with components zeroed where a bound blocks the descent direction
fn projected_gradient(x: &DVector<f64>, g: &DVector<f64>, bounds: &BoxBounds) -> DVector<f64> {
    DVector::from_iterator(
        x.len(),
        (0..x.len()).map(|i| {
            let at_lower = x[i] <= bounds.lower[i] && g[i] > 0.0;
            let at_upper = x[i] >= bounds.upper[i] && g[i] < 0.0;
            if at_lower || at_upper {
                0.0
            } else {
                g[i]
            }
        }),
    )
}

/// L-BFGS two-loop recursion: approximate `H⁻¹ q`
fn two_loop(q: &DVector<f64>, history: &VecDeque<(DVector<f64>, DVector<f64>)>) -> DVector<f64> {
    let mut q = q.clone();
    let mut alphas = Vec::with_capacity(history.len());

    for (s, y) in history.iter().rev() {
        let rho = 1.0 / y.dot(s);
        let alpha = rho * s.dot(&q);
        q.axpy(-alpha, y, 1.0);
        alphas.push((alpha, rho));
    }

    if let Some((s, y)) = history.back() {
        q *= s.dot(y) / y.norm_squared();
    }

    for ((s, y), (alpha, rho)) in history.iter().zip(alphas.into_iter().rev()) {
        let beta = rho * y.dot(&q);
        q.axpy(alpha - beta, s, 1.0);
    }
    q
}

/// Projected Armijo backtracking; `None` when no step decreases the objective
fn line_search<F>(
    eval: &mut F,
    x: &DVector<f64>,
    fx: f64,
    g: &DVector<f64>,
    direction: &DVector<f64>,
    bounds: &BoxBounds,
) -> Option<(DVector<f64>, f64)>
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let mut t = 1.0;
    for _ in 0..MAX_BACKTRACKS {
        let trial = bounds.project(&(x + direction * t));
        let step = &trial - x;
        if step.amax() <= f64::EPSILON * x.amax().max(1.0) {
            return None;
        }
        let f_trial = eval(&trial);
        if f_trial.is_finite() && f_trial <= fx + ARMIJO_C * g.dot(&step) && f_trial < fx {
            return Some((trial, f_trial));
        }
        t *= 0.5;
    }
    None
}

/// Optimized curve of one query
#[derive(Debug, Clone)]
pub struct ContinuousSolution {
    /// Dense sample of the optimized curve
    pub samples: Vec<Vec2>,
    /// Final control polygon
    pub controls: ControlPolygon,
    pub statistics: SolveStatistics,
}

/// Restoration + barrier driver
#[derive(Debug, Clone)]
pub struct ContinuousOptimizer {
    config: PlannerConfig,
    lbfgs: ProjectedLbfgs,
}

impl ContinuousOptimizer {
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn options(&self) -> &SolveOptions {
        self.lbfgs.options()
    }

    /// Optimize the control polygon between `start` and `end`
    pub fn optimize(
        &self,
        start: Vec2,
        end: Vec2,
        obstacles: &[Obstacle],
        field: Field,
    ) -> Result<ContinuousSolution, SolverError> {
        let ocp = PathOcp::new(start, end, obstacles.to_vec(), field, &self.config);
        let mut x0 = ocp.initial_guess();
        let mut statistics = SolveStatistics::default();

        if self.lbfgs.options().restore_feasibility && !ocp.is_feasible(&x0) {
            debug!("[Solver] straight seed violates clearance, restoring feasibility");
            statistics.restored = true;
            x0 = self.restore(&ocp, &x0, &mut statistics)?;

            if !ocp.is_feasible(&x0) {
                // The straight seed gives no lateral gradient on a centered
                // blocker; retry from seeds bowed to either side
                let mut best: Option<(f64, DVector<f64>)> = None;
                for side in [1.0, -1.0] {
                    let seed = ocp.detour_guess(side);
                    let candidate = if ocp.is_feasible(&seed) {
                        seed
                    } else {
                        self.restore(&ocp, &seed, &mut statistics)?
                    };
                    let value = ocp.objective(&candidate);
                    if value.is_finite() && best.as_ref().map_or(true, |(v, _)| value < *v) {
                        best = Some((value, candidate));
                    }
                }
                if let Some((value, candidate)) = best {
                    debug!("[Solver] detour seed is feasible, objective {:.3}", value);
                    statistics.detoured = true;
                    x0 = candidate;
                }
            }
        }

        let solved = self.lbfgs.minimize(|x| ocp.objective(x), &x0, ocp.bounds())?;
        statistics.iterations += solved.iterations;
        statistics.evaluations += solved.evaluations;
        statistics.objective = solved.value;
        statistics.status = solved.status;

        debug!(
            "[Solver] barrier phase: {:?}, objective {:.3}, {} iterations, {} evaluations",
            solved.status, solved.value, statistics.iterations, statistics.evaluations
        );

        let controls = ControlPolygon::from_vector(&solved.x).ok_or(SolverError::InvalidDimension {
            expected: ocp.dimension(),
            got: solved.x.len(),
        })?;
        let samples = ocp.sample(&solved.x).into_points();

        Ok(ContinuousSolution {
            samples,
            controls,
            statistics,
        })
    }
}

impl ContinuousOptimizer {
    /// Run the exterior-penalty phase from `x0`
    fn restore(
        &self,
        ocp: &PathOcp,
        x0: &DVector<f64>,
        statistics: &mut SolveStatistics,
    ) -> Result<DVector<f64>, SolverError> {
        let restored = self.lbfgs.minimize(|x| ocp.restoration_objective(x), x0, ocp.bounds())?;
        debug!(
            "[Solver] restoration: {:?} after {} iterations, feasible = {}",
            restored.status,
            restored.iterations,
            ocp.is_feasible(&restored.x)
        );
        statistics.iterations += restored.iterations;
        statistics.evaluations += restored.evaluations;
        Ok(restored.x)
    }
}

/// Builder for creating optimizers with different configurations
#[derive(Debug, Clone, Default)]
pub struct SolverBuilder {
    config: PlannerConfig,
    options: Option<SolveOptions>,
}

impl SolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the options derived from `config.solver`
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Result<ContinuousOptimizer, SolverError> {
        if self.config.solver.num_controls == 0 {
            return Err(SolverError::InvalidOption("num_controls must be >= 1"));
        }
        let options = self
            .options
            .unwrap_or_else(|| SolveOptions::from(&self.config.solver));
        Ok(ContinuousOptimizer {
            lbfgs: ProjectedLbfgs::new(options)?,
            config: self.config,
        })
    }
}
