//! Path optimization problem
//!
//! The decision variable is the control polygon `c₁ … cₙ` between the fixed
//! start and end anchors, flattened to `[x₁, y₁, …, xₙ, yₙ]`:
//!
//! ```text
//! minimize    J(c) = L(S(c)) + λ · B(S(c)) + γ · K(c)
//! subject to  c ∈ [inset, W − inset] × [inset, H − inset]
//! ```
//!
//! where `S` samples the fitted curve, `L` is the polyline length, `B` the
//! log barrier and `K` the bending energy of the polygon.

use std::f64::consts::PI;

use nalgebra::DVector;

use clearway_core::math::{linspace, path_length};
use clearway_core::{fit_curve, CurveFit, Field, Obstacle, Vec2};

use crate::config::{CostWeights, PlannerConfig};
use crate::constraints::{curvature, ConstraintEvaluator};

/// Interior control points of a curve
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPolygon {
    points: Vec<Vec2>,
}

impl ControlPolygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flatten to `[x₀, y₀, x₁, y₁, …]`
    pub fn to_vector(&self) -> DVector<f64> {
        DVector::from_iterator(self.points.len() * 2, self.points.iter().flat_map(|p| [p.x, p.y]))
    }

    /// Rebuild from a flat vector; `None` for an odd length
    pub fn from_vector(v: &DVector<f64>) -> Option<Self> {
        if v.len() % 2 != 0 {
            return None;
        }
        let points = v
            .as_slice()
            .chunks_exact(2)
            .map(|xy| Vec2::new(xy[0], xy[1]))
            .collect();
        Some(Self { points })
    }
}

/// Per-coordinate box constraint `lower ≤ x ≤ upper`
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBounds {
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
}

impl BoxBounds {
    pub fn new(lower: DVector<f64>, upper: DVector<f64>) -> Self {
        Self { lower, upper }
    }

    /// Same `[inset, W − inset] × [inset, H − inset]` box for every control point
    ///
    /// An inset wider than half a dimension pins that coordinate to the midline.
    pub fn for_field(field: &Field, inset: f64, num_points: usize) -> Self {
        let axis = |extent: f64| {
            if 2.0 * inset > extent {
                (extent / 2.0, extent / 2.0)
            } else {
                (inset, extent - inset)
            }
        };
        let (x_lo, x_hi) = axis(field.width);
        let (y_lo, y_hi) = axis(field.height);

        let repeat = |x: f64, y: f64| {
            DVector::from_iterator(num_points * 2, (0..num_points).flat_map(move |_| [x, y]))
        };
        let lower = repeat(x_lo, y_lo);
        let upper = repeat(x_hi, y_hi);
        Self { lower, upper }
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Whether every lower bound is at most its upper bound
    pub fn is_consistent(&self) -> bool {
        self.lower.len() == self.upper.len()
            && self.lower.iter().zip(self.upper.iter()).all(|(lo, hi)| lo <= hi)
    }

    pub fn project(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            x.len(),
            x.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(v, (lo, hi))| v.max(*lo).min(*hi)),
        )
    }

    pub fn contains(&self, x: &DVector<f64>) -> bool {
        x.len() == self.dimension()
            && x.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| v >= lo && v <= hi)
    }
}

/// Objective and bounds of one planning query
#[derive(Debug, Clone)]
pub struct PathOcp {
    start: Vec2,
    end: Vec2,
    num_controls: usize,
    num_samples: usize,
    weights: CostWeights,
    restoration_weight: f64,
    evaluator: ConstraintEvaluator,
    bounds: BoxBounds,
}

impl PathOcp {
    pub fn new(
        start: Vec2,
        end: Vec2,
        obstacles: Vec<Obstacle>,
        field: Field,
        config: &PlannerConfig,
    ) -> Self {
        let num_controls = config.solver.num_controls;
        Self {
            start,
            end,
            num_controls,
            num_samples: config.sampling.num_samples,
            weights: config.weights.clone(),
            restoration_weight: config.constraints.restoration_weight,
            evaluator: ConstraintEvaluator::new(config.constraints.clone(), obstacles),
            bounds: BoxBounds::for_field(&field, config.solver.field_inset, num_controls),
        }
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    /// Length of the decision vector (`2 · n_ctrl`)
    pub fn dimension(&self) -> usize {
        self.num_controls * 2
    }

    pub fn bounds(&self) -> &BoxBounds {
        &self.bounds
    }

    /// Control points evenly spaced on the straight segment, projected into the box
    pub fn initial_guess(&self) -> DVector<f64> {
        let line = linspace(&self.start, &self.end, self.num_controls + 2);
        let seed = ControlPolygon::new(line[1..=self.num_controls].to_vec());
        self.bounds.project(&seed.to_vector())
    }

    /// Straight seed bowed to one side by a half-sine bump
    ///
    /// `side` is `+1` for the left of the start → end direction and `−1` for
    /// the right. The bump peaks one restoration margin beyond the largest
    /// inflated obstacle, which separates a seed stuck on a symmetric blocker.
    pub fn detour_guess(&self, side: f64) -> DVector<f64> {
        let config = self.evaluator.config();
        let height = self
            .evaluator
            .obstacles()
            .iter()
            .map(|o| o.inflated_radius(config.clearance))
            .fold(0.0, f64::max)
            + config.restoration_margin;

        let chord = self.end - self.start;
        let normal = match chord.try_normalize(f64::EPSILON) {
            Some(d) => Vec2::new(-d.y, d.x),
            None => Vec2::new(0.0, 1.0),
        };

        let line = linspace(&self.start, &self.end, self.num_controls + 2);
        let span = (self.num_controls + 1) as f64;
        let bowed = (1..=self.num_controls)
            .map(|i| line[i] + normal * (side * height * (PI * i as f64 / span).sin()))
            .collect();
        self.bounds.project(&ControlPolygon::new(bowed).to_vector())
    }

    /// Fit and sample the curve for a decision vector
    pub fn sample(&self, x: &DVector<f64>) -> CurveFit {
        let controls =
            ControlPolygon::from_vector(x).unwrap_or_else(|| ControlPolygon::new(Vec::new()));
        fit_curve(&self.start, controls.points(), &self.end, self.num_samples)
    }

    /// Length of the sampled curve
    pub fn path_length(&self, x: &DVector<f64>) -> f64 {
        path_length(self.sample(x).points())
    }

    /// Barrier objective; `+∞` when any sample is inside an inflated obstacle
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        let samples = self.sample(x);
        let barrier = self.evaluator.barrier(samples.points());
        if barrier.hard_infeasible {
            return f64::INFINITY;
        }
        path_length(samples.points())
            + self.weights.lambda * barrier.value
            + self.weights.gamma * self.bending(x)
    }

    /// Finite exterior-penalty objective used to reach a barrier-feasible polygon
    pub fn restoration_objective(&self, x: &DVector<f64>) -> f64 {
        let samples = self.sample(x);
        path_length(samples.points())
            + self.restoration_weight * self.evaluator.exterior(samples.points())
            + self.weights.gamma * self.bending(x)
    }

    /// Whether the sampled curve keeps clear of every inflated obstacle
    pub fn is_feasible(&self, x: &DVector<f64>) -> bool {
        !self.evaluator.barrier(self.sample(x).points()).hard_infeasible
    }

    fn bending(&self, x: &DVector<f64>) -> f64 {
        ControlPolygon::from_vector(x)
            .map(|c| curvature(c.points()))
            .unwrap_or(0.0)
    }
}
