//! Curve builder
//!
//! Fits a smooth parametric curve through `(start, c₁, …, cₙ, end)` and
//! samples it densely. The parameter is the normalized cumulative chord
//! length, and the spline degree is `min(3, point_count − 1)`.
//!
//! Fitting never fails: a degenerate control polygon (coincident consecutive
//! points, non-finite coordinates, a singular spline system) degrades to a
//! uniform sample of the straight segment from start to end, reported as
//! [`CurveFit::Degraded`].

pub mod spline;

use log::debug;

pub use spline::Interpolant;

use crate::math::{all_finite, linspace};
use crate::Vec2;

/// Consecutive points closer than this are treated as coincident
const MIN_CHORD: f64 = 1e-9;

/// Outcome of a curve fit
#[derive(Debug, Clone, PartialEq)]
pub enum CurveFit {
    /// Sample along the fitted spline
    Fitted(Vec<Vec2>),
    /// Straight start → end sample used because the fit was degenerate
    Degraded(Vec<Vec2>),
}

impl CurveFit {
    pub fn points(&self) -> &[Vec2] {
        match self {
            Self::Fitted(points) | Self::Degraded(points) => points,
        }
    }

    pub fn into_points(self) -> Vec<Vec2> {
        match self {
            Self::Fitted(points) | Self::Degraded(points) => points,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Uniform sample of the straight segment from `start` to `end`
pub fn straight_sample(start: &Vec2, end: &Vec2, n_samples: usize) -> Vec<Vec2> {
    linspace(start, end, n_samples.max(2))
}

/// Fit an interpolating curve through start, `controls` and end and sample it
///
/// `n_samples` below 2 is raised to 2. The first and last samples are exactly
/// `start` and `end`.
pub fn fit_curve(start: &Vec2, controls: &[Vec2], end: &Vec2, n_samples: usize) -> CurveFit {
    let n_samples = n_samples.max(2);

    let mut points = Vec::with_capacity(controls.len() + 2);
    points.push(*start);
    points.extend_from_slice(controls);
    points.push(*end);

    match fit_points(&points, n_samples) {
        Some(samples) => CurveFit::Fitted(samples),
        None => {
            debug!(
                "[Curve] degenerate control polygon ({} points), using straight segment",
                points.len()
            );
            CurveFit::Degraded(straight_sample(start, end, n_samples))
        }
    }
}

fn fit_points(points: &[Vec2], n_samples: usize) -> Option<Vec<Vec2>> {
    if !all_finite(points) {
        return None;
    }

    let knots = chord_parameters(points)?;
    let degree = 3.min(points.len() - 1);
    let curve = Interpolant::fit(&knots, points, degree)?;

    let last = n_samples - 1;
    let mut samples: Vec<Vec2> = (0..n_samples)
        .map(|j| curve.evaluate(j as f64 / last as f64))
        .collect();
    samples[0] = points[0];
    samples[last] = points[points.len() - 1];

    all_finite(&samples).then_some(samples)
}

/// Normalized cumulative chord length for each point
///
/// `None` when two consecutive points coincide.
fn chord_parameters(points: &[Vec2]) -> Option<Vec<f64>> {
    let mut knots = Vec::with_capacity(points.len());
    knots.push(0.0);
    let mut total = 0.0;
    for w in points.windows(2) {
        let chord = (w[1] - w[0]).norm();
        if chord < MIN_CHORD {
            return None;
        }
        total += chord;
        knots.push(total);
    }
    for t in knots.iter_mut() {
        *t /= total;
    }
    // Guard against rounding in the final division
    if let Some(last) = knots.last_mut() {
        *last = 1.0;
    }
    Some(knots)
}
