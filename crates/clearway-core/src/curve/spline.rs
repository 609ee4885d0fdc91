//! Interpolating parametric curves
//!
//! Each interpolant passes through its knots `(tᵢ, pᵢ)` in order, with
//! strictly increasing parameters `tᵢ ∈ [0, 1]`. The degree is chosen by the
//! caller: piecewise linear, a single quadratic through three points, or a
//! natural cubic spline (S'' = 0 at both ends).

use nalgebra::{DMatrix, Dyn, U2};

use crate::Vec2;

/// Parametric interpolant through a knot sequence
#[derive(Debug, Clone)]
pub enum Interpolant {
    /// Piecewise linear (degree 1)
    Linear { knots: Vec<f64>, points: Vec<Vec2> },
    /// Unique quadratic through exactly three points (degree 2)
    Quadratic { knots: [f64; 3], points: [Vec2; 3] },
    /// Natural cubic spline (degree 3)
    NaturalCubic {
        knots: Vec<f64>,
        points: Vec<Vec2>,
        /// Second derivatives at each knot
        second_derivatives: Vec<Vec2>,
    },
}

impl Interpolant {
    /// Fit an interpolant of the given degree
    ///
    /// Returns `None` when the knot layout does not support the requested
    /// degree or the spline system is singular.
    pub fn fit(knots: &[f64], points: &[Vec2], degree: usize) -> Option<Self> {
        if knots.len() != points.len() || points.len() < 2 {
            return None;
        }
        match degree {
            1 => Some(Self::Linear {
                knots: knots.to_vec(),
                points: points.to_vec(),
            }),
            2 if points.len() == 3 => Some(Self::Quadratic {
                knots: [knots[0], knots[1], knots[2]],
                points: [points[0], points[1], points[2]],
            }),
            3 if points.len() >= 4 => natural_cubic_second_derivatives(knots, points).map(
                |second_derivatives| Self::NaturalCubic {
                    knots: knots.to_vec(),
                    points: points.to_vec(),
                    second_derivatives,
                },
            ),
            _ => None,
        }
    }

    /// Evaluate at parameter `u` (clamped to the knot range)
    pub fn evaluate(&self, u: f64) -> Vec2 {
        match self {
            Self::Linear { knots, points } => {
                let (i, u) = locate(knots, u);
                let h = knots[i + 1] - knots[i];
                points[i].lerp(&points[i + 1], (u - knots[i]) / h)
            }
            Self::Quadratic { knots, points } => {
                // Lagrange form
                let [t0, t1, t2] = *knots;
                let u = u.clamp(t0, t2);
                let l0 = (u - t1) * (u - t2) / ((t0 - t1) * (t0 - t2));
                let l1 = (u - t0) * (u - t2) / ((t1 - t0) * (t1 - t2));
                let l2 = (u - t0) * (u - t1) / ((t2 - t0) * (t2 - t1));
                points[0] * l0 + points[1] * l1 + points[2] * l2
            }
            Self::NaturalCubic {
                knots,
                points,
                second_derivatives: m,
            } => {
                let (i, u) = locate(knots, u);
                let h = knots[i + 1] - knots[i];
                let a = knots[i + 1] - u;
                let b = u - knots[i];
                m[i] * (a.powi(3) / (6.0 * h))
                    + m[i + 1] * (b.powi(3) / (6.0 * h))
                    + (points[i] / h - m[i] * (h / 6.0)) * a
                    + (points[i + 1] / h - m[i + 1] * (h / 6.0)) * b
            }
        }
    }
}

/// Segment index containing `u` and the clamped parameter
fn locate(knots: &[f64], u: f64) -> (usize, f64) {
    let first = knots[0];
    let last = knots[knots.len() - 1];
    let u = u.clamp(first, last);
    // Index of the first knot strictly greater than u, minus one
    let upper = knots.partition_point(|&t| t <= u);
    let i = upper.saturating_sub(1).min(knots.len() - 2);
    (i, u)
}

/// Solve the tridiagonal natural-spline system for both coordinates at once
///
/// hᵢ₋₁ Mᵢ₋₁ + 2(hᵢ₋₁ + hᵢ) Mᵢ + hᵢ Mᵢ₊₁
///     = 6 [(pᵢ₊₁ − pᵢ)/hᵢ − (pᵢ − pᵢ₋₁)/hᵢ₋₁]
fn natural_cubic_second_derivatives(knots: &[f64], points: &[Vec2]) -> Option<Vec<Vec2>> {
    let m = points.len();
    let interior = m - 2;
    let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
    if h.iter().any(|&hi| !(hi > 0.0)) {
        return None;
    }

    let mut a = DMatrix::<f64>::zeros(interior, interior);
    let mut rhs = nalgebra::OMatrix::<f64, Dyn, U2>::zeros(interior);

    for row in 0..interior {
        let i = row + 1;
        if row > 0 {
            a[(row, row - 1)] = h[i - 1];
        }
        a[(row, row)] = 2.0 * (h[i - 1] + h[i]);
        if row + 1 < interior {
            a[(row, row + 1)] = h[i];
        }
        let slope = (points[i + 1] - points[i]) / h[i] - (points[i] - points[i - 1]) / h[i - 1];
        rhs[(row, 0)] = 6.0 * slope.x;
        rhs[(row, 1)] = 6.0 * slope.y;
    }

    let solution = a.lu().solve(&rhs)?;
    if solution.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut second = Vec::with_capacity(m);
    second.push(Vec2::zeros());
    for row in 0..interior {
        second.push(Vec2::new(solution[(row, 0)], solution[(row, 1)]));
    }
    second.push(Vec2::zeros());
    Some(second)
}
