//! Circular obstacle model
//!
//! An obstacle is a disc `{center, radius}`. Every clearance query takes the
//! required margin explicitly, so the same obstacle set serves the barrier,
//! the validator and the occupancy grid.

use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Circular no-go zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center position
    pub center: Vec2,
    /// Disc radius (must be > 0)
    pub radius: f64,
}

impl Obstacle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether the center is finite and the radius finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.center.x.is_finite()
            && self.center.y.is_finite()
            && self.radius.is_finite()
            && self.radius > 0.0
    }

    /// Radius grown by the required clearance
    pub fn inflated_radius(&self, clearance: f64) -> f64 {
        self.radius + clearance
    }

    /// Signed clearance φ = ‖p − c‖ − (r + clearance)
    ///
    /// Positive when `p` is strictly outside the inflated disc.
    pub fn signed_clearance(&self, p: &Vec2, clearance: f64) -> f64 {
        (p - self.center).norm() - self.inflated_radius(clearance)
    }

    /// Whether `p` lies strictly outside the inflated disc
    pub fn is_clear(&self, p: &Vec2, clearance: f64) -> bool {
        self.signed_clearance(p, clearance) > 0.0
    }

    /// Whether the segment `[a, b]` stays strictly outside the inflated disc
    pub fn segment_is_clear(&self, a: &Vec2, b: &Vec2, clearance: f64) -> bool {
        crate::math::point_segment_distance(&self.center, a, b) > self.inflated_radius(clearance)
    }
}

/// Smallest signed clearance of `p` over all obstacles
///
/// `+∞` for an empty obstacle set.
pub fn min_signed_clearance(obstacles: &[Obstacle], p: &Vec2, clearance: f64) -> f64 {
    obstacles
        .iter()
        .map(|o| o.signed_clearance(p, clearance))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_signed_clearance() {
        let obs = Obstacle::new(Vec2::new(100.0, 100.0), 30.0);

        assert_relative_eq!(obs.signed_clearance(&Vec2::new(160.0, 100.0), 20.0), 10.0);
        assert_relative_eq!(obs.signed_clearance(&Vec2::new(100.0, 100.0), 20.0), -50.0);
        assert!(!obs.is_clear(&Vec2::new(150.0, 100.0), 20.0)); // exactly on the boundary
        assert!(obs.is_clear(&Vec2::new(150.1, 100.0), 20.0));
    }

    #[test]
    fn test_segment_clearance() {
        let obs = Obstacle::new(Vec2::new(0.0, 0.0), 5.0);

        assert!(!obs.segment_is_clear(&Vec2::new(-20.0, 6.0), &Vec2::new(20.0, 6.0), 2.0));
        assert!(obs.segment_is_clear(&Vec2::new(-20.0, 8.0), &Vec2::new(20.0, 8.0), 2.0));
    }

    #[test]
    fn test_validity() {
        assert!(Obstacle::new(Vec2::zeros(), 1.0).is_valid());
        assert!(!Obstacle::new(Vec2::zeros(), 0.0).is_valid());
        assert!(!Obstacle::new(Vec2::zeros(), -3.0).is_valid());
        assert!(!Obstacle::new(Vec2::new(f64::NAN, 0.0), 1.0).is_valid());
    }

    #[test]
    fn test_min_signed_clearance() {
        let obstacles = vec![
            Obstacle::new(Vec2::new(0.0, 0.0), 1.0),
            Obstacle::new(Vec2::new(10.0, 0.0), 1.0),
        ];
        let p = Vec2::new(7.0, 0.0);
        assert_relative_eq!(min_signed_clearance(&obstacles, &p, 0.0), 2.0);
        assert_eq!(min_signed_clearance(&[], &p, 0.0), f64::INFINITY);
    }
}
