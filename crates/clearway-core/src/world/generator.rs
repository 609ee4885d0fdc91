//! Randomized obstacle placement
//!
//! Candidates are drawn independently and accepted when they
//! (a) fit inside the field with a border margin,
//! (b) keep clear of the start and end points, and
//! (c) keep `r_i + r_j + spacing` away from every obstacle already placed.
//!
//! The total number of draws is capped at `attempts_per_obstacle * count`.
//! Running out of attempts is not an error: the generator returns the
//! obstacles it managed to place.

use log::{debug, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Field, Obstacle};
use crate::Vec2;

/// Smallest radius a draw may produce, as a fraction of the nominal radius
const MIN_RADIUS_FRACTION: f64 = 0.25;

/// Obstacle generation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("At least one obstacle must be requested")]
    ZeroCount,
    #[error("Nominal radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
    #[error("Clearance must be finite and non-negative, got {0}")]
    InvalidClearance(f64),
    #[error("Field must have finite positive dimensions, got {width} x {height}")]
    InvalidField { width: f64, height: f64 },
    #[error("Start and end points must be finite")]
    NonFinitePoint,
    #[error(
        "Field {width} x {height} cannot hold an obstacle of radius {radius} \
         with border margin {margin}"
    )]
    FieldTooSmall {
        width: f64,
        height: f64,
        radius: f64,
        margin: f64,
    },
}

/// Generator tuning constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Radii are drawn uniformly in `[nominal - band, nominal + band)`
    pub radius_band: f64,
    /// Extra gap required between two obstacle boundaries
    pub spacing: f64,
    /// Draw budget per requested obstacle
    pub attempts_per_obstacle: usize,
    /// Distance kept between an obstacle boundary and the field border
    pub border_margin: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            radius_band: 10.0,
            spacing: 25.0,
            attempts_per_obstacle: 50,
            border_margin: 0.0,
        }
    }
}

/// One placement request
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest {
    pub count: usize,
    pub field: Field,
    pub nominal_radius: f64,
    pub start: Vec2,
    pub end: Vec2,
    pub min_clear_start: f64,
    pub min_clear_end: f64,
}

impl PlacementRequest {
    fn validate(&self, config: &GeneratorConfig) -> Result<(), GeneratorError> {
        if self.count == 0 {
            return Err(GeneratorError::ZeroCount);
        }
        if !self.nominal_radius.is_finite() || self.nominal_radius <= 0.0 {
            return Err(GeneratorError::InvalidRadius(self.nominal_radius));
        }
        for clearance in [self.min_clear_start, self.min_clear_end] {
            if !clearance.is_finite() || clearance < 0.0 {
                return Err(GeneratorError::InvalidClearance(clearance));
            }
        }
        if !self.field.is_valid() {
            return Err(GeneratorError::InvalidField {
                width: self.field.width,
                height: self.field.height,
            });
        }
        if !(self.start.x.is_finite() && self.start.y.is_finite())
            || !(self.end.x.is_finite() && self.end.y.is_finite())
        {
            return Err(GeneratorError::NonFinitePoint);
        }

        let (smallest, _) = radius_range(self.nominal_radius, config.radius_band);
        let footprint = 2.0 * (smallest + config.border_margin);
        if footprint > self.field.width || footprint > self.field.height {
            return Err(GeneratorError::FieldTooSmall {
                width: self.field.width,
                height: self.field.height,
                radius: smallest,
                margin: config.border_margin,
            });
        }
        Ok(())
    }
}

/// Bounded-attempt obstacle generator
#[derive(Debug, Clone, Default)]
pub struct ObstacleGenerator {
    config: GeneratorConfig,
}

impl ObstacleGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Place up to `request.count` obstacles
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &PlacementRequest,
    ) -> Result<Vec<Obstacle>, GeneratorError> {
        request.validate(&self.config)?;

        let budget = self.config.attempts_per_obstacle.saturating_mul(request.count);
        let (r_lo, r_hi) = radius_range(request.nominal_radius, self.config.radius_band);
        let mut obstacles: Vec<Obstacle> = Vec::with_capacity(request.count);
        let mut attempts = 0;

        while obstacles.len() < request.count && attempts < budget {
            attempts += 1;

            let radius = if r_hi > r_lo {
                rng.random_range(r_lo..r_hi)
            } else {
                r_lo
            };

            // (a) inside the field with a border margin
            let inset = radius + self.config.border_margin;
            let (x_max, y_max) = (request.field.width - inset, request.field.height - inset);
            if x_max < inset || y_max < inset {
                trace!("[Generator] radius {:.1} does not fit the field", radius);
                continue;
            }
            let center = Vec2::new(
                rng.random_range(inset..=x_max),
                rng.random_range(inset..=y_max),
            );
            let candidate = Obstacle::new(center, radius);

            // (b) clear of start and end
            if (center - request.start).norm() <= radius + request.min_clear_start
                || (center - request.end).norm() <= radius + request.min_clear_end
            {
                trace!(
                    "[Generator] candidate at ({:.1},{:.1}) too close to an endpoint",
                    center.x,
                    center.y
                );
                continue;
            }

            // (c) spaced from every placed obstacle
            let spaced = obstacles.iter().all(|other| {
                (center - other.center).norm() > radius + other.radius + self.config.spacing
            });
            if !spaced {
                trace!(
                    "[Generator] candidate at ({:.1},{:.1}) overlaps a placed obstacle",
                    center.x,
                    center.y
                );
                continue;
            }

            obstacles.push(candidate);
        }

        if obstacles.len() < request.count {
            warn!(
                "[Generator] placed {} of {} obstacles after {} attempts",
                obstacles.len(),
                request.count,
                attempts
            );
        } else {
            debug!(
                "[Generator] placed {} obstacles in {} attempts",
                obstacles.len(),
                attempts
            );
        }

        Ok(obstacles)
    }
}

/// Radius draw interval `[lo, hi)` for a nominal radius and band
fn radius_range(nominal: f64, band: f64) -> (f64, f64) {
    let band = band.abs();
    let lo = (nominal - band).max(nominal * MIN_RADIUS_FRACTION);
    let hi = nominal + band;
    (lo, hi)
}

/// Generate obstacles with a caller-supplied random source
#[allow(clippy::too_many_arguments)]
pub fn generate_obstacles_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    field_width: f64,
    field_height: f64,
    nominal_radius: f64,
    start: Vec2,
    end: Vec2,
    min_clear_start: f64,
    min_clear_end: f64,
) -> Result<Vec<Obstacle>, GeneratorError> {
    let request = PlacementRequest {
        count,
        field: Field::new(field_width, field_height),
        nominal_radius,
        start,
        end,
        min_clear_start,
        min_clear_end,
    };
    ObstacleGenerator::default().generate(rng, &request)
}

/// Generate obstacles with the thread-local random source
#[allow(clippy::too_many_arguments)]
pub fn generate_obstacles(
    count: usize,
    field_width: f64,
    field_height: f64,
    nominal_radius: f64,
    start: Vec2,
    end: Vec2,
    min_clear_start: f64,
    min_clear_end: f64,
) -> Result<Vec<Obstacle>, GeneratorError> {
    generate_obstacles_with_rng(
        &mut rand::rng(),
        count,
        field_width,
        field_height,
        nominal_radius,
        start,
        end,
        min_clear_start,
        min_clear_end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(count: usize) -> PlacementRequest {
        PlacementRequest {
            count,
            field: Field::new(600.0, 400.0),
            nominal_radius: 30.0,
            start: Vec2::new(50.0, 50.0),
            end: Vec2::new(550.0, 350.0),
            min_clear_start: 20.0,
            min_clear_end: 20.0,
        }
    }

    #[test]
    fn test_generated_obstacles_respect_rules() {
        let mut rng = StdRng::seed_from_u64(7);
        let generator = ObstacleGenerator::default();
        let req = request(6);
        let obstacles = generator.generate(&mut rng, &req).unwrap();

        assert!(!obstacles.is_empty());
        assert!(obstacles.len() <= 6);

        for (i, o) in obstacles.iter().enumerate() {
            assert!(o.radius >= 20.0 && o.radius < 40.0, "radius {}", o.radius);
            assert!(req.field.contains_with_margin(&o.center, o.radius));
            assert!((o.center - req.start).norm() > o.radius + req.min_clear_start);
            assert!((o.center - req.end).norm() > o.radius + req.min_clear_end);
            for other in &obstacles[i + 1..] {
                assert!((o.center - other.center).norm() > o.radius + other.radius + 25.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_obstacles() {
        let generator = ObstacleGenerator::default();
        let a = generator.generate(&mut StdRng::seed_from_u64(42), &request(5)).unwrap();
        let b = generator.generate(&mut StdRng::seed_from_u64(42), &request(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_budget_exhaustion_returns_short_list() {
        // Far more obstacles than a small field can hold
        let mut req = request(200);
        req.field = Field::new(200.0, 200.0);
        req.start = Vec2::new(10.0, 10.0);
        req.end = Vec2::new(190.0, 190.0);

        let obstacles = ObstacleGenerator::default()
            .generate(&mut StdRng::seed_from_u64(3), &req)
            .unwrap();
        assert!(obstacles.len() < 200);
    }

    #[test]
    fn test_zero_band_uses_nominal_radius() {
        let generator = ObstacleGenerator::new(GeneratorConfig {
            radius_band: 0.0,
            ..GeneratorConfig::default()
        });
        let obstacles = generator.generate(&mut StdRng::seed_from_u64(1), &request(3)).unwrap();
        assert!(obstacles.iter().all(|o| o.radius == 30.0));
    }

    #[test]
    fn test_invalid_requests_fail_fast() {
        let generator = ObstacleGenerator::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(generator.generate(&mut rng, &request(0)), Err(GeneratorError::ZeroCount));

        let mut req = request(3);
        req.nominal_radius = -5.0;
        assert_eq!(generator.generate(&mut rng, &req), Err(GeneratorError::InvalidRadius(-5.0)));

        let mut req = request(3);
        req.min_clear_end = -1.0;
        assert_eq!(generator.generate(&mut rng, &req), Err(GeneratorError::InvalidClearance(-1.0)));

        let mut req = request(3);
        req.field = Field::new(10.0, 10.0);
        assert!(matches!(
            generator.generate(&mut rng, &req),
            Err(GeneratorError::FieldTooSmall { .. })
        ));

        let mut req = request(3);
        req.start = Vec2::new(f64::INFINITY, 0.0);
        assert_eq!(generator.generate(&mut rng, &req), Err(GeneratorError::NonFinitePoint));
    }
}
