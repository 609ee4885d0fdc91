//! Canned planning scenarios
//!
//! Fixed fields used by the integration tests and the demo, plus seeded
//! random fields built with the obstacle generator.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;

use clearway_core::world::{ObstacleGenerator, PlacementRequest};
use clearway_core::{Field, GeneratorError, Obstacle, Vec2};

use crate::controller::PlanRequest;

/// Nominal obstacle radius of generated fields
pub const NOMINAL_RADIUS: f64 = 30.0;
/// Keep-out distance around start and end for generated fields
pub const ENDPOINT_CLEARANCE: f64 = 40.0;

/// One planning query with a name
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub start: Vec2,
    pub end: Vec2,
    pub obstacles: Vec<Obstacle>,
    pub field: Field,
}

impl Scenario {
    pub fn request(&self) -> PlanRequest {
        PlanRequest {
            start: self.start,
            end: self.end,
            obstacles: self.obstacles.clone(),
            field: self.field,
        }
    }
}

/// Diagonal across an empty field; the optimal length is ≈583.1
pub fn open_field() -> Scenario {
    Scenario {
        name: "open_field".to_string(),
        start: Vec2::new(50.0, 50.0),
        end: Vec2::new(550.0, 350.0),
        obstacles: Vec::new(),
        field: Field::default(),
    }
}

/// One obstacle centered on the straight line's midpoint
pub fn blocked_midpoint() -> Scenario {
    Scenario {
        name: "blocked_midpoint".to_string(),
        obstacles: vec![Obstacle::new(Vec2::new(300.0, 200.0), 30.0)],
        ..open_field()
    }
}

/// One obstacle overlapping the straight line off-center
pub fn offset_obstacle() -> Scenario {
    Scenario {
        name: "offset_obstacle".to_string(),
        start: Vec2::new(50.0, 200.0),
        end: Vec2::new(550.0, 200.0),
        obstacles: vec![Obstacle::new(Vec2::new(300.0, 180.0), 30.0)],
        field: Field::default(),
    }
}

/// End point sealed inside a ring of overlapping obstacles
pub fn walled_goal() -> Scenario {
    let end = Vec2::new(500.0, 200.0);
    let ring = 12;
    let obstacles = (0..ring)
        .map(|k| {
            let angle = 2.0 * PI * k as f64 / ring as f64;
            Obstacle::new(end + Vec2::new(angle.cos(), angle.sin()) * 70.0, 25.0)
        })
        .collect();

    Scenario {
        name: "walled_goal".to_string(),
        start: Vec2::new(100.0, 200.0),
        end,
        obstacles,
        field: Field::default(),
    }
}

/// Generated field with up to `count` obstacles, reproducible from `seed`
pub fn random_field(seed: u64, count: usize) -> Result<Scenario, GeneratorError> {
    let base = open_field();
    let request = PlacementRequest {
        count,
        field: base.field,
        nominal_radius: NOMINAL_RADIUS,
        start: base.start,
        end: base.end,
        min_clear_start: ENDPOINT_CLEARANCE,
        min_clear_end: ENDPOINT_CLEARANCE,
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let obstacles = ObstacleGenerator::default().generate(&mut rng, &request)?;

    Ok(Scenario {
        name: format!("random_field_{}_{}", seed, count),
        obstacles,
        ..base
    })
}
