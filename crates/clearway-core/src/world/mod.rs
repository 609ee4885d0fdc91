//! Planning world: field geometry and circular obstacles
//!
//! - [`field`]: Rectangular field `[0, W] × [0, H]`
//! - [`obstacle`]: Circular obstacle with clearance queries
//! - [`generator`]: Randomized obstacle placement with spacing guarantees

pub mod field;
pub mod obstacle;
pub mod generator;

pub use field::Field;
pub use obstacle::Obstacle;
pub use generator::{
    generate_obstacles, generate_obstacles_with_rng, GeneratorConfig, GeneratorError,
    ObstacleGenerator, PlacementRequest,
};
