//! # Clearway Core
//!
//! Value-level building blocks for planning clearance-aware paths through a
//! planar field of circular obstacles.
//!
//! ## Modules
//!
//! - [`math`]: Polyline utilities (length, lateral deviation, segment distance)
//! - [`world`]: Field geometry, the circular obstacle model and the obstacle generator
//! - [`curve`]: Interpolating spline fit through a control polygon with a
//!   straight-line degradation path

pub mod math;
pub mod world;
pub mod curve;

use nalgebra::Vector2;

/// 2D vector type used for every point in the plane
pub type Vec2 = Vector2<f64>;

pub use curve::{fit_curve, straight_sample, CurveFit};
pub use world::{
    generate_obstacles, generate_obstacles_with_rng, Field, GeneratorConfig, GeneratorError,
    Obstacle,
};
