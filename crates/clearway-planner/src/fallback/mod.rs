//! Discrete fallback planner
//!
//! Used when the optimized curve fails validation:
//! - [`grid`]: Occupancy grid with obstacles inflated by the clearance
//! - [`astar`]: 8-connected A* with a deterministic tie-break
//! - [`smoothing`]: Optional line-of-sight shortcutting

pub mod astar;
pub mod grid;
pub mod smoothing;

use thiserror::Error;

use clearway_core::{Field, Obstacle, Vec2};

pub use astar::{GridFailure, GridPath, GridPlanner};
pub use grid::{Cell, OccupancyGrid};
pub use smoothing::smooth_los;

use crate::config::FallbackConfig;

/// Fallback setup errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FallbackError {
    #[error("Cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),
    #[error("Field must have finite positive dimensions, got {width} x {height}")]
    InvalidField { width: f64, height: f64 },
    #[error("Grid of {rows} x {cols} cells exceeds the limit of {limit}")]
    TooManyCells { rows: usize, cols: usize, limit: usize },
}

/// Build the grid, search it and optionally shortcut the result
pub fn plan_on_grid(
    start: &Vec2,
    end: &Vec2,
    obstacles: &[Obstacle],
    field: &Field,
    clearance: f64,
    config: &FallbackConfig,
) -> Result<GridPath, FallbackError> {
    let grid = OccupancyGrid::new(obstacles, field, config.cell_size, clearance)?;
    let path = GridPlanner::new(&grid).find_path(start, end);

    Ok(match path {
        GridPath::Found {
            cells,
            points,
            cost,
            nodes_expanded,
        } if config.shortcut => GridPath::Found {
            points: smooth_los(&points, obstacles, clearance),
            cells,
            cost,
            nodes_expanded,
        },
        other => other,
    })
}
