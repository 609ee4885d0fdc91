//! Inflated occupancy grid

use clearway_core::world::obstacle::min_signed_clearance;
use clearway_core::{Field, Obstacle, Vec2};

use super::FallbackError;

/// Largest grid the fallback will allocate (2000 × 2000 cells)
pub const MAX_CELLS: usize = 4_000_000;

/// Grid cell index
///
/// Ordered by row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Boolean free/blocked matrix over a uniform tessellation of the field
///
/// A cell is free iff its center lies strictly farther than
/// `radius + clearance` from every obstacle center.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cell_size: f64,
    rows: usize,
    cols: usize,
    /// Row-major
    free: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(
        obstacles: &[Obstacle],
        field: &Field,
        cell_size: f64,
        clearance: f64,
    ) -> Result<Self, FallbackError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(FallbackError::InvalidCellSize(cell_size));
        }
        if !field.is_valid() {
            return Err(FallbackError::InvalidField {
                width: field.width,
                height: field.height,
            });
        }

        let cols = ((field.width / cell_size).ceil() as usize).max(1);
        let rows = ((field.height / cell_size).ceil() as usize).max(1);
        if rows.saturating_mul(cols) > MAX_CELLS {
            return Err(FallbackError::TooManyCells {
                rows,
                cols,
                limit: MAX_CELLS,
            });
        }

        let mut free = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let center = cell_center(cell_size, Cell::new(row, col));
                free.push(min_signed_clearance(obstacles, &center, clearance) > 0.0);
            }
        }

        Ok(Self {
            cell_size,
            rows,
            cols,
            free,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Whether the cell is inside the grid and free
    pub fn is_free(&self, cell: Cell) -> bool {
        self.contains(cell) && self.free[self.index(cell)]
    }

    pub fn free_count(&self) -> usize {
        self.free.iter().filter(|f| **f).count()
    }

    pub fn center(&self, cell: Cell) -> Vec2 {
        cell_center(self.cell_size, cell)
    }

    /// Cell containing `p`, clamped into the grid
    pub fn cell_at(&self, p: &Vec2) -> Cell {
        let axis = |v: f64, count: usize| {
            let i = (v / self.cell_size).floor();
            if i.is_nan() || i < 0.0 {
                0
            } else {
                (i as usize).min(count - 1)
            }
        };
        Cell::new(axis(p.y, self.rows), axis(p.x, self.cols))
    }

    /// In-grid 8-neighbours with their step cost (1 or √2)
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = (Cell, f64)> + '_ {
        const OFFSETS: [(isize, isize); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1),
        ];
        OFFSETS.into_iter().filter_map(move |(dr, dc)| {
            let row = cell.row.checked_add_signed(dr)?;
            let col = cell.col.checked_add_signed(dc)?;
            let next = Cell::new(row, col);
            if !self.contains(next) {
                return None;
            }
            let cost = if dr != 0 && dc != 0 { std::f64::consts::SQRT_2 } else { 1.0 };
            Some((next, cost))
        })
    }
}

fn cell_center(cell_size: f64, cell: Cell) -> Vec2 {
    Vec2::new((cell.col as f64 + 0.5) * cell_size, (cell.row as f64 + 0.5) * cell_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_round_up() {
        let grid = OccupancyGrid::new(&[], &Field::new(605.0, 400.0), 10.0, 20.0).unwrap();
        assert_eq!(grid.cols(), 61);
        assert_eq!(grid.rows(), 40);
        assert_eq!(grid.free_count(), 61 * 40);
    }

    #[test]
    fn test_cell_centers_and_lookup() {
        let grid = OccupancyGrid::new(&[], &Field::new(100.0, 50.0), 10.0, 0.0).unwrap();

        assert_eq!(grid.center(Cell::new(2, 3)), Vec2::new(35.0, 25.0));
        assert_eq!(grid.cell_at(&Vec2::new(35.0, 25.0)), Cell::new(2, 3));
        // Far border and outside points clamp
        assert_eq!(grid.cell_at(&Vec2::new(100.0, 50.0)), Cell::new(4, 9));
        assert_eq!(grid.cell_at(&Vec2::new(-5.0, 200.0)), Cell::new(4, 0));
    }

    #[test]
    fn test_inflated_obstacle_blocks_cells() {
        let obstacles = [Obstacle::new(Vec2::new(50.0, 50.0), 10.0)];
        let grid = OccupancyGrid::new(&obstacles, &Field::new(100.0, 100.0), 10.0, 10.0).unwrap();

        assert!(!grid.is_free(grid.cell_at(&Vec2::new(50.0, 50.0))));
        // Center (65, 55) is ≈15.8 from the obstacle center, inside r + clearance = 20
        assert!(!grid.is_free(Cell::new(5, 6)));
        // Center (75, 55) is ≈25.5 away
        assert!(grid.is_free(Cell::new(5, 7)));
    }

    #[test]
    fn test_neighbors_at_corner() {
        let grid = OccupancyGrid::new(&[], &Field::new(30.0, 30.0), 10.0, 0.0).unwrap();
        let around: Vec<(Cell, f64)> = grid.neighbors(Cell::new(0, 0)).collect();

        assert_eq!(around.len(), 3);
        assert!(around.contains(&(Cell::new(1, 1), std::f64::consts::SQRT_2)));
        assert_eq!(grid.neighbors(Cell::new(1, 1)).count(), 8);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            OccupancyGrid::new(&[], &Field::new(10.0, 10.0), 0.0, 0.0),
            Err(FallbackError::InvalidCellSize(_))
        ));
        assert!(matches!(
            OccupancyGrid::new(&[], &Field::new(-1.0, 10.0), 1.0, 0.0),
            Err(FallbackError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_oversized_field_is_rejected() {
        let result = OccupancyGrid::new(&[], &Field::new(1e7, 1e7), 10.0, 20.0);
        assert!(matches!(
            result,
            Err(FallbackError::TooManyCells {
                rows: 1_000_000,
                cols: 1_000_000,
                limit: MAX_CELLS
            })
        ));

        // Exactly at the limit still fits
        assert!(OccupancyGrid::new(&[], &Field::new(20_000.0, 20_000.0), 10.0, 20.0).is_ok());
    }
}
