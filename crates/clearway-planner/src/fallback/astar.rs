//! 8-connected A* over an occupancy grid

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use clearway_core::Vec2;

use super::grid::{Cell, OccupancyGrid};

/// A node in the A* search
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: Cell,
    g_cost: f64,
    f_cost: f64,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior: lower f, then lower row, then lower column
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reason for search failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFailure {
    /// Start cell is blocked
    StartBlocked,
    /// End cell is blocked
    EndBlocked,
    /// Goal unreachable through free cells
    NoPath,
}

/// Result of a grid search
#[derive(Debug, Clone, PartialEq)]
pub enum GridPath {
    Found {
        /// Cells from start to goal
        cells: Vec<Cell>,
        /// Cell centers from start to goal
        points: Vec<Vec2>,
        /// Path cost in cell units
        cost: f64,
        nodes_expanded: usize,
    },
    Failed(GridFailure),
}

impl GridPath {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn points(&self) -> Option<&[Vec2]> {
        match self {
            Self::Found { points, .. } => Some(points),
            Self::Failed(_) => None,
        }
    }
}

/// A* pathfinder
pub struct GridPlanner<'a> {
    grid: &'a OccupancyGrid,
}

impl<'a> GridPlanner<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self { grid }
    }

    /// Find a path between the cells containing `start` and `end`
    pub fn find_path(&self, start: &Vec2, end: &Vec2) -> GridPath {
        self.find_path_cells(self.grid.cell_at(start), self.grid.cell_at(end))
    }

    /// Find a path between two cells
    pub fn find_path_cells(&self, start: Cell, goal: Cell) -> GridPath {
        trace!(
            "[AStar] find_path: start=({},{}) goal=({},{})",
            start.row,
            start.col,
            goal.row,
            goal.col
        );

        if !self.grid.is_free(start) {
            debug!("[AStar] FAILED: StartBlocked at ({},{})", start.row, start.col);
            return GridPath::Failed(GridFailure::StartBlocked);
        }
        if !self.grid.is_free(goal) {
            debug!("[AStar] FAILED: EndBlocked at ({},{})", goal.row, goal.col);
            return GridPath::Failed(GridFailure::EndBlocked);
        }

        let size = self.grid.rows() * self.grid.cols();
        let mut g_scores = vec![f64::INFINITY; size];
        let mut came_from: Vec<Option<Cell>> = vec![None; size];
        let mut closed = vec![false; size];
        let mut open_set = BinaryHeap::new();

        g_scores[self.grid.index(start)] = 0.0;
        open_set.push(SearchNode {
            cell: start,
            g_cost: 0.0,
            f_cost: heuristic(start, goal),
        });

        let mut nodes_expanded = 0;

        while let Some(current) = open_set.pop() {
            let current_idx = self.grid.index(current.cell);
            if closed[current_idx] {
                continue;
            }
            closed[current_idx] = true;
            nodes_expanded += 1;

            if current.cell == goal {
                return self.reconstruct_path(&came_from, goal, current.g_cost, nodes_expanded);
            }

            for (neighbor, step) in self.grid.neighbors(current.cell) {
                let idx = self.grid.index(neighbor);
                if closed[idx] || !self.grid.is_free(neighbor) {
                    continue;
                }
                let tentative_g = current.g_cost + step;
                if tentative_g < g_scores[idx] {
                    g_scores[idx] = tentative_g;
                    came_from[idx] = Some(current.cell);
                    open_set.push(SearchNode {
                        cell: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + heuristic(neighbor, goal),
                    });
                }
            }
        }

        debug!("[AStar] FAILED: NoPath after expanding {} nodes", nodes_expanded);
        GridPath::Failed(GridFailure::NoPath)
    }

    fn reconstruct_path(
        &self,
        came_from: &[Option<Cell>],
        goal: Cell,
        cost: f64,
        nodes_expanded: usize,
    ) -> GridPath {
        let mut cells = vec![goal];
        let mut current = goal;
        while let Some(prev) = came_from[self.grid.index(current)] {
            cells.push(prev);
            current = prev;
        }
        cells.reverse();

        let points = cells.iter().map(|c| self.grid.center(*c)).collect();
        debug!(
            "[AStar] SUCCESS: {} cells, cost {:.2}, {} nodes expanded",
            cells.len(),
            cost,
            nodes_expanded
        );

        GridPath::Found {
            cells,
            points,
            cost,
            nodes_expanded,
        }
    }
}

/// Euclidean distance in cell units
fn heuristic(from: Cell, to: Cell) -> f64 {
    let dr = from.row as f64 - to.row as f64;
    let dc = from.col as f64 - to.col as f64;
    dr.hypot(dc)
}
