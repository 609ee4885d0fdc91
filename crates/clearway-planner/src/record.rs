//! Planning log records
//!
//! One row per planning call, in the column order consumed by downstream
//! cost-prediction tooling. Writing the rows out is left to the caller.

use serde::{Deserialize, Serialize};

use clearway_core::Vec2;

use crate::trajectory::PlanningResult;

/// Summary of one planning call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRecord {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub num_obstacles: usize,
    /// Final path length
    pub cost: f64,
    pub lambda_avg: f64,
}

impl PlanningRecord {
    /// Column names in row order
    pub const FIELDS: [&'static str; 7] = [
        "start_x",
        "start_y",
        "end_x",
        "end_y",
        "num_obstacles",
        "cost",
        "lambda_avg",
    ];

    pub fn new(start: &Vec2, end: &Vec2, num_obstacles: usize, result: &PlanningResult) -> Self {
        Self {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            num_obstacles,
            cost: result.length,
            lambda_avg: result.lambda_avg,
        }
    }

    /// Header-less CSV line; `cost` rounded to 2 decimals, `lambda_avg` to 4
    pub fn to_csv_row(&self) -> String {
        format!(
            "{:?},{:?},{:?},{:?},{},{:?},{:?}",
            self.start_x,
            self.start_y,
            self.end_x,
            self.end_y,
            self.num_obstacles,
            round_to(self.cost, 2),
            round_to(self.lambda_avg, 4),
        )
    }

    /// Header line matching [`Self::FIELDS`]
    pub fn csv_header() -> String {
        Self::FIELDS.join(",")
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
