//! Planning Demonstration
//!
//! Plans every canned scenario plus a few seeded random fields and prints
//! the outcome together with the log row of each call.
//!
//! Run with `RUST_LOG=debug` to follow the planner's state transitions.
//! An optional first argument names a YAML planner configuration.

use std::path::Path;

use clearway_planner::scenarios::{self, Scenario};
use clearway_planner::{PathPlanner, PlannerConfig, PlanningRecord};

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match PlannerConfig::from_yaml_file(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => PlannerConfig::default(),
    };

    let planner = match PathPlanner::new(config) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Invalid planner configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Clearway Planning Demonstration ===\n");

    let mut all: Vec<Scenario> = vec![
        scenarios::open_field(),
        scenarios::blocked_midpoint(),
        scenarios::offset_obstacle(),
        scenarios::walled_goal(),
    ];
    for seed in 1..=3 {
        match scenarios::random_field(seed, 6) {
            Ok(scenario) => all.push(scenario),
            Err(e) => eprintln!("Skipping random field {}: {}", seed, e),
        }
    }

    println!("{}", PlanningRecord::csv_header());
    for scenario in &all {
        match planner.plan(&scenario.request()) {
            Ok(result) => {
                let record = PlanningRecord::new(
                    &scenario.start,
                    &scenario.end,
                    scenario.obstacles.len(),
                    &result,
                );
                println!(
                    "{}  # {} via {:?}, {} points, {} solver iterations",
                    record.to_csv_row(),
                    scenario.name,
                    result.source,
                    result.path.len(),
                    result.statistics.iterations
                );
            }
            Err(e) => println!("# {}: {}", scenario.name, e),
        }
    }
}
