//! End-to-end planning properties
//!
//! Safety, determinism and graceful degradation of the full pipeline
//! (optimizer, validation, grid fallback) on canned and seeded fields.

use approx::assert_relative_eq;

use clearway_core::math::max_lateral_deviation;
use clearway_core::{Field, Obstacle, Vec2};
use clearway_planner::config::FallbackConfig;
use clearway_planner::constraints::validate_samples;
use clearway_planner::fallback::{plan_on_grid, GridFailure, GridPath, GridPlanner, OccupancyGrid};
use clearway_planner::scenarios;
use clearway_planner::{
    plan_path, PathPlanner, PathSource, PlanRequest, PlannerConfig, PlannerError, PlanningRecord,
    PlanningResult,
};

const CLEARANCE: f64 = 20.0;

fn planner() -> PathPlanner {
    PathPlanner::new(PlannerConfig::default()).unwrap()
}

fn assert_path_clear(result: &PlanningResult, obstacles: &[Obstacle]) {
    for p in &result.path {
        for o in obstacles {
            let d = (p - o.center).norm();
            assert!(
                d > o.radius + CLEARANCE,
                "point ({:.2},{:.2}) is {:.2} from obstacle at ({:.1},{:.1}) r={:.1}",
                p.x,
                p.y,
                d,
                o.center.x,
                o.center.y,
                o.radius
            );
        }
    }
}

/// Every returned path keeps the clearance
mod safety_tests {
    use super::*;

    #[test]
    fn test_random_fields_are_safe_or_rejected() {
        let planner = planner();
        for seed in 0..8 {
            let scenario = scenarios::random_field(seed, 5).unwrap();
            match planner.plan(&scenario.request()) {
                Ok(result) => {
                    assert!(result.safe, "{} returned an unsafe path", scenario.name);
                    assert_path_clear(&result, &scenario.obstacles);
                    assert!(result.length.is_finite());
                }
                Err(PlannerError::NoFeasiblePath(_)) => {}
                Err(other) => panic!("{}: unexpected error {}", scenario.name, other),
            }
        }
    }

    #[test]
    fn test_offset_obstacle_is_avoided() {
        let scenario = scenarios::offset_obstacle();
        let result = planner().plan(&scenario.request()).unwrap();

        assert!(result.safe);
        assert_path_clear(&result, &scenario.obstacles);
    }
}

/// Canned scenarios with known outcomes
mod scenario_tests {
    use super::*;

    #[test]
    fn test_open_field_length() {
        let scenario = scenarios::open_field();
        let result = planner().plan(&scenario.request()).unwrap();

        assert_eq!(result.source, PathSource::Continuous);
        // sqrt(500² + 300²)
        assert_relative_eq!(result.length, 583.095, epsilon = 0.05);
    }

    #[test]
    fn test_blocked_midpoint_detours() {
        let scenario = scenarios::blocked_midpoint();
        let obstacle = scenario.obstacles[0];
        let result = planner().plan(&scenario.request()).unwrap();

        assert!(result.safe);
        assert_eq!(result.source, PathSource::Continuous);
        assert_path_clear(&result, &scenario.obstacles);

        let deviation = max_lateral_deviation(&result.path, &scenario.start, &scenario.end);
        assert!(deviation > obstacle.radius + CLEARANCE, "lateral deviation {:.2}", deviation);
    }

    #[test]
    fn test_blocked_midpoint_grid_detours() {
        let scenario = scenarios::blocked_midpoint();
        let obstacle = scenario.obstacles[0];

        for shortcut in [false, true] {
            let config = FallbackConfig {
                shortcut,
                ..FallbackConfig::default()
            };
            let path = plan_on_grid(
                &scenario.start,
                &scenario.end,
                &scenario.obstacles,
                &scenario.field,
                CLEARANCE,
                &config,
            )
            .unwrap();

            let points = path.points().unwrap();
            assert!(validate_samples(points, &scenario.obstacles, CLEARANCE).all_satisfied);
            let deviation = max_lateral_deviation(points, &scenario.start, &scenario.end);
            assert!(
                deviation > obstacle.radius + CLEARANCE,
                "shortcut {}: lateral deviation {:.2}",
                shortcut,
                deviation
            );
        }
    }

    #[test]
    fn test_continuous_endpoints_exact() {
        let scenario = scenarios::offset_obstacle();
        let result = planner().plan(&scenario.request()).unwrap();

        if result.source == PathSource::Continuous {
            let first = result.path[0];
            let last = result.path[result.path.len() - 1];
            assert_relative_eq!((first - scenario.start).norm(), 0.0, epsilon = 1e-6);
            assert_relative_eq!((last - scenario.end).norm(), 0.0, epsilon = 1e-6);
        }
    }
}

/// Blocking corridors never panics
mod degradation_tests {
    use super::*;

    #[test]
    fn test_walled_goal_reports_no_path() {
        let result = planner().plan(&scenarios::walled_goal().request());
        assert!(matches!(result, Err(PlannerError::NoFeasiblePath(GridFailure::NoPath))));
    }

    #[test]
    fn test_full_wall_reports_no_path() {
        // Column of touching obstacles from the bottom to the top border
        let obstacles: Vec<Obstacle> = (0..11)
            .map(|i| Obstacle::new(Vec2::new(300.0, i as f64 * 40.0), 20.0))
            .collect();
        let request = PlanRequest {
            start: Vec2::new(50.0, 200.0),
            end: Vec2::new(550.0, 200.0),
            obstacles,
            field: Field::new(600.0, 400.0),
        };

        assert!(matches!(
            planner().plan(&request),
            Err(PlannerError::NoFeasiblePath(GridFailure::NoPath))
        ));
    }

    #[test]
    fn test_shared_cell_fallback_has_two_points() {
        // Start is inside the clearance band, but the cell center (15, 15) is clear
        let start = Vec2::new(11.0, 11.0);
        let end = Vec2::new(19.0, 18.0);
        let obstacles = vec![Obstacle::new(Vec2::new(0.0, -10.0), 5.0)];

        let result =
            plan_path(start, end, &obstacles, (600.0, 400.0), 8, 0.1, 0.01, CLEARANCE).unwrap();

        assert_eq!(result.source, PathSource::Fallback);
        assert!(result.safe);
        assert_eq!(result.path, vec![Vec2::new(15.0, 15.0), Vec2::new(15.0, 15.0)]);
        assert_eq!(result.length, 0.0);
    }

    #[test]
    fn test_start_cell_occupied() {
        let start = Vec2::new(50.0, 50.0);
        let end = Vec2::new(550.0, 350.0);
        let obstacles = vec![Obstacle::new(Vec2::new(60.0, 60.0), 5.0)];

        let field = Field::new(600.0, 400.0);
        let grid = OccupancyGrid::new(&obstacles, &field, 10.0, CLEARANCE).unwrap();
        assert_eq!(
            GridPlanner::new(&grid).find_path(&start, &end),
            GridPath::Failed(GridFailure::StartBlocked)
        );

        let result = plan_path(start, end, &obstacles, (600.0, 400.0), 8, 0.1, 0.01, CLEARANCE);
        assert!(matches!(
            result,
            Err(PlannerError::NoFeasiblePath(GridFailure::StartBlocked))
        ));
    }
}

/// Identical inputs give identical outputs
mod determinism_tests {
    use super::*;

    #[test]
    fn test_fallback_is_deterministic() {
        let scenario = scenarios::blocked_midpoint();
        let grid =
            OccupancyGrid::new(&scenario.obstacles, &scenario.field, 10.0, CLEARANCE).unwrap();
        let planner = GridPlanner::new(&grid);

        let a = planner.find_path(&scenario.start, &scenario.end);
        let b = planner.find_path(&scenario.start, &scenario.end);
        assert!(a.is_found());
        assert_eq!(a, b);
    }

    #[test]
    fn test_planning_is_deterministic() {
        let scenario = scenarios::random_field(3, 5).unwrap();
        let planner = planner();

        let a = planner.plan(&scenario.request());
        let b = planner.plan(&scenario.request());
        match (a, b) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.path, b.path);
                assert_eq!(a.source, b.source);
            }
            (Err(_), Err(_)) => {}
            _ => panic!("outcomes differ between identical calls"),
        }
    }
}

/// Log rows built from real results
mod record_tests {
    use super::*;

    #[test]
    fn test_record_from_plan() {
        let scenario = scenarios::open_field();
        let result = planner().plan(&scenario.request()).unwrap();
        let count = scenario.obstacles.len();
        let record = PlanningRecord::new(&scenario.start, &scenario.end, count, &result);

        assert_eq!(record.num_obstacles, 0);
        assert_eq!(record.lambda_avg, 0.1);
        let row = record.to_csv_row();
        assert!(row.starts_with("50.0,50.0,550.0,350.0,0,583."), "row {}", row);
        assert_eq!(row.split(',').count(), PlanningRecord::FIELDS.len());
    }
}

/// YAML configuration drives the planner
mod config_tests {
    use super::*;

    #[test]
    fn test_config_file_round_trip() {
        let mut config = PlannerConfig::default();
        config.solver.num_controls = 5;
        config.fallback.shortcut = true;

        let file_name = format!("clearway_config_{}.yaml", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        let loaded = PlannerConfig::from_yaml_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.solver.num_controls, 5);
        assert!(loaded.fallback.shortcut);
        assert!(PathPlanner::new(loaded).is_ok());
    }
}
