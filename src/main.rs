//! Demo scenario: a patrol ship chases a drifting beacon through an asteroid field
//!
//! Usage: `steerpath [config.ron | config.json]`

use std::f32::consts::TAU;
use std::sync::Arc;

use steerpath::prelude::*;

const TICK: f32 = 1.0 / 30.0;
const TICKS: usize = 900;
const REPORT_EVERY: usize = 90;

fn load_config() -> Result<NavConfig, ConfigError> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(NavConfig::default().with_grid(
            GridConfig::default()
                .with_region(Vec2::ZERO, Vec2::new(60.0, 40.0))
                .with_cell_radius(1.0),
        ));
    };

    if path.ends_with(".json") {
        NavConfig::load_json(&path)
    } else {
        NavConfig::load_ron(&path)
    }
}

/// Deterministic asteroid belt plus a station wall splitting the map
fn asteroid_field() -> ObstacleField {
    let mut field = ObstacleField::new();
    for i in 0..14 {
        let angle = i as f32 / 14.0 * TAU;
        let radius = 1.0 + (i % 3) as f32 * 0.6;
        field.add(Obstacle::circle(
            Vec2::new(angle.cos() * 12.0, angle.sin() * 9.0),
            radius,
        ));
    }
    field.add(Obstacle::rect(Vec2::new(-1.0, -20.0), Vec2::new(1.0, 4.0)));
    field
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let field = asteroid_field();

    let grid = OccupancyGrid::build(&config.grid, &field)?;
    log::info!(
        "Built {}x{} grid with {} blocked cells from {} obstacles",
        grid.columns(),
        grid.rows(),
        grid.obstacle_count(),
        field.len()
    );
    log::debug!("\n{grid}");

    let planner = PathPlanner::new(Arc::new(grid), config.planner);
    let controller = SteeringController::new(
        planner,
        LocalAvoidance::new(config.avoidance),
        config.steering,
    );

    let mut world = World::new();
    let beacon = world.spawn_body("beacon", AgentPose::new(Vec2::new(20.0, 0.0), 0.0));
    let patrol = world.spawn_chaser("patrol", AgentPose::new(Vec2::new(-22.0, -12.0), 0.0), beacon);
    let scout = world.spawn_agent(
        "scout",
        AgentPose::new(Vec2::new(-20.0, 14.0), 0.0),
        Vec2::new(22.0, -14.0),
    );

    for tick in 0..TICKS {
        let time = tick as f32 * TICK;
        if let Some(pose) = world.pose_mut(beacon) {
            pose.position = Vec2::new(20.0 + (time * 0.3).sin() * 4.0, (time * 0.2).cos() * 12.0);
        }

        world.step(&controller, &field, TICK);

        if tick % REPORT_EVERY == 0 {
            for (entity, label) in [(patrol, "patrol"), (scout, "scout")] {
                let (Some(pose), Some(agent)) = (world.pose(entity), world.agent(entity)) else {
                    continue;
                };
                log::info!(
                    "[{time:5.1}s] {label}: {} at ({:.1}, {:.1}) speed {:.1}",
                    agent.state(),
                    pose.position.x,
                    pose.position.y,
                    pose.speed
                );
            }
            log::info!("{}", world.stats.format_stats());
        }
    }

    if let (Some(patrol_pose), Some(beacon_pose)) = (world.pose(patrol), world.pose(beacon)) {
        log::info!(
            "Patrol finished {:.1} units from the beacon",
            patrol_pose.position.distance(beacon_pose.position)
        );
    }
    log::info!("{}", world.stats.format_stats());

    Ok(())
}
