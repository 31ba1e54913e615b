//! Path following and steering for AI agents
//!
//! Turns the current path waypoint (or an avoidance detour) into per-tick
//! heading and speed commands, advances waypoints on arrival, and schedules
//! re-plans on a timer that shortens as the agent closes in on its target.

use std::f32::consts::{PI, TAU};
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::avoidance::LocalAvoidance;
use super::pathfinding::{Path, PathPlanner, SearchReport, SearchStatus};
use crate::physics::ObstacleQuery;

/// Steering tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// A waypoint counts as reached inside this distance
    pub arrival_radius: f32,
    /// Largest heading error (radians) at which thrust is applied
    pub facing_tolerance: f32,
    /// Turn rate cap in radians per second
    pub max_turn_rate: f32,
    /// Forward speed cap
    pub max_speed: f32,
    /// Speed change per second, used for both thrust and braking
    pub acceleration: f32,
    /// Re-plan interval is `distance to target / replan_distance_per_second`
    pub replan_distance_per_second: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 0.75,
            facing_tolerance: 0.35,
            max_turn_rate: PI,
            max_speed: 5.0,
            acceleration: 10.0,
            replan_distance_per_second: 10.0,
        }
    }
}

impl SteeringConfig {
    /// Set the waypoint arrival radius
    #[must_use]
    pub fn with_arrival_radius(mut self, arrival_radius: f32) -> Self {
        self.arrival_radius = arrival_radius;
        self
    }

    /// Set the facing tolerance in radians
    #[must_use]
    pub fn with_facing_tolerance(mut self, facing_tolerance: f32) -> Self {
        self.facing_tolerance = facing_tolerance;
        self
    }

    /// Set the turn rate cap in radians per second
    #[must_use]
    pub fn with_max_turn_rate(mut self, max_turn_rate: f32) -> Self {
        self.max_turn_rate = max_turn_rate;
        self
    }

    /// Set speed cap and acceleration
    #[must_use]
    pub fn with_speed(mut self, max_speed: f32, acceleration: f32) -> Self {
        self.max_speed = max_speed;
        self.acceleration = acceleration;
        self
    }

    /// Set the re-plan distance divisor
    #[must_use]
    pub fn with_replan_distance_per_second(mut self, replan_distance_per_second: f32) -> Self {
        self.replan_distance_per_second = replan_distance_per_second;
        self
    }
}

/// Navigation state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavState {
    /// No target, or no path to it
    #[default]
    Idle,
    /// Steering toward path waypoints
    FollowingPath,
    /// Steering toward an avoidance detour
    Avoiding,
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FollowingPath => "following path",
            Self::Avoiding => "avoiding",
        };
        f.write_str(name)
    }
}

/// Agent kinematics
///
/// Heading is in radians, counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentPose {
    /// World position
    pub position: Vec2,
    /// Facing angle in radians
    pub heading: f32,
    /// Forward speed in units per second
    pub speed: f32,
}

impl AgentPose {
    /// Create a stationary pose
    #[must_use]
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
        }
    }

    /// Unit vector along the heading
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Apply a steering command over `dt` seconds
    pub fn integrate(&mut self, output: &SteeringOutput, dt: f32) {
        self.heading = wrap_angle(self.heading + output.heading_delta);
        self.speed = output.speed;
        self.position += self.forward() * self.speed * dt;
    }
}

/// Per-agent navigation state
#[derive(Debug, Clone, Default)]
pub struct NavAgent {
    target: Option<Vec2>,
    path: Option<Path>,
    waypoint_index: usize,
    replan_timer: f32,
    avoidance_override: Option<Vec2>,
    state: NavState,
    replan_requested: bool,
}

impl NavAgent {
    /// Create an idle agent with no target
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an agent already heading for `target`
    #[must_use]
    pub fn with_target(target: Vec2) -> Self {
        let mut agent = Self::new();
        agent.set_target(target);
        agent
    }

    /// Assign a target
    ///
    /// A first assignment plans on the next tick. Moving an existing target
    /// is picked up by the re-plan timer.
    pub fn set_target(&mut self, target: Vec2) {
        if self.target.is_none() {
            self.replan_requested = true;
        }
        self.target = Some(target);
    }

    /// Drop the target and the current path
    pub fn clear_target(&mut self) {
        self.target = None;
        self.path = None;
        self.waypoint_index = 0;
        self.avoidance_override = None;
        self.replan_requested = false;
    }

    /// Plan on the next tick regardless of the timer
    pub fn request_replan(&mut self) {
        self.replan_requested = true;
    }

    /// Current target
    #[must_use]
    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Current path
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Index of the waypoint being steered toward
    #[must_use]
    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Waypoint being steered toward, `None` once the path is exhausted
    #[must_use]
    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.path.as_ref()?.get(self.waypoint_index)
    }

    /// Seconds since the last plan attempt
    #[must_use]
    pub fn replan_timer(&self) -> f32 {
        self.replan_timer
    }

    /// Active avoidance detour
    #[must_use]
    pub fn avoidance_override(&self) -> Option<Vec2> {
        self.avoidance_override
    }

    /// Navigation state
    #[must_use]
    pub fn state(&self) -> NavState {
        self.state
    }

    fn path_exhausted(&self) -> bool {
        self.path
            .as_ref()
            .is_some_and(|path| self.waypoint_index >= path.len())
    }
}

/// Summary of a plan attempt made during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplanReport {
    /// How the search ended
    pub status: SearchStatus,
    /// Nodes closed by the search
    pub nodes_expanded: usize,
    /// Waypoints in the new path, zero when none was found
    pub waypoints: usize,
}

impl From<&SearchReport> for ReplanReport {
    fn from(report: &SearchReport) -> Self {
        Self {
            status: report.status,
            nodes_expanded: report.nodes_expanded,
            waypoints: report.path.as_ref().map_or(0, Path::len),
        }
    }
}

/// Motion command for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringOutput {
    /// Heading change this tick in radians
    pub heading_delta: f32,
    /// Forward speed to hold this tick
    pub speed: f32,
    /// Plan attempt made this tick, if any
    pub replan: Option<ReplanReport>,
}

impl SteeringOutput {
    fn coast(speed: f32, replan: Option<ReplanReport>) -> Self {
        Self {
            heading_delta: 0.0,
            speed,
            replan,
        }
    }
}

/// Drives agents along planned paths
#[derive(Debug, Clone)]
pub struct SteeringController {
    planner: PathPlanner,
    avoidance: LocalAvoidance,
    config: SteeringConfig,
}

impl SteeringController {
    /// Create a controller
    #[must_use]
    pub fn new(planner: PathPlanner, avoidance: LocalAvoidance, config: SteeringConfig) -> Self {
        Self {
            planner,
            avoidance,
            config,
        }
    }

    /// The planner used for re-plans
    #[must_use]
    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    /// The local avoidance layer
    #[must_use]
    pub fn avoidance(&self) -> &LocalAvoidance {
        &self.avoidance
    }

    /// Steering tuning
    #[must_use]
    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Advance one agent by `dt` seconds
    pub fn advance<Q: ObstacleQuery + ?Sized>(
        &self,
        agent: &mut NavAgent,
        pose: &AgentPose,
        dt: f32,
        query: &Q,
    ) -> SteeringOutput {
        let Some(target) = agent.target else {
            agent.state = NavState::Idle;
            agent.avoidance_override = None;
            return SteeringOutput::coast(self.brake(pose.speed, dt), None);
        };

        agent.replan_timer += dt;
        let replan = if self.should_replan(agent, pose.position, target) {
            Some(self.replan(agent, pose.position, target))
        } else {
            None
        };

        if agent.path.is_none() {
            agent.state = NavState::Idle;
            return SteeringOutput::coast(self.brake(pose.speed, dt), replan);
        }

        if agent
            .current_waypoint()
            .is_some_and(|point| pose.position.distance(point) <= self.config.arrival_radius)
        {
            agent.waypoint_index += 1;
        }

        // Exhausted paths are re-planned on the next tick
        let Some(waypoint) = agent.current_waypoint() else {
            agent.avoidance_override = None;
            return SteeringOutput::coast(self.brake(pose.speed, dt), replan);
        };

        agent.avoidance_override = self.avoidance.update(
            pose.position,
            waypoint,
            target,
            agent.avoidance_override,
            query,
        );
        let aim = match agent.avoidance_override {
            Some(point) => {
                agent.state = NavState::Avoiding;
                point
            }
            None => {
                agent.state = NavState::FollowingPath;
                waypoint
            }
        };

        self.steer_toward(pose, aim, dt, replan)
    }

    fn should_replan(&self, agent: &NavAgent, position: Vec2, target: Vec2) -> bool {
        if agent.replan_requested || agent.path_exhausted() {
            return true;
        }
        let rate = self.config.replan_distance_per_second;
        rate > 0.0 && agent.replan_timer >= position.distance(target) / rate
    }

    fn replan(&self, agent: &mut NavAgent, position: Vec2, target: Vec2) -> ReplanReport {
        agent.replan_timer = 0.0;
        agent.replan_requested = false;

        let report = self.planner.search(position, target);
        let summary = ReplanReport::from(&report);
        match report.into_path() {
            Some(path) => {
                log::trace!("Planned {} waypoints toward {target}", path.len());
                agent.path = Some(path);
                agent.waypoint_index = 0;
                agent.state = NavState::FollowingPath;
            }
            None => {
                log::debug!(
                    "No path from {position} to {target} ({}), holding",
                    summary.status
                );
                agent.path = None;
                agent.waypoint_index = 0;
                agent.avoidance_override = None;
                agent.state = NavState::Idle;
            }
        }
        summary
    }

    fn steer_toward(
        &self,
        pose: &AgentPose,
        aim: Vec2,
        dt: f32,
        replan: Option<ReplanReport>,
    ) -> SteeringOutput {
        let offset = aim - pose.position;
        if offset.length_squared() <= f32::EPSILON {
            return SteeringOutput::coast(self.brake(pose.speed, dt), replan);
        }

        let error = wrap_angle(offset.y.atan2(offset.x) - pose.heading);
        let max_turn = self.config.max_turn_rate * dt;
        let heading_delta = error.clamp(-max_turn, max_turn);

        let speed = if (error - heading_delta).abs() <= self.config.facing_tolerance {
            (pose.speed + self.config.acceleration * dt).min(self.config.max_speed)
        } else {
            self.brake(pose.speed, dt)
        };

        SteeringOutput {
            heading_delta,
            speed,
            replan,
        }
    }

    fn brake(&self, speed: f32, dt: f32) -> f32 {
        (speed - self.config.acceleration * dt).max(0.0)
    }
}

/// Wrap an angle into `(-PI, PI]`
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::avoidance::AvoidanceConfig;
    use crate::ai::grid::{Connectivity, GridConfig, OccupancyGrid};
    use crate::ai::pathfinding::PlannerConfig;
    use crate::physics::{Obstacle, ObstacleField};
    use std::sync::Arc;

    fn controller_for(grid: OccupancyGrid, config: SteeringConfig) -> SteeringController {
        SteeringController::new(
            PathPlanner::new(Arc::new(grid), PlannerConfig::default()),
            LocalAvoidance::new(AvoidanceConfig::default()),
            config,
        )
    }

    fn open_grid(columns: usize, rows: usize) -> OccupancyGrid {
        OccupancyGrid::from_cells(Vec2::ZERO, columns, rows, 0.5, Connectivity::Four, |_| false)
            .unwrap()
    }

    fn no_obstacles(_: Vec2, _: f32) -> bool {
        false
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_no_target_stays_idle() {
        let controller = controller_for(open_grid(5, 5), SteeringConfig::default());
        let mut agent = NavAgent::new();
        let pose = AgentPose {
            speed: 3.0,
            ..AgentPose::new(Vec2::new(1.5, 1.5), 0.0)
        };

        let output = controller.advance(&mut agent, &pose, 0.1, &no_obstacles);

        assert_eq!(agent.state(), NavState::Idle);
        assert!(output.replan.is_none());
        assert!((output.speed - 2.0).abs() < 1e-5);
        assert_eq!(output.heading_delta, 0.0);
    }

    #[test]
    fn test_first_tick_plans() {
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);

        let output = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        let replan = output.replan.unwrap();
        assert_eq!(replan.status, SearchStatus::Found);
        assert_eq!(replan.waypoints, 8);
        assert_eq!(agent.state(), NavState::FollowingPath);
        assert_eq!(agent.waypoint_index(), 0);
        assert_eq!(agent.replan_timer(), 0.0);
        // Already facing the first waypoint
        assert!(output.speed > 0.0);
    }

    #[test]
    fn test_exhausted_path_forces_replan() {
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        agent.waypoint_index = agent.path().map_or(0, Path::len);
        assert!(agent.current_waypoint().is_none());

        let output = controller.advance(&mut agent, &pose, 0.001, &no_obstacles);

        assert!(output.replan.is_some());
        assert_eq!(agent.waypoint_index(), 0);
        assert!(agent.current_waypoint().is_some());
    }

    #[test]
    fn test_waypoint_advances_on_arrival() {
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let start = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &start, 0.02, &no_obstacles);
        assert_eq!(agent.current_waypoint(), Some(Vec2::new(1.5, 0.5)));

        let near_first = AgentPose::new(Vec2::new(1.3, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &near_first, 0.02, &no_obstacles);

        assert_eq!(agent.waypoint_index(), 1);
        assert_eq!(agent.current_waypoint(), Some(Vec2::new(2.5, 0.5)));
    }

    #[test]
    fn test_timer_replans_sooner_near_target() {
        let config = SteeringConfig::default().with_replan_distance_per_second(10.0);
        let controller = controller_for(open_grid(40, 4), config);

        // 2 units away: threshold 0.2 seconds
        let mut near = NavAgent::with_target(Vec2::new(2.5, 0.5));
        let near_pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut near, &near_pose, 0.01, &no_obstacles);
        let near_replans = (0..30)
            .filter(|_| {
                controller
                    .advance(&mut near, &near_pose, 0.05, &no_obstacles)
                    .replan
                    .is_some()
            })
            .count();

        // 30 units away: threshold 3 seconds
        let mut far = NavAgent::with_target(Vec2::new(30.5, 0.5));
        let _ = controller.advance(&mut far, &near_pose, 0.01, &no_obstacles);
        let far_replans = (0..30)
            .filter(|_| {
                controller
                    .advance(&mut far, &near_pose, 0.05, &no_obstacles)
                    .replan
                    .is_some()
            })
            .count();

        assert!(near_replans >= 5, "near agent re-planned {near_replans} times");
        assert_eq!(far_replans, 0);
    }

    #[test]
    fn test_unreachable_target_holds_and_retries() {
        // Target cell (5,5) walled in on all four sides
        let blocked = [(4, 5), (6, 5), (5, 4), (5, 6)];
        let grid = OccupancyGrid::from_cells(Vec2::ZERO, 10, 10, 0.5, Connectivity::Four, |cell| {
            blocked.contains(&(cell.x, cell.y))
        })
        .unwrap();
        let config = SteeringConfig::default().with_replan_distance_per_second(10.0);
        let controller = controller_for(grid, config);
        let mut agent = NavAgent::with_target(Vec2::new(5.5, 5.5));
        let mut pose = AgentPose {
            speed: 4.0,
            ..AgentPose::new(Vec2::new(0.5, 5.5), 0.0)
        };

        let first = controller.advance(&mut agent, &pose, 0.05, &no_obstacles);
        assert_eq!(first.replan.map(|r| r.status), Some(SearchStatus::Unreachable));
        assert_eq!(agent.state(), NavState::Idle);
        assert!(agent.path().is_none());
        assert!(first.speed < pose.speed);

        // Held in place, the retry comes after distance / rate = 0.5 seconds
        let mut retry_tick = None;
        for tick in 1..=20 {
            pose.speed = 0.0;
            let output = controller.advance(&mut agent, &pose, 0.05, &no_obstacles);
            assert_eq!(output.speed, 0.0);
            assert_eq!(agent.state(), NavState::Idle);
            if output.replan.is_some() {
                retry_tick = Some(tick);
                break;
            }
        }
        let tick = retry_tick.unwrap();
        assert!((9..=11).contains(&tick), "retried on tick {tick}");
    }

    #[test]
    fn test_no_thrust_while_facing_away() {
        let config = SteeringConfig::default()
            .with_max_turn_rate(PI)
            .with_facing_tolerance(0.3);
        let controller = controller_for(open_grid(10, 10), config);
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        // Facing -X, waypoints lie along +X
        let pose = AgentPose {
            speed: 2.0,
            ..AgentPose::new(Vec2::new(0.5, 0.5), PI)
        };

        let output = controller.advance(&mut agent, &pose, 0.1, &no_obstacles);

        assert!((output.heading_delta.abs() - PI * 0.1).abs() < 1e-4);
        assert!(output.speed < pose.speed);
    }

    #[test]
    fn test_speed_capped() {
        let config = SteeringConfig::default().with_speed(3.0, 100.0);
        let controller = controller_for(open_grid(10, 10), config);
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);

        let output = controller.advance(&mut agent, &pose, 0.5, &no_obstacles);

        assert!((output.speed - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_avoiding_keeps_path() {
        // The grid is open but the live world has a rock ahead
        let rocks = ObstacleField::new().with(Obstacle::circle(Vec2::new(1.5, 0.5), 0.3));
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);

        let _ = controller.advance(&mut agent, &pose, 0.02, &rocks);

        assert_eq!(agent.state(), NavState::Avoiding);
        assert_eq!(agent.avoidance_override(), Some(Vec2::new(0.5, 3.5)));
        assert!(agent.path().is_some());
        assert_eq!(agent.waypoint_index(), 0);
    }

    #[test]
    fn test_resumes_path_when_obstruction_clears() {
        let rocks = ObstacleField::new().with(Obstacle::circle(Vec2::new(1.5, 0.5), 0.3));
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &pose, 0.02, &rocks);
        assert_eq!(agent.state(), NavState::Avoiding);

        // Rock drifted away
        let _ = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        assert_eq!(agent.state(), NavState::FollowingPath);
        assert_eq!(agent.avoidance_override(), None);
        assert_eq!(agent.waypoint_index(), 0);
        assert_eq!(agent.current_waypoint(), Some(Vec2::new(1.5, 0.5)));
    }

    #[test]
    fn test_resumes_path_near_detour_point() {
        let rocks = ObstacleField::new().with(Obstacle::circle(Vec2::new(1.5, 0.5), 0.3));
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let start = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &start, 0.02, &rocks);
        assert_eq!(agent.avoidance_override(), Some(Vec2::new(0.5, 3.5)));

        // Within the clear radius of the detour, rock still in place
        let near_detour = AgentPose::new(Vec2::new(0.5, 3.0), 0.0);
        let _ = controller.advance(&mut agent, &near_detour, 0.02, &rocks);

        assert_eq!(agent.state(), NavState::FollowingPath);
        assert_eq!(agent.avoidance_override(), None);
        assert_eq!(agent.waypoint_index(), 0);
    }

    #[test]
    fn test_requested_replan_runs_before_timer() {
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        // Timer threshold is 0.8 seconds away
        let idle_tick = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);
        assert!(idle_tick.replan.is_none());

        agent.request_replan();
        let output = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        assert_eq!(output.replan.map(|r| r.status), Some(SearchStatus::Found));
        assert_eq!(agent.replan_timer(), 0.0);

        let after = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);
        assert!(after.replan.is_none());
    }

    #[test]
    fn test_clear_target_resets() {
        let controller = controller_for(open_grid(10, 10), SteeringConfig::default());
        let mut agent = NavAgent::with_target(Vec2::new(8.5, 0.5));
        let pose = AgentPose::new(Vec2::new(0.5, 0.5), 0.0);
        let _ = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        agent.clear_target();
        let _ = controller.advance(&mut agent, &pose, 0.02, &no_obstacles);

        assert_eq!(agent.state(), NavState::Idle);
        assert!(agent.path().is_none());
        assert!(agent.target().is_none());
    }

    #[test]
    fn test_pose_integrate() {
        let mut pose = AgentPose::new(Vec2::ZERO, 0.0);
        let output = SteeringOutput {
            heading_delta: PI / 2.0,
            speed: 2.0,
            replan: None,
        };

        pose.integrate(&output, 0.5);

        assert!((pose.heading - PI / 2.0).abs() < 1e-5);
        assert!((pose.position - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert_eq!(pose.speed, 2.0);
    }

    #[test]
    fn test_reaches_target_behind_wall() {
        let wall = ObstacleField::new().with(Obstacle::rect(
            Vec2::new(8.5, 0.0),
            Vec2::new(9.5, 13.5),
        ));
        let grid_config = GridConfig::default()
            .with_region(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0))
            .with_cell_radius(1.0);
        let grid = OccupancyGrid::build(&grid_config, &wall).unwrap();
        let config = SteeringConfig::default()
            .with_speed(4.0, 8.0)
            .with_max_turn_rate(4.0 * PI)
            .with_arrival_radius(0.75)
            .with_facing_tolerance(0.35);
        let controller = controller_for(grid, config);

        let target = Vec2::new(17.0, 3.0);
        let mut agent = NavAgent::with_target(target);
        let mut pose = AgentPose::new(Vec2::new(3.0, 3.0), 0.0);
        let dt = 0.05;

        let mut reached = false;
        for _ in 0..2000 {
            let output = controller.advance(&mut agent, &pose, dt, &wall);
            pose.integrate(&output, dt);
            assert!(
                !wall.overlaps_circle(pose.position, 0.0),
                "agent entered the wall at {}",
                pose.position
            );
            if pose.position.distance(target) < 1.0 {
                reached = true;
                break;
            }
        }

        assert!(reached, "agent stopped at {}", pose.position);
    }
}
