//! AI navigation module
//!
//! Provides the occupancy grid, A* pathfinding, local avoidance, and the
//! steering controller that ties them together.

mod avoidance;
mod grid;
mod pathfinding;
mod steering;

pub use avoidance::{AvoidanceConfig, AvoidanceProbe, LocalAvoidance, Side};
pub use grid::{Cell, Connectivity, GridConfig, GridError, OccupancyGrid, PathNode};
pub use pathfinding::{Path, PathPlanner, PlannerConfig, SearchReport, SearchStatus};
pub use steering::{
    AgentPose, NavAgent, NavState, ReplanReport, SteeringConfig, SteeringController,
    SteeringOutput,
};
