//! Grid path planning and local-avoidance steering for 2D agents
//!
//! This crate provides:
//! - Occupancy grids sampled from injected obstacle queries
//! - A* path planning with per-search scratch state
//! - Reactive local avoidance and a tick-based steering controller
//! - Entity Component System integration with hecs

pub mod ai;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AgentPose, AvoidanceConfig, Cell, Connectivity, GridConfig, LocalAvoidance, NavAgent,
        NavState, OccupancyGrid, Path, PathPlanner, PlannerConfig, SearchStatus, SteeringConfig,
        SteeringController, SteeringOutput,
    };
    pub use crate::core::{ConfigError, NavConfig, NavStats};
    pub use crate::ecs::{Name, NavTarget, World, navigation_system};
    pub use crate::physics::{Obstacle, ObstacleField, ObstacleQuery};
    pub use glam::Vec2;
}
