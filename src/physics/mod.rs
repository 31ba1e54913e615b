//! Obstacle queries module
//!
//! The navigation core never talks to a physics engine directly. It consumes
//! the `ObstacleQuery` capability; `ObstacleField` is a ready-made static
//! implementation.

mod query;
mod world;

pub use query::{ObstacleQuery, RaycastHit};
pub use world::{Obstacle, ObstacleField};
