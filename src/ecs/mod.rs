//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod systems;
mod world;

pub use components::{Name, NavTarget};
pub use systems::navigation_system;
pub use world::World;
