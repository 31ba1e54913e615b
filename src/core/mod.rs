//! Core module
//!
//! Contains navigation configuration and search statistics

mod config;
mod debug;

pub use config::{ConfigError, NavConfig};
pub use debug::NavStats;
