//! Navigation configuration
//!
//! Aggregates grid, planner, avoidance and steering tuning into one
//! serializable document. Supports RON (Rusty Object Notation) and JSON files.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::{AvoidanceConfig, GridConfig, PlannerConfig, SteeringConfig};

/// Complete navigation configuration
///
/// Every field is defaulted, so a file only needs to name what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Grid region and resolution
    pub grid: GridConfig,
    /// A* limits
    pub planner: PlannerConfig,
    /// Local avoidance probes
    pub avoidance: AvoidanceConfig,
    /// Path following
    pub steering: SteeringConfig,
}

impl NavConfig {
    /// Replace the grid section
    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Replace the planner section
    #[must_use]
    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    /// Replace the avoidance section
    #[must_use]
    pub fn with_avoidance(mut self, avoidance: AvoidanceConfig) -> Self {
        self.avoidance = avoidance;
        self
    }

    /// Replace the steering section
    #[must_use]
    pub fn with_steering(mut self, steering: SteeringConfig) -> Self {
        self.steering = steering;
        self
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        check(positive(grid.cell_radius), "grid.cell_radius must be positive")?;
        check(
            positive(grid.extent.x) && positive(grid.extent.y),
            "grid.extent must be positive",
        )?;
        check(grid.center.is_finite(), "grid.center must be finite")?;

        check(
            self.planner.max_expansions > 0,
            "planner.max_expansions must be at least 1",
        )?;

        let avoidance = &self.avoidance;
        check(
            positive(avoidance.probe_distance),
            "avoidance.probe_distance must be positive",
        )?;
        check(
            positive(avoidance.lateral_offset),
            "avoidance.lateral_offset must be positive",
        )?;
        check(
            avoidance.clear_radius.is_finite() && avoidance.clear_radius >= 0.0,
            "avoidance.clear_radius must not be negative",
        )?;

        let steering = &self.steering;
        check(
            positive(steering.arrival_radius),
            "steering.arrival_radius must be positive",
        )?;
        check(
            positive(steering.facing_tolerance) && steering.facing_tolerance <= PI,
            "steering.facing_tolerance must be in (0, pi]",
        )?;
        check(
            positive(steering.max_turn_rate),
            "steering.max_turn_rate must be positive",
        )?;
        check(positive(steering.max_speed), "steering.max_speed must be positive")?;
        check(
            positive(steering.acceleration),
            "steering.acceleration must be positive",
        )?;
        check(
            positive(steering.replan_distance_per_second),
            "steering.replan_distance_per_second must be positive",
        )?;

        Ok(())
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the result does not validate
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: NavConfig =
            ron::from_str(source).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as a pretty RON document
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = self.to_ron_string()?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        log::debug!("Loaded navigation config from {}", path.display());
        Ok(config)
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: NavConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        log::debug!("Loaded navigation config from {}", path.display());
        Ok(config)
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn check(ok: bool, message: &'static str) -> Result<(), ConfigError> {
    if ok { Ok(()) } else { Err(ConfigError::Invalid(message)) }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A value is out of range
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
