//! Short-range reactive obstacle avoidance
//!
//! Casts a probe toward the next waypoint. When it is blocked, two lateral
//! candidates are tested and the agent is steered toward the first clear one
//! until it gets close to it. This is a single-step correction: concave
//! obstacles that block both sides are not resolved, the previous detour is
//! held instead.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::ObstacleQuery;

/// Local avoidance tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Maximum length of every probe ray
    pub probe_distance: f32,
    /// Sideways distance of the detour candidates
    pub lateral_offset: f32,
    /// A detour is released once the agent is this close to it
    pub clear_radius: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            probe_distance: 5.0,
            lateral_offset: 3.0,
            clear_radius: 1.0,
        }
    }
}

impl AvoidanceConfig {
    /// Set the probe length
    #[must_use]
    pub fn with_probe_distance(mut self, probe_distance: f32) -> Self {
        self.probe_distance = probe_distance;
        self
    }

    /// Set the sideways candidate offset
    #[must_use]
    pub fn with_lateral_offset(mut self, lateral_offset: f32) -> Self {
        self.lateral_offset = lateral_offset;
        self
    }

    /// Set the release radius
    #[must_use]
    pub fn with_clear_radius(mut self, clear_radius: f32) -> Self {
        self.clear_radius = clear_radius;
        self
    }
}

/// Which side of the probe a detour lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Counter-clockwise of the probe direction
    Left,
    /// Clockwise of the probe direction
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Outcome of a single avoidance probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvoidanceProbe {
    /// Nothing on the direct line
    Clear,
    /// Direct line blocked, steer toward `point`
    Detour {
        /// Candidate point to steer toward
        point: Vec2,
        /// Side the candidate was taken from
        side: Side,
    },
    /// Direct line and both candidates blocked
    Blocked,
}

impl AvoidanceProbe {
    /// Detour point, if any
    #[must_use]
    pub fn detour_point(self) -> Option<Vec2> {
        match self {
            Self::Detour { point, .. } => Some(point),
            Self::Clear | Self::Blocked => None,
        }
    }
}

/// Reactive local avoidance
///
/// Holds no per-agent state. The current override lives on the agent and is
/// passed back in on each update.
#[derive(Debug, Clone, Default)]
pub struct LocalAvoidance {
    config: AvoidanceConfig,
}

impl LocalAvoidance {
    /// Create with the given tuning
    #[must_use]
    pub fn new(config: AvoidanceConfig) -> Self {
        Self { config }
    }

    /// Avoidance tuning
    #[must_use]
    pub fn config(&self) -> &AvoidanceConfig {
        &self.config
    }

    /// Probe the line from `from` toward `toward`
    ///
    /// Detour candidates are tested against `target`, which is usually the
    /// same waypoint but may be the final destination.
    pub fn probe<Q: ObstacleQuery + ?Sized>(
        &self,
        from: Vec2,
        toward: Vec2,
        target: Vec2,
        query: &Q,
    ) -> AvoidanceProbe {
        let offset = toward - from;
        let direction = offset.normalize_or_zero();
        let probe_length = self.config.probe_distance.min(offset.length());

        if query.raycast(from, direction, probe_length).is_none() {
            return AvoidanceProbe::Clear;
        }

        let lateral = direction.perp() * self.config.lateral_offset;
        for (side, candidate) in [(Side::Left, from + lateral), (Side::Right, from - lateral)] {
            if self.candidate_clear(candidate, target, query) {
                log::trace!("Avoiding obstacle ahead of {from} via {side} candidate {candidate}");
                return AvoidanceProbe::Detour {
                    point: candidate,
                    side,
                };
            }
        }

        AvoidanceProbe::Blocked
    }

    /// Advance an agent's avoidance override by one step
    ///
    /// Returns the override to steer toward, or `None` when the planned path
    /// should be followed directly.
    pub fn update<Q: ObstacleQuery + ?Sized>(
        &self,
        from: Vec2,
        toward: Vec2,
        target: Vec2,
        current_override: Option<Vec2>,
        query: &Q,
    ) -> Option<Vec2> {
        if current_override.is_some_and(|point| from.distance(point) <= self.config.clear_radius) {
            return None;
        }

        match self.probe(from, toward, target, query) {
            AvoidanceProbe::Clear => None,
            AvoidanceProbe::Detour { point, .. } => Some(point),
            AvoidanceProbe::Blocked => current_override,
        }
    }

    /// Detour point for the line from `from` toward `toward`, if it is blocked
    pub fn check_avoidance<Q: ObstacleQuery + ?Sized>(
        &self,
        from: Vec2,
        toward: Vec2,
        query: &Q,
    ) -> Option<Vec2> {
        self.probe(from, toward, toward, query).detour_point()
    }

    fn candidate_clear<Q: ObstacleQuery + ?Sized>(
        &self,
        candidate: Vec2,
        target: Vec2,
        query: &Q,
    ) -> bool {
        let offset = target - candidate;
        let length = self.config.probe_distance.min(offset.length());
        query.raycast(candidate, offset, length).is_none()
    }
}
