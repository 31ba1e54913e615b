//! Obstacle queries injected into the navigation core
//!
//! The grid and the local avoidance layer only ever ask two questions of the
//! world: "is anything within `radius` of this point" and "where does this ray
//! first hit something". Any collision backend can answer them.

use glam::Vec2;

/// Bounds on the step of the default ray sweep
const MIN_MARCH_STEP: f32 = 0.05;
const MAX_MARCH_STEP: f32 = 0.25;

/// Result of a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The point of intersection
    pub point: Vec2,
    /// Distance from ray origin
    pub distance: f32,
}

/// Traversal-blocking geometry queries.
///
/// Implement `overlaps_circle` at minimum. The provided `raycast` sweeps the
/// ray with overlapping discs, so nothing on the line slips between two
/// samples. Hits are reported up to half a step early and half a step to
/// either side of the line. Analytic backends should override it.
pub trait ObstacleQuery {
    /// Is there an obstacle within `radius` of `point`
    fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool;

    /// Cast a ray and return the first hit within `max_distance`
    ///
    /// `direction` does not need to be normalized. A zero direction never hits.
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || !(max_distance >= 0.0) {
            return None;
        }

        let step = (max_distance / 64.0).clamp(MIN_MARCH_STEP, MAX_MARCH_STEP);
        let sweep_radius = step * 0.5;
        let mut distance = 0.0;
        loop {
            let point = origin + direction * distance;
            if self.overlaps_circle(point, sweep_radius) {
                return Some(RaycastHit { point, distance });
            }
            if distance >= max_distance {
                return None;
            }
            distance = (distance + step).min(max_distance);
        }
    }
}

impl<F> ObstacleQuery for F
where
    F: Fn(Vec2, f32) -> bool,
{
    fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool {
        self(point, radius)
    }
}
