//! Static obstacle geometry with analytic queries

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::query::{ObstacleQuery, RaycastHit};

/// A static, traversal-blocking shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    /// Disc obstacle (asteroids, buoys, wrecks)
    Circle {
        /// Center in world space
        center: Vec2,
        /// Radius in world units
        radius: f32,
    },
    /// Axis-aligned rectangle (walls, station modules)
    Rect {
        /// Lower-left corner
        min: Vec2,
        /// Upper-right corner
        max: Vec2,
    },
}

impl Obstacle {
    /// Create a circle obstacle
    #[must_use]
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle {
            center,
            radius: radius.abs(),
        }
    }

    /// Create a rectangle from two opposite corners
    #[must_use]
    pub fn rect(a: Vec2, b: Vec2) -> Self {
        Self::Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Does a disc of `radius` around `point` touch this obstacle
    #[must_use]
    pub fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool {
        match *self {
            Self::Circle { center, radius: r } => point.distance(center) <= r + radius,
            Self::Rect { min, max } => point.clamp(min, max).distance(point) <= radius,
        }
    }

    /// Distance along a normalized ray to the first intersection, if any
    fn ray_distance(&self, origin: Vec2, direction: Vec2) -> Option<f32> {
        match *self {
            Self::Circle { center, radius } => {
                let m = origin - center;
                let b = m.dot(direction);
                let c = m.length_squared() - radius * radius;
                // Outside and pointing away
                if c > 0.0 && b > 0.0 {
                    return None;
                }
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                Some((-b - discriminant.sqrt()).max(0.0))
            }
            Self::Rect { min, max } => {
                let mut t_min = 0.0_f32;
                let mut t_max = f32::INFINITY;
                for axis in 0..2 {
                    let (o, d, lo, hi) = (origin[axis], direction[axis], min[axis], max[axis]);
                    if d.abs() < f32::EPSILON {
                        if o < lo || o > hi {
                            return None;
                        }
                        continue;
                    }
                    let inv = 1.0 / d;
                    let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
                    if t0 > t1 {
                        std::mem::swap(&mut t0, &mut t1);
                    }
                    t_min = t_min.max(t0);
                    t_max = t_max.min(t1);
                    if t_min > t_max {
                        return None;
                    }
                }
                Some(t_min)
            }
        }
    }
}

/// Collection of static obstacles answering navigation queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    /// Create an empty field
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle
    pub fn add(&mut self, obstacle: Obstacle) -> &mut Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Builder-style add
    #[must_use]
    pub fn with(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// All obstacles in insertion order
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Number of obstacles
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Check if the field has no obstacles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl FromIterator<Obstacle> for ObstacleField {
    fn from_iter<I: IntoIterator<Item = Obstacle>>(iter: I) -> Self {
        Self {
            obstacles: iter.into_iter().collect(),
        }
    }
}

impl ObstacleQuery for ObstacleField {
    fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.overlaps_circle(point, radius))
    }

    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        self.obstacles
            .iter()
            .filter_map(|obstacle| obstacle.ray_distance(origin, direction))
            .filter(|&distance| distance <= max_distance)
            .min_by(f32::total_cmp)
            .map(|distance| RaycastHit {
                point: origin + direction * distance,
                distance,
            })
    }
}
