//! World wrapper around hecs

use glam::Vec2;
use hecs::Entity;

use super::components::{Name, NavTarget};
use super::systems::navigation_system;
use crate::ai::{AgentPose, NavAgent, SteeringController};
use crate::core::NavStats;
use crate::physics::ObstacleQuery;

/// Simulation world holding agents and the bodies they chase
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
    /// Statistics of every re-plan made by `step`
    pub stats: NavStats,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
            stats: NavStats::new(),
        }
    }

    /// Spawn a passive body that agents can target
    pub fn spawn_body(&mut self, name: impl Into<String>, pose: AgentPose) -> Entity {
        self.inner.spawn((Name::new(name), pose))
    }

    /// Spawn an agent navigating toward a fixed point
    pub fn spawn_agent(&mut self, name: impl Into<String>, pose: AgentPose, target: Vec2) -> Entity {
        self.inner
            .spawn((Name::new(name), pose, NavAgent::with_target(target)))
    }

    /// Spawn an agent that chases another entity
    pub fn spawn_chaser(
        &mut self,
        name: impl Into<String>,
        pose: AgentPose,
        target: Entity,
    ) -> Entity {
        self.inner
            .spawn((Name::new(name), pose, NavAgent::new(), NavTarget(target)))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Current pose of an entity
    pub fn pose(&self, entity: Entity) -> Option<AgentPose> {
        self.inner.get::<&AgentPose>(entity).ok().map(|pose| *pose)
    }

    /// Mutable access to an entity's pose, for externally driven bodies
    pub fn pose_mut(&mut self, entity: Entity) -> Option<&mut AgentPose> {
        self.inner.query_one_mut::<&mut AgentPose>(entity).ok()
    }

    /// Navigation state of an agent
    pub fn agent(&self, entity: Entity) -> Option<hecs::Ref<'_, NavAgent>> {
        self.inner.get::<&NavAgent>(entity).ok()
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Advance every agent by `dt` seconds
    pub fn step<Q: ObstacleQuery + ?Sized>(
        &mut self,
        controller: &SteeringController,
        query: &Q,
        dt: f32,
    ) -> usize {
        navigation_system(&mut self.inner, controller, query, &mut self.stats, dt)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
