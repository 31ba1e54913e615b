//! Navigation system
//!
//! Resolves entity targets, advances every `(NavAgent, AgentPose)` pair by one
//! tick and integrates the resulting motion into the pose.

use glam::Vec2;
use hecs::Entity;

use super::components::NavTarget;
use crate::ai::{AgentPose, NavAgent, SteeringController};
use crate::core::NavStats;
use crate::physics::ObstacleQuery;

/// Advance all navigating agents by `dt` seconds
///
/// Agents whose target entity no longer exists (or has no pose) drop their
/// target and go idle. Returns the number of agents advanced.
pub fn navigation_system<Q: ObstacleQuery + ?Sized>(
    world: &mut hecs::World,
    controller: &SteeringController,
    query: &Q,
    stats: &mut NavStats,
    dt: f32,
) -> usize {
    let targets: Vec<(Entity, Option<Vec2>)> = world
        .query::<&NavTarget>()
        .iter()
        .map(|(entity, target)| {
            let position = world
                .get::<&AgentPose>(target.0)
                .ok()
                .map(|pose| pose.position);
            (entity, position)
        })
        .collect();

    for (entity, position) in targets {
        if let Ok(agent) = world.query_one_mut::<&mut NavAgent>(entity) {
            match position {
                Some(position) => agent.set_target(position),
                None if agent.target().is_some() => {
                    log::debug!("Target of {entity:?} is gone, going idle");
                    agent.clear_target();
                }
                None => {}
            }
        }
    }

    let mut advanced = 0;
    for (_entity, (agent, pose)) in world.query_mut::<(&mut NavAgent, &mut AgentPose)>() {
        let output = controller.advance(agent, pose, dt, query);
        if let Some(report) = &output.replan {
            stats.record(report);
        }
        pose.integrate(&output, dt);
        advanced += 1;
    }
    advanced
}
