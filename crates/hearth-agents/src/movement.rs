//! Straight-line movement of agents toward their move target.

use hearth_types::{AgentId, Attributes, Locomotion, Position};
use hearth_world::World;
use hearth_world::geometry::{clamp_to_world, step_towards};

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Walking speed for the given vitals.
///
/// Base speed × 0.7 when stamina < 30 (× 1.2 when > 70) × 0.8 when
/// health < 50. Multipliers compose.
pub fn agent_speed(attributes: &Attributes, base_speed: f64) -> f64 {
    let mut speed = base_speed;
    if attributes.stamina < 30.0 {
        speed *= 0.7;
    } else if attributes.stamina > 70.0 {
        speed *= 1.2;
    }
    if attributes.health < 50.0 {
        speed *= 0.8;
    }
    speed
}

/// Advance `agent` toward its move target by one step of `dt` sim-seconds.
///
/// Arrival clears the target and sets locomotion back to stationary.
/// Returns `true` if the agent arrived this step.
pub fn step_agent(
    world: &mut World,
    agent: AgentId,
    config: &AgentConfig,
    dt: f64,
) -> Result<bool, AgentError> {
    let a = world.agent_mut(agent)?;
    if !a.alive {
        return Ok(false);
    }
    let Some(target) = a.move_target else {
        a.status.locomotion = Locomotion::Stationary;
        return Ok(false);
    };

    let speed = agent_speed(&a.attributes, config.base_speed);
    let (next, arrived) = step_towards(a.position, target, speed * dt);
    a.position = next;
    if arrived {
        a.move_target = None;
        a.status.locomotion = Locomotion::Stationary;
    } else {
        a.status.locomotion = Locomotion::Enroute;
    }
    Ok(arrived)
}

/// Send `agent` toward `target`.
pub fn set_move_target(world: &mut World, agent: AgentId, target: Position) -> Result<(), AgentError> {
    let a = world.agent_mut(agent)?;
    a.move_target = Some(clamp_to_world(target));
    a.status.locomotion = Locomotion::Enroute;
    Ok(())
}
