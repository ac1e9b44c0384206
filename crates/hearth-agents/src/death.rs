//! Death conditions and consequences for agents.
//!
//! An agent dies when its health reaches zero, from starvation, exhaustion
//! or a beast's wounds. Death is permanent: the agent stays in the world
//! with `alive = false` and `lifecycle = dead`, and never respawns.
//!
//! On death the agent's action, movement and conversation linkage are
//! cleared, any resource node it held is released, a critical `npc_death`
//! event is emitted, and every living agent within the witness radius
//! remembers what it saw.

use hearth_types::{AgentId, BeastKind, EventKind, Importance, Lifecycle, Locomotion, MemoryKind};
use hearth_world::World;
use tracing::info;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::memory::remember;

/// Importance of the memory a witness forms.
pub const WITNESS_IMPORTANCE: u8 = 8;

/// The cause of an agent's death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Health drained while hunger sat above the starvation threshold.
    Starvation,
    /// Health drained while stamina sat below the exhaustion threshold.
    Exhaustion,
    /// Killed by a beast.
    Wounds(BeastKind),
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::Exhaustion => write!(f, "exhaustion"),
            Self::Wounds(kind) => write!(f, "wounds from a {kind}"),
        }
    }
}

/// Attribute the proximate cause of a vitals death.
pub fn vitals_cause(world: &World, agent: AgentId, config: &AgentConfig) -> Result<DeathCause, AgentError> {
    let attrs = world.agent(agent)?.attributes;
    if attrs.hunger > config.starvation_threshold {
        Ok(DeathCause::Starvation)
    } else {
        Ok(DeathCause::Exhaustion)
    }
}

/// Kill `agent`.
///
/// Idempotent: returns `false` without touching anything when the agent is
/// already dead.
pub fn handle_death(
    world: &mut World,
    agent: AgentId,
    cause: DeathCause,
    config: &AgentConfig,
) -> Result<bool, AgentError> {
    let (name, position) = {
        let a = world.agent_mut(agent)?;
        if !a.alive {
            return Ok(false);
        }
        a.alive = false;
        a.attributes.health = 0.0;
        a.status.lifecycle = Lifecycle::Dead;
        a.status.locomotion = Locomotion::Stationary;
        a.current = None;
        a.move_target = None;
        a.cooldown_until = None;
        a.conversation = None;
        (a.name.clone(), a.position)
    };
    world.release_occupancy(agent);

    info!(agent = %agent, name = %name, cause = %cause, "Agent died");
    world.emit(
        EventKind::NpcDeath,
        format!("{name} died of {cause}"),
        Importance::Critical,
        vec![agent],
    );

    let witnesses = world.agents_near(position, config.death_witness_radius, Some(agent));
    for (witness, _) in witnesses {
        remember(
            world,
            witness,
            MemoryKind::Death,
            format!("Saw {name} die of {cause}"),
            WITNESS_IMPORTANCE,
        )?;
    }
    Ok(true)
}
