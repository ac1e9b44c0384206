//! Giving items to a nearby agent.
//!
//! When no item is named, the giver picks what the receiver seems to need:
//! food for the hungry, crafting materials for the empty-handed, and
//! otherwise whatever the giver has plenty of.

use hearth_types::{Agent, AgentId, AgentRef, FailureReason, Item, MemoryKind, Notification, ResolvedTarget, Skill};
use hearth_world::World;
use tracing::debug;

use super::{Outcome, Plan, Prepared};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::memory::remember;

/// Affinity the giver gains toward the receiver.
pub const GIVER_AFFINITY: f64 = 10.0;
/// Affinity the receiver gains toward the giver.
pub const RECEIVER_AFFINITY: f64 = 15.0;
/// Receivers hungrier than this are offered food.
pub const HUNGRY: f64 = 50.0;

/// Resolve a reference to a living agent other than `agent`.
pub fn resolve_agent(world: &World, agent: AgentId, with: &AgentRef) -> Option<AgentId> {
    let id = match with {
        AgentRef::Id(id) => world.agents.get(id).filter(|a| a.alive).map(|a| a.id),
        AgentRef::Name(name) => world.agent_by_name(name),
    }?;
    (id != agent).then_some(id)
}

/// What the giver hands over, and how many.
pub fn choose_gift(giver: &Agent, receiver: &Agent, requested: Option<Item>) -> Option<(Item, u32)> {
    if let Some(item) = requested {
        let n = giver.item_count(item).min(2);
        return (n > 0).then_some((item, n));
    }
    let has = |item: Item, n: u32| giver.item_count(item) >= n;
    if receiver.attributes.hunger > HUNGRY {
        if has(Item::Berry, 3) {
            return Some((Item::Berry, 3));
        }
        if has(Item::Water, 2) {
            return Some((Item::Water, 2));
        }
    } else if receiver.equipment.is_empty() {
        if has(Item::Wood, 3) {
            return Some((Item::Wood, 2));
        }
        if has(Item::Stone, 3) {
            return Some((Item::Stone, 2));
        }
    }
    giver
        .inventory
        .iter()
        .find(|&(_, &n)| n >= 3)
        .map(|(&item, _)| (item, 2))
}

fn locate(
    world: &World,
    agent: AgentId,
    with: &AgentRef,
    config: &AgentConfig,
) -> Result<Result<AgentId, Outcome>, AgentError> {
    let Some(receiver) = resolve_agent(world, agent, with) else {
        return Ok(Err(Outcome::failed(
            FailureReason::UnknownTarget,
            "There was no one by that name to share with",
        )));
    };
    let from = world.agent(agent)?.position;
    let to = world.agent(receiver)?;
    let distance = to.position.distance_to(from);
    if distance > config.social_radius {
        return Ok(Err(Outcome::failed(
            FailureReason::OutOfRange,
            format!("{} was too far away to share with", to.name),
        )));
    }
    Ok(Ok(receiver))
}

/// Check the receiver is alive and close enough.
pub fn prepare(
    world: &World,
    agent: AgentId,
    with: &AgentRef,
    config: &AgentConfig,
) -> Result<Prepared, AgentError> {
    let receiver = match locate(world, agent, with, config)? {
        Ok(id) => id,
        Err(outcome) => {
            return Ok(Prepared::reject(
                outcome.reason.unwrap_or(FailureReason::UnknownTarget),
                outcome.message,
            ));
        }
    };
    let name = world.agent(receiver)?.name.clone();
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Agent(receiver)),
        move_to: None,
        note: format!("sharing with {name}"),
    }))
}

/// Hand the gift over.
pub fn complete(
    world: &mut World,
    agent: AgentId,
    with: &AgentRef,
    item: Option<Item>,
    config: &AgentConfig,
) -> Result<Outcome, AgentError> {
    let receiver = match locate(world, agent, with, config)? {
        Ok(id) => id,
        Err(outcome) => return Ok(outcome),
    };
    let (giver_name, receiver_name, gift) = {
        let giver = world.agent(agent)?;
        let to = world.agent(receiver)?;
        (giver.name.clone(), to.name.clone(), choose_gift(giver, to, item))
    };
    let Some((gift, n)) = gift else {
        return Ok(Outcome::failed(
            FailureReason::InsufficientMaterials,
            format!("Had nothing to spare for {receiver_name}"),
        ));
    };

    {
        let giver = world.agent_mut(agent)?;
        if !giver.remove_item(gift, n) {
            return Ok(Outcome::failed(
                FailureReason::InsufficientMaterials,
                format!("Had no {gift} left for {receiver_name}"),
            ));
        }
        giver.add_skill(Skill::Social, 2);
        giver.adjust_affinity(receiver, GIVER_AFFINITY);
    }
    {
        let to = world.agent_mut(receiver)?;
        to.add_item(gift, n);
        to.add_skill(Skill::Social, 1);
        to.adjust_affinity(agent, RECEIVER_AFFINITY);
    }
    remember(
        world,
        receiver,
        MemoryKind::Social,
        format!("{giver_name} gave me {n} {gift}"),
        6,
    )?;

    let description = format!("{giver_name} gave {n} {gift} to {receiver_name}");
    debug!(from = %agent, to = %receiver, item = %gift, count = n, "Items shared");
    world.notify(Notification::SocialInteraction {
        from: agent,
        to: receiver,
        description,
    });
    Ok(Outcome::success(format!("Gave {n} {gift} to {receiver_name}")).with_importance(6))
}
