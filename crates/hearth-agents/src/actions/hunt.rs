//! Hunting and defending: an agent attacks a beast.
//!
//! Both actions share one implementation. The target resolves at dispatch
//! (by id, else the nearest of the named species, else the nearest beast);
//! an agent out of reach walks to a point 0.8 × range short of it.

use hearth_types::{AgentId, Beast, BeastId, BeastTarget, FailureReason, Position, ResolvedTarget, Skill};
use hearth_world::World;
use hearth_world::geometry::{direction, offset};

use super::{Outcome, Plan, Prepared};
use crate::combat::{ATTACK_SKILL_GAIN, ATTACK_STAMINA, Strike, attack_damage, strike_beast, weapon_range};
use crate::config::AgentConfig;
use crate::death::{DeathCause, handle_death};
use crate::error::AgentError;

/// Resolve a beast reference from `from`.
pub fn resolve_beast(world: &World, from: Position, target: Option<&BeastTarget>) -> Option<BeastId> {
    match target {
        Some(BeastTarget::Id(id)) => world.beasts.contains_key(id).then_some(*id),
        Some(BeastTarget::Kind(kind)) => nearest(world, from, |b| b.kind == *kind),
        None => nearest(world, from, |_| true),
    }
}

fn nearest(world: &World, from: Position, keep: impl Fn(&Beast) -> bool) -> Option<BeastId> {
    world
        .beasts
        .values()
        .filter(|b| keep(b))
        .map(|b| (b.id, b.position.distance_to(from)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Pick the beast and close in if needed.
pub fn prepare(world: &World, agent: AgentId, target: Option<&BeastTarget>) -> Result<Prepared, AgentError> {
    let a = world.agent(agent)?;
    let Some(beast) = resolve_beast(world, a.position, target).and_then(|id| world.beasts.get(&id)) else {
        return Ok(Prepared::reject(FailureReason::UnknownTarget, "There was no beast to fight"));
    };
    let range = weapon_range(a);
    let distance = beast.position.distance_to(a.position);
    let move_to = (distance > range).then(|| {
        let (ux, uy) = direction(beast.position, a.position);
        offset(beast.position, ux, uy, range * 0.8)
    });
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Beast(beast.id)),
        move_to,
        note: format!("going after a {}", beast.kind),
    }))
}

/// Strike the beast; an aggressive survivor hits back.
pub fn complete(
    world: &mut World,
    agent: AgentId,
    target: Option<&ResolvedTarget>,
    config: &AgentConfig,
) -> Result<Outcome, AgentError> {
    let Some(&ResolvedTarget::Beast(beast)) = target else {
        return Ok(Outcome::failed(FailureReason::UnknownTarget, "Had no beast to fight"));
    };
    let Some((kind, position, aggressive, beast_damage)) = world
        .beasts
        .get(&beast)
        .map(|b| (b.kind, b.position, b.is_aggressive(), b.damage))
    else {
        return Ok(Outcome::failed(FailureReason::TargetVanished, "The beast got away"));
    };

    let damage = {
        let a = world.agent_mut(agent)?;
        let range = weapon_range(a);
        let distance = position.distance_to(a.position);
        if distance > range {
            return Ok(Outcome::failed(
                FailureReason::OutOfRange,
                format!("The {kind} stayed out of reach ({distance:.1} units away)"),
            ));
        }
        let damage = attack_damage(a);
        a.attributes.adjust_stamina(-ATTACK_STAMINA);
        a.add_skill(Skill::Combat, ATTACK_SKILL_GAIN);
        damage
    };

    match strike_beast(world, agent, beast, damage)? {
        Strike::Killed { meat } => {
            Ok(Outcome::success(format!("Killed the {kind} and took {meat} raw meat")).with_importance(8))
        }
        Strike::Missed => Ok(Outcome::failed(FailureReason::TargetVanished, "The beast got away")),
        Strike::Wounded { remaining } => {
            if aggressive {
                let a = world.agent_mut(agent)?;
                a.attributes.adjust_health(-beast_damage * 0.5);
                if a.attributes.health <= 0.0 {
                    handle_death(world, agent, DeathCause::Wounds(kind), config)?;
                    return Ok(Outcome::failed(FailureReason::TargetVanished, format!("Fell to the {kind}")));
                }
                Ok(Outcome::success(format!(
                    "Wounded the {kind} ({remaining:.0} health left) and took a hit back"
                ))
                .with_importance(7))
            } else {
                Ok(Outcome::success(format!("Wounded the {kind} ({remaining:.0} health left)")))
            }
        }
    }
}
