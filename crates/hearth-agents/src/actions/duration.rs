//! Action durations.
//!
//! A duration starts from a per-action base and is then scaled:
//!
//! 1. Gathering: resource multiplier (wood ×1.2, stone ×1.5, berry ×0.5,
//!    water ×0.6) and remaining-quantity factor `0.5 + 0.5 × fraction`
//! 2. Skill discount: −0.5 % per level of the relevant skill, at most −50 %
//! 3. Stamina below 30: ×1.3; health below 50: ×1.2
//! 4. Clamp into `[5, 120]` sim-seconds
//!
//! Building has no duration; it runs until the site completes.

use hearth_types::{Action, AgentId, Attributes, ResolvedTarget, ResourceKind, ResourceNode, Skill};
use hearth_world::World;

use crate::crafting::recipe;
use crate::error::AgentError;

/// Shortest action, sim-seconds.
pub const MIN_DURATION: f64 = 5.0;
/// Longest action, sim-seconds.
pub const MAX_DURATION: f64 = 120.0;
/// Base for actions without their own.
pub const DEFAULT_BASE: f64 = 10.0;
/// Discount per skill level.
pub const SKILL_DISCOUNT_PER_LEVEL: f64 = 0.005;
/// Largest skill discount.
pub const MAX_SKILL_DISCOUNT: f64 = 0.5;

/// Base duration of `action`, or `None` for unbounded actions.
pub const fn base_duration(action: &Action) -> Option<f64> {
    match action {
        Action::Gather { .. } => Some(12.0),
        Action::Flee => Some(3.0),
        Action::Share { .. } => Some(5.0),
        Action::Rest => Some(25.0),
        Action::Eat { .. } => Some(6.0),
        Action::Explore => Some(18.0),
        Action::Hunt { .. } | Action::Defend { .. } => Some(30.0),
        Action::Craft { item } => Some(recipe(*item).craft_time),
        Action::Build { .. } => None,
        Action::Move { .. } | Action::Talk { .. } | Action::Cook => Some(DEFAULT_BASE),
    }
}

/// The skill that shortens `action`, if any.
pub const fn discount_skill(action: &Action) -> Option<Skill> {
    match action {
        Action::Gather { .. } => Some(Skill::Gathering),
        Action::Build { .. } => Some(Skill::Construction),
        Action::Hunt { .. } | Action::Defend { .. } => Some(Skill::Combat),
        Action::Craft { .. } => Some(Skill::Crafting),
        _ => None,
    }
}

/// How much slower (or faster) a resource kind is to gather.
pub const fn resource_multiplier(kind: ResourceKind) -> f64 {
    match kind {
        ResourceKind::Wood => 1.2,
        ResourceKind::Stone => 1.5,
        ResourceKind::Berry => 0.5,
        ResourceKind::Water => 0.6,
    }
}

/// Apply every modifier to `base` and clamp.
pub fn scale_duration(base: f64, node: Option<&ResourceNode>, skill: u32, attributes: &Attributes) -> f64 {
    let mut duration = base;
    if let Some(node) = node {
        duration *= resource_multiplier(node.kind);
        duration *= 0.5 + 0.5 * node.remaining_fraction();
    }
    let discount = (f64::from(skill) * SKILL_DISCOUNT_PER_LEVEL).min(MAX_SKILL_DISCOUNT);
    duration *= 1.0 - discount;
    if attributes.stamina < 30.0 {
        duration *= 1.3;
    }
    if attributes.health < 50.0 {
        duration *= 1.2;
    }
    duration.clamp(MIN_DURATION, MAX_DURATION)
}

/// Full duration of `action` for `agent`, given its resolved target.
pub fn action_duration(
    world: &World,
    agent: AgentId,
    action: &Action,
    target: Option<&ResolvedTarget>,
) -> Result<Option<f64>, AgentError> {
    let Some(base) = base_duration(action) else {
        return Ok(None);
    };
    let a = world.agent(agent)?;
    let node = match (action, target) {
        (Action::Gather { .. }, Some(ResolvedTarget::Node(id))) => world.nodes.get(id),
        _ => None,
    };
    let skill = discount_skill(action).map_or(0, |s| a.skill(s));
    Ok(Some(scale_duration(base, node, skill, &a.attributes)))
}
