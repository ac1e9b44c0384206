//! Eating, resting, and cooking.
//!
//! | Food          | Hunger | Health | Stamina |
//! |---------------|--------|--------|---------|
//! | `berry`       | −30    | +5     | +5      |
//! | `water`       | −10    | +2     | +10     |
//! | `raw_meat`    | −40    | +3     | +5      |
//! | `cooked_meat` | −60    | +15    | +10     |
//!
//! Rest regeneration happens every tick in the vitals pass; completing a
//! rest only records it.

use hearth_types::{AgentId, BuildingKind, FailureReason, Item, ResolvedTarget, Skill};
use hearth_world::World;

use super::{Outcome, Plan, Prepared};
use crate::error::AgentError;

/// Campfires farther than this are walked to.
pub const CAMPFIRE_REACH: f64 = 10.0;

/// Attribute deltas from eating one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nourishment {
    /// Change to hunger.
    pub hunger: f64,
    /// Change to health.
    pub health: f64,
    /// Change to stamina.
    pub stamina: f64,
}

/// Nourishment of `item`, or `None` if it is not food.
pub const fn nourishment(item: Item) -> Option<Nourishment> {
    let (hunger, health, stamina) = match item {
        Item::Berry => (-30.0, 5.0, 5.0),
        Item::Water => (-10.0, 2.0, 10.0),
        Item::RawMeat => (-40.0, 3.0, 5.0),
        Item::CookedMeat => (-60.0, 15.0, 10.0),
        Item::Wood | Item::Stone => return None,
    };
    Some(Nourishment {
        hunger,
        health,
        stamina,
    })
}

/// Check the agent has the food.
pub fn prepare_eat(world: &World, agent: AgentId, food: Item) -> Result<Prepared, AgentError> {
    if nourishment(food).is_none() {
        return Ok(Prepared::reject(FailureReason::UnknownTarget, format!("{food} is not food")));
    }
    if world.agent(agent)?.item_count(food) == 0 {
        return Ok(Prepared::reject(
            FailureReason::InsufficientMaterials,
            format!("Had no {food} to eat"),
        ));
    }
    Ok(Prepared::Ready(Plan::here(format!("eating {food}"))))
}

/// Consume one unit and apply its nourishment.
pub fn complete_eat(world: &mut World, agent: AgentId, food: Item) -> Result<Outcome, AgentError> {
    let Some(n) = nourishment(food) else {
        return Ok(Outcome::failed(FailureReason::UnknownTarget, format!("{food} is not food")));
    };
    let a = world.agent_mut(agent)?;
    if !a.remove_item(food, 1) {
        return Ok(Outcome::failed(
            FailureReason::InsufficientMaterials,
            format!("The {food} was gone before it could be eaten"),
        ));
    }
    a.attributes.adjust_hunger(n.hunger);
    a.attributes.adjust_health(n.health);
    a.attributes.adjust_stamina(n.stamina);
    Ok(Outcome::success(format!("Ate {food}")).with_importance(4))
}

/// Record a finished rest.
pub fn complete_rest(world: &World, agent: AgentId) -> Result<Outcome, AgentError> {
    let stamina = world.agent(agent)?.attributes.stamina;
    Ok(Outcome::success(format!("Rested (stamina {stamina:.0})")).with_importance(3))
}

/// Find the nearest complete campfire.
pub fn prepare_cook(world: &World, agent: AgentId) -> Result<Prepared, AgentError> {
    let a = world.agent(agent)?;
    if a.item_count(Item::RawMeat) == 0 {
        return Ok(Prepared::reject(
            FailureReason::InsufficientMaterials,
            "Had no raw meat to cook",
        ));
    }
    let position = a.position;
    let campfire = world
        .buildings
        .values()
        .filter(|b| b.kind == BuildingKind::Campfire && b.complete)
        .map(|b| (b.id, b.position, b.position.distance_to(position)))
        .min_by(|x, y| x.2.total_cmp(&y.2));
    let Some((id, at, distance)) = campfire else {
        return Ok(Prepared::reject(
            FailureReason::UnknownTarget,
            "There is no campfire to cook at",
        ));
    };
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Building(id)),
        move_to: (distance > CAMPFIRE_REACH).then_some(at),
        note: "cooking meat".to_owned(),
    }))
}

/// Turn all raw meat into cooked meat.
pub fn complete_cook(
    world: &mut World,
    agent: AgentId,
    target: Option<&ResolvedTarget>,
) -> Result<Outcome, AgentError> {
    let Some(&ResolvedTarget::Building(id)) = target else {
        return Ok(Outcome::failed(FailureReason::UnknownTarget, "Had no campfire to cook at"));
    };
    let Some(campfire) = world.buildings.get(&id).filter(|b| b.complete) else {
        return Ok(Outcome::failed(FailureReason::TargetVanished, "The campfire was gone"));
    };
    let at = campfire.position;

    let a = world.agent_mut(agent)?;
    if a.position.distance_to(at) > CAMPFIRE_REACH {
        return Ok(Outcome::failed(
            FailureReason::OutOfRange,
            "Never reached the campfire",
        ));
    }
    let raw = a.item_count(Item::RawMeat);
    if raw == 0 || !a.remove_item(Item::RawMeat, raw) {
        return Ok(Outcome::failed(
            FailureReason::InsufficientMaterials,
            "Had no raw meat left to cook",
        ));
    }
    a.add_item(Item::CookedMeat, raw);
    a.add_skill(Skill::Survival, 1);
    Ok(Outcome::success(format!("Cooked {raw} raw meat")))
}
