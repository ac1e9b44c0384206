//! The craft action: validated at dispatch, re-validated at completion.

use hearth_types::{AgentId, EventKind, Importance, Tool};
use hearth_world::World;
use tracing::info;

use super::{Outcome, Plan, Prepared};
use crate::crafting::{self, recipe};
use crate::error::AgentError;

/// Check the recipe against the agent's skill and materials.
pub fn prepare(world: &World, agent: AgentId, tool: Tool) -> Result<Prepared, AgentError> {
    let a = world.agent(agent)?;
    Ok(match crafting::check(a, &recipe(tool)) {
        Ok(()) => Prepared::Ready(Plan::here(format!("crafting a {tool}"))),
        Err(failure) => Prepared::Rejected(failure),
    })
}

/// Consume materials and equip the result.
pub fn complete(world: &mut World, agent: AgentId, tool: Tool) -> Result<Outcome, AgentError> {
    let now = world.now();
    let a = world.agent_mut(agent)?;
    if let Err(failure) = crafting::craft(a, &recipe(tool), now) {
        return Ok(Outcome::failure(failure));
    }
    let name = a.name.clone();
    info!(agent = %agent, tool = %tool, "Item crafted");
    world.emit(
        EventKind::ItemCrafted,
        format!("{name} crafted a {tool}"),
        Importance::Low,
        vec![agent],
    );
    Ok(Outcome::success(format!("Crafted a {tool}")).with_importance(6))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_types::{FailureReason, Item};

    use super::*;
    use crate::actions::tests::spawn;

    #[test]
    fn materials_spent_between_dispatch_and_completion_fail_cleanly() {
        let mut world = World::new();
        let id = spawn(&mut world, "Charlie", 50.0, 50.0);
        world.agent_mut(id).unwrap().add_item(Item::Wood, 3);
        assert!(matches!(prepare(&world, id, Tool::WaterContainer).unwrap(), Prepared::Ready(_)));

        assert!(world.agent_mut(id).unwrap().remove_item(Item::Wood, 1));
        let outcome = complete(&mut world, id, Tool::WaterContainer).unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::InsufficientMaterials));
        assert!(world.agent(id).unwrap().equipment.is_empty());
    }

    #[test]
    fn crafting_emits_an_event() {
        let mut world = World::new();
        let id = spawn(&mut world, "Charlie", 50.0, 50.0);
        let a = world.agent_mut(id).unwrap();
        a.add_item(Item::Wood, 3);
        a.add_item(Item::Stone, 2);

        let outcome = complete(&mut world, id, Tool::Spear).unwrap();
        assert!(outcome.success);
        assert!(world.agent(id).unwrap().has_spear());
        assert!(world.events().any(|e| e.kind == EventKind::ItemCrafted));
    }
}
