//! Decision context assembly and decision cadence.
//!
//! An agent sees only what is near it: non-depleted resources within 20
//! units, living agents within 15, buildings within 25, and beasts within
//! 20, each list nearest first. Its own state, the outcome of its last
//! action, and its recent and critical memories complete the picture.

use hearth_agents::AgentError;
use hearth_agents::MemoryStore;
use hearth_agents::memory::critical_memories;
use hearth_types::{
    Agent, AgentId, DecisionContext, NearbyAgent, NearbyBeast, NearbyBuilding, NearbyResource,
};
use hearth_world::World;

/// Radius for visible resource nodes.
pub const RESOURCE_RADIUS: f64 = 20.0;
/// Radius for visible agents.
pub const AGENT_RADIUS: f64 = 15.0;
/// Radius for visible buildings.
pub const BUILDING_RADIUS: f64 = 25.0;
/// Radius for visible beasts.
pub const BEAST_RADIUS: f64 = 20.0;
/// Recent memories handed to the provider.
pub const RECENT_MEMORIES: usize = 10;

/// Whether `agent` should be asked for a decision at `now`.
///
/// Only idle agents outside a conversation decide. An urgent agent decides
/// at once; others wait `interval` sim-seconds since their last decision.
pub fn decision_due(agent: &Agent, now: f64, interval: f64) -> bool {
    if !agent.is_idle() || agent.is_conversing() {
        return false;
    }
    if agent.attributes.is_urgent() {
        return true;
    }
    agent.last_decision_at.is_none_or(|at| now - at >= interval)
}

/// Build the decision context for `agent`.
pub fn build_context(world: &World, agent: AgentId) -> Result<DecisionContext, AgentError> {
    let a = world.agent(agent)?;
    let here = a.position;

    let mut nearby_resources: Vec<NearbyResource> = world
        .nodes
        .values()
        .filter(|n| !n.depleted)
        .map(|n| (n, n.position.distance_to(here)))
        .filter(|&(_, d)| d <= RESOURCE_RADIUS)
        .map(|(n, distance)| NearbyResource {
            id: n.id,
            kind: n.kind,
            position: n.position,
            distance,
            quantity: n.quantity,
            occupied: n.occupied_by.is_some_and(|holder| holder != agent),
        })
        .collect();
    nearby_resources.sort_by(|x, y| x.distance.total_cmp(&y.distance));

    let nearby_agents: Vec<NearbyAgent> = world
        .agents_near(here, AGENT_RADIUS, Some(agent))
        .into_iter()
        .filter_map(|(id, distance)| {
            let other = world.agents.get(&id)?;
            Some(NearbyAgent {
                id,
                name: other.name.clone(),
                position: other.position,
                distance,
                health: other.attributes.health,
                hunger: other.attributes.hunger,
                conversing: other.is_conversing(),
                activity: other.current_kind(),
                affinity: a.affinity(id),
            })
        })
        .collect();

    let mut nearby_buildings: Vec<NearbyBuilding> = world
        .buildings
        .values()
        .map(|b| (b, b.position.distance_to(here)))
        .filter(|&(_, d)| d <= BUILDING_RADIUS)
        .map(|(b, distance)| NearbyBuilding {
            id: b.id,
            kind: b.kind,
            position: b.position,
            distance,
            complete: b.complete,
            progress: b.progress,
        })
        .collect();
    nearby_buildings.sort_by(|x, y| x.distance.total_cmp(&y.distance));

    let mut nearby_beasts: Vec<NearbyBeast> = world
        .beasts
        .values()
        .map(|b| (b, b.position.distance_to(here)))
        .filter(|&(_, d)| d <= BEAST_RADIUS)
        .map(|(b, distance)| NearbyBeast {
            id: b.id,
            kind: b.kind,
            position: b.position,
            distance,
            health: b.health,
            aggressive: b.is_aggressive(),
            state: b.state,
        })
        .collect();
    nearby_beasts.sort_by(|x, y| x.distance.total_cmp(&y.distance));

    Ok(DecisionContext {
        agent_id: agent,
        name: a.name.clone(),
        position: here,
        attributes: a.attributes,
        skills: a.skills.clone(),
        inventory: a.inventory.clone(),
        equipment: a.equipment.clone(),
        personality: a.personality,
        calendar: world.calendar(),
        weather: world.weather.current(),
        nearby_resources,
        nearby_agents,
        nearby_buildings,
        nearby_beasts,
        last_result: a.last_result.clone(),
        recent_memories: world.recent(agent, RECENT_MEMORIES)?,
        critical_memories: critical_memories(world, agent)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_agents::remember;
    use hearth_agents::spawn_beast;
    use hearth_types::{BeastKind, Lifecycle, MemoryKind, Position, ResourceKind, ResourceNode};

    use super::*;
    use crate::decision::tests::personality;

    fn spawn(world: &mut World, name: &str, x: f64, y: f64) -> AgentId {
        world
            .add_agent(Agent::new(name, Position::new(x, y), personality()))
            .unwrap()
    }

    #[test]
    fn sees_only_what_is_in_range() {
        let mut world = World::new();
        let alice = spawn(&mut world, "Alice", 50.0, 50.0);
        spawn(&mut world, "Bob", 60.0, 50.0);
        spawn(&mut world, "Charlie", 80.0, 50.0);
        world
            .add_node(ResourceNode::new(ResourceKind::Wood, Position::new(55.0, 50.0), 50))
            .unwrap();
        world
            .add_node(ResourceNode::new(ResourceKind::Stone, Position::new(75.0, 50.0), 50))
            .unwrap();
        spawn_beast(&mut world, BeastKind::Wolf, Position::new(65.0, 50.0)).unwrap();

        let ctx = build_context(&world, alice).unwrap();
        assert_eq!(ctx.nearby_agents.len(), 1);
        assert_eq!(ctx.nearby_agents.first().unwrap().name, "Bob");
        assert_eq!(ctx.nearby_resources.len(), 1);
        assert_eq!(ctx.nearby_beasts.len(), 1);
    }

    #[test]
    fn depleted_nodes_are_hidden() {
        let mut world = World::new();
        let alice = spawn(&mut world, "Alice", 50.0, 50.0);
        let mut node = ResourceNode::new(ResourceKind::Berry, Position::new(52.0, 50.0), 10);
        node.quantity = 0;
        node.depleted = true;
        world.add_node(node).unwrap();
        assert!(build_context(&world, alice).unwrap().nearby_resources.is_empty());
    }

    #[test]
    fn critical_memories_are_separated() {
        let mut world = World::new();
        let alice = spawn(&mut world, "Alice", 50.0, 50.0);
        remember(&mut world, alice, MemoryKind::Death, "Saw Bob fall to a wolf", 9).unwrap();
        remember(&mut world, alice, MemoryKind::Action, "Gathered 5 wood", 5).unwrap();
        let ctx = build_context(&world, alice).unwrap();
        assert_eq!(ctx.recent_memories.len(), 2);
        assert_eq!(ctx.critical_memories.len(), 1);
    }

    #[test]
    fn cadence_and_urgency() {
        let mut world = World::new();
        let alice = spawn(&mut world, "Alice", 50.0, 50.0);
        let a = world.agent_mut(alice).unwrap();
        assert!(decision_due(a, 0.0, 30.0));

        a.last_decision_at = Some(100.0);
        assert!(!decision_due(a, 120.0, 30.0));
        assert!(decision_due(a, 130.0, 30.0));

        a.attributes.hunger = 85.0;
        assert!(decision_due(a, 101.0, 30.0));

        a.status.lifecycle = Lifecycle::Cooling;
        assert!(!decision_due(a, 200.0, 30.0));
    }
}
