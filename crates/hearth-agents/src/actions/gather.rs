//! Gathering from resource nodes.
//!
//! Dispatch claims the nearest non-depleted node of the requested kind that
//! is free (or already held by the agent) and walks the agent over if it is
//! out of reach. Completion re-checks the node, harvests, and may leave the
//! agent with a passing observation of its surroundings.

use hearth_types::{
    AgentId, EventKind, FailureReason, Importance, MemoryKind, ResolvedTarget, ResourceKind, Skill,
};
use hearth_world::World;
use hearth_world::resource::{GATHER_RANGE, gather_amount, harvest};
use rand::Rng;

use super::{Outcome, Plan, Prepared};
use crate::error::AgentError;
use crate::memory::remember;

/// Chance of noticing a resource within [`RESOURCE_NOTICE_RADIUS`].
pub const RESOURCE_NOTICE_CHANCE: f64 = 0.3;
/// Radius for resource observations.
pub const RESOURCE_NOTICE_RADIUS: f64 = 10.0;
/// Chance of noticing a beast within [`BEAST_NOTICE_RADIUS`].
pub const BEAST_NOTICE_CHANCE: f64 = 0.4;
/// Radius for beast observations.
pub const BEAST_NOTICE_RADIUS: f64 = 12.0;
/// Chance of noticing another agent within [`AGENT_NOTICE_RADIUS`].
pub const AGENT_NOTICE_CHANCE: f64 = 0.25;
/// Radius for agent observations.
pub const AGENT_NOTICE_RADIUS: f64 = 8.0;

/// The specialist skill trained by gathering `kind`.
pub const fn specialist_skill(kind: ResourceKind) -> Skill {
    match kind {
        ResourceKind::Wood => Skill::Woodcutting,
        ResourceKind::Stone => Skill::Mining,
        ResourceKind::Berry | ResourceKind::Water => Skill::Foraging,
    }
}

/// Claim the nearest available node of `kind`.
pub fn prepare(world: &mut World, agent: AgentId, kind: ResourceKind) -> Result<Prepared, AgentError> {
    let position = world.agent(agent)?.position;
    let Some(node_id) = world.nearest_available_node(kind, position, agent) else {
        return Ok(Prepared::reject(
            FailureReason::UnknownTarget,
            format!("No available {kind} source nearby"),
        ));
    };
    if !world.occupy(node_id, agent) {
        return Ok(Prepared::reject(
            FailureReason::SiteUnavailable,
            format!("The nearest {kind} source is taken"),
        ));
    }

    let node_position = world.nodes.get(&node_id).map_or(position, |n| n.position);
    let move_to = (position.distance_to(node_position) > GATHER_RANGE).then_some(node_position);
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Node(node_id)),
        move_to,
        note: format!("gathering {kind}"),
    }))
}

/// Harvest the claimed node.
pub fn complete(
    world: &mut World,
    agent: AgentId,
    target: Option<&ResolvedTarget>,
    rng: &mut impl Rng,
) -> Result<Outcome, AgentError> {
    let Some(&ResolvedTarget::Node(node_id)) = target else {
        return Ok(Outcome::failed(FailureReason::UnknownTarget, "Had nothing to gather from"));
    };
    let now = world.now();
    let (position, equipment) = {
        let a = world.agent(agent)?;
        (a.position, a.equipment.clone())
    };

    let Some(node) = world.nodes.get_mut(&node_id) else {
        return Ok(Outcome::failed(FailureReason::TargetVanished, "The resource was gone"));
    };
    let kind = node.kind;
    if node.depleted {
        return Ok(Outcome::failed(
            FailureReason::TargetVanished,
            format!("The {kind} source was already used up"),
        ));
    }
    let distance = node.position.distance_to(position);
    if distance > GATHER_RANGE {
        return Ok(Outcome::failed(
            FailureReason::OutOfRange,
            format!("The {kind} source was out of reach ({distance:.1} units away)"),
        ));
    }

    let requested = gather_amount(kind, &equipment);
    let result = harvest(node, requested, now);
    if result.depleted {
        world.emit(
            EventKind::ResourceDepleted,
            format!("A {kind} source was used up"),
            Importance::Medium,
            vec![agent],
        );
    }

    let a = world.agent_mut(agent)?;
    a.add_item(kind.item(), result.taken);
    a.add_skill(specialist_skill(kind), 1);
    a.add_skill(Skill::Gathering, 1);

    observe_surroundings(world, agent, rng)?;
    Ok(Outcome::success(format!("Gathered {} {kind}", result.taken)))
}

/// Maybe record what the agent notices around it after gathering.
pub fn observe_surroundings(world: &mut World, agent: AgentId, rng: &mut impl Rng) -> Result<(), AgentError> {
    let position = world.agent(agent)?.position;

    let resource = world
        .nodes
        .values()
        .filter(|n| !n.depleted)
        .map(|n| (n.kind, n.position.distance_to(position)))
        .filter(|&(_, d)| d < RESOURCE_NOTICE_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((kind, _)) = resource
        && rng.random_bool(RESOURCE_NOTICE_CHANCE)
    {
        remember(world, agent, MemoryKind::Observation, format!("Noticed {kind} nearby"), 3)?;
    }

    let beast = world
        .beasts
        .values()
        .map(|b| (b.kind, b.is_aggressive(), b.position.distance_to(position)))
        .filter(|&(_, _, d)| d < BEAST_NOTICE_RADIUS)
        .min_by(|a, b| a.2.total_cmp(&b.2));
    if let Some((kind, aggressive, _)) = beast
        && rng.random_bool(BEAST_NOTICE_CHANCE)
    {
        if aggressive {
            remember(
                world,
                agent,
                MemoryKind::Danger,
                format!("Saw a dangerous {kind} prowling nearby"),
                6,
            )?;
        } else {
            remember(world, agent, MemoryKind::Observation, format!("Saw a {kind} nearby"), 3)?;
        }
    }

    let neighbour = world
        .agents_near(position, AGENT_NOTICE_RADIUS, Some(agent))
        .first()
        .and_then(|&(id, _)| world.agents.get(&id))
        .map(|a| a.name.clone());
    if let Some(name) = neighbour
        && rng.random_bool(AGENT_NOTICE_CHANCE)
    {
        remember(
            world,
            agent,
            MemoryKind::Observation,
            format!("Ran into {name}, who looked busy"),
            3,
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_types::{EquipmentEntry, Item, Position, ResourceNode, Tool};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::actions::tests::{ready, spawn};

    fn node(world: &mut World, kind: ResourceKind, x: f64, qty: u32) -> hearth_types::NodeId {
        world
            .add_node(ResourceNode::new(kind, Position::new(x, 50.0), qty))
            .unwrap()
    }

    #[test]
    fn prepare_claims_nearest_and_walks_there() {
        let mut world = World::new();
        let id = spawn(&mut world, "Alice", 50.0, 50.0);
        let near = node(&mut world, ResourceKind::Wood, 55.0, 50);
        let _far = node(&mut world, ResourceKind::Wood, 80.0, 50);

        let plan = ready(prepare(&mut world, id, ResourceKind::Wood).unwrap()).unwrap();
        assert_eq!(plan.target, Some(ResolvedTarget::Node(near)));
        assert_eq!(plan.move_to, Some(Position::new(55.0, 50.0)));
        assert_eq!(world.nodes.get(&near).unwrap().occupied_by, Some(id));
    }

    #[test]
    fn taken_nodes_are_skipped() {
        let mut world = World::new();
        let a = spawn(&mut world, "Alice", 50.0, 50.0);
        let b = spawn(&mut world, "Bob", 50.0, 50.0);
        let only = node(&mut world, ResourceKind::Berry, 51.0, 20);
        assert!(world.occupy(only, a));

        let prepared = prepare(&mut world, b, ResourceKind::Berry).unwrap();
        assert!(matches!(prepared, Prepared::Rejected(_)));
        assert_eq!(world.nodes.get(&only).unwrap().occupied_by, Some(a));
    }

    #[test]
    fn out_of_range_completion_changes_no_inventory() {
        let mut world = World::new();
        let id = spawn(&mut world, "Charlie", 50.0, 50.0);
        let far = node(&mut world, ResourceKind::Stone, 60.0, 30);
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = complete(&mut world, id, Some(&ResolvedTarget::Node(far)), &mut rng).unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::OutOfRange));
        assert!(world.agent(id).unwrap().inventory.is_empty());
        assert_eq!(world.nodes.get(&far).unwrap().quantity, 30);
    }

    #[test]
    fn small_node_is_drained_and_depleted() {
        let mut world = World::new();
        let id = spawn(&mut world, "Diana", 50.0, 50.0);
        let small = node(&mut world, ResourceKind::Stone, 51.0, 3);
        world.agent_mut(id).unwrap().equipment.insert(
            Tool::StonePickaxe,
            EquipmentEntry {
                durability: 100,
                quality: 100,
                crafted_at: 0.0,
            },
        );
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = complete(&mut world, id, Some(&ResolvedTarget::Node(small)), &mut rng).unwrap();
        assert!(outcome.success);
        let n = world.nodes.get(&small).unwrap();
        assert_eq!(n.quantity, 0);
        assert!(n.depleted);
        let a = world.agent(id).unwrap();
        assert_eq!(a.item_count(Item::Stone), 3);
        assert_eq!(a.skill(Skill::Mining), 1);
        assert_eq!(a.skill(Skill::Gathering), 1);
        assert!(world.events().any(|e| e.kind == EventKind::ResourceDepleted));
    }
}
