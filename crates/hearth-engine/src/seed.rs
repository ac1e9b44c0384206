//! World seeding at simulation start.
//!
//! Places the starting agents around the spawn point, scatters resource
//! clusters across the map, and puts predators on the outer ring with
//! rabbits mostly in the middle. Every random choice comes from the one
//! seeded generator, so a seed always produces the same world.

use hearth_agents::spawn_beast;
use hearth_types::{Agent, Archetype, BeastKind, Personality, Position, ResourceKind, ResourceNode};
use hearth_world::World;
use hearth_world::geometry::clamp_to_world;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::error::EngineError;

/// Where agents start.
pub const SPAWN_POINT: Position = Position::new(50.0, 50.0);

/// Names given to the first agents, in order.
const NAMES: [&str; 8] = ["Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry"];

/// One kind of resource cluster.
struct ClusterSpec {
    kind: ResourceKind,
    clusters: u32,
    min_nodes: u32,
    max_nodes: u32,
    spread: f64,
    min_quantity: u32,
    max_quantity: u32,
}

const CLUSTERS: [ClusterSpec; 3] = [
    ClusterSpec {
        kind: ResourceKind::Wood,
        clusters: 15,
        min_nodes: 3,
        max_nodes: 5,
        spread: 3.0,
        min_quantity: 50,
        max_quantity: 150,
    },
    ClusterSpec {
        kind: ResourceKind::Stone,
        clusters: 10,
        min_nodes: 2,
        max_nodes: 4,
        spread: 2.0,
        min_quantity: 30,
        max_quantity: 100,
    },
    ClusterSpec {
        kind: ResourceKind::Berry,
        clusters: 20,
        min_nodes: 2,
        max_nodes: 6,
        spread: 4.0,
        min_quantity: 20,
        max_quantity: 50,
    },
];

const WATER_SOURCES: u32 = 5;
const WATER_QUANTITY: u32 = 9999;
const WOLF_PACKS: u32 = 3;
const BEARS: u32 = 2;
const RABBITS: u32 = 10;
/// Share of rabbits placed in the central square.
const CENTRAL_RABBIT_CHANCE: f64 = 0.7;

/// What was seeded, for the startup log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Agents placed.
    pub agents: u32,
    /// Resource nodes placed.
    pub nodes: u32,
    /// Beasts placed.
    pub beasts: u32,
}

/// The fixed trait profile of an archetype.
pub const fn personality(archetype: Archetype) -> Personality {
    let (bravery, sociability, cautiousness, curiosity, cooperation, ambition) = match archetype {
        Archetype::Brave => (85, 55, 25, 70, 60, 75),
        Archetype::Cautious => (30, 45, 85, 40, 70, 50),
        Archetype::Social => (50, 90, 50, 60, 85, 55),
        Archetype::Explorer => (65, 45, 35, 95, 50, 70),
        Archetype::Pragmatic => (50, 55, 65, 45, 75, 80),
        Archetype::Independent => (60, 30, 60, 55, 35, 65),
    };
    Personality {
        archetype,
        bravery,
        sociability,
        cautiousness,
        curiosity,
        cooperation,
        ambition,
    }
}

/// Build the starting world with `agent_count` agents.
///
/// # Errors
///
/// Returns [`EngineError`] if the world rejects a seeded entity.
pub fn seed_world(agent_count: u32, rng: &mut impl Rng) -> Result<(World, SeedSummary), EngineError> {
    let mut world = World::new();
    let mut summary = SeedSummary::default();

    for index in 0..agent_count {
        let name = usize::try_from(index)
            .ok()
            .and_then(|i| NAMES.get(i))
            .map_or_else(|| format!("Settler {}", index.saturating_add(1)), |n| (*n).to_owned());
        let archetype = Archetype::ALL.choose(rng).copied().unwrap_or(Archetype::Pragmatic);
        let offset_x = (f64::from(index) - f64::from(agent_count / 2)) * 2.0;
        let offset_y = (f64::from(index % 3) - 1.0) * 2.0;
        let position = clamp_to_world(Position::new(SPAWN_POINT.x + offset_x, SPAWN_POINT.y + offset_y));
        debug!(name = %name, archetype = ?archetype, "Seeding agent");
        world.add_agent(Agent::new(name, position, personality(archetype)))?;
        summary.agents = summary.agents.saturating_add(1);
    }

    for spec in &CLUSTERS {
        for _ in 0..spec.clusters {
            let center = Position::new(rng.random_range(5.0..=95.0), rng.random_range(5.0..=95.0));
            for _ in 0..rng.random_range(spec.min_nodes..=spec.max_nodes) {
                let position = clamp_to_world(Position::new(
                    center.x + rng.random_range(-spec.spread..=spec.spread),
                    center.y + rng.random_range(-spec.spread..=spec.spread),
                ));
                let quantity = rng.random_range(spec.min_quantity..=spec.max_quantity);
                let mut node = ResourceNode::new(spec.kind, position, quantity);
                node.max_quantity = spec.max_quantity;
                world.add_node(node)?;
                summary.nodes = summary.nodes.saturating_add(1);
            }
        }
    }

    for _ in 0..WATER_SOURCES {
        let position = Position::new(rng.random_range(10.0..=90.0), rng.random_range(10.0..=90.0));
        world.add_node(ResourceNode::new(ResourceKind::Water, position, WATER_QUANTITY))?;
        summary.nodes = summary.nodes.saturating_add(1);
    }

    for _ in 0..WOLF_PACKS {
        let den = outer_position(rng);
        for _ in 0..rng.random_range(2..=4_u32) {
            let position = Position::new(den.x + rng.random_range(-5.0..=5.0), den.y + rng.random_range(-5.0..=5.0));
            spawn_beast(&mut world, BeastKind::Wolf, position)?;
            summary.beasts = summary.beasts.saturating_add(1);
        }
    }
    for _ in 0..BEARS {
        let position = outer_position(rng);
        spawn_beast(&mut world, BeastKind::Bear, position)?;
        summary.beasts = summary.beasts.saturating_add(1);
    }
    for _ in 0..RABBITS {
        let position = if rng.random_bool(CENTRAL_RABBIT_CHANCE) {
            Position::new(rng.random_range(30.0..=70.0), rng.random_range(30.0..=70.0))
        } else {
            outer_position(rng)
        };
        spawn_beast(&mut world, BeastKind::Rabbit, position)?;
        summary.beasts = summary.beasts.saturating_add(1);
    }

    info!(
        agents = summary.agents,
        nodes = summary.nodes,
        beasts = summary.beasts,
        "World seeded"
    );
    Ok((world, summary))
}

/// A point in the band along one of the four map edges.
fn outer_position(rng: &mut impl Rng) -> Position {
    let along = rng.random_range(10.0..=90.0);
    match rng.random_range(0..4_u8) {
        0 => Position::new(along, rng.random_range(5.0..=25.0)),
        1 => Position::new(along, rng.random_range(75.0..=95.0)),
        2 => Position::new(rng.random_range(5.0..=25.0), along),
        _ => Position::new(rng.random_range(75.0..=95.0), along),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn seeded(agents: u32, seed: u64) -> (World, SeedSummary) {
        seed_world(agents, &mut SmallRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn agents_get_the_starting_names_near_spawn() {
        let (world, summary) = seeded(5, 1);
        assert_eq!(summary.agents, 5);

        let mut names: Vec<&str> = world.agents.values().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["Alice", "Bob", "Charlie", "Diana", "Eve"]);
        for agent in world.agents.values() {
            assert!(agent.position.distance_to(SPAWN_POINT) <= 6.0);
        }
    }

    #[test]
    fn agents_past_the_name_list_are_numbered() {
        let (world, _) = seeded(10, 2);
        assert!(world.agents.values().any(|a| a.name == "Settler 9"));
        assert!(world.agents.values().any(|a| a.name == "Settler 10"));
    }

    #[test]
    fn resources_follow_cluster_bounds() {
        let (world, _) = seeded(5, 3);
        let count = |kind| world.nodes.values().filter(|n| n.kind == kind).count();

        assert!((45..=75).contains(&count(ResourceKind::Wood)));
        assert!((20..=40).contains(&count(ResourceKind::Stone)));
        assert!((40..=120).contains(&count(ResourceKind::Berry)));
        assert_eq!(count(ResourceKind::Water), 5);

        for node in world.nodes.values() {
            match node.kind {
                ResourceKind::Wood => assert!((50..=150).contains(&node.quantity)),
                ResourceKind::Stone => assert!((30..=100).contains(&node.quantity)),
                ResourceKind::Berry => assert!((20..=50).contains(&node.quantity)),
                ResourceKind::Water => assert_eq!(node.quantity, WATER_QUANTITY),
            }
        }
    }

    #[test]
    fn predators_start_away_from_the_center() {
        let (world, _) = seeded(5, 4);
        let wolves = world.beasts.values().filter(|b| b.kind == BeastKind::Wolf).count();
        let bears = world.beasts.values().filter(|b| b.kind == BeastKind::Bear).count();
        let rabbits = world.beasts.values().filter(|b| b.kind == BeastKind::Rabbit).count();

        assert!((6..=12).contains(&wolves));
        assert_eq!(bears, 2);
        assert_eq!(rabbits, 10);

        for bear in world.beasts.values().filter(|b| b.kind == BeastKind::Bear) {
            assert!(bear.position.distance_to(SPAWN_POINT) > 20.0);
        }
    }

    #[test]
    fn same_seed_same_world() {
        let (a, _) = seeded(5, 42);
        let (b, _) = seeded(5, 42);

        let positions = |w: &World| {
            let mut p: Vec<(ResourceKind, u32)> = w.nodes.values().map(|n| (n.kind, n.quantity)).collect();
            p.sort();
            p
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn archetype_profiles() {
        let explorer = personality(Archetype::Explorer);
        assert_eq!(explorer.curiosity, 95);
        let independent = personality(Archetype::Independent);
        assert_eq!(independent.cooperation, 35);
    }
}
