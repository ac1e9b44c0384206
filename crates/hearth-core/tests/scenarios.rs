//! End-to-end scenarios for the Hearth tick cycle.
//!
//! Each test builds a small world by hand, drives it through the public
//! API of `hearth-core` and `hearth-agents`, and checks one behavior an
//! observer of the simulation relies on.

#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::float_cmp
)]

use hearth_agents::actions::duration::{MAX_DURATION, MIN_DURATION, scale_duration};
use hearth_agents::actions::{self, DispatchOutcome};
use hearth_agents::beast::evaluate;
use hearth_agents::combat::beast_attack;
use hearth_agents::{AgentConfig, DeathCause, handle_death, spawn_beast};
use hearth_core::decision::DecisionError;
use hearth_core::{DecisionProvider, RuleBasedProvider, SimulationConfig, SimulationState, run_tick};
use hearth_types::{
    Action, Agent, AgentId, Archetype, Attributes, BeastKind, BeastState, BuildingKind, ConversationContext,
    ConversationScript, Decision, DecisionContext, EventKind, Item, Lifecycle, MemoryKind, ParticipantMemory,
    Personality, Position, ResourceKind, ResourceNode, SummaryContext,
};
use hearth_world::World;
use hearth_world::resource::harvest;
use hearth_world::structure::{cooperation_factor, progress_construction};
use rand::SeedableRng;
use rand::rngs::SmallRng;

// =============================================================================
// Helpers
// =============================================================================

fn personality(bravery: u32) -> Personality {
    Personality {
        archetype: Archetype::Pragmatic,
        bravery,
        sociability: 50,
        cautiousness: 50,
        curiosity: 50,
        cooperation: 50,
        ambition: 50,
    }
}

fn add(world: &mut World, name: &str, x: f64, y: f64) -> AgentId {
    world
        .add_agent(Agent::new(name, Position::new(x, y), personality(50)))
        .unwrap()
}

fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.agents.ambient_chat_chance = 0.0;
    config
}

/// Always wants to talk; leaves the content to the fallbacks.
struct Talkative;

impl DecisionProvider for Talkative {
    fn name(&self) -> &'static str {
        "talkative"
    }

    async fn decide(&self, _context: &DecisionContext) -> Result<Decision, DecisionError> {
        Ok(Decision::new(Action::Talk { with: None }, "feeling chatty"))
    }

    async fn converse(&self, _context: &ConversationContext) -> Result<ConversationScript, DecisionError> {
        Err(DecisionError::Timeout { timeout_ms: 8000 })
    }

    async fn summarize(&self, _context: &SummaryContext) -> Result<Vec<ParticipantMemory>, DecisionError> {
        Err(DecisionError::Timeout { timeout_ms: 8000 })
    }
}

// =============================================================================
// Invariants
// =============================================================================

#[tokio::test]
async fn attributes_stay_in_bounds_over_a_long_run() {
    let mut world = World::new();
    for (i, name) in ["Alice", "Bob", "Charlie", "Diana"].iter().enumerate() {
        let offset = f64::from(u8::try_from(i).unwrap()) * 3.0;
        add(&mut world, name, 45.0 + offset, 50.0);
    }
    world
        .add_node(ResourceNode::new(ResourceKind::Wood, Position::new(48.0, 52.0), 60))
        .unwrap();
    world
        .add_node(ResourceNode::new(ResourceKind::Berry, Position::new(52.0, 48.0), 30))
        .unwrap();
    world
        .add_node(ResourceNode::new(ResourceKind::Water, Position::new(40.0, 40.0), 9999))
        .unwrap();
    spawn_beast(&mut world, BeastKind::Wolf, Position::new(60.0, 50.0)).unwrap();
    spawn_beast(&mut world, BeastKind::Rabbit, Position::new(50.0, 60.0)).unwrap();

    let mut state = SimulationState::new(world, &SimulationConfig::default()).unwrap();
    let provider = RuleBasedProvider::new(7);
    for _ in 0..400 {
        run_tick(&mut state, &provider, 1.0).await.unwrap();
        for agent in state.world.agents.values() {
            let a = agent.attributes;
            for value in [a.health, a.hunger, a.stamina] {
                assert!((0.0..=100.0).contains(&value), "{} out of bounds: {a:?}", agent.name);
            }
        }
    }
    assert_eq!(state.clock.tick(), 400);
}

#[test]
fn node_occupancy_needs_a_release_between_owners() {
    let mut world = World::new();
    let alice = add(&mut world, "Alice", 50.0, 50.0);
    let bob = add(&mut world, "Bob", 51.0, 50.0);
    let node = world
        .add_node(ResourceNode::new(ResourceKind::Stone, Position::new(50.0, 51.0), 30))
        .unwrap();

    assert!(world.occupy(node, alice));
    assert!(!world.occupy(node, bob));
    assert_eq!(world.nodes.get(&node).unwrap().occupied_by, Some(alice));

    world.release_occupancy(alice);
    assert!(world.occupy(node, bob));
    assert_eq!(world.nodes.get(&node).unwrap().occupied_by, Some(bob));
}

#[test]
fn death_is_handled_once() {
    let mut world = World::new();
    let alice = add(&mut world, "Alice", 50.0, 50.0);
    let bob = add(&mut world, "Bob", 55.0, 50.0);
    let config = AgentConfig::default();

    assert!(handle_death(&mut world, alice, DeathCause::Starvation, &config).unwrap());
    let witness_memories = world.agent(bob).unwrap().memories.len();
    assert!(!handle_death(&mut world, alice, DeathCause::Starvation, &config).unwrap());

    let deaths = world.events().filter(|e| e.kind == EventKind::NpcDeath).count();
    assert_eq!(deaths, 1);
    assert_eq!(world.agent(bob).unwrap().memories.len(), witness_memories);
    assert!(!world.agent(alice).unwrap().alive);
}

#[test]
fn out_of_range_gather_changes_nothing() {
    let mut world = World::new();
    let alice = add(&mut world, "Alice", 50.0, 50.0);
    let node = world
        .add_node(ResourceNode::new(ResourceKind::Wood, Position::new(51.0, 50.0), 50))
        .unwrap();
    let config = AgentConfig::default();
    let mut rng = SmallRng::seed_from_u64(42);

    let decision = Decision::new(Action::Gather { resource: ResourceKind::Wood }, "need wood");
    let outcome = actions::dispatch(&mut world, alice, &decision, &config, &mut rng).unwrap();
    assert!(matches!(outcome, DispatchOutcome::Started { .. }));

    // Walk away before the timer runs out.
    {
        let a = world.agent_mut(alice).unwrap();
        a.position = Position::new(80.0, 80.0);
        a.move_target = None;
        if let Some(current) = a.current.as_mut() {
            current.ends_at = Some(0.0);
        }
    }
    let report = actions::complete_if_due(&mut world, alice, &config, &mut rng)
        .unwrap()
        .unwrap();
    assert!(!report.success);
    assert_eq!(world.agent(alice).unwrap().item_count(Item::Wood), 0);
    assert_eq!(world.nodes.get(&node).unwrap().quantity, 50);
    assert!(!world.nodes.get(&node).unwrap().depleted);
}

#[test]
fn durations_are_clamped() {
    let fresh = Attributes::default();
    assert_eq!(scale_duration(3.0, None, 0, &fresh), MIN_DURATION);

    let worn = Attributes {
        health: 40.0,
        hunger: 50.0,
        stamina: 20.0,
    };
    assert_eq!(scale_duration(100.0, None, 0, &worn), MAX_DURATION);
}

// =============================================================================
// Construction and resources
// =============================================================================

#[test]
fn campfire_site_consumes_the_wood() {
    let mut world = World::new();
    let alice = add(&mut world, "Alice", 50.0, 50.0);
    world.agent_mut(alice).unwrap().add_item(Item::Wood, 5);
    let mut rng = SmallRng::seed_from_u64(42);

    let decision = Decision::new(Action::Build { building: BuildingKind::Campfire }, "warmth");
    let outcome = actions::dispatch(&mut world, alice, &decision, &AgentConfig::default(), &mut rng).unwrap();
    assert_eq!(outcome, DispatchOutcome::Started { ends_at: None });

    let site = world.buildings.values().next().unwrap();
    assert_eq!(site.kind, BuildingKind::Campfire);
    assert!(!site.complete);
    assert_eq!(site.progress, 0.0);
    assert_eq!(world.agent(alice).unwrap().item_count(Item::Wood), 0);
}

#[test]
fn lone_builder_progresses_at_base_rate() {
    let mut world = World::new();
    let alice = add(&mut world, "Alice", 50.0, 50.0);
    {
        let a = world.agent_mut(alice).unwrap();
        a.add_item(Item::Wood, 30);
        a.add_item(Item::Stone, 15);
    }
    let mut rng = SmallRng::seed_from_u64(42);
    let decision = Decision::new(Action::Build { building: BuildingKind::WoodenHut }, "shelter");
    actions::dispatch(&mut world, alice, &decision, &AgentConfig::default(), &mut rng).unwrap();

    assert_eq!(cooperation_factor(1), 1.0);
    let completed = progress_construction(&mut world, 1.0);
    assert!(completed.is_empty());
    let hut = world.buildings.values().next().unwrap();
    assert!(hut.requires_cooperation);
    assert_eq!(hut.builders, vec![alice]);
    assert!((hut.progress - 1.0 / 240.0).abs() < 1e-12);
}

#[test]
fn small_node_is_emptied_not_overdrawn() {
    let mut node = ResourceNode::new(ResourceKind::Stone, Position::new(10.0, 10.0), 30);
    node.quantity = 3;
    let result = harvest(&mut node, 5, 100.0);
    assert_eq!(result.taken, 3);
    assert!(result.depleted);
    assert!(node.depleted);
    assert_eq!(node.quantity, 0);
    assert_eq!(node.depleted_at, Some(100.0));
}

// =============================================================================
// Beasts and combat
// =============================================================================

#[test]
fn badly_wounded_wolf_flees() {
    let mut world = World::new();
    add(&mut world, "Alice", 52.0, 50.0);
    let wolf = spawn_beast(&mut world, BeastKind::Wolf, Position::new(50.0, 50.0)).unwrap();
    world.beasts.get_mut(&wolf).unwrap().health = 14.0;

    assert_eq!(evaluate(&mut world, wolf), Some(BeastState::Fleeing));
    assert_eq!(world.beasts.get(&wolf).unwrap().state, BeastState::Fleeing);
}

#[test]
fn attacked_unarmed_agent_drops_what_it_was_doing() {
    let mut world = World::new();
    let alice = world
        .add_agent(Agent::new("Alice", Position::new(50.0, 50.0), personality(10)))
        .unwrap();
    world.agent_mut(alice).unwrap().attributes.health = 60.0;
    let config = AgentConfig::default();
    let mut rng = SmallRng::seed_from_u64(42);
    actions::dispatch(&mut world, alice, &Decision::new(Action::Rest, "tired"), &config, &mut rng).unwrap();
    assert_eq!(world.agent(alice).unwrap().status.lifecycle, Lifecycle::Executing);

    let bear = spawn_beast(&mut world, BeastKind::Bear, Position::new(51.0, 50.0)).unwrap();
    let report = beast_attack(&mut world, bear, alice, &config).unwrap();

    assert!(report.interrupted);
    assert!(report.countered.is_none());
    let a = world.agent(alice).unwrap();
    assert!((a.attributes.health - 45.0).abs() < 1e-9);
    assert_eq!(a.status.lifecycle, Lifecycle::Idle);
    assert!(a.current.is_none());
}

// =============================================================================
// Conversations
// =============================================================================

#[tokio::test]
async fn two_agents_talk_and_each_remember_it_once() {
    let mut world = World::new();
    let alice = add(&mut world, "Alice", 50.0, 50.0);
    let bob = add(&mut world, "Bob", 53.0, 50.0);
    let mut state = SimulationState::new(world, &quiet_config()).unwrap();

    run_tick(&mut state, &Talkative, 1.0).await.unwrap();
    assert_eq!(state.world.conversations.len(), 1);
    let conversation = state.world.conversations.values().next().unwrap();
    assert_eq!(conversation.participants.len(), 2);
    for id in [alice, bob] {
        assert!(state.world.agent(id).unwrap().is_conversing());
    }

    let mut ticks = 1;
    while !state.world.conversations.is_empty() {
        run_tick(&mut state, &Talkative, 1.0).await.unwrap();
        ticks += 1;
        assert!(ticks <= 50, "conversation never ended");
    }
    assert!(ticks >= 30);

    for id in [alice, bob] {
        let a = state.world.agent(id).unwrap();
        assert!(!a.is_conversing());
        assert_eq!(a.memories.len(), 1);
        assert_eq!(a.memories.first().unwrap().kind, MemoryKind::Conversation);
    }
    assert!(state.world.events().any(|e| e.kind == EventKind::ConversationEnd));
}
