//! Rule-driven beast behavior.
//!
//! Beasts never consult a decision provider. Every
//! [`DECISION_INTERVAL`] sim-seconds (and whenever a hungry aggressive
//! beast is wandering) [`evaluate`] picks a state; [`update_beasts`] then
//! moves each beast according to its state every tick.
//!
//! | Species | Health | Damage | Speed | Aggression |
//! |---------|--------|--------|-------|------------|
//! | wolf    | 50     | 8      | 3     | 0.7        |
//! | bear    | 100    | 15     | 2     | 0.9        |
//! | rabbit  | 10     | 0      | 5     | 0.0        |
//! | deer    | 30     | 5      | 4     | 0.1        |
//!
//! ## Evaluation
//!
//! 1. Aggressive and below 30 % health: flee.
//! 2. Aggressive and two or more armed, healthy agents within 10: flee.
//! 3. Aggressive: chase the nearest living agent within the chase radius
//!    (15; 18 when hungry; 20 when joining a packmate's chase), else wander.
//! 4. Otherwise: flee from any agent within 8, else wander.

use core::f64::consts::TAU;

use hearth_types::{AgentId, Beast, BeastId, BeastKind, BeastState, Position};
use hearth_world::World;
use hearth_world::geometry::{clamp_to_world, direction, offset, step_towards};
use rand::Rng;
use tracing::debug;

use crate::combat::{AttackReport, beast_attack};
use crate::config::AgentConfig;
use crate::error::AgentError;

/// Sim-seconds between behavior evaluations.
pub const DECISION_INTERVAL: f64 = 30.0;
/// Distance at which a chasing beast strikes. It never closes further.
pub const ATTACK_RANGE: f64 = 2.5;
/// Slack on [`ATTACK_RANGE`] for floating-point positions.
pub const ATTACK_SLACK: f64 = 0.05;
/// Sim-seconds between strikes.
pub const ATTACK_COOLDOWN: f64 = 3.0;
/// Default chase radius.
pub const CHASE_RADIUS: f64 = 15.0;
/// Chase radius of a hungry beast.
pub const HUNGRY_CHASE_RADIUS: f64 = 18.0;
/// Chase radius when joining a packmate.
pub const PACK_CHASE_RADIUS: f64 = 20.0;
/// Packmates within this radius coordinate.
pub const PACK_RADIUS: f64 = 20.0;
/// A chase is abandoned beyond this distance.
pub const ABANDON_RADIUS: f64 = 25.0;
/// Non-aggressive beasts flee from agents this close.
pub const SKITTISH_RADIUS: f64 = 8.0;
/// Fleeing stops once no agent is this close.
pub const SAFE_RADIUS: f64 = 15.0;
/// Radius in which armed agents scare off an aggressive beast.
pub const ARMED_GROUP_RADIUS: f64 = 10.0;
/// Hunger above which a beast chases from farther away.
pub const HUNGRY: f64 = 70.0;
/// Hunger gained per sim-second.
pub const HUNGER_RATE: f64 = 0.02;

/// Fixed stats of a species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeastStats {
    /// Health at spawn.
    pub health: f64,
    /// Damage per strike.
    pub damage: f64,
    /// Units per sim-second.
    pub speed: f64,
    /// 0 to 1.
    pub aggression: f64,
}

/// Stats of `kind`.
pub const fn stats(kind: BeastKind) -> BeastStats {
    let (health, damage, speed, aggression) = match kind {
        BeastKind::Wolf => (50.0, 8.0, 3.0, 0.7),
        BeastKind::Bear => (100.0, 15.0, 2.0, 0.9),
        BeastKind::Rabbit => (10.0, 0.0, 5.0, 0.0),
        BeastKind::Deer => (30.0, 5.0, 4.0, 0.1),
    };
    BeastStats {
        health,
        damage,
        speed,
        aggression,
    }
}

/// Create a beast of `kind` at `position` and add it to the world.
pub fn spawn_beast(world: &mut World, kind: BeastKind, position: Position) -> Result<BeastId, AgentError> {
    let s = stats(kind);
    let beast = Beast {
        id: BeastId::new(),
        kind,
        position: clamp_to_world(position),
        health: s.health,
        max_health: s.health,
        aggression: s.aggression,
        speed: s.speed,
        damage: s.damage,
        state: BeastState::Idle,
        target: None,
        move_target: None,
        last_attack_at: None,
        last_decision_at: None,
        hunger: 0.0,
    };
    Ok(world.add_beast(beast)?)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Pick a new state for `beast`. Returns `None` if it no longer exists.
pub fn evaluate(world: &mut World, beast: BeastId) -> Option<BeastState> {
    let now = world.now();
    let b = world.beasts.get(&beast)?;
    let (state, target) = choose(world, b);
    let b = world.beasts.get_mut(&beast)?;
    if b.state != state {
        debug!(beast = %beast, kind = %b.kind, from = ?b.state, to = ?state, "Beast state change");
    }
    b.state = state;
    b.target = target;
    b.last_decision_at = Some(now);
    if state != BeastState::Wandering {
        b.move_target = None;
    }
    Some(state)
}

fn choose(world: &World, b: &Beast) -> (BeastState, Option<AgentId>) {
    let nearby = world.agents_near(b.position, PACK_CHASE_RADIUS.max(SKITTISH_RADIUS), None);

    if !b.is_aggressive() {
        let scared = nearby.iter().any(|&(_, d)| d <= SKITTISH_RADIUS);
        return if scared {
            (BeastState::Fleeing, None)
        } else {
            (BeastState::Wandering, None)
        };
    }

    if b.health_fraction() < 0.3 {
        return (BeastState::Fleeing, None);
    }
    let armed = nearby
        .iter()
        .filter(|&&(_, d)| d <= ARMED_GROUP_RADIUS)
        .filter_map(|(id, _)| world.agents.get(id))
        .filter(|a| a.is_armed() && a.attributes.health > 50.0)
        .count();
    if armed >= 2 {
        return (BeastState::Fleeing, None);
    }

    if let Some(prey) = pack_prey(world, b) {
        return (BeastState::Chasing, Some(prey));
    }
    let radius = if b.hunger > HUNGRY { HUNGRY_CHASE_RADIUS } else { CHASE_RADIUS };
    nearby
        .iter()
        .find(|&&(_, d)| d <= radius)
        .map_or((BeastState::Wandering, None), |&(id, _)| (BeastState::Chasing, Some(id)))
}

/// The prey of a same-species packmate chasing within reach, if any.
fn pack_prey(world: &World, b: &Beast) -> Option<AgentId> {
    world
        .beasts
        .values()
        .filter(|other| other.id != b.id && other.kind == b.kind && other.state == BeastState::Chasing)
        .filter(|other| other.position.distance_to(b.position) <= PACK_RADIUS)
        .filter_map(|other| other.target)
        .filter_map(|prey| world.agents.get(&prey))
        .filter(|prey| prey.alive && prey.position.distance_to(b.position) <= PACK_CHASE_RADIUS)
        .min_by(|x, y| {
            x.position
                .distance_to(b.position)
                .total_cmp(&y.position.distance_to(b.position))
        })
        .map(|prey| prey.id)
}

// ---------------------------------------------------------------------------
// Per-tick update
// ---------------------------------------------------------------------------

/// Advance every beast by `dt` sim-seconds. Returns the attacks that landed.
pub fn update_beasts(
    world: &mut World,
    dt: f64,
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<Vec<AttackReport>, AgentError> {
    let now = world.now();
    let mut attacks = Vec::new();
    let ids: Vec<BeastId> = world.beasts.keys().copied().collect();

    for id in ids {
        let due = {
            let Some(b) = world.beasts.get_mut(&id) else {
                continue;
            };
            b.hunger = HUNGER_RATE.mul_add(dt, b.hunger).min(100.0);
            let restless = b.is_aggressive() && b.hunger > HUNGRY && b.state == BeastState::Wandering;
            restless || b.last_decision_at.is_none_or(|t| now - t >= DECISION_INTERVAL)
        };
        if due {
            evaluate(world, id);
        }

        let Some(state) = world.beasts.get(&id).map(|b| b.state) else {
            continue;
        };
        match state {
            BeastState::Idle => {
                if rng.random_bool(0.1)
                    && let Some(b) = world.beasts.get_mut(&id)
                {
                    b.state = BeastState::Wandering;
                }
            }
            BeastState::Wandering => wander(world, id, dt, rng),
            BeastState::Fleeing => flee(world, id, dt),
            BeastState::Chasing | BeastState::Attacking => {
                if let Some(report) = chase(world, id, dt, config)? {
                    attacks.push(report);
                }
            }
        }
    }
    Ok(attacks)
}

fn wander(world: &mut World, id: BeastId, dt: f64, rng: &mut impl Rng) {
    let Some(b) = world.beasts.get_mut(&id) else {
        return;
    };
    if let Some(to) = b.move_target {
        let (next, arrived) = step_towards(b.position, to, b.speed * 0.5 * dt);
        b.position = next;
        if arrived {
            b.move_target = None;
        }
    } else if rng.random_bool(0.2) {
        let angle = rng.random_range(0.0..TAU);
        let hop = rng.random_range(2.0..=5.0);
        let (sin, cos) = angle.sin_cos();
        b.move_target = Some(clamp_to_world(offset(b.position, cos, sin, hop)));
    }
}

fn flee(world: &mut World, id: BeastId, dt: f64) {
    let Some(position) = world.beasts.get(&id).map(|b| b.position) else {
        return;
    };
    let threat = world
        .agents_near(position, SAFE_RADIUS, None)
        .first()
        .and_then(|&(agent, _)| world.agents.get(&agent))
        .map(|a| a.position);
    let Some(b) = world.beasts.get_mut(&id) else {
        return;
    };
    let Some(threat) = threat else {
        b.state = BeastState::Wandering;
        b.move_target = None;
        return;
    };
    let (ux, uy) = direction(threat, b.position);
    b.position = clamp_to_world(offset(b.position, ux, uy, b.speed * 1.5 * dt));
}

fn chase(world: &mut World, id: BeastId, dt: f64, config: &AgentConfig) -> Result<Option<AttackReport>, AgentError> {
    let now = world.now();
    let Some((position, target)) = world.beasts.get(&id).map(|b| (b.position, b.target)) else {
        return Ok(None);
    };
    let prey = target
        .and_then(|t| world.agents.get(&t))
        .filter(|a| a.alive)
        .map(|a| (a.id, a.position));

    let Some(b) = world.beasts.get_mut(&id) else {
        return Ok(None);
    };
    let Some((prey, prey_at)) = prey.filter(|&(_, at)| at.distance_to(position) <= ABANDON_RADIUS) else {
        b.state = BeastState::Wandering;
        b.target = None;
        return Ok(None);
    };

    let distance = position.distance_to(prey_at);
    if distance > ATTACK_RANGE {
        let step = (b.speed * dt).min(distance - ATTACK_RANGE);
        b.position = step_towards(position, prey_at, step).0;
    }
    let in_range = b.position.distance_to(prey_at) <= ATTACK_RANGE + ATTACK_SLACK;
    let ready = b.last_attack_at.is_none_or(|t| now - t >= ATTACK_COOLDOWN);
    if in_range && ready {
        return beast_attack(world, id, prey, config).map(Some);
    }
    Ok(None)
}
