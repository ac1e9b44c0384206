//! Combat between agents and beasts.
//!
//! Two entry points:
//!
//! - [`strike_beast`] -- an agent hits a beast (hunt/defend completion or an
//!   auto-counter). Kills remove the beast and drop meat.
//! - [`beast_attack`] -- a beast hits an agent. The victim may counter,
//!   is interrupted if it cannot, and nearby agents witness the attack.
//!
//! ## Damage
//!
//! | Strike        | Formula                                                   |
//! |---------------|-----------------------------------------------------------|
//! | Agent attack  | (15 + 0.8 × combat + bonus) × stamina factor × health factor |
//! | Auto-counter  | 10 + 0.5 × combat + (15 spear / 5 stone)                  |
//! | Beast counter | 0.5 × beast damage                                        |
//! | Beast attack  | beast damage                                              |
//!
//! Weapon bonus is 40 with a spear, 8 when carrying stone. Stamina factor is
//! `max(0.7, stamina / 100)`, health factor `max(0.6, health / 100)`.

use hearth_types::{
    ActionReport, Agent, AgentId, BeastId, BeastKind, BeastState, EventKind, Importance, Item, MemoryKind,
    Position, Skill,
};
use hearth_world::World;
use tracing::info;

use crate::actions::interrupt;
use crate::config::AgentConfig;
use crate::death::{DeathCause, handle_death};
use crate::error::AgentError;
use crate::memory::remember;

/// Reach without a spear.
pub const BASE_RANGE: f64 = 2.5;
/// Reach with a spear.
pub const SPEAR_RANGE: f64 = 4.5;
/// Stamina spent on a deliberate attack.
pub const ATTACK_STAMINA: f64 = 10.0;
/// Combat skill gained by a deliberate attack.
pub const ATTACK_SKILL_GAIN: u32 = 2;
/// Stamina spent on an auto-counter.
pub const COUNTER_STAMINA: f64 = 8.0;
/// Combat skill gained by an auto-counter.
pub const COUNTER_SKILL_GAIN: u32 = 1;
/// Radius in which agents witness a beast attack.
pub const WITNESS_RADIUS: f64 = 15.0;

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// How far `agent` can strike.
pub fn weapon_range(agent: &Agent) -> f64 {
    if agent.has_spear() { SPEAR_RANGE } else { BASE_RANGE }
}

/// Flat damage bonus of the agent's best weapon.
pub fn weapon_bonus(agent: &Agent) -> f64 {
    if agent.has_spear() {
        40.0
    } else if agent.item_count(Item::Stone) > 0 {
        8.0
    } else {
        0.0
    }
}

/// Damage of a deliberate attack.
pub fn attack_damage(agent: &Agent) -> f64 {
    let combat = f64::from(agent.skill(Skill::Combat));
    let stamina_factor = (agent.attributes.stamina / 100.0).max(0.7);
    let health_factor = (agent.attributes.health / 100.0).max(0.6);
    (0.8f64.mul_add(combat, 15.0) + weapon_bonus(agent)) * stamina_factor * health_factor
}

/// Damage of an auto-counter.
pub fn counter_damage(agent: &Agent) -> f64 {
    let bonus = if agent.has_spear() {
        15.0
    } else if agent.item_count(Item::Stone) > 0 {
        5.0
    } else {
        0.0
    };
    0.5f64.mul_add(f64::from(agent.skill(Skill::Combat)), 10.0) + bonus
}

/// Whether a just-attacked agent strikes back on its own.
pub fn will_counter(agent: &Agent) -> bool {
    let a = &agent.attributes;
    agent.alive
        && a.health > 20.0
        && agent.is_armed()
        && (agent.personality.bravery > 40 || a.health > 60.0)
        && a.stamina > 20.0
}

/// Raw meat dropped by a killed beast.
pub const fn meat_loot(kind: BeastKind) -> u32 {
    match kind {
        BeastKind::Rabbit => 2,
        BeastKind::Wolf => 3,
        BeastKind::Bear => 5,
        BeastKind::Deer => 4,
    }
}

// ---------------------------------------------------------------------------
// Agent strikes beast
// ---------------------------------------------------------------------------

/// Result of one strike on a beast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strike {
    /// The beast survived with this much health.
    Wounded {
        /// Health left.
        remaining: f64,
    },
    /// The beast died and dropped meat.
    Killed {
        /// Raw meat added to the striker's inventory.
        meat: u32,
    },
    /// The beast was already gone.
    Missed,
}

/// Apply `damage` from `agent` to `beast`.
pub fn strike_beast(world: &mut World, agent: AgentId, beast: BeastId, damage: f64) -> Result<Strike, AgentError> {
    let Some(b) = world.beasts.get_mut(&beast) else {
        return Ok(Strike::Missed);
    };
    b.health -= damage;
    if b.health > 0.0 {
        return Ok(Strike::Wounded { remaining: b.health });
    }

    let kind = b.kind;
    world.beasts.remove(&beast);
    let meat = meat_loot(kind);
    let name = {
        let a = world.agent_mut(agent)?;
        a.add_item(Item::RawMeat, meat);
        a.name.clone()
    };
    info!(agent = %agent, beast = %beast, kind = %kind, "Beast killed");
    world.emit(
        EventKind::BeastKilled,
        format!("{name} killed a {kind}"),
        Importance::High,
        vec![agent],
    );
    Ok(Strike::Killed { meat })
}

// ---------------------------------------------------------------------------
// Beast strikes agent
// ---------------------------------------------------------------------------

/// What happened when a beast attacked.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttackReport {
    /// Damage dealt to the victim.
    pub damage: f64,
    /// The victim died.
    pub victim_died: bool,
    /// Damage of the victim's counter, if it struck back.
    pub countered: Option<f64>,
    /// The counter killed the beast.
    pub beast_killed: bool,
    /// The victim's action was interrupted.
    pub interrupted: bool,
}

/// Resolve a strike by `beast` on `victim`.
pub fn beast_attack(
    world: &mut World,
    beast: BeastId,
    victim: AgentId,
    config: &AgentConfig,
) -> Result<AttackReport, AgentError> {
    let mut report = AttackReport::default();
    let Some((kind, damage)) = world.beasts.get(&beast).map(|b| (b.kind, b.damage)) else {
        return Ok(report);
    };
    let now = world.now();

    let (name, position) = {
        let a = world.agent_mut(victim)?;
        if !a.alive {
            return Ok(report);
        }
        a.attributes.adjust_health(-damage);
        (a.name.clone(), a.position)
    };
    report.damage = damage;
    if let Some(b) = world.beasts.get_mut(&beast) {
        b.last_attack_at = Some(now);
        b.state = BeastState::Attacking;
    }
    info!(beast = %beast, kind = %kind, victim = %victim, damage, "Beast attack");
    world.emit(
        EventKind::BeastAttack,
        format!("A {kind} attacked {name}"),
        Importance::High,
        vec![victim],
    );

    if world.agent(victim)?.attributes.health <= 0.0 {
        report.victim_died = handle_death(world, victim, DeathCause::Wounds(kind), config)?;
    } else {
        remember(world, victim, MemoryKind::Danger, format!("Attacked by a {kind}"), 8)?;
        counter_or_yield(world, beast, victim, kind, &mut report)?;
    }

    alert_witnesses(world, victim, &name, kind, position)?;

    if let Some(b) = world.beasts.get_mut(&beast) {
        b.state = BeastState::Idle;
        b.target = None;
    }
    Ok(report)
}

fn counter_or_yield(
    world: &mut World,
    beast: BeastId,
    victim: AgentId,
    kind: BeastKind,
    report: &mut AttackReport,
) -> Result<(), AgentError> {
    let (counters, armed, health) = {
        let a = world.agent(victim)?;
        (will_counter(a), a.is_armed(), a.attributes.health)
    };

    if counters {
        let damage = {
            let a = world.agent_mut(victim)?;
            let damage = counter_damage(a);
            a.attributes.adjust_stamina(-COUNTER_STAMINA);
            a.add_skill(Skill::Combat, COUNTER_SKILL_GAIN);
            damage
        };
        report.countered = Some(damage);
        if let Strike::Killed { meat } = strike_beast(world, victim, beast, damage)? {
            report.beast_killed = true;
            remember(
                world,
                victim,
                MemoryKind::Action,
                format!("Fought off a {kind} and killed it, taking {meat} raw meat"),
                8,
            )?;
        }
        return Ok(());
    }

    if health < 50.0 || !armed {
        interrupt(world, victim, format!("Attacked by a {kind}! Need to get away"))?;
        report.interrupted = true;
    }
    Ok(())
}

fn alert_witnesses(
    world: &mut World,
    victim: AgentId,
    victim_name: &str,
    kind: BeastKind,
    position: Position,
) -> Result<(), AgentError> {
    let now = world.now();
    for (witness, _) in world.agents_near(position, WITNESS_RADIUS, Some(victim)) {
        remember(
            world,
            witness,
            MemoryKind::Danger,
            format!("Saw a {kind} attack {victim_name}"),
            7,
        )?;
        let (armed, health, bravery) = {
            let a = world.agent(witness)?;
            (a.is_armed(), a.attributes.health, a.personality.bravery)
        };
        let able = armed && health > 50.0;
        if able && bravery > 30 {
            interrupt(world, witness, format!("{victim_name} needs help against a {kind}!"))?;
        } else if !able {
            world.agent_mut(witness)?.last_result = Some(ActionReport {
                action: None,
                success: false,
                reason: None,
                message: format!("A {kind} attacked {victim_name} nearby; staying careful"),
                at: now,
            });
        }
    }
    Ok(())
}
