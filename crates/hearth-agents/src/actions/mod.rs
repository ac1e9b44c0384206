//! The agent action state machine: dispatch, completion, cooling, and
//! interruption.
//!
//! ```text
//! idle --dispatch--> executing --ends_at--> cooling --2..5 s--> idle
//!   ^                    |
//!   +----interrupt-------+
//! ```
//!
//! Every action kind implements the same contract in its submodule: a
//! `prepare` step that resolves the typed target once and either rejects
//! with an [`ActionFailure`] or returns a [`Plan`], and a `complete` step
//! that applies effects and returns an [`Outcome`]. This module owns the
//! shared machinery: durations, timers, cooling, feedback, and forced
//! interruption.
//!
//! `build` and `talk` are unbounded (`ends_at = None`). A build session
//! ends when the construction pass completes the site or the site goes
//! away; a talk ends with its conversation.
//!
//! # Submodules
//!
//! - [`build`] -- Founding and joining building sites, builder rewards.
//! - [`craft`] -- Crafting tools and weapons.
//! - [`duration`] -- Base durations and modifiers.
//! - [`gather`] -- Harvesting resource nodes, environmental observation.
//! - [`hunt`] -- Hunting and defending against beasts.
//! - [`share`] -- Giving items to a nearby agent.
//! - [`survival`] -- Eating, resting, and cooking.
//! - [`travel`] -- Moving, exploring, and fleeing.

pub mod build;
pub mod craft;
pub mod duration;
pub mod gather;
pub mod hunt;
pub mod share;
pub mod survival;
pub mod travel;

use hearth_types::{
    Action, ActionFailure, ActionKind, ActionReport, ActiveAction, AgentId, Decision, FailureReason,
    Lifecycle, Locomotion, MemoryKind, Notification, Position, ResolvedTarget,
};
use hearth_world::World;
use rand::Rng;
use tracing::debug;

use crate::config::AgentConfig;
use crate::conversation;
use crate::error::AgentError;
use crate::memory::remember;
use crate::movement::set_move_target;

/// Importance of the memory recorded for a successful action.
pub const SUCCESS_IMPORTANCE: u8 = 5;

/// Importance of the memory recorded for a failed action.
pub const FAILURE_IMPORTANCE: u8 = 6;

// ---------------------------------------------------------------------------
// Contract types
// ---------------------------------------------------------------------------

/// A validated action, ready to start executing.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// The resolved target, if the action has one.
    pub target: Option<ResolvedTarget>,
    /// Where the agent should walk while executing.
    pub move_to: Option<Position>,
    /// Short description for observers.
    pub note: String,
}

impl Plan {
    /// A plan with no target and no movement.
    pub fn here(note: impl Into<String>) -> Self {
        Self {
            target: None,
            move_to: None,
            note: note.into(),
        }
    }
}

/// Result of the `prepare` step of one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    /// Validation passed.
    Ready(Plan),
    /// Validation failed; the agent stays idle.
    Rejected(ActionFailure),
    /// A talk found partners; the caller generates the script and starts
    /// the conversation.
    Converse {
        /// Chosen partners, nearest first.
        partners: Vec<AgentId>,
    },
}

impl Prepared {
    /// Shorthand for a rejection.
    pub fn reject(reason: FailureReason, message: impl Into<String>) -> Self {
        Self::Rejected(ActionFailure::new(reason, message))
    }
}

/// What [`dispatch`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The agent is now executing. `ends_at` is `None` for unbounded actions.
    Started {
        /// Sim-time the action completes.
        ends_at: Option<f64>,
    },
    /// Validation failed; the agent is idle with the reason recorded.
    Failed(ActionFailure),
    /// A talk is ready to start with these partners.
    ConversationRequested {
        /// Chosen partners, nearest first.
        partners: Vec<AgentId>,
    },
}

/// Effects of a completed action, before feedback is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the action achieved its goal.
    pub success: bool,
    /// Structured reason for a failure.
    pub reason: Option<FailureReason>,
    /// Human-readable result, also the memory text.
    pub message: String,
    /// Importance of the resulting memory.
    pub importance: u8,
}

impl Outcome {
    /// A successful outcome.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: None,
            message: message.into(),
            importance: SUCCESS_IMPORTANCE,
        }
    }

    /// A failed outcome.
    pub fn failure(failure: ActionFailure) -> Self {
        Self {
            success: false,
            reason: Some(failure.reason),
            message: failure.message,
            importance: FAILURE_IMPORTANCE,
        }
    }

    /// Shorthand for a failure built from parts.
    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Self::failure(ActionFailure::new(reason, message))
    }

    /// Override the memory importance.
    #[must_use]
    pub const fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance;
        self
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Validate `decision` for `agent` and start executing it.
///
/// The agent must be alive. Callers only dispatch to idle agents; a
/// rejection leaves the agent idle with the reason recorded and memorized.
pub fn dispatch(
    world: &mut World,
    agent: AgentId,
    decision: &Decision,
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<DispatchOutcome, AgentError> {
    if !world.agent(agent)?.alive {
        return Err(AgentError::AgentDead(agent));
    }

    let prepared = match &decision.action {
        Action::Move { x, y } => travel::prepare_move(*x, *y),
        Action::Gather { resource } => gather::prepare(world, agent, *resource)?,
        Action::Hunt { target } | Action::Defend { target } => {
            hunt::prepare(world, agent, target.as_ref())?
        }
        Action::Craft { item } => craft::prepare(world, agent, *item)?,
        Action::Build { building } => build::prepare(world, agent, *building, rng)?,
        Action::Eat { food } => survival::prepare_eat(world, agent, *food)?,
        Action::Rest => Prepared::Ready(Plan::here("resting")),
        Action::Talk { with } => conversation::prepare(world, agent, with.as_ref(), config)?,
        Action::Explore => travel::prepare_explore(world, agent, rng)?,
        Action::Flee => travel::prepare_flee(world, agent, rng)?,
        Action::Share { with, .. } => share::prepare(world, agent, with, config)?,
        Action::Cook => survival::prepare_cook(world, agent)?,
    };

    match prepared {
        Prepared::Ready(plan) => start(world, agent, decision, plan),
        Prepared::Rejected(failure) => {
            record_failure(world, agent, decision.action.kind(), &failure)?;
            Ok(DispatchOutcome::Failed(failure))
        }
        Prepared::Converse { partners } => Ok(DispatchOutcome::ConversationRequested { partners }),
    }
}

fn start(
    world: &mut World,
    agent: AgentId,
    decision: &Decision,
    plan: Plan,
) -> Result<DispatchOutcome, AgentError> {
    let now = world.now();
    let length = duration::action_duration(world, agent, &decision.action, plan.target.as_ref())?;
    let ends_at = length.map(|d| now + d);
    let kind = decision.action.kind();

    let name = {
        let a = world.agent_mut(agent)?;
        a.current = Some(ActiveAction {
            action: decision.action.clone(),
            target: plan.target,
            reasoning: decision.reasoning.clone(),
            started_at: now,
            ends_at,
        });
        a.status.lifecycle = Lifecycle::Executing;
        a.cooldown_until = None;
        a.name.clone()
    };
    if let Some(destination) = plan.move_to {
        set_move_target(world, agent, destination)?;
    }

    debug!(agent = %agent, action = %kind, duration = ?length, "Action started");
    let message = if decision.reasoning.is_empty() {
        plan.note
    } else {
        format!("{}: {}", plan.note, decision.reasoning)
    };
    world.notify(Notification::NpcAction {
        agent_id: agent,
        agent_name: name,
        action: kind,
        message,
        success: true,
    });
    Ok(DispatchOutcome::Started { ends_at })
}

/// Record a dispatch-time rejection: feedback, memory, notification.
pub fn record_failure(
    world: &mut World,
    agent: AgentId,
    kind: ActionKind,
    failure: &ActionFailure,
) -> Result<(), AgentError> {
    let now = world.now();
    let name = {
        let a = world.agent_mut(agent)?;
        a.current = None;
        if a.alive {
            a.status.lifecycle = Lifecycle::Idle;
        }
        a.last_result = Some(ActionReport {
            action: Some(kind),
            success: false,
            reason: Some(failure.reason),
            message: failure.message.clone(),
            at: now,
        });
        a.name.clone()
    };
    remember(world, agent, MemoryKind::Failure, failure.message.clone(), FAILURE_IMPORTANCE)?;
    debug!(agent = %agent, action = %kind, reason = ?failure.reason, "Action rejected");
    world.notify(Notification::NpcAction {
        agent_id: agent,
        agent_name: name,
        action: kind,
        message: failure.message.clone(),
        success: false,
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Complete the agent's action if its timer has run out.
///
/// Returns the recorded report, or `None` when nothing was due (or the
/// agent died while the action resolved).
pub fn complete_if_due(
    world: &mut World,
    agent: AgentId,
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<Option<ActionReport>, AgentError> {
    let now = world.now();
    let active = {
        let a = world.agent(agent)?;
        if !a.alive || a.status.lifecycle != Lifecycle::Executing {
            return Ok(None);
        }
        match &a.current {
            Some(active) if active.ends_at.is_some_and(|t| now >= t) => active.clone(),
            _ => return Ok(None),
        }
    };
    let target = active.target.as_ref();

    let outcome = match &active.action {
        Action::Move { .. } => travel::complete_move(world, agent)?,
        Action::Gather { .. } => gather::complete(world, agent, target, rng)?,
        Action::Hunt { .. } | Action::Defend { .. } => hunt::complete(world, agent, target, config)?,
        Action::Craft { item } => craft::complete(world, agent, *item)?,
        Action::Build { .. } => build::complete_session(world, target)?,
        Action::Eat { food } => survival::complete_eat(world, agent, *food)?,
        Action::Rest => survival::complete_rest(world, agent)?,
        Action::Talk { .. } => Outcome::success("Finished talking"),
        Action::Explore => travel::complete_explore(world, agent)?,
        Action::Flee => travel::complete_flee(world, agent)?,
        Action::Share { with, item } => share::complete(world, agent, with, *item, config)?,
        Action::Cook => survival::complete_cook(world, agent, target)?,
    };

    if !world.agent(agent)?.alive {
        return Ok(None);
    }
    finish(world, agent, active.action.kind(), outcome, config, rng).map(Some)
}

/// End a build session whose site completed elsewhere or disappeared.
///
/// Builders inside the radius are rewarded by [`build::reward_builders`];
/// this catches the ones that were not.
pub fn check_build_session(
    world: &mut World,
    agent: AgentId,
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<Option<ActionReport>, AgentError> {
    let target = {
        let a = world.agent(agent)?;
        if !a.alive || a.status.lifecycle != Lifecycle::Executing {
            return Ok(None);
        }
        match &a.current {
            Some(ActiveAction {
                action: Action::Build { .. },
                target,
                ..
            }) => *target,
            _ => return Ok(None),
        }
    };
    let Some(outcome) = build::stale_session(world, target.as_ref()) else {
        return Ok(None);
    };
    finish(world, agent, ActionKind::Build, outcome, config, rng).map(Some)
}

/// Record an outcome and move the agent into cooling.
pub fn finish(
    world: &mut World,
    agent: AgentId,
    kind: ActionKind,
    outcome: Outcome,
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<ActionReport, AgentError> {
    let now = world.now();
    let report = ActionReport {
        action: Some(kind),
        success: outcome.success,
        reason: outcome.reason,
        message: outcome.message.clone(),
        at: now,
    };
    world.release_occupancy(agent);

    let cooling = cooling_time(config, rng);
    let name = {
        let a = world.agent_mut(agent)?;
        a.current = None;
        a.last_result = Some(report.clone());
        a.status.lifecycle = Lifecycle::Cooling;
        a.cooldown_until = Some(now + cooling);
        a.name.clone()
    };

    let memory_kind = if outcome.success {
        MemoryKind::Action
    } else {
        MemoryKind::Failure
    };
    remember(world, agent, memory_kind, outcome.message.clone(), outcome.importance)?;
    debug!(agent = %agent, action = %kind, success = outcome.success, "Action complete");
    world.notify(Notification::NpcAction {
        agent_id: agent,
        agent_name: name,
        action: kind,
        message: outcome.message,
        success: outcome.success,
    });
    Ok(report)
}

/// Jittered post-action cooling in `[cooling_min, cooling_max]`.
pub fn cooling_time(config: &AgentConfig, rng: &mut impl Rng) -> f64 {
    if config.cooling_max > config.cooling_min {
        rng.random_range(config.cooling_min..=config.cooling_max)
    } else {
        config.cooling_min.max(0.0)
    }
}

/// Return a cooled-down agent to idle. Returns `true` on the transition.
pub fn finish_cooling(world: &mut World, agent: AgentId) -> Result<bool, AgentError> {
    let now = world.now();
    let a = world.agent_mut(agent)?;
    if !a.alive || a.status.lifecycle != Lifecycle::Cooling {
        return Ok(false);
    }
    if a.cooldown_until.is_some_and(|t| now < t) {
        return Ok(false);
    }
    a.status.lifecycle = Lifecycle::Idle;
    a.cooldown_until = None;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Interruption
// ---------------------------------------------------------------------------

/// Forcibly stop whatever `agent` is doing.
///
/// Skips completion: timers clear, movement stops, held occupancy is
/// released, and the agent is idle immediately with `message` as its last
/// result. Conversation linkage is left alone.
pub fn interrupt(world: &mut World, agent: AgentId, message: impl Into<String>) -> Result<(), AgentError> {
    let now = world.now();
    world.release_occupancy(agent);
    let a = world.agent_mut(agent)?;
    if !a.alive {
        return Ok(());
    }
    let kind = a.current_kind();
    a.current = None;
    a.move_target = None;
    a.cooldown_until = None;
    a.status.lifecycle = Lifecycle::Idle;
    a.status.locomotion = Locomotion::Stationary;
    a.last_result = Some(ActionReport {
        action: kind,
        success: false,
        reason: None,
        message: message.into(),
        at: now,
    });
    debug!(agent = %agent, interrupted = ?kind, "Action interrupted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use hearth_types::{Agent, Archetype, Item, Personality, ResourceKind, ResourceNode};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    pub(crate) fn personality(bravery: u32) -> Personality {
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

    pub(crate) fn spawn(world: &mut World, name: &str, x: f64, y: f64) -> AgentId {
        world
            .add_agent(Agent::new(name, Position::new(x, y), personality(50)))
            .unwrap()
    }

    pub(crate) fn ready(prepared: Prepared) -> Option<Plan> {
        match prepared {
            Prepared::Ready(plan) => Some(plan),
            _ => None,
        }
    }

    #[test]
    fn rejected_dispatch_stays_idle_and_remembers() {
        let mut world = World::new();
        let id = spawn(&mut world, "Alice", 50.0, 50.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let decision = Decision::new(Action::Eat { food: Item::Berry }, "hungry");

        let out = dispatch(&mut world, id, &decision, &AgentConfig::default(), &mut rng).unwrap();
        assert!(matches!(out, DispatchOutcome::Failed(_)));

        let a = world.agent(id).unwrap();
        assert_eq!(a.status.lifecycle, Lifecycle::Idle);
        assert!(a.current.is_none());
        assert_eq!(a.memories.last().unwrap().kind, MemoryKind::Failure);
        assert!(!a.last_result.as_ref().unwrap().success);
    }

    #[test]
    fn action_runs_through_cooling_back_to_idle() {
        let mut world = World::new();
        let id = spawn(&mut world, "Bob", 50.0, 50.0);
        let config = AgentConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);

        let out = dispatch(&mut world, id, &Decision::new(Action::Rest, ""), &config, &mut rng).unwrap();
        assert!(matches!(out, DispatchOutcome::Started { ends_at: Some(_) }));
        let ends_at = world.agent(id).unwrap().current.as_ref().unwrap().ends_at.unwrap();
        assert_eq!(world.agent(id).unwrap().status.lifecycle, Lifecycle::Executing);

        let mut calendar = world.calendar();
        calendar.sim_time = ends_at;
        world.set_time(calendar, 1);
        let report = complete_if_due(&mut world, id, &config, &mut rng).unwrap().unwrap();
        assert!(report.success);
        assert_eq!(world.agent(id).unwrap().status.lifecycle, Lifecycle::Cooling);

        calendar.sim_time = ends_at + config.cooling_max;
        world.set_time(calendar, 2);
        assert!(finish_cooling(&mut world, id).unwrap());
        assert!(world.agent(id).unwrap().is_idle());
    }

    #[test]
    fn interrupt_releases_node_and_stops() {
        let mut world = World::new();
        let id = spawn(&mut world, "Charlie", 50.0, 50.0);
        let node = world
            .add_node(ResourceNode::new(ResourceKind::Stone, Position::new(60.0, 50.0), 40))
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let decision = Decision::new(Action::Gather { resource: ResourceKind::Stone }, "");
        dispatch(&mut world, id, &decision, &AgentConfig::default(), &mut rng).unwrap();
        assert_eq!(world.nodes.get(&node).unwrap().occupied_by, Some(id));

        interrupt(&mut world, id, "attacked").unwrap();
        let a = world.agent(id).unwrap();
        assert!(a.current.is_none());
        assert!(a.move_target.is_none());
        assert_eq!(a.status.lifecycle, Lifecycle::Idle);
        assert_eq!(a.status.locomotion, Locomotion::Stationary);
        assert!(world.nodes.get(&node).unwrap().occupied_by.is_none());
    }
}
