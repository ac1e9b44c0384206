//! Tick cycle: the fixed-order pass that advances the Hearth world.
//!
//! Each tick runs these phases in sequence:
//!
//! 1. **Clock** -- advance the sim-time by the measured elapsed time
//!    (clamped) and publish the calendar to the world.
//! 2. **Weather** -- run the weather check if one is due.
//! 3. **Vitals** -- per living agent: decay and regeneration, death,
//!    one movement step, periodic memory cleanup.
//! 4. **Decision** -- build a context for every agent due to decide and ask
//!    the [`DecisionProvider`] for all of them concurrently. Any error or
//!    timeout is replaced by [`fallback_decision`].
//! 5. **Actions** -- per agent in id order: dispatch the decision (starting
//!    a conversation if the agent chose to talk), complete a due action,
//!    end a stale build session, finish cooling.
//! 6. **Conversations** -- close the ones whose time is up, recording a
//!    memory per participant, and dispatch any action they agreed on.
//! 7. **Chatter** -- at most one ambient chat between idle neighbours.
//! 8. **Beasts** -- behavior update, movement and attacks.
//! 9. **Resources** -- refill depleted nodes whose delay has elapsed.
//! 10. **Construction** -- progress every site and reward the builders of
//!     completed ones.
//!
//! The provider calls in phases 4 to 6 are the only suspension points.
//! Everything else mutates the world synchronously, one agent at a time.

use std::time::Duration;

use futures::future::join_all;
use hearth_agents::actions::{self, DispatchOutcome};
use hearth_agents::actions::build::reward_builders;
use hearth_agents::{AgentConfig, AgentError, beast, conversation, death, memory, movement, social};
use hearth_types::{
    ActionReport, AgentId, CalendarView, Decision, DecisionContext, EventKind, Importance, Notification,
    Weather, WorldUpdate,
};
use hearth_world::World;
use hearth_world::resource::regenerate_if_due;
use hearth_world::structure::progress_construction;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SimClock};
use crate::config::SimulationConfig;
use crate::decision::{
    DecisionProvider, fallback_decision, fallback_script, fallback_summary, sanitize_script, with_timeout,
};
use crate::perception::{build_context, decision_due};

/// Reasoning attached to an action agreed on in conversation.
const AGREED_REASONING: &str = "Agreed on it in conversation";

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An agent operation failed.
    #[error("agent error for {agent_id}: {source}")]
    Agent {
        /// The agent being updated.
        agent_id: AgentId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// A world-level pass (beasts, conversations, construction) failed.
    #[error("world pass error: {source}")]
    World {
        /// The underlying error.
        #[from]
        source: AgentError,
    },
}

/// Attach the agent id to an [`AgentError`].
fn for_agent(agent_id: AgentId) -> impl FnOnce(AgentError) -> TickError {
    move |source| TickError::Agent { agent_id, source }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Calendar at the end of the tick.
    pub calendar: CalendarView,
    /// Weather at the end of the tick.
    pub weather: Weather,
    /// Number of living agents at end of tick.
    pub agents_alive: u32,
    /// Agents who died during this tick.
    pub deaths: Vec<AgentId>,
    /// Decisions requested from the provider.
    pub decisions: u32,
    /// Decisions that fell back to the rule-based policy.
    pub fallbacks: u32,
    /// Actions that completed this tick.
    pub reports: Vec<(AgentId, ActionReport)>,
    /// The per-tick world update for observers.
    pub update: WorldUpdate,
    /// Notifications raised during the tick, in order.
    pub notifications: Vec<Notification>,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The world aggregate.
    pub world: World,
    /// The simulation clock.
    pub clock: SimClock,
    /// Agent tuning.
    pub agent_config: AgentConfig,
    /// Deadline for each provider call.
    pub decision_timeout: Duration,
    /// Randomness for the whole tick.
    pub rng: SmallRng,
}

impl SimulationState {
    /// Wrap a seeded `world` with a clock and tuning from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the time configuration is invalid.
    pub fn new(world: World, config: &SimulationConfig) -> Result<Self, ClockError> {
        let clock = SimClock::new(&config.time)?;
        let mut world = world;
        world.set_time(clock.calendar(), clock.tick());
        Ok(Self {
            world,
            clock,
            agent_config: config.agents.clone(),
            decision_timeout: Duration::from_millis(config.decision.timeout_ms),
            rng: SmallRng::seed_from_u64(config.world.seed.wrapping_add(1)),
        })
    }
}

/// Execute one complete tick of the simulation.
///
/// `elapsed` is the real time since the previous tick, in seconds.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows or a world invariant is
/// broken mid-tick. Provider failures are never errors.
pub async fn run_tick<P: DecisionProvider>(
    state: &mut SimulationState,
    provider: &P,
    elapsed: f64,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let dt = state.clock.advance(elapsed)?;
    state.world.set_time(state.clock.calendar(), state.clock.tick());
    let tick = state.clock.tick();
    let now = state.world.now();
    let alive_before = state.world.living_agent_ids();
    debug!(tick, dt, sim_time = now, "Tick started");

    // --- Phase 2: Weather ---
    phase_weather(state);

    // --- Phase 3: Vitals ---
    phase_vitals(state, &alive_before, dt)?;

    // --- Phase 4: Decision ---
    let (decisions, fallbacks) = phase_decision(state, provider).await?;
    let decision_count = u32::try_from(decisions.len()).unwrap_or(u32::MAX);

    // --- Phase 5: Actions ---
    let reports = phase_actions(state, provider, decisions).await?;

    // --- Phase 6: Conversations ---
    phase_conversations(state, provider).await?;

    // --- Phase 7: Chatter ---
    social::ambient_chats(&mut state.world, &state.agent_config, &mut state.rng)?;

    // --- Phase 8: Beasts ---
    let attacks = beast::update_beasts(&mut state.world, dt, &state.agent_config, &mut state.rng)?;
    if !attacks.is_empty() {
        debug!(tick, attacks = attacks.len(), "Beasts attacked");
    }

    // --- Phase 9: Resources ---
    phase_resources(state);

    // --- Phase 10: Construction ---
    let completed = progress_construction(&mut state.world, dt);
    if !completed.is_empty() {
        reward_builders(&mut state.world, &completed, &state.agent_config, &mut state.rng)?;
    }

    let deaths: Vec<AgentId> = alive_before
        .into_iter()
        .filter(|id| state.world.agents.get(id).is_some_and(|a| !a.alive))
        .collect();
    let agents_alive = u32::try_from(state.world.living_agent_ids().len()).unwrap_or(u32::MAX);
    if !deaths.is_empty() {
        info!(tick, deaths = deaths.len(), agents_alive, "Agents died this tick");
    }

    Ok(TickSummary {
        tick,
        calendar: state.world.calendar(),
        weather: state.world.weather.current(),
        agents_alive,
        deaths,
        decisions: decision_count,
        fallbacks,
        reports,
        update: state.world.update(),
        notifications: state.world.drain_notifications(),
    })
}

/// Phase 2: roll the weather and announce a change.
fn phase_weather(state: &mut SimulationState) {
    let now = state.world.now();
    let Some(weather) = state.world.weather.update(now, &mut state.rng) else {
        return;
    };
    let importance = if weather == Weather::Storm {
        Importance::Medium
    } else {
        Importance::Low
    };
    info!(weather = weather.as_str(), "Weather changed");
    state.world.emit(
        EventKind::WeatherChange,
        format!("The weather turned {}", weather.as_str()),
        importance,
        Vec::new(),
    );
}

/// Phase 3: vitals, death, movement and memory cleanup per living agent.
fn phase_vitals(state: &mut SimulationState, agents: &[AgentId], dt: f64) -> Result<(), TickError> {
    let config = &state.agent_config;
    for &id in agents {
        let result = hearth_agents::apply_vitals(&mut state.world, id, config, dt).map_err(for_agent(id))?;
        if result.died {
            let cause = death::vitals_cause(&state.world, id, config).map_err(for_agent(id))?;
            death::handle_death(&mut state.world, id, cause, config).map_err(for_agent(id))?;
            continue;
        }
        movement::step_agent(&mut state.world, id, config, dt).map_err(for_agent(id))?;
        let removed = memory::cleanup_if_due(&mut state.world, id).map_err(for_agent(id))?;
        if removed > 0 {
            debug!(agent = %id, removed, "Memory cleaned up");
        }
    }
    Ok(())
}

/// Phase 4: ask the provider for every due agent at once.
///
/// Returns the decisions in agent id order and the number of fallbacks.
async fn phase_decision<P: DecisionProvider>(
    state: &SimulationState,
    provider: &P,
) -> Result<(Vec<(AgentId, Decision)>, u32), TickError> {
    let now = state.world.now();
    let interval = state.agent_config.decision_interval;
    let mut contexts: Vec<(AgentId, DecisionContext)> = Vec::new();
    for id in state.world.living_agent_ids() {
        let agent = state.world.agent(id).map_err(|e| for_agent(id)(e.into()))?;
        if decision_due(agent, now, interval) {
            contexts.push((id, build_context(&state.world, id).map_err(for_agent(id))?));
        }
    }
    if contexts.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let timeout = state.decision_timeout;
    let answers = join_all(
        contexts
            .iter()
            .map(|(_, context)| with_timeout(timeout, provider.decide(context))),
    )
    .await;

    let mut fallbacks: u32 = 0;
    let decisions = contexts
        .iter()
        .zip(answers)
        .map(|((id, context), answer)| {
            let decision = answer.unwrap_or_else(|e| {
                warn!(agent = %id, provider = provider.name(), error = %e, "Decision failed, using fallback");
                fallbacks = fallbacks.saturating_add(1);
                fallback_decision(context)
            });
            (*id, decision)
        })
        .collect();
    Ok((decisions, fallbacks))
}

/// Phase 5: dispatch decisions and advance every agent's action timers.
async fn phase_actions<P: DecisionProvider>(
    state: &mut SimulationState,
    provider: &P,
    decisions: Vec<(AgentId, Decision)>,
) -> Result<Vec<(AgentId, ActionReport)>, TickError> {
    let now = state.world.now();
    for (id, decision) in decisions {
        // An earlier talk may have pulled this agent into a conversation.
        let ready = state
            .world
            .agents
            .get(&id)
            .is_some_and(|a| a.is_idle() && !a.is_conversing());
        if !ready {
            continue;
        }
        state.world.agent_mut(id).map_err(|e| for_agent(id)(e.into()))?.last_decision_at = Some(now);
        dispatch_decision(state, provider, id, &decision).await?;
    }

    let mut reports = Vec::new();
    for id in state.world.living_agent_ids() {
        let config = &state.agent_config;
        if let Some(report) =
            actions::complete_if_due(&mut state.world, id, config, &mut state.rng).map_err(for_agent(id))?
        {
            reports.push((id, report));
        }
        if let Some(report) =
            actions::check_build_session(&mut state.world, id, config, &mut state.rng).map_err(for_agent(id))?
        {
            reports.push((id, report));
        }
        actions::finish_cooling(&mut state.world, id).map_err(for_agent(id))?;
    }
    Ok(reports)
}

/// Dispatch one decision, opening a conversation if it asks for one.
async fn dispatch_decision<P: DecisionProvider>(
    state: &mut SimulationState,
    provider: &P,
    id: AgentId,
    decision: &Decision,
) -> Result<(), TickError> {
    let outcome = actions::dispatch(&mut state.world, id, decision, &state.agent_config, &mut state.rng)
        .map_err(for_agent(id))?;
    match outcome {
        DispatchOutcome::Started { .. } => {}
        DispatchOutcome::Failed(failure) => {
            debug!(agent = %id, action = %decision.action.kind(), reason = %failure, "Action rejected");
        }
        DispatchOutcome::ConversationRequested { partners } => {
            open_conversation(state, provider, id, &partners).await?;
        }
    }
    Ok(())
}

/// Ask the provider for a script and start the conversation.
async fn open_conversation<P: DecisionProvider>(
    state: &mut SimulationState,
    provider: &P,
    initiator: AgentId,
    partners: &[AgentId],
) -> Result<(), TickError> {
    let context = conversation::context(&state.world, initiator, partners).map_err(for_agent(initiator))?;
    let participants: Vec<AgentId> = core::iter::once(initiator).chain(partners.iter().copied()).collect();
    let script = with_timeout(state.decision_timeout, provider.converse(&context))
        .await
        .and_then(|script| sanitize_script(script, &participants))
        .unwrap_or_else(|e| {
            warn!(agent = %initiator, provider = provider.name(), error = %e, "Conversation content failed, using fallback");
            fallback_script(&context, &mut state.rng)
        });
    let length = conversation::conversation_length(&state.agent_config, &mut state.rng);
    conversation::start(&mut state.world, initiator, partners, script, length).map_err(for_agent(initiator))?;
    Ok(())
}

/// Phase 6: end due conversations and act on what they agreed.
async fn phase_conversations<P: DecisionProvider>(state: &mut SimulationState, provider: &P) -> Result<(), TickError> {
    for id in conversation::due(&state.world) {
        let memories = match conversation::summary_context(&state.world, id) {
            Some(context) => with_timeout(state.decision_timeout, provider.summarize(&context))
                .await
                .unwrap_or_else(|e| {
                    warn!(conversation = %id, provider = provider.name(), error = %e, "Summary failed, using fallback");
                    fallback_summary(&context)
                }),
            None => Vec::new(),
        };
        let Some(ending) = conversation::finish(&mut state.world, id, &memories)? else {
            continue;
        };
        let Some(action) = ending.planned_action else {
            continue;
        };
        let decision = Decision::new(action, AGREED_REASONING);
        for agent in ending.idle_participants {
            let outcome = actions::dispatch(&mut state.world, agent, &decision, &state.agent_config, &mut state.rng)
                .map_err(for_agent(agent))?;
            if let DispatchOutcome::ConversationRequested { .. } = outcome {
                debug!(agent = %agent, "Agreed to talk again, leaving it for the next decision");
            }
        }
    }
    Ok(())
}

/// Phase 9: refill depleted nodes whose delay has passed.
fn phase_resources(state: &mut SimulationState) {
    let now = state.world.now();
    let scale = state.clock.calendar_scale();
    let regenerated: Vec<String> = state
        .world
        .nodes
        .values_mut()
        .filter_map(|node| regenerate_if_due(node, now, scale).then(|| node.kind.to_string()))
        .collect();
    for kind in regenerated {
        debug!(kind = %kind, "Resource regenerated");
        state.world.emit(
            EventKind::ResourceRegenerated,
            format!("A {kind} source has grown back"),
            Importance::Low,
            Vec::new(),
        );
    }
}
