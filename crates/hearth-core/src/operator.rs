//! Operator control state for runtime simulation management.
//!
//! This module provides shared state used by the tick loop and the operator
//! REST API. The operator can pause/resume, change tick speed, edit agent
//! memories and trigger a clean shutdown without stopping the process.
//!
//! # Architecture
//!
//! Control flags use [`std::sync::atomic`] types so the tick loop reads
//! them without locks. Memory commands are queued with a one-shot reply
//! channel; the tick loop applies them between ticks (also while paused)
//! and answers each with a [`CommandOutcome`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use hearth_agents::remember;
use hearth_types::{AgentId, EventKind, Importance, MemoryKind};
use hearth_world::World;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify, oneshot};
use tracing::info;
use uuid::Uuid;

use crate::config::RunConfig;

/// Shortest tick interval an operator may set.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;
/// Importance of a memory injected by an operator.
pub const OPERATOR_MEMORY_IMPORTANCE: u8 = 7;
/// Target keyword addressing every living agent.
pub const ALL_AGENTS: &str = "all";

/// Reason why the simulation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// An operator issued a stop command.
    OperatorStop,
}

/// An operator edit of agent memories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MemoryCommand {
    /// Append a memory to one agent or, with `"all"`, every living agent.
    AddMemory {
        /// Agent id, agent name, or `"all"`.
        target: String,
        /// The memory text.
        memory: String,
    },
    /// Overwrite one memory of an agent by index.
    ModifyMemory {
        /// Agent id or name.
        agent: String,
        /// Index into the agent's memory log, oldest first.
        index: usize,
        /// The replacement text.
        memory: String,
    },
    /// Clear the memories of one agent or, with `"all"`, every living agent.
    ClearMemories {
        /// Agent id, agent name, or `"all"`.
        target: String,
    },
}

/// The answer to a [`MemoryCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command was applied.
    pub success: bool,
    /// Human-readable result.
    pub message: String,
    /// Names of the agents that were changed.
    pub affected: Vec<String>,
}

impl CommandOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            affected: Vec::new(),
        }
    }
}

/// A queued command and the channel its outcome goes back on.
#[derive(Debug)]
pub struct PendingCommand {
    /// The command to apply.
    pub command: MemoryCommand,
    /// Where to send the outcome.
    pub reply: oneshot::Sender<CommandOutcome>,
}

/// Errors from submitting an operator command.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// The simulation has stopped and no longer applies commands.
    #[error("simulation is not running")]
    NotRunning,

    /// The tick loop dropped the command without answering.
    #[error("command was dropped before it was applied")]
    Dropped,
}

/// Shared operator control state.
///
/// This struct is wrapped in [`Arc`](std::sync::Arc) and shared between the
/// tick loop and operator API handlers.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Wakes the tick loop on resume, stop, or a queued command.
    wake_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Last completed tick, published by the loop.
    current_tick: AtomicU64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Memory commands awaiting the tick loop.
    commands: Mutex<Vec<PendingCommand>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a new operator state from configuration.
    pub fn new(tick_interval_ms: u64, run: &RunConfig) -> Self {
        Self {
            paused: AtomicBool::new(run.start_paused),
            wake_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms.max(MIN_TICK_INTERVAL_MS)),
            current_tick: AtomicU64::new(0),
            started_at: Utc::now(),
            max_ticks: run.max_ticks,
            commands: Mutex::new(Vec::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The tick loop will sleep until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the tick loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.wake_notify.notify_one();
    }

    /// Wait until something wakes the loop: a resume, a stop, or a command.
    pub async fn wait_for_wake(&self) {
        self.wake_notify.notified().await;
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop. Repeated requests are no-ops.
    pub fn request_stop(&self) {
        if !self.stop_requested.swap(true, Ordering::AcqRel) {
            info!("Stop requested");
        }
        self.wake_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        self.end_reason.lock().await.clone()
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. Must be at least 100ms.
    ///
    /// Returns the previous interval on success, or `None` if the
    /// value was rejected (below 100ms).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        let prev = self.tick_interval_ms.swap(ms, Ordering::AcqRel);
        Some(prev)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Publish the last completed tick.
    pub fn set_current_tick(&self, tick: u64) {
        self.current_tick.store(tick, Ordering::Release);
    }

    /// The last completed tick.
    pub fn current_tick(&self) -> u64 {
        self.current_tick.load(Ordering::Acquire)
    }

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since simulation start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at).num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    // -----------------------------------------------------------------------
    // Memory Commands
    // -----------------------------------------------------------------------

    /// Queue `command` for the tick loop and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::NotRunning`] once a stop was requested or the
    /// run has ended, and [`OperatorError::Dropped`] if the loop exits
    /// before answering.
    pub async fn submit(&self, command: MemoryCommand) -> Result<CommandOutcome, OperatorError> {
        if self.is_stop_requested() || self.end_reason().await.is_some() {
            return Err(OperatorError::NotRunning);
        }
        let (reply, outcome) = oneshot::channel();
        self.commands.lock().await.push(PendingCommand { command, reply });
        self.wake_notify.notify_one();
        outcome.await.map_err(|_| OperatorError::Dropped)
    }

    /// Drain all queued commands.
    pub async fn drain_commands(&self) -> Vec<PendingCommand> {
        let mut queue = self.commands.lock().await;
        std::mem::take(&mut *queue)
    }
}

/// JSON-serializable status of the simulation for the operator API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Current tick number.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// The reason the simulation ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
    /// ISO 8601 timestamp of when the simulation started.
    pub started_at: String,
}

impl OperatorState {
    /// Snapshot the control state for the status endpoint.
    pub async fn status(&self) -> SimulationStatus {
        SimulationStatus {
            tick: self.current_tick(),
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            tick_interval_ms: self.tick_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// Applying commands
// ---------------------------------------------------------------------------

/// Resolve an agent by id or, failing that, by name.
fn find_agent(world: &World, target: &str) -> Option<AgentId> {
    Uuid::parse_str(target)
        .ok()
        .map(AgentId::from)
        .filter(|id| world.agents.contains_key(id))
        .or_else(|| world.agent_by_name(target))
}

/// Living agents addressed by `target`, or a failure outcome.
fn living_targets(world: &World, target: &str) -> Result<Vec<AgentId>, CommandOutcome> {
    if target == ALL_AGENTS {
        return Ok(world.living_agent_ids());
    }
    match find_agent(world, target) {
        Some(id) if world.agents.get(&id).is_some_and(|a| a.alive) => Ok(vec![id]),
        _ => Err(CommandOutcome::failure(format!("No living agent named {target}"))),
    }
}

fn names(world: &World, ids: &[AgentId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| world.agents.get(id).map(|a| a.name.clone()))
        .collect()
}

/// Apply `command` to `world` and describe what happened.
///
/// Successful commands are recorded as an operator event.
pub fn apply_memory_command(world: &mut World, command: &MemoryCommand) -> CommandOutcome {
    let outcome = match command {
        MemoryCommand::AddMemory { target, memory } => add_memory(world, target, memory),
        MemoryCommand::ModifyMemory { agent, index, memory } => modify_memory(world, agent, *index, memory),
        MemoryCommand::ClearMemories { target } => clear_memories(world, target),
    };
    if outcome.success {
        info!(affected = %outcome.affected.join(", "), "{}", outcome.message);
        let ids: Vec<AgentId> = outcome.affected.iter().filter_map(|n| world.agent_by_name(n)).collect();
        world.emit(EventKind::OperatorCommand, outcome.message.clone(), Importance::Medium, ids);
    }
    outcome
}

fn add_memory(world: &mut World, target: &str, memory: &str) -> CommandOutcome {
    if memory.trim().is_empty() {
        return CommandOutcome::failure("Memory text is empty");
    }
    let ids = match living_targets(world, target) {
        Ok(ids) => ids,
        Err(failure) => return failure,
    };
    let mut added = Vec::new();
    for id in ids {
        if remember(world, id, MemoryKind::Operator, memory, OPERATOR_MEMORY_IMPORTANCE).is_ok() {
            added.push(id);
        }
    }
    let affected = names(world, &added);
    CommandOutcome {
        success: true,
        message: format!("Added a memory to {}", affected.join(", ")),
        affected,
    }
}

fn modify_memory(world: &mut World, agent: &str, index: usize, memory: &str) -> CommandOutcome {
    if memory.trim().is_empty() {
        return CommandOutcome::failure("Memory text is empty");
    }
    let Some(id) = find_agent(world, agent) else {
        return CommandOutcome::failure(format!("No agent named {agent}"));
    };
    let Ok(a) = world.agent_mut(id) else {
        return CommandOutcome::failure(format!("No agent named {agent}"));
    };
    let count = a.memories.len();
    let Some(entry) = a.memories.get_mut(index) else {
        return CommandOutcome::failure(format!("Memory index {index} is out of range ({count} memories)"));
    };
    memory.clone_into(&mut entry.description);
    let name = a.name.clone();
    CommandOutcome {
        success: true,
        message: format!("Changed memory {index} of {name}"),
        affected: vec![name],
    }
}

fn clear_memories(world: &mut World, target: &str) -> CommandOutcome {
    let ids = match living_targets(world, target) {
        Ok(ids) => ids,
        Err(failure) => return failure,
    };
    for &id in &ids {
        if let Ok(a) = world.agent_mut(id) {
            a.memories.clear();
        }
    }
    let affected = names(world, &ids);
    CommandOutcome {
        success: true,
        message: format!("Cleared the memories of {}", affected.join(", ")),
        affected,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use hearth_agents::handle_death;
    use hearth_agents::death::DeathCause;
    use hearth_types::{Agent, Position};

    use super::*;
    use crate::decision::tests::personality;

    fn world_with(names: &[&str]) -> (World, Vec<AgentId>) {
        let mut world = World::new();
        let ids = names
            .iter()
            .map(|n| world.add_agent(Agent::new(*n, Position::new(50.0, 50.0), personality())).unwrap())
            .collect();
        (world, ids)
    }

    #[test]
    fn initial_state_is_not_paused() {
        let state = OperatorState::new(1000, &RunConfig::default());
        assert!(!state.is_paused());
        assert!(!state.is_stop_requested());
    }

    #[test]
    fn start_paused_is_honored() {
        let run = RunConfig {
            start_paused: true,
            ..RunConfig::default()
        };
        assert!(OperatorState::new(1000, &run).is_paused());
    }

    #[test]
    fn pause_and_resume() {
        let state = OperatorState::new(1000, &RunConfig::default());
        state.pause();
        assert!(state.is_paused());
        state.resume();
        assert!(!state.is_paused());
    }

    #[test]
    fn stop_is_idempotent() {
        let state = OperatorState::new(1000, &RunConfig::default());
        state.request_stop();
        state.request_stop();
        assert!(state.is_stop_requested());
    }

    #[test]
    fn reject_sub_100ms_interval() {
        let state = OperatorState::new(1000, &RunConfig::default());
        assert!(state.set_tick_interval_ms(50).is_none());
        assert_eq!(state.set_tick_interval_ms(250), Some(1000));
        assert_eq!(state.tick_interval_ms(), 250);
    }

    #[test]
    fn tick_limit_zero_means_unlimited() {
        let state = OperatorState::new(1000, &RunConfig::default());
        assert!(!state.tick_limit_reached(999_999));
        let bounded = OperatorState::new(
            1000,
            &RunConfig {
                max_ticks: 100,
                ..RunConfig::default()
            },
        );
        assert!(!bounded.tick_limit_reached(99));
        assert!(bounded.tick_limit_reached(100));
    }

    #[test]
    fn add_memory_to_all_skips_the_dead() {
        let (mut world, ids) = world_with(&["Alice", "Bob"]);
        let bob = *ids.get(1).unwrap();
        handle_death(&mut world, bob, DeathCause::Starvation, &hearth_agents::AgentConfig::default()).unwrap();

        let outcome = apply_memory_command(
            &mut world,
            &MemoryCommand::AddMemory {
                target: ALL_AGENTS.to_owned(),
                memory: "A great flood is coming".to_owned(),
            },
        );
        assert!(outcome.success);
        assert_eq!(outcome.affected, vec!["Alice".to_owned()]);
        let alice = world.agent(*ids.first().unwrap()).unwrap();
        assert_eq!(alice.memories.last().unwrap().kind, MemoryKind::Operator);
        assert!(world.events().any(|e| e.kind == EventKind::OperatorCommand));
    }

    #[test]
    fn unknown_target_fails_without_event() {
        let (mut world, _) = world_with(&["Alice"]);
        let outcome = apply_memory_command(
            &mut world,
            &MemoryCommand::ClearMemories {
                target: "Zed".to_owned(),
            },
        );
        assert!(!outcome.success);
        assert!(outcome.affected.is_empty());
        assert!(!world.events().any(|e| e.kind == EventKind::OperatorCommand));
    }

    #[test]
    fn modify_by_id_and_reject_bad_index() {
        let (mut world, ids) = world_with(&["Alice"]);
        let alice = *ids.first().unwrap();
        remember(&mut world, alice, MemoryKind::Action, "gathered 5 wood", 5).unwrap();

        let outcome = apply_memory_command(
            &mut world,
            &MemoryCommand::ModifyMemory {
                agent: alice.to_string(),
                index: 0,
                memory: "gathered 50 wood".to_owned(),
            },
        );
        assert!(outcome.success);
        assert_eq!(world.agent(alice).unwrap().memories.first().unwrap().description, "gathered 50 wood");

        let outcome = apply_memory_command(
            &mut world,
            &MemoryCommand::ModifyMemory {
                agent: "Alice".to_owned(),
                index: 3,
                memory: "nothing".to_owned(),
            },
        );
        assert!(!outcome.success);
    }

    #[test]
    fn clear_one_agent() {
        let (mut world, ids) = world_with(&["Alice", "Bob"]);
        for &id in &ids {
            remember(&mut world, id, MemoryKind::Action, "rested", 5).unwrap();
        }
        let outcome = apply_memory_command(
            &mut world,
            &MemoryCommand::ClearMemories {
                target: "Bob".to_owned(),
            },
        );
        assert!(outcome.success);
        assert_eq!(world.agent(*ids.first().unwrap()).unwrap().memories.len(), 1);
        assert!(world.agent(*ids.get(1).unwrap()).unwrap().memories.is_empty());
    }

    #[tokio::test]
    async fn submitted_command_is_answered_by_the_loop() {
        let state = Arc::new(OperatorState::new(1000, &RunConfig::default()));
        let (mut world, _) = world_with(&["Alice"]);

        let submitter = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            submitter
                .submit(MemoryCommand::ClearMemories {
                    target: "Alice".to_owned(),
                })
                .await
        });
        let pending = loop {
            let drained = state.drain_commands().await;
            if !drained.is_empty() {
                break drained;
            }
            tokio::task::yield_now().await;
        };
        for p in pending {
            let outcome = apply_memory_command(&mut world, &p.command);
            p.reply.send(outcome).unwrap();
        }
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn submit_after_stop_is_refused() {
        let state = OperatorState::new(1000, &RunConfig::default());
        state.request_stop();
        let result = state
            .submit(MemoryCommand::ClearMemories {
                target: ALL_AGENTS.to_owned(),
            })
            .await;
        assert!(matches!(result, Err(OperatorError::NotRunning)));
    }
}
