//! Per-agent memory log: append, trim, retrieve, score.
//!
//! The simulation consumes memory through the [`MemoryStore`] trait. The
//! in-process implementation stores entries on the agent itself inside the
//! [`World`], oldest first.
//!
//! ## Bounds
//!
//! - Appending past [`MEMORY_CAPACITY`] entries trims the log to the newest
//!   [`TRIM_TO`].
//! - [`MemoryStore::retain_top`] keeps every entry of importance at least
//!   [`KEEP_IMPORTANCE`] plus the [`RETAIN_TOP`] best-scoring others, in
//!   their original order.
//! - [`cleanup_if_due`] runs `retain_top` for agents holding at least
//!   [`CLEANUP_MIN_MEMORIES`] entries, at most once per
//!   [`CLEANUP_INTERVAL`] sim-seconds.

use hearth_types::{AgentId, MemoryEntry, MemoryKind};
use hearth_world::World;
use tracing::debug;

use crate::error::AgentError;

/// Log length above which an append trims.
pub const MEMORY_CAPACITY: usize = 50;
/// Log length after an append trim.
pub const TRIM_TO: usize = 20;
/// Entries at or above this importance survive `retain_top`.
pub const KEEP_IMPORTANCE: u8 = 7;
/// Number of lower-importance entries `retain_top` keeps.
pub const RETAIN_TOP: usize = 20;
/// Minimum log length before periodic cleanup runs.
pub const CLEANUP_MIN_MEMORIES: usize = 30;
/// Minimum sim-seconds between cleanups of one agent.
pub const CLEANUP_INTERVAL: f64 = 300.0;
/// Entries at or above this importance are "critical" for decisions.
pub const CRITICAL_IMPORTANCE: u8 = 9;
/// Number of critical memories handed to a decision.
pub const CRITICAL_COUNT: usize = 10;

/// The memory interface the simulation core consumes.
pub trait MemoryStore {
    /// Append an entry, trimming when the log overflows.
    fn append(&mut self, agent: AgentId, entry: MemoryEntry) -> Result<(), AgentError>;

    /// The `n` newest entries, oldest first.
    fn recent(&self, agent: AgentId, n: usize) -> Result<Vec<MemoryEntry>, AgentError>;

    /// Every entry, oldest first.
    fn all(&self, agent: AgentId) -> Result<Vec<MemoryEntry>, AgentError>;

    /// Keep high-importance entries plus the top scorers. Returns how many
    /// entries were dropped.
    fn retain_top<F>(&mut self, agent: AgentId, score: F) -> Result<usize, AgentError>
    where
        F: Fn(&MemoryEntry) -> f64;
}

impl MemoryStore for World {
    fn append(&mut self, agent: AgentId, entry: MemoryEntry) -> Result<(), AgentError> {
        let memories = &mut self.agent_mut(agent)?.memories;
        memories.push(entry);
        if memories.len() > MEMORY_CAPACITY {
            let excess = memories.len().saturating_sub(TRIM_TO);
            memories.drain(..excess);
        }
        Ok(())
    }

    fn recent(&self, agent: AgentId, n: usize) -> Result<Vec<MemoryEntry>, AgentError> {
        let memories = &self.agent(agent)?.memories;
        let skip = memories.len().saturating_sub(n);
        Ok(memories.iter().skip(skip).cloned().collect())
    }

    fn all(&self, agent: AgentId) -> Result<Vec<MemoryEntry>, AgentError> {
        Ok(self.agent(agent)?.memories.clone())
    }

    fn retain_top<F>(&mut self, agent: AgentId, score: F) -> Result<usize, AgentError>
    where
        F: Fn(&MemoryEntry) -> f64,
    {
        let memories = &mut self.agent_mut(agent)?.memories;
        let before = memories.len();

        let mut ranked: Vec<(usize, f64)> = memories
            .iter()
            .enumerate()
            .filter(|(_, m)| m.importance < KEEP_IMPORTANCE)
            .map(|(i, m)| (i, score(m)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut keep: Vec<usize> = ranked.into_iter().take(RETAIN_TOP).map(|(i, _)| i).collect();
        keep.sort_unstable();

        let mut index = 0_usize;
        memories.retain(|m| {
            let kept = m.importance >= KEEP_IMPORTANCE || keep.binary_search(&index).is_ok();
            index = index.saturating_add(1);
            kept
        });
        Ok(before.saturating_sub(memories.len()))
    }
}

/// Default retention score: importance, with a small bonus for recency.
pub fn importance_score(entry: &MemoryEntry, now: f64) -> f64 {
    let age = (now - timestamp_secs(entry)).max(0.0);
    f64::from(entry.importance) + 1.0 / (1.0 + age / CLEANUP_INTERVAL)
}

#[allow(clippy::cast_precision_loss)]
const fn timestamp_secs(entry: &MemoryEntry) -> f64 {
    entry.timestamp as f64
}

/// Append a memory for `agent` built from parts.
pub fn remember(
    world: &mut World,
    agent: AgentId,
    kind: MemoryKind,
    description: impl Into<String>,
    importance: u8,
) -> Result<(), AgentError> {
    let now = world.now();
    world.append(agent, MemoryEntry::new(kind, description, importance, now))
}

/// The newest critical memories of an agent, oldest first.
pub fn critical_memories(world: &World, agent: AgentId) -> Result<Vec<MemoryEntry>, AgentError> {
    let mut critical: Vec<MemoryEntry> = world
        .agent(agent)?
        .memories
        .iter()
        .rev()
        .filter(|m| m.importance >= CRITICAL_IMPORTANCE)
        .take(CRITICAL_COUNT)
        .cloned()
        .collect();
    critical.reverse();
    Ok(critical)
}

/// Run a retention pass on `agent` if it is due.
///
/// Returns the number of entries dropped (0 when not due).
pub fn cleanup_if_due(world: &mut World, agent: AgentId) -> Result<usize, AgentError> {
    let now = world.now();
    let a = world.agent(agent)?;
    if a.memories.len() < CLEANUP_MIN_MEMORIES || now - a.last_memory_cleanup < CLEANUP_INTERVAL {
        return Ok(0);
    }
    let dropped = world.retain_top(agent, |m| importance_score(m, now))?;
    world.agent_mut(agent)?.last_memory_cleanup = now;
    debug!(agent = %agent, dropped, "Memory cleanup");
    Ok(dropped)
}
