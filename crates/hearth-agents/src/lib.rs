//! Agent and beast behavior for the Hearth simulation.
//!
//! This crate is the logic layer between `hearth-world` (which owns the
//! state) and `hearth-core` (which orders the work inside a tick). Nothing
//! here performs I/O or talks to a decision provider; talk scripts and
//! summaries are handed in by the caller.
//!
//! # Modules
//!
//! - [`actions`] -- The action state machine and one submodule per action kind.
//! - [`beast`] -- Beast stats, spawning, state evaluation, and movement.
//! - [`combat`] -- Damage formulas, strikes, beast attacks, and counter-attacks.
//! - [`config`] -- Tunable rates and thresholds ([`AgentConfig`]).
//! - [`conversation`] -- Starting, tracking, and summarizing multi-agent talks.
//! - [`crafting`] -- Tool and weapon recipes.
//! - [`death`] -- Death causes and their consequences ([`DeathCause`]).
//! - [`error`] -- Error types for agent operations ([`AgentError`]).
//! - [`escape`] -- Choosing where a threatened agent should run.
//! - [`memory`] -- Memory storage, importance scoring, and cleanup ([`MemoryStore`]).
//! - [`movement`] -- Walking speed and per-tick stepping.
//! - [`social`] -- Ambient chats between idle neighbours.
//! - [`vitals`] -- Per-tick hunger, stamina, and health.

pub mod actions;
pub mod beast;
pub mod combat;
pub mod config;
pub mod conversation;
pub mod crafting;
pub mod death;
pub mod error;
pub mod escape;
pub mod memory;
pub mod movement;
pub mod social;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use actions::{
    DispatchOutcome, Outcome, Plan, Prepared, check_build_session, complete_if_due, dispatch,
    finish_cooling, interrupt,
};
pub use beast::{spawn_beast, update_beasts};
pub use combat::{AttackReport, Strike};
pub use config::AgentConfig;
pub use conversation::Ending;
pub use crafting::{Recipe, recipe};
pub use death::{DeathCause, handle_death};
pub use error::AgentError;
pub use memory::{MemoryStore, remember};
pub use social::{AmbientChat, ChatTopic, ambient_chats};
pub use vitals::{VitalTickResult, apply_vitals};
