//! Simulation clock, tick cycle, and orchestration for Hearth.
//!
//! This crate owns the fixed-order tick that drives the world: clock and
//! weather, agent vitals and movement, decisions, actions, conversations,
//! beasts, resource regrowth, and construction. It also owns the runner
//! loop and the operator controls around it.
//!
//! # Modules
//!
//! - [`clock`] -- Sim-time, tick counter, and the derived calendar.
//! - [`config`] -- Configuration loading from `hearth-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`DecisionProvider`] trait, fallbacks, and
//!   [`RuleBasedProvider`].
//! - [`operator`] -- Pause, resume, speed, stop, and memory commands.
//! - [`perception`] -- Decision cadence and per-agent context assembly.
//! - [`runner`] -- The tick loop with operator controls.
//! - [`tick`] -- One pass of the world, in fixed order.
//!
//! [`DecisionProvider`]: decision::DecisionProvider
//! [`RuleBasedProvider`]: decision::RuleBasedProvider

pub mod clock;
pub mod config;
pub mod decision;
pub mod operator;
pub mod perception;
pub mod runner;
pub mod tick;

// Re-export primary types at crate root for convenience.
pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use decision::{DecisionError, DecisionProvider, RuleBasedProvider};
pub use operator::{CommandOutcome, MemoryCommand, OperatorState, SimulationEndReason, SimulationStatus};
pub use runner::{NoOpCallback, SimulationResult, TickCallback, log_simulation_end, run_simulation};
pub use tick::{SimulationState, TickError, TickSummary, run_tick};
