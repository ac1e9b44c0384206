//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks`
//! - **Pause/resume**: operator can halt and continue the tick loop
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Memory commands**: applied between ticks, also while paused
//! - **Operator stop**: idempotent, takes effect before the next tick
//!
//! A failed tick is logged and the loop carries on with the next one.
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::decision::DecisionProvider;
use crate::operator::{OperatorState, SimulationEndReason, apply_memory_command};
use crate::tick::{self, SimulationState, TickSummary};

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Ticks that failed and were skipped.
    pub failed_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to publish the world update to observers.
/// The callback receives the tick summary and the current simulation state.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);

    /// Called after operator commands changed the world between ticks.
    fn on_commands_applied(&mut self, _state: &SimulationState) {}
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Apply every queued memory command and answer its submitter.
///
/// Returns whether any command changed the world.
async fn apply_commands(state: &mut SimulationState, operator: &OperatorState) -> bool {
    let mut changed = false;
    for pending in operator.drain_commands().await {
        let outcome = apply_memory_command(&mut state.world, &pending.command);
        changed |= outcome.success;
        if pending.reply.send(outcome).is_err() {
            warn!("Operator command submitter went away before the reply");
        }
    }
    changed
}

/// Run the simulation loop until a termination condition is met.
///
/// # Arguments
///
/// * `state` - Mutable simulation state (world, clock, tuning)
/// * `provider` - Source of agent decisions and conversation content
/// * `operator` - Shared operator control state
/// * `callback` - Called after each tick for observer updates
pub async fn run_simulation<P: DecisionProvider>(
    state: &mut SimulationState,
    provider: &P,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> SimulationResult {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut failed_ticks: u64 = 0;
    let mut last_tick_at = Instant::now();

    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        provider = provider.name(),
        agents = state.world.living_agent_ids().len(),
        "Simulation starting"
    );

    loop {
        if apply_commands(state, operator).await {
            callback.on_commands_applied(state);
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = SimulationEndReason::OperatorStop;
            operator.set_end_reason(reason.clone()).await;
            return SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
                failed_ticks,
            };
        }

        // --- Check pause ---
        if operator.is_paused() {
            operator.wait_for_wake().await;
            if !operator.is_paused() {
                info!("Simulation resumed");
                last_tick_at = Instant::now();
            }
            continue;
        }

        // --- Execute tick ---
        let elapsed = last_tick_at.elapsed().as_secs_f64();
        last_tick_at = Instant::now();
        match tick::run_tick(state, provider, elapsed).await {
            Ok(summary) => {
                total_ticks = total_ticks.saturating_add(1);
                operator.set_current_tick(summary.tick);
                callback.on_tick(&summary, state);

                // --- Check tick limit (after tick) ---
                if operator.tick_limit_reached(summary.tick) {
                    info!(tick = summary.tick, max_ticks = operator.max_ticks(), "Tick limit reached");
                    let reason = SimulationEndReason::MaxTicksReached;
                    operator.set_end_reason(reason.clone()).await;
                    return SimulationResult {
                        end_reason: reason,
                        final_summary: Some(summary),
                        total_ticks,
                        failed_ticks,
                    };
                }
                last_summary = Some(summary);
            }
            Err(e) => {
                failed_ticks = failed_ticks.saturating_add(1);
                error!(tick = state.clock.tick(), error = %e, "Tick failed, continuing");
            }
        }

        // --- Sleep for tick interval ---
        tokio::time::sleep(Duration::from_millis(operator.tick_interval_ms())).await;
    }
}

/// Log the simulation end sequence.
///
/// This should be called after [`run_simulation`] returns. The HTTP server
/// keeps running afterwards.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        failed_ticks = result.failed_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_agents_alive = result.final_summary.as_ref().map(|s| s.agents_alive),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            agents_alive = summary.agents_alive,
            day = summary.calendar.day,
            season = ?summary.calendar.season,
            weather = summary.weather.as_str(),
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
