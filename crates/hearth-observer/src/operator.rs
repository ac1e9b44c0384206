//! Operator REST API handlers for runtime simulation control.
//!
//! Pause, resume, speed, and stop act on the shared [`OperatorState`]
//! directly. Memory commands are queued to the tick loop and answered once
//! it has applied them, so they always see a consistent world.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the tick loop |
//! | `POST` | `/api/operator/resume` | Resume the tick loop |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/api/operator/status` | Current simulation status |
//! | `POST` | `/api/operator/stop` | Trigger clean shutdown |
//! | `POST` | `/api/operator/add-memory` | Add a memory to one or all agents |
//! | `POST` | `/api/operator/modify-memory` | Overwrite one memory by index |
//! | `POST` | `/api/operator/clear-memories` | Clear memories of one or all agents |
//!
//! [`OperatorState`]: hearth_core::operator::OperatorState

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use hearth_core::operator::{ALL_AGENTS, CommandOutcome, MIN_TICK_INTERVAL_MS, MemoryCommand, SimulationStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, Deserialize, Validate)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds (minimum 100).
    #[validate(range(min = MIN_TICK_INTERVAL_MS))]
    pub tick_interval_ms: u64,
}

/// Request body for `POST /api/operator/add-memory`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemoryRequest {
    /// Agent id, agent name, or `"all"` (the default).
    #[serde(default = "all_agents", alias = "npc")]
    #[validate(length(min = 1))]
    pub target: String,
    /// The memory text.
    #[validate(length(min = 1, max = 500))]
    pub memory: String,
}

/// Request body for `POST /api/operator/modify-memory`.
#[derive(Debug, Deserialize, Validate)]
pub struct ModifyMemoryRequest {
    /// Agent id or name.
    #[serde(alias = "npc")]
    #[validate(length(min = 1))]
    pub agent: String,
    /// Index into the agent's memory log, oldest first.
    pub index: usize,
    /// The replacement text.
    #[serde(alias = "new_memory")]
    #[validate(length(min = 1, max = 500))]
    pub memory: String,
}

/// Request body for `POST /api/operator/clear-memories`.
#[derive(Debug, Deserialize, Validate)]
pub struct ClearMemoriesRequest {
    /// Agent id, agent name, or `"all"` (the default).
    #[serde(default = "all_agents", alias = "npc")]
    #[validate(length(min = 1))]
    pub target: String,
}

fn all_agents() -> String {
    ALL_AGENTS.to_owned()
}

/// Generic success response.
#[derive(Debug, Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

/// Status response: the control state plus population counts.
#[derive(Debug, Serialize)]
struct StatusResponse {
    #[serde(flatten)]
    simulation: SimulationStatus,
    agents_alive: usize,
    agents_total: usize,
    day: u64,
}

// ---------------------------------------------------------------------------
// POST /api/operator/pause
// ---------------------------------------------------------------------------

/// Pause the simulation tick loop.
///
/// The tick loop sleeps until resumed. Memory commands are still applied
/// while paused.
pub async fn pause(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let operator = state.operator()?;
    operator.pause();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation paused".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/resume
// ---------------------------------------------------------------------------

/// Resume the simulation tick loop after a pause.
pub async fn resume(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let operator = state.operator()?;
    operator.resume();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation resumed".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/speed
// ---------------------------------------------------------------------------

/// Change the tick interval at runtime.
///
/// The new interval takes effect before the next tick's sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate()?;
    let operator = state.operator()?;

    operator.set_tick_interval_ms(body.tick_interval_ms).map_or_else(
        || {
            Err(ObserverError::InvalidRequest(format!(
                "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            )))
        },
        |prev| {
            Ok(Json(serde_json::json!({
                "ok": true,
                "message": format!("Tick interval changed from {prev}ms to {}ms", body.tick_interval_ms),
                "previous_interval_ms": prev,
                "new_interval_ms": body.tick_interval_ms,
            })))
        },
    )
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Return the control state with population counts from the latest
/// snapshot.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let operator = state.operator()?;
    let simulation = operator.status().await;
    let world = state.world();

    Ok(Json(StatusResponse {
        simulation,
        agents_alive: world.agents.iter().filter(|a| a.alive).count(),
        agents_total: world.agents.len(),
        day: world.calendar.day,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/stop
// ---------------------------------------------------------------------------

/// Request a clean shutdown. The loop exits before its next tick.
/// Repeated calls are harmless.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let operator = state.operator()?;
    let already = operator.is_stop_requested();
    operator.request_stop();
    if !already {
        info!("Operator requested simulation stop");
    }

    Ok(Json(OperatorResponse {
        ok: true,
        message: if already {
            "Stop already requested".to_owned()
        } else {
            "Simulation stop requested".to_owned()
        },
    }))
}

// ---------------------------------------------------------------------------
// Memory commands
// ---------------------------------------------------------------------------

/// Add a memory to one agent or every living agent.
pub async fn add_memory(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddMemoryRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate()?;
    submit(
        &state,
        MemoryCommand::AddMemory {
            target: body.target,
            memory: body.memory,
        },
    )
    .await
}

/// Overwrite one memory of an agent by index.
pub async fn modify_memory(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ModifyMemoryRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate()?;
    submit(
        &state,
        MemoryCommand::ModifyMemory {
            agent: body.agent,
            index: body.index,
            memory: body.memory,
        },
    )
    .await
}

/// Clear the memories of one agent or every living agent.
pub async fn clear_memories(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClearMemoriesRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate()?;
    submit(&state, MemoryCommand::ClearMemories { target: body.target }).await
}

/// Queue `command` and wait for the tick loop's answer.
///
/// A rejected command (unknown agent, index out of range) is still a
/// `200` with `success: false`. Only a stopped or unresponsive loop is
/// an error.
async fn submit(state: &AppState, command: MemoryCommand) -> Result<Json<CommandOutcome>, ObserverError> {
    let operator = state.operator()?;
    match tokio::time::timeout(state.command_timeout, operator.submit(command)).await {
        Ok(Ok(outcome)) => Ok(Json(outcome)),
        Ok(Err(e)) => Err(ObserverError::Unavailable(e.to_string())),
        Err(_) => {
            warn!(
                timeout = ?state.command_timeout,
                "Operator command timed out waiting for the tick loop"
            );
            Err(ObserverError::Unavailable(
                "timed out waiting for the tick loop".to_owned(),
            ))
        }
    }
}
