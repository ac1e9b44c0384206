//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read the latest published [`WorldSnapshot`] from the
//! shared [`AppState`]. Nothing here touches the live world.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/world` | Current world snapshot |
//! | `GET` | `/api/agents` | List agents |
//! | `GET` | `/api/agents/{id}` | Single agent |
//! | `GET` | `/api/events` | Recent events (by kind or agent) |
//!
//! [`WorldSnapshot`]: hearth_types::WorldSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use hearth_types::{AgentId, EventKind, WorldEvent};
use uuid::Uuid;
use validator::Validate;

use crate::error::ObserverError;
use crate::state::AppState;

/// Events returned when no `limit` is given.
const DEFAULT_EVENT_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct EventsQuery {
    /// Maximum number of events to return, newest kept (default 20).
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    /// Only events of this kind.
    pub kind: Option<EventKind>,
    /// Only events involving this agent (UUID).
    pub agent_id: Option<String>,
}

/// Query parameters for the `GET /api/agents` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct AgentsQuery {
    /// Filter by alive/dead/all status. Accepted values: `alive`, `dead`, `all`.
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing world status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let world = state.world();
    let tick = world.tick;
    let day = world.calendar.day;
    let hour = world.calendar.hour;
    let weather = world.weather.as_str();
    let alive = world.agents.iter().filter(|a| a.alive).count();
    let beasts = world.beasts.len();
    let buildings = world.buildings.len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Hearth Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f0883e; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #f0883e; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Hearth Observer</h1>

    <div>
        <div class="metric"><div class="label">Tick</div><div class="value">{tick}</div></div>
        <div class="metric"><div class="label">Day</div><div class="value">{day} @ {hour}h</div></div>
        <div class="metric"><div class="label">Weather</div><div class="value">{weather}</div></div>
        <div class="metric"><div class="label">Alive</div><div class="value">{alive}</div></div>
        <div class="metric"><div class="label">Beasts</div><div class="value">{beasts}</div></div>
        <div class="metric"><div class="label">Buildings</div><div class="value">{buildings}</div></div>
    </div>

    <h2>API</h2>
    <ul>
        <li>GET <a href="/api/world">/api/world</a></li>
        <li>GET <a href="/api/agents">/api/agents</a> (?status=alive|dead|all)</li>
        <li>GET /api/agents/{{id}}</li>
        <li>GET <a href="/api/events">/api/events</a> (?limit=N&amp;kind=K&amp;agent_id=X)</li>
        <li>GET <a href="/api/operator/status">/api/operator/status</a></li>
        <li>WS <code>/ws</code></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/world -- current world snapshot
// ---------------------------------------------------------------------------

/// Return the full world snapshot.
pub async fn get_world(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let world = state.world();
    Ok(Json(serde_json::to_value(&*world)?))
}

// ---------------------------------------------------------------------------
// GET /api/agents -- list agents
// ---------------------------------------------------------------------------

/// List agents, optionally filtered by alive/dead status.
///
/// # Query Parameters
///
/// - `status`: `alive` | `dead` | `all` (default: `all`)
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgentsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let filter = params.status.as_deref().unwrap_or("all");
    if !matches!(filter, "alive" | "dead" | "all") {
        return Err(ObserverError::InvalidRequest(format!(
            "status must be alive, dead, or all (got {filter})"
        )));
    }

    let world = state.world();
    let agents: Vec<serde_json::Value> = world
        .agents
        .iter()
        .filter(|agent| match filter {
            "alive" => agent.alive,
            "dead" => !agent.alive,
            _ => true,
        })
        .map(|agent| {
            serde_json::json!({
                "id": agent.id,
                "name": agent.name,
                "alive": agent.alive,
                "position": agent.position,
                "attributes": agent.attributes,
                "status": agent.status,
                "action": agent.current.as_ref().map(|c| c.action.kind()),
                "archetype": agent.personality.archetype,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "count": agents.len(),
        "agents": agents,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/agents/{id} -- single agent detail
// ---------------------------------------------------------------------------

/// Return the full record of a single agent.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let agent_id = AgentId::from(parse_uuid(&id_str)?);
    let world = state.world();

    let agent = world
        .agents
        .iter()
        .find(|a| a.id == agent_id)
        .ok_or_else(|| ObserverError::NotFound(format!("agent {agent_id}")))?;

    Ok(Json(serde_json::to_value(agent)?))
}

// ---------------------------------------------------------------------------
// GET /api/events -- recent events
// ---------------------------------------------------------------------------

/// Return the newest retained events, oldest first.
///
/// # Query Parameters
///
/// - `limit`: 1 to 100 (default 20).
/// - `kind`: Only events of this kind (e.g. `beast_attack`).
/// - `agent_id`: Only events involving this agent (UUID).
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    params.validate()?;
    let limit = params.limit.unwrap_or(DEFAULT_EVENT_LIMIT);

    let agent_filter = params
        .agent_id
        .as_deref()
        .map(parse_uuid)
        .transpose()?
        .map(AgentId::from);

    let world = state.world();
    let matching: Vec<&WorldEvent> = world
        .events
        .iter()
        .filter(|e| {
            if let Some(kind) = params.kind
                && e.kind != kind
            {
                return false;
            }
            if let Some(ref agent_id) = agent_filter
                && !e.agents.contains(agent_id)
            {
                return false;
            }
            true
        })
        .collect();
    let skip = matching.len().saturating_sub(limit);
    let events: Vec<&WorldEvent> = matching.into_iter().skip(skip).collect();

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a UUID from a string, returning an [`ObserverError`] on failure.
fn parse_uuid(s: &str) -> Result<Uuid, ObserverError> {
    s.parse::<Uuid>()
        .map_err(|e| ObserverError::InvalidUuid(format!("{s}: {e}")))
}
