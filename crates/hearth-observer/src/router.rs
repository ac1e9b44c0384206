//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST, operator, `WebSocket`) into a single
//! [`Router`] with CORS middleware enabled for cross-origin dashboard
//! access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` world stream
/// - `GET /api/world` -- current world snapshot
/// - `GET /api/agents` -- list agents
/// - `GET /api/agents/{id}` -- single agent
/// - `GET /api/events` -- recent events
/// - `/api/operator/*` -- pause, resume, speed, status, stop, memory commands
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws::ws_world))
        .route("/api/world", get(handlers::get_world))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/{id}", get(handlers::get_agent))
        .route("/api/events", get(handlers::list_events))
        // Operator
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/stop", post(operator::stop))
        .route("/api/operator/add-memory", post(operator::add_memory))
        .route("/api/operator/modify-memory", post(operator::modify_memory))
        .route("/api/operator/clear-memories", post(operator::clear_memories))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
