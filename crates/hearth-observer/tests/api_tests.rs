//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Operator memory commands are answered by a
//! small task standing in for the tick loop.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hearth_core::config::RunConfig;
use hearth_core::operator::{OperatorState, apply_memory_command};
use hearth_observer::router::build_router;
use hearth_observer::state::AppState;
use hearth_types::{Agent, AgentId, Archetype, EventKind, Importance, Personality, Position};
use hearth_world::World;
use serde_json::Value;
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

fn personality() -> Personality {
    Personality {
        archetype: Archetype::Social,
        bravery: 40,
        sociability: 80,
        cautiousness: 50,
        curiosity: 50,
        cooperation: 70,
        ambition: 30,
    }
}

/// A world with Alice and Bob alive and Carol dead.
fn make_world() -> (World, AgentId) {
    let mut world = World::new();
    let alice = world
        .add_agent(Agent::new("Alice", Position::new(50.0, 50.0), personality()))
        .unwrap();
    world
        .add_agent(Agent::new("Bob", Position::new(52.0, 50.0), personality()))
        .unwrap();
    let carol = world
        .add_agent(Agent::new("Carol", Position::new(10.0, 10.0), personality()))
        .unwrap();
    world.agent_mut(carol).unwrap().alive = false;

    world.emit(EventKind::NpcDeath, "Carol died", Importance::Critical, vec![carol]);
    for i in 0..5 {
        world.emit(
            EventKind::ResourceDepleted,
            format!("Berry bush {i} was picked clean"),
            Importance::Low,
            vec![alice],
        );
    }
    (world, alice)
}

fn make_state() -> (Arc<AppState>, AgentId) {
    let (world, alice) = make_world();
    (Arc::new(AppState::new(world.snapshot())), alice)
}

/// State with an operator attached and a task applying its commands to
/// `world`.
fn make_operated_state(world: World) -> (Arc<AppState>, Arc<OperatorState>) {
    let operator = Arc::new(OperatorState::new(1000, &RunConfig::default()));
    let state = Arc::new(AppState::with_operator(world.snapshot(), Arc::clone(&operator)));

    let loop_operator = Arc::clone(&operator);
    let loop_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut world = world;
        loop {
            let pending = loop_operator.drain_commands().await;
            if !pending.is_empty() {
                for p in pending {
                    let outcome = apply_memory_command(&mut world, &p.command);
                    let _ = p.reply.send(outcome);
                }
                loop_state.publish_world(world.snapshot());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });

    (state, operator)
}

async fn body_to_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, uri: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(state: Arc<AppState>, uri: &str, body: &Value) -> axum::response::Response {
    build_router(state)
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

// =============================================================================
// Read-only endpoints
// =============================================================================

#[tokio::test]
async fn index_returns_html() {
    let (state, _) = make_state();
    let response = get(state, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Hearth Observer"));
}

#[tokio::test]
async fn world_returns_full_snapshot() {
    let (state, _) = make_state();
    let response = get(state, "/api/world").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["tick"], 0);
    assert_eq!(json["agents"].as_array().unwrap().len(), 3);
    assert_eq!(json["events"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn agents_filter_by_status() {
    let (state, _) = make_state();

    let all = body_to_json(get(Arc::clone(&state), "/api/agents").await).await;
    assert_eq!(all["count"], 3);

    let alive = body_to_json(get(Arc::clone(&state), "/api/agents?status=alive").await).await;
    assert_eq!(alive["count"], 2);

    let dead = body_to_json(get(state, "/api/agents?status=dead").await).await;
    assert_eq!(dead["count"], 1);
    assert_eq!(dead["agents"][0]["name"], "Carol");
}

#[tokio::test]
async fn agents_reject_unknown_status() {
    let (state, _) = make_state();
    let response = get(state, "/api/agents?status=sleeping").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agent_by_id() {
    let (state, alice) = make_state();
    let response = get(state, &format!("/api/agents/{alice}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["name"], "Alice");
    assert_eq!(json["alive"], true);
}

#[tokio::test]
async fn agent_unknown_id_is_not_found() {
    let (state, _) = make_state();
    let response = get(state, &format!("/api/agents/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn agent_bad_uuid_is_bad_request() {
    let (state, _) = make_state();
    let response = get(state, "/api/agents/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn events_keep_the_newest() {
    let (state, _) = make_state();
    let json = body_to_json(get(state, "/api/events?limit=2").await).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["events"][1]["description"], "Berry bush 4 was picked clean");
}

#[tokio::test]
async fn events_filter_by_kind_and_agent() {
    let (state, alice) = make_state();

    let deaths = body_to_json(get(Arc::clone(&state), "/api/events?kind=npc_death").await).await;
    assert_eq!(deaths["count"], 1);

    let involving = body_to_json(get(state, &format!("/api/events?agent_id={alice}")).await).await;
    assert_eq!(involving["count"], 5);
}

#[tokio::test]
async fn events_limit_out_of_range_is_rejected() {
    let (state, _) = make_state();
    let response = get(Arc::clone(&state), "/api/events?limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(state, "/api/events?limit=101").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Operator control
// =============================================================================

#[tokio::test]
async fn operator_endpoints_need_operator_state() {
    let (state, _) = make_state();
    let response = post_json(state, "/api/operator/pause", &serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn pause_and_resume() {
    let (world, _) = make_world();
    let (state, operator) = make_operated_state(world);

    let response = post_json(Arc::clone(&state), "/api/operator/pause", &serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(operator.is_paused());

    let status = body_to_json(get(Arc::clone(&state), "/api/operator/status").await).await;
    assert_eq!(status["paused"], true);
    assert_eq!(status["agents_alive"], 2);
    assert_eq!(status["agents_total"], 3);

    post_json(state, "/api/operator/resume", &serde_json::json!({})).await;
    assert!(!operator.is_paused());
}

#[tokio::test]
async fn speed_changes_interval() {
    let (world, _) = make_world();
    let (state, operator) = make_operated_state(world);

    let response = post_json(
        Arc::clone(&state),
        "/api/operator/speed",
        &serde_json::json!({"tick_interval_ms": 250}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["previous_interval_ms"], 1000);
    assert_eq!(json["new_interval_ms"], 250);
    assert_eq!(operator.tick_interval_ms(), 250);

    let response = post_json(state, "/api/operator/speed", &serde_json::json!({"tick_interval_ms": 50})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(operator.tick_interval_ms(), 250);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (world, _) = make_world();
    let (state, operator) = make_operated_state(world);

    for _ in 0..2 {
        let response = post_json(Arc::clone(&state), "/api/operator/stop", &serde_json::json!({})).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert!(operator.is_stop_requested());

    let response = post_json(
        state,
        "/api/operator/add-memory",
        &serde_json::json!({"memory": "too late"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Memory commands
// =============================================================================

#[tokio::test]
async fn add_memory_to_all_living_agents() {
    let (world, _) = make_world();
    let (state, _) = make_operated_state(world);

    let response = post_json(
        Arc::clone(&state),
        "/api/operator/add-memory",
        &serde_json::json!({"memory": "A storm is coming"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["success"], true);
    let affected: Vec<&str> = json["affected"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(affected.len(), 2);
    assert!(!affected.contains(&"Carol"));

    // The republished snapshot carries the memory.
    let world = state.world();
    let alice = world.agents.iter().find(|a| a.name == "Alice").unwrap();
    assert!(alice.memories.iter().any(|m| m.description == "A storm is coming"));
}

#[tokio::test]
async fn modify_memory_reports_out_of_range() {
    let (world, _) = make_world();
    let (state, _) = make_operated_state(world);

    let response = post_json(
        state,
        "/api/operator/modify-memory",
        &serde_json::json!({"agent": "Alice", "index": 9, "new_memory": "rewritten"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn clear_memories_of_unknown_agent_fails() {
    let (world, _) = make_world();
    let (state, _) = make_operated_state(world);

    let response = post_json(
        state,
        "/api/operator/clear-memories",
        &serde_json::json!({"target": "Zed"}),
    )
    .await;
    let json = body_to_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn empty_memory_is_rejected_before_queueing() {
    let (world, _) = make_world();
    let (state, _) = make_operated_state(world);

    let response = post_json(
        state,
        "/api/operator/add-memory",
        &serde_json::json!({"target": "Alice", "memory": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unanswered_command_times_out() {
    let (world, _) = make_world();
    let operator = Arc::new(OperatorState::new(1000, &RunConfig::default()));
    let mut app = AppState::with_operator(world.snapshot(), operator);
    app.command_timeout = Duration::from_millis(50);

    let response = post_json(
        Arc::new(app),
        "/api/operator/add-memory",
        &serde_json::json!({"memory": "nobody hears this"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
