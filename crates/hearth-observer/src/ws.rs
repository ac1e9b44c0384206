//! `WebSocket` handler for the live world stream.
//!
//! Clients connect to `GET /ws`. The first frame is a `world_state` with
//! the full snapshot. After that the handler forwards a `world_update`
//! whenever a new snapshot is published and every notification
//! (`npc_action`, `conversation_start`, `conversation_end`,
//! `social_interaction`) as it happens.
//!
//! Snapshots travel over a watch channel, so a slow client skips straight
//! to the newest one. Notifications travel over a broadcast channel; a
//! client that lags skips the messages it missed. A client may send
//! `{"type":"request_world_state"}` to get a fresh full snapshot.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use hearth_types::WorldUpdate;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, WorldFrame};

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_world(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize `frame` and send it. Returns false once the client is gone.
async fn send_json<T: Serialize + Sync>(socket: &mut WebSocket, frame: &T) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize WebSocket frame: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

fn is_state_request(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(serde_json::Value::as_str).map(ToOwned::to_owned))
        .is_some_and(|t| t == "request_world_state")
}

/// Handle the `WebSocket` lifecycle.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut world_rx = state.watch_world();
    let mut notify_rx = state.subscribe();

    let initial = world_rx.borrow_and_update().clone();
    if !send_json(&mut socket, &WorldFrame::WorldState(&initial)).await {
        debug!("WebSocket client disconnected before the first frame");
        return;
    }

    loop {
        tokio::select! {
            changed = world_rx.changed() => {
                if changed.is_err() {
                    debug!("World channel closed, shutting down WebSocket");
                    return;
                }
                let snapshot = world_rx.borrow_and_update().clone();
                let update = WorldUpdate::from(&*snapshot);
                if !send_json(&mut socket, &WorldFrame::WorldUpdate(&update)).await {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            result = notify_rx.recv() => {
                match result {
                    Ok(notification) => {
                        if !send_json(&mut socket, &notification).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Notification channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Text(text))) if is_state_request(&text) => {
                        let snapshot = state.world();
                        if !send_json(&mut socket, &WorldFrame::WorldState(&snapshot)).await {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_state_requests() {
        assert!(is_state_request(r#"{"type":"request_world_state"}"#));
        assert!(!is_state_request(r#"{"type":"ping"}"#));
        assert!(!is_state_request("request_world_state"));
    }
}
