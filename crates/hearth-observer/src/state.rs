//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the latest world snapshot in a [`watch`] channel and
//! fans notifications out over a [`broadcast`] channel. The engine
//! publishes into both through [`ObserverPublisher`], the runner's tick
//! callback. REST reads clone the current `Arc` and never block the tick
//! cycle; a slow `WebSocket` client only ever sees the newest snapshot.

use std::sync::Arc;
use std::time::Duration;

use hearth_core::operator::OperatorState;
use hearth_core::runner::TickCallback;
use hearth_core::tick::{SimulationState, TickSummary};
use hearth_types::{Notification, WorldSnapshot, WorldUpdate};
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::error::ObserverError;

/// Capacity of the broadcast channel for notifications.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const NOTIFICATION_CAPACITY: usize = 256;

/// How long an operator memory command may wait for the tick loop.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// A world frame pushed over the `WebSocket`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WorldFrame<'a> {
    /// Full snapshot, sent on connect and on request.
    WorldState(&'a WorldSnapshot),
    /// Per-tick update.
    WorldUpdate(&'a WorldUpdate),
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    world_tx: watch::Sender<Arc<WorldSnapshot>>,
    notify_tx: broadcast::Sender<Notification>,
    /// Shared operator control state (present when the simulation is running).
    pub operator_state: Option<Arc<OperatorState>>,
    /// How long operator memory commands wait for the tick loop.
    pub command_timeout: Duration,
}

impl AppState {
    /// Create application state serving `initial` until the first tick.
    pub fn new(initial: WorldSnapshot) -> Self {
        let (world_tx, _) = watch::channel(Arc::new(initial));
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            world_tx,
            notify_tx,
            operator_state: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Create application state with operator control attached.
    pub fn with_operator(initial: WorldSnapshot, operator: Arc<OperatorState>) -> Self {
        Self {
            operator_state: Some(operator),
            ..Self::new(initial)
        }
    }

    /// The latest published snapshot.
    pub fn world(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&self.world_tx.borrow())
    }

    /// Follow published snapshots.
    pub fn watch_world(&self) -> watch::Receiver<Arc<WorldSnapshot>> {
        self.world_tx.subscribe()
    }

    /// Subscribe to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    /// Replace the published snapshot. Watchers that have not read the
    /// previous one skip it.
    pub fn publish_world(&self, snapshot: WorldSnapshot) {
        self.world_tx.send_replace(Arc::new(snapshot));
    }

    /// Push a notification to all connected clients.
    ///
    /// Returns the number of receivers that got it. Zero when no client is
    /// connected, which is not an error.
    pub fn notify(&self, notification: Notification) -> usize {
        self.notify_tx.send(notification).unwrap_or(0)
    }

    /// The operator control state.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Unavailable`] when none is attached.
    pub fn operator(&self) -> Result<&Arc<OperatorState>, ObserverError> {
        self.operator_state
            .as_ref()
            .ok_or_else(|| ObserverError::Unavailable("operator state not available".to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Tick callback
// ---------------------------------------------------------------------------

/// Publishes each tick's notifications and snapshot to observers.
#[derive(Debug, Clone)]
pub struct ObserverPublisher {
    state: Arc<AppState>,
}

impl ObserverPublisher {
    /// Publish into `state`.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl TickCallback for ObserverPublisher {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        for notification in &summary.notifications {
            self.state.notify(notification.clone());
        }
        self.state.publish_world(sim.world.snapshot());
    }

    fn on_commands_applied(&mut self, sim: &SimulationState) {
        self.state.publish_world(sim.world.snapshot());
    }
}
