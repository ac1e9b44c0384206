//! Observer API server for the Hearth simulation.
//!
//! Serves the live world over REST and `WebSocket` and takes operator
//! commands. The engine publishes into [`AppState`] after every tick via
//! [`ObserverPublisher`]; the server only ever reads what was published.
//!
//! # Modules
//!
//! - [`error`] -- Error types with HTTP response mapping
//! - [`handlers`] -- Read-only REST endpoint handlers
//! - [`operator`] -- Operator control and memory command handlers
//! - [`router`] -- Axum router construction
//! - [`server`] -- Server binding and lifecycle
//! - [`state`] -- Shared application state and the tick publisher
//! - [`ws`] -- `WebSocket` world stream

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types at crate root for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve, start_server};
pub use state::{AppState, ObserverPublisher, WorldFrame};
