//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hearth_core::config::ConfigError,
    },

    /// Clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: hearth_core::clock::ClockError,
    },

    /// Adding a seeded entity to the world failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: hearth_world::WorldError,
    },

    /// Spawning a seeded beast failed.
    #[error("beast spawn error: {source}")]
    Agents {
        /// The underlying agent error.
        #[from]
        source: hearth_agents::AgentError,
    },

    /// The LLM provider could not be built.
    #[error("provider error: {source}")]
    Provider {
        /// The underlying runner error.
        #[from]
        source: hearth_runner::RunnerError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: hearth_observer::ServerError,
    },
}
