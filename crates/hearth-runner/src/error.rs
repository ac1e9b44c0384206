//! Error types for the LLM-backed provider.
//!
//! Uses `thiserror` for typed errors that surface through the provider
//! pipeline: prompt rendering, the LLM call, and response parsing. Each
//! maps onto a [`DecisionError`] so the tick loop can fall back.

use hearth_core::DecisionError;

/// Errors that can occur while asking an LLM for content.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM response could not be parsed into the requested shape.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<RunnerError> for DecisionError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::LlmBackend(message) => Self::Transport { message },
            RunnerError::Parse(message) => Self::Malformed { message },
            RunnerError::Serde(e) => Self::Malformed { message: e.to_string() },
            RunnerError::Template(message) => Self::Internal { message },
        }
    }
}
