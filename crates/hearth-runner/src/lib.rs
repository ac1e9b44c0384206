//! LLM-backed decision provider for the Hearth simulation.
//!
//! Renders agent context into prompts, calls an OpenAI-compatible or
//! Anthropic endpoint, and parses the reply into decisions, conversation
//! scripts, and memories. Any failure surfaces as a
//! [`DecisionError`](hearth_core::DecisionError) so the tick loop can use
//! its deterministic fallback.
//!
//! # Modules
//!
//! - [`error`] -- [`RunnerError`] and its mapping onto provider errors.
//! - [`llm`] -- HTTP backends for the supported wire formats.
//! - [`parse`] -- JSON recovery and mapping onto typed payloads.
//! - [`prompt`] -- Built-in and overridable `minijinja` templates.
//! - [`provider`] -- [`LlmProvider`], the `DecisionProvider` implementation.

pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod provider;

// Re-export primary types at crate root for convenience.
pub use error::RunnerError;
pub use llm::{LlmBackend, create_backend};
pub use prompt::{PromptEngine, PromptKind, RenderedPrompt};
pub use provider::LlmProvider;
