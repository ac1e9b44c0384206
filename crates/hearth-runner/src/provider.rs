//! The LLM-backed [`DecisionProvider`].
//!
//! Each call renders a prompt, sends it to the configured backend, and
//! parses the reply. Errors are returned as [`DecisionError`]s; the tick
//! loop bounds every call with its own timeout and falls back on failure.

use std::path::Path;

use hearth_core::config::LlmConfig;
use hearth_core::{DecisionError, DecisionProvider};
use hearth_types::{ConversationContext, ConversationScript, Decision, DecisionContext, ParticipantMemory, SummaryContext};
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::error::RunnerError;
use crate::llm::{LlmBackend, create_backend};
use crate::parse;
use crate::prompt::{PromptEngine, PromptKind};

/// A decision provider that asks an LLM.
#[derive(Debug)]
pub struct LlmProvider {
    backend: LlmBackend,
    prompts: PromptEngine,
}

impl LlmProvider {
    /// Build the backend and load the prompt templates.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if a template override cannot be
    /// loaded.
    pub fn new(config: &LlmConfig) -> Result<Self, RunnerError> {
        let prompts = PromptEngine::new(config.template_dir.as_deref().map(Path::new))?;
        Ok(Self {
            backend: create_backend(config),
            prompts,
        })
    }

    /// Which wire format this provider speaks.
    pub const fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn ask<S: Serialize + Sync>(&self, kind: PromptKind, context: &S) -> Result<String, RunnerError> {
        let prompt = self.prompts.render(kind, context)?;
        let started = Instant::now();
        let reply = self.backend.complete(&prompt).await?;
        debug!(
            backend = self.backend.name(),
            prompt = ?kind,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            reply_len = reply.len(),
            "LLM replied"
        );
        Ok(reply)
    }
}

impl DecisionProvider for LlmProvider {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn decide(&self, context: &DecisionContext) -> Result<Decision, DecisionError> {
        let reply = self.ask(PromptKind::Decide, context).await?;
        Ok(parse::parse_decision(&reply)?)
    }

    async fn converse(&self, context: &ConversationContext) -> Result<ConversationScript, DecisionError> {
        let reply = self.ask(PromptKind::Converse, context).await?;
        Ok(parse::parse_script(&reply, context)?)
    }

    async fn summarize(&self, context: &SummaryContext) -> Result<Vec<ParticipantMemory>, DecisionError> {
        let reply = self.ask(PromptKind::Summarize, context).await?;
        Ok(parse::parse_summary(&reply, context)?)
    }
}
