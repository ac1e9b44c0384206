//! Decision provider selection.
//!
//! [`DecisionProvider`] uses `async fn` in its methods, so it cannot be a
//! trait object. [`EngineProvider`] wraps the two concrete providers in an
//! enum and forwards to whichever one the configuration picked.

use hearth_core::config::{ProviderKind, SimulationConfig};
use hearth_core::decision::{DecisionError, DecisionProvider, RuleBasedProvider};
use hearth_runner::LlmProvider;
use hearth_types::{
    ConversationContext, ConversationScript, Decision, DecisionContext, ParticipantMemory, SummaryContext,
};
use tracing::{info, warn};

use crate::error::EngineError;

/// The provider driving agent decisions for this run.
#[derive(Debug)]
pub enum EngineProvider {
    /// Rule-based decisions only.
    Rules(RuleBasedProvider),
    /// An LLM endpoint; the tick loop falls back to rules on any failure.
    Llm(Box<LlmProvider>),
}

impl EngineProvider {
    /// Build the provider `config` asks for.
    ///
    /// An LLM provider without an API key runs on rules instead.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Provider`] if the prompt templates fail to
    /// load.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, EngineError> {
        match config.decision.provider {
            ProviderKind::Rules => Ok(Self::Rules(RuleBasedProvider::new(config.world.seed))),
            ProviderKind::Llm if config.llm.api_key.trim().is_empty() => {
                warn!("No LLM API key configured, using rule-based decisions");
                Ok(Self::Rules(RuleBasedProvider::new(config.world.seed)))
            }
            ProviderKind::Llm => {
                let provider = LlmProvider::new(&config.llm)?;
                info!(
                    backend = provider.backend_name(),
                    model = %config.llm.model,
                    "LLM decision provider ready"
                );
                Ok(Self::Llm(Box::new(provider)))
            }
        }
    }
}

impl DecisionProvider for EngineProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::Rules(p) => p.name(),
            Self::Llm(p) => p.name(),
        }
    }

    async fn decide(&self, context: &DecisionContext) -> Result<Decision, DecisionError> {
        match self {
            Self::Rules(p) => p.decide(context).await,
            Self::Llm(p) => p.decide(context).await,
        }
    }

    async fn converse(&self, context: &ConversationContext) -> Result<ConversationScript, DecisionError> {
        match self {
            Self::Rules(p) => p.converse(context).await,
            Self::Llm(p) => p.converse(context).await,
        }
    }

    async fn summarize(&self, context: &SummaryContext) -> Result<Vec<ParticipantMemory>, DecisionError> {
        match self {
            Self::Rules(p) => p.summarize(context).await,
            Self::Llm(p) => p.summarize(context).await,
        }
    }
}
