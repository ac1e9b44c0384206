//! Error types for the `hearth-agents` crate.
//!
//! Validation failures of individual actions are not errors: they are
//! [`ActionFailure`](hearth_types::ActionFailure) values recorded on the
//! agent. [`AgentError`] covers broken invariants, such as an id that does
//! not resolve when the caller promised it would.

use hearth_types::{AgentId, ConversationId};
use hearth_world::WorldError;

/// Errors from agent and beast behavior.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A world lookup failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// An operation that needs a living agent got a dead one.
    #[error("agent {0} is dead")]
    AgentDead(AgentId),

    /// A conversation needs at least two participants.
    #[error("conversation needs at least two participants, got {count}")]
    TooFewParticipants {
        /// Number supplied.
        count: usize,
    },

    /// A conversation participant is already talking elsewhere.
    #[error("agent {agent} is already in conversation {conversation}")]
    AlreadyConversing {
        /// The busy agent.
        agent: AgentId,
        /// Their current conversation.
        conversation: ConversationId,
    },
}
