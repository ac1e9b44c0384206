//! Error types for the `hearth-world` crate.

use hearth_types::{AgentId, BeastId, BuildingId, ConversationId, NodeId};

/// Errors from world lookups and insertions.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An agent was not found.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A beast was not found (it may have been killed).
    #[error("beast not found: {0}")]
    BeastNotFound(BeastId),

    /// A resource node was not found.
    #[error("resource node not found: {0}")]
    NodeNotFound(NodeId),

    /// A building was not found.
    #[error("building not found: {0}")]
    BuildingNotFound(BuildingId),

    /// A conversation was not found.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// An entity with the same id is already in the world.
    #[error("duplicate entity id: {0}")]
    Duplicate(uuid::Uuid),
}
