//! Shared type definitions for the Hearth simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types flow to `TypeScript` via `ts-rs` for the observer
//! frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for every entity identifier
//! - [`enums`] -- Enumerations (items, tools, buildings, beasts, weather, events)
//! - [`structs`] -- Core entities (agents, beasts, nodes, buildings, conversations)
//! - [`actions`] -- The typed action vocabulary and decision payloads
//! - [`perception`] -- Contexts handed to decision providers and their replies
//! - [`snapshot`] -- Outbound world snapshots, updates, and notifications

pub mod actions;
pub mod enums;
pub mod ids;
pub mod perception;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionFailure, AgentRef, BeastTarget, Decision, ResolvedTarget};
pub use enums::{
    ActionKind, Archetype, BeastKind, BeastState, BuildingKind, ConversationKind, EventKind,
    FailureReason, Importance, Item, Lifecycle, Locomotion, MemoryKind, ResourceKind, Season,
    Skill, Tool, Weather,
};
pub use ids::{AgentId, BeastId, BuildingId, ConversationId, EventId, NodeId};
pub use perception::{
    ConversationContext, ConversationParticipant, ConversationScript, DecisionContext,
    NearbyAgent, NearbyBeast, NearbyBuilding, NearbyResource, ParticipantMemory, ScriptLine,
    SummaryContext,
};
pub use snapshot::{Notification, WorldSnapshot, WorldUpdate};
pub use structs::{
    ATTRIBUTE_MAX, ATTRIBUTE_MIN, ActionReport, ActiveAction, Agent, AgentStatus, Attributes,
    Beast, Building, CalendarView, Conversation, ConversationMessage, EquipmentEntry, Footprint,
    MemoryEntry, Personality, Position, ResourceNode, SKILL_MAX, WorldEvent, clamp_attribute,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes each #[ts(export)] type to `bindings/`.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::BeastId::export_all();
        let _ = crate::ids::NodeId::export_all();
        let _ = crate::ids::BuildingId::export_all();
        let _ = crate::ids::ConversationId::export_all();
        let _ = crate::ids::EventId::export_all();

        // Enums
        let _ = crate::enums::Lifecycle::export_all();
        let _ = crate::enums::Locomotion::export_all();
        let _ = crate::enums::Archetype::export_all();
        let _ = crate::enums::Skill::export_all();
        let _ = crate::enums::ResourceKind::export_all();
        let _ = crate::enums::Item::export_all();
        let _ = crate::enums::Tool::export_all();
        let _ = crate::enums::BuildingKind::export_all();
        let _ = crate::enums::BeastKind::export_all();
        let _ = crate::enums::BeastState::export_all();
        let _ = crate::enums::Weather::export_all();
        let _ = crate::enums::Season::export_all();
        let _ = crate::enums::ActionKind::export_all();
        let _ = crate::enums::FailureReason::export_all();
        let _ = crate::enums::ConversationKind::export_all();
        let _ = crate::enums::MemoryKind::export_all();
        let _ = crate::enums::Importance::export_all();
        let _ = crate::enums::EventKind::export_all();

        // Structs
        let _ = crate::structs::Position::export_all();
        let _ = crate::structs::Attributes::export_all();
        let _ = crate::structs::Personality::export_all();
        let _ = crate::structs::EquipmentEntry::export_all();
        let _ = crate::structs::AgentStatus::export_all();
        let _ = crate::structs::ActiveAction::export_all();
        let _ = crate::structs::ActionReport::export_all();
        let _ = crate::structs::MemoryEntry::export_all();
        let _ = crate::structs::Agent::export_all();
        let _ = crate::structs::Beast::export_all();
        let _ = crate::structs::ResourceNode::export_all();
        let _ = crate::structs::Footprint::export_all();
        let _ = crate::structs::Building::export_all();
        let _ = crate::structs::ConversationMessage::export_all();
        let _ = crate::structs::Conversation::export_all();
        let _ = crate::structs::CalendarView::export_all();
        let _ = crate::structs::WorldEvent::export_all();

        // Actions
        let _ = crate::actions::Action::export_all();
        let _ = crate::actions::AgentRef::export_all();
        let _ = crate::actions::BeastTarget::export_all();
        let _ = crate::actions::ResolvedTarget::export_all();
        let _ = crate::actions::Decision::export_all();
        let _ = crate::actions::ActionFailure::export_all();

        // Perception
        let _ = crate::perception::DecisionContext::export_all();
        let _ = crate::perception::ConversationContext::export_all();
        let _ = crate::perception::ConversationScript::export_all();
        let _ = crate::perception::SummaryContext::export_all();
        let _ = crate::perception::ParticipantMemory::export_all();

        // Snapshots
        let _ = crate::snapshot::WorldSnapshot::export_all();
        let _ = crate::snapshot::WorldUpdate::export_all();
        let _ = crate::snapshot::Notification::export_all();
    }
}
