//! Context payloads handed to decision providers, and the content they
//! return for conversations.
//!
//! The simulation builds a [`DecisionContext`] for each agent due a
//! decision and a [`ConversationContext`] for each conversation it opens.
//! Providers never see the world directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::actions::Action;
use crate::enums::{
    ActionKind, BeastKind, BeastState, BuildingKind, ConversationKind, Item, ResourceKind, Skill,
    Tool, Weather,
};
use crate::ids::{AgentId, BeastId, BuildingId, ConversationId, NodeId};
use crate::structs::{
    ActionReport, Attributes, CalendarView, EquipmentEntry, MemoryEntry, Personality, Position,
};

/// A resource node within perception range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NearbyResource {
    /// Node id.
    pub id: NodeId,
    /// Node kind.
    pub kind: ResourceKind,
    /// Node position.
    pub position: Position,
    /// Distance from the perceiving agent.
    pub distance: f64,
    /// Units left.
    pub quantity: u32,
    /// Held by another agent.
    pub occupied: bool,
}

/// Another agent within perception range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NearbyAgent {
    /// Agent id.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Position.
    pub position: Position,
    /// Distance from the perceiving agent.
    pub distance: f64,
    /// Their health.
    pub health: f64,
    /// Their hunger.
    pub hunger: f64,
    /// Whether they are in a conversation.
    pub conversing: bool,
    /// What they are doing, if anything.
    pub activity: Option<ActionKind>,
    /// The perceiving agent's affinity toward them.
    pub affinity: f64,
}

/// A building or site within perception range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NearbyBuilding {
    /// Building id.
    pub id: BuildingId,
    /// Building type.
    pub kind: BuildingKind,
    /// Position.
    pub position: Position,
    /// Distance from the perceiving agent.
    pub distance: f64,
    /// Finished.
    pub complete: bool,
    /// Construction progress, 0 to 1.
    pub progress: f64,
}

/// A beast within perception range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NearbyBeast {
    /// Beast id.
    pub id: BeastId,
    /// Species.
    pub kind: BeastKind,
    /// Position.
    pub position: Position,
    /// Distance from the perceiving agent.
    pub distance: f64,
    /// Current health.
    pub health: f64,
    /// Hunts agents.
    pub aggressive: bool,
    /// Behavior state.
    pub state: BeastState,
}

/// Everything a decision provider sees for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionContext {
    /// Deciding agent.
    pub agent_id: AgentId,
    /// Its name.
    pub name: String,
    /// Its position.
    pub position: Position,
    /// Its vitals.
    pub attributes: Attributes,
    /// Its skills.
    pub skills: BTreeMap<Skill, u32>,
    /// Its inventory.
    pub inventory: BTreeMap<Item, u32>,
    /// Its equipment.
    pub equipment: BTreeMap<Tool, EquipmentEntry>,
    /// Its personality.
    pub personality: Personality,
    /// Current calendar.
    pub calendar: CalendarView,
    /// Current weather.
    pub weather: Weather,
    /// Non-depleted nodes within 20 units, nearest first.
    pub nearby_resources: Vec<NearbyResource>,
    /// Living agents within 15 units, nearest first.
    pub nearby_agents: Vec<NearbyAgent>,
    /// Buildings within 25 units, nearest first.
    pub nearby_buildings: Vec<NearbyBuilding>,
    /// Beasts within 20 units, nearest first.
    pub nearby_beasts: Vec<NearbyBeast>,
    /// Outcome of the previous action.
    pub last_result: Option<ActionReport>,
    /// Newest memories.
    pub recent_memories: Vec<MemoryEntry>,
    /// The ten newest memories of importance 9 or more.
    pub critical_memories: Vec<MemoryEntry>,
}

impl DecisionContext {
    /// Count of `item` held.
    pub fn item_count(&self, item: Item) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    /// Whether any food item is held.
    pub fn has_food(&self) -> bool {
        [Item::CookedMeat, Item::Berry, Item::RawMeat]
            .into_iter()
            .any(|food| self.item_count(food) > 0)
    }

    /// Nearest visible non-depleted node of `kind`.
    pub fn nearest_resource(&self, kind: ResourceKind) -> Option<&NearbyResource> {
        self.nearby_resources
            .iter()
            .filter(|r| r.kind == kind && !r.occupied)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// A participant as seen by the conversation content provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationParticipant {
    /// Agent id.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Vitals.
    pub attributes: Attributes,
    /// Personality.
    pub personality: Personality,
    /// Inventory.
    pub inventory: BTreeMap<Item, u32>,
    /// Whether any tool or weapon is held.
    pub has_equipment: bool,
    /// Newest memories.
    pub recent_memories: Vec<MemoryEntry>,
}

/// Input for generating a conversation's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationContext {
    /// Participants, initiator first.
    pub participants: Vec<ConversationParticipant>,
    /// Current calendar.
    pub calendar: CalendarView,
    /// Current weather.
    pub weather: Weather,
    /// An aggressive beast is within 20 units of the initiator.
    pub aggressive_beast_nearby: bool,
}

/// One scripted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScriptLine {
    /// Speaker.
    pub speaker: AgentId,
    /// What they say.
    pub content: String,
}

/// Conversation content returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationScript {
    /// Category.
    pub kind: ConversationKind,
    /// Topic line.
    pub topic: String,
    /// Two to six lines.
    pub messages: Vec<ScriptLine>,
    /// Whether the planned action fires when the conversation ends.
    pub triggers_action: bool,
    /// Action agreed on.
    pub planned_action: Option<Action>,
}

/// Input for summarizing a finished conversation into memories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SummaryContext {
    /// The conversation.
    pub conversation_id: ConversationId,
    /// Participant ids and names, initiator first.
    pub participants: Vec<(AgentId, String)>,
    /// Category.
    pub kind: ConversationKind,
    /// Topic line.
    pub topic: String,
    /// Transcript lines as `name: content`.
    pub transcript: Vec<String>,
}

/// A first-person memory for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParticipantMemory {
    /// Whose memory it is.
    pub agent_id: AgentId,
    /// What they remember.
    pub memory: String,
}
