//! Outbound views of the world: full snapshots, per-tick updates, and
//! out-of-band notifications.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, ConversationKind, Weather};
use crate::ids::{AgentId, ConversationId};
use crate::structs::{
    Agent, Beast, Building, CalendarView, Conversation, ConversationMessage, ResourceNode,
    WorldEvent,
};

/// Full world state, sent on first connect and on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Ticks run so far.
    pub tick: u64,
    /// Calendar.
    pub calendar: CalendarView,
    /// Weather.
    pub weather: Weather,
    /// Every agent, dead ones included.
    pub agents: Vec<Agent>,
    /// Living beasts.
    pub beasts: Vec<Beast>,
    /// Sites and buildings.
    pub buildings: Vec<Building>,
    /// Resource nodes.
    pub resources: Vec<ResourceNode>,
    /// Active conversations.
    pub conversations: Vec<Conversation>,
    /// Retained event log, oldest first.
    pub events: Vec<WorldEvent>,
}

/// Incremental state emitted after every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldUpdate {
    /// Tick just completed.
    pub tick: u64,
    /// Calendar.
    pub calendar: CalendarView,
    /// Weather.
    pub weather: Weather,
    /// Every agent.
    pub agents: Vec<Agent>,
    /// Living beasts.
    pub beasts: Vec<Beast>,
    /// Sites and buildings.
    pub buildings: Vec<Building>,
    /// Resource nodes.
    pub resources: Vec<ResourceNode>,
    /// Ten newest events, oldest first.
    pub events: Vec<WorldEvent>,
}

impl From<&WorldSnapshot> for WorldUpdate {
    fn from(snapshot: &WorldSnapshot) -> Self {
        let skip = snapshot.events.len().saturating_sub(10);
        Self {
            tick: snapshot.tick,
            calendar: snapshot.calendar,
            weather: snapshot.weather,
            agents: snapshot.agents.clone(),
            beasts: snapshot.beasts.clone(),
            buildings: snapshot.buildings.clone(),
            resources: snapshot.resources.clone(),
            events: snapshot.events.iter().skip(skip).cloned().collect(),
        }
    }
}

/// A discrete occurrence pushed to observers immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// An agent started, finished, or failed an action.
    NpcAction {
        /// Agent.
        agent_id: AgentId,
        /// Agent's name.
        agent_name: String,
        /// Action kind.
        action: ActionKind,
        /// Outcome text.
        message: String,
        /// Whether it went well.
        success: bool,
    },
    /// A conversation began.
    ConversationStart {
        /// Conversation.
        conversation_id: ConversationId,
        /// Participants.
        participants: Vec<AgentId>,
        /// Category.
        kind: ConversationKind,
        /// Topic line.
        topic: String,
        /// Scripted lines.
        messages: Vec<ConversationMessage>,
    },
    /// A conversation ended.
    ConversationEnd {
        /// Conversation.
        conversation_id: ConversationId,
        /// Participants.
        participants: Vec<AgentId>,
        /// Topic line.
        topic: String,
    },
    /// Two agents exchanged items or a passing word.
    SocialInteraction {
        /// Agent that acted.
        from: AgentId,
        /// Agent acted upon.
        to: AgentId,
        /// What happened.
        description: String,
    },
}
