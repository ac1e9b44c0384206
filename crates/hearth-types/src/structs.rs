//! Core entity structs for the Hearth simulation.
//!
//! Covers agents, beasts, resource nodes, buildings, conversations,
//! memories and world events. All times are sim-seconds on the single
//! simulation timeline (`f64`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::actions::{Action, ResolvedTarget};
use crate::enums::{
    ActionKind, Archetype, BeastKind, BeastState, BuildingKind, ConversationKind, EventKind,
    FailureReason, Importance, Item, Lifecycle, Locomotion, MemoryKind, ResourceKind, Season,
    Skill, Tool,
};
use crate::ids::{AgentId, BeastId, BuildingId, ConversationId, EventId, NodeId};

/// Lower bound of every agent attribute.
pub const ATTRIBUTE_MIN: f64 = 0.0;
/// Upper bound of every agent attribute.
pub const ATTRIBUTE_MAX: f64 = 100.0;
/// Highest level a skill can reach.
pub const SKILL_MAX: u32 = 100;
/// Bounds of the affinity one agent holds toward another.
pub const AFFINITY_RANGE: (f64, f64) = (-100.0, 100.0);

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point on the continuous world plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.hypot(dy)
    }
}

// ---------------------------------------------------------------------------
// Agent components
// ---------------------------------------------------------------------------

/// Vital attributes, each kept within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Attributes {
    /// Zero means death.
    pub health: f64,
    /// Rises over time; high hunger drains health.
    pub hunger: f64,
    /// Spent by work, recovered by rest.
    pub stamina: f64,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            health: ATTRIBUTE_MAX,
            hunger: 20.0,
            stamina: ATTRIBUTE_MAX,
        }
    }
}

impl Attributes {
    /// Add `delta` to health and clamp.
    pub fn adjust_health(&mut self, delta: f64) {
        self.health = clamp_attribute(self.health + delta);
    }

    /// Add `delta` to hunger and clamp.
    pub fn adjust_hunger(&mut self, delta: f64) {
        self.hunger = clamp_attribute(self.hunger + delta);
    }

    /// Add `delta` to stamina and clamp.
    pub fn adjust_stamina(&mut self, delta: f64) {
        self.stamina = clamp_attribute(self.stamina + delta);
    }

    /// Clamp all three attributes into range.
    pub fn clamp(&mut self) {
        self.health = clamp_attribute(self.health);
        self.hunger = clamp_attribute(self.hunger);
        self.stamina = clamp_attribute(self.stamina);
    }

    /// Whether the agent needs to decide right away regardless of cadence.
    pub fn is_urgent(&self) -> bool {
        self.health < 30.0 || self.hunger > 80.0 || self.stamina < 10.0
    }
}

/// Clamp a single attribute value into `[0, 100]`, mapping NaN to zero.
pub fn clamp_attribute(value: f64) -> f64 {
    if value.is_nan() {
        return ATTRIBUTE_MIN;
    }
    value.clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX)
}

/// Fixed personality assigned at spawn. Traits run from 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Personality {
    /// Broad behavioral archetype.
    pub archetype: Archetype,
    /// Willingness to fight.
    pub bravery: u32,
    /// Desire for company.
    pub sociability: u32,
    /// Aversion to risk.
    pub cautiousness: u32,
    /// Drive to explore.
    pub curiosity: u32,
    /// Willingness to help others.
    pub cooperation: u32,
    /// Drive to build and accumulate.
    pub ambition: u32,
}

/// A crafted tool or weapon held by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipmentEntry {
    /// Remaining durability.
    pub durability: u32,
    /// Craft quality, 0 to 100.
    pub quality: u32,
    /// Sim-time the item was crafted.
    pub crafted_at: f64,
}

/// Composite agent status: lifecycle plus locomotion overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentStatus {
    /// Action lifecycle state.
    pub lifecycle: Lifecycle,
    /// Whether the agent is travelling.
    pub locomotion: Locomotion,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            locomotion: Locomotion::Stationary,
        }
    }
}

/// The action an agent is currently executing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveAction {
    /// The typed action as dispatched.
    pub action: Action,
    /// Target resolved at dispatch, if the action has one.
    pub target: Option<ResolvedTarget>,
    /// Free-text reasoning supplied with the decision.
    pub reasoning: String,
    /// Sim-time the action started.
    pub started_at: f64,
    /// Sim-time the action completes. `None` for build, which completes
    /// when its building does.
    pub ends_at: Option<f64>,
}

/// Outcome of the most recent action, fed back into the next decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionReport {
    /// Which action this reports on. `None` for outside events such as
    /// being attacked or witnessing an attack.
    pub action: Option<ActionKind>,
    /// Whether it succeeded.
    pub success: bool,
    /// Structured failure reason, if it failed.
    pub reason: Option<FailureReason>,
    /// Human-readable outcome.
    pub message: String,
    /// Sim-time of the outcome.
    pub at: f64,
}

/// A single entry in an agent's memory log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryEntry {
    /// Category of the memory.
    pub kind: MemoryKind,
    /// What happened, in the agent's words.
    pub description: String,
    /// Retention importance from 1 to 10.
    pub importance: u8,
    /// Sim-time the memory was formed, in whole sim-seconds.
    pub timestamp: u64,
}

impl MemoryEntry {
    /// Importance used when none is specified.
    pub const DEFAULT_IMPORTANCE: u8 = 5;

    /// Create a memory entry. Importance is clamped to `1..=10`.
    pub fn new(kind: MemoryKind, description: impl Into<String>, importance: u8, now: f64) -> Self {
        Self {
            kind,
            description: description.into(),
            importance: importance.clamp(1, 10),
            timestamp: whole_seconds(now),
        }
    }
}

/// Truncate a sim-time to whole seconds, treating negatives and NaN as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 {
        now.floor() as u64
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// An autonomous NPC.
///
/// Created once at world start. Death flips `alive` permanently; dead agents
/// stay in the world and never respawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Current position.
    pub position: Position,
    /// False once dead.
    pub alive: bool,
    /// Vital attributes.
    pub attributes: Attributes,
    /// Skill levels. Missing skills are level 0.
    pub skills: BTreeMap<Skill, u32>,
    /// Item counts. Absent items count as zero.
    pub inventory: BTreeMap<Item, u32>,
    /// Crafted tools and weapons.
    pub equipment: BTreeMap<Tool, EquipmentEntry>,
    /// Lifecycle and locomotion.
    pub status: AgentStatus,
    /// The executing action, if any.
    pub current: Option<ActiveAction>,
    /// Sim-time the cooling phase ends.
    pub cooldown_until: Option<f64>,
    /// Where the agent is walking to.
    pub move_target: Option<Position>,
    /// Sim-time of the last decision.
    pub last_decision_at: Option<f64>,
    /// Outcome of the last action.
    pub last_result: Option<ActionReport>,
    /// Fixed personality.
    pub personality: Personality,
    /// Affinity toward other agents, `-100` to `100`.
    pub relationships: BTreeMap<AgentId, f64>,
    /// Bounded memory log, oldest first.
    pub memories: Vec<MemoryEntry>,
    /// Sim-time of the last memory cleanup.
    pub last_memory_cleanup: f64,
    /// Active conversation, if any.
    pub conversation: Option<ConversationId>,
}

impl Agent {
    /// Create a living, idle agent with full health and no possessions.
    pub fn new(name: impl Into<String>, position: Position, personality: Personality) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            position,
            alive: true,
            attributes: Attributes::default(),
            skills: BTreeMap::new(),
            inventory: BTreeMap::new(),
            equipment: BTreeMap::new(),
            status: AgentStatus::default(),
            current: None,
            cooldown_until: None,
            move_target: None,
            last_decision_at: None,
            last_result: None,
            personality,
            relationships: BTreeMap::new(),
            memories: Vec::new(),
            last_memory_cleanup: 0.0,
            conversation: None,
        }
    }

    /// Alive and idle.
    pub fn is_idle(&self) -> bool {
        self.alive && self.status.lifecycle == Lifecycle::Idle
    }

    /// Currently part of a conversation.
    pub const fn is_conversing(&self) -> bool {
        self.conversation.is_some()
    }

    /// Holding a spear or carrying at least one stone.
    pub fn is_armed(&self) -> bool {
        self.has_spear() || self.item_count(Item::Stone) > 0
    }

    /// Holding a spear.
    pub fn has_spear(&self) -> bool {
        self.equipment.contains_key(&Tool::Spear)
    }

    /// Kind of the executing action, if any.
    pub fn current_kind(&self) -> Option<ActionKind> {
        self.current.as_ref().map(|c| c.action.kind())
    }

    /// Count of `item` in the inventory.
    pub fn item_count(&self, item: Item) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    /// Add `amount` of `item`, saturating.
    pub fn add_item(&mut self, item: Item, amount: u32) {
        if amount == 0 {
            return;
        }
        let entry = self.inventory.entry(item).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove `amount` of `item`. Returns `false` and changes nothing if the
    /// agent holds fewer than `amount`.
    pub fn remove_item(&mut self, item: Item, amount: u32) -> bool {
        let held = self.item_count(item);
        let Some(left) = held.checked_sub(amount) else {
            return false;
        };
        if left == 0 {
            self.inventory.remove(&item);
        } else {
            self.inventory.insert(item, left);
        }
        true
    }

    /// Whether the agent holds every item in `needs`.
    pub fn has_items(&self, needs: &[(Item, u32)]) -> bool {
        needs.iter().all(|&(item, n)| self.item_count(item) >= n)
    }

    /// Level of `skill` (0 if never trained).
    pub fn skill(&self, skill: Skill) -> u32 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }

    /// Raise `skill` by `amount`, capped at [`SKILL_MAX`].
    pub fn add_skill(&mut self, skill: Skill, amount: u32) {
        let level = self.skill(skill).saturating_add(amount).min(SKILL_MAX);
        self.skills.insert(skill, level);
    }

    /// Affinity toward `other` (0 if unknown).
    pub fn affinity(&self, other: AgentId) -> f64 {
        self.relationships.get(&other).copied().unwrap_or(0.0)
    }

    /// Shift affinity toward `other` by `delta`, clamped to `[-100, 100]`.
    pub fn adjust_affinity(&mut self, other: AgentId, delta: f64) {
        let (lo, hi) = AFFINITY_RANGE;
        let next = (self.affinity(other) + delta).clamp(lo, hi);
        self.relationships.insert(other, next);
    }
}

// ---------------------------------------------------------------------------
// Beast
// ---------------------------------------------------------------------------

/// A wild animal driven by fixed behavior rules.
///
/// Removed from the world entirely when killed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Beast {
    /// Unique identifier.
    pub id: BeastId,
    /// Species.
    pub kind: BeastKind,
    /// Current position.
    pub position: Position,
    /// Current health.
    pub health: f64,
    /// Health at spawn.
    pub max_health: f64,
    /// 0 to 1. Above 0.5 the beast hunts agents.
    pub aggression: f64,
    /// Units per sim-second at full speed.
    pub speed: f64,
    /// Base damage of one strike.
    pub damage: f64,
    /// Behavior state.
    pub state: BeastState,
    /// Agent being chased, if any.
    pub target: Option<AgentId>,
    /// Where the beast is heading.
    pub move_target: Option<Position>,
    /// Sim-time of the last strike.
    pub last_attack_at: Option<f64>,
    /// Sim-time of the last behavior evaluation.
    pub last_decision_at: Option<f64>,
    /// 0 to 100. Hungry beasts chase from farther away.
    pub hunger: f64,
}

impl Beast {
    /// Whether this beast hunts agents.
    pub fn is_aggressive(&self) -> bool {
        self.aggression > 0.5
    }

    /// Current health as a fraction of max.
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }
}

// ---------------------------------------------------------------------------
// Resources and buildings
// ---------------------------------------------------------------------------

/// A harvestable node (tree, rock, bush, spring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceNode {
    /// Unique identifier.
    pub id: NodeId,
    /// What the node yields.
    pub kind: ResourceKind,
    /// Location.
    pub position: Position,
    /// Units left.
    pub quantity: u32,
    /// Units after regeneration.
    pub max_quantity: u32,
    /// Excluded from target search until regenerated.
    pub depleted: bool,
    /// Sim-time the node ran out.
    pub depleted_at: Option<f64>,
    /// The single agent currently gathering here.
    pub occupied_by: Option<AgentId>,
}

impl ResourceNode {
    /// Create a full, unoccupied node.
    pub fn new(kind: ResourceKind, position: Position, quantity: u32) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            position,
            quantity,
            max_quantity: quantity,
            depleted: false,
            depleted_at: None,
            occupied_by: None,
        }
    }

    /// Free or already held by `agent`.
    pub fn available_to(&self, agent: AgentId) -> bool {
        !self.depleted && self.occupied_by.is_none_or(|holder| holder == agent)
    }

    /// Remaining quantity as a fraction of max.
    pub fn remaining_fraction(&self) -> f64 {
        if self.max_quantity == 0 {
            return 0.0;
        }
        f64::from(self.quantity) / f64::from(self.max_quantity)
    }
}

/// Width and height of a building in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Footprint {
    /// Extent along x.
    pub width: u32,
    /// Extent along y.
    pub height: u32,
}

/// A building site or finished building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Building {
    /// Unique identifier.
    pub id: BuildingId,
    /// Building type.
    pub kind: BuildingKind,
    /// Location.
    pub position: Position,
    /// Footprint.
    pub size: Footprint,
    /// Completion is irreversible.
    pub complete: bool,
    /// 0 to 1.
    pub progress: f64,
    /// Sim-seconds of single-builder work needed.
    pub build_time_total: f64,
    /// Sim-seconds worked so far.
    pub build_time_elapsed: f64,
    /// Agents building here this tick. Recomputed every tick.
    pub builders: Vec<AgentId>,
    /// Hint that helpers are expected. Never enforced.
    pub requires_cooperation: bool,
    /// Items stored inside.
    pub storage: BTreeMap<Item, u32>,
    /// Maximum items storable.
    pub storage_capacity: u32,
    /// Agent that founded the site.
    pub created_by: AgentId,
    /// Sim-time the site was founded.
    pub created_at: f64,
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// One line spoken in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationMessage {
    /// Who said it.
    pub speaker: AgentId,
    /// Speaker's display name.
    pub speaker_name: String,
    /// What was said.
    pub content: String,
    /// Sim-time it was said.
    pub at: f64,
}

/// A conversation between two or more agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Conversation {
    /// Unique identifier.
    pub id: ConversationId,
    /// Agent that started it.
    pub initiator: AgentId,
    /// Everyone taking part, initiator first.
    pub participants: Vec<AgentId>,
    /// The exchange.
    pub messages: Vec<ConversationMessage>,
    /// Category.
    pub kind: ConversationKind,
    /// Short topic line.
    pub topic: String,
    /// Where it takes place.
    pub position: Position,
    /// Sim-time it started.
    pub started_at: f64,
    /// Sim-time it is due to end.
    pub ends_at: f64,
    /// Sim-time it ended. `None` while active.
    pub ended_at: Option<f64>,
    /// Whether idle participants act on `planned_action` at the end.
    pub triggers_action: bool,
    /// Action agreed on in the conversation.
    pub planned_action: Option<Action>,
}

// ---------------------------------------------------------------------------
// Time and events
// ---------------------------------------------------------------------------

/// Calendar view of the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CalendarView {
    /// Day number, starting at 1.
    pub day: u64,
    /// Hour, 0 to 23.
    pub hour: u32,
    /// Minute, 0 to 59.
    pub minute: u32,
    /// Current season.
    pub season: Season,
    /// Hour at or after 20, or before 6.
    pub is_night: bool,
    /// Sim-seconds since start.
    pub sim_time: f64,
}

/// An entry in the world event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEvent {
    /// Unique identifier.
    pub id: EventId,
    /// Category.
    pub kind: EventKind,
    /// What happened.
    pub description: String,
    /// How much it matters.
    pub importance: Importance,
    /// Agents involved.
    pub agents: Vec<AgentId>,
    /// Sim-time it happened.
    pub at: f64,
    /// Wall-clock time it was recorded.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn personality() -> Personality {
        Personality {
            archetype: Archetype::Pragmatic,
            bravery: 50,
            sociability: 50,
            cautiousness: 50,
            curiosity: 50,
            cooperation: 50,
            ambition: 50,
        }
    }

    #[test]
    fn attributes_clamp_on_adjust() {
        let mut attrs = Attributes::default();
        attrs.adjust_health(50.0);
        attrs.adjust_hunger(-500.0);
        attrs.adjust_stamina(f64::NAN);
        assert!((attrs.health - 100.0).abs() < f64::EPSILON);
        assert!(attrs.hunger.abs() < f64::EPSILON);
        assert!(attrs.stamina.abs() < f64::EPSILON);
    }

    #[test]
    fn remove_item_is_all_or_nothing() {
        let mut agent = Agent::new("Alice", Position::new(50.0, 50.0), personality());
        agent.add_item(Item::Wood, 3);
        assert!(!agent.remove_item(Item::Wood, 5));
        assert_eq!(agent.item_count(Item::Wood), 3);
        assert!(agent.remove_item(Item::Wood, 3));
        assert!(!agent.inventory.contains_key(&Item::Wood));
    }

    #[test]
    fn stone_counts_as_armed() {
        let mut agent = Agent::new("Bob", Position::default(), personality());
        assert!(!agent.is_armed());
        agent.add_item(Item::Stone, 1);
        assert!(agent.is_armed());
        assert!(!agent.has_spear());
    }

    #[test]
    fn skill_caps_at_max() {
        let mut agent = Agent::new("Eve", Position::default(), personality());
        agent.add_skill(Skill::Combat, 95);
        agent.add_skill(Skill::Combat, 10);
        assert_eq!(agent.skill(Skill::Combat), SKILL_MAX);
    }

    #[test]
    fn affinity_is_bounded() {
        let mut agent = Agent::new("Eve", Position::default(), personality());
        let other = AgentId::new();
        agent.adjust_affinity(other, 80.0);
        agent.adjust_affinity(other, 80.0);
        assert!((agent.affinity(other) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn node_availability_respects_occupant() {
        let mut node = ResourceNode::new(ResourceKind::Berry, Position::default(), 20);
        let a = AgentId::new();
        let b = AgentId::new();
        node.occupied_by = Some(a);
        assert!(node.available_to(a));
        assert!(!node.available_to(b));
    }

    #[test]
    fn memory_importance_is_clamped() {
        let memory = MemoryEntry::new(MemoryKind::Action, "gathered wood", 42, 12.7);
        assert_eq!(memory.importance, 10);
        assert_eq!(memory.timestamp, 12);
    }

    #[test]
    fn agent_serializes_maps_with_snake_case_keys() {
        let mut agent = Agent::new("Grace", Position::default(), personality());
        agent.add_item(Item::RawMeat, 2);
        let json = serde_json::to_string(&agent).unwrap();
        assert!(json.contains("\"raw_meat\":2"));
    }
}
