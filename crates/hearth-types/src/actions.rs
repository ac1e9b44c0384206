//! Typed action vocabulary exchanged between the decision provider and the
//! simulation.
//!
//! Actions are a tagged union keyed by `type` with a typed payload per
//! variant. Loosely-typed targets (an agent id or a name, a beast id or a
//! species) are modelled as untagged enums and resolved exactly once at
//! dispatch into a [`ResolvedTarget`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, BeastKind, BuildingKind, FailureReason, Item, ResourceKind, Tool};
use crate::ids::{AgentId, BeastId, BuildingId, NodeId};
use crate::structs::Position;

/// Reference to another agent by id or by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum AgentRef {
    /// Exact id.
    Id(AgentId),
    /// Display name, matched case-insensitively.
    Name(String),
}

/// Reference to a beast by id or by species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum BeastTarget {
    /// Exact id.
    Id(BeastId),
    /// Nearest beast of this species.
    Kind(BeastKind),
}

/// One action from the fixed vocabulary, with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Walk to a point.
    Move {
        /// Target x.
        x: f64,
        /// Target y.
        y: f64,
    },
    /// Harvest the nearest available node of a kind.
    Gather {
        /// Node kind to look for.
        resource: ResourceKind,
    },
    /// Attack a beast.
    Hunt {
        /// Beast to attack. Defaults to the nearest.
        #[serde(default)]
        target: Option<BeastTarget>,
    },
    /// Make a tool or weapon.
    Craft {
        /// Recipe output.
        item: Tool,
    },
    /// Found or join a building site.
    Build {
        /// Building type.
        building: BuildingKind,
    },
    /// Consume one unit of food or water.
    Eat {
        /// What to eat.
        food: Item,
    },
    /// Recover stamina and health.
    Rest,
    /// Start a conversation with a nearby agent.
    Talk {
        /// Preferred partner. Defaults to the nearest eligible agent.
        #[serde(default)]
        with: Option<AgentRef>,
    },
    /// Wander a short way.
    Explore,
    /// Escape from nearby beasts.
    Flee,
    /// Fight back against a beast.
    Defend {
        /// Beast to fight. Defaults to the nearest.
        #[serde(default)]
        target: Option<BeastTarget>,
    },
    /// Give items to a nearby agent.
    Share {
        /// Receiver.
        with: AgentRef,
        /// Item to give. Chosen from the receiver's needs when omitted.
        #[serde(default)]
        item: Option<Item>,
    },
    /// Cook all raw meat at a campfire.
    Cook,
}

impl Action {
    /// The payload-free kind of this action.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Move { .. } => ActionKind::Move,
            Self::Gather { .. } => ActionKind::Gather,
            Self::Hunt { .. } => ActionKind::Hunt,
            Self::Craft { .. } => ActionKind::Craft,
            Self::Build { .. } => ActionKind::Build,
            Self::Eat { .. } => ActionKind::Eat,
            Self::Rest => ActionKind::Rest,
            Self::Talk { .. } => ActionKind::Talk,
            Self::Explore => ActionKind::Explore,
            Self::Flee => ActionKind::Flee,
            Self::Defend { .. } => ActionKind::Defend,
            Self::Share { .. } => ActionKind::Share,
            Self::Cook => ActionKind::Cook,
        }
    }
}

/// A target resolved to a concrete entity at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResolvedTarget {
    /// A resource node.
    Node(NodeId),
    /// A beast.
    Beast(BeastId),
    /// A building site or building.
    Building(BuildingId),
    /// Another agent.
    Agent(AgentId),
    /// A point on the map.
    Point(Position),
}

/// A decision returned by a decision provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Decision {
    /// The chosen action.
    pub action: Action,
    /// Why the agent chose it.
    #[serde(default)]
    pub reasoning: String,
    /// Suggested duration in sim-seconds. Advisory only.
    #[serde(default)]
    pub duration_hint: Option<f64>,
    /// Provider-assigned priority, 1 to 10.
    #[serde(default)]
    pub priority: Option<u8>,
}

impl Decision {
    /// A decision with reasoning and no hints.
    pub fn new(action: Action, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            reasoning: reasoning.into(),
            duration_hint: None,
            priority: None,
        }
    }
}

/// A structured validation failure.
///
/// These are values, not errors: the agent returns to idle with the reason
/// recorded and memorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionFailure {
    /// Why it failed.
    pub reason: FailureReason,
    /// Human-readable detail.
    pub message: String,
}

impl ActionFailure {
    /// Create a failure.
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gather_parses_from_tagged_json() {
        let action: Action = serde_json::from_str(r#"{"type":"gather","resource":"wood"}"#).unwrap();
        assert_eq!(
            action,
            Action::Gather {
                resource: ResourceKind::Wood
            }
        );
        assert_eq!(action.kind(), ActionKind::Gather);
    }

    #[test]
    fn unit_variants_need_only_the_tag() {
        let action: Action = serde_json::from_str(r#"{"type":"rest"}"#).unwrap();
        assert_eq!(action, Action::Rest);
    }

    #[test]
    fn beast_target_accepts_species_or_id() {
        let by_kind: Action =
            serde_json::from_str(r#"{"type":"hunt","target":"rabbit"}"#).unwrap();
        assert_eq!(
            by_kind,
            Action::Hunt {
                target: Some(BeastTarget::Kind(BeastKind::Rabbit))
            }
        );

        let id = BeastId::new();
        let json = format!(r#"{{"type":"defend","target":"{id}"}}"#);
        let by_id: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(
            by_id,
            Action::Defend {
                target: Some(BeastTarget::Id(id))
            }
        );
    }

    #[test]
    fn agent_ref_falls_back_to_name() {
        let action: Action =
            serde_json::from_str(r#"{"type":"share","with":"Bob"}"#).unwrap();
        assert_eq!(
            action,
            Action::Share {
                with: AgentRef::Name(String::from("Bob")),
                item: None
            }
        );
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let parsed: Result<Action, _> = serde_json::from_str(r#"{"type":"dance"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn decision_defaults_optional_fields() {
        let decision: Decision =
            serde_json::from_str(r#"{"action":{"type":"explore"}}"#).unwrap();
        assert_eq!(decision.action, Action::Explore);
        assert!(decision.reasoning.is_empty());
        assert!(decision.duration_hint.is_none());
    }
}
