//! Enumeration types for the Hearth world simulation.
//!
//! Every enum serializes in `snake_case` so the observer and the decision
//! provider see the same vocabulary (`"wooden_hut"`, `"raw_meat"`,
//! `"plan_discussion"`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Agent status
// ---------------------------------------------------------------------------

/// Where an agent is in its action lifecycle.
///
/// `idle -> executing -> cooling -> idle`, and any state may move to the
/// terminal `Dead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Waiting for the next decision.
    Idle,
    /// Carrying out an action until its end time (or, for build, completion).
    Executing,
    /// Short jittered pause after an action before returning to idle.
    Cooling,
    /// Terminal. The agent stays in the world but never acts again.
    Dead,
}

/// Whether an agent is currently travelling toward a move target.
///
/// Independent of [`Lifecycle`]: an executing agent can be en route to the
/// node it is about to gather from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Locomotion {
    /// Not moving.
    Stationary,
    /// Converging on a move target.
    Enroute,
}

/// Personality archetype assigned at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Fearless, seeks fights and adventure.
    Brave,
    /// Avoids risk, values safety.
    Cautious,
    /// Seeks company, strong team player.
    Social,
    /// Driven by curiosity about the unknown.
    Explorer,
    /// Focused on survival and building.
    Pragmatic,
    /// Self-reliant, prefers to act alone.
    Independent,
}

impl Archetype {
    /// All archetypes in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Brave,
        Self::Cautious,
        Self::Social,
        Self::Explorer,
        Self::Pragmatic,
        Self::Independent,
    ];
}

/// Agent skills. Levels run from 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// General gathering speed.
    Gathering,
    /// Felling trees.
    Woodcutting,
    /// Breaking stone.
    Mining,
    /// Picking berries and drawing water.
    Foraging,
    /// Fighting beasts.
    Combat,
    /// Working on building sites.
    Construction,
    /// Making tools and weapons.
    Crafting,
    /// Talking and sharing.
    Social,
    /// Cooking and general survival know-how.
    Survival,
}

impl Skill {
    /// Wire name of the skill.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gathering => "gathering",
            Self::Woodcutting => "woodcutting",
            Self::Mining => "mining",
            Self::Foraging => "foraging",
            Self::Combat => "combat",
            Self::Construction => "construction",
            Self::Crafting => "crafting",
            Self::Social => "social",
            Self::Survival => "survival",
        }
    }
}

// ---------------------------------------------------------------------------
// Items and resources
// ---------------------------------------------------------------------------

/// The four kinds of harvestable resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Trees.
    Wood,
    /// Rock outcrops.
    Stone,
    /// Berry bushes.
    Berry,
    /// Springs and ponds.
    Water,
}

impl ResourceKind {
    /// All resource kinds.
    pub const ALL: [Self; 4] = [Self::Wood, Self::Stone, Self::Berry, Self::Water];

    /// The inventory item a node of this kind yields.
    pub const fn item(self) -> Item {
        match self {
            Self::Wood => Item::Wood,
            Self::Stone => Item::Stone,
            Self::Berry => Item::Berry,
            Self::Water => Item::Water,
        }
    }

    /// Wire name of the resource.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Berry => "berry",
            Self::Water => "water",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stackable inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Item {
    /// Logs.
    Wood,
    /// Stones. Carrying at least one counts as being armed.
    Stone,
    /// Berries (food).
    Berry,
    /// Water (drink).
    Water,
    /// Meat looted from beasts.
    RawMeat,
    /// Meat cooked at a campfire.
    CookedMeat,
}

impl Item {
    /// Wire name of the item.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Berry => "berry",
            Self::Water => "water",
            Self::RawMeat => "raw_meat",
            Self::CookedMeat => "cooked_meat",
        }
    }
}

impl core::fmt::Display for Item {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Craftable equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// +50% wood yield.
    StoneAxe,
    /// +50% stone yield.
    StonePickaxe,
    /// Melee weapon with extended reach.
    Spear,
    /// +30% berry yield.
    Basket,
    /// +20% water yield.
    WaterContainer,
}

impl Tool {
    /// Wire name of the tool.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoneAxe => "stone_axe",
            Self::StonePickaxe => "stone_pickaxe",
            Self::Spear => "spear",
            Self::Basket => "basket",
            Self::WaterContainer => "water_container",
        }
    }
}

impl core::fmt::Display for Tool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// Building types agents can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Warmth and cooking.
    Campfire,
    /// Basic shelter.
    LeanTo,
    /// Large shelter, built faster with helpers.
    WoodenHut,
    /// Shared storage.
    StorageShed,
    /// Crafting workshop, built faster with helpers.
    Workshop,
}

impl BuildingKind {
    /// Wire name of the building type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Campfire => "campfire",
            Self::LeanTo => "lean_to",
            Self::WoodenHut => "wooden_hut",
            Self::StorageShed => "storage_shed",
            Self::Workshop => "workshop",
        }
    }
}

impl core::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Beasts
// ---------------------------------------------------------------------------

/// Beast species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BeastKind {
    /// Pack hunter.
    Wolf,
    /// Solitary, heavy hitter.
    Bear,
    /// Harmless prey.
    Rabbit,
    /// Skittish prey.
    Deer,
}

impl BeastKind {
    /// Wire name of the species.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wolf => "wolf",
            Self::Bear => "bear",
            Self::Rabbit => "rabbit",
            Self::Deer => "deer",
        }
    }
}

impl core::fmt::Display for BeastKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Beast behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BeastState {
    /// Standing still.
    Idle,
    /// Random short hops.
    Wandering,
    /// Closing on a target agent.
    Chasing,
    /// Running away from agents.
    Fleeing,
    /// In-range strike pulse (only ever observed inside a chase).
    Attacking,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Weather conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Clear skies.
    Clear,
    /// Overcast.
    Cloudy,
    /// Rain, slows unsheltered recovery.
    Rain,
    /// Storm, badly slows unsheltered recovery.
    Storm,
}

impl Weather {
    /// Wire name of the weather.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Storm => "storm",
        }
    }
}

/// Calendar season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// Spring.
    Spring,
    /// Summer.
    Summer,
    /// Autumn.
    Autumn,
    /// Winter.
    Winter,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The fixed action vocabulary, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Walk to a point.
    Move,
    /// Harvest a resource node.
    Gather,
    /// Attack a beast.
    Hunt,
    /// Make a tool or weapon.
    Craft,
    /// Start or join a building site.
    Build,
    /// Consume food or water.
    Eat,
    /// Recover stamina and health.
    Rest,
    /// Start a conversation.
    Talk,
    /// Wander to a nearby random point.
    Explore,
    /// Escape from beasts.
    Flee,
    /// Fight back against a beast.
    Defend,
    /// Give items to a nearby agent.
    Share,
    /// Turn raw meat into cooked meat at a campfire.
    Cook,
}

impl ActionKind {
    /// Wire name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Gather => "gather",
            Self::Hunt => "hunt",
            Self::Craft => "craft",
            Self::Build => "build",
            Self::Eat => "eat",
            Self::Rest => "rest",
            Self::Talk => "talk",
            Self::Explore => "explore",
            Self::Flee => "flee",
            Self::Defend => "defend",
            Self::Share => "share",
            Self::Cook => "cook",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an action could not be dispatched or completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The named target (agent, beast, recipe, node type) does not resolve.
    UnknownTarget,
    /// The agent lacks the items the action consumes.
    InsufficientMaterials,
    /// The target is farther than the action's range.
    OutOfRange,
    /// A building of this type is not allowed here.
    SiteUnavailable,
    /// The agent's skill is below the requirement.
    SkillTooLow,
    /// The target disappeared or depleted between dispatch and completion.
    TargetVanished,
}

// ---------------------------------------------------------------------------
// Conversations, memories, events
// ---------------------------------------------------------------------------

/// Conversation category chosen by the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    /// Saying hello. Never triggers an action.
    Greeting,
    /// Idle chatter. Never triggers an action.
    SmallTalk,
    /// Trading information.
    InfoExchange,
    /// Agreeing on a plan.
    PlanDiscussion,
    /// Warning about danger.
    Warning,
    /// Arranging to share resources.
    ResourceShare,
    /// Asking for help.
    Cooperation,
}

/// Category of a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// Something the agent did.
    Action,
    /// An action that failed.
    Failure,
    /// Something the agent saw.
    Observation,
    /// A conversation the agent took part in.
    Conversation,
    /// Gifts and other social exchanges.
    Social,
    /// Attacks and other threats.
    Danger,
    /// Witnessing a death.
    Death,
    /// Injected by an operator.
    Operator,
}

/// Importance of a world event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Routine.
    Low,
    /// Noteworthy.
    Medium,
    /// Significant.
    High,
    /// Life and death.
    Critical,
}

/// Category of a world event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The weather changed.
    WeatherChange,
    /// An agent died.
    NpcDeath,
    /// A resource node ran out.
    ResourceDepleted,
    /// A depleted node grew back.
    ResourceRegenerated,
    /// A building site was founded.
    BuildStart,
    /// A building was finished.
    BuildComplete,
    /// A tool or weapon was crafted.
    ItemCrafted,
    /// A beast was killed.
    BeastKilled,
    /// A beast attacked an agent.
    BeastAttack,
    /// A conversation started.
    ConversationStart,
    /// A conversation ended.
    ConversationEnd,
    /// One agent gave items to another.
    SocialInteraction,
    /// An operator changed agent memories.
    OperatorCommand,
}
