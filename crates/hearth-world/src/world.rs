//! The single owned world aggregate.
//!
//! [`World`] holds every agent, beast, node, building and conversation,
//! the bounded event log, the weather, and the calendar view of the clock.
//! Per-tick subsystems borrow it mutably one at a time; none of them keeps
//! a private copy.
//!
//! Notifications raised while a tick runs are buffered here and drained by
//! the orchestrator at tick end.

use std::collections::{BTreeMap, VecDeque};

use chrono::Utc;
use hearth_types::{
    Agent, AgentId, Beast, BeastId, Building, BuildingId, CalendarView, Conversation,
    ConversationId, EventId, EventKind, Importance, Notification, NodeId, Position, ResourceKind,
    ResourceNode, Season, Weather, WorldEvent, WorldSnapshot, WorldUpdate,
};
use tracing::{debug, info};

use crate::error::WorldError;
use crate::weather::WeatherSystem;

/// Number of events the world keeps.
pub const EVENT_LOG_CAPACITY: usize = 100;
/// Number of events carried by a per-tick update.
pub const UPDATE_EVENT_COUNT: usize = 10;

/// The whole simulated world.
#[derive(Debug, Clone)]
pub struct World {
    /// Every agent, living and dead.
    pub agents: BTreeMap<AgentId, Agent>,
    /// Living beasts. Killed beasts are removed.
    pub beasts: BTreeMap<BeastId, Beast>,
    /// Resource nodes.
    pub nodes: BTreeMap<NodeId, ResourceNode>,
    /// Sites and finished buildings.
    pub buildings: BTreeMap<BuildingId, Building>,
    /// Active conversations.
    pub conversations: BTreeMap<ConversationId, Conversation>,
    /// Weather state.
    pub weather: WeatherSystem,
    /// Bounded event log, oldest first.
    events: VecDeque<WorldEvent>,
    /// Notifications raised since the last drain.
    notifications: Vec<Notification>,
    /// Calendar view of the clock, refreshed every tick.
    calendar: CalendarView,
    /// Ticks completed.
    tick: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// An empty world at sim-time 0, day 1 08:00, clear weather.
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            beasts: BTreeMap::new(),
            nodes: BTreeMap::new(),
            buildings: BTreeMap::new(),
            conversations: BTreeMap::new(),
            weather: WeatherSystem::new(Weather::Clear),
            events: VecDeque::new(),
            notifications: Vec::new(),
            calendar: CalendarView {
                day: 1,
                hour: 8,
                minute: 0,
                season: Season::Spring,
                is_night: false,
                sim_time: 0.0,
            },
            tick: 0,
        }
    }

    // -------------------------------------------------------------------
    // Time
    // -------------------------------------------------------------------

    /// Current sim-time in seconds.
    pub const fn now(&self) -> f64 {
        self.calendar.sim_time
    }

    /// Current calendar view.
    pub const fn calendar(&self) -> CalendarView {
        self.calendar
    }

    /// Ticks completed.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Publish a new clock reading for tick `tick`.
    pub const fn set_time(&mut self, calendar: CalendarView, tick: u64) {
        self.calendar = calendar;
        self.tick = tick;
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Insert an agent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Duplicate`] if the id is taken.
    pub fn add_agent(&mut self, agent: Agent) -> Result<AgentId, WorldError> {
        let id = agent.id;
        if self.agents.contains_key(&id) {
            return Err(WorldError::Duplicate(id.into_inner()));
        }
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Insert a beast.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Duplicate`] if the id is taken.
    pub fn add_beast(&mut self, beast: Beast) -> Result<BeastId, WorldError> {
        let id = beast.id;
        if self.beasts.contains_key(&id) {
            return Err(WorldError::Duplicate(id.into_inner()));
        }
        self.beasts.insert(id, beast);
        Ok(id)
    }

    /// Insert a resource node.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Duplicate`] if the id is taken.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<NodeId, WorldError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(WorldError::Duplicate(id.into_inner()));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Look up an agent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] for unknown ids.
    pub fn agent(&self, id: AgentId) -> Result<&Agent, WorldError> {
        self.agents.get(&id).ok_or(WorldError::AgentNotFound(id))
    }

    /// Look up an agent mutably.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] for unknown ids.
    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent, WorldError> {
        self.agents.get_mut(&id).ok_or(WorldError::AgentNotFound(id))
    }

    /// Ids of living agents in id order.
    pub fn living_agent_ids(&self) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|a| a.alive)
            .map(|a| a.id)
            .collect()
    }

    /// A living agent whose name matches `name` case-insensitively.
    pub fn agent_by_name(&self, name: &str) -> Option<AgentId> {
        self.agents
            .values()
            .find(|a| a.alive && a.name.eq_ignore_ascii_case(name.trim()))
            .map(|a| a.id)
    }

    /// Living agents within `radius` of `position`, nearest first,
    /// excluding `exclude`.
    pub fn agents_near(&self, position: Position, radius: f64, exclude: Option<AgentId>) -> Vec<(AgentId, f64)> {
        let mut found: Vec<(AgentId, f64)> = self
            .agents
            .values()
            .filter(|a| a.alive && Some(a.id) != exclude)
            .map(|a| (a.id, a.position.distance_to(position)))
            .filter(|&(_, d)| d <= radius)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found
    }

    /// Aggressive beasts within `radius` of `position`, nearest first.
    pub fn aggressive_beasts_near(&self, position: Position, radius: f64) -> Vec<(BeastId, f64)> {
        let mut found: Vec<(BeastId, f64)> = self
            .beasts
            .values()
            .filter(|b| b.is_aggressive())
            .map(|b| (b.id, b.position.distance_to(position)))
            .filter(|&(_, d)| d <= radius)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found
    }

    // -------------------------------------------------------------------
    // Resources
    // -------------------------------------------------------------------

    /// Nearest non-depleted `kind` node that is free or already held by
    /// `agent`.
    pub fn nearest_available_node(&self, kind: ResourceKind, from: Position, agent: AgentId) -> Option<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.kind == kind && n.available_to(agent))
            .map(|n| (n.id, n.position.distance_to(from)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Claim `node` for `agent`. Fails if another agent holds it.
    pub fn occupy(&mut self, node: NodeId, agent: AgentId) -> bool {
        let Some(n) = self.nodes.get_mut(&node) else {
            return false;
        };
        match n.occupied_by {
            Some(holder) if holder != agent => false,
            _ => {
                n.occupied_by = Some(agent);
                true
            }
        }
    }

    /// Release every node held by `agent`.
    pub fn release_occupancy(&mut self, agent: AgentId) {
        for node in self.nodes.values_mut() {
            if node.occupied_by == Some(agent) {
                node.occupied_by = None;
            }
        }
    }

    // -------------------------------------------------------------------
    // Events and notifications
    // -------------------------------------------------------------------

    /// Append an event to the bounded log.
    pub fn emit(
        &mut self,
        kind: EventKind,
        description: impl Into<String>,
        importance: Importance,
        agents: Vec<AgentId>,
    ) -> EventId {
        let event = WorldEvent {
            id: EventId::new(),
            kind,
            description: description.into(),
            importance,
            agents,
            at: self.now(),
            created_at: Utc::now(),
        };
        let id = event.id;
        if importance >= Importance::High {
            info!(kind = ?event.kind, description = %event.description, "World event");
        } else {
            debug!(kind = ?event.kind, description = %event.description, "World event");
        }
        self.events.push_back(event);
        while self.events.len() > EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        id
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter()
    }

    /// The `n` newest events, oldest first.
    pub fn recent_events(&self, n: usize) -> Vec<WorldEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Queue an out-of-band notification.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Take every queued notification.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // -------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------

    /// Full snapshot of the world.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            calendar: self.calendar,
            weather: self.weather.current(),
            agents: self.agents.values().cloned().collect(),
            beasts: self.beasts.values().cloned().collect(),
            buildings: self.buildings.values().cloned().collect(),
            resources: self.nodes.values().cloned().collect(),
            conversations: self.conversations.values().cloned().collect(),
            events: self.events.iter().cloned().collect(),
        }
    }

    /// Per-tick update carrying the ten newest events.
    pub fn update(&self) -> WorldUpdate {
        WorldUpdate {
            tick: self.tick,
            calendar: self.calendar,
            weather: self.weather.current(),
            agents: self.agents.values().cloned().collect(),
            beasts: self.beasts.values().cloned().collect(),
            buildings: self.buildings.values().cloned().collect(),
            resources: self.nodes.values().cloned().collect(),
            events: self.recent_events(UPDATE_EVENT_COUNT),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_types::{Archetype, Personality};

    use super::*;

    fn agent(name: &str) -> Agent {
        Agent::new(
            name,
            Position::new(50.0, 50.0),
            Personality {
                archetype: Archetype::Social,
                bravery: 40,
                sociability: 80,
                cautiousness: 40,
                curiosity: 50,
                cooperation: 70,
                ambition: 40,
            },
        )
    }

    #[test]
    fn event_log_is_bounded() {
        let mut world = World::new();
        for i in 0..150 {
            let _ = world.emit(EventKind::WeatherChange, format!("event {i}"), Importance::Low, Vec::new());
        }
        assert_eq!(world.events().count(), EVENT_LOG_CAPACITY);
        assert_eq!(world.events().next().unwrap().description, "event 50");
        assert_eq!(world.update().events.len(), UPDATE_EVENT_COUNT);
    }

    #[test]
    fn duplicate_agents_are_rejected() {
        let mut world = World::new();
        let a = agent("Alice");
        let copy = a.clone();
        assert!(world.add_agent(a).is_ok());
        assert!(world.add_agent(copy).is_err());
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let mut world = World::new();
        let id = world.add_agent(agent("Charlie")).unwrap();
        assert_eq!(world.agent_by_name("charlie"), Some(id));
        assert_eq!(world.agent_by_name("Dave"), None);
    }

    #[test]
    fn occupancy_is_single_owner() {
        let mut world = World::new();
        let node = world
            .add_node(ResourceNode::new(ResourceKind::Wood, Position::new(1.0, 1.0), 50))
            .unwrap();
        let a = AgentId::new();
        let b = AgentId::new();
        assert!(world.occupy(node, a));
        assert!(!world.occupy(node, b));
        assert!(world.occupy(node, a));
        world.release_occupancy(a);
        assert!(world.occupy(node, b));
    }

    #[test]
    fn held_node_is_invisible_to_others() {
        let mut world = World::new();
        let node = world
            .add_node(ResourceNode::new(ResourceKind::Berry, Position::new(1.0, 1.0), 20))
            .unwrap();
        let a = AgentId::new();
        assert!(world.occupy(node, a));
        let from = Position::new(0.0, 0.0);
        assert_eq!(world.nearest_available_node(ResourceKind::Berry, from, a), Some(node));
        assert_eq!(world.nearest_available_node(ResourceKind::Berry, from, AgentId::new()), None);
    }

    #[test]
    fn notifications_drain_once() {
        let mut world = World::new();
        world.notify(Notification::SocialInteraction {
            from: AgentId::new(),
            to: AgentId::new(),
            description: String::from("Alice gave 3 berry to Bob"),
        });
        assert_eq!(world.drain_notifications().len(), 1);
        assert!(world.drain_notifications().is_empty());
    }
}
