//! Ambient chats: passing words between idle neighbours.
//!
//! Unlike a talk action these need no provider and block nothing. At most
//! one chat happens per tick. The topic follows what the pair has on its
//! mind; both agents remember it and observers are notified.

use hearth_types::{AgentId, EventKind, Importance, MemoryKind, Notification, Skill};
use hearth_world::World;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::memory::remember;

/// Radius around the first agent checked for danger.
pub const DANGER_RADIUS: f64 = 20.0;
/// Hunger above which food comes up.
pub const HUNGRY: f64 = 60.0;

/// What a passing chat is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTopic {
    /// Someone is hungry.
    Food,
    /// Someone is carrying things.
    Resources,
    /// A dangerous beast is about.
    Danger,
    /// Working together.
    Cooperation,
    /// Places worth seeing.
    Exploration,
    /// Everyday matters.
    Daily,
}

impl ChatTopic {
    /// Memory line for `me` after chatting with `other`.
    pub fn memory(self, other: &str) -> String {
        match self {
            Self::Food => format!("Chatted with {other} about finding food"),
            Self::Resources => format!("Chatted with {other} about what we have been gathering"),
            Self::Danger => format!("Warned {other} about a dangerous beast nearby"),
            Self::Cooperation => format!("Chatted with {other} about working together"),
            Self::Exploration => format!("Chatted with {other} about places worth exploring"),
            Self::Daily => format!("Exchanged a few words with {other}"),
        }
    }
}

/// A chat that happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientChat {
    /// First speaker.
    pub first: AgentId,
    /// Second speaker.
    pub second: AgentId,
    /// Topic.
    pub topic: ChatTopic,
}

/// Maybe let one pair of idle neighbours chat.
pub fn ambient_chats(
    world: &mut World,
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<Option<AmbientChat>, AgentError> {
    let idle: Vec<AgentId> = world
        .agents
        .values()
        .filter(|a| a.is_idle() && !a.is_conversing())
        .map(|a| a.id)
        .collect();

    for (i, &first) in idle.iter().enumerate() {
        let position = world.agent(first)?.position;
        for &second in idle.iter().skip(i.saturating_add(1)) {
            if world.agent(second)?.position.distance_to(position) > config.social_radius {
                continue;
            }
            if !rng.random_bool(config.ambient_chat_chance.clamp(0.0, 1.0)) {
                continue;
            }
            let topic = pick_topic(world, first, second, rng)?;
            record(world, first, second, topic)?;
            return Ok(Some(AmbientChat { first, second, topic }));
        }
    }
    Ok(None)
}

/// Choose a topic from the pair's state.
pub fn pick_topic(world: &World, first: AgentId, second: AgentId, rng: &mut impl Rng) -> Result<ChatTopic, AgentError> {
    let a = world.agent(first)?;
    let b = world.agent(second)?;
    if !world.aggressive_beasts_near(a.position, DANGER_RADIUS).is_empty() {
        return Ok(ChatTopic::Danger);
    }
    if a.attributes.hunger > HUNGRY || b.attributes.hunger > HUNGRY {
        return Ok(ChatTopic::Food);
    }
    if !a.inventory.is_empty() || !b.inventory.is_empty() {
        return Ok(ChatTopic::Resources);
    }
    let casual = [ChatTopic::Cooperation, ChatTopic::Exploration, ChatTopic::Daily];
    Ok(casual.choose(rng).copied().unwrap_or(ChatTopic::Daily))
}

fn record(world: &mut World, first: AgentId, second: AgentId, topic: ChatTopic) -> Result<(), AgentError> {
    let first_name = world.agent(first)?.name.clone();
    let second_name = world.agent(second)?.name.clone();
    remember(world, first, MemoryKind::Social, topic.memory(&second_name), 4)?;
    remember(world, second, MemoryKind::Social, topic.memory(&first_name), 4)?;
    world.agent_mut(first)?.add_skill(Skill::Social, 1);
    world.agent_mut(second)?.add_skill(Skill::Social, 1);

    let importance = if topic == ChatTopic::Danger {
        Importance::Medium
    } else {
        Importance::Low
    };
    let description = format!("{first_name} and {second_name} had a quick chat");
    debug!(first = %first, second = %second, topic = ?topic, "Ambient chat");
    world.emit(
        EventKind::SocialInteraction,
        description.clone(),
        importance,
        vec![first, second],
    );
    world.notify(Notification::SocialInteraction {
        from: first,
        to: second,
        description,
    });
    Ok(())
}
