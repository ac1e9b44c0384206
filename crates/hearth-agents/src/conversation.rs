//! Conversation lifecycle.
//!
//! 1. [`prepare`] (from the talk action) picks partners within the social
//!    radius.
//! 2. The caller obtains a [`ConversationScript`] from a provider, using
//!    [`context`], and calls [`start`]. Every participant is flagged as
//!    conversing and makes no decisions until the end.
//! 3. Once [`due`], the caller asks a provider for per-participant memories
//!    via [`summary_context`] and calls [`finish`], which records them,
//!    clears the flags, and hands back any action the participants agreed
//!    on.

use hearth_types::{
    Action, ActionKind, ActionReport, ActiveAction, AgentId, AgentRef, Conversation, ConversationContext,
    ConversationId, ConversationMessage, ConversationParticipant, ConversationScript, EventKind, FailureReason,
    Importance, Lifecycle, MemoryKind, Notification, ParticipantMemory, ResolvedTarget, Skill,
    SummaryContext,
};
use hearth_world::World;
use rand::Rng;
use tracing::info;

use crate::actions::Prepared;
use crate::actions::share::resolve_agent;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::memory::{MemoryStore, remember};

/// Importance of a conversation memory.
pub const MEMORY_IMPORTANCE: u8 = 6;
/// Memories per participant handed to the content provider.
pub const CONTEXT_MEMORIES: usize = 5;
/// Radius around the initiator checked for aggressive beasts.
pub const DANGER_RADIUS: f64 = 20.0;

/// Pick a partner for `agent`.
///
/// Eligible partners are alive, not already conversing, and within the
/// social radius. A named partner is preferred when eligible; otherwise the
/// nearest eligible agent is chosen.
pub fn prepare(
    world: &World,
    agent: AgentId,
    with: Option<&AgentRef>,
    config: &AgentConfig,
) -> Result<Prepared, AgentError> {
    let position = world.agent(agent)?.position;
    let eligible: Vec<AgentId> = world
        .agents_near(position, config.social_radius, Some(agent))
        .into_iter()
        .map(|(id, _)| id)
        .filter(|id| world.agents.get(id).is_some_and(|a| !a.is_conversing()))
        .collect();

    let preferred = with
        .and_then(|r| resolve_agent(world, agent, r))
        .filter(|id| eligible.contains(id));
    match preferred.or_else(|| eligible.first().copied()) {
        Some(partner) => Ok(Prepared::Converse {
            partners: vec![partner],
        }),
        None => Ok(Prepared::reject(
            FailureReason::UnknownTarget,
            "There was no one nearby to talk to",
        )),
    }
}

/// What the content provider needs to write a conversation.
pub fn context(world: &World, initiator: AgentId, partners: &[AgentId]) -> Result<ConversationContext, AgentError> {
    let mut participants = Vec::with_capacity(partners.len().saturating_add(1));
    for &id in core::iter::once(&initiator).chain(partners) {
        let a = world.agent(id)?;
        participants.push(ConversationParticipant {
            id,
            name: a.name.clone(),
            attributes: a.attributes,
            personality: a.personality,
            inventory: a.inventory.clone(),
            has_equipment: !a.equipment.is_empty(),
            recent_memories: world.recent(id, CONTEXT_MEMORIES)?,
        });
    }
    let position = world.agent(initiator)?.position;
    Ok(ConversationContext {
        participants,
        calendar: world.calendar(),
        weather: world.weather.current(),
        aggressive_beast_nearby: !world.aggressive_beasts_near(position, DANGER_RADIUS).is_empty(),
    })
}

/// A random conversation length in `[conversation_min, conversation_max]`.
pub fn conversation_length(config: &AgentConfig, rng: &mut impl Rng) -> f64 {
    if config.conversation_max > config.conversation_min {
        rng.random_range(config.conversation_min..=config.conversation_max)
    } else {
        config.conversation_min.max(0.0)
    }
}

/// Open a conversation from `initiator` with `partners`.
pub fn start(
    world: &mut World,
    initiator: AgentId,
    partners: &[AgentId],
    script: ConversationScript,
    duration: f64,
) -> Result<ConversationId, AgentError> {
    let participants: Vec<AgentId> = core::iter::once(initiator).chain(partners.iter().copied()).collect();
    if participants.len() < 2 {
        return Err(AgentError::TooFewParticipants {
            count: participants.len(),
        });
    }
    for &id in &participants {
        let a = world.agent(id)?;
        if !a.alive {
            return Err(AgentError::AgentDead(id));
        }
        if let Some(conversation) = a.conversation {
            return Err(AgentError::AlreadyConversing {
                agent: id,
                conversation,
            });
        }
    }

    let now = world.now();
    let messages: Vec<ConversationMessage> = script
        .messages
        .into_iter()
        .filter_map(|line| {
            let name = world.agents.get(&line.speaker)?.name.clone();
            Some(ConversationMessage {
                speaker: line.speaker,
                speaker_name: name,
                content: line.content,
                at: now,
            })
        })
        .collect();
    let conversation = Conversation {
        id: ConversationId::new(),
        initiator,
        participants: participants.clone(),
        messages: messages.clone(),
        kind: script.kind,
        topic: script.topic.clone(),
        position: world.agent(initiator)?.position,
        started_at: now,
        ends_at: now + duration,
        ended_at: None,
        triggers_action: script.triggers_action,
        planned_action: script.planned_action,
    };
    let id = conversation.id;
    world.conversations.insert(id, conversation);

    for &p in &participants {
        world.agent_mut(p)?.conversation = Some(id);
    }
    let first_partner = partners.first().copied();
    {
        let a = world.agent_mut(initiator)?;
        a.current = Some(ActiveAction {
            action: Action::Talk {
                with: first_partner.map(AgentRef::Id),
            },
            target: first_partner.map(ResolvedTarget::Agent),
            reasoning: String::new(),
            started_at: now,
            ends_at: None,
        });
        a.status.lifecycle = Lifecycle::Executing;
        a.cooldown_until = None;
    }

    let names = names_of(world, &participants);
    info!(conversation = %id, participants = %names.join(", "), topic = %script.topic, "Conversation started");
    world.emit(
        EventKind::ConversationStart,
        format!("{} started talking about {}", names.join(" and "), script.topic),
        Importance::Medium,
        participants.clone(),
    );
    world.notify(Notification::ConversationStart {
        conversation_id: id,
        participants,
        kind: script.kind,
        topic: script.topic,
        messages,
    });
    Ok(id)
}

/// Active conversations whose time is up.
pub fn due(world: &World) -> Vec<ConversationId> {
    let now = world.now();
    world
        .conversations
        .values()
        .filter(|c| c.ended_at.is_none() && now >= c.ends_at)
        .map(|c| c.id)
        .collect()
}

/// What the summary provider needs.
pub fn summary_context(world: &World, conversation: ConversationId) -> Option<SummaryContext> {
    let c = world.conversations.get(&conversation)?;
    Some(SummaryContext {
        conversation_id: c.id,
        participants: c
            .participants
            .iter()
            .filter_map(|id| world.agents.get(id).map(|a| (a.id, a.name.clone())))
            .collect(),
        kind: c.kind,
        topic: c.topic.clone(),
        transcript: c
            .messages
            .iter()
            .map(|m| format!("{}: {}", m.speaker_name, m.content))
            .collect(),
    })
}

/// The memory a participant keeps when no summary was produced.
pub fn fallback_memory(partners: &[String], topic: &str) -> String {
    format!("Talked with {} about {topic}", partners.join(" and "))
}

/// What remains to do after a conversation ended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ending {
    /// Action to dispatch, if the conversation triggered one.
    pub planned_action: Option<Action>,
    /// Living participants that are idle now.
    pub idle_participants: Vec<AgentId>,
}

/// Close `conversation`, recording one memory per living participant.
///
/// `memories` overrides the templated memory for the agents it names.
/// Returns `None` if the conversation does not exist.
pub fn finish(
    world: &mut World,
    conversation: ConversationId,
    memories: &[ParticipantMemory],
) -> Result<Option<Ending>, AgentError> {
    let Some(c) = world.conversations.remove(&conversation) else {
        return Ok(None);
    };
    let now = world.now();

    for &p in &c.participants {
        let Some(a) = world.agents.get(&p) else {
            continue;
        };
        if !a.alive {
            continue;
        }
        let partners: Vec<String> = c
            .participants
            .iter()
            .filter(|&&other| other != p)
            .filter_map(|other| world.agents.get(other).map(|o| o.name.clone()))
            .collect();
        let memory = memories
            .iter()
            .find(|m| m.agent_id == p)
            .map_or_else(|| fallback_memory(&partners, &c.topic), |m| m.memory.clone());
        remember(world, p, MemoryKind::Conversation, memory, MEMORY_IMPORTANCE)?;

        let a = world.agent_mut(p)?;
        a.add_skill(Skill::Social, 1);
        if a.conversation == Some(conversation) {
            a.conversation = None;
        }
        if p == c.initiator && a.current_kind() == Some(ActionKind::Talk) {
            a.current = None;
            a.status.lifecycle = Lifecycle::Idle;
            a.last_result = Some(ActionReport {
                action: Some(ActionKind::Talk),
                success: true,
                reason: None,
                message: format!("Talked with {} about {}", partners.join(" and "), c.topic),
                at: now,
            });
        }
    }

    let names = names_of(world, &c.participants);
    info!(conversation = %conversation, topic = %c.topic, "Conversation ended");
    world.emit(
        EventKind::ConversationEnd,
        format!("{} finished talking about {}", names.join(" and "), c.topic),
        Importance::Low,
        c.participants.clone(),
    );
    world.notify(Notification::ConversationEnd {
        conversation_id: conversation,
        participants: c.participants.clone(),
        topic: c.topic.clone(),
    });

    let idle_participants = c
        .participants
        .iter()
        .copied()
        .filter(|id| world.agents.get(id).is_some_and(|a| a.alive && a.is_idle()))
        .collect();
    Ok(Some(Ending {
        planned_action: c.triggers_action.then_some(c.planned_action).flatten(),
        idle_participants,
    }))
}

fn names_of(world: &World, ids: &[AgentId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| world.agents.get(id).map(|a| a.name.clone()))
        .collect()
}
