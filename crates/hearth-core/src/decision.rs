//! Decision provider contract, the rule-based provider, and the
//! deterministic fallbacks.
//!
//! The tick loop asks a [`DecisionProvider`] for three things: an action
//! for an agent due to decide, the content of a conversation that is
//! starting, and a first-person memory per participant of one that ended.
//! Every call is bounded by [`with_timeout`]. Whatever goes wrong (an
//! error, a timeout, an unusable reply) the orchestrator substitutes the
//! matching fallback from this module, so no tick ever waits on or fails
//! because of a provider.
//!
//! [`RuleBasedProvider`] answers with those same fallbacks directly and is
//! used when no LLM backend is configured.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use hearth_agents::conversation::fallback_memory;
use hearth_types::{
    Action, AgentId, ConversationContext, ConversationKind, ConversationScript, Decision,
    DecisionContext, Item, ParticipantMemory, ResourceKind, ScriptLine, SummaryContext,
};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Health below which the fallback rests.
const CRITICAL_HEALTH: f64 = 30.0;
/// Hunger above which the fallback looks for food.
const VERY_HUNGRY: f64 = 80.0;
/// Stamina below which the fallback rests.
const TIRED: f64 = 20.0;
/// Average hunger above which a fallback conversation is about food.
const HUNGRY_GROUP: f64 = 70.0;
/// Most lines a conversation script may carry.
pub const MAX_SCRIPT_LINES: usize = 6;
/// Fewest lines a conversation script may carry.
pub const MIN_SCRIPT_LINES: usize = 2;

/// Food the fallback eats, best first.
const FOOD_PREFERENCE: [Item; 3] = [Item::CookedMeat, Item::Berry, Item::RawMeat];

/// Casual topics for a fallback conversation with nothing pressing.
const SMALL_TALK: [&str; 4] = [
    "the weather",
    "how the day is going",
    "the land around here",
    "plans for tomorrow",
];

/// Errors that can occur when asking a provider.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// The provider did not answer within the deadline.
    #[error("provider timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        timeout_ms: u64,
    },

    /// The provider could not be reached or answered with an error status.
    #[error("provider transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The provider answered, but the reply could not be used.
    #[error("malformed provider reply: {message}")]
    Malformed {
        /// What was wrong with the reply.
        message: String,
    },

    /// An internal error in the provider.
    #[error("decision provider error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// A source of agent decisions and conversation content.
///
/// Implementations may fail freely; callers wrap every call in
/// [`with_timeout`] and fall back on error.
pub trait DecisionProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Choose one action for the agent described by `context`.
    fn decide(&self, context: &DecisionContext) -> impl Future<Output = Result<Decision, DecisionError>> + Send;

    /// Write the content of a conversation that is starting.
    fn converse(
        &self,
        context: &ConversationContext,
    ) -> impl Future<Output = Result<ConversationScript, DecisionError>> + Send;

    /// Summarize a finished conversation into one memory per participant.
    fn summarize(
        &self,
        context: &SummaryContext,
    ) -> impl Future<Output = Result<Vec<ParticipantMemory>, DecisionError>> + Send;
}

/// Await `future` for at most `timeout`.
///
/// # Errors
///
/// Returns [`DecisionError::Timeout`] when the deadline passes, or the
/// future's own error.
pub async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T, DecisionError>
where
    F: Future<Output = Result<T, DecisionError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_elapsed) => Err(DecisionError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// The deterministic survival policy.
///
/// In order: critical health rests; severe hunger eats held food, or
/// gathers visible berries; low stamina rests; visible wood is gathered;
/// otherwise the agent explores.
pub fn fallback_decision(context: &DecisionContext) -> Decision {
    let attrs = &context.attributes;
    if attrs.health < CRITICAL_HEALTH {
        return Decision::new(Action::Rest, "Health is critical, resting to recover");
    }
    if attrs.hunger > VERY_HUNGRY {
        if let Some(food) = FOOD_PREFERENCE.into_iter().find(|&f| context.item_count(f) > 0) {
            return Decision::new(Action::Eat { food }, format!("Very hungry, eating {food}"));
        }
        if context.nearest_resource(ResourceKind::Berry).is_some() {
            return Decision::new(
                Action::Gather {
                    resource: ResourceKind::Berry,
                },
                "Very hungry, looking for berries",
            );
        }
    }
    if attrs.stamina < TIRED {
        return Decision::new(Action::Rest, "Too tired to keep going");
    }
    if context.nearest_resource(ResourceKind::Wood).is_some() {
        return Decision::new(
            Action::Gather {
                resource: ResourceKind::Wood,
            },
            "Collecting wood",
        );
    }
    Decision::new(Action::Explore, "Looking around")
}

/// A templated conversation whose topic follows the group's situation.
pub fn fallback_script(context: &ConversationContext, rng: &mut impl Rng) -> ConversationScript {
    let participants = &context.participants;
    let count = participants.len().max(1);
    let total_hunger: f64 = participants.iter().map(|p| p.attributes.hunger).sum();
    let average_hunger = total_hunger / f64::from(u32::try_from(count).unwrap_or(u32::MAX));

    let (kind, topic) = if average_hunger > HUNGRY_GROUP {
        (ConversationKind::ResourceShare, "food shortage".to_owned())
    } else if context.aggressive_beast_nearby {
        (ConversationKind::Warning, "danger nearby".to_owned())
    } else if participants.iter().any(|p| p.has_equipment) {
        (ConversationKind::InfoExchange, "tools".to_owned())
    } else if participants.iter().any(|p| !p.inventory.is_empty()) {
        (ConversationKind::InfoExchange, "resources".to_owned())
    } else {
        let casual = SMALL_TALK.choose(rng).copied().unwrap_or("the weather");
        (ConversationKind::SmallTalk, casual.to_owned())
    };

    let mut messages = Vec::new();
    if let (Some(first), Some(second)) = (participants.first(), participants.get(1)) {
        messages.push(ScriptLine {
            speaker: first.id,
            content: format!("Hello {}! Can we talk about {topic}?", second.name),
        });
        messages.push(ScriptLine {
            speaker: second.id,
            content: format!("Hi {}, sure, let's talk about {topic}.", first.name),
        });
    }
    ConversationScript {
        kind,
        topic,
        messages,
        triggers_action: false,
        planned_action: None,
    }
}

/// The templated memory for every participant.
pub fn fallback_summary(context: &SummaryContext) -> Vec<ParticipantMemory> {
    context
        .participants
        .iter()
        .map(|(id, _)| {
            let partners: Vec<String> = context
                .participants
                .iter()
                .filter(|(other, _)| other != id)
                .map(|(_, name)| name.clone())
                .collect();
            ParticipantMemory {
                agent_id: *id,
                memory: fallback_memory(&partners, &context.topic),
            }
        })
        .collect()
}

/// Make a provider's script safe to start.
///
/// Lines by non-participants are dropped and the script is capped at
/// [`MAX_SCRIPT_LINES`]. Greetings and small talk never trigger an action,
/// nor does a script without a planned action.
///
/// # Errors
///
/// Returns [`DecisionError::Malformed`] if fewer than
/// [`MIN_SCRIPT_LINES`] usable lines remain.
pub fn sanitize_script(
    mut script: ConversationScript,
    participants: &[AgentId],
) -> Result<ConversationScript, DecisionError> {
    script.messages.retain(|line| participants.contains(&line.speaker));
    script.messages.truncate(MAX_SCRIPT_LINES);
    if script.messages.len() < MIN_SCRIPT_LINES {
        return Err(DecisionError::Malformed {
            message: format!(
                "conversation needs at least {MIN_SCRIPT_LINES} lines from participants, got {}",
                script.messages.len()
            ),
        });
    }
    let casual = matches!(script.kind, ConversationKind::Greeting | ConversationKind::SmallTalk);
    if casual || script.planned_action.is_none() {
        script.triggers_action = false;
    }
    Ok(script)
}

// ---------------------------------------------------------------------------
// Rule-based provider
// ---------------------------------------------------------------------------

/// A provider that always answers with the fallbacks.
#[derive(Debug)]
pub struct RuleBasedProvider {
    /// Randomness for casual conversation topics.
    rng: Mutex<SmallRng>,
}

impl RuleBasedProvider {
    /// Create a provider with a seeded random source.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl DecisionProvider for RuleBasedProvider {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn decide(&self, context: &DecisionContext) -> Result<Decision, DecisionError> {
        Ok(fallback_decision(context))
    }

    async fn converse(&self, context: &ConversationContext) -> Result<ConversationScript, DecisionError> {
        let script = {
            let mut rng = self.rng.lock().map_err(|e| DecisionError::Internal {
                message: format!("random source poisoned: {e}"),
            })?;
            fallback_script(context, &mut *rng)
        };
        Ok(script)
    }

    async fn summarize(&self, context: &SummaryContext) -> Result<Vec<ParticipantMemory>, DecisionError> {
        Ok(fallback_summary(context))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use hearth_types::{
        Archetype, Attributes, CalendarView, ConversationId, ConversationParticipant, NearbyResource,
        NodeId, Personality, Position, Season, Weather,
    };

    use super::*;

    pub(crate) fn personality() -> Personality {
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

    fn calendar() -> CalendarView {
        CalendarView {
            day: 1,
            hour: 8,
            minute: 0,
            season: Season::Spring,
            is_night: false,
            sim_time: 0.0,
        }
    }

    fn context(health: f64, hunger: f64, stamina: f64) -> DecisionContext {
        DecisionContext {
            agent_id: AgentId::new(),
            name: "Alice".to_owned(),
            position: Position::new(50.0, 50.0),
            attributes: Attributes {
                health,
                hunger,
                stamina,
            },
            skills: BTreeMap::new(),
            inventory: BTreeMap::new(),
            equipment: BTreeMap::new(),
            personality: personality(),
            calendar: calendar(),
            weather: Weather::Clear,
            nearby_resources: Vec::new(),
            nearby_agents: Vec::new(),
            nearby_buildings: Vec::new(),
            nearby_beasts: Vec::new(),
            last_result: None,
            recent_memories: Vec::new(),
            critical_memories: Vec::new(),
        }
    }

    fn resource(kind: ResourceKind, distance: f64) -> NearbyResource {
        NearbyResource {
            id: NodeId::new(),
            kind,
            position: Position::new(50.0 + distance, 50.0),
            distance,
            quantity: 10,
            occupied: false,
        }
    }

    fn participant(name: &str, hunger: f64) -> ConversationParticipant {
        ConversationParticipant {
            id: AgentId::new(),
            name: name.to_owned(),
            attributes: Attributes {
                health: 100.0,
                hunger,
                stamina: 100.0,
            },
            personality: personality(),
            inventory: BTreeMap::new(),
            has_equipment: false,
            recent_memories: Vec::new(),
        }
    }

    fn conversation(participants: Vec<ConversationParticipant>) -> ConversationContext {
        ConversationContext {
            participants,
            calendar: calendar(),
            weather: Weather::Clear,
            aggressive_beast_nearby: false,
        }
    }

    #[test]
    fn critical_health_rests_first() {
        let ctx = context(20.0, 95.0, 5.0);
        assert_eq!(fallback_decision(&ctx).action, Action::Rest);
    }

    #[test]
    fn hungry_agent_eats_best_food() {
        let mut ctx = context(80.0, 85.0, 80.0);
        ctx.inventory.insert(Item::Berry, 2);
        ctx.inventory.insert(Item::CookedMeat, 1);
        assert_eq!(
            fallback_decision(&ctx).action,
            Action::Eat {
                food: Item::CookedMeat
            }
        );
    }

    #[test]
    fn hungry_agent_without_food_seeks_berries() {
        let mut ctx = context(80.0, 85.0, 80.0);
        ctx.nearby_resources.push(resource(ResourceKind::Berry, 6.0));
        assert_eq!(
            fallback_decision(&ctx).action,
            Action::Gather {
                resource: ResourceKind::Berry
            }
        );
    }

    #[test]
    fn tired_agent_rests() {
        let ctx = context(80.0, 10.0, 15.0);
        assert_eq!(fallback_decision(&ctx).action, Action::Rest);
    }

    #[test]
    fn gathers_wood_then_explores() {
        let mut ctx = context(90.0, 10.0, 90.0);
        assert_eq!(fallback_decision(&ctx).action, Action::Explore);
        ctx.nearby_resources.push(resource(ResourceKind::Wood, 12.0));
        assert_eq!(
            fallback_decision(&ctx).action,
            Action::Gather {
                resource: ResourceKind::Wood
            }
        );
    }

    #[test]
    fn fallback_script_follows_hunger_then_danger() {
        let mut rng = SmallRng::seed_from_u64(42);
        let hungry = conversation(vec![participant("Alice", 90.0), participant("Bob", 60.0)]);
        let script = fallback_script(&hungry, &mut rng);
        assert_eq!(script.topic, "food shortage");
        assert_eq!(script.messages.len(), 2);
        assert!(!script.triggers_action);

        let mut wary = conversation(vec![participant("Alice", 10.0), participant("Bob", 10.0)]);
        wary.aggressive_beast_nearby = true;
        assert_eq!(fallback_script(&wary, &mut rng).kind, ConversationKind::Warning);
    }

    #[test]
    fn fallback_summary_names_the_others() {
        let alice = AgentId::new();
        let bob = AgentId::new();
        let ctx = SummaryContext {
            conversation_id: ConversationId::new(),
            participants: vec![(alice, "Alice".to_owned()), (bob, "Bob".to_owned())],
            kind: ConversationKind::SmallTalk,
            topic: "the weather".to_owned(),
            transcript: Vec::new(),
        };
        let memories = fallback_summary(&ctx);
        assert_eq!(memories.len(), 2);
        let first = memories.first().unwrap();
        assert_eq!(first.agent_id, alice);
        assert_eq!(first.memory, "Talked with Bob about the weather");
    }

    #[test]
    fn sanitize_drops_strangers_and_casual_triggers() {
        let alice = AgentId::new();
        let bob = AgentId::new();
        let script = ConversationScript {
            kind: ConversationKind::SmallTalk,
            topic: "berries".to_owned(),
            messages: vec![
                ScriptLine {
                    speaker: alice,
                    content: "Hi".to_owned(),
                },
                ScriptLine {
                    speaker: AgentId::new(),
                    content: "Who am I?".to_owned(),
                },
                ScriptLine {
                    speaker: bob,
                    content: "Hello".to_owned(),
                },
            ],
            triggers_action: true,
            planned_action: Some(Action::Explore),
        };
        let clean = sanitize_script(script, &[alice, bob]).unwrap();
        assert_eq!(clean.messages.len(), 2);
        assert!(!clean.triggers_action);
    }

    #[test]
    fn sanitize_rejects_one_sided_scripts() {
        let alice = AgentId::new();
        let script = ConversationScript {
            kind: ConversationKind::Warning,
            topic: "wolves".to_owned(),
            messages: vec![ScriptLine {
                speaker: alice,
                content: "Wolves!".to_owned(),
            }],
            triggers_action: false,
            planned_action: None,
        };
        assert!(matches!(
            sanitize_script(script, &[alice]),
            Err(DecisionError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn timeout_maps_to_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, DecisionError>(())
        };
        let result = with_timeout(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(DecisionError::Timeout { timeout_ms: 10 })));
    }

    #[tokio::test]
    async fn rule_provider_answers_every_call() {
        let provider = RuleBasedProvider::new(7);
        let decision = provider.decide(&context(90.0, 10.0, 90.0)).await.unwrap();
        assert_eq!(decision.action, Action::Explore);
        let script = provider
            .converse(&conversation(vec![participant("Alice", 10.0), participant("Bob", 10.0)]))
            .await
            .unwrap();
        assert_eq!(script.kind, ConversationKind::SmallTalk);
    }
}
