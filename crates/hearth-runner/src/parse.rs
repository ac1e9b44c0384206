//! LLM response parsing into typed decisions, scripts, and memories.
//!
//! The LLM returns raw text (ideally JSON). This module recovers the JSON
//! object from it and maps the loosely-shaped reply onto the typed payloads
//! from `hearth-types`. Replies in the tagged [`Action`] form are accepted
//! as-is; the flat `{"action": "...", "target": ...}` form models tend to
//! produce is mapped by hand. Anything unusable is a
//! [`RunnerError::Parse`], which the tick loop answers with its fallback.

use hearth_types::{
    Action, AgentId, AgentRef, BeastTarget, ConversationContext, ConversationKind, ConversationScript,
    Decision, Item, ParticipantMemory, ResourceKind, ScriptLine, SummaryContext,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::RunnerError;

/// How much of an unparseable reply goes into the error message.
const PREVIEW_CHARS: usize = 200;

/// Topic used when a script names none.
const DEFAULT_TOPIC: &str = "everyday matters";

/// Provider priorities are clamped to this range.
const PRIORITY_RANGE: (u8, u8) = (1, 10);

// ---------------------------------------------------------------------------
// JSON recovery
// ---------------------------------------------------------------------------

/// Recover the JSON object from a raw LLM reply.
///
/// Tries, in order: the whole reply, the body of a markdown code block,
/// and the span from the first `{` to the last `}`. Each candidate is
/// retried with trailing commas stripped.
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] if no candidate is a JSON object.
pub fn extract_json(raw: &str) -> Result<Value, RunnerError> {
    let trimmed = raw.trim();
    let candidates = [
        Some(trimmed),
        extract_json_from_codeblock(trimmed),
        outermost_object(trimmed),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(candidate)
            && value.is_object()
        {
            return Ok(value);
        }
        if let Ok(value) = serde_json::from_str::<Value>(&strip_trailing_commas(candidate))
            && value.is_object()
        {
            return Ok(value);
        }
    }

    Err(RunnerError::Parse(format!(
        "no JSON object in response: {}",
        trimmed.chars().take(PREVIEW_CHARS).collect::<String>()
    )))
}

/// Extract the body of the first markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    // Skip the language tag, if any.
    let body_start = after_fence.find('\n')?.checked_add(1)?;
    let body = after_fence.get(body_start..)?;
    let close = body.find("```")?;
    body.get(..close).map(str::trim)
}

/// The span from the first `{` to the last `}`.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Strip commas that directly precede a closing brace or bracket, outside
/// string literals.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = i
                .checked_add(1)
                .and_then(|j| text.get(j..))
                .and_then(|rest| rest.trim_start().chars().next());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }

    result
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Parse a decision reply.
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] if the reply holds no usable action.
pub fn parse_decision(raw: &str) -> Result<Decision, RunnerError> {
    let value = extract_json(raw)?;
    let obj = as_object(&value)?;
    let action = action_from_object(obj)?;

    let reasoning = text_field(obj, &["reasoning", "reason"]).unwrap_or_default();
    let duration_hint = obj
        .get("duration_hint")
        .and_then(Value::as_f64)
        .filter(|d| d.is_finite() && *d > 0.0);
    let priority = obj
        .get("priority")
        .and_then(Value::as_u64)
        .map(|p| u8::try_from(p).unwrap_or(u8::MAX).clamp(PRIORITY_RANGE.0, PRIORITY_RANGE.1));

    Ok(Decision {
        action,
        reasoning,
        duration_hint,
        priority,
    })
}

/// Read an action from either the tagged or the flat form.
fn action_from_object(obj: &Map<String, Value>) -> Result<Action, RunnerError> {
    // Tagged: {"type": "gather", "resource": "wood"}
    if obj.contains_key("type")
        && let Ok(action) = serde_json::from_value::<Action>(Value::Object(obj.clone()))
    {
        return Ok(action);
    }

    match obj.get("action").or_else(|| obj.get("type")) {
        // Nested: {"action": {"type": "gather", ...}, "reasoning": "..."}
        Some(Value::Object(inner)) => action_from_object(inner),
        // Flat: {"action": "gather", "target": "wood"}
        Some(Value::String(name)) => action_from_name(name, obj),
        _ => Err(RunnerError::Parse("reply names no action".to_owned())),
    }
}

/// Build an action from its name and the arguments alongside it.
fn action_from_name(name: &str, obj: &Map<String, Value>) -> Result<Action, RunnerError> {
    let action = match normalize(name).as_str() {
        "move" | "move_to" | "go" | "walk" => {
            let (x, y) = coordinates(obj)?;
            Action::Move { x, y }
        }
        "gather" | "collect" | "harvest" | "chop" | "mine" | "forage" => Action::Gather {
            resource: resource_kind(required(obj, "gather", &["resource"])?)?,
        },
        "hunt" | "attack" => Action::Hunt {
            target: beast_target(argument(obj, &["beast"]))?,
        },
        "defend" | "fight" => Action::Defend {
            target: beast_target(argument(obj, &["beast"]))?,
        },
        "craft" | "make" => Action::Craft {
            item: parse_enum("tool", required(obj, "craft", &["item", "tool"])?)?,
        },
        "build" | "construct" => Action::Build {
            building: parse_enum("building", required(obj, "build", &["building"])?)?,
        },
        "eat" => Action::Eat {
            food: parse_enum("food", required(obj, "eat", &["food", "item"])?)?,
        },
        "drink" => Action::Eat {
            food: argument(obj, &["food", "item"]).map_or(Ok(Item::Water), |v| parse_enum("food", v))?,
        },
        "rest" | "sleep" => Action::Rest,
        "explore" | "wander" => Action::Explore,
        "flee" | "run" | "escape" => Action::Flee,
        "cook" => Action::Cook,
        "talk" | "chat" | "socialize" | "converse" => Action::Talk {
            with: agent_ref(argument(obj, &["with"])),
        },
        "share" | "give" => Action::Share {
            with: agent_ref(argument(obj, &["with"]))
                .ok_or_else(|| RunnerError::Parse("share requires a receiver".to_owned()))?,
            item: obj.get("item").map(|v| parse_enum("item", v)).transpose()?,
        },
        other => return Err(RunnerError::Parse(format!("unknown action: {other}"))),
    };
    Ok(action)
}

/// Target coordinates as `{"x":..,"y":..}`, `[x, y]`, `"x,y"`, or
/// top-level `x`/`y` fields.
fn coordinates(obj: &Map<String, Value>) -> Result<(f64, f64), RunnerError> {
    let pair = match obj.get("target") {
        Some(Value::Object(point)) => point
            .get("x")
            .and_then(Value::as_f64)
            .zip(point.get("y").and_then(Value::as_f64)),
        Some(Value::Array(items)) => items
            .first()
            .and_then(Value::as_f64)
            .zip(items.get(1).and_then(Value::as_f64)),
        Some(Value::String(text)) => {
            let cleaned = text.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
            cleaned.split_once(',').and_then(|(x, y)| {
                x.trim().parse::<f64>().ok().zip(y.trim().parse::<f64>().ok())
            })
        }
        _ => obj
            .get("x")
            .and_then(Value::as_f64)
            .zip(obj.get("y").and_then(Value::as_f64)),
    };
    pair.filter(|(x, y)| x.is_finite() && y.is_finite())
        .ok_or_else(|| RunnerError::Parse("move requires x and y coordinates".to_owned()))
}

/// `target`, else the first present of `keys`. Nulls count as absent.
fn argument<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    std::iter::once("target")
        .chain(keys.iter().copied())
        .filter_map(|k| obj.get(k))
        .find(|v| !v.is_null())
}

fn required<'a>(obj: &'a Map<String, Value>, action: &str, keys: &[&str]) -> Result<&'a Value, RunnerError> {
    argument(obj, keys).ok_or_else(|| RunnerError::Parse(format!("{action} requires a target")))
}

/// Whether a target string means "whoever is nearest".
fn is_unspecified(text: &str) -> bool {
    matches!(normalize(text).as_str(), "" | "none" | "null" | "nearest" | "anyone" | "any")
}

fn beast_target(value: Option<&Value>) -> Result<Option<BeastTarget>, RunnerError> {
    match value {
        Some(Value::String(text)) if is_unspecified(text) => Ok(None),
        Some(v) => parse_enum("beast", v).map(Some),
        None => Ok(None),
    }
}

fn agent_ref(value: Option<&Value>) -> Option<AgentRef> {
    let text = value?.as_str()?.trim();
    if is_unspecified(text) {
        return None;
    }
    serde_json::from_value::<AgentRef>(Value::String(text.to_owned())).ok()
}

/// Resource kinds, with the everyday words models use for them.
fn resource_kind(value: &Value) -> Result<ResourceKind, RunnerError> {
    let alias = value.as_str().map(normalize);
    match alias.as_deref() {
        Some("tree" | "trees" | "log" | "logs" | "lumber") => Ok(ResourceKind::Wood),
        Some("rock" | "rocks") => Ok(ResourceKind::Stone),
        Some("bush" | "bushes" | "fruit") => Ok(ResourceKind::Berry),
        _ => parse_enum("resource", value),
    }
}

/// Deserialize a snake_case enum from a string, tolerating case, spaces,
/// and plurals.
fn parse_enum<T: DeserializeOwned>(label: &str, value: &Value) -> Result<T, RunnerError> {
    let Some(text) = value.as_str() else {
        return Err(RunnerError::Parse(format!("{label} must be a string, got {value}")));
    };
    let normalized = normalize(text);
    std::iter::once(normalized.clone())
        .chain(singular(&normalized))
        .find_map(|candidate| serde_json::from_value::<T>(Value::String(candidate)).ok())
        .ok_or_else(|| RunnerError::Parse(format!("unknown {label}: {text}")))
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Singular form of a simple English plural.
fn singular(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        return Some(format!("{stem}y"));
    }
    if let Some(stem) = word.strip_suffix("ves") {
        return Some(format!("{stem}f"));
    }
    word.strip_suffix('s').map(ToOwned::to_owned)
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// Intermediate struct for the LLM's raw conversation reply.
#[derive(Debug, serde::Deserialize)]
struct RawScript {
    #[serde(default, alias = "kind")]
    conversation_type: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    messages: Vec<RawLine>,
    #[serde(default)]
    triggers_action: bool,
    #[serde(default)]
    planned_action: Option<Value>,
}

#[derive(Debug, serde::Deserialize)]
struct RawLine {
    #[serde(alias = "name")]
    speaker: String,
    #[serde(alias = "text", alias = "message")]
    content: String,
}

/// Parse a conversation reply against the participants it was written for.
///
/// Speakers are matched by name (case-insensitively) or id; lines by anyone
/// else are dropped. An unknown conversation type reads as small talk, and
/// an unusable planned action is discarded rather than failing the script.
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] if the reply is not a conversation.
pub fn parse_script(raw: &str, context: &ConversationContext) -> Result<ConversationScript, RunnerError> {
    let value = extract_json(raw)?;
    let script: RawScript = serde_json::from_value(value)?;

    let kind = script
        .conversation_type
        .as_deref()
        .and_then(|t| parse_enum::<ConversationKind>("conversation type", &Value::String(t.to_owned())).ok())
        .unwrap_or(ConversationKind::SmallTalk);

    let messages: Vec<ScriptLine> = script
        .messages
        .into_iter()
        .filter_map(|line| {
            let content = line.content.trim();
            if content.is_empty() {
                return None;
            }
            let Some(speaker) = resolve_speaker(&line.speaker, context) else {
                debug!(speaker = %line.speaker, "Dropping line by a non-participant");
                return None;
            };
            Some(ScriptLine {
                speaker,
                content: content.to_owned(),
            })
        })
        .collect();

    let planned_action = match script.planned_action {
        Some(Value::Object(obj)) => action_from_object(&obj)
            .inspect_err(|e| warn!(error = %e, "Ignoring unusable planned action"))
            .ok(),
        Some(Value::String(name)) => action_from_name(&name, &Map::new())
            .inspect_err(|e| warn!(error = %e, "Ignoring unusable planned action"))
            .ok(),
        _ => None,
    };

    let topic = script
        .topic
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_owned());

    Ok(ConversationScript {
        kind,
        topic,
        messages,
        triggers_action: script.triggers_action,
        planned_action,
    })
}

fn resolve_speaker(speaker: &str, context: &ConversationContext) -> Option<AgentId> {
    let speaker = speaker.trim();
    context
        .participants
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(speaker) || p.id.to_string() == speaker)
        .map(|p| p.id)
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Parse a summary reply into one memory per participant found.
///
/// Memories are keyed by participant name (case-insensitively) or id,
/// either at the top level or under `memories`. Each value is the memory
/// text or an object with a `memory` field. Participants the reply skips
/// get no entry here.
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] if no participant's memory is present.
pub fn parse_summary(raw: &str, context: &SummaryContext) -> Result<Vec<ParticipantMemory>, RunnerError> {
    let value = extract_json(raw)?;
    let root = as_object(&value)?;
    let entries = root.get("memories").and_then(Value::as_object).unwrap_or(root);

    let memories: Vec<ParticipantMemory> = context
        .participants
        .iter()
        .filter_map(|(id, name)| {
            let id_key = id.to_string();
            let entry = entries
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(name) || **key == id_key)
                .map(|(_, v)| v)?;
            let memory = match entry {
                Value::String(text) => text.trim(),
                Value::Object(obj) => obj.get("memory").and_then(Value::as_str)?.trim(),
                _ => return None,
            };
            (!memory.is_empty()).then(|| ParticipantMemory {
                agent_id: *id,
                memory: memory.to_owned(),
            })
        })
        .collect();

    if memories.is_empty() {
        return Err(RunnerError::Parse("summary holds no participant memories".to_owned()));
    }
    Ok(memories)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn as_object(value: &Value) -> Result<&Map<String, Value>, RunnerError> {
    value
        .as_object()
        .ok_or_else(|| RunnerError::Parse("reply is not a JSON object".to_owned()))
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_types::{
        Archetype, Attributes, BeastKind, BuildingKind, CalendarView, ConversationId, ConversationParticipant,
        Personality, Season, Tool, Weather,
    };

    use super::*;

    fn participant(name: &str) -> ConversationParticipant {
        ConversationParticipant {
            id: AgentId::new(),
            name: name.to_owned(),
            attributes: Attributes::default(),
            personality: Personality {
                archetype: Archetype::Social,
                bravery: 50,
                sociability: 80,
                cautiousness: 50,
                curiosity: 50,
                cooperation: 70,
                ambition: 40,
            },
            inventory: std::collections::BTreeMap::new(),
            has_equipment: false,
            recent_memories: Vec::new(),
        }
    }

    fn conversation(names: &[&str]) -> ConversationContext {
        ConversationContext {
            participants: names.iter().map(|n| participant(n)).collect(),
            calendar: CalendarView {
                day: 1,
                hour: 9,
                minute: 0,
                season: Season::Spring,
                is_night: false,
                sim_time: 0.0,
            },
            weather: Weather::Clear,
            aggressive_beast_nearby: false,
        }
    }

    // -----------------------------------------------------------------------
    // JSON recovery
    // -----------------------------------------------------------------------

    #[test]
    fn extract_json_from_markdown() {
        let text = "Sure!\n```json\n{\"key\": \"value\"}\n```\nHope that helps.";
        assert_eq!(extract_json_from_codeblock(text), Some("{\"key\": \"value\"}"));
        let value = extract_json(text).unwrap();
        assert_eq!(value.get("key").and_then(Value::as_str), Some("value"));
    }

    #[test]
    fn extract_json_from_surrounding_prose() {
        let value = extract_json("I will rest now. {\"action\": \"rest\"} That is all.").unwrap();
        assert_eq!(value.get("action").and_then(Value::as_str), Some("rest"));
    }

    #[test]
    fn trailing_commas_are_stripped_outside_strings() {
        assert_eq!(strip_trailing_commas("{\"a\": [1, 2,],}"), "{\"a\": [1, 2]}");
        assert_eq!(strip_trailing_commas("{\"a\": \"x,}\"}"), "{\"a\": \"x,}\"}");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(extract_json("I think I should gather wood."), Err(RunnerError::Parse(_))));
        assert!(matches!(extract_json(""), Err(RunnerError::Parse(_))));
        assert!(extract_json("[1, 2]").is_err());
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    #[test]
    fn flat_decision_with_target() {
        let decision =
            parse_decision(r#"{"action": "gather", "target": "wood", "reason": "Need wood for a hut", "priority": 7}"#)
                .unwrap();
        assert_eq!(
            decision.action,
            Action::Gather {
                resource: ResourceKind::Wood
            }
        );
        assert_eq!(decision.reasoning, "Need wood for a hut");
        assert_eq!(decision.priority, Some(7));
    }

    #[test]
    fn tagged_decision_is_accepted() {
        let decision = parse_decision(r#"{"type": "build", "building": "lean_to", "reasoning": "Shelter"}"#).unwrap();
        assert_eq!(
            decision.action,
            Action::Build {
                building: BuildingKind::LeanTo
            }
        );
        assert_eq!(decision.reasoning, "Shelter");
    }

    #[test]
    fn nested_decision_is_accepted() {
        let decision =
            parse_decision(r#"{"action": {"type": "craft", "item": "stone_axe"}, "reasoning": "Faster chopping"}"#)
                .unwrap();
        assert_eq!(decision.action, Action::Craft { item: Tool::StoneAxe });
    }

    #[test]
    fn loose_names_and_plurals_resolve() {
        let decision = parse_decision(r#"{"action": "Collect", "target": "Berries"}"#).unwrap();
        assert_eq!(
            decision.action,
            Action::Gather {
                resource: ResourceKind::Berry
            }
        );

        let decision = parse_decision(r#"{"action": "hunt", "target": "wolves"}"#).unwrap();
        assert_eq!(
            decision.action,
            Action::Hunt {
                target: Some(BeastTarget::Kind(BeastKind::Wolf))
            }
        );

        let decision = parse_decision(r#"{"action": "build", "target": "Wooden Hut"}"#).unwrap();
        assert_eq!(
            decision.action,
            Action::Build {
                building: BuildingKind::WoodenHut
            }
        );
    }

    #[test]
    fn move_accepts_several_coordinate_shapes() {
        for raw in [
            r#"{"action": "move", "target": {"x": 10, "y": 20.5}}"#,
            r#"{"action": "move", "target": [10, 20.5]}"#,
            r#"{"action": "move", "target": "(10, 20.5)"}"#,
            r#"{"action": "move", "x": 10, "y": 20.5}"#,
        ] {
            let decision = parse_decision(raw).unwrap();
            assert_eq!(decision.action, Action::Move { x: 10.0, y: 20.5 }, "{raw}");
        }
        assert!(parse_decision(r#"{"action": "move", "target": "north"}"#).is_err());
    }

    #[test]
    fn optional_targets_default_to_nearest() {
        let decision = parse_decision(r#"{"action": "talk", "target": "nearest"}"#).unwrap();
        assert_eq!(decision.action, Action::Talk { with: None });

        let decision = parse_decision(r#"{"action": "defend", "target": null}"#).unwrap();
        assert_eq!(decision.action, Action::Defend { target: None });

        let decision = parse_decision(r#"{"action": "talk", "target": "Bob"}"#).unwrap();
        assert_eq!(
            decision.action,
            Action::Talk {
                with: Some(AgentRef::Name("Bob".to_owned()))
            }
        );
    }

    #[test]
    fn drink_means_eating_water() {
        let decision = parse_decision(r#"{"action": "drink"}"#).unwrap();
        assert_eq!(decision.action, Action::Eat { food: Item::Water });
    }

    #[test]
    fn share_needs_a_receiver() {
        let decision = parse_decision(r#"{"action": "give", "target": "Carol", "item": "berry"}"#).unwrap();
        assert_eq!(
            decision.action,
            Action::Share {
                with: AgentRef::Name("Carol".to_owned()),
                item: Some(Item::Berry)
            }
        );
        assert!(parse_decision(r#"{"action": "share"}"#).is_err());
    }

    #[test]
    fn unknown_action_and_missing_targets_fail() {
        assert!(parse_decision(r#"{"action": "dance"}"#).is_err());
        assert!(parse_decision(r#"{"action": "gather"}"#).is_err());
        assert!(parse_decision(r#"{"action": "craft", "target": "sword"}"#).is_err());
        assert!(parse_decision(r#"{"reasoning": "thinking"}"#).is_err());
    }

    #[test]
    fn priority_is_clamped() {
        let decision = parse_decision(r#"{"action": "rest", "priority": 40}"#).unwrap();
        assert_eq!(decision.priority, Some(10));
        let decision = parse_decision(r#"{"action": "rest", "priority": 0}"#).unwrap();
        assert_eq!(decision.priority, Some(1));
    }

    // -----------------------------------------------------------------------
    // Conversations
    // -----------------------------------------------------------------------

    #[test]
    fn script_maps_speakers_to_participants() {
        let context = conversation(&["Alice", "Bob"]);
        let raw = r#"```json
{
  "conversation_type": "plan_discussion",
  "topic": "a shelter before winter",
  "messages": [
    {"speaker": "Alice", "content": "We need a hut before the snow."},
    {"speaker": "bob", "content": "I have wood, let's build it."},
    {"speaker": "Zed", "content": "Can I help?"},
  ],
  "triggers_action": true,
  "planned_action": {"action": "build", "target": "wooden_hut", "reason": "Winter"}
}
```"#;
        let script = parse_script(raw, &context).unwrap();
        let alice = context.participants.first().unwrap();
        let bob = context.participants.get(1).unwrap();

        assert_eq!(script.kind, ConversationKind::PlanDiscussion);
        assert_eq!(script.topic, "a shelter before winter");
        assert_eq!(script.messages.len(), 2);
        assert_eq!(script.messages.first().unwrap().speaker, alice.id);
        assert_eq!(script.messages.get(1).unwrap().speaker, bob.id);
        assert!(script.triggers_action);
        assert_eq!(
            script.planned_action,
            Some(Action::Build {
                building: BuildingKind::WoodenHut
            })
        );
    }

    #[test]
    fn unusable_planned_action_is_dropped() {
        let context = conversation(&["Alice", "Bob"]);
        let raw = r#"{"conversation_type": "cooperation", "topic": "dancing",
            "messages": [{"speaker": "Alice", "content": "Dance?"}, {"speaker": "Bob", "content": "Sure."}],
            "triggers_action": true, "planned_action": {"action": "dance"}}"#;
        let script = parse_script(raw, &context).unwrap();
        assert!(script.planned_action.is_none());
        assert_eq!(script.messages.len(), 2);
    }

    #[test]
    fn unknown_type_reads_as_small_talk() {
        let context = conversation(&["Alice", "Bob"]);
        let raw = r#"{"conversation_type": "gossip", "messages": []}"#;
        let script = parse_script(raw, &context).unwrap();
        assert_eq!(script.kind, ConversationKind::SmallTalk);
        assert_eq!(script.topic, DEFAULT_TOPIC);
        assert!(script.messages.is_empty());
    }

    // -----------------------------------------------------------------------
    // Summaries
    // -----------------------------------------------------------------------

    fn summary_context() -> SummaryContext {
        SummaryContext {
            conversation_id: ConversationId::new(),
            participants: vec![(AgentId::new(), "Alice".to_owned()), (AgentId::new(), "Bob".to_owned())],
            kind: ConversationKind::InfoExchange,
            topic: "berries".to_owned(),
            transcript: Vec::new(),
        }
    }

    #[test]
    fn summary_memories_keyed_by_name() {
        let context = summary_context();
        let raw = r#"{"summary": "Shared berry spots", "Alice": "Bob says the east bushes are full.", "bob": {"memory": "I told Alice about the east bushes."}}"#;
        let memories = parse_summary(raw, &context).unwrap();

        assert_eq!(memories.len(), 2);
        let (alice, _) = context.participants.first().unwrap();
        assert_eq!(memories.first().unwrap().agent_id, *alice);
        assert_eq!(memories.first().unwrap().memory, "Bob says the east bushes are full.");
        assert_eq!(memories.get(1).unwrap().memory, "I told Alice about the east bushes.");
    }

    #[test]
    fn summary_under_memories_key_may_skip_someone() {
        let context = summary_context();
        let raw = r#"{"memories": {"Alice": "Berries grow east."}}"#;
        let memories = parse_summary(raw, &context).unwrap();
        assert_eq!(memories.len(), 1);
    }

    #[test]
    fn summary_without_participants_fails() {
        let context = summary_context();
        assert!(parse_summary(r#"{"summary": "They talked."}"#, &context).is_err());
    }
}
