//! Tunable parameters for agent and beast behavior.
//!
//! [`AgentConfig`] bundles every rate and threshold the behavior layer
//! reads, so callers (the tick orchestrator, tests) can override defaults.
//! The core crate builds it from the `agents` section of
//! `hearth-config.yaml`; omitted keys keep their defaults. All rates are
//! per sim-second.

use serde::Deserialize;

/// Configuration for agent vitals, movement, and action timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Hunger added per sim-second (default: 0.05).
    pub hunger_rate: f64,

    /// Hunger above which health drains (default: 90).
    pub starvation_threshold: f64,

    /// Health lost per sim-second while starving (default: 0.05).
    pub starvation_damage: f64,

    /// Stamina recovered per sim-second while resting (default: 1.5).
    pub rest_stamina: f64,

    /// Health recovered per sim-second while resting (default: 0.8).
    pub rest_health: f64,

    /// Stamina spent per sim-second on any other action (default: 0.15).
    pub work_stamina_cost: f64,

    /// Stamina recovered per sim-second while idle (default: 0.2).
    pub idle_stamina_regen: f64,

    /// Stamina below which health drains (default: 10).
    pub exhaustion_threshold: f64,

    /// Health lost per sim-second while exhausted (default: 0.02).
    pub exhaustion_damage: f64,

    /// Radius in which a complete shelter boosts rest (default: 10).
    pub shelter_radius: f64,

    /// Walking speed in units per sim-second (default: 2.0).
    pub base_speed: f64,

    /// Sim-seconds between regular decisions (default: 30).
    pub decision_interval: f64,

    /// Shortest post-action cooling, sim-seconds (default: 2).
    pub cooling_min: f64,

    /// Longest post-action cooling, sim-seconds (default: 5).
    pub cooling_max: f64,

    /// Radius in which living agents witness a death (default: 20).
    pub death_witness_radius: f64,

    /// Radius in which agents can talk or share (default: 5).
    pub social_radius: f64,

    /// Shortest conversation, sim-seconds (default: 30).
    pub conversation_min: f64,

    /// Longest conversation, sim-seconds (default: 45).
    pub conversation_max: f64,

    /// Per-tick chance that two idle neighbours exchange a passing word
    /// (default: 0.005).
    pub ambient_chat_chance: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hunger_rate: 0.05,
            starvation_threshold: 90.0,
            starvation_damage: 0.05,
            rest_stamina: 1.5,
            rest_health: 0.8,
            work_stamina_cost: 0.15,
            idle_stamina_regen: 0.2,
            exhaustion_threshold: 10.0,
            exhaustion_damage: 0.02,
            shelter_radius: 10.0,
            base_speed: 2.0,
            decision_interval: 30.0,
            cooling_min: 2.0,
            cooling_max: 5.0,
            death_witness_radius: 20.0,
            social_radius: 5.0,
            conversation_min: 30.0,
            conversation_max: 45.0,
            ambient_chat_chance: 0.005,
        }
    }
}
