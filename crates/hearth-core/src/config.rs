//! Configuration loading and typed config structures for the Hearth simulation.
//!
//! The canonical configuration lives in `hearth-config.yaml` at the project
//! root. Every section and field has a default, so an empty or missing file
//! yields a runnable simulation. A handful of environment variables
//! override the YAML:
//!
//! - `LLM_API_URL`, `LLM_API_KEY`, `LLM_MODEL` override the `llm` section
//! - `OBSERVER_PORT` overrides `observer.port`

use std::path::Path;

use hearth_agents::AgentConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `hearth-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World seeding.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick period and calendar.
    #[serde(default)]
    pub time: TimeConfig,

    /// Agent and beast behavior rates.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Which decision provider to use and how long to wait for it.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// LLM backend settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(port) = lookup("OBSERVER_PORT").and_then(|p| p.parse().ok()) {
            self.observer.port = port;
        }
    }
}

/// World seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for seeding and per-tick randomness.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of agents spawned at start.
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            agent_count: default_agent_count(),
        }
    }
}

/// Tick period and calendar configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Real milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Calendar-seconds per sim-second.
    #[serde(default = "default_calendar_scale")]
    pub calendar_scale: f64,

    /// Calendar days per season.
    #[serde(default = "default_days_per_season")]
    pub days_per_season: u64,

    /// Largest sim-time step one tick may take.
    #[serde(default = "default_max_step_seconds")]
    pub max_step_seconds: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            calendar_scale: default_calendar_scale(),
            days_per_season: default_days_per_season(),
            max_step_seconds: default_max_step_seconds(),
        }
    }
}

/// Which decision provider backs the agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// The deterministic rule-based fallback only.
    Rules,
    /// An LLM endpoint, falling back to rules on any failure.
    #[default]
    Llm,
}

/// Decision provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecisionConfig {
    /// Provider kind.
    #[serde(default)]
    pub provider: ProviderKind,

    /// Milliseconds any provider call may take before the fallback is used.
    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            timeout_ms: default_provider_timeout_ms(),
        }
    }
}

/// Wire format of the LLM endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStyle {
    /// OpenAI-compatible chat completions.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic messages.
    Anthropic,
}

/// LLM backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmConfig {
    /// Endpoint URL.
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// API key. Empty disables the LLM provider.
    #[serde(default)]
    pub api_key: String,

    /// Model name.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Wire format.
    #[serde(default)]
    pub api_style: ApiStyle,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Response token limit.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Directory of prompt template overrides. Built-in templates are used
    /// for any file it lacks.
    #[serde(default)]
    pub template_dir: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: String::new(),
            model: default_llm_model(),
            api_style: ApiStyle::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            template_dir: None,
        }
    }
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Run boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Start paused, waiting for an operator resume.
    #[serde(default)]
    pub start_paused: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Hearth".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_agent_count() -> u32 {
    5
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_calendar_scale() -> f64 {
    60.0
}

const fn default_days_per_season() -> u64 {
    30
}

const fn default_max_step_seconds() -> f64 {
    5.0
}

const fn default_provider_timeout_ms() -> u64 {
    8000
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_owned()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_owned()
}

const fn default_temperature() -> f64 {
    0.8
}

const fn default_max_tokens() -> u32 {
    500
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.agent_count, 5);
        assert_eq!(config.time.tick_interval_ms, 1000);
        assert_eq!(config.decision.timeout_ms, 8000);
        assert_eq!(config.observer.port, 8080);
        assert_eq!(config.agents, AgentConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Valley"
  seed: 7
  agent_count: 3

time:
  tick_interval_ms: 500
  calendar_scale: 120.0
  days_per_season: 10
  max_step_seconds: 2.0

agents:
  hunger_rate: 0.1
  decision_interval: 20.0

decision:
  provider: rules
  timeout_ms: 3000

llm:
  api_url: "http://localhost:11434/v1/chat/completions"
  model: "llama3"
  api_style: anthropic

observer:
  port: 9090

simulation:
  max_ticks: 100
  start_paused: true

logging:
  level: "debug"
  json: true
"#;
        let config = SimulationConfig::parse_without_env(yaml).unwrap();
        assert_eq!(config.world.name, "Test Valley");
        assert_eq!(config.world.agent_count, 3);
        assert_eq!(config.time.days_per_season, 10);
        assert!((config.agents.hunger_rate - 0.1).abs() < 1e-9);
        // Unlisted agent keys keep their defaults.
        assert!((config.agents.social_radius - 5.0).abs() < 1e-9);
        assert_eq!(config.decision.provider, ProviderKind::Rules);
        assert_eq!(config.llm.api_style, ApiStyle::Anthropic);
        assert_eq!(config.observer.port, 9090);
        assert!(config.simulation.start_paused);
        assert!(config.logging.json);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse_without_env("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn environment_overrides_yaml() {
        let vars: BTreeMap<&str, &str> = [
            ("LLM_API_KEY", "secret"),
            ("LLM_MODEL", "claude"),
            ("OBSERVER_PORT", "3001"),
        ]
        .into_iter()
        .collect();
        let mut config = SimulationConfig::parse_without_env("observer:\n  port: 9000\n").unwrap();
        config.apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()));
        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.llm.model, "claude");
        assert_eq!(config.observer.port, 3001);
    }

    #[test]
    fn bad_port_override_is_ignored() {
        let mut config = SimulationConfig::default();
        config.apply_overrides(|key| (key == "OBSERVER_PORT").then(|| "not-a-port".to_owned()));
        assert_eq!(config.observer.port, 8080);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("hearth-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
