//! Engine binary for the Hearth simulation.
//!
//! Wires together configuration, world seeding, the decision provider,
//! the observer server, and operator controls, then runs the tick loop
//! until a stop is requested or the tick limit is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hearth-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the world from the configured seed
//! 4. Build the decision provider
//! 5. Create operator state from the run bounds
//! 6. Start the observer server
//! 7. Run the simulation loop
//! 8. Log the result

mod error;
mod provider;
mod seed;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hearth_core::config::{LoggingConfig, SimulationConfig};
use hearth_core::operator::OperatorState;
use hearth_core::runner;
use hearth_core::tick::SimulationState;
use hearth_observer::{AppState, ObserverPublisher, ServerConfig};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::provider::EngineProvider;

/// Config file read when no path is given.
const DEFAULT_CONFIG_PATH: &str = "hearth-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        world_name = %config.world.name,
        seed = config.world.seed,
        agents = config.world.agent_count,
        tick_interval_ms = config.time.tick_interval_ms,
        decision_timeout_ms = config.decision.timeout_ms,
        "hearth-engine starting"
    );

    // 3. Seed the world.
    let mut rng = SmallRng::seed_from_u64(config.world.seed);
    let (world, _summary) = seed::seed_world(config.world.agent_count, &mut rng)?;
    let mut sim_state = SimulationState::new(world, &config).map_err(EngineError::from)?;

    // 4. Decision provider.
    let provider = EngineProvider::from_config(&config)?;

    // 5. Operator state.
    let operator = Arc::new(OperatorState::new(config.time.tick_interval_ms, &config.simulation));
    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        paused = operator.is_paused(),
        "Operator state initialized"
    );

    // 6. Observer server.
    let app_state = Arc::new(AppState::with_operator(
        sim_state.world.snapshot(),
        Arc::clone(&operator),
    ));
    let listener = hearth_observer::bind(&ServerConfig::from(&config.observer))
        .await
        .map_err(EngineError::from)?;
    let server_state = Arc::clone(&app_state);
    tokio::spawn(async move {
        if let Err(e) = hearth_observer::serve(listener, server_state).await {
            error!(error = %e, "Observer server stopped");
        }
    });

    let ctrl_c_operator = Arc::clone(&operator);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            ctrl_c_operator.request_stop();
        }
    });

    // 7. Run the simulation.
    let mut callback = ObserverPublisher::new(app_state);
    let result = runner::run_simulation(&mut sim_state, &provider, &operator, &mut callback).await;

    // 8. Log results.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "hearth-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, or defaults if it does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
