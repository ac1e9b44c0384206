//! Per-tick attribute decay and regeneration.
//!
//! Order of operations for one living agent over `dt` sim-seconds:
//!
//! 1. Hunger rises; above the starvation threshold health drains
//! 2. Resting regenerates stamina and health, boosted by the nearest
//!    complete shelter in range; unsheltered rest is slowed by rain/storm
//! 3. Any other action costs stamina; idling recovers a little
//! 4. Exhaustion drains health
//! 5. Clamp everything into `[0, 100]`
//!
//! The caller handles death when this reports health at zero.

use hearth_types::{ActionKind, AgentId, Weather};
use hearth_world::World;
use hearth_world::structure::nearest_shelter;

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Rest multipliers `(stamina, health)` for unsheltered agents.
pub const fn weather_rest_multipliers(weather: Weather) -> (f64, f64) {
    match weather {
        Weather::Clear | Weather::Cloudy => (1.0, 1.0),
        Weather::Rain => (0.7, 0.9),
        Weather::Storm => (0.5, 0.8),
    }
}

/// Outcome of one vitals step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VitalTickResult {
    /// Health reached zero this step.
    pub died: bool,
}

/// Apply `dt` sim-seconds of vitals to `agent`.
pub fn apply_vitals(
    world: &mut World,
    agent: AgentId,
    config: &AgentConfig,
    dt: f64,
) -> Result<VitalTickResult, AgentError> {
    let weather = world.weather.current();
    let (position, activity) = {
        let a = world.agent(agent)?;
        if !a.alive {
            return Ok(VitalTickResult { died: false });
        }
        (a.position, a.current_kind())
    };
    let shelter = nearest_shelter(world, position, config.shelter_radius);

    let a = world.agent_mut(agent)?;
    let attrs = &mut a.attributes;

    // --- Hunger ---
    attrs.adjust_hunger(config.hunger_rate * dt);
    if attrs.hunger > config.starvation_threshold {
        attrs.adjust_health(-config.starvation_damage * dt);
    }

    // --- Activity ---
    match activity {
        Some(ActionKind::Rest) => {
            let mut stamina = config.rest_stamina;
            let mut health = config.rest_health;
            if let Some(bonus) = shelter {
                stamina += bonus.stamina;
                health += bonus.health;
            } else {
                let (stamina_mult, health_mult) = weather_rest_multipliers(weather);
                stamina *= stamina_mult;
                health *= health_mult;
            }
            attrs.adjust_stamina(stamina * dt);
            attrs.adjust_health(health * dt);
        }
        Some(_) => attrs.adjust_stamina(-config.work_stamina_cost * dt),
        None => attrs.adjust_stamina(config.idle_stamina_regen * dt),
    }

    // --- Exhaustion ---
    if attrs.stamina < config.exhaustion_threshold {
        attrs.adjust_health(-config.exhaustion_damage * dt);
    }

    attrs.clamp();
    Ok(VitalTickResult {
        died: attrs.health <= 0.0,
    })
}
