//! Weather as a Markov chain over {clear, cloudy, rain, storm}.
//!
//! # Cadence
//!
//! The weather is checked once every [`CHECK_INTERVAL`] sim-seconds. At a
//! check there is a 50% chance it is re-rolled from the transition row of
//! the current weather; otherwise the next check comes sooner, after only
//! [`RETRY_DELAY`] sim-seconds.
//!
//! | From \ To | Clear | Cloudy | Rain | Storm |
//! |-----------|-------|--------|------|-------|
//! | Clear     | 60%   | 35%    | 5%   | 0%    |
//! | Cloudy    | 30%   | 40%    | 25%  | 5%    |
//! | Rain      | 10%   | 25%    | 50%  | 15%   |
//! | Storm     | 0%    | 10%    | 60%  | 30%   |

use hearth_types::Weather;
use rand::Rng;

/// Sim-seconds between regular weather checks.
pub const CHECK_INTERVAL: f64 = 1800.0;
/// Sim-seconds until the next check when a check declines to re-roll.
pub const RETRY_DELAY: f64 = 600.0;
/// Probability that a check re-rolls the weather.
pub const CHANGE_CHANCE: f64 = 0.5;

/// Transition row for `current`, ordered clear, cloudy, rain, storm.
const fn transition_row(current: Weather) -> [(Weather, f64); 4] {
    match current {
        Weather::Clear => [
            (Weather::Clear, 0.60),
            (Weather::Cloudy, 0.35),
            (Weather::Rain, 0.05),
            (Weather::Storm, 0.0),
        ],
        Weather::Cloudy => [
            (Weather::Clear, 0.30),
            (Weather::Cloudy, 0.40),
            (Weather::Rain, 0.25),
            (Weather::Storm, 0.05),
        ],
        Weather::Rain => [
            (Weather::Clear, 0.10),
            (Weather::Cloudy, 0.25),
            (Weather::Rain, 0.50),
            (Weather::Storm, 0.15),
        ],
        Weather::Storm => [
            (Weather::Clear, 0.0),
            (Weather::Cloudy, 0.10),
            (Weather::Rain, 0.60),
            (Weather::Storm, 0.30),
        ],
    }
}

/// Pick the next weather from `current` given a uniform roll in `[0, 1)`.
pub fn transition(current: Weather, roll: f64) -> Weather {
    let mut cumulative = 0.0;
    for (weather, p) in transition_row(current) {
        cumulative += p;
        if roll < cumulative {
            return weather;
        }
    }
    current
}

/// Current weather and the time of the next check.
#[derive(Debug, Clone)]
pub struct WeatherSystem {
    /// Weather right now.
    current: Weather,
    /// Sim-time of the next check.
    next_check_at: f64,
}

impl Default for WeatherSystem {
    fn default() -> Self {
        Self::new(Weather::Clear)
    }
}

impl WeatherSystem {
    /// Start with `initial` weather; the first check is one interval away.
    pub const fn new(initial: Weather) -> Self {
        Self {
            current: initial,
            next_check_at: CHECK_INTERVAL,
        }
    }

    /// Weather right now.
    pub const fn current(&self) -> Weather {
        self.current
    }

    /// Sim-time of the next check.
    pub const fn next_check_at(&self) -> f64 {
        self.next_check_at
    }

    /// Force the weather (operator override, tests).
    pub const fn set(&mut self, weather: Weather) {
        self.current = weather;
    }

    /// Run a check if one is due at `now`.
    ///
    /// Returns the new weather if it changed.
    pub fn update(&mut self, now: f64, rng: &mut impl Rng) -> Option<Weather> {
        if now < self.next_check_at {
            return None;
        }
        if !rng.random_bool(CHANGE_CHANCE) {
            self.next_check_at = now + RETRY_DELAY;
            return None;
        }
        self.next_check_at = now + CHECK_INTERVAL;
        let next = transition(self.current, rng.random::<f64>());
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
