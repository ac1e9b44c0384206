//! Simulation clock and calendar.
//!
//! The clock owns one timeline measured in sim-seconds. Each tick advances
//! it by the real time elapsed since the previous tick, clamped to
//! `[0, max_step]`, so a stalled loop never produces a huge jump. Every
//! timer in the simulation reads this timeline.
//!
//! The calendar (day, hour, minute, season) is derived from sim-time at
//! `calendar_scale` calendar-seconds per sim-second and is never stored
//! independently. The world starts on day 1 at 08:00 in spring.

use hearth_types::{CalendarView, Season};

use crate::config::TimeConfig;

/// Calendar-seconds in one day.
const SECONDS_PER_DAY: u64 = 86_400;
/// Calendar-seconds in one hour.
const SECONDS_PER_HOUR: u64 = 3_600;
/// Calendar time of day at sim-time zero (08:00).
const START_OF_DAY: u64 = 28_800;
/// First hour of night.
const NIGHT_STARTS: u32 = 20;
/// First hour of daylight.
const DAY_STARTS: u32 = 6;
/// Seasons in calendar order.
const SEASONS: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. zero days per season).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// The simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Ticks completed.
    tick: u64,
    /// Sim-seconds elapsed since start.
    sim_time: f64,
    /// Calendar-seconds per sim-second.
    calendar_scale: f64,
    /// Calendar days per season.
    days_per_season: u64,
    /// Largest step a single tick may take.
    max_step: f64,
}

impl SimClock {
    /// Create a clock at sim-time zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the scale or step is not a
    /// positive number, or `days_per_season` is zero.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        if !(config.calendar_scale.is_finite() && config.calendar_scale > 0.0) {
            return Err(ClockError::InvalidConfig {
                reason: "calendar_scale must be a positive number".to_owned(),
            });
        }
        if !(config.max_step_seconds.is_finite() && config.max_step_seconds > 0.0) {
            return Err(ClockError::InvalidConfig {
                reason: "max_step_seconds must be a positive number".to_owned(),
            });
        }
        if config.days_per_season == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "days_per_season must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick: 0,
            sim_time: 0.0,
            calendar_scale: config.calendar_scale,
            days_per_season: config.days_per_season,
            max_step: config.max_step_seconds,
        })
    }

    /// Advance by `elapsed` real seconds. Returns the step actually taken.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self, elapsed: f64) -> Result<f64, ClockError> {
        let dt = if elapsed.is_finite() {
            elapsed.clamp(0.0, self.max_step)
        } else {
            0.0
        };
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.sim_time += dt;
        Ok(dt)
    }

    /// Ticks completed.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Sim-seconds elapsed since start.
    pub const fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Calendar-seconds per sim-second.
    pub const fn calendar_scale(&self) -> f64 {
        self.calendar_scale
    }

    /// The calendar view of the current sim-time.
    pub fn calendar(&self) -> CalendarView {
        let seconds = START_OF_DAY.saturating_add(whole_seconds(self.sim_time * self.calendar_scale));
        let day = seconds.checked_div(SECONDS_PER_DAY).unwrap_or(0).saturating_add(1);
        let of_day = seconds.checked_rem(SECONDS_PER_DAY).unwrap_or(0);
        let hour = u32::try_from(of_day.checked_div(SECONDS_PER_HOUR).unwrap_or(0)).unwrap_or(0);
        let minute = of_day
            .checked_rem(SECONDS_PER_HOUR)
            .and_then(|s| s.checked_div(60))
            .and_then(|m| u32::try_from(m).ok())
            .unwrap_or(0);
        CalendarView {
            day,
            hour,
            minute,
            season: self.season_of(day),
            is_night: hour >= NIGHT_STARTS || hour < DAY_STARTS,
            sim_time: self.sim_time,
        }
    }

    /// Season on calendar `day` (1-based).
    fn season_of(&self, day: u64) -> Season {
        let index = day
            .saturating_sub(1)
            .checked_div(self.days_per_season)
            .unwrap_or(0)
            .checked_rem(4)
            .unwrap_or(0);
        usize::try_from(index)
            .ok()
            .and_then(|i| SEASONS.get(i))
            .copied()
            .unwrap_or(Season::Spring)
    }
}

/// Truncate non-negative seconds, treating NaN and negatives as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}
