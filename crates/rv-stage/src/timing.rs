//! Timing profiles for reveal sequences

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (short but audible, for cue tuning)
    Studio,
    /// Instant (no delays, for testing)
    Instant,
    /// Custom timing (scaled or hand-written)
    Custom,
}

/// Detailed timing configuration (all values in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Minimum perceived flight (spin/launch) before a spin-first result shows
    pub min_flight_ms: f64,

    /// Delay before the first card is dealt
    pub first_card_delay_ms: f64,

    /// Delay between dealt cards
    pub card_interval_ms: f64,

    /// Delay before the dealer's hole card flips
    pub hole_reveal_delay_ms: f64,

    /// Delay before the first reel locks once the result is known
    pub first_lock_delay_ms: f64,

    /// Delay between reel locks
    pub lock_interval_ms: f64,

    /// Wheel deceleration from flight speed to landing
    pub wheel_settle_ms: f64,

    /// Delay between chart candles
    pub chart_tick_ms: f64,

    /// Delay between the last reveal step and the settle
    pub settle_delay_ms: f64,

    /// Pause on the settled state before returning to idle (0 = stay settled)
    pub cooldown_ms: f64,

    /// Minimum time between two non-zero steps
    pub min_step_interval_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            min_flight_ms: 1200.0,
            first_card_delay_ms: 150.0,
            card_interval_ms: 400.0,
            hole_reveal_delay_ms: 700.0,
            first_lock_delay_ms: 200.0,
            lock_interval_ms: 350.0,
            wheel_settle_ms: 2500.0,
            chart_tick_ms: 120.0,
            settle_delay_ms: 300.0,
            cooldown_ms: 2500.0,
            min_step_interval_ms: 30.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            min_flight_ms: 500.0,
            first_card_delay_ms: 50.0,
            card_interval_ms: 150.0,
            hole_reveal_delay_ms: 250.0,
            first_lock_delay_ms: 80.0,
            lock_interval_ms: 120.0,
            wheel_settle_ms: 900.0,
            chart_tick_ms: 50.0,
            settle_delay_ms: 100.0,
            cooldown_ms: 1000.0,
            min_step_interval_ms: 15.0,
        }
    }

    /// Studio mode (short, every cue still separable by ear)
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            min_flight_ms: 600.0,
            first_card_delay_ms: 100.0,
            card_interval_ms: 250.0,
            hole_reveal_delay_ms: 350.0,
            first_lock_delay_ms: 100.0,
            lock_interval_ms: 250.0,
            wheel_settle_ms: 1200.0,
            chart_tick_ms: 80.0,
            settle_delay_ms: 150.0,
            cooldown_ms: 0.0,
            min_step_interval_ms: 50.0, // Minimum gap for audio playback latency
        }
    }

    /// Instant (every delay zero)
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            min_flight_ms: 0.0,
            first_card_delay_ms: 0.0,
            card_interval_ms: 0.0,
            hole_reveal_delay_ms: 0.0,
            first_lock_delay_ms: 0.0,
            lock_interval_ms: 0.0,
            wheel_settle_ms: 0.0,
            chart_tick_ms: 0.0,
            settle_delay_ms: 0.0,
            cooldown_ms: 0.0,
            min_step_interval_ms: 0.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            min_flight_ms: self.min_flight_ms * factor,
            first_card_delay_ms: self.first_card_delay_ms * factor,
            card_interval_ms: self.card_interval_ms * factor,
            hole_reveal_delay_ms: self.hole_reveal_delay_ms * factor,
            first_lock_delay_ms: self.first_lock_delay_ms * factor,
            lock_interval_ms: self.lock_interval_ms * factor,
            wheel_settle_ms: self.wheel_settle_ms * factor,
            chart_tick_ms: self.chart_tick_ms * factor,
            settle_delay_ms: self.settle_delay_ms * factor,
            cooldown_ms: self.cooldown_ms * factor,
            min_step_interval_ms: self.min_step_interval_ms * factor,
        }
    }

    /// Minimum flight as a duration
    pub fn min_flight(&self) -> Duration {
        ms(self.min_flight_ms)
    }

    /// Cooldown, if enabled
    pub fn cooldown(&self) -> Option<Duration> {
        (self.cooldown_ms > 0.0).then(|| ms(self.cooldown_ms))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Convert milliseconds to a duration, clamping negatives and NaN to zero
pub fn ms(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_micros((value * 1000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// Delay planner for building step lists.
///
/// Hands out per-step delays while enforcing the minimum step interval and
/// tracking the total offset from the start of the reveal.
#[derive(Debug, Clone)]
pub struct DelayPlanner {
    elapsed_ms: f64,
    config: TimingConfig,
}

impl DelayPlanner {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            elapsed_ms: 0.0,
            config,
        }
    }

    /// Offset of the last planned step from the reveal start
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Plan a step `delay_ms` after the previous one.
    ///
    /// Zero stays zero (simultaneous steps); anything else is raised to the
    /// minimum step interval.
    pub fn after(&mut self, delay_ms: f64) -> Duration {
        let delay = if delay_ms > 0.0 {
            delay_ms.max(self.config.min_step_interval_ms)
        } else {
            0.0
        };
        self.elapsed_ms += delay;
        ms(delay)
    }

    pub fn first_card(&mut self) -> Duration {
        self.after(self.config.first_card_delay_ms)
    }

    pub fn card(&mut self) -> Duration {
        self.after(self.config.card_interval_ms)
    }

    pub fn hole_reveal(&mut self) -> Duration {
        self.after(self.config.hole_reveal_delay_ms)
    }

    /// Reel lock (first reel uses the initial delay)
    pub fn reel_lock(&mut self, reel_index: usize) -> Duration {
        if reel_index == 0 {
            self.after(self.config.first_lock_delay_ms)
        } else {
            self.after(self.config.lock_interval_ms)
        }
    }

    pub fn wheel_settle(&mut self) -> Duration {
        self.after(self.config.wheel_settle_ms)
    }

    pub fn chart_tick(&mut self) -> Duration {
        self.after(self.config.chart_tick_ms)
    }

    pub fn settle(&mut self) -> Duration {
        self.after(self.config.settle_delay_ms)
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let studio = TimingConfig::studio();

        assert!(turbo.min_flight_ms < normal.min_flight_ms);
        assert!(turbo.card_interval_ms < normal.card_interval_ms);
        assert!(studio.min_step_interval_ms > turbo.min_step_interval_ms);
        assert_eq!(studio.cooldown(), None);
        assert_eq!(normal.cooldown(), Some(Duration::from_millis(2500)));
        assert_eq!(TimingConfig::instant().min_flight(), Duration::ZERO);
    }

    #[test]
    fn test_scaled_is_custom() {
        let half = TimingConfig::normal().scaled(0.5);
        assert_eq!(half.profile, TimingProfile::Custom);
        assert_eq!(half.min_flight_ms, 600.0);
        assert_eq!(TimingConfig::normal().scaled(-1.0).card_interval_ms, 0.0);
    }

    #[test]
    fn test_delay_planner_enforces_min_interval() {
        let mut planner = DelayPlanner::new(TimingConfig::studio());
        assert_eq!(planner.after(0.0), Duration::ZERO);
        assert_eq!(planner.after(10.0), Duration::from_millis(50));
        assert_eq!(planner.reel_lock(0), Duration::from_millis(100));
        assert_eq!(planner.reel_lock(1), Duration::from_millis(250));
        assert_eq!(planner.elapsed_ms(), 400.0);
    }

    #[test]
    fn test_ms_clamps_invalid() {
        assert_eq!(ms(-5.0), Duration::ZERO);
        assert_eq!(ms(f64::NAN), Duration::ZERO);
        assert_eq!(ms(1500.0), Duration::from_millis(1500));
    }
}
