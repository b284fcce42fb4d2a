//! Engine configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rv_core::{RvError, RvResult, WagerLimits};
use rv_cue::CUE_QUEUE_CAPACITY;
use rv_stage::{TimingConfig, TimingProfile};
use rv_synth::DEFAULT_MAX_ATTEMPTS;

/// Per-instance engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timing_profile: TimingProfile,
    /// Applied on top of the profile (< 1.0 = faster)
    pub timing_scale: f64,
    pub limits: WagerLimits,
    /// Upper bound on one oracle round trip
    pub resolve_timeout_ms: u64,
    pub cue_queue_capacity: usize,
    /// Rejection sampling budget before the constructive fallback
    pub max_synthesis_attempts: u32,
    /// Return to idle after a settled play
    pub cooldown: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timing_profile: TimingProfile::Normal,
            timing_scale: 1.0,
            limits: WagerLimits::default(),
            resolve_timeout_ms: 15_000,
            cue_queue_capacity: CUE_QUEUE_CAPACITY,
            max_synthesis_attempts: DEFAULT_MAX_ATTEMPTS,
            cooldown: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> RvResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RvError::Config(format!("invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> RvResult<Self> {
        let config: Self = serde_yml::from_str(yaml)
            .map_err(|e| RvError::Config(format!("invalid YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> RvResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn validate(&self) -> RvResult<()> {
        if !self.timing_scale.is_finite() || self.timing_scale < 0.0 {
            return Err(RvError::Config(format!(
                "timing_scale must be a non-negative number, got {}",
                self.timing_scale
            )));
        }
        if self.resolve_timeout_ms == 0 {
            return Err(RvError::Config("resolve_timeout_ms must be positive".into()));
        }
        if self.cue_queue_capacity == 0 {
            return Err(RvError::Config("cue_queue_capacity must be positive".into()));
        }
        let WagerLimits {
            min_wager,
            max_payout,
        } = self.limits;
        if max_payout.is_nan() || max_payout <= 0.0 || min_wager.is_nan() || min_wager < 0.0 {
            return Err(RvError::Config(format!(
                "invalid wager limits {:?}",
                self.limits
            )));
        }
        Ok(())
    }

    /// Timing for the configured profile, scale and cooldown
    pub fn timing(&self) -> TimingConfig {
        let base = TimingConfig::from_profile(self.timing_profile);
        let mut timing = if (self.timing_scale - 1.0).abs() > f64::EPSILON {
            base.scaled(self.timing_scale)
        } else {
            base
        };
        if !self.cooldown {
            timing.cooldown_ms = 0.0;
        }
        timing
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing(), TimingConfig::normal());
        assert_eq!(config.resolve_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_json_partial_override() {
        let config = EngineConfig::from_json_str(
            r#"{"timing_profile": "turbo", "resolve_timeout_ms": 500, "limits": {"max_payout": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.timing_profile, TimingProfile::Turbo);
        assert_eq!(config.resolve_timeout_ms, 500);
        assert_relative_eq!(config.limits.max_payout, 50.0);
        assert_relative_eq!(config.limits.min_wager, 0.01);
        assert_eq!(config.max_synthesis_attempts, 100);
    }

    #[test]
    fn test_yaml_scale_and_cooldown() {
        let config = EngineConfig::from_yaml_str(
            "timing_profile: normal\ntiming_scale: 0.5\ncooldown: false\n",
        )
        .unwrap();
        let timing = config.timing();
        assert_eq!(timing.profile, TimingProfile::Custom);
        assert_relative_eq!(timing.min_flight_ms, 600.0);
        assert_eq!(timing.cooldown(), None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::from_json_str(r#"{"resolve_timeout_ms": 0}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"timing_scale": -1}"#).is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
        assert!(matches!(
            EngineConfig::from_file("/definitely/not/here.json"),
            Err(RvError::Config(_))
        ));
    }
}
