//! Sound registry: which asset (and burst) each cue maps to

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rv_stage::{Cue, ParticleBurst};

/// A playable sound plus its default burst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundAsset {
    /// Asset name handed to the audio backend
    pub name: String,
    /// Base volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Burst fired alongside the sound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst: Option<ParticleBurst>,
}

fn default_volume() -> f32 {
    1.0
}

impl SoundAsset {
    pub fn new(name: impl Into<String>, volume: f32) -> Self {
        Self {
            name: name.into(),
            volume: volume.clamp(0.0, 1.0),
            burst: None,
        }
    }

    pub fn with_burst(mut self, color: u32, count: u32) -> Self {
        self.burst = Some(ParticleBurst::new(color, count));
        self
    }
}

/// Cue → asset lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundRegistry {
    assets: HashMap<Cue, SoundAsset>,
}

impl SoundRegistry {
    /// Empty registry (every cue is a missing asset)
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock casino sound set covering the full vocabulary
    pub fn default_casino() -> Self {
        let mut registry = Self::new();
        registry.insert(Cue::Spin, SoundAsset::new("spin_loop", 0.6));
        registry.insert(Cue::Card, SoundAsset::new("card_flip", 0.8));
        registry.insert(Cue::Lock, SoundAsset::new("reel_stop", 0.7));
        registry.insert(Cue::Tick, SoundAsset::new("chart_tick", 0.3));
        registry.insert(Cue::Reveal, SoundAsset::new("reveal_swell", 0.8));
        registry.insert(
            Cue::Win,
            SoundAsset::new("win_chime", 1.0).with_burst(ParticleBurst::GREEN, 40),
        );
        registry.insert(Cue::Lose, SoundAsset::new("lose_thud", 0.6));
        registry.insert(
            Cue::Jackpot,
            SoundAsset::new("jackpot_fanfare", 1.0).with_burst(ParticleBurst::GOLD, 120),
        );
        registry.insert(
            Cue::Crash,
            SoundAsset::new("crash_boom", 0.9).with_burst(ParticleBurst::RED, 60),
        );
        registry.insert(
            Cue::Moon,
            SoundAsset::new("moon_rise", 0.9).with_burst(ParticleBurst::GOLD, 80),
        );
        registry.insert(Cue::Error, SoundAsset::new("error_buzz", 0.5));
        registry
    }

    pub fn insert(&mut self, cue: Cue, asset: SoundAsset) -> Option<SoundAsset> {
        self.assets.insert(cue, asset)
    }

    pub fn remove(&mut self, cue: Cue) -> Option<SoundAsset> {
        self.assets.remove(&cue)
    }

    pub fn get(&self, cue: Cue) -> Option<&SoundAsset> {
        self.assets.get(&cue)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Load from JSON, e.g. `{"win": {"name": "win_chime", "volume": 0.9}}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_vocabulary() {
        let registry = SoundRegistry::default_casino();
        for cue in Cue::ALL {
            assert!(registry.get(cue).is_some(), "missing {}", cue.name());
        }
        assert_eq!(
            registry.get(Cue::Jackpot).and_then(|a| a.burst),
            Some(ParticleBurst::new(ParticleBurst::GOLD, 120))
        );
    }

    #[test]
    fn test_json_overrides() {
        let registry =
            SoundRegistry::from_json(r#"{"win": {"name": "coins"}, "lose": {"name": "sad", "volume": 0.2}}"#)
                .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(Cue::Win).unwrap().volume, 1.0);
        assert_eq!(registry.get(Cue::Lose).unwrap().name, "sad");
        assert!(registry.get(Cue::Spin).is_none());

        let back = SoundRegistry::from_json(&registry.to_json().unwrap()).unwrap();
        assert_eq!(back, registry);
    }
}
