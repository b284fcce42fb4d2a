//! Cue vocabulary: the fixed set of side effects a reveal step can request

use serde::{Deserialize, Serialize};

/// Named audio/visual side effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Spin/launch loop started (flight)
    Spin,
    /// Card dealt or flipped
    Card,
    /// Reel locked on its symbol
    Lock,
    /// Chart advanced one candle
    Tick,
    /// Hidden information revealed (hole card, wheel landing)
    Reveal,
    /// Winning settle
    Win,
    /// Losing settle
    Lose,
    /// Top-tier win
    Jackpot,
    /// Chart crashed
    Crash,
    /// Chart passed the player's target
    Moon,
    /// Resolution failed
    Error,
}

impl Cue {
    pub const ALL: [Cue; 11] = [
        Cue::Spin,
        Cue::Card,
        Cue::Lock,
        Cue::Tick,
        Cue::Reveal,
        Cue::Win,
        Cue::Lose,
        Cue::Jackpot,
        Cue::Crash,
        Cue::Moon,
        Cue::Error,
    ];

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::Card => "card",
            Self::Lock => "lock",
            Self::Tick => "tick",
            Self::Reveal => "reveal",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Jackpot => "jackpot",
            Self::Crash => "crash",
            Self::Moon => "moon",
            Self::Error => "error",
        }
    }

    /// Parse from canonical name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == lower)
    }

    /// Does this cue mark the end of a play?
    pub fn is_settle(&self) -> bool {
        matches!(self, Self::Win | Self::Lose | Self::Jackpot)
    }
}

/// Transient particle burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleBurst {
    /// 0xRRGGBB
    pub color: u32,
    pub count: u32,
}

impl ParticleBurst {
    pub const GOLD: u32 = 0xFFD700;
    pub const GREEN: u32 = 0x22C55E;
    pub const RED: u32 = 0xEF4444;

    pub fn new(color: u32, count: u32) -> Self {
        Self { color, count }
    }
}

/// Optional per-firing parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CueParams {
    /// Volume override (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,

    /// Playback rate override (pitch up on rising charts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,

    /// Burst override; the registry default applies otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst: Option<ParticleBurst>,
}

/// A cue with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueEvent {
    pub cue: Cue,
    #[serde(default)]
    pub params: CueParams,
}

impl CueEvent {
    pub fn new(cue: Cue) -> Self {
        Self {
            cue,
            params: CueParams::default(),
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.params.volume = Some(volume.clamp(0.0, 1.0));
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.params.rate = Some(rate);
        self
    }

    pub fn with_burst(mut self, color: u32, count: u32) -> Self {
        self.params.burst = Some(ParticleBurst::new(color, count));
        self
    }
}

impl From<Cue> for CueEvent {
    fn from(cue: Cue) -> Self {
        Self::new(cue)
    }
}
