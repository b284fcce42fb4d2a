//! Output backends
//!
//! The dispatcher never knows what actually makes noise. Hosts plug in an
//! [`AudioSink`] and a [`ParticleEmitter`]; this module ships a silent pair,
//! a logging pair and a recorder for tests.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use rv_stage::Cue;

/// Why a backend could not honour a cue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueFailure {
    /// Playback blocked by the host (autoplay policy, focus)
    #[error("playback not permitted: {0}")]
    NotPermitted(String),

    #[error("no asset registered for cue '{0}'")]
    MissingAsset(&'static str),

    #[error("backend error: {0}")]
    Backend(String),
}

/// A resolved sound to play
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundRequest {
    pub epoch: u64,
    pub cue: Cue,
    pub asset: String,
    pub volume: f32,
    pub rate: f32,
}

/// A resolved particle burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BurstRequest {
    pub epoch: u64,
    pub cue: Cue,
    pub color: u32,
    pub count: u32,
}

pub trait AudioSink: Send {
    fn play(&mut self, request: &SoundRequest) -> Result<(), CueFailure>;
}

pub trait ParticleEmitter: Send {
    fn burst(&mut self, request: &BurstRequest) -> Result<(), CueFailure>;
}

/// Swallows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _request: &SoundRequest) -> Result<(), CueFailure> {
        Ok(())
    }
}

impl ParticleEmitter for NullSink {
    fn burst(&mut self, _request: &BurstRequest) -> Result<(), CueFailure> {
        Ok(())
    }
}

/// Writes every cue to the log at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, request: &SoundRequest) -> Result<(), CueFailure> {
        log::info!(
            "[Cue] epoch {} {} -> {} (vol {:.2}, rate {:.2})",
            request.epoch,
            request.cue.name(),
            request.asset,
            request.volume,
            request.rate
        );
        Ok(())
    }
}

impl ParticleEmitter for LogSink {
    fn burst(&mut self, request: &BurstRequest) -> Result<(), CueFailure> {
        log::info!(
            "[Cue] epoch {} {} burst #{:06X} x{}",
            request.epoch,
            request.cue.name(),
            request.color,
            request.count
        );
        Ok(())
    }
}

/// Something a [`RecordingSink`] saw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recorded {
    Sound(SoundRequest),
    Burst(BurstRequest),
}

impl Recorded {
    pub fn cue(&self) -> Cue {
        match self {
            Self::Sound(s) => s.cue,
            Self::Burst(b) => b.cue,
        }
    }

    pub fn epoch(&self) -> u64 {
        match self {
            Self::Sound(s) => s.epoch,
            Self::Burst(b) => b.epoch,
        }
    }
}

/// Records sounds and bursts in arrival order.
///
/// Clones share the same log, so one clone can be handed to the processor
/// and another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Recorded> {
        self.log.lock().clone()
    }

    /// Cues of the recorded sounds, in order
    pub fn sounds(&self) -> Vec<Cue> {
        self.log
            .lock()
            .iter()
            .filter_map(|r| match r {
                Recorded::Sound(s) => Some(s.cue),
                Recorded::Burst(_) => None,
            })
            .collect()
    }

    pub fn bursts(&self) -> Vec<BurstRequest> {
        self.log
            .lock()
            .iter()
            .filter_map(|r| match r {
                Recorded::Burst(b) => Some(*b),
                Recorded::Sound(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, request: &SoundRequest) -> Result<(), CueFailure> {
        self.log.lock().push(Recorded::Sound(request.clone()));
        Ok(())
    }
}

impl ParticleEmitter for RecordingSink {
    fn burst(&mut self, request: &BurstRequest) -> Result<(), CueFailure> {
        self.log.lock().push(Recorded::Burst(*request));
        Ok(())
    }
}
