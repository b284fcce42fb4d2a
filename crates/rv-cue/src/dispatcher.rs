//! Cue dispatcher: handle/processor pair over a bounded ring buffer

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};
use serde::Serialize;

use rv_stage::CueEvent;

use crate::backend::{AudioSink, BurstRequest, CueFailure, ParticleEmitter, SoundRequest};
use crate::registry::SoundRegistry;

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default command queue capacity
pub const CUE_QUEUE_CAPACITY: usize = 256;

/// A cue requested by a reveal step of `epoch`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueCommand {
    pub epoch: u64,
    pub event: CueEvent,
}

/// Dispatcher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CueStats {
    /// Accepted onto the queue
    pub queued: u64,
    /// Rejected because the queue was full
    pub dropped: u64,
    /// Delivered by the processor without error
    pub delivered: u64,
    /// Processed with at least one backend failure
    pub failed: u64,
    /// Discarded because their epoch was retired before delivery
    pub stale: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct CueShared {
    muted: AtomicBool,
    /// Commands below this epoch are never delivered
    epoch_floor: AtomicU64,
    /// Set on teardown: nothing is delivered any more
    retired: AtomicBool,
    queued: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    stale: AtomicU64,
}

impl CueShared {
    fn stats(&self) -> CueStats {
        CueStats {
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.retired.load(Ordering::Acquire) || epoch < self.epoch_floor.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Cloneable, thread-safe handle for firing cues
#[derive(Clone)]
pub struct CueHandle {
    command_tx: Arc<Mutex<Producer<CueCommand>>>,
    shared: Arc<CueShared>,
}

impl std::fmt::Debug for CueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueHandle")
            .field("stats", &self.stats())
            .field("muted", &self.is_muted())
            .finish()
    }
}

impl CueHandle {
    /// Fire-and-forget. Returns false if the cue was dropped: queue full or
    /// epoch retired.
    pub fn fire(&self, epoch: u64, event: impl Into<CueEvent>) -> bool {
        let event = event.into();
        if self.shared.is_stale(epoch) {
            self.shared.stale.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        let mut tx = self.command_tx.lock();
        match tx.push(CueCommand { epoch, event }) {
            Ok(()) => {
                self.shared.queued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "[Cue] queue full, dropping '{}' (epoch {})",
                    event.cue.name(),
                    epoch
                );
                false
            }
        }
    }

    /// Fire several cues in order
    pub fn fire_all<'a>(&self, epoch: u64, events: impl IntoIterator<Item = &'a CueEvent>) {
        for event in events {
            self.fire(epoch, *event);
        }
    }

    /// Discard every cue of an epoch below `epoch`, queued or not.
    ///
    /// The floor only rises. A dispatcher serves one game instance, so every
    /// clone shares it.
    pub fn retire_below(&self, epoch: u64) {
        self.shared.epoch_floor.fetch_max(epoch, Ordering::AcqRel);
    }

    /// Discard everything from now on (teardown)
    pub fn retire_all(&self) {
        self.shared.retired.store(true, Ordering::Release);
    }

    pub fn is_retired(&self) -> bool {
        self.shared.retired.load(Ordering::Acquire)
    }

    /// Mute audio; particle bursts still fire
    pub fn set_muted(&self, muted: bool) {
        self.shared.muted.store(muted, Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.shared.muted.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CueStats {
        self.shared.stats()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROCESSOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Single owner of the backends; drains the queue
pub struct CueProcessor {
    shared: Arc<CueShared>,
    command_rx: Consumer<CueCommand>,
    registry: SoundRegistry,
    audio: Box<dyn AudioSink>,
    particles: Box<dyn ParticleEmitter>,
}

impl CueProcessor {
    pub fn registry(&self) -> &SoundRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SoundRegistry {
        &mut self.registry
    }

    /// Same counters the handles see
    pub fn stats(&self) -> CueStats {
        self.shared.stats()
    }

    /// Drain every pending command. Returns how many were processed,
    /// stale ones included.
    pub fn process(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(cmd) = self.command_rx.pop() {
            processed += 1;
            if self.shared.is_stale(cmd.epoch) {
                self.shared.stale.fetch_add(1, Ordering::Relaxed);
                log::trace!(
                    "[Cue] discarding '{}' of retired epoch {}",
                    cmd.event.cue.name(),
                    cmd.epoch
                );
                continue;
            }
            match self.deliver(&cmd) {
                Ok(()) => {
                    self.shared.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    self.shared.failed.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "[Cue] '{}' (epoch {}) failed: {}",
                        cmd.event.cue.name(),
                        cmd.epoch,
                        err
                    );
                }
            }
        }
        processed
    }

    fn deliver(&mut self, cmd: &CueCommand) -> Result<(), CueFailure> {
        let cue = cmd.event.cue;
        let params = cmd.event.params;
        let asset = self
            .registry
            .get(cue)
            .ok_or(CueFailure::MissingAsset(cue.name()))?;

        let burst = params.burst.or(asset.burst);
        let sound = (!self.shared.muted.load(Ordering::Relaxed)).then(|| SoundRequest {
            epoch: cmd.epoch,
            cue,
            asset: asset.name.clone(),
            volume: (asset.volume * params.volume.unwrap_or(1.0)).clamp(0.0, 1.0),
            rate: params.rate.unwrap_or(1.0),
        });

        // Both outputs are attempted even if the first fails
        let played = match sound {
            Some(request) => self.audio.play(&request),
            None => Ok(()),
        };
        let burst = match burst {
            Some(b) => self.particles.burst(&BurstRequest {
                epoch: cmd.epoch,
                cue,
                color: b.color,
                count: b.count,
            }),
            None => Ok(()),
        };
        played.and(burst)
    }

    /// True once every handle is gone and the queue is empty
    pub fn is_finished(&self) -> bool {
        self.command_rx.is_abandoned() && self.command_rx.is_empty()
    }

    /// Pump the queue every `period` until all handles are dropped
    pub async fn run(mut self, period: Duration) {
        let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.process();
            if self.is_finished() {
                log::debug!("[Cue] all handles dropped, processor stopping");
                break;
            }
        }
    }
}

/// Create a dispatcher
///
/// Returns a tuple of:
/// - `CueHandle`: cloneable handle for schedulers
/// - `CueProcessor`: owner of the backends, drive it with `process()` or `run()`
pub fn create_cue_dispatcher(
    capacity: usize,
    registry: SoundRegistry,
    audio: Box<dyn AudioSink>,
    particles: Box<dyn ParticleEmitter>,
) -> (CueHandle, CueProcessor) {
    let (command_tx, command_rx) = RingBuffer::new(capacity.max(1));
    let shared = Arc::new(CueShared::default());

    let handle = CueHandle {
        command_tx: Arc::new(Mutex::new(command_tx)),
        shared: Arc::clone(&shared),
    };

    let processor = CueProcessor {
        shared,
        command_rx,
        registry,
        audio,
        particles,
    };

    (handle, processor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NullSink, RecordingSink};
    use rv_stage::{Cue, ParticleBurst};

    struct BlockedAudio;

    impl AudioSink for BlockedAudio {
        fn play(&mut self, _request: &SoundRequest) -> Result<(), CueFailure> {
            Err(CueFailure::NotPermitted("autoplay".into()))
        }
    }

    fn recording(capacity: usize) -> (CueHandle, CueProcessor, RecordingSink) {
        let sink = RecordingSink::new();
        let (handle, processor) = create_cue_dispatcher(
            capacity,
            SoundRegistry::default_casino(),
            Box::new(sink.clone()),
            Box::new(sink.clone()),
        );
        (handle, processor, sink)
    }

    #[test]
    fn test_cues_delivered_in_order() {
        let (handle, mut processor, sink) = recording(16);
        assert!(handle.fire(1, Cue::Card));
        assert!(handle.fire(1, Cue::Card));
        assert!(handle.fire(1, Cue::Win));

        assert_eq!(processor.process(), 3);
        assert_eq!(sink.sounds(), vec![Cue::Card, Cue::Card, Cue::Win]);
        // Win carries the registry burst
        assert_eq!(sink.bursts().len(), 1);
        assert_eq!(sink.bursts()[0].color, ParticleBurst::GREEN);
        assert_eq!(handle.stats().delivered, 3);
    }

    #[test]
    fn test_full_queue_drops() {
        let (handle, mut processor, sink) = recording(2);
        assert!(handle.fire(1, Cue::Spin));
        assert!(handle.fire(1, Cue::Lock));
        assert!(!handle.fire(1, Cue::Win));

        processor.process();
        assert_eq!(sink.sounds(), vec![Cue::Spin, Cue::Lock]);
        let stats = handle.stats();
        assert_eq!(stats.queued, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let particles = RecordingSink::new();
        let (handle, mut processor) = create_cue_dispatcher(
            8,
            SoundRegistry::default_casino(),
            Box::new(BlockedAudio),
            Box::new(particles.clone()),
        );
        handle.fire(2, Cue::Jackpot);
        handle.fire(2, Cue::Lose);

        assert_eq!(processor.process(), 2);
        assert_eq!(handle.stats().failed, 2);
        // Burst still went out although audio was blocked
        assert_eq!(particles.bursts().len(), 1);
    }

    #[test]
    fn test_missing_asset() {
        let (handle, mut processor) = create_cue_dispatcher(
            8,
            SoundRegistry::new(),
            Box::new(NullSink),
            Box::new(NullSink),
        );
        handle.fire(1, Cue::Reveal);
        processor.process();
        assert_eq!(handle.stats().failed, 1);
        assert_eq!(handle.stats().delivered, 0);
    }

    #[test]
    fn test_mute_keeps_bursts_and_params_apply() {
        let (handle, mut processor, sink) = recording(8);
        handle.fire(3, CueEvent::new(Cue::Tick).with_volume(0.5).with_rate(1.5));
        processor.process();
        match &sink.entries()[0] {
            crate::Recorded::Sound(s) => {
                assert!((s.volume - 0.15).abs() < 1e-6);
                assert_eq!(s.rate, 1.5);
                assert_eq!(s.epoch, 3);
            }
            other => panic!("expected sound, got {:?}", other),
        }

        sink.clear();
        handle.set_muted(true);
        handle.fire(3, Cue::Moon);
        processor.process();
        assert!(sink.sounds().is_empty());
        assert_eq!(sink.bursts().len(), 1);
    }

    #[test]
    fn test_queued_cues_of_retired_epoch_are_discarded() {
        let (handle, mut processor, sink) = recording(16);
        handle.fire(1, Cue::Card);
        handle.fire(1, Cue::Card);
        handle.retire_below(2);
        handle.fire(2, Cue::Card);
        // Late fire from the old epoch is refused outright
        assert!(!handle.fire(1, Cue::Win));

        assert_eq!(processor.process(), 3);
        assert!(sink.entries().iter().all(|r| r.epoch() == 2));
        assert_eq!(sink.sounds(), vec![Cue::Card]);
        let stats = handle.stats();
        assert_eq!(stats.stale, 3);
        assert_eq!(stats.delivered, 1);

        // The floor never goes back down
        handle.retire_below(1);
        handle.fire(1, Cue::Lose);
        processor.process();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_retire_all_silences_queue() {
        let (handle, mut processor, sink) = recording(16);
        handle.fire(4, Cue::Spin);
        handle.fire(4, Cue::Lock);
        handle.retire_all();
        assert!(handle.is_retired());
        assert!(!handle.fire(5, Cue::Win));

        processor.process();
        assert!(sink.is_empty());
        assert_eq!(handle.stats().stale, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_handles_dropped() {
        let (handle, processor, sink) = recording(8);
        let task = tokio::spawn(processor.run(Duration::from_millis(10)));

        handle.fire(1, Cue::Spin);
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(sink.sounds(), vec![Cue::Spin]);

        drop(handle);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
