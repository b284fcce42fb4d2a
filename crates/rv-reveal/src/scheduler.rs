//! Async reveal scheduler
//!
//! Thin tokio driver around [`RevealMachine`]. Exactly one deferred step is
//! pending at a time; it is aborted on every new play and on teardown. A step
//! that fires anyway (the abort raced its timer) is rejected by the machine's
//! epoch check.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use rv_core::{RvError, RvResult};
use rv_cue::CueHandle;
use rv_stage::{Cue, CueEvent, RevealScript};

use crate::machine::{RevealMachine, StepResult};
use crate::presentation::{Presentation, PresentationState};

struct Inner<V: Presentation> {
    machine: RevealMachine<V>,
    pending: Option<JoinHandle<()>>,
}

impl<V: Presentation> Inner<V> {
    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

/// How the most recently finished epoch ended: its settled snapshot, or
/// None when it was aborted.
type Finished<V> = Option<(u64, Option<PresentationState<V>>)>;

struct Shared<V: Presentation> {
    inner: Mutex<Inner<V>>,
    state_tx: watch::Sender<PresentationState<V>>,
    torn_tx: watch::Sender<bool>,
    finished_tx: watch::Sender<Finished<V>>,
    cues: Option<CueHandle>,
}

impl<V: Presentation> Shared<V> {
    fn publish(&self, inner: &Inner<V>) {
        self.state_tx.send_replace(inner.machine.snapshot());
    }

    fn finish(&self, epoch: u64, settled: Option<PresentationState<V>>) {
        self.finished_tx.send_replace(Some((epoch, settled)));
    }

    fn retire_below(&self, epoch: u64) {
        if let Some(handle) = &self.cues {
            handle.retire_below(epoch);
        }
    }

    fn fire(&self, epoch: u64, cues: &[CueEvent]) {
        if let Some(handle) = &self.cues {
            handle.fire_all(epoch, cues);
        }
    }
}

/// Re-entrant step chain: run step `index` of `epoch` after `delay`
fn schedule_next<V: Presentation>(
    shared: &Arc<Shared<V>>,
    inner: &mut Inner<V>,
    epoch: u64,
    index: usize,
    delay: Duration,
) {
    let weak = Arc::downgrade(shared);
    inner.pending = Some(tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        run_step(&weak, epoch, index);
    }));
}

fn run_step<V: Presentation>(weak: &Weak<Shared<V>>, epoch: u64, index: usize) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = shared.inner.lock();

    match inner.machine.advance(epoch, index) {
        StepResult::Stale => {}
        StepResult::Applied {
            cues,
            next: (next, delay),
        } => {
            shared.fire(epoch, &cues);
            shared.publish(&inner);
            schedule_next(&shared, &mut inner, epoch, next, delay);
        }
        StepResult::Settled { cues, cooldown } => {
            shared.fire(epoch, &cues);
            shared.finish(epoch, Some(inner.machine.snapshot()));
            shared.publish(&inner);
            log::debug!(
                "[Reveal] epoch {} settled, payout {:?}",
                epoch,
                inner.machine.state().payout
            );
            inner.pending = None;
            if let Some(pause) = cooldown {
                schedule_cooldown(&shared, &mut inner, epoch, pause);
            }
        }
    }
}

fn schedule_cooldown<V: Presentation>(
    shared: &Arc<Shared<V>>,
    inner: &mut Inner<V>,
    epoch: u64,
    pause: Duration,
) {
    let weak = Arc::downgrade(shared);
    inner.pending = Some(tokio::spawn(async move {
        tokio::time::sleep(pause).await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.inner.lock();
        if inner.machine.cool_down(epoch) {
            shared.publish(&inner);
        }
        inner.pending = None;
    }));
}

/// Epoch-guarded reveal scheduler for one game instance.
///
/// Must be used from within a tokio runtime. Dropping it tears it down.
pub struct RevealScheduler<V: Presentation> {
    shared: Arc<Shared<V>>,
}

impl<V: Presentation> RevealScheduler<V> {
    pub fn new(cues: Option<CueHandle>, cooldown: Option<Duration>) -> Self {
        let machine = RevealMachine::new(cooldown);
        let (state_tx, _) = watch::channel(machine.snapshot());
        let (torn_tx, _) = watch::channel(false);
        let (finished_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    machine,
                    pending: None,
                }),
                state_tx,
                torn_tx,
                finished_tx,
                cues,
            }),
        }
    }

    /// Start a new play: bump the epoch, cancel the pending step, reset to idle
    pub fn begin(&self) -> RvResult<u64> {
        let mut inner = self.shared.inner.lock();
        inner.cancel_pending();
        let epoch = inner.machine.begin()?;
        self.shared.retire_below(epoch);
        self.shared.publish(&inner);
        log::debug!("[Reveal] epoch {} begins", epoch);
        Ok(epoch)
    }

    /// Enter flight and fire the spin cue
    pub fn start_flight(&self, epoch: u64) -> bool {
        let mut inner = self.shared.inner.lock();
        if !inner.machine.start_flight(epoch) {
            return false;
        }
        self.shared.fire(epoch, &[CueEvent::new(Cue::Spin)]);
        self.shared.publish(&inner);
        true
    }

    /// Play `script` back under `epoch`. False if the epoch is no longer current.
    pub fn reveal(&self, epoch: u64, script: RevealScript<V::Action>) -> bool {
        let mut inner = self.shared.inner.lock();
        let Some(delay) = inner.machine.load(epoch, script) else {
            log::trace!("[Reveal] discarding script for stale epoch {}", epoch);
            return false;
        };
        self.shared.publish(&inner);
        schedule_next(&self.shared, &mut inner, epoch, 0, delay);
        true
    }

    /// Begin a new play and reveal `script` under it
    pub fn play(&self, script: RevealScript<V::Action>) -> RvResult<u64> {
        let epoch = self.begin()?;
        self.reveal(epoch, script);
        Ok(epoch)
    }

    /// Abort `epoch` after a failure: reset to idle, record the error, fire the error cue
    pub fn abort(&self, epoch: u64, error: &RvError) -> bool {
        let mut inner = self.shared.inner.lock();
        if !inner.machine.abort(epoch, error) {
            return false;
        }
        inner.cancel_pending();
        self.shared.fire(epoch, &[CueEvent::new(Cue::Error)]);
        self.shared.finish(epoch, None);
        self.shared.publish(&inner);
        true
    }

    /// Cancel everything. No mutation or cue happens afterwards. Idempotent.
    pub fn teardown(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.machine.is_torn_down() {
            return;
        }
        inner.machine.teardown();
        inner.cancel_pending();
        if let Some(handle) = &self.shared.cues {
            handle.retire_all();
        }
        self.shared.torn_tx.send_replace(true);
        log::debug!(
            "[Reveal] torn down at epoch {}",
            inner.machine.current_epoch()
        );
    }

    pub fn snapshot(&self) -> PresentationState<V> {
        self.shared.inner.lock().machine.snapshot()
    }

    /// Observe every state change
    pub fn subscribe(&self) -> watch::Receiver<PresentationState<V>> {
        self.shared.state_tx.subscribe()
    }

    pub fn current_epoch(&self) -> u64 {
        self.shared.inner.lock().machine.current_epoch()
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.inner.lock().machine.is_torn_down()
    }

    /// Wait until `epoch` settles and return its settled snapshot, even if it
    /// has cooled down since. None if it is aborted, superseded or torn down.
    pub async fn settled(&self, epoch: u64) -> Option<PresentationState<V>> {
        let mut state_rx = self.subscribe();
        let mut torn_rx = self.shared.torn_tx.subscribe();
        let mut finished_rx = self.shared.finished_tx.subscribe();
        loop {
            if *torn_rx.borrow_and_update() {
                return None;
            }
            if let Some((finished, settled)) = &*finished_rx.borrow_and_update() {
                if *finished == epoch {
                    return settled.clone();
                }
            }
            {
                let state = state_rx.borrow_and_update();
                if state.epoch > epoch {
                    return None;
                }
                if state.epoch == epoch && state.is_settled() {
                    return Some(state.clone());
                }
            }
            tokio::select! {
                changed = state_rx.changed() => changed.ok()?,
                changed = torn_rx.changed() => changed.ok()?,
                changed = finished_rx.changed() => changed.ok()?,
            }
        }
    }
}

impl<V: Presentation> Drop for RevealScheduler<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}
