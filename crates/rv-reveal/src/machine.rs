//! Reveal state machine
//!
//! All epoch guarding lives here, free of timers: the scheduler only decides
//! *when* to call [`RevealMachine::advance`], the machine decides whether the
//! call still means anything.

use std::time::Duration;

use rv_core::{RvError, RvResult};
use rv_stage::{CueEvent, RevealScript};

use crate::epoch::PlayEpoch;
use crate::presentation::{Phase, Presentation, PresentationState};

/// What a call to [`RevealMachine::advance`] did
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Superseded epoch, torn down, or out-of-order index. Nothing changed.
    Stale,
    /// Step applied; `next` is the following index and its delay
    Applied {
        cues: Vec<CueEvent>,
        next: (usize, Duration),
    },
    /// Final step applied and the play settled
    Settled {
        cues: Vec<CueEvent>,
        cooldown: Option<Duration>,
    },
}

pub struct RevealMachine<V: Presentation> {
    epoch: PlayEpoch,
    state: PresentationState<V>,
    script: Option<RevealScript<V::Action>>,
    next_index: usize,
    cooldown: Option<Duration>,
    torn_down: bool,
}

impl<V: Presentation> RevealMachine<V> {
    pub fn new(cooldown: Option<Duration>) -> Self {
        Self {
            epoch: PlayEpoch::new(),
            state: PresentationState::default(),
            script: None,
            next_index: 0,
            cooldown,
            torn_down: false,
        }
    }

    pub fn current_epoch(&self) -> u64 {
        self.epoch.current()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn state(&self) -> &PresentationState<V> {
        &self.state
    }

    pub fn snapshot(&self) -> PresentationState<V> {
        self.state.clone()
    }

    fn is_live(&self, epoch: u64) -> bool {
        !self.torn_down && self.epoch.is_current(epoch)
    }

    /// Start a new play: bump the epoch, drop the old script, reset to idle
    pub fn begin(&mut self) -> RvResult<u64> {
        if self.torn_down {
            return Err(RvError::TornDown);
        }
        let epoch = self.epoch.advance();
        self.state = PresentationState::idle(epoch, self.state.last_payout);
        self.script = None;
        self.next_index = 0;
        Ok(epoch)
    }

    /// Enter the flight phase
    pub fn start_flight(&mut self, epoch: u64) -> bool {
        if !self.is_live(epoch) || self.state.phase != Phase::Idle {
            return false;
        }
        self.state.phase = Phase::Flight;
        true
    }

    /// Load the script for `epoch`. Returns the delay before step 0.
    pub fn load(&mut self, epoch: u64, script: RevealScript<V::Action>) -> Option<Duration> {
        if !self.is_live(epoch) || self.script.is_some() {
            return None;
        }
        let first = script.step(0).map(|s| s.delay).unwrap_or(Duration::ZERO);
        self.script = Some(script);
        self.next_index = 0;
        self.state.phase = Phase::Revealing;
        Some(first)
    }

    /// Apply step `index` of `epoch`'s script
    pub fn advance(&mut self, epoch: u64, index: usize) -> StepResult {
        if !self.is_live(epoch) || index != self.next_index {
            log::trace!(
                "[Reveal] stale step {} of epoch {} (current {})",
                index,
                epoch,
                self.epoch.current()
            );
            return StepResult::Stale;
        }
        let Some(script) = self.script.as_ref() else {
            return StepResult::Stale;
        };

        let mut cues = Vec::new();
        if let Some(step) = script.step(index) {
            self.state.view.apply(&step.action);
            self.state.steps_applied += 1;
            cues = step.cues.clone();
        }
        self.next_index = index + 1;

        match script.step(index + 1) {
            Some(next) => StepResult::Applied {
                cues,
                next: (index + 1, next.delay),
            },
            None => {
                let payout = script.payout();
                self.state.phase = Phase::Settled;
                self.state.payout = Some(payout);
                self.state.last_payout = Some(payout);
                StepResult::Settled {
                    cues,
                    cooldown: self.cooldown,
                }
            }
        }
    }

    /// Return a settled play to idle
    pub fn cool_down(&mut self, epoch: u64) -> bool {
        if !self.is_live(epoch) || self.state.phase != Phase::Settled {
            return false;
        }
        self.state = PresentationState::idle(epoch, self.state.last_payout);
        self.script = None;
        true
    }

    /// Abort `epoch` after a failure: reset to idle and record the error
    pub fn abort(&mut self, epoch: u64, error: &RvError) -> bool {
        if !self.is_live(epoch) {
            return false;
        }
        self.state = PresentationState::idle(epoch, self.state.last_payout);
        self.state.last_error = Some(error.to_string());
        self.script = None;
        true
    }

    /// Permanently stop. Idempotent.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.script = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_stage::{Cue, RevealStep};
    use serde::Serialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    struct Counter {
        values: Vec<u32>,
    }

    impl Presentation for Counter {
        type Action = u32;

        fn apply(&mut self, action: &u32) {
            self.values.push(*action);
        }
    }

    fn script(values: &[u32], payout: f64) -> RevealScript<u32> {
        let steps = values
            .iter()
            .map(|&v| RevealStep::new(Duration::from_millis(100), v).with_cue(Cue::Card))
            .collect();
        RevealScript::new(steps, payout)
    }

    #[test]
    fn test_steps_apply_in_order_and_settle() {
        let mut machine = RevealMachine::<Counter>::new(None);
        let epoch = machine.begin().unwrap();
        assert_eq!(machine.load(epoch, script(&[1, 2], 5.0)), Some(Duration::from_millis(100)));

        assert!(matches!(
            machine.advance(epoch, 0),
            StepResult::Applied { next: (1, _), .. }
        ));
        assert!(matches!(machine.advance(epoch, 1), StepResult::Settled { .. }));
        assert_eq!(machine.state().view.values, vec![1, 2]);
        assert_eq!(machine.state().payout, Some(5.0));
        assert!(machine.state().is_settled());
    }

    #[test]
    fn test_stale_epoch_is_noop() {
        let mut machine = RevealMachine::<Counter>::new(None);
        let first = machine.begin().unwrap();
        machine.load(first, script(&[1, 2], 0.0));
        machine.advance(first, 0);

        let second = machine.begin().unwrap();
        assert_eq!(machine.advance(first, 1), StepResult::Stale);
        assert!(machine.state().view.values.is_empty());
        assert!(machine.load(first, script(&[9], 0.0)).is_none());

        machine.load(second, script(&[7], 1.0));
        assert!(matches!(machine.advance(second, 0), StepResult::Settled { .. }));
        assert_eq!(machine.state().view.values, vec![7]);
        assert_eq!(machine.state().epoch, second);
    }

    #[test]
    fn test_out_of_order_index_is_noop() {
        let mut machine = RevealMachine::<Counter>::new(None);
        let epoch = machine.begin().unwrap();
        machine.load(epoch, script(&[1, 2, 3], 0.0));
        assert_eq!(machine.advance(epoch, 1), StepResult::Stale);
        machine.advance(epoch, 0);
        assert_eq!(machine.advance(epoch, 0), StepResult::Stale);
        assert_eq!(machine.state().view.values, vec![1]);
    }

    #[test]
    fn test_empty_script_settles_immediately() {
        let mut machine = RevealMachine::<Counter>::new(None);
        let epoch = machine.begin().unwrap();
        assert_eq!(machine.load(epoch, script(&[], 2.0)), Some(Duration::ZERO));
        assert_eq!(
            machine.advance(epoch, 0),
            StepResult::Settled {
                cues: vec![],
                cooldown: None
            }
        );
        assert_eq!(machine.state().payout, Some(2.0));
    }

    #[test]
    fn test_cooldown_returns_to_idle() {
        let mut machine = RevealMachine::<Counter>::new(Some(Duration::from_secs(2)));
        let epoch = machine.begin().unwrap();
        machine.load(epoch, script(&[4], 3.0));
        match machine.advance(epoch, 0) {
            StepResult::Settled { cooldown, .. } => assert_eq!(cooldown, Some(Duration::from_secs(2))),
            other => panic!("expected settle, got {:?}", other),
        }
        assert!(machine.cool_down(epoch));
        assert!(machine.state().is_idle());
        assert_eq!(machine.state().last_payout, Some(3.0));
        assert!(!machine.cool_down(epoch));
    }

    #[test]
    fn test_abort_records_error() {
        let mut machine = RevealMachine::<Counter>::new(None);
        let epoch = machine.begin().unwrap();
        assert!(machine.start_flight(epoch));
        assert!(machine.abort(epoch, &RvError::Resolution("rpc down".into())));
        assert!(machine.state().is_idle());
        assert!(machine.state().last_error.as_deref().unwrap().contains("rpc down"));
    }

    #[test]
    fn test_teardown_blocks_everything() {
        let mut machine = RevealMachine::<Counter>::new(None);
        let epoch = machine.begin().unwrap();
        machine.load(epoch, script(&[1, 2], 0.0));
        machine.advance(epoch, 0);

        machine.teardown();
        machine.teardown();
        assert_eq!(machine.advance(epoch, 1), StepResult::Stale);
        assert!(!machine.abort(epoch, &RvError::Resolution("late".into())));
        assert_eq!(machine.begin(), Err(RvError::TornDown));
        assert_eq!(machine.state().view.values, vec![1]);
    }
}
