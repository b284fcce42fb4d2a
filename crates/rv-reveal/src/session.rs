//! Game session: one game instance wired to an outcome client
//!
//! ## Play pipeline
//!
//! 1. validate the wager against the table and limits
//! 2. start a new epoch (and the flight, for spin-first games)
//! 3. resolve the outcome, bounded by the configured timeout
//! 4. wait out the rest of the minimum flight
//! 5. reconcile, synthesize, and hand the script to the scheduler

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use rv_core::{Outcome, PayoutTable, RvError, RvResult};
use rv_cue::CueHandle;
use rv_stage::TimingConfig;
use rv_synth::{RejectionSampler, Synthesis, Synthesizer};

use crate::client::OutcomeClient;
use crate::config::EngineConfig;
use crate::game::{FlightMode, GameFamily, ScenarioOf};
use crate::presentation::PresentationState;
use crate::scheduler::RevealScheduler;

/// What a successful play produced
#[derive(Debug, Clone, Serialize)]
pub struct PlayReceipt<S> {
    pub epoch: u64,
    pub outcome: Outcome,
    pub scenario: S,
    pub attempts: u32,
    pub used_fallback: bool,
}

/// Clears the in-flight flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> RvResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RvError::PlayInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct GameSession<G: GameFamily, C: OutcomeClient> {
    game: G,
    client: C,
    config: EngineConfig,
    timing: TimingConfig,
    scheduler: RevealScheduler<G::View>,
    rng: Mutex<StdRng>,
    in_flight: AtomicBool,
}

impl<G: GameFamily, C: OutcomeClient> GameSession<G, C> {
    pub fn new(game: G, client: C, config: EngineConfig, cues: Option<CueHandle>) -> Self {
        let timing = config.timing();
        let game = game.with_sampler(RejectionSampler::new(config.max_synthesis_attempts));
        Self {
            game,
            client,
            scheduler: RevealScheduler::new(cues, timing.cooldown()),
            timing,
            config,
            rng: Mutex::new(StdRng::from_os_rng()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Reproducible cosmetic choices
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn table(&self) -> &PayoutTable {
        self.game.synthesizer().table()
    }

    pub fn scheduler(&self) -> &RevealScheduler<G::View> {
        &self.scheduler
    }

    pub fn snapshot(&self) -> PresentationState<G::View> {
        self.scheduler.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresentationState<G::View>> {
        self.scheduler.subscribe()
    }

    /// Can the trigger control be pressed right now?
    pub fn can_play(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire) && !self.scheduler.is_torn_down()
    }

    /// Run one play up to the start of its reveal
    pub async fn play(&self, wager: f64) -> RvResult<PlayReceipt<ScenarioOf<G>>> {
        let table = self.table();
        self.config.limits.validate(wager, table)?;

        let _guard = InFlight::acquire(&self.in_flight)?;
        let epoch = self.scheduler.begin()?;
        let started = Instant::now();

        let spin_first = self.game.flight() == FlightMode::Minimum;
        if spin_first {
            self.scheduler.start_flight(epoch);
        }
        log::info!(
            "[Session] {} epoch {}: wager {} over {} entries",
            self.game.name(),
            epoch,
            wager,
            table.len()
        );

        let resolution = match tokio::time::timeout(
            self.config.resolve_timeout(),
            self.client.resolve(wager, table),
        )
        .await
        {
            Ok(Ok(resolution)) => resolution,
            Ok(Err(err)) => return Err(self.fail(epoch, err)),
            Err(_) => {
                let err = RvError::ResolutionTimeout(self.config.resolve_timeout_ms);
                return Err(self.fail(epoch, err));
            }
        };

        if spin_first {
            tokio::time::sleep_until(started + self.timing.min_flight()).await;
        }

        if self.scheduler.is_torn_down() {
            log::debug!("[Session] epoch {} resolved after teardown, dropping", epoch);
            return Err(RvError::TornDown);
        }

        let outcome = match Outcome::reconcile(resolution, wager, table) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.fail(epoch, err)),
        };

        let Synthesis {
            scenario,
            attempts,
            used_fallback,
        } = {
            let mut rng = self.rng.lock();
            self.game.synthesizer().synthesize(&outcome, &mut *rng)
        };
        if used_fallback {
            log::debug!(
                "[Session] epoch {} used the constructive fallback after {} attempts",
                epoch,
                attempts
            );
        }

        let script = self.game.script(&scenario, &outcome, &self.timing);
        if !self.scheduler.reveal(epoch, script) {
            log::debug!("[Session] epoch {} superseded before its reveal", epoch);
        }

        Ok(PlayReceipt {
            epoch,
            outcome,
            scenario,
            attempts,
            used_fallback,
        })
    }

    /// Play and wait for the reveal to settle
    pub async fn play_to_settle(
        &self,
        wager: f64,
    ) -> RvResult<(PlayReceipt<ScenarioOf<G>>, Option<PresentationState<G::View>>)> {
        let receipt = self.play(wager).await?;
        let settled = self.scheduler.settled(receipt.epoch).await;
        Ok((receipt, settled))
    }

    fn fail(&self, epoch: u64, err: RvError) -> RvError {
        if err.is_user_facing() {
            log::error!("[Session] epoch {} failed: {}", epoch, err);
        } else {
            log::warn!("[Session] epoch {} rejected: {}", epoch, err);
        }
        self.scheduler.abort(epoch, &err);
        err
    }

    /// Stop all pending reveal work. Later plays fail with `TornDown`.
    pub fn teardown(&self) {
        self.scheduler.teardown();
    }
}
