//! Game family seam: synthesizer + view + reveal script

use serde::Serialize;

use rv_core::Outcome;
use rv_stage::{Cue, CueEvent, RevealScript, TimingConfig};
use rv_synth::{RejectionSampler, Synthesizer};

use crate::presentation::Presentation;

/// Whether a flight animation runs while the outcome resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightMode {
    /// Nothing moves until the outcome is known (card games)
    None,
    /// Spin-first: the flight runs at least `min_flight` before the reveal
    Minimum,
}

pub trait GameFamily: Sized + Send + Sync + 'static {
    type Synth: Synthesizer;
    type View: Presentation;

    fn name(&self) -> &'static str;

    fn flight(&self) -> FlightMode;

    fn synthesizer(&self) -> &Self::Synth;

    /// Replace the rejection sampling budget
    fn with_sampler(self, sampler: RejectionSampler) -> Self;

    /// Steps that play `scenario` back
    fn script(
        &self,
        scenario: &ScenarioOf<Self>,
        outcome: &Outcome,
        timing: &TimingConfig,
    ) -> RevealScript<ActionOf<Self>>;
}

pub type ScenarioOf<G> = <<G as GameFamily>::Synth as Synthesizer>::Scenario;
pub type ActionOf<G> = <<G as GameFamily>::View as Presentation>::Action;

/// Closing cue of a play
pub fn settle_cue(outcome: &Outcome, jackpot: bool) -> CueEvent {
    if jackpot {
        CueEvent::new(Cue::Jackpot)
    } else if outcome.is_win() {
        CueEvent::new(Cue::Win)
    } else {
        CueEvent::new(Cue::Lose)
    }
}
