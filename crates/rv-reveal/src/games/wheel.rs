//! Wheel: spins during flight, then eases onto the landing angle

use serde::Serialize;

use rv_core::{Outcome, PayoutTable};
use rv_stage::{Cue, DelayPlanner, RevealScript, RevealStep, TimingConfig};
use rv_synth::{RejectionSampler, Synthesizer, Wheel, WheelLanding};

use crate::game::{FlightMode, GameFamily, settle_cue};
use crate::presentation::Presentation;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WheelView {
    pub rotation_deg: f64,
    pub pocket: Option<usize>,
    pub multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WheelAction {
    Land(WheelLanding),
    Settle(f64),
}

impl Presentation for WheelView {
    type Action = WheelAction;

    fn apply(&mut self, action: &WheelAction) {
        match action {
            WheelAction::Land(landing) => {
                self.rotation_deg = landing.rotation_deg;
                self.pocket = Some(landing.pocket);
            }
            WheelAction::Settle(multiplier) => self.multiplier = Some(*multiplier),
        }
    }
}

pub struct WheelGame {
    wheel: Wheel,
}

impl WheelGame {
    pub fn new(table: PayoutTable) -> Self {
        Self {
            wheel: Wheel::new(table),
        }
    }
}

impl GameFamily for WheelGame {
    type Synth = Wheel;
    type View = WheelView;

    fn name(&self) -> &'static str {
        "wheel"
    }

    fn flight(&self) -> FlightMode {
        FlightMode::Minimum
    }

    fn synthesizer(&self) -> &Wheel {
        &self.wheel
    }

    fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.wheel = self.wheel.with_sampler(sampler);
        self
    }

    fn script(
        &self,
        landing: &WheelLanding,
        outcome: &Outcome,
        timing: &TimingConfig,
    ) -> RevealScript<WheelAction> {
        let mut plan = DelayPlanner::new(timing.clone());
        let jackpot = outcome.is_win()
            && outcome.payout_multiplier() >= self.wheel.table().max_multiplier();

        let steps = vec![
            RevealStep::new(plan.after(0.0), WheelAction::Land(*landing)),
            RevealStep::new(
                plan.wheel_settle(),
                WheelAction::Settle(outcome.payout_multiplier()),
            )
            .with_cue(Cue::Reveal)
            .with_cue(settle_cue(outcome, jackpot)),
        ];
        RevealScript::new(steps, outcome.payout_amount())
    }
}
