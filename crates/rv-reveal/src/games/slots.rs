//! Slots: reels spin during flight and lock left to right

use serde::Serialize;

use rv_core::{Outcome, PayoutTable, RvResult};
use rv_stage::{Cue, DelayPlanner, RevealScript, RevealStep, TimingConfig};
use rv_synth::{RejectionSampler, SlotCombination, SlotMachine, SlotSymbol, SymbolClass};

use crate::game::{FlightMode, GameFamily, settle_cue};
use crate::presentation::Presentation;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlotsView {
    /// Locked symbol per reel; None while that reel still spins
    pub reels: Vec<Option<SlotSymbol>>,
    /// Class shared by the whole line, once settled on a win
    pub winning_class: Option<SymbolClass>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotsAction {
    Lock { reel: usize, symbol: SlotSymbol },
    Settle(Option<SymbolClass>),
}

impl Presentation for SlotsView {
    type Action = SlotsAction;

    fn apply(&mut self, action: &SlotsAction) {
        match action {
            SlotsAction::Lock { reel, symbol } => {
                if self.reels.len() <= *reel {
                    self.reels.resize(*reel + 1, None);
                }
                self.reels[*reel] = Some(*symbol);
            }
            SlotsAction::Settle(class) => self.winning_class = *class,
        }
    }
}

pub struct SlotsGame {
    machine: SlotMachine,
}

impl SlotsGame {
    pub fn new(table: PayoutTable, reels: usize) -> RvResult<Self> {
        Ok(Self {
            machine: SlotMachine::new(table, reels)?,
        })
    }
}

impl GameFamily for SlotsGame {
    type Synth = SlotMachine;
    type View = SlotsView;

    fn name(&self) -> &'static str {
        "slots"
    }

    fn flight(&self) -> FlightMode {
        FlightMode::Minimum
    }

    fn synthesizer(&self) -> &SlotMachine {
        &self.machine
    }

    fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.machine = self.machine.with_sampler(sampler);
        self
    }

    fn script(
        &self,
        line: &SlotCombination,
        outcome: &Outcome,
        timing: &TimingConfig,
    ) -> RevealScript<SlotsAction> {
        let mut plan = DelayPlanner::new(timing.clone());

        let mut steps: Vec<RevealStep<SlotsAction>> = line
            .symbols
            .iter()
            .enumerate()
            .map(|(reel, symbol)| {
                RevealStep::new(
                    plan.reel_lock(reel),
                    SlotsAction::Lock {
                        reel,
                        symbol: *symbol,
                    },
                )
                .with_cue(Cue::Lock)
            })
            .collect();

        let class = line.line_class();
        let top_class = self.machine.categories().len().checked_sub(1);
        let jackpot = class.is_some() && class == top_class && self.machine.categories().len() > 1;
        steps.push(
            RevealStep::new(plan.settle(), SlotsAction::Settle(class.map(SymbolClass::Paying)))
                .with_cue(settle_cue(outcome, jackpot)),
        );
        RevealScript::new(steps, outcome.payout_amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rv_core::Resolution;
    use rv_synth::Synthesizer;

    #[test]
    fn test_reels_lock_in_order() {
        let table = PayoutTable::new(vec![0.0, 1.0, 0.0, 5.0, 0.0, 20.0]).unwrap();
        let game = SlotsGame::new(table.clone(), 3).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let win = Outcome::reconcile(Resolution::new(5, 20.0), 2.0, &table).unwrap();
        let line = game.synthesizer().synthesize(&win, &mut rng).scenario;
        let script = game.script(&line, &win, &TimingConfig::normal());
        assert_eq!(
            script.cue_sequence(),
            vec![Cue::Lock, Cue::Lock, Cue::Lock, Cue::Jackpot]
        );
        assert_eq!(script.payout(), 40.0);

        let mut view = SlotsView::default();
        for step in script.steps() {
            view.apply(&step.action);
        }
        assert_eq!(view.reels.len(), 3);
        assert!(view.reels.iter().all(|r| r.is_some()));
        assert_eq!(view.winning_class, Some(SymbolClass::Paying(2)));

        let small = Outcome::reconcile(Resolution::new(1, 1.0), 2.0, &table).unwrap();
        let line = game.synthesizer().synthesize(&small, &mut rng).scenario;
        let script = game.script(&line, &small, &TimingConfig::normal());
        assert_eq!(script.cue_sequence().last(), Some(&Cue::Win));
    }
}
