//! Video poker: five cards flipped left to right

use serde::Serialize;

use rv_core::{Outcome, RvResult};
use rv_stage::{Cue, DelayPlanner, RevealScript, RevealStep, TimingConfig};
use rv_synth::{Card, HandRank, PaySchedule, PokerHand, PokerSynthesizer, RejectionSampler};

use crate::game::{FlightMode, GameFamily, settle_cue};
use crate::presentation::Presentation;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PokerView {
    pub cards: Vec<Card>,
    pub hand: Option<HandRank>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PokerAction {
    Flip(Card),
    Settle(HandRank),
}

impl Presentation for PokerView {
    type Action = PokerAction;

    fn apply(&mut self, action: &PokerAction) {
        match action {
            PokerAction::Flip(card) => self.cards.push(*card),
            PokerAction::Settle(rank) => self.hand = Some(*rank),
        }
    }
}

pub struct PokerGame {
    synth: PokerSynthesizer,
}

impl PokerGame {
    pub fn new(schedule: PaySchedule) -> RvResult<Self> {
        Ok(Self {
            synth: PokerSynthesizer::new(schedule)?,
        })
    }
}

impl GameFamily for PokerGame {
    type Synth = PokerSynthesizer;
    type View = PokerView;

    fn name(&self) -> &'static str {
        "poker"
    }

    fn flight(&self) -> FlightMode {
        FlightMode::None
    }

    fn synthesizer(&self) -> &PokerSynthesizer {
        &self.synth
    }

    fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.synth = self.synth.with_sampler(sampler);
        self
    }

    fn script(
        &self,
        hand: &PokerHand,
        outcome: &Outcome,
        timing: &TimingConfig,
    ) -> RevealScript<PokerAction> {
        let mut plan = DelayPlanner::new(timing.clone());
        let rank = hand.rank();

        let mut steps: Vec<RevealStep<PokerAction>> = hand
            .cards
            .iter()
            .enumerate()
            .map(|(i, card)| {
                let delay = if i == 0 { plan.first_card() } else { plan.card() };
                RevealStep::new(delay, PokerAction::Flip(*card)).with_cue(Cue::Card)
            })
            .collect();
        steps.push(
            RevealStep::new(plan.settle(), PokerAction::Settle(rank))
                .with_cue(settle_cue(outcome, rank >= HandRank::FourOfAKind)),
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
    fn test_flips_then_settles() {
        let game = PokerGame::new(PaySchedule::jacks_or_better()).unwrap();
        let table = game.synthesizer().table().clone();
        let outcome = Outcome::reconcile(Resolution::new(0, 0.0), 5.0, &table).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let hand = game.synthesizer().synthesize(&outcome, &mut rng).scenario;

        let script = game.script(&hand, &outcome, &TimingConfig::turbo());
        assert_eq!(script.len(), 6);
        assert_eq!(script.cue_sequence().last(), Some(&Cue::Lose));
        assert_eq!(script.payout(), 0.0);

        let mut view = PokerView::default();
        for step in script.steps() {
            view.apply(&step.action);
        }
        assert_eq!(view.cards, hand.cards.to_vec());
        assert_eq!(view.hand, Some(HandRank::HighCard));
    }
}
