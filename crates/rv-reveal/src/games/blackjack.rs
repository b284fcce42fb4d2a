//! Blackjack: four cards dealt face up, dealer hole card revealed last

use serde::Serialize;

use rv_core::{Outcome, PayoutTable, RvResult};
use rv_stage::{Cue, DelayPlanner, RevealScript, RevealStep, TimingConfig};
use rv_synth::{
    BlackjackCategory, BlackjackDeal, BlackjackRules, BlackjackSynthesizer, Card,
    RejectionSampler, hand_total,
};

use crate::game::{FlightMode, GameFamily, settle_cue};
use crate::presentation::Presentation;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlackjackView {
    pub player: Vec<Card>,
    pub dealer: Vec<Card>,
    /// Dealer's second card is still face down
    pub hole_hidden: bool,
    pub player_total: Option<u8>,
    /// Total of the visible dealer cards
    pub dealer_total: Option<u8>,
    pub result: Option<BlackjackCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlackjackAction {
    Player(Card),
    DealerUp(Card),
    DealerHole(Card),
    RevealHole,
    Settle(BlackjackCategory),
}

impl Presentation for BlackjackView {
    type Action = BlackjackAction;

    fn apply(&mut self, action: &BlackjackAction) {
        match action {
            BlackjackAction::Player(card) => {
                self.player.push(*card);
                self.player_total = Some(hand_total(&self.player).total);
            }
            BlackjackAction::DealerUp(card) => {
                self.dealer.push(*card);
                self.dealer_total = Some(hand_total(&self.dealer).total);
            }
            BlackjackAction::DealerHole(card) => {
                self.dealer.push(*card);
                self.hole_hidden = true;
            }
            BlackjackAction::RevealHole => {
                self.hole_hidden = false;
                self.dealer_total = Some(hand_total(&self.dealer).total);
            }
            BlackjackAction::Settle(category) => self.result = Some(*category),
        }
    }
}

pub struct BlackjackGame {
    synth: BlackjackSynthesizer,
}

impl BlackjackGame {
    pub fn new(table: PayoutTable, rules: BlackjackRules) -> RvResult<Self> {
        Ok(Self {
            synth: BlackjackSynthesizer::new(table, rules)?,
        })
    }

    /// Lose / push / win / blackjack at 0 / 1 / 2 / 2.5
    pub fn standard() -> RvResult<Self> {
        let rules = BlackjackRules::default();
        let table = PayoutTable::new(rules.categories().iter().map(|(_, m)| *m).collect())?;
        Self::new(table, rules)
    }
}

impl GameFamily for BlackjackGame {
    type Synth = BlackjackSynthesizer;
    type View = BlackjackView;

    fn name(&self) -> &'static str {
        "blackjack"
    }

    fn flight(&self) -> FlightMode {
        FlightMode::None
    }

    fn synthesizer(&self) -> &BlackjackSynthesizer {
        &self.synth
    }

    fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.synth = self.synth.with_sampler(sampler);
        self
    }

    fn script(
        &self,
        deal: &BlackjackDeal,
        outcome: &Outcome,
        timing: &TimingConfig,
    ) -> RevealScript<BlackjackAction> {
        let mut plan = DelayPlanner::new(timing.clone());
        let category = deal.category();

        let steps = vec![
            RevealStep::new(plan.first_card(), BlackjackAction::Player(deal.player[0]))
                .with_cue(Cue::Card),
            RevealStep::new(plan.card(), BlackjackAction::DealerUp(deal.dealer[0]))
                .with_cue(Cue::Card),
            RevealStep::new(plan.card(), BlackjackAction::Player(deal.player[1]))
                .with_cue(Cue::Card),
            RevealStep::new(plan.card(), BlackjackAction::DealerHole(deal.dealer[1]))
                .with_cue(Cue::Card),
            RevealStep::new(plan.hole_reveal(), BlackjackAction::RevealHole)
                .with_cue(Cue::Reveal),
            RevealStep::new(plan.settle(), BlackjackAction::Settle(category))
                .with_cue(settle_cue(outcome, category == BlackjackCategory::Blackjack)),
        ];
        RevealScript::new(steps, outcome.payout_amount())
    }
}
