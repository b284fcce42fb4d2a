//! Two-card blackjack deals
//!
//! The oracle decides lose / push / win / blackjack; this module deals a
//! player and dealer hand that shows exactly that result.

use rand::Rng;
use serde::{Deserialize, Serialize};

use rv_core::{Outcome, PayoutTable, RvError, RvResult, multipliers_match};

use crate::Synthesizer;
use crate::cards::{Card, Deck, Rank, Suit};
use crate::sampler::{RejectionSampler, Synthesis, pick_category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackjackCategory {
    Lose,
    Push,
    Win,
    Blackjack,
}

/// Multiplier paid per category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackjackRules {
    pub lose: f64,
    pub push: f64,
    pub win: f64,
    pub blackjack: f64,
}

impl Default for BlackjackRules {
    fn default() -> Self {
        Self {
            lose: 0.0,
            push: 1.0,
            win: 2.0,
            blackjack: 2.5,
        }
    }
}

impl BlackjackRules {
    pub fn multiplier(&self, category: BlackjackCategory) -> f64 {
        match category {
            BlackjackCategory::Lose => self.lose,
            BlackjackCategory::Push => self.push,
            BlackjackCategory::Win => self.win,
            BlackjackCategory::Blackjack => self.blackjack,
        }
    }

    pub fn categories(&self) -> [(BlackjackCategory, f64); 4] {
        [
            (BlackjackCategory::Lose, self.lose),
            (BlackjackCategory::Push, self.push),
            (BlackjackCategory::Win, self.win),
            (BlackjackCategory::Blackjack, self.blackjack),
        ]
    }
}

/// Hand total with soft flag (an Ace still counted as 11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandTotal {
    pub total: u8,
    pub soft: bool,
}

/// Best blackjack total of a hand
pub fn hand_total(cards: &[Card]) -> HandTotal {
    let mut total: u16 = 0;
    let mut soft_aces = 0u8;
    for card in cards {
        total += card.rank.blackjack_value() as u16;
        if card.rank == Rank::Ace {
            soft_aces += 1;
        }
    }
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    HandTotal {
        total: total.min(u8::MAX as u16) as u8,
        soft: soft_aces > 0,
    }
}

/// Ace plus a ten-value card in exactly two cards
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_total(cards).total == 21
}

/// Player and dealer two-card hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackjackDeal {
    pub player: [Card; 2],
    pub dealer: [Card; 2],
}

impl BlackjackDeal {
    pub fn player_total(&self) -> HandTotal {
        hand_total(&self.player)
    }

    pub fn dealer_total(&self) -> HandTotal {
        hand_total(&self.dealer)
    }

    /// Score the deal
    pub fn category(&self) -> BlackjackCategory {
        let player = self.player_total().total;
        let dealer = self.dealer_total().total;

        if is_natural(&self.player) && dealer < 21 {
            return BlackjackCategory::Blackjack;
        }
        match player.cmp(&dealer) {
            std::cmp::Ordering::Greater => BlackjackCategory::Win,
            std::cmp::Ordering::Equal => BlackjackCategory::Push,
            std::cmp::Ordering::Less => BlackjackCategory::Lose,
        }
    }

    /// Fixed deal per category, used when even the constructive path cannot
    /// find cards
    pub fn canonical(category: BlackjackCategory) -> Self {
        use Rank::*;
        use Suit::*;
        let (player, dealer) = match category {
            BlackjackCategory::Blackjack => (
                [Card::new(Ace, Spades), Card::new(King, Hearts)],
                [Card::new(Nine, Clubs), Card::new(Seven, Diamonds)],
            ),
            BlackjackCategory::Win => (
                [Card::new(King, Spades), Card::new(Queen, Hearts)],
                [Card::new(Jack, Clubs), Card::new(Eight, Diamonds)],
            ),
            BlackjackCategory::Push => (
                [Card::new(King, Spades), Card::new(Nine, Hearts)],
                [Card::new(Queen, Clubs), Card::new(Nine, Diamonds)],
            ),
            BlackjackCategory::Lose => (
                [Card::new(Jack, Spades), Card::new(Seven, Hearts)],
                [Card::new(King, Clubs), Card::new(Queen, Diamonds)],
            ),
        };
        Self { player, dealer }
    }
}

/// Blackjack scenario synthesizer
#[derive(Debug, Clone)]
pub struct BlackjackSynthesizer {
    table: PayoutTable,
    rules: BlackjackRules,
    sampler: RejectionSampler,
}

impl BlackjackSynthesizer {
    /// Every table entry must be one of the rules' multipliers
    pub fn new(table: PayoutTable, rules: BlackjackRules) -> RvResult<Self> {
        let categories = rules.categories();
        for (index, multiplier) in table.iter().enumerate() {
            if !categories.iter().any(|(_, m)| multipliers_match(*m, multiplier)) {
                return Err(RvError::Config(format!(
                    "blackjack table entry {} ({}) matches no category of {:?}",
                    index, multiplier, rules
                )));
            }
        }
        Ok(Self {
            table,
            rules,
            sampler: RejectionSampler::default(),
        })
    }

    pub fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn rules(&self) -> &BlackjackRules {
        &self.rules
    }

    /// Category for a resolved multiplier
    pub fn classify<R: Rng + ?Sized>(&self, multiplier: f64, rng: &mut R) -> BlackjackCategory {
        pick_category(&self.rules.categories(), multiplier, rng).unwrap_or(BlackjackCategory::Lose)
    }

    /// Deal four random cards in table order (player, dealer, player, dealer)
    fn draw<R: Rng + ?Sized>(rng: &mut R) -> BlackjackDeal {
        let mut deck = Deck::shuffled(rng);
        let mut next = || deck.deal().unwrap_or(Card::new(Rank::Two, Suit::Clubs));
        let (p0, d0, p1, d1) = (next(), next(), next(), next());
        BlackjackDeal {
            player: [p0, p1],
            dealer: [d0, d1],
        }
    }

    /// Always-correct deal for a category
    pub fn construct<R: Rng + ?Sized>(category: BlackjackCategory, rng: &mut R) -> BlackjackDeal {
        Self::try_construct(category, rng).unwrap_or_else(|| BlackjackDeal::canonical(category))
    }

    fn try_construct<R: Rng + ?Sized>(
        category: BlackjackCategory,
        rng: &mut R,
    ) -> Option<BlackjackDeal> {
        let mut deck = Deck::shuffled(rng);
        let ten = |c: &Card| c.rank.is_ten_value();

        let deal = match category {
            BlackjackCategory::Blackjack => {
                let low = Rank::from_value(rng.random_range(2..=9))?;
                BlackjackDeal {
                    player: [deck.take_rank(rng, Rank::Ace)?, deck.take(rng, ten)?],
                    dealer: [deck.take(rng, ten)?, deck.take_rank(rng, low)?],
                }
            }
            BlackjackCategory::Win => {
                // 20 against 17-19
                let dealer_low = Rank::from_value(rng.random_range(7..=9))?;
                BlackjackDeal {
                    player: [deck.take(rng, ten)?, deck.take(rng, ten)?],
                    dealer: [deck.take(rng, ten)?, deck.take_rank(rng, dealer_low)?],
                }
            }
            BlackjackCategory::Push => {
                let low = Rank::from_value(rng.random_range(7..=9))?;
                BlackjackDeal {
                    player: [deck.take(rng, ten)?, deck.take_rank(rng, low)?],
                    dealer: [deck.take(rng, ten)?, deck.take_rank(rng, low)?],
                }
            }
            BlackjackCategory::Lose => {
                // 12-17 against 20
                let player_low = Rank::from_value(rng.random_range(2..=7))?;
                BlackjackDeal {
                    player: [deck.take(rng, ten)?, deck.take_rank(rng, player_low)?],
                    dealer: [deck.take(rng, ten)?, deck.take(rng, ten)?],
                }
            }
        };
        Some(deal)
    }
}

impl Synthesizer for BlackjackSynthesizer {
    type Scenario = BlackjackDeal;

    fn table(&self) -> &PayoutTable {
        &self.table
    }

    fn synthesize<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        rng: &mut R,
    ) -> Synthesis<BlackjackDeal> {
        let category = self.classify(outcome.payout_multiplier(), rng);
        self.sampler.sample(
            rng,
            |rng| Self::draw(rng),
            |deal| deal.category() == category,
            |rng| Self::construct(category, rng),
        )
    }

    fn evaluate(&self, scenario: &BlackjackDeal) -> f64 {
        self.rules.multiplier(scenario.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rv_core::Resolution;

    const ALL: [BlackjackCategory; 4] = [
        BlackjackCategory::Lose,
        BlackjackCategory::Push,
        BlackjackCategory::Win,
        BlackjackCategory::Blackjack,
    ];

    fn synth() -> BlackjackSynthesizer {
        let table = PayoutTable::new(vec![0.0, 1.0, 2.0, 2.5]).unwrap();
        BlackjackSynthesizer::new(table, BlackjackRules::default()).unwrap()
    }

    #[test]
    fn test_hand_total_soft_aces() {
        use Rank::*;
        let c = |r| Card::new(r, Suit::Hearts);
        assert_eq!(hand_total(&[c(Ace), c(Ace)]), HandTotal { total: 12, soft: true });
        assert_eq!(hand_total(&[c(Ace), c(King)]).total, 21);
        assert_eq!(hand_total(&[c(Ace), c(Nine), c(Five)]), HandTotal { total: 15, soft: false });
        assert!(is_natural(&[c(Ten), c(Ace)]));
        assert!(!is_natural(&[c(Ten), c(Five), c(Six)]));
    }

    #[test]
    fn test_rejects_table_outside_rules() {
        let table = PayoutTable::new(vec![0.0, 1.5]).unwrap();
        let err = BlackjackSynthesizer::new(table, BlackjackRules::default()).unwrap_err();
        assert!(matches!(err, RvError::Config(_)));

        // Custom rules that do cover the table are fine, and round-trip exactly
        let rules = BlackjackRules {
            win: 1.5,
            ..BlackjackRules::default()
        };
        let table = PayoutTable::new(vec![0.0, 1.5]).unwrap();
        let synth = BlackjackSynthesizer::new(table.clone(), rules).unwrap();
        let outcome = Outcome::reconcile(Resolution::new(1, 1.5), 1.0, &table).unwrap();
        let mut rng = StdRng::seed_from_u64(15);
        for _ in 0..20 {
            let deal = synth.synthesize(&outcome, &mut rng).scenario;
            assert_eq!(deal.category(), BlackjackCategory::Win);
            assert_eq!(synth.evaluate(&deal), 1.5);
        }
    }

    #[test]
    fn test_canonical_deals_score_their_category() {
        for category in ALL {
            assert_eq!(BlackjackDeal::canonical(category).category(), category);
        }
    }

    #[test]
    fn test_constructive_path_is_always_correct() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            for category in ALL {
                let deal = BlackjackSynthesizer::construct(category, &mut rng);
                assert_eq!(deal.category(), category);
                let cards = [deal.player[0], deal.player[1], deal.dealer[0], deal.dealer[1]];
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        assert_ne!(cards[i], cards[j], "duplicate card in {:?}", deal);
                    }
                }
            }
        }
    }

    #[test]
    fn test_zero_budget_uses_fallback() {
        let synth = synth().with_sampler(RejectionSampler::new(0));
        let mut rng = StdRng::seed_from_u64(2);
        let outcome = Outcome::reconcile(Resolution::new(3, 2.5), 10.0, synth.table()).unwrap();
        let result = synth.synthesize(&outcome, &mut rng);
        assert!(result.used_fallback);
        assert_eq!(result.scenario.category(), BlackjackCategory::Blackjack);
    }

    #[test]
    fn test_blackjack_example_pays_25() {
        let table = PayoutTable::new(vec![0.0, 2.0, 2.5]).unwrap();
        let synth = BlackjackSynthesizer::new(table.clone(), BlackjackRules::default()).unwrap();
        let outcome = Outcome::reconcile(Resolution::new(2, 2.5), 10.0, &table).unwrap();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..100 {
            let deal = synth.synthesize(&outcome, &mut rng).scenario;
            let ranks = [deal.player[0].rank, deal.player[1].rank];
            assert!(ranks.contains(&Rank::Ace));
            assert!(ranks.iter().any(|r| r.is_ten_value()));
            assert!(deal.dealer_total().total < 21);
            assert_relative_eq!(synth.evaluate(&deal) * outcome.wager(), 25.0);
        }
    }

    #[test]
    fn test_round_trip_every_index() {
        let synth = synth();
        let mut rng = StdRng::seed_from_u64(1234);
        for index in 0..synth.table().len() {
            let multiplier = synth.table().get(index).unwrap();
            let outcome =
                Outcome::reconcile(Resolution::new(index, multiplier), 5.0, synth.table()).unwrap();
            for _ in 0..50 {
                let deal = synth.synthesize(&outcome, &mut rng).scenario;
                assert_eq!(synth.evaluate(&deal), outcome.payout_multiplier());
            }
        }
    }

    #[test]
    fn test_repeated_synthesis_varies_cosmetically() {
        let synth = synth();
        let mut rng = StdRng::seed_from_u64(77);
        let outcome = Outcome::reconcile(Resolution::new(2, 2.0), 5.0, synth.table()).unwrap();
        let deals: Vec<BlackjackDeal> = (0..30)
            .map(|_| synth.synthesize(&outcome, &mut rng).scenario)
            .collect();
        assert!(deals.iter().all(|d| d.category() == BlackjackCategory::Win));
        assert!(deals.windows(2).any(|w| w[0] != w[1]));
    }
}
