//! Five-card video poker hands

use std::collections::HashMap;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use rv_core::{Outcome, PayoutTable, RvResult};

use crate::Synthesizer;
use crate::cards::{Card, Deck, Rank, Suit};
use crate::sampler::{RejectionSampler, Synthesis, pick_category};

/// Hand tiers, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandRank {
    HighCard,
    JacksOrBetter,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandRank {
    pub const ALL: [HandRank; 10] = [
        HandRank::HighCard,
        HandRank::JacksOrBetter,
        HandRank::TwoPair,
        HandRank::ThreeOfAKind,
        HandRank::Straight,
        HandRank::Flush,
        HandRank::FullHouse,
        HandRank::FourOfAKind,
        HandRank::StraightFlush,
        HandRank::RoyalFlush,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::HighCard => "Nothing",
            Self::JacksOrBetter => "Jacks or Better",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        }
    }
}

/// Multiplier per hand tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaySchedule {
    pays: [f64; 10],
}

impl Default for PaySchedule {
    fn default() -> Self {
        Self::jacks_or_better()
    }
}

impl PaySchedule {
    /// 9/6 Jacks or Better
    pub fn jacks_or_better() -> Self {
        Self {
            pays: [0.0, 1.0, 2.0, 3.0, 4.0, 6.0, 9.0, 25.0, 50.0, 800.0],
        }
    }

    pub fn new(pays: [f64; 10]) -> Self {
        Self { pays }
    }

    pub fn pay(&self, rank: HandRank) -> f64 {
        self.pays[rank as usize]
    }

    /// Table submitted to the oracle: one entry per tier, weakest first
    pub fn table(&self) -> RvResult<PayoutTable> {
        PayoutTable::new(self.pays.to_vec())
    }

    fn categories(&self) -> Vec<(HandRank, f64)> {
        HandRank::ALL.iter().map(|&r| (r, self.pay(r))).collect()
    }
}

/// Five dealt cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokerHand {
    pub cards: [Card; 5],
}

impl PokerHand {
    pub fn rank(&self) -> HandRank {
        evaluate_hand(&self.cards)
    }
}

fn is_straight(values: &[u8]) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != 5 {
        return false;
    }
    sorted[4] - sorted[0] == 4 || sorted == [2, 3, 4, 5, 14]
}

/// Tier of a five-card hand
pub fn evaluate_hand(cards: &[Card; 5]) -> HandRank {
    let values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    let flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = is_straight(&values);

    if straight && flush {
        let broadway = values.contains(&14) && values.contains(&10);
        return if broadway {
            HandRank::RoyalFlush
        } else {
            HandRank::StraightFlush
        };
    }

    let mut counts: HashMap<u8, u8> = HashMap::new();
    for &v in &values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut groups: Vec<(u8, u8)> = counts.into_iter().map(|(v, n)| (n, v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    match (groups[0].0, groups.get(1).map(|g| g.0).unwrap_or(0)) {
        (4, _) => HandRank::FourOfAKind,
        (3, 2) => HandRank::FullHouse,
        _ if flush => HandRank::Flush,
        _ if straight => HandRank::Straight,
        (3, _) => HandRank::ThreeOfAKind,
        (2, 2) => HandRank::TwoPair,
        (2, _) if groups[0].1 >= Rank::Jack.value() => HandRank::JacksOrBetter,
        _ => HandRank::HighCard,
    }
}

/// Video poker scenario synthesizer
#[derive(Debug, Clone)]
pub struct PokerSynthesizer {
    table: PayoutTable,
    schedule: PaySchedule,
    sampler: RejectionSampler,
}

impl PokerSynthesizer {
    pub fn new(schedule: PaySchedule) -> RvResult<Self> {
        Ok(Self {
            table: schedule.table()?,
            schedule,
            sampler: RejectionSampler::default(),
        })
    }

    pub fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn schedule(&self) -> &PaySchedule {
        &self.schedule
    }

    /// Tier for a resolved multiplier (random among tiers sharing a pay)
    pub fn classify<R: Rng + ?Sized>(&self, multiplier: f64, rng: &mut R) -> HandRank {
        pick_category(&self.schedule.categories(), multiplier, rng).unwrap_or(HandRank::HighCard)
    }

    fn draw<R: Rng + ?Sized>(rng: &mut R) -> PokerHand {
        let mut deck = Deck::shuffled(rng);
        let mut next = || deck.deal().unwrap_or(Card::new(Rank::Two, Suit::Clubs));
        PokerHand {
            cards: [next(), next(), next(), next(), next()],
        }
    }

    /// Always-correct hand for a tier
    pub fn construct<R: Rng + ?Sized>(rank: HandRank, rng: &mut R) -> PokerHand {
        Self::try_construct(rank, rng)
            .filter(|hand| hand.rank() == rank)
            .unwrap_or_else(|| canonical_hand(rank))
    }

    fn try_construct<R: Rng + ?Sized>(rank: HandRank, rng: &mut R) -> Option<PokerHand> {
        let mut deck = Deck::shuffled(rng);
        let mut cards: Vec<Card> = Vec::with_capacity(5);

        match rank {
            HandRank::HighCard => {
                let ranks = distinct_ranks_without_straight(rng, &[]);
                for &r in &ranks[..4] {
                    cards.push(deck.take_rank(rng, r)?);
                }
                let first_suit = cards[0].suit;
                cards.push(deck.take(rng, |c| c.rank == ranks[4] && c.suit != first_suit)?);
            }
            HandRank::JacksOrBetter => {
                let pair = *[Rank::Jack, Rank::Queen, Rank::King, Rank::Ace].choose(rng)?;
                cards.push(deck.take_rank(rng, pair)?);
                cards.push(deck.take_rank(rng, pair)?);
                for kicker in distinct_ranks(rng, 3, &[pair]) {
                    cards.push(deck.take_rank(rng, kicker)?);
                }
            }
            HandRank::TwoPair => {
                let ranks = distinct_ranks(rng, 3, &[]);
                for &r in &ranks[..2] {
                    cards.push(deck.take_rank(rng, r)?);
                    cards.push(deck.take_rank(rng, r)?);
                }
                cards.push(deck.take_rank(rng, ranks[2])?);
            }
            HandRank::ThreeOfAKind => {
                let ranks = distinct_ranks(rng, 3, &[]);
                for _ in 0..3 {
                    cards.push(deck.take_rank(rng, ranks[0])?);
                }
                cards.push(deck.take_rank(rng, ranks[1])?);
                cards.push(deck.take_rank(rng, ranks[2])?);
            }
            HandRank::Straight => {
                let low = rng.random_range(1..=10u8);
                for v in low..low + 5 {
                    cards.push(deck.take_rank(rng, Rank::from_value(v)?)?);
                }
                if cards.iter().all(|c| c.suit == cards[0].suit) {
                    let swapped = cards[4].rank;
                    let suit = cards[0].suit;
                    cards[4] = deck.take(rng, |c| c.rank == swapped && c.suit != suit)?;
                }
            }
            HandRank::Flush => {
                let suit = *Suit::ALL.choose(rng)?;
                for r in distinct_ranks_without_straight(rng, &[]) {
                    cards.push(deck.take(rng, |c| c.rank == r && c.suit == suit)?);
                }
            }
            HandRank::FullHouse => {
                let ranks = distinct_ranks(rng, 2, &[]);
                for _ in 0..3 {
                    cards.push(deck.take_rank(rng, ranks[0])?);
                }
                for _ in 0..2 {
                    cards.push(deck.take_rank(rng, ranks[1])?);
                }
            }
            HandRank::FourOfAKind => {
                let ranks = distinct_ranks(rng, 2, &[]);
                for _ in 0..4 {
                    cards.push(deck.take_rank(rng, ranks[0])?);
                }
                cards.push(deck.take_rank(rng, ranks[1])?);
            }
            HandRank::StraightFlush => {
                let suit = *Suit::ALL.choose(rng)?;
                let low = rng.random_range(1..=9u8);
                for v in low..low + 5 {
                    let r = Rank::from_value(v)?;
                    cards.push(deck.take(rng, |c| c.rank == r && c.suit == suit)?);
                }
            }
            HandRank::RoyalFlush => {
                let suit = *Suit::ALL.choose(rng)?;
                for v in 10..=14u8 {
                    let r = Rank::from_value(v)?;
                    cards.push(deck.take(rng, |c| c.rank == r && c.suit == suit)?);
                }
            }
        }

        cards.shuffle(rng);
        let cards: [Card; 5] = cards.try_into().ok()?;
        Some(PokerHand { cards })
    }
}

/// `n` distinct random ranks, none of them in `exclude`
fn distinct_ranks<R: Rng + ?Sized>(rng: &mut R, n: usize, exclude: &[Rank]) -> Vec<Rank> {
    let mut pool: Vec<Rank> = Rank::ALL
        .iter()
        .copied()
        .filter(|r| !exclude.contains(r))
        .collect();
    pool.shuffle(rng);
    pool.truncate(n);
    pool
}

/// Five distinct ranks that do not form a straight
fn distinct_ranks_without_straight<R: Rng + ?Sized>(rng: &mut R, exclude: &[Rank]) -> Vec<Rank> {
    for _ in 0..16 {
        let ranks = distinct_ranks(rng, 5, exclude);
        let values: Vec<u8> = ranks.iter().map(|r| r.value()).collect();
        if ranks.len() == 5 && !is_straight(&values) {
            return ranks;
        }
    }
    vec![Rank::Two, Rank::Four, Rank::Six, Rank::Eight, Rank::King]
}

/// Fixed hand per tier
pub fn canonical_hand(rank: HandRank) -> PokerHand {
    use Rank::*;
    use Suit::*;
    let c = Card::new;
    let cards = match rank {
        HandRank::HighCard => [c(Two, Clubs), c(Five, Hearts), c(Seven, Spades), c(Nine, Diamonds), c(King, Clubs)],
        HandRank::JacksOrBetter => [c(Jack, Clubs), c(Jack, Hearts), c(Four, Spades), c(Seven, Diamonds), c(Nine, Clubs)],
        HandRank::TwoPair => [c(Three, Clubs), c(Three, Hearts), c(Eight, Spades), c(Eight, Diamonds), c(King, Clubs)],
        HandRank::ThreeOfAKind => [c(Six, Clubs), c(Six, Hearts), c(Six, Spades), c(Nine, Diamonds), c(Queen, Clubs)],
        HandRank::Straight => [c(Five, Clubs), c(Six, Hearts), c(Seven, Spades), c(Eight, Diamonds), c(Nine, Clubs)],
        HandRank::Flush => [c(Two, Hearts), c(Six, Hearts), c(Nine, Hearts), c(Jack, Hearts), c(King, Hearts)],
        HandRank::FullHouse => [c(Ten, Clubs), c(Ten, Hearts), c(Ten, Spades), c(Four, Diamonds), c(Four, Clubs)],
        HandRank::FourOfAKind => [c(Queen, Clubs), c(Queen, Hearts), c(Queen, Spades), c(Queen, Diamonds), c(Three, Clubs)],
        HandRank::StraightFlush => [c(Five, Spades), c(Six, Spades), c(Seven, Spades), c(Eight, Spades), c(Nine, Spades)],
        HandRank::RoyalFlush => [c(Ten, Diamonds), c(Jack, Diamonds), c(Queen, Diamonds), c(King, Diamonds), c(Ace, Diamonds)],
    };
    PokerHand { cards }
}

impl Synthesizer for PokerSynthesizer {
    type Scenario = PokerHand;

    fn table(&self) -> &PayoutTable {
        &self.table
    }

    fn synthesize<R: Rng + ?Sized>(&self, outcome: &Outcome, rng: &mut R) -> Synthesis<PokerHand> {
        let rank = self.classify(outcome.payout_multiplier(), rng);
        self.sampler.sample(
            rng,
            |rng| Self::draw(rng),
            |hand| hand.rank() == rank,
            |rng| Self::construct(rank, rng),
        )
    }

    fn evaluate(&self, scenario: &PokerHand) -> f64 {
        self.schedule.pay(scenario.rank())
    }
}
