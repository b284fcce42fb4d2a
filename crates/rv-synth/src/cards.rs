//! Playing cards and decks

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn symbol(&self) -> char {
        match self {
            Self::Clubs => '♣',
            Self::Diamonds => '♦',
            Self::Hearts => '♥',
            Self::Spades => '♠',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Ten, Jack, Queen, King
    pub const TEN_VALUES: [Rank; 4] = [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King];

    /// Poker value (2-14, Ace high)
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Rank from poker value; 1 is accepted as a low Ace
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 | 14 => Some(Self::Ace),
            2..=13 => Some(Self::ALL[(value - 2) as usize]),
            _ => None,
        }
    }

    /// Blackjack value (Ace counted as 11, faces as 10)
    pub fn blackjack_value(&self) -> u8 {
        match self {
            Self::Ace => 11,
            Self::Jack | Self::Queen | Self::King => 10,
            other => other.value(),
        }
    }

    pub fn is_ten_value(&self) -> bool {
        Self::TEN_VALUES.contains(self)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// A single 52-card deck
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Ordered 52-card deck
    pub fn standard() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
            .collect();
        Self { cards }
    }

    /// Shuffled 52-card deck
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deal the top card
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Remove a random card satisfying `pred`
    pub fn take<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pred: impl Fn(&Card) -> bool,
    ) -> Option<Card> {
        let matching: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .map(|(i, _)| i)
            .collect();
        if matching.is_empty() {
            return None;
        }
        let pick = matching[rng.random_range(0..matching.len())];
        Some(self.cards.swap_remove(pick))
    }

    /// Remove a random card of the given rank
    pub fn take_rank<R: Rng + ?Sized>(&mut self, rng: &mut R, rank: Rank) -> Option<Card> {
        self.take(rng, |c| c.rank == rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_is_unique() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 52);
        let unique: HashSet<Card> = deck.cards.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_take_removes_matching_card() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut deck = Deck::shuffled(&mut rng);
        for _ in 0..4 {
            let ace = deck.take_rank(&mut rng, Rank::Ace).unwrap();
            assert_eq!(ace.rank, Rank::Ace);
        }
        assert!(deck.take_rank(&mut rng, Rank::Ace).is_none());
        assert_eq!(deck.len(), 48);
    }

    #[test]
    fn test_rank_values() {
        assert_eq!(Rank::from_value(1), Some(Rank::Ace));
        assert_eq!(Rank::from_value(10), Some(Rank::Ten));
        assert_eq!(Rank::from_value(15), None);
        assert_eq!(Rank::King.blackjack_value(), 10);
        assert_eq!(Rank::Ace.blackjack_value(), 11);
        assert!(Rank::Queen.is_ten_value());
        assert!(!Rank::Nine.is_ten_value());
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "10♥");
    }
}
