//! Reel combinations
//!
//! Every distinct nonzero table value is a symbol class; each class has a few
//! interchangeable skins. A line pays only when all reels show the same class.

use rand::Rng;
use serde::{Deserialize, Serialize};

use rv_core::{Outcome, PayoutTable, RvError, RvResult};

use crate::Synthesizer;
use crate::sampler::{RejectionSampler, Synthesis};

/// Default reel count
pub const DEFAULT_REELS: usize = 3;

/// Default skins per paying class
pub const DEFAULT_SKINS: u8 = 3;

/// Multiplier class of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolClass {
    /// Never pays
    Blank,
    /// Index into the table's ascending nonzero categories
    Paying(usize),
}

/// One visible reel symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotSymbol {
    pub class: SymbolClass,
    /// Cosmetic variant within the class
    pub skin: u8,
}

impl SlotSymbol {
    pub const BLANK: SlotSymbol = SlotSymbol {
        class: SymbolClass::Blank,
        skin: 0,
    };

    pub fn paying(class: usize, skin: u8) -> Self {
        Self {
            class: SymbolClass::Paying(class),
            skin,
        }
    }
}

/// One symbol per reel, left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCombination {
    pub symbols: Vec<SlotSymbol>,
}

impl SlotCombination {
    /// Shared paying class, if every reel shows the same one
    pub fn line_class(&self) -> Option<usize> {
        let first = self.symbols.first()?;
        match first.class {
            SymbolClass::Paying(c) if self.symbols.iter().all(|s| s.class == first.class) => {
                Some(c)
            }
            _ => None,
        }
    }
}

/// Reel layout and scoring for a slot table
#[derive(Debug, Clone)]
pub struct SlotMachine {
    table: PayoutTable,
    categories: Vec<f64>,
    reels: usize,
    skins: u8,
    sampler: RejectionSampler,
}

impl SlotMachine {
    pub fn new(table: PayoutTable, reels: usize) -> RvResult<Self> {
        if reels < 2 {
            return Err(RvError::Config(format!(
                "slot machine needs at least 2 reels, got {}",
                reels
            )));
        }
        let categories = table.categories();
        Ok(Self {
            table,
            categories,
            reels,
            skins: DEFAULT_SKINS,
            sampler: RejectionSampler::default(),
        })
    }

    /// Skins per paying class (at least one)
    pub fn with_skins(mut self, skins: u8) -> Self {
        self.skins = skins.max(1);
        self
    }

    pub fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn reels(&self) -> usize {
        self.reels
    }

    /// Ascending multipliers of the paying classes
    pub fn categories(&self) -> &[f64] {
        &self.categories
    }

    /// Chip label of a class, e.g. "1×"
    pub fn class_label(&self, class: SymbolClass) -> String {
        match class {
            SymbolClass::Blank => "—".to_string(),
            SymbolClass::Paying(c) => match self.categories.get(c) {
                Some(m) => format!("{}×", m),
                None => "?".to_string(),
            },
        }
    }

    fn random_symbol<R: Rng + ?Sized>(&self, rng: &mut R) -> SlotSymbol {
        // Blank is one extra slot in the pool
        let pick = rng.random_range(0..=self.categories.len());
        if pick == self.categories.len() {
            SlotSymbol::BLANK
        } else {
            SlotSymbol::paying(pick, rng.random_range(0..self.skins))
        }
    }

    fn winning_line<R: Rng + ?Sized>(&self, class: usize, rng: &mut R) -> SlotCombination {
        SlotCombination {
            symbols: (0..self.reels)
                .map(|_| SlotSymbol::paying(class, rng.random_range(0..self.skins)))
                .collect(),
        }
    }

    /// Non-paying line that cycles through the classes, Blank first
    fn losing_fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> SlotCombination {
        let classes = self.categories.len() + 1;
        let symbols = (0..self.reels)
            .map(|reel| match reel % classes {
                0 => SlotSymbol::BLANK,
                c => SlotSymbol::paying(c - 1, rng.random_range(0..self.skins)),
            })
            .collect();
        SlotCombination { symbols }
    }
}

impl Synthesizer for SlotMachine {
    type Scenario = SlotCombination;

    fn table(&self) -> &PayoutTable {
        &self.table
    }

    fn synthesize<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        rng: &mut R,
    ) -> Synthesis<SlotCombination> {
        match self.table.category_of(outcome.payout_multiplier()) {
            Some(class) => self.sampler.sample(
                rng,
                |rng| self.winning_line(class, rng),
                |line| line.line_class() == Some(class),
                |rng| self.winning_line(class, rng),
            ),
            None => self.sampler.sample(
                rng,
                |rng| SlotCombination {
                    symbols: (0..self.reels).map(|_| self.random_symbol(rng)).collect(),
                },
                |line| line.line_class().is_none(),
                |rng| self.losing_fallback(rng),
            ),
        }
    }

    fn evaluate(&self, scenario: &SlotCombination) -> f64 {
        scenario
            .line_class()
            .and_then(|c| self.categories.get(c).copied())
            .unwrap_or(0.0)
    }
}
