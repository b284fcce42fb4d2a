//! # rv-synth: RevealForge scenario synthesis
//!
//! The oracle only says *which* table entry won. Each game family turns that
//! into something concrete to show: a dealt hand, a reel combination, a wheel
//! angle or a price chart. The scenario must score back to exactly the
//! resolved multiplier under the family's own rules.
//!
//! ## Families
//!
//! - [`BlackjackSynthesizer`]: two-card player and dealer hands
//! - [`PokerSynthesizer`]: five-card video poker hands
//! - [`SlotMachine`]: reel combinations over multiplier classes
//! - [`Wheel`]: landing pocket and rotation angle
//! - [`ChartGame`]: crash point and candle trajectory
//!
//! All of them go through [`RejectionSampler`]: bounded random draws, then a
//! constructive generator that is always correct.

pub mod blackjack;
pub mod cards;
pub mod chart;
pub mod poker;
pub mod sampler;
pub mod slots;
pub mod wheel;

pub use blackjack::*;
pub use cards::*;
pub use chart::*;
pub use poker::*;
pub use sampler::*;
pub use slots::*;
pub use wheel::*;

use rand::Rng;
use rv_core::{Outcome, PayoutTable};

/// Outcome → scenario mapping for one game family
pub trait Synthesizer: Send + Sync {
    type Scenario: Clone + Send + Sync + std::fmt::Debug + serde::Serialize + 'static;

    /// Table submitted to the oracle for this family
    fn table(&self) -> &PayoutTable;

    /// Build a scenario whose [`evaluate`](Self::evaluate) equals the outcome's multiplier
    fn synthesize<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        rng: &mut R,
    ) -> Synthesis<Self::Scenario>;

    /// Family scoring function
    fn evaluate(&self, scenario: &Self::Scenario) -> f64;
}
