//! rv-core: Shared types for RevealForge
//!
//! Payout tables, reconciled outcomes, wager limits and the error taxonomy
//! used by every other RevealForge crate.

mod error;
mod outcome;
mod payout;
mod wager;

pub use error::*;
pub use outcome::*;
pub use payout::*;
pub use wager::*;
