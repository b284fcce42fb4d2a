//! # rv-reveal: RevealForge reveal engine
//!
//! Turns one oracle outcome into a timed, cue-accompanied reveal that stays
//! correct when a new play interrupts the previous one.
//!
//! ## Architecture
//!
//! ```text
//! GameSession::play(wager)
//!   ├─ OutcomeClient::resolve      (bounded by resolve timeout)
//!   ├─ minimum flight              (spin-first games)
//!   ├─ Outcome::reconcile          (fail closed on mismatch)
//!   ├─ Synthesizer::synthesize     (rv-synth)
//!   └─ RevealScheduler::reveal     (epoch-guarded step chain → cues, watch)
//! ```
//!
//! Every play bumps the instance's epoch. Deferred steps carry the epoch they
//! were scheduled under and do nothing once it is stale.

pub mod client;
pub mod config;
pub mod epoch;
pub mod game;
pub mod games;
pub mod machine;
pub mod presentation;
pub mod scheduler;
pub mod session;

pub use client::*;
pub use config::*;
pub use epoch::*;
pub use game::*;
pub use games::*;
pub use machine::*;
pub use presentation::*;
pub use scheduler::*;
pub use session::*;
