//! # rv-stage: RevealForge stage vocabulary
//!
//! Every game family, regardless of its rules, reveals a play the same way:
//! a list of timed steps, each mutating the presentation and requesting cues.
//!
//! This crate defines that vocabulary (cues, steps, scripts) and the timing
//! profiles that space the steps out.

pub mod cue;
pub mod step;
pub mod timing;

pub use cue::*;
pub use step::*;
pub use timing::*;
