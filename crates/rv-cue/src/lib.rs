//! RevealForge Cue Dispatcher
//!
//! Reveal steps request cues; this crate turns them into sounds and particle
//! bursts without ever blocking the reveal.
//!
//! ## Thread Safety Design
//!
//! The dispatcher is split into two parts:
//! - `CueHandle`: cloneable handle held by schedulers, pushes commands
//! - `CueProcessor`: single owner of the audio and particle backends
//!
//! Commands travel over a bounded lock-free ring buffer. A full queue drops
//! the cue; a failing backend is logged and ignored.
//!
//! Every command carries the epoch of the play that fired it. Once a newer
//! play begins (`retire_below`) or the instance is torn down (`retire_all`),
//! commands of the old epoch are discarded, even if already queued.

mod backend;
mod dispatcher;
mod registry;

pub use backend::*;
pub use dispatcher::*;
pub use registry::*;

pub use rv_stage::{Cue, CueEvent, CueParams, ParticleBurst};
