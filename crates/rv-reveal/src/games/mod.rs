//! Concrete game families

mod blackjack;
mod chart;
mod poker;
mod slots;
mod wheel;

pub use blackjack::*;
pub use chart::*;
pub use poker::*;
pub use slots::*;
pub use wheel::*;
