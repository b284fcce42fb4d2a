//! Presentation state: the renderable snapshot a reveal drives

use serde::Serialize;

/// Where a game instance is in its play cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a play
    #[default]
    Idle,
    /// Spin/launch animation running while the outcome resolves
    Flight,
    /// Reveal steps are being applied
    Revealing,
    /// Final step applied, payout shown
    Settled,
}

/// Per-game view model mutated by reveal actions
pub trait Presentation: Default + Clone + Send + Sync + Serialize + 'static {
    type Action: Clone + Send + Sync + std::fmt::Debug + 'static;

    fn apply(&mut self, action: &Self::Action);
}

/// Snapshot consumed by rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationState<V> {
    pub phase: Phase,
    /// Play this state belongs to
    pub epoch: u64,
    pub view: V,
    pub steps_applied: usize,
    /// Payout amount, once settled
    pub payout: Option<f64>,
    /// Payout of the last settled play (kept across resets for the history strip)
    pub last_payout: Option<f64>,
    /// Message of the last resolution failure
    pub last_error: Option<String>,
}

impl<V: Default> Default for PresentationState<V> {
    fn default() -> Self {
        Self::idle(0, None)
    }
}

impl<V: Default> PresentationState<V> {
    pub fn idle(epoch: u64, last_payout: Option<f64>) -> Self {
        Self {
            phase: Phase::Idle,
            epoch,
            view: V::default(),
            steps_applied: 0,
            payout: None,
            last_payout,
            last_error: None,
        }
    }
}

impl<V> PresentationState<V> {
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }
}
