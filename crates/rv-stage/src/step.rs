//! Reveal steps and scripts
//!
//! A script is the complete, ordered list of presentation mutations for one
//! play. Each step waits for its delay (relative to the previous step), then
//! applies its action and requests its cues.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cue::{Cue, CueEvent};

/// One timed step of a reveal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealStep<A> {
    /// Delay after the previous step (or after the reveal starts, for step 0)
    pub delay: Duration,
    /// Presentation mutation
    pub action: A,
    /// Cues fired once the action has been applied
    #[serde(default)]
    pub cues: Vec<CueEvent>,
}

impl<A> RevealStep<A> {
    pub fn new(delay: Duration, action: A) -> Self {
        Self {
            delay,
            action,
            cues: Vec::new(),
        }
    }

    /// Add a cue
    pub fn with_cue(mut self, cue: impl Into<CueEvent>) -> Self {
        self.cues.push(cue.into());
        self
    }

    /// Add several cues
    pub fn with_cues(mut self, cues: impl IntoIterator<Item = CueEvent>) -> Self {
        self.cues.extend(cues);
        self
    }
}

/// Ordered steps plus the settled payout they lead to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealScript<A> {
    steps: Vec<RevealStep<A>>,
    payout: f64,
}

impl<A> RevealScript<A> {
    /// Create a script. The final step settles the play at `payout`.
    pub fn new(steps: Vec<RevealStep<A>>, payout: f64) -> Self {
        Self { steps, payout }
    }

    pub fn steps(&self) -> &[RevealStep<A>] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&RevealStep<A>> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Payout amount shown once settled
    pub fn payout(&self) -> f64 {
        self.payout
    }

    /// Sum of all step delays
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum()
    }

    /// Every cue in firing order
    pub fn cue_sequence(&self) -> Vec<Cue> {
        self.steps
            .iter()
            .flat_map(|s| s.cues.iter().map(|c| c.cue))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_duration_and_cues() {
        let script = RevealScript::new(
            vec![
                RevealStep::new(Duration::from_millis(100), 1u8).with_cue(Cue::Card),
                RevealStep::new(Duration::from_millis(250), 2u8).with_cue(Cue::Card),
                RevealStep::new(Duration::ZERO, 3u8).with_cues([
                    CueEvent::new(Cue::Win),
                    CueEvent::new(Cue::Jackpot),
                ]),
            ],
            25.0,
        );

        assert_eq!(script.len(), 3);
        assert_eq!(script.total_duration(), Duration::from_millis(350));
        assert_eq!(
            script.cue_sequence(),
            vec![Cue::Card, Cue::Card, Cue::Win, Cue::Jackpot]
        );
        assert_eq!(script.payout(), 25.0);
        assert_eq!(script.step(1).map(|s| s.action), Some(2));
    }
}
