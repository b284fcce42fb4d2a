//! Constrained rejection sampling
//!
//! Draw candidates until one satisfies the scoring constraint. The loop is
//! capped; once the cap is hit a constructive generator that is always correct
//! produces the scenario instead.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use rv_core::MULTIPLIER_EPSILON;

/// Default retry budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// A synthesized scenario plus how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synthesis<S> {
    pub scenario: S,
    /// Candidates drawn (the cap when the fallback ran)
    pub attempts: u32,
    /// True when the retry budget ran out and the constructive path was used
    pub used_fallback: bool,
}

impl<S> Synthesis<S> {
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Synthesis<T> {
        Synthesis {
            scenario: f(self.scenario),
            attempts: self.attempts,
            used_fallback: self.used_fallback,
        }
    }
}

/// Bounded rejection sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionSampler {
    max_attempts: u32,
}

impl Default for RejectionSampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RejectionSampler {
    /// Create a sampler. A budget of zero goes straight to the fallback.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw until `accept` holds, else construct with `fallback`
    pub fn sample<T, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        mut draw: impl FnMut(&mut R) -> T,
        mut accept: impl FnMut(&T) -> bool,
        fallback: impl FnOnce(&mut R) -> T,
    ) -> Synthesis<T> {
        for attempt in 1..=self.max_attempts {
            let candidate = draw(rng);
            if accept(&candidate) {
                return Synthesis {
                    scenario: candidate,
                    attempts: attempt,
                    used_fallback: false,
                };
            }
        }

        log::debug!(
            "[Synth] no candidate after {} attempts, using constructive fallback",
            self.max_attempts
        );
        Synthesis {
            scenario: fallback(rng),
            attempts: self.max_attempts,
            used_fallback: true,
        }
    }
}

/// Classify a multiplier into one of several named categories.
///
/// Exact matches win; otherwise the nearest category is taken. Categories tied
/// on multiplier (or on distance) are picked at random, never by order.
pub fn pick_category<C: Copy, R: Rng + ?Sized>(
    candidates: &[(C, f64)],
    target: f64,
    rng: &mut R,
) -> Option<C> {
    let best = candidates
        .iter()
        .map(|(_, m)| (m - target).abs())
        .fold(f64::INFINITY, f64::min);

    let tied: Vec<C> = candidates
        .iter()
        .filter(|(_, m)| ((m - target).abs() - best).abs() <= MULTIPLIER_EPSILON)
        .map(|(c, _)| *c)
        .collect();

    tied.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_accepts_first_match() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampler = RejectionSampler::default();
        let mut draws = 0;
        let result = sampler.sample(
            &mut rng,
            |_| {
                draws += 1;
                draws
            },
            |&n| n == 3,
            |_| 0,
        );
        assert_eq!(result.scenario, 3);
        assert_eq!(result.attempts, 3);
        assert!(!result.used_fallback);
    }

    #[test]
    fn test_sample_falls_back_after_cap() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampler = RejectionSampler::new(10);
        let mut draws = 0;
        let result = sampler.sample(
            &mut rng,
            |_| {
                draws += 1;
                draws
            },
            |_| false,
            |_| -1,
        );
        assert_eq!(draws, 10);
        assert_eq!(result.scenario, -1);
        assert_eq!(result.attempts, 10);
        assert!(result.used_fallback);
    }

    #[test]
    fn test_zero_budget_goes_straight_to_fallback() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = RejectionSampler::new(0).sample(&mut rng, |_| 1, |_| true, |_| 2);
        assert_eq!(result.scenario, 2);
        assert!(result.used_fallback);
    }

    #[test]
    fn test_pick_category_exact_and_nearest() {
        let mut rng = StdRng::seed_from_u64(3);
        let cats = [('L', 0.0), ('W', 2.0), ('B', 2.5)];
        assert_eq!(pick_category(&cats, 2.5, &mut rng), Some('B'));
        assert_eq!(pick_category(&cats, 1.9, &mut rng), Some('W'));
        assert_eq!(pick_category(&cats, -3.0, &mut rng), Some('L'));
        assert_eq!(pick_category::<char, _>(&[], 1.0, &mut rng), None);
    }

    #[test]
    fn test_pick_category_breaks_ties_randomly() {
        let mut rng = StdRng::seed_from_u64(11);
        let cats = [('A', 2.0), ('B', 2.0), ('C', 5.0)];
        let mut seen_a = false;
        let mut seen_b = false;
        for _ in 0..200 {
            match pick_category(&cats, 2.0, &mut rng) {
                Some('A') => seen_a = true,
                Some('B') => seen_b = true,
                other => panic!("unexpected category {:?}", other),
            }
        }
        assert!(seen_a && seen_b);
    }
}
