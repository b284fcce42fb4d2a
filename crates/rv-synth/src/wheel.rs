//! Wheel landings
//!
//! Pockets are the table entries in order, laid out clockwise from the
//! pointer. A rotation of `r` degrees puts pocket `floor((r mod 360) / w)`
//! under the pointer, with `w = 360 / pockets`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use rv_core::{Outcome, PayoutTable};

use crate::Synthesizer;
use crate::sampler::{RejectionSampler, Synthesis};

/// Where the wheel comes to rest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelLanding {
    pub pocket: usize,
    pub full_turns: u32,
    /// Total clockwise rotation in degrees
    pub rotation_deg: f64,
}

#[derive(Debug, Clone)]
pub struct Wheel {
    table: PayoutTable,
    min_turns: u32,
    max_turns: u32,
    /// Fraction of the half-pocket the landing may stray from the centre
    jitter: f64,
    sampler: RejectionSampler,
}

impl Wheel {
    pub fn new(table: PayoutTable) -> Self {
        Self {
            table,
            min_turns: 4,
            max_turns: 7,
            jitter: 0.8,
            sampler: RejectionSampler::default(),
        }
    }

    pub fn with_turns(mut self, min_turns: u32, max_turns: u32) -> Self {
        self.min_turns = min_turns.min(max_turns);
        self.max_turns = max_turns.max(min_turns);
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_finite() {
            jitter.clamp(0.0, 0.95)
        } else {
            0.0
        };
        self
    }

    pub fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn pockets(&self) -> usize {
        self.table.len()
    }

    /// Arc of one pocket in degrees
    pub fn pocket_width(&self) -> f64 {
        360.0 / self.table.len().max(1) as f64
    }

    /// Rotation that puts the centre of `pocket` under the pointer
    pub fn pocket_centre(&self, pocket: usize) -> f64 {
        (pocket as f64 + 0.5) * self.pocket_width()
    }

    /// Pocket under the pointer after `rotation_deg`
    pub fn pocket_at(&self, rotation_deg: f64) -> usize {
        let angle = rotation_deg.rem_euclid(360.0);
        let pocket = (angle / self.pocket_width()).floor() as usize;
        pocket.min(self.pockets().saturating_sub(1))
    }

    fn landing(&self, pocket: usize, full_turns: u32, offset: f64) -> WheelLanding {
        WheelLanding {
            pocket,
            full_turns,
            rotation_deg: full_turns as f64 * 360.0 + self.pocket_centre(pocket) + offset,
        }
    }

    fn draw<R: Rng + ?Sized>(&self, pocket: usize, rng: &mut R) -> WheelLanding {
        let full_turns = rng.random_range(self.min_turns..=self.max_turns);
        let half = self.pocket_width() / 2.0 * self.jitter;
        let offset = if half > 0.0 {
            rng.random_range(-half..half)
        } else {
            0.0
        };
        self.landing(pocket, full_turns, offset)
    }
}

impl Synthesizer for Wheel {
    type Scenario = WheelLanding;

    fn table(&self) -> &PayoutTable {
        &self.table
    }

    fn synthesize<R: Rng + ?Sized>(&self, outcome: &Outcome, rng: &mut R) -> Synthesis<WheelLanding> {
        let pocket = outcome.result_index();
        self.sampler.sample(
            rng,
            |rng| self.draw(pocket, rng),
            |landing| self.pocket_at(landing.rotation_deg) == pocket,
            |_| self.landing(pocket, self.min_turns, 0.0),
        )
    }

    fn evaluate(&self, scenario: &WheelLanding) -> f64 {
        self.table.get(self.pocket_at(scenario.rotation_deg)).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rv_core::Resolution;

    fn wheel() -> Wheel {
        Wheel::new(PayoutTable::new(vec![0.0, 1.5, 0.0, 2.0, 0.0, 1.5, 0.0, 5.0, 0.0, 1.2]).unwrap())
    }

    #[test]
    fn test_pocket_at() {
        let w = wheel();
        assert_relative_eq!(w.pocket_width(), 36.0);
        assert_eq!(w.pocket_at(0.0), 0);
        assert_eq!(w.pocket_at(35.9), 0);
        assert_eq!(w.pocket_at(36.0), 1);
        assert_eq!(w.pocket_at(359.9), 9);
        assert_eq!(w.pocket_at(720.0 + 18.0 + 36.0 * 7.0), 7);
        assert_eq!(w.pocket_at(-18.0), 9);
    }

    #[test]
    fn test_landing_matches_result_index() {
        let w = wheel();
        let mut rng = StdRng::seed_from_u64(21);
        for index in 0..w.pockets() {
            let m = w.table().get(index).unwrap();
            let outcome = Outcome::reconcile(Resolution::new(index, m), 1.0, w.table()).unwrap();
            for _ in 0..20 {
                let landing = w.synthesize(&outcome, &mut rng).scenario;
                assert_eq!(landing.pocket, index);
                assert_eq!(w.pocket_at(landing.rotation_deg), index);
                assert!((4..=7).contains(&landing.full_turns));
                assert_eq!(w.evaluate(&landing), m);
            }
        }
    }

    #[test]
    fn test_fallback_lands_on_centre() {
        let w = wheel().with_sampler(RejectionSampler::new(0));
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Outcome::reconcile(Resolution::new(3, 2.0), 1.0, w.table()).unwrap();
        let result = w.synthesize(&outcome, &mut rng);
        assert!(result.used_fallback);
        assert_relative_eq!(result.scenario.rotation_deg, 4.0 * 360.0 + 3.5 * 36.0);
    }

    #[test]
    fn test_angles_vary() {
        let w = wheel();
        let mut rng = StdRng::seed_from_u64(8);
        let outcome = Outcome::reconcile(Resolution::new(7, 5.0), 1.0, w.table()).unwrap();
        let a = w.synthesize(&outcome, &mut rng).scenario.rotation_deg;
        let b = w.synthesize(&outcome, &mut rng).scenario.rotation_deg;
        assert_ne!(a, b);
    }
}
