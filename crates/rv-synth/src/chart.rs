//! Crash charts
//!
//! The player picks a target multiplier `T > 1`; the table is `[0, T]`. A win
//! is any crash point at or above `T`, a loss any point in `[1, T)`.
//!
//! Losing crash points follow a power law, `1 + r^k (T − 1)` with `k` growing
//! with the target, so most losses die early. A small share are near misses
//! that crash just short of the target.

use rand::Rng;
use serde::{Deserialize, Serialize};

use rv_core::{Outcome, PayoutTable, RvError, RvResult};

use crate::Synthesizer;
use crate::sampler::{RejectionSampler, Synthesis};

/// Share of losing charts drawn as near misses
pub const NEAR_MISS_PROBABILITY: f64 = 0.06;

/// Log-growth per candle
const CANDLE_STEP: f64 = 0.05;
const MIN_CANDLES: usize = 3;
const MAX_CANDLES: usize = 120;

/// Largest float strictly below `x` (for positive finite `x`)
fn below(x: f64) -> f64 {
    f64::from_bits(x.to_bits() - 1)
}

/// Power-law exponent for a target
pub fn loss_exponent(target: f64) -> f64 {
    if target < 2.0 {
        1.5
    } else if target < 5.0 {
        2.0
    } else if target < 20.0 {
        3.0
    } else {
        4.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// One synthesized round: where it crashed and how it got there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashChart {
    pub target: f64,
    pub crash_point: f64,
    pub candles: Vec<Candle>,
}

impl CrashChart {
    pub fn reached_target(&self) -> bool {
        self.crash_point >= self.target
    }
}

#[derive(Debug, Clone)]
pub struct ChartGame {
    target: f64,
    table: PayoutTable,
    max_crash: f64,
    near_miss: f64,
    sampler: RejectionSampler,
}

impl ChartGame {
    pub fn new(target: f64) -> RvResult<Self> {
        if !target.is_finite() || target <= 1.0 {
            return Err(RvError::Config(format!(
                "chart target must be a finite multiplier above 1, got {}",
                target
            )));
        }
        Ok(Self {
            target,
            table: PayoutTable::new(vec![0.0, target])?,
            max_crash: (target * 10.0).min(f64::MAX).max(10.0),
            near_miss: NEAR_MISS_PROBABILITY,
            sampler: RejectionSampler::default(),
        })
    }

    pub fn with_near_miss(mut self, probability: f64) -> Self {
        self.near_miss = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_sampler(mut self, sampler: RejectionSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Crash point in `[1, T)`
    pub fn losing_crash<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let t = self.target;
        let k = loss_exponent(t);
        let r: f64 = rng.random();
        let crash = if rng.random_bool(self.near_miss) {
            t - (t - 1.0) * r.powf(3.0 * k)
        } else {
            1.0 + r.powf(k) * (t - 1.0)
        };
        crash.clamp(1.0, below(t))
    }

    /// Crash point in `[T, max_crash]`
    pub fn winning_crash<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let t = self.target;
        let r: f64 = rng.random();
        (t + r.powf(loss_exponent(t)) * (self.max_crash - t)).max(t)
    }

    /// Candle path from 1.0 up to `crash`, closing exactly on it
    pub fn candles<R: Rng + ?Sized>(&self, crash: f64, rng: &mut R) -> Vec<Candle> {
        let n = ((crash.ln() / CANDLE_STEP).ceil() as usize).clamp(MIN_CANDLES, MAX_CANDLES);
        let point = |k: usize| crash.powf(k as f64 / n as f64);

        (1..=n)
            .map(|k| {
                let open = point(k - 1);
                let close = if k == n { crash } else { point(k) };
                let wick: f64 = rng.random_range(0.0..0.02);
                Candle {
                    open,
                    close,
                    high: (close * (1.0 + wick)).min(crash).max(close),
                    low: (open * (1.0 - wick)).max(1.0).min(open),
                }
            })
            .collect()
    }

    fn chart<R: Rng + ?Sized>(&self, crash: f64, rng: &mut R) -> CrashChart {
        CrashChart {
            target: self.target,
            crash_point: crash,
            candles: self.candles(crash, rng),
        }
    }
}

impl Synthesizer for ChartGame {
    type Scenario = CrashChart;

    fn table(&self) -> &PayoutTable {
        &self.table
    }

    fn synthesize<R: Rng + ?Sized>(&self, outcome: &Outcome, rng: &mut R) -> Synthesis<CrashChart> {
        let win = outcome.is_win();
        let t = self.target;
        let crash = if win {
            self.sampler.sample(
                rng,
                |rng| self.winning_crash(rng),
                |&c| c >= t,
                |_| t,
            )
        } else {
            self.sampler.sample(
                rng,
                |rng| self.losing_crash(rng),
                |&c| (1.0..t).contains(&c),
                |_| 1.0,
            )
        };
        let Synthesis {
            scenario,
            attempts,
            used_fallback,
        } = crash;
        Synthesis {
            scenario: self.chart(scenario, rng),
            attempts,
            used_fallback,
        }
    }

    fn evaluate(&self, scenario: &CrashChart) -> f64 {
        if scenario.crash_point >= self.target {
            self.target
        } else {
            0.0
        }
    }
}
