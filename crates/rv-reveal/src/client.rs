//! Outcome client boundary
//!
//! The fairness oracle is a black box: submit a wager and the payout table,
//! get back `{ resultIndex, payoutMultiplier }`. It may be slow and it may
//! fail; it is never retried automatically.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rv_core::{PayoutTable, Resolution, RvError, RvResult};

/// Remote source of verified outcomes
pub trait OutcomeClient: Send + Sync {
    fn resolve(
        &self,
        wager: f64,
        table: &PayoutTable,
    ) -> impl Future<Output = RvResult<Resolution>> + Send;
}

impl<C: OutcomeClient> OutcomeClient for Arc<C> {
    fn resolve(
        &self,
        wager: f64,
        table: &PayoutTable,
    ) -> impl Future<Output = RvResult<Resolution>> + Send {
        (**self).resolve(wager, table)
    }
}

/// Queued answer for a [`SimulatedOracle`]
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    /// Resolve to this table index
    Index(usize),
    /// Return exactly this resolution, even if it contradicts the table
    Raw(Resolution),
    /// Fail with this message
    Fail(String),
}

/// In-process oracle for tests and the demo.
///
/// Picks a uniformly random table index (or the next scripted answer),
/// then waits out its latency before answering.
pub struct SimulatedOracle {
    rng: Mutex<StdRng>,
    latency: Mutex<Duration>,
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicU64,
}

impl SimulatedOracle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: Mutex::new(Duration::ZERO),
            script: Mutex::new(VecDeque::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn latency(&self) -> Duration {
        *self.latency.lock()
    }

    pub fn push(&self, answer: Scripted) {
        self.script.lock().push_back(answer);
    }

    pub fn push_index(&self, index: usize) {
        self.push(Scripted::Index(index));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(Scripted::Fail(message.into()));
    }

    /// Number of resolve calls so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn answer(&self, table: &PayoutTable) -> RvResult<Resolution> {
        let scripted = self.script.lock().pop_front();
        let index = match scripted {
            Some(Scripted::Index(index)) => index,
            Some(Scripted::Raw(resolution)) => return Ok(resolution),
            Some(Scripted::Fail(message)) => return Err(RvError::Resolution(message)),
            None => {
                if table.is_empty() {
                    return Err(RvError::EmptyTable);
                }
                self.rng.lock().random_range(0..table.len())
            }
        };
        let multiplier = table.get(index).unwrap_or(0.0);
        Ok(Resolution::new(index, multiplier))
    }
}

impl OutcomeClient for SimulatedOracle {
    fn resolve(
        &self,
        wager: f64,
        table: &PayoutTable,
    ) -> impl Future<Output = RvResult<Resolution>> + Send {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let answer = self.answer(table);
        let latency = self.latency();
        log::trace!(
            "[Oracle] wager {} over {} entries -> {:?} in {:?}",
            wager,
            table.len(),
            answer,
            latency
        );
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            answer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PayoutTable {
        PayoutTable::new(vec![0.0, 2.0, 2.5]).unwrap()
    }

    #[tokio::test]
    async fn test_scripted_answers_in_order() {
        let oracle = SimulatedOracle::new(1);
        oracle.push_index(2);
        oracle.push_failure("node offline");
        oracle.push(Scripted::Raw(Resolution::new(7, 9.0)));

        assert_eq!(oracle.resolve(1.0, &table()).await, Ok(Resolution::new(2, 2.5)));
        assert_eq!(
            oracle.resolve(1.0, &table()).await,
            Err(RvError::Resolution("node offline".into()))
        );
        assert_eq!(oracle.resolve(1.0, &table()).await, Ok(Resolution::new(7, 9.0)));
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn test_random_answers_match_table() {
        let oracle = Arc::new(SimulatedOracle::new(42));
        let table = table();
        for _ in 0..50 {
            let r = oracle.resolve(1.0, &table).await.unwrap();
            assert_eq!(table.get(r.result_index), Some(r.payout_multiplier));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_honoured() {
        let oracle = SimulatedOracle::new(3).with_latency(Duration::from_millis(800));
        let start = tokio::time::Instant::now();
        oracle.resolve(1.0, &table()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(800));
    }
}
