//! Wager validation performed before a table is sent to the oracle

use serde::{Deserialize, Serialize};

use crate::error::{RvError, RvResult};
use crate::payout::PayoutTable;

/// Platform wager limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WagerLimits {
    /// Smallest accepted wager
    pub min_wager: f64,
    /// Largest amount a single play may pay out
    pub max_payout: f64,
}

impl Default for WagerLimits {
    fn default() -> Self {
        Self {
            min_wager: 0.01,
            max_payout: 100_000.0,
        }
    }
}

impl WagerLimits {
    /// Validate a wager against these limits for the given table.
    ///
    /// The wager must be positive and finite, at least `min_wager`, and the best
    /// entry of the table must not pay more than `max_payout`.
    pub fn validate(&self, wager: f64, table: &PayoutTable) -> RvResult<()> {
        if !wager.is_finite() || wager <= 0.0 || wager < self.min_wager {
            return Err(RvError::InvalidWager(wager));
        }

        let payout = wager * table.max_multiplier();
        if payout > self.max_payout {
            log::debug!(
                "[Wager] rejected {} (max payout {} > {})",
                wager,
                payout,
                self.max_payout
            );
            return Err(RvError::WagerAboveLimit {
                wager,
                payout,
                max_payout: self.max_payout,
            });
        }

        Ok(())
    }

    /// Largest wager accepted for a table
    pub fn max_wager(&self, table: &PayoutTable) -> f64 {
        let best = table.max_multiplier();
        if best <= 0.0 {
            f64::INFINITY
        } else {
            self.max_payout / best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_wager() {
        let limits = WagerLimits {
            min_wager: 1.0,
            max_payout: 100.0,
        };
        let table = PayoutTable::new(vec![0.0, 2.0, 2.5]).unwrap();

        assert!(limits.validate(10.0, &table).is_ok());
        assert!(limits.validate(40.0, &table).is_ok());
        assert_eq!(limits.validate(0.0, &table), Err(RvError::InvalidWager(0.0)));
        assert_eq!(limits.validate(0.5, &table), Err(RvError::InvalidWager(0.5)));
        assert!(limits.validate(f64::INFINITY, &table).is_err());
        assert!(matches!(
            limits.validate(41.0, &table),
            Err(RvError::WagerAboveLimit { .. })
        ));
        assert_eq!(limits.max_wager(&table), 40.0);
    }
}
