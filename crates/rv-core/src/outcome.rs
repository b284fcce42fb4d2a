//! Resolved outcomes
//!
//! The oracle answers with a bare [`Resolution`]. It only becomes an
//! [`Outcome`] after it has been reconciled against the table that was
//! submitted, so no synthesizer ever sees an index outside the table or a
//! multiplier that contradicts it.

use serde::{Deserialize, Serialize};

use crate::error::{RvError, RvResult};
use crate::payout::{PayoutTable, multipliers_match};

/// Raw oracle answer: `{ resultIndex, payoutMultiplier }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub result_index: usize,
    pub payout_multiplier: f64,
}

impl Resolution {
    pub fn new(result_index: usize, payout_multiplier: f64) -> Self {
        Self {
            result_index,
            payout_multiplier,
        }
    }
}

/// Reconciled result of one play
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    result_index: usize,
    payout_multiplier: f64,
    wager: f64,
}

impl Outcome {
    /// Check a resolution against the submitted table.
    ///
    /// The stored multiplier is the table's own entry, so downstream exact
    /// comparisons never depend on how the oracle formatted its number.
    pub fn reconcile(resolution: Resolution, wager: f64, table: &PayoutTable) -> RvResult<Self> {
        let expected = table.get(resolution.result_index).ok_or_else(|| {
            RvError::OutcomeMismatch(format!(
                "result index {} outside table of length {}",
                resolution.result_index,
                table.len()
            ))
        })?;

        if !multipliers_match(expected, resolution.payout_multiplier) {
            return Err(RvError::OutcomeMismatch(format!(
                "multiplier {} at index {} but table holds {}",
                resolution.payout_multiplier, resolution.result_index, expected
            )));
        }

        Ok(Self {
            result_index: resolution.result_index,
            payout_multiplier: expected,
            wager,
        })
    }

    pub fn result_index(&self) -> usize {
        self.result_index
    }

    pub fn payout_multiplier(&self) -> f64 {
        self.payout_multiplier
    }

    pub fn wager(&self) -> f64 {
        self.wager
    }

    /// Amount paid back to the player
    pub fn payout_amount(&self) -> f64 {
        self.wager * self.payout_multiplier
    }

    pub fn is_win(&self) -> bool {
        self.payout_multiplier > 0.0
    }
}
