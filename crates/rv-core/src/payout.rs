//! Payout tables
//!
//! A payout table is the only legal set of outcomes for one play. It is
//! submitted to the fairness oracle verbatim and the oracle answers with an
//! index into it.

use serde::{Deserialize, Serialize};

use crate::error::{RvError, RvResult};

/// Tolerance used when matching a resolved multiplier against table entries
pub const MULTIPLIER_EPSILON: f64 = 1e-9;

/// Compare two multipliers
#[inline]
pub fn multipliers_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= MULTIPLIER_EPSILON
}

/// Ordered, fixed-length sequence of non-negative multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PayoutTable {
    multipliers: Vec<f64>,
}

impl PayoutTable {
    /// Create a table, rejecting empty tables and negative or non-finite entries
    pub fn new(multipliers: Vec<f64>) -> RvResult<Self> {
        if multipliers.is_empty() {
            return Err(RvError::EmptyTable);
        }
        for (index, &value) in multipliers.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(RvError::InvalidMultiplier { index, value });
            }
        }
        Ok(Self { multipliers })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    /// Multiplier at index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.multipliers.get(index).copied()
    }

    /// Raw multipliers
    pub fn as_slice(&self) -> &[f64] {
        &self.multipliers
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.multipliers.iter().copied()
    }

    /// Largest multiplier in the table
    pub fn max_multiplier(&self) -> f64 {
        self.multipliers.iter().copied().fold(0.0, f64::max)
    }

    /// Distinct nonzero multipliers, ascending.
    ///
    /// These are the display categories of a game (slot chip labels, hand tiers).
    pub fn categories(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .multipliers
            .iter()
            .copied()
            .filter(|&m| m > 0.0)
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup_by(|a, b| multipliers_match(*a, *b));
        values
    }

    /// Category index of a multiplier, if it is one of the table's nonzero values
    pub fn category_of(&self, multiplier: f64) -> Option<usize> {
        self.categories()
            .iter()
            .position(|&c| multipliers_match(c, multiplier))
    }

    /// All indices carrying the given multiplier
    pub fn indices_of(&self, multiplier: f64) -> Vec<usize> {
        self.multipliers
            .iter()
            .enumerate()
            .filter(|(_, m)| multipliers_match(**m, multiplier))
            .map(|(i, _)| i)
            .collect()
    }

    /// Does the table contain at least one losing (zero) entry?
    pub fn has_losing_entry(&self) -> bool {
        self.multipliers.iter().any(|&m| m == 0.0)
    }
}

impl TryFrom<Vec<f64>> for PayoutTable {
    type Error = RvError;

    fn try_from(multipliers: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(multipliers)
    }
}

impl From<PayoutTable> for Vec<f64> {
    fn from(table: PayoutTable) -> Self {
        table.multipliers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_negative() {
        assert_eq!(PayoutTable::new(vec![]), Err(RvError::EmptyTable));
        assert_eq!(
            PayoutTable::new(vec![0.0, -1.0]),
            Err(RvError::InvalidMultiplier {
                index: 1,
                value: -1.0
            })
        );
        assert!(PayoutTable::new(vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_categories_are_sorted_and_distinct() {
        let table = PayoutTable::new(vec![2.0, 0.0, 2.5, 2.0, 1.0, 0.0]).unwrap();
        assert_eq!(table.categories(), vec![1.0, 2.0, 2.5]);
        assert_eq!(table.category_of(2.5), Some(2));
        assert_eq!(table.category_of(0.0), None);
        assert_eq!(table.indices_of(2.0), vec![0, 3]);
        assert_eq!(table.max_multiplier(), 2.5);
        assert!(table.has_losing_entry());
    }

    #[test]
    fn test_deserialize_validates() {
        let table: PayoutTable = serde_json::from_str("[0, 2, 2.5]").unwrap();
        assert_eq!(table.len(), 3);
        assert!(serde_json::from_str::<PayoutTable>("[]").is_err());
        assert!(serde_json::from_str::<PayoutTable>("[1, -2]").is_err());
    }
}
