//! Error types for RevealForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RvError {
    #[error("Payout table is empty")]
    EmptyTable,

    #[error("Invalid multiplier at index {index}: {value}")]
    InvalidMultiplier { index: usize, value: f64 },

    #[error("Invalid wager: {0}")]
    InvalidWager(f64),

    #[error("Wager {wager} could pay {payout}, above the maximum payout {max_payout}")]
    WagerAboveLimit {
        wager: f64,
        payout: f64,
        max_payout: f64,
    },

    #[error("Outcome mismatch: {0}")]
    OutcomeMismatch(String),

    #[error("Outcome resolution failed: {0}")]
    Resolution(String),

    #[error("Outcome resolution timed out after {0} ms")]
    ResolutionTimeout(u64),

    #[error("A play is already waiting for its outcome")]
    PlayInFlight,

    #[error("Game instance was torn down")]
    TornDown,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RvError {
    /// Only resolution failures are shown to the player; everything else is
    /// internal consistency.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Resolution(_) | Self::ResolutionTimeout(_))
    }
}

impl From<std::io::Error> for RvError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias
pub type RvResult<T> = Result<T, RvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors() {
        assert!(RvError::Resolution("oracle offline".into()).is_user_facing());
        assert!(RvError::ResolutionTimeout(5000).is_user_facing());
        assert!(!RvError::TornDown.is_user_facing());
        assert!(!RvError::OutcomeMismatch("index".into()).is_user_facing());
    }
}
