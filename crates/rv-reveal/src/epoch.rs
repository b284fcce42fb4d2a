//! Play epoch counter

use serde::Serialize;

/// Monotonically increasing play counter.
///
/// Bumped exactly once per play, and only through [`PlayEpoch::advance`].
/// Deferred work carries the epoch it was scheduled under and is discarded
/// when that is no longer the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PlayEpoch(u64);

impl PlayEpoch {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn current(&self) -> u64 {
        self.0
    }

    /// Start a new play and return its epoch
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut epoch = PlayEpoch::new();
        assert_eq!(epoch.current(), 0);
        assert_eq!(epoch.advance(), 1);
        assert_eq!(epoch.advance(), 2);
        assert!(epoch.is_current(2));
        assert!(!epoch.is_current(1));
    }
}
