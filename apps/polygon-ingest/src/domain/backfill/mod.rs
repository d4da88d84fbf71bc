//! Backfill Tracking
//!
//! Records the first bucket epoch observed per symbol over the process
//! lifetime. External gap-detection logic reads this map to decide where
//! historical backfill should start; the ingest path only ever inserts.
//!
//! # Concurrency
//!
//! Handler invocations run on independent tasks with no ordering guarantees,
//! so insertion must be first-writer-wins with no caller-side locking. A
//! `parking_lot::RwLock` over a plain map gives the atomic insert-if-absent
//! needed here; entries are never mutated or removed after insertion.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::RwLock;

/// Process-wide map from raw symbol to first-observed bucket epoch (seconds).
#[derive(Debug, Default)]
pub struct BackfillTracker {
    first_seen: RwLock<HashMap<String, i64>>,
}

impl BackfillTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the first-seen epoch for a symbol.
    ///
    /// Inserts the pair iff the symbol is not already present and returns
    /// whether the insertion happened. Later calls for the same symbol are
    /// no-ops regardless of their epoch.
    pub fn record_first_seen(&self, symbol: &str, epoch_secs: i64) -> bool {
        match self.first_seen.write().entry(symbol.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(epoch_secs);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Get the first-seen epoch for a symbol, if any.
    #[must_use]
    pub fn first_seen(&self, symbol: &str) -> Option<i64> {
        self.first_seen.read().get(symbol).copied()
    }

    /// Number of tracked symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.first_seen.read().len()
    }

    /// Whether no symbol has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_seen.read().is_empty()
    }

    /// Copy out the full map for external gap-detection consumers.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.first_seen.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn first_insert_wins() {
        let tracker = BackfillTracker::new();
        assert!(tracker.record_first_seen("AAPL", 1_700_000_000));
        assert!(!tracker.record_first_seen("AAPL", 1_600_000_000));
        assert_eq!(tracker.first_seen("AAPL"), Some(1_700_000_000));
    }

    #[test]
    fn symbols_are_independent() {
        let tracker = BackfillTracker::new();
        assert!(tracker.record_first_seen("AAPL", 1));
        assert!(tracker.record_first_seen("MSFT", 2));
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.first_seen("MSFT"), Some(2));
        assert_eq!(tracker.first_seen("TSLA"), None);
    }

    #[test]
    fn snapshot_copies_state() {
        let tracker = BackfillTracker::new();
        tracker.record_first_seen("SPY", 60);
        let snap = tracker.snapshot();
        assert_eq!(snap.get("SPY"), Some(&60));
        // Mutations after the snapshot are not reflected.
        tracker.record_first_seen("QQQ", 120);
        assert!(!snap.contains_key("QQQ"));
    }

    #[test]
    fn concurrent_inserts_admit_exactly_one_winner() {
        let tracker = Arc::new(BackfillTracker::new());
        let mut handles = Vec::new();

        for epoch in 0..32i64 {
            let tracker = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                tracker.record_first_seen("NVDA", epoch)
            }));
        }

        let wins: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(wins, 1);
        let stored = tracker.first_seen("NVDA").unwrap();
        assert!((0..32).contains(&stored));
        // Losers must not have changed the stored epoch.
        assert!(!tracker.record_first_seen("NVDA", 999));
        assert_eq!(tracker.first_seen("NVDA"), Some(stored));
    }
}
