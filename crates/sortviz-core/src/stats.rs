//! Run statistics.
//!
//! [`StatsAggregator`] is a cheaply cloneable handle over three atomic
//! counters. The [`SequenceStore`](crate::SequenceStore) is the only writer;
//! the session keeps a clone so observers can take snapshots while a run is
//! in flight.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunStatistics {
    pub comparisons: u64,
    pub swaps: u64,
    pub array_accesses: u64,
}

impl RunStatistics {
    /// Sum of all counters.
    #[must_use]
    pub fn total_operations(&self) -> u64 {
        self.comparisons + self.swaps + self.array_accesses
    }

    /// True when every counter of `self` is at least the matching counter of
    /// `earlier`.
    #[must_use]
    pub fn dominates(&self, earlier: &Self) -> bool {
        self.comparisons >= earlier.comparisons
            && self.swaps >= earlier.swaps
            && self.array_accesses >= earlier.array_accesses
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "comparisons={} swaps={} accesses={}",
            self.comparisons, self.swaps, self.array_accesses
        )
    }
}

#[derive(Debug, Default)]
struct Counters {
    comparisons: AtomicU64,
    swaps: AtomicU64,
    array_accesses: AtomicU64,
}

/// Shared counter handle.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    inner: Arc<Counters>,
}

impl StatsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_comparison(&self) {
        self.inner.comparisons.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_swap(&self) {
        self.inner.swaps.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accesses(&self, n: u64) {
        self.inner.array_accesses.fetch_add(n, Ordering::Relaxed);
    }

    /// Zero all counters.
    pub fn reset(&self) {
        self.inner.comparisons.store(0, Ordering::Relaxed);
        self.inner.swaps.store(0, Ordering::Relaxed);
        self.inner.array_accesses.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> RunStatistics {
        RunStatistics {
            comparisons: self.inner.comparisons.load(Ordering::Relaxed),
            swaps: self.inner.swaps.load(Ordering::Relaxed),
            array_accesses: self.inner.array_accesses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_aggregator_is_zeroed() {
        assert_eq!(StatsAggregator::new().snapshot(), RunStatistics::default());
    }

    #[test]
    fn clones_share_counters() {
        let stats = StatsAggregator::new();
        let observer = stats.clone();
        stats.record_comparison();
        stats.record_swap();
        stats.record_accesses(4);
        assert_eq!(
            observer.snapshot(),
            RunStatistics {
                comparisons: 1,
                swaps: 1,
                array_accesses: 4,
            }
        );
    }

    #[test]
    fn reset_zeroes_everything() {
        let stats = StatsAggregator::new();
        stats.record_comparison();
        stats.record_accesses(2);
        stats.reset();
        assert_eq!(stats.snapshot(), RunStatistics::default());
    }

    #[test]
    fn total_operations_sums_counters() {
        let stats = RunStatistics {
            comparisons: 3,
            swaps: 2,
            array_accesses: 10,
        };
        assert_eq!(stats.total_operations(), 15);
    }

    #[test]
    fn dominates_is_componentwise() {
        let early = RunStatistics {
            comparisons: 1,
            swaps: 0,
            array_accesses: 2,
        };
        let late = RunStatistics {
            comparisons: 2,
            swaps: 0,
            array_accesses: 4,
        };
        assert!(late.dominates(&early));
        assert!(!early.dominates(&late));
    }
}
