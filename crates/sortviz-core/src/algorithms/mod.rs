//! The six sorting engines.
//!
//! Every engine implements [`SortEngine`] and works exclusively through the
//! [`SequenceStore`] it is handed, so all of its reads, compares and
//! mutations are counted and observable. Engines keep no state between
//! invocations.

mod bubble;
mod insertion;
mod merge;
mod quick;
mod radix;
mod selection;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::SequenceStore;
use crate::step::StepKind;

pub use bubble::BubbleSort;
pub use insertion::InsertionSort;
pub use merge::MergeSort;
pub use quick::QuickSort;
pub use radix::RadixSort;
pub use selection::SelectionSort;

/// A sorting procedure driven through a [`SequenceStore`].
pub trait SortEngine: Send + Sync {
    /// Sort the store ascending. Returns early with
    /// [`EngineError::Cancelled`](crate::EngineError::Cancelled) when the
    /// run is cancelled.
    fn sort(&self, store: &mut SequenceStore) -> Result<()>;
}

/// Selectable algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    #[default]
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Radix,
}

impl Algorithm {
    /// All algorithms in menu order.
    pub const ALL: [Self; 6] = [
        Self::Bubble,
        Self::Selection,
        Self::Insertion,
        Self::Merge,
        Self::Quick,
        Self::Radix,
    ];

    /// Stable identifier used in configuration files and on the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Selection => "selection",
            Self::Insertion => "insertion",
            Self::Merge => "merge",
            Self::Quick => "quick",
            Self::Radix => "radix",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bubble => "Bubble Sort",
            Self::Selection => "Selection Sort",
            Self::Insertion => "Insertion Sort",
            Self::Merge => "Merge Sort",
            Self::Quick => "Quick Sort",
            Self::Radix => "Radix Sort",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Bubble => {
                "Compares adjacent elements and swaps them if they are in the wrong order. \
                 Repeats until the array is sorted."
            }
            Self::Selection => {
                "Finds the minimum element and places it at the beginning. \
                 Repeats for the remaining unsorted portion."
            }
            Self::Insertion => {
                "Builds the sorted array one element at a time by inserting each element \
                 in its correct position."
            }
            Self::Merge => {
                "Divides the array into halves, recursively sorts them, and then merges \
                 the sorted halves."
            }
            Self::Quick => {
                "Picks a pivot element and partitions the array around it, then recursively \
                 sorts the partitions."
            }
            Self::Radix => {
                "Sorts numbers by processing individual digits from least to most \
                 significant digit."
            }
        }
    }

    /// Big-O time complexity as shown next to the name.
    #[must_use]
    pub const fn complexity(self) -> &'static str {
        match self {
            Self::Bubble | Self::Selection | Self::Insertion => "O(n²)",
            Self::Merge | Self::Quick => "O(n log n)",
            Self::Radix => "O(nk)",
        }
    }

    #[must_use]
    pub fn engine(self) -> &'static dyn SortEngine {
        match self {
            Self::Bubble => &BubbleSort,
            Self::Selection => &SelectionSort,
            Self::Insertion => &InsertionSort,
            Self::Merge => &MergeSort,
            Self::Quick => &QuickSort,
            Self::Radix => &RadixSort,
        }
    }

    /// Step through the menu, wrapping at either end.
    #[must_use]
    pub fn cycle(self, direction: i32) -> Self {
        let len = Self::ALL.len() as i32;
        let current = Self::ALL
            .iter()
            .position(|a| *a == self)
            .unwrap_or_default() as i32;
        Self::ALL[(current + direction).rem_euclid(len) as usize]
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm `{0}` (expected one of bubble, selection, insertion, merge, quick, radix)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.key() == wanted || a.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Run `algorithm` to completion and play the completion sweep: every
/// position is marked sorted left to right, then a `Done` step closes the
/// run.
pub fn run(algorithm: Algorithm, store: &mut SequenceStore) -> Result<()> {
    run_with(algorithm.engine(), algorithm, store)
}

/// [`run`] with a caller-supplied engine. `algorithm` only labels the run in
/// logs and in the final progress update.
pub fn run_with(
    engine: &dyn SortEngine,
    algorithm: Algorithm,
    store: &mut SequenceStore,
) -> Result<()> {
    debug!(algorithm = algorithm.key(), len = store.len(), "engine start");
    engine.sort(store)?;
    for index in 0..store.len() {
        store.mark_sorted(index)?;
    }
    store.signal(StepKind::Done)?;
    store
        .emitter()
        .complete(format!("{} completed!", algorithm.name()));
    debug!(
        algorithm = algorithm.key(),
        stats = %store.stats(),
        "engine finished"
    );
    Ok(())
}
