use tracing::trace;

use super::SortEngine;
use crate::error::Result;
use crate::progress::fraction;
use crate::store::SequenceStore;

/// Quick sort with Lomuto partitioning around the last element.
///
/// Ranges are kept on an explicit stack rather than the call stack, so
/// already-sorted input (the worst case for a last-element pivot) cannot
/// overflow the worker thread. The right half is pushed first so the left
/// half is still processed first.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickSort;

impl SortEngine for QuickSort {
    fn sort(&self, store: &mut SequenceStore) -> Result<()> {
        let n = store.len();
        if n == 0 {
            return Ok(());
        }

        let mut pending = vec![(0, n - 1, 0usize)];
        let mut finalized = 0;
        while let Some((low, high, depth)) = pending.pop() {
            if low == high {
                store.mark_sorted(low)?;
            } else {
                let pivot = partition(store, low, high)?;
                store.mark_sorted(pivot)?;
                if pivot < high {
                    pending.push((pivot + 1, high, depth + 1));
                }
                if pivot > low {
                    pending.push((low, pivot - 1, depth + 1));
                }
            }
            finalized += 1;
            store.progress(fraction(finalized, n), format!("Quick Sort: Depth {depth}"));
        }
        Ok(())
    }
}

/// Partition `[low, high]` and return the pivot's final index.
fn partition(store: &mut SequenceStore, low: usize, high: usize) -> Result<usize> {
    let pivot = store.read(high)?;
    store.mark_pivot(high)?;
    trace!(low, high, pivot, "partition");

    // Next slot for an element not greater than the pivot.
    let mut boundary = low;
    for j in low..high {
        if !store.compare(j, high)? {
            store.swap(boundary, j)?;
            boundary += 1;
        }
    }
    store.swap(boundary, high)?;
    store.clear([high])?;
    Ok(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;
    use crate::testing::{run_engine, run_engine_recorded};

    #[test]
    fn partitions_around_last_element() {
        let (values, stats) = run_engine(&QuickSort, &[3, 1, 2]);
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(stats.comparisons, 2);
        assert_eq!(stats.swaps, 2);
    }

    #[test]
    fn pivot_is_highlighted_before_partitioning() {
        let (_, sink) = run_engine_recorded(&QuickSort, &[3, 1, 2]);
        let steps = sink.steps();
        assert_eq!(steps[0].kind(), StepKind::MarkPivot);
        assert_eq!(steps[0].indices(), &[2]);
        assert_eq!(steps[1].kind(), StepKind::Compare);
    }

    #[test]
    fn pivot_highlight_is_cleared_after_partitioning() {
        let (_, sink) = run_engine_recorded(&QuickSort, &[3, 1, 2]);
        let kinds: Vec<_> = sink.steps().iter().map(|s| s.kind()).collect();
        let reset = kinds.iter().position(|k| *k == StepKind::Reset).unwrap();
        let sorted = kinds.iter().position(|k| *k == StepKind::MarkSorted).unwrap();
        assert!(reset < sorted);
        assert_eq!(sink.steps()[reset].indices(), &[2]);
    }

    #[test]
    fn every_position_is_finalized_exactly_once() {
        let input = [9, 4, 7, 1, 8, 2, 2, 6];
        let (values, sink) = run_engine_recorded(&QuickSort, &input);
        assert_eq!(values, vec![1, 2, 2, 4, 6, 7, 8, 9]);
        let mut marked: Vec<usize> = sink
            .steps()
            .iter()
            .filter(|s| s.kind() == StepKind::MarkSorted)
            .map(|s| s.indices()[0])
            .collect();
        marked.sort_unstable();
        assert_eq!(marked, (0..input.len()).collect::<Vec<_>>());
    }

    #[test]
    fn sorted_input_is_handled_without_recursion() {
        let input: Vec<u32> = (0..500).collect();
        let (values, stats) = run_engine(&QuickSort, &input);
        assert_eq!(values, input);
        assert_eq!(stats.swaps, 0);
    }

    #[test]
    fn progress_reaches_ceiling_on_last_finalized_position() {
        let (_, sink) = run_engine_recorded(&QuickSort, &[5, 4, 3, 2, 1]);
        let progress = sink.progress();
        assert!(progress.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(progress.last().map(|p| p.percent), Some(99.0));
        assert!(progress[0].label.starts_with("Quick Sort: Depth 0"));
    }
}
