use super::SortEngine;
use crate::error::Result;
use crate::store::SequenceStore;

/// Top-down merge sort over inclusive index ranges.
///
/// Progress is an estimate: elements written so far against `n·⌈log₂ n⌉`,
/// which is exact only for power-of-two lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSort;

struct MergeRun {
    written: usize,
    budget: usize,
}

impl SortEngine for MergeSort {
    fn sort(&self, store: &mut SequenceStore) -> Result<()> {
        let n = store.len();
        if n < 2 {
            return Ok(());
        }
        let levels = n.next_power_of_two().trailing_zeros() as usize;
        let mut run = MergeRun {
            written: 0,
            budget: n * levels.max(1),
        };
        sort_range(store, &mut run, 0, n - 1, 0)
    }
}

fn sort_range(
    store: &mut SequenceStore,
    run: &mut MergeRun,
    left: usize,
    right: usize,
    depth: usize,
) -> Result<()> {
    if left >= right {
        return Ok(());
    }
    let mid = (left + right) / 2;
    sort_range(store, run, left, mid, depth + 1)?;
    sort_range(store, run, mid + 1, right, depth + 1)?;
    merge(store, left, mid, right)?;

    run.written += right - left + 1;
    store.progress(
        run.written as f64 / run.budget as f64 * 100.0,
        format!("Merge Sort: Merging [{left}..{right}] at depth {depth}"),
    );
    Ok(())
}

fn merge(store: &mut SequenceStore, left: usize, mid: usize, right: usize) -> Result<()> {
    let lhs = snapshot(store, left, mid)?;
    let rhs = snapshot(store, mid + 1, right)?;
    let (mut i, mut j, mut k) = (0, 0, left);

    while i < lhs.len() && j < rhs.len() {
        // Out of order means the right head is smaller; ties keep the left.
        if store.compare_values(lhs[i], rhs[j], (left + i, mid + 1 + j))? {
            store.write(k, rhs[j])?;
            j += 1;
        } else {
            store.write(k, lhs[i])?;
            i += 1;
        }
        k += 1;
    }
    for &value in lhs[i..].iter().chain(&rhs[j..]) {
        store.write(k, value)?;
        k += 1;
    }
    store.clear(left..=right)
}

fn snapshot(store: &mut SequenceStore, from: usize, to: usize) -> Result<Vec<u32>> {
    (from..=to).map(|index| store.read(index)).collect()
}
