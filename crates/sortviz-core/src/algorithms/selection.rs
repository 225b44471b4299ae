use super::SortEngine;
use crate::error::Result;
use crate::progress::fraction;
use crate::store::SequenceStore;

/// Selection sort: find the minimum of the unsorted tail, swap it into place.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionSort;

impl SortEngine for SelectionSort {
    fn sort(&self, store: &mut SequenceStore) -> Result<()> {
        let n = store.len();
        if n == 0 {
            return Ok(());
        }

        for i in 0..n - 1 {
            let mut min = i;
            store.mark_pivot(min)?;
            for j in i + 1..n {
                // `compare(min, j)` is true when the candidate is larger.
                if store.compare(min, j)? {
                    min = j;
                    store.mark_pivot(min)?;
                }
            }
            store.swap(i, min)?;
            store.clear([min])?;
            store.mark_sorted(i)?;
            store.progress(
                fraction(i + 1, n),
                format!("Selection Sort: Position {}/{n}", i + 1),
            );
        }
        store.mark_sorted(n - 1)
    }
}
