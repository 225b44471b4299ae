use super::SortEngine;
use crate::error::Result;
use crate::progress::fraction;
use crate::store::SequenceStore;

/// Insertion sort with right-shifts (overwrites) rather than swaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionSort;

impl SortEngine for InsertionSort {
    fn sort(&self, store: &mut SequenceStore) -> Result<()> {
        let n = store.len();
        if n == 0 {
            return Ok(());
        }
        store.mark_sorted(0)?;

        for i in 1..n {
            let key = store.probe(i)?;
            let mut hole = i;
            while hole > 0 {
                let prev = store.read(hole - 1)?;
                if !store.compare_values(prev, key, (hole - 1, i))? {
                    break;
                }
                store.write(hole, prev)?;
                hole -= 1;
            }
            store.write(hole, key)?;
            store.mark_sorted(hole)?;
            store.clear(hole..=i)?;
            store.progress(
                fraction(i, n - 1),
                format!("Insertion Sort: Element {}/{n}", i + 1),
            );
        }
        Ok(())
    }
}
