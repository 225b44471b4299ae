use tracing::debug;

use super::SortEngine;
use crate::error::Result;
use crate::progress::fraction;
use crate::store::SequenceStore;

/// Adjacent-swap bubble sort with early exit on a swap-free pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct BubbleSort;

impl SortEngine for BubbleSort {
    fn sort(&self, store: &mut SequenceStore) -> Result<()> {
        let n = store.len();
        if n < 2 {
            return Ok(());
        }
        let passes = n - 1;
        let total = n * (n - 1) / 2;
        let mut compared = 0;

        for pass in 0..passes {
            let mut swapped = false;
            for j in 0..n - 1 - pass {
                if store.compare(j, j + 1)? {
                    store.swap(j, j + 1)?;
                    swapped = true;
                }
                compared += 1;
                store.progress(
                    fraction(compared, total),
                    format!("Bubble Sort: Pass {}/{passes}", pass + 1),
                );
            }
            store.clear(0..n - pass)?;
            store.mark_sorted(n - 1 - pass)?;
            if !swapped {
                debug!(pass = pass + 1, "bubble sort: swap-free pass, stopping early");
                break;
            }
        }

        // The sorted marker is independent of where the loop stopped.
        for index in 0..n - 1 {
            store.mark_sorted(index)?;
        }
        Ok(())
    }
}
