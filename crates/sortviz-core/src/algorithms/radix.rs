use super::SortEngine;
use crate::error::Result;
use crate::progress::fraction;
use crate::store::SequenceStore;

const RADIX: u32 = 10;

/// Least-significant-digit radix sort in base 10.
///
/// Each digit pass counts, distributes into an output buffer from the end
/// (keeping the pass stable), then copies the buffer back. No element is
/// ever compared with another.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadixSort;

impl SortEngine for RadixSort {
    fn sort(&self, store: &mut SequenceStore) -> Result<()> {
        let n = store.len();
        if n == 0 {
            return Ok(());
        }

        let mut max = 0;
        for index in 0..n {
            max = max.max(store.read(index)?);
        }
        let digits = max.checked_ilog10().map_or(1, |d| d + 1);

        for digit in 0..digits {
            counting_pass(store, digit, RADIX.pow(digit))?;
            store.progress(
                fraction(digit as usize + 1, digits as usize),
                format!("Radix Sort: Digit {}/{digits}", digit + 1),
            );
        }
        Ok(())
    }
}

fn bucket(value: u32, divisor: u32) -> usize {
    (value / divisor % RADIX) as usize
}

fn counting_pass(store: &mut SequenceStore, digit: u32, divisor: u32) -> Result<()> {
    let n = store.len();
    let mut counts = [0usize; RADIX as usize];
    let count_meta = [("phase", "count".to_string()), ("digit", digit.to_string())];
    for index in 0..n {
        let value = store.probe_with(index, &count_meta)?;
        counts[bucket(value, divisor)] += 1;
    }

    // Prefix sums turn counts into one-past-the-end slots per bucket.
    for b in 1..counts.len() {
        counts[b] += counts[b - 1];
    }

    let mut output = vec![0; n];
    for index in (0..n).rev() {
        let (value, slot) = store.stage(index, |value| {
            let end = &mut counts[bucket(value, divisor)];
            *end -= 1;
            *end
        })?;
        output[slot] = value;
    }

    for (index, value) in output.into_iter().enumerate() {
        store.write(index, value)?;
    }
    store.clear(0..n)
}
