//! The instrumented sequence.
//!
//! [`SequenceStore`] owns the values for the duration of a run. Every
//! operation an engine performs goes through it, so every read is counted
//! and every compare or mutation becomes exactly one [`Step`]. Operations
//! check for cancellation before touching the values: once a cancel has been
//! observed nothing else is mutated.

use crate::emitter::StepEmitter;
use crate::error::{EngineError, Result};
use crate::stats::{RunStatistics, StatsAggregator};
use crate::step::{Step, StepKind};

/// Owned, counted, observable sequence of non-negative integers.
#[derive(Debug)]
pub struct SequenceStore {
    values: Vec<u32>,
    stats: StatsAggregator,
    emitter: StepEmitter,
}

impl SequenceStore {
    pub fn new(values: Vec<u32>, stats: StatsAggregator, emitter: StepEmitter) -> Self {
        Self {
            values,
            stats,
            emitter,
        }
    }

    /// Element count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current values without counting an access. For observers and tests,
    /// never for engine logic.
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    #[must_use]
    pub fn stats(&self) -> RunStatistics {
        self.stats.snapshot()
    }

    pub fn emitter(&mut self) -> &mut StepEmitter {
        &mut self.emitter
    }

    /// Give the values back once the run is over.
    #[must_use]
    pub fn into_values(self) -> Vec<u32> {
        self.values
    }

    fn at(&self, index: usize) -> Result<u32> {
        self.values
            .get(index)
            .copied()
            .ok_or(EngineError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    fn emit(&mut self, step: Step) -> Result<()> {
        let stats = self.stats.snapshot();
        self.emitter.emit(step, stats).map(|_| ())
    }

    /// Counted, silent read.
    pub fn read(&mut self, index: usize) -> Result<u32> {
        let value = self.at(index)?;
        self.stats.record_accesses(1);
        Ok(value)
    }

    /// Counted read that is also shown to observers as a `Read` step.
    pub fn probe(&mut self, index: usize) -> Result<u32> {
        self.emitter.check()?;
        let value = self.read(index)?;
        self.emit(Step::at(StepKind::Read, index, value))?;
        Ok(value)
    }

    /// Like [`probe`](Self::probe) with extra metadata on the step.
    pub fn probe_with(&mut self, index: usize, meta: &[(&str, String)]) -> Result<u32> {
        self.emitter.check()?;
        let value = self.read(index)?;
        let step = meta
            .iter()
            .fold(Step::at(StepKind::Read, index, value), |step, (k, v)| {
                step.with_meta(*k, v)
            });
        self.emit(step)?;
        Ok(value)
    }

    /// Overwrite the value at `index`.
    pub fn write(&mut self, index: usize, value: u32) -> Result<()> {
        self.emitter.check()?;
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(EngineError::IndexOutOfRange { index, len })?;
        *slot = value;
        self.stats.record_accesses(1);
        self.emit(Step::at(StepKind::Overwrite, index, value))
    }

    /// Exchange two positions. Swapping a position with itself does nothing
    /// and emits nothing.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.at(i)?;
        self.at(j)?;
        if i == j {
            return Ok(());
        }
        self.emitter.check()?;
        self.values.swap(i, j);
        self.stats.record_accesses(2);
        self.stats.record_swap();
        let (vi, vj) = (self.values[i], self.values[j]);
        self.emit(Step::pair(StepKind::Swap, (i, j), (vi, vj)))
    }

    /// `true` when the value at `i` is strictly greater than the value at
    /// `j`, i.e. the pair is out of order for an ascending sort.
    pub fn compare(&mut self, i: usize, j: usize) -> Result<bool> {
        let (vi, vj) = (self.at(i)?, self.at(j)?);
        self.emitter.check()?;
        self.stats.record_comparison();
        self.stats.record_accesses(2);
        self.emit(Step::pair(StepKind::Compare, (i, j), (vi, vj)))?;
        Ok(vi > vj)
    }

    /// The [`compare`](Self::compare) predicate over values the engine is
    /// already holding (an insertion key, merge snapshots). The reads that
    /// produced them were counted when they happened, so only the
    /// comparison is tallied. `at` names the positions the values are shown
    /// against.
    pub fn compare_values(&mut self, lhs: u32, rhs: u32, at: (usize, usize)) -> Result<bool> {
        self.at(at.0)?;
        self.at(at.1)?;
        self.emitter.check()?;
        self.stats.record_comparison();
        self.emit(Step::pair(StepKind::Compare, at, (lhs, rhs)))?;
        Ok(lhs > rhs)
    }

    /// Move the value at `index` into an auxiliary buffer: one read from the
    /// sequence plus one buffer write. `place` picks the buffer slot from the
    /// value; the slot is recorded on the emitted `Read` step.
    pub fn stage(
        &mut self,
        index: usize,
        place: impl FnOnce(u32) -> usize,
    ) -> Result<(u32, usize)> {
        let value = self.at(index)?;
        self.emitter.check()?;
        let slot = place(value);
        self.stats.record_accesses(2);
        self.emit(
            Step::at(StepKind::Read, index, value)
                .with_meta("phase", "distribute")
                .with_meta("slot", slot),
        )?;
        Ok((value, slot))
    }

    pub fn mark_sorted(&mut self, index: usize) -> Result<()> {
        let value = self.at(index)?;
        self.emit(Step::at(StepKind::MarkSorted, index, value))
    }

    pub fn mark_pivot(&mut self, index: usize) -> Result<()> {
        let value = self.at(index)?;
        self.emit(Step::at(StepKind::MarkPivot, index, value))
    }

    /// Drop the transient highlight (compare, pivot, read) from `indices`.
    /// An empty set clears every position. Sorted markers are unaffected.
    pub fn clear(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<()> {
        let indices: Vec<usize> = indices.into_iter().collect();
        let values = indices
            .iter()
            .map(|&index| self.at(index))
            .collect::<Result<Vec<_>>>()?;
        self.emit(Step::new(StepKind::Reset, indices, values))
    }

    /// Emit a marker step with no positions.
    pub fn signal(&mut self, kind: StepKind) -> Result<()> {
        self.emit(Step::bare(kind))
    }

    pub fn progress(&mut self, raw_percent: f64, label: impl Into<String>) {
        self.emitter.progress(raw_percent, label);
    }
}
