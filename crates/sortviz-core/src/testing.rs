//! Shared helpers for engine unit tests.

use crate::algorithms::SortEngine;
use crate::emitter::StepEmitter;
use crate::event::{NullSink, RecordingSink};
use crate::stats::{RunStatistics, StatsAggregator};
use crate::store::SequenceStore;

/// Sort `input` with an unpaced emitter and return the result and counters.
pub(crate) fn run_engine(engine: &dyn SortEngine, input: &[u32]) -> (Vec<u32>, RunStatistics) {
    let mut store = SequenceStore::new(
        input.to_vec(),
        StatsAggregator::new(),
        StepEmitter::unpaced(NullSink),
    );
    engine.sort(&mut store).expect("engine run failed");
    let stats = store.stats();
    (store.into_values(), stats)
}

/// Like [`run_engine`] but keeps every event for inspection.
pub(crate) fn run_engine_recorded(
    engine: &dyn SortEngine,
    input: &[u32],
) -> (Vec<u32>, RecordingSink) {
    let sink = RecordingSink::new();
    let mut store = SequenceStore::new(
        input.to_vec(),
        StatsAggregator::new(),
        StepEmitter::unpaced(sink.clone()),
    );
    engine.sort(&mut store).expect("engine run failed");
    (store.into_values(), sink)
}
