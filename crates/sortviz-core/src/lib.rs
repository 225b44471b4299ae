#![forbid(unsafe_code)]

//! SortViz Core
//!
//! Instrumented sorting engines. Each engine sorts a [`SequenceStore`] and
//! every read, comparison and mutation it performs is counted and published
//! as a [`Step`] through a [`StepEmitter`]. The emitter paces the engine,
//! parks it while paused and unwinds it on cancel, so a run can be watched
//! and steered from another thread.
//!
//! # Key Components
//!
//! - [`SequenceStore`] - Counted, observable sequence of values
//! - [`StepEmitter`] / [`EmitterControl`] - Pacing, pause and cancel
//! - [`StatsAggregator`] - Shared comparison, swap and access counters
//! - [`Algorithm`] / [`SortEngine`] - The six engines and their catalogue
//! - [`EventSink`] - Where steps and progress updates go
//!
//! # Example
//!
//! ```
//! use sortviz_core::{Algorithm, RecordingSink, SequenceStore, StatsAggregator, StepEmitter};
//!
//! let sink = RecordingSink::new();
//! let mut store = SequenceStore::new(
//!     vec![5, 3, 8, 1],
//!     StatsAggregator::new(),
//!     StepEmitter::unpaced(sink.clone()),
//! );
//! sortviz_core::run(Algorithm::Bubble, &mut store).unwrap();
//! assert_eq!(store.values(), &[1, 3, 5, 8]);
//! assert_eq!(store.stats().swaps, 4);
//! ```

pub mod algorithms;
pub mod emitter;
pub mod error;
pub mod event;
pub mod pacing;
pub mod progress;
pub mod stats;
pub mod step;
pub mod store;

#[cfg(test)]
mod testing;

pub use algorithms::{Algorithm, SortEngine, UnknownAlgorithm, run, run_with};
pub use emitter::{EmitterControl, StepEmitter};
pub use error::{EngineError, Result};
pub use event::{EngineEvent, EventSink, FnSink, NullSink, RecordingSink};
pub use pacing::{PAUSE_POLL_INTERVAL, SPEED_DELAYS_MS, SpeedLevel, SpeedLevelError};
pub use progress::{Progress, ProgressTracker};
pub use stats::{RunStatistics, StatsAggregator};
pub use step::{Step, StepKind};
pub use store::SequenceStore;
