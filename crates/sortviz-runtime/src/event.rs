//! Events a session publishes to its subscribers.

use serde::{Deserialize, Serialize};
use sortviz_core::{Algorithm, Progress, RunStatistics, Step};
use web_time::Duration;

use crate::state::SessionState;

/// Summary of a run that finished normally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub run: u64,
    pub algorithm: Algorithm,
    pub len: usize,
    /// Wall time from start to completion, pauses included.
    pub elapsed_ms: u64,
    pub stats: RunStatistics,
}

impl CompletionReport {
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Everything observable about a session, in the order it happened.
///
/// `run` numbers start at 1 and increase with every `start`, so observers can
/// drop stragglers from an earlier run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A run began on `values`.
    Started {
        run: u64,
        algorithm: Algorithm,
        values: Vec<u32>,
    },
    Step {
        run: u64,
        step: Step,
        stats: RunStatistics,
    },
    Progress {
        run: u64,
        progress: Progress,
    },
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    /// The idle sequence changed (generate, resize or load).
    SequenceReplaced { values: Vec<u32> },
    Completed(CompletionReport),
    Cancelled { run: u64, stats: RunStatistics },
    Failed {
        run: u64,
        stats: RunStatistics,
        cause: String,
    },
}

impl SessionEvent {
    /// `true` for the event that closes a run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Cancelled { .. } | Self::Failed { .. }
        )
    }

    /// Run this event belongs to, if any.
    #[must_use]
    pub fn run(&self) -> Option<u64> {
        match self {
            Self::Started { run, .. }
            | Self::Step { run, .. }
            | Self::Progress { run, .. }
            | Self::Cancelled { run, .. }
            | Self::Failed { run, .. } => Some(*run),
            Self::Completed(report) => Some(report.run),
            Self::StateChanged { .. } | Self::SequenceReplaced { .. } => None,
        }
    }
}
