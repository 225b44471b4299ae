//! Progress reporting.
//!
//! Engines report raw percentages that are allowed to be rough (merge and
//! quick sort estimate from partition sizes). [`ProgressTracker`] clamps the
//! stream so observers see a non-decreasing value that stays below 100 until
//! the run completes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest percentage an engine may report while still running.
pub const RUNNING_CEILING: f64 = 99.0;

/// A progress update.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Progress {
    pub percent: f64,
    pub label: String,
}

impl Progress {
    #[must_use]
    pub fn new(percent: f64, label: impl Into<String>) -> Self {
        Self {
            percent,
            label: label.into(),
        }
    }

    /// Percentage rounded to a whole number, as shown in a progress badge.
    #[must_use]
    pub fn rounded(&self) -> u8 {
        self.percent.round().clamp(0.0, 100.0) as u8
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}% {}", self.rounded(), self.label)
    }
}

/// Monotonic clamp over engine-reported progress.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: f64,
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last percentage handed out.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.last
    }

    /// Clamp a raw report into `[last, RUNNING_CEILING]`.
    ///
    /// Non-finite reports are treated as "no movement".
    pub fn advance(&mut self, raw: f64, label: impl Into<String>) -> Progress {
        let raw = if raw.is_finite() { raw } else { self.last };
        self.last = raw.clamp(self.last, RUNNING_CEILING.max(self.last));
        Progress::new(self.last, label)
    }

    /// The terminal 100% report.
    pub fn complete(&mut self, label: impl Into<String>) -> Progress {
        self.last = 100.0;
        Progress::new(100.0, label)
    }
}

/// `done / total` as a percentage; zero totals count as finished.
#[must_use]
pub fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}
