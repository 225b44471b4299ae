//! Engine error taxonomy.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures an engine can observe while operating on a [`SequenceStore`].
///
/// [`EngineError::Cancelled`] is a control-flow signal rather than a fault:
/// engines propagate it with `?` and the session maps it to the cancelled
/// state without logging it as an error.
///
/// [`SequenceStore`]: crate::SequenceStore
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("run cancelled")]
    Cancelled,
}

impl EngineError {
    /// Whether this error is the cooperative cancellation signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
