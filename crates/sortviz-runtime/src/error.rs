//! Session-level errors.

use std::io;

use thiserror::Error;

use crate::state::SessionState;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Why a session command was rejected.
///
/// Engine failures are not reported here: they end the run in
/// [`SessionState::Failed`] and arrive as a
/// [`SessionEvent::Failed`](crate::SessionEvent::Failed).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfiguration(Vec<String>),

    #[error("a run is already active (session is {state})")]
    RunAlreadyActive { state: SessionState },

    #[error("cannot {command} while the session is {state}")]
    InvalidCommand {
        command: &'static str,
        state: SessionState,
    },

    #[error("failed to spawn sort worker: {0}")]
    Spawn(#[source] io::Error),
}

impl SessionError {
    /// `true` for errors caused by the caller's input rather than timing.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}
