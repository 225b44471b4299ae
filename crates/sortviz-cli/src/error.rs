use thiserror::Error;

use sortviz_runtime::{ConfigError, SessionError};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("sort failed: {cause}")]
    RunFailed { cause: String },

    #[error("sort was cancelled")]
    RunCancelled,

    #[error("session closed before the run finished")]
    Disconnected,
}

impl CliError {
    /// Process exit status: 2 for bad input, 3 for a failed run, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Session(err) if err.is_configuration() => 2,
            Self::RunFailed { .. } => 3,
            _ => 1,
        }
    }
}
