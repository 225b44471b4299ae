#![forbid(unsafe_code)]

//! Command-line driver for SortViz sessions.

pub mod cli;
pub mod error;
pub mod logging;
pub mod render;

pub use cli::run_from_env;
pub use error::{CliError, Result};
