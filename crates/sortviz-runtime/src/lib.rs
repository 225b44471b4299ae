#![forbid(unsafe_code)]

//! SortViz Runtime
//!
//! Turns the engines of `sortviz-core` into an interactive session: a
//! [`SortSession`] holds the sequence and configuration, runs one engine at a
//! time on a worker thread, and publishes [`SessionEvent`]s to every
//! subscriber.
//!
//! # Key Components
//!
//! - [`SortSession`] - Commands, state machine and worker lifecycle
//! - [`SessionConfig`] - Size, speed, algorithm and seed, loadable from TOML or JSON
//! - [`EventBus`] - Channel fan-out to subscribers
//! - [`Renderer`] / [`pump`] - The presentation seam
//!
//! # Example
//!
//! ```
//! use sortviz_runtime::{RecordingRenderer, SessionConfig, SessionState, SortSession, pump};
//!
//! let mut session = SortSession::new(SessionConfig::default()).unwrap();
//! session.set_unpaced(true);
//! let events = session.subscribe();
//! session.start().unwrap();
//!
//! let mut renderer = RecordingRenderer::new();
//! pump(&events, &mut renderer).unwrap();
//! assert_eq!(session.wait(), SessionState::Completed);
//! assert!(renderer.values().is_sorted());
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod generate;
pub mod renderer;
pub mod session;
pub mod state;

pub use bus::EventBus;
pub use config::{ConfigError, DEFAULT_SIZE, SIZE_RANGE, SessionConfig};
pub use error::{Result, SessionError};
pub use event::{CompletionReport, SessionEvent};
pub use generate::{SequenceGenerator, VALUE_RANGE};
pub use renderer::{NullRenderer, RecordingRenderer, Renderer, pump};
pub use session::SortSession;
pub use state::SessionState;
