//! Engine events and the sinks that receive them.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::progress::Progress;
use crate::stats::RunStatistics;
use crate::step::Step;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything an engine tells the outside world.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum EngineEvent {
    /// A step, with the statistics as they stand right after it.
    Step { step: Step, stats: RunStatistics },
    Progress(Progress),
}

impl EngineEvent {
    #[must_use]
    pub fn as_step(&self) -> Option<&Step> {
        match self {
            Self::Step { step, .. } => Some(step),
            Self::Progress(_) => None,
        }
    }
}

/// Destination for engine events.
///
/// Sinks are called on the engine's thread between a mutation and the
/// pacing wait, so they should hand events off rather than block.
pub trait EventSink: Send {
    fn deliver(&mut self, event: EngineEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn deliver(&mut self, _event: EngineEvent) {}
}

/// Collects events into a shared buffer that outlives the run.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Recorded steps only, in emission order.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::Step { step, .. } => Some(step),
                EngineEvent::Progress(_) => None,
            })
            .collect()
    }

    /// Recorded progress updates only.
    #[must_use]
    pub fn progress(&self) -> Vec<Progress> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::Progress(progress) => Some(progress),
                EngineEvent::Step { .. } => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn deliver(&mut self, event: EngineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

/// Forwards events over a channel. A dropped receiver silently discards.
impl EventSink for mpsc::Sender<EngineEvent> {
    fn deliver(&mut self, event: EngineEvent) {
        let _ = self.send(event);
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: FnMut(EngineEvent) + Send,
{
    fn deliver(&mut self, event: EngineEvent) {
        (self.0)(event);
    }
}

impl EventSink for Box<dyn EventSink> {
    fn deliver(&mut self, event: EngineEvent) {
        (**self).deliver(event);
    }
}
