//! Presentation seam.
//!
//! A [`Renderer`] turns session events into output. The session never calls
//! a renderer itself: a front end subscribes, then [`pump`]s the
//! subscription into whichever renderer it uses, on its own thread and at
//! its own pace.

use std::io;
use std::sync::mpsc::Receiver;

use sortviz_core::{Progress, StepKind};

use crate::event::SessionEvent;
use crate::state::SessionState;

pub trait Renderer {
    fn render(&mut self, event: &SessionEvent) -> io::Result<()>;
}

/// Renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _event: &SessionEvent) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every event and mirrors the sequence and state they describe.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    events: Vec<SessionEvent>,
    values: Vec<u32>,
    state: SessionState,
    progress: Option<Progress>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// The sequence as rebuilt from `Started`, `SequenceReplaced` and the
    /// mutating steps seen so far.
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// States entered, in order.
    #[must_use]
    pub fn transitions(&self) -> Vec<SessionState> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::Started { values, .. } | SessionEvent::SequenceReplaced { values } => {
                self.values.clone_from(values);
                self.progress = None;
            }
            SessionEvent::Step { step, .. } => {
                if matches!(step.kind(), StepKind::Swap | StepKind::Overwrite) {
                    for (&index, &value) in step.indices().iter().zip(step.values()) {
                        if let Some(slot) = self.values.get_mut(index) {
                            *slot = value;
                        }
                    }
                }
            }
            SessionEvent::Progress { progress, .. } => self.progress = Some(progress.clone()),
            SessionEvent::StateChanged { to, .. } => self.state = *to,
            SessionEvent::Completed(_)
            | SessionEvent::Cancelled { .. }
            | SessionEvent::Failed { .. } => {}
        }
        self.events.push(event.clone());
        Ok(())
    }
}

/// Feed events from `events` into `renderer` until a run ends.
///
/// Returns the terminal event, or `None` when the session went away first.
pub fn pump(
    events: &Receiver<SessionEvent>,
    renderer: &mut dyn Renderer,
) -> io::Result<Option<SessionEvent>> {
    for event in events {
        renderer.render(&event)?;
        if event.is_terminal() {
            return Ok(Some(event));
        }
    }
    Ok(None)
}
