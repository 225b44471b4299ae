//! Paced, pausable, cancellable step delivery.
//!
//! [`StepEmitter`] sits between an engine and whoever watches it. Every
//! observable operation passes through [`StepEmitter::emit`], which hands
//! the step to the sink and then holds the engine thread for the pacing
//! delay. The same call is the engine's only suspension point, so pause and
//! cancel are observed there.
//!
//! [`EmitterControl`] is the cloneable remote for a running emitter: a
//! cancel flag, a pause flag and a live-adjustable delay behind one condvar.
//! Every state change notifies the condvar so a suspended `emit`
//! re-evaluates immediately.
//!
//! # Example
//!
//! ```
//! use sortviz_core::{EmitterControl, NullSink, StepEmitter};
//! use web_time::Duration;
//!
//! let control = EmitterControl::new(Duration::from_millis(100));
//! let emitter = StepEmitter::new(control.clone(), NullSink);
//!
//! // From another thread:
//! control.pause();
//! control.set_delay(Duration::from_millis(5));
//! control.resume();
//! control.cancel();
//! assert!(emitter.check().is_err());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use web_time::{Duration, Instant};

use crate::error::{EngineError, Result};
use crate::event::{EngineEvent, EventSink};
use crate::pacing::PAUSE_POLL_INTERVAL;
use crate::progress::ProgressTracker;
use crate::stats::RunStatistics;
use crate::step::Step;

struct ControlInner {
    cancelled: AtomicBool,
    paused: AtomicBool,
    delay_micros: AtomicU64,
    notify: (Mutex<()>, Condvar),
}

/// Remote control for a [`StepEmitter`].
#[derive(Clone)]
pub struct EmitterControl {
    inner: Arc<ControlInner>,
}

impl EmitterControl {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Arc::new(ControlInner {
                cancelled: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                delay_micros: AtomicU64::new(duration_to_micros(delay)),
                notify: (Mutex::new(()), Condvar::new()),
            }),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.wake();
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::Release);
        self.wake();
    }

    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::Release);
        self.wake();
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Acquire)
    }

    /// Change pacing. A suspended emission recomputes its deadline against
    /// the new delay as soon as it wakes.
    pub fn set_delay(&self, delay: Duration) {
        self.inner
            .delay_micros
            .store(duration_to_micros(delay), Ordering::Release);
        self.wake();
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.inner.delay_micros.load(Ordering::Acquire))
    }

    fn wake(&self) {
        let (lock, cvar) = &self.inner.notify;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }

    /// Block until the pacing deadline measured from `started` has passed
    /// and the emitter is not paused, or until cancellation.
    fn wait_turn(&self, started: Instant, paced: bool) -> Result<()> {
        let (lock, cvar) = &self.inner.notify;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if self.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            if self.is_paused() {
                guard = cvar
                    .wait_timeout(guard, PAUSE_POLL_INTERVAL)
                    .unwrap_or_else(|e| e.into_inner())
                    .0;
                continue;
            }
            let delay = if paced { self.delay() } else { Duration::ZERO };
            let elapsed = started.elapsed();
            if elapsed >= delay {
                return Ok(());
            }
            guard = cvar
                .wait_timeout(guard, delay - elapsed)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
    }
}

impl Default for EmitterControl {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl std::fmt::Debug for EmitterControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterControl")
            .field("cancelled", &self.is_cancelled())
            .field("paused", &self.is_paused())
            .field("delay", &self.delay())
            .finish()
    }
}

fn duration_to_micros(delay: Duration) -> u64 {
    u64::try_from(delay.as_micros()).unwrap_or(u64::MAX)
}

/// Per-run step channel.
pub struct StepEmitter {
    control: EmitterControl,
    sink: Box<dyn EventSink>,
    next_seq: u64,
    progress: ProgressTracker,
}

impl StepEmitter {
    pub fn new(control: EmitterControl, sink: impl EventSink + 'static) -> Self {
        Self {
            control,
            sink: Box::new(sink),
            next_seq: 1,
            progress: ProgressTracker::new(),
        }
    }

    /// An emitter with no pacing delay, for headless runs and tests.
    pub fn unpaced(sink: impl EventSink + 'static) -> Self {
        Self::new(EmitterControl::default(), sink)
    }

    #[must_use]
    pub fn control(&self) -> &EmitterControl {
        &self.control
    }

    /// Fail fast if the run has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.control.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Deliver `step` and suspend for the pacing delay.
    ///
    /// Returns the sequence number stamped on the step.
    pub fn emit(&mut self, step: Step, stats: RunStatistics) -> Result<u64> {
        self.check()?;
        let seq = self.next_seq;
        self.next_seq += 1;
        let paced = !step.kind().is_marker();
        let started = Instant::now();
        self.sink.deliver(EngineEvent::Step {
            step: step.stamped(seq),
            stats,
        });
        self.control.wait_turn(started, paced)?;
        Ok(seq)
    }

    /// Report engine progress. Not paced; the tracker keeps it monotonic.
    pub fn progress(&mut self, raw_percent: f64, label: impl Into<String>) {
        let update = self.progress.advance(raw_percent, label);
        self.sink.deliver(EngineEvent::Progress(update));
    }

    /// Report the terminal 100% update.
    pub fn complete(&mut self, label: impl Into<String>) {
        let update = self.progress.complete(label);
        self.sink.deliver(EngineEvent::Progress(update));
    }

    /// Number of steps emitted so far.
    #[must_use]
    pub fn steps_emitted(&self) -> u64 {
        self.next_seq - 1
    }

    /// Current clamped progress percentage.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.progress.percent()
    }
}

impl std::fmt::Debug for StepEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEmitter")
            .field("control", &self.control)
            .field("next_seq", &self.next_seq)
            .finish_non_exhaustive()
    }
}
