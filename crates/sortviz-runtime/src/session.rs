//! The run controller.
//!
//! [`SortSession`] owns the idle sequence and the configuration, and drives
//! at most one engine run at a time on a dedicated worker thread. Commands
//! are validated synchronously; everything the run does afterwards reaches
//! the caller as [`SessionEvent`]s on subscription channels.
//!
//! # Run lifecycle
//!
//! 1. `start` claims the run-in-progress flag with a compare-and-swap, takes a
//!    copy of the sequence, publishes `Started` and enters `Running`.
//! 2. The worker sorts through a fresh store, stats aggregator and emitter.
//!    `pause`/`resume`/`set_speed` reach it through the run's
//!    [`EmitterControl`].
//! 3. On return the worker writes the sequence back, enters the terminal
//!    state, publishes the terminal event and only then clears the flag.
//!
//! Engine errors and panics are caught on the worker and end the run in
//! `Failed`; they never reach the caller's thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use sortviz_core::{
    Algorithm, EmitterControl, EngineError, EngineEvent, EventSink, RunStatistics,
    SequenceStore, SortEngine, SpeedLevel, StatsAggregator, StepEmitter,
};
use tracing::{debug, error, info, warn};
use web_time::{Duration, Instant};

use crate::bus::EventBus;
use crate::config::{SIZE_RANGE, SessionConfig};
use crate::error::{Result, SessionError};
use crate::event::{CompletionReport, SessionEvent};
use crate::generate::SequenceGenerator;
use crate::state::SessionState;

/// State shared between the session and its worker.
#[derive(Debug, Default)]
struct Shared {
    state: Mutex<SessionState>,
    active: AtomicBool,
    sequence: Mutex<Vec<u32>>,
    bus: EventBus,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_sequence(&self) -> MutexGuard<'_, Vec<u32>> {
        self.sequence.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `to` and publish the change. Called with the state lock held
    /// so transitions reach subscribers in the order they happened.
    fn set_state(&self, state: &mut SessionState, to: SessionState) {
        let from = std::mem::replace(state, to);
        if from != to {
            debug!(%from, %to, "session state");
            self.bus.publish(SessionEvent::StateChanged { from, to });
        }
    }

    fn transition(&self, to: SessionState) {
        let mut state = self.lock_state();
        self.set_state(&mut state, to);
    }

    /// Close a run. `values` is `None` when the worker never ran.
    fn finish(&self, values: Option<Vec<u32>>, to: SessionState, event: SessionEvent) {
        let mut state = self.lock_state();
        if let Some(values) = values {
            *self.lock_sequence() = values;
        }
        self.set_state(&mut state, to);
        self.bus.publish(event);
        self.active.store(false, Ordering::Release);
    }
}

/// Interactive controller for sorting runs.
pub struct SortSession {
    config: SessionConfig,
    speed: SpeedLevel,
    unpaced: bool,
    generator: SequenceGenerator,
    shared: Arc<Shared>,
    control: EmitterControl,
    stats: StatsAggregator,
    worker: Option<JoinHandle<()>>,
    runs: u64,
    #[cfg(test)]
    engine_override: Option<&'static dyn SortEngine>,
}

impl SortSession {
    /// Create a session and generate its first sequence.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let speed = checked(&config)?;
        let mut session = Self {
            generator: SequenceGenerator::new(config.seed),
            config,
            speed,
            unpaced: false,
            shared: Arc::new(Shared::default()),
            control: EmitterControl::default(),
            stats: StatsAggregator::new(),
            worker: None,
            runs: 0,
            #[cfg(test)]
            engine_override: None,
        };
        session.generate()?;
        Ok(session)
    }

    /// Register an event subscriber.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.shared.bus.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.shared.lock_state()
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    #[must_use]
    pub fn speed(&self) -> SpeedLevel {
        self.speed
    }

    /// The sequence as of the last run boundary. While a run is active the
    /// live values are only visible through step events.
    #[must_use]
    pub fn values(&self) -> Vec<u32> {
        self.shared.lock_sequence().clone()
    }

    /// Counters of the current or most recent run. Zero after `generate`,
    /// `load_sequence` and an idle `reset`.
    #[must_use]
    pub fn statistics(&self) -> RunStatistics {
        self.stats.snapshot()
    }

    /// Number of runs started so far; also the id of the latest run.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    fn engine(&self) -> &'static dyn SortEngine {
        let engine = self.config.algorithm.engine();
        #[cfg(test)]
        let engine = self.engine_override.unwrap_or(engine);
        engine
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.shared.active.load(Ordering::Acquire) {
            Err(SessionError::RunAlreadyActive {
                state: self.state(),
            })
        } else {
            Ok(())
        }
    }

    /// Replace the whole configuration. Regenerates the sequence when the
    /// size or the seed changed.
    ///
    /// Like every run-shaping command, an active run is reported before any
    /// validation problem.
    pub fn configure(&mut self, config: SessionConfig) -> Result<()> {
        self.ensure_idle()?;
        let speed = checked(&config)?;
        let reseed = config.seed.is_some() && config.seed != self.config.seed;
        let resize = config.size != self.config.size;
        if reseed {
            self.generator = SequenceGenerator::new(config.seed);
        }
        self.config = config;
        self.set_speed(speed);
        if reseed || resize {
            self.generate()?;
        }
        Ok(())
    }

    /// Fresh random sequence of the configured size.
    pub fn generate(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let values = self.generator.generate(self.config.size);
        self.replace_sequence(values);
        Ok(())
    }

    /// Use `values` as the next sequence to sort. Any length is accepted.
    pub fn load_sequence(&mut self, values: Vec<u32>) -> Result<()> {
        self.ensure_idle()?;
        self.replace_sequence(values);
        Ok(())
    }

    fn replace_sequence(&mut self, values: Vec<u32>) {
        debug!(len = values.len(), "sequence replaced");
        self.stats.reset();
        *self.shared.lock_sequence() = values.clone();
        self.shared.transition(SessionState::Idle);
        self.shared
            .bus
            .publish(SessionEvent::SequenceReplaced { values });
    }

    /// Change the element count and regenerate.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        self.ensure_idle()?;
        if !SIZE_RANGE.contains(&size) {
            return Err(SessionError::InvalidConfiguration(vec![format!(
                "size {size} outside {}..={}",
                SIZE_RANGE.start(),
                SIZE_RANGE.end()
            )]));
        }
        self.config.size = size;
        self.generate()
    }

    pub fn select_algorithm(&mut self, algorithm: Algorithm) -> Result<()> {
        self.ensure_idle()?;
        self.config.algorithm = algorithm;
        Ok(())
    }

    /// Move to the next (`direction > 0`) or previous algorithm in menu order.
    pub fn cycle_algorithm(&mut self, direction: i32) -> Result<Algorithm> {
        self.ensure_idle()?;
        self.config.algorithm = self.config.algorithm.cycle(direction);
        Ok(self.config.algorithm)
    }

    /// Change pacing. Applies to an active run immediately.
    pub fn set_speed(&mut self, speed: SpeedLevel) {
        self.speed = speed;
        self.config.speed = speed.get();
        self.control.set_delay(self.delay());
    }

    /// Nudge the speed by `delta` levels, clamped to the scale.
    pub fn adjust_speed(&mut self, delta: i32) -> SpeedLevel {
        self.set_speed(self.speed.step(delta));
        self.speed
    }

    /// Run without any pacing delay, regardless of the speed level.
    pub fn set_unpaced(&mut self, unpaced: bool) {
        self.unpaced = unpaced;
        self.control.set_delay(self.delay());
    }

    fn delay(&self) -> Duration {
        if self.unpaced {
            Duration::ZERO
        } else {
            self.speed.delay()
        }
    }

    /// Launch a run of the selected algorithm on the current sequence.
    ///
    /// Returns the run id carried by the run's events.
    pub fn start(&mut self) -> Result<u64> {
        if self
            .shared
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::RunAlreadyActive {
                state: self.state(),
            });
        }
        self.join_worker();

        self.runs += 1;
        let run = self.runs;
        let algorithm = self.config.algorithm;
        let values = self.values();
        self.control = EmitterControl::new(self.delay());
        self.stats = StatsAggregator::new();

        {
            let mut state = self.shared.lock_state();
            self.shared.bus.publish(SessionEvent::Started {
                run,
                algorithm,
                values: values.clone(),
            });
            self.shared.set_state(&mut state, SessionState::Running);
        }

        let job = Job {
            run,
            algorithm,
            engine: self.engine(),
            values,
            stats: self.stats.clone(),
            control: self.control.clone(),
            shared: Arc::clone(&self.shared),
        };
        let spawned = thread::Builder::new()
            .name(format!("sortviz-run-{run}"))
            .spawn(move || job.execute());
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(run)
            }
            Err(err) => {
                warn!(run, %err, "failed to spawn sort worker");
                self.shared.finish(
                    None,
                    SessionState::Failed,
                    SessionEvent::Failed {
                        run,
                        stats: RunStatistics::default(),
                        cause: err.to_string(),
                    },
                );
                Err(SessionError::Spawn(err))
            }
        }
    }

    /// Suspend the active run at its next step.
    pub fn pause(&self) -> Result<()> {
        let mut state = self.shared.lock_state();
        if *state != SessionState::Running {
            return Err(SessionError::InvalidCommand {
                command: "pause",
                state: *state,
            });
        }
        self.control.pause();
        self.shared.set_state(&mut state, SessionState::Paused);
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        let mut state = self.shared.lock_state();
        if *state != SessionState::Paused {
            return Err(SessionError::InvalidCommand {
                command: "resume",
                state: *state,
            });
        }
        self.control.resume();
        self.shared.set_state(&mut state, SessionState::Running);
        Ok(())
    }

    /// Cancel an active run and wait for it to unwind, ending in
    /// `Cancelled` with its statistics kept. Without an active run, return
    /// to `Idle` and clear the statistics.
    pub fn reset(&mut self) -> SessionState {
        if self.shared.active.load(Ordering::Acquire) {
            info!(run = self.runs, "cancelling run");
            self.control.cancel();
            self.join_worker();
        } else {
            self.join_worker();
            self.stats.reset();
            self.shared.transition(SessionState::Idle);
        }
        self.state()
    }

    /// Block until the active run, if any, has ended. Returns the final
    /// state. A paused run only ends once another thread resumes or the
    /// session is dropped.
    pub fn wait(&mut self) -> SessionState {
        self.join_worker();
        self.state()
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            warn!("sort worker panicked outside the engine");
        }
    }
}

impl Drop for SortSession {
    fn drop(&mut self) {
        self.control.cancel();
        self.join_worker();
    }
}

impl std::fmt::Debug for SortSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortSession")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}

fn checked(config: &SessionConfig) -> Result<SpeedLevel> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SessionError::InvalidConfiguration(errors));
    }
    config
        .speed_level()
        .map_err(|err| SessionError::InvalidConfiguration(vec![err.to_string()]))
}

/// Forwards engine events to the session's subscribers, tagged with the run.
struct BusSink {
    run: u64,
    shared: Arc<Shared>,
}

impl EventSink for BusSink {
    fn deliver(&mut self, event: EngineEvent) {
        let event = match event {
            EngineEvent::Step { step, stats } => SessionEvent::Step {
                run: self.run,
                step,
                stats,
            },
            EngineEvent::Progress(progress) => SessionEvent::Progress {
                run: self.run,
                progress,
            },
        };
        self.shared.bus.publish(event);
    }
}

/// Everything a worker thread needs for one run.
struct Job {
    run: u64,
    algorithm: Algorithm,
    engine: &'static dyn SortEngine,
    values: Vec<u32>,
    stats: StatsAggregator,
    control: EmitterControl,
    shared: Arc<Shared>,
}

impl Job {
    fn execute(self) {
        let Self {
            run,
            algorithm,
            engine,
            values,
            stats,
            control,
            shared,
        } = self;
        let len = values.len();
        info!(run, algorithm = algorithm.key(), len, "run started");

        let sink = BusSink {
            run,
            shared: Arc::clone(&shared),
        };
        let mut store = SequenceStore::new(values, stats.clone(), StepEmitter::new(control, sink));
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            sortviz_core::run_with(engine, algorithm, &mut store)
        }));
        let stats = stats.snapshot();

        let (state, event) = match outcome {
            Ok(Ok(())) => {
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                info!(run, elapsed_ms, %stats, "run completed");
                let report = CompletionReport {
                    run,
                    algorithm,
                    len,
                    elapsed_ms,
                    stats,
                };
                (SessionState::Completed, SessionEvent::Completed(report))
            }
            Ok(Err(EngineError::Cancelled)) => {
                debug!(run, %stats, "run cancelled");
                (SessionState::Cancelled, SessionEvent::Cancelled { run, stats })
            }
            Ok(Err(err)) => {
                error!(run, %err, "run failed");
                let cause = err.to_string();
                (SessionState::Failed, SessionEvent::Failed { run, stats, cause })
            }
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                error!(run, %cause, "engine panicked");
                (SessionState::Failed, SessionEvent::Failed { run, stats, cause })
            }
        };
        shared.finish(Some(store.into_values()), state, event);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("engine panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("engine panicked: {message}")
    } else {
        "engine panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(values: &[u32]) -> SortSession {
        let mut session = SortSession::new(SessionConfig {
            seed: Some(11),
            ..SessionConfig::default()
        })
        .unwrap();
        session.set_unpaced(true);
        session.load_sequence(values.to_vec()).unwrap();
        session
    }

    #[test]
    fn new_session_is_idle_with_a_generated_sequence() {
        let session = SortSession::new(SessionConfig::default()).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.values().len(), 30);
        assert_eq!(session.statistics(), RunStatistics::default());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let err = SortSession::new(SessionConfig {
            size: 1_000,
            ..SessionConfig::default()
        })
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn run_to_completion_writes_back_sorted_values() {
        let mut session = session(&[5, 3, 8, 1]);
        assert_eq!(session.start().unwrap(), 1);
        assert_eq!(session.wait(), SessionState::Completed);
        assert_eq!(session.values(), vec![1, 3, 5, 8]);
        assert_eq!(session.statistics().swaps, 4);
    }

    #[test]
    fn pause_and_resume_require_the_right_state() {
        let session = session(&[2, 1]);
        assert!(matches!(
            session.pause(),
            Err(SessionError::InvalidCommand {
                command: "pause",
                state: SessionState::Idle
            })
        ));
        assert!(matches!(
            session.resume(),
            Err(SessionError::InvalidCommand { command: "resume", .. })
        ));
    }

    #[test]
    fn idle_reset_clears_statistics() {
        let mut session = session(&[3, 2, 1]);
        session.start().unwrap();
        session.wait();
        assert!(session.statistics().comparisons > 0);
        assert_eq!(session.reset(), SessionState::Idle);
        assert_eq!(session.statistics(), RunStatistics::default());
    }

    #[test]
    fn cycle_and_select_change_the_algorithm() {
        let mut session = session(&[1]);
        assert_eq!(session.cycle_algorithm(1).unwrap(), Algorithm::Selection);
        session.select_algorithm(Algorithm::Radix).unwrap();
        assert_eq!(session.algorithm(), Algorithm::Radix);
    }

    #[test]
    fn adjust_speed_clamps() {
        let mut session = session(&[1]);
        assert_eq!(session.adjust_speed(20).get(), 10);
        assert_eq!(session.adjust_speed(-3).get(), 7);
        assert_eq!(session.config().speed, 7);
    }

    #[test]
    fn set_size_validates_and_regenerates() {
        let mut session = session(&[1]);
        assert!(session.set_size(4).unwrap_err().is_configuration());
        session.set_size(12).unwrap();
        assert_eq!(session.values().len(), 12);
    }

    /// Reads one past the end after a counted compare.
    struct OverrunEngine;

    impl SortEngine for OverrunEngine {
        fn sort(&self, store: &mut SequenceStore) -> sortviz_core::Result<()> {
            store.compare(0, 1)?;
            store.read(store.len()).map(|_| ())
        }
    }

    struct PanickingEngine;

    impl SortEngine for PanickingEngine {
        fn sort(&self, store: &mut SequenceStore) -> sortviz_core::Result<()> {
            store.swap(0, 1)?;
            panic!("comparator exploded");
        }
    }

    fn failed_cause(events: &Receiver<SessionEvent>) -> (RunStatistics, String) {
        events
            .try_iter()
            .find_map(|event| match event {
                SessionEvent::Failed { stats, cause, .. } => Some((stats, cause)),
                _ => None,
            })
            .expect("no failed event")
    }

    fn assert_recovers(mut session: SortSession) {
        session.engine_override = None;
        session.start().unwrap();
        assert_eq!(session.wait(), SessionState::Completed);
    }

    #[test]
    fn engine_error_ends_the_run_in_failed() {
        let mut session = session(&[4, 2, 3]);
        session.engine_override = Some(&OverrunEngine);
        let events = session.subscribe();
        session.start().unwrap();
        assert_eq!(session.wait(), SessionState::Failed);

        let (stats, cause) = failed_cause(&events);
        assert_eq!(cause, "index 3 out of range for sequence of length 3");
        assert_eq!(stats.comparisons, 1);
        assert_eq!(session.statistics(), stats);
        assert_eq!(session.values(), vec![4, 2, 3]);
        assert_recovers(session);
    }

    #[test]
    fn engine_panic_ends_the_run_in_failed() {
        let mut session = session(&[4, 2, 3]);
        session.engine_override = Some(&PanickingEngine);
        let events = session.subscribe();
        session.start().unwrap();
        assert_eq!(session.wait(), SessionState::Failed);

        let (stats, cause) = failed_cause(&events);
        assert_eq!(cause, "engine panicked: comparator exploded");
        assert_eq!(stats.swaps, 1);
        // Values are written back as they stood when the engine unwound.
        assert_eq!(session.values(), vec![2, 4, 3]);
        assert_recovers(session);
    }

    #[test]
    fn panic_messages_are_extracted() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "engine panicked: boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "engine panicked: bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "engine panicked");
    }
}
