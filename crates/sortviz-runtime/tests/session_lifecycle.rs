//! End-to-end session behavior: commands, state transitions and the event
//! stream a front end sees.

use std::sync::mpsc::Receiver;
use std::thread;

use sortviz_core::{Algorithm, SpeedLevel, StepKind};
use sortviz_runtime::{
    RecordingRenderer, SessionConfig, SessionError, SessionEvent, SessionState, SortSession,
    pump,
};
use web_time::Duration;

fn session_with(values: &[u32], algorithm: Algorithm, speed: u8) -> SortSession {
    let mut session = SortSession::new(SessionConfig {
        speed,
        algorithm,
        seed: Some(2024),
        ..SessionConfig::default()
    })
    .unwrap();
    session.load_sequence(values.to_vec()).unwrap();
    session
}

fn drain(events: &Receiver<SessionEvent>) -> RecordingRenderer {
    let mut renderer = RecordingRenderer::new();
    pump(events, &mut renderer).unwrap();
    renderer
}

#[test]
fn completed_run_publishes_a_well_ordered_stream() {
    let mut session = session_with(&[5, 3, 8, 1], Algorithm::Bubble, 10);
    session.set_unpaced(true);
    let events = session.subscribe();
    let run = session.start().unwrap();
    let renderer = drain(&events);
    assert_eq!(session.wait(), SessionState::Completed);

    let all = renderer.events();
    assert!(matches!(&all[0], SessionEvent::Started { run: r, values, .. } if *r == run && values == &[5, 3, 8, 1]));
    assert!(matches!(
        all[1],
        SessionEvent::StateChanged {
            from: SessionState::Idle,
            to: SessionState::Running
        }
    ));
    let SessionEvent::Completed(report) = all.last().unwrap() else {
        panic!("run did not complete: {:?}", all.last());
    };
    assert_eq!(report.run, run);
    assert_eq!(report.len, 4);
    assert_eq!(report.stats, session.statistics());
    assert_eq!(report.stats.swaps, 4);
    assert_eq!(renderer.values(), &[1, 3, 5, 8]);
    assert_eq!(
        renderer.transitions(),
        vec![SessionState::Running, SessionState::Completed]
    );
    assert_eq!(renderer.progress().map(|p| p.percent), Some(100.0));

    let steps: Vec<_> = all
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Step { step, .. } => Some(step.kind()),
            _ => None,
        })
        .collect();
    assert_eq!(steps.last(), Some(&StepKind::Done));
}

#[test]
fn start_while_running_is_rejected_and_leaves_stats_alone() {
    let mut session = session_with(&[4, 3, 2, 1], Algorithm::Bubble, 1);
    session.start().unwrap();
    // Let the worker reach its first 500 ms pacing wait.
    thread::sleep(Duration::from_millis(30));
    let before = session.statistics();
    let err = session.start().unwrap_err();
    assert!(matches!(
        err,
        SessionError::RunAlreadyActive {
            state: SessionState::Running
        }
    ));
    assert_eq!(session.statistics(), before);
    assert_eq!(session.runs(), 1);
    assert_eq!(session.reset(), SessionState::Cancelled);
}

#[test]
fn shaping_commands_are_rejected_during_a_run() {
    let mut session = session_with(&[4, 3, 2, 1], Algorithm::Selection, 1);
    session.start().unwrap();
    assert!(matches!(
        session.generate(),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    assert!(matches!(
        session.load_sequence(vec![1]),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    assert!(matches!(
        session.set_size(10),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    assert!(matches!(
        session.select_algorithm(Algorithm::Quick),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    assert!(matches!(
        session.configure(SessionConfig::default()),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    session.reset();
}

#[test]
fn active_run_is_reported_before_invalid_input() {
    let mut session = session_with(&[4, 3, 2, 1], Algorithm::Quick, 1);
    session.start().unwrap();
    assert!(matches!(
        session.set_size(2),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    assert!(matches!(
        session.configure(SessionConfig {
            size: 1_000,
            speed: 0,
            ..SessionConfig::default()
        }),
        Err(SessionError::RunAlreadyActive { .. })
    ));
    assert_eq!(session.reset(), SessionState::Cancelled);

    // Once idle, the same input is a configuration error.
    assert!(session.set_size(2).unwrap_err().is_configuration());
    assert!(
        session
            .configure(SessionConfig {
                size: 1_000,
                ..SessionConfig::default()
            })
            .unwrap_err()
            .is_configuration()
    );
}

#[test]
fn pause_freezes_the_run_and_resume_finishes_it() {
    let input: Vec<u32> = (0..24).rev().collect();
    let mut session = session_with(&input, Algorithm::Insertion, 10);
    session.start().unwrap();
    thread::sleep(Duration::from_millis(20));

    session.pause().unwrap();
    assert_eq!(session.state(), SessionState::Paused);
    thread::sleep(Duration::from_millis(20));
    let frozen = session.statistics();
    thread::sleep(Duration::from_millis(80));
    assert_eq!(session.statistics(), frozen);

    session.resume().unwrap();
    session.set_unpaced(true);
    assert_eq!(session.wait(), SessionState::Completed);
    assert_eq!(session.values(), (0..24).collect::<Vec<u32>>());
}

#[test]
fn reset_while_paused_cancels_and_keeps_a_permutation() {
    let input = [9, 4, 7, 1, 8, 2, 6, 3];
    let mut session = session_with(&input, Algorithm::Quick, 9);
    let events = session.subscribe();
    session.start().unwrap();
    thread::sleep(Duration::from_millis(40));
    session.pause().unwrap();

    assert_eq!(session.reset(), SessionState::Cancelled);
    let renderer = drain(&events);
    let Some(SessionEvent::Cancelled { stats, .. }) = renderer.events().last().cloned() else {
        panic!("expected a cancellation event");
    };
    assert_eq!(stats, session.statistics());

    let mut values = session.values();
    values.sort_unstable();
    let mut expected = input.to_vec();
    expected.sort_unstable();
    assert_eq!(values, expected);

    // A second reset returns to idle and clears the counters.
    assert_eq!(session.reset(), SessionState::Idle);
    assert_eq!(session.statistics().total_operations(), 0);
}

#[test]
fn each_run_starts_from_zeroed_statistics() {
    let mut session = session_with(&[3, 1, 2], Algorithm::Selection, 10);
    session.set_unpaced(true);
    session.start().unwrap();
    session.wait();
    let first = session.statistics();
    assert!(first.comparisons > 0);

    let events = session.subscribe();
    session.load_sequence(vec![3, 1, 2]).unwrap();
    let second = session.start().unwrap();
    assert_eq!(second, 2);
    let renderer = drain(&events);
    let first_step_stats = renderer.events().iter().find_map(|event| match event {
        SessionEvent::Step { stats, .. } => Some(*stats),
        _ => None,
    });
    // Selection opens with a pivot marker, before any counter moves.
    assert_eq!(first_step_stats.map(|s| s.total_operations()), Some(0));
    assert_eq!(session.wait(), SessionState::Completed);
    assert_eq!(session.statistics(), first);
}

#[test]
fn speeding_up_applies_to_the_active_run() {
    let mut session = session_with(&[6, 5, 4, 3, 2, 1], Algorithm::Bubble, 1);
    let started = web_time::Instant::now();
    session.start().unwrap();
    thread::sleep(Duration::from_millis(30));
    session.set_speed(SpeedLevel::FASTEST);
    assert_eq!(session.wait(), SessionState::Completed);
    // 15 comparisons and 15 swaps at 500 ms would take 15 s.
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn sessions_are_independent() {
    let handles: Vec<_> = Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            thread::spawn(move || {
                let mut session = SortSession::new(SessionConfig {
                    size: 40,
                    algorithm,
                    seed: Some(algorithm as u64),
                    ..SessionConfig::default()
                })
                .unwrap();
                session.set_unpaced(true);
                session.start().unwrap();
                (session.wait(), session.values())
            })
        })
        .collect();
    for handle in handles {
        let (state, values) = handle.join().unwrap();
        assert_eq!(state, SessionState::Completed);
        assert!(values.is_sorted());
    }
}

#[test]
fn generate_publishes_the_new_sequence_and_returns_to_idle() {
    let mut session = session_with(&[2, 1], Algorithm::Bubble, 10);
    session.set_unpaced(true);
    session.start().unwrap();
    session.wait();
    let events = session.subscribe();
    session.generate().unwrap();
    let received: Vec<_> = events.try_iter().collect();
    assert!(matches!(
        received[0],
        SessionEvent::StateChanged {
            from: SessionState::Completed,
            to: SessionState::Idle
        }
    ));
    assert!(matches!(&received[1], SessionEvent::SequenceReplaced { values } if values.len() == 30));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn configure_regenerates_on_resize_only() {
    let mut session = session_with(&[1, 2, 3], Algorithm::Bubble, 5);
    session
        .configure(SessionConfig {
            size: 30,
            speed: 8,
            algorithm: Algorithm::Merge,
            seed: Some(2024),
        })
        .unwrap();
    // Same size and seed: the loaded sequence survives.
    assert_eq!(session.values(), vec![1, 2, 3]);
    assert_eq!(session.speed().get(), 8);
    assert_eq!(session.algorithm(), Algorithm::Merge);

    session
        .configure(SessionConfig {
            size: 50,
            ..session.config().clone()
        })
        .unwrap();
    assert_eq!(session.values().len(), 50);
}
