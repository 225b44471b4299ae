//! Property-based checks over whole session runs.

use proptest::prelude::*;
use sortviz_core::Algorithm;
use sortviz_runtime::{
    RecordingRenderer, SessionConfig, SessionEvent, SessionState, SortSession, pump,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_run_completes_sorted_and_mirrored(
        algorithm in prop::sample::select(Algorithm::ALL.to_vec()),
        input in prop::collection::vec(0u32..1_000, 0..32),
    ) {
        let mut session = SortSession::new(SessionConfig {
            algorithm,
            seed: Some(1),
            ..SessionConfig::default()
        })
        .unwrap();
        session.set_unpaced(true);
        session.load_sequence(input.clone()).unwrap();
        let events = session.subscribe();
        let run = session.start().unwrap();

        let mut renderer = RecordingRenderer::new();
        let terminal = pump(&events, &mut renderer).unwrap();
        prop_assert_eq!(session.wait(), SessionState::Completed);

        let mut expected = input;
        expected.sort_unstable();
        prop_assert_eq!(session.values(), expected.clone());
        prop_assert_eq!(renderer.values(), expected.as_slice());
        prop_assert!(matches!(terminal, Some(SessionEvent::Completed(ref r)) if r.run == run));

        let mut last = 0.0;
        for event in renderer.events() {
            if let SessionEvent::Progress { progress, .. } = event {
                prop_assert!(progress.percent >= last);
                last = progress.percent;
            }
        }
        prop_assert_eq!(last, 100.0);
    }
}
