//! Property tests: arbitrary cast scripts replayed against the pure
//! transition model, and the audit invariant at quiescence.

use proptest::prelude::*;

use tally::VoteState;
use tally_store::ReputationLedger;
use tally_testkit::{cast_script, polarity, replay, TestWorld};

fn run<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// One voter, one target: the engine's final state and the author's
    /// counter always match the transition-table replay.
    #[test]
    fn single_voter_scripts_match_model(script in cast_script(16)) {
        run(async {
            let world = TestWorld::new();
            let author = TestWorld::user("author");
            let target = world.question_by(&author);
            let voter = TestWorld::user("voter");

            let mut state = VoteState::NoVote;
            for &p in &script {
                state = world
                    .coordinator
                    .cast_vote(&voter, &target, p)
                    .await
                    .unwrap()
                    .state;
            }

            let expected = replay(&script);
            assert_eq!(state, expected.state);
            assert_eq!(world.backend.counter(&author).await.unwrap(), expected.net_delta);
        });
    }

    /// Many voters and targets of one author: once no casts are in flight,
    /// the stored counter equals the recomputed truth.
    #[test]
    fn audit_invariant_holds_at_quiescence(
        casts in proptest::collection::vec((0..3usize, 0..2usize, polarity()), 0..24)
    ) {
        run(async {
            let world = TestWorld::new();
            let author = TestWorld::user("author");
            let targets = [world.question_by(&author), world.answer_by(&author)];
            let voters = [
                TestWorld::user("u0"),
                TestWorld::user("u1"),
                TestWorld::user("u2"),
            ];

            for (v, t, p) in casts {
                world
                    .coordinator
                    .cast_vote(&voters[v], &targets[t], p)
                    .await
                    .unwrap();
            }

            let stored = world.backend.counter(&author).await.unwrap();
            let truth = world.auditor.recompute(&author).await.unwrap();
            assert_eq!(stored, truth);

            // Per-target tallies agree with the counter as well.
            let mut score = 0;
            for t in &targets {
                score += world.coordinator.tally(t).await.unwrap().score;
            }
            assert_eq!(score, truth);
        });
    }
}
