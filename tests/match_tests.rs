//! Match orchestration integration tests.
//!
//! These tests run whole matches against the in-process board engine with
//! scripted input and scripted or searched opponent moves.

mod common;

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use common::{
    assert_alternates, hands, place, placements, replies, CountingEngine, FirstLegal, Pending, Recorder,
};
use lunar_match::{
    Cue, InputState, Layout, MatchBuilder, MatchConfig, MatchEnd, MatchReport, MatchStrategy, Outcome, PatternKind,
    Perk, PerkSet, PresentationConfig, ScriptedDecisions, ScriptedInput, Side, SlotId, Tutorial,
};

fn grid3(first: Side) -> MatchConfig {
    MatchConfig::default()
        .with_layout(Layout::Grid3)
        .with_first_mover(first)
        .with_refill(false)
}

fn completed(end: MatchEnd) -> MatchReport {
    match end {
        MatchEnd::Completed(report) => report,
        MatchEnd::Cancelled => panic!("match was cancelled"),
    }
}

// =============================================================================
// Pattern Scoring
// =============================================================================

/// Matching a phase already on an adjacent slot scores a phase pair.
#[tokio::test]
async fn test_phase_pair_scores_and_claims() {
    let engine = CountingEngine::new(1);
    let recorder = Recorder::default();
    let game = MatchBuilder::new(engine.clone(), grid3(Side::Opponent))
        .with_presenter(Arc::new(recorder.clone()))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[1], &[1]))
        .build(
            MatchStrategy::standard(ScriptedInput::new([place(0, 0)]))
                .with_decisions(ScriptedDecisions::new(replies(&[3]))),
        )
        .unwrap();

    let report = completed(game.run().await.unwrap());

    let cues = recorder.cues();
    let decorate = cues
        .iter()
        .position(|cue| {
            *cue == Cue::Decorate {
                from: SlotId(0),
                to: SlotId(3),
                kind: PatternKind::PhasePair,
            }
        })
        .expect("pair edge drawn");
    let star = cues
        .iter()
        .position(|cue| {
            *cue == Cue::Star {
                side: Side::User,
                slot: SlotId(0),
            }
        })
        .expect("subject starred");
    assert!(decorate < star);
    for slot in [0, 3] {
        assert!(cues.contains(&Cue::Claim {
            side: Side::User,
            slot: SlotId(slot),
        }));
    }
    assert!(cues.iter().any(|cue| matches!(
        cue,
        Cue::Score { scores } if scores[Side::User] == 1 && scores[Side::Opponent] == 0
    )));

    // One star, then both claimed slots at the end.
    assert_eq!(report.scores[Side::User], 3);
    assert_eq!(report.scores[Side::Opponent], 0);
    assert_eq!(report.outcome, Outcome::Win);
    assert_eq!(report.opponent_requests, 1);
    assert_eq!(engine.batch_releases(), 2);
    assert_eq!(engine.releases(), 1);
}

/// Sagittarius multiplies the first scoring batch only.
#[tokio::test]
async fn test_sagittarius_spent_on_first_scoring_batch() {
    let recorder = Recorder::default();
    let perks: PerkSet = [Perk::Sagittarius].into_iter().collect();
    let game = MatchBuilder::new(CountingEngine::new(1), grid3(Side::User))
        .with_presenter(Arc::new(recorder.clone()))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[4, 4, 4], &[]))
        .with_perks(perks)
        .build(MatchStrategy::standard(ScriptedInput::new([
            place(0, 0),
            place(1, 1),
            place(2, 2),
        ])))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    let bonuses: Vec<Cue> = recorder
        .cues()
        .into_iter()
        .filter(|cue| matches!(cue, Cue::Bonus { .. }))
        .collect();
    assert_eq!(
        bonuses,
        vec![Cue::Bonus {
            side: Side::User,
            points: 2
        }]
    );
    // 1 + 2 bonus, then 1, then 3 owned slots.
    assert_eq!(report.scores[Side::User], 7);
}

/// Scorpio suppresses the opponent's end-game bonus.
#[tokio::test]
async fn test_scorpio_zeroes_opponent_end_game() {
    async fn play(perks: PerkSet) -> MatchReport {
        let game = MatchBuilder::new(CountingEngine::new(1), grid3(Side::Opponent))
            .with_presentation(PresentationConfig::instant())
            .with_hands(hands(&[0], &[3, 3]))
            .with_perks(perks)
            .build(
                MatchStrategy::standard(ScriptedInput::new([place(0, 0)]))
                    .with_decisions(ScriptedDecisions::new(replies(&[2, 5]))),
            )
            .unwrap();
        completed(game.run().await.unwrap())
    }

    // The opponent's pair on 2 and 5 earns one star either way.
    let plain = play(PerkSet::empty()).await;
    assert_eq!(plain.scores[Side::Opponent], 3);

    let scorpio = play([Perk::Scorpio].into_iter().collect()).await;
    assert_eq!(scorpio.scores[Side::Opponent], 1);
    assert_eq!(scorpio.scores[Side::User], 0);
    assert_eq!(scorpio.outcome, Outcome::Loss);
}

#[tokio::test]
async fn test_venus_and_aquarius_end_game() {
    let recorder = Recorder::default();
    let game = MatchBuilder::new(CountingEngine::new(1), grid3(Side::Opponent))
        .with_presenter(Arc::new(recorder.clone()))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[1], &[1]))
        .with_perks([Perk::LightOfVenus, Perk::Aquarius].into_iter().collect())
        .build(
            MatchStrategy::standard(ScriptedInput::new([place(0, 0)]))
                .with_decisions(ScriptedDecisions::new(replies(&[3]))),
        )
        .unwrap();

    let report = completed(game.run().await.unwrap());

    // One star for the pair, two owned slots counted twice, then the flat bonus.
    assert_eq!(report.scores[Side::User], 1 + 2 + 2 + 10);
    assert_eq!(report.scores[Side::Opponent], 0);
    let aquarius = recorder
        .cues()
        .into_iter()
        .filter(|cue| {
            *cue == Cue::Bonus {
                side: Side::User,
                points: 10,
            }
        })
        .count();
    assert_eq!(aquarius, 1);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_while_awaiting_input() {
    let engine = CountingEngine::new(3);
    let game = MatchBuilder::new(engine.clone(), grid3(Side::User))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[1, 2], &[3, 4]))
        .build(MatchStrategy::standard(Pending))
        .unwrap();
    let token = game.token();
    let mut gate = game.input_state();

    let cancel = async {
        gate.wait_for(|state| matches!(state, InputState::Placement { .. }))
            .await
            .unwrap();
        assert!(token.cancel());
        assert!(!token.cancel());
    };
    let (end, ()) = tokio::join!(game.run(), cancel);

    assert_eq!(end.unwrap(), MatchEnd::Cancelled);
    assert_eq!(engine.releases(), 1);
    assert_eq!(token.fire_count(), 1);
    assert_eq!(*gate.borrow(), InputState::Disabled);
}

#[tokio::test]
async fn test_cancel_during_presentation_releases_batch() {
    let engine = CountingEngine::new(3);
    let timing = PresentationConfig {
        step_ms: 60_000,
        ..PresentationConfig::instant()
    };
    let game = MatchBuilder::new(engine.clone(), grid3(Side::User))
        .with_presentation(timing)
        .with_hands(hands(&[1, 2], &[3, 4]))
        .build(MatchStrategy::standard(ScriptedInput::new([place(0, 4)])))
        .unwrap();
    let token = game.token();

    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    };
    let (end, ()) = tokio::join!(game.run(), cancel);

    assert_eq!(end.unwrap(), MatchEnd::Cancelled);
    assert_eq!(engine.releases(), 1);
    assert_eq!(engine.batch_releases(), 1);
}

#[tokio::test]
async fn test_parent_token_cancels_match() {
    let engine = CountingEngine::new(3);
    let session = lunar_match::CancelToken::new();
    let game = MatchBuilder::new(engine.clone(), grid3(Side::User))
        .with_presentation(PresentationConfig::instant())
        .with_token(session.child())
        .with_hands(hands(&[1], &[2]))
        .build(MatchStrategy::standard(Pending))
        .unwrap();

    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.cancel();
    };
    let (end, ()) = tokio::join!(game.run(), cancel);

    assert_eq!(end.unwrap(), MatchEnd::Cancelled);
    assert_eq!(engine.releases(), 1);
}

// =============================================================================
// Turn Order
// =============================================================================

#[tokio::test]
async fn test_sides_alternate() {
    let game = MatchBuilder::new(CountingEngine::new(5), MatchConfig::default().with_layout(Layout::Grid3))
        .with_presentation(PresentationConfig::instant())
        .build(MatchStrategy::standard(FirstLegal))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    assert_alternates(&report.log);
    assert_eq!(report.placements, 9);
    let sides: Vec<Side> = placements(&report.log).iter().map(|&(side, _, _)| side).collect();
    assert_eq!(sides[0], Side::User);
    assert_eq!(sides[1], Side::Opponent);
}

/// A side with no cards is skipped; the other side keeps playing.
#[tokio::test]
async fn test_empty_hand_is_skipped() {
    let game = MatchBuilder::new(CountingEngine::new(5), grid3(Side::Opponent))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[2, 6], &[]))
        .build(MatchStrategy::standard(ScriptedInput::new([place(0, 0), place(1, 8)])))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    assert_eq!(report.placements, 2);
    assert_eq!(report.opponent_requests, 0);
    assert!(report
        .log
        .contains(&lunar_match::TurnEvent::Skipped { side: Side::Opponent }));
    assert_eq!(report.outcome, Outcome::Draw);
}

// =============================================================================
// Tutorial
// =============================================================================

#[tokio::test]
async fn test_tutorial_plays_to_a_win() {
    let lesson = Tutorial::first_steps();
    // The first action breaks the lesson's script and is ignored.
    let mut actions = vec![place(1, 0)];
    actions.extend(lesson.user_moves.iter().map(|&(card, slot)| place(card, slot.0)));

    let engine = CountingEngine::new(9);
    let game = lesson
        .builder(engine.clone())
        .with_presentation(PresentationConfig::instant())
        .build(lesson.strategy(ScriptedInput::new(actions)))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    assert_eq!(report.outcome, Outcome::Win);
    assert_eq!(report.scores[Side::User], 12);
    assert_eq!(report.scores[Side::Opponent], 7);
    assert_eq!(report.placements, 8);
    // Scripted replies never reach the engine's search.
    assert_eq!(engine.requests(), 0);
    assert_eq!(engine.releases(), 1);
}

// =============================================================================
// Determinism and Invariants
// =============================================================================

#[tokio::test]
async fn test_same_seed_same_match() {
    async fn play() -> MatchReport {
        let perks: PerkSet = [Perk::SuperMoon, Perk::LightOfMars, Perk::MoonAtApogee]
            .into_iter()
            .collect();
        let config = MatchConfig::default().with_layout(Layout::Grid4).with_seed(77);
        let game = MatchBuilder::new(CountingEngine::new(77), config)
            .with_presentation(PresentationConfig::instant())
            .with_perks(perks)
            .build(MatchStrategy::standard(FirstLegal))
            .unwrap();
        completed(game.run().await.unwrap())
    }

    assert_eq!(play().await, play().await);
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// With refills on, every match fills the board, every opponent request
    /// is consumed, and nothing overlaps.
    #[test]
    fn test_random_matches_fill_the_board(seed in 0u64..10_000, layout in 0usize..Layout::ALL.len(), user_first in any::<bool>()) {
        let layout = Layout::ALL[layout];
        let first = if user_first { Side::User } else { Side::Opponent };
        let config = MatchConfig::default()
            .with_layout(layout)
            .with_first_mover(first)
            .with_search_depth(0)
            .with_seed(seed);
        let engine = CountingEngine::new(seed);
        let game = MatchBuilder::new(engine.clone(), config)
            .with_presentation(PresentationConfig::instant())
            .build(MatchStrategy::standard(FirstLegal))
            .unwrap();

        let report = completed(block_on(game.run()).unwrap());

        let slots = layout.graph().len();
        let opponent_moves = placements(&report.log)
            .iter()
            .filter(|&&(side, _, _)| side == Side::Opponent)
            .count();
        prop_assert_eq!(report.placements as usize, slots);
        prop_assert_eq!(report.destroyed, 0);
        prop_assert!(report.peak_outstanding <= 1);
        prop_assert_eq!(report.opponent_requests as usize, opponent_moves);
        prop_assert_eq!(engine.requests(), opponent_moves);
        prop_assert_eq!(engine.batch_releases(), slots);
        prop_assert_eq!(engine.releases(), 1);
        assert_alternates(&report.log);
    }
}
