//! Wildcard integration tests.
//!
//! Each test plays a short scripted match in which the user spends a
//! wildcard, then checks the board, the log and the scores.

mod common;

use std::sync::Arc;

use common::{assert_alternates, hands, placements, place, replies, CountingEngine, Recorder};
use lunar_match::{
    HumanAction, Layout, MatchBuilder, MatchConfig, MatchEnd, MatchReport, MatchStrategy, Outcome,
    PresentationConfig, ScriptedDecisions, ScriptedInput, Side, SlotId, TurnEvent, WildcardId,
};

fn config(first: Side) -> MatchConfig {
    MatchConfig::default()
        .with_layout(Layout::Grid3)
        .with_first_mover(first)
        .with_refill(false)
}

fn wild(id: WildcardId) -> HumanAction {
    HumanAction::UseWildcard(id)
}

fn completed(end: MatchEnd) -> MatchReport {
    match end {
        MatchEnd::Completed(report) => report,
        MatchEnd::Cancelled => panic!("match was cancelled"),
    }
}

/// The opponent pairs two 3s on slots 0 and 1, the user plays a 7 on slot 8
/// in between, then the user spends `id`.
async fn after_opponent_pair(
    id: WildcardId,
    actions: Vec<HumanAction>,
    picks: Vec<u16>,
) -> (MatchReport, CountingEngine, Recorder) {
    let engine = CountingEngine::new(11);
    let recorder = Recorder::default();
    let mut script = vec![place(0, 8), wild(id)];
    script.extend(actions);
    let input = ScriptedInput::new(script).with_picks(picks.into_iter().map(SlotId));

    let game = MatchBuilder::new(engine.clone(), config(Side::Opponent))
        .with_presenter(Arc::new(recorder.clone()))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[7, 6], &[3, 3]))
        .with_wildcards([id])
        .build(MatchStrategy::standard(input).with_decisions(ScriptedDecisions::new(replies(&[0, 1]))))
        .unwrap();
    let report = completed(game.run().await.unwrap());
    (report, engine, recorder)
}

// =============================================================================
// Destroy and Transfer
// =============================================================================

#[tokio::test]
async fn test_gemini_claims_two_opponent_slots() {
    let (report, _, _) = after_opponent_pair(WildcardId::Gemini, vec![place(1, 6)], vec![0, 1]).await;

    assert!(report.log.contains(&TurnEvent::Wildcard { id: WildcardId::Gemini }));
    // Opponent keeps its star; the user takes both slots into the end game.
    assert_eq!(report.scores[Side::Opponent], 1);
    assert_eq!(report.scores[Side::User], 2);
    assert_eq!(report.outcome, Outcome::Win);
}

#[tokio::test]
async fn test_gemini_ignores_picks_outside_the_pool() {
    // Slot 8 is the user's own card and is not offered.
    let (report, _, _) = after_opponent_pair(WildcardId::Gemini, vec![place(1, 6)], vec![8, 1, 0]).await;

    assert_eq!(report.scores[Side::User], 2);
}

#[tokio::test]
async fn test_gemini_selection_can_finish_early() {
    // Picks run out after one slot, which ends the selection.
    let (report, _, recorder) = after_opponent_pair(WildcardId::Gemini, vec![place(1, 6)], vec![0]).await;

    assert!(report.log.contains(&TurnEvent::Wildcard { id: WildcardId::Gemini }));
    let claimed: Vec<_> = recorder
        .cues()
        .into_iter()
        .filter(|cue| matches!(cue, lunar_match::Cue::Claim { side: Side::User, .. }))
        .collect();
    assert_eq!(
        claimed,
        vec![lunar_match::Cue::Claim {
            side: Side::User,
            slot: SlotId(0),
        }]
    );
    // The opponent keeps slot 1 and its star.
    assert_eq!(report.scores[Side::User], 1);
    assert_eq!(report.scores[Side::Opponent], 2);
    assert_eq!(report.outcome, Outcome::Loss);
}

#[tokio::test]
async fn test_aries_destroys_opponent_cards() {
    let (report, engine, recorder) = after_opponent_pair(WildcardId::Aries, vec![place(1, 6)], vec![]).await;

    assert_eq!(report.destroyed, 2);
    assert_eq!(report.placements, 4);
    for slot in [0, 1] {
        assert!(recorder.cues().contains(&lunar_match::Cue::Destroy { slot: SlotId(slot) }));
    }
    // The pair's edge goes with the cards.
    assert!(recorder.cues().contains(&lunar_match::Cue::Erase {
        from: SlotId(1),
        to: SlotId(0),
    }));
    assert_eq!(report.scores[Side::Opponent], 1);
    assert_eq!(report.scores[Side::User], 0);
    assert_eq!(engine.releases(), 1);
}

#[tokio::test]
async fn test_leo_destroys_chosen_card() {
    let (report, _, _) = after_opponent_pair(WildcardId::Leo, vec![place(1, 6)], vec![1]).await;

    assert_eq!(report.destroyed, 1);
    // Slot 0 stays with the opponent for the end game.
    assert_eq!(report.scores[Side::Opponent], 2);
}

#[tokio::test]
async fn test_empty_pool_keeps_wildcard() {
    let engine = CountingEngine::new(11);
    let recorder = Recorder::default();
    let input = ScriptedInput::new([wild(WildcardId::Aries), place(0, 4)]);
    let game = MatchBuilder::new(engine.clone(), config(Side::User))
        .with_presenter(Arc::new(recorder.clone()))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[1], &[]))
        .with_wildcards([WildcardId::Aries])
        .build(MatchStrategy::standard(input))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    assert!(!report
        .log
        .iter()
        .any(|event| matches!(event, TurnEvent::Wildcard { .. })));
    assert_eq!(report.placements, 1);
    assert!(recorder
        .messages()
        .iter()
        .any(|text| text.contains("no valid target")));
}

// =============================================================================
// Capricorn
// =============================================================================

/// Capricorn frees a slot, the user fills it, then makes the turn's
/// ordinary placement.
#[tokio::test]
async fn test_capricorn_grants_extra_placement() {
    let engine = CountingEngine::new(11);
    let input = ScriptedInput::new([
        wild(WildcardId::Capricorn),
        // Any slot but the freed one is refused.
        place(0, 4),
        place(0, 0),
        place(1, 1),
    ])
    .with_picks([SlotId(0)]);
    let game = MatchBuilder::new(engine.clone(), config(Side::Opponent))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[4, 5], &[3, 2]))
        .with_wildcards([WildcardId::Capricorn])
        .build(MatchStrategy::standard(input).with_decisions(ScriptedDecisions::new(replies(&[0, 2]))))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    assert_eq!(
        placements(&report.log),
        vec![
            (Side::Opponent, SlotId(0), false),
            (Side::User, SlotId(0), true),
            (Side::User, SlotId(1), false),
            (Side::Opponent, SlotId(2), false),
        ]
    );
    assert_alternates(&report.log);
    assert_eq!(report.destroyed, 1);
    assert_eq!(engine.releases(), 1);
}

#[tokio::test]
async fn test_wildcard_plays_once_per_match() {
    let input = ScriptedInput::new([
        wild(WildcardId::SuperMoon),
        // Already spent: ignored.
        wild(WildcardId::SuperMoon),
        place(0, 0),
        place(1, 1),
    ]);
    let game = MatchBuilder::new(CountingEngine::new(11), config(Side::User))
        .with_presentation(PresentationConfig::instant())
        .with_hands(hands(&[2, 6], &[]))
        .with_wildcards([WildcardId::SuperMoon])
        .build(MatchStrategy::standard(input))
        .unwrap();

    let report = completed(game.run().await.unwrap());

    let spent = report
        .log
        .iter()
        .filter(|event| matches!(event, TurnEvent::Wildcard { .. }))
        .count();
    assert_eq!(spent, 1);
    // Full moon pair: two stars plus the Super Moon bonus, then two owned slots.
    assert_eq!(report.scores[Side::User], 6);
}
