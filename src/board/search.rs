//! Opponent move search.
//!
//! Depth-limited negamax over placements. A move's immediate value is the
//! stars its patterns are worth plus the swing in slot ownership after the
//! mover claims every slot those patterns touch. Perks are ignored here:
//! the search sees the board, not the match.
//!
//! Only the root ply is restricted to the real hand. Deeper plies assume
//! either side may hold any phase, since dealt cards are unknown.
//!
//! ## Performance
//!
//! Board snapshots are `im` vectors, so each child position costs one
//! structural-sharing clone. Searches run on tokio's blocking pool.

use crate::core::{EngineError, GameRng, Phase, Side, SlotId};

use super::engine::Decision;
use super::local::{base_stars, BoardState};
use super::pattern::RawPattern;

/// Pick a move for the opponent.
///
/// `depth <= 0` picks uniformly at random among legal moves. Ties at the
/// root are broken with `rng`.
pub fn choose(board: &BoardState, hand: &[Phase], depth: i32, rng: &mut GameRng) -> Result<Decision, EngineError> {
    let moves = root_moves(board, hand);
    if moves.is_empty() {
        return Err(EngineError::new(
            "request_opponent_move",
            format!("no legal move ({} cards, {} open slots)", hand.len(), board.open_slots().len()),
        ));
    }

    if depth <= 0 {
        let index = rng.gen_range_usize(0..moves.len());
        return Ok(moves[index]);
    }

    let mut best_value = i32::MIN;
    let mut best: Vec<Decision> = Vec::new();
    for decision in &moves {
        let mut child = board.clone();
        let gain = apply(&mut child, decision.slot, hand[decision.card], Side::Opponent);
        let value = gain - negamax(&child, Side::User, depth - 1);
        if value > best_value {
            best_value = value;
            best.clear();
        }
        if value == best_value {
            best.push(*decision);
        }
    }

    log::trace!("search depth {}: {} moves, best value {}", depth, moves.len(), best_value);
    rng.choose(&best)
        .copied()
        .ok_or_else(|| EngineError::new("request_opponent_move", "search produced no candidate"))
}

/// Legal (card, slot) pairs, skipping cards whose phase an earlier card
/// already covers.
fn root_moves(board: &BoardState, hand: &[Phase]) -> Vec<Decision> {
    let open = board.open_slots();
    let mut moves = Vec::with_capacity(hand.len() * open.len());
    for (card, phase) in hand.iter().enumerate() {
        if hand[..card].contains(phase) {
            continue;
        }
        for &slot in &open {
            moves.push(Decision { card, slot });
        }
    }
    moves
}

/// Best achievable value for `side` to move, from `side`'s point of view.
fn negamax(board: &BoardState, side: Side, depth: i32) -> i32 {
    if depth <= 0 || board.is_full() {
        return 0;
    }
    let mut best = i32::MIN;
    for slot in board.open_slots() {
        for phase in Phase::all() {
            let mut child = board.clone();
            let gain = apply(&mut child, slot, phase, side);
            let value = gain - negamax(&child, side.other(), depth - 1);
            best = best.max(value);
        }
    }
    best
}

/// Play a move on a scratch board and return its immediate value for `side`.
fn apply(board: &mut BoardState, slot: SlotId, phase: Phase, side: Side) -> i32 {
    let before = ownership_lead(board, side);
    let patterns = match board.place(slot, phase) {
        Ok(patterns) => patterns,
        Err(_) => return i32::MIN / 4,
    };
    for pattern in &patterns {
        for claimed in claimed_slots(slot, pattern) {
            // Slots in a detected pattern are occupied by construction.
            let _ = board.set_owner(claimed, side);
        }
    }
    base_stars(&patterns) as i32 + ownership_lead(board, side) - before
}

fn claimed_slots(subject: SlotId, pattern: &RawPattern) -> Vec<SlotId> {
    match pattern.other {
        Some(other) => vec![subject, other],
        None => pattern.chain.to_vec(),
    }
}

fn ownership_lead(board: &BoardState, side: Side) -> i32 {
    board.owned_by(side) as i32 - board.owned_by(side.other()) as i32
}
