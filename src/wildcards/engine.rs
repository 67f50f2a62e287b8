//! Wildcard execution.
//!
//! `play` resolves one wildcard against the table. Slot picks suspend the
//! normal turn input: the gate switches to `InputState::Selecting` and the
//! input source is asked for a slot from the pool, under the match token.
//!
//! A transfer takes up to its count of slots. Only the first pick is
//! required; later picks go through `InputSource::pick_more`, which lets the
//! user finish the selection early.
//!
//! A wildcard whose pool is empty fails with `EmptySelectionPool`, which
//! `play` recovers from: it shows a message and reports the wildcard as not
//! consumed, so it stays playable.

use crate::board::BoardEngine;
use crate::core::{MatchError, Side, SlotId};
use crate::game::Table;
use crate::present::Cue;
use crate::turns::{InputGate, InputSource, InputState};

use super::catalog::{WildcardId, WildcardKind};

/// Result of playing a wildcard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WildcardOutcome {
    /// Resolved; the wildcard is spent for this match.
    Consumed,
    /// Nothing happened; the wildcard stays playable.
    NotConsumed,
    /// Resolved; the user now places a card on this slot before continuing.
    PlaceAgain(SlotId),
}

/// Play a wildcard.
pub async fn play<E: BoardEngine>(
    table: &mut Table<E>,
    input: &mut dyn InputSource,
    gate: &InputGate,
    id: WildcardId,
) -> Result<WildcardOutcome, MatchError> {
    log::info!("wildcard {} played", id);
    match resolve(table, input, gate, id).await {
        Err(MatchError::EmptySelectionPool(id)) => {
            log::warn!("{} has no valid target, not consumed", id);
            table.stage.say(format!("{}: no valid target", id)).await?;
            Ok(WildcardOutcome::NotConsumed)
        }
        other => other,
    }
}

async fn resolve<E: BoardEngine>(
    table: &mut Table<E>,
    input: &mut dyn InputSource,
    gate: &InputGate,
    id: WildcardId,
) -> Result<WildcardOutcome, MatchError> {
    match id.kind() {
        WildcardKind::Perk(perk) => {
            table.state.perks.insert(perk);
            table.stage.say(format!("{}: {}", perk, id.description())).await?;
            Ok(WildcardOutcome::Consumed)
        }
        WildcardKind::RandomDestroy { count } => {
            let pool = require(id, table.state.owned_by(Side::Opponent))?;
            let targets = table.rng.choose_many(&pool, count);
            log::debug!("{} destroys {:?}", id, targets);
            for slot in targets {
                table.destroy(slot).await?;
            }
            Ok(WildcardOutcome::Consumed)
        }
        WildcardKind::ChosenDestroy => {
            let pool: Vec<SlotId> = table
                .state
                .occupied_slots()
                .into_iter()
                .filter(|slot| !table.state.owner(*slot).is(Side::User))
                .collect();
            let pool = require(id, pool)?;
            let slot = pick(table, input, gate, id, &pool).await?;
            table.destroy(slot).await?;
            Ok(WildcardOutcome::Consumed)
        }
        WildcardKind::Transfer { count } => {
            let mut pool = require(id, table.state.owned_by(Side::Opponent))?;
            for taken in 0..count.min(pool.len()) {
                let Some(slot) = select(table, input, gate, id, &pool, taken > 0).await? else {
                    log::debug!("{} finished after {} of {} picks", id, taken, count);
                    break;
                };
                pool.retain(|s| *s != slot);
                table.claim(slot, Side::User)?;
                table.stage.show(Cue::Claim { side: Side::User, slot }).await?;
            }
            Ok(WildcardOutcome::Consumed)
        }
        WildcardKind::DestroyAndPlace => {
            let pool = require(id, table.state.occupied_slots())?;
            let slot = pick(table, input, gate, id, &pool).await?;
            table.destroy(slot).await?;
            Ok(WildcardOutcome::PlaceAgain(slot))
        }
    }
}

fn require(id: WildcardId, pool: Vec<SlotId>) -> Result<Vec<SlotId>, MatchError> {
    if pool.is_empty() {
        Err(MatchError::EmptySelectionPool(id))
    } else {
        Ok(pool)
    }
}

/// Ask the user for one slot from `pool`.
async fn pick<E: BoardEngine>(
    table: &Table<E>,
    input: &mut dyn InputSource,
    gate: &InputGate,
    id: WildcardId,
    pool: &[SlotId],
) -> Result<SlotId, MatchError> {
    select(table, input, gate, id, pool, false)
        .await?
        .ok_or_else(|| MatchError::contract("required pick finished early"))
}

/// Ask for a slot from `pool`, or `None` if an `optional` pick is declined.
/// Picks outside the pool are ignored.
async fn select<E: BoardEngine>(
    table: &Table<E>,
    input: &mut dyn InputSource,
    gate: &InputGate,
    id: WildcardId,
    pool: &[SlotId],
    optional: bool,
) -> Result<Option<SlotId>, MatchError> {
    gate.open(InputState::Selecting {
        wildcard: id,
        pool: pool.to_vec(),
        optional,
    });
    let picked = loop {
        let next = if optional {
            table.token().guard(input.pick_more(id, pool)).await
        } else {
            table.token().guard(input.pick_slot(id, pool)).await.map(|r| r.map(Some))
        };
        match next {
            Ok(Ok(Some(slot))) if pool.contains(&slot) => break Ok(Some(slot)),
            Ok(Ok(Some(slot))) => log::warn!("{} is not a valid target for {}", slot, id),
            Ok(Ok(None)) => break Ok(None),
            Ok(Err(e)) | Err(e) => break Err(e),
        }
    };
    gate.disable();
    picked
}
