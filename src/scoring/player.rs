//! Pattern event player.
//!
//! Presents and scores the patterns of one placement, then the end-game
//! bonus.
//!
//! ## Per pattern, in engine order
//!
//! 1. Apply the perk table (`perks::award`) to get starred, claimable and bonus.
//! 2. Draw the pattern's edges.
//! 3. Claim every claimable slot for the placing side.
//! 4. One point per starred slot: stars of a Lunar Cycle are revealed one
//!    after another, stars of a pair together.
//! 5. If there is a bonus, award it as a separate step.
//!
//! The batch is owned by `play_batch` and dropped on every exit path,
//! cancellation included, which runs the engine's release hook.
//!
//! ## End game
//!
//! Each side earns one point per slot it owns. Scorpio or Long Night Moon
//! suppress the opponent's pass entirely; Light of Venus awards the user's
//! pass a second time; Aquarius adds a flat 10 to the user, once.

use crate::board::{BoardEngine, Pattern, PatternBatch, PatternKind};
use crate::core::{Decoration, MatchError, Side, SlotId};
use crate::game::Table;
use crate::present::Cue;

use super::perks::{award, Award, Perk};

/// Bonus Aquarius adds at the end of the match.
pub const AQUARIUS_BONUS: u32 = 10;

/// Score and present every pattern of one placement.
pub async fn play_batch<E: BoardEngine>(table: &mut Table<E>, batch: PatternBatch) -> Result<(), MatchError> {
    let subject = batch.subject();
    let side = batch.side();
    let patterns = batch
        .records()
        .iter()
        .map(|raw| raw.decode())
        .collect::<Result<Vec<Pattern>, MatchError>>()
        .map_err(|e| {
            log::error!("undecodable pattern from placement on {}: {}", subject, e);
            e
        })?;

    let perks = table.state.perks;
    if side == Side::User && !patterns.is_empty() && table.state.perks.remove(Perk::Sagittarius) {
        log::info!("Sagittarius spent on {} patterns", patterns.len());
    }

    for pattern in &patterns {
        let award = award(pattern, subject, side, perks, |slot| table.state.owner(slot));
        log::debug!(
            "{:?} on {} for {}: {} starred, {} claimable, bonus {}",
            award.kind,
            subject,
            side,
            award.starred.len(),
            award.claimable.len(),
            award.bonus
        );
        decorate(table, pattern, subject).await?;
        claim(table, &award, side).await?;
        stars(table, &award, side).await?;
        if award.bonus > 0 {
            table.state.scores[side] += award.bonus;
            table
                .stage
                .show(Cue::Bonus {
                    side,
                    points: award.bonus,
                })
                .await?;
        }
        table.show_scores().await?;
    }

    drop(batch);
    Ok(())
}

async fn decorate<E: BoardEngine>(table: &mut Table<E>, pattern: &Pattern, subject: SlotId) -> Result<(), MatchError> {
    let kind = pattern.kind();
    let edges: Vec<Decoration> = pattern
        .edges(subject)
        .into_iter()
        .map(|(from, to)| Decoration { from, to, kind })
        .collect();
    let cues = edges
        .iter()
        .map(|edge| Cue::Decorate {
            from: edge.from,
            to: edge.to,
            kind,
        })
        .collect();
    table.state.decorations.extend(edges);
    table.stage.play(cues).await
}

async fn claim<E: BoardEngine>(table: &mut Table<E>, award: &Award, side: Side) -> Result<(), MatchError> {
    let mut cues = Vec::new();
    for &slot in &award.claimable {
        if table.state.owner(slot).is(side) {
            continue;
        }
        table.claim(slot, side)?;
        cues.push(Cue::Claim { side, slot });
    }
    table.stage.play(cues).await
}

async fn stars<E: BoardEngine>(table: &mut Table<E>, award: &Award, side: Side) -> Result<(), MatchError> {
    if award.kind == PatternKind::LunarCycle {
        for &slot in &award.starred {
            table.state.scores[side] += 1;
            table.stage.show(Cue::Star { side, slot }).await?;
        }
        Ok(())
    } else {
        table.state.scores[side] += award.starred.len() as u32;
        let cues = award.starred.iter().map(|&slot| Cue::Star { side, slot }).collect();
        table.stage.play(cues).await
    }
}

/// Run the end-game bonus: user pass, then opponent pass.
pub async fn play_end_game<E: BoardEngine>(table: &mut Table<E>) -> Result<(), MatchError> {
    let perks = table.state.perks;
    let user_slots = table.state.owned_by(Side::User);
    let opponent_slots = table.state.owned_by(Side::Opponent);
    log::info!(
        "end-game bonus: user owns {} slots, opponent owns {} ({:?})",
        user_slots.len(),
        opponent_slots.len(),
        perks
    );

    owned_pass(table, Side::User, &user_slots).await?;
    if perks.contains(Perk::LightOfVenus) {
        table.stage.say("Light of Venus: your bonus counts twice").await?;
        owned_pass(table, Side::User, &user_slots).await?;
    }
    if table.state.perks.remove(Perk::Aquarius) {
        table.state.scores[Side::User] += AQUARIUS_BONUS;
        table
            .stage
            .show(Cue::Bonus {
                side: Side::User,
                points: AQUARIUS_BONUS,
            })
            .await?;
    }

    if perks.contains(Perk::Scorpio) || perks.contains(Perk::LongNightMoon) {
        table.stage.say("The opponent's end-game bonus is suppressed").await?;
    } else {
        owned_pass(table, Side::Opponent, &opponent_slots).await?;
    }
    table.show_scores().await
}

async fn owned_pass<E: BoardEngine>(table: &mut Table<E>, side: Side, slots: &[SlotId]) -> Result<(), MatchError> {
    if slots.is_empty() {
        return Ok(());
    }
    table.state.scores[side] += slots.len() as u32;
    let cues = slots.iter().map(|&slot| Cue::Star { side, slot }).collect();
    table.stage.play(cues).await
}
