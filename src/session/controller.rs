//! Session progression.
//!
//! A session plays levels in sequence. Each level is one match whose tier,
//! board and first mover derive from the level number:
//!
//! - tier: last `SessionConfig::tier_thresholds` entry reached
//! - board: `SessionConfig::layouts`, cycled
//! - first mover: the user on odd levels, the opponent on even ones
//!
//! ## Results
//!
//! | Outcome | Effect |
//! |---|---|
//! | Win | score added, level + 1, unlock counter + 1, record checked |
//! | Loss | unlock counter reset, run over |
//! | Draw | same level and board again |
//! | Cancelled | run abandoned, nothing persisted |
//!
//! An unlock needs `early_unlock_wins` wins while fewer than
//! `early_unlock_count` wildcards are owned, `later_unlock_wins` after
//! that, and picks uniformly among wildcards not yet owned.
//!
//! Custom matches run through the same factory but never touch progress.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::board::{BoardEngine, LocalBoard};
use crate::core::{CancelToken, GameRng, MatchConfig, MatchError, PresentationConfig, SessionConfig, Side};
use crate::game::{Match, MatchBuilder, MatchEnd, MatchStrategy, Outcome};
use crate::present::Presenter;
use crate::turns::SharedInput;
use crate::wildcards::WildcardId;

use super::progress::{Progress, ProgressStore, Record, StoreError};

/// Creates the matches a session plays.
pub trait MatchFactory {
    type Engine: BoardEngine;

    fn create(
        &mut self,
        config: &MatchConfig,
        wildcards: &BTreeSet<WildcardId>,
        token: CancelToken,
    ) -> Result<Match<Self::Engine>, MatchError>;
}

/// Factory for matches on the in-process engine, all fed by one input.
#[derive(Clone)]
pub struct LocalMatches {
    input: SharedInput,
    presenter: Arc<dyn Presenter>,
    timing: PresentationConfig,
}

impl LocalMatches {
    pub fn new(input: SharedInput, presenter: Arc<dyn Presenter>, timing: PresentationConfig) -> Self {
        Self {
            input,
            presenter,
            timing,
        }
    }
}

impl MatchFactory for LocalMatches {
    type Engine = LocalBoard;

    fn create(
        &mut self,
        config: &MatchConfig,
        wildcards: &BTreeSet<WildcardId>,
        token: CancelToken,
    ) -> Result<Match<LocalBoard>, MatchError> {
        MatchBuilder::new(LocalBoard::new(config.seed), config.clone())
            .with_presenter(self.presenter.clone())
            .with_presentation(self.timing.clone())
            .with_token(token)
            .with_wildcards(wildcards.iter().copied())
            .build(MatchStrategy::standard(self.input.clone()))
    }
}

/// Errors a session can hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    Match(MatchError),
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Match(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<MatchError> for SessionError {
    fn from(e: MatchError) -> Self {
        SessionError::Match(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

/// Result of one level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelResult {
    Won {
        level: u32,
        score: u32,
        unlocked: Option<WildcardId>,
    },
    Lost {
        level: u32,
    },
    Draw {
        level: u32,
    },
    /// The user left mid-match.
    Left,
}

impl LevelResult {
    /// Whether the run goes on after this result.
    #[must_use]
    pub fn continues(&self) -> bool {
        matches!(self, LevelResult::Won { .. } | LevelResult::Draw { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RunState {
    level: u32,
    cumulative: u32,
    wins_toward_unlock: u32,
    attempts: u32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            level: 1,
            cumulative: 0,
            wins_toward_unlock: 0,
            attempts: 0,
        }
    }
}

/// Sequences matches across levels.
pub struct SessionController<F: MatchFactory, S: ProgressStore> {
    factory: F,
    store: S,
    config: SessionConfig,
    progress: Progress,
    run: RunState,
    rng: GameRng,
}

impl<F: MatchFactory, S: ProgressStore> SessionController<F, S> {
    /// Start a session, reading persisted progress.
    pub fn new(factory: F, mut store: S, config: SessionConfig) -> Result<Self, SessionError> {
        let progress = store.load()?;
        log::info!(
            "session started: best {} at level {}, {} wildcards unlocked",
            progress.best.score,
            progress.best.level,
            progress.unlocked.len()
        );
        let rng = GameRng::new(config.seed).for_context("unlocks");
        Ok(Self {
            factory,
            store,
            config,
            progress,
            run: RunState::default(),
            rng,
        })
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.run.level
    }

    /// Score accumulated over the current run.
    #[must_use]
    pub fn cumulative_score(&self) -> u32 {
        self.run.cumulative
    }

    #[must_use]
    pub fn wins_toward_unlock(&self) -> u32 {
        self.run.wins_toward_unlock
    }

    /// Match configuration for the current level.
    #[must_use]
    pub fn level_config(&self) -> MatchConfig {
        let level = self.run.level;
        let first_mover = if level % 2 == 1 { Side::User } else { Side::Opponent };
        let seed = self.config.seed ^ (u64::from(level) << 16) ^ u64::from(self.run.attempts);
        MatchConfig::default()
            .with_layout(self.config.layout_for(level))
            .with_difficulty(self.config.tier_for(level))
            .with_hand_size(self.config.hand_size)
            .with_first_mover(first_mover)
            .with_seed(seed)
    }

    /// Play the current level once.
    pub async fn play_level(&mut self, token: &CancelToken) -> Result<LevelResult, SessionError> {
        let level = self.run.level;
        let config = self.level_config();
        log::info!("level {}: {} on {}", level, config.difficulty, config.layout);

        let game = self.factory.create(&config, &self.progress.unlocked, token.child())?;
        let report = match game.run().await? {
            MatchEnd::Completed(report) => report,
            MatchEnd::Cancelled => {
                log::info!("left during level {}, run abandoned", level);
                self.run = RunState::default();
                return Ok(LevelResult::Left);
            }
        };

        match report.outcome {
            Outcome::Win => {
                let score = report.scores[Side::User];
                let unlocked = self.record_win(level, score)?;
                Ok(LevelResult::Won { level, score, unlocked })
            }
            Outcome::Loss => {
                log::info!("lost level {} with {} points this run", level, self.run.cumulative);
                self.run = RunState::default();
                Ok(LevelResult::Lost { level })
            }
            Outcome::Draw => {
                self.run.attempts += 1;
                log::info!("draw at level {}, retrying", level);
                Ok(LevelResult::Draw { level })
            }
        }
    }

    fn record_win(&mut self, level: u32, score: u32) -> Result<Option<WildcardId>, SessionError> {
        self.run.cumulative += score;
        self.run.level += 1;
        self.run.attempts = 0;
        self.run.wins_toward_unlock += 1;

        let mut changed = false;
        let mut unlocked = None;
        let needed = self.config.wins_per_unlock(self.progress.unlocked.len());
        if self.run.wins_toward_unlock >= needed {
            self.run.wins_toward_unlock = 0;
            let candidates: Vec<WildcardId> = WildcardId::ALL
                .into_iter()
                .filter(|id| !self.progress.unlocked.contains(id))
                .collect();
            if let Some(&id) = self.rng.choose(&candidates) {
                log::info!("unlocked wildcard {}", id);
                self.progress.unlocked.insert(id);
                unlocked = Some(id);
                changed = true;
            }
        }

        let record = Record {
            score: self.run.cumulative,
            level,
        };
        if record.beats(&self.progress.best) {
            log::info!("new record: {} points at level {}", record.score, record.level);
            self.progress.best = record;
            changed = true;
        }

        if changed {
            self.store.save(&self.progress)?;
        }
        Ok(unlocked)
    }

    /// Play levels until a loss or the user leaves.
    pub async fn run(&mut self, token: &CancelToken) -> Result<Vec<LevelResult>, SessionError> {
        let mut results = Vec::new();
        loop {
            let result = self.play_level(token).await?;
            results.push(result);
            if !result.continues() || token.is_cancelled() {
                return Ok(results);
            }
        }
    }

    /// A one-off match with no progression effects.
    pub async fn custom_match(&mut self, config: &MatchConfig, token: &CancelToken) -> Result<MatchEnd, SessionError> {
        log::info!("custom match: {} on {}, {} first", config.difficulty, config.layout, config.first_mover);
        let game = self.factory.create(config, &self.progress.unlocked, token.child())?;
        Ok(game.run().await?)
    }
}
