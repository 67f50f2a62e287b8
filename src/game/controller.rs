//! Match controller.
//!
//! A `Match` alternates turns until the board is full (or neither side has
//! a card left), runs the end-game bonus, and releases the board.
//!
//! ## Lifecycle
//!
//! ```text
//! MatchBuilder::build ── init_board, deal ──▶ Match
//! Match::run ── turns ──▶ end-game bonus ──▶ release ──▶ MatchEnd::Completed
//!             └─ token fires anywhere ─────▶ release ──▶ MatchEnd::Cancelled
//! ```
//!
//! The board is released exactly once on every path. Cancellation is
//! swallowed here and reported as `MatchEnd::Cancelled`; every other error
//! is returned.
//!
//! ## Strategy
//!
//! Where human input, user slot restrictions and opponent moves come from is
//! chosen at construction through `MatchStrategy`. Ordinary matches and
//! tutorials are the same type with different strategies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::board::BoardEngine;
use crate::core::{
    CancelToken, GameRng, Hand, MatchConfig, MatchError, MatchState, Phase, PresentationConfig, Side, SideMap,
    TurnEvent,
};
use crate::present::{LogPresenter, Presenter, Stage};
use crate::scoring::{play_end_game, PerkSet};
use crate::turns::{AnySlot, DecisionSource, EngineDecisions, InputSource, InputState, SlotFilter, TurnCoordinator};
use crate::wildcards::{WildcardDeck, WildcardId};

use super::table::Table;

/// Match result from the user's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    #[must_use]
    pub fn from_scores(scores: &SideMap<u32>) -> Self {
        match scores[Side::User].cmp(&scores[Side::Opponent]) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Summary of a completed match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub outcome: Outcome,
    pub scores: SideMap<u32>,
    pub log: Vec<TurnEvent>,
    pub placements: u32,
    pub destroyed: u32,
    /// Opponent decisions requested.
    pub opponent_requests: u32,
    /// Most opponent decisions outstanding at once.
    pub peak_outstanding: u32,
}

/// How `Match::run` settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchEnd {
    Completed(MatchReport),
    Cancelled,
}

impl MatchEnd {
    #[must_use]
    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            MatchEnd::Completed(report) => Some(report),
            MatchEnd::Cancelled => None,
        }
    }
}

/// Input, user slot filter and opponent decisions for a match.
pub struct MatchStrategy<E: BoardEngine> {
    pub input: Box<dyn InputSource>,
    pub filter: Box<dyn SlotFilter>,
    /// `None` uses the board engine at the configured difficulty.
    pub decisions: Option<Box<dyn DecisionSource<E>>>,
}

impl<E: BoardEngine> MatchStrategy<E> {
    /// Free placement, engine opponent.
    pub fn standard(input: impl InputSource + 'static) -> Self {
        Self {
            input: Box::new(input),
            filter: Box::new(AnySlot),
            decisions: None,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl SlotFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    #[must_use]
    pub fn with_decisions(mut self, decisions: impl DecisionSource<E> + 'static) -> Self {
        self.decisions = Some(Box::new(decisions));
        self
    }
}

/// Builder for a `Match`.
pub struct MatchBuilder<E: BoardEngine> {
    engine: E,
    config: MatchConfig,
    timing: PresentationConfig,
    presenter: Arc<dyn Presenter>,
    token: Option<CancelToken>,
    wildcards: Vec<WildcardId>,
    hands: Option<SideMap<Vec<Phase>>>,
    perks: PerkSet,
}

impl<E: BoardEngine> MatchBuilder<E> {
    pub fn new(engine: E, config: MatchConfig) -> Self {
        Self {
            engine,
            config,
            timing: PresentationConfig::default(),
            presenter: Arc::new(LogPresenter),
            token: None,
            wildcards: Vec::new(),
            hands: None,
            perks: PerkSet::empty(),
        }
    }

    #[must_use]
    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    #[must_use]
    pub fn with_presentation(mut self, timing: PresentationConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Use a specific token, typically a child of the session's.
    #[must_use]
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Wildcards the user owns for this match.
    #[must_use]
    pub fn with_wildcards(mut self, wildcards: impl IntoIterator<Item = WildcardId>) -> Self {
        self.wildcards = wildcards.into_iter().collect();
        self
    }

    /// Deal fixed hands instead of random ones.
    #[must_use]
    pub fn with_hands(mut self, hands: SideMap<Vec<Phase>>) -> Self {
        self.hands = Some(hands);
        self
    }

    /// Start with perks already active.
    #[must_use]
    pub fn with_perks(mut self, perks: PerkSet) -> Self {
        self.perks = perks;
        self
    }

    /// Initialise the board and deal.
    pub fn build(mut self, strategy: MatchStrategy<E>) -> Result<Match<E>, MatchError> {
        let config = self.config;
        let (board, graph) = self.engine.init_board(config.layout)?;

        let mut rng = GameRng::new(config.seed);
        let hands = match self.hands.take() {
            Some(fixed) => SideMap::new(|side| Hand::from_phases(fixed[side].iter().copied())),
            None => {
                let user = Hand::deal(config.hand_size, &mut rng);
                let opponent = Hand::deal(config.hand_size, &mut rng);
                let mut hands = SideMap::new(|_| Hand::default());
                hands[Side::User] = user;
                hands[Side::Opponent] = opponent;
                hands
            }
        };

        let mut state = MatchState::new(&graph, hands, WildcardDeck::new(self.wildcards.iter().copied()));
        state.perks = self.perks;

        let decisions = match strategy.decisions {
            Some(decisions) => decisions,
            None => Box::new(EngineDecisions::new(config.difficulty, config.depth(), rng.fork())),
        };
        let turns = TurnCoordinator::new(strategy.input, strategy.filter, decisions, config.refill_hands);

        let token = self.token.take().unwrap_or_default();
        let stage = Stage::new(self.presenter.clone(), self.timing.clone(), token);

        log::info!(
            "match ready: {} ({} slots), {} opponent, depth {}, {} first",
            config.layout,
            graph.len(),
            config.difficulty,
            config.depth(),
            config.first_mover
        );
        Ok(Match {
            table: Table::new(self.engine, board, graph, state, stage, rng),
            turns,
            first_mover: config.first_mover,
        })
    }
}

/// One game between the user and the opponent.
pub struct Match<E: BoardEngine> {
    table: Table<E>,
    turns: TurnCoordinator<E>,
    first_mover: Side,
}

impl<E: BoardEngine> Match<E> {
    /// The match's cancellation token.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        self.table.token().clone()
    }

    /// Observe what the user may do.
    #[must_use]
    pub fn input_state(&self) -> watch::Receiver<InputState> {
        self.turns.gate().subscribe()
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.table.state
    }

    #[must_use]
    pub fn graph(&self) -> &crate::board::SlotGraph {
        self.table.graph()
    }

    /// Play to completion or cancellation. Releases the board exactly once.
    pub async fn run(mut self) -> Result<MatchEnd, MatchError> {
        let result = self.play().await;
        self.turns.abort();
        self.table.release();

        match result {
            Ok(report) => {
                log::info!(
                    "match over: {:?} {} - {}",
                    report.outcome,
                    report.scores[Side::User],
                    report.scores[Side::Opponent]
                );
                Ok(MatchEnd::Completed(report))
            }
            Err(MatchError::Cancelled) => {
                log::info!("match cancelled");
                Ok(MatchEnd::Cancelled)
            }
            Err(e) => {
                log::error!("match stopped: {}", e);
                Err(e)
            }
        }
    }

    async fn play(&mut self) -> Result<MatchReport, MatchError> {
        let mut side = self.first_mover;
        self.table.show_scores().await?;

        loop {
            self.table.token().check()?;
            let state = &self.table.state;
            if state.is_full() {
                break;
            }
            if !state.can_move(Side::User) && !state.can_move(Side::Opponent) {
                log::info!("neither side has a card left with {} slots open", state.open_slots().len());
                break;
            }
            if !state.can_move(side) {
                log::info!("{} has no card, turn skipped", side);
                self.table.state.log.push(TurnEvent::Skipped { side });
                side = side.other();
                continue;
            }

            match side {
                Side::User => self.turns.human_turn(&mut self.table).await?,
                Side::Opponent => self.turns.opponent_turn(&mut self.table).await?,
            }
            self.table.state.check_occupancy()?;
            side = side.other();
        }

        play_end_game(&mut self.table).await?;

        let state = &self.table.state;
        let pipeline = self.turns.pipeline();
        Ok(MatchReport {
            outcome: Outcome::from_scores(&state.scores),
            scores: state.scores.clone(),
            log: state.log.clone(),
            placements: state.placements(),
            destroyed: state.destroyed(),
            opponent_requests: pipeline.issued(),
            peak_outstanding: pipeline.peak(),
        })
    }
}
