//! Play lunar-match from a terminal against the in-process engine.
//!
//! Commands, one per line:
//!
//! ```text
//! place <card> <slot>    put a hand card on a slot
//! wild <name>            play a wildcard (e.g. `wild super-moon`)
//! pick <slot>            choose a slot while a wildcard asks for one
//! done                   stop picking once a multi-slot wildcard has one
//! quit                   leave the match
//! ```

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use lunar_match::{
    CancelToken, ChannelInput, Cue, Difficulty, InputSource, Layout, LevelResult, LocalBoard, LocalMatches,
    MatchBuilder, MatchConfig, MatchEnd, MatchError, MemoryStore, PresentationConfig, Presenter, SessionConfig,
    SessionController, SharedInput, Side, SlotId, Tutorial, UiEvent, WildcardId,
};
use lunar_match::turns::PlacementRequest;

#[derive(Parser, Debug)]
#[command(name = "lunar", about = "Lunar-phase board card game")]
struct Opts {
    /// Seed for dealing and every other random choice
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Skip presentation pauses
    #[arg(long)]
    instant: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// A single match with chosen settings
    Custom {
        #[arg(long, default_value = "grid3")]
        layout: String,
        #[arg(long, value_enum, default_value_t = Tier::Normal)]
        difficulty: Tier,
        #[arg(long, value_enum, default_value_t = First::User)]
        first: First,
        /// Override the tier's search depth (0 or less plays randomly)
        #[arg(long)]
        depth: Option<i32>,
        #[arg(long, default_value_t = 4)]
        hand_size: usize,
        /// Wildcards to bring, by name; repeatable
        #[arg(long = "wildcard")]
        wildcards: Vec<String>,
    },
    /// Level progression until the first loss
    Campaign,
    /// The scripted introductory lesson
    Tutorial,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Tier {
    Weak,
    Normal,
    Strong,
    Expert,
}

impl From<Tier> for Difficulty {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Weak => Difficulty::Weak,
            Tier::Normal => Difficulty::Normal,
            Tier::Strong => Difficulty::Strong,
            Tier::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum First {
    User,
    Opponent,
}

/// Prints every cue to stdout.
struct ConsolePresenter;

#[async_trait]
impl Presenter for ConsolePresenter {
    fn prepare(&self, _cue: &Cue) {}

    async fn run(&self, cue: &Cue) {
        match cue {
            Cue::Decorate { .. } | Cue::Erase { .. } => {}
            _ => println!("  {}", cue),
        }
    }
}

/// Prints what the user may do before each wait.
struct Prompting<I> {
    inner: I,
}

#[async_trait]
impl<I: InputSource> InputSource for Prompting<I> {
    async fn next_action(&mut self, request: &PlacementRequest) -> Result<lunar_match::HumanAction, MatchError> {
        let hand: Vec<String> = request
            .hand
            .iter()
            .map(|(card, phase)| format!("{}={}", card, phase))
            .collect();
        let slots: Vec<u16> = request.slots.iter().map(|slot| slot.0).collect();
        println!("hand: {}", hand.join(", "));
        println!("open slots: {:?}", slots);
        if !request.wildcards.is_empty() {
            let names: Vec<&str> = request.wildcards.iter().map(|id| id.name()).collect();
            println!("wildcards: {}", names.join(", "));
        }
        self.inner.next_action(request).await
    }

    async fn pick_slot(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<SlotId, MatchError> {
        let slots: Vec<u16> = pool.iter().map(|slot| slot.0).collect();
        println!("{}: pick one of {:?}", wildcard, slots);
        self.inner.pick_slot(wildcard, pool).await
    }

    async fn pick_more(&mut self, wildcard: WildcardId, pool: &[SlotId]) -> Result<Option<SlotId>, MatchError> {
        let slots: Vec<u16> = pool.iter().map(|slot| slot.0).collect();
        println!("{}: pick another of {:?}, or done", wildcard, slots);
        self.inner.pick_more(wildcard, pool).await
    }
}

fn parse_command(line: &str) -> Option<Result<UiEvent, String>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let number = |word: &str| word.parse::<u16>().map_err(|_| format!("not a number: {}", word));
    let parsed = match words.as_slice() {
        [] => return None,
        ["place" | "p", card, slot] => number(card).and_then(|card| {
            number(slot).map(|slot| UiEvent::Place {
                card: card as usize,
                slot: SlotId(slot),
            })
        }),
        ["wild" | "w", name] => WildcardId::from_name(name)
            .map(UiEvent::UseWildcard)
            .ok_or_else(|| format!("unknown wildcard: {}", name)),
        ["pick", slot] => number(slot).map(|slot| UiEvent::PickSlot(SlotId(slot))),
        ["done"] => Ok(UiEvent::FinishSelection),
        _ => Err(format!("unrecognised command: {}", line.trim())),
    };
    Some(parsed)
}

/// Forward stdin lines as UI events until stdin closes or the user quits.
fn spawn_stdin(events: mpsc::Sender<UiEvent>, token: CancelToken) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim() == "quit" {
                token.cancel();
                break;
            }
            match parse_command(&line) {
                Some(Ok(event)) => {
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Some(Err(message)) => eprintln!("{}", message),
                None => {}
            }
        }
    });
}

fn report(end: &MatchEnd) {
    match end {
        MatchEnd::Completed(report) => println!(
            "{:?}: {} - {}",
            report.outcome,
            report.scores[Side::User],
            report.scores[Side::Opponent]
        ),
        MatchEnd::Cancelled => println!("match abandoned"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = Opts::parse();

    let timing = if opts.instant {
        PresentationConfig::instant()
    } else {
        PresentationConfig::default()
    };
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);
    let token = CancelToken::new();
    let (events, channel) = ChannelInput::channel(16);
    spawn_stdin(events, token.clone());
    let input = Prompting { inner: channel };

    match opts.mode {
        Mode::Custom {
            layout,
            difficulty,
            first,
            depth,
            hand_size,
            wildcards,
        } => {
            let layout = Layout::from_name(&layout).with_context(|| format!("unknown layout {}", layout))?;
            let wildcards = wildcards
                .iter()
                .map(|name| WildcardId::from_name(name).with_context(|| format!("unknown wildcard {}", name)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let mut config = MatchConfig::default()
                .with_layout(layout)
                .with_difficulty(difficulty.into())
                .with_first_mover(match first {
                    First::User => Side::User,
                    First::Opponent => Side::Opponent,
                })
                .with_hand_size(hand_size)
                .with_seed(opts.seed);
            if let Some(depth) = depth {
                config = config.with_search_depth(depth);
            }

            let game = MatchBuilder::new(LocalBoard::new(opts.seed), config)
                .with_presenter(presenter)
                .with_presentation(timing)
                .with_token(token.child())
                .with_wildcards(wildcards)
                .build(lunar_match::MatchStrategy::standard(input))?;
            report(&game.run().await?);
        }
        Mode::Campaign => {
            let factory = LocalMatches::new(SharedInput::new(input), presenter, timing);
            let config = SessionConfig::default().with_seed(opts.seed);
            let mut session = SessionController::new(factory, MemoryStore::default(), config)?;
            for result in session.run(&token).await? {
                match result {
                    LevelResult::Won { level, score, unlocked } => {
                        println!("level {} won with {}", level, score);
                        if let Some(id) = unlocked {
                            println!("unlocked {}: {}", id, id.description());
                        }
                    }
                    LevelResult::Lost { level } => println!("lost at level {}", level),
                    LevelResult::Draw { level } => println!("draw at level {}, again", level),
                    LevelResult::Left => println!("left the run"),
                }
            }
            let best = session.progress().best;
            println!("best: {} points at level {}", best.score, best.level);
        }
        Mode::Tutorial => {
            let lesson = Tutorial::first_steps();
            println!("follow the forced moves: {:?}", lesson.user_moves);
            let game = lesson
                .builder(LocalBoard::new(opts.seed))
                .with_presenter(presenter)
                .with_presentation(timing)
                .with_token(token.child())
                .build(lesson.strategy(input))?;
            report(&game.run().await?);
        }
    }
    Ok(())
}
