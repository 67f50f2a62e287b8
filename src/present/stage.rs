//! Cancellable step runner.
//!
//! `Stage::play` runs one presentation step:
//!
//! 1. Fail fast if the match is cancelled.
//! 2. `prepare` every cue, so each starts from its initial visual state
//!    before any of them renders a frame.
//! 3. `run` all cues concurrently and wait until every one completes.
//! 4. Hold for the step's pace (the slowest cue's configured duration).
//!
//! Steps 3 and 4 race the match's cancellation token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::core::{CancelToken, MatchError, PresentationConfig};

use super::cue::{Cue, Pace};

/// Presentation collaborator.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Set the cue's starting visual state. Must not suspend.
    fn prepare(&self, cue: &Cue);

    /// Animate the cue to completion.
    async fn run(&self, cue: &Cue);
}

/// Runs presentation steps for one match.
#[derive(Clone)]
pub struct Stage {
    presenter: Arc<dyn Presenter>,
    timing: PresentationConfig,
    token: CancelToken,
}

impl Stage {
    pub fn new(presenter: Arc<dyn Presenter>, timing: PresentationConfig, token: CancelToken) -> Self {
        Self {
            presenter,
            timing,
            token,
        }
    }

    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Play a group of cues as one step.
    pub async fn play(&self, cues: Vec<Cue>) -> Result<(), MatchError> {
        if cues.is_empty() {
            return Ok(());
        }
        self.token.check()?;

        for cue in &cues {
            self.presenter.prepare(cue);
        }
        let runs = cues.iter().map(|cue| self.presenter.run(cue));
        self.token.guard(join_all(runs)).await?;

        let pace = cues.iter().map(Cue::pace).max().unwrap_or(Pace::Instant);
        self.hold(self.duration(pace)).await
    }

    /// Play a single cue.
    pub async fn show(&self, cue: Cue) -> Result<(), MatchError> {
        self.play(vec![cue]).await
    }

    /// Show an informational message.
    pub async fn say(&self, text: impl Into<String>) -> Result<(), MatchError> {
        self.show(Cue::message(text)).await
    }

    async fn hold(&self, duration: Duration) -> Result<(), MatchError> {
        if duration.is_zero() {
            return self.token.check();
        }
        self.token.guard(tokio::time::sleep(duration)).await
    }

    fn duration(&self, pace: Pace) -> Duration {
        match pace {
            Pace::Instant => Duration::ZERO,
            Pace::Star => self.timing.star(),
            Pace::Step => self.timing.step(),
            Pace::Bonus => self.timing.bonus(),
            Pace::Message => self.timing.message(),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("timing", &self.timing)
            .field("token", &self.token)
            .finish()
    }
}
