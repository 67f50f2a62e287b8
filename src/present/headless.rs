//! Presenter that renders cues to the log.

use async_trait::async_trait;

use super::cue::Cue;
use super::stage::Presenter;

/// Writes every cue to the `log` facade. Used by the binary and headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    fn prepare(&self, cue: &Cue) {
        log::trace!("prepare: {}", cue);
    }

    async fn run(&self, cue: &Cue) {
        match cue {
            Cue::Message(text) => log::info!("{}", text),
            Cue::Score { .. } => log::info!("{}", cue),
            _ => log::debug!("{}", cue),
        }
    }
}
