//! Presentation: cue vocabulary, the `Presenter` collaborator, and the
//! cancellable `Stage` that drives it.

pub mod cue;
pub mod headless;
pub mod stage;

pub use cue::{Cue, Pace};
pub use headless::LogPresenter;
pub use stage::{Presenter, Stage};
