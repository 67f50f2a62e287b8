//! Match-scoped cancellation.
//!
//! A `CancelToken` is created with every match and cloned into every
//! suspending operation. Firing it rejects pending human-input waits,
//! presentation waits and opponent-decision waits alike.
//!
//! ## Semantics
//!
//! - `cancel()` is idempotent: only the first call has an effect, later
//!   calls (or calls with nothing pending) are no-ops.
//! - `guard(fut)` races a future against the token and prefers the token
//!   when both are ready, so nothing resolves after a cancellation.
//! - A child token observes its parent; cancelling the child leaves the
//!   parent untouched. Sessions hand matches child tokens.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;

use super::error::MatchError;

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<bool>,
    fires: AtomicU32,
    parent: Option<CancelToken>,
}

/// Shared cancellation signal.
#[derive(Clone, Debug)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Create a new, unfired token.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tx,
                fires: AtomicU32::new(0),
                parent: None,
            }),
        }
    }

    /// Create a token that is also cancelled when `self` is.
    #[must_use]
    pub fn child(&self) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tx,
                fires: AtomicU32::new(0),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Fire the token.
    ///
    /// Returns `true` only for the call that actually changed state.
    pub fn cancel(&self) -> bool {
        let fired = self.inner.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        });
        if fired {
            self.inner.fires.fetch_add(1, Ordering::SeqCst);
            log::info!("cancellation requested");
        }
        fired
    }

    /// Check whether this token, or any ancestor, has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.tx.borrow()
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
    }

    /// Number of effective fires. Never exceeds one.
    #[must_use]
    pub fn fire_count(&self) -> u32 {
        self.inner.fires.load(Ordering::SeqCst)
    }

    /// Resolve once the token (or an ancestor) fires.
    pub fn cancelled(&self) -> BoxFuture<'static, ()> {
        let token = self.clone();
        async move {
            let mut rx = token.inner.tx.subscribe();
            match token.inner.parent.clone() {
                Some(parent) => {
                    tokio::select! {
                        _ = rx.wait_for(|cancelled| *cancelled) => {}
                        _ = parent.cancelled() => {}
                    }
                }
                None => {
                    // The sender lives as long as `token`, so this cannot error.
                    let _ = rx.wait_for(|cancelled| *cancelled).await;
                }
            }
        }
        .boxed()
    }

    /// Run `fut` unless the token fires first.
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, MatchError>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(MatchError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(MatchError::Cancelled),
            out = fut => Ok(out),
        }
    }

    /// Fail fast if the token has already fired.
    pub fn check(&self) -> Result<(), MatchError> {
        if self.is_cancelled() {
            Err(MatchError::Cancelled)
        } else {
            Ok(())
        }
    }
}
