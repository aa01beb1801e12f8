//! Caller-supplied cancellation and deadline
//!
//! Every suspension point of the executor (retry back-off, rate-limit wait,
//! completion polling) goes through [`Context::sleep`], which returns as soon
//! as the token is cancelled or the deadline passes. A request that is
//! already on the wire is not aborted by cancellation; the executor only
//! hands the remaining deadline to the HTTP client as its timeout.

use std::future;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{ContextError, Result};

/// Cancellation token plus optional deadline
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that never expires unless cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Build a context around an existing token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Child context expiring after `timeout`, or earlier if this one does
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Child context expiring at `deadline`, or earlier if this one does
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Child context cancelled together with this one
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and all of its children
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Why the context stopped, if it has
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fail with the context error if the context already stopped
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Sleep for `duration` unless the context stops first
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.check()?;
        if duration.is_zero() {
            return Ok(());
        }

        tokio::select! {
            _ = self.token.cancelled() => Err(ContextError::Canceled.into()),
            _ = deadline_reached(self.deadline) => Err(ContextError::DeadlineExceeded.into()),
            _ = sleep(duration) => Ok(()),
        }
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
