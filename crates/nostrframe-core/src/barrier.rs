//! Connection resolution barrier.
//!
//! A [`Barrier`] is a one-shot future with a resolve/reject handle,
//! representing "relays are connected as of this generation". Any number of
//! waiters can await it, before or after it settles. Resetting replaces it
//! wholesale: a settled barrier is never reused, and waiters of a replaced
//! barrier observe [`BarrierError::Superseded`] so they can move on to the
//! current generation.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{FutureExt, future::Shared};
use tokio::sync::oneshot;

use crate::error::BarrierError;

type Outcome = Result<(), BarrierError>;

/// Settlement state of a barrier generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarrierState {
    /// Not settled yet.
    Pending,
    /// Connection succeeded.
    Fulfilled,
    /// Connection failed.
    Rejected(BarrierError),
}

/// Resettable one-shot barrier.
pub struct Barrier {
    generation: u64,
    state: BarrierState,
    resolver: Option<oneshot::Sender<Outcome>>,
    outcome: Shared<oneshot::Receiver<Outcome>>,
}

impl fmt::Debug for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Barrier")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for Barrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Barrier {
    /// Create a pending barrier at generation 1.
    pub fn new() -> Self {
        Self::with_generation(1)
    }

    fn with_generation(generation: u64) -> Self {
        let (resolver, receiver) = oneshot::channel();
        Self {
            generation,
            state: BarrierState::Pending,
            resolver: Some(resolver),
            outcome: receiver.shared(),
        }
    }

    /// Generation of the installed barrier. Increases on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Settlement state.
    pub fn state(&self) -> &BarrierState {
        &self.state
    }

    /// Whether the installed barrier has not settled yet.
    pub fn is_pending(&self) -> bool {
        self.state == BarrierState::Pending
    }

    /// Install a fresh pending barrier.
    ///
    /// Waiters of the previous barrier that had not observed a settlement
    /// complete with [`BarrierError::Superseded`].
    pub fn reset(&mut self) {
        *self = Self::with_generation(self.generation + 1);
    }

    /// Fulfil the barrier. Returns `false` if it had already settled.
    pub fn resolve(&mut self) -> bool {
        self.settle(Ok(()))
    }

    /// Reject the barrier. Returns `false` if it had already settled.
    pub fn reject(&mut self, error: BarrierError) -> bool {
        self.settle(Err(error))
    }

    fn settle(&mut self, outcome: Outcome) -> bool {
        let Some(resolver) = self.resolver.take() else {
            return false;
        };

        self.state = match &outcome {
            Ok(()) => BarrierState::Fulfilled,
            Err(error) => BarrierState::Rejected(error.clone()),
        };

        // The shared receiver is held by `self`, so the send cannot fail.
        let _ = resolver.send(outcome);
        true
    }

    /// Future that completes when this generation settles.
    pub fn wait(&self) -> BarrierWait {
        BarrierWait { generation: self.generation, outcome: self.outcome.clone() }
    }
}

/// Waiter for one barrier generation.
#[must_use = "futures do nothing unless polled"]
pub struct BarrierWait {
    generation: u64,
    outcome: Shared<oneshot::Receiver<Outcome>>,
}

impl fmt::Debug for BarrierWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarrierWait").field("generation", &self.generation).finish_non_exhaustive()
    }
}

impl BarrierWait {
    /// Generation this waiter belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Future for BarrierWait {
    type Output = Result<(), BarrierError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.outcome
            .poll_unpin(cx)
            .map(|received| received.unwrap_or(Err(BarrierError::Superseded)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiter_registered_before_resolve_completes() {
        let mut barrier = Barrier::new();
        let wait = barrier.wait();

        let handle = tokio::spawn(wait);
        tokio::task::yield_now().await;

        assert!(barrier.resolve());
        assert_eq!(handle.await.unwrap(), Ok(()));
        assert_eq!(barrier.state(), &BarrierState::Fulfilled);
    }

    #[tokio::test]
    async fn late_waiter_sees_settled_outcome() {
        let mut barrier = Barrier::new();
        assert!(barrier.reject(BarrierError::ConnectionFailed));

        assert_eq!(barrier.wait().await, Err(BarrierError::ConnectionFailed));
        assert_eq!(barrier.wait().await, Err(BarrierError::ConnectionFailed));
    }

    #[tokio::test]
    async fn settled_barrier_ignores_second_settlement() {
        let mut barrier = Barrier::new();
        assert!(barrier.resolve());
        assert!(!barrier.reject(BarrierError::ConnectionFailed));
        assert_eq!(barrier.wait().await, Ok(()));
    }

    #[tokio::test]
    async fn reset_supersedes_pending_waiters() {
        let mut barrier = Barrier::new();
        let old = barrier.wait();

        barrier.reset();
        assert_eq!(barrier.generation(), 2);
        assert!(barrier.is_pending());
        assert_eq!(old.await, Err(BarrierError::Superseded));

        let fresh = barrier.wait();
        assert!(barrier.resolve());
        assert_eq!(fresh.await, Ok(()));
    }

    #[tokio::test]
    async fn reset_after_settlement_starts_pending() {
        let mut barrier = Barrier::new();
        assert!(barrier.reject(BarrierError::ConnectionFailed));

        barrier.reset();
        assert_eq!(barrier.state(), &BarrierState::Pending);
        assert!(barrier.resolve());
    }
}
