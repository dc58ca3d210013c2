//! Stale-operation guard.
//!
//! Each family of cancellable async work (connection, primary entity,
//! secondary entity) owns a [`Sequence`]. Starting an operation advances the
//! sequence and hands out a [`Ticket`]. After every suspension point the
//! operation checks its ticket; if a newer operation started meanwhile, the
//! result is dropped without touching any state.
//!
//! Nothing is aborted upstream. The external service finishes its work; only
//! the application of the result is suppressed.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Generation captured when an operation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw sequence value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic counter for one operation family.
///
/// Shared by reference between a component and its in-flight tasks.
#[derive(Debug, Default)]
pub struct Sequence(AtomicU64);

impl Sequence {
    /// Create a sequence at zero. No ticket is current until [`Self::advance`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation, superseding all earlier tickets.
    pub fn advance(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Live counter value.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Whether `ticket` belongs to the most recently started operation.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current() == ticket.0
    }
}
