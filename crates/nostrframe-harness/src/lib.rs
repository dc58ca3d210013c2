//! Deterministic test harness for Nostr elements.
//!
//! Test doubles for the two seams of a component plus invariant checks over
//! its observable state.
//!
//! - [`ScriptedService`]: a [`nostrframe_app::NostrService`] whose requests
//!   are answered from fixtures or held until the test completes them
//! - [`RecordingHost`]: a [`nostrframe_app::Host`] that records every call
//! - [`settle`]: drive spawned tasks to quiescence on a current-thread runtime
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties against a
//! [`SystemSnapshot`]. Use [`InvariantRegistry::standard()`] for the channel
//! and reflection invariants, and [`Observer`] to accumulate sequence history
//! across steps.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod host;
pub mod invariants;
pub mod service;

pub use host::{HostCall, RecordingHost};
pub use invariants::{
    ComponentSnapshot, ErrorMessageIffError, Invariant, InvariantKind, InvariantRegistry,
    InvariantResult, Observer, OverallMatchesChannels, ReflectedStatusMatches, SequenceSample,
    SequencesMonotonic, SurfacedErrorConsistent, SystemSnapshot, Violation,
};
pub use service::{Request, ScriptedService};

/// Yield rounds performed by [`settle`].
pub const SETTLE_ROUNDS: usize = 64;

/// Let every runnable task make progress until nothing is left to do.
///
/// Only meaningful on a current-thread runtime, where yielding hands control
/// to the other spawned tasks. Held service requests stay pending.
pub async fn settle() {
    for _ in 0..SETTLE_ROUNDS {
        tokio::task::yield_now().await;
    }
}
