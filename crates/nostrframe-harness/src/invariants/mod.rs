//! Invariant checking for component behavior.
//!
//! Invariants are properties that must hold after every lifecycle step,
//! regardless of the order in which attribute changes and async completions
//! arrive. Scenario tests check specific outcomes; invariants check that no
//! interleaving leaves a component in an inconsistent state.
//!
//! # Architecture
//!
//! A [`ComponentSnapshot`] captures a component's channels, its reflected
//! host state and the history of its stale-guard sequences. Registered
//! [`Invariant`]s run against a [`SystemSnapshot`] of one or more components.
//! [`Observer`] keeps the sequence history between steps.
//!
//! # Usage
//!
//! ```ignore
//! let mut observer = Observer::new(InvariantRegistry::standard());
//! element.on_attach();
//! settle().await;
//! observer.observe(ComponentSnapshot::resolving(&element, &host), "after attach");
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{
    ErrorMessageIffError, OverallMatchesChannels, ReflectedStatusMatches, SequencesMonotonic,
    SurfacedErrorConsistent,
};
pub use snapshot::{ComponentSnapshot, SequenceSample, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies a standard invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// See [`OverallMatchesChannels`].
    OverallMatchesChannels,
    /// See [`ErrorMessageIffError`].
    ErrorMessageIffError,
    /// See [`SurfacedErrorConsistent`].
    SurfacedErrorConsistent,
    /// See [`ReflectedStatusMatches`].
    ReflectedStatusMatches,
    /// See [`SequencesMonotonic`].
    SequencesMonotonic,
}

impl InvariantKind {
    /// Name for error reporting.
    pub fn name(self) -> &'static str {
        match self {
            Self::OverallMatchesChannels => "overall_matches_channels",
            Self::ErrorMessageIffError => "error_message_iff_error",
            Self::SurfacedErrorConsistent => "surfaced_error_consistent",
            Self::ReflectedStatusMatches => "reflected_status_matches",
            Self::SequencesMonotonic => "sequences_monotonic",
        }
    }
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A behavioral property checked against a snapshot.
pub trait Invariant: Send + Sync {
    /// Which invariant this is.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant against the snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every standard invariant.
    ///
    /// Includes:
    /// - [`OverallMatchesChannels`]: reflected overall is the channel aggregate
    /// - [`ErrorMessageIffError`]: channels carry a message exactly in `Error`
    /// - [`SurfacedErrorConsistent`]: surfaced error comes from an `Error` channel
    /// - [`ReflectedStatusMatches`]: host attributes and presentation agree
    /// - [`SequencesMonotonic`]: stale-guard sequences never go backwards
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(OverallMatchesChannels);
        registry.add(ErrorMessageIffError);
        registry.add(SurfacedErrorConsistent);
        registry.add(ReflectedStatusMatches);
        registry.add(SequencesMonotonic);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants. Returns every violation found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

/// Checks one component across steps, carrying its sequence history.
pub struct Observer {
    registry: InvariantRegistry,
    history: Vec<SequenceSample>,
}

impl Observer {
    /// Create an observer with no history.
    pub fn new(registry: InvariantRegistry) -> Self {
        Self { registry, history: Vec::new() }
    }

    /// Record the snapshot's sequences and assert every invariant.
    pub fn observe(&mut self, mut snapshot: ComponentSnapshot, context: &str) {
        self.history.extend(snapshot.sequence_history.drain(..));
        snapshot.sequence_history.clone_from(&self.history);
        self.registry.assert_all(&SystemSnapshot::single(snapshot), context);
    }
}
