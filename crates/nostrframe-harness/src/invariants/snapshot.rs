//! Observable state snapshots for invariant checking.
//!
//! Snapshots copy a component's state at one point in time so invariants
//! check a consistent view while spawned tasks keep running.

use std::collections::BTreeMap;

use nostrframe_app::{Component, NostrService, Resolve, ResolvingComponent};
use nostrframe_core::{ChannelSet, Presentation};

use crate::RecordingHost;

/// Stale-guard sequence values at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceSample {
    /// Connect sequence.
    pub connect: u64,
    /// Primary load sequence. Zero for base components.
    pub load: u64,
    /// Author load sequence. Zero for base components.
    pub author: u64,
}

/// Snapshot of one component.
#[derive(Debug, Clone, Default)]
pub struct ComponentSnapshot {
    /// Element tag name.
    pub tag: String,
    /// Status channels, including the reflected overall and surfaced error.
    pub channels: ChannelSet,
    /// Attributes reflected onto the host.
    pub host_attributes: BTreeMap<String, String>,
    /// Presentation state of the host.
    pub presentation: Option<Presentation>,
    /// Sequence values, oldest first. The last entry is the current one.
    pub sequence_history: Vec<SequenceSample>,
}

impl ComponentSnapshot {
    /// Capture a base component.
    pub fn base<S: NostrService>(component: &Component<S, RecordingHost>) -> Self {
        let sample = SequenceSample { connect: component.connect_sequence(), ..Default::default() };
        Self::capture(component, sample)
    }

    /// Capture a resolving component.
    pub fn resolving<R: Resolve, S: NostrService>(
        component: &ResolvingComponent<R, S, RecordingHost>,
    ) -> Self {
        let sample = SequenceSample {
            connect: component.base().connect_sequence(),
            load: component.load_sequence(),
            author: component.author_sequence(),
        };
        Self::capture(component.base(), sample)
    }

    fn capture<S: NostrService>(
        component: &Component<S, RecordingHost>,
        sample: SequenceSample,
    ) -> Self {
        let host = component.host();
        Self {
            tag: component.tag().to_string(),
            channels: component.channels(),
            host_attributes: host.reflected_attributes(),
            presentation: host.presentation(),
            sequence_history: vec![sample],
        }
    }
}

/// Snapshot of every component under test.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-component snapshots.
    pub components: Vec<ComponentSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot of a single component.
    pub fn single(component: ComponentSnapshot) -> Self {
        Self { components: vec![component] }
    }

    /// Add a component snapshot.
    pub fn add_component(&mut self, component: ComponentSnapshot) {
        self.components.push(component);
    }
}
