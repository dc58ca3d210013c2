//! Headless host.
//!
//! [`TerminalHost`] stands in for the DOM element: reflected attributes and
//! the presentation state are kept as current values, dispatched
//! notifications and rendered views are buffered for the report.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use nostrframe_app::{Host, View};
use nostrframe_core::{Entity, Notification, Presentation, Status};

use crate::report::{DispatchedEvent, Report};

#[derive(Debug, Default)]
struct Output {
    attributes: BTreeMap<String, String>,
    presentation: Option<Presentation>,
    events: Vec<DispatchedEvent>,
    last_view: Option<View>,
    renders: usize,
}

/// Host buffering everything a component writes.
///
/// Clones share the buffer.
#[derive(Debug, Clone)]
pub struct TerminalHost {
    tag: String,
    output: Arc<Mutex<Output>>,
}

impl TerminalHost {
    /// Create a host for an element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), output: Arc::default() }
    }

    fn lock(&self) -> MutexGuard<'_, Output> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build a report from everything buffered so far.
    pub fn report(&self, status: Status) -> Report {
        let output = self.lock();
        Report {
            tag: self.tag.clone(),
            status,
            attributes: output.attributes.clone(),
            presentation: output.presentation.map(Presentation::class_name),
            events: output.events.clone(),
            renders: output.renders,
            view: output.last_view.clone(),
        }
    }
}

impl Host for TerminalHost {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn reflect_attribute(&self, name: &str, value: &str) {
        tracing::trace!(tag = %self.tag, name, value, "reflect");
        self.lock().attributes.insert(name.to_string(), value.to_string());
    }

    fn set_presentation(&self, presentation: Option<Presentation>) {
        self.lock().presentation = presentation;
    }

    fn dispatch(&self, notification: &Notification) {
        let event = DispatchedEvent::from_notification(notification);
        tracing::debug!(tag = %self.tag, event = event.name, "dispatch");
        self.lock().events.push(event);
    }

    fn render(&self, view: &View) {
        let mut output = self.lock();
        output.renders += 1;
        output.last_view = Some(view.clone());
    }

    fn on_entity_ready(&self, entity: &Entity) {
        let kind = match entity {
            Entity::Event(_) => "event",
            Entity::Profile(_) => "profile",
        };
        tracing::info!(tag = %self.tag, kind, "entity ready");
    }
}
