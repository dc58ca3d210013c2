//! Recording host.
//!
//! [`RecordingHost`] implements [`Host`] by appending every call to a shared
//! log. Clones share the log, so a test keeps one handle while the component
//! owns another.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use nostrframe_app::{Host, View};
use nostrframe_core::{Entity, Notification, Presentation, Status, StatusNotification};

/// One call made by a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `reflect_attribute`
    Reflect {
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// `set_presentation`
    Present(Option<Presentation>),
    /// `dispatch`
    Dispatch(Notification),
    /// `render`
    Render(View),
    /// `on_status_change`
    StatusChanged(Status),
    /// `on_entity_ready`
    EntityReady(Entity),
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<HostCall>,
    attributes: BTreeMap<String, String>,
    presentation: Option<Presentation>,
}

/// Host that records everything.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    tag: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingHost {
    /// Create a host for an element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), recorded: Arc::default() }
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().calls.clone()
    }

    /// Drain the call log. Reflected attributes and presentation are kept.
    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Current value of a reflected attribute.
    pub fn reflected(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).cloned()
    }

    /// All reflected attributes.
    pub fn reflected_attributes(&self) -> BTreeMap<String, String> {
        self.lock().attributes.clone()
    }

    /// Current presentation state.
    pub fn presentation(&self) -> Option<Presentation> {
        self.lock().presentation
    }

    /// Dispatched notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Dispatch(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Dispatched status notifications.
    pub fn status_notifications(&self) -> Vec<StatusNotification> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Status(status) => Some(status),
                Notification::EntityReady(_) => None,
            })
            .collect()
    }

    /// Entities carried by dispatched ready notifications.
    pub fn ready_entities(&self) -> Vec<Entity> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::EntityReady(ready) => Some(ready.entity),
                Notification::Status(_) => None,
            })
            .collect()
    }

    /// Overall statuses passed to `on_status_change`.
    pub fn status_changes(&self) -> Vec<Status> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                HostCall::StatusChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Rendered views.
    pub fn renders(&self) -> Vec<View> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Render(view) => Some(view.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent render.
    pub fn last_view(&self) -> Option<View> {
        self.lock().calls.iter().rev().find_map(|call| match call {
            HostCall::Render(view) => Some(view.clone()),
            _ => None,
        })
    }

    fn record(&self, call: HostCall) {
        tracing::trace!(tag = %self.tag, ?call, "host call");
        self.lock().calls.push(call);
    }
}

impl Host for RecordingHost {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn reflect_attribute(&self, name: &str, value: &str) {
        self.lock().attributes.insert(name.to_string(), value.to_string());
        self.record(HostCall::Reflect { name: name.to_string(), value: value.to_string() });
    }

    fn set_presentation(&self, presentation: Option<Presentation>) {
        self.lock().presentation = presentation;
        self.record(HostCall::Present(presentation));
    }

    fn dispatch(&self, notification: &Notification) {
        self.record(HostCall::Dispatch(notification.clone()));
    }

    fn render(&self, view: &View) {
        self.record(HostCall::Render(view.clone()));
    }

    fn on_status_change(&self, overall: Status) {
        self.record(HostCall::StatusChanged(overall));
    }

    fn on_entity_ready(&self, entity: &Entity) {
        self.record(HostCall::EntityReady(entity.clone()));
    }
}
