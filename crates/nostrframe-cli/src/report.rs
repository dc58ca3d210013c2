//! Mount report and its text rendering.

use std::{collections::BTreeMap, io::Write};

use nostrframe_app::{View, ViewBody};
use nostrframe_core::{Entity, Notification, Profile, Status};
use serde::Serialize;

/// A notification as the page would receive it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchedEvent {
    /// DOM event name.
    pub name: &'static str,
    /// Event `detail` payload.
    pub detail: serde_json::Value,
}

impl DispatchedEvent {
    /// Capture a notification.
    pub fn from_notification(notification: &Notification) -> Self {
        let detail = match notification {
            Notification::Status(status) => serde_json::to_value(status),
            Notification::EntityReady(ready) => serde_json::to_value(ready),
        };
        Self {
            name: notification.event_name(),
            detail: detail.unwrap_or(serde_json::Value::Null),
        }
    }
}

/// State of a mounted element after it settled.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Element tag name.
    pub tag: String,
    /// Overall status.
    pub status: Status,
    /// Reflected attributes.
    pub attributes: BTreeMap<String, String>,
    /// Presentation class, if any.
    pub presentation: Option<&'static str>,
    /// Dispatched notifications, oldest first.
    pub events: Vec<DispatchedEvent>,
    /// Number of renders.
    pub renders: usize,
    /// Last rendered view.
    pub view: Option<View>,
}

impl Report {
    /// Write the report as pretty JSON.
    pub fn write_json(&self, out: &mut impl Write) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out).map_err(serde_json::Error::io)
    }

    /// Write a human-readable summary.
    pub fn write_text(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "<{}> {}", self.tag, self.status)?;
        if let Some(class) = self.presentation {
            writeln!(out, "  class: {class}")?;
        }

        writeln!(out, "attributes:")?;
        for (name, value) in &self.attributes {
            writeln!(out, "  {name}={value}")?;
        }

        writeln!(out, "events:")?;
        for event in &self.events {
            writeln!(out, "  {} {}", event.name, event.detail)?;
        }

        writeln!(out, "renders: {}", self.renders)?;
        match self.view.as_ref().map(|view| &view.body) {
            None => writeln!(out, "view: none"),
            Some(ViewBody::Idle) => writeln!(out, "view: idle"),
            Some(ViewBody::Skeleton) => writeln!(out, "view: skeleton"),
            Some(ViewBody::ErrorPanel { message }) => writeln!(out, "view: error: {message}"),
            Some(ViewBody::Ready { entity, author }) => {
                writeln!(out, "view: ready")?;
                match entity {
                    Some(Entity::Event(event)) => {
                        writeln!(out, "  event {} (kind {})", event.id, event.kind)?;
                        let by = author.as_ref().map_or(event.pubkey.as_str(), Profile::label);
                        writeln!(out, "  by {by}")?;
                        writeln!(out, "  {}", event.content)
                    },
                    Some(Entity::Profile(profile)) => writeln!(out, "  profile {}", profile.label()),
                    None => Ok(()),
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nostrframe_core::EntityReady;

    use super::*;

    fn report(view: Option<View>) -> Report {
        Report {
            tag: "nostr-profile".into(),
            status: Status::Ready,
            attributes: BTreeMap::from([("status".to_string(), "ready".to_string())]),
            presentation: Some("is-clickable"),
            events: Vec::new(),
            renders: 1,
            view,
        }
    }

    #[test]
    fn ready_detail_is_tagged_entity() {
        let profile = Profile { pubkey: "ab".repeat(32), ..Profile::default() };
        let event = DispatchedEvent::from_notification(&Notification::EntityReady(EntityReady {
            entity: Entity::Profile(profile),
        }));

        assert_eq!(event.name, "nc:ready");
        assert_eq!(event.detail["entity"]["type"], "profile");
    }

    #[test]
    fn text_output_without_view() {
        let mut out = Vec::new();
        report(None).write_text(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        insta::assert_snapshot!(text, @r"
        <nostr-profile> ready
          class: is-clickable
        attributes:
          status=ready
        events:
        renders: 1
        view: none
        ");
    }
}
