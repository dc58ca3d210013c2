//! Notifications dispatched to the embedding page.
//!
//! Both notifications bubble and cross shadow boundaries. Their serialized
//! form is the `detail` payload of the corresponding DOM event.

use serde::{Deserialize, Serialize};

use crate::{
    channel::{ChannelKey, ChannelSnapshot},
    entity::Entity,
    status::Status,
};

/// A channel was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNotification {
    /// Channel that was written.
    pub key: ChannelKey,
    /// New status of that channel.
    pub status: Status,
    /// Status of every channel after the write.
    pub channels: ChannelSnapshot,
    /// Overall status after the write.
    pub overall: Status,
    /// Surfaced error text, if any channel is in `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// The primary entity of a component resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReady {
    /// The resolved entity.
    pub entity: Entity,
}

/// Notification dispatched from a component to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// See [`StatusNotification`].
    Status(StatusNotification),
    /// See [`EntityReady`].
    EntityReady(EntityReady),
}

impl Notification {
    /// Name of the status change event.
    pub const STATUS_EVENT: &'static str = "nc:status";
    /// Name of the entity ready event.
    pub const READY_EVENT: &'static str = "nc:ready";

    /// DOM event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Status(_) => Self::STATUS_EVENT,
            Self::EntityReady(_) => Self::READY_EVENT,
        }
    }

    /// Whether the event bubbles.
    pub fn bubbles(&self) -> bool {
        true
    }

    /// Whether the event crosses shadow boundaries.
    pub fn composed(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_detail_uses_camel_case_and_lowercase_statuses() {
        let detail = StatusNotification {
            key: ChannelKey::EVENT,
            status: Status::Error,
            channels: [(ChannelKey::CONNECTION, Status::Ready), (ChannelKey::EVENT, Status::Error)]
                .into_iter()
                .collect(),
            overall: Status::Error,
            error_message: Some("Event not found".into()),
        };

        let json = serde_json::to_string(&detail).unwrap();
        assert_eq!(
            json,
            r#"{"key":"event","status":"error","channels":{"connection":"ready","event":"error"},"overall":"error","errorMessage":"Event not found"}"#
        );
    }

    #[test]
    fn missing_error_message_is_omitted() {
        let detail = StatusNotification {
            key: ChannelKey::CONNECTION,
            status: Status::Ready,
            channels: [(ChannelKey::CONNECTION, Status::Ready)].into_iter().collect(),
            overall: Status::Ready,
            error_message: None,
        };

        let json = serde_json::to_string(&detail).unwrap();
        assert!(!json.contains("errorMessage"));
    }
}
