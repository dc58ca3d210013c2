//! Named status channels.
//!
//! A [`ChannelSet`] owns every channel of one component instance. Writes go
//! through [`ChannelSet::set`], which keeps three things consistent:
//!
//! - the channel's own status and error message
//! - the surfaced error text shown by the component
//! - the last overall status reflected to the host
//!
//! and returns the [`ChannelAction`]s the caller must perform on the host.
//! The set itself never touches the host.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    notification::StatusNotification,
    status::{Presentation, Status, aggregate},
};

/// Message used when a channel enters `Error` without any text.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Identifier of a status channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(Cow<'static, str>);

impl ChannelKey {
    /// Relay connection.
    pub const CONNECTION: Self = Self(Cow::Borrowed("connection"));
    /// Primary event entity.
    pub const EVENT: Self = Self(Cow::Borrowed("event"));
    /// Author profile of the primary event.
    pub const AUTHOR: Self = Self(Cow::Borrowed("author"));
    /// Primary profile entity.
    pub const PROFILE: Self = Self(Cow::Borrowed("profile"));

    /// Create a key from a static name.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a key from an owned name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Key name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the attribute this channel is reflected to.
    pub fn attribute_name(&self) -> String {
        format!("{}-status", self.0)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of every channel, keyed by channel.
pub type ChannelSnapshot = BTreeMap<ChannelKey, Status>;

/// A single readiness slot.
///
/// `error_message` is `Some` if and only if `status` is [`Status::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusChannel {
    status: Status,
    error_message: Option<String>,
}

impl StatusChannel {
    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Error text. `None` unless the channel is in `Error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Side effects produced by a channel write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAction {
    /// Set an attribute on the host element.
    ReflectAttribute {
        /// Attribute name.
        name: String,
        /// Lowercase status name.
        value: &'static str,
    },

    /// Switch the host's presentation state. `None` clears all of them.
    Present(Option<Presentation>),

    /// Overall status changed. Fired once per genuine transition.
    StatusChanged(Status),

    /// Dispatch a status notification.
    Notify(StatusNotification),

    /// Re-render the component.
    Render,
}

/// All channels of one component instance.
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    channels: BTreeMap<ChannelKey, StatusChannel>,
    /// Overall status as last reflected to the host.
    reflected: Status,
    /// Error text currently surfaced by the component.
    error_message: Option<String>,
}

impl ChannelSet {
    /// Create an empty set. Every channel reads as `Idle` until written.
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of a channel. `Idle` if never written.
    pub fn get(&self, key: &ChannelKey) -> Status {
        self.channels.get(key).map_or(Status::Idle, StatusChannel::status)
    }

    /// Channel state. `None` if never written.
    pub fn channel(&self, key: &ChannelKey) -> Option<&StatusChannel> {
        self.channels.get(key)
    }

    /// Iterate over written channels in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChannelKey, &StatusChannel)> {
        self.channels.iter()
    }

    /// Overall status derived from the current channels.
    pub fn overall(&self) -> Status {
        aggregate(self.channels.values().map(StatusChannel::status))
    }

    /// Overall status as last reflected to the host.
    ///
    /// Differs from [`Self::overall`] only after [`Self::seed`].
    pub fn reflected_overall(&self) -> Status {
        self.reflected
    }

    /// Error text currently surfaced. `None` if no channel is in `Error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Status of every channel.
    pub fn snapshot(&self) -> ChannelSnapshot {
        self.channels.iter().map(|(key, channel)| (key.clone(), channel.status)).collect()
    }

    /// Force a channel to a status without producing any action.
    ///
    /// Used to mark a channel `Loading` before its work starts, so that a
    /// sibling channel reaching `Ready` first does not produce a transient
    /// overall `Ready`. Seeding `Error` stores [`UNKNOWN_ERROR`].
    pub fn seed(&mut self, key: ChannelKey, status: Status) {
        let error_message = (status == Status::Error).then(|| UNKNOWN_ERROR.to_string());
        let was_error = self.get(&key) == Status::Error;
        self.channels.insert(key, StatusChannel { status, error_message: error_message.clone() });
        self.update_surfaced_error(error_message, was_error);
    }

    /// Write a channel and return the actions the host must perform.
    ///
    /// Returns no actions when the status is unchanged and no new error text
    /// is supplied. Otherwise the actions are, in order: reflect the channel
    /// attribute; if the overall status changed, reflect it, switch
    /// presentation and fire [`ChannelAction::StatusChanged`]; notify;
    /// render.
    pub fn set(
        &mut self,
        key: ChannelKey,
        status: Status,
        message: Option<String>,
    ) -> Vec<ChannelAction> {
        let message = message.filter(|m| !m.is_empty());
        let previous = self.channels.get(&key).cloned().unwrap_or_default();

        if previous.status == status {
            let same_text = match &message {
                None => true,
                Some(text) => previous.error_message.as_deref() == Some(text.as_str()),
            };
            if status != Status::Error || same_text {
                return Vec::new();
            }
        }

        let error_message = match status {
            Status::Error => Some(
                message
                    .or(previous.error_message)
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            ),
            _ => None,
        };

        let channel = StatusChannel { status, error_message: error_message.clone() };
        self.channels.insert(key.clone(), channel);
        self.update_surfaced_error(error_message, previous.status == Status::Error);

        let mut actions = vec![ChannelAction::ReflectAttribute {
            name: key.attribute_name(),
            value: status.as_str(),
        }];

        let overall = self.overall();
        if overall != self.reflected {
            self.reflected = overall;
            actions.push(ChannelAction::ReflectAttribute {
                name: "status".to_string(),
                value: overall.as_str(),
            });
            actions.push(ChannelAction::Present(Presentation::for_status(overall)));
            actions.push(ChannelAction::StatusChanged(overall));
        }

        actions.push(ChannelAction::Notify(StatusNotification {
            key,
            status,
            channels: self.snapshot(),
            overall,
            error_message: self.error_message.clone(),
        }));
        actions.push(ChannelAction::Render);

        actions
    }

    fn update_surfaced_error(&mut self, written: Option<String>, was_error: bool) {
        if written.is_some() {
            self.error_message = written;
        } else if was_error {
            // Another failing channel keeps the component in error; surface its text.
            self.error_message = self
                .channels
                .values()
                .find(|channel| channel.status == Status::Error)
                .and_then(|channel| channel.error_message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifications(actions: &[ChannelAction]) -> Vec<&StatusNotification> {
        actions
            .iter()
            .filter_map(|a| match a {
                ChannelAction::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn status_changes(actions: &[ChannelAction]) -> Vec<Status> {
        actions
            .iter()
            .filter_map(|a| match a {
                ChannelAction::StatusChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_write_reflects_channel_and_overall() {
        let mut set = ChannelSet::new();
        let actions = set.set(ChannelKey::CONNECTION, Status::Loading, None);

        assert_eq!(actions, vec![
            ChannelAction::ReflectAttribute {
                name: "connection-status".to_string(),
                value: "loading"
            },
            ChannelAction::ReflectAttribute { name: "status".to_string(), value: "loading" },
            ChannelAction::Present(Some(Presentation::Disabled)),
            ChannelAction::StatusChanged(Status::Loading),
            ChannelAction::Notify(StatusNotification {
                key: ChannelKey::CONNECTION,
                status: Status::Loading,
                channels: [(ChannelKey::CONNECTION, Status::Loading)].into_iter().collect(),
                overall: Status::Loading,
                error_message: None,
            }),
            ChannelAction::Render,
        ]);
    }

    #[test]
    fn repeated_write_is_noop() {
        let mut set = ChannelSet::new();
        let _ = set.set(ChannelKey::CONNECTION, Status::Ready, None);
        assert!(set.set(ChannelKey::CONNECTION, Status::Ready, None).is_empty());
    }

    #[test]
    fn idle_write_to_unknown_channel_is_noop() {
        let mut set = ChannelSet::new();
        assert!(set.set(ChannelKey::EVENT, Status::Idle, None).is_empty());
        assert!(set.channel(&ChannelKey::EVENT).is_none());
    }

    #[test]
    fn same_error_text_is_noop_new_text_is_not() {
        let mut set = ChannelSet::new();
        let _ = set.set(ChannelKey::CONNECTION, Status::Error, Some("bad theme".into()));

        assert!(set.set(ChannelKey::CONNECTION, Status::Error, Some("bad theme".into())).is_empty());
        assert!(set.set(ChannelKey::CONNECTION, Status::Error, None).is_empty());

        let actions = set.set(ChannelKey::CONNECTION, Status::Error, Some("bad relays".into()));
        assert_eq!(notifications(&actions).len(), 1);
        assert_eq!(set.error_message(), Some("bad relays"));
        // Overall already Error: no second transition.
        assert!(status_changes(&actions).is_empty());
    }

    #[test]
    fn error_without_text_gets_generic_message() {
        let mut set = ChannelSet::new();
        let _ = set.set(ChannelKey::EVENT, Status::Error, Some(String::new()));
        assert_eq!(set.channel(&ChannelKey::EVENT).and_then(StatusChannel::error_message), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn leaving_error_drops_message() {
        let mut set = ChannelSet::new();
        let _ = set.set(ChannelKey::EVENT, Status::Error, Some("not found".into()));
        let _ = set.set(ChannelKey::EVENT, Status::Loading, Some("ignored".into()));

        assert_eq!(set.channel(&ChannelKey::EVENT).and_then(StatusChannel::error_message), None);
        assert_eq!(set.error_message(), None);
    }

    #[test]
    fn surfaced_error_survives_while_another_channel_fails() {
        let mut set = ChannelSet::new();
        let _ = set.set(ChannelKey::CONNECTION, Status::Error, Some("connection failed".into()));
        let _ = set.set(ChannelKey::EVENT, Status::Error, Some("event not found".into()));
        assert_eq!(set.error_message(), Some("event not found"));

        let _ = set.set(ChannelKey::EVENT, Status::Ready, None);
        assert_eq!(set.error_message(), Some("connection failed"));

        let _ = set.set(ChannelKey::CONNECTION, Status::Ready, None);
        assert_eq!(set.error_message(), None);
    }

    #[test]
    fn status_changed_fires_once_per_transition() {
        let mut set = ChannelSet::new();
        let mut changes = Vec::new();

        changes.extend(status_changes(&set.set(ChannelKey::CONNECTION, Status::Loading, None)));
        changes.extend(status_changes(&set.set(ChannelKey::EVENT, Status::Loading, None)));
        changes.extend(status_changes(&set.set(ChannelKey::CONNECTION, Status::Ready, None)));
        changes.extend(status_changes(&set.set(ChannelKey::EVENT, Status::Ready, None)));

        assert_eq!(changes, vec![Status::Loading, Status::Ready]);
    }

    #[test]
    fn seeded_channel_holds_back_ready() {
        let mut set = ChannelSet::new();
        set.seed(ChannelKey::EVENT, Status::Loading);
        assert_eq!(set.reflected_overall(), Status::Idle);

        let _ = set.set(ChannelKey::CONNECTION, Status::Loading, None);
        let actions = set.set(ChannelKey::CONNECTION, Status::Ready, None);

        assert!(status_changes(&actions).is_empty(), "no premature ready");
        assert_eq!(set.overall(), Status::Loading);

        let actions = set.set(ChannelKey::EVENT, Status::Ready, None);
        assert_eq!(status_changes(&actions), vec![Status::Ready]);
    }

    #[test]
    fn notification_always_fires_on_write() {
        let mut set = ChannelSet::new();
        let _ = set.set(ChannelKey::CONNECTION, Status::Loading, None);
        let actions = set.set(ChannelKey::EVENT, Status::Loading, None);

        let notes = notifications(&actions);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].key, ChannelKey::EVENT);
        assert_eq!(notes[0].channels.len(), 2);
        assert!(status_changes(&actions).is_empty());
    }
}
