//! Render model.
//!
//! A [`View`] is everything a host needs to draw a component. The body is
//! chosen purely from the overall status; hosts style it with the theme.

use nostrframe_core::{
    ChannelSet, ChannelSnapshot, Entity, Profile, Status, Theme, channel::UNKNOWN_ERROR,
};
use serde::Serialize;

/// Resolved content of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    /// Primary entity.
    pub entity: Option<Entity>,
    /// Author profile of the primary entity, if it has one and it resolved.
    pub author: Option<Profile>,
}

/// What to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewBody {
    /// Nothing started yet.
    Idle,
    /// Loading placeholder.
    Skeleton,
    /// Error panel with the surfaced message.
    ErrorPanel {
        /// Text shown to the user.
        message: String,
    },
    /// Loaded content.
    Ready {
        /// Primary entity. `None` for components without one.
        entity: Option<Entity>,
        /// Author profile, when resolved.
        author: Option<Profile>,
    },
}

/// Complete render input of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// Element tag name.
    pub tag: String,
    /// Last valid theme.
    pub theme: Theme,
    /// Overall status.
    pub overall: Status,
    /// Status of every channel.
    pub channels: ChannelSnapshot,
    /// Body to draw.
    pub body: ViewBody,
}

impl View {
    pub(crate) fn build(tag: &str, theme: Theme, channels: &ChannelSet, content: &Content) -> Self {
        let overall = channels.overall();
        let body = match overall {
            Status::Idle => ViewBody::Idle,
            Status::Loading => ViewBody::Skeleton,
            Status::Error => ViewBody::ErrorPanel {
                message: channels.error_message().unwrap_or(UNKNOWN_ERROR).to_string(),
            },
            Status::Ready => {
                ViewBody::Ready { entity: content.entity.clone(), author: content.author.clone() }
            },
        };

        Self { tag: tag.to_string(), theme, overall, channels: channels.snapshot(), body }
    }
}

#[cfg(test)]
mod tests {
    use nostrframe_core::ChannelKey;

    use super::*;

    #[test]
    fn body_follows_overall_status() {
        let mut channels = ChannelSet::new();
        let content = Content::default();

        let view = View::build("nostr-post", Theme::Dark, &channels, &content);
        assert_eq!(view.body, ViewBody::Idle);
        assert_eq!(view.theme, Theme::Dark);

        let _ = channels.set(ChannelKey::CONNECTION, Status::Loading, None);
        assert_eq!(View::build("nostr-post", Theme::Light, &channels, &content).body, ViewBody::Skeleton);

        let _ = channels.set(ChannelKey::CONNECTION, Status::Ready, None);
        assert_eq!(
            View::build("nostr-post", Theme::Light, &channels, &content).body,
            ViewBody::Ready { entity: None, author: None }
        );
    }

    #[test]
    fn error_panel_shows_surfaced_message() {
        let mut channels = ChannelSet::new();
        let _ = channels.set(ChannelKey::CONNECTION, Status::Ready, None);
        let _ = channels.set(ChannelKey::EVENT, Status::Error, Some("Event not found".into()));

        let view = View::build("nostr-post", Theme::Light, &channels, &Content::default());
        assert_eq!(view.body, ViewBody::ErrorPanel { message: "Event not found".into() });
        assert_eq!(view.channels.len(), 2);
    }
}
