//! Entity resolution strategies.
//!
//! A [`Resolve`] implementation tells a [`crate::ResolvingComponent`] which
//! attributes identify its entity, which channel tracks it, and how to fetch
//! it from the [`NostrService`].

use std::{fmt, future::Future};

use nostrframe_core::{
    Attributes, ChannelKey, Entity, Event, EventId, Profile, ProfileId, ServiceError,
    ValidationError,
};

use crate::NostrService;

/// How a component resolves its primary entity.
pub trait Resolve: Send + Sync + 'static {
    /// Parsed identity.
    type Id: fmt::Display + Send + Sync + 'static;

    /// What the service returns.
    type Output: Send + 'static;

    /// Channel tracking the primary entity.
    const CHANNEL: ChannelKey;

    /// Capitalized entity name used in messages, e.g. `Event`.
    const WHAT: &'static str;

    /// Whether `name` is an identity attribute.
    fn observes(name: &str) -> bool;

    /// Read and validate the identity from the attributes.
    fn identity(attributes: &Attributes) -> Result<Self::Id, ValidationError>;

    /// Fetch the entity. `Ok(None)` means not found.
    fn fetch<S: NostrService>(
        service: &S,
        id: &Self::Id,
    ) -> impl Future<Output = Result<Option<Self::Output>, ServiceError>> + Send;

    /// Convert the fetched output into the entity handed to the host.
    fn into_entity(output: Self::Output) -> Entity;

    /// Author to load once the entity resolved, if any.
    fn author(_output: &Self::Output) -> Option<ProfileId> {
        None
    }
}

/// Resolves a single event from `event-id`, then its author.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventResolver;

impl Resolve for EventResolver {
    type Id = EventId;
    type Output = Event;

    const CHANNEL: ChannelKey = ChannelKey::EVENT;
    const WHAT: &'static str = "Event";

    fn observes(name: &str) -> bool {
        name == EventId::ATTRIBUTE
    }

    fn identity(attributes: &Attributes) -> Result<EventId, ValidationError> {
        EventId::from_attributes(attributes)
    }

    fn fetch<S: NostrService>(
        service: &S,
        id: &EventId,
    ) -> impl Future<Output = Result<Option<Event>, ServiceError>> + Send {
        service.get_event(id)
    }

    fn into_entity(output: Event) -> Entity {
        Entity::Event(output)
    }

    fn author(event: &Event) -> Option<ProfileId> {
        ProfileId::parse(&event.pubkey).filter(|id| matches!(id, ProfileId::Hex(_)))
    }
}

/// Resolves profile metadata from `npub`, `nip05` or `pubkey`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileResolver;

impl Resolve for ProfileResolver {
    type Id = ProfileId;
    type Output = Profile;

    const CHANNEL: ChannelKey = ChannelKey::PROFILE;
    const WHAT: &'static str = "Profile";

    fn observes(name: &str) -> bool {
        ProfileId::ATTRIBUTES.contains(&name)
    }

    fn identity(attributes: &Attributes) -> Result<ProfileId, ValidationError> {
        ProfileId::from_attributes(attributes)
    }

    fn fetch<S: NostrService>(
        service: &S,
        id: &ProfileId,
    ) -> impl Future<Output = Result<Option<Profile>, ServiceError>> + Send {
        service.get_profile(id)
    }

    fn into_entity(output: Profile) -> Entity {
        Entity::Profile(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";

    #[test]
    fn observed_attributes() {
        assert!(EventResolver::observes("event-id"));
        assert!(!EventResolver::observes("theme"));
        assert!(ProfileResolver::observes("nip05"));
        assert!(ProfileResolver::observes("pubkey"));
        assert!(!ProfileResolver::observes("event-id"));
    }

    #[test]
    fn event_author_requires_hex_pubkey() {
        let mut event = Event {
            id: HEX.into(),
            pubkey: HEX.into(),
            kind: 1,
            created_at: 0,
            content: String::new(),
            tags: Vec::new(),
        };
        assert_eq!(EventResolver::author(&event), Some(ProfileId::Hex(HEX.into())));

        event.pubkey = "npub1qqqqqqqqqq".into();
        assert_eq!(EventResolver::author(&event), None);
    }
}
