//! Entity-resolving controller.
//!
//! A [`ResolvingComponent`] extends the base [`Component`] with one primary
//! entity, identified by attributes and fetched once the relay connection is
//! established. The entity channel is seeded `Loading` at construction so
//! the connection becoming ready alone never makes the element look ready.
//!
//! Loads and author follow-ups are separate stale-guard families: a new
//! identity supersedes both, an author result never touches the entity.

use std::{
    marker::PhantomData,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use nostrframe_core::{
    Attributes, ChannelKey, EntityReady, LoadError, Notification, ProfileId, Sequence, Status,
    Ticket,
};

use crate::{
    Component, Content, Element, EventResolver, Host, Lifecycle, NostrService, ProfileResolver,
    Resolve, component::Update,
};

/// Element resolving a single event.
pub type EventComponent<S, H> = ResolvingComponent<EventResolver, S, H>;

/// Element resolving a profile.
pub type ProfileComponent<S, H> = ResolvingComponent<ProfileResolver, S, H>;

struct Inner {
    load_seq: Sequence,
    author_seq: Sequence,
    /// The entity channel carries an identity validation error.
    identity_error: AtomicBool,
    /// The identity or relays changed while no load could start.
    needs_load: AtomicBool,
    /// Author whose result arrived while detached.
    dropped_author: Mutex<Option<ProfileId>>,
}

/// Controller that resolves a primary entity on top of [`Component`].
pub struct ResolvingComponent<R, S, H> {
    base: Component<S, H>,
    inner: Arc<Inner>,
    _resolver: PhantomData<fn() -> R>,
}

impl<R, S, H> Clone for ResolvingComponent<R, S, H> {
    fn clone(&self) -> Self {
        Self { base: self.base.clone(), inner: Arc::clone(&self.inner), _resolver: PhantomData }
    }
}

impl<R: Resolve, S: NostrService, H: Host> ResolvingComponent<R, S, H> {
    /// Create a detached component with its entity channel seeded `Loading`.
    pub fn new(service: S, host: H) -> Self {
        let base = Component::new(service, host);
        base.seed_channel(R::CHANNEL, Status::Loading);

        let inner = Inner {
            load_seq: Sequence::new(),
            author_seq: Sequence::new(),
            identity_error: AtomicBool::new(false),
            needs_load: AtomicBool::new(false),
            dropped_author: Mutex::new(None),
        };
        Self { base, inner: Arc::new(inner), _resolver: PhantomData }
    }

    /// Base controller.
    pub fn base(&self) -> &Component<S, H> {
        &self.base
    }

    /// Live value of the load sequence.
    pub fn load_sequence(&self) -> u64 {
        self.inner.load_seq.current()
    }

    /// Live value of the author sequence.
    pub fn author_sequence(&self) -> u64 {
        self.inner.author_seq.current()
    }

    /// Validate base attributes, then the identity.
    ///
    /// Both are checked even if the first fails, so every invalid attribute
    /// is reported on its own channel.
    pub fn validate(&self) -> bool {
        let base = self.base.validate();
        let identity = self.validate_identity();
        base && identity
    }

    fn validate_identity(&self) -> bool {
        match R::identity(&self.base.attributes()) {
            Ok(_) => {
                if self.inner.identity_error.swap(false, Ordering::AcqRel) {
                    self.base.set_channel(R::CHANNEL, Status::Loading, None);
                }
                true
            },
            Err(err) => {
                self.inner.identity_error.store(true, Ordering::Release);
                if self.base.set_channel(R::CHANNEL, Status::Error, Some(err.to_string())) {
                    tracing::warn!(tag = %self.base.tag(), error = %err, "invalid identity");
                }
                false
            },
        }
    }

    /// Start loading the entity named by the current attributes.
    ///
    /// Supersedes any in-flight load and author follow-up. The fetch waits
    /// for the connection barrier first.
    pub fn load(&self) {
        let Ok(id) = R::identity(&self.base.attributes()) else {
            return;
        };

        self.inner.needs_load.store(false, Ordering::Release);
        let ticket = self.base.update(|update| {
            let ticket = self.inner.load_seq.advance();
            update.set(R::CHANNEL, Status::Loading, None);
            self.supersede_author(update);
            *update.content() = Content::default();
            ticket
        });
        tracing::debug!(tag = %self.base.tag(), %ticket, %id, "loading {}", R::WHAT);

        let component = self.clone();
        tokio::spawn(async move { component.run_load(ticket, id).await });
    }

    /// Invalidate the author follow-up. An unsettled author channel goes
    /// back to `Idle`, since nothing will write it again. Callers put the
    /// entity channel in `Loading` first so the overall never passes `Ready`.
    fn supersede_author(&self, update: &mut Update<'_>) {
        self.inner.author_seq.advance();
        *self.dropped_author() = None;
        if matches!(update.status(&ChannelKey::AUTHOR), Status::Loading | Status::Error) {
            update.set(ChannelKey::AUTHOR, Status::Idle, None);
        }
    }

    fn dropped_author(&self) -> MutexGuard<'_, Option<ProfileId>> {
        self.inner.dropped_author.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_load(&self, ticket: Ticket, id: R::Id) {
        if let Err(err) = self.base.ensure_connected().await {
            tracing::debug!(tag = %self.base.tag(), %ticket, error = %err, "no connection, load abandoned");
            return;
        }
        if !self.inner.load_seq.is_current(ticket) {
            tracing::debug!(
                tag = %self.base.tag(),
                %ticket,
                current = self.inner.load_seq.current(),
                "load superseded before fetch"
            );
            return;
        }

        let result = R::fetch(self.base.service(), &id).await;

        let ready = self.base.update(|update| {
            if !self.inner.load_seq.is_current(ticket) {
                tracing::debug!(
                    tag = %self.base.tag(),
                    %ticket,
                    current = self.inner.load_seq.current(),
                    "discarding superseded load result"
                );
                return None;
            }
            if !self.base.is_attached() {
                tracing::debug!(tag = %self.base.tag(), %ticket, "detached, discarding load result");
                return None;
            }

            match result {
                Ok(Some(output)) => {
                    let author = R::author(&output);
                    let entity = R::into_entity(output);
                    update.content().entity = Some(entity.clone());
                    update.content().author = None;

                    // Seeded without notifying, so the aggregate goes straight
                    // from Loading to Ready once the author arrives.
                    if author.is_some() {
                        update.seed(ChannelKey::AUTHOR, Status::Loading);
                    }

                    tracing::debug!(tag = %self.base.tag(), %ticket, "{} resolved", R::WHAT);
                    update.set(R::CHANNEL, Status::Ready, None);
                    Some((entity, author))
                },
                Ok(None) => {
                    let err = LoadError::NotFound { what: R::WHAT };
                    tracing::info!(tag = %self.base.tag(), %ticket, %id, "{err}");
                    update.set(R::CHANNEL, Status::Error, Some(err.user_message()));
                    None
                },
                Err(source) => {
                    let tag = self.base.tag();
                    if source.is_transient() {
                        tracing::warn!(tag, %ticket, %id, error = %source, "load failed");
                    } else {
                        tracing::error!(tag, %ticket, %id, error = %source, "load failed");
                    }
                    let err = LoadError::Failed { what: R::WHAT, source };
                    update.set(R::CHANNEL, Status::Error, Some(err.user_message()));
                    None
                },
            }
        });

        if let Some((entity, author)) = ready {
            let host = self.base.host();
            host.on_entity_ready(&entity);
            host.dispatch(&Notification::EntityReady(EntityReady { entity }));

            if let Some(author) = author {
                self.load_author(author);
            }
        }
    }

    fn load_author(&self, id: ProfileId) {
        let ticket = self.inner.author_seq.advance();
        tracing::debug!(tag = %self.base.tag(), %ticket, %id, "loading author");

        let component = self.clone();
        tokio::spawn(async move { component.run_author(ticket, id).await });
    }

    async fn run_author(&self, ticket: Ticket, id: ProfileId) {
        let result = self.base.service().get_profile(&id).await;

        self.base.update(|update| {
            if !self.inner.author_seq.is_current(ticket) {
                tracing::debug!(
                    tag = %self.base.tag(),
                    %ticket,
                    current = self.inner.author_seq.current(),
                    "discarding superseded author result"
                );
                return;
            }
            if !self.base.is_attached() {
                tracing::debug!(tag = %self.base.tag(), %ticket, "detached, discarding author result");
                *self.dropped_author() = Some(id);
                return;
            }

            match result {
                Ok(profile) => {
                    if profile.is_none() {
                        tracing::debug!(tag = %self.base.tag(), %id, "author has no profile");
                    }
                    update.content().author = profile;
                    update.set(ChannelKey::AUTHOR, Status::Ready, None);
                },
                Err(source) => {
                    let err = LoadError::Failed { what: "Author", source };
                    tracing::warn!(tag = %self.base.tag(), %id, error = %err, "author load failed");
                    update.set(ChannelKey::AUTHOR, Status::Error, Some(err.user_message()));
                },
            }
        });
    }

    fn identity_changed(&self) {
        self.inner.needs_load.store(true, Ordering::Release);
        self.base.update(|update| {
            self.inner.load_seq.advance();
            update.set(R::CHANNEL, Status::Loading, None);
            self.supersede_author(update);
            *update.content() = Content::default();
        });

        let base_valid = self.base.validate();
        let identity_valid = self.validate_identity();
        if !(base_valid && identity_valid) {
            return;
        }

        if self.base.is_attached() {
            self.load();
        }
    }
}

impl<R: Resolve, S: NostrService, H: Host> Lifecycle for ResolvingComponent<R, S, H> {
    fn on_attach(&self) {
        let base_valid = self.base.attach();
        let identity_valid = self.validate_identity();
        if !(base_valid && identity_valid) {
            return;
        }

        if self.inner.needs_load.load(Ordering::Acquire)
            || self.base.channel_status(&R::CHANNEL) != Status::Ready
        {
            self.load();
            return;
        }

        let dropped = self.dropped_author().take();
        if let Some(author) = dropped {
            tracing::debug!(tag = %self.base.tag(), %author, "restarting author load");
            self.load_author(author);
        }
    }

    fn on_attribute_change(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        if old == new {
            return;
        }
        if R::observes(name) {
            tracing::trace!(tag = %self.base.tag(), name, ?old, ?new, "identity changed");
            self.identity_changed();
            return;
        }

        // Entities from the old relay set are stale; reload now or on attach.
        if name == Attributes::RELAYS {
            self.inner.needs_load.store(true, Ordering::Release);
        }

        self.base.on_attribute_change(name, old, new);

        let needs_load = self.inner.needs_load.load(Ordering::Acquire);
        if needs_load && self.base.is_attached() && self.validate() {
            self.load();
        }
    }

    fn on_detach(&self) {
        self.base.detach();
    }
}

impl<R: Resolve, S: NostrService, H: Host> Element for ResolvingComponent<R, S, H> {
    fn write_attribute(&self, name: &str, value: Option<&str>) -> Option<String> {
        self.base.write_attribute(name, value)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.base.attribute(name)
    }

    fn status(&self) -> Status {
        self.base.status()
    }
}
