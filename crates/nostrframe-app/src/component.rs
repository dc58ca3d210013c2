//! Base lifecycle controller.
//!
//! A [`Component`] owns the attribute bag, the status channels, the
//! connection barrier and the connection sequence of one element. It reacts
//! to lifecycle callbacks by validating, (re)connecting and rendering.
//!
//! # Connection
//!
//! The `connection` channel tracks the relay connection. Every connection
//! attempt advances the connect sequence and settles the installed barrier
//! when it completes. A relay change resets both, so pending waiters move on
//! to the new generation and the superseded attempt's result is dropped.
//!
//! # Validation errors
//!
//! Invalid base attributes put the `connection` channel in `Error` with the
//! validation message. Once the attributes are valid again, the channel is
//! restored from the barrier: connected, failed, connecting or idle.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use nostrframe_core::{
    Attributes, Barrier, BarrierError, BarrierState, ChannelAction, ChannelKey, ChannelSet,
    ComponentConfig, Notification, RelayUrl, Sequence, Status, Theme, Ticket,
    error::CONNECTION_FAILED_MESSAGE,
};

use crate::{Content, Element, Host, Lifecycle, NostrService, View};

/// Why the `connection` channel is in `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorOrigin {
    Validation,
    Connect,
}

struct State {
    attributes: Attributes,
    channels: ChannelSet,
    barrier: Barrier,
    theme: Theme,
    content: Content,
    /// Ticket of the connection attempt in flight.
    connecting: Option<Ticket>,
    connection_error: Option<ErrorOrigin>,
}

impl State {
    fn write(
        &mut self,
        key: ChannelKey,
        status: Status,
        message: Option<String>,
        origin: Option<ErrorOrigin>,
    ) -> Vec<ChannelAction> {
        if key == ChannelKey::CONNECTION {
            self.connection_error = if status == Status::Error {
                origin.or(Some(ErrorOrigin::Connect))
            } else {
                None
            };
        }
        self.channels.set(key, status, message)
    }
}

/// Locked view of a component used by [`Component::update`].
pub(crate) struct Update<'a> {
    state: MutexGuard<'a, State>,
    actions: Vec<ChannelAction>,
}

impl Update<'_> {
    /// Status of one channel.
    pub(crate) fn status(&self, key: &ChannelKey) -> Status {
        self.state.channels.get(key)
    }

    /// Write a channel; its actions run once the lock is released.
    pub(crate) fn set(&mut self, key: ChannelKey, status: Status, message: Option<String>) {
        let actions = self.state.write(key, status, message, None);
        self.actions.extend(actions);
    }

    /// Seed a channel without notifying anyone.
    pub(crate) fn seed(&mut self, key: ChannelKey, status: Status) {
        self.state.channels.seed(key, status);
    }

    /// Resolved content.
    pub(crate) fn content(&mut self) -> &mut Content {
        &mut self.state.content
    }
}

struct Inner<S, H> {
    service: S,
    host: H,
    attached: AtomicBool,
    connect_seq: Sequence,
    state: Mutex<State>,
}

/// Base controller shared by every Nostr element.
///
/// Cheap to clone: clones are handles to the same element, which is how
/// spawned tasks reach back into it.
pub struct Component<S, H> {
    inner: Arc<Inner<S, H>>,
}

impl<S, H> Clone for Component<S, H> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S: NostrService, H: Host> Component<S, H> {
    /// Create a detached component with a pending barrier.
    pub fn new(service: S, host: H) -> Self {
        let state = State {
            attributes: Attributes::new(),
            channels: ChannelSet::new(),
            barrier: Barrier::new(),
            theme: Theme::default(),
            content: Content::default(),
            connecting: None,
            connection_error: None,
        };
        let inner = Inner {
            service,
            host,
            attached: AtomicBool::new(false),
            connect_seq: Sequence::new(),
            state: Mutex::new(state),
        };
        let component = Self { inner: Arc::new(inner) };
        component.inner.connect_seq.advance();
        component
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tag name reported by the host.
    pub fn tag(&self) -> &str {
        self.inner.host.tag_name()
    }

    /// Host environment.
    pub fn host(&self) -> &H {
        &self.inner.host
    }

    /// Nostr service.
    pub fn service(&self) -> &S {
        &self.inner.service
    }

    /// Whether the element is in a document.
    pub fn is_attached(&self) -> bool {
        self.inner.attached.load(Ordering::Acquire)
    }

    /// Snapshot of the attributes.
    pub fn attributes(&self) -> Attributes {
        self.lock().attributes.clone()
    }

    /// Snapshot of the status channels.
    pub fn channels(&self) -> ChannelSet {
        self.lock().channels.clone()
    }

    /// Status of one channel.
    pub fn channel_status(&self, key: &ChannelKey) -> Status {
        self.lock().channels.get(key)
    }

    /// Snapshot of the resolved content.
    pub fn content(&self) -> Content {
        self.lock().content.clone()
    }

    /// Last valid theme.
    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    /// Settlement state of the installed barrier.
    pub fn barrier_state(&self) -> BarrierState {
        self.lock().barrier.state().clone()
    }

    /// Generation of the installed barrier.
    pub fn barrier_generation(&self) -> u64 {
        self.lock().barrier.generation()
    }

    /// Live value of the connect sequence.
    pub fn connect_sequence(&self) -> u64 {
        self.inner.connect_seq.current()
    }

    /// Validate theme and relays.
    ///
    /// On failure the `connection` channel carries the validation message.
    /// On success a previous validation error is cleared and the channel is
    /// restored from the barrier. Never starts network work, and repeating
    /// it with unchanged attributes writes nothing.
    pub fn validate(&self) -> bool {
        let result = ComponentConfig::from_attributes(&self.lock().attributes);
        match result {
            Ok(config) => {
                self.lock().theme = config.theme;
                self.restore_connection_status();
                true
            },
            Err(err) => {
                let message = err.to_string();
                if self.write_channel(
                    ChannelKey::CONNECTION,
                    Status::Error,
                    Some(message),
                    Some(ErrorOrigin::Validation),
                ) {
                    tracing::warn!(tag = %self.tag(), error = %err, "invalid attributes");
                }
                false
            },
        }
    }

    fn restore_connection_status(&self) {
        let (status, message, origin) = {
            let state = self.lock();
            if state.connection_error != Some(ErrorOrigin::Validation) {
                return;
            }
            match state.barrier.state() {
                BarrierState::Fulfilled => (Status::Ready, None, None),
                BarrierState::Rejected(_) => (
                    Status::Error,
                    Some(CONNECTION_FAILED_MESSAGE.to_string()),
                    Some(ErrorOrigin::Connect),
                ),
                BarrierState::Pending if state.connecting.is_some() => (Status::Loading, None, None),
                BarrierState::Pending => (Status::Idle, None, None),
            }
        };

        tracing::debug!(tag = %self.tag(), %status, "attributes valid again, restoring connection status");
        self.write_channel(ChannelKey::CONNECTION, status, message, origin);
    }

    /// Start connecting to the configured relays.
    ///
    /// Installs a fresh barrier if the current one already settled, advances
    /// the connect sequence and sets `connection` to `Loading`. Does nothing
    /// if the base attributes are invalid.
    pub fn connect_to_nostr(&self) {
        let (ticket, relays, actions) = {
            let mut state = self.lock();
            let Ok(config) = ComponentConfig::from_attributes(&state.attributes) else {
                return;
            };
            if !state.barrier.is_pending() {
                state.barrier.reset();
            }
            let ticket = self.inner.connect_seq.advance();
            state.connecting = Some(ticket);
            let actions = state.write(ChannelKey::CONNECTION, Status::Loading, None, None);
            (ticket, config.relays, actions)
        };

        tracing::debug!(tag = %self.tag(), %ticket, relays = relays.len(), "connecting");
        self.perform(actions);

        let component = self.clone();
        tokio::spawn(async move { component.finish_connect(ticket, relays).await });
    }

    async fn finish_connect(&self, ticket: Ticket, relays: Vec<RelayUrl>) {
        let result = self.inner.service.connect(&relays).await;

        if let Err(err) = &result {
            let tag = self.tag();
            if err.is_transient() {
                tracing::warn!(tag, %ticket, error = %err, "relay connection failed");
            } else {
                tracing::error!(tag, %ticket, error = %err, "relay connection failed");
            }
        }

        // Sequence check, barrier and channel are settled under one lock so a
        // concurrent reset either supersedes this attempt or waits for it.
        let actions = {
            let mut state = self.lock();
            if !self.inner.connect_seq.is_current(ticket) {
                tracing::debug!(tag = %self.tag(), %ticket, "discarding superseded connection result");
                return;
            }
            if state.connecting == Some(ticket) {
                state.connecting = None;
            }
            if !self.is_attached() {
                tracing::debug!(tag = %self.tag(), %ticket, "detached, discarding connection result");
                return;
            }

            // A validation error owns the channel until it is fixed; the
            // barrier state is picked up by `restore_connection_status`.
            let validation_error = state.connection_error == Some(ErrorOrigin::Validation);
            match result {
                Ok(()) => {
                    state.barrier.resolve();
                    tracing::debug!(tag = %self.tag(), %ticket, "connected");
                    if validation_error {
                        Vec::new()
                    } else {
                        state.write(ChannelKey::CONNECTION, Status::Ready, None, None)
                    }
                },
                Err(_) => {
                    state.barrier.reject(BarrierError::ConnectionFailed);
                    if validation_error {
                        Vec::new()
                    } else {
                        state.write(
                            ChannelKey::CONNECTION,
                            Status::Error,
                            Some(CONNECTION_FAILED_MESSAGE.to_string()),
                            Some(ErrorOrigin::Connect),
                        )
                    }
                },
            }
        };

        self.perform(actions);
    }

    /// Wait until the current barrier generation settles.
    ///
    /// A barrier replaced while waiting is followed to its successor, so the
    /// result always reflects the relay configuration that is current when
    /// the connection settles.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::ConnectionFailed`] if that connection failed.
    pub async fn ensure_connected(&self) -> Result<(), BarrierError> {
        loop {
            let wait = self.lock().barrier.wait();
            let generation = wait.generation();
            match wait.await {
                Err(BarrierError::Superseded) => {
                    tracing::trace!(tag = %self.tag(), generation, "barrier superseded, following");
                },
                outcome => return outcome,
            }
        }
    }

    /// Supersede the in-flight connection attempt and install a fresh
    /// barrier.
    fn reset_connection(&self) {
        let mut state = self.lock();
        state.barrier.reset();
        state.connecting = None;
        let ticket = self.inner.connect_seq.advance();
        tracing::debug!(tag = %self.tag(), %ticket, generation = state.barrier.generation(), "connection reset");
    }

    /// Connect if attached and no usable connection exists or is underway.
    ///
    /// With `retry_failed`, a failed connection is retried as well.
    pub fn reconcile_connection(&self, retry_failed: bool) {
        if !self.is_attached() {
            return;
        }
        let start = {
            let state = self.lock();
            if state.connection_error == Some(ErrorOrigin::Validation) {
                return;
            }
            match state.barrier.state() {
                BarrierState::Pending => state.connecting.is_none(),
                BarrierState::Rejected(_) => retry_failed,
                BarrierState::Fulfilled => false,
            }
        };
        if start {
            self.connect_to_nostr();
        }
    }

    /// Write a channel and perform the resulting actions.
    ///
    /// Returns `true` if the write changed anything.
    pub fn set_channel(&self, key: ChannelKey, status: Status, message: Option<String>) -> bool {
        self.write_channel(key, status, message, None)
    }

    /// Seed a channel without notifying anyone.
    pub fn seed_channel(&self, key: ChannelKey, status: Status) {
        self.lock().channels.seed(key, status);
    }

    fn write_channel(
        &self,
        key: ChannelKey,
        status: Status,
        message: Option<String>,
        origin: Option<ErrorOrigin>,
    ) -> bool {
        let actions = self.lock().write(key, status, message, origin);
        let changed = !actions.is_empty();
        self.perform(actions);
        changed
    }

    /// Run `apply` under the state lock, then perform the channel actions it
    /// produced.
    ///
    /// Stale checks made inside `apply` hold until its writes are applied.
    pub(crate) fn update<T>(&self, apply: impl FnOnce(&mut Update<'_>) -> T) -> T {
        let mut update = Update { state: self.lock(), actions: Vec::new() };
        let output = apply(&mut update);
        let Update { state, actions } = update;
        drop(state);
        self.perform(actions);
        output
    }

    fn perform(&self, actions: Vec<ChannelAction>) {
        let host = &self.inner.host;
        for action in actions {
            match action {
                ChannelAction::ReflectAttribute { name, value } => host.reflect_attribute(&name, value),
                ChannelAction::Present(presentation) => host.set_presentation(presentation),
                ChannelAction::StatusChanged(overall) => {
                    tracing::debug!(tag = %self.tag(), %overall, "status changed");
                    host.on_status_change(overall);
                },
                ChannelAction::Notify(notification) => {
                    host.dispatch(&Notification::Status(notification));
                },
                ChannelAction::Render => self.render(),
            }
        }
    }

    /// Render the current state. Detached components do not render.
    pub fn render(&self) {
        if !self.is_attached() {
            return;
        }
        let view = {
            let state = self.lock();
            View::build(self.tag(), state.theme, &state.channels, &state.content)
        };
        self.inner.host.render(&view);
    }

    /// Mark attached, validate, connect if needed and render.
    ///
    /// Returns whether the base attributes are valid.
    pub fn attach(&self) -> bool {
        self.inner.attached.store(true, Ordering::Release);
        tracing::debug!(tag = %self.tag(), "attached");

        let valid = self.validate();
        if valid {
            self.reconcile_connection(true);
        }
        self.render();
        valid
    }

    /// Mark detached. In-flight results are discarded from now on.
    pub fn detach(&self) {
        self.inner.attached.store(false, Ordering::Release);
        tracing::debug!(tag = %self.tag(), "detached");
    }

    fn relays_changed(&self) {
        self.reset_connection();
        if !self.validate() {
            return;
        }
        if self.is_attached() {
            self.connect_to_nostr();
        } else {
            self.set_channel(ChannelKey::CONNECTION, Status::Idle, None);
        }
    }

    fn theme_changed(&self) {
        if self.validate() {
            self.reconcile_connection(false);
        }
        self.render();
    }
}

impl<S: NostrService, H: Host> Lifecycle for Component<S, H> {
    fn on_attach(&self) {
        self.attach();
    }

    fn on_attribute_change(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        if old == new {
            return;
        }
        tracing::trace!(tag = %self.tag(), name, ?old, ?new, "attribute changed");

        match name {
            Attributes::RELAYS => self.relays_changed(),
            Attributes::THEME => self.theme_changed(),
            _ => {},
        }
    }

    fn on_detach(&self) {
        self.detach();
    }
}

impl<S: NostrService, H: Host> Element for Component<S, H> {
    fn write_attribute(&self, name: &str, value: Option<&str>) -> Option<String> {
        let mut state = self.lock();
        match value {
            Some(value) => state.attributes.set(name, value),
            None => state.attributes.remove(name),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).map(str::to_string)
    }

    fn status(&self) -> Status {
        self.lock().channels.reflected_overall()
    }
}
