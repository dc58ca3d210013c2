//! Scripted Nostr service.
//!
//! [`ScriptedService`] answers requests in one of two ways per request
//! family:
//!
//! - **Immediate**: answered from fixtures on the first poll
//! - **Held**: parked until the test completes it with `complete_*`
//!
//! Held requests let tests choose completion order, which is how stale
//! results and barrier races are reproduced deterministically. A held request
//! that is never completed simulates a hanging relay.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use nostrframe_app::NostrService;
use nostrframe_core::{Event, EventId, Profile, ProfileId, RelayUrl, ServiceError};
use tokio::sync::oneshot;

/// A request received by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `connect`
    Connect(Vec<RelayUrl>),
    /// `get_event`
    Event(EventId),
    /// `get_profile`
    Profile(ProfileId),
}

type ConnectResult = Result<(), ServiceError>;
type EventResult = Result<Option<Event>, ServiceError>;
type ProfileResult = Result<Option<Profile>, ServiceError>;

struct Held<T> {
    key: String,
    reply: oneshot::Sender<T>,
}

struct Script {
    hold_connect: bool,
    hold_fetches: bool,
    connect_result: ConnectResult,
    events: HashMap<String, EventResult>,
    profiles: HashMap<String, ProfileResult>,
    held_connects: Vec<Held<ConnectResult>>,
    held_events: Vec<Held<EventResult>>,
    held_profiles: Vec<Held<ProfileResult>>,
    requests: Vec<Request>,
}

enum Answer<T> {
    Now(T),
    Later(oneshot::Receiver<T>),
}

impl<T> Answer<T> {
    async fn get(self, hung_up: T) -> T {
        match self {
            Self::Now(value) => value,
            Self::Later(receiver) => receiver.await.unwrap_or(hung_up),
        }
    }
}

/// Fixture-backed service with test-controlled completion.
///
/// Clones share the script.
#[derive(Clone)]
pub struct ScriptedService {
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedService {
    /// Service answering everything immediately. Connections succeed,
    /// unknown entities are not found.
    pub fn new() -> Self {
        let script = Script {
            hold_connect: false,
            hold_fetches: false,
            connect_result: Ok(()),
            events: HashMap::new(),
            profiles: HashMap::new(),
            held_connects: Vec::new(),
            held_events: Vec::new(),
            held_profiles: Vec::new(),
            requests: Vec::new(),
        };
        Self { script: Arc::new(Mutex::new(script)) }
    }

    /// Service holding every request until the test completes it.
    pub fn held() -> Self {
        Self::new().hold_connect().hold_fetches()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hold connection attempts.
    #[must_use]
    pub fn hold_connect(self) -> Self {
        self.lock().hold_connect = true;
        self
    }

    /// Hold event and profile fetches.
    #[must_use]
    pub fn hold_fetches(self) -> Self {
        self.lock().hold_fetches = true;
        self
    }

    /// Answer immediate connection attempts with `result`.
    #[must_use]
    pub fn connect_with(self, result: ConnectResult) -> Self {
        self.lock().connect_result = result;
        self
    }

    /// Serve `event` under its id.
    #[must_use]
    pub fn with_event(self, event: Event) -> Self {
        let id = event.id.clone();
        self.lock().events.insert(id, Ok(Some(event)));
        self
    }

    /// Answer fetches of event `id` with `result`.
    #[must_use]
    pub fn with_event_result(self, id: &str, result: EventResult) -> Self {
        self.lock().events.insert(id.to_string(), result);
        self
    }

    /// Serve `profile` under `id`, e.g. its pubkey or NIP-05 identifier.
    #[must_use]
    pub fn with_profile(self, id: &str, profile: Profile) -> Self {
        self.lock().profiles.insert(id.to_string(), Ok(Some(profile)));
        self
    }

    /// Answer fetches of profile `id` with `result`.
    #[must_use]
    pub fn with_profile_result(self, id: &str, result: ProfileResult) -> Self {
        self.lock().profiles.insert(id.to_string(), result);
        self
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Number of connection attempts received.
    pub fn connect_count(&self) -> usize {
        self.lock().requests.iter().filter(|r| matches!(r, Request::Connect(_))).count()
    }

    /// Event ids requested, oldest first.
    pub fn event_requests(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::Event(id) => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Profile ids requested, oldest first.
    pub fn profile_requests(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::Profile(id) => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Number of held requests not completed yet.
    pub fn pending(&self) -> usize {
        let script = self.lock();
        script.held_connects.len() + script.held_events.len() + script.held_profiles.len()
    }

    /// Complete the oldest held connection attempt.
    ///
    /// Returns `false` if none is held.
    pub fn complete_connect(&self, result: ConnectResult) -> bool {
        let held = {
            let mut script = self.lock();
            if script.held_connects.is_empty() {
                return false;
            }
            script.held_connects.remove(0)
        };
        held.reply.send(result).is_ok()
    }

    /// Complete the oldest held fetch of event `id`.
    ///
    /// Returns `false` if none is held.
    pub fn complete_event(&self, id: &str, result: EventResult) -> bool {
        let held = take_held(&mut self.lock().held_events, id);
        held.is_some_and(|held| held.reply.send(result).is_ok())
    }

    /// Complete the oldest held fetch of profile `id`.
    ///
    /// Returns `false` if none is held.
    pub fn complete_profile(&self, id: &str, result: ProfileResult) -> bool {
        let held = take_held(&mut self.lock().held_profiles, id);
        held.is_some_and(|held| held.reply.send(result).is_ok())
    }
}

fn take_held<T>(held: &mut Vec<Held<T>>, key: &str) -> Option<Held<T>> {
    let index = held.iter().position(|h| h.key == key)?;
    Some(held.remove(index))
}

fn park<T>(queue: &mut Vec<Held<T>>, key: String) -> Answer<T> {
    let (reply, receiver) = oneshot::channel();
    queue.push(Held { key, reply });
    Answer::Later(receiver)
}

impl NostrService for ScriptedService {
    fn connect(&self, relays: &[RelayUrl]) -> impl Future<Output = ConnectResult> + Send {
        let answer = {
            let mut script = self.lock();
            script.requests.push(Request::Connect(relays.to_vec()));
            if script.hold_connect {
                park(&mut script.held_connects, String::new())
            } else {
                Answer::Now(script.connect_result.clone())
            }
        };
        answer.get(Err(ServiceError::Timeout))
    }

    fn get_event(&self, id: &EventId) -> impl Future<Output = EventResult> + Send {
        let answer = {
            let mut script = self.lock();
            script.requests.push(Request::Event(id.clone()));
            let key = id.to_string();
            if script.hold_fetches {
                park(&mut script.held_events, key)
            } else {
                Answer::Now(script.events.get(&key).cloned().unwrap_or(Ok(None)))
            }
        };
        answer.get(Err(ServiceError::Timeout))
    }

    fn get_profile(&self, id: &ProfileId) -> impl Future<Output = ProfileResult> + Send {
        let answer = {
            let mut script = self.lock();
            script.requests.push(Request::Profile(id.clone()));
            let key = id.to_string();
            if script.hold_fetches {
                park(&mut script.held_profiles, key)
            } else {
                Answer::Now(script.profiles.get(&key).cloned().unwrap_or(Ok(None)))
            }
        };
        answer.get(Err(ServiceError::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn immediate_answers_come_from_fixtures() {
        let profile = Profile { pubkey: "ab".repeat(32), ..Profile::default() };
        let service = ScriptedService::new().with_profile("alice@example.com", profile.clone());

        let id = ProfileId::Nip05("alice@example.com".into());
        assert_eq!(service.get_profile(&id).await, Ok(Some(profile)));

        let unknown = ProfileId::Nip05("bob@example.com".into());
        assert_eq!(service.get_profile(&unknown).await, Ok(None));
        assert_eq!(service.profile_requests(), ["alice@example.com", "bob@example.com"]);
    }

    #[tokio::test]
    async fn held_requests_complete_on_demand() {
        let service = ScriptedService::held();
        let pending = tokio::spawn({
            let service = service.clone();
            async move { service.connect(&[]).await }
        });
        crate::settle().await;

        assert_eq!(service.pending(), 1);
        assert!(service.complete_connect(Err(ServiceError::Connection("refused".into()))));
        assert!(matches!(pending.await, Ok(Err(ServiceError::Connection(_)))));
        assert!(!service.complete_connect(Ok(())));
    }
}
