//! Fixture-backed Nostr service.
//!
//! The CLI never talks to relays. Requests are answered from a JSON fixture
//! file:
//!
//! ```json
//! {
//!   "connect_error": null,
//!   "events": [{ "id": "...", "pubkey": "...", "kind": 1, "created_at": 0, "content": "gm" }],
//!   "profiles": { "alice@example.com": { "pubkey": "..." } },
//!   "failing": ["<id whose fetch fails>"]
//! }
//! ```
//!
//! Profiles are keyed by any identity the element may ask with (hex pubkey,
//! npub, NIP-05). A hex lookup without a key also matches on `pubkey`.

use std::{collections::BTreeMap, future::Future, path::Path, sync::Arc};

use nostrframe_app::NostrService;
use nostrframe_core::{Event, EventId, Profile, ProfileId, RelayUrl, ServiceError};
use serde::Deserialize;

use crate::CliError;

/// Contents of a fixture file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixtures {
    /// When set, every connection attempt fails with this cause.
    pub connect_error: Option<String>,
    /// Events served by id.
    pub events: Vec<Event>,
    /// Profiles served by identity.
    pub profiles: BTreeMap<String, Profile>,
    /// Identities whose fetch fails.
    pub failing: Vec<String>,
}

impl Fixtures {
    /// Read fixtures from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| CliError::ReadFixtures { path: path.to_path_buf(), source })?;
        Self::parse(&text)
            .map_err(|source| CliError::ParseFixtures { path: path.to_path_buf(), source })
    }

    /// Parse fixtures from JSON text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn fails(&self, id: &str) -> bool {
        self.failing.iter().any(|failing| failing == id)
    }

    fn event(&self, id: &EventId) -> Result<Option<Event>, ServiceError> {
        let key = id.as_str();
        if self.fails(key) {
            return Err(ServiceError::Fetch(format!("fixture {key} is failing")));
        }
        Ok(self.events.iter().find(|event| event.id == key).cloned())
    }

    fn profile(&self, id: &ProfileId) -> Result<Option<Profile>, ServiceError> {
        let key = id.as_str();
        if self.fails(key) {
            return Err(ServiceError::Fetch(format!("fixture {key} is failing")));
        }
        if let Some(profile) = self.profiles.get(key) {
            return Ok(Some(profile.clone()));
        }
        let by_pubkey = match id {
            ProfileId::Hex(hex) => self.profiles.values().find(|p| &p.pubkey == hex).cloned(),
            _ => None,
        };
        Ok(by_pubkey)
    }
}

/// [`NostrService`] answering every request immediately from [`Fixtures`].
#[derive(Debug, Clone, Default)]
pub struct FixtureService {
    fixtures: Arc<Fixtures>,
}

impl FixtureService {
    /// Create a service over the given fixtures.
    pub fn new(fixtures: Fixtures) -> Self {
        Self { fixtures: Arc::new(fixtures) }
    }
}

impl NostrService for FixtureService {
    fn connect(&self, relays: &[RelayUrl]) -> impl Future<Output = Result<(), ServiceError>> + Send {
        tracing::debug!(relays = relays.len(), "fixture connect");
        let result = match &self.fixtures.connect_error {
            Some(cause) => Err(ServiceError::Connection(cause.clone())),
            None => Ok(()),
        };
        std::future::ready(result)
    }

    fn get_event(
        &self,
        id: &EventId,
    ) -> impl Future<Output = Result<Option<Event>, ServiceError>> + Send {
        tracing::debug!(%id, "fixture event lookup");
        std::future::ready(self.fixtures.event(id))
    }

    fn get_profile(
        &self,
        id: &ProfileId,
    ) -> impl Future<Output = Result<Option<Profile>, ServiceError>> + Send {
        tracing::debug!(%id, "fixture profile lookup");
        std::future::ready(self.fixtures.profile(id))
    }
}
