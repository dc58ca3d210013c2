//! Domain entities resolved by components.
//!
//! These are plain data as handed over by the external Nostr client. Nothing
//! here verifies signatures or ids; that belongs to the client.

use serde::{Deserialize, Serialize};

/// A Nostr event (a post, a livestream descriptor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// 32-byte event id, hex encoded.
    pub id: String,
    /// Author public key, hex encoded.
    pub pubkey: String,
    /// Event kind.
    pub kind: u32,
    /// Unix timestamp (seconds).
    pub created_at: u64,
    /// Event content.
    pub content: String,
    /// Event tags.
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
}

/// Profile metadata of a public key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Public key, hex encoded.
    pub pubkey: String,
    /// Short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// NIP-05 identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl Profile {
    /// Best available human-readable name, falling back to the public key.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.pubkey)
    }
}

/// Entity resolved by a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entity {
    /// A resolved event.
    Event(Event),
    /// A resolved profile.
    Profile(Profile),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_display_name_then_name() {
        let mut profile = Profile { pubkey: "ab".repeat(32), ..Default::default() };
        assert_eq!(profile.label(), "ab".repeat(32));

        profile.name = Some("alice".into());
        assert_eq!(profile.label(), "alice");

        profile.display_name = Some(String::new());
        assert_eq!(profile.label(), "alice");

        profile.display_name = Some("Alice".into());
        assert_eq!(profile.label(), "Alice");
    }

    #[test]
    fn entity_is_tagged() {
        let entity = Entity::Profile(Profile { pubkey: "k".into(), ..Default::default() });
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"type":"profile","pubkey":"k"}"#);
    }
}
