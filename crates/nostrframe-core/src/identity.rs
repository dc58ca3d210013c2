//! Identity attribute parsing.
//!
//! Components identify what they resolve with an event id or a profile id.
//! Only the shape is checked here: hex of the right length, or a recognized
//! bech32 prefix with a well-formed data part. Decoding and checksum
//! verification belong to the external Nostr client.

use std::fmt;

use crate::{config::Attributes, error::ValidationError};

const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Longest bech32 string accepted.
const BECH32_MAX_LEN: usize = 1023;

/// A bech32 data part is at least its 6-character checksum.
const BECH32_MIN_DATA: usize = 6;

fn is_hex_key(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_bech32(value: &str, prefix: &str) -> bool {
    let Some(data) = value.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('1')) else {
        return false;
    };
    value.len() <= BECH32_MAX_LEN
        && data.len() >= BECH32_MIN_DATA
        && data.chars().all(|c| BECH32_CHARSET.contains(c))
}

fn is_nip05(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'));
    local_ok && domain_ok
}

/// Identifier of a single event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventId {
    /// 64-character hex id.
    Hex(String),
    /// `note1...`
    Note(String),
    /// `nevent1...`
    Nevent(String),
    /// `naddr1...` (addressable event)
    Naddr(String),
}

impl EventId {
    /// Identity attribute of event components.
    pub const ATTRIBUTE: &'static str = "event-id";

    /// Parse an event id in any accepted encoding.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if is_hex_key(value) {
            Some(Self::Hex(value.to_ascii_lowercase()))
        } else if is_bech32(value, "note") {
            Some(Self::Note(value.to_string()))
        } else if is_bech32(value, "nevent") {
            Some(Self::Nevent(value.to_string()))
        } else if is_bech32(value, "naddr") {
            Some(Self::Naddr(value.to_string()))
        } else {
            None
        }
    }

    /// Read and validate the identity attribute.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, ValidationError> {
        let value = attributes
            .get(Self::ATTRIBUTE)
            .ok_or(ValidationError::MissingIdentity { attributes: &[Self::ATTRIBUTE] })?;

        Self::parse(value).ok_or_else(|| ValidationError::InvalidIdentity {
            attribute: Self::ATTRIBUTE,
            value: value.to_string(),
        })
    }

    /// Encoded id.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hex(s) | Self::Note(s) | Self::Nevent(s) | Self::Naddr(s) => s,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileId {
    /// 64-character hex public key.
    Hex(String),
    /// `npub1...`
    Npub(String),
    /// `nprofile1...`
    Nprofile(String),
    /// NIP-05 identifier, `name@domain`.
    Nip05(String),
}

impl ProfileId {
    /// Identity attributes, in precedence order.
    pub const ATTRIBUTES: &'static [&'static str] = &["npub", "nip05", "pubkey"];

    /// Parse a profile id in any accepted encoding.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if is_hex_key(value) {
            Some(Self::Hex(value.to_ascii_lowercase()))
        } else if is_bech32(value, "npub") {
            Some(Self::Npub(value.to_string()))
        } else if is_bech32(value, "nprofile") {
            Some(Self::Nprofile(value.to_string()))
        } else if is_nip05(value) {
            Some(Self::Nip05(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Read and validate the first present identity attribute.
    ///
    /// Each attribute only accepts its own encodings: `npub` takes `npub1`
    /// or `nprofile1`, `nip05` takes `name@domain`, `pubkey` takes hex.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, ValidationError> {
        let (attribute, value) = Self::ATTRIBUTES
            .iter()
            .find_map(|name| attributes.get(name).map(|value| (*name, value)))
            .ok_or(ValidationError::MissingIdentity { attributes: Self::ATTRIBUTES })?;

        let parsed = Self::parse(value).filter(|id| match id {
            Self::Npub(_) | Self::Nprofile(_) => attribute == "npub",
            Self::Nip05(_) => attribute == "nip05",
            Self::Hex(_) => attribute == "pubkey",
        });

        parsed.ok_or_else(|| ValidationError::InvalidIdentity { attribute, value: value.to_string() })
    }

    /// Encoded id.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hex(s) | Self::Npub(s) | Self::Nprofile(s) | Self::Nip05(s) => s,
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";

    #[test]
    fn event_id_encodings() {
        assert_eq!(EventId::parse(HEX), Some(EventId::Hex(HEX.to_string())));
        assert!(matches!(EventId::parse("note1qqqqqqqqqq"), Some(EventId::Note(_))));
        assert!(matches!(EventId::parse("nevent1qqqqqqqqqq"), Some(EventId::Nevent(_))));
        assert!(matches!(EventId::parse("naddr1qqqqqqqqqq"), Some(EventId::Naddr(_))));
    }

    #[test]
    fn event_id_rejects_malformed() {
        assert_eq!(EventId::parse(&HEX[1..]), None);
        assert_eq!(EventId::parse("note1"), None);
        assert_eq!(EventId::parse("note1qqqqqb"), None, "'b' is outside the bech32 alphabet");
        assert_eq!(EventId::parse("npub1qqqqqqqqqq"), None);
        assert_eq!(EventId::parse("hello"), None);
    }

    #[test]
    fn hex_ids_are_lowercased() {
        let upper = HEX.to_ascii_uppercase();
        assert_eq!(EventId::parse(&upper).map(|id| id.to_string()), Some(HEX.to_string()));
    }

    #[test]
    fn missing_event_id_attribute() {
        assert_eq!(
            EventId::from_attributes(&Attributes::new()),
            Err(ValidationError::MissingIdentity { attributes: &["event-id"] })
        );
    }

    #[test]
    fn invalid_event_id_attribute() {
        let attributes: Attributes = [("event-id", "xyz")].into_iter().collect();
        assert_eq!(
            EventId::from_attributes(&attributes),
            Err(ValidationError::InvalidIdentity { attribute: "event-id", value: "xyz".into() })
        );
    }

    #[test]
    fn profile_attribute_precedence() {
        let attributes: Attributes =
            [("pubkey", HEX), ("nip05", "alice@example.com")].into_iter().collect();
        assert_eq!(
            ProfileId::from_attributes(&attributes),
            Ok(ProfileId::Nip05("alice@example.com".into()))
        );
    }

    #[test]
    fn profile_attribute_must_match_its_encoding() {
        let attributes: Attributes = [("npub", HEX)].into_iter().collect();
        assert!(matches!(
            ProfileId::from_attributes(&attributes),
            Err(ValidationError::InvalidIdentity { attribute: "npub", .. })
        ));

        let attributes: Attributes = [("npub", "npub1qqqqqqqqqq")].into_iter().collect();
        assert!(matches!(ProfileId::from_attributes(&attributes), Ok(ProfileId::Npub(_))));
    }

    #[test]
    fn nip05_shape() {
        assert!(is_nip05("_@example.com"));
        assert!(!is_nip05("alice@localhost"));
        assert!(!is_nip05("@example.com"));
        assert!(!is_nip05("alice@.com"));
    }
}
