//! Attribute bag and typed component configuration.
//!
//! Hosts expose string-keyed attributes. Before committing to any network
//! work a component turns a snapshot of them into a [`ComponentConfig`],
//! which either validates completely or yields a [`ValidationError`].
//! Validation is pure and cheap: it reads the attribute values passed in and
//! performs no I/O, so it is safe to repeat on every attribute change.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Relays used when the `relays` attribute is absent or empty.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://nostr.wine",
    "wss://relay.nostr.net",
    "wss://nos.lol",
    "wss://nostr-pub.wellorder.net",
    "wss://njump.me",
    "wss://relay.primal.net",
];

/// String-keyed element attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Name of the theme attribute.
    pub const THEME: &'static str = "theme";
    /// Name of the relay list attribute.
    pub const RELAYS: &'static str = "relays";

    /// Create an empty attribute bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute value. `None` if absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove an attribute, returning the previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Iterate over attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// Attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse an optional theme attribute. Absent means [`Theme::Light`].
    pub fn from_attribute(value: Option<&str>) -> Result<Self, ValidationError> {
        value.map_or(Ok(Self::default()), str::parse)
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ValidationError::InvalidTheme { value: other.to_string() }),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Websocket relay URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayUrl(String);

impl RelayUrl {
    /// Parse a single entry. Surrounding whitespace is ignored.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let rest = entry.strip_prefix("wss://").or_else(|| entry.strip_prefix("ws://"))?;
        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self(entry.to_string()))
    }

    /// Parse an optional comma-separated relay list.
    ///
    /// Empty entries are skipped. An absent or entry-less list yields
    /// [`DEFAULT_RELAYS`]. A single malformed entry rejects the whole list;
    /// the error names every malformed entry.
    pub fn parse_list(value: Option<&str>) -> Result<Vec<Self>, ValidationError> {
        let entries: Vec<&str> = value
            .map(|list| list.split(',').map(str::trim).filter(|e| !e.is_empty()).collect())
            .unwrap_or_default();

        if entries.is_empty() {
            return Ok(DEFAULT_RELAYS.iter().map(|url| Self((*url).to_string())).collect());
        }

        let mut relays = Vec::with_capacity(entries.len());
        let mut invalid = Vec::new();
        for entry in entries {
            match Self::parse(entry) {
                Some(relay) => relays.push(relay),
                None => invalid.push(entry.to_string()),
            }
        }

        if invalid.is_empty() {
            Ok(relays)
        } else {
            Err(ValidationError::InvalidRelays { entries: invalid })
        }
    }

    /// URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated base configuration of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentConfig {
    /// Color theme.
    pub theme: Theme,
    /// Relays to connect to.
    pub relays: Vec<RelayUrl>,
}

impl ComponentConfig {
    /// Validate the base attributes: theme first, then relays.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, ValidationError> {
        let theme = Theme::from_attribute(attributes.get(Attributes::THEME))?;
        let relays = RelayUrl::parse_list(attributes.get(Attributes::RELAYS))?;
        Ok(Self { theme, relays })
    }
}
