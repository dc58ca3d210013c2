//! Error types for Nostr elements.
//!
//! Strongly-typed errors per concern: attribute validation, the external
//! Nostr service, the connection barrier and entity loads. None of these
//! propagate to the embedding page; the lifecycle controller converts each
//! into channel state.
//!
//! `Display` of [`ValidationError`] and [`LoadError::user_message`] are the
//! texts shown to end users. Service failures are logged, never surfaced.

use thiserror::Error;

/// User-facing message for any relay connection failure.
pub const CONNECTION_FAILED_MESSAGE: &str = "Unable to connect to relays";

/// Invalid component attributes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Theme is not one of the accepted values.
    #[error("Invalid theme '{value}'. Accepted values are 'light', 'dark'")]
    InvalidTheme {
        /// Rejected attribute value
        value: String,
    },

    /// One or more relay entries lack a websocket scheme.
    #[error(
        "Invalid relays {}. Relay URLs must start with 'ws://' or 'wss://'",
        quote_all(.entries)
    )]
    InvalidRelays {
        /// Offending entries, trimmed, in attribute order
        entries: Vec<String>,
    },

    /// None of the identity attributes is present.
    #[error("Missing identity. Provide {}", quote_all(.attributes))]
    MissingIdentity {
        /// Attributes that would satisfy the requirement
        attributes: &'static [&'static str],
    },

    /// Identity attribute does not match any accepted encoding.
    #[error("Invalid {attribute} '{value}'")]
    InvalidIdentity {
        /// Attribute name
        attribute: &'static str,
        /// Rejected attribute value
        value: String,
    },
}

fn quote_all<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(|item| format!("'{}'", item.as_ref())).collect::<Vec<_>>().join(", ")
}

/// Failure reported by the external Nostr service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Relay set unreachable or rejected the connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request failed after connecting.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Service gave up waiting for relays.
    #[error("request timed out")]
    Timeout,
}

impl ServiceError {
    /// Returns true if the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}

/// Outcome of waiting on a connection barrier that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BarrierError {
    /// The connection attempt of this generation failed.
    #[error("relay connection failed")]
    ConnectionFailed,

    /// The barrier was replaced before it settled.
    #[error("relay configuration changed before connecting")]
    Superseded,
}

/// Failure to load an entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The service answered, but has no such entity.
    #[error("{what} not found")]
    NotFound {
        /// Capitalized entity name, e.g. `Event`
        what: &'static str,
    },

    /// The service failed.
    #[error("failed to load {what}: {source}")]
    Failed {
        /// Capitalized entity name, e.g. `Event`
        what: &'static str,
        /// Underlying service failure
        source: ServiceError,
    },
}

impl LoadError {
    /// Message stored on the entity channel.
    ///
    /// Not-found and failure produce distinct texts. The service cause is
    /// left out.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { what } => format!("{what} not found"),
            Self::Failed { what, .. } => format!("Failed to load {}", what.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_message() {
        let err = ValidationError::InvalidTheme { value: "invalid".into() };
        insta::assert_snapshot!(err, @"Invalid theme 'invalid'. Accepted values are 'light', 'dark'");
    }

    #[test]
    fn relay_message_names_every_entry() {
        let err = ValidationError::InvalidRelays {
            entries: vec!["not-a-relay".into(), "http://x.com".into()],
        };
        insta::assert_snapshot!(err, @"Invalid relays 'not-a-relay', 'http://x.com'. Relay URLs must start with 'ws://' or 'wss://'");
    }

    #[test]
    fn missing_identity_lists_attributes() {
        let err = ValidationError::MissingIdentity { attributes: &["npub", "nip05", "pubkey"] };
        insta::assert_snapshot!(err, @"Missing identity. Provide 'npub', 'nip05', 'pubkey'");
    }

    #[test]
    fn not_found_and_failure_differ() {
        let not_found = LoadError::NotFound { what: "Event" };
        let failed =
            LoadError::Failed { what: "Event", source: ServiceError::Fetch("socket closed".into()) };

        assert_eq!(not_found.user_message(), "Event not found");
        assert_eq!(failed.user_message(), "Failed to load event");
        assert!(!failed.user_message().contains("socket"));
        assert_ne!(not_found.user_message(), failed.user_message());
    }

    #[test]
    fn transient_service_errors() {
        assert!(ServiceError::Timeout.is_transient());
        assert!(ServiceError::Connection("refused".into()).is_transient());
        assert!(!ServiceError::Fetch("bad filter".into()).is_transient());
    }
}
