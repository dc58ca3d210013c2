//! Fuzz target for attribute validation
//!
//! Arbitrary attribute values go through the same parsers a component runs
//! on every attribute change. Validation must:
//! - Never panic
//! - Be deterministic (validating twice gives the same answer)
//! - Only accept relay lists made of ws:// or wss:// URLs
//! - Only accept identities whose canonical form parses again

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nostrframe_core::{Attributes, ComponentConfig, EventId, ProfileId, ValidationError};

#[derive(Debug, Arbitrary)]
struct Input {
    theme: Option<String>,
    relays: Option<String>,
    event_id: Option<String>,
    npub: Option<String>,
    nip05: Option<String>,
    pubkey: Option<String>,
}

fuzz_target!(|input: Input| {
    let mut attributes = Attributes::new();
    let pairs = [
        (Attributes::THEME, &input.theme),
        (Attributes::RELAYS, &input.relays),
        (EventId::ATTRIBUTE, &input.event_id),
        ("npub", &input.npub),
        ("nip05", &input.nip05),
        ("pubkey", &input.pubkey),
    ];
    for (name, value) in pairs {
        if let Some(value) = value {
            attributes.set(name, value.as_str());
        }
    }

    let config = ComponentConfig::from_attributes(&attributes);
    assert_eq!(config, ComponentConfig::from_attributes(&attributes));

    match &config {
        Ok(config) => {
            assert!(!config.relays.is_empty());
            for relay in &config.relays {
                let url = relay.as_str();
                assert!(url.starts_with("ws://") || url.starts_with("wss://"), "accepted {url}");
            }
        }
        Err(ValidationError::InvalidRelays { entries }) => assert!(!entries.is_empty()),
        Err(_) => {}
    }

    if let Ok(id) = EventId::from_attributes(&attributes) {
        assert_eq!(EventId::parse(id.as_str()), Some(id.clone()));
    }

    if let Ok(id) = ProfileId::from_attributes(&attributes) {
        assert_eq!(ProfileId::parse(id.as_str()), Some(id.clone()));
    }

    // Error text is what users see; rendering it must not panic either.
    if let Err(err) = config {
        let _ = err.to_string();
    }
});
