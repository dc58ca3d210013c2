//! Explicit element registry.
//!
//! Maps tag names to factories. Each registry is an ordinary value, so tests
//! and embedders can hold several independent ones.

use std::{collections::BTreeMap, fmt};

use crate::{Element, EventComponent, Host, NostrService, ProfileComponent, RegistryError};

/// Builds an element from a service and a host.
pub type Factory<S, H> = Box<dyn Fn(S, H) -> Box<dyn Element> + Send + Sync>;

/// Tag name to factory map.
pub struct Registry<S, H> {
    factories: BTreeMap<String, Factory<S, H>>,
}

impl<S, H> fmt::Debug for Registry<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("tags", &self.factories.keys()).finish()
    }
}

impl<S, H> Default for Registry<S, H> {
    fn default() -> Self {
        Self { factories: BTreeMap::new() }
    }
}

/// Custom element names: lowercase, starting with a letter, with a hyphen.
fn is_valid_tag(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

impl<S: NostrService, H: Host> Registry<S, H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `nostr-post` and `nostr-profile` defined.
    pub fn standard() -> Self {
        let post: Factory<S, H> = Box::new(|service: S, host: H| -> Box<dyn Element> {
            Box::new(EventComponent::new(service, host))
        });
        let profile: Factory<S, H> = Box::new(|service: S, host: H| -> Box<dyn Element> {
            Box::new(ProfileComponent::new(service, host))
        });

        let mut registry = Self::new();
        registry.factories.insert("nostr-post".to_string(), post);
        registry.factories.insert("nostr-profile".to_string(), profile);
        registry
    }

    /// Register a factory under `tag`.
    pub fn define<F>(&mut self, tag: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(S, H) -> Box<dyn Element> + Send + Sync + 'static,
    {
        if !is_valid_tag(tag) {
            return Err(RegistryError::InvalidTagName(tag.to_string()));
        }
        if self.factories.contains_key(tag) {
            return Err(RegistryError::AlreadyDefined(tag.to_string()));
        }

        tracing::debug!(tag, "element defined");
        self.factories.insert(tag.to_string(), Box::new(factory));
        Ok(())
    }

    /// Build a detached element.
    pub fn create(&self, tag: &str, service: S, host: H) -> Result<Box<dyn Element>, RegistryError> {
        let factory =
            self.factories.get(tag).ok_or_else(|| RegistryError::NotDefined(tag.to_string()))?;
        Ok(factory(service, host))
    }

    /// Whether a factory is registered under `tag`.
    pub fn is_defined(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tag names in order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_name_rules() {
        assert!(is_valid_tag("nostr-post"));
        assert!(is_valid_tag("x-1"));
        assert!(!is_valid_tag("nostrpost"));
        assert!(!is_valid_tag("Nostr-post"));
        assert!(!is_valid_tag("-post"));
        assert!(!is_valid_tag("1-post"));
        assert!(!is_valid_tag("nostr post"));
    }
}
