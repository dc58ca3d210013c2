//! Application error types.

use thiserror::Error;

/// Errors from the element registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Tag name is not a valid custom element name.
    #[error("invalid tag name '{0}': must start with a lowercase letter and contain a hyphen")]
    InvalidTagName(String),

    /// A factory is already registered under this tag.
    #[error("tag '{0}' is already defined")]
    AlreadyDefined(String),

    /// No factory is registered under this tag.
    #[error("tag '{0}' is not defined")]
    NotDefined(String),
}
