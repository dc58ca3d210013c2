//! Headless host for Nostr elements.
//!
//! Mounts one element from the standard registry against a fixture-backed
//! service, lets it settle and reports what a page would have observed:
//! reflected attributes, presentation class, dispatched events and the last
//! rendered view.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod fixtures;
mod host;
mod report;

use std::time::Duration;

use nostrframe_app::Registry;

pub use error::CliError;
pub use fixtures::{FixtureService, Fixtures};
pub use host::TerminalHost;
pub use report::{DispatchedEvent, Report};

/// What to mount and how long to let it run.
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Element tag name.
    pub element: String,
    /// Attributes applied before attaching, in order.
    pub attributes: Vec<(String, String)>,
    /// Time given to connection and load work after attaching.
    pub settle: Duration,
}

/// Mount an element, let it settle, detach it and report.
pub async fn mount(options: &MountOptions, fixtures: Fixtures) -> Result<Report, CliError> {
    let registry = Registry::<FixtureService, TerminalHost>::standard();
    let host = TerminalHost::new(options.element.as_str());
    let element = registry.create(&options.element, FixtureService::new(fixtures), host.clone())?;

    for (name, value) in &options.attributes {
        element.set_attribute(name, value);
    }

    tracing::debug!(tag = %options.element, "attaching");
    element.on_attach();
    tokio::time::sleep(options.settle).await;

    let status = element.status();
    element.on_detach();
    tracing::debug!(tag = %options.element, %status, "detached");

    Ok(host.report(status))
}

/// Parse a `key=value` attribute argument.
pub fn parse_attr(arg: &str) -> Result<(String, String), CliError> {
    let (name, value) =
        arg.split_once('=').ok_or_else(|| CliError::InvalidAttribute(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidAttribute(arg.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attribute_arguments_split_on_first_equals() {
        assert_eq!(
            parse_attr("relays=wss://a.com?x=1").unwrap(),
            ("relays".to_string(), "wss://a.com?x=1".to_string())
        );
        assert_eq!(parse_attr("theme=").unwrap(), ("theme".to_string(), String::new()));
        assert!(matches!(parse_attr("theme"), Err(CliError::InvalidAttribute(_))));
        assert!(matches!(parse_attr("=dark"), Err(CliError::InvalidAttribute(_))));
    }
}
