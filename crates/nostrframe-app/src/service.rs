//! External Nostr client abstraction.

use std::future::Future;

use nostrframe_core::{Event, EventId, Profile, ProfileId, RelayUrl, ServiceError};

/// Nostr client shared by all components of a page.
///
/// Requests are never aborted by the caller. Components drop superseded
/// results themselves.
pub trait NostrService: Send + Sync + 'static {
    /// Connect to the given relays.
    ///
    /// # Errors
    ///
    /// Returns an error if no relay connection could be established.
    fn connect(&self, relays: &[RelayUrl]) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Fetch a single event. `Ok(None)` means no relay has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request itself failed.
    fn get_event(
        &self,
        id: &EventId,
    ) -> impl Future<Output = Result<Option<Event>, ServiceError>> + Send;

    /// Fetch profile metadata. `Ok(None)` means no relay has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request itself failed.
    fn get_profile(
        &self,
        id: &ProfileId,
    ) -> impl Future<Output = Result<Option<Profile>, ServiceError>> + Send;
}
