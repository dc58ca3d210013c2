//! Host trait for abstracting the element environment.
//!
//! The [`Host`] trait decouples the lifecycle controller from the page it
//! lives in. A browser binding would forward these calls to a custom
//! element; the harness records them; the CLI prints them.

use nostrframe_core::{Entity, Notification, Presentation, Status};

use crate::View;

/// Element environment a component reports to.
///
/// All methods take `&self`: a component and its in-flight tasks share the
/// host. Implementations use interior mutability where they keep state.
///
/// Calls are never made while the component holds its internal lock, so a
/// host may call back into the component.
pub trait Host: Send + Sync + 'static {
    /// Tag name of the element, e.g. `nostr-post`. Used in logs.
    fn tag_name(&self) -> &str;

    /// Reflect an attribute onto the element (`status`, `<channel>-status`).
    fn reflect_attribute(&self, name: &str, value: &str);

    /// Switch the presentation state. `None` clears all of them.
    fn set_presentation(&self, presentation: Option<Presentation>);

    /// Dispatch a notification as a bubbling, composed event.
    fn dispatch(&self, notification: &Notification);

    /// Replace the rendered content.
    fn render(&self, view: &View);

    /// Overall status changed. Fired once per genuine transition.
    fn on_status_change(&self, _overall: Status) {}

    /// The primary entity resolved.
    fn on_entity_ready(&self, _entity: &Entity) {}
}
