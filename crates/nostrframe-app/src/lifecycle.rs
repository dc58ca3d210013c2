//! Element lifecycle callbacks.

use nostrframe_core::Status;

/// Callbacks the host environment invokes on an element.
pub trait Lifecycle {
    /// The element was inserted into a document.
    fn on_attach(&self);

    /// An observed attribute changed. Unchanged values are ignored.
    fn on_attribute_change(&self, name: &str, old: Option<&str>, new: Option<&str>);

    /// The element was removed from its document.
    fn on_detach(&self);
}

/// A component as seen by its host: lifecycle plus attribute access.
///
/// `set_attribute` and `remove_attribute` store the value and then run
/// [`Lifecycle::on_attribute_change`], mirroring how a document notifies
/// custom elements.
pub trait Element: Lifecycle + Send + Sync {
    /// Store or clear an attribute without running callbacks. Returns the
    /// previous value.
    fn write_attribute(&self, name: &str, value: Option<&str>) -> Option<String>;

    /// Current attribute value.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Overall status as last reflected to the host.
    fn status(&self) -> Status;

    /// Set an attribute and notify the component.
    fn set_attribute(&self, name: &str, value: &str) {
        let old = self.write_attribute(name, Some(value));
        self.on_attribute_change(name, old.as_deref(), Some(value));
    }

    /// Remove an attribute and notify the component if it was present.
    fn remove_attribute(&self, name: &str) {
        if let Some(old) = self.write_attribute(name, None) {
            self.on_attribute_change(name, Some(&old), None);
        }
    }
}
