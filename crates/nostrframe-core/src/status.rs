//! Readiness status and aggregation precedence.
//!
//! A component tracks several independent readiness signals (connection,
//! primary entity, secondary entities). Each one is a [`Status`]; the status
//! shown to the page is derived from all of them by [`aggregate`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Readiness of a single channel, or of the whole component.
///
/// No total order is implied. Only the aggregation precedence in
/// [`aggregate`] is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Work in flight.
    Loading,
    /// Work completed successfully.
    Ready,
    /// Work failed. Always paired with an error message.
    Error,
}

impl Status {
    /// Lowercase name, as reflected in element attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the overall status from channel statuses.
///
/// Precedence, highest first: any `Error`, any `Loading`, any `Ready`, else
/// `Idle`. The result does not depend on iteration order, so channel writes
/// from different operation families commute.
pub fn aggregate<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut loading = false;
    let mut ready = false;

    for status in statuses {
        match status {
            Status::Error => return Status::Error,
            Status::Loading => loading = true,
            Status::Ready => ready = true,
            Status::Idle => {},
        }
    }

    if loading {
        Status::Loading
    } else if ready {
        Status::Ready
    } else {
        Status::Idle
    }
}

/// Mutually exclusive presentation states toggled on the host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presentation {
    /// Content is ready and the element is interactive.
    Clickable,
    /// Work is in flight; interaction disabled.
    Disabled,
    /// Something failed.
    Errored,
}

impl Presentation {
    /// Presentation for an overall status. `None` while idle.
    pub fn for_status(status: Status) -> Option<Self> {
        match status {
            Status::Idle => None,
            Status::Loading => Some(Self::Disabled),
            Status::Ready => Some(Self::Clickable),
            Status::Error => Some(Self::Errored),
        }
    }

    /// Class name toggled on the host element.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Clickable => "is-clickable",
            Self::Disabled => "is-disabled",
            Self::Errored => "is-error",
        }
    }

    /// All presentation states, for hosts that clear the others on toggle.
    pub const ALL: [Self; 3] = [Self::Clickable, Self::Disabled, Self::Errored];
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Status; 4] = [Status::Idle, Status::Loading, Status::Ready, Status::Error];

    fn expected(statuses: &[Status]) -> Status {
        if statuses.contains(&Status::Error) {
            Status::Error
        } else if statuses.contains(&Status::Loading) {
            Status::Loading
        } else if statuses.contains(&Status::Ready) {
            Status::Ready
        } else {
            Status::Idle
        }
    }

    #[test]
    fn empty_aggregate_is_idle() {
        assert_eq!(aggregate([]), Status::Idle);
    }

    #[test]
    fn precedence_table_up_to_three_channels() {
        for a in ALL {
            assert_eq!(aggregate([a]), expected(&[a]));
            for b in ALL {
                assert_eq!(aggregate([a, b]), expected(&[a, b]));
                for c in ALL {
                    assert_eq!(aggregate([a, b, c]), expected(&[a, b, c]), "{a} {b} {c}");
                }
            }
        }
    }

    #[test]
    fn status_names_are_lowercase() {
        let names: Vec<_> = ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["idle", "loading", "ready", "error"]);
    }

    #[test]
    fn idle_has_no_presentation() {
        assert_eq!(Presentation::for_status(Status::Idle), None);
        assert_eq!(Presentation::for_status(Status::Ready), Some(Presentation::Clickable));
        assert_eq!(Presentation::for_status(Status::Loading), Some(Presentation::Disabled));
        assert_eq!(Presentation::for_status(Status::Error), Some(Presentation::Errored));
    }
}
