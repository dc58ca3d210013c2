//! Standard invariant checks.

use nostrframe_core::{Presentation, Status, aggregate};

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// Reflected overall status equals the aggregate of all channels.
///
/// Checked once the host has seen any channel write; before that, seeded
/// channels may legitimately differ from the unreflected `Idle`.
pub struct OverallMatchesChannels;

impl Invariant for OverallMatchesChannels {
    fn kind(&self) -> InvariantKind {
        InvariantKind::OverallMatchesChannels
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for component in &state.components {
            if component.host_attributes.is_empty() {
                continue;
            }
            let expected = aggregate(component.channels.iter().map(|(_, c)| c.status()));
            let reflected = component.channels.reflected_overall();
            if reflected != expected {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "{}: reflected {reflected}, channels aggregate to {expected} ({:?})",
                        component.tag,
                        component.channels.snapshot()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A channel has a non-empty error message exactly when it is in `Error`.
pub struct ErrorMessageIffError;

impl Invariant for ErrorMessageIffError {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ErrorMessageIffError
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for component in &state.components {
            for (key, channel) in component.channels.iter() {
                let has_message = channel.error_message().is_some_and(|m| !m.is_empty());
                if has_message != (channel.status() == Status::Error) {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!(
                            "{}: channel {key} is {} with message {:?}",
                            component.tag,
                            channel.status(),
                            channel.error_message()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The surfaced error exists exactly when some channel is in `Error`, and
/// is the message of one of them.
pub struct SurfacedErrorConsistent;

impl Invariant for SurfacedErrorConsistent {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SurfacedErrorConsistent
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for component in &state.components {
            let errors: Vec<_> = component
                .channels
                .iter()
                .filter(|(_, c)| c.status() == Status::Error)
                .filter_map(|(_, c)| c.error_message())
                .collect();

            let consistent = match component.channels.error_message() {
                Some(surfaced) => errors.contains(&surfaced),
                None => errors.is_empty(),
            };
            if !consistent {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "{}: surfaced {:?} but channel errors are {errors:?}",
                        component.tag,
                        component.channels.error_message()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The host's `status` attribute and presentation match the overall status.
pub struct ReflectedStatusMatches;

impl Invariant for ReflectedStatusMatches {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ReflectedStatusMatches
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for component in &state.components {
            let Some(reflected) = component.host_attributes.get("status") else {
                continue;
            };
            let overall = component.channels.reflected_overall();
            let presentation = Presentation::for_status(overall);
            if reflected != overall.as_str() || component.presentation != presentation {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "{}: overall {overall} reflected as {reflected} with {:?}",
                        component.tag, component.presentation
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Stale-guard sequences never decrease.
pub struct SequencesMonotonic;

impl Invariant for SequencesMonotonic {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SequencesMonotonic
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for component in &state.components {
            for window in component.sequence_history.windows(2) {
                let (before, after) = (window[0], window[1]);
                if after.connect < before.connect
                    || after.load < before.load
                    || after.author < before.author
                {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!("{}: sequences went {before:?} → {after:?}", component.tag),
                    });
                }
            }
        }
        Ok(())
    }
}
