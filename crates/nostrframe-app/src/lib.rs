//! Application layer for Nostr elements
//!
//! Reactive lifecycle controller that drives the Sans-IO pieces of
//! [`nostrframe_core`] from host callbacks: attribute change, validate,
//! (re)connect, (re)load, update channels, render.
//!
//! # Components
//!
//! - [`Component`]: Base controller (theme/relay validation, connection barrier)
//! - [`ResolvingComponent`]: Controller that additionally resolves one entity
//! - [`Host`]: Trait for the element environment (attributes, events, render)
//! - [`NostrService`]: Trait for the external Nostr client
//! - [`Registry`]: Explicit tag-to-factory registry
//!
//! # Scheduling
//!
//! Async work is spawned on the ambient Tokio runtime. Every spawned task
//! carries a [`nostrframe_core::Ticket`] and drops its result if a newer
//! operation of the same family started meanwhile, or if the element was
//! detached.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod component;
mod error;
mod host;
mod lifecycle;
mod registry;
mod resolve;
mod resolving;
mod service;
mod view;

pub use component::Component;
pub use error::RegistryError;
pub use host::Host;
pub use lifecycle::{Element, Lifecycle};
pub use registry::{Factory, Registry};
pub use resolve::{EventResolver, ProfileResolver, Resolve};
pub use resolving::{EventComponent, ProfileComponent, ResolvingComponent};
pub use service::NostrService;
pub use view::{Content, View, ViewBody};
