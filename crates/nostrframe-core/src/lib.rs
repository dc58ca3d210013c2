//! Core building blocks for Nostr elements.
//!
//! Everything in this crate is Sans-IO: no task spawning, no host access and
//! no network calls. The lifecycle controller in `nostrframe-app` composes
//! these pieces and executes the actions they return.
//!
//! # Components
//!
//! - [`ChannelSet`]: named status channels and the aggregate derived from them
//! - [`Sequence`]: generation counter that lets async work detect staleness
//! - [`Barrier`]: resettable one-shot future for "relays are connected"
//! - [`ComponentConfig`]: typed configuration validated from [`Attributes`]
//! - [`EventId`] / [`ProfileId`]: identity attribute parsing
//!
//! # Transitions
//!
//! Channel writes follow the action pattern: [`ChannelSet::set`] mutates the
//! pure state and returns [`ChannelAction`]s (reflect an attribute, toggle a
//! presentation state, notify, render) for the caller to perform.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod barrier;
pub mod channel;
pub mod config;
pub mod entity;
pub mod error;
pub mod guard;
pub mod identity;
pub mod notification;
pub mod status;

pub use barrier::{Barrier, BarrierState, BarrierWait};
pub use channel::{ChannelAction, ChannelKey, ChannelSet, ChannelSnapshot, StatusChannel};
pub use config::{Attributes, ComponentConfig, DEFAULT_RELAYS, RelayUrl, Theme};
pub use entity::{Entity, Event, Profile};
pub use error::{BarrierError, LoadError, ServiceError, ValidationError};
pub use guard::{Sequence, Ticket};
pub use identity::{EventId, ProfileId};
pub use notification::{EntityReady, Notification, StatusNotification};
pub use status::{Presentation, Status, aggregate};
