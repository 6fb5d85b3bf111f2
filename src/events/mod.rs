//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Deferred` (task flow), `CancelObserver` (host side),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the `Scope` subscriber listener, which fans out to
//!   `SubscriberSet`, and anything holding a receiver from `Scope::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
