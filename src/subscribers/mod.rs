//! # Event subscribers.
//!
//! ```text
//! Deferred / CancelObserver ── publish(Event) ──► Bus ──► Scope listener ──► SubscriberSet
//!                                                                               │
//!                                                              ┌────────────────┼──────────┐
//!                                                              ▼                ▼          ▼
//!                                                          LogWriter         Metrics    Custom
//! ```
//!
//! - [`Subscribe`] - trait for custom handlers
//! - [`SubscriberSet`] - bounded per-subscriber queues with panic isolation
//! - `LogWriter` - built-in `tracing` renderer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
