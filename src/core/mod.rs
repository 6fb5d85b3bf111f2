//! Scope core: the task factory and its host observers.
//!
//! The public API from this module is [`Scope`] (built through [`ScopeBuilder`]).
//!
//! Internal modules:
//! - [`scope`]: creates deferred tasks and binds them to hosts;
//! - [`observer`]: one-shot cancellation observer registered on the host;
//! - [`builder`]: wires executor, interactive context, bus and subscribers.

mod builder;
mod observer;
mod scope;

pub use builder::ScopeBuilder;
pub use scope::Scope;
