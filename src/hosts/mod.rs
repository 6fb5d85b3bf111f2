//! # Signal sources: the hosts a task can be scoped to.
//!
//! - [`SignalSource`] - register/unregister contract consumed by the scope
//! - [`Observer`] - receiver of uniform [`Signal`]s
//! - [`LifecycleOwner`] - host emitting named [`LifecycleEvent`]s
//! - [`ViewHost`] - host emitting attach/detach signals
//! - [`ObserverSet`] - shared registry with deferred removal

mod lifecycle;
mod set;
mod signal;
mod view;

pub use lifecycle::{LifecycleOwner, LifecycleState};
pub use set::ObserverSet;
pub use signal::{Disposition, LifecycleEvent, Observer, ObserverId, Signal, SignalSource};
pub use view::ViewHost;
