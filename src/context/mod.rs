//! # Execution contexts.
//!
//! - [`Executor`] / [`TokioExecutor`] - background pool that runs task bodies
//! - [`Interactive`] / [`InteractiveLoop`] - the single thread continuations run on
//!
//! Both are injected explicitly through [`ScopeBuilder`](crate::ScopeBuilder);
//! nothing here is global state.

mod executor;
mod interactive;

use std::sync::Arc;

pub use executor::{Executor, TokioExecutor};
pub use interactive::{Closed, ErrorHandler, Interactive, InteractiveLoop, Unhandled};

use crate::events::Bus;

/// Everything a deferred task needs to run and to chain continuations.
///
/// Shared by every task created through one scope (and by their continuations).
pub(crate) struct Contexts {
    pub(crate) executor: Arc<dyn Executor>,
    pub(crate) interactive: Interactive,
    pub(crate) bus: Bus,
}

impl Contexts {
    pub(crate) fn new(executor: Arc<dyn Executor>, interactive: Interactive, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            executor,
            interactive,
            bus,
        })
    }
}
