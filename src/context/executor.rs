//! # Background executor.
//!
//! Deferred task bodies run on an [`Executor`]. The default is
//! [`TokioExecutor`], which spawns onto a tokio runtime handle. Tests and
//! embedders can substitute their own implementation.

use futures::future::BoxFuture;
use tokio::runtime::Handle;

/// Where deferred task bodies are polled.
pub trait Executor: Send + Sync + 'static {
    /// Spawns a detached future.
    fn spawn(&self, fut: BoxFuture<'static, ()>);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Executor backed by a tokio runtime (the shared worker pool).
#[derive(Clone, Debug)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Binds to the runtime the caller is running in.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Binds to an explicit runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Executor for TokioExecutor {
    fn spawn(&self, fut: BoxFuture<'static, ()>) {
        drop(self.handle.spawn(fut));
    }

    fn name(&self) -> &'static str {
        "tokio"
    }
}
