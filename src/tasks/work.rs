//! # Unit of work behind a deferred task.
//!
//! [`WorkFn`] wraps a closure `F: FnOnce(CancellationToken) -> Fut` and turns it
//! into a boxed future on demand. The closure runs at most once: a deferred task
//! that is cancelled before it starts drops the closure without calling it.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use lifescope::TaskError;
//!
//! // The shape every scoped unit of work has:
//! let work = |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok::<_, TaskError>(42)
//! };
//! # let _ = work;
//! ```

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Type-erased unit of work producing a `T`.
pub(crate) trait Work<T>: Send + 'static {
    /// Consumes the work and builds the future that computes it.
    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxFuture<'static, Result<T, TaskError>>;
}

/// Function-backed unit of work.
pub(crate) struct WorkFn<F> {
    f: F,
}

impl<F> WorkFn<F> {
    pub(crate) fn boxed<T, Fut>(f: F) -> Box<dyn Work<T>>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        T: Send + 'static,
    {
        Box::new(Self { f })
    }
}

impl<T, F, Fut> Work<T> for WorkFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxFuture<'static, Result<T, TaskError>> {
        (self.f)(ctx).boxed()
    }
}
