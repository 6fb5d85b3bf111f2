//! # Continuations on the interactive context.
//!
//! Three chaining primitives, all of which start the upstream task if needed
//! and run their callback as a job on the task's [`Interactive`](crate::Interactive)
//! context, strictly after the upstream task is terminal:
//!
//! | Primitive                              | On value         | On failure                          | On cancel        |
//! |----------------------------------------|------------------|-------------------------------------|------------------|
//! | [`then`](Deferred::then)               | `cb(v)` → result | carried to the returned task        | carried          |
//! | [`then_or_raise`](Deferred::then_or_raise) | `cb(v)`      | raised on the error channel, carried| carried silently |
//! | [`on_complete`](Deferred::on_complete) | `cb(None)`       | `cb(Some(err))`                     | `cb(Some(Canceled))` |
//!
//! Continuations registered on the same task run in registration order, because
//! completion listeners fire in order and the interactive queue is FIFO.
//!
//! A panicking `then` callback fails the returned task with
//! [`TaskError::Panicked`] and the panic continues to the interactive context's
//! error channel.

use std::panic::{self, AssertUnwindSafe};

use crate::context::Unhandled;
use crate::error::{TaskError, panic_message};
use crate::events::{Event, EventKind};

use super::deferred::Deferred;

impl<T: Send + 'static> Deferred<T> {
    /// Runs `f` with the value on the interactive context.
    ///
    /// The returned task completes with `f`'s result, or with this task's
    /// failure/cancellation unchanged (`f` is not called then).
    ///
    /// # Example
    /// ```no_run
    /// # use tokio_util::sync::CancellationToken;
    /// # use lifescope::{LifecycleOwner, Scope, ScopeConfig, TaskError};
    /// # async fn demo(scope: Scope) -> Result<(), Box<dyn std::error::Error>> {
    /// let owner = LifecycleOwner::new("screen");
    /// let next = scope
    ///     .load(&owner, |_ctx: CancellationToken| async { Ok::<_, TaskError>(42) })?
    ///     .then(|x| x + 1);
    /// assert_eq!(next.join().await?, 43);
    /// # Ok(())
    /// # }
    /// ```
    pub fn then<R, F>(&self, f: F) -> Deferred<R>
    where
        T: Clone,
        R: Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        self.chain(false, f)
    }

    /// Like [`then`](Self::then), but a failure is also raised on the
    /// interactive context's error channel as [`Unhandled::Failure`].
    ///
    /// Cancellation is never raised.
    pub fn then_or_raise<F>(&self, f: F) -> Deferred<()>
    where
        T: Clone,
        F: FnOnce(T) + Send + 'static,
    {
        self.chain(true, f)
    }

    /// Runs `f` exactly once on the interactive context when this task ends,
    /// with `None` on success and `Some(err)` otherwise.
    ///
    /// Nothing is propagated from here; the same task is returned so a value
    /// continuation can follow.
    pub fn on_complete<F>(&self, f: F) -> Deferred<T>
    where
        F: FnOnce(Option<&TaskError>) + Send + 'static,
    {
        let ui = self.interactive().clone();
        let id = self.id();
        self.on_done(move |res| {
            let err = res.as_ref().err().cloned();
            if ui.post(move || f(err.as_ref())).is_err() {
                tracing::warn!(task = %id, "interactive context closed; completion hook dropped");
            }
        });
        self.start();
        self.clone()
    }

    fn chain<R, F>(&self, raise: bool, f: F) -> Deferred<R>
    where
        T: Clone,
        R: Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        let ctx = self.contexts().clone();
        let next = Deferred::<R>::pending(ctx.clone());
        let target = next.clone();

        self.on_done(move |res| {
            let res = res.clone();
            let job_target = target.clone();
            let job_ctx = ctx.clone();

            let posted = ctx.interactive.post(move || {
                if job_target.is_terminal() {
                    return;
                }
                let value = match res {
                    Ok(value) => value,
                    Err(err) => {
                        if raise && !err.is_cancellation() {
                            job_ctx.interactive.report(&Unhandled::Failure(err.clone()));
                        }
                        job_target.complete(Err(err));
                        return;
                    }
                };
                match panic::catch_unwind(AssertUnwindSafe(move || f(value))) {
                    Ok(out) => {
                        job_target.complete(Ok(out));
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        job_ctx.bus.publish(
                            Event::new(EventKind::ContinuationPanicked)
                                .with_task(job_target.id())
                                .with_reason(message.clone()),
                        );
                        job_target.complete(Err(TaskError::Panicked {
                            message: message.into(),
                        }));
                        panic::resume_unwind(payload);
                    }
                }
            });

            if posted.is_err() {
                tracing::warn!(task = %target.id(), "interactive context closed; continuation cancelled");
                target.cancel();
            }
        });

        self.start();
        next
    }
}
