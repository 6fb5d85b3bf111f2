//! # Deferred: lazily started, cancellable task with a write-once result.
//!
//! A [`Deferred`] is created not-started. Its body is handed to the background
//! [`Executor`](crate::Executor) only when [`start`](Deferred::start),
//! [`join`](Deferred::join) or a continuation asks for it.
//!
//! ## Flow
//! ```text
//! lazy(work) ──► NotStarted
//!                  ├─ start()/join() ──► executor.spawn(select!{ token.cancelled(), body })
//!                  │                          └─► complete(Ok | Err(Fail) | Err(Panicked))
//!                  └─ cancel() ────────────────► complete(Err(Canceled)), token.cancel()
//!
//! complete(res):
//!   first writer wins ─► publish TaskCompleted | TaskFailed | TaskCancelled
//!                    ─► run completion listeners in registration order
//! ```
//!
//! ## Rules
//! - The result slot is written exactly once; later writers are ignored.
//! - `cancel()` on a terminal task is a no-op returning `false`.
//! - Cancelling a running task reports `Cancelled` right away; the body is
//!   dropped at its next suspension point (cooperative, never preemptive).
//! - Completion listeners run on the completing thread, in registration order.
//! - The work closure is called on the executor, not by the caller of `start()`;
//!   a panic while it builds its future fails the task with `TaskError::Panicked`.

use std::fmt;
use std::future::IntoFuture;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::context::{Contexts, Interactive};
use crate::error::TaskError;
use crate::events::{Event, EventKind};

use super::state::{TaskId, TaskState};
use super::work::Work;

type Listener<T> = Box<dyn FnOnce(&Result<T, TaskError>) + Send + 'static>;

struct Slot<T> {
    started: bool,
    work: Option<Box<dyn Work<T>>>,
    outcome: Option<Result<T, TaskError>>,
    listeners: Vec<Listener<T>>,
}

struct Shared<T> {
    id: TaskId,
    token: CancellationToken,
    ctx: Arc<Contexts>,
    slot: Mutex<Slot<T>>,
}

/// Handle to a deferred task. Clones share the same task.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use lifescope::{LifecycleOwner, Scope, ScopeConfig, TaskError};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let scope = Scope::builder(ScopeConfig::default()).build();
/// let owner = LifecycleOwner::new("screen");
///
/// let task = scope.load(&owner, |_ctx: CancellationToken| async { Ok::<_, TaskError>(21) })?;
/// assert_eq!(task.join().await?, 21);
/// # Ok(())
/// # }
/// ```
pub struct Deferred<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish()
    }
}

impl<T: Send + 'static> Deferred<T> {
    /// Creates a not-started task around `work`.
    pub(crate) fn lazy(ctx: Arc<Contexts>, work: Box<dyn Work<T>>) -> Self {
        Self::with_slot(
            ctx,
            Slot {
                started: false,
                work: Some(work),
                outcome: None,
                listeners: Vec::new(),
            },
        )
    }

    /// Creates a running task without a body; completed from outside (continuations).
    pub(crate) fn pending(ctx: Arc<Contexts>) -> Self {
        Self::with_slot(
            ctx,
            Slot {
                started: true,
                work: None,
                outcome: None,
                listeners: Vec::new(),
            },
        )
    }

    fn with_slot(ctx: Arc<Contexts>, slot: Slot<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: TaskId::next(),
                token: CancellationToken::new(),
                ctx,
                slot: Mutex::new(slot),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.shared.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn contexts(&self) -> &Arc<Contexts> {
        &self.shared.ctx
    }

    /// Task identity.
    pub fn id(&self) -> TaskId {
        self.shared.id
    }

    /// The interactive context continuations of this task run on.
    pub fn interactive(&self) -> &Interactive {
        &self.shared.ctx.interactive
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        let slot = self.lock();
        match &slot.outcome {
            Some(Ok(_)) => TaskState::Completed,
            Some(Err(TaskError::Canceled)) => TaskState::Cancelled,
            Some(Err(_)) => TaskState::Failed,
            None if slot.started => TaskState::Running,
            None => TaskState::NotStarted,
        }
    }

    /// True once a value, failure or cancellation has been recorded.
    pub fn is_terminal(&self) -> bool {
        self.lock().outcome.is_some()
    }

    /// True if the task ended cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    /// Hands the body to the background executor.
    ///
    /// Returns `false` if the task was already started, has no body, or is terminal.
    pub fn start(&self) -> bool {
        let work = {
            let mut slot = self.lock();
            if slot.started || slot.outcome.is_some() {
                return false;
            }
            slot.started = true;
            slot.work.take()
        };
        let Some(work) = work else {
            return false;
        };

        let token = self.shared.token.clone();
        let me = self.clone();

        tracing::trace!(task = %self.id(), executor = self.shared.ctx.executor.name(), "starting deferred task");
        self.shared
            .ctx
            .bus
            .publish(Event::new(EventKind::TaskStarted).with_task(self.id()));

        self.shared.ctx.executor.spawn(
            async move {
                let body_token = token.clone();
                let body = async move { work.spawn(body_token).await };
                let res = tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TaskError::Canceled),
                    res = AssertUnwindSafe(body).catch_unwind() => {
                        res.unwrap_or_else(|payload| Err(TaskError::from_panic(payload)))
                    }
                };
                me.complete(res);
            }
            .boxed(),
        );
        true
    }

    /// Cancels the task.
    ///
    /// A not-started task never starts; a running one stops at its next
    /// suspension point. Returns `false` (and does nothing) if the task is
    /// already terminal, so repeated calls are harmless.
    pub fn cancel(&self) -> bool {
        let cancelled = self.complete(Err(TaskError::Canceled));
        if cancelled {
            self.shared.token.cancel();
        }
        cancelled
    }

    /// Records the outcome if none exists yet and notifies listeners.
    pub(crate) fn complete(&self, res: Result<T, TaskError>) -> bool {
        let work = {
            let mut slot = self.lock();
            if slot.outcome.is_some() {
                return false;
            }
            slot.started = true;
            let work = slot.work.take();
            let listeners = std::mem::take(&mut slot.listeners);
            let outcome: &Result<T, TaskError> = slot.outcome.insert(res);

            self.shared.ctx.bus.publish(self.terminal_event(outcome));
            for listener in listeners {
                listener(outcome);
            }
            work
        };
        drop(work);
        true
    }

    fn terminal_event(&self, outcome: &Result<T, TaskError>) -> Event {
        let ev = match outcome {
            Ok(_) => Event::new(EventKind::TaskCompleted),
            Err(TaskError::Canceled) => Event::new(EventKind::TaskCancelled),
            Err(e) => Event::new(EventKind::TaskFailed).with_reason(e.to_string()),
        };
        tracing::debug!(task = %self.id(), kind = ?ev.kind, "deferred task finished");
        ev.with_task(self.id())
    }

    /// Runs `f` with the outcome once the task is terminal (immediately if it already is).
    ///
    /// Listeners run while the result slot is locked: they must not touch this task.
    pub(crate) fn on_done<F>(&self, f: F)
    where
        F: FnOnce(&Result<T, TaskError>) + Send + 'static,
    {
        let mut slot = self.lock();
        if let Some(outcome) = slot.outcome.as_ref() {
            f(outcome);
            return;
        }
        slot.listeners.push(Box::new(f));
    }

    /// Starts the task if needed and waits for its outcome.
    ///
    /// Waiting does not occupy a worker thread.
    pub async fn join(&self) -> Result<T, TaskError>
    where
        T: Clone,
    {
        let (tx, rx) = oneshot::channel();
        self.on_done(move |res| {
            let _ = tx.send(res.clone());
        });
        self.start();
        rx.await.unwrap_or(Err(TaskError::Canceled))
    }

    /// Blocking flavour of [`join`](Self::join).
    ///
    /// Must not be called from async code or from the interactive context.
    pub fn blocking_join(&self) -> Result<T, TaskError>
    where
        T: Clone,
    {
        futures::executor::block_on(self.join())
    }
}

impl<T: Clone + Send + 'static> IntoFuture for Deferred<T> {
    type Output = Result<T, TaskError>;
    type IntoFuture = BoxFuture<'static, Result<T, TaskError>>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.join().await }.boxed()
    }
}

/// Type-erased cancellation access, held by the host observer.
pub(crate) trait Cancel: Send + Sync + 'static {
    fn id(&self) -> TaskId;
    fn cancel(&self) -> bool;
    fn is_terminal(&self) -> bool;
}

impl<T: Send + 'static> Cancel for Deferred<T> {
    fn id(&self) -> TaskId {
        Deferred::id(self)
    }

    fn cancel(&self) -> bool {
        Deferred::cancel(self)
    }

    fn is_terminal(&self) -> bool {
        Deferred::is_terminal(self)
    }
}
