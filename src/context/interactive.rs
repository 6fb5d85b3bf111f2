//! # Interactive execution context.
//!
//! The interactive context is the single logical thread allowed to touch UI
//! state. [`Interactive`] is a cheap, cloneable handle that posts jobs; an
//! [`InteractiveLoop`] drains them in FIFO order.
//!
//! ## Architecture
//! ```text
//! continuation ── post(job) ──► [unbounded FIFO] ──► InteractiveLoop ──► job()
//!                                                          │
//!                                              panic ──────┴──► error handler (Unhandled::Panic)
//! raise(Unhandled::Failure) ── post ──────────────────────────► error handler
//! ```
//!
//! ## Driving the loop
//! - [`Interactive::spawn_thread`]: dedicated OS thread, runs until every handle is dropped.
//! - [`InteractiveLoop::run`]: async, e.g. inside `tokio::spawn` on a current-thread runtime.
//! - [`InteractiveLoop::run_until_idle`]: drains what is queued right now (deterministic tests).
//!
//! ## Error channel
//! Panics escaping a job and failures raised through [`Interactive::raise`] go to
//! the context's error handler. The default handler logs with `tracing::error!`.

use std::cell::Cell;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::thread;

use tokio::sync::mpsc;

use crate::error::{TaskError, panic_message};

static CONTEXT_SEQ: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Id of the interactive context whose job is running on this thread (0 = none).
    static CURRENT: Cell<u64> = const { Cell::new(0) };
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Error delivered to the interactive context's error channel.
#[derive(Debug, Clone)]
pub enum Unhandled {
    /// A task failure raised by a non-propagating continuation.
    Failure(TaskError),
    /// A job panicked; carries the rendered payload.
    Panic(String),
}

/// Callback invoked on the interactive context for every [`Unhandled`] error.
pub type ErrorHandler = Arc<dyn Fn(&Unhandled) + Send + Sync + 'static>;

/// The interactive loop is gone; the job was dropped without running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

fn default_handler() -> ErrorHandler {
    Arc::new(|err: &Unhandled| match err {
        Unhandled::Failure(e) => {
            tracing::error!(label = e.as_label(), error = %e, "unhandled task failure on interactive context");
        }
        Unhandled::Panic(msg) => {
            tracing::error!(panic = %msg, "job panicked on interactive context");
        }
    })
}

/// Handle used to schedule work on the interactive context.
#[derive(Clone)]
pub struct Interactive {
    id: u64,
    tx: mpsc::UnboundedSender<Job>,
    handler: ErrorHandler,
}

impl std::fmt::Debug for Interactive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interactive").field("id", &self.id).finish()
    }
}

impl Interactive {
    /// Creates a context with the default (logging) error handler.
    pub fn channel() -> (Interactive, InteractiveLoop) {
        Self::with_error_handler(default_handler())
    }

    /// Creates a context with a custom error handler.
    pub fn with_error_handler(handler: ErrorHandler) -> (Interactive, InteractiveLoop) {
        let id = CONTEXT_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Interactive {
            id,
            tx,
            handler: Arc::clone(&handler),
        };
        (handle, InteractiveLoop { id, rx, handler })
    }

    /// Runs a fresh context on a dedicated OS thread.
    ///
    /// The thread exits once every [`Interactive`] handle has been dropped.
    pub fn spawn_thread(name: &str) -> io::Result<(Interactive, thread::JoinHandle<()>)> {
        let (ui, lp) = Self::channel();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || lp.run_blocking())?;
        Ok((ui, join))
    }

    /// Queues `job` to run on the interactive context.
    pub fn post<F>(&self, job: F) -> Result<(), Closed>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(job)).map_err(|_| Closed)
    }

    /// Queues `err` for the context's error handler.
    pub fn raise(&self, err: Unhandled) -> Result<(), Closed> {
        let handler = Arc::clone(&self.handler);
        self.post(move || handler(&err))
    }

    /// Calls the error handler directly; use only from a job on this context.
    pub(crate) fn report(&self, err: &Unhandled) {
        (self.handler)(err)
    }

    /// True when called from a job running on this context.
    pub fn is_current(&self) -> bool {
        CURRENT.with(|c| c.get() == self.id)
    }

    /// True once the loop has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Restores the thread-local marker even if a job unwinds.
struct Enter {
    prev: u64,
}

impl Enter {
    fn new(id: u64) -> Self {
        let prev = CURRENT.with(|c| c.replace(id));
        Self { prev }
    }
}

impl Drop for Enter {
    fn drop(&mut self) {
        CURRENT.with(|c| c.set(self.prev));
    }
}

/// Receiving side of the interactive context.
pub struct InteractiveLoop {
    id: u64,
    rx: mpsc::UnboundedReceiver<Job>,
    handler: ErrorHandler,
}

impl InteractiveLoop {
    /// Runs jobs until every [`Interactive`] handle has been dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            self.execute(job);
        }
    }

    /// Blocking flavour of [`run`](Self::run); must not be called from async code.
    pub fn run_blocking(mut self) {
        while let Some(job) = self.rx.blocking_recv() {
            self.execute(job);
        }
    }

    /// Runs every job queued right now (and those they queue); returns how many ran.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            self.execute(job);
            ran += 1;
        }
        ran
    }

    fn execute(&self, job: Job) {
        let _enter = Enter::new(self.id);
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            (self.handler)(&Unhandled::Panic(panic_message(payload.as_ref())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn collecting() -> (Arc<Mutex<Vec<String>>>, ErrorHandler) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: ErrorHandler = Arc::new(move |err: &Unhandled| {
            let line = match err {
                Unhandled::Failure(e) => format!("failure:{}", e.as_label()),
                Unhandled::Panic(msg) => format!("panic:{msg}"),
            };
            sink.lock().unwrap().push(line);
        });
        (seen, handler)
    }

    #[test]
    fn jobs_run_in_fifo_order_and_know_their_context() {
        let (ui, mut lp) = Interactive::channel();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            let probe = ui.clone();
            ui.post(move || {
                assert!(probe.is_current());
                order.lock().unwrap().push(i);
            })
            .unwrap();
        }

        assert!(!ui.is_current());
        assert_eq!(lp.run_until_idle(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn panics_reach_the_error_handler_and_the_loop_keeps_going() {
        let (seen, handler) = collecting();
        let (ui, mut lp) = Interactive::with_error_handler(handler);
        let after = Arc::new(AtomicUsize::new(0));

        ui.post(|| panic!("boom")).unwrap();
        let a = Arc::clone(&after);
        ui.post(move || {
            a.fetch_add(1, AtomicOrdering::SeqCst);
        })
        .unwrap();

        lp.run_until_idle();
        assert_eq!(*seen.lock().unwrap(), vec!["panic:boom".to_string()]);
        assert_eq!(after.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn raised_failures_use_the_error_channel() {
        let (seen, handler) = collecting();
        let (ui, mut lp) = Interactive::with_error_handler(handler);
        ui.raise(Unhandled::Failure(TaskError::fail("io"))).unwrap();
        lp.run_until_idle();
        assert_eq!(*seen.lock().unwrap(), vec!["failure:task_failed".to_string()]);
    }

    #[test]
    fn post_after_loop_dropped_is_rejected() {
        let (ui, lp) = Interactive::channel();
        drop(lp);
        assert!(ui.is_closed());
        assert_eq!(ui.post(|| {}), Err(Closed));
    }

    #[test]
    fn dedicated_thread_runs_jobs() {
        let (ui, join) = Interactive::spawn_thread("ui-test").unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let probe = ui.clone();
        ui.post(move || {
            tx.send((probe.is_current(), thread::current().name().map(str::to_string)))
                .unwrap();
        })
        .unwrap();

        let (current, name) = rx.recv().unwrap();
        assert!(current);
        assert_eq!(name.as_deref(), Some("ui-test"));

        drop(ui);
        join.join().unwrap();
    }
}
