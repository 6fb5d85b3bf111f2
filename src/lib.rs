//! # lifescope
//!
//! **lifescope** ties asynchronous work to the lifetime of a host object (a
//! screen with lifecycle events, or a view that is attached and detached) and
//! resumes on a designated interactive thread when the work is done.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller
//!     │ load / load_until / load_on (work)
//!     ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Scope (task factory)                                            │
//! │  - ScopeConfig (default trigger, termination policy)             │
//! │  - Executor (background pool for task bodies)                    │
//! │  - Interactive (single thread for continuations)                 │
//! │  - Bus + SubscriberSet (runtime events)                          │
//! └──────┬───────────────────────────────────────────┬───────────────┘
//!        │ Deferred::lazy(work)                      │ add_observer(CancelObserver)
//!        ▼                                           ▼
//!  ┌──────────────┐   cancel() on trigger   ┌──────────────────────────┐
//!  │   Deferred   │ ◄────────────────────── │ LifecycleOwner / ViewHost│
//!  │ (NotStarted) │ ── on_done: remove ───► │   (ObserverSet)          │
//!  └──────┬───────┘      observer           └──────────────────────────┘
//!         │ then / then_or_raise / on_complete
//!         ▼
//!  Interactive loop ──► callback(value | error)
//! ```
//!
//! ### Task lifecycle
//! ```text
//! NotStarted ──start()/join()/then()──► Running ──► Completed | Failed
//!      │                                   │
//!      └──────────── host trigger / cancel() ──────► Cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Scoping**       | Create tasks cancelled by host signals.                      | [`Scope`], [`ScopeBuilder`]               |
//! | **Tasks**         | Lazy, cancellable tasks with continuations.                  | [`Deferred`], [`TaskState`]               |
//! | **Hosts**         | Lifecycle owners and views emitting uniform signals.         | [`LifecycleOwner`], [`ViewHost`], [`SignalSource`] |
//! | **Contexts**      | Injectable background executor and interactive loop.        | [`Executor`], [`Interactive`]             |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, audit).          | [`Subscribe`], [`Event`]                  |
//! | **Errors**        | Typed configuration and task errors.                         | [`ScopeError`], [`TaskError`]             |
//! | **Configuration** | Default trigger, termination policy, bus size.               | [`ScopeConfig`], [`TerminationPolicy`]    |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use lifescope::{Interactive, LifecycleEvent, LifecycleOwner, Scope, ScopeConfig, TaskError, TaskState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (ui, ui_loop) = Interactive::channel();
//!     tokio::spawn(ui_loop.run());
//!
//!     let scope = Scope::builder(ScopeConfig::default()).with_interactive(ui).build();
//!     let screen = LifecycleOwner::new("main-activity");
//!     screen.emit(LifecycleEvent::Create);
//!
//!     let answer = scope
//!         .load(&screen, |_ctx: CancellationToken| async {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             Ok::<_, TaskError>(42)
//!         })?
//!         .then(|x| x + 1);
//!     assert_eq!(answer.join().await?, 43);
//!
//!     let slow = scope.load(&screen, |_ctx: CancellationToken| async {
//!         tokio::time::sleep(Duration::from_secs(60)).await;
//!         Ok::<_, TaskError>(())
//!     })?;
//!     slow.start();
//!     screen.emit(LifecycleEvent::Destroy);
//!     assert_eq!(slow.state(), TaskState::Cancelled);
//!     Ok(())
//! }
//! ```
mod config;
mod context;
mod core;
mod error;
mod events;
mod hosts;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::{ScopeConfig, TerminationPolicy};
pub use context::{Closed, ErrorHandler, Executor, Interactive, InteractiveLoop, TokioExecutor, Unhandled};
pub use core::{Scope, ScopeBuilder};
pub use error::{ScopeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use hosts::{
    Disposition, LifecycleEvent, LifecycleOwner, LifecycleState, Observer, ObserverId, ObserverSet,
    Signal, SignalSource, ViewHost,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Deferred, TaskId, TaskState};

// Optional: expose a built-in tracing-backed subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
