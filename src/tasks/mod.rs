//! # Deferred tasks and their continuations.
//!
//! This module provides the task-related types:
//! - [`Deferred`] - lazily started, cancellable task with a write-once result
//! - [`TaskId`] / [`TaskState`] - identity and observable state
//! - continuation primitives on [`Deferred`]: `then`, `then_or_raise`, `on_complete`

mod continuation;
mod deferred;
mod state;
mod work;

pub use deferred::Deferred;
pub use state::{TaskId, TaskState};

pub(crate) use deferred::Cancel;
pub(crate) use work::WorkFn;
