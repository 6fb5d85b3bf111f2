//! Error types used by lifescope.
//!
//! This module defines two main error enums:
//!
//! - [`ScopeError`]: configuration errors raised synchronously when a scoped task is created.
//! - [`TaskError`]: terminal failures of a [`Deferred`](crate::Deferred) task.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::sync::Arc;

use thiserror::Error;

use crate::hosts::LifecycleEvent;

/// # Errors produced while scoping a task to a host.
///
/// These are caller-configuration errors. They are returned before any task is
/// created or any observer is registered, and never affect other scoped tasks.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The requested termination event is not permitted by the termination policy.
    #[error("unsupported termination event {event:?}; use one of {allowed:?}")]
    UnsupportedEvent {
        /// The rejected event.
        event: LifecycleEvent,
        /// Events the policy accepts.
        allowed: Vec<LifecycleEvent>,
    },
}

impl ScopeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifescope::{LifecycleEvent, ScopeError};
    ///
    /// let err = ScopeError::UnsupportedEvent { event: LifecycleEvent::Create, allowed: vec![] };
    /// assert_eq!(err.as_label(), "scope_unsupported_event");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScopeError::UnsupportedEvent { .. } => "scope_unsupported_event",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScopeError::UnsupportedEvent { event, allowed } => {
                format!("event {event:?} not allowed; allowed={allowed:?}")
            }
        }
    }
}

/// # Terminal failure of a deferred task.
///
/// Cancellation is a distinct outcome ([`TaskError::Canceled`]) and is never
/// reported as an application error.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The unit of work returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: Arc<str>,
    },

    /// The task was cancelled (by its host observer or explicitly).
    #[error("task cancelled")]
    Canceled,

    /// The unit of work or a continuation panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: Arc<str>,
    },
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything displayable.
    ///
    /// # Example
    /// ```
    /// use lifescope::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string().into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifescope::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "task cancelled".to_string(),
            TaskError::Panicked { message } => format!("panic: {message}"),
        }
    }

    /// True for [`TaskError::Canceled`].
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }

    /// Converts a caught panic payload into [`TaskError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        TaskError::Panicked {
            message: panic_message(payload.as_ref()).into(),
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked { message: "boom".into() }.as_label(),
            "task_panicked"
        );
    }

    #[test]
    fn cancellation_is_not_a_failure() {
        assert!(TaskError::Canceled.is_cancellation());
        assert!(!TaskError::fail("boom").is_cancellation());
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let err = TaskError::from_panic(Box::new("static str"));
        assert_eq!(err.as_message(), "panic: static str");

        let err = TaskError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.as_message(), "panic: owned");

        let err = TaskError::from_panic(Box::new(7_u8));
        assert_eq!(err.as_message(), "panic: unknown panic");
    }

    #[test]
    fn scope_error_message_lists_allowed() {
        let err = ScopeError::UnsupportedEvent {
            event: LifecycleEvent::Resume,
            allowed: vec![LifecycleEvent::Stop, LifecycleEvent::Destroy],
        };
        assert_eq!(
            err.as_message(),
            "event Resume not allowed; allowed=[Stop, Destroy]"
        );
    }
}
