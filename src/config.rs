//! # Scope configuration.
//!
//! Provides [`ScopeConfig`], the settings shared by every task a [`Scope`](crate::Scope) creates,
//! and [`TerminationPolicy`], which decides which lifecycle events may end a task.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1

use crate::error::ScopeError;
use crate::hosts::LifecycleEvent;

/// Which lifecycle events a caller may pick as the cancellation trigger.
///
/// - `Restricted(list)`: only events in `list` are accepted.
/// - `Any`: every event is accepted (e.g. cancel on `Create` for re-created screens).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationPolicy {
    Restricted(Vec<LifecycleEvent>),
    Any,
}

impl TerminationPolicy {
    /// The backgrounding/destruction allow-list: `Pause`, `Stop`, `Destroy`.
    pub fn backgrounding() -> Self {
        TerminationPolicy::Restricted(vec![
            LifecycleEvent::Pause,
            LifecycleEvent::Stop,
            LifecycleEvent::Destroy,
        ])
    }

    /// True if `event` may be used as a trigger.
    pub fn permits(&self, event: LifecycleEvent) -> bool {
        match self {
            TerminationPolicy::Restricted(allowed) => allowed.contains(&event),
            TerminationPolicy::Any => true,
        }
    }

    /// Checks `event` against the policy.
    ///
    /// # Example
    /// ```
    /// use lifescope::{LifecycleEvent, TerminationPolicy};
    ///
    /// let policy = TerminationPolicy::backgrounding();
    /// assert!(policy.check(LifecycleEvent::Stop).is_ok());
    /// assert!(policy.check(LifecycleEvent::Resume).is_err());
    /// ```
    pub fn check(&self, event: LifecycleEvent) -> Result<(), ScopeError> {
        if self.permits(event) {
            return Ok(());
        }
        let allowed = match self {
            TerminationPolicy::Restricted(allowed) => allowed.clone(),
            TerminationPolicy::Any => Vec::new(),
        };
        Err(ScopeError::UnsupportedEvent { event, allowed })
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::backgrounding()
    }
}

/// Configuration for a [`Scope`](crate::Scope).
///
/// ## Field semantics
/// - `until`: trigger used by [`Scope::load`](crate::Scope::load)
/// - `policy`: which triggers [`Scope::load_until`](crate::Scope::load_until) accepts
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct ScopeConfig {
    /// Default lifecycle event that cancels tasks scoped to a [`LifecycleOwner`](crate::LifecycleOwner).
    pub until: LifecycleEvent,

    /// Allowed cancellation triggers.
    pub policy: TerminationPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl ScopeConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ScopeConfig {
    /// Default configuration:
    ///
    /// - `until = LifecycleEvent::Destroy`
    /// - `policy = TerminationPolicy::backgrounding()` (`Pause`, `Stop`, `Destroy`)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            until: LifecycleEvent::Destroy,
            policy: TerminationPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_backgrounding() {
        let cfg = ScopeConfig::default();
        assert_eq!(cfg.until, LifecycleEvent::Destroy);
        for ev in [LifecycleEvent::Pause, LifecycleEvent::Stop, LifecycleEvent::Destroy] {
            assert!(cfg.policy.permits(ev), "{ev:?} should be allowed");
        }
        for ev in [LifecycleEvent::Create, LifecycleEvent::Start, LifecycleEvent::Resume] {
            assert!(!cfg.policy.permits(ev), "{ev:?} should be rejected");
        }
    }

    #[test]
    fn any_policy_accepts_everything() {
        assert!(TerminationPolicy::Any.check(LifecycleEvent::Create).is_ok());
    }

    #[test]
    fn rejection_lists_the_allowed_events() {
        let err = TerminationPolicy::Restricted(vec![LifecycleEvent::Destroy])
            .check(LifecycleEvent::Start)
            .unwrap_err();
        assert_eq!(
            err,
            ScopeError::UnsupportedEvent {
                event: LifecycleEvent::Start,
                allowed: vec![LifecycleEvent::Destroy],
            }
        );
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = ScopeConfig { bus_capacity: 0, ..ScopeConfig::default() };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
