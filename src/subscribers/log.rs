//! # LogWriter: renders runtime events through `tracing`.
//!
//! A minimal subscriber for demos and debugging. Installing a tracing
//! subscriber (and choosing the output format) is up to the application.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO lifescope: [scoped] task=task-1 host=main-activity signal=on_destroy
//! INFO lifescope: [started] task=task-1
//! INFO lifescope: [observer-fired] task=task-1 host=main-activity signal=on_destroy reason=cancelled
//! INFO lifescope: [cancelled] task=task-1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn task(e: &Event) -> String {
    e.task.map(|t| t.to_string()).unwrap_or_else(|| "-".into())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let host = e.host.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let signal = e.signal.map(|s| s.to_string()).unwrap_or_else(|| "-".into());

        match e.kind {
            EventKind::TaskScoped => {
                tracing::info!("[scoped] task={} host={host} signal={signal}", task(e));
            }
            EventKind::TaskStarted => {
                tracing::info!("[started] task={}", task(e));
            }
            EventKind::TaskCompleted => {
                tracing::info!("[completed] task={}", task(e));
            }
            EventKind::TaskFailed => {
                tracing::warn!("[failed] task={} err={reason}", task(e));
            }
            EventKind::TaskCancelled => {
                tracing::info!("[cancelled] task={}", task(e));
            }
            EventKind::ContinuationPanicked => {
                tracing::error!("[continuation-panicked] task={} info={reason}", task(e));
            }
            EventKind::ObserverFired => {
                tracing::info!(
                    "[observer-fired] task={} host={host} signal={signal} reason={reason}",
                    task(e)
                );
            }
            EventKind::ObserverDetached => {
                tracing::info!("[observer-detached] task={} host={host}", task(e));
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!("[subscriber-overflow] subscriber={host} reason={reason}");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!("[subscriber-panicked] subscriber={host} info={reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
