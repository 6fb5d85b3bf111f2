use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ScopeConfig,
    context::{Contexts, Executor, Interactive, TokioExecutor},
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::scope::Scope;

/// Builder for constructing a [`Scope`] with optional collaborators.
pub struct ScopeBuilder {
    cfg: ScopeConfig,
    executor: Option<Arc<dyn Executor>>,
    interactive: Option<Interactive>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ScopeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ScopeConfig) -> Self {
        Self {
            cfg,
            executor: None,
            interactive: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the background executor for task bodies.
    ///
    /// Default: [`TokioExecutor::current`].
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the interactive context continuations run on.
    ///
    /// Default: a fresh context whose loop is a single tokio task
    /// (one job at a time, in order).
    pub fn with_interactive(mut self, interactive: Interactive) -> Self {
        self.interactive = Some(interactive);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (scoping, cancellation, failures, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the Scope instance.
    ///
    /// # Panics
    /// Panics outside a tokio runtime when a default executor or interactive
    /// loop has to be spawned, or when subscribers are configured.
    pub fn build(self) -> Scope {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let shutdown = CancellationToken::new();

        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(TokioExecutor::current()));

        let interactive = self.interactive.unwrap_or_else(|| {
            let (ui, ui_loop) = Interactive::channel();
            tokio::spawn(ui_loop.run());
            ui
        });

        if !self.subscribers.is_empty() {
            let set = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
            subscriber_listener(&bus, set, shutdown.clone());
        }

        Scope::new_internal(self.cfg, Contexts::new(executor, interactive, bus), shutdown)
    }
}

/// Subscribes to the bus and forwards events to the subscriber set until the scope is dropped.
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>, shutdown: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    });
}
