//! # Scope: the lifecycle-scoped task factory.
//!
//! The [`Scope`] owns the execution contexts, the event bus and the configuration.
//! Every `load*` call creates one not-started [`Deferred`] and binds exactly one
//! [`CancelObserver`] to the host.
//!
//! ## Wiring
//! ```text
//! load_until(owner, until, work)
//!   ├─► policy.check(until)            ── Err(ScopeError) → nothing created, nothing registered
//!   ├─► Deferred::lazy(work)           (NotStarted)
//!   ├─► owner.is_destroyed()?          ── yes → task.cancel(), no observer
//!   └─► bind():
//!         ├─► source.add_observer(CancelObserver{ trigger, task })
//!         ├─► task.on_done(|_| source.remove_observer(id))   (task finished first → no leak)
//!         └─► publish TaskScoped
//!
//! host signal ──► CancelObserver::on_signal ──► task.cancel() ──► Disposition::Remove
//! ```
//!
//! The scope keeps only weak references to hosts.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::ScopeConfig;
use crate::context::{Contexts, Interactive};
use crate::core::builder::ScopeBuilder;
use crate::core::observer::{CancelObserver, Trigger};
use crate::error::{ScopeError, TaskError};
use crate::events::{Event, EventKind};
use crate::hosts::{LifecycleEvent, LifecycleOwner, ObserverId, SignalSource, ViewHost};
use crate::tasks::{Deferred, WorkFn};

/// Factory for tasks that are cancelled when their host goes away.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use lifescope::{Interactive, LifecycleEvent, LifecycleOwner, Scope, ScopeConfig, TaskError};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let (ui, ui_loop) = Interactive::channel();
/// tokio::spawn(ui_loop.run());
///
/// let scope = Scope::builder(ScopeConfig::default())
///     .with_interactive(ui)
///     .build();
///
/// let owner = LifecycleOwner::new("main-activity");
/// let task = scope.load_until(&owner, LifecycleEvent::Stop, |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(100)
/// })?;
///
/// task.on_complete(|err| assert!(err.is_none()))
///     .then(|v| println!("loaded {v}"));
/// # Ok(())
/// # }
/// ```
pub struct Scope {
    cfg: ScopeConfig,
    ctx: Arc<Contexts>,
    shutdown: CancellationToken,
}

impl Scope {
    /// Starts building a scope with the given configuration.
    pub fn builder(cfg: ScopeConfig) -> ScopeBuilder {
        ScopeBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: ScopeConfig, ctx: Arc<Contexts>, shutdown: CancellationToken) -> Self {
        Self { cfg, ctx, shutdown }
    }

    /// The configuration this scope was built with.
    pub fn config(&self) -> &ScopeConfig {
        &self.cfg
    }

    /// The interactive context continuations run on.
    pub fn interactive(&self) -> &Interactive {
        &self.ctx.interactive
    }

    /// Receiver for runtime events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.ctx.bus.subscribe()
    }

    /// Creates a not-started task that is not bound to any host.
    pub fn lazy<T, F, Fut>(&self, work: F) -> Deferred<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Deferred::lazy(Arc::clone(&self.ctx), WorkFn::boxed(work))
    }

    /// Scopes `work` to `owner`, cancelled on the configured default event
    /// ([`ScopeConfig::until`]).
    pub fn load<T, F, Fut>(&self, owner: &Arc<LifecycleOwner>, work: F) -> Result<Deferred<T>, ScopeError>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        self.load_until(owner, self.cfg.until, work)
    }

    /// Scopes `work` to `owner`, cancelled when `owner` emits `until`.
    ///
    /// Fails with [`ScopeError::UnsupportedEvent`] (before anything is created
    /// or registered) if the termination policy rejects `until`. If `owner` is
    /// already destroyed, the task is returned cancelled and nothing is registered.
    pub fn load_until<T, F, Fut>(
        &self,
        owner: &Arc<LifecycleOwner>,
        until: LifecycleEvent,
        work: F,
    ) -> Result<Deferred<T>, ScopeError>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        self.cfg.policy.check(until)?;

        let task = self.lazy(work);
        if owner.is_destroyed() {
            tracing::debug!(task = %task.id(), host = owner.name(), "host already destroyed; task cancelled");
            task.cancel();
            return Ok(task);
        }
        self.bind(owner, Trigger::Event(until), &task);
        Ok(task)
    }

    /// Scopes `work` to `view`, cancelled when the view is detached.
    pub fn load_on<T, F, Fut>(&self, view: &Arc<ViewHost>, work: F) -> Deferred<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let task = self.lazy(work);
        self.bind(view, Trigger::Detach, &task);
        task
    }

    /// Registers the cancellation observer and its completion-time cleanup.
    fn bind<S, T>(&self, source: &Arc<S>, trigger: Trigger, task: &Deferred<T>) -> ObserverId
    where
        S: SignalSource,
        T: Send + 'static,
    {
        let source: Arc<dyn SignalSource> = source.clone();
        let host: Arc<str> = source.name().into();
        let bus = self.ctx.bus.clone();

        let observer = Arc::new(CancelObserver::new(
            trigger,
            Arc::new(task.clone()),
            Arc::clone(&host),
            bus.clone(),
        ));
        let fired = Arc::downgrade(&observer);
        let id = source.add_observer(observer);

        let weak = Arc::downgrade(&source);
        let task_id = task.id();
        let detach_host = Arc::clone(&host);
        let detach_bus = bus.clone();
        task.on_done(move |_| {
            let Some(source) = weak.upgrade() else {
                return;
            };
            let by_signal = fired.upgrade().is_some_and(|o| o.has_fired());
            if source.remove_observer(id) && !by_signal {
                tracing::trace!(task = %task_id, host = %detach_host, observer = %id, "task finished first; observer detached");
                detach_bus.publish(
                    Event::new(EventKind::ObserverDetached)
                        .with_task(task_id)
                        .with_host(detach_host),
                );
            }
        });

        tracing::debug!(task = %task_id, host = %host, observer = %id, signal = %trigger.signal(), "task scoped to host");
        bus.publish(
            Event::new(EventKind::TaskScoped)
                .with_task(task_id)
                .with_host(host)
                .with_signal(trigger.signal()),
        );
        id
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
