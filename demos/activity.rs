//! # Example: activity
//!
//! A screen and a custom view, each loading data in the background.
//!
//! Demonstrates how to:
//! - Scope a task to a [`LifecycleOwner`] with [`Scope::load`] and continue on the
//!   interactive context with [`Deferred::on_complete`] and [`Deferred::then`].
//! - Scope a task to a [`ViewHost`] with [`Scope::load_on`] and watch it get
//!   cancelled when the view is detached early.
//! - Render runtime events through [`LogWriter`].
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► screen: Create ─► load(sleep 1s → 100) ─► on_complete ─► then(render)
//!   ├─► view: attach ─► load_on(sleep 3s → "avatar.png") ─► then(render)
//!   ├─► t=1s  screen task completes ─► continuation on the UI loop
//!   ├─► t=1.5s view detached ─► task cancelled, continuation never runs
//!   └─► screen: Destroy (nothing left to cancel)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example activity --features logging
//! ```

use std::{sync::Arc, time::Duration};

use lifescope::{
    Interactive, LifecycleEvent, LifecycleOwner, LogWriter, Scope, ScopeConfig, SignalSource,
    Subscribe, TaskError, ViewHost,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Interactive context on its own OS thread
    let (ui, ui_thread) = Interactive::spawn_thread("ui")?;

    // 2. Scope with a log subscriber
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let scope = Scope::builder(ScopeConfig::default())
        .with_interactive(ui)
        .with_subscribers(subs)
        .build();

    // 3. Screen: load until destroyed
    let screen = LifecycleOwner::new("main-activity");
    screen.emit(LifecycleEvent::Create);
    screen.emit(LifecycleEvent::Start);
    screen.emit(LifecycleEvent::Resume);

    let count = scope
        .load(&screen, |_ctx: CancellationToken| async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, TaskError>(100)
        })?
        .on_complete(|err| {
            if let Some(err) = err {
                tracing::warn!(error = %err, "[main-activity] load failed");
            }
        })
        .then(|v| {
            tracing::info!("[main-activity] rendering {v} items");
            v
        });

    // 4. View: load until detached, then detach before the work is done
    let avatar = ViewHost::new("custom-view");
    avatar.attach();

    let image = scope
        .load_on(&avatar, |ctx: CancellationToken| async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(3)) => Ok("avatar.png"),
                _ = ctx.cancelled() => Err(TaskError::Canceled),
            }
        })
        .then(|path| tracing::info!("[custom-view] showing {path}"));
    image.start();

    tracing::info!("[main] screen result: {:?}", count.join().await);

    tokio::time::sleep(Duration::from_millis(500)).await;
    avatar.detach();
    tracing::info!("[main] view task: {}", image.state().as_label());

    screen.emit(LifecycleEvent::Pause);
    screen.emit(LifecycleEvent::Stop);
    screen.emit(LifecycleEvent::Destroy);
    tracing::info!(observers = screen.observer_count(), "[main] screen destroyed");

    // 5. Let subscribers drain, then close the UI thread
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(count);
    drop(image);
    drop(scope);
    if ui_thread.join().is_err() {
        tracing::error!("[main] ui thread panicked");
    }
    Ok(())
}
