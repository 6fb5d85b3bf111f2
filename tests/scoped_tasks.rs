use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use lifescope::{
    EventKind, Interactive, LifecycleEvent, LifecycleOwner, Scope, ScopeConfig, ScopeError,
    SignalSource, TaskError, TaskState, TerminationPolicy, Unhandled, ViewHost,
};
use tokio_util::sync::CancellationToken;

fn scope_with(cfg: ScopeConfig) -> Scope {
    let (ui, ui_loop) = Interactive::channel();
    tokio::spawn(ui_loop.run());
    Scope::builder(cfg).with_interactive(ui).build()
}

fn scope() -> Scope {
    scope_with(ScopeConfig::default())
}

async fn slow(delay: Duration, value: u32) -> Result<u32, TaskError> {
    tokio::time::sleep(delay).await;
    Ok(value)
}

#[tokio::test]
async fn value_continues_on_the_interactive_context() {
    let scope = scope();
    let owner = LifecycleOwner::new("main-activity");
    owner.emit(LifecycleEvent::Create);

    let ui = scope.interactive().clone();
    let on_ui = Arc::new(AtomicBool::new(false));
    let seen = on_ui.clone();

    let next = scope
        .load(&owner, |_ctx: CancellationToken| async { Ok::<_, TaskError>(42) })
        .unwrap()
        .then(move |x| {
            seen.store(ui.is_current(), Ordering::SeqCst);
            x + 1
        });

    assert_eq!(next.join().await, Ok(43));
    assert!(on_ui.load(Ordering::SeqCst));
    assert_eq!(owner.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn destroy_cancels_running_work_and_skips_the_continuation() {
    let scope = scope();
    let owner = LifecycleOwner::new("main-activity");
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();

    let task = scope
        .load(&owner, |_ctx: CancellationToken| slow(Duration::from_secs(3), 7))
        .unwrap();
    let next = task.then(move |_| flag.store(true, Ordering::SeqCst));
    assert_eq!(task.state(), TaskState::Running);

    tokio::time::sleep(Duration::from_secs(1)).await;
    owner.emit(LifecycleEvent::Destroy);

    assert_eq!(task.state(), TaskState::Cancelled);
    assert_eq!(next.join().await, Err(TaskError::Canceled));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!called.load(Ordering::SeqCst));
    assert_eq!(owner.observer_count(), 0);
}

#[tokio::test]
async fn failure_reaches_on_complete_and_is_carried_by_then() {
    let scope = scope();
    let owner = LifecycleOwner::new("main-activity");
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let mapped = Arc::new(AtomicBool::new(false));
    let flag = mapped.clone();

    let next = scope
        .load(&owner, |_ctx: CancellationToken| async {
            Err::<u32, _>(TaskError::fail("network down"))
        })
        .unwrap()
        .on_complete(move |err| *sink.lock().unwrap() = err.cloned())
        .then(move |v| {
            flag.store(true, Ordering::SeqCst);
            v
        });

    let err = next.join().await.unwrap_err();
    assert_eq!(err, TaskError::fail("network down"));
    assert_eq!(*seen.lock().unwrap(), Some(TaskError::fail("network down")));
    assert!(!mapped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn then_or_raise_reports_failures_to_the_error_handler() {
    let raised = Arc::new(Mutex::new(Vec::new()));
    let sink = raised.clone();
    let (ui, ui_loop) = Interactive::with_error_handler(Arc::new(move |err: &Unhandled| {
        sink.lock().unwrap().push(err.clone());
    }));
    tokio::spawn(ui_loop.run());
    let scope = Scope::builder(ScopeConfig::default()).with_interactive(ui).build();
    let owner = LifecycleOwner::new("main-activity");

    let done = scope
        .load(&owner, |_ctx: CancellationToken| async {
            Err::<u32, _>(TaskError::fail("boom"))
        })
        .unwrap()
        .then_or_raise(|_| {});
    assert!(done.join().await.is_err());

    let raised = raised.lock().unwrap();
    assert_eq!(raised.len(), 1);
    assert!(matches!(&raised[0], Unhandled::Failure(e) if e.as_label() == "task_failed"));
}

#[tokio::test]
async fn unsupported_event_leaves_the_host_untouched() {
    let scope = scope();
    let owner = LifecycleOwner::new("main-activity");

    for ev in [LifecycleEvent::Create, LifecycleEvent::Start, LifecycleEvent::Resume] {
        let err = scope
            .load_until(&owner, ev, |_ctx: CancellationToken| slow(Duration::ZERO, 1))
            .unwrap_err();
        let (event, allowed) = match err {
            ScopeError::UnsupportedEvent { event, allowed } => (event, allowed),
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(event, ev);
        assert_eq!(
            allowed,
            vec![LifecycleEvent::Pause, LifecycleEvent::Stop, LifecycleEvent::Destroy]
        );
    }
    assert_eq!(owner.observer_count(), 0);
}

#[tokio::test]
async fn permissive_policy_accepts_create() {
    let scope = scope_with(ScopeConfig {
        policy: TerminationPolicy::Any,
        ..ScopeConfig::default()
    });
    let owner = LifecycleOwner::new("main-activity");

    let task = scope
        .load_until(&owner, LifecycleEvent::Create, |_ctx: CancellationToken| {
            slow(Duration::from_secs(60), 1)
        })
        .unwrap();
    owner.emit(LifecycleEvent::Create);
    assert!(task.is_cancelled());
}

#[tokio::test]
async fn completed_tasks_leave_no_observers_behind() {
    let scope = scope();
    let owner = LifecycleOwner::new("main-activity");
    let view = ViewHost::new("avatar");
    view.attach();

    let mut tasks = Vec::new();
    for i in 0..5 {
        tasks.push(
            scope
                .load(&owner, move |_ctx: CancellationToken| slow(Duration::from_millis(5), i))
                .unwrap(),
        );
    }
    let on_view = scope.load_on(&view, |_ctx: CancellationToken| slow(Duration::ZERO, 9));
    assert_eq!(owner.observer_count(), 5);
    assert_eq!(view.observer_count(), 1);

    for (i, t) in tasks.iter().enumerate() {
        assert_eq!(t.join().await, Ok(i as u32));
    }
    assert_eq!(on_view.join().await, Ok(9));

    assert_eq!(owner.observer_count(), 0);
    assert_eq!(view.observer_count(), 0);
}

#[tokio::test]
async fn cancel_is_idempotent_and_never_runs_the_body() {
    let scope = scope();
    let owner = LifecycleOwner::new("main-activity");
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();

    let task = scope
        .load(&owner, move |_ctx: CancellationToken| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TaskError>(())
        })
        .unwrap();

    assert!(task.cancel());
    assert!(!task.cancel());
    assert!(!task.start());
    assert_eq!(task.join().await, Err(TaskError::Canceled));

    owner.emit(LifecycleEvent::Destroy);
    tokio::task::yield_now().await;
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(owner.observer_count(), 0);
}

#[tokio::test]
async fn early_detach_cancels_the_view_task() {
    let scope = scope();
    let view = ViewHost::new("custom-view");
    view.attach();
    let mut events = scope.subscribe();

    let task = scope.load_on(&view, |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Ok::<_, TaskError>("never")
    });
    task.start();
    view.detach();

    assert_eq!(task.join().await, Err(TaskError::Canceled));

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::TaskScoped,
            EventKind::TaskStarted,
            EventKind::TaskCancelled,
            EventKind::ObserverFired,
        ]
    );
}
