// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use assetflow::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use assetflow::server::Notifier;
use assetflow::types::{Reload, TaskKind};
use assetflow_test_utils::{FakeExecutor, RecordingNotifier, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn trigger(task: TaskKind) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task,
        reason: TriggerReason::FileWatch,
    }
}

fn runtime(
    written: usize,
) -> (
    mpsc::Sender<RuntimeEvent>,
    Runtime<FakeExecutor>,
    Arc<Mutex<Vec<TaskKind>>>,
    RecordingNotifier,
) {
    let (tx, rx) = mpsc::channel(32);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed)).writing(written);
    let notifier = RecordingNotifier::new();
    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let shared: Arc<dyn Notifier> = Arc::new(notifier.clone());
    (tx, Runtime::new(core, rx, executor, shared), executed, notifier)
}

#[tokio::test]
async fn a_styles_change_pushes_a_styles_reload() -> TestResult {
    init_tracing();
    let (tx, runtime, executed, notifier) = runtime(1);

    tx.send(trigger(TaskKind::Styles)).await?;
    with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec![TaskKind::Styles]);
    assert_eq!(notifier.sent(), vec![Reload::Styles]);
    Ok(())
}

#[tokio::test]
async fn other_tasks_push_a_page_reload() -> TestResult {
    let (tx, runtime, _executed, notifier) = runtime(3);

    tx.send(trigger(TaskKind::Html)).await?;
    with_timeout(runtime.run()).await?;

    assert_eq!(notifier.sent(), vec![Reload::Page]);
    Ok(())
}

#[tokio::test]
async fn a_run_that_wrote_nothing_stays_silent() -> TestResult {
    let (tx, runtime, executed, notifier) = runtime(0);

    tx.send(trigger(TaskKind::Fonts)).await?;
    with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec![TaskKind::Fonts]);
    assert!(notifier.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn triggers_during_a_run_collapse_into_one_rerun() -> TestResult {
    let (tx, runtime, executed, notifier) = runtime(1);

    // All three triggers are queued before the first completion report.
    for _ in 0..3 {
        tx.send(trigger(TaskKind::Scripts)).await?;
    }
    with_timeout(runtime.run()).await?;

    assert_eq!(*executed.lock().unwrap(), vec![TaskKind::Scripts, TaskKind::Scripts]);
    assert_eq!(notifier.sent(), vec![Reload::Page, Reload::Page]);
    Ok(())
}

#[tokio::test]
async fn shutdown_stops_the_runtime() -> TestResult {
    let (tx, rx) = mpsc::channel(8);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));
    let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::new());
    let runtime = Runtime::new(CoreRuntime::new(RuntimeOptions::default()), rx, executor, notifier);

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime.run()).await?;

    assert!(executed.lock().unwrap().is_empty());
    Ok(())
}
