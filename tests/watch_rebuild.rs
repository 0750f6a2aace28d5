// tests/watch_rebuild.rs

use std::error::Error;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, sleep};

use assetflow::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use assetflow::exec::RealExecutorBackend;
use assetflow::server::{Notifier, serve_until};
use assetflow::tasks::run_task;
use assetflow::types::{Reload, TaskKind};
use assetflow::watch::{build_profiles, spawn_watcher};
use assetflow_test_utils::{ProjectBuilder, RecordingNotifier, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const SETTLE: Duration = Duration::from_millis(100);

#[tokio::test]
async fn editing_a_stylesheet_rebuilds_it_and_pushes_a_styles_reload() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .file("scss/main.scss", "body { color: #123456; }\n")
        .build();
    let ctx = project.context();
    assert!(run_task(&ctx, TaskKind::Styles).is_success());
    assert!(project.read_string("dist/css/main.css").contains("#123456"));

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher = spawn_watcher(
        ctx.root(),
        ctx.config().output_root(),
        build_profiles(ctx.config())?,
        SETTLE,
        Arc::clone(ctx.fs_arc()),
        tx.clone(),
    )?;

    let notifier = RecordingNotifier::new();
    let shared: Arc<dyn Notifier> = Arc::new(notifier.clone());
    let executor = RealExecutorBackend::new(ctx.clone(), tx);
    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let runtime = tokio::spawn(Runtime::new(core, rx, executor, shared).run());

    // Output writes and unrelated files must not trigger anything.
    project.write("dist/css/other.css", "a{}");
    project.write("notes.txt", "todo");
    sleep(SETTLE * 3).await;
    assert!(notifier.sent().is_empty());

    project.write("scss/main.scss", "body { color: #654321; }\n");

    with_timeout(runtime).await??;
    assert_eq!(notifier.sent(), vec![Reload::Styles]);
    let css = project.read_string("dist/css/main.css");
    assert!(css.contains("#654321"), "{css}");
    Ok(())
}

#[tokio::test]
async fn serving_rebuilds_on_change_and_stops_on_request() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .file("js/main.js", "console.log('one');\n")
        .build();
    let ctx = project.context_on_free_port();
    assert!(run_task(&ctx, TaskKind::Scripts).is_success());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_until(ctx, async move {
        let _ = stop_rx.await;
    }));

    // Give the watcher time to register before editing.
    sleep(SETTLE * 3).await;
    project.write("js/main.js", "console.log('two');\n");

    with_timeout(async {
        while !project.read_string("dist/js/main.min.js").contains("two") {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    let _ = stop_tx.send(());
    with_timeout(server).await??;
    Ok(())
}
