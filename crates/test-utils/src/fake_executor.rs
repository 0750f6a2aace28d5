// crates/test-utils/src/fake_executor.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use assetflow::engine::RuntimeEvent;
use assetflow::errors::Result;
use assetflow::exec::ExecutorBackend;
use assetflow::server::Notifier;
use assetflow::tasks::TaskReport;
use assetflow::types::{Reload, TaskKind};
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which tasks were dispatched
/// - immediately reports each one as completed with `written` outputs.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<TaskKind>>>,
    written: usize,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<TaskKind>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            written: 1,
        }
    }

    /// Number of files every fake run claims to have written.
    pub fn writing(mut self, written: usize) -> Self {
        self.written = written;
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<TaskKind>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let written = self.written;

        Box::pin(async move {
            for task in tasks {
                executed.lock().unwrap().push(task);

                let report = TaskReport {
                    written,
                    ..TaskReport::new(task)
                };
                tx.send(RuntimeEvent::TaskCompleted { report })
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}

/// Notifier that remembers every reload it was asked to push.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Reload>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Reload> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, reload: Reload) {
        self.sent.lock().unwrap().push(reload);
    }
}
