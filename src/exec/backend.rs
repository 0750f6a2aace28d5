// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of running tasks
//! itself, so tests can swap in a fake that records dispatches and reports
//! completion immediately.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::warn;

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::tasks::{BuildContext, run_task_async};
use crate::types::TaskKind;

/// How dispatched tasks get executed.
pub trait ExecutorBackend: Send {
    /// Start the given tasks. Implementations must eventually send one
    /// `RuntimeEvent::TaskCompleted` per task.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<TaskKind>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs each task on the blocking pool and reports back over the runtime
/// channel.
pub struct RealExecutorBackend {
    ctx: BuildContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    pub fn new(ctx: BuildContext, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ctx, runtime_tx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<TaskKind>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for task in tasks {
                let ctx = self.ctx.clone();
                let tx = self.runtime_tx.clone();
                tokio::spawn(async move {
                    let report = run_task_async(ctx, task).await;
                    if tx.send(RuntimeEvent::TaskCompleted { report }).await.is_err() {
                        warn!(%task, "runtime gone; dropping task report");
                    }
                });
            }
            Ok(())
        })
    }
}
