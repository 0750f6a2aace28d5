// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::server::Notifier;
use crate::types::TaskKind;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Async IO shell around [`CoreRuntime`].
///
/// Reads events from the channel, feeds them to the core and carries out the
/// resulting commands: dispatching tasks to the executor and pushing reload
/// notifications.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    notifier: Arc<dyn Notifier>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            notifier,
        }
    }

    /// Main event loop. Returns when the core asks to stop or every sender
    /// is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");
            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("stopping runtime");
                break;
            }
        }

        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => self.spawn_ready(tasks).await?,
            CoreCommand::Notify(reload) => {
                debug!(event = reload.event_name(), "notifying browsers");
                self.notifier.notify(reload);
            }
            CoreCommand::RequestExit => info!("runtime idle; exit requested"),
        }
        Ok(())
    }

    async fn spawn_ready(&mut self, tasks: Vec<TaskKind>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        debug!(?tasks, "dispatching tasks");
        self.executor.spawn_ready_tasks(tasks).await
    }
}
