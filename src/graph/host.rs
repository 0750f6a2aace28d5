// src/graph/host.rs

use crate::graph::{BoxFuture, TaskHost};
use crate::server;
use crate::tasks::{BuildContext, TaskReport, run_task_async};
use crate::types::TaskKind;

/// Production [`TaskHost`]: real tasks, real clean, real dev server.
#[derive(Debug, Clone)]
pub struct BuildHost {
    ctx: BuildContext,
}

impl BuildHost {
    pub fn new(ctx: BuildContext) -> Self {
        Self { ctx }
    }
}

impl TaskHost for BuildHost {
    fn clean(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        let ctx = self.ctx.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || super::clean_output(&ctx)).await?
        })
    }

    fn run_task(&self, kind: TaskKind) -> BoxFuture<'_, TaskReport> {
        Box::pin(run_task_async(self.ctx.clone(), kind))
    }

    fn serve(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(server::serve(self.ctx.clone()))
    }
}
