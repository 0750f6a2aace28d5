// src/graph/mod.rs

//! Task graph runner.
//!
//! A plan is a tree of [`Step`]s composed with two combinators:
//! - [`Step::Sequence`] runs children in order, each finishing before the
//!   next starts;
//! - [`Step::Parallel`] starts all children together and awaits them jointly.
//!
//! The runner never stops on a task failure: failures are counted in the
//! returned [`TaskReport`]s and siblings keep running.

pub mod clean;
pub mod host;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::tasks::TaskReport;
use crate::types::TaskKind;

pub use clean::clean_output;
pub use host::BuildHost;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Node of a build plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Remove the whole output tree.
    Clean,
    Task(TaskKind),
    /// Serve the output and rebuild on change. Resolves only at shutdown.
    Serve,
    Sequence(Vec<Step>),
    Parallel(Vec<Step>),
}

impl Step {
    /// All tasks reachable from this step, in plan order.
    pub fn tasks(&self) -> Vec<TaskKind> {
        match self {
            Step::Task(kind) => vec![*kind],
            Step::Sequence(children) | Step::Parallel(children) => {
                children.iter().flat_map(Step::tasks).collect()
            }
            Step::Clean | Step::Serve => Vec::new(),
        }
    }

    /// Whether the plan ends up in the long-lived serve state.
    pub fn serves(&self) -> bool {
        match self {
            Step::Serve => true,
            Step::Sequence(children) | Step::Parallel(children) => children.iter().any(Step::serves),
            Step::Clean | Step::Task(_) => false,
        }
    }
}

/// `clean → parallel(all tasks)`.
pub fn build_plan() -> Step {
    Step::Sequence(vec![
        Step::Clean,
        Step::Parallel(TaskKind::ALL.iter().copied().map(Step::Task).collect()),
    ])
}

/// `clean → parallel(all tasks) → serve`.
pub fn default_plan() -> Step {
    Step::Sequence(vec![
        Step::Clean,
        Step::Parallel(TaskKind::ALL.iter().copied().map(Step::Task).collect()),
        Step::Serve,
    ])
}

/// What the runner needs from the outside world.
///
/// [`BuildHost`] is the production implementation; tests record calls.
pub trait TaskHost: Send + Sync {
    fn clean(&self) -> BoxFuture<'_, anyhow::Result<()>>;

    fn run_task(&self, kind: TaskKind) -> BoxFuture<'_, TaskReport>;

    fn serve(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Execute a plan, returning the report of every task it ran.
///
/// Only a failing `serve` is an error; a failing `clean` is logged and the
/// plan proceeds.
pub fn run_step(host: Arc<dyn TaskHost>, step: Step) -> BoxFuture<'static, anyhow::Result<Vec<TaskReport>>> {
    Box::pin(async move {
        match step {
            Step::Clean => {
                if let Err(err) = host.clean().await {
                    warn!(error = %err, "clean failed; continuing with stale output");
                }
                Ok(Vec::new())
            }
            Step::Task(kind) => Ok(vec![host.run_task(kind).await]),
            Step::Serve => {
                host.serve().await?;
                Ok(Vec::new())
            }
            Step::Sequence(children) => {
                let mut reports = Vec::new();
                for child in children {
                    reports.extend(run_step(Arc::clone(&host), child).await?);
                }
                Ok(reports)
            }
            Step::Parallel(children) => {
                debug!(count = children.len(), "starting parallel steps");
                let mut set = JoinSet::new();
                for child in children {
                    set.spawn(run_step(Arc::clone(&host), child));
                }

                let mut reports = Vec::new();
                let mut first_err = None;
                while let Some(joined) = set.join_next().await {
                    match joined {
                        Ok(Ok(child_reports)) => reports.extend(child_reports),
                        Ok(Err(err)) => {
                            first_err.get_or_insert(err);
                        }
                        Err(err) => {
                            first_err.get_or_insert(anyhow::Error::from(err));
                        }
                    }
                }
                match first_err {
                    Some(err) => Err(err),
                    None => Ok(reports),
                }
            }
        }
    })
}
