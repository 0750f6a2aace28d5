// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TriggerReason};
use crate::tasks::TaskReport;
use crate::types::{Reload, TaskKind};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start these tasks.
    DispatchTasks(Vec<TaskKind>),
    /// Tell connected browsers to refresh.
    Notify(Reload),
    /// Request that the process exits (idle in `exit_when_idle` mode).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// A triggered task starts immediately unless it is already running, in
/// which case it is queued for exactly one rerun.
pub fn handle_task_trigger(
    running: &mut BTreeSet<TaskKind>,
    queue: &mut TriggerQueue,
    task: TaskKind,
    reason: TriggerReason,
) -> CoreStep {
    if running.contains(&task) {
        debug!(%task, ?reason, "task already running; queued rerun");
        queue.record_trigger(task);
        return CoreStep::continue_with(Vec::new());
    }

    running.insert(task);
    CoreStep::continue_with(vec![CoreCommand::DispatchTasks(vec![task])])
}

/// A completed task notifies browsers if it wrote anything, then starts its
/// queued rerun, if any.
pub fn handle_task_completion(
    running: &mut BTreeSet<TaskKind>,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    report: TaskReport,
) -> CoreStep {
    let task = report.task;
    let mut commands = Vec::new();

    running.remove(&task);
    if report.written > 0 {
        commands.push(CoreCommand::Notify(task.reload()));
    }

    if queue.take(task) {
        running.insert(task);
        commands.push(CoreCommand::DispatchTasks(vec![task]));
    }

    let mut keep_running = true;
    if options.exit_when_idle && running.is_empty() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
