// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! Consumes [`RuntimeEvent`]s and produces an updated state plus a list of
//! commands for the IO shell (`engine::runtime::Runtime`), which owns the
//! channels, the executor and the reload notifier.
//!
//! No Tokio, channels, filesystem or servers in here.

use std::collections::BTreeSet;

use crate::engine::event_handlers::{handle_task_completion, handle_task_trigger, CoreStep};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::TaskKind;

#[derive(Debug, Default)]
pub struct CoreRuntime {
    running: BTreeSet<TaskKind>,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            running: BTreeSet::new(),
            queue: TriggerQueue::new(),
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn is_running(&self, task: TaskKind) -> bool {
        self.running.contains(&task)
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.running, &mut self.queue, task, reason)
            }
            RuntimeEvent::TaskCompleted { report } => {
                handle_task_completion(&mut self.running, &mut self.queue, &self.options, report)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CoreCommand, TriggerReason};
    use crate::tasks::TaskReport;
    use crate::types::Reload;

    fn trigger(task: TaskKind) -> RuntimeEvent {
        RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::FileWatch,
        }
    }

    fn completed(task: TaskKind, written: usize) -> RuntimeEvent {
        RuntimeEvent::TaskCompleted {
            report: TaskReport {
                written,
                ..TaskReport::new(task)
            },
        }
    }

    #[test]
    fn trigger_dispatches_an_idle_task() {
        let mut core = CoreRuntime::default();
        let step = core.step(trigger(TaskKind::Html));
        assert_eq!(step.commands, vec![CoreCommand::DispatchTasks(vec![TaskKind::Html])]);
        assert!(core.is_running(TaskKind::Html));
    }

    #[test]
    fn retriggers_while_running_collapse_into_one_rerun() {
        let mut core = CoreRuntime::default();
        core.step(trigger(TaskKind::Styles));
        assert!(core.step(trigger(TaskKind::Styles)).commands.is_empty());
        assert!(core.step(trigger(TaskKind::Styles)).commands.is_empty());

        let step = core.step(completed(TaskKind::Styles, 1));
        assert_eq!(
            step.commands,
            vec![
                CoreCommand::Notify(Reload::Styles),
                CoreCommand::DispatchTasks(vec![TaskKind::Styles]),
            ]
        );

        let step = core.step(completed(TaskKind::Styles, 0));
        assert!(step.commands.is_empty());
        assert!(core.is_idle());
        assert!(core.queue_is_empty());
    }

    #[test]
    fn different_tasks_run_side_by_side() {
        let mut core = CoreRuntime::default();
        core.step(trigger(TaskKind::Html));
        let step = core.step(trigger(TaskKind::Fonts));
        assert_eq!(step.commands, vec![CoreCommand::DispatchTasks(vec![TaskKind::Fonts])]);

        let step = core.step(completed(TaskKind::Fonts, 2));
        assert_eq!(step.commands, vec![CoreCommand::Notify(Reload::Page)]);
        assert!(core.is_running(TaskKind::Html));
    }

    #[test]
    fn exit_when_idle_stops_after_last_completion() {
        let mut core = CoreRuntime::new(RuntimeOptions { exit_when_idle: true });
        core.step(trigger(TaskKind::Svg));
        let step = core.step(completed(TaskKind::Svg, 0));
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = CoreRuntime::default();
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
