// src/engine/mod.rs

//! Watch-mode orchestration.
//!
//! While serving, tasks are re-run in response to events:
//! - file-watch triggers (one per affected task)
//! - task completion reports
//! - shutdown signals
//!
//! The pure state machine lives in [`core`]; the async/IO shell that reads
//! events, dispatches tasks and pushes reload notifications is in
//! [`runtime`].

use crate::tasks::TaskReport;
use crate::types::TaskKind;

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// A watched input changed.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once no task is running or queued.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, executor and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskKind,
        reason: TriggerReason,
    },
    TaskCompleted {
        report: TaskReport,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
