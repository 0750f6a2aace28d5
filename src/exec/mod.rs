// src/exec/mod.rs

//! Task execution layer for watch mode.
//!
//! [`backend`] provides the `ExecutorBackend` trait the runtime dispatches
//! through, and `RealExecutorBackend`, which runs tasks with
//! [`crate::tasks::run_task_async`] and reports each [`crate::tasks::TaskReport`]
//! back as a `RuntimeEvent::TaskCompleted`.

pub mod backend;

pub use backend::{ExecutorBackend, RealExecutorBackend};
