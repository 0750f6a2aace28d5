// src/tasks/mod.rs

//! Tasks: one named unit per [`TaskKind`], built from the configuration.
//!
//! A task is one or more [`spec::Pass`]es. Every failure is contained in the
//! record (or pass) that caused it and counted in the [`TaskReport`]; running
//! a task never returns an error.

pub mod spec;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ConfigFile;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::TaskKind;

pub use spec::{Pass, TaskSpec};

/// Everything a task needs to run: project root, configuration, filesystem.
#[derive(Clone)]
pub struct BuildContext {
    root: PathBuf,
    config: Arc<ConfigFile>,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("output_root", &self.config.output_root())
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, config: ConfigFile, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            config: Arc::new(config),
            fs,
        }
    }

    /// Context on the real filesystem.
    pub fn on_disk(root: impl Into<PathBuf>, config: ConfigFile) -> Self {
        Self::new(root, config, Arc::new(RealFileSystem))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn fs_arc(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Project-relative path to an absolute one.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_root(&self) -> PathBuf {
        self.resolve(self.config.output_root())
    }
}

/// Counts from one task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: TaskKind,
    /// Files written to the destination.
    pub written: usize,
    /// Outputs recomputed but byte-identical to what was on disk.
    pub unchanged: usize,
    /// Sources dropped by a staleness filter.
    pub skipped: usize,
    /// Records (or whole passes) that failed.
    pub failed: usize,
}

impl TaskReport {
    pub fn new(task: TaskKind) -> Self {
        Self {
            task,
            written: 0,
            unchanged: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Report for a task that could not even be assembled.
    fn setup_failed(task: TaskKind) -> Self {
        Self {
            failed: 1,
            ..Self::new(task)
        }
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} written, {} unchanged, {} up to date, {} failed",
            self.task, self.written, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Build and run one task synchronously.
pub fn run_task(ctx: &BuildContext, kind: TaskKind) -> TaskReport {
    let report = match TaskSpec::build(kind, ctx) {
        Ok(spec) => spec.run(ctx),
        Err(err) => {
            error!(task = %kind, error = %err, "task setup failed");
            TaskReport::setup_failed(kind)
        }
    };

    if report.is_success() {
        info!(%report, "task finished");
    } else {
        warn!(%report, "task finished with failures");
    }
    report
}

/// Run one task on the blocking pool.
///
/// Stage delegates (SCSS compiler, AVIF encoder, Brotli) are CPU-bound and
/// synchronous.
pub async fn run_task_async(ctx: BuildContext, kind: TaskKind) -> TaskReport {
    match tokio::task::spawn_blocking(move || run_task(&ctx, kind)).await {
        Ok(report) => report,
        Err(err) => {
            error!(task = %kind, error = %err, "task panicked");
            TaskReport::setup_failed(kind)
        }
    }
}
