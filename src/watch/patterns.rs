// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::types::TaskKind;

/// Compiled watch globs for a single task.
///
/// Patterns are relative to the project root; [`TaskWatchProfile::matches`]
/// takes a root-relative path with forward slashes (e.g. `"scss/_nav.scss"`).
#[derive(Clone)]
pub struct TaskWatchProfile {
    task: TaskKind,
    watch_set: GlobSet,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn new(task: TaskKind, patterns: &[String]) -> Result<Self> {
        let watch_set = build_globset(patterns)
            .with_context(|| format!("building watch globset for task {task}"))?;
        Ok(Self { task, watch_set })
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path)
    }
}

/// One profile per task, from each task's effective `watch` list.
pub fn build_profiles(cfg: &ConfigFile) -> Result<Vec<TaskWatchProfile>> {
    cfg.paths()
        .iter()
        .map(|(task, paths)| TaskWatchProfile::new(task, &paths.watch))
        .collect()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
