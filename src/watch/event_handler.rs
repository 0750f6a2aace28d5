// src/watch/event_handler.rs

//! Turning a settled burst of changed paths into task triggers.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::types::TaskKind;
use crate::watch::cache::FileCache;
use crate::watch::path_utils::{is_within, relative_str};
use crate::watch::patterns::TaskWatchProfile;

/// Decides which tasks a set of changed paths affects.
#[derive(Debug)]
pub struct ChangeFilter {
    root: PathBuf,
    /// Output root, relative to `root`. Changes in here are our own writes.
    output_root: PathBuf,
    profiles: Vec<TaskWatchProfile>,
    cache: FileCache,
}

impl ChangeFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        profiles: Vec<TaskWatchProfile>,
    ) -> Self {
        Self {
            root: root.into(),
            output_root: output_root.into(),
            profiles,
            cache: FileCache::new(),
        }
    }

    /// Tasks to trigger for `paths`, each at most once.
    ///
    /// A path is ignored when it is outside the project, inside the output
    /// root, matched by no task, or unchanged in content since it last
    /// triggered.
    pub fn tasks_for(&mut self, fs: &dyn FileSystem, paths: &[PathBuf]) -> BTreeSet<TaskKind> {
        let mut tasks = BTreeSet::new();

        for path in paths {
            let Some((rel, matching)) = self.watching(path) else {
                continue;
            };

            if !self.cache.refresh(fs, path) {
                debug!(path = %rel, "content unchanged; not triggering");
                continue;
            }

            debug!(path = %rel, ?matching, "watch match");
            tasks.extend(matching);
        }

        tasks
    }

    /// Whether a change at `path` could trigger any task at all.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.watching(path).is_some()
    }

    /// Root-relative form of `path` and the tasks watching it, if any.
    fn watching(&self, path: &Path) -> Option<(String, Vec<TaskKind>)> {
        let Some(rel) = relative_str(&self.root, path) else {
            trace!(path = ?path, "outside project root");
            return None;
        };
        if is_within(&rel, &self.output_root) {
            return None;
        }

        let matching: Vec<TaskKind> = self
            .profiles
            .iter()
            .filter(|p| p.matches(&rel))
            .map(TaskWatchProfile::task)
            .collect();
        if matching.is_empty() {
            return None;
        }
        Some((rel, matching))
    }

    /// Record the current content of every watched file without triggering,
    /// so the first real edit is compared against the state the initial
    /// build saw.
    pub fn prime(&mut self, fs: &dyn FileSystem) -> anyhow::Result<()> {
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                let Some(rel) = relative_str(&self.root, &path) else {
                    continue;
                };
                if is_within(&rel, &self.output_root) {
                    continue;
                }
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if self.profiles.iter().any(|p| p.matches(&rel)) {
                    self.cache.refresh(fs, &path);
                }
            }
        }
        debug!(files = self.cache.len(), "primed watch cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, RawConfigFile};
    use crate::fs::mock::MockFileSystem;
    use crate::watch::patterns::build_profiles;

    fn filter() -> ChangeFilter {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        ChangeFilter::new("/site", cfg.output_root(), build_profiles(&cfg).unwrap())
    }

    #[test]
    fn a_burst_triggers_each_task_once() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/scss/main.scss", b"a{}".to_vec());
        fs.add_file("/site/scss/_nav.scss", b"b{}".to_vec());
        fs.add_file("/site/components/header.html", b"<h1/>".to_vec());

        let tasks = filter().tasks_for(
            &fs,
            &[
                PathBuf::from("/site/scss/main.scss"),
                PathBuf::from("/site/scss/_nav.scss"),
                PathBuf::from("/site/components/header.html"),
            ],
        );
        assert_eq!(tasks.into_iter().collect::<Vec<_>>(), vec![TaskKind::Html, TaskKind::Styles]);
    }

    #[test]
    fn output_and_foreign_paths_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/dist/index.html", b"x".to_vec());
        fs.add_file("/site/notes.txt", b"x".to_vec());

        let tasks = filter().tasks_for(
            &fs,
            &[
                PathBuf::from("/site/dist/index.html"),
                PathBuf::from("/site/notes.txt"),
                PathBuf::from("/tmp/other/page/index.html"),
            ],
        );
        assert!(tasks.is_empty());
    }

    #[test]
    fn only_source_paths_are_watched() {
        let filter = filter();
        assert!(filter.is_watched(Path::new("/site/scss/_nav.scss")));
        assert!(filter.is_watched(Path::new("/site/image/src/logo.svg")));
        assert!(!filter.is_watched(Path::new("/site/dist/css/main.css")));
        assert!(!filter.is_watched(Path::new("/site/build.log")));
        assert!(!filter.is_watched(Path::new("/elsewhere/scss/main.scss")));
    }

    #[test]
    fn identical_rewrites_do_not_retrigger() {
        let fs = MockFileSystem::new();
        let js = PathBuf::from("/site/js/main.js");
        fs.add_file(&js, b"let a = 1;".to_vec());
        fs.add_file("/site/dist/js/main.min.js", b"let a=1".to_vec());
        let mut filter = filter();
        filter.prime(&fs).unwrap();

        assert!(filter.tasks_for(&fs, std::slice::from_ref(&js)).is_empty());

        fs.add_file(&js, b"let a = 2;".to_vec());
        assert_eq!(
            filter.tasks_for(&fs, std::slice::from_ref(&js)).into_iter().collect::<Vec<_>>(),
            vec![TaskKind::Scripts]
        );
    }

    #[test]
    fn deleted_sources_still_trigger() {
        let fs = MockFileSystem::new();
        let tasks = filter().tasks_for(&fs, &[PathBuf::from("/site/image/src/old.png")]);
        assert_eq!(tasks.into_iter().collect::<Vec<_>>(), vec![TaskKind::Images]);
    }
}
