// src/pipeline/source.rs

//! Glob-selected input sets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobMatcher};
use tracing::debug;

use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;
use crate::pipeline::record::FileRecord;

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Directory a pattern's matches are made relative to.
///
/// That is the literal prefix before the first component containing a glob
/// metacharacter; a pattern without any is a single file and its base is
/// its parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    match components.iter().position(|c| c.contains(GLOB_META)) {
        Some(idx) => components[..idx].iter().collect(),
        None => components[..components.len().saturating_sub(1)].iter().collect(),
    }
}

#[derive(Debug, Clone)]
struct SourcePattern {
    raw: String,
    base: PathBuf,
    matcher: GlobMatcher,
    literal: bool,
}

/// A file selected by a [`SourceSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub abs: PathBuf,
    /// Path relative to the matching pattern's base.
    pub rel: PathBuf,
}

/// Compiled source patterns of one task.
#[derive(Debug, Clone)]
pub struct SourceSet {
    patterns: Vec<SourcePattern>,
}

impl SourceSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                let glob = Glob::new(raw)
                    .with_context(|| format!("invalid glob pattern: {raw}"))?;
                Ok(SourcePattern {
                    raw: raw.clone(),
                    base: glob_base(raw),
                    matcher: glob.compile_matcher(),
                    literal: !raw.contains(GLOB_META),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Enumerate matching files under `root`, sorted and de-duplicated.
    ///
    /// A glob pattern that matches nothing (or whose base directory is
    /// missing) contributes nothing. A literal pattern naming a missing file
    /// is an error.
    pub fn collect(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<SourceFile>> {
        let mut found: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

        for pattern in &self.patterns {
            if pattern.literal {
                let abs = root.join(&pattern.raw);
                if !fs.is_file(&abs) {
                    return Err(AssetflowError::SourceNotFound(abs));
                }
                let rel = abs
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_default();
                found.entry(abs).or_insert(rel);
                continue;
            }

            let base_dir = root.join(&pattern.base);
            if !fs.is_dir(&base_dir) {
                debug!(pattern = %pattern.raw, base = ?base_dir, "source base missing; nothing to select");
                continue;
            }

            let mut stack = vec![base_dir.clone()];
            while let Some(dir) = stack.pop() {
                for path in fs.read_dir(&dir)? {
                    if fs.is_dir(&path) {
                        stack.push(path);
                        continue;
                    }
                    if !fs.is_file(&path) {
                        continue;
                    }
                    let Ok(from_root) = path.strip_prefix(root) else {
                        continue;
                    };
                    let from_root = from_root.to_string_lossy().replace('\\', "/");
                    if pattern.matcher.is_match(&from_root) {
                        let rel = path
                            .strip_prefix(&base_dir)
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|_| PathBuf::from(&from_root));
                        found.entry(path).or_insert(rel);
                    }
                }
            }
        }

        Ok(found
            .into_iter()
            .map(|(abs, rel)| SourceFile { abs, rel })
            .collect())
    }
}

/// Read one selected file into a [`FileRecord`].
pub fn load(fs: &dyn FileSystem, source: &SourceFile) -> Result<FileRecord> {
    let contents = fs.read(&source.abs)?;
    let modified = fs.modified(&source.abs)?;
    Ok(FileRecord::new(source.rel.clone(), contents, modified).with_origin(source.abs.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn glob_base_stops_at_first_wildcard() {
        assert_eq!(glob_base("page/**/*.html"), PathBuf::from("page"));
        assert_eq!(glob_base("image/src/**/*.{jpg,png}"), PathBuf::from("image/src"));
        assert_eq!(glob_base("scss/main.scss"), PathBuf::from("scss"));
        assert_eq!(glob_base("*.html"), PathBuf::new());
        assert_eq!(glob_base("main.js"), PathBuf::new());
    }

    #[test]
    fn collect_mirrors_structure_below_the_base() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/image/src/photo.jpg", b"a".to_vec());
        fs.add_file("/site/image/src/gallery/sea.PNG", b"b".to_vec());
        fs.add_file("/site/image/src/gallery/beach.png", b"c".to_vec());
        fs.add_file("/site/image/src/icons/logo.svg", b"d".to_vec());

        let set = SourceSet::new(&["image/src/**/*.{jpg,jpeg,png}".to_string()]).unwrap();
        let files = set.collect(&fs, Path::new("/site")).unwrap();

        let rels: Vec<_> = files.iter().map(|f| f.rel.clone()).collect();
        assert_eq!(
            rels,
            vec![PathBuf::from("gallery/beach.png"), PathBuf::from("photo.jpg")]
        );
    }

    #[test]
    fn missing_glob_base_selects_nothing() {
        let fs = MockFileSystem::new();
        let set = SourceSet::new(&["fonts/src/**/*.ttf".to_string()]).unwrap();
        assert!(set.collect(&fs, Path::new("/site")).unwrap().is_empty());
    }

    #[test]
    fn missing_literal_entry_is_an_error() {
        let fs = MockFileSystem::new();
        let set = SourceSet::new(&["scss/main.scss".to_string()]).unwrap();
        match set.collect(&fs, Path::new("/site")) {
            Err(AssetflowError::SourceNotFound(path)) => {
                assert_eq!(path, PathBuf::from("/site/scss/main.scss"))
            }
            other => panic!("expected SourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn literal_entry_is_relative_to_its_directory() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/js/main.js", b"let a = 1;".to_vec());
        let set = SourceSet::new(&["js/main.js".to_string()]).unwrap();

        let files = set.collect(&fs, Path::new("/site")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].rel, PathBuf::from("main.js"));

        let record = load(&fs, &files[0]).unwrap();
        assert_eq!(record.contents, b"let a = 1;");
        assert_eq!(record.origin, PathBuf::from("/site/js/main.js"));
    }
}
