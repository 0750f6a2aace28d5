// src/watch/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::hash::compute_file_hash;

/// Last seen content hash per watched file.
///
/// Editors often emit several events for one save, or rewrite a file with
/// identical bytes; only real content changes should trigger a rebuild.
#[derive(Debug, Default)]
pub struct FileCache {
    hashes: HashMap<PathBuf, String>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current content of `path` and report whether it differs
    /// from what was last recorded.
    ///
    /// A file seen for the first time counts as changed. A file that can no
    /// longer be read (deleted, renamed away) counts as changed and is
    /// forgotten.
    pub fn refresh(&mut self, fs: &dyn FileSystem, path: &Path) -> bool {
        let hash = match compute_file_hash(fs, path) {
            Ok(hash) => hash,
            Err(_) => {
                debug!(path = ?path, "unreadable; treating as removed");
                self.hashes.remove(path);
                return true;
            }
        };

        match self.hashes.insert(path.to_path_buf(), hash) {
            Some(previous) => {
                let changed = self.hashes.get(path) != Some(&previous);
                if !changed {
                    debug!(path = ?path, "content unchanged");
                }
                changed
            }
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn only_content_changes_count() {
        let fs = MockFileSystem::new();
        let path = Path::new("/p/scss/main.scss");
        fs.add_file(path, b"a{}".to_vec());
        let mut cache = FileCache::new();

        assert!(cache.refresh(&fs, path));
        assert!(!cache.refresh(&fs, path));

        fs.add_file(path, b"a{}".to_vec());
        assert!(!cache.refresh(&fs, path), "same bytes rewritten");

        fs.add_file(path, b"b{}".to_vec());
        assert!(cache.refresh(&fs, path));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn removal_counts_as_a_change() {
        let fs = MockFileSystem::new();
        let path = Path::new("/p/js/main.js");
        fs.add_file(path, b"1".to_vec());
        let mut cache = FileCache::new();
        cache.refresh(&fs, path);

        fs.remove_dir_all(path).unwrap();
        assert!(cache.refresh(&fs, path));
        assert!(cache.is_empty());
    }
}
