// src/pipeline/staleness.rs

//! Skip records whose outputs are already up to date.

use std::path::PathBuf;

use crate::fs::FileSystem;
use crate::pipeline::record::{FileRecord, Rename};

/// Drops records whose derived outputs all exist and are at least as new as
/// the source.
///
/// A record is stale if **any** of its targets is missing or strictly older
/// than the record's source timestamp. A missing destination directory
/// simply means every record is stale.
#[derive(Debug, Clone)]
pub struct StalenessFilter {
    dest: PathBuf,
    targets: Vec<Rename>,
}

impl StalenessFilter {
    /// `dest` is the task destination; `targets` map a record's relative
    /// path to each output it produces there.
    pub fn new(dest: impl Into<PathBuf>, targets: Vec<Rename>) -> Self {
        Self {
            dest: dest.into(),
            targets,
        }
    }

    pub fn is_stale(&self, fs: &dyn FileSystem, record: &FileRecord) -> bool {
        self.targets.iter().any(|target| {
            let out = self.dest.join(target.apply(&record.path));
            match fs.modified(&out) {
                Ok(out_modified) => out_modified < record.modified,
                Err(_) => true,
            }
        })
    }
}
