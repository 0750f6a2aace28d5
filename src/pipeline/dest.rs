// src/pipeline/dest.rs

use std::path::PathBuf;

use anyhow::Result;

use crate::fs::FileSystem;
use crate::pipeline::record::FileRecord;

/// When a [`Destination`] actually touches the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Always write. Used behind a staleness filter, where refreshing the
    /// output timestamp is what keeps the next run from redoing the work.
    Always,
    /// Skip the write when the file already holds identical bytes.
    IfChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    Unchanged(PathBuf),
}

/// Output directory of one pipeline pass.
#[derive(Debug, Clone)]
pub struct Destination {
    dir: PathBuf,
    mode: WriteMode,
}

impl Destination {
    pub fn new(dir: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    pub fn write(&self, fs: &dyn FileSystem, record: &FileRecord) -> Result<WriteOutcome> {
        let target = self.dir.join(&record.path);

        if self.mode == WriteMode::IfChanged && fs.is_file(&target) {
            if let Ok(existing) = fs.read(&target) {
                if existing == record.contents {
                    return Ok(WriteOutcome::Unchanged(target));
                }
            }
        }

        fs.write(&target, &record.contents)?;
        Ok(WriteOutcome::Written(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::time::UNIX_EPOCH;

    #[test]
    fn if_changed_skips_identical_content() {
        let fs = MockFileSystem::new();
        let dest = Destination::new("/site/dist", WriteMode::IfChanged);
        let rec = FileRecord::new("index.html", b"<p>hi</p>".to_vec(), UNIX_EPOCH);

        assert!(matches!(dest.write(&fs, &rec).unwrap(), WriteOutcome::Written(_)));
        assert!(matches!(dest.write(&fs, &rec).unwrap(), WriteOutcome::Unchanged(_)));
        assert_eq!(fs.writes().len(), 1);

        let changed = FileRecord::new("index.html", b"<p>bye</p>".to_vec(), UNIX_EPOCH);
        assert!(matches!(dest.write(&fs, &changed).unwrap(), WriteOutcome::Written(_)));
    }

    #[test]
    fn always_rewrites() {
        let fs = MockFileSystem::new();
        let dest = Destination::new("/site/dist/image", WriteMode::Always);
        let rec = FileRecord::new("a/logo.svg", b"<svg/>".to_vec(), UNIX_EPOCH);

        dest.write(&fs, &rec).unwrap();
        dest.write(&fs, &rec).unwrap();
        assert_eq!(
            fs.writes(),
            vec![
                PathBuf::from("/site/dist/image/a/logo.svg"),
                PathBuf::from("/site/dist/image/a/logo.svg")
            ]
        );
    }
}
