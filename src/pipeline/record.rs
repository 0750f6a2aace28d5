// src/pipeline/record.rs

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::Result;
use crate::pipeline::Stage;

/// One file flowing through a pipeline.
///
/// `path` is relative to the source pattern's base directory and becomes the
/// output path relative to the task destination. Stages may rewrite both
/// `path` and `contents`; `modified` always carries the source timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub modified: SystemTime,
    /// Where the bytes were read from (used for import resolution).
    pub origin: PathBuf,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>, modified: SystemTime) -> Self {
        let path = path.into();
        Self {
            origin: path.clone(),
            path,
            contents: contents.into(),
            modified,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Lower-cased extension of the current path.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn renamed(mut self, rename: &Rename) -> Self {
        self.path = rename.apply(&self.path);
        self
    }
}

/// Output path rewrite applied by a stage: optional suffix before the
/// extension, optional extension swap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rename {
    suffix: Option<String>,
    extension: Option<String>,
}

impl Rename {
    /// Keep the path as is.
    pub fn identity() -> Self {
        Self::default()
    }

    /// `photo.jpg` -> `photo.<ext>`.
    pub fn extension(ext: impl Into<String>) -> Self {
        Self {
            suffix: None,
            extension: Some(ext.into()),
        }
    }

    /// `main.js` -> `main<suffix>.js`.
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: Some(suffix.into()),
            extension: None,
        }
    }

    pub fn apply(&self, path: &Path) -> PathBuf {
        if self.suffix.is_none() && self.extension.is_none() {
            return path.to_path_buf();
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = match &self.extension {
            Some(ext) => Some(ext.clone()),
            None => path
                .extension()
                .map(|e| e.to_string_lossy().into_owned()),
        };

        let mut name = stem;
        if let Some(suffix) = &self.suffix {
            name.push_str(suffix);
        }
        if let Some(ext) = ext {
            name.push('.');
            name.push_str(&ext);
        }
        path.with_file_name(name)
    }
}

impl Stage for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, record: FileRecord) -> Result<FileRecord> {
        Ok(record.renamed(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_swaps_extension_and_keeps_directories() {
        let r = Rename::extension("avif");
        assert_eq!(r.apply(Path::new("gallery/photo.jpg")), PathBuf::from("gallery/photo.avif"));
    }

    #[test]
    fn rename_injects_suffix_before_extension() {
        let r = Rename::suffix(".min");
        assert_eq!(r.apply(Path::new("main.js")), PathBuf::from("main.min.js"));
        assert_eq!(r.apply(Path::new("LICENSE")), PathBuf::from("LICENSE.min"));
    }

    #[test]
    fn identity_leaves_path_untouched() {
        assert_eq!(
            Rename::identity().apply(Path::new("icons/logo.svg")),
            PathBuf::from("icons/logo.svg")
        );
    }
}
