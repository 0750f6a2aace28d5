// src/stages/scripts.rs

use minify_js::{minify, Session, TopLevelMode};

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{FileRecord, Stage};

/// Minify a JavaScript entry.
///
/// Renaming (`main.js` -> `main.min.js`) is a separate [`Rename`] stage.
///
/// [`Rename`]: crate::pipeline::Rename
#[derive(Debug, Clone, Default)]
pub struct ScriptMinify;

impl ScriptMinify {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for ScriptMinify {
    fn name(&self) -> &'static str {
        "script-minify"
    }

    fn apply(&self, mut record: FileRecord) -> Result<FileRecord> {
        let session = Session::new();
        let mut out = Vec::with_capacity(record.contents.len());
        minify(&session, TopLevelMode::Global, &record.contents, &mut out).map_err(|e| {
            AssetflowError::stage(self.name(), &record.path, format!("{e:?}"))
        })?;
        record.contents = out;
        Ok(record)
    }
}
