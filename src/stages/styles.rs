// src/stages/styles.rs

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{FileRecord, Rename, Stage};

/// Compile an SCSS entry into compressed CSS.
///
/// `@use`/`@import` resolve relative to the entry's own directory.
#[derive(Debug, Clone, Default)]
pub struct StyleCompile;

impl StyleCompile {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, record: &FileRecord) -> Result<String> {
        let source = std::str::from_utf8(&record.contents)
            .map_err(|e| AssetflowError::stage(self.name(), &record.path, e.to_string()))?;

        let load_path = record
            .origin
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        let options = grass::Options::default()
            .style(grass::OutputStyle::Compressed)
            .load_path(&load_path);

        grass::from_string(source.to_owned(), &options)
            .map_err(|e| AssetflowError::stage(self.name(), &record.path, e.to_string()))
    }
}

impl Stage for StyleCompile {
    fn name(&self) -> &'static str {
        "style-compile"
    }

    fn apply(&self, record: FileRecord) -> Result<FileRecord> {
        let css = self.compile(&record)?;
        let mut record = record.renamed(&Rename::extension("css"));
        record.contents = css.into_bytes();
        Ok(record)
    }
}
