// src/pipeline/mod.rs

//! File-record pipelines.
//!
//! A pipeline is an ordered list of [`Stage`]s applied to a lazy sequence of
//! [`FileRecord`]s. Each stage is a plain function from one record to one
//! record (or an error for that record only), so composing stages is
//! ordinary function composition and a failing record never stops the rest
//! of the sequence.
//!
//! - [`source`] selects input files by glob.
//! - [`staleness`] drops records whose outputs are up to date.
//! - [`dest`] writes records into a task's output directory.

pub mod dest;
pub mod record;
pub mod source;
pub mod staleness;

pub use dest::{Destination, WriteMode, WriteOutcome};
pub use record::{FileRecord, Rename};
pub use source::{SourceFile, SourceSet};
pub use staleness::StalenessFilter;

use crate::errors::Result;

/// One labelled conversion step.
pub trait Stage: Send + Sync {
    /// Label used in logs and errors.
    fn name(&self) -> &'static str;

    /// Convert one record. An error fails this record only.
    fn apply(&self, record: FileRecord) -> Result<FileRecord>;
}

/// Ordered composition of stages. An empty pipeline copies records through.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn then(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over one record, stopping at the first failure.
    pub fn apply(&self, record: FileRecord) -> Result<FileRecord> {
        self.stages
            .iter()
            .try_fold(record, |record, stage| stage.apply(record))
    }
}
