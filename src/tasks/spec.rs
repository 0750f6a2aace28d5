// src/tasks/spec.rs

//! Declarative description of each task: which files, which stages, where to.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::errors::{AssetflowError, Result};
use crate::pipeline::source::load;
use crate::pipeline::{
    Destination, FileRecord, Pipeline, Rename, SourceSet, StalenessFilter, WriteMode,
    WriteOutcome,
};
use crate::stages::images::AVIF_EXTENSION;
use crate::stages::{
    FontConvert, ImageEncode, ScriptMinify, StyleCompile, TemplateInclude, WebFont,
};
use crate::tasks::{BuildContext, TaskReport};
use crate::types::TaskKind;

/// Predicate deciding whether a selected source belongs to a pass.
pub type Accepts = fn(&FileRecord) -> bool;

/// One read → (filter) → stages → write sweep over a task's sources.
#[derive(Debug)]
pub struct Pass {
    pub label: &'static str,
    pub sources: SourceSet,
    pub accepts: Option<Accepts>,
    pub filter: Option<StalenessFilter>,
    pub pipeline: Pipeline,
    pub dest: Destination,
}

impl Pass {
    /// Run this pass, accumulating counts into `report`.
    ///
    /// Sources are read from disk here, so a later pass never sees an
    /// earlier pass's output.
    pub fn run(&self, ctx: &BuildContext, report: &mut TaskReport) {
        let fs = ctx.fs();
        let sources = match self.sources.collect(fs, ctx.root()) {
            Ok(sources) => sources,
            Err(err) => {
                error!(task = %report.task, pass = self.label, error = %err, "cannot select sources");
                report.failed += 1;
                return;
            }
        };

        for source in sources {
            let modified = match fs.modified(&source.abs) {
                Ok(modified) => modified,
                Err(err) => {
                    error!(task = %report.task, path = ?source.abs, error = %err, "cannot stat source");
                    report.failed += 1;
                    continue;
                }
            };
            let candidate = FileRecord::new(source.rel.clone(), Vec::new(), modified);

            if let Some(accepts) = self.accepts {
                if !accepts(&candidate) {
                    continue;
                }
            }
            if let Some(filter) = &self.filter {
                if !filter.is_stale(fs, &candidate) {
                    debug!(task = %report.task, path = ?source.rel, "up to date");
                    report.skipped += 1;
                    continue;
                }
            }

            let outcome = load(fs, &source)
                .and_then(|record| self.pipeline.apply(record))
                .and_then(|record| self.dest.write(fs, &record).map_err(AssetflowError::from));
            match outcome {
                Ok(WriteOutcome::Written(path)) => {
                    debug!(task = %report.task, path = ?path, "wrote");
                    report.written += 1;
                }
                Ok(WriteOutcome::Unchanged(path)) => {
                    debug!(task = %report.task, path = ?path, "unchanged");
                    report.unchanged += 1;
                }
                Err(err) => {
                    warn!(task = %report.task, pass = self.label, error = %err, "record failed");
                    report.failed += 1;
                }
            }
        }
    }
}

/// All passes of one task, in execution order.
#[derive(Debug)]
pub struct TaskSpec {
    pub kind: TaskKind,
    pub passes: Vec<Pass>,
}

impl TaskSpec {
    pub fn build(kind: TaskKind, ctx: &BuildContext) -> Result<Self> {
        let config = ctx.config();
        let paths = config.task(kind);
        let sources = SourceSet::new(&paths.src)?;
        let dest_dir = ctx.resolve(&paths.dest);

        let passes = match kind {
            TaskKind::Html => {
                let include = TemplateInclude::new(
                    Arc::clone(ctx.fs_arc()),
                    ctx.resolve(config.components()),
                )?;
                vec![Pass {
                    label: "pages",
                    sources,
                    accepts: None,
                    filter: None,
                    pipeline: Pipeline::new().then(include),
                    dest: Destination::new(dest_dir, WriteMode::IfChanged),
                }]
            }
            TaskKind::Styles => vec![Pass {
                label: "stylesheets",
                sources,
                accepts: None,
                filter: None,
                pipeline: Pipeline::new().then(StyleCompile::new()),
                dest: Destination::new(dest_dir, WriteMode::IfChanged),
            }],
            TaskKind::Scripts => vec![Pass {
                label: "scripts",
                sources,
                accepts: None,
                filter: None,
                pipeline: Pipeline::new()
                    .then(ScriptMinify::new())
                    .then(Rename::suffix(config.script_suffix())),
                dest: Destination::new(dest_dir, WriteMode::IfChanged),
            }],
            TaskKind::Images => {
                let images = config.images();
                vec![Pass {
                    label: "rasters",
                    sources,
                    accepts: None,
                    filter: Some(StalenessFilter::new(
                        &dest_dir,
                        vec![Rename::extension(AVIF_EXTENSION)],
                    )),
                    pipeline: Pipeline::new().then(ImageEncode::new(images.quality, images.speed)),
                    dest: Destination::new(dest_dir, WriteMode::Always),
                }]
            }
            TaskKind::Svg => vec![Pass {
                label: "vectors",
                sources,
                accepts: None,
                filter: Some(StalenessFilter::new(&dest_dir, vec![Rename::identity()])),
                pipeline: Pipeline::new(),
                dest: Destination::new(dest_dir, WriteMode::Always),
            }],
            TaskKind::Fonts => vec![
                font_pass(WebFont::Woff, sources.clone(), &dest_dir),
                font_pass(WebFont::Woff2, sources, &dest_dir),
            ],
        };

        Ok(Self { kind, passes })
    }

    pub fn run(&self, ctx: &BuildContext) -> TaskReport {
        let mut report = TaskReport::new(self.kind);
        for pass in &self.passes {
            pass.run(ctx, &mut report);
        }
        report
    }
}

fn font_pass(target: WebFont, sources: SourceSet, dest_dir: &Path) -> Pass {
    let (label, accepts): (&'static str, Accepts) = match target {
        WebFont::Woff => ("woff", |r| accepts_font(WebFont::Woff, r)),
        WebFont::Woff2 => ("woff2", |r| accepts_font(WebFont::Woff2, r)),
    };
    Pass {
        label,
        sources,
        accepts: Some(accepts),
        filter: Some(StalenessFilter::new(
            dest_dir,
            vec![Rename::extension(target.extension())],
        )),
        pipeline: Pipeline::new().then(FontConvert::new(target)),
        dest: Destination::new(dest_dir, WriteMode::Always),
    }
}

fn accepts_font(target: WebFont, record: &FileRecord) -> bool {
    record
        .extension()
        .is_some_and(|ext| target.accepts_extension(&ext))
}
