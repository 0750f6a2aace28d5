// src/config/validate.rs

use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use globset::Glob;

use crate::config::model::{
    ConfigFile, ImageSettings, PathSet, RawConfigFile, ServerSettings, TaskPaths, TaskSection,
    WatchSettings,
};
use crate::errors::{AssetflowError, Result};
use crate::pipeline::source::glob_base;
use crate::types::TaskKind;

pub const DEFAULT_OUTPUT_ROOT: &str = "dist";
pub const DEFAULT_COMPONENTS: &str = "components";
pub const DEFAULT_SCRIPT_SUFFIX: &str = ".min";
pub const DEFAULT_IMAGE_QUALITY: u8 = 95;
pub const DEFAULT_IMAGE_SPEED: u8 = 6;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SETTLE_MS: u64 = 100;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let output_root = resolve_output_root(&raw)?;
        let sections = task_sections(&raw)?;

        let components = normalize(Path::new(
            sections
                .html
                .components
                .as_deref()
                .unwrap_or(DEFAULT_COMPONENTS),
        ));

        let paths = PathSet {
            html: resolve_task(TaskKind::Html, &sections.html, &output_root, &components)?,
            styles: resolve_task(TaskKind::Styles, &sections.styles, &output_root, &components)?,
            scripts: resolve_task(TaskKind::Scripts, &sections.scripts, &output_root, &components)?,
            images: resolve_task(TaskKind::Images, &sections.images, &output_root, &components)?,
            svg: resolve_task(TaskKind::Svg, &sections.svg, &output_root, &components)?,
            fonts: resolve_task(TaskKind::Fonts, &sections.fonts, &output_root, &components)?,
        };

        let script_suffix = sections
            .scripts
            .suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_SCRIPT_SUFFIX.to_string());

        let images = ImageSettings {
            quality: sections.images.quality.unwrap_or(DEFAULT_IMAGE_QUALITY),
            speed: sections.images.speed.unwrap_or(DEFAULT_IMAGE_SPEED),
        };
        validate_images(&images)?;

        let server = ServerSettings {
            host: raw
                .server
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: raw.server.port.unwrap_or(DEFAULT_PORT),
        };

        let settle_ms = raw.watch.settle_ms.unwrap_or(DEFAULT_SETTLE_MS);
        if settle_ms == 0 {
            return Err(AssetflowError::Config(
                "[watch].settle_ms must be >= 1 (got 0)".to_string(),
            ));
        }
        let watch = WatchSettings {
            settle: Duration::from_millis(settle_ms),
        };

        Ok(ConfigFile::new_unchecked(
            output_root,
            paths,
            components,
            script_suffix,
            images,
            server,
            watch,
        ))
    }
}

/// Raw sections for every task, with absent ones filled by empty overrides.
struct Sections {
    html: TaskSection,
    styles: TaskSection,
    scripts: TaskSection,
    images: TaskSection,
    svg: TaskSection,
    fonts: TaskSection,
}

fn task_sections(raw: &RawConfigFile) -> Result<Sections> {
    let mut sections = Sections {
        html: TaskSection::default(),
        styles: TaskSection::default(),
        scripts: TaskSection::default(),
        images: TaskSection::default(),
        svg: TaskSection::default(),
        fonts: TaskSection::default(),
    };

    for (name, section) in raw.task.iter() {
        let kind = TaskKind::from_str(name).map_err(AssetflowError::Config)?;
        reject_foreign_keys(kind, section)?;
        let slot = match kind {
            TaskKind::Html => &mut sections.html,
            TaskKind::Styles => &mut sections.styles,
            TaskKind::Scripts => &mut sections.scripts,
            TaskKind::Images => &mut sections.images,
            TaskKind::Svg => &mut sections.svg,
            TaskKind::Fonts => &mut sections.fonts,
        };
        *slot = section.clone();
    }

    Ok(sections)
}

fn reject_foreign_keys(kind: TaskKind, section: &TaskSection) -> Result<()> {
    let foreign = [
        ("components", section.components.is_some(), TaskKind::Html),
        ("suffix", section.suffix.is_some(), TaskKind::Scripts),
        ("quality", section.quality.is_some(), TaskKind::Images),
        ("speed", section.speed.is_some(), TaskKind::Images),
    ];
    for (key, present, owner) in foreign {
        if present && kind != owner {
            return Err(AssetflowError::Config(format!(
                "[task.{kind}] does not accept `{key}` (only [task.{owner}] does)"
            )));
        }
    }
    Ok(())
}

fn resolve_output_root(raw: &RawConfigFile) -> Result<PathBuf> {
    let root = normalize(Path::new(
        raw.output.root.as_deref().unwrap_or(DEFAULT_OUTPUT_ROOT),
    ));

    // `clean` removes this directory wholesale, so it must be a real
    // subdirectory of the project.
    if root.as_os_str().is_empty() || escapes(&root) {
        return Err(AssetflowError::Config(format!(
            "[output].root must be a subdirectory of the project (got {:?})",
            raw.output.root.as_deref().unwrap_or_default()
        )));
    }

    Ok(root)
}

fn resolve_task(
    kind: TaskKind,
    section: &TaskSection,
    output_root: &Path,
    components: &Path,
) -> Result<TaskPaths> {
    let src = section
        .src
        .clone()
        .unwrap_or_else(|| default_src(kind));
    if src.is_empty() {
        return Err(AssetflowError::Config(format!(
            "[task.{kind}].src must list at least one pattern"
        )));
    }

    let watch = match &section.watch {
        Some(watch) => watch.clone(),
        None => default_watch(kind, &src, components),
    };

    for pattern in src.iter().chain(watch.iter()) {
        Glob::new(pattern).map_err(|e| {
            AssetflowError::Config(format!(
                "[task.{kind}] has an invalid glob pattern {pattern:?}: {e}"
            ))
        })?;
    }

    let dest = match &section.dest {
        Some(dest) => normalize(Path::new(dest)),
        None => default_dest(kind, output_root),
    };
    if escapes(&dest) || !dest.starts_with(output_root) {
        return Err(AssetflowError::Config(format!(
            "[task.{kind}].dest {:?} must lie inside the output root {:?}",
            dest, output_root
        )));
    }

    Ok(TaskPaths { src, watch, dest })
}

/// Whether a project-relative path climbs out of its prefix or is absolute.
fn escapes(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
}

fn default_src(kind: TaskKind) -> Vec<String> {
    let pattern = match kind {
        TaskKind::Html => "page/**/*.html",
        TaskKind::Styles => "scss/main.scss",
        TaskKind::Scripts => "js/main.js",
        TaskKind::Images => "image/src/**/*.{jpg,jpeg,png}",
        TaskKind::Svg => "image/src/**/*.svg",
        TaskKind::Fonts => "fonts/src/**/*.{ttf,otf,woff,woff2}",
    };
    vec![pattern.to_string()]
}

/// Watch patterns derived from the effective sources.
///
/// Pages also depend on their fragments, and a stylesheet entry on every
/// partial next to it.
fn default_watch(kind: TaskKind, src: &[String], components: &Path) -> Vec<String> {
    match kind {
        TaskKind::Html => {
            let mut watch = vec![glob_under(components, "**/*.html")];
            watch.extend(src.iter().cloned());
            watch
        }
        TaskKind::Styles => {
            let mut watch: Vec<String> = src
                .iter()
                .map(|pattern| glob_under(&glob_base(pattern), "**/*.scss"))
                .collect();
            watch.dedup();
            watch
        }
        _ => src.to_vec(),
    }
}

fn default_dest(kind: TaskKind, output_root: &Path) -> PathBuf {
    match kind {
        TaskKind::Html => output_root.to_path_buf(),
        TaskKind::Styles => output_root.join("css"),
        TaskKind::Scripts => output_root.join("js"),
        TaskKind::Images | TaskKind::Svg => output_root.join("image"),
        TaskKind::Fonts => output_root.join("fonts"),
    }
}

fn glob_under(dir: &Path, pattern: &str) -> String {
    if dir.as_os_str().is_empty() {
        pattern.to_string()
    } else {
        format!("{}/{}", dir.to_string_lossy().replace('\\', "/"), pattern)
    }
}

/// Drop `.` components and trailing separators so `./dist/` equals `dist`.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn validate_images(images: &ImageSettings) -> Result<()> {
    if !(1..=100).contains(&images.quality) {
        return Err(AssetflowError::Config(format!(
            "[task.images].quality must be within 1..=100 (got {})",
            images.quality
        )));
    }
    if !(1..=10).contains(&images.speed) {
        return Err(AssetflowError::Config(format!(
            "[task.images].speed must be within 1..=10 (got {})",
            images.speed
        )));
    }
    Ok(())
}
