// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::TaskKind;

/// Optional project file that overrides the built-in PathSet.
///
/// Every section and key is optional; anything left out keeps the default
/// layout (`page/`, `components/`, `scss/`, `js/`, `image/src/`,
/// `fonts/src/` into `dist/`):
///
/// ```toml
/// [output]
/// root = "public"
///
/// [task.images]
/// src = ["assets/img/**/*.{jpg,png}"]
/// quality = 80
///
/// [server]
/// port = 8080
///
/// [watch]
/// settle_ms = 250
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub output: OutputSection,

    /// Per-task overrides from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output root removed by `clean`. Default `dist`.
    pub root: Option<String>,
}

/// `[task.<name>]` section.
///
/// Keys that only make sense for one task (`components`, `suffix`,
/// `quality`, `speed`) are rejected on the others during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSection {
    /// Source glob patterns, relative to the project root.
    pub src: Option<Vec<String>>,

    /// Patterns whose changes re-run the task while serving.
    ///
    /// If `None`, derived from the effective sources.
    pub watch: Option<Vec<String>>,

    /// Destination directory, relative to the project root.
    pub dest: Option<String>,

    /// `html` only: base directory of include fragments.
    pub components: Option<String>,

    /// `scripts` only: suffix inserted before the extension.
    pub suffix: Option<String>,

    /// `images` only: AVIF quality (1..=100).
    pub quality: Option<u8>,

    /// `images` only: AVIF encoder speed (1 = slowest, 10 = fastest).
    pub speed: Option<u8>,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Quiet period that closes a burst of filesystem events.
    pub settle_ms: Option<u64>,
}

/// Source/destination entry of the PathSet for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPaths {
    pub src: Vec<String>,
    pub watch: Vec<String>,
    pub dest: PathBuf,
}

/// Immutable mapping from task to its inputs and output directory.
#[derive(Debug, Clone)]
pub struct PathSet {
    pub html: TaskPaths,
    pub styles: TaskPaths,
    pub scripts: TaskPaths,
    pub images: TaskPaths,
    pub svg: TaskPaths,
    pub fonts: TaskPaths,
}

impl PathSet {
    pub fn get(&self, kind: TaskKind) -> &TaskPaths {
        match kind {
            TaskKind::Html => &self.html,
            TaskKind::Styles => &self.styles,
            TaskKind::Scripts => &self.scripts,
            TaskKind::Images => &self.images,
            TaskKind::Svg => &self.svg,
            TaskKind::Fonts => &self.fonts,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskKind, &TaskPaths)> {
        TaskKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSettings {
    pub quality: u8,
    pub speed: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub settle: Duration,
}

/// Validated configuration. Built once at startup and never mutated.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`)
/// or [`ConfigFile::new_unchecked`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    output_root: PathBuf,
    paths: PathSet,
    components: PathBuf,
    script_suffix: String,
    images: ImageSettings,
    server: ServerSettings,
    watch: WatchSettings,
}

impl ConfigFile {
    /// Assemble a config from already-resolved parts without validating.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_unchecked(
        output_root: PathBuf,
        paths: PathSet,
        components: PathBuf,
        script_suffix: String,
        images: ImageSettings,
        server: ServerSettings,
        watch: WatchSettings,
    ) -> Self {
        Self {
            output_root,
            paths,
            components,
            script_suffix,
            images,
            server,
            watch,
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    pub fn task(&self, kind: TaskKind) -> &TaskPaths {
        self.paths.get(kind)
    }

    /// Base directory that `@@include` references resolve against.
    pub fn components(&self) -> &Path {
        &self.components
    }

    pub fn script_suffix(&self) -> &str {
        &self.script_suffix
    }

    pub fn images(&self) -> &ImageSettings {
        &self.images
    }

    pub fn server(&self) -> &ServerSettings {
        &self.server
    }

    pub fn watch(&self) -> &WatchSettings {
        &self.watch
    }

    /// Copy of this config with a different server port (used for port 0 in tests).
    pub fn with_server_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }
}
