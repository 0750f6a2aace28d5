// crates/test-utils/src/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assetflow::config::{ConfigFile, RawConfigFile};
use assetflow::tasks::BuildContext;
use tempfile::TempDir;

/// A throwaway project directory on the real filesystem.
///
/// ```ignore
/// let project = ProjectBuilder::new()
///     .file("page/index.html", "@@include('header.html')")
///     .file("components/header.html", "<h1>hi</h1>")
///     .build();
/// ```
pub struct ProjectBuilder {
    dir: TempDir,
    config: Option<String>,
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project"),
            config: None,
        }
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn file(self, rel: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
        write_file(self.dir.path(), rel.as_ref(), contents.as_ref());
        self
    }

    /// Use `toml` as the project's `Assetflow.toml`.
    pub fn config_toml(mut self, toml: &str) -> Self {
        self.config = Some(toml.to_string());
        self
    }

    pub fn build(self) -> Project {
        let raw: RawConfigFile = match &self.config {
            Some(text) => toml::from_str(text).expect("test config parses"),
            None => RawConfigFile::default(),
        };
        let config = ConfigFile::try_from(raw).expect("test config validates");
        Project {
            dir: self.dir,
            config,
        }
    }
}

pub struct Project {
    dir: TempDir,
    config: ConfigFile,
}

impl Project {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Context over the real filesystem rooted at the project.
    pub fn context(&self) -> BuildContext {
        BuildContext::on_disk(self.root(), self.config.clone())
    }

    /// Same as [`Project::context`] with the dev server on an ephemeral port.
    pub fn context_on_free_port(&self) -> BuildContext {
        BuildContext::on_disk(self.root(), self.config.clone().with_server_port(0))
    }

    pub fn write(&self, rel: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        write_file(self.root(), rel.as_ref(), contents.as_ref());
    }

    pub fn read(&self, rel: impl AsRef<Path>) -> Vec<u8> {
        fs::read(self.path(rel)).expect("read project file")
    }

    pub fn read_string(&self, rel: impl AsRef<Path>) -> String {
        String::from_utf8(self.read(rel)).expect("project file is utf-8")
    }

    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.path(rel).exists()
    }

    pub fn modified(&self, rel: impl AsRef<Path>) -> SystemTime {
        fs::metadata(self.path(rel))
            .and_then(|m| m.modified())
            .expect("stat project file")
    }

    /// Move the modification time of `rel` by `offset` into the future.
    pub fn touch_ahead(&self, rel: impl AsRef<Path>, offset: Duration) {
        let path = self.path(rel);
        let file = fs::File::options().write(true).open(&path).expect("open for touch");
        file.set_modified(SystemTime::now() + offset)
            .expect("set modification time");
    }
}

fn write_file(root: &Path, rel: &Path, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, contents).expect("write project file");
}
