// src/config/mod.rs

//! Build configuration: the PathSet plus per-task settings.
//!
//! - [`model`] holds the raw TOML shape and the validated [`ConfigFile`].
//! - [`validate`] fills defaults and checks invariants.
//! - [`loader`] finds and reads the optional project file.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_root, CONFIG_FILE_NAME};
pub use model::{
    ConfigFile, ImageSettings, PathSet, RawConfigFile, ServerSection, ServerSettings, TaskPaths,
    TaskSection, WatchSettings,
};
