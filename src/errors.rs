// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Source not found: {0:?}")]
    SourceNotFound(PathBuf),

    /// A delegate (compiler, encoder, include resolver) rejected one record.
    #[error("{stage} failed for {path:?}: {message}")]
    Stage {
        stage: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Server error: {0}")]
    Server(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetflowError {
    pub fn stage(stage: &'static str, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AssetflowError::Stage {
            stage,
            path: path.into(),
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetflowError>;
