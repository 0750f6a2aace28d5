// src/stages/fonts/mod.rs

//! Web font conversion.
//!
//! Both encoders read the same sfnt source independently; neither consumes
//! the other's output. A source already in the target container passes
//! through untouched.

pub mod sfnt;
pub mod woff;
pub mod woff2;

use thiserror::Error;

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{FileRecord, Rename, Stage};

pub use sfnt::{FontFormat, Sfnt};

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font truncated in {0}")]
    Truncated(&'static str),

    #[error("unknown sfnt flavor {0:#010x}")]
    UnknownFlavor(u32),

    #[error("font collections are not supported")]
    Collection,

    #[error("font is already {0:?}")]
    AlreadyEncoded(FontFormat),

    #[error("font has no tables")]
    NoTables,

    #[error("table {0:?} points outside the file")]
    TableOutOfBounds(String),

    #[error("compression failed: {0}")]
    Compress(#[source] std::io::Error),
}

/// Which web container a stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebFont {
    Woff,
    Woff2,
}

impl WebFont {
    pub fn extension(self) -> &'static str {
        match self {
            WebFont::Woff => "woff",
            WebFont::Woff2 => "woff2",
        }
    }

    fn format(self) -> FontFormat {
        match self {
            WebFont::Woff => FontFormat::Woff,
            WebFont::Woff2 => FontFormat::Woff2,
        }
    }

    fn encode(self, font: &Sfnt<'_>) -> std::result::Result<Vec<u8>, FontError> {
        match self {
            WebFont::Woff => woff::encode(font),
            WebFont::Woff2 => woff2::encode(font),
        }
    }

    /// Whether a source with this extension belongs to the pass producing `self`.
    ///
    /// Plain sfnt sources feed both passes; web fonts only feed their own.
    pub fn accepts_extension(self, ext: &str) -> bool {
        match ext {
            "ttf" | "otf" => true,
            other => other == self.extension(),
        }
    }
}

/// Convert an sfnt record into one web font container.
#[derive(Debug, Clone, Copy)]
pub struct FontConvert {
    target: WebFont,
}

impl FontConvert {
    pub fn new(target: WebFont) -> Self {
        Self { target }
    }

    pub fn woff() -> Self {
        Self::new(WebFont::Woff)
    }

    pub fn woff2() -> Self {
        Self::new(WebFont::Woff2)
    }
}

impl Stage for FontConvert {
    fn name(&self) -> &'static str {
        match self.target {
            WebFont::Woff => "font-convert-woff",
            WebFont::Woff2 => "font-convert-woff2",
        }
    }

    fn apply(&self, record: FileRecord) -> Result<FileRecord> {
        if FontFormat::sniff(&record.contents) == Some(self.target.format()) {
            return Ok(record.renamed(&Rename::extension(self.target.extension())));
        }

        let font = Sfnt::parse(&record.contents)
            .map_err(|e| AssetflowError::stage(self.name(), &record.path, e.to_string()))?;
        let encoded = self
            .target
            .encode(&font)
            .map_err(|e| AssetflowError::stage(self.name(), &record.path, e.to_string()))?;

        let mut record = record.renamed(&Rename::extension(self.target.extension()));
        record.contents = encoded;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfnt::tests::sample_font;
    use std::path::PathBuf;
    use std::time::UNIX_EPOCH;

    #[test]
    fn both_targets_derive_from_the_same_source() {
        let source = FileRecord::new("Roboto.ttf", sample_font(), UNIX_EPOCH);

        let woff = FontConvert::woff().apply(source.clone()).unwrap();
        let woff2 = FontConvert::woff2().apply(source).unwrap();

        assert_eq!(woff.path, PathBuf::from("Roboto.woff"));
        assert_eq!(woff2.path, PathBuf::from("Roboto.woff2"));
        assert_eq!(&woff.contents[..4], b"wOFF");
        assert_eq!(&woff2.contents[..4], b"wOF2");
    }

    #[test]
    fn web_fonts_pass_through_to_their_own_target() {
        let mut bytes = b"wOF2".to_vec();
        bytes.extend_from_slice(&[0; 44]);
        let rec = FileRecord::new("Icons.woff2", bytes.clone(), UNIX_EPOCH);

        let out = FontConvert::woff2().apply(rec.clone()).unwrap();
        assert_eq!(out.contents, bytes);

        assert!(matches!(
            FontConvert::woff().apply(rec),
            Err(AssetflowError::Stage { stage: "font-convert-woff", .. })
        ));
    }

    #[test]
    fn pass_acceptance_by_extension() {
        assert!(WebFont::Woff.accepts_extension("ttf"));
        assert!(WebFont::Woff.accepts_extension("woff"));
        assert!(!WebFont::Woff.accepts_extension("woff2"));
        assert!(WebFont::Woff2.accepts_extension("otf"));
        assert!(WebFont::Woff2.accepts_extension("woff2"));
        assert!(!WebFont::Woff2.accepts_extension("woff"));
    }
}
