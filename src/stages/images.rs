// src/stages/images.rs

use image::codecs::avif::AvifEncoder;

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{FileRecord, Rename, Stage};

/// Output extension of encoded rasters.
pub const AVIF_EXTENSION: &str = "avif";

/// Re-encode a raster image (JPEG/PNG) as AVIF at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct ImageEncode {
    quality: u8,
    speed: u8,
}

impl ImageEncode {
    /// `speed` ranges from 1 (slowest, smallest) to 10 (fastest).
    pub fn new(quality: u8, speed: u8) -> Self {
        Self { quality, speed }
    }

    pub fn rename() -> Rename {
        Rename::extension(AVIF_EXTENSION)
    }
}

impl Stage for ImageEncode {
    fn name(&self) -> &'static str {
        "image-encode"
    }

    fn apply(&self, record: FileRecord) -> Result<FileRecord> {
        let img = image::load_from_memory(&record.contents).map_err(|e| {
            AssetflowError::stage(self.name(), &record.path, format!("decode failed: {e}"))
        })?;

        let mut encoded = Vec::new();
        let encoder = AvifEncoder::new_with_speed_quality(&mut encoded, self.speed, self.quality);
        img.write_with_encoder(encoder).map_err(|e| {
            AssetflowError::stage(self.name(), &record.path, format!("AVIF encode failed: {e}"))
        })?;

        let mut record = record.renamed(&Self::rename());
        record.contents = encoded;
        Ok(record)
    }
}
