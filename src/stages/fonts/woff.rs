// src/stages/fonts/woff.rs

//! WOFF 1.0 encoder: sfnt tables compressed individually with zlib.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use super::FontError;
use super::sfnt::{Sfnt, pad4};

pub const SIGNATURE: &[u8; 4] = b"wOFF";
const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 20;

/// Encode a parsed sfnt as WOFF 1.0.
///
/// A table is stored uncompressed when zlib does not make it smaller.
pub fn encode(font: &Sfnt<'_>) -> Result<Vec<u8>, FontError> {
    let mut payloads = Vec::with_capacity(font.tables.len());
    for table in &font.tables {
        let compressed = zlib(table.data)?;
        if compressed.len() < table.data.len() {
            payloads.push(compressed);
        } else {
            payloads.push(table.data.to_vec());
        }
    }

    let mut directory = Vec::with_capacity(ENTRY_LEN * font.tables.len());
    let mut data = Vec::new();
    let data_start = HEADER_LEN + ENTRY_LEN * font.tables.len();
    for (table, payload) in font.tables.iter().zip(&payloads) {
        let offset = data_start + data.len();
        directory.extend_from_slice(&table.tag);
        directory.extend_from_slice(&(offset as u32).to_be_bytes());
        directory.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        directory.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&table.checksum.to_be_bytes());

        data.extend_from_slice(payload);
        pad4(&mut data);
    }

    let total_len = data_start + data.len();
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(font.tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&font.total_sfnt_size().to_be_bytes());
    // majorVersion, minorVersion
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    // no metadata or private blocks
    out.extend_from_slice(&[0u8; 20]);
    debug_assert_eq!(out.len(), HEADER_LEN);

    out.extend_from_slice(&directory);
    out.extend_from_slice(&data);
    Ok(out)
}

fn zlib(data: &[u8]) -> Result<Vec<u8>, FontError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).map_err(FontError::Compress)?;
    encoder.finish().map_err(FontError::Compress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::fonts::sfnt::tests::sample_font;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn be32(bytes: &[u8], at: usize) -> u32 {
        u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn header_describes_the_file() {
        let sfnt = sample_font();
        let font = Sfnt::parse(&sfnt).unwrap();
        let woff = encode(&font).unwrap();

        assert_eq!(&woff[..4], SIGNATURE);
        assert_eq!(be32(&woff, 4), font.flavor);
        assert_eq!(be32(&woff, 8) as usize, woff.len());
        assert_eq!(u16::from_be_bytes([woff[12], woff[13]]), 4);
        assert_eq!(be32(&woff, 16) as usize, sfnt.len());
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn tables_decode_to_original_bytes() {
        let sfnt = sample_font();
        let font = Sfnt::parse(&sfnt).unwrap();
        let woff = encode(&font).unwrap();

        for (i, table) in font.tables.iter().enumerate() {
            let entry = HEADER_LEN + i * ENTRY_LEN;
            assert_eq!(&woff[entry..entry + 4], &table.tag);
            let offset = be32(&woff, entry + 4) as usize;
            let comp_len = be32(&woff, entry + 8) as usize;
            let orig_len = be32(&woff, entry + 12) as usize;
            assert_eq!(orig_len, table.data.len());
            assert_eq!(offset % 4, 0);

            let stored = &woff[offset..offset + comp_len];
            let decoded = if comp_len < orig_len {
                let mut out = Vec::new();
                ZlibDecoder::new(stored).read_to_end(&mut out).unwrap();
                out
            } else {
                stored.to_vec()
            };
            assert_eq!(decoded, table.data, "table {}", table.tag_str());
        }
    }
}
