// src/stages/fonts/woff2.rs

//! WOFF 2.0 encoder.
//!
//! Every table uses the null transform, so the compressed stream is the plain
//! concatenation of the sfnt tables. The stream is a single Brotli block.

use std::io::Write;

use super::FontError;
use super::sfnt::{Sfnt, pad4};

pub const SIGNATURE: &[u8; 4] = b"wOF2";
const HEADER_LEN: usize = 48;

/// Tags with a one-byte encoding in the table directory flags.
pub const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

const ARBITRARY_TAG: u8 = 0x3f;

/// glyf/loca signal the null transform with version 3; all others with 0.
const NULL_TRANSFORM_GLYF: u8 = 3 << 6;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LG_WINDOW: u32 = 22;

/// Encode a parsed sfnt as WOFF 2.0.
pub fn encode(font: &Sfnt<'_>) -> Result<Vec<u8>, FontError> {
    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &font.tables {
        let index = KNOWN_TAGS.iter().position(|t| **t == table.tag);
        let transform = match &table.tag {
            b"glyf" | b"loca" => NULL_TRANSFORM_GLYF,
            _ => 0,
        };
        match index {
            Some(i) => directory.push(i as u8 | transform),
            None => {
                directory.push(ARBITRARY_TAG | transform);
                directory.extend_from_slice(&table.tag);
            }
        }
        write_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(table.data);
    }

    let compressed = brotli(&stream)?;

    let mut out = Vec::with_capacity(HEADER_LEN + directory.len() + compressed.len() + 3);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.flavor.to_be_bytes());
    // length, patched below
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(font.tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&font.total_sfnt_size().to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    debug_assert_eq!(out.len(), HEADER_LEN);

    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    pad4(&mut out);

    let len = (out.len() as u32).to_be_bytes();
    out[8..12].copy_from_slice(&len);
    Ok(out)
}

/// UIntBase128: big-endian groups of 7 bits, high bit set on all but the last.
pub fn write_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7f) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

fn brotli(data: &[u8]) -> Result<Vec<u8>, FontError> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_LG_WINDOW);
    writer.write_all(data).map_err(FontError::Compress)?;
    Ok(writer.into_inner())
}
