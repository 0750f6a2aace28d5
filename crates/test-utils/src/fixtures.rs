// crates/test-utils/src/fixtures.rs

//! Small binary inputs for the image and font tasks.

use std::io::Cursor;

use assetflow::stages::fonts::sfnt::{FLAVOR_TRUETYPE, Sfnt, Table, checksum};
use image::{ImageFormat, Rgb, RgbImage};

/// A tiny TrueType-flavoured sfnt with a few opaque tables.
///
/// Not a renderable font; the converters only look at the table directory.
pub fn minimal_sfnt() -> Vec<u8> {
    let head: &[u8] = &[0x00, 0x01, 0x00, 0x00, 0x5f, 0x0f, 0x3c, 0xf5, 0x00, 0x0b];
    let hhea: &[u8] = &[0x00, 0x01, 0x00, 0x00, 0x03, 0x20];
    let maxp: &[u8] = &[0x00, 0x00, 0x50, 0x00, 0x00, 0x02];
    let name: &[u8] = b"assetflow fixture font name table padding padding";

    let tables = [(*b"head", head), (*b"hhea", hhea), (*b"maxp", maxp), (*b"name", name)]
        .into_iter()
        .map(|(tag, data)| Table {
            tag,
            checksum: checksum(data),
            data,
        })
        .collect();

    Sfnt {
        flavor: FLAVOR_TRUETYPE,
        tables,
    }
    .to_bytes()
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

pub fn tiny_png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

pub fn tiny_jpeg() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

fn encode(format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(8, 8)
        .write_to(&mut out, format)
        .expect("encode fixture image");
    out.into_inner()
}
