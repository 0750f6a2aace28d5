// src/stages/fonts/sfnt.rs

//! Minimal sfnt (TrueType / OpenType) container reader.
//!
//! Only the table directory is interpreted; table contents are carried as
//! opaque byte slices.

use super::FontError;

pub const FLAVOR_TRUETYPE: u32 = 0x0001_0000;
pub const FLAVOR_CFF: u32 = u32::from_be_bytes(*b"OTTO");
pub const FLAVOR_APPLE: u32 = u32::from_be_bytes(*b"true");

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 16;

/// Container format detected from the first four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    Sfnt,
    Woff,
    Woff2,
    Collection,
}

impl FontFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let tag: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        match &tag {
            b"wOFF" => Some(Self::Woff),
            b"wOF2" => Some(Self::Woff2),
            b"ttcf" => Some(Self::Collection),
            _ => match u32::from_be_bytes(tag) {
                FLAVOR_TRUETYPE | FLAVOR_CFF | FLAVOR_APPLE => Some(Self::Sfnt),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<'a> {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: &'a [u8],
}

impl Table<'_> {
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }
}

/// Parsed sfnt font. Tables are sorted by tag.
#[derive(Debug, Clone)]
pub struct Sfnt<'a> {
    pub flavor: u32,
    pub tables: Vec<Table<'a>>,
}

impl<'a> Sfnt<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FontError> {
        match FontFormat::sniff(bytes) {
            Some(FontFormat::Sfnt) => {}
            Some(FontFormat::Collection) => return Err(FontError::Collection),
            Some(other) => return Err(FontError::AlreadyEncoded(other)),
            None if bytes.len() < 4 => return Err(FontError::Truncated("header")),
            None => return Err(FontError::UnknownFlavor(read_u32(bytes, 0)?)),
        }

        let flavor = read_u32(bytes, 0)?;
        let num_tables = read_u16(bytes, 4)? as usize;
        if num_tables == 0 {
            return Err(FontError::NoTables);
        }

        let mut tables = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            let at = HEADER_LEN + i * RECORD_LEN;
            let tag: [u8; 4] = bytes
                .get(at..at + 4)
                .and_then(|s| s.try_into().ok())
                .ok_or(FontError::Truncated("table directory"))?;
            let checksum = read_u32(bytes, at + 4)?;
            let offset = read_u32(bytes, at + 8)? as usize;
            let length = read_u32(bytes, at + 12)? as usize;

            let data = offset
                .checked_add(length)
                .and_then(|end| bytes.get(offset..end))
                .ok_or_else(|| FontError::TableOutOfBounds(String::from_utf8_lossy(&tag).into()))?;
            tables.push(Table {
                tag,
                checksum,
                data,
            });
        }
        tables.sort_by_key(|t| t.tag);

        Ok(Self { flavor, tables })
    }

    /// Size of the equivalent uncompressed sfnt, tables padded to 4 bytes.
    pub fn total_sfnt_size(&self) -> u32 {
        let tables: usize = self.tables.iter().map(|t| padded_len(t.data.len())).sum();
        (HEADER_LEN + RECORD_LEN * self.tables.len() + tables) as u32
    }

    /// Serialize back to a plain sfnt file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.tables.len() as u16;
        let entry_selector = 15 - n.max(1).leading_zeros() as u16;
        let search_range = (1u16 << entry_selector) * 16;

        let mut out = Vec::with_capacity(self.total_sfnt_size() as usize);
        out.extend_from_slice(&self.flavor.to_be_bytes());
        out.extend_from_slice(&n.to_be_bytes());
        out.extend_from_slice(&search_range.to_be_bytes());
        out.extend_from_slice(&entry_selector.to_be_bytes());
        out.extend_from_slice(&(n * 16 - search_range).to_be_bytes());

        let mut offset = HEADER_LEN + RECORD_LEN * self.tables.len();
        for table in &self.tables {
            out.extend_from_slice(&table.tag);
            out.extend_from_slice(&table.checksum.to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
            offset += padded_len(table.data.len());
        }
        for table in &self.tables {
            out.extend_from_slice(table.data);
            pad4(&mut out);
        }
        out
    }
}

/// OpenType table checksum: wrapping sum of big-endian u32 words.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

pub(crate) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub(crate) fn pad4(out: &mut Vec<u8>) {
    out.resize(padded_len(out.len()), 0);
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, FontError> {
    bytes
        .get(at..at + 2)
        .map(|s| u16::from_be_bytes([s[0], s[1]]))
        .ok_or(FontError::Truncated("header"))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, FontError> {
    bytes
        .get(at..at + 4)
        .map(|s| u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or(FontError::Truncated("header"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A tiny TrueType-flavored font with a few opaque tables.
    pub(crate) fn sample_font() -> Vec<u8> {
        let head = vec![0u8; 54];
        let name = b"assetflow sample font name table".repeat(4);
        let glyf = vec![0u8; 40];
        let loca = vec![0u8, 0, 0, 20, 0, 40];
        let tables = vec![
            Table { tag: *b"glyf", checksum: checksum(&glyf), data: &glyf },
            Table { tag: *b"head", checksum: checksum(&head), data: &head },
            Table { tag: *b"loca", checksum: checksum(&loca), data: &loca },
            Table { tag: *b"name", checksum: checksum(&name), data: &name },
        ];
        Sfnt { flavor: FLAVOR_TRUETYPE, tables }.to_bytes()
    }

    #[test]
    fn sniffs_containers() {
        assert_eq!(FontFormat::sniff(&sample_font()), Some(FontFormat::Sfnt));
        assert_eq!(FontFormat::sniff(b"OTTO...."), Some(FontFormat::Sfnt));
        assert_eq!(FontFormat::sniff(b"wOFF...."), Some(FontFormat::Woff));
        assert_eq!(FontFormat::sniff(b"wOF2...."), Some(FontFormat::Woff2));
        assert_eq!(FontFormat::sniff(b"ttcf...."), Some(FontFormat::Collection));
        assert_eq!(FontFormat::sniff(b"GIF8"), None);
        assert_eq!(FontFormat::sniff(b"ab"), None);
    }

    #[test]
    fn parse_sorts_tables_and_round_trips() {
        let bytes = sample_font();
        let font = Sfnt::parse(&bytes).unwrap();
        assert_eq!(font.flavor, FLAVOR_TRUETYPE);

        let tags: Vec<_> = font.tables.iter().map(|t| t.tag_str()).collect();
        assert_eq!(tags, vec!["glyf", "head", "loca", "name"]);
        assert_eq!(font.total_sfnt_size() as usize, bytes.len());
        assert_eq!(font.to_bytes(), bytes);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Sfnt::parse(b"ttcf\0\0\0\0"), Err(FontError::Collection)));
        assert!(matches!(
            Sfnt::parse(b"wOFF\0\0\0\0"),
            Err(FontError::AlreadyEncoded(FontFormat::Woff))
        ));
        assert!(matches!(Sfnt::parse(b"\0\x01\0\0\0\0"), Err(FontError::NoTables)));

        let mut truncated = sample_font();
        truncated.truncate(40);
        assert!(Sfnt::parse(&truncated).is_err());
    }

    #[test]
    fn checksum_pads_the_last_word() {
        assert_eq!(checksum(&[0, 0, 0, 1, 0, 0, 0, 2]), 3);
        assert_eq!(checksum(&[1]), 0x0100_0000);
    }
}
