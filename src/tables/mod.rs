use std::{
    io::{Read, Seek},
    slice::Iter,
};

use log::{trace, warn};
use thiserror::Error;

use crate::{VeroTypeError, buffer::VeroBufReader, endian, tag::Tag};

pub mod cmap;

/// Represents the error messages which may occur when trying
/// to parse tables from raw binary buffers
#[derive(Error, Debug)]
pub enum TableEncodingError {
    #[error("The required buffer length for this table is {0} bytes, got {1} bytes")]
    InvalidBufferLength(usize, usize),
}

/// Copies `N` bytes starting at `at`. Callers check the buffer length first.
fn array_at<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    std::array::from_fn(|i| buf[at + i])
}

fn u16_at(buf: &[u8], at: usize) -> u16 {
    endian::u16_from_disk(array_at(buf, at))
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    endian::u32_from_disk(array_at(buf, at))
}

fn tag_at(buf: &[u8], at: usize) -> Tag {
    Tag::new(array_at(buf, at))
}

fn check_len(buf: &[u8], expected: usize) -> Result<(), TableEncodingError> {
    if buf.len() != expected {
        return Err(TableEncodingError::InvalidBufferLength(expected, buf.len()));
    }

    Ok(())
}

/// The kind of glyph outlines announced by the sfnt version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlines {
    TrueType,
    Cff,
    Unknown,
}

/// The first four bytes of a font file.
///
/// The same bytes are read two ways: as an identifier (`OTTO` for CFF data,
/// `true` for old Apple fonts) and as the big-endian number `0x00010000` for
/// TrueType data. Both views come from the one stored array.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SfntVersion([u8; 4]);

impl SfntVersion {
    pub const TRUETYPE: u32 = 0x0001_0000;
    pub const CFF: Tag = Tag::new(*b"OTTO");
    pub const APPLE_TRUETYPE: Tag = Tag::new(*b"true");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// The raw bytes viewed as an identifier, never swapped.
    pub const fn tag(self) -> Tag {
        Tag::new(self.0)
    }

    /// The raw bytes viewed as a big-endian number, normalized for the host.
    pub fn value(self) -> u32 {
        endian::u32_from_disk(self.0)
    }

    pub fn outlines(self) -> Outlines {
        if self.tag() == Self::CFF {
            Outlines::Cff
        } else if self.value() == Self::TRUETYPE || self.tag() == Self::APPLE_TRUETYPE {
            Outlines::TrueType
        } else {
            Outlines::Unknown
        }
    }
}

impl std::fmt::Debug for SfntVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SfntVersion(0x{:08X})", self.value())
    }
}

/// The 12 byte sfnt header at the very start of the file,
/// providing us with important info such as the number of tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontHeader {
    pub version: SfntVersion,
    pub num_tables: u16,

    /// Binary search hints derived from `num_tables`, passed through unchecked
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl FontHeader {
    pub const SIZE: usize = 12;

    /// Constructs the header from a raw buffer
    /// the header buffer size must be 12 per the reference manual.
    pub fn from_buffer(buf: &[u8]) -> Result<Self, TableEncodingError> {
        check_len(buf, Self::SIZE)?;

        Ok(Self {
            version: SfntVersion::new(array_at(buf, 0)),
            num_tables: u16_at(buf, 4),
            search_range: u16_at(buf, 6),
            entry_selector: u16_at(buf, 8),
            range_shift: u16_at(buf, 10),
        })
    }

    /// Reads the header from the start of the buffer.
    pub(crate) fn from_reader<B: Read + Seek>(
        reader: &mut VeroBufReader<B>,
    ) -> Result<Self, VeroTypeError> {
        reader.seek_to(0)?;
        let buffer = reader.read_array::<{ FontHeader::SIZE }>()?;

        Ok(Self::from_buffer(&buffer)?)
    }

    /// Encodes the header back into its on-disk big-endian form.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.version.0);
        out[4..6].copy_from_slice(&self.num_tables.to_be_bytes());
        out[6..8].copy_from_slice(&self.search_range.to_be_bytes());
        out[8..10].copy_from_slice(&self.entry_selector.to_be_bytes());
        out[10..12].copy_from_slice(&self.range_shift.to_be_bytes());
        out
    }
}

/// Outcome of checking a table's checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// Checksums are not computed yet, the stored value is reported as is.
    NotImplemented,
}

/// One table record of the table directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// The table identifier, kept byte for byte.
    pub tag: Tag,
    /// The checksum stored in the file. Never verified.
    pub checksum: u32,
    /// The offset of the table, in bytes, from the beginning of the file.
    pub offset: u32,
    /// The length of the table in bytes, without padding.
    pub length: u32,
}

impl DirectoryEntry {
    pub const SIZE: usize = 16;

    /// Constructs a `DirectoryEntry` from a raw byte buffer.
    ///
    /// This method expects a buffer of exactly 16 bytes, laid out as:
    ///
    /// * Bytes 0-3: Tag, copied verbatim
    /// * Bytes 4-7: Checksum of the table
    /// * Bytes 8-11: Offset of the table from the beginning of the file
    /// * Bytes 12-15: Length of the table in bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use vero_sfnt::tables::DirectoryEntry;
    ///
    /// let buffer: [u8; 16] = [
    ///     b'c', b'm', b'a', b'p', // Tag
    ///     0x12, 0x34, 0x56, 0x78, // Checksum: 0x12345678
    ///     0x00, 0x01, 0x00, 0x00, // Offset: 0x00010000
    ///     0x00, 0x00, 0x0A, 0x00, // Length: 0x00000A00
    /// ];
    ///
    /// let entry = DirectoryEntry::from_buffer(&buffer).unwrap();
    /// assert_eq!(entry.tag.to_bytes(), *b"cmap");
    /// assert_eq!(entry.checksum, 0x12345678);
    /// assert_eq!(entry.offset, 0x00010000);
    /// assert_eq!(entry.length, 0x00000A00);
    ///
    /// assert!(DirectoryEntry::from_buffer(&[0; 10]).is_err());
    /// ```
    pub fn from_buffer(buf: &[u8]) -> Result<Self, TableEncodingError> {
        check_len(buf, Self::SIZE)?;

        Ok(Self {
            tag: tag_at(buf, 0),
            checksum: u32_at(buf, 4),
            offset: u32_at(buf, 8),
            length: u32_at(buf, 12),
        })
    }

    /// Encodes the record back into its on-disk form.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.tag.to_bytes());
        out[4..8].copy_from_slice(&self.checksum.to_be_bytes());
        out[8..12].copy_from_slice(&self.offset.to_be_bytes());
        out[12..16].copy_from_slice(&self.length.to_be_bytes());
        out
    }

    /// Whether the table's bytes lie entirely inside a file of `file_len` bytes.
    pub fn fits_within(&self, file_len: u64) -> bool {
        u64::from(self.offset) + u64::from(self.length) <= file_len
    }

    pub fn calculate_checksum(&self) -> ChecksumStatus {
        ChecksumStatus::NotImplemented
    }
}

/// The table directory, in the order the records appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTable {
    entries: Vec<DirectoryEntry>,
}

impl DirectoryTable {
    /// Reads `num_tables` records starting at the cursor.
    ///
    /// The whole directory must fit in what is left of the buffer, otherwise
    /// nothing is read and `TruncatedInput` is returned.
    pub fn from_reader<B: Read + Seek>(
        reader: &mut VeroBufReader<B>,
        num_tables: u16,
    ) -> Result<Self, VeroTypeError> {
        let count = usize::from(num_tables);
        reader.ensure_remaining((count * DirectoryEntry::SIZE) as u64)?;

        let file_len = reader.stream_len()?;
        let mut entries = Vec::with_capacity(count);

        for _ in 0..count {
            let raw = reader.read_array::<{ DirectoryEntry::SIZE }>()?;
            let entry = DirectoryEntry::from_buffer(&raw)?;

            trace!(
                "table {} checksum 0x{:08X} offset {} length {}",
                entry.tag, entry.checksum, entry.offset, entry.length
            );
            if !entry.fits_within(file_len) {
                warn!(
                    "table {} spans {}..{} past the end of the {} byte file",
                    entry.tag,
                    entry.offset,
                    u64::from(entry.offset) + u64::from(entry.length),
                    file_len
                );
            }

            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// The first entry carrying `tag`, tags are expected to be unique
    /// but nothing enforces it.
    pub fn find(&self, tag: Tag) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    pub fn iter(&self) -> Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<DirectoryEntry>> for DirectoryTable {
    fn from(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a DirectoryTable {
    type Item = &'a DirectoryEntry;

    type IntoIter = Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
