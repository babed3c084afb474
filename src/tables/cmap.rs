use std::io::{Read, Seek};

use log::{debug, trace, warn};

use crate::{VeroTypeError, buffer::VeroBufReader};

use super::{DirectoryEntry, TableEncodingError, check_len, u16_at, u32_at};

/// The header of the [cmap table](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapHeader {
    /// The version of the cmap table
    /// it's almost guarenteed to be set to zero
    pub version: u16,

    /// The number of encoding records that follow
    pub num_tables: u16,
}

impl CmapHeader {
    pub const SIZE: usize = 4;

    pub fn from_buffer(buf: &[u8]) -> Result<Self, TableEncodingError> {
        check_len(buf, Self::SIZE)?;

        Ok(Self {
            version: u16_at(buf, 0),
            num_tables: u16_at(buf, 2),
        })
    }
}

/// Represents the platform identifier of an encoding record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformId {
    Unicode,
    Macintosh,
    Iso,
    Windows,
    Custom,
    Unknown(u16),
}

impl From<u16> for PlatformId {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Unicode,
            1 => Self::Macintosh,
            2 => Self::Iso,
            3 => Self::Windows,
            4 => Self::Custom,
            _ => Self::Unknown(value),
        }
    }
}

/// One encoding record, pointing at a mapping subtable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapEncodingRecord {
    /// The platform identifier
    pub platform_id: u16,

    /// The platform specific encoding identifier
    pub encoding_id: u16,

    /// The offset of the mapping subtable from the start of the cmap table.
    /// Not followed.
    pub offset: u32,
}

impl CmapEncodingRecord {
    pub const SIZE: usize = 8;

    pub fn from_buffer(buf: &[u8]) -> Result<Self, TableEncodingError> {
        check_len(buf, Self::SIZE)?;

        Ok(Self {
            platform_id: u16_at(buf, 0),
            encoding_id: u16_at(buf, 2),
            offset: u32_at(buf, 4),
        })
    }

    pub fn platform(&self) -> PlatformId {
        PlatformId::from(self.platform_id)
    }
}

/// The cmap header together with its encoding records, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmap {
    pub header: CmapHeader,
    pub records: Vec<CmapEncodingRecord>,
}

impl Cmap {
    /// Seeks to the table described by `entry` and reads its header and
    /// encoding records.
    ///
    /// # Errors
    ///
    /// * `InvalidOffset` if `entry.offset` is past the end of the buffer.
    /// * `TruncatedInput` if the header or the declared records don't fit
    ///   in what remains. No records are read in that case.
    pub(crate) fn from_reader<B: Read + Seek>(
        reader: &mut VeroBufReader<B>,
        entry: &DirectoryEntry,
    ) -> Result<Self, VeroTypeError> {
        reader.seek_to(entry.offset.into())?;

        let raw = reader.read_array::<{ CmapHeader::SIZE }>()?;
        let header = CmapHeader::from_buffer(&raw)?;
        debug!(
            "cmap version {} with {} encoding records",
            header.version, header.num_tables
        );
        if header.version != 0 {
            warn!("unexpected cmap version {}", header.version);
        }

        let count = usize::from(header.num_tables);
        reader.ensure_remaining((count * CmapEncodingRecord::SIZE) as u64)?;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let raw = reader.read_array::<{ CmapEncodingRecord::SIZE }>()?;
            let record = CmapEncodingRecord::from_buffer(&raw)?;

            trace!(
                "encoding record platform {} encoding {} offset {}",
                record.platform_id, record.encoding_id, record.offset
            );
            records.push(record);
        }

        Ok(Self { header, records })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ErrorKind, tag::Tag};

    fn cmap_entry(offset: u32) -> DirectoryEntry {
        DirectoryEntry {
            tag: Tag::CMAP,
            checksum: 0,
            offset,
            length: 0,
        }
    }

    fn reader(data: Vec<u8>) -> VeroBufReader<Cursor<Vec<u8>>> {
        VeroBufReader::from_buffer(Cursor::new(data))
    }

    #[test]
    fn reads_records_at_the_table_offset() {
        let mut data = vec![0xEE; 6];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x02]);
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x14]);
        data.extend_from_slice(&[0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]);

        let cmap = Cmap::from_reader(&mut reader(data), &cmap_entry(6)).unwrap();

        assert_eq!(cmap.header, CmapHeader { version: 0, num_tables: 2 });
        assert_eq!(
            cmap.records,
            vec![
                CmapEncodingRecord { platform_id: 0, encoding_id: 3, offset: 20 },
                CmapEncodingRecord { platform_id: 3, encoding_id: 1, offset: 256 },
            ]
        );
        assert_eq!(cmap.records[1].platform(), PlatformId::Windows);
    }

    #[test]
    fn offset_past_end_is_invalid() {
        let err = Cmap::from_reader(&mut reader(vec![0; 8]), &cmap_entry(9)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);
    }

    #[test]
    fn offset_at_end_is_truncated() {
        let err = Cmap::from_reader(&mut reader(vec![0; 8]), &cmap_entry(8)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn too_few_records_is_truncated() {
        // declares 3 records but carries one and a half
        let mut data = vec![0x00, 0x00, 0x00, 0x03];
        data.extend_from_slice(&[0u8; 12]);

        let err = Cmap::from_reader(&mut reader(data), &cmap_entry(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn unknown_platforms_keep_their_value() {
        assert_eq!(PlatformId::from(1), PlatformId::Macintosh);
        assert_eq!(PlatformId::from(42), PlatformId::Unknown(42));
    }
}
