//! Read-only decoding of the sfnt container used by TrueType and OpenType
//! fonts: the 12 byte header, the table directory and the encoding records
//! of the `cmap` table.

use std::{
    fs::File,
    io::{self, Read, Seek},
    path::{Path, PathBuf},
};

use buffer::{VeroBufReader, VeroBufReaderError};
use log::{debug, warn};
use tables::{
    DirectoryTable, FontHeader, Outlines, TableEncodingError,
    cmap::{Cmap, CmapEncodingRecord},
};
use thiserror::Error;

pub mod buffer;
pub mod endian;
pub mod tables;
pub mod tag;

pub use tag::Tag;

#[derive(Debug, Error)]
pub enum VeroTypeError {
    #[error(transparent)]
    TableEncodingError(#[from] TableEncodingError),

    #[error(transparent)]
    VeroBufReaderError(#[from] VeroBufReaderError),

    /// The font could not be opened at all, nothing was decoded.
    #[error("Unable to read {}: {source}", .path.display())]
    UnreadableSource { path: PathBuf, source: io::Error },
}

/// The broad category of a `VeroTypeError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TruncatedInput,
    InvalidOffset,
    UnreadableSource,
    Io,
}

impl VeroTypeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableEncodingError(TableEncodingError::InvalidBufferLength(..)) => {
                ErrorKind::TruncatedInput
            }
            Self::VeroBufReaderError(VeroBufReaderError::TruncatedInput { .. }) => {
                ErrorKind::TruncatedInput
            }
            Self::VeroBufReaderError(VeroBufReaderError::InvalidOffset { .. }) => {
                ErrorKind::InvalidOffset
            }
            Self::VeroBufReaderError(VeroBufReaderError::Io(_)) => ErrorKind::Io,
            Self::UnreadableSource { .. } => ErrorKind::UnreadableSource,
        }
    }
}

/// Knobs for a single decode.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Follow the `cmap` directory entry and read its encoding records.
    pub walk_cmap: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { walk_cmap: true }
    }
}

/// Everything decoded from a font file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub header: FontHeader,
    pub directory: DirectoryTable,

    /// `None` when the font has no `cmap` table or the walk was disabled.
    pub cmap: Option<Cmap>,
}

/// What was decoded before a failure, and the failure itself.
///
/// The header and directory are kept so a caller can still show them.
#[derive(Debug, Error)]
#[error("Failed to decode font")]
pub struct PartialFont {
    pub header: Option<FontHeader>,
    pub directory: Option<DirectoryTable>,
    #[source]
    pub error: VeroTypeError,
}

impl PartialFont {
    fn new(error: VeroTypeError) -> Self {
        Self {
            header: None,
            directory: None,
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl Font {
    /// Opens the file at `path` and decodes it.
    ///
    /// Anything that can't be opened as a regular file, or fails to read
    /// before the header is decoded, is reported as `UnreadableSource`.
    pub fn open(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self, PartialFont> {
        let path = path.as_ref();
        let unreadable = |source: io::Error| {
            PartialFont::new(VeroTypeError::UnreadableSource {
                path: path.to_path_buf(),
                source,
            })
        };

        let file = File::open(path).map_err(unreadable)?;
        let metadata = file.metadata().map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        decode_with(file, options).map_err(|partial| match partial.error {
            VeroTypeError::VeroBufReaderError(VeroBufReaderError::Io(source))
                if partial.header.is_none() =>
            {
                unreadable(source)
            }
            _ => partial,
        })
    }

    /// The encoding records of the `cmap` table, if one was read.
    pub fn encoding_records(&self) -> Option<&[CmapEncodingRecord]> {
        self.cmap.as_ref().map(|cmap| cmap.records.as_slice())
    }
}

/// Decodes a font from any seekable source with the default options.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// let data = vec![0x00, 0x01, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
/// let font = vero_sfnt::decode(Cursor::new(data)).unwrap();
///
/// assert_eq!(font.header.num_tables, 0);
/// assert!(font.directory.is_empty());
/// assert!(font.cmap.is_none());
/// ```
pub fn decode<B: Read + Seek>(source: B) -> Result<Font, PartialFont> {
    decode_with(source, DecodeOptions::default())
}

/// Decodes a font, reading header, directory and then the `cmap` table.
///
/// A failure after the header or directory were read returns them inside
/// the `PartialFont`.
pub fn decode_with<B: Read + Seek>(source: B, options: DecodeOptions) -> Result<Font, PartialFont> {
    let mut reader = VeroBufReader::from_buffer(source);

    let header = FontHeader::from_reader(&mut reader).map_err(PartialFont::new)?;
    debug!(
        "header read: version 0x{:08X}, {} tables",
        header.version.value(),
        header.num_tables
    );
    if header.version.outlines() == Outlines::Unknown {
        warn!("unknown sfnt version {}", header.version.tag());
    }

    let directory = match DirectoryTable::from_reader(&mut reader, header.num_tables) {
        Ok(directory) => directory,
        Err(error) => {
            return Err(PartialFont {
                header: Some(header),
                directory: None,
                error,
            });
        }
    };
    debug!("directory read: {} entries", directory.len());

    let cmap = match walk_cmap(&mut reader, &directory, options) {
        Ok(cmap) => cmap,
        Err(error) => {
            return Err(PartialFont {
                header: Some(header),
                directory: Some(directory),
                error,
            });
        }
    };

    debug!("decode done");
    Ok(Font {
        header,
        directory,
        cmap,
    })
}

fn walk_cmap<B: Read + Seek>(
    reader: &mut VeroBufReader<B>,
    directory: &DirectoryTable,
    options: DecodeOptions,
) -> Result<Option<Cmap>, VeroTypeError> {
    if !options.walk_cmap {
        debug!("cmap walk disabled");
        return Ok(None);
    }

    let Some(entry) = directory.find(Tag::CMAP) else {
        debug!("no cmap table, skipping");
        return Ok(None);
    };

    let duplicates = directory.iter().filter(|e| e.tag == Tag::CMAP).count();
    if duplicates > 1 {
        warn!("{duplicates} cmap tables in the directory, only the first is read");
    }

    debug!("reading cmap at offset {}", entry.offset);
    Ok(Some(Cmap::from_reader(reader, entry)?))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn header_only(num_tables: u16) -> Vec<u8> {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&num_tables.to_be_bytes());
        data.extend_from_slice(&[0; 6]);
        data
    }

    #[test]
    fn short_header_fails_without_partials() {
        let err = decode(Cursor::new(vec![0x00, 0x01, 0x00])).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert!(err.header.is_none());
        assert!(err.directory.is_none());
    }

    #[test]
    fn truncated_directory_keeps_the_header() {
        let mut data = header_only(3);
        data.extend_from_slice(&[0; 40]);

        let err = decode(Cursor::new(data)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(err.header.map(|h| h.num_tables), Some(3));
        assert!(err.directory.is_none());
    }

    #[test]
    fn cmap_walk_can_be_disabled() {
        let mut data = header_only(1);
        data.extend_from_slice(b"cmap");
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&1000u32.to_be_bytes());
        data.extend_from_slice(&4u32.to_be_bytes());

        let font = decode_with(Cursor::new(data), DecodeOptions { walk_cmap: false }).unwrap();

        assert_eq!(font.directory.len(), 1);
        assert!(font.cmap.is_none());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = Font::open("/definitely/not/a/font.ttf", DecodeOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnreadableSource);
        assert!(err.error.to_string().contains("font.ttf"));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = std::env::temp_dir();
        let err = Font::open(&dir, DecodeOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnreadableSource);
        assert!(err.header.is_none());
        assert!(
            err.error
                .to_string()
                .contains(&dir.display().to_string())
        );
    }

    #[test]
    fn partial_message_does_not_repeat_its_source() {
        let err = decode(Cursor::new(vec![0x00])).unwrap_err();
        let source = std::error::Error::source(&err).map(|s| s.to_string());

        assert_eq!(err.to_string(), "Failed to decode font");
        assert_eq!(source, Some(err.error.to_string()));
        assert!(!err.to_string().contains("Truncated"));
    }
}
