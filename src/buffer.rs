use std::io::{self, BufReader, Read, Seek, SeekFrom};

use thiserror::Error;

use crate::{endian, tag::Tag};

macro_rules! impl_read {
    ($fn_name:ident, $typ:ty, $from_disk:ident) => {
        /// Reads a big-endian value at the cursor and normalizes it for the host.
        pub fn $fn_name(&mut self) -> Result<$typ, VeroBufReaderError> {
            let raw = self.read_array::<{ size_of::<$typ>() }>()?;

            Ok(endian::$from_disk(raw))
        }
    };
}

/// Represents the possible errors that can occur when using `VeroBufReader`.
#[derive(Error, Debug)]
pub enum VeroBufReaderError {
    /// Fewer bytes remain in the buffer than the read requires.
    #[error("Truncated input, needed {needed} bytes but only {available} remain")]
    TruncatedInput { needed: u64, available: u64 },

    /// A seek target lies past the end of the buffer.
    #[error("Offset {offset} is past the end of the {len} byte buffer")]
    InvalidOffset { offset: u64, len: u64 },

    /// The underlying buffer failed for a reason unrelated to its length.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A Struct which encapsulates and provides a robust API
/// for interacting with a buffer
pub struct VeroBufReader<B: Read + Seek> {
    inner: BufReader<B>,
    len: Option<u64>,
}

impl<B> VeroBufReader<B>
where
    B: Read + Seek,
{
    /// Returns a new buf reader from anything which implements read
    /// the most obvious use case would be a File
    /// but an in-memory `Cursor` works just as well
    pub fn from_buffer(buffer: B) -> Self {
        Self {
            inner: BufReader::new(buffer),
            len: None,
        }
    }

    /// Total length of the underlying buffer in bytes.
    ///
    /// Measured once by seeking to the end and back, then cached.
    pub fn stream_len(&mut self) -> Result<u64, VeroBufReaderError> {
        if let Some(len) = self.len {
            return Ok(len);
        }

        let pos = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;

        self.len = Some(len);
        Ok(len)
    }

    /// Current cursor position measured from the start of the buffer.
    pub fn position(&mut self) -> Result<u64, VeroBufReaderError> {
        Ok(self.inner.stream_position()?)
    }

    /// Number of bytes between the cursor and the end of the buffer.
    pub fn remaining(&mut self) -> Result<u64, VeroBufReaderError> {
        let len = self.stream_len()?;
        let pos = self.position()?;

        Ok(len.saturating_sub(pos))
    }

    /// Fails with `TruncatedInput` unless at least `needed` bytes remain.
    ///
    /// Used ahead of reading counted arrays so a bogus count never turns
    /// into a large allocation.
    pub fn ensure_remaining(&mut self, needed: u64) -> Result<(), VeroBufReaderError> {
        let available = self.remaining()?;

        if available < needed {
            return Err(VeroBufReaderError::TruncatedInput { needed, available });
        }

        Ok(())
    }

    /// Seeks to a specifc place in the buffer
    /// from the start of the file
    ///
    /// Seeking past the end is rejected with `InvalidOffset` instead of
    /// leaving the cursor somewhere undefined. Seeking to exactly the end is
    /// allowed, the next read will report the truncation.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use vero_sfnt::buffer::VeroBufReader;
    ///
    /// let data = vec![0, 0, 0, 10, 0, 0, 0, 20]; // Represents two u32 values: 10 and 20 in big-endian
    /// let mut reader = VeroBufReader::from_buffer(Cursor::new(data));
    ///
    /// // Seek to the beginning of the second u32 (at index 4)
    /// reader.seek_to(4).unwrap();
    /// assert_eq!(reader.read_u32().unwrap(), 20);
    ///
    /// assert!(reader.seek_to(9).is_err());
    /// ```
    pub fn seek_to(&mut self, pos: u64) -> Result<(), VeroBufReaderError> {
        let len = self.stream_len()?;

        if pos > len {
            return Err(VeroBufReaderError::InvalidOffset { offset: pos, len });
        }

        self.inner.seek(SeekFrom::Start(pos))?;

        Ok(())
    }

    /// Reads exactly `N` bytes at the cursor, verbatim.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], VeroBufReaderError> {
        let needed = N as u64;
        let available = self.remaining()?;
        if available < needed {
            return Err(VeroBufReaderError::TruncatedInput { needed, available });
        }

        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|err| match err.kind() {
            // the source delivered less than its length promised
            io::ErrorKind::UnexpectedEof => {
                VeroBufReaderError::TruncatedInput { needed, available }
            }
            _ => VeroBufReaderError::Io(err),
        })?;

        Ok(buf)
    }

    /// Reads a 4 byte tag. Tags are identifiers, their bytes are kept as-is.
    pub fn read_tag(&mut self) -> Result<Tag, VeroBufReaderError> {
        Ok(Tag::new(self.read_array()?))
    }

    impl_read!(read_u32, u32, u32_from_disk);
    impl_read!(read_u16, u16, u16_from_disk);
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reader(data: &[u8]) -> VeroBufReader<Cursor<Vec<u8>>> {
        VeroBufReader::from_buffer(Cursor::new(data.to_vec()))
    }

    #[test]
    fn reads_advance_the_cursor() {
        let mut reader = reader(&[0x00, 0x01, 0x00, 0x00, 0x12, 0x34]);

        assert_eq!(reader.read_u32().unwrap(), 0x0001_0000);
        assert_eq!(reader.position().unwrap(), 4);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.remaining().unwrap(), 0);
    }

    #[test]
    fn short_read_is_truncated_input() {
        let mut reader = reader(&[0x00, 0x01, 0x02]);

        match reader.read_u32() {
            Err(VeroBufReaderError::TruncatedInput { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected truncated input, got {other:?}"),
        }
    }

    #[test]
    fn tag_bytes_are_not_swapped() {
        let mut reader = reader(b"cmap");
        assert_eq!(reader.read_tag().unwrap().to_bytes(), *b"cmap");
    }

    #[test]
    fn seek_past_end_is_invalid_offset() {
        let mut reader = reader(&[0u8; 8]);

        assert!(reader.seek_to(8).is_ok());
        assert!(matches!(
            reader.seek_to(9),
            Err(VeroBufReaderError::InvalidOffset { offset: 9, len: 8 })
        ));
    }

    /// Claims to be longer than the bytes it actually yields.
    struct Overstated {
        inner: Cursor<Vec<u8>>,
        extra: u64,
    }

    impl Read for Overstated {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for Overstated {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::End(n) => {
                    let end = self.inner.get_ref().len() as u64 + self.extra;
                    Ok(end.saturating_add_signed(n))
                }
                other => self.inner.seek(other),
            }
        }
    }

    #[test]
    fn early_eof_reports_measured_bytes() {
        let source = Overstated {
            inner: Cursor::new(vec![0x00, 0x01]),
            extra: 3,
        };
        let mut reader = VeroBufReader::from_buffer(source);

        match reader.read_u32() {
            Err(VeroBufReaderError::TruncatedInput { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 5);
            }
            other => panic!("expected truncated input, got {other:?}"),
        }
    }

    #[test]
    fn stream_len_keeps_the_cursor() {
        let mut reader = reader(&[1, 2, 3, 4, 5, 6]);

        reader.read_u16().unwrap();
        assert_eq!(reader.stream_len().unwrap(), 6);
        assert_eq!(reader.read_u16().unwrap(), 0x0304);
    }
}
