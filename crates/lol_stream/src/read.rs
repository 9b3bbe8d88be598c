//! Types for reading little-endian binary data
//!

use byteorder::{LittleEndian, ReadBytesExt};
use std::{
    fs::File,
    io::{self, BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use crate::error::{Error, Result};

/// Positioned reader over a file or an in-memory buffer
///
/// ```
/// # fn doit() -> lol_stream::error::Result<()>
/// # {
/// use lol_stream::BytesReader;
///
/// let mut bs = BytesReader::from_bytes(b"PROP\x03\x00\x00\x00");
/// assert_eq!(bs.read_string(4)?, "PROP");
/// assert_eq!(bs.read_u32()?, 3);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct BytesReader<R> {
    inner: R,
    len: u64,
    /// Decode composite type tags using the older off-by-one mapping
    pub legacy_read: bool,
}

impl BytesReader<BufReader<File>> {
    /// Open a file on disk for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<'a> BytesReader<Cursor<&'a [u8]>> {
    /// Read from a borrowed in-memory buffer
    pub fn from_bytes(data: &'a [u8]) -> Self {
        BytesReader {
            len: data.len() as u64,
            inner: Cursor::new(data),
            legacy_read: false,
        }
    }
}

impl<R: Read + Seek> BytesReader<R> {
    /// Wrap a reader, keeping its current position
    pub fn new(mut inner: R) -> Result<Self> {
        let position = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;

        Ok(BytesReader {
            inner,
            len,
            legacy_read: false,
        })
    }

    /// Total length of the underlying stream
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the underlying stream holds no data
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current absolute position
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Number of bytes left between the current position and the end
    pub fn remaining(&mut self) -> Result<u64> {
        Ok(self.len.saturating_sub(self.tell()?))
    }

    /// Move to an absolute position, failing if it lies past the end of the stream
    pub fn seek(&mut self, offset: u64) -> Result<u64> {
        if offset > self.len {
            return Err(Error::SeekOutOfRange {
                offset,
                len: self.len,
            });
        }
        Ok(self.inner.seek(SeekFrom::Start(offset))?)
    }

    /// Move relative to the start, the current position or the end
    pub fn seek_from(&mut self, pos: SeekFrom) -> Result<u64> {
        let base = match pos {
            SeekFrom::Start(offset) => return self.seek(offset),
            SeekFrom::Current(delta) => (self.tell()?, delta),
            SeekFrom::End(delta) => (self.len, delta),
        };
        let target = base
            .0
            .checked_add_signed(base.1)
            .ok_or(Error::SeekOutOfRange {
                offset: base.0,
                len: self.len,
            })?;
        self.seek(target)
    }

    /// Skip `count` bytes
    pub fn pad(&mut self, count: u64) -> Result<()> {
        self.ensure(count)?;
        self.inner.seek(SeekFrom::Current(count as i64))?;
        Ok(())
    }

    fn ensure(&mut self, requested: u64) -> Result<()> {
        let position = self.tell()?;
        match position.checked_add(requested) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(Error::UnexpectedEnd {
                requested,
                position,
                len: self.len,
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self.inner.read_u64::<LittleEndian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    /// Read a one byte boolean
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.inner.read_u8()? != 0)
    }

    fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0f32; N];
        self.inner.read_f32_into::<LittleEndian>(&mut out)?;
        Ok(out)
    }

    pub fn read_vec2(&mut self) -> Result<[f32; 2]> {
        self.read_f32_array()
    }

    pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
        self.read_f32_array()
    }

    pub fn read_vec4(&mut self) -> Result<[f32; 4]> {
        self.read_f32_array()
    }

    /// Read a quaternion stored as `x, y, z, w`
    pub fn read_quat(&mut self) -> Result<[f32; 4]> {
        self.read_f32_array()
    }

    pub fn read_mtx44(&mut self) -> Result<[f32; 16]> {
        self.read_f32_array()
    }

    /// Read a run of raw bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut buffer = vec![0u8; count];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read everything from the current position to the end
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.remaining()? as usize);
        self.inner.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Look at up to `count` bytes without moving the cursor
    pub fn peek_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let position = self.tell()?;
        let available = self.remaining()?.min(count as u64) as usize;
        let buffer = self.read_bytes(available)?;
        self.inner.seek(SeekFrom::Start(position))?;
        Ok(buffer)
    }

    /// Read a fixed length UTF-8 string
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        Ok(String::from_utf8(self.read_bytes(len)?)?)
    }

    /// Read a fixed width field holding a NUL padded UTF-8 string
    pub fn read_padded_string(&mut self, width: usize) -> Result<String> {
        let mut raw = self.read_bytes(width)?;
        if let Some(end) = raw.iter().position(|b| *b == 0) {
            raw.truncate(end);
        }
        Ok(String::from_utf8(raw)?)
    }

    /// Read a UTF-8 string prefixed by its `u16` byte length
    pub fn read_sized_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        self.read_string(len)
    }

    /// Unwrap and return the inner reader object
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BytesReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for BytesReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[cfg(test)]
mod test {
    use std::io::{Cursor, SeekFrom};

    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        BytesReader,
    };

    #[traced_test]
    #[test]
    fn read_primitives() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0xFF,
            0x34, 0x12,
            0x78, 0x56, 0x34, 0x12,
            0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45, 0x23, 0x01,
            0x00, 0x00, 0x80, 0x3F,
            0x02,
        ];

        let mut bs = BytesReader::from_bytes(&input);
        assert_eq!(bs.read_i8()?, -1);
        assert_eq!(bs.read_u16()?, 0x1234);
        assert_eq!(bs.read_u32()?, 0x12345678);
        assert_eq!(bs.read_u64()?, 0x0123456789ABCDEF);
        assert_eq!(bs.read_f32()?, 1.0);
        assert!(bs.read_bool()?);
        assert_eq!(bs.remaining()?, 0);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_strings() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x05, 0x00, b'h', b'e', b'l', b'l', b'o',
            b'r', b'o', b'o', b't', 0x00, 0x00, 0x00, 0x00,
        ];

        let mut bs = BytesReader::from_bytes(&input);
        assert_eq!(bs.read_sized_string()?, "hello");
        assert_eq!(bs.read_padded_string(8)?, "root");

        Ok(())
    }

    #[test]
    fn seek_past_end_fails() {
        let input = [0u8; 4];
        let mut bs = BytesReader::from_bytes(&input);

        assert!(matches!(
            bs.seek(5),
            Err(Error::SeekOutOfRange { offset: 5, len: 4 })
        ));
        assert!(bs.seek_from(SeekFrom::End(-5)).is_err());
        assert!(bs.seek(4).is_ok());
    }

    #[test]
    fn truncated_read_fails() {
        let input = [0x01, 0x02, 0x03];
        let mut bs = BytesReader::from_bytes(&input);

        assert!(bs.read_u32().is_err());
        assert!(matches!(
            BytesReader::from_bytes(&input).read_bytes(4),
            Err(Error::UnexpectedEnd { requested: 4, .. })
        ));
    }

    #[test]
    fn peek_keeps_position() -> Result<()> {
        let mut bs = BytesReader::new(Cursor::new(b"OggS\x00\x02".to_vec()))?;
        bs.pad(1)?;

        assert_eq!(bs.peek_bytes(20)?, b"ggS\x00\x02".to_vec());
        assert_eq!(bs.tell()?, 1);

        Ok(())
    }
}
