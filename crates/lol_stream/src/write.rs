//! Types for writing little-endian binary data
//!

use byteorder::{LittleEndian, WriteBytesExt};
use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Cursor, Seek, SeekFrom, Write},
    path::Path,
};
use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// A deferred write of a `u32` size field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePatch {
    /// Absolute offset of the placeholder
    pub offset: u64,

    /// Value to store at `offset`
    pub size: u32,
}

/// Positioned writer with a size-patch list
///
/// ```
/// # fn doit() -> lol_stream::error::Result<()>
/// # {
/// use lol_stream::BytesWriter;
///
/// let mut bs = BytesWriter::in_memory();
/// let size_offset = bs.reserve_u32()?;
/// bs.write_sized_string("data/a.dds")?;
/// bs.close_size(size_offset)?;
///
/// let bytes = bs.into_bytes()?;
/// assert_eq!(&bytes[..4], &[12, 0, 0, 0]);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct BytesWriter<W: Write + Seek> {
    inner: W,
    size_patches: Vec<SizePatch>,
}

impl BytesWriter<Cursor<Vec<u8>>> {
    /// Write into a growable in-memory buffer
    pub fn in_memory() -> Self {
        Self::new(Cursor::new(Vec::new()))
    }

    /// Flush pending size patches and return the written bytes
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        Ok(self.finish()?.into_inner())
    }
}

impl BytesWriter<BufWriter<File>> {
    /// Create (or truncate) a file on disk for writing
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl BytesWriter<File> {
    /// Open an existing file for in-place updates
    pub fn update(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Seek> BytesWriter<W> {
    pub fn new(inner: W) -> Self {
        BytesWriter {
            inner,
            size_patches: Vec::new(),
        }
    }

    /// Current absolute position
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Move to an absolute position
    pub fn seek(&mut self, offset: u64) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::Start(offset))?)
    }

    /// Move to the end of the stream, returning its length
    pub fn end(&mut self) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::End(0))?)
    }

    /// Write `count` zero bytes
    pub fn pad(&mut self, count: usize) -> Result<()> {
        self.inner.write_all(&vec![0u8; count])?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.inner.write_u8(value)?)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        Ok(self.inner.write_i8(value)?)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        Ok(self.inner.write_u16::<LittleEndian>(value)?)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        Ok(self.inner.write_i16::<LittleEndian>(value)?)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        Ok(self.inner.write_u32::<LittleEndian>(value)?)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        Ok(self.inner.write_i32::<LittleEndian>(value)?)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        Ok(self.inner.write_u64::<LittleEndian>(value)?)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        Ok(self.inner.write_i64::<LittleEndian>(value)?)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        Ok(self.inner.write_f32::<LittleEndian>(value)?)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    fn write_f32_slice(&mut self, values: &[f32]) -> Result<()> {
        for value in values {
            self.write_f32(*value)?;
        }
        Ok(())
    }

    pub fn write_vec2(&mut self, value: &[f32; 2]) -> Result<()> {
        self.write_f32_slice(value)
    }

    pub fn write_vec3(&mut self, value: &[f32; 3]) -> Result<()> {
        self.write_f32_slice(value)
    }

    pub fn write_vec4(&mut self, value: &[f32; 4]) -> Result<()> {
        self.write_f32_slice(value)
    }

    /// Write a quaternion as `x, y, z, w`
    pub fn write_quat(&mut self, value: &[f32; 4]) -> Result<()> {
        self.write_f32_slice(value)
    }

    pub fn write_mtx44(&mut self, value: &[f32; 16]) -> Result<()> {
        self.write_f32_slice(value)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(data)?)
    }

    /// Write the raw UTF-8 bytes of a string without any length
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Write a string into a fixed width field, padding with NUL bytes
    pub fn write_padded_string(&mut self, value: &str, width: usize) -> Result<()> {
        let len = value.len();
        if len > width {
            return Err(Error::PaddedStringTooLong { len, width });
        }
        self.write_string(value)?;
        self.pad(width - len)
    }

    /// Write a string prefixed by its `u16` byte length
    pub fn write_sized_string(&mut self, value: &str) -> Result<()> {
        let len = u16::try_from(value.len()).map_err(|_| Error::StringTooLong(value.len()))?;
        self.write_u16(len)?;
        self.write_string(value)
    }

    /// Write a zeroed `u32` placeholder and return its offset
    pub fn reserve_u32(&mut self) -> Result<u64> {
        let offset = self.tell()?;
        self.write_u32(0)?;
        Ok(offset)
    }

    /// Register a size patch for later flushing
    pub fn push_size(&mut self, offset: u64, size: u32) {
        self.size_patches.push(SizePatch { offset, size });
    }

    /// Register the number of bytes written since the placeholder at `offset`
    pub fn close_size(&mut self, offset: u64) -> Result<u32> {
        let written = self.tell()?.saturating_sub(offset + 4);
        let size = u32::try_from(written).map_err(|_| Error::SizeOverflow(written))?;
        self.push_size(offset, size);
        Ok(size)
    }

    /// Pending size patches in registration order
    pub fn size_patches(&self) -> &[SizePatch] {
        &self.size_patches
    }

    /// Write every registered size patch in registration order and restore the position
    #[instrument(skip(self), err)]
    pub fn flush_sizes(&mut self) -> Result<()> {
        if self.size_patches.is_empty() {
            return Ok(());
        }

        let position = self.tell()?;
        trace!("patching {} size fields", self.size_patches.len());
        for patch in std::mem::take(&mut self.size_patches) {
            self.seek(patch.offset)?;
            self.write_u32(patch.size)?;
        }
        self.seek(position)?;

        Ok(())
    }

    /// Flush pending size patches and return the inner writer
    pub fn finish(mut self) -> Result<W> {
        self.flush_sizes()?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for BytesWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Seek> Seek for BytesWriter<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
