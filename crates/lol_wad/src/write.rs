//! Types for writing WAD archives
//!

use std::{
    fs::File,
    io::{BufWriter, Seek, SeekFrom, Write},
    path::Path,
};

use binrw::BinWrite;
use bon::Builder;
use lol_hash::PathHash;
use tracing::{debug, instrument};
use xxhash_rust::xxh3::xxh3_64;

use crate::{
    compression::compress_zstd,
    error::{Error, Result},
    extension::{extension_of, guess_extension},
    types::{
        TocEntry, WadChunk, WadCompression, WadHeader, TOC_DUPLICATED_OFFSET, TOC_ENTRY_SIZE,
        TOC_START,
    },
};

/// Written archives are always version 3.3
const WRITE_MAJOR: u8 = 3;

/// Extensions stored without compression
const RAW_EXTENSIONS: [&str; 2] = ["bnk", "wpk"];

/// Options for how the WAD file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct WadWriterOptions {
    /// zstd compression level
    #[builder(default = 3)]
    pub level: i32,
}

impl Default for WadWriterOptions {
    fn default() -> Self {
        WadWriterOptions::builder().build()
    }
}

fn table_offset(id: usize) -> u64 {
    TOC_START + id as u64 * TOC_ENTRY_SIZE
}

impl WadChunk {
    /// Store `data` as chunk `id` of an archive whose header and table are already in `writer`
    ///
    /// The content is appended at the end of the archive unless one of `previous` already
    /// stores the same bytes, in which case both are flagged duplicated and share that offset.
    /// The table record of this chunk, and the duplicate flag of the earlier one, are written in
    /// place so chunks can be stored in any order.
    #[instrument(skip(self, writer, data, previous, options), fields(size = data.len()), err)]
    pub fn write_data<W: Write + Seek>(
        &mut self,
        writer: &mut W,
        id: usize,
        hash: PathHash,
        data: &[u8],
        previous: &mut [WadChunk],
        options: &WadWriterOptions,
    ) -> Result<()> {
        if self.extension.is_none() {
            self.extension = hash
                .name
                .as_deref()
                .and_then(extension_of)
                .or_else(|| guess_extension(data))
                .map(str::to_owned);
        }

        let stored = match self.extension.as_deref() {
            Some(extension) if RAW_EXTENSIONS.contains(&extension) => {
                self.compression = WadCompression::Raw;
                data.to_vec()
            }
            _ => {
                self.compression = WadCompression::Zstd;
                compress_zstd(data, options.level)?
            }
        };
        self.id = id;
        self.hash = hash;
        self.compressed_size = size_u32(stored.len() as u64)?;
        self.decompressed_size = size_u32(data.len() as u64)?;
        self.checksum = xxh3_64(&stored);
        self.duplicated = false;
        self.subchunk_count = 0;
        self.subchunk_start = 0;

        let original = previous.iter_mut().find(|chunk| {
            chunk.checksum == self.checksum
                && chunk.compressed_size == self.compressed_size
                && chunk.decompressed_size == self.decompressed_size
        });
        match original {
            Some(original) => {
                if !original.duplicated {
                    original.duplicated = true;
                    writer.seek(SeekFrom::Start(
                        table_offset(original.id) + TOC_DUPLICATED_OFFSET,
                    ))?;
                    writer.write_all(&[1])?;
                }
                debug!("chunk {id} duplicates chunk {}", original.id);
                self.duplicated = true;
                self.offset = original.offset;
            }
            None => {
                let end = writer.seek(SeekFrom::End(0))?;
                self.offset = u32::try_from(end).map_err(|_| Error::ArchiveTooLarge(end))?;
                writer.write_all(&stored)?;
            }
        }

        writer.seek(SeekFrom::Start(table_offset(id)))?;
        self.to_toc().write_args(writer, (WRITE_MAJOR,))?;

        Ok(())
    }
}

fn size_u32(size: u64) -> Result<u32> {
    u32::try_from(size).map_err(|_| Error::ArchiveTooLarge(size))
}

/// WAD archive generator
///
/// The header and a zeroed chunk table are written up front; chunks then land at their fixed
/// table position whatever order they are written in.
///
/// ```
/// # fn doit() -> lol_wad::error::Result<()>
/// # {
/// use lol_hash::PathHash;
/// use lol_wad::{WadWriter, WadWriterOptions};
///
/// let mut wad = WadWriter::new(std::io::Cursor::new(Vec::new()), 2, WadWriterOptions::default())?;
/// wad.write_data(1, PathHash::from_raw("data/b.txt"), b"second")?;
/// wad.write_data(0, PathHash::from_raw("data/a.txt"), b"first")?;
///
/// let archive = wad.finish()?;
/// assert_eq!(&archive.get_ref()[..4], b"RW\x03\x03");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct WadWriter<W: Write + Seek> {
    inner: W,
    options: WadWriterOptions,
    count: usize,
    /// Chunks in the order they were written
    written: Vec<WadChunk>,
}

impl WadWriter<BufWriter<File>> {
    /// Create an archive on disk with room for `count` chunks
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn create(
        path: impl AsRef<Path>,
        count: usize,
        options: WadWriterOptions,
    ) -> Result<Self> {
        WadWriter::new(BufWriter::new(File::create(path)?), count, options)
    }
}

impl<W: Write + Seek> WadWriter<W> {
    /// Write the v3.3 header and a zeroed table of `count` chunks
    pub fn new(mut inner: W, count: usize, options: WadWriterOptions) -> Result<Self> {
        let header = WadHeader {
            chunk_count: u32::try_from(count)
                .map_err(|_| Error::CustomError(format!("{count} chunks do not fit a wad")))?,
            ..Default::default()
        };
        header.write(&mut inner)?;
        for _ in 0..count {
            TocEntry::default().write_args(&mut inner, (WRITE_MAJOR,))?;
        }

        Ok(WadWriter {
            inner,
            options,
            count,
            written: Vec::with_capacity(count),
        })
    }

    /// Store the content of chunk `id`
    pub fn write_data(&mut self, id: usize, hash: PathHash, data: &[u8]) -> Result<&WadChunk> {
        if id >= self.count {
            return Err(Error::ChunkOutOfRange {
                id,
                count: self.count,
            });
        }

        let mut chunk = WadChunk::default();
        chunk.write_data(
            &mut self.inner,
            id,
            hash,
            data,
            &mut self.written,
            &self.options,
        )?;
        self.written.push(chunk);

        Ok(&self.written[self.written.len() - 1])
    }

    /// Chunks written so far, in table order
    pub fn chunks(&self) -> Vec<&WadChunk> {
        let mut chunks: Vec<&WadChunk> = self.written.iter().collect();
        chunks.sort_by_key(|chunk| chunk.id);
        chunks
    }

    /// Flush and return the inner writer
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
