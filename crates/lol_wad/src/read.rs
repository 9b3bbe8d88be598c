//! Types for reading WAD archives
//!

use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    ops::Deref,
    path::Path,
};

use binrw::BinRead;
use lol_hash::HashTables;
use tracing::{debug, instrument};

use crate::{
    compression::decompress,
    error::{Error, Result},
    extension::{extension_of, guess_extension},
    types::{TocEntry, Wad, WadChunk, WadHeader},
};

impl Wad {
    /// Read the header and chunk table of an archive on disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Wad> {
        let mut reader = BufReader::new(File::open(path)?);
        Wad::read_from(&mut reader)
    }

    /// Read the header and chunk table, leaving every chunk's data unloaded
    ///
    /// ```no_run
    /// use std::{fs::File, io::BufReader};
    ///
    /// fn list_wad_contents(path: &str) -> lol_wad::error::Result<()> {
    ///     let mut reader = BufReader::new(File::open(path)?);
    ///     let mut wad = lol_wad::Wad::read_from(&mut reader)?;
    ///
    ///     for chunk in wad.chunks.iter_mut() {
    ///         let loaded = chunk.load(&mut reader)?;
    ///         println!("{} {:?} {} bytes", loaded.hash, loaded.extension, loaded.bytes().len());
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Wad> {
        let header = WadHeader::read(reader).map_err(|error| match error {
            binrw::Error::BadMagic { .. } => Error::InvalidSignature,
            error => Error::from(error),
        })?;
        if header.major > 3 {
            return Err(Error::UnsupportedVersion {
                major: header.major,
                minor: header.minor,
            });
        }
        debug!(
            "wad v{}.{} with {} chunks",
            header.major, header.minor, header.chunk_count
        );

        if header.major <= 2 && header.toc_start != 0 {
            reader.seek(SeekFrom::Start(u64::from(header.toc_start)))?;
        }

        let chunks = (0..header.chunk_count as usize)
            .map(|id| {
                let entry = TocEntry::read_args(reader, (header.major,))?;
                WadChunk::from_toc(id, &entry)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Wad {
            major: header.major,
            minor: header.minor,
            checksum: header.checksum,
            chunks,
        })
    }

    /// Resolve chunk names, infer extensions from them and sort the chunks by name
    ///
    /// Sorting changes the order chunks would be written back in; their `id` keeps the original
    /// table position.
    pub fn un_hash(&mut self, tables: &HashTables) {
        for chunk in self.chunks.iter_mut() {
            chunk.hash.un_hash(tables);
            if chunk.extension.is_none() {
                chunk.extension = chunk
                    .hash
                    .name
                    .as_deref()
                    .and_then(extension_of)
                    .map(str::to_owned);
            }
        }
        self.chunks.sort_by_cached_key(|chunk| chunk.hash.to_string());
    }

    /// Find a chunk by its path hash
    pub fn chunk(&self, hash: u64) -> Option<&WadChunk> {
        self.chunks.iter().find(|chunk| chunk.hash.hash == hash)
    }
}

impl WadChunk {
    /// Load and decompress the chunk's content
    ///
    /// Returns `None` for content that cannot be read from the archive itself. The extension is
    /// sniffed from the content when it is not known yet.
    #[instrument(skip(self, reader), fields(hash = %self.hash), err)]
    pub fn read_data<R: Read + Seek>(&mut self, reader: &mut R) -> Result<Option<&[u8]>> {
        let this = self;
        reader.seek(SeekFrom::Start(u64::from(this.offset)))?;
        let mut stored = vec![0; this.compressed_size as usize];
        reader.read_exact(&mut stored)?;

        this.data = decompress(this.compression, stored)?;
        if this.extension.is_none() {
            this.extension = this
                .data
                .as_deref()
                .and_then(guess_extension)
                .map(str::to_owned);
        }
        Ok(this.data.as_deref())
    }

    /// Drop the loaded content
    pub fn free_data(&mut self) {
        self.data = None;
    }

    /// Load the content for the lifetime of the returned guard, which frees it when dropped
    pub fn load<R: Read + Seek>(&mut self, reader: &mut R) -> Result<LoadedChunk<'_>> {
        self.read_data(reader)?;
        Ok(LoadedChunk { chunk: self })
    }
}

/// A chunk with its content loaded, see [`WadChunk::load`]
#[derive(Debug)]
pub struct LoadedChunk<'a> {
    chunk: &'a mut WadChunk,
}

impl LoadedChunk<'_> {
    /// Loaded content, empty for satellite chunks
    pub fn bytes(&self) -> &[u8] {
        self.chunk.data.as_deref().unwrap_or_default()
    }

    /// Whether any content could be loaded
    pub fn has_data(&self) -> bool {
        self.chunk.data.is_some()
    }
}

impl Deref for LoadedChunk<'_> {
    type Target = WadChunk;

    fn deref(&self) -> &WadChunk {
        self.chunk
    }
}

impl Drop for LoadedChunk<'_> {
    fn drop(&mut self) {
        self.chunk.free_data();
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use lol_hash::{xxh64, HashTable, HashTables, PathHash};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        types::{Wad, WadCompression},
    };

    fn single_chunk_v3(compression: u8, content: &[u8]) -> Vec<u8> {
        let mut input = vec![b'R', b'W', 0x03, 0x03];
        input.extend([0u8; 256]);
        input.extend([0u8; 8]);
        input.extend(1u32.to_le_bytes());
        input.extend(xxh64("data/a.bin").to_le_bytes());
        input.extend(304u32.to_le_bytes());
        input.extend((content.len() as u32).to_le_bytes());
        input.extend((content.len() as u32).to_le_bytes());
        input.extend([compression, 0x00, 0x00, 0x00]);
        input.extend([0u8; 8]);
        input.extend(content);
        input
    }

    #[traced_test]
    #[test]
    fn read_chunk_and_sniff() -> Result<()> {
        let content = b"PROP\x01\x00\x00\x00\x00\x00\x00\x00";
        let mut reader = Cursor::new(single_chunk_v3(0, content));
        let mut wad = Wad::read_from(&mut reader)?;

        assert_eq!(wad.chunks.len(), 1);
        let chunk = &mut wad.chunks[0];
        assert_eq!(chunk.offset, 304);
        assert_eq!(chunk.compression, WadCompression::Raw);

        assert_eq!(chunk.read_data(&mut reader)?, Some(&content[..]));
        assert_eq!(chunk.extension.as_deref(), Some("bin"));
        chunk.free_data();
        assert_eq!(chunk.data, None);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn load_guard_frees_data() -> Result<()> {
        let mut reader = Cursor::new(single_chunk_v3(0, b"OggS...."));
        let mut wad = Wad::read_from(&mut reader)?;
        {
            let loaded = wad.chunks[0].load(&mut reader)?;
            assert_eq!(loaded.bytes(), b"OggS....");
            assert_eq!(loaded.extension.as_deref(), Some("ogg"));
        }
        assert_eq!(wad.chunks[0].data, None);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn satellite_chunk_yields_nothing() -> Result<()> {
        let mut reader = Cursor::new(single_chunk_v3(2, b"elsewhere"));
        let mut wad = Wad::read_from(&mut reader)?;
        assert_eq!(wad.chunks[0].read_data(&mut reader)?, None);
        assert_eq!(wad.chunks[0].extension, None);

        Ok(())
    }

    #[test]
    fn reject_bad_headers() {
        let mut bad_magic = single_chunk_v3(0, b"");
        bad_magic[0] = b'X';
        assert!(matches!(
            Wad::read_from(&mut Cursor::new(bad_magic)),
            Err(Error::InvalidSignature)
        ));

        let mut future = single_chunk_v3(0, b"");
        future[2] = 4;
        assert!(matches!(
            Wad::read_from(&mut Cursor::new(future)),
            Err(Error::UnsupportedVersion { major: 4, minor: 3 })
        ));
    }

    #[traced_test]
    #[test]
    fn un_hash_names_and_sorts() -> Result<()> {
        let mut wad = Wad::default();
        for (id, hash) in [xxh64("data/z.bin"), 0x42, xxh64("assets/a.dds")]
            .into_iter()
            .enumerate()
        {
            wad.chunks.push(crate::types::WadChunk {
                id,
                hash: PathHash::new(hash),
                ..Default::default()
            });
        }

        let mut table = HashTable::for_file("hashes.game.txt");
        table.insert(xxh64("data/z.bin"), "data/z.bin");
        table.insert(xxh64("assets/a.dds"), "assets/a.dds");
        let mut tables = HashTables::new();
        tables.register(table);

        wad.un_hash(&tables);
        let names: Vec<String> = wad.chunks.iter().map(|c| c.hash.to_string()).collect();
        assert_eq!(names, ["0000000000000042", "assets/a.dds", "data/z.bin"]);
        assert_eq!(wad.chunks[1].extension.as_deref(), Some("dds"));
        assert_eq!(wad.chunks[1].id, 2);
        assert_eq!(wad.chunks[0].extension, None);

        Ok(())
    }
}
