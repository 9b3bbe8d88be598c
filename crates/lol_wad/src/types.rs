//! Base types for structure of WAD file.

use std::fmt;

use binrw::{BinRead, BinWrite};
use lol_hash::PathHash;

use crate::error::{Error, Result};

/// Size of the v3 header, where the chunk table starts
pub const TOC_START: u64 = 272;

/// Size of one chunk table record for major version 2 and up
pub const TOC_ENTRY_SIZE: u64 = 32;

/// Offset of the duplicate flag inside a chunk table record
pub const TOC_DUPLICATED_OFFSET: u64 = 21;

fn signature_size(major: u8) -> usize {
    match major {
        2 => 83,
        3 => 256,
        _ => 0,
    }
}

/// WAD file header
///
/// All of the fields between the version and the chunk count depend on the major version.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(magic = b"RW", little)]
pub struct WadHeader {
    pub major: u8,
    pub minor: u8,

    /// Length of the ECDSA signature, version 2 only
    #[br(if(major == 2))]
    #[bw(if(*major == 2))]
    pub ecdsa_length: u8,

    /// Signature area, 83 bytes for version 2 and 256 for version 3
    #[br(count = signature_size(major))]
    pub signature: Vec<u8>,

    #[br(if(major >= 2))]
    #[bw(if(*major >= 2))]
    pub checksum: u64,

    /// Start of the chunk table, versions 1 and 2
    #[br(if(major <= 2))]
    #[bw(if(*major <= 2))]
    pub toc_start: u16,

    /// Size of a chunk table record, versions 1 and 2
    #[br(if(major <= 2))]
    #[bw(if(*major <= 2))]
    pub toc_entry_size: u16,

    pub chunk_count: u32,
}

impl Default for WadHeader {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            ecdsa_length: 0,
            signature: vec![0; signature_size(3)],
            checksum: 0,
            toc_start: 0,
            toc_entry_size: 0,
            chunk_count: 0,
        }
    }
}

/// One record of the chunk table
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
#[br(import(major: u8))]
#[bw(import(major: u8))]
pub struct TocEntry {
    pub path_hash: u64,
    pub offset: u32,
    pub compressed_size: u32,
    pub decompressed_size: u32,

    /// Compression kind in the low nibble, subchunk count in the high nibble
    pub packed: u8,

    #[br(map = |raw: u8| raw != 0)]
    #[bw(map = |duplicated: &bool| u8::from(*duplicated))]
    pub duplicated: bool,

    pub subchunk_start: u16,

    /// xxh3 checksum of the stored bytes, major version 2 and up
    #[br(if(major >= 2))]
    #[bw(if(major >= 2))]
    pub checksum: u64,
}

/// How the bytes of a chunk are stored
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum WadCompression {
    /// Stored as is
    #[default]
    Raw = 0,
    Gzip = 1,
    /// Reference to a file outside of the archive, never readable
    Satellite = 2,
    Zstd = 3,
    /// Concatenated zstd frames, or raw bytes when the magic is missing
    ZstdChunked = 4,
}

impl TryFrom<u8> for WadCompression {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WadCompression::Raw),
            1 => Ok(WadCompression::Gzip),
            2 => Ok(WadCompression::Satellite),
            3 => Ok(WadCompression::Zstd),
            4 => Ok(WadCompression::ZstdChunked),
            other => Err(Error::UnknownCompression(other)),
        }
    }
}

impl fmt::Display for WadCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WadCompression::Raw => "raw",
            WadCompression::Gzip => "gzip",
            WadCompression::Satellite => "satellite",
            WadCompression::Zstd => "zstd",
            WadCompression::ZstdChunked => "zstd-chunked",
        };
        f.write_str(name)
    }
}

/// A chunk of the archive
///
/// `data` is only filled between [`WadChunk::read_data`] and [`WadChunk::free_data`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WadChunk {
    /// Position in the chunk table
    pub id: usize,
    pub hash: PathHash,
    pub offset: u32,
    pub compressed_size: u32,
    pub decompressed_size: u32,
    pub compression: WadCompression,
    pub duplicated: bool,
    pub subchunk_count: u8,
    pub subchunk_start: u16,
    pub checksum: u64,
    pub data: Option<Vec<u8>>,
    /// File extension without the dot, from the resolved name or sniffed from the content
    pub extension: Option<String>,
}

impl WadChunk {
    pub(crate) fn from_toc(id: usize, entry: &TocEntry) -> Result<Self> {
        Ok(WadChunk {
            id,
            hash: PathHash::new(entry.path_hash),
            offset: entry.offset,
            compressed_size: entry.compressed_size,
            decompressed_size: entry.decompressed_size,
            compression: WadCompression::try_from(entry.packed & 0x0F)?,
            duplicated: entry.duplicated,
            subchunk_count: entry.packed >> 4,
            subchunk_start: entry.subchunk_start,
            checksum: entry.checksum,
            data: None,
            extension: None,
        })
    }

    pub(crate) fn to_toc(&self) -> TocEntry {
        TocEntry {
            path_hash: self.hash.hash,
            offset: self.offset,
            compressed_size: self.compressed_size,
            decompressed_size: self.decompressed_size,
            packed: (self.subchunk_count << 4) | self.compression as u8,
            duplicated: self.duplicated,
            subchunk_start: self.subchunk_start,
            checksum: self.checksum,
        }
    }
}

/// A WAD archive's header information and chunk table
#[derive(Debug, Clone, PartialEq)]
pub struct Wad {
    pub major: u8,
    pub minor: u8,
    pub checksum: u64,
    pub chunks: Vec<WadChunk>,
}

impl Default for Wad {
    fn default() -> Self {
        Wad {
            major: 3,
            minor: 3,
            checksum: 0,
            chunks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::{assert_eq, assert_str_eq};

    use crate::{
        error::Result,
        types::{TocEntry, WadCompression, WadHeader},
    };

    fn v3_header() -> Vec<u8> {
        let mut input = vec![b'R', b'W', 0x03, 0x03];
        input.extend([0u8; 256]);
        #[rustfmt::skip]
        input.extend([
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // checksum
            0x02, 0x00, 0x00, 0x00,                         // chunk count
        ]);
        input
    }

    #[test]
    fn read_v3_header() -> Result<()> {
        let header = WadHeader::read(&mut Cursor::new(v3_header()))?;

        assert_eq!(
            header,
            WadHeader {
                checksum: 0x0102_0304_0506_0708,
                chunk_count: 2,
                ..Default::default()
            }
        );

        Ok(())
    }

    #[test]
    fn write_v3_header() -> Result<()> {
        let header = WadHeader {
            checksum: 0x0102_0304_0506_0708,
            chunk_count: 2,
            ..Default::default()
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual.len() as u64, super::TOC_START);
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", v3_header()));

        Ok(())
    }

    #[test]
    fn read_v1_header() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            b'R', b'W', 0x01, 0x00,
            0x0C, 0x00,             // toc start
            0x18, 0x00,             // toc entry size
            0x00, 0x00, 0x00, 0x00, // chunk count
        ];

        let header = WadHeader::read(&mut Cursor::new(input))?;
        assert_eq!(header.major, 1);
        assert_eq!(header.toc_start, 12);
        assert_eq!(header.toc_entry_size, 24);
        assert!(header.signature.is_empty());

        Ok(())
    }

    #[test]
    fn read_v1_toc_entry_without_checksum() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // path hash
            0x10, 0x01, 0x00, 0x00,                         // offset
            0x05, 0x00, 0x00, 0x00,                         // compressed size
            0x09, 0x00, 0x00, 0x00,                         // decompressed size
            0x21,                                           // 2 subchunks, gzip
            0x01,                                           // duplicated
            0x03, 0x00,                                     // subchunk start
        ];

        let entry = TocEntry::read_args(&mut Cursor::new(input), (1,))?;
        assert_eq!(
            entry,
            TocEntry {
                path_hash: 1,
                offset: 0x110,
                compressed_size: 5,
                decompressed_size: 9,
                packed: 0x21,
                duplicated: true,
                subchunk_start: 3,
                checksum: 0,
            }
        );

        let chunk = super::WadChunk::from_toc(0, &entry)?;
        assert_eq!(chunk.compression, WadCompression::Gzip);
        assert_eq!(chunk.subchunk_count, 2);

        Ok(())
    }

    #[test]
    fn write_v3_toc_entry() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45, 0x23, 0x01, // path hash
            0x10, 0x01, 0x00, 0x00,                         // offset
            0x05, 0x00, 0x00, 0x00,                         // compressed size
            0x09, 0x00, 0x00, 0x00,                         // decompressed size
            0x03,                                           // zstd
            0x00,                                           // duplicated
            0x00, 0x00,                                     // subchunk start
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // checksum
        ];

        let entry = TocEntry {
            path_hash: 0x0123_4567_89AB_CDEF,
            offset: 0x110,
            compressed_size: 5,
            decompressed_size: 9,
            packed: 3,
            checksum: 1,
            ..Default::default()
        };
        let mut actual = Vec::new();
        entry.write_args(&mut Cursor::new(&mut actual), (3,))?;

        assert_eq!(actual.len() as u64, super::TOC_ENTRY_SIZE);
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[test]
    fn unknown_compression_is_rejected() {
        assert!(matches!(
            WadCompression::try_from(7),
            Err(crate::error::Error::UnknownCompression(7))
        ));
    }
}
