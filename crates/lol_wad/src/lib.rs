//! This library handles reading from and creating **WAD** archives used by *League of Legends*.
//!
//! A WAD archive (`.wad.client`) stores game files as independently compressed chunks named
//! by the 64-bit xxHash64 of their lowercase path. Names are recovered through the
//! `hashes.game.txt` / `hashes.lcu.txt` tables of [`lol_hash`].
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field           | Description                                           |
//! |----------------|-----------------|-------------------------------------------------------|
//! | 0x0000         | Magic number    | 2 bytes: `RW`                                         |
//! | 0x0002         | Version         | 1 byte major, 1 byte minor                            |
//! | 0x0004         | Signature       | v2: 1 byte ECDSA length + 83 bytes, v3: 256 bytes     |
//! | ...            | Checksum        | 8 bytes, v2 and v3                                    |
//! | ...            | Table layout    | v1 and v2: 2 bytes table start, 2 bytes record size   |
//! | ...            | Chunk count     | 4 bytes                                               |
//!
//! Version 3 archives have a 272 byte header and the chunk table follows it directly.
//!
//! ### Chunk Table
//!
//! | Offset (bytes) | Field             | Description                                         |
//! |----------------|-------------------|-----------------------------------------------------|
//! | 0x00           | Path hash         | 8 bytes: xxHash64 of the lowercase path             |
//! | 0x08           | Offset            | 4 bytes: start of the stored bytes                  |
//! | 0x0C           | Compressed size   | 4 bytes                                             |
//! | 0x10           | Decompressed size | 4 bytes                                             |
//! | 0x14           | Kind              | low nibble compression, high nibble subchunk count  |
//! | 0x15           | Duplicated        | 1 byte: the stored bytes are shared with a chunk    |
//! | 0x16           | Subchunk start    | 2 bytes                                             |
//! | 0x18           | Checksum          | 8 bytes: xxh3 of the stored bytes, v2 and v3        |
//!
//! ### Compression Kinds
//!
//! - `0`: raw
//! - `1`: gzip
//! - `2`: satellite, the data lives outside of the archive and cannot be read
//! - `3`: zstd
//! - `4`: zstd chunked, raw when the zstd magic is missing
//!
//! Archives are always written as version 3.3. Audio banks (`bnk`, `wpk`) are stored raw,
//! everything else with zstd, and identical stored bytes are written once.
//!

pub mod compression;
pub mod error;
pub mod extension;
pub mod read;
pub mod tools;
pub mod types;
pub mod write;

pub use extension::{extension_of, guess_extension};
pub use read::LoadedChunk;
pub use types::{Wad, WadChunk, WadCompression};
pub use write::{WadWriter, WadWriterOptions};
