//! Chunk compression and decompression handling.

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::{instrument, warn};

use crate::{error::Result, types::WadCompression};

/// First bytes of every zstd frame
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Turn the stored bytes of a chunk back into its content
///
/// Satellite chunks reference data outside of the archive and yield `None`.
#[instrument(skip(stored), fields(size = stored.len()), err)]
pub fn decompress(compression: WadCompression, stored: Vec<u8>) -> Result<Option<Vec<u8>>> {
    let data = match compression {
        WadCompression::Raw => stored,
        WadCompression::Gzip => {
            let mut data = Vec::new();
            GzDecoder::new(stored.as_slice()).read_to_end(&mut data)?;
            data
        }
        WadCompression::Satellite => {
            warn!("satellite chunks are not supported, skipping its data");
            return Ok(None);
        }
        WadCompression::Zstd => zstd::stream::decode_all(stored.as_slice())?,
        WadCompression::ZstdChunked => {
            if stored.starts_with(&ZSTD_MAGIC) {
                zstd::stream::decode_all(stored.as_slice())?
            } else {
                stored
            }
        }
    };
    Ok(Some(data))
}

/// Compress chunk content for storage with [`WadCompression::Zstd`]
pub fn compress_zstd(data: &[u8], level: i32) -> Result<Vec<u8>> {
    Ok(zstd::stream::encode_all(data, level)?)
}
