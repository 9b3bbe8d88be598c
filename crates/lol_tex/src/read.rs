//! Reading TEX textures

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use binrw::BinRead;
use lol_stream::BytesReader;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{Tex, TexFormat, TexHeader},
};

impl Tex {
    /// Read a texture file
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Tex> {
        let mut reader = BufReader::new(File::open(path)?);
        Tex::read_from(&mut reader)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Tex> {
        Tex::read_from(&mut std::io::Cursor::new(data))
    }

    /// Read the header, then every mip level or the single data blob
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Tex> {
        let header = TexHeader::read(reader).map_err(|error| match error {
            binrw::Error::BadMagic { .. } => Error::InvalidSignature,
            error => Error::from(error),
        })?;
        let mut tex = Tex {
            width: header.width,
            height: header.height,
            format: TexFormat::try_from(header.format)?,
            unknown1: header.unknown1,
            unknown2: header.unknown2,
            mipmaps: header.mipmaps,
            data: Vec::new(),
        };
        debug!(
            "{}x{} {} texture, mipmaps: {}",
            tex.width, tex.height, tex.format, tex.mipmaps
        );

        let mut bs = BytesReader::new(reader)?;
        tex.data = match tex.level_sizes() {
            Some(sizes) => sizes
                .into_iter()
                .map(|size| bs.read_bytes(size))
                .collect::<lol_stream::error::Result<Vec<_>>>()?,
            None => vec![bs.read_to_end()?],
        };

        Ok(tex)
    }
}
