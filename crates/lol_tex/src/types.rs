//! Base types for structure of TEX file.

use std::fmt;

use binrw::{BinRead, BinWrite};

use crate::error::{Error, Result};

/// Pixel encoding of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TexFormat {
    Etc1,
    Etc2Eac,
    Etc2,
    Dxt1,
    Dxt5,
    Bgra8,
}

impl TexFormat {
    /// Block edge in pixels and bytes per block, for formats stored as mip levels
    pub fn block(self) -> Option<(usize, usize)> {
        match self {
            TexFormat::Dxt1 => Some((4, 8)),
            TexFormat::Dxt5 => Some((4, 16)),
            TexFormat::Bgra8 => Some((1, 4)),
            TexFormat::Etc1 | TexFormat::Etc2Eac | TexFormat::Etc2 => None,
        }
    }
}

impl TryFrom<u8> for TexFormat {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            1 => Ok(TexFormat::Etc1),
            2 => Ok(TexFormat::Etc2Eac),
            3 => Ok(TexFormat::Etc2),
            10 => Ok(TexFormat::Dxt1),
            12 => Ok(TexFormat::Dxt5),
            20 => Ok(TexFormat::Bgra8),
            other => Err(Error::UnknownFormat(other)),
        }
    }
}

impl From<TexFormat> for u8 {
    fn from(format: TexFormat) -> Self {
        match format {
            TexFormat::Etc1 => 1,
            TexFormat::Etc2Eac => 2,
            TexFormat::Etc2 => 3,
            TexFormat::Dxt1 => 10,
            TexFormat::Dxt5 => 12,
            TexFormat::Bgra8 => 20,
        }
    }
}

impl fmt::Display for TexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TexFormat::Etc1 => "ETC1",
            TexFormat::Etc2Eac => "ETC2_EAC",
            TexFormat::Etc2 => "ETC2",
            TexFormat::Dxt1 => "DXT1",
            TexFormat::Dxt5 => "DXT5",
            TexFormat::Bgra8 => "BGRA8",
        };
        write!(f, "{name}")
    }
}

/// TEX file header
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(magic = b"TEX\0", little)]
pub struct TexHeader {
    pub width: u16,
    pub height: u16,
    pub unknown1: u8,
    pub format: u8,
    pub unknown2: u8,
    #[br(map = |raw: u8| raw != 0)]
    #[bw(map = |mipmaps: &bool| u8::from(*mipmaps))]
    pub mipmaps: bool,
}

/// A texture and its encoded pixel data
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tex {
    pub width: u16,
    pub height: u16,
    pub format: TexFormat,
    pub unknown1: u8,
    pub unknown2: u8,
    pub mipmaps: bool,
    /// Mip levels from the smallest to the full size, or a single blob
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<Vec<u8>>,
}

impl Tex {
    /// Whether `data` holds one entry per mip level
    pub fn has_levels(&self) -> bool {
        self.mipmaps && self.format.block().is_some()
    }

    /// Number of mip levels down to 1x1, the bit length of the larger side
    pub fn mip_count(&self) -> usize {
        let side = self.width.max(self.height);
        (u16::BITS - side.leading_zeros()) as usize
    }

    /// Byte size of every mip level, smallest first
    ///
    /// `None` for textures stored as one blob.
    ///
    /// ```
    /// use lol_tex::{Tex, TexFormat};
    ///
    /// let tex = Tex::new(8, 4, TexFormat::Bgra8, true, Vec::new());
    /// assert_eq!(tex.level_sizes(), Some(vec![4, 8, 32, 128]));
    /// ```
    pub fn level_sizes(&self) -> Option<Vec<usize>> {
        let (block, bytes_per_block) = self.format.block().filter(|_| self.mipmaps)?;
        let (width, height) = (usize::from(self.width), usize::from(self.height));
        Some(
            (0..self.mip_count())
                .rev()
                .map(|level| {
                    let level_width = (width >> level).max(1);
                    let level_height = (height >> level).max(1);
                    level_width.div_ceil(block) * level_height.div_ceil(block) * bytes_per_block
                })
                .collect(),
        )
    }

    pub fn new(width: u16, height: u16, format: TexFormat, mipmaps: bool, data: Vec<Vec<u8>>) -> Self {
        Tex {
            width,
            height,
            format,
            unknown1: 1,
            unknown2: 0,
            mipmaps,
            data,
        }
    }

    pub(crate) fn header(&self) -> TexHeader {
        TexHeader {
            width: self.width,
            height: self.height,
            unknown1: 1,
            format: self.format.into(),
            unknown2: 0,
            mipmaps: self.mipmaps,
        }
    }

    /// The full size image data
    pub fn largest_level(&self) -> Option<&[u8]> {
        self.data.last().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Tex, TexFormat};

    #[test]
    fn mip_levels() {
        let tex = Tex::new(5, 3, TexFormat::Dxt1, true, Vec::new());
        assert_eq!(tex.mip_count(), 3);
        // 1x1, 2x1 and 5x3 all fit within 1 or 2x1 blocks
        assert_eq!(tex.level_sizes(), Some(vec![8, 8, 16]));

        let tex = Tex::new(256, 256, TexFormat::Dxt5, true, Vec::new());
        let sizes = tex.level_sizes().unwrap_or_default();
        assert_eq!(sizes.len(), 9);
        assert_eq!(sizes.last(), Some(&(64 * 64 * 16)));
        assert_eq!(sizes[0], 16);
    }

    #[test]
    fn single_blob_formats() {
        assert_eq!(
            Tex::new(64, 64, TexFormat::Etc1, true, Vec::new()).level_sizes(),
            None
        );
        assert_eq!(
            Tex::new(64, 64, TexFormat::Dxt1, false, Vec::new()).level_sizes(),
            None
        );
    }

    #[test]
    fn format_bytes() {
        assert_eq!(TexFormat::try_from(12).ok(), Some(TexFormat::Dxt5));
        assert_eq!(u8::from(TexFormat::Bgra8), 20);
        assert!(TexFormat::try_from(11).is_err());
        assert_eq!(TexFormat::Etc2Eac.to_string(), "ETC2_EAC");
    }
}
