//! Writing TEX textures

use std::{
    fs::File,
    io::{BufWriter, Cursor, Seek, Write},
    path::Path,
};

use binrw::BinWrite;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    types::Tex,
};

impl Tex {
    /// Check the data blobs against the header before writing them
    pub fn validate(&self) -> Result<()> {
        let Some(sizes) = self.level_sizes() else {
            if self.data.len() != 1 {
                return Err(Error::LevelCount {
                    expected: 1,
                    found: self.data.len(),
                });
            }
            return Ok(());
        };
        if sizes.len() != self.data.len() {
            return Err(Error::LevelCount {
                expected: sizes.len(),
                found: self.data.len(),
            });
        }
        for (level, (expected, data)) in sizes.into_iter().zip(&self.data).enumerate() {
            if data.len() != expected {
                return Err(Error::LevelSize {
                    level,
                    expected,
                    found: data.len(),
                });
            }
        }
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Header followed by the blobs in order
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.header().write(writer)?;
        for data in &self.data {
            writer.write_all(data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{
        error::{Error, Result},
        types::{Tex, TexFormat},
    };

    #[test]
    fn write_dxt5() -> Result<()> {
        let tex = Tex {
            unknown1: 7,
            unknown2: 3,
            ..Tex::new(4, 4, TexFormat::Dxt5, true, vec![vec![0x11; 16], vec![0x22; 16], vec![0x33; 16]])
        };

        #[rustfmt::skip]
        let mut expected = vec![
            b'T', b'E', b'X', 0,
            0x04, 0x00, 0x04, 0x00,
            0x01, 12, 0x00, 0x01,
        ];
        expected.extend([0x11; 16]);
        expected.extend([0x22; 16]);
        expected.extend([0x33; 16]);
        assert_eq!(tex.to_bytes()?, expected);

        let back = Tex::from_bytes(&expected)?;
        assert_eq!(back.data, tex.data);
        assert_eq!(back.unknown1, 1);

        Ok(())
    }

    #[test]
    fn reject_mismatched_levels() {
        let tex = Tex::new(4, 4, TexFormat::Dxt1, true, vec![vec![0; 8]]);
        assert!(matches!(
            tex.to_bytes(),
            Err(Error::LevelCount {
                expected: 3,
                found: 1
            })
        ));

        let tex = Tex::new(2, 2, TexFormat::Bgra8, true, vec![vec![0; 4], vec![0; 15]]);
        assert!(matches!(
            tex.to_bytes(),
            Err(Error::LevelSize {
                level: 1,
                expected: 16,
                found: 15
            })
        ));

        let tex = Tex::new(2, 2, TexFormat::Etc2, false, Vec::new());
        assert!(matches!(tex.to_bytes(), Err(Error::LevelCount { expected: 1, found: 0 })));
    }
}
