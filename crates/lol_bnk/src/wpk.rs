//! Reading and writing WPK wem packages
//!
//! | Offset | Type              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | 0      | `[u8; 4]`         | `r3d2`                               |
//! | 4      | `u32`             | Version, always 1                    |
//! | 8      | `u32`             | Entry count                          |
//! | 12     | `[u32; count]`    | Entry offsets, 0 for an empty slot   |
//!
//! Each entry holds the `u32` offset and size of its data, then the character count and UTF-16
//! characters of its name, `<id>.wem`. Entries and data start on 8 byte boundaries.

use std::{
    io::{Read, Seek, Write},
    path::Path,
};

use binrw::{BinRead, BinWrite};
use lol_stream::{BytesReader, BytesWriter};
use tracing::{debug, instrument, warn};
use widestring::{U16Str, U16String};

use crate::{
    error::{Error, Result},
    types::{Wem, Wpk},
};

const WPK_SIGNATURE: &[u8; 4] = b"r3d2";
const WPK_VERSION: u32 = 1;
const ALIGNMENT: u64 = 8;

#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
struct WpkHeader {
    magic: [u8; 4],
    version: u32,
    count: u32,
    #[br(count = count)]
    offsets: Vec<u32>,
}

#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
struct WpkEntry {
    data_offset: u32,
    size: u32,
    name_len: u32,
    #[br(count = name_len)]
    name: Vec<u16>,
}

impl WpkEntry {
    fn new(wem: &Wem) -> Self {
        let name = U16String::from_str(&format!("{}.wem", wem.id)).into_vec();
        WpkEntry {
            data_offset: wem.offset,
            size: wem.size,
            name_len: name.len() as u32,
            name,
        }
    }

    fn byte_len(&self) -> u64 {
        12 + 2 * self.name.len() as u64
    }

    fn wem(&self) -> Result<Wem> {
        let name = U16Str::from_slice(&self.name)
            .to_string()
            .map_err(|error| Error::CustomError(format!("wpk entry name: {error}")))?;
        let id = name
            .strip_suffix(".wem")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| Error::CustomError(format!("wpk entry {name:?} is not <id>.wem")))?;
        Ok(Wem {
            id,
            offset: self.data_offset,
            size: self.size,
        })
    }
}

fn align(position: u64) -> u64 {
    position.div_ceil(ALIGNMENT) * ALIGNMENT
}

fn offset_u32(offset: u64) -> Result<u32> {
    u32::try_from(offset)
        .map_err(|_| Error::CustomError(format!("wpk offset {offset} does not fit 32 bits")))
}

impl Wpk {
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Wpk> {
        let mut bs = BytesReader::open(path)?;
        Wpk::read_from(&mut bs)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Wpk> {
        Wpk::read_from(&mut BytesReader::from_bytes(data))
    }

    pub fn read_from<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Wpk> {
        let magic = crate::read::signature(bs)?;
        if &magic != WPK_SIGNATURE {
            return Err(Error::InvalidSignature(magic));
        }
        let header = WpkHeader::read(bs)?;
        if header.version != WPK_VERSION {
            return Err(Error::UnsupportedVersion(header.version));
        }

        let mut wems = Vec::with_capacity(header.offsets.len());
        for offset in header.offsets {
            if offset == 0 {
                warn!("skipping empty wpk slot");
                continue;
            }
            bs.seek(u64::from(offset))?;
            wems.push(WpkEntry::read(bs)?.wem()?);
        }
        debug!("wpk with {} wems", wems.len());

        Ok(Wpk {
            version: header.version,
            wems,
        })
    }

    /// Lay the payloads out after the entry table, in wem order
    pub fn layout<P: AsRef<[u8]>>(&self, payloads: &[P]) -> Result<Vec<Wem>> {
        if self.wems.len() != payloads.len() {
            return Err(Error::PayloadCount {
                expected: self.wems.len(),
                found: payloads.len(),
            });
        }

        let mut position = 12 + 4 * self.wems.len() as u64;
        for wem in &self.wems {
            position = align(position) + WpkEntry::new(wem).byte_len();
        }
        self.wems
            .iter()
            .zip(payloads)
            .map(|(wem, payload)| {
                position = align(position);
                let offset = offset_u32(position)?;
                let size = offset_u32(payload.as_ref().len() as u64)?;
                position += u64::from(size);
                Ok(Wem {
                    id: wem.id,
                    offset,
                    size,
                })
            })
            .collect()
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write<P: AsRef<[u8]>>(&self, path: impl AsRef<Path>, payloads: &[P]) -> Result<()> {
        let mut bs = BytesWriter::create(path)?;
        self.write_to(&mut bs, payloads)?;
        bs.finish()?;
        Ok(())
    }

    pub fn to_bytes<P: AsRef<[u8]>>(&self, payloads: &[P]) -> Result<Vec<u8>> {
        let mut bs = BytesWriter::in_memory();
        self.write_to(&mut bs, payloads)?;
        Ok(bs.into_bytes()?)
    }

    /// Write the package with the given payloads, in wem order
    pub fn write_to<W: Write + Seek, P: AsRef<[u8]>>(
        &self,
        bs: &mut BytesWriter<W>,
        payloads: &[P],
    ) -> Result<()> {
        let layout = self.layout(payloads)?;
        let entries: Vec<WpkEntry> = layout.iter().map(WpkEntry::new).collect();

        let mut offsets = Vec::with_capacity(entries.len());
        let mut position = 12 + 4 * entries.len() as u64;
        for entry in &entries {
            position = align(position);
            offsets.push(offset_u32(position)?);
            position += entry.byte_len();
        }

        let start = bs.tell()?;
        WpkHeader {
            magic: *WPK_SIGNATURE,
            version: self.version,
            count: entries.len() as u32,
            offsets: offsets.clone(),
        }
        .write(bs)?;
        for (entry, offset) in entries.iter().zip(&offsets) {
            bs.seek(start + u64::from(*offset))?;
            entry.write(bs)?;
        }
        for (wem, payload) in layout.iter().zip(payloads) {
            let position = bs.tell()?;
            bs.pad((start + u64::from(wem.offset) - position) as usize)?;
            bs.write_bytes(payload.as_ref())?;
        }
        bs.end()?;

        debug!("wrote wpk with {} wems", layout.len());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        types::{Wem, Wpk},
    };

    #[traced_test]
    #[test]
    fn write_package() -> Result<()> {
        let wpk = Wpk {
            version: 1,
            wems: vec![Wem {
                id: 42,
                ..Default::default()
            }],
        };
        let bytes = wpk.to_bytes(&[[0x11u8, 0x22, 0x33]])?;

        #[rustfmt::skip]
        let expected = vec![
            b'r', b'3', b'd', b'2', 0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
            0x06, 0x00, 0x00, 0x00,
            b'4', 0x00, b'2', 0x00, b'.', 0x00, b'w', 0x00, b'e', 0x00, b'm', 0x00,
            0x11, 0x22, 0x33,
        ];
        assert_eq!(bytes, expected);

        assert_eq!(
            Wpk::from_bytes(&bytes)?.wems,
            [Wem {
                id: 42,
                offset: 40,
                size: 3
            }]
        );

        Ok(())
    }

    #[test]
    fn empty_slots_are_skipped() -> Result<()> {
        #[rustfmt::skip]
        let data = vec![
            b'r', b'3', b'd', b'2', 0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            b'7', 0x00, b'.', 0x00, b'w', 0x00, b'e', 0x00, b'm', 0x00,
        ];
        assert_eq!(
            Wpk::from_bytes(&data)?.wems,
            [Wem {
                id: 7,
                offset: 0,
                size: 0
            }]
        );

        Ok(())
    }

    #[test]
    fn reject_versions() {
        assert!(matches!(
            Wpk::from_bytes(b"r3d2\x02\x00\x00\x00\x00\x00\x00\x00"),
            Err(Error::UnsupportedVersion(2))
        ));
        assert!(matches!(
            Wpk::from_bytes(b"BKHD\x00\x00\x00\x00"),
            Err(Error::InvalidSignature(_))
        ));
    }
}
