//! Types for reading BNK sound banks
//!

use std::{
    io::{Read, Seek},
    path::Path,
};

use lol_stream::BytesReader;
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result},
    types::{BankHeader, Bnk, BnkSection, HircObject, ObjectType, Wem},
};

/// Bytes of one `DIDX` entry
const WEM_ENTRY_SIZE: u32 = 12;

pub(crate) fn signature<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<[u8; 4]> {
    let mut magic = [0u8; 4];
    let peeked = bs.peek_bytes(4)?;
    magic[..peeked.len()].copy_from_slice(&peeked);
    Ok(magic)
}

fn read_tag<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<[u8; 4]> {
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&bs.read_bytes(4)?);
    Ok(tag)
}

fn read_hierarchy<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Vec<HircObject>> {
    let count = bs.read_u32()?;
    (0..count)
        .map(|_| -> Result<HircObject> {
            let kind = bs.read_u8()?;
            let size = bs.read_u32()?;
            let id = bs.read_u32()?;
            let payload_size = size
                .checked_sub(4)
                .ok_or(Error::TruncatedObject { kind, id })?;
            let payload = bs.read_bytes(payload_size as usize)?;
            Ok(HircObject::new(ObjectType::from(kind), id, payload))
        })
        .collect()
}

impl Bnk {
    /// Read every section of a bank on disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Bnk> {
        let mut bs = BytesReader::open(path)?;
        Bnk::read_from(&mut bs)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Bnk> {
        Bnk::read_from(&mut BytesReader::from_bytes(data))
    }

    /// Read sections until the end of the stream
    ///
    /// `DATA` is skipped and only its position is kept, wems are read later through
    /// [`crate::AudioBank::read_wem`].
    pub fn read_from<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Bnk> {
        let magic = signature(bs)?;
        if &magic != b"BKHD" {
            return Err(Error::InvalidSignature(magic));
        }

        let mut sections = Vec::new();
        while bs.remaining()? >= 8 {
            let tag = read_tag(bs)?;
            let size = bs.read_u32()?;
            let start = bs.tell()?;
            trace!(
                "section {} of {size} bytes at {start}",
                String::from_utf8_lossy(&tag)
            );

            let section = match &tag {
                b"BKHD" => BnkSection::Header(BankHeader {
                    version: bs.read_u32()?,
                    id: bs.read_u32()?,
                    extra: bs.read_bytes(size.saturating_sub(8) as usize)?,
                }),
                b"DIDX" => BnkSection::Index(
                    (0..size / WEM_ENTRY_SIZE)
                        .map(|_| -> Result<Wem> {
                            Ok(Wem {
                                id: bs.read_u32()?,
                                offset: bs.read_u32()?,
                                size: bs.read_u32()?,
                            })
                        })
                        .collect::<Result<_>>()?,
                ),
                b"DATA" => {
                    bs.pad(u64::from(size))?;
                    BnkSection::Data {
                        offset: start,
                        size,
                    }
                }
                b"HIRC" => BnkSection::Hierarchy(read_hierarchy(bs)?),
                _ => BnkSection::Other {
                    tag: String::from_utf8_lossy(&tag).into_owned(),
                    data: bs.read_bytes(size as usize)?,
                },
            };
            bs.seek(start + u64::from(size))?;
            sections.push(section);
        }

        let trailing = bs.remaining()?;
        if trailing > 0 {
            debug!("ignoring {trailing} trailing bytes");
        }
        debug!(
            "bank with {} sections, {} wems",
            sections.len(),
            sections
                .iter()
                .map(|section| match section {
                    BnkSection::Index(wems) => wems.len(),
                    _ => 0,
                })
                .sum::<usize>()
        );

        Ok(Bnk { sections })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        types::{BankHeader, Bnk, BnkSection, HircObject, ObjectType, Wem},
    };

    #[traced_test]
    #[test]
    fn read_sections() -> Result<()> {
        #[rustfmt::skip]
        let data = vec![
            b'B', b'K', b'H', b'D', 0x0C, 0x00, 0x00, 0x00,
            0x86, 0x00, 0x00, 0x00,
            0x2A, 0x00, 0x00, 0x00,
            0xAA, 0xBB, 0xCC, 0xDD,
            b'D', b'I', b'D', b'X', 0x0C, 0x00, 0x00, 0x00,
            0x07, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00,
            b'D', b'A', b'T', b'A', 0x03, 0x00, 0x00, 0x00,
            0x01, 0x02, 0x03,
            b'H', b'I', b'R', b'C', 0x0F, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x03, 0x06, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x01, 0x04,
            b'S', b'T', b'I', b'D', 0x02, 0x00, 0x00, 0x00,
            0xEE, 0xFF,
        ];
        let bnk = Bnk::from_bytes(&data)?;

        assert_eq!(
            bnk.sections,
            [
                BnkSection::Header(BankHeader {
                    version: 134,
                    id: 42,
                    extra: vec![0xAA, 0xBB, 0xCC, 0xDD],
                }),
                BnkSection::Index(vec![Wem {
                    id: 7,
                    offset: 0,
                    size: 3
                }]),
                BnkSection::Data {
                    offset: 48,
                    size: 3
                },
                BnkSection::Hierarchy(vec![HircObject::new(
                    ObjectType::Action,
                    5,
                    vec![0x01, 0x04]
                )]),
                BnkSection::Other {
                    tag: "STID".to_owned(),
                    data: vec![0xEE, 0xFF],
                },
            ]
        );
        assert_eq!(bnk.data_offset(), Some(48));
        assert_eq!(bnk.header().map(|header| header.id), Some(42));

        Ok(())
    }

    #[test]
    fn reject_other_files() {
        assert!(matches!(
            Bnk::from_bytes(b"r3d2\x01\x00\x00\x00"),
            Err(Error::InvalidSignature(magic)) if &magic == b"r3d2"
        ));
        assert!(matches!(
            Bnk::from_bytes(b"BK"),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn truncated_section() {
        #[rustfmt::skip]
        let data = vec![
            b'B', b'K', b'H', b'D', 0x08, 0x00, 0x00, 0x00,
            0x86, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            b'D', b'A', b'T', b'A', 0x40, 0x00, 0x00, 0x00,
            0x01, 0x02,
        ];
        assert!(matches!(
            Bnk::from_bytes(&data),
            Err(Error::StreamError(_))
        ));
    }
}
