//! Binary property document decoding

use std::{
    io::{Read, Seek},
    path::Path,
};

use lol_hash::{BinHash, PathHash};
use lol_stream::BytesReader;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Error, Result},
    types::{Bin, BinEntry, BinField, BinPatch, BinType, BinValue, Embedded},
};

impl Bin {
    /// Read a document from a file on disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Bin> {
        let mut bs = BytesReader::open(path)?;
        Bin::read_from(&mut bs)
    }

    /// Read a document from memory
    ///
    /// ```
    /// # fn doit() -> lol_bin::error::Result<()>
    /// # {
    /// use lol_bin::Bin;
    ///
    /// let bytes = b"PROP\x01\x00\x00\x00\x00\x00\x00\x00";
    /// let bin = Bin::from_bytes(bytes)?;
    /// assert_eq!(bin.version, 1);
    /// assert!(bin.entries.is_empty());
    /// # Ok(())
    /// # }
    /// # doit().unwrap();
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Bin> {
        let mut bs = BytesReader::from_bytes(data);
        Bin::read_from(&mut bs)
    }

    /// Decode a document starting at the current position of `bs`
    ///
    /// Documents written with the older tag numbering fail to decode with the current one, so any
    /// error in the entries reads them once more with [`BytesReader::legacy_read`] set.
    pub fn read_from<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Bin> {
        let mut bin = Bin::default();

        let mut signature = read_signature(bs)?;
        if &signature == b"PTCH" {
            bin.is_patch = true;
            bin.patch_header.copy_from_slice(&bs.read_bytes(8)?);
            signature = read_signature(bs)?;
            if &signature != b"PROP" {
                return Err(Error::MissingProp);
            }
        } else if &signature != b"PROP" {
            return Err(Error::InvalidSignature(signature));
        }

        bin.version = bs.read_u32()?;
        if !(1..=3).contains(&bin.version) {
            return Err(Error::UnsupportedVersion(bin.version));
        }

        if bin.version >= 2 {
            let count = bs.read_u32()?;
            bin.links = (0..count)
                .map(|_| bs.read_sized_string())
                .collect::<lol_stream::error::Result<_>>()?;
        }

        let count = bs.read_u32()? as usize;
        let classes = (0..count)
            .map(|_| bs.read_u32())
            .collect::<lol_stream::error::Result<Vec<_>>>()?;
        let entries_offset = bs.tell()?;

        bs.legacy_read = false;
        bin.entries = match read_entries(bs, &classes) {
            Err(error) => {
                warn!("{error}, retrying with legacy type tags");
                bs.seek(entries_offset)?;
                bs.legacy_read = true;
                read_entries(bs, &classes)?
            }
            Ok(entries) => entries,
        };

        if bin.is_patch && bin.version >= 3 {
            let count = bs.read_u32()?;
            bin.patches = (0..count)
                .map(|_| read_patch(bs))
                .collect::<Result<_>>()?;
        }

        debug!(
            "read {} v{} with {} entries and {} patches",
            bin.signature(),
            bin.version,
            bin.entries.len(),
            bin.patches.len()
        );

        Ok(bin)
    }
}

fn read_signature<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<[u8; 4]> {
    let mut signature = [0u8; 4];
    signature.copy_from_slice(&bs.read_bytes(4)?);
    Ok(signature)
}

fn read_entries<R: Read + Seek>(bs: &mut BytesReader<R>, classes: &[u32]) -> Result<Vec<BinEntry>> {
    classes
        .iter()
        .map(|class| {
            bs.read_u32()?; // size
            let hash = BinHash::new(bs.read_u32()?);
            let count = bs.read_u16()?;
            let fields = read_fields(bs, count as usize)?;
            Ok(BinEntry {
                hash,
                class: BinHash::new(*class),
                fields,
            })
        })
        .collect()
}

fn read_patch<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<BinPatch> {
    let hash = BinHash::new(bs.read_u32()?);
    bs.read_u32()?; // size
    let value_type = read_type(bs)?;
    let path = bs.read_sized_string()?;
    let value = read_value(bs, value_type)?;
    Ok(BinPatch { hash, path, value })
}

fn read_type<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<BinType> {
    let raw = bs.read_u8()?;
    BinType::fix(raw, bs.legacy_read)
}

fn read_fields<R: Read + Seek>(bs: &mut BytesReader<R>, count: usize) -> Result<Vec<BinField>> {
    (0..count)
        .map(|_| {
            let name = BinHash::new(bs.read_u32()?);
            let value_type = read_type(bs)?;
            let value = read_value(bs, value_type)?;
            Ok(BinField { name, value })
        })
        .collect()
}

fn read_embedded<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Embedded> {
    let class = BinHash::new(bs.read_u32()?);
    if class.is_null() {
        return Ok(Embedded::null());
    }
    bs.read_u32()?; // size
    let count = bs.read_u16()?;
    let fields = read_fields(bs, count as usize)?;
    Ok(Embedded { class, fields })
}

fn read_items<R: Read + Seek>(
    bs: &mut BytesReader<R>,
) -> Result<(BinType, Vec<BinValue>)> {
    let value_type = read_type(bs)?;
    bs.read_u32()?; // size
    let count = bs.read_u32()?;
    let items = (0..count)
        .map(|_| read_value(bs, value_type))
        .collect::<Result<_>>()?;
    Ok((value_type, items))
}

fn read_value<R: Read + Seek>(bs: &mut BytesReader<R>, value_type: BinType) -> Result<BinValue> {
    let value = match value_type {
        BinType::None => BinValue::None,
        BinType::Bool => BinValue::Bool(bs.read_bool()?),
        BinType::I8 => BinValue::I8(bs.read_i8()?),
        BinType::U8 => BinValue::U8(bs.read_u8()?),
        BinType::I16 => BinValue::I16(bs.read_i16()?),
        BinType::U16 => BinValue::U16(bs.read_u16()?),
        BinType::I32 => BinValue::I32(bs.read_i32()?),
        BinType::U32 => BinValue::U32(bs.read_u32()?),
        BinType::I64 => BinValue::I64(bs.read_i64()?),
        BinType::U64 => BinValue::U64(bs.read_u64()?),
        BinType::F32 => BinValue::F32(bs.read_f32()?),
        BinType::Vec2 => BinValue::Vec2(bs.read_vec2()?),
        BinType::Vec3 => BinValue::Vec3(bs.read_vec3()?),
        BinType::Vec4 => BinValue::Vec4(bs.read_vec4()?),
        BinType::Mtx44 => BinValue::Mtx44(bs.read_mtx44()?),
        BinType::Rgba => {
            let mut rgba = [0u8; 4];
            rgba.copy_from_slice(&bs.read_bytes(4)?);
            BinValue::Rgba(rgba)
        }
        BinType::String => BinValue::String(bs.read_sized_string()?),
        BinType::Hash => BinValue::Hash(BinHash::new(bs.read_u32()?)),
        BinType::File => BinValue::File(PathHash::new(bs.read_u64()?)),
        BinType::List => {
            let (value_type, items) = read_items(bs)?;
            BinValue::List { value_type, items }
        }
        BinType::List2 => {
            let (value_type, items) = read_items(bs)?;
            BinValue::List2 { value_type, items }
        }
        BinType::Pointer => BinValue::Pointer(read_embedded(bs)?),
        BinType::Embed => BinValue::Embed(read_embedded(bs)?),
        BinType::Link => BinValue::Link(BinHash::new(bs.read_u32()?)),
        BinType::Option => {
            let value_type = read_type(bs)?;
            let count = bs.read_u8()?;
            let item = if count != 0 {
                Some(Box::new(read_value(bs, value_type)?))
            } else {
                None
            };
            BinValue::Option { value_type, item }
        }
        BinType::Map => {
            let key_type = read_type(bs)?;
            let value_type = read_type(bs)?;
            bs.read_u32()?; // size
            let count = bs.read_u32()?;
            let entries = (0..count)
                .map(|_| Ok((read_value(bs, key_type)?, read_value(bs, value_type)?)))
                .collect::<Result<_>>()?;
            BinValue::Map {
                key_type,
                value_type,
                entries,
            }
        }
        BinType::Flag => BinValue::Flag(bs.read_u8()?),
    };
    Ok(value)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use lol_hash::BinHash;

    use crate::{
        error::{Error, Result},
        types::{Bin, BinField, BinType, BinValue, Embedded},
    };

    #[traced_test]
    #[test]
    fn read_list_of_strings() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            b'P', b'R', b'O', b'P',
            0x03, 0x00, 0x00, 0x00,         // version
            0x00, 0x00, 0x00, 0x00,         // links
            0x01, 0x00, 0x00, 0x00,         // entry count
            0x2A, 0x00, 0x00, 0x00,         // entry class
            0x1B, 0x00, 0x00, 0x00,         // entry size
            0x01, 0x00, 0x00, 0x00,         // entry key
            0x01, 0x00,                     // field count
            0x07, 0x00, 0x00, 0x00,         // field name
            0x80,                           // list
            0x10,                           // of string
            0x0B, 0x00, 0x00, 0x00,         // size
            0x02, 0x00, 0x00, 0x00,         // count
            0x01, 0x00, b'a',
            0x02, 0x00, b'b', b'c',
        ];

        let bin = Bin::from_bytes(&input)?;
        assert_eq!(bin.entries.len(), 1);
        let entry = &bin.entries[0];
        assert_eq!(entry.class.hash, 0x2A);
        assert_eq!(entry.hash.hash, 1);
        assert_eq!(
            entry.field(7),
            Some(&BinValue::List {
                value_type: BinType::String,
                items: vec![BinValue::String("a".into()), BinValue::String("bc".into())],
            })
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn legacy_tags_retry() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            b'P', b'R', b'O', b'P',
            0x01, 0x00, 0x00, 0x00,         // version
            0x01, 0x00, 0x00, 0x00,         // entry count
            0x2A, 0x00, 0x00, 0x00,         // entry class
            0x2A, 0x00, 0x00, 0x00,         // entry size
            0x01, 0x00, 0x00, 0x00,         // entry key
            0x03, 0x00,                     // field count
            0x07, 0x00, 0x00, 0x00,         // field name
            0x81,                           // legacy pointer, list2 otherwise
            0x40, 0x00, 0x00, 0x00,         // class
            0x02, 0x00, 0x00, 0x00,         // size
            0x00, 0x00,                     // field count
            0x08, 0x00, 0x00, 0x00,         // field name
            0x86,                           // legacy flag
            0x01,
            0x09, 0x00, 0x00, 0x00,         // field name
            0x85,                           // legacy map
            0x03, 0x03,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let bin = Bin::from_bytes(&input)?;
        assert!(logs_contain("retrying with legacy type tags"));
        let entry = &bin.entries[0];
        assert_eq!(
            entry.field(7),
            Some(&BinValue::Pointer(Embedded::new(BinHash::new(0x40), Vec::new())))
        );
        assert_eq!(entry.field(8), Some(&BinValue::Flag(1)));
        assert_eq!(
            entry.field(9),
            Some(&BinValue::Map {
                key_type: BinType::U8,
                value_type: BinType::U8,
                entries: Vec::new(),
            })
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn legacy_retry_after_truncated_read() -> Result<()> {
        #[rustfmt::skip]
        let input = vec![
            b'P', b'R', b'O', b'P',
            0x01, 0x00, 0x00, 0x00,         // version
            0x01, 0x00, 0x00, 0x00,         // entry count
            0x2A, 0x00, 0x00, 0x00,         // entry class
            0x1A, 0x00, 0x00, 0x00,         // entry size
            0x01, 0x00, 0x00, 0x00,         // entry key
            0x01, 0x00,                     // field count
            0x07, 0x00, 0x00, 0x00,         // field name
            0x81,                           // legacy pointer, list2 of strings otherwise
            0x10, 0x00, 0x00, 0x00,         // class
            0x08, 0x00, 0x00, 0x00,         // size
            0x01, 0x00,                     // field count
            0x08, 0x00, 0x00, 0x00,         // field name
            0x01,                           // bool
            0x01,
        ];

        let bin = Bin::from_bytes(&input)?;
        assert!(logs_contain("retrying with legacy type tags"));
        assert_eq!(
            bin.entries[0].field(7),
            Some(&BinValue::Pointer(Embedded::new(
                BinHash::new(0x10),
                vec![BinField::new(BinHash::new(8), BinValue::Bool(true))],
            )))
        );

        Ok(())
    }

    #[test]
    fn reject_bad_headers() {
        assert!(matches!(
            Bin::from_bytes(b"ABCD\x03\x00\x00\x00"),
            Err(Error::InvalidSignature(sig)) if &sig == b"ABCD"
        ));
        assert!(matches!(
            Bin::from_bytes(b"PROP\x04\x00\x00\x00"),
            Err(Error::UnsupportedVersion(4))
        ));
        assert!(matches!(
            Bin::from_bytes(b"PTCH\x01\x00\x00\x00\x00\x00\x00\x00PRO!"),
            Err(Error::MissingProp)
        ));
    }

    #[test]
    fn unknown_tag_in_both_modes_is_fatal() {
        #[rustfmt::skip]
        let input = vec![
            b'P', b'R', b'O', b'P',
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x2A, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0x07, 0x00, 0x00, 0x00,
            0x40,
        ];

        assert!(matches!(
            Bin::from_bytes(&input),
            Err(Error::UnknownType(0x40))
        ));
    }
}
