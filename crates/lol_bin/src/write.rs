//! Binary property document encoding

use std::{
    io::{Cursor, Seek, Write},
    path::Path,
};

use lol_stream::BytesWriter;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{Bin, BinField, BinType, BinValue, Embedded},
};

impl Bin {
    /// Write the document to a file on disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut bs = BytesWriter::create(path)?;
        self.write_to(&mut bs)?;
        bs.finish()?;
        Ok(())
    }

    /// Encode the document into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bs = BytesWriter::new(Cursor::new(Vec::new()));
        self.write_to(&mut bs)?;
        Ok(bs.into_bytes()?)
    }

    /// Encode the document at the current position of `bs` and patch every size field
    pub fn write_to<W: Write + Seek>(&self, bs: &mut BytesWriter<W>) -> Result<()> {
        if !(1..=3).contains(&self.version) {
            return Err(Error::UnsupportedVersion(self.version));
        }

        if self.is_patch {
            bs.write_string("PTCH")?;
            bs.write_bytes(&self.patch_header)?;
        }
        bs.write_string("PROP")?;
        bs.write_u32(self.version)?;

        if self.version >= 2 {
            bs.write_u32(self.links.len() as u32)?;
            for link in &self.links {
                bs.write_sized_string(link)?;
            }
        }

        bs.write_u32(self.entries.len() as u32)?;
        for entry in &self.entries {
            bs.write_u32(entry.class.hash)?;
        }
        for entry in &self.entries {
            let size = bs.reserve_u32()?;
            bs.write_u32(entry.hash.hash)?;
            write_fields(bs, &entry.fields)?;
            bs.close_size(size)?;
        }

        if self.is_patch && self.version >= 3 {
            bs.write_u32(self.patches.len() as u32)?;
            for patch in &self.patches {
                bs.write_u32(patch.hash.hash)?;
                let size = bs.reserve_u32()?;
                bs.write_u8(patch.value.bin_type() as u8)?;
                bs.write_sized_string(&patch.path)?;
                write_value(bs, &patch.value)?;
                bs.close_size(size)?;
            }
        }

        debug!(
            "wrote {} v{} with {} size fields",
            self.signature(),
            self.version,
            bs.size_patches().len()
        );
        bs.flush_sizes()?;

        Ok(())
    }
}

fn write_fields<W: Write + Seek>(bs: &mut BytesWriter<W>, fields: &[BinField]) -> Result<()> {
    let count = u16::try_from(fields.len())
        .map_err(|_| Error::CustomError(format!("{} fields do not fit a u16", fields.len())))?;
    bs.write_u16(count)?;
    for field in fields {
        bs.write_u32(field.name.hash)?;
        bs.write_u8(field.value.bin_type() as u8)?;
        write_value(bs, &field.value)?;
    }
    Ok(())
}

fn write_embedded<W: Write + Seek>(bs: &mut BytesWriter<W>, object: &Embedded) -> Result<()> {
    bs.write_u32(object.class.hash)?;
    if object.is_null() {
        return Ok(());
    }
    let size = bs.reserve_u32()?;
    write_fields(bs, &object.fields)?;
    bs.close_size(size)?;
    Ok(())
}

fn check_type(expected: BinType, value: &BinValue) -> Result<()> {
    let found = value.bin_type();
    if found != expected {
        return Err(Error::TypeMismatch { expected, found });
    }
    Ok(())
}

fn write_items<W: Write + Seek>(
    bs: &mut BytesWriter<W>,
    value_type: BinType,
    items: &[BinValue],
) -> Result<()> {
    bs.write_u8(value_type as u8)?;
    let size = bs.reserve_u32()?;
    bs.write_u32(items.len() as u32)?;
    for item in items {
        check_type(value_type, item)?;
        write_value(bs, item)?;
    }
    bs.close_size(size)?;
    Ok(())
}

fn write_value<W: Write + Seek>(bs: &mut BytesWriter<W>, value: &BinValue) -> Result<()> {
    match value {
        BinValue::None => {}
        BinValue::Bool(value) => bs.write_bool(*value)?,
        BinValue::I8(value) => bs.write_i8(*value)?,
        BinValue::U8(value) => bs.write_u8(*value)?,
        BinValue::I16(value) => bs.write_i16(*value)?,
        BinValue::U16(value) => bs.write_u16(*value)?,
        BinValue::I32(value) => bs.write_i32(*value)?,
        BinValue::U32(value) => bs.write_u32(*value)?,
        BinValue::I64(value) => bs.write_i64(*value)?,
        BinValue::U64(value) => bs.write_u64(*value)?,
        BinValue::F32(value) => bs.write_f32(*value)?,
        BinValue::Vec2(value) => bs.write_vec2(value)?,
        BinValue::Vec3(value) => bs.write_vec3(value)?,
        BinValue::Vec4(value) => bs.write_vec4(value)?,
        BinValue::Mtx44(value) => bs.write_mtx44(value)?,
        BinValue::Rgba(value) => bs.write_bytes(value)?,
        BinValue::String(value) => bs.write_sized_string(value)?,
        BinValue::Hash(hash) | BinValue::Link(hash) => bs.write_u32(hash.hash)?,
        BinValue::File(hash) => bs.write_u64(hash.hash)?,
        BinValue::List { value_type, items } | BinValue::List2 { value_type, items } => {
            write_items(bs, *value_type, items)?
        }
        BinValue::Pointer(object) | BinValue::Embed(object) => write_embedded(bs, object)?,
        BinValue::Option { value_type, item } => {
            bs.write_u8(*value_type as u8)?;
            match item {
                Some(item) => {
                    check_type(*value_type, item)?;
                    bs.write_u8(1)?;
                    write_value(bs, item)?;
                }
                None => bs.write_u8(0)?,
            }
        }
        BinValue::Map {
            key_type,
            value_type,
            entries,
        } => {
            bs.write_u8(*key_type as u8)?;
            bs.write_u8(*value_type as u8)?;
            let size = bs.reserve_u32()?;
            bs.write_u32(entries.len() as u32)?;
            for (key, value) in entries {
                check_type(*key_type, key)?;
                check_type(*value_type, value)?;
                write_value(bs, key)?;
                write_value(bs, value)?;
            }
            bs.close_size(size)?;
        }
        BinValue::Flag(value) => bs.write_u8(*value)?,
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use lol_hash::BinHash;
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        types::{Bin, BinEntry, BinField, BinType, BinValue, Embedded},
    };

    fn list_of_strings() -> Bin {
        Bin {
            entries: vec![BinEntry {
                hash: BinHash::new(1),
                class: BinHash::new(0x2A),
                fields: vec![BinField::new(
                    BinHash::new(7),
                    BinValue::List {
                        value_type: BinType::String,
                        items: vec![BinValue::String("a".into()), BinValue::String("bc".into())],
                    },
                )],
            }],
            ..Default::default()
        }
    }

    #[traced_test]
    #[test]
    fn write_list_of_strings() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
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

        let output = list_of_strings().to_bytes()?;
        assert_str_eq!(format!("{:02X?}", output), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn patch_document_round_trip() -> Result<()> {
        let bin = Bin {
            is_patch: true,
            patch_header: [1, 0, 0, 0, 7, 0, 0, 0],
            links: vec!["data/shared.bin".into()],
            entries: list_of_strings().entries,
            patches: vec![crate::types::BinPatch {
                hash: BinHash::new(0xABCD),
                path: "mSkin.mScale".into(),
                value: BinValue::Pointer(Embedded::new(
                    BinHash::new(0x99),
                    vec![BinField::new(BinHash::new(3), BinValue::F32(2.5))],
                )),
            }],
            ..Default::default()
        };

        let output = bin.to_bytes()?;
        assert_eq!(&output[..4], b"PTCH");
        let read = Bin::from_bytes(&output)?;
        assert_eq!(read, bin);
        assert_eq!(read.to_bytes()?, output);

        Ok(())
    }

    #[test]
    fn version_one_drops_links() -> Result<()> {
        let bin = Bin {
            version: 1,
            links: vec!["ignored.bin".into()],
            ..Default::default()
        };
        assert_eq!(bin.to_bytes()?, b"PROP\x01\x00\x00\x00\x00\x00\x00\x00".to_vec());

        Ok(())
    }

    #[test]
    fn mismatched_list_item_is_rejected() {
        let mut bin = list_of_strings();
        bin.entries[0].fields[0].value = BinValue::List {
            value_type: BinType::U32,
            items: vec![BinValue::String("a".into())],
        };

        assert!(matches!(
            bin.to_bytes(),
            Err(Error::TypeMismatch {
                expected: BinType::U32,
                found: BinType::String
            })
        ));
    }
}
