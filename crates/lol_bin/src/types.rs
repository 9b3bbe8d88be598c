//! Property document model

use std::fmt;

use lol_hash::{BinHash, PathHash};

use crate::error::{Error, Result};

/// On-disk value type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum BinType {
    None = 0,
    Bool = 1,
    I8 = 2,
    U8 = 3,
    I16 = 4,
    U16 = 5,
    I32 = 6,
    U32 = 7,
    I64 = 8,
    U64 = 9,
    F32 = 10,
    Vec2 = 11,
    Vec3 = 12,
    Vec4 = 13,
    Mtx44 = 14,
    Rgba = 15,
    String = 16,
    Hash = 17,
    File = 18,
    List = 128,
    List2 = 129,
    Pointer = 130,
    Embed = 131,
    Link = 132,
    Option = 133,
    Map = 134,
    Flag = 135,
}

const ALL_TYPES: [BinType; 27] = [
    BinType::None,
    BinType::Bool,
    BinType::I8,
    BinType::U8,
    BinType::I16,
    BinType::U16,
    BinType::I32,
    BinType::U32,
    BinType::I64,
    BinType::U64,
    BinType::F32,
    BinType::Vec2,
    BinType::Vec3,
    BinType::Vec4,
    BinType::Mtx44,
    BinType::Rgba,
    BinType::String,
    BinType::Hash,
    BinType::File,
    BinType::List,
    BinType::List2,
    BinType::Pointer,
    BinType::Embed,
    BinType::Link,
    BinType::Option,
    BinType::Map,
    BinType::Flag,
];

impl BinType {
    pub fn from_u8(raw: u8) -> Option<BinType> {
        ALL_TYPES.iter().copied().find(|t| *t as u8 == raw)
    }

    /// Decode a stored tag, shifting composite tags of legacy documents up by one
    pub fn fix(raw: u8, legacy: bool) -> Result<BinType> {
        let tag = if legacy && raw >= 129 {
            raw.checked_add(1).ok_or(Error::UnknownType(raw))?
        } else {
            raw
        };
        BinType::from_u8(tag).ok_or(Error::UnknownType(raw))
    }

    /// Lowercase name used by the text form
    pub fn name(self) -> &'static str {
        match self {
            BinType::None => "none",
            BinType::Bool => "bool",
            BinType::I8 => "i8",
            BinType::U8 => "u8",
            BinType::I16 => "i16",
            BinType::U16 => "u16",
            BinType::I32 => "i32",
            BinType::U32 => "u32",
            BinType::I64 => "i64",
            BinType::U64 => "u64",
            BinType::F32 => "f32",
            BinType::Vec2 => "vec2",
            BinType::Vec3 => "vec3",
            BinType::Vec4 => "vec4",
            BinType::Mtx44 => "mtx44",
            BinType::Rgba => "rgba",
            BinType::String => "string",
            BinType::Hash => "hash",
            BinType::File => "file",
            BinType::List => "list",
            BinType::List2 => "list2",
            BinType::Pointer => "pointer",
            BinType::Embed => "embed",
            BinType::Link => "link",
            BinType::Option => "option",
            BinType::Map => "map",
            BinType::Flag => "flag",
        }
    }

    pub fn from_name(name: &str) -> Option<BinType> {
        ALL_TYPES.iter().copied().find(|t| t.name() == name)
    }

    /// List, list2, option and map carry sub-types of their own
    pub fn is_container(self) -> bool {
        matches!(
            self,
            BinType::List | BinType::List2 | BinType::Option | BinType::Map
        )
    }
}

impl fmt::Display for BinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Class instance stored inline (`embed`) or behind a nullable reference (`pointer`)
///
/// A zero class hash is the null object and carries no fields.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Embedded {
    pub class: BinHash,
    pub fields: Vec<BinField>,
}

impl Embedded {
    pub fn new(class: BinHash, fields: Vec<BinField>) -> Self {
        Embedded { class, fields }
    }

    pub fn null() -> Self {
        Embedded::default()
    }

    pub fn is_null(&self) -> bool {
        self.class.is_null()
    }

    /// First field with the given name hash
    pub fn field(&self, name: u32) -> Option<&BinValue> {
        find_field(&self.fields, name)
    }
}

/// One value of a property document
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinValue {
    None,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mtx44([f32; 16]),
    Rgba([u8; 4]),
    String(String),
    Hash(BinHash),
    File(PathHash),
    List {
        value_type: BinType,
        items: Vec<BinValue>,
    },
    List2 {
        value_type: BinType,
        items: Vec<BinValue>,
    },
    Pointer(Embedded),
    Embed(Embedded),
    Link(BinHash),
    Option {
        value_type: BinType,
        item: Option<Box<BinValue>>,
    },
    Map {
        key_type: BinType,
        value_type: BinType,
        entries: Vec<(BinValue, BinValue)>,
    },
    Flag(u8),
}

impl BinValue {
    /// Tag this value is stored under
    pub fn bin_type(&self) -> BinType {
        match self {
            BinValue::None => BinType::None,
            BinValue::Bool(_) => BinType::Bool,
            BinValue::I8(_) => BinType::I8,
            BinValue::U8(_) => BinType::U8,
            BinValue::I16(_) => BinType::I16,
            BinValue::U16(_) => BinType::U16,
            BinValue::I32(_) => BinType::I32,
            BinValue::U32(_) => BinType::U32,
            BinValue::I64(_) => BinType::I64,
            BinValue::U64(_) => BinType::U64,
            BinValue::F32(_) => BinType::F32,
            BinValue::Vec2(_) => BinType::Vec2,
            BinValue::Vec3(_) => BinType::Vec3,
            BinValue::Vec4(_) => BinType::Vec4,
            BinValue::Mtx44(_) => BinType::Mtx44,
            BinValue::Rgba(_) => BinType::Rgba,
            BinValue::String(_) => BinType::String,
            BinValue::Hash(_) => BinType::Hash,
            BinValue::File(_) => BinType::File,
            BinValue::List { .. } => BinType::List,
            BinValue::List2 { .. } => BinType::List2,
            BinValue::Pointer(_) => BinType::Pointer,
            BinValue::Embed(_) => BinType::Embed,
            BinValue::Link(_) => BinType::Link,
            BinValue::Option { .. } => BinType::Option,
            BinValue::Map { .. } => BinType::Map,
            BinValue::Flag(_) => BinType::Flag,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BinValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_embedded(&self) -> Option<&Embedded> {
        match self {
            BinValue::Pointer(object) | BinValue::Embed(object) => Some(object),
            _ => None,
        }
    }

    /// Items of a list or list2
    pub fn items(&self) -> Option<&[BinValue]> {
        match self {
            BinValue::List { items, .. } | BinValue::List2 { items, .. } => Some(items),
            _ => None,
        }
    }
}

/// A named value inside an entry or an embedded object
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BinField {
    pub name: BinHash,
    pub value: BinValue,
}

impl BinField {
    pub fn new(name: BinHash, value: BinValue) -> Self {
        BinField { name, value }
    }
}

/// A top level object of a document
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BinEntry {
    /// Entry key
    pub hash: BinHash,
    /// Class of the object
    pub class: BinHash,
    pub fields: Vec<BinField>,
}

impl BinEntry {
    pub fn field(&self, name: u32) -> Option<&BinValue> {
        find_field(&self.fields, name)
    }
}

/// Override applied to an entry of another document
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BinPatch {
    pub hash: BinHash,
    pub path: String,
    pub value: BinValue,
}

/// A property document
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bin {
    /// Stored with the `PTCH` signature
    pub is_patch: bool,
    /// Opaque 8 bytes following `PTCH`
    pub patch_header: [u8; 8],
    pub version: u32,
    /// Paths of other documents this one depends on, version 2 and up
    pub links: Vec<String>,
    pub entries: Vec<BinEntry>,
    /// Patch documents of version 3 and up only
    pub patches: Vec<BinPatch>,
}

/// Patch header written when a document did not come from disk
pub const DEFAULT_PATCH_HEADER: [u8; 8] = [1, 0, 0, 0, 0, 0, 0, 0];

impl Default for Bin {
    fn default() -> Self {
        Bin {
            is_patch: false,
            patch_header: DEFAULT_PATCH_HEADER,
            version: 3,
            links: Vec::new(),
            entries: Vec::new(),
            patches: Vec::new(),
        }
    }
}

impl Bin {
    /// The 4 byte signature this document is stored under
    pub fn signature(&self) -> &'static str {
        if self.is_patch {
            "PTCH"
        } else {
            "PROP"
        }
    }

    /// Entries of the given class
    pub fn entries_of_class(&self, class: u32) -> impl Iterator<Item = &BinEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.class.hash == class)
    }
}

fn find_field(fields: &[BinField], name: u32) -> Option<&BinValue> {
    fields
        .iter()
        .find(|field| field.name.hash == name)
        .map(|field| &field.value)
}
