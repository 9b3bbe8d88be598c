//! Reading and writing League of Legends property documents (`.bin`).
//!
//! A document is a list of entries, each an instance of a class with named, typed fields. Every
//! name (entries, classes, fields) is stored as a 32-bit FNV-1a hash; file references are stored
//! as 64-bit xxHash64 path hashes. [`Bin::un_hash`] resolves them through a
//! [`lol_hash::HashTables`] context.
//!
//! ## Binary Layout
//!
//! | Field           | Size       | Notes                                                   |
//! |-----------------|------------|---------------------------------------------------------|
//! | signature       | 4          | `PROP`, or `PTCH` + 8 byte header + `PROP`              |
//! | version         | 4          | 1 to 3                                                  |
//! | links           | 4 + n      | version 2 and up, `u32` count of sized strings          |
//! | entry count     | 4          |                                                         |
//! | entry classes   | 4 * count  | class hash of each entry                                |
//! | entries         | ...        | `u32` size, `u32` key, `u16` field count, fields        |
//! | patches         | ...        | `PTCH` version 3 only                                   |
//!
//! A field is a `u32` name hash, a `u8` type tag and the payload:
//!
//! | Tag | Type      | Payload                                                          |
//! |-----|-----------|------------------------------------------------------------------|
//! | 0   | `none`    | nothing                                                          |
//! | 1-9 | integers  | `bool`, `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`     |
//! | 10  | `f32`     |                                                                  |
//! | 11-14 | vectors | `vec2`, `vec3`, `vec4`, `mtx44`                                  |
//! | 15  | `rgba`    | 4 bytes                                                          |
//! | 16  | `string`  | `u16` length + UTF-8                                             |
//! | 17  | `hash`    | `u32`                                                            |
//! | 18  | `file`    | `u64`                                                            |
//! | 128 | `list`    | `u8` item tag, `u32` size, `u32` count, items                    |
//! | 129 | `list2`   | same as `list`                                                   |
//! | 130 | `pointer` | `u32` class, then if non-zero `u32` size, `u16` count, fields    |
//! | 131 | `embed`   | same as `pointer`                                                |
//! | 132 | `link`    | `u32`                                                            |
//! | 133 | `option`  | `u8` item tag, `u8` count (0 or 1), item                         |
//! | 134 | `map`     | `u8` key tag, `u8` value tag, `u32` size, `u32` count, pairs     |
//! | 135 | `flag`    | `u8`                                                             |
//!
//! Older documents number the composite tags from 128 without `list2`. They are detected by
//! failing on an unknown tag and reading again with [`BinType::fix`] shifting tags of 129 and
//! up.
//!
//! ## Text Form
//!
//! [`Bin::to_text`] and [`Bin::from_text`] convert to the hand editable form used by `.py`
//! files, see the [`text`] module.
//!

pub mod error;
pub mod extract;
pub mod read;
pub mod text;
pub mod types;
pub mod unhash;
pub mod write;

pub use extract::ExtractedHashes;
pub use text::TextOptions;
pub use types::{Bin, BinEntry, BinField, BinPatch, BinType, BinValue, Embedded, DEFAULT_PATCH_HEADER};
