//! Hashing discipline shared by every League of Legends asset codec.
//!
//! Identifiers inside the formats are stored as hashes of case-insensitive strings. Two families
//! are in use:
//!
//! | Family | Width  | Function          | Used for                                      |
//! |--------|--------|-------------------|-----------------------------------------------|
//! | bin    | 32-bit | FNV-1a            | property names, class names, entry keys       |
//! | path   | 64-bit | xxHash64 (seed 0) | archive chunk paths, `file` property values   |
//!
//! Two more 32-bit functions appear in specific places: FNV-1 for audio event names and the ELF
//! hash for joint names of legacy animations.
//!
//! A [`Named`] value keeps the numeric hash and, once looked up in a [`HashTables`] context, the
//! human readable name. Lookups never change the numeric value and never fail; an unknown hash
//! simply stays unresolved and is displayed as zero-padded hex.
//!
//! ## Table Files
//!
//! | File                     | Width |
//! |--------------------------|-------|
//! | `hashes.binentries.txt`  | 8     |
//! | `hashes.binhashes.txt`   | 8     |
//! | `hashes.bintypes.txt`    | 8     |
//! | `hashes.binfields.txt`   | 8     |
//! | `hashes.game.txt`        | 16    |
//! | `hashes.lcu.txt`         | 16    |
//!
//! Each line is `<hex> <name>` with the separator right after the hex column.
//!

pub mod error;
pub mod hash;
pub mod named;
pub mod table;
pub mod tiers;

pub use hash::{elf, fnv1, fnv1a, raw_to_hex, xxh64, HashValue};
pub use named::{BinHash, Named, PathHash};
pub use table::{table_width, HashTable, HashTables, ALL_TABLES, BIN_TABLES, WAD_TABLES};
pub use tiers::HashTiers;
