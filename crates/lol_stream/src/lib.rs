//! Positioned binary streams shared by every codec in this workspace.
//!
//! All of the League of Legends asset formats handled here are little-endian, seek heavily, and
//! frequently declare the byte length of a structure *before* its content. This crate wraps any
//! [`std::io::Read`] + [`std::io::Seek`] (or `Write` + `Seek`) value with typed accessors for
//! those formats and a deferred size-patch list for the writing side.
//!
//! ## Primitive Layouts
//!
//! | Accessor         | Size (bytes) | Encoding                                             |
//! |------------------|--------------|------------------------------------------------------|
//! | `u8`/`i8`        | 1            | raw byte                                             |
//! | `u16`/`i16`      | 2            | little-endian                                        |
//! | `u32`/`i32`      | 4            | little-endian                                        |
//! | `u64`/`i64`      | 8            | little-endian                                        |
//! | `f32`            | 4            | IEEE-754, little-endian                              |
//! | `bool`           | 1            | `0` is false, anything else true                     |
//! | `vec2/3/4`       | 8/12/16      | sequence of `f32`                                    |
//! | `quat`           | 16           | `x, y, z, w` as `f32`                                |
//! | `mtx44`          | 64           | 16 `f32`, row-major                                  |
//! | sized string     | 2 + n        | `u16` byte length followed by UTF-8                  |
//! | padded string    | n            | UTF-8 truncated at the first NUL                     |
//!
//! ## Size Patching
//!
//! [`BytesWriter::reserve_u32`] writes a zeroed placeholder and returns its offset. Once the
//! content following the placeholder is written, [`BytesWriter::close_size`] registers the
//! `(offset, size)` pair. Every registered pair is written back, in registration order, by
//! [`BytesWriter::flush_sizes`] (called by [`BytesWriter::finish`]).
//!

pub mod error;
pub mod read;
pub mod write;

pub use read::BytesReader;
pub use write::{BytesWriter, SizePatch};
