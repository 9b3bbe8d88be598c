//! Reading and writing League of Legends TEX textures.
//!
//! A TEX file is a 12 byte header followed by the encoded pixel data.
//!
//! | Offset | Type     | Field                                   |
//! |--------|----------|-----------------------------------------|
//! | 0      | `[u8;4]` | `TEX\0`                                 |
//! | 4      | `u16`    | width                                   |
//! | 6      | `u16`    | height                                  |
//! | 8      | `u8`     | unknown, written as 1                   |
//! | 9      | `u8`     | format, see [`TexFormat`]               |
//! | 10     | `u8`     | unknown, written as 0                   |
//! | 11     | `u8`     | non zero when the texture has mipmaps   |
//!
//! Block formats (DXT1, DXT5 and BGRA8) with mipmaps store every level down to 1x1, smallest
//! first. Anything else is kept as one blob.
//!
//! ```
//! # fn doit() -> lol_tex::error::Result<()>
//! # {
//! use lol_tex::{Tex, TexFormat};
//!
//! let tex = Tex::new(1, 1, TexFormat::Bgra8, false, vec![vec![0, 0, 255, 255]]);
//! let bytes = tex.to_bytes()?;
//! assert_eq!(&bytes[..4], b"TEX\0");
//! assert_eq!(Tex::from_bytes(&bytes)?, tex);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use types::{Tex, TexFormat, TexHeader};
