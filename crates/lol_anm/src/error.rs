//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`lol_stream::error::Error`]
    #[error(transparent)]
    StreamError(#[from] lol_stream::error::Error),

    /// file signature was neither animation kind
    #[error("wrong file signature {0:02X?}, expected r3d2canm or r3d2anmd")]
    InvalidSignature([u8; 8]),

    /// version of an uncompressed animation outside of 3 to 5
    #[error("unsupported ANM version {0}, expected 3, 4 or 5")]
    UnsupportedVersion(u32),

    /// header offset of a required section was not positive
    #[error("file does not contain {0}")]
    MissingSection(&'static str),

    /// compressed frame with a transform kind other than rotate, translate or scale
    #[error("unknown compressed transform type {0}")]
    UnknownTransform(u16),

    /// a pose bank outgrew its 16 bit indices
    #[error("animation too big: {bank} bank holds {size} entries, at most 65535 fit")]
    #[diagnostic(help("split the animation or reduce the number of distinct poses"))]
    BankOverflow { bank: &'static str, size: usize },

    /// offsets no longer fit the 32 bit header fields
    #[error("animation of {0} bytes is too large")]
    FileTooLarge(u64),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
