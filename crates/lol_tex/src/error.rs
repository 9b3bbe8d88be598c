//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`lol_stream::error::Error`]
    #[error(transparent)]
    StreamError(#[from] lol_stream::error::Error),

    /// file does not start with the `TEX\0` signature
    #[error("file does not start with the `TEX\\0` signature")]
    #[diagnostic(help("the file is not a tex texture"))]
    InvalidSignature,

    /// texture format {0} is unknown
    #[error("texture format {0} is unknown, expected 1, 2, 3, 10, 12 or 20")]
    UnknownFormat(u8),

    /// number of data blobs differs from what the header describes
    #[error("texture needs {expected} data blobs but has {found}")]
    LevelCount { expected: usize, found: usize },

    /// a mip level does not have the size its dimensions give
    #[error("mip level {level} holds {found} bytes, expected {expected}")]
    LevelSize {
        level: usize,
        expected: usize,
        found: usize,
    },

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
