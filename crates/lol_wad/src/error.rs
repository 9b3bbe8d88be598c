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

    /// Transparent wrapper for [`serde_json::Error`]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Transparent wrapper for [`walkdir::Error`]
    #[error(transparent)]
    WalkError(#[from] walkdir::Error),

    /// file does not start with the `RW` signature
    #[error("file does not start with the `RW` signature")]
    #[diagnostic(help("the file is not a wad archive"))]
    InvalidSignature,

    /// wad version {major}.{minor} is not supported, the newest known major version is 3
    #[error("wad version {major}.{minor} is not supported, the newest known major version is 3")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// chunk compression kind {0} is unknown
    #[error("chunk compression kind {0} is unknown")]
    UnknownCompression(u8),

    /// chunk {id} is outside of the table of {count} chunks
    #[error("chunk {id} is outside of the table of {count} chunks")]
    ChunkOutOfRange { id: usize, count: usize },

    /// archive grew to {0} bytes, past the 32-bit offsets of the chunk table
    #[error("archive grew to {0} bytes, past the 32-bit offsets of the chunk table")]
    ArchiveTooLarge(u64),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
