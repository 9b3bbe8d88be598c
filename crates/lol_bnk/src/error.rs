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

    /// Transparent wrapper for [`lol_bin::error::Error`]
    #[error(transparent)]
    BinError(#[from] lol_bin::error::Error),

    /// Transparent wrapper for [`walkdir::Error`]
    #[error(transparent)]
    WalkError(#[from] walkdir::Error),

    /// file started with neither `BKHD` nor `r3d2`
    #[error("not an audio bank, found signature {0:02X?}, expected BKHD or r3d2")]
    InvalidSignature([u8; 4]),

    /// WPK version other than 1
    #[error("unsupported WPK version {0}, expected 1")]
    UnsupportedVersion(u32),

    /// a section the operation depends on is absent
    #[error("no {0} section found in bank")]
    MissingSection(&'static str),

    /// hierarchy object shorter than its fixed fields
    #[error("hierarchy object {id} of type {kind} is truncated")]
    TruncatedObject { kind: u8, id: u32 },

    /// event with more actions than its count byte holds
    #[error("event {id} has {count} actions, at most 255 fit")]
    TooManyActions { id: u32, count: usize },

    /// number of payloads given to a writer differs from the index
    #[error("bank indexes {expected} wems but {found} payloads were given")]
    PayloadCount { expected: usize, found: usize },

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
