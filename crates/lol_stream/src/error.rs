//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// seek to {offset} is outside of the stream ({len} bytes)
    #[error("seek to {offset} is outside of the stream ({len} bytes)")]
    SeekOutOfRange { offset: u64, len: u64 },

    /// requested {requested} bytes at {position} but the stream ends at {len}
    #[error("requested {requested} bytes at {position} but the stream ends at {len}")]
    UnexpectedEnd {
        requested: u64,
        position: u64,
        len: u64,
    },

    /// string of {0} bytes does not fit a 16-bit length prefix
    #[error("string of {0} bytes does not fit a 16-bit length prefix")]
    StringTooLong(usize),

    /// string of {len} bytes does not fit a {width} byte field
    #[error("string of {len} bytes does not fit a {width} byte field")]
    PaddedStringTooLong { len: usize, width: usize },

    /// structure of {0} bytes does not fit a 32-bit size field
    #[error("structure of {0} bytes does not fit a 32-bit size field")]
    SizeOverflow(u64),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
