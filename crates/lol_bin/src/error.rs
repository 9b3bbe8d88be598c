//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::BinType;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`std::fmt::Error`]
    #[error(transparent)]
    FmtError(#[from] std::fmt::Error),

    /// Transparent wrapper for [`lol_stream::error::Error`]
    #[error(transparent)]
    StreamError(#[from] lol_stream::error::Error),

    /// Transparent wrapper for [`lol_hash::error::Error`]
    #[error(transparent)]
    HashError(#[from] lol_hash::error::Error),

    /// file signature was not `PROP` or `PTCH`
    #[error("wrong file signature {0:02X?}, expected PROP or PTCH")]
    InvalidSignature([u8; 4]),

    /// patch header was not followed by `PROP`
    #[error("missing PROP after PTCH signature")]
    MissingProp,

    /// version outside of 1 to 3
    #[error("unsupported BIN version {0}, expected 1, 2 or 3")]
    UnsupportedVersion(u32),

    /// type tag with no known meaning
    #[error("unknown value type tag {0}")]
    UnknownType(u8),

    /// list, option or map element did not match the declared type
    #[error("expected a {expected} value but found {found}")]
    TypeMismatch { expected: BinType, found: BinType },

    /// containers directly inside containers have no text form
    #[error("{outer} of {inner} cannot be written as text")]
    NestedContainer { outer: BinType, inner: BinType },

    /// text input could not be parsed
    #[error("text parse error at line {line}, column {column}: {message}")]
    #[diagnostic(help("every field is written as `name: type = value`"))]
    TextParse {
        line: usize,
        column: usize,
        message: String,
    },

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
