//! Error types for parsing text and binary JSON.

use std::fmt;
use thiserror::Error;

/// Reasons a parse can fail, independent of where in the input it failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected byte 0x{byte:02x}")]
    UnexpectedByte { byte: u8 },

    #[error("invalid number literal")]
    InvalidNumber,

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("invalid \\u escape")]
    InvalidEscape,

    #[error("truncated binary value")]
    TruncatedBinary,

    #[error("invalid binary major tag 0b{tag:05b}")]
    InvalidBinaryTag { tag: u8 },

    #[error("length or count prefix overflowed usize")]
    LengthOverflow,
}

/// A parse failure together with the byte offset of the first unprocessed
/// byte in the input that produced it (see `spec.md` §6.1, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub source: Error,
}

impl ParseError {
    pub fn new(offset: usize, source: Error) -> Self {
        Self { offset, source }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.source, self.offset)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
