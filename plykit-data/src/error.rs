//! Error types for PLY parsing and encoding.

use thiserror::Error;

/// Errors that can occur while reading or writing PLY files.
///
/// Truncated binary data and malformed ASCII lines are recovered from
/// during decoding (short record set, skipped line) and never surface
/// here.
#[derive(Debug, Error)]
pub enum PlyError {
    #[error("PLY header has no end_header line")]
    MissingEndHeader,

    #[error("PLY header has no 'element vertex' declaration")]
    MissingVertexElement,

    #[error("malformed PLY header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("unknown property type in PLY header line: {line:?}")]
    UnknownPropertyType { line: String },

    #[error("invalid numeric value in ASCII vertex line: {line:?}")]
    InvalidAsciiValue { line: String },

    #[error("vertex data missing required property: {name}")]
    MissingProperty { name: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
