//! Custom error types for the snote-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// A missing field (address `0`, absent tag) is never an error; these variants
/// only describe data that cannot be read at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnoteError {
    /// An address or length points past the end of the buffer.
    #[error("Out of bounds: {width} bytes at offset {offset} exceed buffer of {len} bytes")]
    OutOfBounds { offset: u64, width: u64, len: u64 },

    /// The file does not start with `noteSN_FILE_VER_` and an 8-digit version.
    #[error("Signature mismatch: {0:?}")]
    SignatureMismatch(String),

    /// A RATTA_RLE color byte has no entry in the encoded palette.
    #[error("Unknown color: {0:#04x}")]
    UnknownColor(u8),

    /// A decoded layer does not have exactly `width * height * 4` bytes.
    #[error("Length mismatch: decoded {actual} bytes, expected {expected} bytes")]
    LengthMismatch { actual: usize, expected: usize },

    /// A sub-structure (layer info, recognized text, address, layer name) cannot be
    /// parsed into its fixed shape.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// A convenience `Result` type alias using the crate's `SnoteError` type.
pub type Result<T> = std::result::Result<T, SnoteError>;
