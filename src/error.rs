/// Error types for service data parsing and payload decoding
use thiserror::Error;

/// Errors that can occur when decoding a Minew sensor frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No bytes at all, not even a frame type
    #[error("Empty service data")]
    EmptyInput,

    /// Buffer is shorter than the layout of its product model
    #[error("Truncated {layout} payload: expected at least {expected} bytes, got {actual}")]
    TruncatedInput {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors that can occur when parsing an advertisement line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceDataError {
    /// Entry is not of the form `uuid=hex`
    #[error("Malformed service data entry: '{0}'")]
    MalformedEntry(String),

    /// Payload is not an even-length hex string
    #[error("Invalid hex payload: '{0}'")]
    InvalidHex(String),
}
