//! Error types for mtinspect

use thiserror::Error;

/// Result type alias using mtinspect's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in mtinspect
#[derive(Error, Debug)]
pub enum Error {
    #[error("Edit codes do not line up with tokens: {edits} edit codes for {tokens} tokens")]
    EditLengthMismatch { tokens: usize, edits: usize },

    #[error("Inconsistent record {record} ({side}): {edits} edit codes for {tokens} tokens")]
    InconsistentRecord {
        record: usize,
        side: String,
        tokens: usize,
        edits: usize,
    },

    #[error("Invalid value for {name}: {value:?} is not {expected}")]
    InvalidBound {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid pattern for {name}: {message}")]
    InvalidPattern { name: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
