//! Error types for song loading and playback.

use thiserror::Error;

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur when loading, saving or playing songs.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Malformed JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed base64 payload in a legacy song.
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Song file version this crate cannot read.
    #[error("Unsupported song version '{0}' (supported: 1.1, 1.2)")]
    UnsupportedVersion(String),

    /// Invalid value for a field.
    #[error("Invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Invalid value.
        value: String,
        /// Expected format.
        expected: String,
    },

    /// Position index out of range.
    #[error("Position {index} out of range (0..{available})")]
    InvalidPosition {
        /// Requested index.
        index: usize,
        /// Available positions.
        available: usize,
    },

    /// Chip-level error (bad channel or register).
    #[error("Chip error: {0}")]
    Chip(#[from] saa1099::Saa1099Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
