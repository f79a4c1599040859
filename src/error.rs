//! Custom error types for padlock
//!
//! This module defines the error hierarchy for the tool using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while decoding a container file.
///
/// Any of these means the input is not a valid artifact of this tool;
/// decryption is aborted before key derivation runs.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Fewer bytes than the fixed header requires
    #[error("Container too short: {got} bytes, the fixed header is {min}")]
    TooShort { got: usize, min: usize },

    /// The version tag is not one this build understands
    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u8),

    /// Internal length fields disagree with the actual byte count
    #[error("Malformed container: {0}")]
    Malformed(String),
}

/// The main error type for padlock operations
#[derive(Error, Debug)]
pub enum PadlockError {
    /// Input file is missing, unreadable, or not a regular file
    #[error("Input error: {0}")]
    Input(String),

    /// Key derivation cost parameters outside the accepted range
    #[error("Invalid key derivation parameters: {0}")]
    InvalidParams(String),

    /// Authentication failure. Covers both a tampered container and a
    /// wrong passphrase with one message, so the error cannot be used
    /// as a passphrase oracle.
    #[error("Decryption failed: wrong passphrase or corrupted file")]
    Forged,

    /// Container decoding errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Output path already exists; nothing was written
    #[error("Output path already exists: {}", .0.display())]
    Conflict(PathBuf),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PadlockError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for padlock operations
pub type PadlockResult<T> = Result<T, PadlockError>;
