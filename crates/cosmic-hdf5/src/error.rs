//! Error types for HDF5 reading and writing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing HDF5 files.
#[derive(Debug, Error)]
pub enum Hdf5Error {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No superblock signature at any of the allowed offsets.
    #[error("not an HDF5 file: superblock signature not found")]
    SignatureNotFound,

    /// Structure version this reader does not decode.
    #[error("unsupported {structure} version {version}")]
    UnsupportedVersion { structure: &'static str, version: u8 },

    /// Valid HDF5 feature outside the supported subset.
    #[error("unsupported HDF5 feature: {feature}")]
    Unsupported { feature: String },

    /// Read past the end of the file.
    #[error("unexpected end of file at offset {offset} (need {needed} bytes)")]
    Truncated { offset: usize, needed: usize },

    /// Malformed structure.
    #[error("invalid HDF5 file: {message}")]
    InvalidFormat { message: String },

    /// Value the writer cannot encode.
    #[error("cannot write {path}: {message}")]
    InvalidInput { path: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for HDF5 operations.
pub type Result<T> = std::result::Result<T, Hdf5Error>;

impl Hdf5Error {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }
}
