//! Error types for FITS reading and writing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing FITS files.
#[derive(Debug, Error)]
pub enum FitsError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Structural problem with the file.
    #[error("invalid FITS file: {message}")]
    InvalidFormat { message: String },

    /// Header ended without an END card.
    #[error("header of HDU {hdu} has no END card")]
    MissingEnd { hdu: usize },

    /// Required keyword absent or of the wrong type.
    #[error("HDU {hdu}: missing or invalid keyword {keyword}")]
    MissingKeyword { hdu: usize, keyword: String },

    /// Unsupported BITPIX value.
    #[error("HDU {hdu}: unsupported BITPIX {bitpix}")]
    UnsupportedBitpix { hdu: usize, bitpix: i64 },

    /// Column format code that cannot be decoded.
    #[error("HDU {hdu}: invalid column format '{format}' for {column}")]
    InvalidColumnFormat {
        hdu: usize,
        column: String,
        format: String,
    },

    /// Data section runs past the end of the file.
    #[error("HDU {hdu}: data truncated, expected {expected} bytes but {available} remain")]
    TruncatedData {
        hdu: usize,
        expected: usize,
        available: usize,
    },

    /// Value that cannot be written into an 80-byte card.
    #[error("cannot write card for {keyword}: {message}")]
    InvalidCard { keyword: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FITS operations.
pub type Result<T> = std::result::Result<T, FitsError>;

impl FitsError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a MissingKeyword error.
    pub fn missing_keyword(hdu: usize, keyword: impl Into<String>) -> Self {
        Self::MissingKeyword {
            hdu,
            keyword: keyword.into(),
        }
    }

    /// Create an InvalidColumnFormat error.
    pub fn invalid_column_format(
        hdu: usize,
        column: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self::InvalidColumnFormat {
            hdu,
            column: column.into(),
            format: format.into(),
        }
    }

    /// Create an InvalidCard error.
    pub fn invalid_card(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCard {
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}
