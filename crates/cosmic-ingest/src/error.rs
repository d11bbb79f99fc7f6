//! Error types for format normalization.

use std::fmt;

use cosmic_model::FileFormat;
use thiserror::Error;

/// Errors that can occur while normalizing a file into an envelope.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file could not be read as its declared format.
    #[error("failed to parse {format} file {filename}: {reason}")]
    Parse {
        format: FileFormat,
        filename: String,
        reason: String,
    },

    /// The file name does not map to a known container kind.
    #[error("unsupported file format: {filename} (expected .csv, .fits, .fit, .fts, .h5 or .hdf5)")]
    UnsupportedFormat { filename: String },
}

impl IngestError {
    /// Wrap an underlying failure as a parse error for `format`.
    pub fn parse(format: FileFormat, filename: &str, reason: impl fmt::Display) -> Self {
        Self::Parse {
            format,
            filename: filename.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Declared format of the failing file, if any.
    pub fn format(&self) -> Option<FileFormat> {
        match self {
            Self::Parse { format, .. } => Some(*format),
            Self::UnsupportedFormat { .. } => None,
        }
    }
}

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::parse(
            FileFormat::BinaryTableOrImage,
            "m31.fits",
            "missing END card in HDU 0",
        );
        assert_eq!(
            err.to_string(),
            "failed to parse FITS file m31.fits: missing END card in HDU 0"
        );
        assert_eq!(err.format(), Some(FileFormat::BinaryTableOrImage));
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::NoData("empty CSV".into());
        let err = IngestError::parse(FileFormat::Tabular, "empty.csv", polars_err);
        assert!(matches!(
            err,
            IngestError::Parse {
                format: FileFormat::Tabular,
                ..
            }
        ));
        assert!(err.to_string().contains("empty CSV"));
    }
}
