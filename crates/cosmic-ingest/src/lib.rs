//! Format normalization for astronomical data files.
//!
//! Every supported container is read into one [`DatasetEnvelope`]: text
//! metadata, summary statistics and a bounded preview of canonical records.
//!
//! - CSV: numeric columns only, projected to `x`/`y`/`value` by name
//! - FITS: every HDU summarized, the first table with data (else the first
//!   image with data) selected for the envelope
//! - HDF5: root attributes plus the first dataset in name order
//!
//! Failures of any kind surface as a single [`IngestError::Parse`] naming the
//! container and the underlying cause.
//!
//! # Example
//!
//! ```
//! use cosmic_ingest::FormatNormalizer;
//! use cosmic_model::{FileFormat, PipelineOptions};
//!
//! let normalizer = FormatNormalizer::new(&PipelineOptions::default());
//! let envelope = normalizer
//!     .normalize("stars.csv", b"ra,dec,mag\n10.5,-3.2,14.1\n", FileFormat::Tabular)
//!     .unwrap();
//! assert_eq!(envelope.preview[0].value, 14.1);
//! ```

mod csv;
mod error;
mod fits;
mod hdf5;
mod projection;
mod sampling;
mod stats;

use cosmic_model::{DatasetEnvelope, FileFormat, PipelineOptions};

// === Errors ===
pub use error::{IngestError, Result};

// === Sampling helpers ===
pub use sampling::{even_indices, shape_text};

/// Detect the container kind from a file name.
pub fn detect_format(filename: &str) -> Result<FileFormat> {
    FileFormat::from_path(std::path::Path::new(filename)).ok_or_else(|| {
        IngestError::UnsupportedFormat {
            filename: filename.to_string(),
        }
    })
}

/// Reads file contents of any supported container into an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatNormalizer {
    preview_limit: usize,
}

impl Default for FormatNormalizer {
    fn default() -> Self {
        Self::new(&PipelineOptions::default())
    }
}

impl FormatNormalizer {
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            preview_limit: options.preview_limit.max(1),
        }
    }

    pub fn preview_limit(&self) -> usize {
        self.preview_limit
    }

    /// Normalize `bytes` as the declared `format`.
    pub fn normalize(
        &self,
        filename: &str,
        bytes: &[u8],
        format: FileFormat,
    ) -> Result<DatasetEnvelope> {
        let envelope = match format {
            FileFormat::Tabular => csv::normalize(filename, bytes, self.preview_limit),
            FileFormat::BinaryTableOrImage => fits::normalize(filename, bytes, self.preview_limit),
            FileFormat::Hierarchical => hdf5::normalize(filename, bytes, self.preview_limit),
        }?;
        tracing::info!(
            filename,
            format = %format,
            preview_rows = envelope.preview.len(),
            columns = envelope.columns.len(),
            "normalized file"
        );
        Ok(envelope)
    }

    /// Normalize `bytes`, detecting the format from the file name.
    pub fn normalize_detected(&self, filename: &str, bytes: &[u8]) -> Result<DatasetEnvelope> {
        self.normalize(filename, bytes, detect_format(filename)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(detect_format("m31.FITS").unwrap(), FileFormat::BinaryTableOrImage);
        assert_eq!(detect_format("a/b/cube.h5").unwrap(), FileFormat::Hierarchical);
        let err = detect_format("notes.txt").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
    }

    #[test]
    fn wrong_declared_format_is_a_parse_error() {
        let normalizer = FormatNormalizer::default();
        let err = normalizer
            .normalize("stars.csv", b"ra,dec\n1,2\n", FileFormat::BinaryTableOrImage)
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to parse FITS file stars.csv"));

        let err = normalizer
            .normalize("stars.csv", b"ra,dec\n1,2\n", FileFormat::Hierarchical)
            .unwrap_err();
        assert_eq!(err.format(), Some(FileFormat::Hierarchical));
    }
}
