//! Dataset envelope produced by the format normalizers.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Container kinds recognized by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    /// Delimited text with a header row.
    Tabular,
    /// Self-describing binary with header + table/image sub-units.
    BinaryTableOrImage,
    /// Hierarchical binary with attributes and nested datasets.
    Hierarchical,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [
        FileFormat::Tabular,
        FileFormat::BinaryTableOrImage,
        FileFormat::Hierarchical,
    ];

    /// Detect the format from a file extension (case-insensitive, no dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Tabular),
            "fits" | "fit" | "fts" => Some(FileFormat::BinaryTableOrImage),
            "h5" | "hdf5" => Some(FileFormat::Hierarchical),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Short container name used in messages.
    pub fn container_name(self) -> &'static str {
        match self {
            FileFormat::Tabular => "CSV",
            FileFormat::BinaryTableOrImage => "FITS",
            FileFormat::Hierarchical => "HDF5",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container_name())
    }
}

/// Descriptive summary of one numeric column.
///
/// Keys follow the usual `describe()` layout so downstream readers can treat
/// every format alike. Image summaries carry the median only, so the outer
/// quartiles are optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%", default, skip_serializing_if = "Option::is_none")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%", default, skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    pub max: f64,
}

/// Envelope-level statistics.
///
/// Which fields are filled depends on the container; absent fields are not
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numeric_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub samples: IndexMap<String, ColumnSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Statistics {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind of a binary-container sub-unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubUnitKind {
    #[serde(rename = "PrimaryHDU")]
    Primary,
    #[serde(rename = "ImageHDU")]
    Image,
    #[serde(rename = "BinTableHDU")]
    BinaryTable,
    #[serde(rename = "TableHDU")]
    AsciiTable,
}

/// Column descriptor of a table sub-unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub format: String,
    pub unit: String,
}

/// Per sub-unit detail kept alongside the primary selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubUnitSummary {
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SubUnitKind,
    pub header: IndexMap<String, String>,
    pub has_data: bool,
    pub is_table: bool,
    pub is_image: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Statistics::is_empty")]
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preview: Vec<Record>,
}

/// Normalized output of one format parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetEnvelope {
    pub filename: String,
    pub format: FileFormat,
    pub metadata: IndexMap<String, String>,
    pub statistics: Statistics,
    pub preview: Vec<Record>,
    /// Numeric source columns in file order.
    pub columns: Vec<String>,
    /// Every header or table column name, numeric or not. This is the list
    /// handed to column standardization.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hdus: Vec<SubUnitSummary>,
}

impl DatasetEnvelope {
    pub fn new(filename: impl Into<String>, format: FileFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            metadata: IndexMap::new(),
            statistics: Statistics::default(),
            preview: Vec::new(),
            columns: Vec::new(),
            source_columns: Vec::new(),
            hdus: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.preview.len()
    }
}
