//! Header/data unit types.

use crate::header::Header;

/// Kind of header/data unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HduKind {
    Primary,
    Image,
    BinaryTable,
    AsciiTable,
    /// Any other `XTENSION` value; the data section is skipped.
    Other(String),
}

/// Decoded image grid.
///
/// `axes` holds `NAXIS1..NAXISn` in FITS order, so `axes[0]` is the fastest
/// varying axis (the row width of a 2-D image).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub axes: Vec<usize>,
    /// Physical values (`BSCALE`/`BZERO` applied, `BLANK` as NaN) in file order.
    pub pixels: Vec<f64>,
}

impl ImageData {
    /// Shape in row-major order, slowest axis first.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().rev().copied().collect()
    }

    /// Length of one image row.
    pub fn width(&self) -> usize {
        self.axes.first().copied().unwrap_or(1).max(1)
    }
}

/// One table column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    /// Raw `TFORMn` value.
    pub format: String,
    pub unit: Option<String>,
    /// Physical values for scalar numeric columns, `None` otherwise.
    pub values: Option<Vec<f64>>,
}

impl TableColumn {
    pub fn is_numeric(&self) -> bool {
        self.values.is_some()
    }
}

/// Decoded binary or ASCII table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub rows: usize,
    pub columns: Vec<TableColumn>,
}

impl TableData {
    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.columns.iter().filter(|column| column.is_numeric())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HduData {
    Empty,
    Image(ImageData),
    Table(TableData),
}

/// One header/data unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Hdu {
    pub index: usize,
    pub kind: HduKind,
    pub header: Header,
    pub data: HduData,
}

impl Hdu {
    /// `EXTNAME`, or `PRIMARY` for an unnamed primary unit.
    pub fn name(&self) -> String {
        match self.header.text("EXTNAME") {
            Some(name) => name.to_string(),
            None if self.kind == HduKind::Primary => "PRIMARY".to_string(),
            None => String::new(),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, HduKind::BinaryTable | HduKind::AsciiTable)
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, HduKind::Primary | HduKind::Image)
    }

    pub fn has_data(&self) -> bool {
        match &self.data {
            HduData::Empty => false,
            HduData::Image(image) => !image.pixels.is_empty(),
            HduData::Table(table) => table.rows > 0,
        }
    }

    pub fn image(&self) -> Option<&ImageData> {
        match &self.data {
            HduData::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&TableData> {
        match &self.data {
            HduData::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// All units of one file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsFile {
    pub hdus: Vec<Hdu>,
}

impl FitsFile {
    pub fn primary(&self) -> Option<&Hdu> {
        self.hdus.first()
    }
}
