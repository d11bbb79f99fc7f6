//! Column-oriented view over preview records.
//!
//! Imputation and quality scoring both reason about "numeric columns" of the
//! preview. The view lays records out the way a data frame built from the
//! serialized rows would: source fields first, in order of first appearance,
//! then the projection fields that no source field already occupies.

use crate::record::{PROJECTED_FIELDS, Record};

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    columns: Vec<String>,
    ids: Vec<u64>,
    /// Column-major cells; `None` is missing.
    cells: Vec<Vec<Option<f64>>>,
}

impl PreviewFrame {
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for name in record.raw_fields.keys() {
                if name != "status" && !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }
        if !records.is_empty() {
            for name in PROJECTED_FIELDS {
                if !columns.iter().any(|column| column == name) {
                    columns.push(name.to_string());
                }
            }
        }

        let cells = columns
            .iter()
            .map(|name| records.iter().map(|record| record.field(name)).collect())
            .collect();

        Self {
            columns,
            ids: records.iter().map(|record| record.id).collect(),
            cells,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn height(&self) -> usize {
        self.ids.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|index| self.cells[index].as_slice())
    }

    /// Columns with their cells, in frame order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    /// Same as [`iter`](Self::iter) without the synthetic `id` key.
    pub fn data_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.iter().filter(|(name, _)| *name != "id")
    }
}
