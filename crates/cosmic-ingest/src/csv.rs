//! Delimited text files with a header row.

use std::io::Cursor;

use cosmic_model::{DatasetEnvelope, FileFormat, Record, Statistics, is_missing_sentinel};
use indexmap::IndexMap;
use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::projection::{Projection, TABULAR_RULES};
use crate::sampling::shape_text;
use crate::stats::{describe, mean_of_means};

/// Column count above which a warning is logged.
const WIDE_TABLE_COLUMNS: usize = 500;

/// A column whose every present cell is a number.
#[derive(Debug, Clone, PartialEq)]
struct NumericColumn {
    name: String,
    values: Vec<Option<f64>>,
}

/// Normalize a CSV file.
pub(crate) fn normalize(filename: &str, bytes: &[u8], preview_limit: usize) -> Result<DatasetEnvelope> {
    let parse_error = |e: PolarsError| IngestError::parse(FileFormat::Tabular, filename, e);
    let df = read_frame(bytes).map_err(parse_error)?;
    let numeric = numeric_columns(&df).map_err(parse_error)?;

    if df.width() > WIDE_TABLE_COLUMNS {
        tracing::warn!(
            filename,
            columns = df.width(),
            "Dataset has more than 500 columns - may impact performance"
        );
    }
    tracing::debug!(
        filename,
        rows = df.height(),
        columns = df.width(),
        numeric = numeric.len(),
        "read CSV"
    );

    let mut envelope = DatasetEnvelope::new(filename, FileFormat::Tabular);
    envelope
        .metadata
        .insert("row_count".to_string(), df.height().to_string());
    envelope
        .metadata
        .insert("column_count".to_string(), df.width().to_string());
    envelope.columns = numeric.iter().map(|column| column.name.clone()).collect();
    envelope.source_columns = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    envelope.statistics = statistics(&numeric, df.height(), df.width());
    envelope.preview = preview(&numeric, df.height(), preview_limit);
    Ok(envelope)
}

/// Read every cell as text; type detection happens afterwards.
fn read_frame(bytes: &[u8]) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
}

fn numeric_columns(df: &DataFrame) -> PolarsResult<Vec<NumericColumn>> {
    let mut numeric = Vec::new();
    for column in df.get_columns() {
        let text = column.cast(&DataType::String)?;
        if let Some(values) = parse_numbers(text.str()?) {
            numeric.push(NumericColumn {
                name: column.name().to_string(),
                values,
            });
        }
    }
    Ok(numeric)
}

/// Parse a text column; `None` unless every present cell is a number and at
/// least one cell is present.
fn parse_numbers(cells: &StringChunked) -> Option<Vec<Option<f64>>> {
    let mut values = Vec::with_capacity(cells.len());
    let mut present = 0usize;
    for cell in cells.iter() {
        match cell.map(str::trim) {
            None => values.push(None),
            Some(text) if is_missing_sentinel(text) => values.push(None),
            Some(text) => {
                values.push(Some(text.parse::<f64>().ok()?));
                present += 1;
            }
        }
    }
    (present > 0).then_some(values)
}

fn statistics(numeric: &[NumericColumn], rows: usize, width: usize) -> Statistics {
    if numeric.is_empty() {
        return Statistics {
            shape: Some(shape_text(&[rows, width])),
            message: Some("No numeric columns found".to_string()),
            ..Statistics::default()
        };
    }

    let mut samples = IndexMap::with_capacity(numeric.len());
    for column in numeric {
        let values: Vec<f64> = column.values.iter().flatten().copied().collect();
        if let Some(summary) = describe(&values) {
            samples.insert(column.name.clone(), summary);
        }
    }
    Statistics {
        numeric_columns: numeric.iter().map(|column| column.name.clone()).collect(),
        mean: mean_of_means(samples.values()),
        shape: Some(shape_text(&[rows, numeric.len()])),
        samples,
        ..Statistics::default()
    }
}

fn preview(numeric: &[NumericColumn], rows: usize, limit: usize) -> Vec<Record> {
    let names: Vec<&str> = numeric.iter().map(|column| column.name.as_str()).collect();
    let Some(projection) = Projection::choose(&names, &TABULAR_RULES) else {
        return Vec::new();
    };
    let cell = |column: usize, row: usize| numeric[column].values[row].unwrap_or(f64::NAN);

    (0..rows.min(limit))
        .map(|row| {
            let mut record = Record::new(
                row as u64,
                cell(projection.x, row),
                cell(projection.y, row),
                cell(projection.value, row),
            );
            for column in numeric {
                record
                    .raw_fields
                    .insert(column.name.clone(), column.values[row]);
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "\
name,ra,dec,flux,note
M31,10.68,41.27,3.4,galaxy
M42,83.82,-5.39,,nebula
M45,56.75,24.12,1.6,NaN
M87,187.7,12.39,null,
";

    #[test]
    fn numeric_columns_only() {
        let envelope = normalize("catalog.csv", CATALOG.as_bytes(), 1000).unwrap();
        assert_eq!(envelope.format, FileFormat::Tabular);
        assert_eq!(envelope.columns, ["ra", "dec", "flux"]);
        assert_eq!(envelope.metadata["row_count"], "4");
        assert_eq!(envelope.metadata["column_count"], "5");

        let stats = &envelope.statistics;
        assert_eq!(stats.numeric_columns, ["ra", "dec", "flux"]);
        assert_eq!(stats.shape.as_deref(), Some("(4, 3)"));
        assert_eq!(stats.samples["flux"].count, 2);
        assert!((stats.samples["flux"].mean - 2.5).abs() < 1e-12);
        assert_eq!(stats.samples["ra"].max, 187.7);
        assert!(stats.mean.is_some());
    }

    #[test]
    fn preview_projects_and_keeps_nulls() {
        let envelope = normalize("catalog.csv", CATALOG.as_bytes(), 1000).unwrap();
        assert_eq!(envelope.preview.len(), 4);
        let second = &envelope.preview[1];
        assert_eq!(second.id, 1);
        assert_eq!(second.x, 83.82);
        assert_eq!(second.y, -5.39);
        assert!(second.value.is_nan());
        assert_eq!(second.raw_fields["flux"], None);
        assert!(!second.raw_fields.contains_key("name"));
    }

    #[test]
    fn preview_is_bounded() {
        let mut text = String::from("x,y\n");
        for i in 0..25 {
            text.push_str(&format!("{i},{}\n", i * 2));
        }
        let envelope = normalize("grid.csv", text.as_bytes(), 10).unwrap();
        assert_eq!(envelope.preview.len(), 10);
        assert_eq!(envelope.statistics.shape.as_deref(), Some("(25, 2)"));
        assert_eq!(envelope.statistics.samples["x"].count, 25);
    }

    #[test]
    fn text_only_file_reports_message() {
        let envelope = normalize("names.csv", b"name,kind\nM31,galaxy\n", 1000).unwrap();
        assert!(envelope.preview.is_empty());
        assert!(envelope.columns.is_empty());
        assert_eq!(
            envelope.statistics.message.as_deref(),
            Some("No numeric columns found")
        );
        assert_eq!(envelope.statistics.shape.as_deref(), Some("(1, 2)"));
    }

    #[test]
    fn all_missing_column_is_not_numeric() {
        let envelope = normalize("gaps.csv", b"a,b\n1,\n2,NaN\n", 1000).unwrap();
        assert_eq!(envelope.columns, ["a"]);
    }
}
