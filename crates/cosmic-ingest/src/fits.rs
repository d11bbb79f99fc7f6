//! FITS files: per-HDU detail plus a primary selection for the envelope.

use cosmic_fits::{Hdu, HduKind, Header, HeaderValue, ImageData, TableData, parse_fits};
use cosmic_model::{
    ColumnInfo, DatasetEnvelope, FileFormat, Record, Statistics, SubUnitKind, SubUnitSummary,
};
use indexmap::IndexMap;

use crate::error::{IngestError, Result};
use crate::projection::{Projection, TABLE_RULES};
use crate::sampling::{grid_preview, shape_text};
use crate::stats::{Moments, describe, describe_grid, mean_of_means};

/// Observation keys listed first when present.
pub(crate) const STANDARD_KEYS: [&str; 10] = [
    "TELESCOP", "INSTRUME", "OBJECT", "DATE-OBS", "EXPTIME", "RA", "DEC", "ORIGIN", "BUNIT",
    "EQUINOX",
];

const NO_UNIT: &str = "N/A";

/// Normalize a FITS file.
pub(crate) fn normalize(filename: &str, bytes: &[u8], preview_limit: usize) -> Result<DatasetEnvelope> {
    let file = parse_fits(bytes)
        .map_err(|e| IngestError::parse(FileFormat::BinaryTableOrImage, filename, e))?;

    let mut hdus = Vec::with_capacity(file.hdus.len());
    for hdu in &file.hdus {
        match summarize(hdu, preview_limit) {
            Some(summary) => hdus.push(summary),
            None => tracing::debug!(
                filename,
                hdu = hdu.index,
                kind = ?hdu.kind,
                "skipping extension of unknown type"
            ),
        }
    }

    let primary = hdus
        .iter()
        .position(|hdu| hdu.is_table && hdu.has_data)
        .or_else(|| hdus.iter().position(|hdu| hdu.is_image && hdu.has_data))
        .unwrap_or(0);

    let mut envelope = DatasetEnvelope::new(filename, FileFormat::BinaryTableOrImage);
    if let Some(selected) = hdus.get(primary) {
        tracing::debug!(
            filename,
            hdu = selected.index,
            name = %selected.name,
            kind = ?selected.kind,
            "selected primary HDU"
        );
        envelope.metadata = selected.header.clone();
        envelope.metadata.insert(
            "row_count".to_string(),
            selected.rows.unwrap_or(1).to_string(),
        );
        envelope.statistics = selected.statistics.clone();
        envelope.preview = selected.preview.clone();
        if let Some(first) = selected.preview.first() {
            envelope.columns = first.raw_fields.keys().cloned().collect();
        }
    }
    // Standardization sees every column of the first table, numeric or not.
    if let Some(table) = hdus.iter().find(|hdu| hdu.is_table && !hdu.columns.is_empty()) {
        envelope.source_columns = table
            .columns
            .iter()
            .map(|column| column.name.clone())
            .collect();
    }
    envelope.hdus = hdus;
    Ok(envelope)
}

/// Header keywords rendered as text, standard keys first.
///
/// Commentary cards never reach the parsed header; blank keywords and keys
/// without a value are dropped here.
pub(crate) fn header_map(header: &Header) -> IndexMap<String, String> {
    let mut map = IndexMap::with_capacity(header.len());
    for key in STANDARD_KEYS {
        if let Some(value) = header.get(key).filter(|value| has_value(value)) {
            map.insert(key.to_string(), value.to_string().trim().to_string());
        }
    }
    for (key, value) in header.iter() {
        if key.trim().is_empty() || key == "HISTORY" || key == "COMMENT" || !has_value(value) {
            continue;
        }
        if !map.contains_key(key) {
            map.insert(key.to_string(), value.to_string().trim().to_string());
        }
    }
    map
}

fn has_value(value: &HeaderValue) -> bool {
    !matches!(value, HeaderValue::Undefined)
}

fn summarize(hdu: &Hdu, preview_limit: usize) -> Option<SubUnitSummary> {
    let kind = match &hdu.kind {
        HduKind::Primary => SubUnitKind::Primary,
        HduKind::Image => SubUnitKind::Image,
        HduKind::BinaryTable => SubUnitKind::BinaryTable,
        HduKind::AsciiTable => SubUnitKind::AsciiTable,
        HduKind::Other(_) => return None,
    };
    let mut summary = SubUnitSummary {
        index: hdu.index,
        name: hdu.name(),
        kind,
        header: header_map(&hdu.header),
        has_data: hdu.has_data(),
        is_table: hdu.is_table(),
        is_image: hdu.is_image(),
        columns: Vec::new(),
        rows: None,
        shape: None,
        unit: None,
        statistics: Statistics::default(),
        preview: Vec::new(),
    };

    if let Some(table) = hdu.table() {
        summarize_table(&mut summary, table, preview_limit);
    } else if let Some(image) = hdu.image() {
        summarize_image(&mut summary, image, &hdu.header, preview_limit);
    }
    Some(summary)
}

fn summarize_table(summary: &mut SubUnitSummary, table: &TableData, limit: usize) {
    summary.rows = Some(table.rows);
    summary.columns = table
        .columns
        .iter()
        .map(|column| ColumnInfo {
            name: column.name.clone(),
            format: column.format.clone(),
            unit: column.unit.clone().unwrap_or_default(),
        })
        .collect();

    let numeric: Vec<(&str, &[f64])> = table
        .columns
        .iter()
        .filter_map(|column| Some((column.name.as_str(), column.values.as_deref()?)))
        .collect();
    let names: Vec<&str> = numeric.iter().map(|(name, _)| *name).collect();
    let Some(projection) = Projection::choose(&names, &TABLE_RULES) else {
        summary.unit = Some(NO_UNIT.to_string());
        summary.statistics = Statistics {
            shape: Some(shape_text(&[table.rows, 0])),
            message: Some("No numeric columns found".to_string()),
            ..Statistics::default()
        };
        return;
    };

    summary.unit = Some(
        table.columns[column_index(table, names[projection.value])]
            .unit
            .clone()
            .filter(|unit| !unit.trim().is_empty())
            .unwrap_or_else(|| NO_UNIT.to_string()),
    );

    let rows = table.rows.min(limit);
    let zeroed = |value: f64| if value.is_nan() { 0.0 } else { value };
    summary.preview = (0..rows)
        .map(|row| {
            let mut record = Record::new(
                row as u64,
                zeroed(numeric[projection.x].1[row]),
                zeroed(numeric[projection.y].1[row]),
                zeroed(numeric[projection.value].1[row]),
            );
            for (name, values) in &numeric {
                record
                    .raw_fields
                    .insert((*name).to_string(), Some(zeroed(values[row])));
            }
            record
        })
        .collect();
    summary.statistics = table_statistics(&numeric, table.rows, rows);
}

fn column_index(table: &TableData, name: &str) -> usize {
    table
        .columns
        .iter()
        .position(|column| column.name == name)
        .unwrap_or(0)
}

/// Summary over the previewed rows that hold at least one finite value.
///
/// When no such row exists the rich summary is unavailable and bare
/// `min/max/mean/count` over every finite cell of the table are reported.
fn table_statistics(numeric: &[(&str, &[f64])], total_rows: usize, rows: usize) -> Statistics {
    let kept: Vec<usize> = (0..rows)
        .filter(|&row| numeric.iter().any(|(_, values)| values[row].is_finite()))
        .collect();
    let mut stats = Statistics {
        numeric_columns: numeric.iter().map(|(name, _)| (*name).to_string()).collect(),
        shape: Some(shape_text(&[total_rows, numeric.len()])),
        ..Statistics::default()
    };

    if !kept.is_empty() {
        for (name, values) in numeric {
            let column: Vec<f64> = kept.iter().map(|&row| values[row]).collect();
            if let Some(summary) = describe(&column) {
                stats.samples.insert((*name).to_string(), summary);
            }
        }
        stats.mean = mean_of_means(stats.samples.values());
        return stats;
    }

    let cells = numeric.iter().flat_map(|(_, values)| values.iter().copied());
    match Moments::of(cells) {
        Some(moments) => {
            stats.min = Some(moments.min);
            stats.max = Some(moments.max);
            stats.mean = Some(moments.mean);
            stats.count = Some(moments.count);
        }
        None => stats.count = Some(0),
    }
    stats
}

fn summarize_image(summary: &mut SubUnitSummary, image: &ImageData, header: &Header, limit: usize) {
    let shape = shape_text(&image.shape());
    summary.shape = Some(shape.clone());
    summary.unit = Some(
        header
            .text("BUNIT")
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .unwrap_or(NO_UNIT)
            .to_string(),
    );

    let Some(value) = describe_grid(&image.pixels) else {
        return;
    };
    let width = (image.axes.len() >= 2).then(|| image.width());
    summary.preview = grid_preview(&image.pixels, width, limit);
    summary.statistics = Statistics {
        numeric_columns: vec!["value".to_string(), "x".to_string(), "y".to_string()],
        mean: Some(value.mean),
        shape: Some(shape),
        samples: IndexMap::from([("value".to_string(), value)]),
        ..Statistics::default()
    };
}
