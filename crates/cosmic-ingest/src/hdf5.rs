//! HDF5 files: root attributes plus the first dataset found.

use cosmic_hdf5::{Dataset, DatasetValues, Hdf5File, parse_hdf5};
use cosmic_model::{DatasetEnvelope, FileFormat, Statistics};

use crate::error::{IngestError, Result};
use crate::sampling::{grid_preview, shape_text};
use crate::stats::Moments;

/// Normalize an HDF5 file.
pub(crate) fn normalize(filename: &str, bytes: &[u8], preview_limit: usize) -> Result<DatasetEnvelope> {
    let parse_error = |e: cosmic_hdf5::Hdf5Error| {
        IngestError::parse(FileFormat::Hierarchical, filename, e)
    };
    let file = parse_hdf5(bytes).map_err(parse_error)?;
    let root = file.root().map_err(parse_error)?;

    let mut envelope = DatasetEnvelope::new(filename, FileFormat::Hierarchical);
    for attribute in &root.attributes {
        if attribute.value.is_scalar() {
            envelope
                .metadata
                .insert(attribute.name.clone(), attribute.value.to_string());
        }
    }

    let Some(dataset) = root.first_dataset() else {
        tracing::debug!(filename, "no dataset in file");
        envelope.statistics = Statistics::with_message("No dataset found");
        return Ok(envelope);
    };
    tracing::debug!(
        filename,
        dataset = %dataset.path,
        shape = %shape_text(dataset.shape()),
        numeric = dataset.is_numeric(),
        "selected first dataset"
    );

    let mut statistics = Statistics {
        dataset_name: Some(dataset.path.clone()),
        shape: Some(shape_text(dataset.shape())),
        ..Statistics::default()
    };
    match read_numeric(&file, dataset).map_err(parse_error)? {
        Some(values) => {
            if let Some(moments) = Moments::of(values.iter().copied()) {
                statistics.mean = Some(moments.mean);
                statistics.std = Some(moments.population_std());
                statistics.min = Some(moments.min);
                statistics.max = Some(moments.max);
            }
            // Only matrices decompose into rows; vectors and cubes stay on row 0.
            let width = match dataset.shape() {
                [_, width] => Some(*width),
                _ => None,
            };
            envelope.preview = grid_preview(&values, width, preview_limit);
        }
        None => statistics.message = Some("Non-numeric data".to_string()),
    }
    envelope.statistics = statistics;
    Ok(envelope)
}

/// Values of a numeric dataset; `None` for anything else.
fn read_numeric(file: &Hdf5File, dataset: &Dataset) -> cosmic_hdf5::Result<Option<Vec<f64>>> {
    if !dataset.is_numeric() {
        return Ok(None);
    }
    match file.read(dataset)? {
        DatasetValues::Numeric(values) => Ok(Some(values)),
        DatasetValues::Text(_) | DatasetValues::Unsupported => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmic_hdf5::{AttributeValue, Hdf5Builder};

    #[test]
    fn array_attributes_are_not_metadata() {
        let bytes = Hdf5Builder::new()
            .root_attribute("TELESCOP", AttributeValue::Text("ALMA".into()))
            .root_attribute("BANDS", AttributeValue::NumericArray(vec![3.0, 6.0]))
            .to_bytes()
            .unwrap();
        let envelope = normalize("empty.h5", &bytes, 1000).unwrap();
        assert_eq!(envelope.metadata.len(), 1);
        assert_eq!(envelope.metadata["TELESCOP"], "ALMA");
        assert_eq!(
            envelope.statistics.message.as_deref(),
            Some("No dataset found")
        );
        assert!(envelope.preview.is_empty());
    }

    #[test]
    fn text_dataset_reports_shape_only() {
        let bytes = Hdf5Builder::new()
            .dataset_text("names", &["M31", "M33", "M51"])
            .unwrap()
            .to_bytes()
            .unwrap();
        let envelope = normalize("names.h5", &bytes, 1000).unwrap();
        let stats = &envelope.statistics;
        assert_eq!(stats.dataset_name.as_deref(), Some("/names"));
        assert_eq!(stats.shape.as_deref(), Some("(3,)"));
        assert_eq!(stats.message.as_deref(), Some("Non-numeric data"));
        assert!(stats.mean.is_none());
        assert!(envelope.preview.is_empty());
    }

    #[test]
    fn cube_preview_stays_on_first_row() {
        let values: Vec<f64> = (0..24).map(f64::from).collect();
        let bytes = Hdf5Builder::new()
            .dataset_f64("cube", &[2, 3, 4], &values)
            .unwrap()
            .to_bytes()
            .unwrap();
        let envelope = normalize("cube.h5", &bytes, 1000).unwrap();
        assert_eq!(envelope.statistics.shape.as_deref(), Some("(2, 3, 4)"));
        assert_eq!(envelope.preview.len(), 24);
        let sixth = &envelope.preview[5];
        assert_eq!((sixth.x, sixth.y, sixth.value), (5.0, 0.0, 5.0));
        assert!(envelope.preview.iter().all(|record| record.y == 0.0));
    }
}
