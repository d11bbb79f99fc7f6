//! Minimal FITS writer.
//!
//! Writes a primary unit followed by image and binary-table extensions. Only
//! what the reader decodes is supported: integer and float images, and tables
//! of scalar numeric columns.

use crate::error::{FitsError, Result};
use crate::header::{BLOCK_LEN, HeaderValue, align_to_block, build_card, end_card};
use crate::image::bytes_per_pixel;

/// Numeric column to write into a binary table.
#[derive(Debug, Clone)]
pub struct WriteColumn {
    pub name: String,
    /// One of `B`, `I`, `J`, `K`, `E`, `D`.
    pub code: char,
    pub unit: Option<String>,
    pub values: Vec<f64>,
}

impl WriteColumn {
    pub fn new(name: impl Into<String>, code: char, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            code,
            unit: None,
            values,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn width(&self) -> Option<usize> {
        match self.code {
            'B' => Some(1),
            'I' => Some(2),
            'J' | 'E' => Some(4),
            'K' | 'D' => Some(8),
            _ => None,
        }
    }
}

/// Builder that accumulates units and serializes them in order.
#[derive(Debug, Default)]
pub struct FitsBuilder {
    units: Vec<Vec<u8>>,
}

impl FitsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary unit without data.
    pub fn empty_primary(mut self, cards: &[(&str, HeaderValue)]) -> Result<Self> {
        let mut header = vec![
            ("SIMPLE", HeaderValue::Logical(true)),
            ("BITPIX", HeaderValue::Integer(8)),
            ("NAXIS", HeaderValue::Integer(0)),
            ("EXTEND", HeaderValue::Logical(true)),
        ];
        header.extend(cards.iter().cloned());
        self.units.push(encode_unit(&header, &[])?);
        Ok(self)
    }

    /// Primary unit holding an image. `axes` are `NAXIS1..NAXISn`.
    pub fn primary_image(
        self,
        bitpix: i64,
        axes: &[usize],
        pixels: &[f64],
        cards: &[(&str, HeaderValue)],
    ) -> Result<Self> {
        let mut header = vec![("SIMPLE", HeaderValue::Logical(true))];
        header.extend(image_structure(bitpix, axes));
        header.push(("EXTEND", HeaderValue::Logical(true)));
        self.push_image(header, bitpix, axes, pixels, cards)
    }

    /// `IMAGE` extension.
    pub fn image_extension(
        mut self,
        name: &str,
        bitpix: i64,
        axes: &[usize],
        pixels: &[f64],
        cards: &[(&str, HeaderValue)],
    ) -> Result<Self> {
        if self.units.is_empty() {
            self = self.empty_primary(&[])?;
        }
        let mut header = vec![("XTENSION", HeaderValue::Text("IMAGE".into()))];
        header.extend(image_structure(bitpix, axes));
        header.push(("PCOUNT", HeaderValue::Integer(0)));
        header.push(("GCOUNT", HeaderValue::Integer(1)));
        header.push(("EXTNAME", HeaderValue::Text(name.to_string())));
        self.push_image(header, bitpix, axes, pixels, cards)
    }

    /// `BINTABLE` extension. All columns must have the same length.
    pub fn binary_table(
        mut self,
        name: &str,
        columns: &[WriteColumn],
        cards: &[(&str, HeaderValue)],
    ) -> Result<Self> {
        if self.units.is_empty() {
            self = self.empty_primary(&[])?;
        }
        let rows = columns.first().map_or(0, |column| column.values.len());
        let mut row_len = 0usize;
        for column in columns {
            if column.values.len() != rows {
                return Err(FitsError::invalid_format(format!(
                    "column {} has {} rows, expected {rows}",
                    column.name,
                    column.values.len()
                )));
            }
            row_len += column.width().ok_or_else(|| {
                FitsError::invalid_column_format(0, &column.name, column.code.to_string())
            })?;
        }

        let mut header = vec![
            ("XTENSION", HeaderValue::Text("BINTABLE".into())),
            ("BITPIX", HeaderValue::Integer(8)),
            ("NAXIS", HeaderValue::Integer(2)),
            ("NAXIS1", HeaderValue::Integer(row_len as i64)),
            ("NAXIS2", HeaderValue::Integer(rows as i64)),
            ("PCOUNT", HeaderValue::Integer(0)),
            ("GCOUNT", HeaderValue::Integer(1)),
            ("TFIELDS", HeaderValue::Integer(columns.len() as i64)),
        ];
        let mut keys = Vec::new();
        for (index, column) in columns.iter().enumerate() {
            let n = index + 1;
            keys.push((format!("TTYPE{n}"), HeaderValue::Text(column.name.clone())));
            keys.push((format!("TFORM{n}"), HeaderValue::Text(column.code.to_string())));
            if let Some(unit) = &column.unit {
                keys.push((format!("TUNIT{n}"), HeaderValue::Text(unit.clone())));
            }
        }
        header.extend(keys.iter().map(|(key, value)| (key.as_str(), value.clone())));
        header.push(("EXTNAME", HeaderValue::Text(name.to_string())));
        header.extend(cards.iter().cloned());

        let mut data = Vec::with_capacity(row_len * rows);
        for row in 0..rows {
            for column in columns {
                encode_value(&mut data, column.code, column.values[row]);
            }
        }
        self.units.push(encode_unit(&header, &data)?);
        Ok(self)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.units.concat()
    }

    fn push_image<'a>(
        mut self,
        mut header: Vec<(&'a str, HeaderValue)>,
        bitpix: i64,
        axes: &[usize],
        pixels: &[f64],
        cards: &[(&'a str, HeaderValue)],
    ) -> Result<Self> {
        let width = bytes_per_pixel(bitpix)
            .ok_or(FitsError::UnsupportedBitpix { hdu: self.units.len(), bitpix })?;
        let count: usize = axes.iter().product();
        if count != pixels.len() {
            return Err(FitsError::invalid_format(format!(
                "image has {} pixels, axes describe {count}",
                pixels.len()
            )));
        }
        header.extend(cards.iter().cloned());

        let mut data = Vec::with_capacity(count * width);
        let code = match bitpix {
            8 => 'B',
            16 => 'I',
            32 => 'J',
            64 => 'K',
            -32 => 'E',
            _ => 'D',
        };
        for pixel in pixels {
            encode_value(&mut data, code, *pixel);
        }
        self.units.push(encode_unit(&header, &data)?);
        Ok(self)
    }
}

fn image_structure(bitpix: i64, axes: &[usize]) -> Vec<(&'static str, HeaderValue)> {
    const AXIS_KEYS: [&str; 9] = [
        "NAXIS1", "NAXIS2", "NAXIS3", "NAXIS4", "NAXIS5", "NAXIS6", "NAXIS7", "NAXIS8", "NAXIS9",
    ];
    let mut cards = vec![
        ("BITPIX", HeaderValue::Integer(bitpix)),
        ("NAXIS", HeaderValue::Integer(axes.len() as i64)),
    ];
    for (key, axis) in AXIS_KEYS.iter().zip(axes) {
        cards.push((*key, HeaderValue::Integer(*axis as i64)));
    }
    cards
}

/// Big-endian encoding; integer codes round to the nearest value.
fn encode_value(out: &mut Vec<u8>, code: char, value: f64) {
    match code {
        'B' => out.push(value.round() as u8),
        'I' => out.extend_from_slice(&(value.round() as i16).to_be_bytes()),
        'J' => out.extend_from_slice(&(value.round() as i32).to_be_bytes()),
        'K' => out.extend_from_slice(&(value.round() as i64).to_be_bytes()),
        'E' => out.extend_from_slice(&(value as f32).to_be_bytes()),
        _ => out.extend_from_slice(&value.to_be_bytes()),
    }
}

fn encode_unit(cards: &[(&str, HeaderValue)], data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(BLOCK_LEN + align_to_block(data.len()));
    for (keyword, value) in cards {
        out.extend_from_slice(&build_card(keyword, value)?);
    }
    out.extend_from_slice(&end_card());
    out.resize(align_to_block(out.len()), b' ');
    out.extend_from_slice(data);
    out.resize(align_to_block(out.len()), 0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdu::HduKind;
    use crate::reader::{parse_fits, read_fits};

    #[test]
    fn table_and_image_units_are_read_back() {
        let bytes = FitsBuilder::new()
            .empty_primary(&[("TELESCOP", HeaderValue::Text("JWST".into()))])
            .unwrap()
            .binary_table(
                "SOURCES",
                &[
                    WriteColumn::new("RA", 'D', vec![10.5, 11.0, 12.25]),
                    WriteColumn::new("DEC", 'E', vec![-5.0, -5.5, -6.0]),
                    WriteColumn::new("FLUX", 'J', vec![100.0, 250.0, 75.0]).with_unit("count"),
                ],
                &[],
            )
            .unwrap()
            .image_extension("SCI", -32, &[4, 3], &(0..12).map(f64::from).collect::<Vec<_>>(), &[
                ("BUNIT", HeaderValue::Text("MJy/sr".into())),
            ])
            .unwrap()
            .to_bytes();

        let file = parse_fits(&bytes).unwrap();
        assert_eq!(file.hdus.len(), 3);
        assert_eq!(file.hdus[0].header.text("TELESCOP"), Some("JWST"));
        assert!(!file.hdus[0].has_data());

        let table_hdu = &file.hdus[1];
        assert_eq!(table_hdu.kind, HduKind::BinaryTable);
        assert_eq!(table_hdu.name(), "SOURCES");
        let table = table_hdu.table().unwrap();
        assert_eq!(table.rows, 3);
        let flux = table.column("FLUX").unwrap();
        assert_eq!(flux.unit.as_deref(), Some("count"));
        assert_eq!(flux.values.as_deref(), Some(&[100.0, 250.0, 75.0][..]));
        assert_eq!(table.column("DEC").unwrap().values.as_ref().unwrap()[1], -5.5);

        let image_hdu = &file.hdus[2];
        assert_eq!(image_hdu.kind, HduKind::Image);
        let image = image_hdu.image().unwrap();
        assert_eq!(image.axes, vec![4, 3]);
        assert_eq!(image.shape(), vec![3, 4]);
        assert_eq!(image.pixels[7], 7.0);
        assert_eq!(image_hdu.header.text("BUNIT"), Some("MJy/sr"));
    }

    #[test]
    fn read_from_disk_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.fits");
        let bytes = FitsBuilder::new()
            .primary_image(16, &[2, 2], &[1.0, 2.0, 3.0, 4.0], &[])
            .unwrap()
            .to_bytes();
        std::fs::write(&path, bytes).unwrap();

        let file = read_fits(&path).unwrap();
        let image = file.primary().unwrap().image().unwrap();
        assert_eq!(image.pixels, vec![1.0, 2.0, 3.0, 4.0]);

        let err = read_fits(&dir.path().join("absent.fits")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = FitsBuilder::new()
            .binary_table(
                "BAD",
                &[
                    WriteColumn::new("RA", 'D', vec![1.0, 2.0]),
                    WriteColumn::new("DEC", 'D', vec![1.0]),
                ],
                &[],
            )
            .unwrap_err();
        assert!(err.to_string().contains("column DEC has 1 rows, expected 2"));
    }
}
