//! Binary and ASCII table decoding.
//!
//! Only scalar numeric columns are decoded into values; vector, string,
//! logical, bit, complex and heap descriptor columns keep their descriptor so
//! callers can still list them.

use crate::error::{FitsError, Result};
use crate::hdu::{TableColumn, TableData};
use crate::header::Header;
use crate::image::be;

/// Parsed binary `TFORMn` value: repeat count and type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryFormat {
    pub repeat: usize,
    pub code: char,
}

impl BinaryFormat {
    pub fn parse(tform: &str) -> Option<Self> {
        let tform = tform.trim();
        let digits = tform.chars().take_while(char::is_ascii_digit).count();
        let repeat = if digits == 0 {
            1
        } else {
            tform[..digits].parse().ok()?
        };
        let code = tform[digits..].chars().next()?.to_ascii_uppercase();
        Some(Self { repeat, code })
    }

    /// Field width in bytes; `None` for unknown codes or a width that
    /// overflows `usize`.
    pub fn width(&self) -> Option<usize> {
        let element: usize = match self.code {
            'X' => return Some(self.repeat.div_ceil(8)),
            'L' | 'B' | 'A' => 1,
            'I' => 2,
            'J' | 'E' => 4,
            'K' | 'D' | 'C' | 'P' => 8,
            'M' | 'Q' => 16,
            _ => return None,
        };
        element.checked_mul(self.repeat)
    }

    /// Whether the column holds a single integer or float per row.
    pub fn is_scalar_numeric(&self) -> bool {
        self.repeat == 1 && matches!(self.code, 'B' | 'I' | 'J' | 'K' | 'E' | 'D')
    }
}

/// Per-column keywords shared by both table kinds.
struct ColumnKeywords {
    name: String,
    format: String,
    unit: Option<String>,
    scale: f64,
    zero: f64,
}

impl ColumnKeywords {
    fn read(header: &Header, index: usize, hdu: usize) -> Result<Self> {
        let format = header
            .text(&format!("TFORM{index}"))
            .ok_or_else(|| FitsError::missing_keyword(hdu, format!("TFORM{index}")))?
            .to_string();
        Ok(Self {
            name: header
                .text(&format!("TTYPE{index}"))
                .map_or_else(|| format!("col{index}"), str::to_string),
            format,
            unit: header
                .text(&format!("TUNIT{index}"))
                .filter(|unit| !unit.is_empty())
                .map(str::to_string),
            scale: header.float(&format!("TSCAL{index}")).unwrap_or(1.0),
            zero: header.float(&format!("TZERO{index}")).unwrap_or(0.0),
        })
    }

    fn into_column(self, values: Option<Vec<f64>>) -> TableColumn {
        TableColumn {
            name: self.name,
            format: self.format,
            unit: self.unit,
            values,
        }
    }
}

/// Decode a `BINTABLE` extension.
pub(crate) fn decode_binary_table(header: &Header, bytes: &[u8], hdu: usize) -> Result<TableData> {
    let row_len = header.required_len("NAXIS1", hdu)?;
    let rows = header.required_len("NAXIS2", hdu)?;
    let fields = header.required_len("TFIELDS", hdu)?;
    check_table_len(row_len, rows, bytes.len(), hdu)?;

    let mut columns = Vec::with_capacity(fields);
    let mut offset = 0usize;
    for index in 1..=fields {
        let keywords = ColumnKeywords::read(header, index, hdu)?;
        let format = BinaryFormat::parse(&keywords.format)
            .filter(|format| format.width().is_some())
            .ok_or_else(|| {
                FitsError::invalid_column_format(hdu, &keywords.name, &keywords.format)
            })?;
        let width = format.width().unwrap_or_default();
        if offset.checked_add(width).is_none_or(|end| end > row_len) {
            return Err(FitsError::invalid_format(format!(
                "HDU {hdu}: columns exceed row length {row_len}"
            )));
        }

        let values = format.is_scalar_numeric().then(|| {
            let null = header.int(&format!("TNULL{index}"));
            (0..rows)
                .map(|row| {
                    let start = row * row_len + offset;
                    let field = &bytes[start..start + width];
                    decode_binary_value(format.code, field, null, keywords.scale, keywords.zero)
                })
                .collect()
        });
        columns.push(keywords.into_column(values));
        offset += width;
    }

    Ok(TableData { rows, columns })
}

/// `NAXIS1 * NAXIS2` must fit in `usize` and in the data section.
fn check_table_len(row_len: usize, rows: usize, available: usize, hdu: usize) -> Result<()> {
    let expected = row_len.checked_mul(rows).ok_or_else(|| {
        FitsError::invalid_format(format!("HDU {hdu}: table size {row_len} x {rows} overflows"))
    })?;
    if available < expected {
        return Err(FitsError::TruncatedData {
            hdu,
            expected,
            available,
        });
    }
    Ok(())
}

fn decode_binary_value(code: char, field: &[u8], null: Option<i64>, scale: f64, zero: f64) -> f64 {
    let integer = match code {
        'B' => i64::from(field[0]),
        'I' => i64::from(i16::from_be_bytes(be(field))),
        'J' => i64::from(i32::from_be_bytes(be(field))),
        'K' => i64::from_be_bytes(be(field)),
        'E' => return f64::from(f32::from_be_bytes(be(field))) * scale + zero,
        _ => return f64::from_be_bytes(be(field)) * scale + zero,
    };
    if Some(integer) == null {
        f64::NAN
    } else {
        integer as f64 * scale + zero
    }
}

/// Width of an ASCII `TFORMn` value such as `F10.3` or `I8`.
fn ascii_width(tform: &str) -> Option<(char, usize)> {
    let tform = tform.trim();
    let code = tform.chars().next()?.to_ascii_uppercase();
    let digits: String = tform.get(1..)?.chars().take_while(char::is_ascii_digit).collect();
    Some((code, digits.parse().ok()?))
}

/// Decode an ASCII `TABLE` extension.
pub(crate) fn decode_ascii_table(header: &Header, bytes: &[u8], hdu: usize) -> Result<TableData> {
    let row_len = header.required_len("NAXIS1", hdu)?;
    let rows = header.required_len("NAXIS2", hdu)?;
    let fields = header.required_len("TFIELDS", hdu)?;
    check_table_len(row_len, rows, bytes.len(), hdu)?;

    let mut columns = Vec::with_capacity(fields);
    for index in 1..=fields {
        let keywords = ColumnKeywords::read(header, index, hdu)?;
        let (code, width) = ascii_width(&keywords.format).ok_or_else(|| {
            FitsError::invalid_column_format(hdu, &keywords.name, &keywords.format)
        })?;
        let start = header
            .int(&format!("TBCOL{index}"))
            .and_then(|col| usize::try_from(col).ok())
            .filter(|col| *col >= 1)
            .ok_or_else(|| FitsError::missing_keyword(hdu, format!("TBCOL{index}")))?
            - 1;
        if start.checked_add(width).is_none_or(|end| end > row_len) {
            return Err(FitsError::invalid_format(format!(
                "HDU {hdu}: column {} exceeds row length {row_len}",
                keywords.name
            )));
        }

        let values = if matches!(code, 'I' | 'F' | 'E' | 'D') {
            let null = header.text(&format!("TNULL{index}")).map(str::trim);
            let mut values = Vec::with_capacity(rows);
            for row in 0..rows {
                let offset = row * row_len + start;
                let text = String::from_utf8_lossy(&bytes[offset..offset + width]);
                let text = text.trim();
                if text.is_empty() || Some(text) == null {
                    values.push(f64::NAN);
                    continue;
                }
                let parsed: f64 = text.replace(['D', 'd'], "E").parse().map_err(|_| {
                    FitsError::invalid_format(format!(
                        "HDU {hdu}: cannot parse '{text}' in column {} row {row}",
                        keywords.name
                    ))
                })?;
                values.push(parsed * keywords.scale + keywords.zero);
            }
            Some(values)
        } else {
            None
        };
        columns.push(keywords.into_column(values));
    }

    Ok(TableData { rows, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;

    #[test]
    fn parses_binary_formats() {
        let format = BinaryFormat::parse("1E").unwrap();
        assert!(format.is_scalar_numeric());
        assert_eq!(format.width(), Some(4));

        let format = BinaryFormat::parse("20A").unwrap();
        assert_eq!(format.width(), Some(20));
        assert!(!format.is_scalar_numeric());

        assert_eq!(BinaryFormat::parse("3D").unwrap().width(), Some(24));
        assert_eq!(BinaryFormat::parse("12X").unwrap().width(), Some(2));
        assert_eq!(BinaryFormat::parse("1PE(40)").unwrap().width(), Some(8));
        assert!(BinaryFormat::parse("").is_none());
    }

    #[test]
    fn oversized_header_values_are_errors() {
        let huge = BinaryFormat {
            repeat: usize::MAX,
            code: 'D',
        };
        assert_eq!(huge.width(), None);

        let mut header = Header::new();
        for (key, value) in [
            ("NAXIS1", HeaderValue::Integer(i64::MAX)),
            ("NAXIS2", HeaderValue::Integer(4)),
            ("TFIELDS", HeaderValue::Integer(1)),
            ("TFORM1", HeaderValue::Text("1D".into())),
        ] {
            header.insert(key, value);
        }
        let err = decode_binary_table(&header, &[], 1).unwrap_err();
        assert!(err.to_string().contains("overflows"));

        let mut header = Header::new();
        for (key, value) in [
            ("NAXIS1", HeaderValue::Integer(8)),
            ("NAXIS2", HeaderValue::Integer(1)),
            ("TFIELDS", HeaderValue::Integer(1)),
            ("TFORM1", HeaderValue::Text(format!("F{}", usize::MAX))),
            ("TBCOL1", HeaderValue::Integer(2)),
        ] {
            header.insert(key, value);
        }
        let err = decode_ascii_table(&header, b"    1.25", 1).unwrap_err();
        assert!(err.to_string().contains("exceeds row length 8"));
    }

    #[test]
    fn decodes_ascii_table() {
        let mut header = Header::new();
        for (key, value) in [
            ("NAXIS1", HeaderValue::Integer(16)),
            ("NAXIS2", HeaderValue::Integer(2)),
            ("TFIELDS", HeaderValue::Integer(2)),
            ("TTYPE1", HeaderValue::Text("NAME".into())),
            ("TFORM1", HeaderValue::Text("A6".into())),
            ("TBCOL1", HeaderValue::Integer(1)),
            ("TTYPE2", HeaderValue::Text("MAG".into())),
            ("TFORM2", HeaderValue::Text("E10.3".into())),
            ("TBCOL2", HeaderValue::Integer(7)),
        ] {
            header.insert(key, value);
        }
        let rows = format!("{:<6}{:>10}{:<6}{:>10}", "VEGA", "0.03D+0", "SIRIUS", "");
        let table = decode_ascii_table(&header, rows.as_bytes(), 1).unwrap();
        assert_eq!(table.rows, 2);
        assert!(!table.columns[0].is_numeric());
        let mags = table.column("MAG").unwrap().values.as_ref().unwrap();
        assert!((mags[0] - 0.03).abs() < 1e-12);
        assert!(mags[1].is_nan());
    }
}
