//! FITS file reader.

use std::fs;
use std::path::Path;

use crate::error::{FitsError, Result};
use crate::hdu::{FitsFile, Hdu, HduData, HduKind};
use crate::header::{BLOCK_LEN, CARD_LEN, Header, HeaderValue, align_to_block, parse_card};
use crate::image::{bytes_per_pixel, decode_image};
use crate::table::{decode_ascii_table, decode_binary_table};

/// Read a FITS file from a path.
pub fn read_fits(path: &Path) -> Result<FitsFile> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FitsError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            FitsError::Io(e)
        }
    })?;
    parse_fits(&data)
}

/// Parse every header/data unit of an in-memory FITS file.
///
/// Bytes after the last unit that do not start an `XTENSION` header are
/// ignored. Missing block padding after the final data section is tolerated.
pub fn parse_fits(data: &[u8]) -> Result<FitsFile> {
    if data.len() < BLOCK_LEN {
        return Err(FitsError::invalid_format(format!(
            "file too small ({} bytes)",
            data.len()
        )));
    }

    let mut hdus = Vec::new();
    let mut offset = 0usize;
    while offset + CARD_LEN <= data.len() {
        let index = hdus.len();
        if index > 0 && parse_card(&data[offset..offset + CARD_LEN]).keyword != "XTENSION" {
            break;
        }

        let (header, header_len) = Header::parse(data, offset, index)?;
        let kind = hdu_kind(&header, index)?;
        let axes = data_axes(&header, index)?;
        let data_len = data_len(&header, &axes, index)?;

        let start = offset + header_len;
        let available = data.len().saturating_sub(start);
        if data_len > available {
            return Err(FitsError::TruncatedData {
                hdu: index,
                expected: data_len,
                available,
            });
        }
        let bytes = &data[start..start + data_len];

        let hdu_data = match &kind {
            _ if data_len == 0 => HduData::Empty,
            HduKind::Primary | HduKind::Image if is_random_groups(&header) => HduData::Empty,
            HduKind::Primary | HduKind::Image => {
                HduData::Image(decode_image(&header, axes, bytes, index)?)
            }
            HduKind::BinaryTable => HduData::Table(decode_binary_table(&header, bytes, index)?),
            HduKind::AsciiTable => HduData::Table(decode_ascii_table(&header, bytes, index)?),
            HduKind::Other(_) => HduData::Empty,
        };

        hdus.push(Hdu {
            index,
            kind,
            header,
            data: hdu_data,
        });
        offset = start + align_to_block(data_len);
    }

    Ok(FitsFile { hdus })
}

fn hdu_kind(header: &Header, index: usize) -> Result<HduKind> {
    if index == 0 {
        return match header.get("SIMPLE").and_then(HeaderValue::as_bool) {
            Some(true) => Ok(HduKind::Primary),
            _ => Err(FitsError::invalid_format(
                "primary header does not start with SIMPLE = T",
            )),
        };
    }
    let xtension = header
        .text("XTENSION")
        .ok_or_else(|| FitsError::missing_keyword(index, "XTENSION"))?;
    Ok(match xtension.trim() {
        "IMAGE" => HduKind::Image,
        "BINTABLE" => HduKind::BinaryTable,
        "TABLE" => HduKind::AsciiTable,
        other => HduKind::Other(other.to_string()),
    })
}

fn is_random_groups(header: &Header) -> bool {
    header.get("GROUPS").and_then(HeaderValue::as_bool) == Some(true)
        && header.int("NAXIS1") == Some(0)
}

/// `NAXIS1..NAXISn`.
fn data_axes(header: &Header, index: usize) -> Result<Vec<usize>> {
    let naxis = header.required_len("NAXIS", index)?;
    (1..=naxis)
        .map(|axis| header.required_len(&format!("NAXIS{axis}"), index))
        .collect()
}

/// Size of the data section without block padding.
fn data_len(header: &Header, axes: &[usize], index: usize) -> Result<usize> {
    if axes.is_empty() {
        return Ok(0);
    }
    let bitpix = header.required_int("BITPIX", index)?;
    let width = bytes_per_pixel(bitpix).ok_or(FitsError::UnsupportedBitpix {
        hdu: index,
        bitpix,
    })?;
    let counted = if is_random_groups(header) {
        &axes[1..]
    } else {
        axes
    };
    let elements = counted
        .iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(*axis));
    let pcount = header.int("PCOUNT").unwrap_or(0);
    let gcount = header.int("GCOUNT").unwrap_or(1);
    let pcount = usize::try_from(pcount).map_err(|_| FitsError::missing_keyword(index, "PCOUNT"))?;
    let gcount = usize::try_from(gcount).map_err(|_| FitsError::missing_keyword(index, "GCOUNT"))?;

    elements
        .and_then(|elements| elements.checked_add(pcount))
        .and_then(|total| total.checked_mul(gcount))
        .and_then(|total| total.checked_mul(width))
        .ok_or_else(|| FitsError::invalid_format(format!("HDU {index}: data size overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{build_card, end_card};

    fn block(cards: &[(&str, HeaderValue)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in cards {
            out.extend_from_slice(&build_card(key, value).unwrap());
        }
        out.extend_from_slice(&end_card());
        out.resize(align_to_block(out.len()), b' ');
        out
    }

    #[test]
    fn rejects_non_fits() {
        let data = vec![b'x'; BLOCK_LEN];
        assert!(parse_fits(&data).is_err());
        assert!(parse_fits(b"SIMPLE").is_err());
    }

    #[test]
    fn header_only_primary() {
        let data = block(&[
            ("SIMPLE", HeaderValue::Logical(true)),
            ("BITPIX", HeaderValue::Integer(8)),
            ("NAXIS", HeaderValue::Integer(0)),
            ("OBJECT", HeaderValue::Text("NGC 1275".into())),
        ]);
        let file = parse_fits(&data).unwrap();
        assert_eq!(file.hdus.len(), 1);
        let primary = file.primary().unwrap();
        assert_eq!(primary.name(), "PRIMARY");
        assert!(!primary.has_data());
        assert_eq!(primary.header.text("OBJECT"), Some("NGC 1275"));
    }

    #[test]
    fn truncated_image_is_an_error() {
        let mut data = block(&[
            ("SIMPLE", HeaderValue::Logical(true)),
            ("BITPIX", HeaderValue::Integer(16)),
            ("NAXIS", HeaderValue::Integer(2)),
            ("NAXIS1", HeaderValue::Integer(100)),
            ("NAXIS2", HeaderValue::Integer(100)),
        ]);
        data.extend_from_slice(&[0u8; 100]);
        let err = parse_fits(&data).unwrap_err();
        assert!(matches!(
            err,
            FitsError::TruncatedData {
                hdu: 0,
                expected: 20_000,
                available: 100
            }
        ));
    }

    #[test]
    fn unknown_extension_is_kept_without_data() {
        let mut data = block(&[
            ("SIMPLE", HeaderValue::Logical(true)),
            ("BITPIX", HeaderValue::Integer(8)),
            ("NAXIS", HeaderValue::Integer(0)),
            ("EXTEND", HeaderValue::Logical(true)),
        ]);
        data.extend(block(&[
            ("XTENSION", HeaderValue::Text("FOREIGN".into())),
            ("BITPIX", HeaderValue::Integer(8)),
            ("NAXIS", HeaderValue::Integer(1)),
            ("NAXIS1", HeaderValue::Integer(10)),
            ("PCOUNT", HeaderValue::Integer(0)),
            ("GCOUNT", HeaderValue::Integer(1)),
        ]));
        data.extend_from_slice(&[0u8; BLOCK_LEN]);
        let file = parse_fits(&data).unwrap();
        assert_eq!(file.hdus.len(), 2);
        assert_eq!(file.hdus[1].kind, HduKind::Other("FOREIGN".into()));
        assert_eq!(file.hdus[1].data, HduData::Empty);
    }
}
