//! Image data decoding.

use crate::error::{FitsError, Result};
use crate::hdu::ImageData;
use crate::header::Header;

/// Bytes per element for a BITPIX value.
pub fn bytes_per_pixel(bitpix: i64) -> Option<usize> {
    match bitpix {
        8 => Some(1),
        16 => Some(2),
        32 | -32 => Some(4),
        64 | -64 => Some(8),
        _ => None,
    }
}

/// Decode a big-endian pixel array into physical values.
pub(crate) fn decode_image(
    header: &Header,
    axes: Vec<usize>,
    bytes: &[u8],
    hdu: usize,
) -> Result<ImageData> {
    let bitpix = header.required_int("BITPIX", hdu)?;
    let width = bytes_per_pixel(bitpix).ok_or(FitsError::UnsupportedBitpix { hdu, bitpix })?;
    let count: usize = axes.iter().product();
    let expected = count * width;
    if bytes.len() < expected {
        return Err(FitsError::TruncatedData {
            hdu,
            expected,
            available: bytes.len(),
        });
    }

    let bscale = header.float("BSCALE").unwrap_or(1.0);
    let bzero = header.float("BZERO").unwrap_or(0.0);
    let blank = header.int("BLANK");
    let scale_int = |raw: i64| {
        if Some(raw) == blank {
            f64::NAN
        } else {
            raw as f64 * bscale + bzero
        }
    };

    let chunks = bytes[..expected].chunks_exact(width);
    let pixels: Vec<f64> = match bitpix {
        8 => chunks.map(|c| scale_int(i64::from(c[0]))).collect(),
        16 => chunks
            .map(|c| scale_int(i64::from(i16::from_be_bytes(be(c)))))
            .collect(),
        32 => chunks
            .map(|c| scale_int(i64::from(i32::from_be_bytes(be(c)))))
            .collect(),
        64 => chunks.map(|c| scale_int(i64::from_be_bytes(be(c)))).collect(),
        -32 => chunks
            .map(|c| f64::from(f32::from_be_bytes(be(c))) * bscale + bzero)
            .collect(),
        _ => chunks
            .map(|c| f64::from_be_bytes(be(c)) * bscale + bzero)
            .collect(),
    };

    Ok(ImageData { axes, pixels })
}

/// Copy a chunk of known length into a fixed array.
pub(crate) fn be<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&chunk[..N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;

    fn header(bitpix: i64) -> Header {
        let mut header = Header::new();
        header.insert("BITPIX", HeaderValue::Integer(bitpix));
        header
    }

    #[test]
    fn decodes_scaled_int16() {
        let mut header = header(16);
        header.insert("BSCALE", HeaderValue::Float(0.5));
        header.insert("BZERO", HeaderValue::Float(10.0));
        header.insert("BLANK", HeaderValue::Integer(-1));
        let bytes = [0x00, 0x04, 0xFF, 0xFF, 0x00, 0x00];
        let image = decode_image(&header, vec![3, 1], &bytes, 0).unwrap();
        assert_eq!(image.pixels[0], 12.0);
        assert!(image.pixels[1].is_nan());
        assert_eq!(image.pixels[2], 10.0);
        assert_eq!(image.shape(), vec![1, 3]);
        assert_eq!(image.width(), 3);
    }

    #[test]
    fn decodes_float32() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f32.to_be_bytes());
        bytes.extend_from_slice(&f32::NAN.to_be_bytes());
        let image = decode_image(&header(-32), vec![2], &bytes, 0).unwrap();
        assert_eq!(image.pixels[0], 1.5);
        assert!(image.pixels[1].is_nan());
    }

    #[test]
    fn rejects_unknown_bitpix() {
        let err = decode_image(&header(24), vec![1], &[0, 0, 0], 2).unwrap_err();
        assert!(matches!(err, FitsError::UnsupportedBitpix { hdu: 2, bitpix: 24 }));
    }
}
