//! Datatype message decoding.

use crate::cursor::{ByteReader, Sizes};
use crate::error::Result;

const CLASS_FIXED_POINT: u8 = 0;
const CLASS_FLOATING_POINT: u8 = 1;
const CLASS_STRING: u8 = 3;
const CLASS_VARIABLE_LENGTH: u8 = 9;

/// Element type of a dataset or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datatype {
    Integer {
        size: usize,
        signed: bool,
        big_endian: bool,
    },
    Float {
        size: usize,
        big_endian: bool,
    },
    FixedString {
        size: usize,
    },
    /// Variable-length string stored in the global heap. Each element is a
    /// length, a heap collection address and an object index.
    VarString {
        size: usize,
    },
    /// Any other class (compound, enum, reference, array, ...).
    Other {
        class: u8,
        size: usize,
    },
}

impl Datatype {
    pub(crate) fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data, 0, Sizes::DEFAULT);
        let class_and_version = reader.u8()?;
        let class = class_and_version & 0x0F;
        let bits = reader.bytes(3)?;
        let size = reader.u32()? as usize;

        Ok(match class {
            CLASS_FIXED_POINT if matches!(size, 1 | 2 | 4 | 8) => Datatype::Integer {
                size,
                signed: bits[0] & 0x08 != 0,
                big_endian: bits[0] & 0x01 != 0,
            },
            // Half and extended precision floats are left undecoded.
            CLASS_FLOATING_POINT if matches!(size, 4 | 8) => Datatype::Float {
                size,
                big_endian: bits[0] & 0x01 != 0,
            },
            CLASS_STRING => Datatype::FixedString { size },
            CLASS_VARIABLE_LENGTH if bits[0] & 0x0F == 1 => Datatype::VarString { size },
            other => Datatype::Other { class: other, size },
        })
    }

    /// Bytes per element as stored in the file.
    pub fn size(&self) -> usize {
        match self {
            Datatype::Integer { size, .. }
            | Datatype::Float { size, .. }
            | Datatype::FixedString { size }
            | Datatype::VarString { size }
            | Datatype::Other { size, .. } => *size,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Datatype::Integer { .. } | Datatype::Float { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Datatype::FixedString { .. } | Datatype::VarString { .. })
    }

    /// Decode one numeric element as `f64`.
    pub(crate) fn decode_number(&self, bytes: &[u8]) -> Option<f64> {
        match *self {
            Datatype::Integer { .. } => self.decode_int(bytes).map(|value| value as f64),
            Datatype::Float { size, big_endian } => {
                let raw = ordered(bytes, size, big_endian)?;
                Some(if size == 4 {
                    f64::from(f32::from_bits(raw as u32))
                } else {
                    f64::from_bits(raw)
                })
            }
            _ => None,
        }
    }

    /// Decode one integer element, sign-extending signed values.
    pub(crate) fn decode_int(&self, bytes: &[u8]) -> Option<i64> {
        let Datatype::Integer {
            size,
            signed,
            big_endian,
        } = *self
        else {
            return None;
        };
        let raw = ordered(bytes, size, big_endian)?;
        if signed && size < 8 {
            let shift = 64 - size * 8;
            Some(((raw << shift) as i64) >> shift)
        } else {
            Some(raw as i64)
        }
    }
}

fn ordered(bytes: &[u8], size: usize, big_endian: bool) -> Option<u64> {
    let bytes = bytes.get(..size)?;
    let fold = |acc: u64, byte: &u8| (acc << 8) | u64::from(*byte);
    Some(if big_endian {
        bytes.iter().fold(0, fold)
    } else {
        bytes.iter().rev().fold(0, fold)
    })
}

/// Decode a fixed-length string element, trimming NUL and space padding.
pub(crate) fn fixed_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(class: u8, bits: u8, size: u32) -> Vec<u8> {
        let mut data = vec![0x10 | class, bits, 0, 0];
        data.extend_from_slice(&size.to_le_bytes());
        data.extend_from_slice(&[0; 12]);
        data
    }

    #[test]
    fn decodes_signed_little_endian_integers() {
        let datatype = Datatype::parse(&message(0, 0x08, 2)).unwrap();
        assert!(datatype.is_numeric());
        assert_eq!(datatype.decode_int(&(-3i16).to_le_bytes()), Some(-3));
        assert_eq!(datatype.decode_number(&500i16.to_le_bytes()), Some(500.0));
    }

    #[test]
    fn decodes_big_endian_floats() {
        let datatype = Datatype::parse(&message(1, 0x01, 4)).unwrap();
        assert_eq!(datatype.decode_number(&2.5f32.to_be_bytes()), Some(2.5));
        assert_eq!(datatype.size(), 4);
    }

    #[test]
    fn recognizes_strings_and_other_classes() {
        assert_eq!(
            Datatype::parse(&message(3, 0, 12)).unwrap(),
            Datatype::FixedString { size: 12 }
        );
        assert_eq!(
            Datatype::parse(&message(9, 1, 16)).unwrap(),
            Datatype::VarString { size: 16 }
        );
        let compound = Datatype::parse(&message(6, 0, 24)).unwrap();
        assert!(!compound.is_numeric() && !compound.is_text());
        assert_eq!(
            Datatype::parse(&message(1, 0, 2)).unwrap(),
            Datatype::Other { class: 1, size: 2 }
        );
        assert_eq!(fixed_text(b"M31\0\0"), "M31");
    }
}
