//! Attribute message decoding.

use std::fmt;

use crate::cursor::{ByteReader, Sizes, pad8};
use crate::dataspace::Dataspace;
use crate::datatype::{Datatype, fixed_text};
use crate::error::{Hdf5Error, Result};

/// Decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
    NumericArray(Vec<f64>),
    TextArray(Vec<String>),
}

impl AttributeValue {
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            AttributeValue::Integer(_) | AttributeValue::Float(_) | AttributeValue::Text(_)
        )
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(value) => write!(f, "{value}"),
            AttributeValue::Float(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => f.write_str(value),
            AttributeValue::NumericArray(values) => {
                let parts: Vec<String> = values.iter().map(f64::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AttributeValue::TextArray(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Named attribute attached to a group or dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Attribute with its still-encoded payload.
#[derive(Debug, Clone)]
pub(crate) struct RawAttribute<'a> {
    pub name: String,
    pub datatype: Datatype,
    pub dataspace: Dataspace,
    pub payload: &'a [u8],
}

/// Parse an attribute message. Shared datatypes or dataspaces yield `None`.
pub(crate) fn parse<'a>(data: &'a [u8], sizes: Sizes) -> Result<Option<RawAttribute<'a>>> {
    let mut reader = ByteReader::new(data, 0, sizes);
    let version = reader.u8()?;
    let flags = reader.u8()?;
    let name_len = usize::from(reader.u16()?);
    let datatype_len = usize::from(reader.u16()?);
    let dataspace_len = usize::from(reader.u16()?);
    // Version 1 pads each field to eight bytes.
    let padded = |len: usize| if version == 1 { pad8(len) } else { len };
    match version {
        1 | 2 => {}
        3 => reader.skip(1)?, // name character set
        other => {
            return Err(Hdf5Error::UnsupportedVersion {
                structure: "attribute",
                version: other,
            });
        }
    }
    let name = fixed_text(reader.bytes(padded(name_len))?);
    let datatype = reader.bytes(padded(datatype_len))?;
    let dataspace = reader.bytes(padded(dataspace_len))?;
    if version > 1 && flags & 0x03 != 0 {
        return Ok(None);
    }
    let payload = &data[reader.pos()..];
    Ok(Some(RawAttribute {
        name,
        datatype: Datatype::parse(datatype)?,
        dataspace: Dataspace::parse(dataspace, sizes)?,
        payload,
    }))
}
