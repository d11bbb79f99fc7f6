//! Dataspace message decoding.

use crate::cursor::{ByteReader, Sizes};
use crate::error::{Hdf5Error, Result};

/// Extent of a dataset or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dataspace {
    Scalar,
    Simple(Vec<usize>),
    Null,
}

impl Dataspace {
    pub(crate) fn parse(data: &[u8], sizes: Sizes) -> Result<Self> {
        let mut reader = ByteReader::new(data, 0, sizes);
        let version = reader.u8()?;
        let rank = usize::from(reader.u8()?);
        let _flags = reader.u8()?;
        let kind = match version {
            1 => {
                reader.skip(5)?;
                if rank == 0 { 0 } else { 1 }
            }
            2 => reader.u8()?,
            other => {
                return Err(Hdf5Error::UnsupportedVersion {
                    structure: "dataspace",
                    version: other,
                });
            }
        };

        match kind {
            0 => Ok(Dataspace::Scalar),
            1 => {
                let dims = (0..rank)
                    .map(|_| {
                        let dim = reader.length()?;
                        usize::try_from(dim)
                            .map_err(|_| Hdf5Error::invalid_format("dimension out of range"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Dataspace::Simple(dims))
            }
            2 => Ok(Dataspace::Null),
            other => Err(Hdf5Error::invalid_format(format!(
                "unknown dataspace type {other}"
            ))),
        }
    }

    /// Dimensions; empty for scalar and null spaces.
    pub fn shape(&self) -> &[usize] {
        match self {
            Dataspace::Simple(dims) => dims,
            Dataspace::Scalar | Dataspace::Null => &[],
        }
    }

    pub fn element_count(&self) -> Option<usize> {
        match self {
            Dataspace::Scalar => Some(1),
            Dataspace::Null => Some(0),
            Dataspace::Simple(dims) => dims.iter().try_fold(1usize, |acc, dim| acc.checked_mul(*dim)),
        }
    }
}
