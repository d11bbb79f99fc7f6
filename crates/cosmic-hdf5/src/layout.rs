//! Data layout message decoding and raw storage assembly.

use std::collections::HashSet;

use crate::cursor::{ByteReader, Sizes, UNDEFINED, position};
use crate::error::{Hdf5Error, Result};

/// Where a dataset's raw elements live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Stored inside the object header.
    Compact(Vec<u8>),
    /// One contiguous block. `size` is absent for old layout versions.
    Contiguous { address: u64, size: Option<u64> },
    /// Equal-sized chunks indexed by a version 1 B-tree.
    Chunked { btree: u64, chunk: Vec<usize> },
}

impl Layout {
    pub(crate) fn parse(data: &[u8], sizes: Sizes) -> Result<Self> {
        let mut reader = ByteReader::new(data, 0, sizes);
        let version = reader.u8()?;
        match version {
            1 | 2 => parse_v1(&mut reader),
            3 | 4 => parse_v3(&mut reader, version),
            other => Err(Hdf5Error::UnsupportedVersion {
                structure: "data layout",
                version: other,
            }),
        }
    }
}

fn chunk_dims(reader: &mut ByteReader<'_>, count: usize) -> Result<Vec<usize>> {
    // The final dimension is the element size; only the spatial ones are kept.
    let mut dims = (0..count)
        .map(|_| reader.u32().map(|dim| dim as usize))
        .collect::<Result<Vec<_>>>()?;
    dims.pop();
    Ok(dims)
}

fn parse_v1(reader: &mut ByteReader<'_>) -> Result<Layout> {
    let rank = usize::from(reader.u8()?);
    let class = reader.u8()?;
    reader.skip(5)?;
    match class {
        0 => {
            reader.skip(rank * 4)?;
            let size = reader.u32()? as usize;
            Ok(Layout::Compact(reader.bytes(size)?.to_vec()))
        }
        1 => {
            let address = reader.address()?;
            Ok(Layout::Contiguous {
                address,
                size: None,
            })
        }
        2 => {
            let btree = reader.address()?;
            let chunk = chunk_dims(reader, rank)?;
            Ok(Layout::Chunked { btree, chunk })
        }
        other => Err(Hdf5Error::invalid_format(format!(
            "unknown layout class {other}"
        ))),
    }
}

fn parse_v3(reader: &mut ByteReader<'_>, version: u8) -> Result<Layout> {
    let class = reader.u8()?;
    match class {
        0 => {
            let size = usize::from(reader.u16()?);
            Ok(Layout::Compact(reader.bytes(size)?.to_vec()))
        }
        1 => {
            let address = reader.address()?;
            let size = reader.length()?;
            Ok(Layout::Contiguous {
                address,
                size: Some(size),
            })
        }
        2 if version == 3 => {
            let rank = usize::from(reader.u8()?);
            let btree = reader.address()?;
            let chunk = chunk_dims(reader, rank)?;
            Ok(Layout::Chunked { btree, chunk })
        }
        2 => Err(Hdf5Error::unsupported("version 4 chunk indexes")),
        3 => Err(Hdf5Error::unsupported("virtual dataset layout")),
        other => Err(Hdf5Error::invalid_format(format!(
            "unknown layout class {other}"
        ))),
    }
}

/// Everything needed to turn a layout into a flat, row-major byte buffer.
pub(crate) struct Storage<'a> {
    pub data: &'a [u8],
    pub base: u64,
    pub sizes: Sizes,
    pub shape: &'a [usize],
    pub element_size: usize,
}

impl Storage<'_> {
    fn total(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(self.element_size, |acc, dim| acc.checked_mul(*dim))
            .ok_or_else(|| Hdf5Error::invalid_format("dataset size overflows"))
    }

    /// Raw element bytes. Unallocated storage reads as zeros.
    pub(crate) fn read(&self, layout: &Layout) -> Result<Vec<u8>> {
        let total = self.total()?;
        match layout {
            Layout::Compact(bytes) => bytes
                .get(..total)
                .map(<[u8]>::to_vec)
                .ok_or(Hdf5Error::Truncated {
                    offset: 0,
                    needed: total,
                }),
            Layout::Contiguous { address, .. } if *address == UNDEFINED => Ok(vec![0; total]),
            Layout::Contiguous { address, .. } => {
                let start = position(self.base, *address)?;
                let mut reader = ByteReader::new(self.data, start, self.sizes);
                Ok(reader.bytes(total)?.to_vec())
            }
            Layout::Chunked { btree, chunk } => {
                let mut out = vec![0; total];
                if *btree != UNDEFINED {
                    let mut seen = HashSet::new();
                    self.copy_chunks(*btree, chunk, &mut out, &mut seen)?;
                }
                Ok(out)
            }
        }
    }

    /// Walk a type 1 B-tree node and copy each leaf chunk into `out`.
    fn copy_chunks(
        &self,
        address: u64,
        chunk: &[usize],
        out: &mut [u8],
        seen: &mut HashSet<u64>,
    ) -> Result<()> {
        if !seen.insert(address) {
            return Err(Hdf5Error::invalid_format("cycle in chunk index"));
        }
        if chunk.len() != self.shape.len() {
            return Err(Hdf5Error::invalid_format(format!(
                "chunk rank {} does not match dataset rank {}",
                chunk.len(),
                self.shape.len()
            )));
        }
        let mut reader = ByteReader::new(self.data, position(self.base, address)?, self.sizes);
        reader.expect_signature(b"TREE", "chunk B-tree")?;
        let node_type = reader.u8()?;
        if node_type != 1 {
            return Err(Hdf5Error::invalid_format(format!(
                "expected chunk B-tree node, found type {node_type}"
            )));
        }
        let level = reader.u8()?;
        let entries = usize::from(reader.u16()?);
        reader.address()?; // left sibling
        reader.address()?; // right sibling

        for _ in 0..entries {
            let stored = reader.u32()? as usize;
            let filter_mask = reader.u32()?;
            let offsets = (0..=self.shape.len())
                .map(|_| reader.u64().map(|offset| offset as usize))
                .collect::<Result<Vec<_>>>()?;
            let child = reader.address()?;
            if level > 0 {
                self.copy_chunks(child, chunk, out, seen)?;
                continue;
            }
            if filter_mask != 0 {
                return Err(Hdf5Error::unsupported("filtered chunk storage"));
            }
            let start = position(self.base, child)?;
            let mut chunk_reader = ByteReader::new(self.data, start, self.sizes);
            let bytes = chunk_reader.bytes(stored)?;
            self.place_chunk(bytes, &offsets[..self.shape.len()], chunk, out)?;
        }
        Ok(())
    }

    fn place_chunk(
        &self,
        bytes: &[u8],
        origin: &[usize],
        chunk: &[usize],
        out: &mut [u8],
    ) -> Result<()> {
        let count: usize = chunk.iter().product();
        let size = self.element_size;
        if bytes.len() < count * size {
            return Err(Hdf5Error::invalid_format(format!(
                "chunk holds {} bytes, expected {}",
                bytes.len(),
                count * size
            )));
        }
        let mut index = vec![0usize; chunk.len()];
        for element in 0..count {
            // Decompose the element number into a row-major index within the chunk.
            let mut rest = element;
            for axis in (0..chunk.len()).rev() {
                index[axis] = rest % chunk[axis];
                rest /= chunk[axis];
            }
            let mut target = 0usize;
            let mut inside = true;
            for axis in 0..chunk.len() {
                let coordinate = origin[axis] + index[axis];
                if coordinate >= self.shape[axis] {
                    inside = false;
                    break;
                }
                target = target * self.shape[axis] + coordinate;
            }
            if inside {
                let from = element * size;
                out[target * size..(target + 1) * size].copy_from_slice(&bytes[from..from + size]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_three_contiguous() {
        let mut data = vec![3, 1];
        data.extend_from_slice(&2048u64.to_le_bytes());
        data.extend_from_slice(&80u64.to_le_bytes());
        assert_eq!(
            Layout::parse(&data, Sizes::DEFAULT).unwrap(),
            Layout::Contiguous {
                address: 2048,
                size: Some(80)
            }
        );
    }

    #[test]
    fn rejects_virtual_layout() {
        let err = Layout::parse(&[4, 3], Sizes::DEFAULT).unwrap_err();
        assert!(err.to_string().contains("virtual"));
    }

    #[test]
    fn assembles_edge_chunks() {
        // 3x3 dataset of u8 stored as four 2x2 chunks.
        let sizes = Sizes::DEFAULT;
        let mut file = vec![0u8; 64];
        let chunks: [([u64; 2], [u8; 4]); 4] = [
            ([0, 0], [1, 2, 4, 5]),
            ([0, 2], [3, 0, 6, 0]),
            ([2, 0], [7, 8, 0, 0]),
            ([2, 2], [9, 0, 0, 0]),
        ];
        let mut addresses = Vec::new();
        for (_, bytes) in &chunks {
            addresses.push(file.len() as u64);
            file.extend_from_slice(bytes);
        }
        let btree = file.len() as u64;
        file.extend_from_slice(b"TREE");
        file.extend_from_slice(&[1, 0]);
        file.extend_from_slice(&4u16.to_le_bytes());
        file.extend_from_slice(&u64::MAX.to_le_bytes());
        file.extend_from_slice(&u64::MAX.to_le_bytes());
        for ((origin, _), address) in chunks.iter().zip(&addresses) {
            file.extend_from_slice(&4u32.to_le_bytes());
            file.extend_from_slice(&0u32.to_le_bytes());
            file.extend_from_slice(&origin[0].to_le_bytes());
            file.extend_from_slice(&origin[1].to_le_bytes());
            file.extend_from_slice(&0u64.to_le_bytes());
            file.extend_from_slice(&address.to_le_bytes());
        }

        let shape = [3, 3];
        let storage = Storage {
            data: &file,
            base: 0,
            sizes,
            shape: &shape,
            element_size: 1,
        };
        let layout = Layout::Chunked {
            btree,
            chunk: vec![2, 2],
        };
        assert_eq!(storage.read(&layout).unwrap(), (1..=9).collect::<Vec<u8>>());
    }
}
