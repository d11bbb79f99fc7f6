//! Local heaps (group link names) and global heap collections (variable-length data).

use std::collections::HashMap;

use crate::cursor::{ByteReader, Sizes, c_string, pad8, position};
use crate::error::{Hdf5Error, Result};

/// Data segment of a local heap.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalHeap<'a> {
    segment: &'a [u8],
}

impl<'a> LocalHeap<'a> {
    pub(crate) fn read(data: &'a [u8], base: u64, address: u64, sizes: Sizes) -> Result<Self> {
        let mut reader = ByteReader::new(data, position(base, address)?, sizes);
        reader.expect_signature(b"HEAP", "local heap")?;
        reader.skip(4)?; // version, reserved
        let size = reader.length()?;
        reader.length()?; // free list head
        let segment = reader.address()?;
        let size = usize::try_from(size)
            .map_err(|_| Hdf5Error::invalid_format("local heap size out of range"))?;
        let start = position(base, segment)?;
        let segment = data.get(start..start + size).ok_or(Hdf5Error::Truncated {
            offset: start,
            needed: size,
        })?;
        Ok(Self { segment })
    }

    /// NUL-terminated string at `offset` within the data segment.
    pub(crate) fn string(&self, offset: u64) -> Result<String> {
        let offset = usize::try_from(offset)
            .ok()
            .filter(|offset| *offset < self.segment.len())
            .ok_or_else(|| {
                Hdf5Error::invalid_format(format!("local heap offset {offset} out of range"))
            })?;
        Ok(c_string(&self.segment[offset..]))
    }
}

/// Objects of the global heap collections read so far, keyed by collection address.
#[derive(Debug, Default)]
pub(crate) struct GlobalHeaps<'a> {
    collections: HashMap<u64, HashMap<u16, &'a [u8]>>,
}

impl<'a> GlobalHeaps<'a> {
    pub(crate) fn object(
        &mut self,
        data: &'a [u8],
        base: u64,
        sizes: Sizes,
        address: u64,
        index: u16,
    ) -> Result<&'a [u8]> {
        if !self.collections.contains_key(&address) {
            let collection = read_collection(data, base, sizes, address)?;
            self.collections.insert(address, collection);
        }
        self.collections
            .get(&address)
            .and_then(|collection| collection.get(&index))
            .copied()
            .ok_or_else(|| {
                Hdf5Error::invalid_format(format!(
                    "global heap object {index} missing from collection {address:#x}"
                ))
            })
    }
}

fn read_collection<'a>(
    data: &'a [u8],
    base: u64,
    sizes: Sizes,
    address: u64,
) -> Result<HashMap<u16, &'a [u8]>> {
    let start = position(base, address)?;
    let mut reader = ByteReader::new(data, start, sizes);
    reader.expect_signature(b"GCOL", "global heap collection")?;
    reader.skip(4)?; // version, reserved
    let size = usize::try_from(reader.length()?)
        .map_err(|_| Hdf5Error::invalid_format("global heap size out of range"))?;
    let end = start.saturating_add(size).min(data.len());

    let mut objects = HashMap::new();
    // Object header: index, reference count, reserved, size.
    while reader.pos() + 8 + sizes.length <= end {
        let index = reader.u16()?;
        if index == 0 {
            break; // free space
        }
        reader.skip(6)?;
        let len = usize::try_from(reader.length()?)
            .map_err(|_| Hdf5Error::invalid_format("global heap object size out of range"))?;
        let body = reader.bytes(len)?;
        reader.skip(pad8(len) - len)?;
        objects.insert(index, body);
    }
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_global_heap_objects() {
        let mut data = b"GCOL".to_vec();
        data.extend_from_slice(&[1, 0, 0, 0]);
        data.extend_from_slice(&4096u64.to_le_bytes());
        for (index, text) in [(1u16, &b"Andromeda"[..]), (2, &b"M87"[..])] {
            data.extend_from_slice(&index.to_le_bytes());
            data.extend_from_slice(&[1, 0, 0, 0, 0, 0]);
            data.extend_from_slice(&(text.len() as u64).to_le_bytes());
            data.extend_from_slice(text);
            data.resize(data.len() + pad8(text.len()) - text.len(), 0);
        }
        data.extend_from_slice(&[0; 16]);

        let mut heaps = GlobalHeaps::default();
        let second = heaps.object(&data, 0, Sizes::DEFAULT, 0, 2).unwrap();
        assert_eq!(second, b"M87");
        let first = heaps.object(&data, 0, Sizes::DEFAULT, 0, 1).unwrap();
        assert_eq!(first, b"Andromeda");
        assert!(heaps.object(&data, 0, Sizes::DEFAULT, 0, 3).is_err());
    }
}
