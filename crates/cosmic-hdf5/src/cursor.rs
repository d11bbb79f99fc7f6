//! Little-endian byte reader aware of the file's offset and length widths.

use crate::error::{Hdf5Error, Result};

/// Address value meaning "not allocated".
pub(crate) const UNDEFINED: u64 = u64::MAX;

/// Widths of addresses and lengths declared in the superblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sizes {
    pub offset: usize,
    pub length: usize,
}

impl Sizes {
    pub(crate) const DEFAULT: Sizes = Sizes {
        offset: 8,
        length: 8,
    };
}

#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    sizes: Sizes,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8], pos: usize, sizes: Sizes) -> Self {
        Self { data, pos, sizes }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len());
        let Some(end) = end else {
            return Err(Hdf5Error::Truncated {
                offset: self.pos,
                needed: len,
            });
        };
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        self.uint(2).map(|value| value as u16)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        self.uint(4).map(|value| value as u32)
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        self.uint(8)
    }

    /// Little-endian unsigned integer of `width` bytes (at most 8).
    pub(crate) fn uint(&mut self, width: usize) -> Result<u64> {
        let bytes = self.bytes(width)?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
    }

    /// File address; all-ones maps to [`UNDEFINED`].
    pub(crate) fn address(&mut self) -> Result<u64> {
        let width = self.sizes.offset;
        let value = self.uint(width)?;
        if width < 8 && value == (1u64 << (width * 8)) - 1 {
            return Ok(UNDEFINED);
        }
        Ok(value)
    }

    pub(crate) fn length(&mut self) -> Result<u64> {
        self.uint(self.sizes.length)
    }

    pub(crate) fn expect_signature(&mut self, signature: &[u8; 4], what: &str) -> Result<()> {
        let start = self.pos;
        if self.bytes(4)? != signature {
            return Err(Hdf5Error::invalid_format(format!(
                "expected {what} signature at offset {start}"
            )));
        }
        Ok(())
    }
}

/// Convert a file address to a slice position.
pub(crate) fn position(base: u64, address: u64) -> Result<usize> {
    base.checked_add(address)
        .and_then(|absolute| usize::try_from(absolute).ok())
        .ok_or_else(|| Hdf5Error::invalid_format(format!("address {address:#x} out of range")))
}

/// Read a NUL-terminated string.
pub(crate) fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Round up to a multiple of eight.
pub(crate) fn pad8(len: usize) -> usize {
    len.div_ceil(8) * 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_and_undefined() {
        let data = [0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x34, 0x12];
        let sizes = Sizes {
            offset: 4,
            length: 2,
        };
        let mut reader = ByteReader::new(&data, 0, sizes);
        assert_eq!(reader.u16().unwrap(), 0x0201);
        assert_eq!(reader.address().unwrap(), UNDEFINED);
        assert_eq!(reader.length().unwrap(), 0x1234);
        assert!(matches!(
            reader.u8(),
            Err(Hdf5Error::Truncated { offset: 8, needed: 1 })
        ));
    }

    #[test]
    fn c_string_stops_at_nul() {
        assert_eq!(c_string(b"flux\0\0\0\0"), "flux");
        assert_eq!(c_string(b"abc"), "abc");
        assert_eq!(pad8(9), 16);
    }
}
