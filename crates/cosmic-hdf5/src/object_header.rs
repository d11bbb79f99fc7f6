//! Object header decoding (versions 1 and 2) with continuation blocks.

use std::collections::HashSet;

use crate::cursor::{ByteReader, Sizes, position};
use crate::error::{Hdf5Error, Result};

pub(crate) const MSG_DATASPACE: u16 = 0x0001;
pub(crate) const MSG_LINK_INFO: u16 = 0x0002;
pub(crate) const MSG_DATATYPE: u16 = 0x0003;
pub(crate) const MSG_LINK: u16 = 0x0006;
pub(crate) const MSG_LAYOUT: u16 = 0x0008;
pub(crate) const MSG_FILTER_PIPELINE: u16 = 0x000B;
pub(crate) const MSG_ATTRIBUTE: u16 = 0x000C;
pub(crate) const MSG_CONTINUATION: u16 = 0x0010;
pub(crate) const MSG_SYMBOL_TABLE: u16 = 0x0011;

/// Message flag: contents live in a shared object header message.
pub(crate) const FLAG_SHARED: u8 = 0x02;

/// One header message with its raw body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Message<'a> {
    pub kind: u16,
    pub flags: u8,
    pub data: &'a [u8],
}

/// All messages of an object header, continuation blocks included.
#[derive(Debug, Clone)]
pub(crate) struct ObjectHeader<'a> {
    pub messages: Vec<Message<'a>>,
}

impl<'a> ObjectHeader<'a> {
    pub(crate) fn read(data: &'a [u8], base: u64, address: u64, sizes: Sizes) -> Result<Self> {
        let start = position(base, address)?;
        let first = data.get(start).copied().ok_or(Hdf5Error::Truncated {
            offset: start,
            needed: 1,
        })?;
        if first == 1 {
            read_v1(data, base, start, sizes)
        } else if data.get(start..start + 4) == Some(b"OHDR") {
            read_v2(data, base, start, sizes)
        } else {
            Err(Hdf5Error::invalid_format(format!(
                "no object header at offset {start}"
            )))
        }
    }

    pub(crate) fn find(&self, kind: u16) -> Option<&Message<'a>> {
        self.messages.iter().find(|message| message.kind == kind)
    }

    pub(crate) fn all(&self, kind: u16) -> impl Iterator<Item = &Message<'a>> {
        self.messages.iter().filter(move |message| message.kind == kind)
    }

    pub(crate) fn has(&self, kind: u16) -> bool {
        self.find(kind).is_some()
    }
}

/// A pending block of messages: absolute start and length.
struct Block {
    start: usize,
    len: usize,
    /// Version 2 continuation blocks carry an `OCHK` signature and checksum.
    chunk_signature: bool,
}

fn continuation(message: &Message<'_>, base: u64, sizes: Sizes) -> Result<(usize, usize)> {
    let mut reader = ByteReader::new(message.data, 0, sizes);
    let address = reader.address()?;
    let length = reader.length()?;
    let length = usize::try_from(length)
        .map_err(|_| Hdf5Error::invalid_format("continuation length out of range"))?;
    Ok((position(base, address)?, length))
}

fn read_v1<'a>(data: &'a [u8], base: u64, start: usize, sizes: Sizes) -> Result<ObjectHeader<'a>> {
    let mut reader = ByteReader::new(data, start, sizes);
    reader.skip(2)?; // version, reserved
    reader.skip(2)?; // message count, bounded by the header size instead
    reader.skip(4)?; // reference count
    let size = reader.u32()? as usize;
    reader.skip(4)?; // alignment padding

    let mut blocks = vec![Block {
        start: reader.pos(),
        len: size,
        chunk_signature: false,
    }];
    let mut seen = HashSet::new();
    let mut messages = Vec::new();
    while let Some(block) = blocks.pop() {
        if !seen.insert(block.start) {
            continue;
        }
        let end = block.start + block.len;
        let mut reader = ByteReader::new(data, block.start, sizes);
        while reader.pos() + 8 <= end {
            let kind = reader.u16()?;
            let len = usize::from(reader.u16()?);
            let flags = reader.u8()?;
            reader.skip(3)?;
            let body = reader.bytes(len)?;
            let message = Message {
                kind,
                flags,
                data: body,
            };
            if kind == MSG_CONTINUATION {
                let (start, len) = continuation(&message, base, sizes)?;
                blocks.push(Block {
                    start,
                    len,
                    chunk_signature: false,
                });
            } else if kind != 0 {
                messages.push(message);
            }
        }
    }
    Ok(ObjectHeader { messages })
}

fn read_v2<'a>(data: &'a [u8], base: u64, start: usize, sizes: Sizes) -> Result<ObjectHeader<'a>> {
    let mut reader = ByteReader::new(data, start + 4, sizes);
    let version = reader.u8()?;
    if version != 2 {
        return Err(Hdf5Error::UnsupportedVersion {
            structure: "object header",
            version,
        });
    }
    let flags = reader.u8()?;
    if flags & 0x20 != 0 {
        reader.skip(16)?; // access, modification, change, birth times
    }
    if flags & 0x10 != 0 {
        reader.skip(4)?; // attribute phase change values
    }
    let size = reader.uint(1 << (flags & 0x03))? as usize;
    let tracks_order = flags & 0x04 != 0;

    let mut blocks = vec![Block {
        start: reader.pos(),
        len: size,
        chunk_signature: false,
    }];
    let mut seen = HashSet::new();
    let mut messages = Vec::new();
    while let Some(block) = blocks.pop() {
        if !seen.insert(block.start) {
            continue;
        }
        let mut reader = ByteReader::new(data, block.start, sizes);
        let mut end = block.start + block.len;
        if block.chunk_signature {
            reader.expect_signature(b"OCHK", "object header continuation")?;
            end = end.saturating_sub(4);
        }
        let prefix = if tracks_order { 6 } else { 4 };
        while reader.pos() + prefix <= end {
            let kind = u16::from(reader.u8()?);
            let len = usize::from(reader.u16()?);
            let message_flags = reader.u8()?;
            if tracks_order {
                reader.skip(2)?;
            }
            let body = reader.bytes(len)?;
            let message = Message {
                kind,
                flags: message_flags,
                data: body,
            };
            if kind == MSG_CONTINUATION {
                let (start, len) = continuation(&message, base, sizes)?;
                blocks.push(Block {
                    start,
                    len,
                    chunk_signature: true,
                });
            } else if kind != 0 {
                messages.push(message);
            }
        }
    }
    Ok(ObjectHeader { messages })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_version_two_header() {
        let mut data = b"OHDR".to_vec();
        data.push(2); // version
        data.push(0); // flags: 1-byte chunk size
        let mut body = Vec::new();
        // Symbol table message, 16 bytes
        body.push(MSG_SYMBOL_TABLE as u8);
        body.extend_from_slice(&16u16.to_le_bytes());
        body.push(0);
        body.extend_from_slice(&[7; 16]);
        // trailing gap shorter than a message prefix
        body.extend_from_slice(&[0, 0]);
        data.push(body.len() as u8);
        data.extend_from_slice(&body);
        data.extend_from_slice(&[0; 4]); // checksum

        let header = ObjectHeader::read(&data, 0, 0, Sizes::DEFAULT).unwrap();
        assert_eq!(header.messages.len(), 1);
        assert_eq!(header.messages[0].kind, MSG_SYMBOL_TABLE);
        assert_eq!(header.messages[0].data, &[7; 16]);
    }

    #[test]
    fn rejects_missing_header() {
        let data = [9u8; 32];
        assert!(ObjectHeader::read(&data, 0, 0, Sizes::DEFAULT).is_err());
    }
}
