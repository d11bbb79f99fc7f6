//! Group membership: symbol tables (old-style groups) and link messages.

use std::collections::HashSet;

use crate::cursor::{ByteReader, Sizes, UNDEFINED, position};
use crate::error::{Hdf5Error, Result};
use crate::heap::LocalHeap;
use crate::object_header::{MSG_LINK, MSG_LINK_INFO, MSG_SYMBOL_TABLE, ObjectHeader};

/// A hard link from a group to a child object header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub name: String,
    pub address: u64,
}

/// Hard links of a group, sorted by name. Soft and external links are skipped.
pub(crate) fn links(
    data: &[u8],
    base: u64,
    sizes: Sizes,
    header: &ObjectHeader<'_>,
) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    if let Some(message) = header.find(MSG_SYMBOL_TABLE) {
        let mut reader = ByteReader::new(message.data, 0, sizes);
        let btree = reader.address()?;
        let heap = reader.address()?;
        let heap = LocalHeap::read(data, base, heap, sizes)?;
        let mut seen = HashSet::new();
        symbol_tree(data, base, sizes, btree, &heap, &mut links, &mut seen)?;
    }

    if let Some(message) = header.find(MSG_LINK_INFO) {
        let mut reader = ByteReader::new(message.data, 0, sizes);
        reader.skip(1)?; // version
        let flags = reader.u8()?;
        if flags & 0x01 != 0 {
            reader.skip(8)?; // maximum creation index
        }
        if reader.address()? != UNDEFINED {
            return Err(Hdf5Error::unsupported("dense link storage"));
        }
    }
    for message in header.all(MSG_LINK) {
        if let Some(link) = parse_link(message.data, sizes)? {
            links.push(link);
        }
    }

    links.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(links)
}

fn symbol_tree(
    data: &[u8],
    base: u64,
    sizes: Sizes,
    address: u64,
    heap: &LocalHeap<'_>,
    links: &mut Vec<Link>,
    seen: &mut HashSet<u64>,
) -> Result<()> {
    if address == UNDEFINED {
        return Ok(());
    }
    if !seen.insert(address) {
        return Err(Hdf5Error::invalid_format("cycle in group B-tree"));
    }
    let mut reader = ByteReader::new(data, position(base, address)?, sizes);
    reader.expect_signature(b"TREE", "group B-tree")?;
    let node_type = reader.u8()?;
    if node_type != 0 {
        return Err(Hdf5Error::invalid_format(format!(
            "expected group B-tree node, found type {node_type}"
        )));
    }
    let level = reader.u8()?;
    let entries = usize::from(reader.u16()?);
    reader.address()?; // left sibling
    reader.address()?; // right sibling

    for _ in 0..entries {
        reader.length()?; // key: heap offset of the largest name in the child
        let child = reader.address()?;
        if level > 0 {
            symbol_tree(data, base, sizes, child, heap, links, seen)?;
        } else {
            symbol_node(data, base, sizes, child, heap, links)?;
        }
    }
    Ok(())
}

fn symbol_node(
    data: &[u8],
    base: u64,
    sizes: Sizes,
    address: u64,
    heap: &LocalHeap<'_>,
    links: &mut Vec<Link>,
) -> Result<()> {
    let mut reader = ByteReader::new(data, position(base, address)?, sizes);
    reader.expect_signature(b"SNOD", "symbol table node")?;
    reader.skip(2)?; // version, reserved
    let count = reader.u16()?;
    for _ in 0..count {
        let name = reader.uint(sizes.offset)?;
        let object = reader.address()?;
        reader.skip(4 + 4 + 16)?; // cache type, reserved, scratch pad
        links.push(Link {
            name: heap.string(name)?,
            address: object,
        });
    }
    Ok(())
}

fn parse_link(data: &[u8], sizes: Sizes) -> Result<Option<Link>> {
    let mut reader = ByteReader::new(data, 0, sizes);
    let version = reader.u8()?;
    if version != 1 {
        return Err(Hdf5Error::UnsupportedVersion {
            structure: "link",
            version,
        });
    }
    let flags = reader.u8()?;
    let link_type = if flags & 0x08 != 0 { reader.u8()? } else { 0 };
    if flags & 0x04 != 0 {
        reader.skip(8)?; // creation order
    }
    if flags & 0x10 != 0 {
        reader.skip(1)?; // character set
    }
    let name_len = reader.uint(1 << (flags & 0x03))? as usize;
    let name = String::from_utf8_lossy(reader.bytes(name_len)?).into_owned();
    if link_type != 0 {
        return Ok(None);
    }
    let address = reader.address()?;
    Ok(Some(Link { name, address }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hard_and_soft_links() {
        let mut hard = vec![1, 0, 4];
        hard.extend_from_slice(b"flux");
        hard.extend_from_slice(&640u64.to_le_bytes());
        assert_eq!(
            parse_link(&hard, Sizes::DEFAULT).unwrap(),
            Some(Link {
                name: "flux".into(),
                address: 640
            })
        );

        let mut soft = vec![1, 0x08, 1, 5];
        soft.extend_from_slice(b"alias");
        soft.extend_from_slice(&5u16.to_le_bytes());
        soft.extend_from_slice(b"/flux");
        assert_eq!(parse_link(&soft, Sizes::DEFAULT).unwrap(), None);
    }
}
