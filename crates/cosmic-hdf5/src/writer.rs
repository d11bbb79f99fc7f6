//! Minimal HDF5 writer.
//!
//! Produces the classic file format: a version 0 superblock, version 1 object
//! headers and symbol-table groups. Datasets are contiguous and hold 64-bit
//! floats, 64-bit signed integers or fixed-length strings. Group and dataset
//! attributes take any [`AttributeValue`].

use crate::attribute::AttributeValue;
use crate::cursor::{UNDEFINED, pad8};
use crate::error::{Hdf5Error, Result};
use crate::object_header::{
    MSG_ATTRIBUTE, MSG_DATASPACE, MSG_DATATYPE, MSG_LAYOUT, MSG_SYMBOL_TABLE,
};
use crate::superblock::SIGNATURE;

const SUPERBLOCK_LEN: usize = 96;
/// Group leaf node K: a symbol table node holds up to 2K entries.
const LEAF_K: usize = 4;
/// Group internal node K: a B-tree node holds up to 2K children.
const INTERNAL_K: usize = 16;
const SYMBOL_ENTRY_LEN: usize = 40;

#[derive(Debug, Clone)]
enum Values {
    Float(Vec<f64>),
    Integer(Vec<i64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone)]
struct DatasetNode {
    shape: Vec<usize>,
    values: Values,
    attributes: Vec<(String, AttributeValue)>,
}

#[derive(Debug, Clone, Default)]
struct GroupNode {
    attributes: Vec<(String, AttributeValue)>,
    children: Vec<(String, Node)>,
}

#[derive(Debug, Clone)]
enum Node {
    Group(GroupNode),
    Dataset(DatasetNode),
}

/// Builder for a small HDF5 file. Paths are `/`-separated; missing parent
/// groups are created on the way.
#[derive(Debug, Clone, Default)]
pub struct Hdf5Builder {
    root: GroupNode,
}

impl Hdf5Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute on the root group.
    pub fn root_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.root.attributes.push((name.to_string(), value));
        self
    }

    pub fn group(mut self, path: &str) -> Result<Self> {
        let (parent, name) = self.parent_of(path)?;
        if parent.children.iter().all(|(existing, _)| existing != name) {
            parent
                .children
                .push((name.to_string(), Node::Group(GroupNode::default())));
        }
        Ok(self)
    }

    /// Attribute on an existing group or dataset.
    pub fn attribute(mut self, path: &str, name: &str, value: AttributeValue) -> Result<Self> {
        let (parent, leaf) = self.parent_of(path)?;
        let attributes = match parent.children.iter_mut().find(|(child, _)| child == leaf) {
            Some((_, Node::Group(group))) => &mut group.attributes,
            Some((_, Node::Dataset(dataset))) => &mut dataset.attributes,
            None => return Err(Hdf5Error::invalid_input(path, "no such object")),
        };
        attributes.push((name.to_string(), value));
        Ok(self)
    }

    pub fn dataset_f64(self, path: &str, shape: &[usize], values: &[f64]) -> Result<Self> {
        self.dataset(path, shape, values.len(), Values::Float(values.to_vec()))
    }

    pub fn dataset_i64(self, path: &str, shape: &[usize], values: &[i64]) -> Result<Self> {
        self.dataset(path, shape, values.len(), Values::Integer(values.to_vec()))
    }

    /// One-dimensional fixed-length string dataset.
    pub fn dataset_text(self, path: &str, values: &[&str]) -> Result<Self> {
        let values: Vec<String> = values.iter().map(|value| (*value).to_string()).collect();
        let len = values.len();
        self.dataset(path, &[len], len, Values::Text(values))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; SUPERBLOCK_LEN];
        let root = write_group(&mut out, &self.root, "/")?;
        let eof = out.len() as u64;

        let mut superblock = Vec::with_capacity(SUPERBLOCK_LEN);
        superblock.extend_from_slice(&SIGNATURE);
        // version 0; free-space, root group and shared header versions; widths 8/8
        superblock.extend_from_slice(&[0, 0, 0, 0, 0, 8, 8, 0]);
        superblock.extend_from_slice(&(LEAF_K as u16).to_le_bytes());
        superblock.extend_from_slice(&(INTERNAL_K as u16).to_le_bytes());
        superblock.extend_from_slice(&0u32.to_le_bytes());
        superblock.extend_from_slice(&0u64.to_le_bytes()); // base address
        superblock.extend_from_slice(&UNDEFINED.to_le_bytes()); // free-space info
        superblock.extend_from_slice(&eof.to_le_bytes());
        superblock.extend_from_slice(&UNDEFINED.to_le_bytes()); // driver info
        superblock.extend_from_slice(&symbol_entry(0, root.header, Some(&root)));
        out[..SUPERBLOCK_LEN].copy_from_slice(&superblock);
        Ok(out)
    }

    fn dataset(mut self, path: &str, shape: &[usize], len: usize, values: Values) -> Result<Self> {
        let count: usize = shape.iter().product();
        if count != len {
            return Err(Hdf5Error::invalid_input(
                path,
                format!("{len} values do not fill shape {shape:?}"),
            ));
        }
        let (parent, name) = self.parent_of(path)?;
        if parent.children.iter().any(|(existing, _)| existing == name) {
            return Err(Hdf5Error::invalid_input(path, "object already exists"));
        }
        parent.children.push((
            name.to_string(),
            Node::Dataset(DatasetNode {
                shape: shape.to_vec(),
                values,
                attributes: Vec::new(),
            }),
        ));
        Ok(self)
    }

    /// Parent group of `path` (created as needed) and the final path segment.
    fn parent_of<'p>(&mut self, path: &'p str) -> Result<(&mut GroupNode, &'p str)> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(leaf) = segments.pop() else {
            return Err(Hdf5Error::invalid_input(path, "empty object path"));
        };
        let mut group = &mut self.root;
        for segment in segments {
            let position = match group.children.iter().position(|(name, _)| name == segment) {
                Some(position) => position,
                None => {
                    group
                        .children
                        .push((segment.to_string(), Node::Group(GroupNode::default())));
                    group.children.len() - 1
                }
            };
            group = match &mut group.children[position].1 {
                Node::Group(child) => child,
                Node::Dataset(_) => {
                    return Err(Hdf5Error::invalid_input(path, "parent is a dataset"));
                }
            };
        }
        Ok((group, leaf))
    }
}

/// Addresses of a written group.
struct GroupAddresses {
    header: u64,
    btree: u64,
    heap: u64,
}

fn align(out: &mut Vec<u8>) -> u64 {
    out.resize(pad8(out.len()), 0);
    out.len() as u64
}

fn symbol_entry(name_offset: u64, header: u64, group: Option<&GroupAddresses>) -> Vec<u8> {
    let mut entry = Vec::with_capacity(SYMBOL_ENTRY_LEN);
    entry.extend_from_slice(&name_offset.to_le_bytes());
    entry.extend_from_slice(&header.to_le_bytes());
    match group {
        Some(group) => {
            entry.extend_from_slice(&1u32.to_le_bytes());
            entry.extend_from_slice(&0u32.to_le_bytes());
            entry.extend_from_slice(&group.btree.to_le_bytes());
            entry.extend_from_slice(&group.heap.to_le_bytes());
        }
        None => entry.resize(SYMBOL_ENTRY_LEN, 0),
    }
    entry
}

fn write_group(out: &mut Vec<u8>, group: &GroupNode, path: &str) -> Result<GroupAddresses> {
    let mut children: Vec<(&str, u64)> = Vec::with_capacity(group.children.len());
    for (name, node) in &group.children {
        let address = match node {
            Node::Group(child) => write_group(out, child, name)?.header,
            Node::Dataset(dataset) => write_dataset(out, dataset, name)?,
        };
        children.push((name.as_str(), address));
    }
    children.sort_by(|a, b| a.0.cmp(b.0));
    if children.len() > 2 * LEAF_K * 2 * INTERNAL_K {
        return Err(Hdf5Error::invalid_input(path, "too many group members"));
    }

    // Local heap: offset 0 holds the empty string, then one padded name per member.
    let mut segment = vec![0u8; 8];
    let mut name_offsets = Vec::with_capacity(children.len());
    for (name, _) in &children {
        name_offsets.push(segment.len() as u64);
        segment.extend_from_slice(name.as_bytes());
        segment.push(0);
        segment.resize(pad8(segment.len()), 0);
    }
    let segment_address = align(out);
    out.extend_from_slice(&segment);
    let heap = align(out);
    out.extend_from_slice(b"HEAP");
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&(segment.len() as u64).to_le_bytes());
    out.extend_from_slice(&UNDEFINED.to_le_bytes()); // no free list
    out.extend_from_slice(&segment_address.to_le_bytes());

    // Symbol table nodes of at most 2K entries, padded to full size.
    let mut nodes = Vec::new();
    for (chunk, offsets) in children.chunks(2 * LEAF_K).zip(name_offsets.chunks(2 * LEAF_K)) {
        let address = align(out);
        let start = out.len();
        out.extend_from_slice(b"SNOD");
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(chunk.len() as u16).to_le_bytes());
        for ((_, header), name_offset) in chunk.iter().zip(offsets) {
            out.extend_from_slice(&symbol_entry(*name_offset, *header, None));
        }
        out.resize(start + 8 + 2 * LEAF_K * SYMBOL_ENTRY_LEN, 0);
        let last_name = offsets.last().copied().unwrap_or(0);
        nodes.push((address, last_name));
    }

    // Single leaf B-tree node over the symbol table nodes.
    let btree = align(out);
    let start = out.len();
    out.extend_from_slice(b"TREE");
    out.extend_from_slice(&[0, 0]); // group node, leaf level
    out.extend_from_slice(&(nodes.len() as u16).to_le_bytes());
    out.extend_from_slice(&UNDEFINED.to_le_bytes());
    out.extend_from_slice(&UNDEFINED.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    for (address, last_name) in &nodes {
        out.extend_from_slice(&address.to_le_bytes());
        out.extend_from_slice(&last_name.to_le_bytes());
    }
    out.resize(start + 24 + (4 * INTERNAL_K + 1) * 8, 0);

    let mut symbol_table = Vec::with_capacity(16);
    symbol_table.extend_from_slice(&btree.to_le_bytes());
    symbol_table.extend_from_slice(&heap.to_le_bytes());
    let mut messages = vec![(MSG_SYMBOL_TABLE, symbol_table)];
    for (name, value) in &group.attributes {
        messages.push((MSG_ATTRIBUTE, attribute_message(path, name, value)?));
    }
    let header = write_object_header(out, &messages);
    Ok(GroupAddresses {
        header,
        btree,
        heap,
    })
}

fn write_dataset(out: &mut Vec<u8>, dataset: &DatasetNode, path: &str) -> Result<u64> {
    let (datatype, raw) = match &dataset.values {
        Values::Float(values) => (
            float_type(),
            values.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>(),
        ),
        Values::Integer(values) => (
            integer_type(),
            values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        ),
        Values::Text(values) => {
            let width = values.iter().map(String::len).max().unwrap_or(0).max(1);
            (string_type(width), fixed_strings(values, width))
        }
    };

    let address = if raw.is_empty() {
        UNDEFINED
    } else {
        let address = align(out);
        out.extend_from_slice(&raw);
        address
    };
    let mut layout = vec![3, 1];
    layout.extend_from_slice(&address.to_le_bytes());
    layout.extend_from_slice(&(raw.len() as u64).to_le_bytes());

    let mut messages = vec![
        (MSG_DATASPACE, dataspace(&dataset.shape)),
        (MSG_DATATYPE, datatype),
        (MSG_LAYOUT, layout),
    ];
    for (name, value) in &dataset.attributes {
        messages.push((MSG_ATTRIBUTE, attribute_message(path, name, value)?));
    }
    Ok(write_object_header(out, &messages))
}

/// Version 1 object header; returns its address.
fn write_object_header(out: &mut Vec<u8>, messages: &[(u16, Vec<u8>)]) -> u64 {
    let size: usize = messages.iter().map(|(_, body)| 8 + pad8(body.len())).sum();
    let address = align(out);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(messages.len() as u16).to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    for (kind, body) in messages {
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&(pad8(body.len()) as u16).to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(body);
        out.resize(pad8(out.len()), 0);
    }
    address
}

/// Version 1 dataspace; no dimensions is a scalar.
fn dataspace(dims: &[usize]) -> Vec<u8> {
    let mut body = vec![1, dims.len() as u8, 0, 0, 0, 0, 0, 0];
    for dim in dims {
        body.extend_from_slice(&(*dim as u64).to_le_bytes());
    }
    body
}

/// IEEE 754 little-endian double.
fn float_type() -> Vec<u8> {
    let mut body = vec![0x11, 0x20, 63, 0];
    body.extend_from_slice(&8u32.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes()); // bit offset
    body.extend_from_slice(&64u16.to_le_bytes()); // precision
    body.extend_from_slice(&[52, 11, 0, 52]); // exponent and mantissa location/size
    body.extend_from_slice(&1023u32.to_le_bytes());
    body
}

/// Signed little-endian 64-bit integer.
fn integer_type() -> Vec<u8> {
    let mut body = vec![0x10, 0x08, 0, 0];
    body.extend_from_slice(&8u32.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&64u16.to_le_bytes());
    body
}

/// NUL-padded ASCII string of `width` bytes.
fn string_type(width: usize) -> Vec<u8> {
    let mut body = vec![0x13, 0x01, 0, 0];
    body.extend_from_slice(&(width as u32).to_le_bytes());
    body
}

fn fixed_strings(values: &[String], width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * width);
    for value in values {
        let start = out.len();
        out.extend_from_slice(value.as_bytes());
        out.resize(start + width, 0);
    }
    out
}

/// Version 1 attribute message.
fn attribute_message(path: &str, name: &str, value: &AttributeValue) -> Result<Vec<u8>> {
    if name.is_empty() {
        return Err(Hdf5Error::invalid_input(path, "attribute name is empty"));
    }
    let (datatype, space, data) = match value {
        AttributeValue::Integer(value) => {
            (integer_type(), dataspace(&[]), value.to_le_bytes().to_vec())
        }
        AttributeValue::Float(value) => (float_type(), dataspace(&[]), value.to_le_bytes().to_vec()),
        AttributeValue::Text(text) => {
            let width = text.len().max(1);
            let data = fixed_strings(std::slice::from_ref(text), width);
            (string_type(width), dataspace(&[]), data)
        }
        AttributeValue::NumericArray(values) => (
            float_type(),
            dataspace(&[values.len()]),
            values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        ),
        AttributeValue::TextArray(values) => {
            let width = values.iter().map(String::len).max().unwrap_or(0).max(1);
            (
                string_type(width),
                dataspace(&[values.len()]),
                fixed_strings(values, width),
            )
        }
    };

    let mut name = name.as_bytes().to_vec();
    name.push(0);
    let mut body = vec![1, 0];
    for field in [&name, &datatype, &space] {
        body.extend_from_slice(&(field.len() as u16).to_le_bytes());
    }
    // Each field starts on an eight-byte boundary.
    for field in [&name, &datatype, &space] {
        body.extend_from_slice(field);
        body.resize(pad8(body.len()), 0);
    }
    body.extend_from_slice(&data);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Datatype;
    use crate::file::{DatasetValues, Member, parse_hdf5, read_hdf5};

    fn survey() -> Vec<u8> {
        Hdf5Builder::new()
            .root_attribute("TELESCOP", AttributeValue::Text("Gaia".into()))
            .root_attribute("EQUINOX", AttributeValue::Float(2000.0))
            .root_attribute("NSOURCE", AttributeValue::Integer(6))
            .root_attribute("BANDS", AttributeValue::TextArray(vec!["G".into(), "BP".into()]))
            .dataset_f64("zeta/flux", &[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap()
            .dataset_i64("alpha/counts", &[4], &[7, -1, 0, 12])
            .unwrap()
            .dataset_text("alpha/names", &["M31", "NGC 1275"])
            .unwrap()
            .attribute("zeta/flux", "BUNIT", AttributeValue::Text("mJy".into()))
            .unwrap()
            .to_bytes()
            .unwrap()
    }

    #[test]
    fn tree_is_sorted_and_attributes_decode() {
        let file = parse_hdf5(&survey()).unwrap();
        assert_eq!(file.version(), 0);
        let root = file.root().unwrap();

        assert_eq!(root.path, "/");
        assert_eq!(
            root.attribute("TELESCOP"),
            Some(&AttributeValue::Text("Gaia".into()))
        );
        assert_eq!(root.attribute("EQUINOX"), Some(&AttributeValue::Float(2000.0)));
        assert_eq!(root.attribute("NSOURCE"), Some(&AttributeValue::Integer(6)));
        assert_eq!(
            root.attribute("BANDS"),
            Some(&AttributeValue::TextArray(vec!["G".into(), "BP".into()]))
        );

        let paths: Vec<&str> = root.members.iter().map(Member::path).collect();
        assert_eq!(paths, ["/alpha", "/zeta"]);
        let datasets: Vec<&str> = root.datasets().iter().map(|d| d.path.as_str()).collect();
        assert_eq!(datasets, ["/alpha/counts", "/alpha/names", "/zeta/flux"]);
    }

    #[test]
    fn datasets_read_back() {
        let file = parse_hdf5(&survey()).unwrap();
        let root = file.root().unwrap();

        let first = root.first_dataset().unwrap();
        assert_eq!(first.path, "/alpha/counts");
        assert!(matches!(first.datatype, Datatype::Integer { signed: true, .. }));
        assert_eq!(
            file.read(first).unwrap(),
            DatasetValues::Numeric(vec![7.0, -1.0, 0.0, 12.0])
        );

        let datasets = root.datasets();
        let names = datasets[1];
        assert!(!names.is_numeric());
        assert_eq!(
            file.read(names).unwrap(),
            DatasetValues::Text(vec!["M31".into(), "NGC 1275".into()])
        );

        let flux = datasets[2];
        assert_eq!(flux.shape(), &[2, 3]);
        assert_eq!(flux.len(), 6);
        assert_eq!(flux.attributes[0].name, "BUNIT");
        assert_eq!(
            file.read(flux).unwrap(),
            DatasetValues::Numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        );
    }

    #[test]
    fn many_members_span_several_symbol_nodes() {
        let mut builder = Hdf5Builder::new();
        for index in (0..20).rev() {
            builder = builder
                .dataset_f64(&format!("catalog/d{index:02}"), &[1], &[f64::from(index)])
                .unwrap();
        }
        let file = parse_hdf5(&builder.to_bytes().unwrap()).unwrap();
        let root = file.root().unwrap();
        let datasets = root.datasets();
        assert_eq!(datasets.len(), 20);
        assert_eq!(datasets[0].path, "/catalog/d00");
        assert_eq!(datasets[19].path, "/catalog/d19");
        assert_eq!(
            file.read(datasets[13]).unwrap(),
            DatasetValues::Numeric(vec![13.0])
        );
    }

    #[test]
    fn empty_file_has_no_dataset() {
        let bytes = Hdf5Builder::new()
            .group("empty/nested")
            .unwrap()
            .to_bytes()
            .unwrap();
        let root = parse_hdf5(&bytes).unwrap().root().unwrap();
        assert!(root.first_dataset().is_none());
        assert_eq!(root.members.len(), 1);
    }

    #[test]
    fn read_from_disk_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.h5");
        std::fs::write(&path, survey()).unwrap();
        let file = read_hdf5(&path).unwrap();
        assert_eq!(file.root().unwrap().datasets().len(), 3);

        let err = read_hdf5(&dir.path().join("absent.h5")).unwrap_err();
        assert!(matches!(err, Hdf5Error::FileNotFound { .. }));
    }

    #[test]
    fn rejects_non_hdf5_bytes() {
        let err = parse_hdf5(b"ra,dec,flux\n1,2,3\n").unwrap_err();
        assert!(matches!(err, Hdf5Error::SignatureNotFound));
    }

    #[test]
    fn object_header_messages_are_padded() {
        let mut out = vec![0u8; 3];
        let address = write_object_header(&mut out, &[(MSG_DATASPACE, vec![1, 2, 3])]);
        assert_eq!(address, 8);
        assert_eq!(out.len(), 8 + 16 + 8 + 8);
        // header size covers one 8-byte prefix and one padded body
        assert_eq!(&out[16..20], &16u32.to_le_bytes());
    }

    #[test]
    fn rejects_mismatched_shape() {
        let err = Hdf5Builder::new()
            .dataset_f64("flux", &[2, 2], &[1.0, 2.0])
            .unwrap_err();
        assert!(err.to_string().contains("do not fill shape"));
    }

    #[test]
    fn rejects_dataset_under_dataset() {
        let err = Hdf5Builder::new()
            .dataset_f64("flux", &[1], &[1.0])
            .and_then(|builder| builder.dataset_f64("flux/inner", &[1], &[2.0]))
            .unwrap_err();
        assert!(err.to_string().contains("parent is a dataset"));
    }
}
