//! High-level file access: group tree, datasets, attribute values.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::attribute::{self, Attribute, AttributeValue};
use crate::cursor::{ByteReader, Sizes};
use crate::dataspace::Dataspace;
use crate::datatype::{Datatype, fixed_text};
use crate::error::{Hdf5Error, Result};
use crate::group;
use crate::heap::GlobalHeaps;
use crate::layout::{Layout, Storage};
use crate::object_header::{
    FLAG_SHARED, MSG_ATTRIBUTE, MSG_DATASPACE, MSG_DATATYPE, MSG_FILTER_PIPELINE, MSG_LAYOUT,
    ObjectHeader,
};
use crate::superblock::{self, Superblock};

/// An HDF5 file held in memory.
#[derive(Debug, Clone)]
pub struct Hdf5File {
    data: Vec<u8>,
    superblock: Superblock,
}

/// A group with its attributes and members sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub path: String,
    pub attributes: Vec<Attribute>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Group(Group),
    Dataset(Dataset),
}

/// Dataset description. Values are read on demand with [`Hdf5File::read`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub path: String,
    pub dataspace: Dataspace,
    pub datatype: Datatype,
    pub attributes: Vec<Attribute>,
    address: u64,
}

/// Decoded dataset elements in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
    /// Datatype outside the decoded subset (compound, enum, reference, ...).
    Unsupported,
}

impl Group {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| &attribute.value)
    }

    /// First dataset in depth-first, name-ordered traversal.
    pub fn first_dataset(&self) -> Option<&Dataset> {
        self.members.iter().find_map(|member| match member {
            Member::Dataset(dataset) => Some(dataset),
            Member::Group(group) => group.first_dataset(),
        })
    }

    /// Every dataset below this group, in traversal order.
    pub fn datasets(&self) -> Vec<&Dataset> {
        let mut out = Vec::new();
        for member in &self.members {
            match member {
                Member::Dataset(dataset) => out.push(dataset),
                Member::Group(group) => out.extend(group.datasets()),
            }
        }
        out
    }
}

impl Member {
    pub fn path(&self) -> &str {
        match self {
            Member::Group(group) => &group.path,
            Member::Dataset(dataset) => &dataset.path,
        }
    }
}

impl Dataset {
    pub fn shape(&self) -> &[usize] {
        self.dataspace.shape()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.dataspace.element_count().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        self.datatype.is_numeric()
    }
}

/// Read an HDF5 file from a path.
pub fn read_hdf5(path: &Path) -> Result<Hdf5File> {
    let data = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Hdf5Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Hdf5Error::Io(e)
        }
    })?;
    Hdf5File::parse(data)
}

/// Parse an in-memory HDF5 file.
pub fn parse_hdf5(data: &[u8]) -> Result<Hdf5File> {
    Hdf5File::parse(data.to_vec())
}

impl Hdf5File {
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let superblock = superblock::parse(&data)?;
        Ok(Self { data, superblock })
    }

    /// Superblock version (0 to 3).
    pub fn version(&self) -> u8 {
        self.superblock.version
    }

    /// Load the group tree. Objects reachable through more than one hard link
    /// appear once, at the first path that reaches them.
    pub fn root(&self) -> Result<Group> {
        let address = self.superblock.root;
        let header = self.header(address)?;
        let mut visited = HashSet::from([address]);
        let mut heaps = GlobalHeaps::default();
        self.load_group("/".to_string(), &header, &mut visited, &mut heaps)
    }

    /// Decode every element of a dataset.
    pub fn read(&self, dataset: &Dataset) -> Result<DatasetValues> {
        let header = self.header(dataset.address)?;
        if header.has(MSG_FILTER_PIPELINE) {
            return Err(Hdf5Error::unsupported(format!(
                "filtered (compressed) storage in {}",
                dataset.path
            )));
        }
        let datatype = &dataset.datatype;
        if !datatype.is_numeric() && !datatype.is_text() {
            return Ok(DatasetValues::Unsupported);
        }
        let count = dataset.dataspace.element_count().ok_or_else(|| {
            Hdf5Error::invalid_format(format!("{}: element count overflows", dataset.path))
        })?;

        let bytes = if count == 0 {
            Vec::new()
        } else {
            let message = header.find(MSG_LAYOUT).ok_or_else(|| {
                Hdf5Error::invalid_format(format!("{}: missing layout message", dataset.path))
            })?;
            let layout = Layout::parse(message.data, self.sizes())?;
            let storage = Storage {
                data: &self.data,
                base: self.superblock.base,
                sizes: self.sizes(),
                shape: dataset.shape(),
                element_size: datatype.size(),
            };
            storage.read(&layout)?
        };

        if datatype.is_numeric() {
            Ok(DatasetValues::Numeric(numbers(datatype, &bytes, count)))
        } else {
            let mut heaps = GlobalHeaps::default();
            let texts = self.texts(datatype, &bytes, count, &mut heaps)?;
            Ok(DatasetValues::Text(texts))
        }
    }

    fn sizes(&self) -> Sizes {
        self.superblock.sizes
    }

    fn header(&self, address: u64) -> Result<ObjectHeader<'_>> {
        ObjectHeader::read(&self.data, self.superblock.base, address, self.sizes())
    }

    fn load_group<'a>(
        &'a self,
        path: String,
        header: &ObjectHeader<'a>,
        visited: &mut HashSet<u64>,
        heaps: &mut GlobalHeaps<'a>,
    ) -> Result<Group> {
        let attributes = self.attributes(header, heaps)?;
        let links = group::links(&self.data, self.superblock.base, self.sizes(), header)?;
        let mut members = Vec::with_capacity(links.len());
        for link in links {
            if !visited.insert(link.address) {
                continue;
            }
            let child_path = if path == "/" {
                format!("/{}", link.name)
            } else {
                format!("{path}/{}", link.name)
            };
            let child = self.header(link.address)?;
            if child.has(MSG_LAYOUT) {
                members.push(Member::Dataset(self.load_dataset(
                    child_path,
                    link.address,
                    &child,
                    heaps,
                )?));
            } else if child.has(MSG_DATATYPE) && !child.has(MSG_DATASPACE) {
                // committed datatype
                continue;
            } else {
                members.push(Member::Group(
                    self.load_group(child_path, &child, visited, heaps)?,
                ));
            }
        }
        Ok(Group {
            path,
            attributes,
            members,
        })
    }

    fn load_dataset<'a>(
        &'a self,
        path: String,
        address: u64,
        header: &ObjectHeader<'a>,
        heaps: &mut GlobalHeaps<'a>,
    ) -> Result<Dataset> {
        let missing = |what: &str| Hdf5Error::invalid_format(format!("{path}: missing {what}"));
        let dataspace = header.find(MSG_DATASPACE).ok_or_else(|| missing("dataspace"))?;
        let datatype = header.find(MSG_DATATYPE).ok_or_else(|| missing("datatype"))?;
        let dataspace = Dataspace::parse(dataspace.data, self.sizes())?;
        let datatype = Datatype::parse(datatype.data)?;
        let attributes = self.attributes(header, heaps)?;
        Ok(Dataset {
            path,
            dataspace,
            datatype,
            attributes,
            address,
        })
    }

    /// Attributes whose datatype decodes; others are skipped.
    fn attributes<'a>(
        &'a self,
        header: &ObjectHeader<'a>,
        heaps: &mut GlobalHeaps<'a>,
    ) -> Result<Vec<Attribute>> {
        let mut out = Vec::new();
        for message in header.all(MSG_ATTRIBUTE) {
            if message.flags & FLAG_SHARED != 0 {
                continue;
            }
            let Some(raw) = attribute::parse(message.data, self.sizes())? else {
                continue;
            };
            let Some(count) = raw.dataspace.element_count().filter(|count| *count > 0) else {
                continue;
            };
            let needed = count.saturating_mul(raw.datatype.size());
            let Some(payload) = raw.payload.get(..needed) else {
                continue;
            };
            let value = if raw.datatype.is_numeric() {
                let values = numbers(&raw.datatype, payload, count);
                if values.len() != 1 {
                    Some(AttributeValue::NumericArray(values))
                } else if matches!(raw.datatype, Datatype::Integer { .. }) {
                    raw.datatype.decode_int(payload).map(AttributeValue::Integer)
                } else {
                    Some(AttributeValue::Float(values[0]))
                }
            } else if raw.datatype.is_text() {
                let mut texts = self.texts(&raw.datatype, payload, count, heaps)?;
                if texts.len() == 1 {
                    texts.pop().map(AttributeValue::Text)
                } else {
                    Some(AttributeValue::TextArray(texts))
                }
            } else {
                None
            };
            if let Some(value) = value {
                out.push(Attribute {
                    name: raw.name,
                    value,
                });
            }
        }
        Ok(out)
    }

    fn texts<'a>(
        &'a self,
        datatype: &Datatype,
        bytes: &[u8],
        count: usize,
        heaps: &mut GlobalHeaps<'a>,
    ) -> Result<Vec<String>> {
        let size = datatype.size();
        let elements = bytes.chunks_exact(size.max(1)).take(count);
        match datatype {
            Datatype::VarString { .. } => elements
                .map(|element| {
                    let mut reader = ByteReader::new(element, 0, self.sizes());
                    let len = reader.u32()? as usize;
                    let collection = reader.address()?;
                    let index = reader.u32()?;
                    if len == 0 {
                        return Ok(String::new());
                    }
                    let object = heaps.object(
                        &self.data,
                        self.superblock.base,
                        self.sizes(),
                        collection,
                        index as u16,
                    )?;
                    Ok(fixed_text(object.get(..len).unwrap_or(object)))
                })
                .collect(),
            _ => Ok(elements.map(fixed_text).collect()),
        }
    }
}

fn numbers(datatype: &Datatype, bytes: &[u8], count: usize) -> Vec<f64> {
    bytes
        .chunks_exact(datatype.size().max(1))
        .take(count)
        .map(|element| datatype.decode_number(element).unwrap_or(f64::NAN))
        .collect()
}
