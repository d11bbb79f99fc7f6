//! Reader for a practical subset of HDF5.
//!
//! Covers what catalogue and image products written by common tools use:
//!
//! - superblock versions 0 to 3 and object header versions 1 and 2
//! - groups stored as symbol tables or as compact link messages
//! - compact, contiguous and unfiltered chunked datasets
//! - fixed-point, floating-point, fixed-length and variable-length string types
//! - attributes on groups and datasets
//!
//! Compressed datasets, dense link storage and virtual datasets are reported
//! as [`Hdf5Error::Unsupported`]. The `fixtures` feature adds `Hdf5Builder`,
//! a minimal classic-format writer used to synthesize test files.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cosmic_hdf5::{DatasetValues, read_hdf5};
//!
//! let file = read_hdf5(Path::new("survey.h5"))?;
//! let root = file.root()?;
//! if let Some(dataset) = root.first_dataset() {
//!     if let DatasetValues::Numeric(values) = file.read(dataset)? {
//!         println!("{}: {} values", dataset.path, values.len());
//!     }
//! }
//! # Ok::<(), cosmic_hdf5::Hdf5Error>(())
//! ```

mod attribute;
mod cursor;
mod dataspace;
mod datatype;
mod error;
mod file;
mod group;
mod heap;
mod layout;
mod object_header;
mod superblock;
#[cfg(any(test, feature = "fixtures"))]
mod writer;

pub use attribute::{Attribute, AttributeValue};
pub use dataspace::Dataspace;
pub use datatype::Datatype;
pub use error::{Hdf5Error, Result};
pub use file::{Dataset, DatasetValues, Group, Hdf5File, Member, parse_hdf5, read_hdf5};
pub use layout::Layout;
pub use superblock::SIGNATURE;
#[cfg(any(test, feature = "fixtures"))]
pub use writer::Hdf5Builder;
