//! FITS (Flexible Image Transport System) reader.
//!
//! Reads every header/data unit of a file into memory:
//!
//! - header cards with typed values (logical, integer, float, string)
//! - primary and `IMAGE` arrays for every BITPIX with `BSCALE`/`BZERO`/`BLANK`
//! - `BINTABLE` and ASCII `TABLE` extensions, decoding scalar numeric columns
//!
//! The `fixtures` feature adds `FitsBuilder`, a writer for the same subset
//! used to synthesize test files.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cosmic_fits::read_fits;
//!
//! let file = read_fits(Path::new("ngc628.fits"))?;
//! for hdu in &file.hdus {
//!     println!("{} {:?} has_data={}", hdu.name(), hdu.kind, hdu.has_data());
//! }
//! # Ok::<(), cosmic_fits::FitsError>(())
//! ```

mod error;
pub mod header;
mod hdu;
mod image;
mod reader;
mod table;
#[cfg(any(test, feature = "fixtures"))]
mod writer;

pub use error::{FitsError, Result};
pub use hdu::{FitsFile, Hdu, HduData, HduKind, ImageData, TableColumn, TableData};
pub use header::{BLOCK_LEN, CARD_LEN, Header, HeaderValue};
pub use image::bytes_per_pixel;
pub use reader::{parse_fits, read_fits};
pub use table::BinaryFormat;
#[cfg(any(test, feature = "fixtures"))]
pub use writer::{FitsBuilder, WriteColumn};
