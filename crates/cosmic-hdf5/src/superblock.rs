//! Superblock location and decoding.

use crate::cursor::{ByteReader, Sizes};
use crate::error::{Hdf5Error, Result};

/// File signature preceding every superblock.
pub const SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Superblock {
    pub version: u8,
    pub sizes: Sizes,
    /// Absolute position that file addresses are relative to.
    pub base: u64,
    /// Address of the root group's object header.
    pub root: u64,
}

/// Find the signature at offset 0, 512, 1024, 2048, ...
fn locate(data: &[u8]) -> Option<usize> {
    let mut offset = 0usize;
    loop {
        let window = data.get(offset..offset + SIGNATURE.len())?;
        if window == SIGNATURE {
            return Some(offset);
        }
        offset = if offset == 0 { 512 } else { offset * 2 };
    }
}

fn sizes(offset: u8, length: u8) -> Result<Sizes> {
    let valid = |width: u8| matches!(width, 2 | 4 | 8);
    if !valid(offset) || !valid(length) {
        return Err(Hdf5Error::invalid_format(format!(
            "unsupported address/length widths {offset}/{length}"
        )));
    }
    Ok(Sizes {
        offset: usize::from(offset),
        length: usize::from(length),
    })
}

pub(crate) fn parse(data: &[u8]) -> Result<Superblock> {
    let start = locate(data).ok_or(Hdf5Error::SignatureNotFound)?;
    let mut reader = ByteReader::new(data, start + SIGNATURE.len(), Sizes::DEFAULT);
    let version = reader.u8()?;

    match version {
        0 | 1 => {
            reader.skip(4)?; // free-space, root group, reserved, shared header versions
            let offset_size = reader.u8()?;
            let length_size = reader.u8()?;
            reader.skip(1)?;
            let sizes = sizes(offset_size, length_size)?;
            reader.skip(2 + 2 + 4)?; // leaf K, internal K, consistency flags
            if version == 1 {
                reader.skip(4)?;
            }
            let mut reader = ByteReader::new(data, reader.pos(), sizes);
            let base = reader.address()?;
            reader.address()?; // free-space info
            reader.address()?; // end of file
            reader.address()?; // driver info
            reader.address()?; // root link name offset
            let root = reader.address()?;
            Ok(Superblock {
                version,
                sizes,
                base,
                root,
            })
        }
        2 | 3 => {
            let offset_size = reader.u8()?;
            let length_size = reader.u8()?;
            reader.skip(1)?; // consistency flags
            let sizes = sizes(offset_size, length_size)?;
            let mut reader = ByteReader::new(data, reader.pos(), sizes);
            let base = reader.address()?;
            reader.address()?; // superblock extension
            reader.address()?; // end of file
            let root = reader.address()?;
            Ok(Superblock {
                version,
                sizes,
                base,
                root,
            })
        }
        other => Err(Hdf5Error::UnsupportedVersion {
            structure: "superblock",
            version: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_signature_after_user_block() {
        let mut data = vec![0u8; 512];
        data.extend_from_slice(&SIGNATURE);
        data.push(2); // version
        data.extend_from_slice(&[8, 8, 0]);
        data.extend_from_slice(&512u64.to_le_bytes());
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        data.extend_from_slice(&4096u64.to_le_bytes());
        data.extend_from_slice(&48u64.to_le_bytes());
        data.extend_from_slice(&[0; 4]);

        let superblock = parse(&data).unwrap();
        assert_eq!(superblock.version, 2);
        assert_eq!(superblock.base, 512);
        assert_eq!(superblock.root, 48);
    }

    #[test]
    fn rejects_plain_text() {
        let err = parse(b"name,flux\n1,2\n").unwrap_err();
        assert!(matches!(err, Hdf5Error::SignatureNotFound));
    }

    #[test]
    fn rejects_future_version() {
        let mut data = SIGNATURE.to_vec();
        data.push(9);
        data.extend_from_slice(&[0; 64]);
        assert!(matches!(
            parse(&data),
            Err(Hdf5Error::UnsupportedVersion {
                structure: "superblock",
                version: 9
            })
        ));
    }
}
