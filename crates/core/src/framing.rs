//! Compressed container layout.
//!
//! The bit stream produced by the codec (tree header followed by payload
//! codes) is wrapped in a small fixed header that records how many symbols
//! the payload holds and a checksum over everything that follows.
//!
//! # Container Format
//!
//! ```text
//! +-------------------+
//! | Magic (4 bytes)   |  0x48 0x55 0x46 0x50 ("HUFP")
//! +-------------------+
//! | version (1)       |  currently 1
//! +-------------------+
//! | symbol_count (8)  |  u64 little-endian, original length in bytes
//! +-------------------+
//! | crc32 (4)         |  u32 little-endian
//! +-------------------+
//! | body              |  [tree header][payload codes][zero padding]
//! | (variable)        |  empty when symbol_count is 0
//! +-------------------+
//! ```
//!
//! # CRC Coverage
//!
//! The CRC32 covers `symbol_count` and the body, so a flipped bit in either
//! is reported before any decoding is attempted.

use crate::error::{Error, FormatError, Result};

/// Magic number for containers: "HUFP"
pub const MAGIC: [u8; 4] = [0x48, 0x55, 0x46, 0x50];

/// Container version written by this build.
pub const VERSION: u8 = 1;

/// Size of the fixed container header in bytes
pub const HEADER_SIZE: usize = 17;

/// A parsed container borrowing its body from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<'a> {
    /// Number of symbols (bytes) the payload decodes to
    pub symbol_count: u64,

    /// Tree header and payload bits, zero padded to a byte
    pub body: &'a [u8],

    /// CRC32 checksum as stored
    pub crc32: u32,
}

/// Wrap an encoded body into a container.
pub fn write_container(symbol_count: u64, body: &[u8]) -> Vec<u8> {
    let crc32 = compute_crc(symbol_count, body);

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&symbol_count.to_le_bytes());
    out.extend_from_slice(&crc32.to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Parse and verify a container.
///
/// # Errors
/// - `FormatError::TooShort` if the buffer cannot hold the header
/// - `FormatError::InvalidMagic` if the magic number doesn't match
/// - `FormatError::UnsupportedVersion` for any version other than 1
/// - `Error::Crc` if the checksum does not match
pub fn parse_container(bytes: &[u8]) -> Result<Container<'_>> {
    if bytes.len() < HEADER_SIZE {
        return Err(FormatError::TooShort {
            required: HEADER_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let (header, body) = bytes.split_at(HEADER_SIZE);
    let magic = array::<4>(&header[0..4]);
    if magic != MAGIC {
        return Err(FormatError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let version = header[4];
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version).into());
    }

    let symbol_count = u64::from_le_bytes(array::<8>(&header[5..13]));
    let crc32 = u32::from_le_bytes(array::<4>(&header[13..17]));

    let computed = compute_crc(symbol_count, body);
    if computed != crc32 {
        return Err(Error::Crc {
            expected: crc32,
            actual: computed,
        });
    }

    Ok(Container {
        symbol_count,
        body,
        crc32,
    })
}

fn array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

fn compute_crc(symbol_count: u64, body: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&symbol_count.to_le_bytes());
    hasher.update(body);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_parse_round_trip() {
        let body = [0xDE, 0xAD, 0xBE, 0xEF];
        let bytes = write_container(42, &body);
        assert_eq!(bytes.len(), HEADER_SIZE + body.len());
        assert_eq!(&bytes[..4], b"HUFP");

        let container = parse_container(&bytes).unwrap();
        assert_eq!(container.symbol_count, 42);
        assert_eq!(container.body, &body);
    }

    #[test]
    fn test_empty_body() {
        let bytes = write_container(0, &[]);
        assert_eq!(bytes.len(), HEADER_SIZE);

        let container = parse_container(&bytes).unwrap();
        assert_eq!(container.symbol_count, 0);
        assert!(container.body.is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = write_container(1, &[0x80]);
        bytes[0] = 0xFF;

        assert!(matches!(
            parse_container(&bytes),
            Err(Error::Format(FormatError::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = write_container(1, &[0x80]);
        bytes[4] = 9;

        assert!(matches!(
            parse_container(&bytes),
            Err(Error::Format(FormatError::UnsupportedVersion(9)))
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            parse_container(&[0u8; 10]),
            Err(Error::Format(FormatError::TooShort {
                required: HEADER_SIZE,
                actual: 10
            }))
        ));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut bytes = write_container(3, b"payload");
        let len = bytes.len();
        bytes[len - 1] ^= 0x01;
        assert!(matches!(parse_container(&bytes), Err(Error::Crc { .. })));

        // The symbol count is covered too.
        let mut bytes = write_container(3, b"payload");
        bytes[5] ^= 0x01;
        assert!(matches!(parse_container(&bytes), Err(Error::Crc { .. })));
    }
}
