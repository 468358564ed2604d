//! Bit-granular writer and reader.
//!
//! This is the stream the codec emits tree headers and payload codes into.
//! Both sides work MSB-first: the first bit written lands in the most
//! significant position of the first byte.
//!
//! # Padding Rules
//! - BitWriter: `finish` pads the last partial byte with zeros, exactly once
//! - BitReader: cannot tell padding from data; the caller knows how many
//!   symbols to decode and checks what is left afterwards
//!
//! # Example
//! ```
//! use huffpack_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bit(false);
//! writer.write_byte(b'z');
//! // 1 0 01111010 -> 10011110 10000000
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b1001_1110, 0b1000_0000]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert!(!reader.read_bit().unwrap());
//! assert_eq!(reader.read_byte().unwrap(), b'z');
//! ```

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a growable byte buffer.
///
/// # Invariants
/// - `pending` holds fewer than 8 bits, left-aligned
/// - `pending_len` is always < 8
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    pending: u8,
    pending_len: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a writer whose output buffer already holds `capacity` bytes of
    /// room.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Emit a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.pending |= 0x80 >> self.pending_len;
        }
        self.pending_len += 1;

        if self.pending_len == 8 {
            self.bytes.push(self.pending);
            self.pending = 0;
            self.pending_len = 0;
        }
    }

    /// Emit a full byte, most significant bit first.
    ///
    /// The byte does not need to be aligned to the underlying buffer.
    pub fn write_byte(&mut self, byte: u8) {
        if self.pending_len == 0 {
            self.bytes.push(byte);
            return;
        }
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 == 1);
        }
    }

    /// Flush the partial byte (zero padded) and return the output.
    pub fn finish(mut self) -> Vec<u8> {
        if self.pending_len > 0 {
            self.bytes.push(self.pending);
        }
        self.bytes
    }

    /// Total number of bits written, including the partial byte.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.pending_len as usize
    }
}

/// Reads bits MSB-first from a byte slice.
///
/// # Invariants
/// - `position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Consume a single bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` when no bits remain.
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.position / 8)
            .ok_or(BitIoError::UnexpectedEof)?;
        let bit = (byte >> (7 - self.position % 8)) & 1 == 1;
        self.position += 1;
        Ok(bit)
    }

    /// Consume 8 bits as one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bits_remaining() < 8 {
            return Err(BitIoError::UnexpectedEof.into());
        }
        if self.position % 8 == 0 {
            let byte = self.data[self.position / 8];
            self.position += 8;
            return Ok(byte);
        }
        Ok(self.read_bits(8)? as u8)
    }

    /// Consume `count` bits (at most 64) into the low end of a `u64`.
    ///
    /// Nothing is consumed if fewer than `count` bits remain.
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_write_read_single_byte() {
        let mut writer = BitWriter::new();
        writer.write_byte(0b1011_0011);

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1011_0011]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_byte().unwrap(), 0b1011_0011);
        assert_eq!(reader.bits_remaining(), 0);
    }

    #[test]
    fn test_unaligned_byte() {
        let mut writer = BitWriter::new();
        writer.write_bit(false);
        writer.write_bit(false);
        writer.write_bit(true);
        writer.write_byte(0xFF);
        assert_eq!(writer.bit_len(), 11);

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b0011_1111, 0b1110_0000]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(3).unwrap(), 0b001);
        assert_eq!(reader.read_byte().unwrap(), 0xFF);
        assert_eq!(reader.bits_remaining(), 5);
    }

    #[test]
    fn test_padding() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);

        assert_eq!(writer.finish(), vec![0b1000_0000]);
    }

    #[test]
    fn test_empty_writer() {
        let writer = BitWriter::new();
        assert_eq!(writer.bit_len(), 0);
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn test_read_bits_multi_byte() {
        let mut writer = BitWriter::new();
        writer.write_byte(0b1010_1011);
        writer.write_byte(0b1111_0000);

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1010_1011, 0b1111_0000]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(16).unwrap(), 0b1010_1011_1111_0000);
    }

    #[test]
    fn test_64_bit_values() {
        let mut writer = BitWriter::new();
        let val = 0x1234_5678_9ABC_DEF0u64;
        writer.write_bit(true);
        for byte in val.to_be_bytes() {
            writer.write_byte(byte);
        }

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(64).unwrap(), val);
        assert_eq!(reader.bits_remaining(), 7);
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut reader = BitReader::new(&[0u8; 16]);
        assert!(matches!(
            reader.read_bits(65),
            Err(Error::BitIo(BitIoError::InvalidBitCount(65)))
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0b1010_1010];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(8).unwrap(), 0b1010_1010);
        assert!(matches!(
            reader.read_bit(),
            Err(Error::BitIo(BitIoError::UnexpectedEof))
        ));
        assert!(reader.read_byte().is_err());
    }

    #[test]
    fn test_short_read_consumes_nothing() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();

        assert!(reader.read_byte().is_err());
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.bits_remaining(), 5);
    }

    #[test]
    fn test_bit_by_bit() {
        let pattern = [true, false, true, true, false, false, true, false];
        let mut writer = BitWriter::new();
        for &bit in &pattern {
            writer.write_bit(bit);
        }

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1011_0010]);

        let mut reader = BitReader::new(&bytes);
        for &expected in &pattern {
            assert_eq!(reader.read_bit().unwrap(), expected);
        }
        assert_eq!(reader.bits_remaining(), 0);
    }
}
