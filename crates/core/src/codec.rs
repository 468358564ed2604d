//! Encode/decode engine.
//!
//! Compression runs in stages:
//!
//! ```text
//! ScanFrequencies -> BuildTree -+-> (no symbols) empty container
//!                               +-> WriteTreeHeader -> BuildCodeTable -> EmitSymbols -> frame
//! ```
//!
//! Decompression mirrors it:
//!
//! ```text
//! ParseContainer -+-> (count 0) empty output
//!                 +-> ReadTreeHeader -> WalkTree x count -> CheckPadding
//! ```
//!
//! The container records the symbol count, so decoding stops after exactly
//! that many symbols instead of guessing from the end of the stream.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use log::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::code::CodeTable;
use crate::error::{Error, FormatError, HuffmanError, Result};
use crate::framing::{parse_container, write_container};
use crate::frequency::{FrequencyTable, READ_BUFFER_BYTES};
use crate::tree::{HuffmanTree, Node};
use crate::treeio::{header_bits, read_tree, write_tree};

/// What one compression run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Input length in bytes
    pub symbol_count: u64,

    /// Number of distinct byte values in the input
    pub distinct_symbols: usize,

    /// Size of the embedded tree header
    pub header_bits: u64,

    /// Size of the concatenated symbol codes
    pub payload_bits: u64,

    /// Size of the whole container
    pub output_bytes: u64,
}

/// What one decompression run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Size of the container that was read
    pub input_bytes: u64,

    /// Number of bytes decoded
    pub symbol_count: u64,
}

/// Compress `input` into a self-contained container.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    Ok(compress_with_stats(input)?.0)
}

/// Compress `input` and report header and payload sizes.
pub fn compress_with_stats(input: &[u8]) -> Result<(Vec<u8>, EncodeStats)> {
    let frequencies = FrequencyTable::from_bytes(input);
    encode_with(&frequencies, |table, writer| {
        encode_symbols(table, input.iter().copied(), writer)
    })
}

/// Compress the file at `src` into a new file at `dst`.
///
/// The source is read twice: once to count frequencies and once more to
/// emit codes. `dst` is only written after encoding succeeded.
///
/// # Errors
/// `Error::Resource` if either file cannot be opened, read, or written;
/// `HuffmanError::SourceChanged` or `MissingCode` if the source changed
/// between the two passes.
pub fn compress_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<EncodeStats> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let frequencies = FrequencyTable::from_reader(open(src)?).map_err(at(src))?;
    let (bytes, stats) = encode_with(&frequencies, |table, writer| {
        let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, open(src)?);
        let mut count = 0;
        loop {
            let buf = match reader.fill_buf() {
                Ok([]) => break,
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::resource(src, e)),
            };
            count += encode_symbols(table, buf.iter().copied(), writer)?;
            let n = buf.len();
            reader.consume(n);
        }
        Ok(count)
    })?;

    fs::write(dst, &bytes).map_err(|e| Error::resource(dst, e))?;
    debug!(
        "compressed {} -> {} ({} -> {} bytes)",
        src.display(),
        dst.display(),
        stats.symbol_count,
        stats.output_bytes
    );
    Ok(stats)
}

/// Restore the original bytes from a container.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let container = parse_container(data)?;
    let count = container.symbol_count;

    if count == 0 {
        if !container.body.is_empty() {
            return Err(FormatError::TrailingData {
                bits: container.body.len() * 8,
            }
            .into());
        }
        debug!("empty container, nothing to decode");
        return Ok(Vec::new());
    }

    let mut reader = BitReader::new(container.body);
    let tree = read_tree(&mut reader)?;
    debug!(
        "read tree header: {} bits, {} leaves, {} symbols to decode",
        reader.position(),
        tree.leaf_count(),
        count
    );

    // Every symbol costs at least one bit, which bounds the allocation for
    // a corrupt count.
    let capacity = count.min(reader.bits_remaining() as u64) as usize;
    let mut out = Vec::with_capacity(capacity);
    decode_symbols(&tree, &mut reader, count, &mut out)?;
    check_padding(&mut reader)?;
    Ok(out)
}

/// Decompress the container at `src` into a new file at `dst`.
///
/// Nothing is written to `dst` unless decoding succeeds.
pub fn decompress_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<DecodeStats> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let data = fs::read(src).map_err(|e| Error::resource(src, e))?;
    let decoded = decompress(&data)?;
    fs::write(dst, &decoded).map_err(|e| Error::resource(dst, e))?;

    Ok(DecodeStats {
        input_bytes: data.len() as u64,
        symbol_count: decoded.len() as u64,
    })
}

/// Append the code of every symbol to `writer`, returning how many symbols
/// were written.
///
/// # Errors
/// `HuffmanError::MissingCode` for a symbol the table has no code for.
pub fn encode_symbols<I>(table: &CodeTable, symbols: I, writer: &mut BitWriter) -> Result<u64>
where
    I: IntoIterator<Item = u8>,
{
    let mut count = 0;
    for symbol in symbols {
        let code = table
            .get(symbol)
            .ok_or(HuffmanError::MissingCode { symbol })?;
        code.write_to(writer);
        count += 1;
    }
    Ok(count)
}

/// Decode exactly `count` symbols by walking `tree` from the root, one bit
/// per step (`0` left, `1` right), and push them onto `out`.
///
/// A tree that is a single leaf uses the one-bit code `0` for its symbol.
///
/// # Errors
/// - `HuffmanError::TruncatedPayload` if the bits run out early
/// - `HuffmanError::InvalidCode` for a `1` bit under a single-leaf tree
pub fn decode_symbols(
    tree: &HuffmanTree,
    reader: &mut BitReader<'_>,
    count: u64,
    out: &mut Vec<u8>,
) -> Result<()> {
    let truncated = |decoded| HuffmanError::TruncatedPayload {
        decoded,
        expected: count,
    };

    if let Node::Leaf { symbol, .. } = tree.node(tree.root()) {
        for decoded in 0..count {
            let position = reader.position();
            if reader.read_bit().map_err(|_| truncated(decoded))? {
                return Err(HuffmanError::InvalidCode { position }.into());
            }
            out.push(*symbol);
        }
        return Ok(());
    }

    for decoded in 0..count {
        let mut id = tree.root();
        loop {
            match tree.node(id) {
                Node::Leaf { symbol, .. } => {
                    out.push(*symbol);
                    break;
                }
                Node::Internal { left, right, .. } => {
                    let bit = reader.read_bit().map_err(|_| truncated(decoded))?;
                    id = if bit { *right } else { *left };
                }
            }
        }
    }
    Ok(())
}

/// Run the tree/header/payload stages for a scanned input. `emit` performs
/// the second pass over the input and returns the number of symbols it
/// encoded.
fn encode_with<F>(frequencies: &FrequencyTable, emit: F) -> Result<(Vec<u8>, EncodeStats)>
where
    F: FnOnce(&CodeTable, &mut BitWriter) -> Result<u64>,
{
    let total = frequencies.total();
    let distinct = frequencies.distinct();
    debug!("scanned {total} bytes, {distinct} distinct symbols");

    let Some(tree) = HuffmanTree::build(frequencies)? else {
        debug!("empty input, writing container without tree header");
        let bytes = write_container(0, &[]);
        let stats = EncodeStats {
            output_bytes: bytes.len() as u64,
            ..EncodeStats::default()
        };
        return Ok((bytes, stats));
    };

    let header_bits = header_bits(&tree) as u64;
    let table = CodeTable::generate(&tree);
    let expected_payload = table.payload_bits(frequencies);
    debug!(
        "tree header {header_bits} bits, payload {expected_payload} bits, longest code {} bits",
        table.max_len()
    );

    let mut writer = BitWriter::with_capacity(((header_bits + expected_payload + 7) / 8) as usize);
    write_tree(&tree, &mut writer);

    let encoded = emit(&table, &mut writer)?;
    if encoded != total {
        return Err(HuffmanError::SourceChanged {
            expected: total,
            actual: encoded,
        }
        .into());
    }

    let payload_bits = writer.bit_len() as u64 - header_bits;
    let body = writer.finish();
    let bytes = write_container(total, &body);

    let stats = EncodeStats {
        symbol_count: total,
        distinct_symbols: distinct,
        header_bits,
        payload_bits,
        output_bytes: bytes.len() as u64,
    };
    Ok((bytes, stats))
}

/// Whatever follows the last symbol must be the zero padding of the final
/// byte.
fn check_padding(reader: &mut BitReader<'_>) -> Result<()> {
    let remaining = reader.bits_remaining();
    if remaining >= 8 || reader.read_bits(remaining)? != 0 {
        return Err(FormatError::TrailingData { bits: remaining }.into());
    }
    Ok(())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::resource(path, e))
}

/// Attach `path` to plain I/O errors.
fn at(path: &Path) -> impl FnOnce(Error) -> Error + '_ {
    move |err| match err {
        Error::Io(source) => Error::resource(path, source),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::HEADER_SIZE;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        let (bytes, stats) = compress_with_stats(b"").unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(stats.header_bits, 0);
        assert_eq!(stats.payload_bits, 0);
        assert_eq!(decompress(&bytes).unwrap(), b"");
    }

    #[test]
    fn test_single_symbol_costs_one_bit_each() {
        let (bytes, stats) = compress_with_stats(b"aaaa").unwrap();

        assert_eq!(stats.header_bits, 9);
        assert_eq!(stats.payload_bits, 4);
        // 1 01100001 0000 -> two body bytes
        assert_eq!(&bytes[HEADER_SIZE..], &[0b1011_0000, 0b1000_0000]);
        assert_eq!(decompress(&bytes).unwrap(), b"aaaa");
    }

    #[test]
    fn test_abracadabra_payload_size() {
        let (bytes, stats) = compress_with_stats(b"abracadabra").unwrap();

        assert_eq!(stats.symbol_count, 11);
        assert_eq!(stats.distinct_symbols, 5);
        assert_eq!(stats.header_bits, 5 * 9 + 4);
        assert_eq!(stats.payload_bits, 23);
        assert_eq!(
            bytes.len(),
            HEADER_SIZE + ((stats.header_bits + stats.payload_bits + 7) / 8) as usize
        );
        assert_eq!(decompress(&bytes).unwrap(), b"abracadabra");
    }

    #[test]
    fn test_padding_does_not_decode_as_symbols() {
        // 'a' has code 0 here, so zero padding would look like extra 'a's
        // if decoding ran until the stream ended.
        let input = b"ab";
        let bytes = compress(input).unwrap();
        assert_eq!(decompress(&bytes).unwrap(), input);
    }

    #[test]
    fn test_truncated_payload() {
        let input = b"abracadabra";
        let (bytes, stats) = compress_with_stats(input).unwrap();
        let body = &bytes[HEADER_SIZE..];

        // Keep the header bits but drop the final payload byte.
        let short = write_container(stats.symbol_count, &body[..body.len() - 1]);
        assert!(matches!(
            decompress(&short),
            Err(Error::Huffman(HuffmanError::TruncatedPayload { expected: 11, .. }))
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let bytes = compress(b"abracadabra").unwrap();
        let mut body = bytes[HEADER_SIZE..].to_vec();
        body.push(0);

        let padded = write_container(11, &body);
        assert!(matches!(
            decompress(&padded),
            Err(Error::Format(FormatError::TrailingData { .. }))
        ));
    }

    #[test]
    fn test_body_without_symbols_rejected() {
        let bytes = write_container(0, &[0x80]);
        assert!(matches!(
            decompress(&bytes),
            Err(Error::Format(FormatError::TrailingData { bits: 8 }))
        ));
    }

    #[test]
    fn test_single_leaf_rejects_one_bits() {
        // Leaf 'a', then payload bits 0 1.
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_byte(b'a');
        writer.write_bit(false);
        writer.write_bit(true);
        let bytes = write_container(2, &writer.finish());

        assert!(matches!(
            decompress(&bytes),
            Err(Error::Huffman(HuffmanError::InvalidCode { position: 10 }))
        ));
    }

    #[test]
    fn test_source_changed_between_passes() {
        let frequencies = FrequencyTable::from_bytes(b"abcabc");

        // The second pass sees a shorter source than the first counted.
        let result = encode_with(&frequencies, |table, writer| {
            encode_symbols(table, *b"abca", writer)
        });
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::SourceChanged {
                expected: 6,
                actual: 4
            }))
        ));

        let result = encode_with(&frequencies, |table, writer| {
            encode_symbols(table, *b"abcabcab", writer)
        });
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::SourceChanged {
                expected: 6,
                actual: 8
            }))
        ));
    }

    #[test]
    fn test_missing_code() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"ab"))
            .unwrap()
            .unwrap();
        let table = CodeTable::generate(&tree);
        let mut writer = BitWriter::new();

        assert!(matches!(
            encode_symbols(&table, b"abc".iter().copied(), &mut writer),
            Err(Error::Huffman(HuffmanError::MissingCode { symbol: b'c' }))
        ));
    }

    #[test]
    fn test_codes_longer_than_a_word_round_trip() {
        let mut counts = [0u64; 256];
        let (mut a, mut b) = (1u64, 1u64);
        for count in counts.iter_mut().take(50) {
            *count = a;
            (a, b) = (b, a + b);
        }
        let tree = HuffmanTree::build(&FrequencyTable::from_counts(counts))
            .unwrap()
            .unwrap();
        let table = CodeTable::generate(&tree);
        assert!(table.max_len() > 32);

        let message: Vec<u8> = (0..50u8).rev().chain(0..50).collect();
        let mut writer = BitWriter::new();
        write_tree(&tree, &mut writer);
        encode_symbols(&table, message.iter().copied(), &mut writer).unwrap();
        let body = writer.finish();

        let mut reader = BitReader::new(&body);
        let read = read_tree(&mut reader).unwrap();
        let mut out = Vec::new();
        decode_symbols(&read, &mut reader, message.len() as u64, &mut out).unwrap();
        assert_eq!(out, message);
    }

    proptest! {
        #[test]
        fn proptest_round_trip(data: Vec<u8>) {
            let bytes = compress(&data).unwrap();
            prop_assert_eq!(decompress(&bytes).unwrap(), data);
        }

        #[test]
        fn proptest_round_trip_small_alphabet(
            data in proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c')], 0..2048)
        ) {
            let (bytes, stats) = compress_with_stats(&data).unwrap();
            let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&data)).unwrap();
            if let Some(tree) = tree {
                let table = CodeTable::generate(&tree);
                prop_assert_eq!(stats.payload_bits, table.payload_bits(&FrequencyTable::from_bytes(&data)));
            }
            prop_assert_eq!(decompress(&bytes).unwrap(), data);
        }
    }
}
