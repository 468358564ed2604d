//! huffpack-core: lossless byte-stream compression with Huffman coding
//!
//! The compressor counts byte frequencies, builds a Huffman tree with a
//! binary min-heap, embeds the tree itself at the front of the compressed
//! stream, and then emits one prefix-free code per input byte. The
//! decompressor reads the tree back and walks it bit by bit.
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit writer and reader
//! - `pq`: binary min-heap used to merge the lightest subtrees
//! - `frequency`: 256-entry byte frequency table
//! - `tree`: arena-backed Huffman tree and its builder
//! - `code`: per-symbol codes derived from the tree
//! - `treeio`: pre-order tree header (de)serialization
//! - `framing`: container header with symbol count and CRC
//! - `codec`: the encode/decode engine and file entry points
//! - `metrics`: sizes and timing of a run
//!
//! # Example
//! ```
//! let packed = huffpack_core::compress(b"abracadabra").unwrap();
//! assert_eq!(huffpack_core::decompress(&packed).unwrap(), b"abracadabra");
//! ```

pub mod bitio;
pub mod code;
pub mod codec;
pub mod error;
pub mod framing;
pub mod frequency;
pub mod metrics;
pub mod pq;
pub mod tree;
pub mod treeio;

// Re-export commonly used types
pub use code::{Code, CodeTable};
pub use codec::{
    compress, compress_file, compress_with_stats, decompress, decompress_file, DecodeStats,
    EncodeStats,
};
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use tree::HuffmanTree;
