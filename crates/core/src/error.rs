//! Error types for huffpack.
//!
//! Every fallible operation returns a structured error instead of panicking,
//! including decoding of corrupt or hostile input.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all operations in the codec.
///
/// Each variant corresponds to a failure domain:
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Queue: priority queue misuse or allocation failure
/// - Huffman: tree header, code table, or payload decode failures
/// - Format: container header validation
/// - CRC: data corruption detected
/// - Resource: a source or destination file could not be used
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Priority queue error
    #[error("priority queue error: {0}")]
    Queue(#[from] QueueError),

    /// Huffman codec error (e.g., malformed tree header, truncated payload)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Container header error (e.g., bad magic, unknown version)
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// Source or destination file could not be opened, read, or written
    #[error("resource unavailable: {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error not tied to a named file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Resource {
            path: path.into(),
            source,
        }
    }
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Priority queue errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// `remove` called on a queue with no elements
    #[error("remove from empty priority queue")]
    EmptyQueue,

    /// Backing storage could not be grown
    #[error("out of memory growing priority queue to {capacity} slots")]
    OutOfMemory { capacity: usize },
}

/// Huffman codec errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HuffmanError {
    /// The embedded tree header is incomplete or describes an impossible tree
    #[error("malformed tree header: {0}")]
    MalformedHeader(&'static str),

    /// A symbol in the input has no code; the table and tree disagree
    #[error("no code for symbol {symbol:#04x}")]
    MissingCode { symbol: u8 },

    /// A bit sequence that does not lead to a leaf
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: usize },

    /// The payload ended before every symbol was decoded
    #[error("payload truncated: decoded {decoded} of {expected} symbols")]
    TruncatedPayload { decoded: u64, expected: u64 },

    /// The source yielded a different number of bytes on the encoding pass
    /// than on the counting pass
    #[error("source changed between passes: counted {expected} bytes, encoded {actual}")]
    SourceChanged { expected: u64, actual: u64 },

    /// The tree arena could not be allocated
    #[error("out of memory allocating {nodes} tree nodes")]
    OutOfMemory { nodes: usize },
}

/// Container framing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Version byte this build does not understand
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u8),

    /// Input is too short to contain a valid header
    #[error("container too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Bits left over after the last symbol that are not zero padding
    #[error("{bits} unexpected trailing bits after payload")]
    TrailingData { bits: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
