//! Byte frequency counting, the first pass of compression.

use std::fmt;
use std::io::{BufRead, BufReader, ErrorKind, Read};

use crate::error::Result;
use crate::tree::SymbolDisplay;

/// Number of distinct byte values.
pub const NUM_SYMBOLS: usize = 256;

/// Buffer size for streaming passes over a source.
pub(crate) const READ_BUFFER_BYTES: usize = 8192;

/// Occurrence count for every byte value in one input.
///
/// # Invariants
/// - the sum of all counts equals the input length in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; NUM_SYMBOLS],
}

impl FrequencyTable {
    /// Build a table from explicit counts.
    pub fn from_counts(counts: [u64; NUM_SYMBOLS]) -> Self {
        Self { counts }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; NUM_SYMBOLS];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Count every byte produced by `reader` until EOF.
    ///
    /// # Errors
    /// Propagates any read error other than `Interrupted`, which is retried.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, reader);
        let mut counts = [0u64; NUM_SYMBOLS];

        loop {
            let buf = match reader.fill_buf() {
                Ok([]) => break,
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in buf {
                counts[byte as usize] += 1;
            }
            let n = buf.len();
            reader.consume(n);
        }

        Ok(Self { counts })
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts, i.e. the input length.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of byte values that occur at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// `(symbol, count)` for every present symbol, ascending by symbol.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}

/// One `symbol<TAB>count` line per present symbol.
impl fmt::Display for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, count) in self.present() {
            writeln!(f, "{}\t{}", SymbolDisplay(symbol), count)?;
        }
        Ok(())
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::from_counts([0; NUM_SYMBOLS])
    }
}
