//! Metrics for a compression or decompression run.
//!
//! Tracks sizes on both sides of the codec, the split between tree header
//! and payload, and timing, so the CLI can report how well an input
//! compressed.
//!
//! # Thread Safety
//!
//! `Metrics` is plain data and is meant to be owned by a single run.

use std::time::{Duration, Instant};

use crate::codec::{DecodeStats, EncodeStats};

/// Sizes and timing for one run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Input/Output ===
    /// Bytes read
    pub input_bytes: u64,

    /// Bytes written
    pub output_bytes: u64,

    // === Encoding ===
    /// Symbols encoded or decoded
    pub symbols: u64,

    /// Distinct byte values seen while encoding
    pub distinct_symbols: usize,

    /// Tree header size
    pub header_bits: u64,

    /// Payload size, excluding header and padding
    pub payload_bits: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            symbols: 0,
            distinct_symbols: 0,
            header_bits: 0,
            payload_bits: 0,
        }
    }

    /// Record the outcome of a compression run.
    pub fn record_encode(&mut self, stats: &EncodeStats) {
        self.input_bytes += stats.symbol_count;
        self.output_bytes += stats.output_bytes;
        self.symbols += stats.symbol_count;
        self.distinct_symbols = self.distinct_symbols.max(stats.distinct_symbols);
        self.header_bits += stats.header_bits;
        self.payload_bits += stats.payload_bits;
    }

    /// Record the outcome of a decompression run.
    pub fn record_decode(&mut self, stats: &DecodeStats) {
        self.input_bytes += stats.input_bytes;
        self.output_bytes += stats.symbol_count;
        self.symbols += stats.symbol_count;
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compressed size over raw size. After an encode the output is the
    /// compressed side; after a decode it is the input.
    ///
    /// Returns 0.0 if nothing was processed.
    pub fn compression_ratio(&self) -> f64 {
        let (raw, packed) = if self.header_bits > 0 || self.payload_bits > 0 {
            (self.input_bytes, self.output_bytes)
        } else {
            (self.output_bytes, self.input_bytes)
        };
        if raw == 0 {
            0.0
        } else {
            packed as f64 / raw as f64
        }
    }

    /// Average payload bits per encoded symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.symbols == 0 || self.payload_bits == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.symbols as f64
        }
    }

    /// Compute throughput in bytes/second of input.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Input:  {} bytes", self.input_bytes);
        println!("Output: {} bytes", self.output_bytes);
        println!("Ratio:  {:.1}%", self.compression_ratio() * 100.0);

        if self.header_bits > 0 || self.payload_bits > 0 {
            println!();
            println!("=== Encoding ===");
            println!("Distinct symbols: {}", self.distinct_symbols);
            println!("Tree header: {} bits", self.header_bits);
            println!("Payload: {} bits", self.payload_bits);
            println!("Bits per symbol: {:.3}", self.bits_per_symbol());
        }

        println!();
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Export metrics as key=value lines (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             symbols={}\n\
             distinct_symbols={}\n\
             header_bits={}\n\
             payload_bits={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.symbols,
            self.distinct_symbols,
            self.header_bits,
            self.payload_bits,
            self.compression_ratio(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_stats() -> EncodeStats {
        EncodeStats {
            symbol_count: 1000,
            distinct_symbols: 12,
            header_bits: 119,
            payload_bits: 3000,
            output_bytes: 407,
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(metrics.end_time.is_none());
        assert_eq!(metrics.compression_ratio(), 0.0);
        assert_eq!(metrics.bits_per_symbol(), 0.0);
    }

    #[test]
    fn test_record_encode() {
        let mut metrics = Metrics::new();
        metrics.record_encode(&encode_stats());

        assert_eq!(metrics.input_bytes, 1000);
        assert_eq!(metrics.output_bytes, 407);
        assert_eq!(metrics.compression_ratio(), 0.407);
        assert_eq!(metrics.bits_per_symbol(), 3.0);
    }

    #[test]
    fn test_record_decode_ratio_is_compressed_over_raw() {
        let mut metrics = Metrics::new();
        metrics.record_decode(&DecodeStats {
            input_bytes: 250,
            symbol_count: 1000,
        });

        assert_eq!(metrics.output_bytes, 1000);
        assert_eq!(metrics.compression_ratio(), 0.25);
    }

    #[test]
    fn test_throughput() {
        let mut metrics = Metrics::new();
        metrics.input_bytes = 1_000_000;

        std::thread::sleep(Duration::from_millis(10));
        metrics.complete();

        assert!(metrics.throughput_bps() > 0.0);
        assert!(metrics.duration() >= Duration::from_millis(10));
    }

    #[test]
    fn test_export_text() {
        let mut metrics = Metrics::new();
        metrics.record_encode(&encode_stats());

        let text = metrics.export_text();
        assert!(text.contains("input_bytes=1000"));
        assert!(text.contains("payload_bits=3000"));
        assert!(text.contains("distinct_symbols=12"));
        assert!(text.contains("compression_ratio=0.4070"));
    }
}
