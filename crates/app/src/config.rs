//! Command-line configuration for huffpack.
//!
//! Arguments are parsed with clap. Commands that generate data take an
//! optional seed; when it is omitted a time-based seed is chosen and printed
//! so the run can be reproduced.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};

/// Default size of generated sample data (64 KiB).
pub const DEFAULT_SAMPLE_BYTES: usize = 65536;

/// Lossless byte-stream compression with Huffman coding.
#[derive(Parser, Debug)]
#[command(name = "huffpack", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file into a huffpack container
    Compress {
        /// File to compress
        input: PathBuf,

        /// Where to write the container
        output: PathBuf,

        /// Print the count of every byte value present in the input
        #[arg(long)]
        print_frequencies: bool,

        /// Print the Huffman tree built for the input
        #[arg(long)]
        print_tree: bool,

        /// Print the code assigned to every symbol
        #[arg(long)]
        print_codes: bool,

        /// Print a size and timing summary
        #[arg(long)]
        stats: bool,
    },

    /// Restore the original file from a huffpack container
    Decompress {
        /// Container to read
        input: PathBuf,

        /// Where to write the restored bytes
        output: PathBuf,

        /// Print a size and timing summary
        #[arg(long)]
        stats: bool,
    },

    /// Compress and decompress in memory and verify the result
    Roundtrip {
        /// Input file (default: generate sample data)
        #[arg(long = "in")]
        input: Option<PathBuf>,

        /// Random seed for sample generation
        #[arg(long)]
        seed: Option<u64>,

        /// Size of generated sample data in bytes
        #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
        size: usize,
    },

    /// Write generated sample data with mixed compressibility
    Sample {
        /// Where to write the sample
        output: PathBuf,

        /// Random seed for sample generation
        #[arg(long)]
        seed: Option<u64>,

        /// Size of generated sample data in bytes
        #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
        size: usize,
    },
}

/// Use the explicit seed if given, otherwise derive one from the clock.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    })
}
