//! huffpack: command-line front end for the Huffman codec.
//!
//! # Usage
//! ```text
//! huffpack compress <IN> <OUT> [--print-frequencies] [--print-tree] [--print-codes] [--stats]
//! huffpack decompress <IN> <OUT> [--stats]
//! huffpack roundtrip [--in PATH] [--seed N] [--size N]
//! huffpack sample <OUT> [--seed N] [--size N]
//! ```
//!
//! Logging goes through env_logger; set `RUST_LOG=debug` to see the
//! pipeline stages.

mod config;
mod input_gen;

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use huffpack_core::{
    compress_file, compress_with_stats, decompress, decompress_file, metrics::Metrics, CodeTable,
    Error, FrequencyTable, HuffmanTree,
};
use log::{error, info};

use config::{resolve_seed, Cli, Command};

/// Failures of a CLI run.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Codec(#[from] Error),

    /// Decompressing a fresh container did not give back the input
    #[error(
        "round trip mismatch: {expected} bytes in, {actual} bytes out, \
         first difference at offset {offset}"
    )]
    RoundTripMismatch {
        expected: usize,
        actual: usize,
        offset: usize,
    },
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Compress {
            input,
            output,
            print_frequencies,
            print_tree,
            print_codes,
            stats,
        } => {
            if print_frequencies || print_tree || print_codes {
                describe(&input, print_frequencies, print_tree, print_codes)?;
            }

            let mut metrics = Metrics::new();
            let encoded = compress_file(&input, &output)?;
            metrics.record_encode(&encoded);
            metrics.complete();

            info!(
                "compressed {} -> {} ({} -> {} bytes)",
                input.display(),
                output.display(),
                encoded.symbol_count,
                encoded.output_bytes
            );
            if stats {
                metrics.print_summary();
            }
        }

        Command::Decompress {
            input,
            output,
            stats,
        } => {
            let mut metrics = Metrics::new();
            let decoded = decompress_file(&input, &output)?;
            metrics.record_decode(&decoded);
            metrics.complete();

            info!(
                "decompressed {} -> {} ({} -> {} bytes)",
                input.display(),
                output.display(),
                decoded.input_bytes,
                decoded.symbol_count
            );
            if stats {
                metrics.print_summary();
            }
        }

        Command::Roundtrip { input, seed, size } => {
            let data = match &input {
                Some(path) => std::fs::read(path).map_err(|e| Error::resource(path, e))?,
                None => {
                    let seed = resolve_seed(seed);
                    println!("Seed: {seed}");
                    input_gen::generate_sample_data(seed, size)
                }
            };

            let mut metrics = Metrics::new();
            let (packed, encoded) = compress_with_stats(&data)?;
            let restored = decompress(&packed)?;
            metrics.record_encode(&encoded);
            metrics.complete();

            verify_round_trip(&data, &restored)?;

            info!("round trip ok ({} bytes)", data.len());
            metrics.print_summary();
        }

        Command::Sample { output, seed, size } => {
            let seed = resolve_seed(seed);
            println!("Seed: {seed}");
            input_gen::write_sample_file(&output, seed, size)
                .map_err(|e| Error::resource(&output, e))?;
            info!("wrote {size} bytes of sample data to {}", output.display());
        }
    }

    Ok(())
}

/// Fail with the first differing offset unless `restored` equals `original`.
fn verify_round_trip(original: &[u8], restored: &[u8]) -> Result<(), AppError> {
    if original == restored {
        return Ok(());
    }
    let offset = original
        .iter()
        .zip(restored)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| original.len().min(restored.len()));
    Err(AppError::RoundTripMismatch {
        expected: original.len(),
        actual: restored.len(),
        offset,
    })
}

/// Print the frequencies, tree and/or code table that compressing `path`
/// will use.
fn describe(
    path: &Path,
    print_frequencies: bool,
    print_tree: bool,
    print_codes: bool,
) -> Result<(), Error> {
    let file = File::open(path).map_err(|e| Error::resource(path, e))?;
    let frequencies = FrequencyTable::from_reader(file).map_err(|e| match e {
        Error::Io(source) => Error::resource(path, source),
        other => other,
    })?;

    if print_frequencies {
        println!("=== Frequencies ===");
        print!("{frequencies}");
        println!();
    }

    let Some(tree) = HuffmanTree::build(&frequencies)? else {
        println!("(empty input, no tree)");
        return Ok(());
    };

    if print_tree {
        println!("=== Huffman Tree ===");
        print!("{tree}");
        println!();
    }
    if print_codes {
        println!("=== Codes ===");
        print!("{}", CodeTable::generate(&tree));
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_match() {
        assert!(verify_round_trip(b"abracadabra", b"abracadabra").is_ok());
        assert!(verify_round_trip(b"", b"").is_ok());
    }

    #[test]
    fn test_round_trip_mismatch_reports_offset() {
        match verify_round_trip(b"abracadabra", b"abracadxbra") {
            Err(AppError::RoundTripMismatch {
                expected,
                actual,
                offset,
            }) => {
                assert_eq!((expected, actual, offset), (11, 11, 7));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_truncated_output() {
        let err = verify_round_trip(b"abracadabra", b"abra").unwrap_err();
        assert!(matches!(
            err,
            AppError::RoundTripMismatch {
                expected: 11,
                actual: 4,
                offset: 4
            }
        ));
        assert!(err.to_string().contains("first difference at offset 4"));
    }

    #[test]
    fn test_codec_errors_pass_through() {
        let err = AppError::from(huffpack_core::decompress(b"nope").unwrap_err());
        assert!(matches!(err, AppError::Codec(Error::Format(_))));
    }
}
