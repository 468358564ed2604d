//! Sample data generation.
//!
//! When no input file is given, huffpack generates data whose byte
//! distribution varies from section to section, so the effect of the
//! frequency table on code lengths is visible:
//! - runs of one byte (a single very frequent symbol)
//! - text over a small alphabet (short codes for common letters)
//! - skewed bytes (long tail of rare symbols)
//! - uniform random bytes (close to 8 bits per symbol)

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Size of each section of generated data.
const SECTION_BYTES: usize = 8192;

/// Generate `size_bytes` of sample data, deterministic for a given `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(SECTION_BYTES);

        match rng.gen_range(0..10u8) {
            // 20% runs
            0..=1 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }

            // 40% text-like
            2..=5 => {
                let alphabet = b"etaoinshrdlu etaoin etao e  .,\n";
                for _ in 0..section {
                    data.push(alphabet[rng.gen_range(0..alphabet.len())]);
                }
            }

            // 20% skewed: squaring biases toward low byte values
            6..=7 => {
                for _ in 0..section {
                    let r: f64 = rng.gen();
                    data.push((r * r * 256.0) as u8);
                }
            }

            // 20% uniform
            _ => {
                for _ in 0..section {
                    data.push(rng.gen());
                }
            }
        }
    }

    data
}

/// Write generated sample data to `path`.
pub fn write_sample_file(path: &Path, seed: u64, size_bytes: usize) -> std::io::Result<()> {
    std::fs::write(path, generate_sample_data(seed, size_bytes))
}
