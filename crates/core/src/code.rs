//! Per-symbol codes derived from a Huffman tree.

use std::fmt;

use bitvec::prelude::*;
use log::trace;

use crate::bitio::BitWriter;
use crate::frequency::{FrequencyTable, NUM_SYMBOLS};
use crate::tree::{HuffmanTree, Node, NodeId, SymbolDisplay};

/// Root-to-leaf path: `0` for every left step, `1` for every right step.
///
/// Backed by a growable bit vector, so skewed trees with paths longer than
/// any machine word are fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    bits: BitVec<u8, Msb0>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.bits.pop()
    }

    /// Bits in path order, root first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    /// True if `self` is a prefix of `other` (a code is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len() <= other.len() && other.bits[..self.len()] == self.bits[..]
    }

    /// Append this code to a bit stream.
    pub fn write_to(&self, writer: &mut BitWriter) {
        for bit in self.bits() {
            writer.write_bit(bit);
        }
    }
}

impl FromIterator<bool> for Code {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Code for every symbol present in the tree; absent symbols map to `None`.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    /// Walk the tree depth-first, left before right, recording each leaf's
    /// path. This is the same order the tree header is written in.
    ///
    /// A tree that is a single leaf has no edges to walk; its symbol is
    /// given the one-bit code `0` so every occurrence still costs one bit.
    pub fn generate(tree: &HuffmanTree) -> Self {
        let mut table = CodeTable {
            codes: vec![None; NUM_SYMBOLS],
        };

        let mut path = Code::new();
        if tree.is_single_leaf() {
            path.push(false);
        }
        table.assign(tree, tree.root(), &mut path);
        table
    }

    fn assign(&mut self, tree: &HuffmanTree, id: NodeId, path: &mut Code) {
        match tree.node(id) {
            Node::Leaf { symbol, .. } => {
                trace!("code {} -> {}", SymbolDisplay(*symbol), path);
                self.codes[*symbol as usize] = Some(path.clone());
            }
            Node::Internal { left, right, .. } => {
                path.push(false);
                self.assign(tree, *left, path);
                path.pop();

                path.push(true);
                self.assign(tree, *right, path);
                path.pop();
            }
        }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// `(symbol, code)` for every present symbol, ascending by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as u8, code)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_len(&self) -> usize {
        self.iter().map(|(_, code)| code.len()).max().unwrap_or(0)
    }

    /// Exact payload size for an input with these frequencies:
    /// the sum over symbols of `count * code length`.
    pub fn payload_bits(&self, frequencies: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, code)| frequencies.get(symbol) * code.len() as u64)
            .sum()
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, code) in self.iter() {
            writeln!(f, "{}\t{}", SymbolDisplay(symbol), code)?;
        }
        Ok(())
    }
}
