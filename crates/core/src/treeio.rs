//! Tree header serialization.
//!
//! The tree is stored in pre-order with one tag bit per node:
//!
//! ```text
//! leaf:     1 <symbol: 8 bits>
//! internal: 0 <left subtree> <right subtree>
//! ```
//!
//! The tagging makes the header self-delimiting for any full binary tree, so
//! no node count or length is stored. For example the tree for `"xyy"`
//! (`x` left, `y` right) is `0 1 01111000 1 01111001`, 19 bits.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{BitIoError, Error, HuffmanError, Result};
use crate::frequency::NUM_SYMBOLS;
use crate::tree::{HuffmanTree, Node, NodeId};

/// Write the tree header for `tree` to `writer`.
pub fn write_tree(tree: &HuffmanTree, writer: &mut BitWriter) {
    tree.visit_preorder(|_, node, _| match node {
        Node::Leaf { symbol, .. } => {
            writer.write_bit(true);
            writer.write_byte(*symbol);
        }
        Node::Internal { .. } => writer.write_bit(false),
    });
}

/// Number of header bits `write_tree` emits for `tree`.
pub fn header_bits(tree: &HuffmanTree) -> usize {
    tree.leaf_count() * 9 + tree.internal_count()
}

/// Read a tree header back, consuming exactly the bits `write_tree` wrote.
///
/// Deserialized nodes have weight 0. Reading is iterative, so a hostile
/// header cannot exhaust the call stack.
///
/// # Errors
/// `HuffmanError::MalformedHeader` if the stream ends inside the header, the
/// header holds more than 256 leaves, or a symbol appears twice.
pub fn read_tree(reader: &mut BitReader<'_>) -> Result<HuffmanTree> {
    let mut nodes: Vec<Node> = Vec::new();
    // Internal nodes still waiting for children, with their left child once
    // it has been read.
    let mut pending: Vec<Option<NodeId>> = Vec::new();
    let mut seen = [false; NUM_SYMBOLS];
    let mut internals = 0usize;

    loop {
        if !read_header_bit(reader)? {
            internals += 1;
            if internals >= NUM_SYMBOLS {
                return Err(HuffmanError::MalformedHeader("too many internal nodes").into());
            }
            pending.push(None);
            continue;
        }

        let symbol = reader.read_byte().map_err(truncated)?;
        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(HuffmanError::MalformedHeader("duplicate leaf symbol").into());
        }
        let mut finished = NodeId::push(&mut nodes, Node::Leaf { symbol, weight: 0 });

        // Hand the finished subtree to its parent; every parent that now has
        // both children is itself finished.
        loop {
            match pending.pop() {
                None => return Ok(HuffmanTree::from_parts(nodes, finished)),
                Some(None) => {
                    pending.push(Some(finished));
                    break;
                }
                Some(Some(left)) => {
                    finished = NodeId::push(
                        &mut nodes,
                        Node::Internal {
                            weight: 0,
                            left,
                            right: finished,
                        },
                    );
                }
            }
        }
    }
}

fn read_header_bit(reader: &mut BitReader<'_>) -> Result<bool> {
    reader.read_bit().map_err(truncated)
}

fn truncated(err: Error) -> Error {
    match err {
        Error::BitIo(BitIoError::UnexpectedEof) => {
            HuffmanError::MalformedHeader("stream ended inside tree header").into()
        }
        other => other,
    }
}
