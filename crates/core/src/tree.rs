//! Huffman tree construction and traversal.
//!
//! Nodes live in an arena owned by [`HuffmanTree`] and refer to each other
//! through [`NodeId`] handles, so the priority queue can hold plain indices
//! while subtrees are being merged, and dropping the tree frees everything at
//! once.
//!
//! # Construction
//!
//! 1. Every symbol with a non-zero count becomes a leaf, queued by its count
//!    in ascending symbol order.
//! 2. The two lightest entries are removed (first one becomes the left
//!    child), merged under a new internal node, and the merged node is
//!    queued again under the summed weight.
//! 3. The last remaining entry is the root.

use std::fmt;

use log::debug;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::pq::PriorityQueue;

/// Handle to a node inside one [`HuffmanTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Append `node` to an arena and return its handle.
    pub(crate) fn push(nodes: &mut Vec<Node>, node: Node) -> NodeId {
        nodes.push(node);
        NodeId(nodes.len() - 1)
    }
}

/// A node of a Huffman tree.
///
/// Internal nodes always have both children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    /// Aggregate frequency of the subtree. Trees read back from a compressed
    /// header carry weight 0 everywhere.
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A complete Huffman tree: a non-empty arena plus its root.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Build the Huffman tree for the given frequencies.
    ///
    /// Returns `Ok(None)` when no symbol occurs (empty input); that is not an
    /// error, there is simply nothing to compress. A single distinct symbol
    /// yields a tree whose root is a leaf.
    ///
    /// # Errors
    /// `HuffmanError::OutOfMemory` or a queue error if allocation fails.
    pub fn build(frequencies: &FrequencyTable) -> Result<Option<Self>> {
        let leaves = frequencies.distinct();
        if leaves == 0 {
            return Ok(None);
        }

        let total_nodes = 2 * leaves - 1;
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(total_nodes)
            .map_err(|_| HuffmanError::OutOfMemory { nodes: total_nodes })?;

        let mut queue = PriorityQueue::new();
        for (symbol, weight) in frequencies.present() {
            let id = NodeId::push(&mut nodes, Node::Leaf { symbol, weight });
            queue.add(id, weight)?;
        }

        while queue.len() > 1 {
            let left = queue.remove()?;
            let right = queue.remove()?;
            let weight = nodes[left.0].weight() + nodes[right.0].weight();

            let id = NodeId::push(
                &mut nodes,
                Node::Internal {
                    weight,
                    left,
                    right,
                },
            );
            queue.add(id, weight)?;
        }

        let root = queue.remove()?;
        let tree = HuffmanTree { nodes, root };
        debug!(
            "built huffman tree: {} leaves, {} internal nodes, depth {}, weight {}",
            tree.leaf_count(),
            tree.internal_count(),
            tree.depth(),
            tree.weight()
        );
        Ok(Some(tree))
    }

    /// Assemble a tree from an already linked arena.
    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        debug_assert!(root.0 < nodes.len());
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node. `id` must come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Weight of the root, equal to the input length for built trees.
    pub fn weight(&self) -> u64 {
        self.node(self.root).weight()
    }

    /// True when the whole tree is one leaf (one distinct symbol).
    pub fn is_single_leaf(&self) -> bool {
        self.node(self.root).is_leaf()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    pub fn internal_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        self.visit_preorder(|_, _, depth| deepest = deepest.max(depth));
        deepest
    }

    /// Visit every node in pre-order (node, left subtree, right subtree),
    /// passing its id, the node, and its depth below the root.
    ///
    /// Uses an explicit stack, so arbitrarily deep trees are fine.
    pub fn visit_preorder<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeId, &Node, usize),
    {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            visitor(id, node, depth);
            if let Node::Internal { left, right, .. } = node {
                stack.push((*right, depth + 1));
                stack.push((*left, depth + 1));
            }
        }
    }

    /// Same shape with the same symbols at the same leaves. Weights are
    /// ignored, since a deserialized tree has none.
    pub fn structurally_eq(&self, other: &HuffmanTree) -> bool {
        self.shape() == other.shape()
    }

    /// Pre-order listing with `None` for internal nodes. For full binary
    /// trees this determines the shape uniquely.
    fn shape(&self) -> Vec<Option<u8>> {
        let mut shape = Vec::with_capacity(self.nodes.len());
        self.visit_preorder(|_, node, _| {
            shape.push(match node {
                Node::Leaf { symbol, .. } => Some(*symbol),
                Node::Internal { .. } => None,
            })
        });
        shape
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.visit_preorder(|_, node, depth| {
            if result.is_err() {
                return;
            }
            let indent = "  ".repeat(depth);
            result = match node {
                Node::Leaf { symbol, weight } => writeln!(
                    f,
                    "{indent}Leaf {} [weight: {weight}]",
                    SymbolDisplay(*symbol)
                ),
                Node::Internal { weight, .. } => {
                    writeln!(f, "{indent}Internal [weight: {weight}]")
                }
            };
        });
        result
    }
}

/// Shows printable ASCII as a quoted char and everything else as hex.
pub struct SymbolDisplay(pub u8);

impl fmt::Display for SymbolDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = self.0;
        if byte.is_ascii_graphic() || byte == b' ' {
            write!(f, "'{}'", byte as char)
        } else {
            write!(f, "{byte:#04x}")
        }
    }
}
