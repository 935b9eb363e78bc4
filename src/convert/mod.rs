//! Conversion of a [CountTree] into a balanced [BinaryTree].
//!
//! Conversion works on *groups*: ordered lists of count-tree nodes.
//! Starting from the group holding only the root:
//! * A group of one node follows single-child chains downwards (the
//!   chain's inner nodes are elided). A node without children becomes a
//!   leaf; a node with several children is replaced by the group of its
//!   children.
//! * A group of two or more nodes becomes an internal vertex, labelled
//!   with the members' taxids and the sum of their counts. The group is
//!   split with [split_evenly] and both halves are converted as the left
//!   and right child.
//!
//! Leaf ids (`l0, l1, ...`) and internal ids (`n0, n1, ...`) are assigned in
//! creation order, which is pre-order with left before right.

mod split;

pub use split::split_evenly;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::model::{BinaryTree, CountIndex, CountTree, NodeId, VertexIndex};
use crate::taxonomy::TaxId;

/// Converts a count tree with default settings, see [BinaryConverter::convert].
pub fn to_binary(tree: &CountTree) -> Result<BinaryTree> {
    BinaryConverter::new().convert(tree)
}

// =#========================================================================#=
// BINARY CONVERTER
// =#========================================================================#=
/// Converts [CountTree]s into balanced [BinaryTree]s.
///
/// # Example
/// ```
/// use bintax::convert::BinaryConverter;
/// use bintax::model::CountTree;
///
/// let mut tree = CountTree::new(1);
/// tree.add_path(&[1, 5, 10], 2);
/// tree.add_path(&[1, 5, 20], 1);
/// tree.add_path(&[1, 6, 30], 1);
///
/// let binary = BinaryConverter::new().convert(&tree).unwrap();
/// assert_eq!(binary.num_leaves(), 3);
/// assert_eq!(binary.root().count(), 4);
/// assert!(binary.root().taxids().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinaryConverter {
    root_taxids: bool,
}

/// Work item: a group of count-tree nodes and the vertex its result attaches to.
struct Frame {
    members: Vec<CountIndex>,
    parent: Option<VertexIndex>,
}

impl BinaryConverter {
    /// Creates a converter with default settings (empty root taxid list).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the root vertex should list all leaf taxids (in pre-order)
    /// instead of none.
    pub fn with_root_taxids(mut self, root_taxids: bool) -> Self {
        self.root_taxids = root_taxids;
        self
    }

    /// Converts `tree` into a binary tree.
    ///
    /// The root's count is recomputed as the sum of its children's counts.
    /// If only a single leaf remains after eliding chains, the tree consists
    /// of that leaf, which keeps its count (other writers of the format put
    /// 0 on a root without children).
    ///
    /// Samples ending at a node with children (the root included) reach no
    /// leaf; they are reported in a single warning, see
    /// [CountTree::samples_above_leaves].
    ///
    /// # Errors
    /// * [Error::EmptyInput] if the root of `tree` has no children
    /// * [Error::EmptySplitGroup] if a split leaves a group empty
    pub fn convert(&self, tree: &CountTree) -> Result<BinaryTree> {
        if tree.root().is_leaf() {
            return Err(Error::EmptyInput);
        }
        warn_samples_above_leaves(tree);

        let mut ids = NodeIdCounter::default();
        let mut binary = BinaryTree::with_num_leaves(tree.num_leaves());
        let mut stack = vec![Frame {
            members: vec![tree.root_index()],
            parent: None,
        }];

        while let Some(Frame { mut members, parent }) = stack.pop() {
            if let [single] = members[..] {
                let node = skip_chain(tree, single);
                if tree[node].is_leaf() {
                    let id = ids.next_leaf();
                    add_vertex(&mut binary, parent, id, tree[node].count(), vec![tree[node].taxid()]);
                    continue;
                }
                members = tree[node].children().to_vec();
            }

            let taxids: Vec<TaxId> = members.iter().map(|&m| tree[m].taxid()).collect();
            let counts: Vec<u64> = members.iter().map(|&m| tree[m].count()).collect();
            let id = ids.next_internal();
            let index = add_vertex(&mut binary, parent, id, counts.iter().sum(), taxids);

            let (left, right) = split_evenly(&counts)?;
            // Right first, so left is converted (and numbered) first
            for group in [right, left] {
                stack.push(Frame {
                    members: group.into_iter().map(|i| members[i]).collect(),
                    parent: Some(index),
                });
            }
        }

        self.finish_root(&mut binary);
        info!(
            "Converted count tree into binary tree with {} leaves and {} internal vertices",
            ids.leaves, ids.internals
        );

        Ok(binary)
    }

    /// Recomputes the root count from its children and sets its taxid list.
    fn finish_root(&self, binary: &mut BinaryTree) {
        let root = binary.root_index();
        let Some((left, right)) = binary.root().children() else {
            return;
        };

        binary.set_count(root, binary[left].count() + binary[right].count());
        let taxids = if self.root_taxids {
            binary.leaf_taxids()
        } else {
            Vec::new()
        };
        binary.set_taxids(root, taxids);
    }
}

// ============================================================================
// Helpers (private)
// ============================================================================
/// Next free leaf and internal numbers, owned by a single conversion.
#[derive(Debug, Default)]
struct NodeIdCounter {
    leaves: usize,
    internals: usize,
}

impl NodeIdCounter {
    fn next_leaf(&mut self) -> NodeId {
        self.leaves += 1;
        NodeId::Leaf(self.leaves - 1)
    }

    fn next_internal(&mut self) -> NodeId {
        self.internals += 1;
        NodeId::Internal(self.internals - 1)
    }
}

/// Follows single-child chains down from `index`, returning the first node
/// with zero or several children.
fn skip_chain(tree: &CountTree, mut index: CountIndex) -> CountIndex {
    while let [child] = tree[index].children() {
        index = *child;
    }
    index
}

/// Warns once about all samples that end at a node with children.
fn warn_samples_above_leaves(tree: &CountTree) {
    let above = tree.samples_above_leaves();
    if above.is_empty() {
        return;
    }

    let total: u64 = above.iter().map(|&(_, samples)| samples).sum();
    let taxids: Vec<String> = above.iter().map(|(taxid, _)| taxid.to_string()).collect();
    warn!(
        "{total} samples end at taxids with descendants and reach no leaf of the binary tree: {}",
        taxids.join(" ")
    );
}

fn add_vertex(
    binary: &mut BinaryTree,
    parent: Option<VertexIndex>,
    id: NodeId,
    count: u64,
    taxids: Vec<TaxId>,
) -> VertexIndex {
    match parent {
        Some(parent) => binary.add_child(parent, id, count, taxids),
        None => binary.add_root(id, count, taxids),
    }
}
