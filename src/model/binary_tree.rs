//! Binary taxonomy tree, the result of balancing a [CountTree](crate::model::CountTree).
//!
//! Provides:
//! * [BinaryTree] - arena of [BinaryVertex]s, referenced by [VertexIndex]
//! * [NodeId] - the `l<k>` / `n<k>` identifiers written to tree files

use std::fmt;
use std::fmt::Write as _;

use crate::taxonomy::{TaxId, TaxonomyReference};

/// Index of a vertex in a [BinaryTree] (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

/// Prefix of leaf ids in tree files.
pub const LEAF_PREFIX: char = 'l';

/// Prefix of internal vertex ids in tree files.
pub const INTERNAL_PREFIX: char = 'n';

// =#========================================================================#=
// NODE ID
// =#========================================================================#=
/// Identifier of a vertex; leaves and internal vertices are numbered
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Leaf with number `k`, written as `l<k>`
    Leaf(usize),
    /// Internal vertex (or root) with number `k`, written as `n<k>`
    Internal(usize),
}

impl NodeId {
    /// Returns the number without namespace, as used in the parent field.
    pub fn number(&self) -> usize {
        match self {
            NodeId::Leaf(k) | NodeId::Internal(k) => *k,
        }
    }

    /// Returns `true` for a leaf id.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeId::Leaf(_))
    }

    /// Parses an id such as `l12` or `n0`.
    ///
    /// # Example
    /// ```
    /// use bintax::model::NodeId;
    ///
    /// assert_eq!(NodeId::parse("n3"), Some(NodeId::Internal(3)));
    /// assert_eq!(NodeId::parse("l0"), Some(NodeId::Leaf(0)));
    /// assert_eq!(NodeId::parse("x1"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let prefix = chars.next()?;
        let number = chars.as_str().parse::<usize>().ok()?;
        match prefix {
            LEAF_PREFIX => Some(NodeId::Leaf(number)),
            INTERNAL_PREFIX => Some(NodeId::Internal(number)),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Leaf(k) => write!(f, "{LEAF_PREFIX}{k}"),
            NodeId::Internal(k) => write!(f, "{INTERNAL_PREFIX}{k}"),
        }
    }
}

// =#========================================================================#=
// BINARY VERTEX
// =#========================================================================#=
/// Vertex of a [BinaryTree].
///
/// # Invariants
/// - Either both children are set or neither (after construction)
/// - A leaf holds exactly one taxid
/// - `parent` is `None` only for the root
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryVertex {
    index: VertexIndex,
    id: NodeId,
    count: u64,
    taxids: Vec<TaxId>,
    parent: Option<VertexIndex>,
    left: Option<VertexIndex>,
    right: Option<VertexIndex>,
}

impl BinaryVertex {
    /// Returns the index of this vertex in the arena.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    /// Returns the id of this vertex.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the aggregated sample count of the subtree rooted here.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the taxids subsumed by this vertex.
    pub fn taxids(&self) -> &[TaxId] {
        &self.taxids
    }

    /// Returns the parent index, `None` for the root.
    pub fn parent(&self) -> Option<VertexIndex> {
        self.parent
    }

    /// Returns the children if both are set, else `None`.
    pub fn children(&self) -> Option<(VertexIndex, VertexIndex)> {
        match (self.left, self.right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    /// Returns the left child, if set.
    pub fn left(&self) -> Option<VertexIndex> {
        self.left
    }

    /// Returns the right child, if set.
    pub fn right(&self) -> Option<VertexIndex> {
        self.right
    }

    /// Returns `true` if this vertex has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns `true` if this vertex is the root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns `true` if another child can be attached.
    pub fn has_free_child_slot(&self) -> bool {
        self.right.is_none()
    }
}

// =$========================================================================$=
// BINARY TREE
// =$========================================================================$=
/// A binary taxonomy tree represented using the arena pattern on [BinaryVertex].
///
/// Vertices are added top-down: first the root via [BinaryTree::add_root],
/// then children via [BinaryTree::add_child], which fills the left slot of
/// the parent first and the right slot second.
///
/// # Example
/// ```
/// use bintax::model::{BinaryTree, NodeId};
///
/// let mut tree = BinaryTree::new();
/// let root = tree.add_root(NodeId::Internal(0), 3, vec![]);
/// tree.add_child(root, NodeId::Leaf(0), 1, vec![30]);
/// tree.add_child(root, NodeId::Leaf(1), 2, vec![10]);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.leaf_taxids(), vec![30, 10]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTree {
    vertices: Vec<BinaryVertex>,
    root_index: VertexIndex,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl BinaryTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        BinaryTree {
            vertices: Vec::new(),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Creates an empty tree with capacity for a tree with `num_leaves` leaves.
    pub fn with_num_leaves(num_leaves: usize) -> Self {
        BinaryTree {
            vertices: Vec::with_capacity((2 * num_leaves).saturating_sub(1)),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Adds the root vertex, returning its index.
    ///
    /// # Panics
    /// Panics if the root has already been set.
    pub fn add_root(&mut self, id: NodeId, count: u64, taxids: Vec<TaxId>) -> VertexIndex {
        assert!(!self.is_root_set(), "Root of binary tree already set");
        let index = self.push_vertex(id, count, taxids, None);
        self.root_index = index;
        index
    }

    /// Adds a child of `parent`, returning its index. The first child
    /// becomes the left child, the second the right child.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds or already has two children.
    pub fn add_child(
        &mut self,
        parent: VertexIndex,
        id: NodeId,
        count: u64,
        taxids: Vec<TaxId>,
    ) -> VertexIndex {
        assert!(
            self.vertices[parent].has_free_child_slot(),
            "Vertex {} already has two children",
            self.vertices[parent].id
        );
        let index = self.push_vertex(id, count, taxids, Some(parent));

        let parent = &mut self.vertices[parent];
        if parent.left.is_none() {
            parent.left = Some(index);
        } else {
            parent.right = Some(index);
        }

        index
    }

    /// Returns whether the root has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set.
    pub fn root(&self) -> &BinaryVertex {
        &self.vertices[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &BinaryVertex {
        &self.vertices[index]
    }

    /// Overrides the count of the vertex at `index`.
    pub fn set_count(&mut self, index: VertexIndex, count: u64) {
        self.vertices[index].count = count;
    }

    /// Overrides the taxids of the vertex at `index`.
    pub fn set_taxids(&mut self, index: VertexIndex, taxids: Vec<TaxId>) {
        self.vertices[index].taxids = taxids;
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_leaf()).count()
    }

    /// Returns the number of non-leaf vertices (root included).
    pub fn num_internal(&self) -> usize {
        self.vertices.len() - self.num_leaves()
    }

    /// Returns the taxids of all leaves in pre-order.
    pub fn leaf_taxids(&self) -> Vec<TaxId> {
        self.pre_order_iter()
            .filter(|v| v.is_leaf())
            .flat_map(|v| v.taxids.iter().copied())
            .collect()
    }

    /// Returns the parent's id of the vertex at `index`, `None` for the root.
    pub fn parent_id(&self, index: VertexIndex) -> Option<NodeId> {
        self.vertices[index].parent.map(|p| self.vertices[p].id)
    }

    /// Checks the structural invariants of this tree:
    /// - root set and without parent, every other vertex has a parent
    /// - each vertex has 0 or 2 children, which point back to it
    /// - leaves have leaf ids and exactly one taxid, others internal ids
    /// - each vertex with children has count equal to the sum of their counts
    ///   or, except for the root, at least that sum
    pub fn is_valid(&self) -> bool {
        if !self.is_root_set() || self.root().parent.is_some() {
            return false;
        }

        for (index, vertex) in self.vertices.iter().enumerate() {
            if index != self.root_index && vertex.parent.is_none() {
                return false;
            }

            match (vertex.left, vertex.right) {
                (None, None) => {
                    if !vertex.id.is_leaf() || vertex.taxids.len() != 1 {
                        return false;
                    }
                }
                (Some(left), Some(right)) => {
                    if vertex.id.is_leaf()
                        || left >= self.vertices.len()
                        || right >= self.vertices.len()
                    {
                        return false;
                    }
                    let (left, right) = (&self.vertices[left], &self.vertices[right]);
                    if left.parent != Some(index) || right.parent != Some(index) {
                        return false;
                    }
                    let sum = left.count + right.count;
                    if vertex.count < sum || (index == self.root_index && vertex.count != sum) {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        true
    }
}

// ============================================================================
// Construction helpers (private)
// ============================================================================
impl BinaryTree {
    fn push_vertex(
        &mut self,
        id: NodeId,
        count: u64,
        taxids: Vec<TaxId>,
        parent: Option<VertexIndex>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices.push(BinaryVertex {
            index,
            id,
            count,
            taxids,
            parent,
            left: None,
            right: None,
        });
        index
    }
}

impl Default for BinaryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<VertexIndex> for BinaryTree {
    type Output = BinaryVertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
impl BinaryTree {
    /// Prints a visual representation of the tree to the console,
    /// see [BinaryTree::to_pretty_string].
    pub fn print_tree(&self, names: Option<&dyn TaxonomyReference>) {
        print!("{}", self.to_pretty_string(names));
    }

    /// Returns a visual representation of the tree, one vertex per line.
    /// Taxids are replaced by scientific names where `names` knows them.
    ///
    /// # Example Output
    /// ```text
    /// n0 (4)
    ///   ├─ l0 (1) [30]
    ///   └─ n1 (3) [10 20]
    ///      ├─ l1 (1) [20]
    ///      └─ l2 (2) [10]
    /// ```
    pub fn to_pretty_string(&self, names: Option<&dyn TaxonomyReference>) -> String {
        let mut out = String::new();
        if !self.is_root_set() {
            out.push_str("(No root set)\n");
            return out;
        }

        // (index, prefix, is_last)
        let mut stack = vec![(self.root_index, String::new(), true)];
        while let Some((index, prefix, is_last)) = stack.pop() {
            let vertex = &self.vertices[index];
            let connector = if index == self.root_index {
                ""
            } else if is_last {
                "└─ "
            } else {
                "├─ "
            };

            let _ = write!(out, "{prefix}{connector}{} ({})", vertex.id, vertex.count);
            if !vertex.taxids.is_empty() {
                let labels: Vec<String> = vertex
                    .taxids
                    .iter()
                    .map(|&t| match names.and_then(|n| n.name_of(t)) {
                        Some(name) => name.to_string(),
                        None => t.to_string(),
                    })
                    .collect();
                let _ = write!(out, " [{}]", labels.join(" "));
            }
            out.push('\n');

            if let Some((left, right)) = vertex.children() {
                let child_prefix = if index == self.root_index {
                    "  ".to_string()
                } else {
                    format!("{prefix}{}  ", if is_last { " " } else { "│" })
                };
                stack.push((right, child_prefix.clone(), true));
                stack.push((left, child_prefix, false));
            }
        }

        out
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl BinaryTree {
    /// Returns an iterator over the tree in pre-order (parent, left subtree,
    /// right subtree), which is the order of tree files.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// Stack based, so deep trees cannot overflow the call stack.
pub struct PreOrderIter<'a> {
    tree: &'a BinaryTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a BinaryTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a BinaryVertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        // Right first, so left is processed first
        if let Some(right) = vertex.right {
            self.stack.push(right);
        }
        if let Some(left) = vertex.left {
            self.stack.push(left);
        }

        Some(vertex)
    }
}
