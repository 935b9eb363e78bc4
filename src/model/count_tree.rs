//! Rooted n-ary tree of sample counts over a reference taxonomy.
//!
//! Provides:
//! * [CountTree] - arena of [CountNode]s, each counting the samples whose
//!   ancestor path passes through it
//! * [CountTreeBuilder] - builds a [CountTree] from observed taxids and a
//!   [TaxonomyReference]
//! * [BuildSummary] - what happened while building, including the
//!   samples that could not be placed

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::taxonomy::{NO_RANK, TaxId, TaxonomyReference};

/// Index of a node in a [CountTree] (arena).
pub type CountIndex = usize;

/// The root is always the first node of the arena.
const ROOT_INDEX: CountIndex = 0;

// =#========================================================================#=
// COUNT NODE
// =#========================================================================#=
/// Node of a [CountTree].
///
/// Children are kept in insertion order, which is the iteration order
/// used when converting to a binary tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CountNode {
    index: CountIndex,
    taxid: TaxId,
    rank: String,
    count: u64,
    children: Vec<CountIndex>,
    parent: Option<CountIndex>,
}

impl CountNode {
    /// Returns the index of this node in the arena.
    pub fn index(&self) -> CountIndex {
        self.index
    }

    /// Returns the taxid of this node.
    pub fn taxid(&self) -> TaxId {
        self.taxid
    }

    /// Returns the rank label of this node (informational only).
    pub fn rank(&self) -> &str {
        &self.rank
    }

    /// Returns the number of samples whose path passes through this node.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the children indices in insertion order.
    pub fn children(&self) -> &[CountIndex] {
        &self.children
    }

    /// Returns the parent index, `None` for the root.
    pub fn parent(&self) -> Option<CountIndex> {
        self.parent
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this node is the root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// =#========================================================================#=
// COUNT TREE
// =#========================================================================#=
/// Rooted n-ary tree over taxids, storing [CountNode]s in an arena.
///
/// Siblings have distinct taxids; this is enforced by a `(parent, taxid)`
/// lookup table, so the same taxid may occur under different parents.
///
/// # Example
/// ```
/// use bintax::model::CountTree;
///
/// let mut tree = CountTree::new(1);
/// tree.add_path(&[1, 5, 10], 2);
/// tree.add_path(&[1, 5, 20], 1);
///
/// assert_eq!(tree.root().count(), 3);
/// assert_eq!(tree.num_leaves(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CountTree {
    nodes: Vec<CountNode>,
    lookup: FxHashMap<(CountIndex, TaxId), CountIndex>,
}

// ============================================================================
// New, Getters, Mutation (pub)
// ============================================================================
impl CountTree {
    /// Creates a tree consisting of a root with the given taxid and count 0.
    pub fn new(root_taxid: TaxId) -> Self {
        Self::with_root_rank(root_taxid, NO_RANK)
    }

    /// Creates a tree consisting of a root with the given taxid and rank.
    pub fn with_root_rank(root_taxid: TaxId, rank: &str) -> Self {
        let root = CountNode {
            index: ROOT_INDEX,
            taxid: root_taxid,
            rank: rank.to_string(),
            count: 0,
            children: Vec::new(),
            parent: None,
        };
        CountTree {
            nodes: vec![root],
            lookup: FxHashMap::default(),
        }
    }

    /// Returns the root node.
    pub fn root(&self) -> &CountNode {
        &self.nodes[ROOT_INDEX]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> CountIndex {
        ROOT_INDEX
    }

    /// Returns the node at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: CountIndex) -> &CountNode {
        &self.nodes[index]
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Returns the child of `parent` with the given taxid, if present.
    pub fn child(&self, parent: CountIndex, taxid: TaxId) -> Option<CountIndex> {
        self.lookup.get(&(parent, taxid)).copied()
    }

    /// Returns the child of `parent` with the given taxid, creating it
    /// (with count 0) if it does not exist yet.
    pub fn get_or_insert_child(&mut self, parent: CountIndex, taxid: TaxId, rank: &str) -> CountIndex {
        if let Some(index) = self.child(parent, taxid) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(CountNode {
            index,
            taxid,
            rank: rank.to_string(),
            count: 0,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent].children.push(index);
        self.lookup.insert((parent, taxid), index);

        index
    }

    /// Adds `count` samples to the node at `index` (and only to that node).
    pub fn add_count(&mut self, index: CountIndex, count: u64) {
        self.nodes[index].count += count;
    }

    /// Adds `count` samples along a fully resolved path, creating missing
    /// nodes with rank "no rank". A leading element equal to the root taxid
    /// denotes the root itself.
    ///
    /// # Returns
    /// The index of the node the path ends at.
    pub fn add_path(&mut self, path: &[TaxId], count: u64) -> CountIndex {
        let path = match path.split_first() {
            Some((first, rest)) if *first == self.root().taxid => rest,
            _ => path,
        };

        let mut current = ROOT_INDEX;
        self.add_count(current, count);
        for &taxid in path {
            current = self.get_or_insert_child(current, taxid, NO_RANK);
            self.add_count(current, count);
        }
        current
    }

    /// Returns the number of samples that end exactly at the node at `index`,
    /// i.e. its count minus the counts of its children.
    pub fn terminal_count(&self, index: CountIndex) -> u64 {
        let node = &self.nodes[index];
        let children_count: u64 = node.children.iter().map(|&c| self.nodes[c].count).sum();
        node.count.saturating_sub(children_count)
    }

    /// Returns `(taxid, samples)` for every node with children at which
    /// samples end, in pre-order. Such samples reach no leaf of the binary
    /// tree.
    ///
    /// # Example
    /// ```
    /// use bintax::model::CountTree;
    ///
    /// let mut tree = CountTree::new(1);
    /// tree.add_path(&[1], 2);
    /// tree.add_path(&[1, 5], 1);
    /// tree.add_path(&[1, 5, 10], 4);
    ///
    /// assert_eq!(tree.samples_above_leaves(), vec![(1, 2), (5, 1)]);
    /// ```
    pub fn samples_above_leaves(&self) -> Vec<(TaxId, u64)> {
        self.pre_order_iter()
            .filter(|n| !n.is_leaf())
            .filter_map(|n| match self.terminal_count(n.index) {
                0 => None,
                samples => Some((n.taxid, samples)),
            })
            .collect()
    }

    /// Returns the taxids of all leaves in pre-order.
    pub fn leaf_taxids(&self) -> Vec<TaxId> {
        self.pre_order_iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.taxid)
            .collect()
    }

    /// Returns an iterator over the nodes in pre-order, children in insertion order.
    pub fn pre_order_iter(&self) -> CountPreOrderIter<'_> {
        CountPreOrderIter {
            tree: self,
            stack: vec![ROOT_INDEX],
        }
    }
}

impl std::ops::Index<CountIndex> for CountTree {
    type Output = CountNode;

    fn index(&self, index: CountIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

/// Pre-order iterator over a [CountTree], stack based.
pub struct CountPreOrderIter<'a> {
    tree: &'a CountTree,
    stack: Vec<CountIndex>,
}

impl<'a> Iterator for CountPreOrderIter<'a> {
    type Item = &'a CountNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// =#========================================================================#=
// BUILDER
// =#========================================================================#=
/// Statistics collected while building a [CountTree].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of input samples (taxid occurrences).
    pub input_samples: u64,
    /// Number of distinct input taxids.
    pub distinct_taxids: usize,
    /// Number of distinct input taxids redirected to a primary taxid.
    pub merged_taxids: usize,
    /// Number of distinct input taxids unknown to the reference.
    pub unknown_taxids: usize,
    /// Number of unresolvable path elements skipped (per distinct taxid).
    pub unresolved_elements: usize,
    /// Number of samples counted at the root.
    pub counted_samples: u64,
    /// Number of counted samples ending at a node with children (the root
    /// included). They reach no leaf of the binary tree.
    pub samples_above_leaves: u64,
}

impl BuildSummary {
    /// Returns the number of input samples that did not reach the tree.
    pub fn uncounted_samples(&self) -> u64 {
        self.input_samples.saturating_sub(self.counted_samples)
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples over {} distinct taxids ({} merged, {} unknown), {} counted, {} above the leaves",
            self.input_samples,
            self.distinct_taxids,
            self.merged_taxids,
            self.unknown_taxids,
            self.counted_samples,
            self.samples_above_leaves
        )
    }
}

/// Builds a [CountTree] from observed taxids, placing each via its
/// ancestor path in a [TaxonomyReference].
///
/// # Example
/// ```
/// use bintax::model::CountTreeBuilder;
/// use bintax::taxonomy::NcbiTaxonomy;
///
/// let nodes = "1\t|\t1\t|\tno rank\t|\n\
///              5\t|\t1\t|\tgenus\t|\n\
///              10\t|\t5\t|\tspecies\t|\n";
/// let taxonomy = NcbiTaxonomy::from_nodes_reader(nodes.as_bytes(), "nodes.dmp").unwrap();
///
/// let (tree, summary) = CountTreeBuilder::new(&taxonomy)
///     .build_from_taxids(&[10, 10, 5])
///     .unwrap();
/// assert_eq!(tree.root().count(), 3);
/// assert_eq!(summary.uncounted_samples(), 0);
/// ```
pub struct CountTreeBuilder<'a, T: TaxonomyReference> {
    reference: &'a T,
    tree: CountTree,
    summary: BuildSummary,
}

impl<'a, T: TaxonomyReference> CountTreeBuilder<'a, T> {
    /// Creates a builder with an empty tree rooted at the reference's root.
    pub fn new(reference: &'a T) -> Self {
        let root_taxid = reference.root_taxid();
        let rank = reference.rank_of(root_taxid).unwrap_or(NO_RANK);
        CountTreeBuilder {
            reference,
            tree: CountTree::with_root_rank(root_taxid, rank),
            summary: BuildSummary::default(),
        }
    }

    /// Tallies `taxids` (one per sample) and adds them in ascending taxid order,
    /// then returns the finished tree.
    ///
    /// # Errors
    /// Returns [Error::EmptyInput] if `taxids` is empty.
    pub fn build_from_taxids(mut self, taxids: &[TaxId]) -> Result<(CountTree, BuildSummary)> {
        if taxids.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut tally: BTreeMap<TaxId, u64> = BTreeMap::new();
        for &taxid in taxids {
            *tally.entry(taxid).or_insert(0) += 1;
        }
        debug!("Tallied {} samples into {} distinct taxids", taxids.len(), tally.len());

        for (taxid, count) in tally {
            self.add_taxid(taxid, count);
        }

        Ok(self.build())
    }

    /// Adds `count` samples of `taxid` to the tree.
    ///
    /// Merged taxids are redirected to their primary taxid. Unresolvable
    /// path elements are skipped, so the samples attach to the deepest
    /// resolvable ancestor reached before.
    ///
    /// # Returns
    /// The index of the node the samples were counted at, or `None` if the
    /// taxid is unknown to the reference.
    pub fn add_taxid(&mut self, taxid: TaxId, count: u64) -> Option<CountIndex> {
        self.summary.input_samples += count;
        self.summary.distinct_taxids += 1;

        let Some(primary) = self.reference.primary_taxid(taxid) else {
            warn!("Taxid {taxid} not found in reference taxonomy, skipping {count} samples");
            self.summary.unknown_taxids += 1;
            return None;
        };
        if primary != taxid {
            warn!("Taxid {taxid} was merged into {primary}, counting its samples for {primary}");
            self.summary.merged_taxids += 1;
        }

        let full_path = self.reference.ancestor_path(primary);
        let root_taxid = self.tree.root().taxid;
        let (starts_at_root, path) = match full_path.split_first() {
            Some((Some(first), rest)) if *first == root_taxid => (true, rest),
            _ => (false, &full_path[..]),
        };
        if !starts_at_root && path.iter().all(Option::is_none) {
            warn!("No ancestor of taxid {taxid} could be resolved, skipping {count} samples");
            self.summary.unresolved_elements += path.len();
            return None;
        }

        let mut current = self.tree.root_index();
        self.tree.add_count(current, count);
        for element in path {
            match element {
                Some(ancestor) => {
                    let rank = self.reference.rank_of(*ancestor).unwrap_or(NO_RANK);
                    current = self.tree.get_or_insert_child(current, *ancestor, rank);
                    self.tree.add_count(current, count);
                }
                None => {
                    warn!("Unresolvable element in ancestor path of taxid {taxid}, skipping it");
                    self.summary.unresolved_elements += 1;
                }
            }
        }

        Some(current)
    }

    /// Finishes building, returning the tree and the build summary.
    ///
    /// Logs a warning if not all input samples were counted at the root.
    pub fn build(mut self) -> (CountTree, BuildSummary) {
        self.summary.counted_samples = self.tree.root().count;
        self.summary.samples_above_leaves =
            self.tree.samples_above_leaves().iter().map(|&(_, samples)| samples).sum();
        if self.summary.counted_samples != self.summary.input_samples {
            warn!(
                "Root count {} differs from number of input samples {} ({} samples not placed)",
                self.summary.counted_samples,
                self.summary.input_samples,
                self.summary.uncounted_samples()
            );
        }
        (self.tree, self.summary)
    }
}
