//! Bintax turns the taxa of a training set into a balanced binary taxonomy
//! tree, used by hierarchical (tree based) genome classifiers to narrow
//! down among many species instead of scoring each one.
//!
//! Core functionality provided:
//! - Taxonomy: NCBI taxdump loading (`nodes.dmp`, optional `names.dmp` and
//!   `merged.dmp`) behind the [TaxonomyReference] trait.
//! - Count tree: the observed taxids (one per sample) placed into the
//!   reference taxonomy, each node counting the samples below it.
//!   See [model::CountTree].
//! - Conversion: the count tree turned into a binary tree whose splits
//!   balance sample counts, single-child chains elided.
//!   See [convert].
//! - Tree files: line based serialization read by the classifier, plus a
//!   reader for it and a Newick export. See [io].
//! - Both trees use the arena pattern and so no direct node references are
//!   stored, only indices.
//!
//! # Usage
//! ```no_run
//! use bintax::taxonomy::NcbiTaxonomy;
//!
//! let taxonomy = NcbiTaxonomy::load("nodes.dmp", Some("names.dmp"), Some("merged.dmp"))?;
//! let (count_tree, summary) = bintax::tree_from_taxid_file("train.taxids", &taxonomy)?;
//! println!("{summary}");
//!
//! let binary_tree = bintax::to_binary(&count_tree)?;
//! bintax::write_tree_file("fdna_tree.txt", &binary_tree)?;
//! # Ok::<(), bintax::Error>(())
//! ```

pub mod convert;
pub mod error;
pub mod io;
pub mod model;
pub mod taxonomy;

pub use crate::convert::to_binary;
pub use crate::error::{Error, Result};
pub use crate::io::write_tree_file;
pub use crate::taxonomy::TaxonomyReference;

use crate::model::{BuildSummary, CountTree, CountTreeBuilder};
use crate::taxonomy::TaxId;
use std::path::Path;

// ============================================================================
// Quick API
// ============================================================================
/// Builds a count tree from a taxid list file (one taxid per sample).
///
/// See [io::parse_taxids] for the file format and
/// [CountTreeBuilder::build_from_taxids] for how the tree is built.
pub fn tree_from_taxid_file<P, T>(path: P, reference: &T) -> Result<(CountTree, BuildSummary)>
where
    P: AsRef<Path>,
    T: TaxonomyReference,
{
    let taxids = io::read_taxid_file(path)?;
    tree_from_taxids(&taxids, reference)
}

/// Builds a count tree from taxids (one per sample).
///
/// See [CountTreeBuilder::build_from_taxids].
pub fn tree_from_taxids<T: TaxonomyReference>(
    taxids: &[TaxId],
    reference: &T,
) -> Result<(CountTree, BuildSummary)> {
    CountTreeBuilder::new(reference).build_from_taxids(taxids)
}
