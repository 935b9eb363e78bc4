//! Reference taxonomy used to place observed taxids into a tree.
//!
//! The count tree builder only needs three lookups, captured by the
//! [TaxonomyReference] trait:
//! * resolution of merged (secondary) taxids to their primary taxid,
//! * the ancestor path of a taxid, root first,
//! * the rank of a taxid.
//!
//! [NcbiTaxonomy] implements the trait on top of the NCBI taxonomy dump
//! (`nodes.dmp`, `names.dmp`, `merged.dmp`).

pub mod ncbi;

pub use ncbi::NcbiTaxonomy;

/// NCBI taxonomic identifier.
pub type TaxId = u32;

/// Taxid of the universal root in NCBI taxonomies.
pub const ROOT_TAXID: TaxId = 1;

/// Rank reported for taxids the reference holds no rank for.
pub const NO_RANK: &str = "no rank";

// =#========================================================================#=
// TAXONOMY REFERENCE
// =#========================================================================#=
/// Read-only view of a reference taxonomy.
pub trait TaxonomyReference {
    /// Taxid of the root of this taxonomy.
    fn root_taxid(&self) -> TaxId {
        ROOT_TAXID
    }

    /// Resolves `taxid` to its primary taxid.
    ///
    /// Returns `Some(taxid)` for a primary taxid, `Some(primary)` for a merged
    /// one, and `None` if the taxonomy does not know `taxid` at all.
    fn primary_taxid(&self, taxid: TaxId) -> Option<TaxId>;

    /// Returns the ancestor path of a primary `taxid`, starting at the root
    /// and ending with `taxid` itself.
    ///
    /// `None` elements mark links the taxonomy could not resolve.
    fn ancestor_path(&self, taxid: TaxId) -> Vec<Option<TaxId>>;

    /// Returns the rank of a primary `taxid`, if known.
    fn rank_of(&self, taxid: TaxId) -> Option<&str>;

    /// Returns the scientific name of `taxid`, if known.
    fn name_of(&self, _taxid: TaxId) -> Option<&str> {
        None
    }
}
