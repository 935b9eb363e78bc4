//! NCBI taxonomy loaded from the taxdump files.
//!
//! The dump files are `|`-separated tables (fields padded by tabs):
//! * `nodes.dmp`: `taxid | parent taxid | rank | ...`
//! * `names.dmp`: `taxid | name | unique name | name class |`
//! * `merged.dmp`: `old taxid | new taxid |`
//!
//! Download from <https://ftp.ncbi.nlm.nih.gov/pub/taxonomy/taxdump.tar.gz>.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::taxonomy::{TaxId, TaxonomyReference};

/// Ancestor walks longer than this are treated as broken (cyclic) parent links.
pub const MAX_TAXONOMY_DEPTH: usize = 256;

/// Longest chain of merged entries followed when resolving a taxid.
const MAX_MERGE_CHAIN: usize = 16;

/// Name class kept from `names.dmp`.
const SCIENTIFIC_NAME: &str = "scientific name";

// =#========================================================================#=
// NCBI TAXONOMY
// =#========================================================================#=
/// NCBI reference taxonomy: parent links and ranks from `nodes.dmp`,
/// optionally scientific names from `names.dmp` and merged taxids from
/// `merged.dmp`.
///
/// # Example
/// ```
/// use bintax::taxonomy::{NcbiTaxonomy, TaxonomyReference};
///
/// let nodes = "1\t|\t1\t|\tno rank\t|\n\
///              2\t|\t1\t|\tsuperkingdom\t|\n\
///              561\t|\t2\t|\tgenus\t|\n";
/// let merged = "12\t|\t561\t|\n";
/// let taxonomy = NcbiTaxonomy::from_nodes_reader(nodes.as_bytes(), "nodes.dmp")
///     .unwrap()
///     .with_merged_reader(merged.as_bytes(), "merged.dmp")
///     .unwrap();
///
/// assert_eq!(taxonomy.primary_taxid(12), Some(561));
/// assert_eq!(taxonomy.ancestor_path(561), vec![Some(1), Some(2), Some(561)]);
/// assert_eq!(taxonomy.rank_of(561), Some("genus"));
/// ```
#[derive(Debug, Clone)]
pub struct NcbiTaxonomy {
    /// taxid -> (parent taxid, rank)
    nodes: FxHashMap<TaxId, (TaxId, String)>,
    /// taxid -> scientific name
    names: FxHashMap<TaxId, String>,
    /// merged taxid -> primary taxid
    merged: FxHashMap<TaxId, TaxId>,
    root: TaxId,
}

// ============================================================================
// Loading (pub)
// ============================================================================
impl NcbiTaxonomy {
    /// Loads the taxonomy from dump files; names and merged files are optional.
    ///
    /// # Errors
    /// Returns an [Error::Io] if a file cannot be opened and an
    /// [Error::InvalidDumpRecord] (with file and line) if a record is
    /// malformed or cannot be read.
    pub fn load<P: AsRef<Path>>(
        nodes_path: P,
        names_path: Option<P>,
        merged_path: Option<P>,
    ) -> Result<Self> {
        let nodes_path = nodes_path.as_ref();
        let mut taxonomy =
            Self::from_nodes_reader(open(nodes_path)?, &nodes_path.display().to_string())?;
        info!("Loaded {} taxonomy nodes", taxonomy.num_nodes());

        if let Some(names_path) = names_path {
            let names_path = names_path.as_ref();
            taxonomy = taxonomy
                .with_names_reader(open(names_path)?, &names_path.display().to_string())?;
            info!("Loaded {} scientific names", taxonomy.names.len());
        }

        if let Some(merged_path) = merged_path {
            let merged_path = merged_path.as_ref();
            taxonomy = taxonomy
                .with_merged_reader(open(merged_path)?, &merged_path.display().to_string())?;
            info!("Loaded {} merged taxids", taxonomy.merged.len());
        }

        Ok(taxonomy)
    }

    /// Creates a taxonomy from the content of a `nodes.dmp` file.
    ///
    /// # Arguments
    /// * `reader` - Source of `nodes.dmp` records
    /// * `source_name` - Name used in error messages (usually the file path)
    pub fn from_nodes_reader<R: BufRead>(reader: R, source_name: &str) -> Result<Self> {
        let mut nodes = FxHashMap::default();
        let mut root = None;

        for_each_record(reader, source_name, 3, |fields, line| {
            let taxid = parse_taxid(fields[0], source_name, line)?;
            let parent = parse_taxid(fields[1], source_name, line)?;
            if taxid == parent {
                root = Some(taxid);
            }
            nodes.insert(taxid, (parent, fields[2].to_string()));
            Ok(())
        })?;

        let root = root.ok_or_else(|| Error::MissingTaxonomyRoot(source_name.to_string()))?;

        Ok(NcbiTaxonomy {
            nodes,
            names: FxHashMap::default(),
            merged: FxHashMap::default(),
            root,
        })
    }

    /// Adds scientific names from the content of a `names.dmp` file.
    /// Rows of other name classes (synonyms, common names, ...) are ignored.
    pub fn with_names_reader<R: BufRead>(mut self, reader: R, source_name: &str) -> Result<Self> {
        for_each_record(reader, source_name, 4, |fields, line| {
            if fields[3] == SCIENTIFIC_NAME {
                let taxid = parse_taxid(fields[0], source_name, line)?;
                self.names.insert(taxid, fields[1].to_string());
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Adds merged taxids from the content of a `merged.dmp` file.
    pub fn with_merged_reader<R: BufRead>(mut self, reader: R, source_name: &str) -> Result<Self> {
        for_each_record(reader, source_name, 2, |fields, line| {
            let old = parse_taxid(fields[0], source_name, line)?;
            let new = parse_taxid(fields[1], source_name, line)?;
            self.merged.insert(old, new);
            Ok(())
        })?;
        Ok(self)
    }

    /// Returns the number of taxonomy nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether `taxid` is a node of this taxonomy (merged taxids are not).
    pub fn contains(&self, taxid: TaxId) -> bool {
        self.nodes.contains_key(&taxid)
    }
}

impl TaxonomyReference for NcbiTaxonomy {
    fn root_taxid(&self) -> TaxId {
        self.root
    }

    fn primary_taxid(&self, taxid: TaxId) -> Option<TaxId> {
        let mut current = taxid;
        for _ in 0..MAX_MERGE_CHAIN {
            if self.nodes.contains_key(&current) {
                return Some(current);
            }
            current = *self.merged.get(&current)?;
        }
        None
    }

    fn ancestor_path(&self, taxid: TaxId) -> Vec<Option<TaxId>> {
        let mut path = Vec::new();
        let mut current = taxid;

        loop {
            let Some((parent, _)) = self.nodes.get(&current) else {
                path.push(None);
                break;
            };
            path.push(Some(current));

            if current == self.root || *parent == current {
                break;
            }
            if path.len() >= MAX_TAXONOMY_DEPTH {
                path.push(None);
                break;
            }
            current = *parent;
        }

        path.reverse();
        path
    }

    fn rank_of(&self, taxid: TaxId) -> Option<&str> {
        self.nodes.get(&taxid).map(|(_, rank)| rank.as_str())
    }

    fn name_of(&self, taxid: TaxId) -> Option<&str> {
        self.names.get(&taxid).map(String::as_str)
    }
}

// ============================================================================
// Dump parsing (private)
// ============================================================================
fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(BufReader::new(file))
}

/// Calls `handle` with the trimmed fields and 1-based line number of every
/// non-empty record, after checking it has at least `min_fields` fields.
fn for_each_record<R, F>(
    reader: R,
    source_name: &str,
    min_fields: usize,
    mut handle: F,
) -> Result<()>
where
    R: BufRead,
    F: FnMut(&[&str], usize) -> Result<()>,
{
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.map_err(|e| Error::InvalidDumpRecord {
            source_name: source_name.to_string(),
            line: line_number,
            msg: format!("unreadable line ({e})"),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line
            .trim_end_matches(['\t', '|'])
            .split('|')
            .map(str::trim)
            .collect();
        if fields.len() < min_fields {
            return Err(Error::InvalidDumpRecord {
                source_name: source_name.to_string(),
                line: line_number,
                msg: format!("expected at least {min_fields} fields, found {}", fields.len()),
            });
        }

        handle(&fields, line_number)?;
    }

    Ok(())
}

fn parse_taxid(field: &str, source_name: &str, line: usize) -> Result<TaxId> {
    field.parse::<TaxId>().map_err(|_| Error::InvalidDumpRecord {
        source_name: source_name.to_string(),
        line,
        msg: format!("invalid taxid {field:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fields_are_trimmed() {
        let mut seen = Vec::new();
        for_each_record("9606\t|\t9605\t|\tspecies\t|\tHS\t|\n".as_bytes(), "nodes", 3, |f, l| {
            seen.push((f.iter().map(|s| s.to_string()).collect::<Vec<_>>(), l));
            Ok(())
        })
        .unwrap();

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, vec!["9606", "9605", "species", "HS"]);
        assert_eq!(seen[0].1, 1);
    }

    #[test]
    fn test_record_with_too_few_fields() {
        let result = for_each_record("1\t|\n".as_bytes(), "nodes.dmp", 3, |_, _| Ok(()));
        assert!(matches!(result, Err(Error::InvalidDumpRecord { line: 1, .. })));
    }
}
