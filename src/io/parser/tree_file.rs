//! Parser for tree files, the inverse of [crate::io::writer::tree_file].
//!
//! Checks the structure the way the classifier reading these files does:
//! the first line is the root, every other line names an already read
//! internal vertex as parent, and no vertex gets more than two children.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::model::{BinaryTree, NodeId, VertexIndex};
use crate::taxonomy::TaxId;

/// Reads a tree file, see [parse_tree].
pub fn read_tree_file<P: AsRef<Path>>(path: P) -> Result<BinaryTree> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    parse_tree(BufReader::new(file))
}

/// Parses a tree file into a [BinaryTree]. Blank lines are skipped.
///
/// # Errors
/// Returns [Error::MalformedTree] (with line number) if
/// * an id, parent number, count or taxid cannot be parsed,
/// * an id occurs twice,
/// * a parent is unknown, a leaf, or already has two children,
/// * a leaf does not have exactly one taxid,
/// * an internal vertex ends up with fewer than two children,
/// * the file holds no vertex at all.
///
/// # Example
/// ```
/// use bintax::io::parse_tree;
///
/// let tree = parse_tree("n0 3\nl0 0 1 30\nl1 0 2 10\n".as_bytes()).unwrap();
/// assert_eq!(tree.num_vertices(), 3);
/// assert_eq!(tree.leaf_taxids(), vec![30, 10]);
/// ```
pub fn parse_tree<R: BufRead>(reader: R) -> Result<BinaryTree> {
    let mut tree = BinaryTree::new();
    let mut ids: FxHashMap<NodeId, VertexIndex> = FxHashMap::default();
    let mut line_numbers: Vec<usize> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.map_err(|e| Error::malformed_tree(line_number, format!("unreadable line ({e})")))?;
        let mut fields = line.split_whitespace().peekable();
        if fields.peek().is_none() {
            continue;
        }

        let id_field = fields.next().unwrap_or_default();
        let id = NodeId::parse(id_field)
            .ok_or_else(|| Error::malformed_tree(line_number, format!("invalid id {id_field:?}")))?;

        let parent = if tree.is_root_set() {
            let number: usize = parse_field(fields.next(), "parent", line_number)?;
            Some(resolve_parent(&tree, &ids, number, line_number)?)
        } else {
            None
        };

        let count: u64 = parse_field(fields.next(), "count", line_number)?;
        let taxids = fields
            .map(|f| parse_field::<TaxId>(Some(f), "taxid", line_number))
            .collect::<Result<Vec<_>>>()?;
        if id.is_leaf() && taxids.len() != 1 {
            return Err(Error::malformed_tree(
                line_number,
                format!("leaf {id} has {} taxids, expected 1", taxids.len()),
            ));
        }

        let index = match parent {
            Some(parent) => tree.add_child(parent, id, count, taxids),
            None => tree.add_root(id, count, taxids),
        };
        if ids.insert(id, index).is_some() {
            return Err(Error::malformed_tree(line_number, format!("duplicate id {id}")));
        }
        line_numbers.push(line_number);
    }

    if !tree.is_root_set() {
        return Err(Error::malformed_tree(0, "no vertices"));
    }

    if let Some(vertex) = tree
        .pre_order_iter()
        .find(|v| !v.id().is_leaf() && v.children().is_none())
    {
        return Err(Error::malformed_tree(
            line_numbers[vertex.index()],
            format!("internal vertex {} has fewer than two children", vertex.id()),
        ));
    }

    Ok(tree)
}

/// Looks up the internal vertex with the given number and checks it can take another child.
fn resolve_parent(
    tree: &BinaryTree,
    ids: &FxHashMap<NodeId, VertexIndex>,
    number: usize,
    line_number: usize,
) -> Result<VertexIndex> {
    let parent_id = NodeId::Internal(number);
    let &parent = ids
        .get(&parent_id)
        .ok_or_else(|| Error::malformed_tree(line_number, format!("unknown parent {parent_id}")))?;

    if !tree[parent].has_free_child_slot() {
        return Err(Error::malformed_tree(
            line_number,
            format!("parent {parent_id} already has two children"),
        ));
    }
    Ok(parent)
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str, line_number: usize) -> Result<T> {
    let field = field.ok_or_else(|| Error::malformed_tree(line_number, format!("missing {name}")))?;
    field
        .parse::<T>()
        .map_err(|_| Error::malformed_tree(line_number, format!("invalid {name} {field:?}")))
}
