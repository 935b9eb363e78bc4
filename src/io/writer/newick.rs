//! Newick export of binary taxonomy trees, for viewing them in standard
//! tree viewers.
//!
//! Leaves are labelled by scientific name if known, else by taxid;
//! internal vertices by their id. Each vertex carries its count as
//! annotation `[&count=<n>]`, e.g.
//! `(30[&count=1],(20[&count=1],10[&count=2])n1[&count=3])n0[&count=4];`

use std::path::Path;

use crate::error::Result;
use crate::io::defs::NEWICK_SPECIAL_CHARS;
use crate::io::writer::write_atomically;
use crate::model::{BinaryTree, VertexIndex};
use crate::taxonomy::TaxonomyReference;

/// Extra buffer in Newick string length/capacity estimate
const BUFFER_CHARS: usize = 10;

/// Rough number of characters per vertex (label, annotation, punctuation)
const VERTEX_CHARS: usize = 24;

/// Writes the Newick representation of `tree` (and a newline) to `path`.
pub fn write_newick_file<P: AsRef<Path>>(
    path: P,
    tree: &BinaryTree,
    names: Option<&dyn TaxonomyReference>,
) -> Result<()> {
    let newick = to_newick(tree, names);
    write_atomically(path.as_ref(), |file| {
        use std::io::Write;
        file.write_all(newick.as_bytes())?;
        file.write_all(b"\n")
    })
}

/// Returns the Newick representation of `tree` with closing semicolon.
///
/// # Arguments
/// * `tree` - The tree to convert; an empty tree gives an empty string
/// * `names` - Taxonomy providing scientific names for leaf labels, optional
///
/// # Example
/// ```
/// use bintax::io::to_newick;
/// use bintax::model::{BinaryTree, NodeId};
///
/// let mut tree = BinaryTree::new();
/// let root = tree.add_root(NodeId::Internal(0), 3, vec![]);
/// tree.add_child(root, NodeId::Leaf(0), 1, vec![30]);
/// tree.add_child(root, NodeId::Leaf(1), 2, vec![10]);
///
/// assert_eq!(to_newick(&tree, None), "(30[&count=1],10[&count=2])n0[&count=3];");
/// ```
pub fn to_newick(tree: &BinaryTree, names: Option<&dyn TaxonomyReference>) -> String {
    if !tree.is_root_set() {
        return String::new();
    }

    // Post-order on an explicit stack: (index, children_visited)
    let mut newick = String::with_capacity(tree.num_vertices() * VERTEX_CHARS + BUFFER_CHARS);
    let mut stack: Vec<(VertexIndex, bool)> = vec![(tree.root_index(), false)];
    while let Some((index, children_visited)) = stack.pop() {
        let vertex = &tree[index];
        match vertex.children() {
            Some((left, right)) if !children_visited => {
                newick.push('(');
                stack.push((index, true));
                stack.push((right, false));
                stack.push((left, false));
                continue;
            }
            Some(_) => {
                newick.push(')');
                newick.push_str(&vertex.id().to_string());
            }
            None => {
                let taxid = vertex.taxids()[0];
                match names.and_then(|n| n.name_of(taxid)) {
                    Some(name) => newick.push_str(&escape_label(name)),
                    None => newick.push_str(&taxid.to_string()),
                }
            }
        }
        newick.push_str(&format!("[&count={}]", vertex.count()));

        // Separate from the right sibling, which is next on the stack
        if let Some(&(_, false)) = stack.last() {
            newick.push(',');
        }
    }
    newick.push(';');

    newick
}

/// Escapes a label for use in Newick strings: labels with special characters
/// are wrapped in single quotes (internal quotes doubled), otherwise spaces
/// become underscores.
fn escape_label(label: &str) -> String {
    if label.contains(NEWICK_SPECIAL_CHARS) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.replace(' ', "_")
    }
}
