//! Tree file writer, see [crate::io] for the format.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::io::defs::FIELD_SEPARATOR;
use crate::io::writer::write_atomically;
use crate::model::{BinaryTree, BinaryVertex};

/// Writes `tree` to the file at `path` in tree file format.
///
/// The file is written to a temporary file first and moved into place
/// when complete, so a failure never leaves a partial tree file behind.
///
/// # Errors
/// Returns an [Error::Io](crate::Error::Io) if writing fails.
pub fn write_tree_file<P: AsRef<Path>>(path: P, tree: &BinaryTree) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |file| TreeFileWriter::new(file).write_tree(tree))?;
    info!("Wrote {} vertices to {}", tree.num_vertices(), path.display());
    Ok(())
}

/// Returns the tree file representation of `tree` as a string.
///
/// # Example
/// ```
/// use bintax::io::to_tree_string;
/// use bintax::model::{BinaryTree, NodeId};
///
/// let mut tree = BinaryTree::new();
/// let root = tree.add_root(NodeId::Internal(0), 3, vec![]);
/// tree.add_child(root, NodeId::Leaf(0), 1, vec![30]);
/// tree.add_child(root, NodeId::Leaf(1), 2, vec![10]);
///
/// assert_eq!(to_tree_string(&tree), "n0 3\nl0 0 1 30\nl1 0 2 10\n");
/// ```
pub fn to_tree_string(tree: &BinaryTree) -> String {
    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail
    let _ = TreeFileWriter::new(&mut bytes).write_tree(tree);
    String::from_utf8_lossy(&bytes).into_owned()
}

// =#========================================================================#=
// TREE FILE WRITER
// =#========================================================================#=
/// Buffered writer for [BinaryTree]s in tree file format.
///
/// # Example
/// ```ignore
/// use bintax::io::TreeFileWriter;
/// use std::fs::File;
///
/// let file = File::create("fdna_tree.txt")?;
/// TreeFileWriter::new(file).write_tree(&binary_tree)?;
/// ```
pub struct TreeFileWriter<W: Write> {
    bw: BufWriter<W>,
}

// ============================================================================
// API (public)
// ============================================================================
impl<W: Write> TreeFileWriter<W> {
    /// Creates a new tree file writer on top of `inner`.
    pub fn new(inner: W) -> Self {
        TreeFileWriter {
            bw: BufWriter::new(inner),
        }
    }

    /// Writes all vertices of `tree` in pre-order, one line each, and flushes.
    ///
    /// # Errors
    /// Returns an I/O error if writing fails.
    pub fn write_tree(&mut self, tree: &BinaryTree) -> io::Result<()> {
        for vertex in tree.pre_order_iter() {
            self.vertex_line(tree, vertex)?;
        }
        self.bw.flush()
    }
}

// ============================================================================
// Line writing (private)
// ============================================================================
impl<W: Write> TreeFileWriter<W> {
    /// Writes `<id> [<parent number>] <count> <taxids...>` and a newline.
    fn vertex_line(&mut self, tree: &BinaryTree, vertex: &BinaryVertex) -> io::Result<&mut Self> {
        write!(self.bw, "{}", vertex.id())?;
        if let Some(parent_id) = tree.parent_id(vertex.index()) {
            write!(self.bw, "{FIELD_SEPARATOR}{}", parent_id.number())?;
        }
        write!(self.bw, "{FIELD_SEPARATOR}{}", vertex.count())?;
        for taxid in vertex.taxids() {
            write!(self.bw, "{FIELD_SEPARATOR}{taxid}")?;
        }
        self.bw.write_all(b"\n")?;
        Ok(self)
    }
}
