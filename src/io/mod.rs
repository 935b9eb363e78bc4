//! Reading and writing of the files around a binary taxonomy tree.
//!
//! * [parser] - taxid lists (input) and tree files (read back)
//! * [writer] - tree files (output, written atomically) and Newick export
//!
//! # Tree file format
//! One line per vertex in pre-order (vertex, left subtree, right subtree),
//! fields separated by single spaces:
//! ```text
//! <id> [<parent number>] <count> <taxid_1> ... <taxid_k>
//! ```
//! * `<id>`: `l<k>` for leaves, `n<k>` for internal vertices
//! * `<parent number>`: parent id without its `n` prefix; absent for the root
//! * `<count>`: number of samples in the subtree
//! * taxids: exactly one for a leaf, the grouped taxids for an internal vertex
//!
//! For example:
//! ```text
//! n0 4
//! l0 0 1 30
//! n1 0 3 10 20
//! l1 1 1 20
//! l2 1 2 10
//! ```

pub mod defs;
pub mod parser;
pub mod writer;

pub use defs::DEFAULT_OUTPUT_FILE;
pub use parser::{parse_taxids, parse_tree, read_taxid_file, read_tree_file};
pub use writer::{TreeFileWriter, to_newick, to_tree_string, write_newick_file, write_tree_file};
