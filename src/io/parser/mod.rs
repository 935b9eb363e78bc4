//! Parsers for taxid lists and tree files.

pub mod taxid_list;
pub mod tree_file;

pub use taxid_list::{parse_taxids, read_taxid_file};
pub use tree_file::{parse_tree, read_tree_file};
