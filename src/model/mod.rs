//! Tree models.
//!
//! # Tree representation
//! Both trees use the arena pattern: nodes are stored in a vector and
//! refer to their parent and children by index, so parent links never own
//! anything.
//!
//! | Type | Node | Index | Shape |
//! |------|------|-------|-------|
//! | [CountTree] | [CountNode] | [CountIndex] | n-ary, children in insertion order |
//! | [BinaryTree] | [BinaryVertex] | [VertexIndex] | every vertex has 0 or 2 children |
//!
//! A [CountTree] is built by [CountTreeBuilder] and converted into a
//! [BinaryTree] by [crate::convert::BinaryConverter].

pub mod binary_tree;
pub mod count_tree;

// Count tree
pub use count_tree::BuildSummary;
pub use count_tree::CountIndex;
pub use count_tree::CountNode;
pub use count_tree::CountTree;
pub use count_tree::CountTreeBuilder;
// Binary tree
pub use binary_tree::BinaryTree;
pub use binary_tree::BinaryVertex;
pub use binary_tree::NodeId;
pub use binary_tree::VertexIndex;
