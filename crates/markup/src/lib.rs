//! Tolerant markup parsing into element trees.
//!
//! The pipeline is `tokenize` -> `build_tree`, wrapped by [`parse`]. Output
//! trees are arena-backed, addressable by child-index paths, and serialize
//! back to markup deterministically, which is what the repair engine's
//! content comparisons rely on.
pub mod builder;
pub mod tokenizer;
pub mod tree;
pub mod types;

pub use builder::parse;
pub use tree::{Element, NodeId, Tree, TreePath};
pub use types::{MarkupMode, Token};
