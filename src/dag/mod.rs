//! Indexed append tree
//!
//! Nodes live in an arena and are found through their binary index; the
//! index is the only identity used to derive parent, child and ancestor
//! relationships.

pub mod index;
pub mod node;
pub mod shared;
pub mod tree;

pub use node::{Node, NodeSnapshot};
pub use shared::SharedTree;
pub use tree::{AppendOutcome, AppendStep, IndexedAppendTree};
