//! Tree nodes

use crate::core::types::{Hash, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node owned by an [`IndexedAppendTree`](super::IndexedAppendTree).
///
/// Relationships are stored as arena ids, which survive reindexing. Leaves
/// keep the content they were built from so their hash can be recomputed.
#[derive(Debug, Clone)]
pub struct Node<C> {
    pub(crate) id: NodeId,
    pub(crate) index: String,
    pub(crate) kind: NodeKind,
    pub(crate) hash: Hash,
    pub(crate) sequence: u64,
    pub(crate) content: Option<C>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) ancestors: Vec<NodeId>,
}

impl<C> Node<C> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Current binary index; changes when the tree grows a level
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Depth in the virtual tree
    pub fn depth(&self) -> usize {
        self.index.len()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// 1-based insertion order
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Leaf content; `None` for intermediate nodes
    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }
}

/// Owned copy of a node's identifying fields, safe to hand out past a lock guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub index: String,
    pub kind: NodeKind,
    pub hash: Hash,
    pub sequence: u64,
}

impl<C> From<&Node<C>> for NodeSnapshot {
    fn from(node: &Node<C>) -> Self {
        Self {
            id: node.id,
            index: node.index.clone(),
            kind: node.kind,
            hash: node.hash,
            sequence: node.sequence,
        }
    }
}

impl<C: crate::core::content::Content> fmt::Display for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number: {} | Index: {} | {}: {}",
            self.sequence, self.index, self.kind, self.hash
        )?;
        if let Some(content) = &self.content {
            write!(f, " | data: {}", String::from_utf8_lossy(content.data()))?;
        }
        Ok(())
    }
}
