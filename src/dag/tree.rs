//! Indexed append tree
//!
//! A binary authenticated structure grown strictly by append. Nodes are
//! addressed by binary index strings in a virtual complete binary tree; the
//! node sequence is the post-order of that tree (`a, b, ab, c, d, cd, abcd, ...`),
//! so no existing hash is ever recomputed when the tree grows.
//!
//! Every [`IndexedAppendTree::append`] admits exactly one leaf. Intermediate
//! nodes owed by the pairing rules are synthesized first, in the same call:
//!
//! 1. last node is a leaf, leaf count odd: place a leaf
//! 2. last node is a leaf, leaf count even: pair the two most recent leaves
//! 3. last node is intermediate, its level count even: pair it with its sibling
//! 4. last node is intermediate, its level count odd: place a leaf

use crate::core::content::Content;
use crate::core::error::{CommitDagError, Result};
use crate::core::hash::{fold_commitment, HashStrategy};
use crate::core::types::{Commitment, Hash, NodeId, NodeKind};
use crate::dag::index;
use crate::dag::node::{Node, NodeSnapshot};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, trace};

/// What the next insertion step will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendStep {
    /// Place a new leaf at the current width
    Leaf,
    /// Synthesize an intermediate node from two completed siblings
    Merge,
}

/// Result of a single append
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    /// Running commitment after the leaf was placed
    pub commitment: Commitment,
    /// The new leaf
    pub leaf: NodeSnapshot,
    /// Intermediate nodes synthesized before the leaf, in insertion order
    pub synthesized: Vec<NodeSnapshot>,
    /// Ancestor set of the new leaf, nearest first
    pub ancestors: Vec<NodeSnapshot>,
}

/// Incremental binary-indexed authenticated tree
pub struct IndexedAppendTree<C> {
    strategy: HashStrategy,
    nodes: Vec<Node<C>>,
    by_index: HashMap<String, NodeId>,
    levels: BTreeMap<usize, Vec<NodeId>>,
    width: usize,
    leaf_count: u64,
    running_commitment: Commitment,
    fault: Option<String>,
}

impl<C: Content> IndexedAppendTree<C> {
    /// Create a tree holding only the genesis leaf at index `"0"`
    pub fn initialize(content: C, strategy: HashStrategy) -> Result<Self> {
        let hash = content.calculate_hash(strategy)?;

        let mut tree = Self {
            strategy,
            nodes: Vec::new(),
            by_index: HashMap::new(),
            levels: BTreeMap::new(),
            width: 1,
            leaf_count: 0,
            running_commitment: hash,
            fault: None,
        };

        let id = tree.insert(
            index::to_binary_string(0, 1),
            NodeKind::Leaf,
            hash,
            Some(content),
            None,
            None,
        )?;
        tree.leaf_count = 1;
        tree.nodes[id].ancestors = vec![id];

        debug!(commitment = %hash, strategy = %strategy, "initialized tree with genesis leaf");
        Ok(tree)
    }

    /// Admit `content` as the next leaf and return the updated commitment.
    ///
    /// The content is hashed before anything is touched, so a hashing failure
    /// leaves the tree exactly as it was.
    pub fn append(&mut self, content: C) -> Result<AppendOutcome> {
        self.check_fault()?;
        let hash = content.calculate_hash(self.strategy)?;
        self.append_hashed(hash, content)
    }

    /// Append with a hash the caller already computed with this tree's
    /// strategy. Lets [`SharedTree`](crate::dag::SharedTree) hash outside its
    /// write lock.
    pub(crate) fn append_hashed(&mut self, hash: Hash, content: C) -> Result<AppendOutcome> {
        self.check_fault()?;

        let mut synthesized = Vec::new();
        while self.next_step() == AppendStep::Merge {
            let merged = self.synthesize();
            let id = self.poison_on_error(merged)?;
            synthesized.push(NodeSnapshot::from(&self.nodes[id]));
        }

        let placed = self.place_leaf(hash, content);
        let leaf_id = self.poison_on_error(placed)?;

        let leaf = &self.nodes[leaf_id];
        let ancestors = leaf
            .ancestors
            .iter()
            .map(|&id| NodeSnapshot::from(&self.nodes[id]))
            .collect();

        Ok(AppendOutcome {
            commitment: self.running_commitment,
            leaf: NodeSnapshot::from(leaf),
            synthesized,
            ancestors,
        })
    }

    /// The decision the next insertion step will take, driven only by the
    /// last node's kind and parity counts.
    pub fn next_step(&self) -> AppendStep {
        let last = match self.nodes.last() {
            Some(last) => last,
            None => return AppendStep::Leaf,
        };

        match last.kind {
            NodeKind::Leaf if self.leaf_count % 2 == 1 => AppendStep::Leaf,
            NodeKind::Leaf => AppendStep::Merge,
            NodeKind::Intermediate if self.level_len(last.depth()) % 2 == 0 => AppendStep::Merge,
            NodeKind::Intermediate => AppendStep::Leaf,
        }
    }

    /// Nodes a verifier must recompute to anchor the node at `index` in the
    /// commitment, nearest first. The all-zero index is its own sole ancestor.
    pub fn ancestors_of(&self, index: &str) -> Result<Vec<&Node<C>>> {
        let node = self
            .lookup(index)
            .ok_or_else(|| CommitDagError::node_not_found(index))?;

        Ok(self
            .resolve_ancestors(node.id)
            .into_iter()
            .map(|id| &self.nodes[id])
            .collect())
    }

    pub fn lookup(&self, index: &str) -> Option<&Node<C>> {
        self.by_index.get(index).map(|&id| &self.nodes[id])
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<C>> {
        self.nodes.get(id)
    }

    /// Children of an intermediate node, resolved by index. `None` for leaves.
    pub fn children_of(&self, index: &str) -> Result<Option<(&Node<C>, &Node<C>)>> {
        let node = self
            .lookup(index)
            .ok_or_else(|| CommitDagError::node_not_found(index))?;
        if node.is_leaf() {
            return Ok(None);
        }

        let (left, right) = index::children_of(&node.index);
        match (self.lookup(&left), self.lookup(&right)) {
            (Some(l), Some(r)) => Ok(Some((l, r))),
            _ => Err(CommitDagError::structural(format!(
                "intermediate node {} is missing a child",
                node.index
            ))),
        }
    }

    /// Recompute a node's hash from leaf contents up, ignoring stored hashes
    pub fn recompute_hash(&self, index: &str) -> Result<Hash> {
        let node = self
            .lookup(index)
            .ok_or_else(|| CommitDagError::node_not_found(index))?;
        self.recompute(node)
    }

    /// Recompute a node's hash one level down: leaves from their content,
    /// intermediate nodes as `H(left || right)` of the stored hashes of their
    /// index-resolved children.
    pub fn recompute_local(&self, index: &str) -> Result<Hash> {
        let node = self
            .lookup(index)
            .ok_or_else(|| CommitDagError::node_not_found(index))?;
        match self.children_of(index)? {
            Some((left, right)) => Ok(self.strategy.hash_pair(&left.hash, &right.hash)),
            None => self.recompute(node),
        }
    }

    /// Commitment covering the leaf at `index`, recombined from its ancestors
    pub fn commitment_for(&self, index: &str) -> Result<Commitment> {
        let node = self
            .lookup(index)
            .ok_or_else(|| CommitDagError::node_not_found(index))?;

        let ancestor_hashes: Vec<&Hash> = self
            .resolve_ancestors(node.id)
            .into_iter()
            .filter(|&id| id != node.id)
            .map(|id| &self.nodes[id].hash)
            .collect();

        Ok(fold_commitment(self.strategy, &node.hash, ancestor_hashes))
    }

    /// Check every structural invariant: unique indices, leaves at the current
    /// width, and every intermediate hash equal to `H(left || right)` of its
    /// index-resolved children.
    pub fn verify_structure(&self) -> Result<()> {
        if self.by_index.len() != self.nodes.len() {
            return Err(CommitDagError::structural("index map and node store disagree"));
        }

        for node in &self.nodes {
            if !index::is_valid(&node.index) || node.depth() > self.width {
                return Err(CommitDagError::structural(format!(
                    "node {} has an invalid index for width {}",
                    node.index, self.width
                )));
            }
            if node.is_leaf() {
                if node.depth() != self.width {
                    return Err(CommitDagError::structural(format!(
                        "leaf {} is not at the leaf depth {}",
                        node.index, self.width
                    )));
                }
                continue;
            }

            let (left, right) = self.children_of(&node.index)?.ok_or_else(|| {
                CommitDagError::internal("intermediate node reported as leaf")
            })?;
            if node.left != Some(left.id) || node.right != Some(right.id) {
                return Err(CommitDagError::structural(format!(
                    "children of {} moved since synthesis",
                    node.index
                )));
            }
            if self.strategy.hash_pair(&left.hash, &right.hash) != node.hash {
                return Err(CommitDagError::structural(format!(
                    "hash of {} does not match its children",
                    node.index
                )));
            }
        }
        Ok(())
    }

    fn recompute(&self, node: &Node<C>) -> Result<Hash> {
        match (&node.kind, &node.content) {
            (NodeKind::Leaf, Some(content)) => content.calculate_hash(self.strategy),
            (NodeKind::Leaf, None) => Err(CommitDagError::structural(format!(
                "leaf {} has no content",
                node.index
            ))),
            (NodeKind::Intermediate, _) => {
                let (left, right) = self.children_of(&node.index)?.ok_or_else(|| {
                    CommitDagError::internal("intermediate node reported as leaf")
                })?;
                let left_hash = self.recompute(left)?;
                let right_hash = self.recompute(right)?;
                Ok(self.strategy.hash_pair(&left_hash, &right_hash))
            }
        }
    }

    /// Pair two completed siblings into their parent (rules 2 and 3)
    fn synthesize(&mut self) -> Result<NodeId> {
        self.grow_to(index::target_depth(self.next_sequence()));

        let last = self
            .nodes
            .last()
            .ok_or_else(|| CommitDagError::internal("cannot synthesize in an empty tree"))?;

        let parent_index = match last.kind {
            NodeKind::Leaf => {
                if self.width < 2 {
                    return Err(CommitDagError::structural(
                        "cannot pair leaves at width 1",
                    ));
                }
                let level = self.width - 1;
                index::to_binary_string(self.level_len(level) as u64, level)
            }
            NodeKind::Intermediate => index::parent_of(&last.index)
                .ok_or_else(|| {
                    CommitDagError::structural(format!("node {} has no parent slot", last.index))
                })?
                .to_string(),
        };
        let last_id = last.id;

        let (left_index, right_index) = index::children_of(&parent_index);
        let left = self.resolve_child(&parent_index, &left_index)?;
        let right = self.resolve_child(&parent_index, &right_index)?;
        if right != last_id {
            return Err(CommitDagError::structural(format!(
                "pairing for {} would skip the most recent node {}",
                parent_index, self.nodes[last_id].index
            )));
        }

        let hash = self
            .strategy
            .hash_pair(&self.nodes[left].hash, &self.nodes[right].hash);
        let id = self.insert(
            parent_index,
            NodeKind::Intermediate,
            hash,
            None,
            Some(left),
            Some(right),
        )?;

        debug!(index = %self.nodes[id].index, sequence = self.nodes[id].sequence, "synthesized intermediate node");
        Ok(id)
    }

    /// Place a leaf at the next free position of the current width (rules 1 and 4)
    fn place_leaf(&mut self, hash: Hash, content: C) -> Result<NodeId> {
        self.grow_to(index::target_depth(self.next_sequence()));

        let leaf_index = index::to_binary_string(self.leaf_count, self.width);
        if leaf_index.len() > self.width {
            return Err(CommitDagError::structural(format!(
                "leaf position {} does not fit in width {}",
                self.leaf_count, self.width
            )));
        }

        let id = self.insert(leaf_index, NodeKind::Leaf, hash, Some(content), None, None)?;
        self.leaf_count += 1;

        let ancestors = self.resolve_ancestors(id);
        let ancestor_hashes: Vec<&Hash> = ancestors
            .iter()
            .filter(|&&a| a != id)
            .map(|&a| &self.nodes[a].hash)
            .collect();
        self.running_commitment = fold_commitment(self.strategy, &hash, ancestor_hashes);
        self.nodes[id].ancestors = ancestors;

        trace!(
            index = %self.nodes[id].index,
            ancestors = self.nodes[id].ancestors.len(),
            commitment = %self.running_commitment,
            "placed leaf"
        );
        Ok(id)
    }

    fn resolve_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[id];
        if index::is_all_zero(&node.index) {
            return vec![id];
        }

        index::ancestor_candidates(&node.index)
            .iter()
            .filter_map(|candidate| self.by_index.get(candidate).copied())
            .collect()
    }

    fn resolve_child(&self, parent: &str, child: &str) -> Result<NodeId> {
        self.by_index.get(child).copied().ok_or_else(|| {
            CommitDagError::structural(format!("child {} of {} does not exist", child, parent))
        })
    }

    fn insert(
        &mut self,
        index: String,
        kind: NodeKind,
        hash: Hash,
        content: Option<C>,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) -> Result<NodeId> {
        if self.by_index.contains_key(&index) {
            return Err(CommitDagError::structural(format!(
                "index collision at {}",
                index
            )));
        }

        let id = self.nodes.len();
        self.levels.entry(index.len()).or_default().push(id);
        self.by_index.insert(index.clone(), id);
        self.nodes.push(Node {
            id,
            index,
            kind,
            hash,
            sequence: id as u64 + 1,
            content,
            left,
            right,
            ancestors: Vec::new(),
        });
        Ok(id)
    }

    fn check_fault(&self) -> Result<()> {
        match &self.fault {
            Some(fault) => Err(CommitDagError::structural(format!(
                "tree is unusable after an earlier fault: {}",
                fault
            ))),
            None => Ok(()),
        }
    }

    fn poison_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(CommitDagError::StructuralError { reason }) = &result {
            self.fault = Some(reason.clone());
        }
        result
    }
}

impl<C> IndexedAppendTree<C> {
    /// Left-pad every index so the tree is `depth` levels deep, then rebuild
    /// the level table. Hashes are untouched.
    fn grow_to(&mut self, depth: usize) {
        if depth <= self.width {
            return;
        }
        let extra = depth - self.width;
        debug!(from = self.width, to = depth, nodes = self.nodes.len(), "reindexing tree");

        let mut by_index = HashMap::with_capacity(self.nodes.len());
        let mut levels: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        for node in &mut self.nodes {
            node.index = index::left_pad(&node.index, extra);
            levels.entry(node.index.len()).or_default().push(node.id);
            by_index.insert(node.index.clone(), node.id);
        }

        self.by_index = by_index;
        self.levels = levels;
        self.width = depth;
    }

    fn next_sequence(&self) -> u64 {
        self.nodes.len() as u64 + 1
    }

    fn level_len(&self, depth: usize) -> usize {
        self.levels.get(&depth).map_or(0, Vec::len)
    }

    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    pub fn running_commitment(&self) -> Commitment {
        self.running_commitment
    }

    /// Current index width, i.e. the depth of every leaf
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    pub fn intermediate_count(&self) -> usize {
        self.nodes.len() - self.leaf_count as usize
    }

    pub fn genesis(&self) -> &Node<C> {
        &self.nodes[0]
    }

    pub fn last(&self) -> Option<&Node<C>> {
        self.nodes.last()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node<C>> {
        self.nodes.iter()
    }

    /// Whether an earlier structural fault has made this tree unusable
    pub fn is_poisoned(&self) -> bool {
        self.fault.is_some()
    }
}

impl<C: Content> fmt::Display for IndexedAppendTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{}", node)?;
        }
        Ok(())
    }
}

impl<C> fmt::Debug for IndexedAppendTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedAppendTree")
            .field("strategy", &self.strategy)
            .field("width", &self.width)
            .field("nodes", &self.nodes.len())
            .field("leaves", &self.leaf_count)
            .field("commitment", &self.running_commitment)
            .finish()
    }
}
