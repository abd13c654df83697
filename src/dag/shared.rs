//! Single-writer, many-reader handle around a tree
//!
//! `append` hashes the new content before taking the write lock, then holds
//! the lock across the whole decision, reindex and insertion sequence, so
//! readers never observe half-rewritten indices and never wait on content I/O.

use crate::core::content::Content;
use crate::core::error::{CommitDagError, Result};
use crate::core::hash::HashStrategy;
use crate::core::types::{Commitment, Hash};
use crate::dag::node::NodeSnapshot;
use crate::dag::tree::{AppendOutcome, IndexedAppendTree};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

pub struct SharedTree<C> {
    inner: Arc<RwLock<IndexedAppendTree<C>>>,
    strategy: HashStrategy,
}

impl<C> Clone for SharedTree<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            strategy: self.strategy,
        }
    }
}

impl<C: Content> SharedTree<C> {
    pub fn initialize(content: C, strategy: HashStrategy) -> Result<Self> {
        Ok(Self::from_tree(IndexedAppendTree::initialize(content, strategy)?))
    }

    pub fn from_tree(tree: IndexedAppendTree<C>) -> Self {
        Self {
            strategy: tree.strategy(),
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    pub fn append(&self, content: C) -> Result<AppendOutcome> {
        let hash = content.calculate_hash(self.strategy)?;
        self.inner.write().append_hashed(hash, content)
    }

    pub fn lookup(&self, index: &str) -> Option<NodeSnapshot> {
        self.inner.read().lookup(index).map(NodeSnapshot::from)
    }

    pub fn ancestors_of(&self, index: &str) -> Result<Vec<NodeSnapshot>> {
        let tree = self.inner.read();
        let ancestors = tree.ancestors_of(index)?;
        Ok(ancestors.into_iter().map(NodeSnapshot::from).collect())
    }

    pub fn recompute_hash(&self, index: &str) -> Result<Hash> {
        self.inner.read().recompute_hash(index)
    }

    pub fn running_commitment(&self) -> Commitment {
        self.inner.read().running_commitment()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Hold the read lock for a batch of queries
    pub fn read(&self) -> RwLockReadGuard<'_, IndexedAppendTree<C>> {
        self.inner.read()
    }

    /// Take the tree back out once no other handle is alive
    pub fn into_inner(self) -> Result<IndexedAppendTree<C>> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|_| CommitDagError::internal("tree is still shared"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::BytesContent;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    /// Content that checks, while being hashed, whether the tree is readable
    struct LockCheckingContent {
        payload: Vec<u8>,
        tree: Arc<Mutex<Option<SharedTree<LockCheckingContent>>>>,
        readable: Arc<AtomicBool>,
    }

    impl Content for LockCheckingContent {
        fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash> {
            if let Some(tree) = self.tree.lock().as_ref() {
                let readable = tree.inner.try_read().is_some();
                self.readable.store(readable, Ordering::SeqCst);
            }
            Ok(strategy.digest(&self.payload))
        }

        fn data(&self) -> &[u8] {
            &self.payload
        }
    }

    #[test]
    fn test_concurrent_readers_see_whole_appends() {
        let shared =
            SharedTree::initialize(BytesContent::new(b"0".to_vec()), HashStrategy::Sha256)
                .unwrap();

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 1..64u32 {
                    shared
                        .append(BytesContent::new(i.to_le_bytes().to_vec()))
                        .unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let tree = shared.read();
                        tree.verify_structure().unwrap();
                        let genesis = tree.genesis().index().to_string();
                        assert_eq!(tree.ancestors_of(&genesis).unwrap().len(), 1);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        let tree = shared.into_inner().unwrap();
        assert_eq!(tree.leaf_count(), 64);
    }

    #[test]
    fn test_content_is_hashed_outside_the_write_lock() {
        let slot = Arc::new(Mutex::new(None));
        let readable = Arc::new(AtomicBool::new(false));
        let content = |payload: &[u8]| LockCheckingContent {
            payload: payload.to_vec(),
            tree: Arc::clone(&slot),
            readable: Arc::clone(&readable),
        };

        let shared = SharedTree::initialize(content(b"a"), HashStrategy::Sha256).unwrap();
        *slot.lock() = Some(shared.clone());

        let outcome = shared.append(content(b"b")).unwrap();
        assert!(readable.load(Ordering::SeqCst));
        assert_eq!(outcome.leaf.hash, HashStrategy::Sha256.digest(b"b"));

        // Break the Arc cycle
        slot.lock().take();
    }
}
