//! Property tests for append-only growth

use commitdag::core::hash::fold_commitment;
use commitdag::{BytesContent, Hash, HashStrategy, IndexedAppendTree, NodeKind};
use proptest::prelude::*;

fn build(
    payloads: &[Vec<u8>],
) -> (IndexedAppendTree<BytesContent>, Vec<commitdag::AppendOutcome>) {
    let mut tree =
        IndexedAppendTree::initialize(BytesContent::new(payloads[0].clone()), HashStrategy::Sha256)
            .unwrap();
    let outcomes = payloads[1..]
        .iter()
        .map(|p| tree.append(BytesContent::new(p.clone())).unwrap())
        .collect();
    (tree, outcomes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ancestors_recombine_to_commitment(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 1..40)
    ) {
        let (_, outcomes) = build(&payloads);

        for (outcome, payload) in outcomes.iter().zip(&payloads[1..]) {
            let leaf_hash = HashStrategy::Sha256.digest(payload);
            prop_assert_eq!(outcome.leaf.hash, leaf_hash);

            let others: Vec<&Hash> = outcome
                .ancestors
                .iter()
                .filter(|a| a.index != outcome.leaf.index)
                .map(|a| &a.hash)
                .collect();
            prop_assert_eq!(
                fold_commitment(HashStrategy::Sha256, &leaf_hash, others),
                outcome.commitment
            );
        }
    }

    #[test]
    fn prop_existing_hashes_never_change(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 2..40)
    ) {
        let mut tree = IndexedAppendTree::initialize(
            BytesContent::new(payloads[0].clone()),
            HashStrategy::Sha256,
        )
        .unwrap();

        for payload in &payloads[1..] {
            let before: Vec<(usize, Hash, u64)> = tree
                .nodes()
                .map(|n| (n.id(), *n.hash(), n.sequence()))
                .collect();
            let width = tree.width();

            tree.append(BytesContent::new(payload.clone())).unwrap();

            prop_assert!(tree.width() >= width);
            for (id, hash, sequence) in before {
                let node = tree.get(id).unwrap();
                prop_assert_eq!(*node.hash(), hash);
                prop_assert_eq!(node.sequence(), sequence);
                prop_assert_eq!(tree.lookup(node.index()).map(|n| n.id()), Some(id));
            }
        }
    }

    #[test]
    fn prop_structure_holds_after_every_append(count in 1usize..80) {
        let payloads: Vec<Vec<u8>> = (0..count).map(|i| i.to_le_bytes().to_vec()).collect();
        let (tree, _) = build(&payloads);

        tree.verify_structure().unwrap();
        prop_assert_eq!(tree.leaf_count(), count as u64);
        prop_assert_eq!(
            tree.leaf_count() as usize + tree.intermediate_count(),
            tree.len()
        );
        for node in tree.nodes() {
            if node.kind() == NodeKind::Leaf {
                prop_assert_eq!(node.depth(), tree.width());
            }
        }
        let genesis = tree.genesis().index();
        prop_assert_eq!(tree.ancestors_of(genesis).unwrap().len(), 1);
    }
}
