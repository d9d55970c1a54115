//! Merkle tree construction and branch verification.
//!
//! The tree is built level by level over the leaf hashes and flattened
//! into a single vector, leaves first; the last element is the root. A
//! level of odd size pairs its final element with itself. The same
//! branch verifier serves transaction inclusion and both AuxPoW proofs.

use crate::hash::{double_sha256, Hash256, ZERO_HASH};

fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left);
    buf[32..].copy_from_slice(right);
    double_sha256(&buf)
}

fn next_level(level: &[Hash256]) -> Vec<Hash256> {
    level
        .chunks(2)
        .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
        .collect()
}

/// Build the flattened tree over `leaves`. An empty leaf set yields a
/// single zero hash.
pub fn merkle_tree(leaves: &[Hash256]) -> Vec<Hash256> {
    if leaves.is_empty() {
        return vec![ZERO_HASH];
    }
    let mut tree = leaves.to_vec();
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
        tree.extend_from_slice(&level);
    }
    tree
}

/// Root over `leaves`.
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    *merkle_tree(leaves).last().expect("tree has at least one node")
}

/// Sibling path proving `leaves[index]` under the root.
///
/// Combine with [`branch_mask`] and feed both to [`verify_branch`].
pub fn merkle_branch(leaves: &[Hash256], index: usize) -> Vec<Hash256> {
    let mut branch = Vec::new();
    let mut level = leaves.to_vec();
    let mut idx = index;
    while level.len() > 1 {
        let sibling = (idx ^ 1).min(level.len() - 1);
        branch.push(level[sibling]);
        level = next_level(&level);
        idx /= 2;
    }
    branch
}

/// Side mask for the leaf at `index`: bit `j` set means the running hash
/// is the right child at level `j`.
pub fn branch_mask(index: usize) -> u32 {
    index as u32
}

/// Fold a leaf up through `branch`, taking sides from `mask`, and return
/// the resulting root.
pub fn verify_branch(leaf: &Hash256, branch: &[Hash256], mask: u32) -> Hash256 {
    let mut acc = *leaf;
    let mut side = mask;
    for sibling in branch {
        acc = if side & 1 == 0 {
            hash_pair(&acc, sibling)
        } else {
            hash_pair(sibling, &acc)
        };
        side >>= 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(byte: u8) -> Hash256 {
        [byte; 32]
    }

    #[test]
    fn empty_leaf_set_is_zero_hash() {
        assert_eq!(merkle_tree(&[]), vec![ZERO_HASH]);
        assert_eq!(merkle_root(&[]), ZERO_HASH);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let a = leaf(0x11);
        assert_eq!(merkle_root(&[a]), a);
        assert_eq!(merkle_tree(&[a]), vec![a]);
    }

    #[test]
    fn three_leaves_duplicate_the_odd_tail() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let ab = hash_pair(&a, &b);
        let cc = hash_pair(&c, &c);
        assert_eq!(merkle_root(&[a, b, c]), hash_pair(&ab, &cc));
    }

    #[test]
    fn tree_is_flattened_level_order() {
        let (a, b) = (leaf(1), leaf(2));
        let tree = merkle_tree(&[a, b]);
        assert_eq!(tree, vec![a, b, hash_pair(&a, &b)]);
    }

    #[test]
    fn branch_verifies_to_root() {
        let leaves: Vec<Hash256> = (0..5u8).map(leaf).collect();
        let root = merkle_root(&leaves);
        for (i, l) in leaves.iter().enumerate() {
            let branch = merkle_branch(&leaves, i);
            assert_eq!(verify_branch(l, &branch, branch_mask(i)), root, "leaf {i}");
        }
    }

    proptest! {
        #[test]
        fn all_branches_verify(leaves in prop::collection::vec(any::<[u8; 32]>(), 1..12)) {
            let root = merkle_root(&leaves);
            for (i, l) in leaves.iter().enumerate() {
                let branch = merkle_branch(&leaves, i);
                prop_assert_eq!(verify_branch(l, &branch, branch_mask(i)), root);
            }
        }

        #[test]
        fn odd_length_equals_duplicated_tail(
            leaves in prop::collection::vec(any::<[u8; 32]>(), 3..12)
        ) {
            // A single leaf is its own root, so duplication only kicks in
            // once a level actually pairs.
            prop_assume!(leaves.len() % 2 == 1);
            let mut padded = leaves.clone();
            padded.push(*leaves.last().unwrap());
            prop_assert_eq!(merkle_root(&leaves), merkle_root(&padded));
        }
    }
}
