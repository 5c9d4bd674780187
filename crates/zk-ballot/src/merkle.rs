//! Fixed-depth Merkle accumulator over Poseidon
//!
//! The tree commits to an ordered leaf sequence at a fixed depth of 20
//! (up to 2^20 leaves). An unmatched node at an odd-width level pairs
//! with that level's zero value, never with a duplicate of itself; the
//! circuit climbs the same way, so the tie-break must not diverge.

use ark_bn254::Fr;
use ark_ff::Zero;
use tracing::debug;

use crate::error::{BallotError, Result};
use crate::poseidon::PoseidonHasher;

/// Fixed tree depth
pub const TREE_DEPTH: usize = 20;
/// Maximum number of leaves (2^20)
pub const MAX_LEAVES: usize = 1 << TREE_DEPTH;

/// Inclusion proof for one leaf: sibling hashes bottom-up plus the
/// side bit at each level (0 = node is the left child).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub elements: [Fr; TREE_DEPTH],
    pub indices: [u8; TREE_DEPTH],
}

impl MerklePath {
    /// Recompute the root this path climbs to from `leaf`.
    ///
    /// Used natively to cross-check proofs; the circuit performs the
    /// identical climb in constraints.
    pub fn compute_root(&self, hasher: &PoseidonHasher, leaf: Fr) -> Fr {
        let mut current = leaf;
        for level in 0..TREE_DEPTH {
            current = if self.indices[level] == 0 {
                hasher.hash2(current, self.elements[level])
            } else {
                hasher.hash2(self.elements[level], current)
            };
        }
        current
    }
}

/// Append-only Poseidon Merkle tree of fixed depth
pub struct MerkleTree {
    zeros: Vec<Fr>,
    layers: Vec<Vec<Fr>>,
}

impl MerkleTree {
    /// Build the full tree from an ordered leaf sequence.
    ///
    /// O(n) hashes. Rebuilding from the same sequence always yields
    /// the same root.
    pub fn build(hasher: &PoseidonHasher, leaves: Vec<Fr>) -> Result<Self> {
        if leaves.len() > MAX_LEAVES {
            return Err(BallotError::TreeFull {
                count: leaves.len(),
                capacity: MAX_LEAVES,
            });
        }

        let zeros = Self::zero_values(hasher);

        let mut layers = Vec::with_capacity(TREE_DEPTH + 1);
        layers.push(leaves);

        for level in 0..TREE_DEPTH {
            let below = &layers[level];
            let mut above = Vec::with_capacity((below.len() + 1) / 2);

            for pair in (0..below.len()).step_by(2) {
                let left = below[pair];
                let right = if pair + 1 < below.len() {
                    below[pair + 1]
                } else {
                    zeros[level]
                };
                above.push(hasher.hash2(left, right));
            }

            layers.push(above);
        }

        let tree = Self { zeros, layers };
        debug!(leaves = tree.leaf_count(), root = %tree.root(), "built membership tree");
        Ok(tree)
    }

    /// `zeros[0] = 0`, `zeros[i] = Poseidon(zeros[i-1], zeros[i-1])`
    fn zero_values(hasher: &PoseidonHasher) -> Vec<Fr> {
        let mut zeros = Vec::with_capacity(TREE_DEPTH + 1);
        let mut current = Fr::zero();
        zeros.push(current);
        for _ in 0..TREE_DEPTH {
            current = hasher.hash2(current, current);
            zeros.push(current);
        }
        zeros
    }

    /// Root of the full-depth tree (the empty-tree root if no leaves)
    pub fn root(&self) -> Fr {
        self.layers[TREE_DEPTH]
            .first()
            .copied()
            .unwrap_or(self.zeros[TREE_DEPTH])
    }

    /// Number of populated leaves
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Leaf value at `index`, if populated
    pub fn leaf(&self, index: usize) -> Option<Fr> {
        self.layers[0].get(index).copied()
    }

    /// Produce the inclusion proof for the leaf at `index`.
    ///
    /// O(depth): records the sibling (level zero value when the
    /// sibling slot is vacant) and the side bit, halving the index
    /// each level.
    pub fn prove(&self, index: usize) -> Result<MerklePath> {
        if index >= self.leaf_count() {
            return Err(BallotError::LeafOutOfBounds {
                index,
                leaves: self.leaf_count(),
            });
        }

        let mut elements = [Fr::zero(); TREE_DEPTH];
        let mut indices = [0u8; TREE_DEPTH];
        let mut position = index;

        for level in 0..TREE_DEPTH {
            let nodes = &self.layers[level];
            if position % 2 == 0 {
                elements[level] = nodes.get(position + 1).copied().unwrap_or(self.zeros[level]);
                indices[level] = 0;
            } else {
                elements[level] = nodes[position - 1];
                indices[level] = 1;
            }
            position /= 2;
        }

        Ok(MerklePath { elements, indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u64) -> Vec<Fr> {
        (1..=n).map(Fr::from).collect()
    }

    #[test]
    fn test_build_deterministic() {
        let hasher = PoseidonHasher::new();

        let a = MerkleTree::build(&hasher, leaves(4)).unwrap();
        let b = MerkleTree::build(&hasher, leaves(4)).unwrap();
        assert_eq!(a.root(), b.root());

        // Order matters
        let mut reordered = leaves(4);
        reordered.swap(0, 3);
        let c = MerkleTree::build(&hasher, reordered).unwrap();
        assert_ne!(a.root(), c.root());
    }

    #[test]
    fn test_odd_level_pairs_with_zero() {
        let hasher = PoseidonHasher::new();
        let tree = MerkleTree::build(&hasher, leaves(3)).unwrap();

        // Level 1 by hand: [H(1,2), H(3, zeros[0])], the odd third
        // leaf pairs with the level zero, not with itself
        let n01 = hasher.hash2(Fr::from(1u64), Fr::from(2u64));
        let n23 = hasher.hash2(Fr::from(3u64), Fr::zero());
        let mut expected = hasher.hash2(n01, n23);

        // Above level 2 the single node climbs against the zero ladder
        let z1 = hasher.hash2(Fr::zero(), Fr::zero());
        let mut z = hasher.hash2(z1, z1);
        for _ in 2..TREE_DEPTH {
            expected = hasher.hash2(expected, z);
            z = hasher.hash2(z, z);
        }

        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_path_recomputes_root() {
        let hasher = PoseidonHasher::new();
        let tree = MerkleTree::build(&hasher, leaves(5)).unwrap();

        for index in 0..5 {
            let path = tree.prove(index).unwrap();
            let leaf = tree.leaf(index).unwrap();
            assert_eq!(path.compute_root(&hasher, leaf), tree.root());
        }
    }

    #[test]
    fn test_tampered_element_changes_root() {
        let hasher = PoseidonHasher::new();
        let tree = MerkleTree::build(&hasher, leaves(4)).unwrap();
        let leaf = tree.leaf(2).unwrap();

        for level in 0..TREE_DEPTH {
            let mut path = tree.prove(2).unwrap();
            path.elements[level] += Fr::from(1u64);
            assert_ne!(path.compute_root(&hasher, leaf), tree.root());
        }
    }

    #[test]
    fn test_flipped_index_changes_root() {
        let hasher = PoseidonHasher::new();
        let tree = MerkleTree::build(&hasher, leaves(4)).unwrap();
        let leaf = tree.leaf(1).unwrap();

        let mut path = tree.prove(1).unwrap();
        path.indices[0] ^= 1;
        assert_ne!(path.compute_root(&hasher, leaf), tree.root());
    }

    #[test]
    fn test_prove_out_of_bounds() {
        let hasher = PoseidonHasher::new();
        let tree = MerkleTree::build(&hasher, leaves(4)).unwrap();

        assert!(matches!(
            tree.prove(4),
            Err(BallotError::LeafOutOfBounds { index: 4, leaves: 4 })
        ));
    }

    #[test]
    fn test_empty_tree_root_is_zero_ladder_top() {
        let hasher = PoseidonHasher::new();
        let tree = MerkleTree::build(&hasher, Vec::new()).unwrap();

        let mut z = Fr::zero();
        for _ in 0..TREE_DEPTH {
            z = hasher.hash2(z, z);
        }
        assert_eq!(tree.root(), z);
    }
}
