//! Poseidon Merkle commitments.
//!
//! Nodes are `hash2(left, right)`. A trace leaf is `hash2(value, 0)` and an
//! FRI leaf is `hash2(f(x), f(-x))`. Tree depth is fixed by the proof
//! parameters, so leaves and inner nodes never share a level.

use ark_bn254::Fr;
use ark_ff::Zero;

use crate::poseidon::hash2;

pub type Digest = Fr;

pub fn hash_node(left: &Digest, right: &Digest) -> Digest {
    hash2(*left, *right)
}

/// Leaf hash of a single trace evaluation.
pub fn trace_leaf(value: &Fr) -> Digest {
    hash2(*value, Fr::zero())
}

/// Leaf hash of an FRI evaluation pair `(f(x), f(-x))`.
pub fn fri_leaf(a: &Fr, b: &Fr) -> Digest {
    hash2(*a, *b)
}

/// Check that `leaf` sits at `index` under `root`.
///
/// `path` lists siblings from the leaf level upwards.
pub fn verify_path(root: &Digest, leaf: Digest, mut index: usize, path: &[Digest]) -> bool {
    let mut node = leaf;
    for sibling in path {
        node = if index & 1 == 0 {
            hash_node(&node, sibling)
        } else {
            hash_node(sibling, &node)
        };
        index >>= 1;
    }
    index == 0 && &node == root
}

/// A full tree over a power-of-two number of leaf hashes.
#[cfg(any(test, feature = "prover"))]
pub struct MerkleTree {
    /// `layers[0]` holds the leaves, the last layer holds the root.
    layers: Vec<Vec<Digest>>,
}

#[cfg(any(test, feature = "prover"))]
impl MerkleTree {
    pub fn new(leaves: Vec<Digest>) -> Self {
        assert!(leaves.len().is_power_of_two(), "leaf count must be a power of two");
        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let next = layers[layers.len() - 1]
                .chunks_exact(2)
                .map(|pair| hash_node(&pair[0], &pair[1]))
                .collect();
            layers.push(next);
        }
        Self { layers }
    }

    pub fn root(&self) -> Digest {
        self.layers[self.layers.len() - 1][0]
    }

    /// Authentication path for the leaf at `index`.
    pub fn open(&self, mut index: usize) -> Vec<Digest> {
        let mut path = Vec::with_capacity(self.layers.len() - 1);
        for layer in &self.layers[..self.layers.len() - 1] {
            path.push(layer[index ^ 1]);
            index >>= 1;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(n: u64) -> (MerkleTree, Vec<Digest>) {
        let leaves: Vec<Digest> = (0..n).map(|i| trace_leaf(&Fr::from(i))).collect();
        (MerkleTree::new(leaves.clone()), leaves)
    }

    #[test]
    fn test_every_leaf_opens() {
        let (tree, leaves) = tree(8);
        for (i, leaf) in leaves.iter().enumerate() {
            let path = tree.open(i);
            assert_eq!(path.len(), 3);
            assert!(verify_path(&tree.root(), *leaf, i, &path));
        }
    }

    #[test]
    fn test_wrong_index_or_leaf_rejected() {
        let (tree, leaves) = tree(8);
        let path = tree.open(3);
        assert!(!verify_path(&tree.root(), leaves[3], 2, &path));
        assert!(!verify_path(&tree.root(), leaves[4], 3, &path));
        // index beyond the tree
        assert!(!verify_path(&tree.root(), leaves[3], 3 + 8, &path));
    }

    #[test]
    fn test_trace_leaf_differs_from_value_pair() {
        let v = Fr::from(7u64);
        assert_ne!(trace_leaf(&v), fri_leaf(&v, &Fr::from(1u64)));
    }

    #[test]
    fn test_fri_leaf_is_ordered() {
        let one = Fr::from(1u64);
        let two = Fr::from(2u64);
        assert_ne!(fri_leaf(&one, &two), fri_leaf(&two, &one));
    }
}
