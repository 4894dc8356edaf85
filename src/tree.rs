//! Merkle authentication tree over the L-tree leaves.
//!
//! Leaves are the L-tree compressions of per-leaf WOTS+ public keys;
//! internal nodes are H of the concatenated children under a hash-tree
//! address. The tree is built bottom-up into an array of `2^(h+1)` slots
//! (leaves at `[2^h, 2^(h+1))`, root at slot 1), which yields both the root
//! and any authentication path from one pass. Leaves are independent of one
//! another and are computed on parallel workers.

use crate::adrs::{Adrs, AdrsType};
use crate::hash::XmssHasher;
use crate::ltree;
use crate::params::XmssParams;
use crate::wots::Wots;
use rayon::prelude::*;

/// Tree computation over one secret seed. Everything here is a pure
/// function of `(params, pub_seed held by the hasher, seed)`.
pub(crate) struct MerkleTree<'a> {
    params: &'a XmssParams,
    hasher: &'a XmssHasher,
    seed: &'a [u8],
}

impl<'a> MerkleTree<'a> {
    pub fn new(params: &'a XmssParams, hasher: &'a XmssHasher, seed: &'a [u8]) -> Self {
        Self {
            params,
            hasher,
            seed,
        }
    }

    /// Derives the WOTS+ chain seed for one leaf: PRF of the secret seed
    /// keyed by the leaf's OTS address with chain, hash and key-and-mask
    /// fields cleared. No two leaves share a one-time key.
    pub fn leaf_seed(&self, index: u32) -> Vec<u8> {
        let mut adrs = Adrs::from(AdrsType::Ots);
        adrs.set_ots_addr(index);
        adrs.set_chain_addr(0);
        adrs.set_hash_addr(0);
        adrs.set_key_and_mask(0);

        let mut seed = vec![0u8; self.params.n()];
        self.hasher.prf(&mut seed, &adrs.to_bytes(), self.seed);
        seed
    }

    /// Computes leaf `index`: WOTS+ public key from the per-leaf seed,
    /// compressed through the L-tree. The only place the two meet.
    pub fn leaf(&self, index: u32) -> Vec<u8> {
        let mut ots_adrs = Adrs::from(AdrsType::Ots);
        ots_adrs.set_ots_addr(index);
        let leaf_seed = self.leaf_seed(index);
        let wots = Wots::new(self.params, self.hasher);
        let wots_pk = wots.generate_public_key(&leaf_seed, ots_adrs);

        let mut ltree_adrs = Adrs::from(AdrsType::LTree);
        ltree_adrs.set_ltree_addr(index);
        ltree::compress(self.hasher, self.params, wots_pk, ltree_adrs)
    }

    /// Builds the whole tree. Slot `(2^h >> height) + index` holds node
    /// `(height, index)` counted from the leaves; slot 1 holds the root.
    fn build(&self) -> Vec<u8> {
        let n = self.params.n();
        let leaves = 1usize << self.params.h();
        let mut tree = vec![0u8; 2 * leaves * n];

        let computed: Vec<Vec<u8>> = (0..leaves as u32)
            .into_par_iter()
            .map(|i| self.leaf(i))
            .collect();
        for (slot, leaf) in tree[leaves * n..].chunks_exact_mut(n).zip(computed) {
            slot.copy_from_slice(&leaf);
        }

        let mut node_adrs = Adrs::from(AdrsType::HashTree);
        let mut parent = vec![0u8; n];
        let mut width = leaves;
        let mut height = 0u32;
        while width > 1 {
            node_adrs.set_tree_height(height);
            for j in (0..width).step_by(2) {
                node_adrs.set_tree_index((j >> 1) as u32);
                let child = (width + j) * n;
                let (left, right) = tree[child..child + 2 * n].split_at(n);
                self.hasher.hash_h(&mut parent, left, right, node_adrs);
                let parent_at = ((width >> 1) + (j >> 1)) * n;
                tree[parent_at..parent_at + n].copy_from_slice(&parent);
            }
            width >>= 1;
            height += 1;
        }
        tree
    }

    /// The tree root, i.e. node `(h, 0)`.
    pub fn root(&self) -> Vec<u8> {
        let n = self.params.n();
        self.build()[n..2 * n].to_vec()
    }

    /// The root together with the authentication path for `leaf_index`:
    /// the `h` siblings of the nodes on the path from that leaf to the root,
    /// leaf level first.
    pub fn root_and_auth_path(&self, leaf_index: u32) -> (Vec<u8>, Vec<u8>) {
        let n = self.params.n();
        let leaves = 1usize << self.params.h();
        let tree = self.build();

        let mut auth_path = Vec::with_capacity(self.params.auth_path_bytes());
        for height in 0..self.params.h() {
            let level_base = leaves >> height;
            let sibling = level_base + (((leaf_index >> height) ^ 1) as usize);
            auth_path.extend_from_slice(&tree[sibling * n..(sibling + 1) * n]);
        }
        (tree[n..2 * n].to_vec(), auth_path)
    }
}

/// Folds a leaf upward through an authentication path, hashing left or
/// right according to the bits of `leaf_index`. Reproduces the root exactly
/// when leaf and path belong to that index.
pub(crate) fn fold_auth_path(
    hasher: &XmssHasher,
    params: &XmssParams,
    leaf: &[u8],
    leaf_index: u32,
    auth_path: &[u8],
) -> Vec<u8> {
    let n = params.n();
    let mut node_adrs = Adrs::from(AdrsType::HashTree);
    let mut node = leaf.to_vec();
    let mut parent = vec![0u8; n];
    let mut idx = leaf_index;

    for (height, sibling) in auth_path.chunks_exact(n).enumerate() {
        node_adrs.set_tree_height(height as u32);
        let on_the_right = idx & 1 == 1;
        idx >>= 1;
        node_adrs.set_tree_index(idx);
        if on_the_right {
            hasher.hash_h(&mut parent, sibling, &node, node_adrs);
        } else {
            hasher.hash_h(&mut parent, &node, sibling, node_adrs);
        }
        node.copy_from_slice(&parent);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashFunction;
    use rand::rngs::OsRng;
    use rand::RngCore;

    fn setup() -> (XmssParams, XmssHasher, Vec<u8>) {
        let params = XmssParams::sha256_w16(3).unwrap();
        let mut pub_seed = [0u8; 32];
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut pub_seed);
        OsRng.fill_bytes(&mut seed);
        let hasher = XmssHasher::new(HashFunction::Sha256, 32, &pub_seed);
        (params, hasher, seed.to_vec())
    }

    #[test]
    fn every_auth_path_folds_back_to_the_root() {
        let (params, hasher, seed) = setup();
        let tree = MerkleTree::new(&params, &hasher, &seed);
        let root = tree.root();

        for index in 0..params.num_leaves() as u32 {
            let (same_root, auth_path) = tree.root_and_auth_path(index);
            assert_eq!(same_root, root);

            let leaf = tree.leaf(index);
            assert_eq!(fold_auth_path(&hasher, &params, &leaf, index, &auth_path), root);
        }
    }

    #[test]
    fn leaves_are_pairwise_distinct() {
        let (params, hasher, seed) = setup();
        let tree = MerkleTree::new(&params, &hasher, &seed);
        let leaves: Vec<Vec<u8>> = (0..params.num_leaves() as u32)
            .map(|i| tree.leaf(i))
            .collect();
        for (i, a) in leaves.iter().enumerate() {
            for b in leaves.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn leaf_seeds_differ_per_index() {
        let (params, hasher, seed) = setup();
        let tree = MerkleTree::new(&params, &hasher, &seed);
        assert_ne!(tree.leaf_seed(0), tree.leaf_seed(1));
    }

    #[test]
    fn wrong_index_fails_to_fold() {
        let (params, hasher, seed) = setup();
        let tree = MerkleTree::new(&params, &hasher, &seed);
        let root = tree.root();
        let (_, auth_path) = tree.root_and_auth_path(2);
        let leaf = tree.leaf(2);
        assert_ne!(fold_auth_path(&hasher, &params, &leaf, 3, &auth_path), root);
    }
}
