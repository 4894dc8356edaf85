//! L-tree compression: folds the `len` chain-end values of a WOTS+ public
//! key into the single `n`-byte leaf of the Merkle tree.
//!
//! Adjacent values are paired and compressed with H; an odd value at the end
//! of a level is carried forward unchanged rather than hashed with itself.
//! The address tracks level (tree height) and pair position (tree index) so
//! every internal call stays domain-separated.

use crate::adrs::Adrs;
use crate::hash::XmssHasher;
use crate::params::XmssParams;

/// Compresses a WOTS+ public key (`len * n` bytes, consumed) into one
/// `n`-byte value under an L-tree-typed address.
pub(crate) fn compress(
    hasher: &XmssHasher,
    params: &XmssParams,
    mut nodes: Vec<u8>,
    mut adrs: Adrs,
) -> Vec<u8> {
    let n = params.n();
    let mut width = params.len();
    let mut parent = vec![0u8; n];

    adrs.set_tree_height(0);
    let mut height = 0;
    while width > 1 {
        let bound = width >> 1;
        for i in 0..bound {
            adrs.set_tree_index(i as u32);
            let (left, right) = nodes[2 * i * n..(2 * i + 2) * n].split_at(n);
            hasher.hash_h(&mut parent, left, right, adrs);
            nodes[i * n..(i + 1) * n].copy_from_slice(&parent);
        }
        if width & 1 == 1 {
            nodes.copy_within((width - 1) * n..width * n, bound * n);
            width = bound + 1;
        } else {
            width = bound;
        }
        height += 1;
        adrs.set_tree_height(height);
    }

    nodes.truncate(n);
    nodes
}
