//! Domain-separated hash adapters over the external digest primitive.
//!
//! Every construction is `core_hash(type, key, input)` =
//! `digest(toByte(type, n) || key || input)` with the type tags of RFC 8391
//! Section 5.1: 0 for F, 1 for H, 2 for H_msg and 3 for PRF. F and H run in
//! robust mode: address-derived key and bitmasks, input XOR-ed with the
//! bitmask before compression.

use crate::adrs::Adrs;
use crate::utils::to_byte;
use sha2::{Digest, Sha256};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

const PAD_F: u64 = 0;
const PAD_H: u64 = 1;
const PAD_H_MSG: u64 = 2;
const PAD_PRF: u64 = 3;

/// The digest primitive backing all domain-separated hashes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HashFunction {
    Sha256,
    Shake128,
    Shake256,
}

impl HashFunction {
    /// Output widths the primitive can serve as the scheme's `n`.
    pub(crate) fn supports_width(self, n: usize) -> bool {
        match self {
            HashFunction::Sha256 | HashFunction::Shake128 => n == 32,
            HashFunction::Shake256 => n == 32 || n == 64,
        }
    }
}

/// Expands a root secret into `out.len()` bytes of key material with
/// SHAKE-256, independent of the tree hash mode. Two implementations fed the
/// same root seed must derive byte-identical `seed || prf_seed || pub_seed`.
pub(crate) fn expand_root_seed(out: &mut [u8], root_seed: &[u8]) {
    let mut hasher = Shake256::default();
    hasher.update(root_seed);
    let mut reader = hasher.finalize_xof();
    reader.read(out);
}

/// Keyed hashing context: the digest mode, the output width `n` and the
/// public seed all keyed hashes derive their masks from.
#[derive(Clone, Debug)]
pub(crate) struct XmssHasher {
    func: HashFunction,
    n: usize,
    pub_seed: Vec<u8>,
}

impl XmssHasher {
    pub fn new(func: HashFunction, n: usize, pub_seed: &[u8]) -> Self {
        Self {
            func,
            n,
            pub_seed: pub_seed.to_vec(),
        }
    }

    fn core_hash(&self, out: &mut [u8], pad: u64, key: &[u8], input: &[u8]) {
        let mut prefix = vec![0u8; self.n];
        to_byte(&mut prefix, pad);
        match self.func {
            HashFunction::Sha256 => {
                let mut hasher = Sha256::new();
                Digest::update(&mut hasher, &prefix);
                Digest::update(&mut hasher, key);
                Digest::update(&mut hasher, input);
                let digest = hasher.finalize();
                out[..self.n].copy_from_slice(&digest[..self.n]);
            }
            HashFunction::Shake128 => {
                let mut hasher = Shake128::default();
                hasher.update(&prefix);
                hasher.update(key);
                hasher.update(input);
                let mut reader = hasher.finalize_xof();
                reader.read(out[..self.n].as_mut());
            }
            HashFunction::Shake256 => {
                let mut hasher = Shake256::default();
                hasher.update(&prefix);
                hasher.update(key);
                hasher.update(input);
                let mut reader = hasher.finalize_xof();
                reader.read(out[..self.n].as_mut());
            }
        }
    }

    /// PRF(key, in) over a fixed 32-byte input block (a serialized address
    /// or a chain counter).
    pub fn prf(&self, out: &mut [u8], input32: &[u8], key: &[u8]) {
        self.core_hash(out, PAD_PRF, key, input32[..32].as_ref());
    }

    /// PRF over the big-endian 32-byte encoding of a leaf index. Used for
    /// message randomness and WOTS+ chain-seed expansion.
    pub fn prf_counter(&self, out: &mut [u8], counter: u64, key: &[u8]) {
        let mut block = [0u8; 32];
        to_byte(&mut block, counter);
        self.prf(out, &block, key);
    }

    /// One-step chain function F, in place. Key and bitmask are derived from
    /// the public seed under the key-and-mask variants of `adrs`.
    pub fn hash_f(&self, inout: &mut [u8], adrs: Adrs) {
        let n = self.n;
        let mut key = vec![0u8; n];
        let mut bitmask = vec![0u8; n];
        let mut a = adrs;
        a.set_key_and_mask(0);
        self.prf(&mut key, &a.to_bytes(), &self.pub_seed);
        a.set_key_and_mask(1);
        self.prf(&mut bitmask, &a.to_bytes(), &self.pub_seed);

        let masked: Vec<u8> = inout[..n]
            .iter()
            .zip(bitmask.iter())
            .map(|(x, m)| x ^ m)
            .collect();
        self.core_hash(inout, PAD_F, &key, &masked);
    }

    /// Two-to-one compression H for L-tree and Merkle-tree nodes. The
    /// bitmask covers both children (key-and-mask 1 and 2).
    pub fn hash_h(&self, out: &mut [u8], left: &[u8], right: &[u8], adrs: Adrs) {
        let n = self.n;
        let mut key = vec![0u8; n];
        let mut bitmask = vec![0u8; 2 * n];
        let mut a = adrs;
        a.set_key_and_mask(0);
        self.prf(&mut key, &a.to_bytes(), &self.pub_seed);
        a.set_key_and_mask(1);
        self.prf(&mut bitmask[..n], &a.to_bytes(), &self.pub_seed);
        a.set_key_and_mask(2);
        self.prf(&mut bitmask[n..], &a.to_bytes(), &self.pub_seed);

        let mut masked = vec![0u8; 2 * n];
        for (slot, (x, m)) in masked
            .iter_mut()
            .zip(left.iter().chain(right.iter()).zip(bitmask.iter()))
        {
            *slot = x ^ m;
        }
        self.core_hash(out, PAD_H, &key, &masked);
    }

    /// Randomized message digest H_msg, keyed by
    /// `randomness || root || toByte(index, n)`.
    pub fn h_msg(&self, out: &mut [u8], randomness: &[u8], root: &[u8], index: u32, message: &[u8]) {
        let n = self.n;
        let mut key = vec![0u8; 3 * n];
        key[..n].copy_from_slice(&randomness[..n]);
        key[n..2 * n].copy_from_slice(&root[..n]);
        to_byte(&mut key[2 * n..], u64::from(index));
        self.core_hash(out, PAD_H_MSG, &key, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrs::AdrsType;

    fn hasher() -> XmssHasher {
        XmssHasher::new(HashFunction::Sha256, 32, &[0u8; 32])
    }

    #[test]
    fn root_seed_expansion_is_deterministic() {
        let mut a = [0u8; 96];
        let mut b = [0u8; 96];
        expand_root_seed(&mut a, &[7u8; 48]);
        expand_root_seed(&mut b, &[7u8; 48]);
        assert_eq!(a, b);
        expand_root_seed(&mut b, &[8u8; 48]);
        assert_ne!(a, b);
    }

    #[test]
    fn prf_separates_by_address() {
        let h = hasher();
        let mut ots = Adrs::from(AdrsType::Ots);
        ots.set_ots_addr(1);
        let mut ltree = Adrs::from(AdrsType::LTree);
        ltree.set_ltree_addr(1);

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        h.prf(&mut out_a, &ots.to_bytes(), &[1u8; 32]);
        h.prf(&mut out_b, &ltree.to_bytes(), &[1u8; 32]);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn f_and_h_disagree_on_identical_addresses() {
        let h = hasher();
        let adrs = Adrs::from(AdrsType::HashTree);
        let mut chained = [3u8; 32];
        h.hash_f(&mut chained, adrs);

        let mut compressed = [0u8; 32];
        h.hash_h(&mut compressed, &[3u8; 32], &[0u8; 32], adrs);
        assert_ne!(chained, compressed);
    }

    #[test]
    fn h_depends_on_child_order() {
        let h = hasher();
        let adrs = Adrs::from(AdrsType::HashTree);
        let left = [1u8; 32];
        let right = [2u8; 32];
        let mut ab = [0u8; 32];
        let mut ba = [0u8; 32];
        h.hash_h(&mut ab, &left, &right, adrs);
        h.hash_h(&mut ba, &right, &left, adrs);
        assert_ne!(ab, ba);
    }

    #[test]
    fn h_msg_binds_the_index() {
        let h = hasher();
        let mut d0 = [0u8; 32];
        let mut d1 = [0u8; 32];
        h.h_msg(&mut d0, &[0u8; 32], &[0u8; 32], 0, b"message");
        h.h_msg(&mut d1, &[0u8; 32], &[0u8; 32], 1, b"message");
        assert_ne!(d0, d1);
    }
}
