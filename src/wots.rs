//! # Winternitz One-Time Signature Plus (WOTS+)
//!
//! One-time signatures built from hash chains. A key pair is `len` chains of
//! `n`-byte values; signing walks each chain partially according to the
//! base-`w` digits of the digest plus a checksum, and verification walks the
//! remaining steps to reconstruct the chain ends.
//!
//! Every operation is a pure function of the chain seed, the public seed
//! (held by the hasher) and an OTS-typed address. Nothing is persisted;
//! key material is recomputed per leaf index. Each key pair must sign at
//! most one digest.

use crate::adrs::Adrs;
use crate::hash::XmssHasher;
use crate::params::XmssParams;
use crate::utils::to_byte;

/// WOTS+ operations for one parameter set, borrowing the keyed hasher.
pub(crate) struct Wots<'a> {
    params: &'a XmssParams,
    hasher: &'a XmssHasher,
}

impl<'a> Wots<'a> {
    pub fn new(params: &'a XmssParams, hasher: &'a XmssHasher) -> Self {
        Self { params, hasher }
    }

    /// Derives the `len` chain-start values from the chain seed:
    /// chain `i` starts at `PRF(seed, toByte(i, 32))`.
    fn expand_seed(&self, seed: &[u8]) -> Vec<u8> {
        let n = self.params.n();
        let mut expanded = vec![0u8; self.params.wots_bytes()];
        for (i, chunk) in expanded.chunks_exact_mut(n).enumerate() {
            self.hasher.prf_counter(chunk, i as u64, seed);
        }
        expanded
    }

    /// Walks the chain function in place: applies F for steps
    /// `start..start+steps`, capped at `w`, with the hash address tracking
    /// the step. Zero steps leaves the value unchanged.
    fn chain(&self, value: &mut [u8], start: usize, steps: usize, mut adrs: Adrs) {
        for i in start..start + steps {
            if i >= self.params.w() {
                break;
            }
            adrs.set_hash_addr(i as u32);
            self.hasher.hash_f(value, adrs);
        }
    }

    /// Converts bytes into base-`w` digits, most significant bits first.
    fn base_w(&self, output: &mut [u32], input: &[u8]) {
        let log_w = self.params.log_w();
        let mask = (self.params.w() - 1) as u8;
        let mut bits = 0;
        let mut total: u8 = 0;
        let mut input_index = 0;

        for out in output.iter_mut() {
            if bits == 0 {
                total = input[input_index];
                input_index += 1;
                bits = 8;
            }
            bits -= log_w;
            *out = ((total >> bits) & mask) as u32;
        }
    }

    /// Digit pipeline shared by signing and recovery: the `len1` message
    /// digits followed by the `len2` checksum digits. The checksum
    /// `sum(w - 1 - digit)` binds the digit values so raising any digit
    /// without lowering another is detectable.
    fn chain_lengths(&self, digest: &[u8]) -> Vec<u32> {
        let p = self.params;
        let mut lengths = vec![0u32; p.len()];
        self.base_w(&mut lengths[..p.len1()], digest);

        let mut csum: u64 = lengths[..p.len1()]
            .iter()
            .map(|&d| (p.w() as u64 - 1) - u64::from(d))
            .sum();

        // Left-align the checksum bits before the base-w conversion.
        csum <<= (8 - (p.len2() * p.log_w()) % 8) % 8;
        let mut csum_bytes = vec![0u8; (p.len2() * p.log_w() + 7) / 8];
        to_byte(&mut csum_bytes, csum);

        let mut csum_digits = vec![0u32; p.len2()];
        self.base_w(&mut csum_digits, &csum_bytes);
        lengths[p.len1()..].copy_from_slice(&csum_digits);
        lengths
    }

    /// Derives the full public key: every chain walked from its seed value
    /// to the end (`w - 1` steps).
    pub fn generate_public_key(&self, seed: &[u8], adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let w = self.params.w();
        let mut pk = self.expand_seed(seed);
        for (i, chunk) in pk.chunks_exact_mut(n).enumerate() {
            let mut chain_adrs = adrs;
            chain_adrs.set_chain_addr(i as u32);
            self.chain(chunk, 0, w - 1, chain_adrs);
        }
        pk
    }

    /// Signs an `n`-byte digest: chain `i` walked `digit_i` steps from its
    /// seed value.
    pub fn sign(&self, digest: &[u8], seed: &[u8], adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let lengths = self.chain_lengths(digest);
        let mut signature = self.expand_seed(seed);
        for (i, chunk) in signature.chunks_exact_mut(n).enumerate() {
            let mut chain_adrs = adrs;
            chain_adrs.set_chain_addr(i as u32);
            self.chain(chunk, 0, lengths[i] as usize, chain_adrs);
        }
        signature
    }

    /// Recovers the public key a signature commits to: chain `i` walked the
    /// remaining `w - 1 - digit_i` steps from the signature value. Equal to
    /// [`Self::generate_public_key`] output exactly when the signature was
    /// produced for the same digest and seeds.
    pub fn recover_public_key(&self, digest: &[u8], signature: &[u8], adrs: Adrs) -> Vec<u8> {
        let n = self.params.n();
        let w = self.params.w();
        let lengths = self.chain_lengths(digest);
        let mut pk = signature[..self.params.wots_bytes()].to_vec();
        for (i, chunk) in pk.chunks_exact_mut(n).enumerate() {
            let start = lengths[i] as usize;
            let mut chain_adrs = adrs;
            chain_adrs.set_chain_addr(i as u32);
            self.chain(chunk, start, w - 1 - start, chain_adrs);
        }
        pk
    }
}
