//! Parameter sets. All buffer sizes in the crate derive from an
//! [`XmssParams`] value, validated once at construction.

use crate::error::{Error, Result};
use crate::hash::HashFunction;

/// Byte width of the root secret accepted by key generation. It is expanded
/// into the secret seed, the PRF seed and the public seed.
pub const ROOT_SEED_BYTES: usize = 48;

/// Byte width of the signature index on the wire (big-endian `u32`).
pub const INDEX_BYTES: usize = 4;

/// An immutable, validated XMSS parameter set.
///
/// `len1` counts the base-`w` digits covering an `n`-byte digest, `len2` the
/// digits of the checksum over them, and `len = len1 + len2` the number of
/// WOTS+ chains. A tree of height `h` serves `2^h` one-time key pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct XmssParams {
    hash: HashFunction,
    n: usize,
    w: usize,
    h: u32,
    log_w: usize,
    len1: usize,
    len2: usize,
}

impl XmssParams {
    /// Validates and derives a parameter set.
    ///
    /// `w` must be 4, 16 or 256 so digits are byte-aligned, `n` must match
    /// an output width the digest mode supports, and `h` must be in
    /// `1..=24` (the engine materializes all `2^h` leaves in memory, and
    /// the wire index is a `u32`).
    pub fn new(hash: HashFunction, n: usize, w: usize, h: u32) -> Result<Self> {
        let log_w = match w {
            4 => 2,
            16 => 4,
            256 => 8,
            _ => {
                return Err(Error::InvalidParameterSet(format!(
                    "unsupported Winternitz parameter w={}",
                    w
                )))
            }
        };
        if !hash.supports_width(n) {
            return Err(Error::InvalidParameterSet(format!(
                "hash function {:?} cannot produce n={} byte outputs",
                hash, n
            )));
        }
        if h == 0 || h > 24 {
            return Err(Error::InvalidParameterSet(format!(
                "tree height h={} outside 1..=24",
                h
            )));
        }

        let len1 = (8 * n) / log_w;
        // Number of base-w digits needed for the maximal checksum.
        let mut len2 = 0;
        let mut max_csum = len1 * (w - 1);
        while max_csum > 0 {
            max_csum >>= log_w;
            len2 += 1;
        }

        Ok(Self {
            hash,
            n,
            w,
            h,
            log_w,
            len1,
            len2,
        })
    }

    /// The common SHA-256 parameter set: `n = 32`, `w = 16`.
    pub fn sha256_w16(h: u32) -> Result<Self> {
        Self::new(HashFunction::Sha256, 32, 16, h)
    }

    pub fn hash(&self) -> HashFunction {
        self.hash
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn w(&self) -> usize {
        self.w
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn log_w(&self) -> usize {
        self.log_w
    }

    pub fn len1(&self) -> usize {
        self.len1
    }

    pub fn len2(&self) -> usize {
        self.len2
    }

    /// Number of WOTS+ chains per one-time key pair.
    pub fn len(&self) -> usize {
        self.len1 + self.len2
    }

    /// Number of one-time key pairs the tree serves.
    pub fn num_leaves(&self) -> u64 {
        1u64 << self.h
    }

    /// Byte size of a WOTS+ signature or public key.
    pub fn wots_bytes(&self) -> usize {
        self.len() * self.n
    }

    /// Byte size of an authentication path.
    pub fn auth_path_bytes(&self) -> usize {
        self.h as usize * self.n
    }

    /// Wire size of a public key: `pub_seed || root`.
    pub fn public_key_bytes(&self) -> usize {
        2 * self.n
    }

    /// Wire size of a secret key:
    /// `seed || prf_seed || pub_seed || index || root`.
    pub fn secret_key_bytes(&self) -> usize {
        4 * self.n + INDEX_BYTES
    }

    /// Wire size of a signature:
    /// `index || randomness || wots_signature || auth_path`.
    pub fn signature_bytes(&self) -> usize {
        INDEX_BYTES + self.n + self.wots_bytes() + self.auth_path_bytes()
    }
}
