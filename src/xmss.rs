//! # XMSS: key generation, signing, verification
//!
//! The orchestrator over WOTS+, the L-tree and the Merkle tree. A key pair
//! serves `2^h` one-time signatures; the secret key's leaf index is the only
//! mutable state and moves strictly forward, committed through an
//! [`IndexStore`] before every signature is released.
//!
//! Key generation is deterministic: two engines given the same 48-byte root
//! seed produce byte-identical keys, and signing at the same index yields
//! byte-identical signatures. That determinism is the cross-implementation
//! contract the scheme is tested against.

use crate::adrs::{Adrs, AdrsType};
use crate::error::{Error, Result};
use crate::hash::{expand_root_seed, XmssHasher};
use crate::ltree;
use crate::params::{XmssParams, INDEX_BYTES, ROOT_SEED_BYTES};
use crate::state::IndexStore;
use crate::tree::{fold_auth_path, MerkleTree};
use crate::utils::{bytes_to_u32, u32_to_bytes};
use crate::wots::Wots;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Signer state. `index` is the next unused leaf; it only ever increases.
/// Secret material is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    seed: Vec<u8>,
    prf_seed: Vec<u8>,
    pub_seed: Vec<u8>,
    index: u32,
    root: Vec<u8>,
}

impl SecretKey {
    /// The next unused leaf index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The verification key this secret key answers to.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            pub_seed: self.pub_seed.clone(),
            root: self.root.clone(),
        }
    }

    /// Serializes as `seed || prf_seed || pub_seed || index || root`,
    /// index big-endian. The caller owns keeping these bytes secret.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 * self.seed.len() + INDEX_BYTES);
        out.extend_from_slice(&self.seed);
        out.extend_from_slice(&self.prf_seed);
        out.extend_from_slice(&self.pub_seed);
        out.extend_from_slice(&u32_to_bytes(self.index));
        out.extend_from_slice(&self.root);
        out
    }

    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        if bytes.len() != params.secret_key_bytes() {
            return Err(Error::BadLength(params.secret_key_bytes(), bytes.len()));
        }
        Ok(Self {
            seed: bytes[..n].to_vec(),
            prf_seed: bytes[n..2 * n].to_vec(),
            pub_seed: bytes[2 * n..3 * n].to_vec(),
            index: bytes_to_u32(&bytes[3 * n..3 * n + INDEX_BYTES]),
            root: bytes[3 * n + INDEX_BYTES..].to_vec(),
        })
    }
}

/// Verification key: the public seed and the tree root. Immutable and
/// freely shareable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub_seed: Vec<u8>,
    root: Vec<u8>,
}

impl PublicKey {
    pub fn pub_seed(&self) -> &[u8] {
        &self.pub_seed
    }

    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// Serializes as `pub_seed || root`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * self.pub_seed.len());
        out.extend_from_slice(&self.pub_seed);
        out.extend_from_slice(&self.root);
        out
    }

    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        if bytes.len() != params.public_key_bytes() {
            return Err(Error::BadLength(params.public_key_bytes(), bytes.len()));
        }
        Ok(Self {
            pub_seed: bytes[..n].to_vec(),
            root: bytes[n..].to_vec(),
        })
    }
}

/// A self-contained signature: verification needs only this, the message
/// and the public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    index: u32,
    randomness: Vec<u8>,
    wots_signature: Vec<u8>,
    auth_path: Vec<u8>,
}

impl Signature {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn randomness(&self) -> &[u8] {
        &self.randomness
    }

    pub fn wots_signature(&self) -> &[u8] {
        &self.wots_signature
    }

    pub fn auth_path(&self) -> &[u8] {
        &self.auth_path
    }

    /// Serializes as `index || randomness || wots_signature || auth_path`,
    /// index big-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            INDEX_BYTES + self.randomness.len() + self.wots_signature.len() + self.auth_path.len(),
        );
        out.extend_from_slice(&u32_to_bytes(self.index));
        out.extend_from_slice(&self.randomness);
        out.extend_from_slice(&self.wots_signature);
        out.extend_from_slice(&self.auth_path);
        out
    }

    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        if bytes.len() != params.signature_bytes() {
            return Err(Error::BadLength(params.signature_bytes(), bytes.len()));
        }
        let wots_end = INDEX_BYTES + n + params.wots_bytes();
        Ok(Self {
            index: bytes_to_u32(&bytes[..INDEX_BYTES]),
            randomness: bytes[INDEX_BYTES..INDEX_BYTES + n].to_vec(),
            wots_signature: bytes[INDEX_BYTES + n..wots_end].to_vec(),
            auth_path: bytes[wots_end..].to_vec(),
        })
    }
}

/// The XMSS engine for one parameter set.
pub struct Xmss {
    params: XmssParams,
}

impl Xmss {
    pub fn new(params: XmssParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// Samples a fresh root seed from the operating system RNG.
    pub fn random_root_seed() -> [u8; ROOT_SEED_BYTES] {
        let mut seed = [0u8; ROOT_SEED_BYTES];
        OsRng.fill_bytes(&mut seed);
        seed
    }

    /// Derives a key pair from a root seed.
    ///
    /// The seed is expanded with SHAKE-256 into
    /// `seed || prf_seed || pub_seed`; the tree root over all `2^h` leaves
    /// becomes the public key. Byte-identical across calls and across
    /// implementations for equal seeds.
    pub fn generate(&self, root_seed: &[u8; ROOT_SEED_BYTES]) -> (SecretKey, PublicKey) {
        let n = self.params.n();
        let mut material = vec![0u8; 3 * n];
        expand_root_seed(&mut material, root_seed);
        let (seed, rest) = material.split_at(n);
        let (prf_seed, pub_seed) = rest.split_at(n);

        let hasher = XmssHasher::new(self.params.hash(), n, pub_seed);
        let root = MerkleTree::new(&self.params, &hasher, seed).root();

        let secret_key = SecretKey {
            seed: seed.to_vec(),
            prf_seed: prf_seed.to_vec(),
            pub_seed: pub_seed.to_vec(),
            index: 0,
            root: root.clone(),
        };
        let public_key = PublicKey {
            pub_seed: pub_seed.to_vec(),
            root,
        };
        material.zeroize();
        (secret_key, public_key)
    }

    /// Signs `message` at the next unused leaf index.
    ///
    /// The index is taken as the maximum of the in-memory counter and the
    /// store's committed floor, so a secret key deserialized from a stale
    /// snapshot cannot reuse a leaf. The advanced index is committed to the
    /// store before the signature is returned; if the commit fails, no
    /// signature is released and the key is unchanged.
    pub fn sign<S: IndexStore + ?Sized>(
        &self,
        message: &[u8],
        secret_key: &mut SecretKey,
        store: &mut S,
    ) -> Result<Signature> {
        let index = secret_key.index.max(store.committed());
        if u64::from(index) >= self.params.num_leaves() {
            return Err(Error::KeyExhausted(index));
        }
        let n = self.params.n();
        let hasher = XmssHasher::new(self.params.hash(), n, &secret_key.pub_seed);

        let mut randomness = vec![0u8; n];
        hasher.prf_counter(&mut randomness, u64::from(index), &secret_key.prf_seed);

        let mut digest = vec![0u8; n];
        hasher.h_msg(&mut digest, &randomness, &secret_key.root, index, message);

        let mut ots_adrs = Adrs::from(AdrsType::Ots);
        ots_adrs.set_ots_addr(index);
        let tree = MerkleTree::new(&self.params, &hasher, &secret_key.seed);
        let mut leaf_seed = tree.leaf_seed(index);
        let wots = Wots::new(&self.params, &hasher);
        let wots_signature = wots.sign(&digest, &leaf_seed, ots_adrs);
        leaf_seed.zeroize();

        let (_, auth_path) = tree.root_and_auth_path(index);

        // The commit is the point of no return: only after the store has
        // durably recorded index + 1 may the one-time key count as spent.
        store.commit(index + 1)?;
        secret_key.index = index + 1;

        Ok(Signature {
            index,
            randomness,
            wots_signature,
            auth_path,
        })
    }

    /// Verifies `signature` over `message` against `public_key`.
    ///
    /// Pure and total: every malformed or mismatching input yields `false`,
    /// never a panic or an error.
    pub fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        let n = self.params.n();
        if u64::from(signature.index) >= self.params.num_leaves()
            || signature.randomness.len() != n
            || signature.wots_signature.len() != self.params.wots_bytes()
            || signature.auth_path.len() != self.params.auth_path_bytes()
            || public_key.pub_seed.len() != n
            || public_key.root.len() != n
        {
            return false;
        }

        let hasher = XmssHasher::new(self.params.hash(), n, &public_key.pub_seed);
        let mut digest = vec![0u8; n];
        hasher.h_msg(
            &mut digest,
            &signature.randomness,
            &public_key.root,
            signature.index,
            message,
        );

        let mut ots_adrs = Adrs::from(AdrsType::Ots);
        ots_adrs.set_ots_addr(signature.index);
        let wots = Wots::new(&self.params, &hasher);
        let wots_pk = wots.recover_public_key(&digest, &signature.wots_signature, ots_adrs);

        let mut ltree_adrs = Adrs::from(AdrsType::LTree);
        ltree_adrs.set_ltree_addr(signature.index);
        let leaf = ltree::compress(&hasher, &self.params, wots_pk, ltree_adrs);

        let computed_root = fold_auth_path(
            &hasher,
            &self.params,
            &leaf,
            signature.index,
            &signature.auth_path,
        );
        computed_root == public_key.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashFunction;
    use crate::state::InMemoryIndex;

    struct FailingStore;

    impl IndexStore for FailingStore {
        fn committed(&self) -> u32 {
            0
        }

        fn commit(&mut self, next: u32) -> Result<()> {
            Err(Error::IndexCommit(next, "backing store offline".into()))
        }
    }

    fn engine(h: u32) -> Xmss {
        Xmss::new(XmssParams::sha256_w16(h).unwrap())
    }

    #[test]
    fn generation_is_deterministic_across_engines() {
        let seed = [0u8; ROOT_SEED_BYTES];
        let (sk_a, pk_a) = engine(4).generate(&seed);
        let (sk_b, pk_b) = engine(4).generate(&seed);
        assert_eq!(sk_a.to_bytes(), sk_b.to_bytes());
        assert_eq!(pk_a.to_bytes(), pk_b.to_bytes());

        let (_, pk_other) = engine(4).generate(&[1u8; ROOT_SEED_BYTES]);
        assert_ne!(pk_a, pk_other);
    }

    #[test]
    fn signatures_at_equal_indices_are_byte_identical() {
        // Zero seed, zero 32-byte message, sixth signature (index 5):
        // two independent engines must agree byte for byte.
        let seed = [0u8; ROOT_SEED_BYTES];
        let message = [0u8; 32];

        let mut signatures = Vec::new();
        for _ in 0..2 {
            let xmss = engine(4);
            let (mut sk, _) = xmss.generate(&seed);
            let mut store = InMemoryIndex::new();
            for _ in 0..5 {
                xmss.sign(&message, &mut sk, &mut store).unwrap();
            }
            let sig = xmss.sign(&message, &mut sk, &mut store).unwrap();
            assert_eq!(sig.index(), 5);
            signatures.push(sig.to_bytes());
        }
        assert_eq!(signatures[0], signatures[1]);
    }

    #[test]
    fn sign_verify_roundtrip_at_every_index() {
        let xmss = engine(3);
        let (mut sk, pk) = xmss.generate(&Xmss::random_root_seed());
        let mut store = InMemoryIndex::new();

        for i in 0..xmss.params().num_leaves() as u32 {
            let message = i.to_be_bytes();
            let sig = xmss.sign(&message, &mut sk, &mut store).unwrap();
            assert_eq!(sig.index(), i);
            assert_eq!(store.committed(), i + 1);
            assert!(xmss.verify(&message, &sig, &pk));
        }
    }

    #[test]
    fn verification_rejects_single_bit_tampering() {
        let xmss = engine(2);
        let (mut sk, pk) = xmss.generate(&Xmss::random_root_seed());
        let mut store = InMemoryIndex::new();
        let message = b"settlement batch 884";
        let sig = xmss.sign(message, &mut sk, &mut store).unwrap();
        assert!(xmss.verify(message, &sig, &pk));

        let mut tampered = sig.clone();
        tampered.wots_signature[17] ^= 1;
        assert!(!xmss.verify(message, &tampered, &pk));

        let mut tampered = sig.clone();
        tampered.auth_path[5] ^= 0x80;
        assert!(!xmss.verify(message, &tampered, &pk));

        let mut tampered = sig.clone();
        tampered.randomness[0] ^= 1;
        assert!(!xmss.verify(message, &tampered, &pk));

        assert!(!xmss.verify(b"settlement batch 885", &sig, &pk));
    }

    #[test]
    fn signature_does_not_verify_under_a_foreign_key() {
        let xmss = engine(2);
        let (mut sk, _) = xmss.generate(&Xmss::random_root_seed());
        let (_, other_pk) = xmss.generate(&Xmss::random_root_seed());
        let mut store = InMemoryIndex::new();
        let sig = xmss.sign(b"msg", &mut sk, &mut store).unwrap();
        assert!(!xmss.verify(b"msg", &sig, &other_pk));
    }

    #[test]
    fn key_exhausts_after_all_leaves() {
        let xmss = engine(2);
        let (mut sk, pk) = xmss.generate(&Xmss::random_root_seed());
        let mut store = InMemoryIndex::new();

        for _ in 0..4 {
            let sig = xmss.sign(b"m", &mut sk, &mut store).unwrap();
            assert!(xmss.verify(b"m", &sig, &pk));
        }
        assert_eq!(
            xmss.sign(b"m", &mut sk, &mut store),
            Err(Error::KeyExhausted(4))
        );
    }

    #[test]
    fn commit_failure_withholds_the_signature() {
        let xmss = engine(2);
        let (mut sk, _) = xmss.generate(&Xmss::random_root_seed());
        let result = xmss.sign(b"m", &mut sk, &mut FailingStore);
        assert!(matches!(result, Err(Error::IndexCommit(1, _))));
        assert_eq!(sk.index(), 0);
    }

    #[test]
    fn stale_secret_key_skips_committed_indices() {
        let xmss = engine(3);
        let (mut sk, pk) = xmss.generate(&Xmss::random_root_seed());
        // A restart restored an old key snapshot, but the store knows
        // indices below 3 are spent.
        let mut store = InMemoryIndex::starting_at(3);
        let sig = xmss.sign(b"m", &mut sk, &mut store).unwrap();
        assert_eq!(sig.index(), 3);
        assert_eq!(sk.index(), 4);
        assert!(xmss.verify(b"m", &sig, &pk));
    }

    #[test]
    fn wire_roundtrips() {
        let xmss = engine(2);
        let params = *xmss.params();
        let (mut sk, pk) = xmss.generate(&Xmss::random_root_seed());
        let mut store = InMemoryIndex::new();
        let sig = xmss.sign(b"wire", &mut sk, &mut store).unwrap();

        let sk_bytes = sk.to_bytes();
        assert_eq!(sk_bytes.len(), params.secret_key_bytes());
        assert_eq!(
            SecretKey::from_bytes(&params, &sk_bytes).unwrap().to_bytes(),
            sk_bytes
        );

        let pk_bytes = pk.to_bytes();
        assert_eq!(pk_bytes.len(), params.public_key_bytes());
        assert_eq!(PublicKey::from_bytes(&params, &pk_bytes).unwrap(), pk);

        let sig_bytes = sig.to_bytes();
        assert_eq!(sig_bytes.len(), params.signature_bytes());
        assert_eq!(Signature::from_bytes(&params, &sig_bytes).unwrap(), sig);

        assert_eq!(
            PublicKey::from_bytes(&params, &pk_bytes[1..]),
            Err(Error::BadLength(params.public_key_bytes(), pk_bytes.len() - 1))
        );
    }

    #[test]
    fn shake256_mode_roundtrip() {
        let params = XmssParams::new(HashFunction::Shake256, 32, 16, 2).unwrap();
        let xmss = Xmss::new(params);
        let (mut sk, pk) = xmss.generate(&[3u8; ROOT_SEED_BYTES]);
        let mut store = InMemoryIndex::new();
        let sig = xmss.sign(b"shake", &mut sk, &mut store).unwrap();
        assert!(xmss.verify(b"shake", &sig, &pk));
        assert!(!xmss.verify(b"shaken", &sig, &pk));
    }
}
