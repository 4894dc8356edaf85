//! Hash addresses (ADRS) in the 8-word layout of RFC 8391 Section 2.5.
//!
//! Every hash invocation in the scheme carries an address that separates it
//! by role (OTS chain, L-tree node, Merkle-tree node) and position, so no two
//! unrelated hash calls ever see the same keying material. Addresses are
//! plain `Copy` values; each call site works on its own copy instead of a
//! shared buffer.

/// The three address types of XMSS. The value is stored in word 3.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AdrsType {
    /// Hashing along a WOTS+ chain.
    Ots = 0,
    /// Compressing a WOTS+ public key into a leaf.
    LTree = 1,
    /// Combining two Merkle-tree nodes.
    HashTree = 2,
}

/// A structured 8 x 32-bit hash address.
///
/// Word layout:
/// * word 0: layer address
/// * words 1-2: tree address (64-bit)
/// * word 3: type ([`AdrsType`])
/// * word 4: OTS address / L-tree address
/// * word 5: chain address / tree height
/// * word 6: hash address / tree index
/// * word 7: key-and-mask
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Adrs([u32; 8]);

impl From<AdrsType> for Adrs {
    /// A fresh address of the given type in the single tree at layer zero.
    fn from(adrs_type: AdrsType) -> Self {
        let mut adrs = Self([0; 8]);
        adrs.set_layer_addr(0);
        adrs.set_tree_addr(0);
        adrs.set_type(adrs_type);
        adrs
    }
}

impl Adrs {
    /// Specify which layer of a multi-tree construction we're working on.
    /// Always zero for the single-tree scheme, kept for wire compatibility.
    pub fn set_layer_addr(&mut self, layer: u32) {
        self.0[0] = layer;
    }

    /// Specify which tree within the layer we're working on.
    pub fn set_tree_addr(&mut self, tree: u64) {
        self.0[1] = (tree >> 32) as u32;
        self.0[2] = tree as u32;
    }

    /// Specify what kind of hash this address keys. Switching the type
    /// clears all type-specific words, as RFC 8391 requires.
    pub fn set_type(&mut self, adrs_type: AdrsType) {
        self.0[3] = adrs_type as u32;
        for word in self.0[4..].iter_mut() {
            *word = 0;
        }
    }

    /// Specify which OTS key pair (leaf index) we're talking about.
    pub fn set_ots_addr(&mut self, ots: u32) {
        self.0[4] = ots;
    }

    /// Specify which L-tree (leaf index) we're compressing.
    pub fn set_ltree_addr(&mut self, ltree: u32) {
        self.0[4] = ltree;
    }

    /// Specify which WOTS+ chain within the OTS key pair.
    pub fn set_chain_addr(&mut self, chain: u32) {
        self.0[5] = chain;
    }

    /// Specify the step within the WOTS+ chain.
    pub fn set_hash_addr(&mut self, hash: u32) {
        self.0[6] = hash;
    }

    /// Specify the height of a tree node (L-tree or Merkle tree).
    pub fn set_tree_height(&mut self, height: u32) {
        self.0[5] = height;
    }

    /// Specify the index of a tree node within its level.
    pub fn set_tree_index(&mut self, index: u32) {
        self.0[6] = index;
    }

    /// Select key (0) or bitmask (1, 2) derivation for the keyed hashes.
    pub fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.0[7] = key_and_mask;
    }

    /// Serialize as 32 bytes, each word big-endian.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}
