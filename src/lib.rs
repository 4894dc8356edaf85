//! # xmss-core
//!
//! A stateful XMSS signature engine: WOTS+ one-time signatures, L-tree leaf
//! compression and a Merkle authentication tree, orchestrated behind a
//! deterministic keygen/sign/verify surface. Single tree only; multi-tree
//! (XMSS^MT) and BDS traversal caching are out of scope.
//!
//! Signing consumes one-time keys: the leaf index must never repeat, so the
//! signer commits it through an [`IndexStore`] before a signature is
//! released.

mod adrs;
mod error;
mod hash;
mod ltree;
mod state;
mod tree;
mod utils;
mod wots;

pub mod params;
pub mod xmss;

pub use crate::error::{Error, Result};
pub use crate::hash::HashFunction;
pub use crate::params::{XmssParams, INDEX_BYTES, ROOT_SEED_BYTES};
pub use crate::state::{InMemoryIndex, IndexStore};
pub use crate::xmss::{PublicKey, SecretKey, Signature, Xmss};
