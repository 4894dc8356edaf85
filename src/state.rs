//! Durable signature-index storage.
//!
//! The signer's leaf index is the one piece of mutable state in the scheme,
//! and re-signing at a consumed index breaks WOTS+ security outright. The
//! engine therefore commits the next index through this seam before a
//! signature is released; where the committed value lives (NVRAM, a file, a
//! database row) is the implementor's concern.

use crate::error::{Error, Result};

/// A monotonic counter with durable commit semantics.
///
/// Once `commit(next)` returns `Ok`, no later process may sign at any index
/// below `next`, even across restarts. Implementations must refuse to move
/// the counter backwards.
pub trait IndexStore {
    /// The lowest index not yet consumed by a released signature.
    fn committed(&self) -> u32;

    /// Durably record that all indices below `next` are consumed. Must be
    /// synchronous: returning `Ok` means the value survives a crash.
    fn commit(&mut self, next: u32) -> Result<()>;
}

/// Volatile [`IndexStore`] for tests and callers that manage durability at
/// a higher layer. Monotonicity is still enforced.
#[derive(Clone, Debug, Default)]
pub struct InMemoryIndex {
    committed: u32,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from an externally persisted value.
    pub fn starting_at(committed: u32) -> Self {
        Self { committed }
    }
}

impl IndexStore for InMemoryIndex {
    fn committed(&self) -> u32 {
        self.committed
    }

    fn commit(&mut self, next: u32) -> Result<()> {
        if next < self.committed {
            return Err(Error::IndexCommit(
                next,
                format!("counter already at {}", self.committed),
            ));
        }
        self.committed = next;
        Ok(())
    }
}
