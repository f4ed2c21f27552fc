//! Flatten a curve path into a linear pixel permutation, and remember which
//! dimensions the current permutation belongs to.

use tracing::debug;

use crate::{
    dims::Dimensions,
    error::{self, Error},
};

/// Compile interleaved `x, y` curve words into linear indices.
///
/// `index[i] = x_i + y_i * width`. `curve` must hold exactly twice as many
/// words as `index`, and every `x` must be below `width`. Entries written
/// before an out-of-range cell is found are left in place.
pub fn compile(width: u32, curve: &[u32], index: &mut [u32]) -> error::Result<()> {
    if curve.len() != index.len() * 2 {
        return Err(Error::BufferLength {
            expected: index.len() * 2,
            actual: curve.len(),
        });
    }
    for (slot, pair) in index.iter_mut().zip(curve.chunks_exact(2)) {
        let (x, y) = (pair[0], pair[1]);
        *slot = y
            .checked_mul(width)
            .and_then(|row| row.checked_add(x))
            .filter(|_| x < width)
            .ok_or(Error::CellOutOfRange { x, y, width })?;
    }
    Ok(())
}

/// Tracks the dimensions the compiled index permutation was built for.
///
/// The rule is simple: a permutation is reusable only for the exact key it
/// was compiled under. Anything else is a miss.
#[derive(Debug, Default, Clone)]
pub struct IndexCache {
    /// Dimensions of the permutation currently held in the arena.
    key: Option<Dimensions>,
    /// Number of times a permutation has been compiled.
    compilations: u64,
}

impl IndexCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the stored permutation matches `dims`.
    pub fn is_fresh(&self, dims: Dimensions) -> bool {
        let hit = self.key == Some(dims);
        debug!(%dims, hit, "index cache lookup");
        hit
    }

    /// Record a freshly compiled permutation for `dims`.
    pub fn store(&mut self, dims: Dimensions) {
        self.key = Some(dims);
        self.compilations += 1;
    }

    /// Forget the stored permutation.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Dimensions of the stored permutation, if any.
    pub fn key(&self) -> Option<Dimensions> {
        self.key
    }

    /// How many permutations have been compiled over this cache's lifetime.
    pub fn compilations(&self) -> u64 {
        self.compilations
    }
}
