//! Shared completion percentage for a running shuffle pass.
//!
//! One writer (the pass itself), any number of readers. Reads may be stale
//! but never torn; relaxed ordering is sufficient because the value carries
//! no data dependency.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

/// Writer side of the progress counter. Owned by the engine.
#[derive(Debug, Default)]
pub struct Progress {
    /// Last reported percentage, 0..=100.
    value: Arc<AtomicU32>,
}

impl Progress {
    /// A counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new percentage.
    pub fn set(&self, percent: u32) {
        self.value.store(percent, Ordering::Relaxed);
    }

    /// Last published percentage.
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }

    /// A read-only handle that can be moved to another thread.
    pub fn observer(&self) -> ProgressObserver {
        ProgressObserver {
            value: Arc::clone(&self.value),
        }
    }
}

/// Read-only view of a [`Progress`] counter.
#[derive(Debug, Clone)]
pub struct ProgressObserver {
    /// Shared with the writer.
    value: Arc<AtomicU32>,
}

impl ProgressObserver {
    /// Last published percentage.
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }
}
