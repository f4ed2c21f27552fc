use std::result;

use thiserror::Error;

/// Errors produced by the scrambling core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The arena would have to grow past its configured ceiling, or the
    /// allocator refused the request. The arena keeps its previous size.
    #[error("arena needs {required} bytes but is limited to {limit} bytes; try a smaller image")]
    Capacity {
        /// Bytes needed to hold the requested layout.
        required: usize,
        /// Largest size the arena may grow to.
        limit: usize,
    },
    /// A side is zero, or the pixel count does not fit the 32-bit index space.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A buffer does not hold the number of elements the operation expects.
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    BufferLength {
        /// Expected element count.
        expected: usize,
        /// Element count supplied.
        actual: usize,
    },
    /// A curve cell lies outside the row width, or its linear index does not
    /// fit in a `u32`.
    #[error("cell ({x}, {y}) has no linear index for width {width}")]
    CellOutOfRange {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Row width the index was compiled for.
        width: u32,
    },
    /// Mode integer outside `{0 = decrypt, 1 = encrypt}`.
    #[error("invalid mode {0}: expected 0 (decrypt) or 1 (encrypt)")]
    InvalidMode(u32),
    /// An arena region was requested out of order.
    #[error("arena phase error: expected {expected}, found {found}")]
    Phase {
        /// The phase the operation requires.
        expected: String,
        /// The phase the arena is actually in.
        found: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = result::Result<T, Error>;
