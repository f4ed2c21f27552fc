//! Reversible image scrambling along a generalized Hilbert curve.
//!
//! Pixels are visited in the order of a Gilbert curve, which covers any
//! rectangle, and each one is swapped with the pixel a golden-ratio fraction
//! further along the curve. Decrypting with the same dimensions undoes the
//! permutation exactly.
//!
//! The [`Engine`] owns a growable word arena holding the compiled index and
//! the source and destination pixels, and caches the index between calls with
//! the same dimensions.
//!
//! ```
//! use pixelcurve::{Dimensions, Engine};
//!
//! # fn main() -> pixelcurve::error::Result<()> {
//! let mut engine = Engine::new()?;
//! let dims = Dimensions::new(3, 2)?;
//! let pixels: Vec<u8> = (0..24).collect();
//! let scrambled = engine.encrypt(dims, &pixels)?;
//! assert_eq!(engine.decrypt(dims, &scrambled)?, pixels);
//! # Ok(())
//! # }
//! ```

/// Word arena and its phase state machine.
pub mod arena;
/// Arena sizing policy.
pub mod config;
/// Validated image dimensions.
pub mod dims;
/// The scrambling engine facade.
pub mod engine;
/// Error types used across the crate.
pub mod error;
/// Gilbert curve generation.
pub mod gilbert;
/// Index compilation and the permutation cache.
pub mod index;
/// Progress reporting shared across threads.
pub mod progress;
/// The golden-offset shuffle pass.
pub mod shuffle;

pub use crate::{
    config::ArenaConfig,
    dims::Dimensions,
    engine::Engine,
    error::Error,
    gilbert::{Cell, curve_path},
    progress::ProgressObserver,
    shuffle::Mode,
};
