//! Golden-ratio offset permutation along the curve order.
//!
//! Step `i` pairs the pixel the curve visits at position `i` with the one it
//! visits at `(i + offset) mod N`. Encrypting moves the first onto the second;
//! decrypting moves it back. Since both directions walk the same pairs, the
//! two are exact inverses.

use std::fmt;

use tracing::instrument;

use crate::{
    error::{self, Error},
    progress::Progress,
};

/// `(√5 − 1) / 2`, the fractional part of the golden ratio.
pub const GOLDEN_FRACTION: f64 = 0.618_033_988_749_895;

/// Number of progress updates per pass, roughly.
const REPORTS_PER_PASS: usize = 20;

/// Direction of a shuffle pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Restore a scrambled buffer.
    Decrypt,
    /// Scramble a buffer.
    Encrypt,
}

impl TryFrom<u32> for Mode {
    type Error = Error;

    fn try_from(value: u32) -> error::Result<Self> {
        match value {
            0 => Ok(Self::Decrypt),
            1 => Ok(Self::Encrypt),
            other => Err(Error::InvalidMode(other)),
        }
    }
}

impl From<Mode> for u32 {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Decrypt => 0,
            Mode::Encrypt => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decrypt => write!(f, "decrypt"),
            Self::Encrypt => write!(f, "encrypt"),
        }
    }
}

/// Cyclic offset between paired curve positions: `round(φ · N)`.
pub fn golden_offset(n: usize) -> usize {
    (GOLDEN_FRACTION * n as f64).round() as usize
}

/// Apply one pass of the permutation.
///
/// `index` is the compiled curve permutation; `src` is left untouched and
/// every element of `dst` is written exactly once. All three slices must have
/// the same non-zero length. `progress` is updated about twenty times and
/// finishes at 100.
#[instrument(level = "debug", skip_all, fields(n = index.len(), %mode))]
pub fn shuffle(
    mode: Mode,
    index: &[u32],
    src: &[u32],
    dst: &mut [u32],
    progress: &Progress,
) -> error::Result<()> {
    let n = index.len();
    if n == 0 {
        return Err(Error::BufferLength {
            expected: 1,
            actual: 0,
        });
    }
    for len in [src.len(), dst.len()] {
        if len != n {
            return Err(Error::BufferLength {
                expected: n,
                actual: len,
            });
        }
    }

    let offset = golden_offset(n);
    let interval = (n / REPORTS_PER_PASS).max(1);
    let mut next_report = 0;

    for i in 0..n {
        let mut j = i + offset;
        if j >= n {
            j -= n;
        }
        let p1 = index[i] as usize;
        let p2 = index[j] as usize;
        match mode {
            Mode::Encrypt => dst[p2] = src[p1],
            Mode::Decrypt => dst[p1] = src[p2],
        }

        if i == next_report {
            progress.set((i as u64 * 100 / n as u64) as u32);
            next_report += interval;
        }
    }
    progress.set(100);
    Ok(())
}
