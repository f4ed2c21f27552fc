//! Validated grid dimensions.

use std::fmt;

use crate::error::{self, Error};

/// Width and height of a pixel grid.
///
/// Both sides are positive and `width * height` fits in the signed 32-bit
/// range, so every linear index is representable as a `u32` word and every
/// coordinate (and curve extent) as an `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
}

impl Dimensions {
    /// Validate and construct a dimension pair.
    pub fn new(width: u32, height: u32) -> error::Result<Self> {
        let invalid = Error::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        match width.checked_mul(height) {
            Some(n) if n <= i32::MAX as u32 => Ok(Self { width, height }),
            _ => Err(invalid),
        }
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, `N = W * H`.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
