//! A single growable word arena holding the index permutation and both pixel
//! staging buffers.
//!
//! Layout for `N` pixels, in bytes:
//!
//! ```text
//! [ 0 .. 64KiB )               reserved base
//! [ 64KiB .. 64KiB+4N )        index region        (N u32 indices)
//! [ 64KiB+4N .. 64KiB+8N )     source region       (N RGBA words)
//! [ 64KiB+8N .. 64KiB+12N )    destination region  (N RGBA words)
//! ```
//!
//! While a permutation is being built, the source and destination regions
//! together (`2N` words) serve as scratch for the interleaved curve
//! coordinates. The regions are handed out through [`Phase`] transitions so
//! scratch can never be read as pixels, and pixels can never be loaded before
//! the index they will be shuffled with exists:
//!
//! ```text
//! scratch() ──► Curve(d) ──► index_phase().commit() ──► Indexed(d)
//!                                                          │
//!                              load_pixels() ◄─────────────┘
//!                                   │
//!                                   ▼
//!                              Loaded(d) ──► pixel_phase() / dest_bytes()
//! ```

use std::{fmt, ops::Range};

use tracing::{info, warn};

use crate::{
    config::ArenaConfig,
    dims::Dimensions,
    error::{self, Error},
};

/// Bytes reserved at the start of the arena.
pub const BASE_RESERVED: usize = 64 * 1024;

/// Bytes per arena word (one index or one RGBA pixel).
const WORD: usize = 4;

/// Region offsets for one set of dimensions.
///
/// Only [`Arena::ensure_capacity`] hands these out, so a `Layout` always fits
/// the arena it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Dimensions the layout was computed for.
    dims: Dimensions,
    /// Pixel count.
    n: usize,
}

impl Layout {
    /// Compute the layout for `dims`, or `None` if its byte size overflows.
    fn new(dims: Dimensions) -> Option<Self> {
        let n = dims.pixel_count();
        n.checked_mul(3 * WORD)?.checked_add(BASE_RESERVED)?;
        Some(Self { dims, n })
    }

    /// Dimensions this layout describes.
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Pixel count `N`.
    pub fn pixel_count(&self) -> usize {
        self.n
    }

    /// Byte range of the index region.
    pub fn index_region(&self) -> Range<usize> {
        BASE_RESERVED..BASE_RESERVED + WORD * self.n
    }

    /// Byte range of the source pixel region.
    pub fn source_region(&self) -> Range<usize> {
        let start = self.index_region().end;
        start..start + WORD * self.n
    }

    /// Byte range of the destination pixel region.
    pub fn dest_region(&self) -> Range<usize> {
        let start = self.source_region().end;
        start..start + WORD * self.n
    }

    /// Total bytes the arena must hold for this layout.
    pub fn required_bytes(&self) -> usize {
        self.dest_region().end
    }

    /// Word range of the curve scratch span (source + destination).
    fn scratch_words(&self) -> Range<usize> {
        words(self.source_region().start..self.dest_region().end)
    }
}

/// Convert a byte range into a word range.
fn words(bytes: Range<usize>) -> Range<usize> {
    bytes.start / WORD..bytes.end / WORD
}

/// What the arena's regions currently hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing meaningful.
    #[default]
    Empty,
    /// Curve scratch is live for these dimensions; the index is not.
    Curve(Dimensions),
    /// The index permutation is compiled; pixel regions are free.
    Indexed(Dimensions),
    /// Index compiled and source pixels loaded.
    Loaded(Dimensions),
}

impl Phase {
    /// Dimensions of a live index permutation, if there is one.
    pub fn indexed_dims(&self) -> Option<Dimensions> {
        match *self {
            Self::Indexed(d) | Self::Loaded(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Curve(d) => write!(f, "curve scratch for {d}"),
            Self::Indexed(d) => write!(f, "index for {d}"),
            Self::Loaded(d) => write!(f, "pixels loaded for {d}"),
        }
    }
}

/// Build a phase error.
fn phase_error(expected: Phase, found: Phase) -> Error {
    Error::Phase {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Growable word arena backing every buffer of one engine.
#[derive(Debug)]
pub struct Arena {
    /// Backing storage. Only ever grows.
    words: Vec<u32>,
    /// Sizing policy, with a normalised page size.
    config: ArenaConfig,
    /// What the regions currently hold.
    phase: Phase,
}

impl Arena {
    /// Create an arena with `config.initial_pages` pages allocated.
    pub fn new(config: ArenaConfig) -> error::Result<Self> {
        let config = ArenaConfig {
            page_size: config.page_size.max(WORD).next_multiple_of(WORD),
            ..config
        };
        let mut arena = Self {
            words: Vec::new(),
            config,
            phase: Phase::Empty,
        };
        let initial = arena.config.initial_bytes();
        arena.resize_to(initial, initial)?;
        Ok(arena)
    }

    /// Current size in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.words.len() * WORD
    }

    /// The sizing policy in effect.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// What the regions currently hold.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Grow if needed so the layout for `dims` fits, and return it.
    ///
    /// Growth appends whole pages and preserves existing contents. On
    /// failure the arena keeps its previous size and contents.
    pub fn ensure_capacity(&mut self, dims: Dimensions) -> error::Result<Layout> {
        let layout = Layout::new(dims).ok_or(Error::Capacity {
            required: usize::MAX,
            limit: self.config.max_bytes(),
        })?;
        let required = layout.required_bytes();
        if required > self.capacity_bytes() {
            let pages = required.div_ceil(self.config.page_size);
            if pages > self.config.max_pages {
                warn!(required, limit = self.config.max_bytes(), "arena growth refused");
                return Err(Error::Capacity {
                    required,
                    limit: self.config.max_bytes(),
                });
            }
            let bytes = pages
                .checked_mul(self.config.page_size)
                .ok_or(Error::Capacity {
                    required,
                    limit: self.config.max_bytes(),
                })?;
            self.resize_to(bytes, required)?;
        }
        Ok(layout)
    }

    /// Grow the backing storage to exactly `bytes`, on behalf of a request
    /// that needs `required` bytes.
    fn resize_to(&mut self, bytes: usize, required: usize) -> error::Result<()> {
        let old = self.capacity_bytes();
        let target = bytes / WORD;
        if target <= self.words.len() {
            return Ok(());
        }
        self.words
            .try_reserve_exact(target - self.words.len())
            .map_err(|_| {
                // The platform ceiling is unknown here; report what we hold.
                warn!(required, target = bytes, "allocator refused arena growth");
                Error::Capacity {
                    required,
                    limit: old,
                }
            })?;
        self.words.resize(target, 0);
        info!(old_bytes = old, new_bytes = bytes, "arena grown");
        Ok(())
    }

    /// Enter the curve phase for `layout` and return the `2N`-word scratch
    /// span. Any previously compiled index is considered gone.
    ///
    /// Fails with a capacity error, leaving the phase untouched, if `layout`
    /// does not fit this arena.
    pub fn scratch(&mut self, layout: &Layout) -> error::Result<&mut [u32]> {
        let required = layout.required_bytes();
        if required > self.capacity_bytes() {
            return Err(Error::Capacity {
                required,
                limit: self.capacity_bytes(),
            });
        }
        self.phase = Phase::Curve(layout.dims);
        Ok(&mut self.words[layout.scratch_words()])
    }

    /// Borrow the index region and the filled scratch together so the index
    /// can be compiled. Requires the curve phase for the same dimensions.
    pub fn index_phase(&mut self, layout: &Layout) -> error::Result<IndexPhase<'_>> {
        let expected = Phase::Curve(layout.dims);
        if self.phase != expected {
            return Err(phase_error(expected, self.phase));
        }
        let index_words = words(layout.index_region());
        let span = &mut self.words[index_words.start..layout.scratch_words().end];
        let (index, scratch) = span.split_at_mut(layout.n);
        Ok(IndexPhase {
            index,
            scratch,
            phase: &mut self.phase,
            dims: layout.dims,
        })
    }

    /// The compiled index permutation for `layout`.
    pub fn index(&self, layout: &Layout) -> error::Result<&[u32]> {
        if self.phase.indexed_dims() != Some(layout.dims) {
            return Err(phase_error(Phase::Indexed(layout.dims), self.phase));
        }
        Ok(&self.words[words(layout.index_region())])
    }

    /// Copy RGBA8888 bytes into the source region.
    ///
    /// Requires a compiled index for the same dimensions; this is the point
    /// at which scratch is overwritten by pixel data.
    pub fn load_pixels(&mut self, layout: &Layout, rgba: &[u8]) -> error::Result<()> {
        if self.phase.indexed_dims() != Some(layout.dims) {
            return Err(phase_error(Phase::Indexed(layout.dims), self.phase));
        }
        let expected = layout.n * WORD;
        if rgba.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: rgba.len(),
            });
        }
        let src = &mut self.words[words(layout.source_region())];
        for (word, px) in src.iter_mut().zip(rgba.chunks_exact(WORD)) {
            *word = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
        }
        self.phase = Phase::Loaded(layout.dims);
        Ok(())
    }

    /// Borrow the index, source and destination regions for a shuffle pass.
    pub fn pixel_phase(&mut self, layout: &Layout) -> error::Result<PixelPhase<'_>> {
        let expected = Phase::Loaded(layout.dims);
        if self.phase != expected {
            return Err(phase_error(expected, self.phase));
        }
        let index_words = words(layout.index_region());
        let span = &mut self.words[index_words.start..words(layout.dest_region()).end];
        let (index, rest) = span.split_at_mut(layout.n);
        let (src, dst) = rest.split_at_mut(layout.n);
        Ok(PixelPhase {
            index,
            src,
            dst,
        })
    }

    /// Copy the destination region out as RGBA8888 bytes.
    pub fn dest_bytes(&self, layout: &Layout) -> error::Result<Vec<u8>> {
        let expected = Phase::Loaded(layout.dims);
        if self.phase != expected {
            return Err(phase_error(expected, self.phase));
        }
        Ok(self.words[words(layout.dest_region())]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect())
    }
}

/// Disjoint views used while compiling the index.
#[derive(Debug)]
pub struct IndexPhase<'a> {
    /// Index region, `N` words, to be written.
    pub index: &'a mut [u32],
    /// Curve scratch, `2N` interleaved coordinate words.
    pub scratch: &'a [u32],
    /// Arena phase, advanced by [`IndexPhase::commit`].
    phase: &'a mut Phase,
    /// Dimensions being compiled.
    dims: Dimensions,
}

impl IndexPhase<'_> {
    /// Mark the index as complete. The scratch span becomes free for pixels.
    pub fn commit(self) {
        *self.phase = Phase::Indexed(self.dims);
    }
}

/// Disjoint views used by a shuffle pass.
#[derive(Debug)]
pub struct PixelPhase<'a> {
    /// The compiled permutation.
    pub index: &'a [u32],
    /// Source pixels.
    pub src: &'a [u32],
    /// Destination pixels.
    pub dst: &'a mut [u32],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(max_pages: usize) -> ArenaConfig {
        ArenaConfig {
            page_size: ArenaConfig::DEFAULT_PAGE_SIZE,
            initial_pages: 1,
            max_pages,
        }
    }

    #[test]
    fn layout_offsets() -> error::Result<()> {
        let mut arena = Arena::new(ArenaConfig::default())?;
        let layout = arena.ensure_capacity(Dimensions::new(10, 10)?)?;
        assert_eq!(layout.index_region(), 65_536..65_936);
        assert_eq!(layout.source_region(), 65_936..66_336);
        assert_eq!(layout.dest_region(), 66_336..66_736);
        assert_eq!(layout.required_bytes(), 65_536 + 1200);
        Ok(())
    }

    #[test]
    fn grows_in_whole_pages_and_keeps_contents() -> error::Result<()> {
        let mut arena = Arena::new(small_config(64))?;
        assert_eq!(arena.capacity_bytes(), 65_536);

        let small = arena.ensure_capacity(Dimensions::new(4, 4)?)?;
        arena.scratch(&small)?[0] = 0xdead_beef;
        assert_eq!(arena.capacity_bytes(), 2 * 65_536);

        let big = arena.ensure_capacity(Dimensions::new(100, 100)?)?;
        assert!(arena.capacity_bytes() >= big.required_bytes());
        assert_eq!(arena.capacity_bytes() % 65_536, 0);
        assert_eq!(arena.words[words(small.source_region()).start], 0xdead_beef);
        Ok(())
    }

    #[test]
    fn refuses_growth_past_ceiling() -> error::Result<()> {
        let mut arena = Arena::new(small_config(2))?;
        let before = arena.capacity_bytes();
        let err = arena.ensure_capacity(Dimensions::new(100, 100)?).unwrap_err();
        assert_eq!(
            err,
            Error::Capacity {
                required: 65_536 + 120_000,
                limit: 2 * 65_536
            }
        );
        assert_eq!(arena.capacity_bytes(), before);

        // A request that fits still succeeds afterwards.
        arena.ensure_capacity(Dimensions::new(8, 8)?)?;
        Ok(())
    }

    #[test]
    fn pixels_require_compiled_index() -> error::Result<()> {
        let mut arena = Arena::new(small_config(4))?;
        let layout = arena.ensure_capacity(Dimensions::new(2, 2)?)?;
        let err = arena.load_pixels(&layout, &[0; 16]).unwrap_err();
        assert!(matches!(err, Error::Phase { .. }));

        arena.scratch(&layout)?;
        assert!(arena.load_pixels(&layout, &[0; 16]).is_err());
        assert!(arena.pixel_phase(&layout).is_err());

        arena.index_phase(&layout)?.commit();
        arena.load_pixels(&layout, &[0; 16])?;
        assert_eq!(arena.phase(), Phase::Loaded(layout.dims()));
        Ok(())
    }

    #[test]
    fn index_phase_requires_matching_dimensions() -> error::Result<()> {
        let mut arena = Arena::new(small_config(4))?;
        let a = arena.ensure_capacity(Dimensions::new(2, 2)?)?;
        let b = arena.ensure_capacity(Dimensions::new(3, 2)?)?;
        arena.scratch(&a)?;
        assert!(arena.index_phase(&b).is_err());
        assert!(arena.index_phase(&a).is_ok());
        Ok(())
    }

    #[test]
    fn load_pixels_checks_length() -> error::Result<()> {
        let mut arena = Arena::new(small_config(4))?;
        let layout = arena.ensure_capacity(Dimensions::new(2, 2)?)?;
        arena.scratch(&layout)?;
        arena.index_phase(&layout)?.commit();
        let err = arena.load_pixels(&layout, &[0; 15]).unwrap_err();
        assert_eq!(
            err,
            Error::BufferLength {
                expected: 16,
                actual: 15
            }
        );
        assert_eq!(arena.phase(), Phase::Indexed(layout.dims()));
        Ok(())
    }

    #[test]
    fn pixel_views_are_disjoint_and_sized() -> error::Result<()> {
        let mut arena = Arena::new(small_config(4))?;
        let layout = arena.ensure_capacity(Dimensions::new(3, 3)?)?;
        arena.scratch(&layout)?;
        arena.index_phase(&layout)?.commit();
        let rgba: Vec<u8> = (0..36).collect();
        arena.load_pixels(&layout, &rgba)?;

        let view = arena.pixel_phase(&layout)?;
        assert_eq!(view.index.len(), 9);
        assert_eq!(view.src.len(), 9);
        assert_eq!(view.dst.len(), 9);
        assert_eq!(view.src[0], u32::from_le_bytes([0, 1, 2, 3]));
        view.dst.copy_from_slice(view.src);

        assert_eq!(arena.dest_bytes(&layout)?, rgba);
        Ok(())
    }

    #[test]
    fn allocator_refusal_reports_layout_size() -> error::Result<()> {
        let mut arena = Arena::new(ArenaConfig {
            page_size: 1 << 62,
            initial_pages: 0,
            max_pages: 4,
        })?;
        assert_eq!(arena.capacity_bytes(), 0);

        let dims = Dimensions::new(1, 1)?;
        let err = arena.ensure_capacity(dims).unwrap_err();
        assert_eq!(
            err,
            Error::Capacity {
                required: 65_536 + 12,
                limit: 0
            }
        );
        assert_eq!(arena.capacity_bytes(), 0);
        assert_eq!(arena.phase(), Phase::Empty);
        Ok(())
    }

    #[test]
    fn scratch_rejects_layout_from_larger_arena() -> error::Result<()> {
        let mut big = Arena::new(ArenaConfig::default())?;
        let layout = big.ensure_capacity(Dimensions::new(500, 500)?)?;

        let mut small = Arena::new(small_config(4))?;
        let err = small.scratch(&layout).unwrap_err();
        assert_eq!(
            err,
            Error::Capacity {
                required: layout.required_bytes(),
                limit: 65_536
            }
        );
        assert_eq!(small.phase(), Phase::Empty);
        Ok(())
    }
}
