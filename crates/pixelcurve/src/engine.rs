//! The engine ties the arena, the index cache and the progress counter
//! together behind one `&mut self` API, so at most one request is ever in
//! flight per instance.

use tracing::debug;

use crate::{
    arena::{Arena, Layout},
    config::ArenaConfig,
    dims::Dimensions,
    error::{self, Error},
    gilbert::{InterleavedSink, gilbert2d},
    index::{self, IndexCache},
    progress::{Progress, ProgressObserver},
    shuffle::{Mode, shuffle},
};

/// A scrambling engine with its own arena and permutation cache.
#[derive(Debug)]
pub struct Engine {
    /// Backing storage for the index and pixel regions.
    arena: Arena,
    /// Which dimensions the index region currently holds.
    cache: IndexCache,
    /// Completion of the most recent shuffle pass.
    progress: Progress,
}

impl Engine {
    /// An engine with the default arena sizing.
    pub fn new() -> error::Result<Self> {
        Self::with_config(ArenaConfig::default())
    }

    /// An engine with a custom arena sizing policy.
    pub fn with_config(config: ArenaConfig) -> error::Result<Self> {
        Ok(Self {
            arena: Arena::new(config)?,
            cache: IndexCache::new(),
            progress: Progress::new(),
        })
    }

    /// Generate the curve for `dims` into arena scratch.
    ///
    /// Grows the arena if needed. The scratch span may overlap a previously
    /// compiled index, so the cache is invalidated first.
    pub fn gilbert2d(&mut self, dims: Dimensions) -> error::Result<Layout> {
        let layout = self.arena.ensure_capacity(dims)?;
        self.cache.invalidate();
        let mut sink = InterleavedSink::new(self.arena.scratch(&layout)?);
        gilbert2d(dims, &mut sink);
        debug_assert_eq!(sink.cells_written(), layout.pixel_count());
        Ok(layout)
    }

    /// Compile the curve held in scratch into the index region.
    ///
    /// Must follow [`Engine::gilbert2d`] for the same layout.
    pub fn precompute_indices(&mut self, layout: &Layout) -> error::Result<()> {
        let phase = self.arena.index_phase(layout)?;
        index::compile(layout.dims().width(), phase.scratch, phase.index)?;
        phase.commit();
        self.cache.store(layout.dims());
        Ok(())
    }

    /// Run one shuffle pass over the loaded source pixels.
    pub fn pixel_shuffle(&mut self, layout: &Layout, mode: Mode) -> error::Result<()> {
        let view = self.arena.pixel_phase(layout)?;
        shuffle(mode, view.index, view.src, view.dst, &self.progress)
    }

    /// Last reported completion percentage.
    pub fn progress(&self) -> u32 {
        self.progress.get()
    }

    /// A handle for polling progress from another thread.
    pub fn observer(&self) -> ProgressObserver {
        self.progress.observer()
    }

    /// Make sure the index permutation for `dims` is compiled, reusing the
    /// cached one when the dimensions have not changed.
    pub fn prepare(&mut self, dims: Dimensions) -> error::Result<Layout> {
        if self.cache.is_fresh(dims) {
            debug_assert_eq!(self.arena.phase().indexed_dims(), Some(dims));
            return self.arena.ensure_capacity(dims);
        }
        debug!(%dims, "compiling index permutation");
        let layout = self.gilbert2d(dims)?;
        self.precompute_indices(&layout)?;
        Ok(layout)
    }

    /// The compiled permutation for `layout`.
    pub fn index(&self, layout: &Layout) -> error::Result<&[u32]> {
        self.arena.index(layout)
    }

    /// Scramble or restore RGBA8888 bytes of an image with dimensions `dims`.
    ///
    /// Returns a new buffer of the same length. Input length is checked
    /// before anything in the arena is touched.
    pub fn process(&mut self, dims: Dimensions, mode: Mode, rgba: &[u8]) -> error::Result<Vec<u8>> {
        let expected = dims.pixel_count() * 4;
        if rgba.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: rgba.len(),
            });
        }
        let layout = self.prepare(dims)?;
        self.arena.load_pixels(&layout, rgba)?;
        self.pixel_shuffle(&layout, mode)?;
        self.arena.dest_bytes(&layout)
    }

    /// Scramble RGBA8888 bytes.
    pub fn encrypt(&mut self, dims: Dimensions, rgba: &[u8]) -> error::Result<Vec<u8>> {
        self.process(dims, Mode::Encrypt, rgba)
    }

    /// Restore RGBA8888 bytes scrambled with the same dimensions.
    pub fn decrypt(&mut self, dims: Dimensions, rgba: &[u8]) -> error::Result<Vec<u8>> {
        self.process(dims, Mode::Decrypt, rgba)
    }

    /// Number of index permutations compiled so far.
    pub fn compilations(&self) -> u64 {
        self.cache.compilations()
    }

    /// The underlying arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
