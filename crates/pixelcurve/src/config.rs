//! Arena configuration parameters.

/// Sizing policy for the [`Arena`](crate::arena::Arena).
///
/// The arena grows in whole pages from `initial_pages` up to `max_pages`.
/// Requests beyond the ceiling fail with a capacity error instead of
/// allocating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Growth granularity in bytes. Must be a non-zero multiple of 4.
    ///
    /// Default: 65_536 (64 KiB).
    pub page_size: usize,

    /// Pages allocated when the arena is created.
    ///
    /// Default: 256 (16 MiB). Clamped to `max_pages`.
    pub initial_pages: usize,

    /// Upper bound on the number of pages.
    ///
    /// Default: 16_384 (1 GiB), enough for images of roughly 89 megapixels.
    pub max_pages: usize,
}

impl ArenaConfig {
    /// Default page size: 64 KiB.
    pub const DEFAULT_PAGE_SIZE: usize = 64 * 1024;

    /// Default initial page count: 16 MiB.
    pub const DEFAULT_INITIAL_PAGES: usize = 256;

    /// Default page ceiling: 1 GiB.
    pub const DEFAULT_MAX_PAGES: usize = 16_384;

    /// Defaults with the ceiling replaced by `bytes`, rounded down to whole
    /// pages.
    pub fn with_max_bytes(bytes: usize) -> Self {
        let max_pages = bytes / Self::DEFAULT_PAGE_SIZE;
        Self {
            initial_pages: Self::DEFAULT_INITIAL_PAGES.min(max_pages),
            max_pages,
            ..Self::default()
        }
    }

    /// Largest size the arena may reach, in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_pages.saturating_mul(self.page_size)
    }

    /// Size of the initial allocation, in bytes.
    pub fn initial_bytes(&self) -> usize {
        self.initial_pages
            .min(self.max_pages)
            .saturating_mul(self.page_size)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            initial_pages: Self::DEFAULT_INITIAL_PAGES,
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ceiling_is_one_gib() {
        let config = ArenaConfig::default();
        assert_eq!(config.max_bytes(), 1 << 30);
        assert_eq!(config.initial_bytes(), 16 << 20);
    }

    #[test]
    fn max_bytes_rounds_down_to_pages() {
        let config = ArenaConfig::with_max_bytes(3 * 64 * 1024 + 100);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.initial_pages, 3);
        assert_eq!(config.max_bytes(), 3 * 64 * 1024);
    }

    #[test]
    fn initial_clamped_to_ceiling() {
        let config = ArenaConfig {
            initial_pages: 10,
            max_pages: 2,
            ..ArenaConfig::default()
        };
        assert_eq!(config.initial_bytes(), 2 * ArenaConfig::DEFAULT_PAGE_SIZE);
    }
}
