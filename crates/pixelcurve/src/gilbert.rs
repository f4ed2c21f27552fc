//! Generalized Hilbert ("Gilbert") traversal of arbitrary rectangles.
//!
//! The recursion follows the classic construction: a rectangle is described
//! by an origin and two extent vectors `a` (major axis) and `b` (minor axis).
//! Long rectangles are cut in two along `a`; near-square ones are cut in
//! three, with the last piece reflected so the walk stays contiguous. A
//! parity correction keeps every sub-split on an even number of cells where
//! the grid allows it.

use std::ops::{Add, Neg, Sub};

use tracing::instrument;

use crate::dims::Dimensions;

/// A grid cell visited by the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Cell {
    /// Construct a cell.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Receiver for the cells produced by [`gilbert2d`], in traversal order.
pub trait CurveSink {
    /// Accept the next cell of the path.
    fn push(&mut self, cell: Cell);
}

impl CurveSink for Vec<Cell> {
    fn push(&mut self, cell: Cell) {
        Vec::push(self, cell);
    }
}

/// Writes the path as interleaved `x, y` words into a borrowed slice.
///
/// This is how the curve lands in arena scratch: `2 * N` words for `N` cells.
#[derive(Debug)]
pub struct InterleavedSink<'a> {
    /// Destination words.
    out: &'a mut [u32],
    /// Next word to write.
    cursor: usize,
}

impl<'a> InterleavedSink<'a> {
    /// Wrap `out`, which must hold at least `2 * N` words.
    pub fn new(out: &'a mut [u32]) -> Self {
        Self { out, cursor: 0 }
    }

    /// Number of cells written so far.
    pub fn cells_written(&self) -> usize {
        self.cursor / 2
    }
}

impl CurveSink for InterleavedSink<'_> {
    fn push(&mut self, cell: Cell) {
        self.out[self.cursor] = cell.x;
        self.out[self.cursor + 1] = cell.y;
        self.cursor += 2;
    }
}

/// Integer 2-vector used for origins and extents during recursion.
///
/// Extents always lie on one axis, so one component is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Vec2 {
    /// Horizontal component.
    x: i32,
    /// Vertical component.
    y: i32,
}

impl Vec2 {
    /// Construct a vector.
    const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Length of an axis-aligned extent.
    fn len(self) -> i32 {
        (self.x + self.y).abs()
    }

    /// Unit step along the extent.
    fn unit(self) -> Self {
        Self::new(self.x.signum(), self.y.signum())
    }

    /// Componentwise floor division by two.
    fn half(self) -> Self {
        Self::new(self.x >> 1, self.y >> 1)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Emit `count` cells starting at `at`, moving by `step` each time.
fn walk<S: CurveSink>(sink: &mut S, mut at: Vec2, step: Vec2, count: i32) {
    for _ in 0..count {
        sink.push(Cell::new(at.x as u32, at.y as u32));
        at = at + step;
    }
}

/// Recursive body: traverse the rectangle spanned by `a` and `b` from `origin`.
fn generate<S: CurveSink>(sink: &mut S, origin: Vec2, a: Vec2, b: Vec2) {
    let w = a.len();
    let h = b.len();
    let da = a.unit();
    let db = b.unit();

    if h == 1 {
        walk(sink, origin, da, w);
        return;
    }
    if w == 1 {
        walk(sink, origin, db, h);
        return;
    }

    let mut a2 = a.half();
    let mut b2 = b.half();

    if 2 * i64::from(w) > 3 * i64::from(h) {
        if a2.len() % 2 == 1 && w > 2 {
            a2 = a2 + da;
        }
        generate(sink, origin, a2, b);
        generate(sink, origin + a2, a - a2, b);
    } else {
        if b2.len() % 2 == 1 && h > 2 {
            b2 = b2 + db;
        }
        generate(sink, origin, b2, a2);
        generate(sink, origin + b2, a, b - b2);
        generate(sink, origin + (a - da) + (b2 - db), -b2, -(a - a2));
    }
}

/// Traverse every cell of a `width × height` grid exactly once.
///
/// Cells are pushed into `sink` in curve order. The walk starts at `(0, 0)`
/// and runs along the longer side first.
#[instrument(level = "debug", skip(sink))]
pub fn gilbert2d<S: CurveSink>(dims: Dimensions, sink: &mut S) {
    let w = dims.width() as i32;
    let h = dims.height() as i32;
    let origin = Vec2::new(0, 0);
    if w >= h {
        generate(sink, origin, Vec2::new(w, 0), Vec2::new(0, h));
    } else {
        generate(sink, origin, Vec2::new(0, h), Vec2::new(w, 0));
    }
}

/// Collect the full traversal of `dims` into an owned path.
pub fn curve_path(dims: Dimensions) -> Vec<Cell> {
    let mut path = Vec::with_capacity(dims.pixel_count());
    gilbert2d(dims, &mut path);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error;

    fn path(w: u32, h: u32) -> error::Result<Vec<(u32, u32)>> {
        Ok(curve_path(Dimensions::new(w, h)?)
            .into_iter()
            .map(|c| (c.x, c.y))
            .collect())
    }

    #[test]
    fn two_by_two() -> error::Result<()> {
        assert_eq!(path(2, 2)?, vec![(0, 0), (0, 1), (1, 1), (1, 0)]);
        Ok(())
    }

    #[test]
    fn degenerate_column() -> error::Result<()> {
        assert_eq!(path(1, 5)?, vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
        Ok(())
    }

    #[test]
    fn degenerate_row() -> error::Result<()> {
        assert_eq!(path(4, 1)?, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        Ok(())
    }

    #[test]
    fn single_cell() -> error::Result<()> {
        assert_eq!(path(1, 1)?, vec![(0, 0)]);
        Ok(())
    }

    #[test]
    fn three_by_two() -> error::Result<()> {
        assert_eq!(
            path(3, 2)?,
            vec![(0, 0), (0, 1), (1, 1), (2, 1), (2, 0), (1, 0)]
        );
        Ok(())
    }

    #[test]
    fn four_by_four() -> error::Result<()> {
        assert_eq!(
            path(4, 4)?,
            vec![
                (0, 0),
                (1, 0),
                (1, 1),
                (0, 1),
                (0, 2),
                (0, 3),
                (1, 3),
                (1, 2),
                (2, 2),
                (2, 3),
                (3, 3),
                (3, 2),
                (3, 1),
                (2, 1),
                (2, 0),
                (3, 0),
            ]
        );
        Ok(())
    }

    #[test]
    fn interleaved_sink_matches_owned_path() -> error::Result<()> {
        let dims = Dimensions::new(5, 3)?;
        let mut words = vec![0u32; dims.pixel_count() * 2];
        let mut sink = InterleavedSink::new(&mut words);
        gilbert2d(dims, &mut sink);
        assert_eq!(sink.cells_written(), dims.pixel_count());

        let owned = curve_path(dims);
        for (i, cell) in owned.iter().enumerate() {
            assert_eq!(words[2 * i], cell.x);
            assert_eq!(words[2 * i + 1], cell.y);
        }
        Ok(())
    }
}
