//! Image rendering helpers used by the CLI.
//!
//! Small drawing primitives plus the function that renders a curve traversal
//! as a polyline through cell centres.

use image::{Rgba, RgbaImage};
use pixelcurve::Cell;

/// Colors used when rendering a path image.
#[derive(Clone, Copy, Debug)]
pub struct MapPalette {
    /// Color for the curve strokes.
    pub foreground: Rgba<u8>,
    /// Background fill color.
    pub background: Rgba<u8>,
}

/// Stroke styling for rendering.
#[derive(Clone, Copy, Debug)]
pub struct StrokeOptions {
    /// Stroke width in pixels.
    pub line_width: u32,
    /// Colors for foreground/background.
    pub palette: MapPalette,
}

/// Centre of grid cell `v` in image space.
fn centre(v: u32, scale: u32) -> i64 {
    i64::from(v) * i64::from(scale) + i64::from(scale / 2)
}

/// Put a pixel if the coordinates are inside the image bounds.
fn put_pixel_safe(img: &mut RgbaImage, x: i64, y: i64, col: Rgba<u8>) {
    let w = i64::from(img.width());
    let h = i64::from(img.height());
    if x >= 0 && y >= 0 && x < w && y < h {
        img.put_pixel(x as u32, y as u32, col);
    }
}

/// Stamp a filled square of side `size` centred on `(cx, cy)`.
fn stamp_square(img: &mut RgbaImage, cx: i64, cy: i64, size: u32, col: Rgba<u8>) {
    let lo = (i64::from(size) - 1) / 2;
    let hi = i64::from(size) / 2;
    for y in cy - lo..=cy + hi {
        for x in cx - lo..=cx + hi {
            put_pixel_safe(img, x, y, col);
        }
    }
}

/// Draw a Bresenham line from `(x0, y0)` to `(x1, y1)`.
fn draw_line(img: &mut RgbaImage, from: (i64, i64), to: (i64, i64), col: Rgba<u8>, width: u32) {
    let (mut x, mut y) = from;
    let (x1, y1) = to;
    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        stamp_square(img, x, y, width, col);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Render `path` on a `width × height` image where each grid cell spans
/// `scale` pixels.
///
/// Consecutive cells are joined by straight segments between their centres.
/// A single-cell path is drawn as one dot.
pub fn render_path(
    width: u32,
    height: u32,
    scale: u32,
    path: &[Cell],
    stroke: StrokeOptions,
) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, stroke.palette.background);
    let line_width = stroke.line_width.max(1);
    let point = |c: &Cell| (centre(c.x, scale), centre(c.y, scale));

    if let [only] = path {
        let (x, y) = point(only);
        stamp_square(&mut img, x, y, line_width, stroke.palette.foreground);
    }
    for pair in path.windows(2) {
        draw_line(
            &mut img,
            point(&pair[0]),
            point(&pair[1]),
            stroke.palette.foreground,
            line_width,
        );
    }
    img
}
