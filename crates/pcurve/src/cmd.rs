//! Command handlers for the `pcurve` CLI.
//!
//! These functions decode images, drive the engine and write the results
//! back to disk.

use std::{panic, path::Path, thread, time::Duration};

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use pbr::ProgressBar;
use pixelcurve::{Dimensions, Engine, Error, Mode, ProgressObserver, curve_path, error};
use tracing::info;

use crate::map::{StrokeOptions, render_path};

/// How often the progress bar polls the engine.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Mirror `observer` onto a terminal progress bar until `finished` returns true.
fn follow_progress(observer: &ProgressObserver, finished: impl Fn() -> bool) {
    let mut bar = ProgressBar::new(100);
    bar.show_speed = false;
    let mut shown = 0;
    loop {
        let done = finished();
        let current = u64::from(observer.get());
        if current > shown {
            bar.add(current - shown);
            shown = current;
        }
        if done {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }
    bar.finish();
}

/// Run the engine over `pixels`, optionally showing a progress bar.
///
/// The engine works on a scoped worker thread while this thread polls the
/// shared progress counter.
fn run_engine(
    engine: &mut Engine,
    dims: Dimensions,
    mode: Mode,
    pixels: &[u8],
    show_progress: bool,
) -> error::Result<Vec<u8>> {
    if !show_progress {
        return engine.process(dims, mode, pixels);
    }
    let observer = engine.observer();
    thread::scope(|s| {
        let worker = s.spawn(|| engine.process(dims, mode, pixels));
        follow_progress(&observer, || worker.is_finished());
        match worker.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

/// Scramble or restore the image at `input` and save it to `output`.
pub fn scramble(
    engine: &mut Engine,
    mode: Mode,
    input: &Path,
    output: &Path,
    show_progress: bool,
) -> Result<()> {
    let image = image::open(input)
        .with_context(|| format!("failed to read image {}", input.display()))?
        .into_rgba8();
    let dims = Dimensions::new(image.width(), image.height())?;
    info!(%dims, %mode, input = %input.display(), "processing image");

    let pixels = run_engine(engine, dims, mode, image.as_raw(), show_progress).map_err(
        |err| match err {
            Error::Capacity { .. } => anyhow!("{err} (or raise --max-memory)"),
            other => other.into(),
        },
    )?;

    let result = RgbaImage::from_raw(dims.width(), dims.height(), pixels)
        .ok_or_else(|| anyhow!("engine returned a buffer of the wrong size"))?;
    result
        .save(output)
        .with_context(|| format!("failed to write image {}", output.display()))?;
    Ok(())
}

/// Render the curve traversal of a `dims` grid with `scale` pixels per cell.
pub fn path(dims: Dimensions, scale: u32, stroke: StrokeOptions) -> Result<RgbaImage> {
    let too_large = || anyhow!("{dims} grid at scale {scale} is too large to render");
    let width = dims.width().checked_mul(scale).ok_or_else(too_large)?;
    let height = dims.height().checked_mul(scale).ok_or_else(too_large)?;
    let cells = curve_path(dims);
    Ok(render_path(width, height, scale, &cells, stroke))
}
