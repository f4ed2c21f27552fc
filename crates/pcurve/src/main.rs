//! Command‑line entry point for the `pcurve` tool.
//!
//! Scrambles and restores images along a Gilbert curve, and renders the
//! traversal itself as a line drawing.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
    process,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colornames::Color;
use image::Rgba;
use pixelcurve::{ArenaConfig, Dimensions, Engine, Mode};
use tracing_subscriber::{EnvFilter, fmt};

/// CLI command implementations.
mod cmd;
/// Rendering helpers for the `path` subcommand.
mod map;

use crate::map::{MapPalette, StrokeOptions};

/// Parse a hex string of 3, 4, 6 or 8 digits into RGBA channels.
fn parse_hex(raw: &str) -> Option<Rgba<u8>> {
    let digits = raw.strip_prefix('#').unwrap_or(raw);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibbles: Vec<u8> = digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u8)
        .collect();
    let channels: Vec<u8> = match nibbles.len() {
        3 | 4 => nibbles.iter().map(|n| n * 17).collect(),
        6 | 8 => nibbles.chunks_exact(2).map(|p| (p[0] << 4) | p[1]).collect(),
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(0xff);
    Some(Rgba([channels[0], channels[1], channels[2], alpha]))
}

/// Parse a CSS color name or hex value into an `Rgba` (alpha defaults to 0xff).
fn parse_color(input: &str) -> Result<Rgba<u8>, String> {
    let trimmed = input.trim();
    if let Some(rgba) = parse_hex(trimmed) {
        return Ok(rgba);
    }
    let color: Color = trimmed.try_into().map_err(|_| {
        format!("invalid color '{input}': use a named color or hex (RGB/RRGGBB, optional alpha)")
    })?;
    let (red, green, blue) = color.rgb();
    Ok(Rgba([red, green, blue, 0xff]))
}

#[derive(Parser)]
#[command(name = "pcurve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
/// Top‑level CLI options and subcommands.
struct Cli {
    /// Sets the level of verbosity (`-v`, `-vv`, ...).
    #[arg(short, action = clap::ArgAction::Count, global = true, help = "Sets the level of verbosity")]
    v: u8,

    /// Ceiling for the engine's working memory.
    #[arg(
        long = "max-memory",
        value_name = "MIB",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Maximum working memory in MiB (default 1024)"
    )]
    max_memory: Option<u64>,

    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
/// Subcommands supported by the `pcurve` tool.
enum Commands {
    #[command(about = "Scramble an image")]
    /// Scramble the pixels of an image.
    Encrypt {
        #[arg(short = 'q', long = "quiet", help = "Do not show a progress bar")]
        /// Suppress the progress bar.
        quiet: bool,

        #[arg(help = "Image to scramble")]
        /// Input image path.
        input: PathBuf,

        #[arg(help = "Output image path (use a lossless format such as PNG)")]
        /// Output image path.
        output: PathBuf,
    },

    #[command(about = "Restore a scrambled image")]
    /// Undo a previous `encrypt`.
    Decrypt {
        #[arg(short = 'q', long = "quiet", help = "Do not show a progress bar")]
        /// Suppress the progress bar.
        quiet: bool,

        #[arg(help = "Scrambled image")]
        /// Input image path.
        input: PathBuf,

        #[arg(help = "Output image path")]
        /// Output image path.
        output: PathBuf,
    },

    #[command(about = "Render the curve traversal for a grid")]
    /// Draw the Gilbert curve for a `width × height` grid.
    Path {
        #[arg(short = 'W', long = "width", default_value_t = 16, help = "Grid width in cells")]
        /// Grid width.
        width: u32,

        #[arg(short = 'H', long = "height", default_value_t = 16, help = "Grid height in cells")]
        /// Grid height.
        height: u32,

        #[arg(
            short = 's',
            long = "scale",
            default_value_t = 16,
            value_parser = clap::value_parser!(u32).range(2..=256),
            help = "Pixels per grid cell"
        )]
        /// Cell size in pixels.
        scale: u32,

        #[arg(
            short = 'w',
            long = "line-width",
            value_name = "PIXELS",
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Line width in pixels for the curve stroke"
        )]
        /// Stroke width.
        line_width: u32,

        #[arg(
            long = "fg",
            visible_alias = "foreground",
            value_parser = parse_color,
            default_value = "#8080ff",
            value_name = "COLOR",
            help = "Foreground color (name or hex)"
        )]
        /// Stroke color.
        foreground: Rgba<u8>,

        #[arg(
            long = "bg",
            visible_alias = "background",
            value_parser = parse_color,
            default_value = "#ffffff",
            value_name = "COLOR",
            help = "Background color (name or hex)"
        )]
        /// Background color.
        background: Rgba<u8>,

        #[arg(help = "Output image path")]
        /// Output image path.
        output: PathBuf,
    },
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build an engine honouring `--max-memory`.
fn engine(max_memory: Option<u64>) -> Result<Engine> {
    let config = match max_memory {
        Some(mib) => ArenaConfig::with_max_bytes(usize::try_from(mib.saturating_mul(1 << 20))?),
        None => ArenaConfig::default(),
    };
    Ok(Engine::with_config(config)?)
}

/// Print a success message or exit with an error.
fn report_ok<E: Display>(result: Result<(), E>, ok_msg: &str) {
    match result {
        Ok(()) => println!("{ok_msg}"),
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

/// Handle the `encrypt` and `decrypt` subcommands.
fn handle_scramble(
    max_memory: Option<u64>,
    mode: Mode,
    input: &Path,
    output: &Path,
    quiet: bool,
) -> Result<()> {
    let mut engine = engine(max_memory)?;
    cmd::scramble(&mut engine, mode, input, output, !quiet)
}

/// Handle the `path` subcommand.
fn handle_path(
    dims: (u32, u32),
    scale: u32,
    stroke: StrokeOptions,
    output: &Path,
) -> Result<()> {
    let dims = Dimensions::new(dims.0, dims.1)?;
    let image = cmd::path(dims, scale, stroke)?;
    image.save(output)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.v);

    match cli.command {
        Commands::Encrypt {
            quiet,
            input,
            output,
        } => report_ok(
            handle_scramble(cli.max_memory, Mode::Encrypt, &input, &output, quiet),
            "Encrypted!",
        ),
        Commands::Decrypt {
            quiet,
            input,
            output,
        } => report_ok(
            handle_scramble(cli.max_memory, Mode::Decrypt, &input, &output, quiet),
            "Decrypted!",
        ),
        Commands::Path {
            width,
            height,
            scale,
            line_width,
            foreground,
            background,
            output,
        } => report_ok(
            handle_path(
                (width, height),
                scale,
                StrokeOptions {
                    line_width,
                    palette: MapPalette {
                        foreground,
                        background,
                    },
                },
                &output,
            ),
            "OK!",
        ),
    }
}
