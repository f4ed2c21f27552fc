#![allow(missing_docs, clippy::tests_outside_test_module)]

use std::{path::Path, process::Command};

use assert_cmd::{
    assert::{Assert, OutputAssertExt},
    cargo::CommandCargoExt,
};
use image::{GenericImageView, Rgba, RgbaImage};
use tempfile::tempdir;

/// A gradient with distinct pixels so any misplacement shows up.
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8, 0xff])
    })
}

#[allow(deprecated)]
fn pcurve(args: &[&str], paths: &[&Path]) -> Assert {
    let mut cmd = Command::cargo_bin("pcurve").expect("binary exists");
    cmd.args(args).args(paths);
    cmd.assert()
}

#[test]
fn png_round_trip_is_lossless() {
    let td = tempdir().expect("tmp");
    let original = td.path().join("original.png");
    let scrambled = td.path().join("scrambled.png");
    let restored = td.path().join("restored.png");
    let source = gradient(37, 23);
    source.save(&original).expect("save source");

    pcurve(&["encrypt", "--quiet"], &[&original, &scrambled]).success();
    pcurve(&["decrypt", "-q"], &[&scrambled, &restored]).success();

    let mid = image::open(&scrambled).expect("decodes").into_rgba8();
    assert_eq!(mid.dimensions(), (37, 23));
    assert_ne!(mid, source, "scrambling changed nothing");

    let back = image::open(&restored).expect("decodes").into_rgba8();
    assert_eq!(back, source);
}

#[test]
fn progress_bar_mode_produces_same_output() {
    let td = tempdir().expect("tmp");
    let original = td.path().join("original.png");
    let quiet = td.path().join("quiet.png");
    let loud = td.path().join("loud.png");
    gradient(16, 9).save(&original).expect("save source");

    pcurve(&["encrypt", "-q"], &[&original, &quiet]).success();
    pcurve(&["encrypt"], &[&original, &loud]).success();

    let a = image::open(&quiet).expect("decodes");
    let b = image::open(&loud).expect("decodes");
    assert_eq!(a.to_rgba8(), b.to_rgba8());
}

#[test]
fn missing_input_fails() {
    let td = tempdir().expect("tmp");
    let input = td.path().join("absent.png");
    let output = td.path().join("out.png");
    pcurve(&["encrypt", "-q"], &[&input, &output]).failure();
    assert!(!output.exists());
}

#[test]
fn image_over_memory_limit_fails() {
    let td = tempdir().expect("tmp");
    let input = td.path().join("big.png");
    let output = td.path().join("out.png");
    // Three 4-byte regions per pixel plus the reserved base exceed 1 MiB.
    gradient(300, 300).save(&input).expect("save source");

    let assert = pcurve(&["--max-memory", "1", "encrypt", "-q"], &[&input, &output]).failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("max-memory"), "stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn path_renders_scaled_grid() {
    let td = tempdir().expect("tmp");
    let output = td.path().join("path.png");
    pcurve(
        &["path", "-W", "5", "-H", "3", "-s", "8", "--fg", "red", "--bg", "#000"],
        &[&output],
    )
    .success();

    let img = image::open(&output).expect("decodes");
    assert_eq!(img.dimensions(), (40, 24));
    // The walk begins in the top-left cell.
    assert_eq!(img.get_pixel(4, 4), Rgba([0xff, 0, 0, 0xff]));
}

#[test]
fn path_rejects_empty_grid() {
    let td = tempdir().expect("tmp");
    let output = td.path().join("path.png");
    pcurve(&["path", "-W", "0"], &[&output]).failure();
}
