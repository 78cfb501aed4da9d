use std::{
    path::PathBuf,
    process::{Command, Output},
};

use image::{Rgb, RgbImage};

fn snake_autoplay(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snake-autoplay"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch snake-autoplay binary")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    std::fs::write(&path, contents).expect("write scratch file");
    path
}

/// Stock rendering: 20 px pitch, coloured interior and a white outline.
fn screenshot(cells: &[((u32, u32), Rgb<u8>)]) -> RgbImage {
    RgbImage::from_fn(400, 300, |x, y| {
        let (local_x, local_y) = (x % 20, y % 20);
        let Some(&(_, color)) = cells
            .iter()
            .find(|((column, row), _)| *column == x / 20 && *row == y / 20)
        else {
            return Rgb([0, 0, 0]);
        };
        if local_x == 19 || local_y == 19 {
            Rgb([0, 0, 0])
        } else if local_x == 0 || local_y == 0 || local_x == 18 || local_y == 18 {
            Rgb([255, 255, 255])
        } else {
            color
        }
    })
}

#[test]
fn config_prints_the_defaults() {
    let output = snake_autoplay(&["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[window]"), "{stdout}");
    assert!(stdout.contains("pitch = 20"), "{stdout}");
    assert!(stdout.contains("stop_hotkey = \"F12\""), "{stdout}");
}

#[test]
fn config_file_overrides_defaults() {
    let path = scratch_file("override.toml", "[grid]\npitch = 16\n");
    let output = snake_autoplay(&["config", "--config", path.to_str().expect("utf-8 path")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pitch = 16"), "{stdout}");
    assert!(stdout.contains("tick_delay_ms = 10"), "{stdout}");
}

#[test]
fn invalid_config_fails_before_running() {
    let path = scratch_file("zero_pitch.toml", "[grid]\npitch = 0\n");
    let output = snake_autoplay(&["config", "--config", path.to_str().expect("utf-8 path")]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("pitch"));
}

#[test]
fn analyze_reports_objects_and_decision() {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("food_below.png");
    screenshot(&[
        ((5, 5), Rgb([0, 0, 255])),
        ((4, 5), Rgb([0, 255, 0])),
        ((5, 8), Rgb([255, 0, 0])),
    ])
    .save(&path)
    .expect("save screenshot");

    let output = snake_autoplay(&[
        "analyze",
        path.to_str().expect("utf-8 path"),
        "--direction",
        "right",
        "--seed",
        "3",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("grid: 20 x 15 cells of 20 px"), "{stdout}");
    assert!(stdout.contains("head: (5, 5)"), "{stdout}");
    assert!(stdout.contains("food: (5, 8)"), "{stdout}");
    assert!(stdout.contains("game over: false"), "{stdout}");
    assert!(stdout.contains("decision: right -> down (Path)"), "{stdout}");
}
