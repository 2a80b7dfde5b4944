//! Drives the built binary in command-line mode.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qr-caption"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn writes_default_output_and_reports_symbol() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--data", "HELLO"]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Version: 1 (21x21 modules)"));
    assert!(stdout.contains("Error correction level: H"));
    assert!(stdout.contains("Data size: 5 characters"));

    let img = image::open(dir.path().join("qrcode.png")).unwrap();
    assert_eq!((img.width(), img.height()), (290, 290));
}

#[test]
fn honors_output_and_flags() {
    let dir = TempDir::new().unwrap();
    let out = run_in(
        dir.path(),
        &[
            "--data",
            "12345",
            "--output",
            "code.png",
            "--qr-size",
            "2",
            "--error-level",
            "L",
            "--qr-color",
            "#ff0000",
            "--bg-color",
            "yellow",
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let img = image::open(dir.path().join("code.png")).unwrap().to_rgb8();
    assert_eq!(img.width(), (21 + 8) * 2);
    assert_eq!(*img.get_pixel(0, 0), image::Rgb([255, 255, 0]));
    assert_eq!(*img.get_pixel(8, 8), image::Rgb([255, 0, 0]));
}

#[test]
fn caption_extends_output() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--data", "HELLO", "--text", "Hello"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let img = image::open(dir.path().join("qrcode.png")).unwrap();
    assert!(img.height() > 290 + 40);
}

#[test]
fn empty_data_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--data", ""]);

    assert!(!out.status.success());
    assert!(!dir.path().join("qrcode.png").exists());
}

#[test]
fn data_is_encoded_as_given() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--data", " hi "]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Data size: 4 characters"));
    assert!(dir.path().join("qrcode.png").exists());
}

#[test]
fn oversized_module_size_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--data", "HELLO", "--qr-size", "200000000"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("too large"));
    assert!(!dir.path().join("qrcode.png").exists());
}

#[test]
fn oversized_caption_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let caption = "x".repeat(40);
    let out = run_in(
        dir.path(),
        &["--data", "HELLO", "--text", &caption, "--text-size", "4294967295"],
    );

    assert!(!out.status.success());
    assert!(!dir.path().join("qrcode.png").exists());
}

#[test]
fn missing_data_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--text", "caption only"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--data"));
    assert!(!dir.path().join("qrcode.png").exists());
}

#[test]
fn bad_color_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let out = run_in(dir.path(), &["--data", "x", "--qr-color", "notacolor"]);

    assert_eq!(out.status.code(), Some(2));
}
