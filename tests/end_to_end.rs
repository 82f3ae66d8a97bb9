//! End-to-end tests driving the real binary and a real subprocess.
//!
//! A small shell script stands in for ImageMagick: it copies `{source}` to
//! the last argument, fails for sources named `*broken*`, writes a truncated
//! file and then fails for `*partial*`, and hangs for sources named `*slow*`.
//! Everything else (argument templates, exit codes, skip/force, timeouts)
//! goes through the production code paths.

#![cfg(unix)]

use responsive_variants::config::ConverterConfig;
use responsive_variants::generate::{self, GenerateOptions};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_CONVERTER: &str = r#"#!/bin/sh
for last; do :; done
case "$1" in
    *broken*) echo "no decode delegate for this image format" >&2; exit 1 ;;
    *partial*) echo "partial" > "$last"; echo "disk full" >&2; exit 1 ;;
    *slow*) sleep 5 ;;
esac
cp "$1" "$last"
"#;

struct Fixture {
    tmp: TempDir,
    converter: PathBuf,
}

impl Fixture {
    fn new(sources: &[&str]) -> Self {
        let tmp = TempDir::new().unwrap();
        let converter = tmp.path().join("bin/fake-convert");
        std::fs::create_dir_all(converter.parent().unwrap()).unwrap();
        std::fs::write(&converter, FAKE_CONVERTER).unwrap();
        std::fs::set_permissions(&converter, std::fs::Permissions::from_mode(0o755)).unwrap();

        for source in sources {
            let path = tmp.path().join("photos").join(source);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, format!("pixels of {source}")).unwrap();
        }
        Self { tmp, converter }
    }

    fn photos(&self) -> PathBuf {
        self.tmp.path().join("photos")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_responsive-variants"))
            .arg("--config")
            .arg(self.tmp.path().join("variants.toml"))
            .args(args)
            .output()
            .unwrap()
    }

    fn generate(&self, extra: &[&str]) -> Output {
        let photos = self.photos();
        let mut args = vec![
            "generate",
            photos.to_str().unwrap(),
            "--converter",
            self.converter.to_str().unwrap(),
            "--widths",
            "400,800",
        ];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.photos())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// generate
// =============================================================================

#[test]
fn generate_then_rerun_skips_everything() {
    let fixture = Fixture::new(&["dawn.jpg", "dusk.png"]);

    let first = fixture.generate(&[]);
    assert_eq!(first.status.code(), Some(0), "stderr: {}", stderr(&first));
    let out = stdout(&first);
    assert!(out.contains("Found 2 images, 4 variants"), "{out}");
    assert!(out.contains("Generated 4, skipped 0, failed 0"), "{out}");
    assert_eq!(
        fixture.files(),
        vec![
            "dawn.jpg",
            "dawn_400w.webp",
            "dawn_800w.webp",
            "dusk.png",
            "dusk_400w.webp",
            "dusk_800w.webp",
        ]
    );
    assert_eq!(
        std::fs::read_to_string(fixture.photos().join("dawn_800w.webp")).unwrap(),
        "pixels of dawn.jpg"
    );

    let second = fixture.generate(&[]);
    assert_eq!(second.status.code(), Some(0));
    let out = stdout(&second);
    assert!(out.contains("Generated 0, skipped 4, failed 0"), "{out}");
    assert!(out.contains("dawn_400w.webp: skipped (exists)"), "{out}");
}

#[test]
fn force_overwrites_existing_variants() {
    let fixture = Fixture::new(&["dawn.jpg"]);
    std::fs::write(fixture.photos().join("dawn_400w.webp"), "stale").unwrap();

    let output = fixture.generate(&["--force"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Generated 2, skipped 0, failed 0"));
    assert_eq!(
        std::fs::read_to_string(fixture.photos().join("dawn_400w.webp")).unwrap(),
        "pixels of dawn.jpg"
    );
}

#[test]
fn failed_items_exit_one_and_do_not_stop_the_batch() {
    let fixture = Fixture::new(&["a.jpg", "broken.jpg", "c.jpg"]);

    let output = fixture.generate(&[]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("Generated 4, skipped 0, failed 2"), "{out}");
    assert!(out.contains("no decode delegate"), "{out}");
    assert!(fixture.photos().join("c_800w.webp").exists());
    assert!(!fixture.photos().join("broken_400w.webp").exists());
}

#[test]
fn truncated_output_of_failed_conversion_is_not_skipped_later() {
    let fixture = Fixture::new(&["partial.jpg"]);

    let first = fixture.generate(&[]);
    assert_eq!(first.status.code(), Some(1));
    assert!(stdout(&first).contains("Generated 0, skipped 0, failed 2"));
    assert_eq!(fixture.files(), vec!["partial.jpg"]);

    let second = fixture.generate(&[]);
    assert_eq!(second.status.code(), Some(1));
    let out = stdout(&second);
    assert!(out.contains("Generated 0, skipped 0, failed 2"), "{out}");
}

#[test]
fn missing_converter_is_fatal_and_touches_nothing() {
    let fixture = Fixture::new(&["dawn.jpg"]);
    let photos = fixture.photos();

    let output = fixture.run(&[
        "generate",
        photos.to_str().unwrap(),
        "--converter",
        "definitely-not-a-real-converter-xyz",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("definitely-not-a-real-converter-xyz"));
    assert!(stderr(&output).contains("not found"));
    assert_eq!(fixture.files(), vec!["dawn.jpg"]);
}

#[test]
fn zero_width_is_fatal() {
    let fixture = Fixture::new(&["dawn.jpg"]);
    let output = fixture.generate(&["--widths", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid input"));
    assert_eq!(fixture.files(), vec!["dawn.jpg"]);
}

#[test]
fn json_summary() {
    let fixture = Fixture::new(&["a.jpg", "broken.jpg"]);

    let output = fixture.generate(&["--json"]);
    assert_eq!(output.status.code(), Some(1));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["generated"], 2);
    assert_eq!(summary["skipped"], 0);
    assert_eq!(summary["failed"], 2);
    assert_eq!(summary["failures"][0]["width"], 400);
    assert_eq!(summary["failures"][1]["width"], 800);
    assert_eq!(summary["failures"][0]["reason"]["kind"], "conversion_failed");
    assert_eq!(summary["failures"][0]["reason"]["exit_code"], 1);
}

#[test]
fn config_file_supplies_defaults() {
    let fixture = Fixture::new(&["dawn.jpg"]);
    std::fs::write(
        fixture.tmp.path().join("variants.toml"),
        format!(
            "widths = [320]\nformat = \"avif\"\n\n[converter]\ncommand = \"{}\"\n",
            fixture.converter.display()
        ),
    )
    .unwrap();

    let photos = fixture.photos();
    let output = fixture.run(&["generate", photos.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(fixture.files(), vec!["dawn.jpg", "dawn_320w.avif"]);
}

#[test]
fn bad_config_file_is_fatal() {
    let fixture = Fixture::new(&["dawn.jpg"]);
    std::fs::write(fixture.tmp.path().join("variants.toml"), "colour = \"red\"\n").unwrap();

    let output = fixture.generate(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fixture.files(), vec!["dawn.jpg"]);
}

// =============================================================================
// Library API against a real subprocess
// =============================================================================

fn converter_config(fixture: &Fixture, timeout_secs: u64) -> ConverterConfig {
    ConverterConfig {
        command: fixture.converter.to_string_lossy().into_owned(),
        timeout_secs,
        ..ConverterConfig::default()
    }
}

#[test]
fn hung_conversion_times_out() {
    let fixture = Fixture::new(&["slow.jpg", "fast.jpg"]);
    let options = GenerateOptions {
        widths: vec![400],
        ..GenerateOptions::default()
    };

    let summary = generate::generate(
        &fixture.photos(),
        &options,
        &converter_config(&fixture, 1),
        None,
    )
    .unwrap();

    assert_eq!(summary.generated, 1);
    assert_eq!(summary.failed, 1);
    assert!(summary.failures[0].source.ends_with("slow.jpg"));
    assert_eq!(
        summary.failures[0].reason.to_string(),
        "conversion timed out after 1s"
    );
}

#[test]
fn single_file_generates_only_its_variants() {
    let fixture = Fixture::new(&["a.jpg", "b.jpg"]);
    let options = GenerateOptions {
        widths: vec![400, 800, 400],
        ..GenerateOptions::default()
    };

    let summary = generate::generate(
        &fixture.photos().join("a.jpg"),
        &options,
        &converter_config(&fixture, 30),
        None,
    )
    .unwrap();

    assert_eq!(summary.generated, 2);
    assert!(summary.is_success());
    assert_eq!(
        fixture.files(),
        vec!["a.jpg", "a_400w.webp", "a_800w.webp", "b.jpg"]
    );
}

// =============================================================================
// Markup commands
// =============================================================================

fn markup_output(args: &[&str]) -> String {
    let tmp = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_responsive-variants"))
        .arg("--config")
        .arg(tmp.path().join("variants.toml"))
        .args(args)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    stdout(&output).trim_end().to_string()
}

#[test]
fn srcset_command() {
    assert_eq!(
        markup_output(&["srcset", "/images/photo.png", "--widths", "400,800"]),
        "/images/photo_400w.webp 400w, /images/photo_800w.webp 800w"
    );
    assert_eq!(
        markup_output(&["srcset", "/images/photo.png", "--widths", "400,800", "--format", "AVIF"]),
        "/images/photo_400w.avif 400w, /images/photo_800w.avif 800w"
    );
}

#[test]
fn img_command() {
    assert_eq!(
        markup_output(&[
            "img",
            "/images/photo.png",
            "--widths",
            "600",
            "--attr",
            "alt=A & B",
            "--attr",
            "loading=lazy",
        ]),
        r#"<img src="/images/photo.png" srcset="/images/photo_600w.webp 600w" alt="A &amp; B" loading="lazy">"#
    );
}

#[test]
fn picture_command() {
    assert_eq!(
        markup_output(&[
            "picture",
            "hero.jpg",
            "--widths",
            "400",
            "--formats",
            "avif,webp",
            "--sizes",
            "100vw",
        ]),
        concat!(
            "<picture>",
            r#"<source type="image/avif" srcset="hero_400w.avif 400w" sizes="100vw">"#,
            r#"<source type="image/webp" srcset="hero_400w.webp 400w" sizes="100vw">"#,
            r#"<img src="hero.jpg" srcset="hero_400w.webp 400w" sizes="100vw">"#,
            "</picture>"
        )
    );
}

#[test]
fn unknown_format_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_responsive-variants"))
        .arg("--config")
        .arg(tmp.path().join("variants.toml"))
        .args(["srcset", "/a.png", "--format", "bmpx"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn gen_config_output_parses() {
    let toml_text = markup_output(&["gen-config"]);
    let value: toml::Value = toml::from_str(&toml_text).unwrap();
    assert_eq!(value["format"].as_str(), Some("webp"));
}

