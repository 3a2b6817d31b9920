//! Integration tests for the CLI binary
//!
//! These run the commands that need neither the network nor an audio
//! device.

use std::io::Write;
use std::process::{Command, Output};

fn examvoice(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_examvoice"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn sanitize_prints_cleaned_text() {
    let output = examvoice(&["sanitize", "## Nota: lee *esto* y **this** 🎉 https://example.com"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Nota, lee esto y **this**");
}

#[test]
fn segments_prints_json() {
    let output = examvoice(&["segments", "La palabra es **house**."]);
    assert!(output.status.success());

    let segments: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let segments = segments.as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0]["language"], "native");
    assert_eq!(segments[0]["text"], "La palabra es");
    assert_eq!(segments[1]["language"], "foreign");
    assert_eq!(segments[1]["text"], "house.");
}

#[test]
fn segments_of_delimiters_only_is_empty() {
    let output = examvoice(&["segments", "****"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "[]");
}

#[test]
fn ssml_switches_voices() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"foreign_rate = \"85%\"\n").unwrap();
    let path = file.path().to_str().unwrap();

    let output = examvoice(&[
        "--config",
        path,
        "ssml",
        "Se dice **good & bad**",
        "--variant",
        "male",
    ]);
    assert!(output.status.success());

    let ssml = stdout(&output);
    assert!(ssml.starts_with("<speak>"));
    assert!(ssml.contains(r#"name="es-ES-Neural2-B""#));
    assert!(ssml.contains(r#"name="en-US-Neural2-D""#));
    assert!(ssml.contains(r#"<prosody rate="85%">good &amp; bad</prosody>"#));
}

#[test]
fn missing_config_file_fails() {
    let output = examvoice(&["--config", "/nonexistent/examvoice.toml", "ssml", "hola"]);
    assert!(!output.status.success());
}

#[test]
fn unknown_command_fails() {
    let output = examvoice(&["dance"]);
    assert!(!output.status.success());
}

#[test]
fn voices_reports_missing_engine() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[fallback.espeak]\nexecutable_path = \"/nonexistent/espeak-ng\"\n")
        .unwrap();
    let path = file.path().to_str().unwrap();

    let output = examvoice(&["--config", path, "voices"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("espeak-ng is not available"));
}
