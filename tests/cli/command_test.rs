//! Tests running the `julia-bridge` binary against the stand-in interpreter.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "executable = \"sh\"\nargs = [\"{}\"]\nrequest_timeout_ms = 2000\npoll_delay_ms = 1",
        crate::fake_julia_path().display()
    )
    .unwrap();
    file
}

fn julia_bridge(config: &NamedTempFile, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_julia-bridge"))
        .arg("--config")
        .arg(config.path())
        .args(args)
        .output()
        .expect("Failed to run julia-bridge")
}

#[test]
fn test_help_lists_subcommands() {
    let output = Command::new(env!("CARGO_BIN_EXE_julia-bridge"))
        .arg("--help")
        .output()
        .expect("Failed to run julia-bridge");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["version", "exec", "eval", "call"] {
        assert!(stdout.contains(sub), "missing {sub} in: {stdout}");
    }
}

#[test]
fn test_version_prints_banner() {
    let config = config_file();
    let output = julia_bridge(&config, &["version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Julia Version 1.10.0"));
}

#[test]
fn test_exec_prints_output_lines() {
    let config = config_file();
    let output = julia_bridge(&config, &["exec", "println(hello)"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
}

#[test]
fn test_invalid_config_fails() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "request_timeout_ms = \"soon\"").unwrap();
    let output = julia_bridge(&config, &["exec", "1"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR"));
}
