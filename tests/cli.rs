//! Binary-level tests: exit codes and diagnostics
//!
//! Every case fails or exits before any request reaches a model server.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Nothing listens on the discard port, so any request fails fast
const UNREACHABLE: &str = "http://127.0.0.1:9/v1";

fn project() -> TempDir {
    let temp_dir = TempDir::new().expect("Creating temp dir failed");
    std::fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    std::fs::write(
        temp_dir.path().join("src").join("sample.py"),
        "print(\"Hello, World!\")\n",
    )
    .unwrap();
    temp_dir
}

fn f2read(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("f2read").expect("Binary exists");
    cmd.current_dir(dir.path())
        .env_remove("F2READ_LOG")
        .arg("--base-url")
        .arg(UNREACHABLE);
    cmd
}

#[test]
fn missing_input_exits_with_code_one_and_names_path() {
    let dir = project();
    let missing = dir.path().join("src").join("does-not-exist.py");

    f2read(&dir)
        .arg("does-not-exist.py")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "File not found: {}",
            missing.display()
        )));
}

#[test]
fn missing_config_file_is_only_a_warning() {
    let dir = project();
    let config = dir.path().join("F2READ-config.toml");

    f2read(&dir)
        .arg("does-not-exist.py")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "No configuration file found at {}",
            config.display()
        )));
}

#[test]
fn unreachable_service_exits_with_code_one_without_output() {
    let dir = project();

    f2read(&dir)
        .arg("sample.py")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!dir.path().join("src").join("README.md").exists());
}

#[test]
fn version_flag_prints_version() {
    let dir = project();

    f2read(&dir)
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_paths_is_usage_error() {
    let dir = project();

    Command::cargo_bin("f2read")
        .expect("Binary exists")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATHS"));
}
