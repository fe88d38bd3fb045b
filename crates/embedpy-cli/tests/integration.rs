//! Integration tests for the embedpy binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GREETER_SOURCE: &str = r#"
class Greeter:
    def hello(self, name):
        return "hello " + name

    def pair(self, first, second):
        return first + "+" + second

    def size(self, value):
        return len(value)

    def explode(self):
        raise ValueError("bad input")
"#;

/// Command isolated from the user's config and log file
fn embedpy_cmd(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("embedpy");
    cmd.env("EMBEDPY_CONFIG", home.path().join("embedpy.toml"));
    cmd.env("EMBEDPY_LOG_FILE", home.path().join("embedpy.log"));
    cmd
}

fn module_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cli_greeter.py"), GREETER_SOURCE).unwrap();
    dir
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    embedpy_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("embedpy"));
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    embedpy_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("embedded Python interpreter"));
}

#[test]
fn test_invalid_command() {
    let home = TempDir::new().unwrap();
    embedpy_cmd(&home).arg("invalid").assert().failure();
}

#[test]
fn test_check_prints_version() {
    let home = TempDir::new().unwrap();
    embedpy_cmd(&home)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Python").and(predicate::str::is_match(r"\d+\.\d+").unwrap()));
}

#[test]
fn test_call_returns_text() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    embedpy_cmd(&home)
        .arg("--path")
        .arg(modules.path())
        .args(["call", "cli_greeter", "Greeter", "hello", "world"])
        .assert()
        .success()
        .stdout(predicate::str::diff("hello world\n"));
}

#[test]
fn test_verbose_call_reports_loaded_class() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    embedpy_cmd(&home)
        .arg("-v")
        .arg("--path")
        .arg(modules.path())
        .args(["call", "cli_greeter", "Greeter", "hello", "verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello verbose"))
        .stderr(predicate::str::contains("Loaded cli_greeter.Greeter"));
}

#[test]
fn test_call_with_several_arguments() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    embedpy_cmd(&home)
        .arg("--path")
        .arg(modules.path())
        .args(["call", "cli_greeter", "Greeter", "pair", "left", "right"])
        .assert()
        .success()
        .stdout(predicate::str::contains("left+right"));
}

#[test]
fn test_call_non_text_result_prints_type() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    embedpy_cmd(&home)
        .arg("--path")
        .arg(modules.path())
        .args(["call", "cli_greeter", "Greeter", "size", "abcd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<int object>"));
}

#[test]
fn test_call_missing_module_fails() {
    let home = TempDir::new().unwrap();
    embedpy_cmd(&home)
        .args(["call", "embedpy_no_such_module", "Thing", "run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("embedpy_no_such_module"))
        .stderr(predicate::str::contains("Log file:"))
        .stderr(predicate::str::contains("embedpy.log"));
}

#[test]
fn test_call_missing_class_fails() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    embedpy_cmd(&home)
        .arg("--path")
        .arg(modules.path())
        .args(["call", "cli_greeter", "MissingClass", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MissingClass"));
}

#[test]
fn test_call_raising_method_reports_exception() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    embedpy_cmd(&home)
        .arg("--path")
        .arg(modules.path())
        .args(["call", "cli_greeter", "Greeter", "explode"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad input"));
}

#[test]
fn test_search_paths_from_config_file() {
    let home = TempDir::new().unwrap();
    let modules = module_dir();
    fs::write(
        home.path().join("embedpy.toml"),
        format!("search-paths = [{:?}]\n", modules.path().display().to_string()),
    )
    .unwrap();

    embedpy_cmd(&home)
        .args(["call", "cli_greeter", "Greeter", "hello", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello config"));
}

#[test]
fn test_config_set_show_and_path() {
    let home = TempDir::new().unwrap();

    embedpy_cmd(&home)
        .args(["config", "set", "write-bytecode", "false"])
        .assert()
        .success();

    embedpy_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("write-bytecode").and(predicate::str::contains("false")));

    embedpy_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("embedpy.toml"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    embedpy_cmd(&home)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("search-paths"));
}
