use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("request_timeout_secs = 30"));
    assert!(contents.contains("# base_url ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_base_url_updates_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .args(["config", "set-base-url", "https://shop.example.com/api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://shop.example.com/api"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("base_url = \"https://shop.example.com/api\""));

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .env_remove("SWEETS_BASE_URL")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Server: https://shop.example.com/api"));
}

#[test]
fn test_set_base_url_rejects_malformed_url() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .args(["config", "set-base-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid server base URL"));

    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_malformed_env_base_url_fails_before_any_call() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sweets")
        .env("SWEETS_HOME", dir.path())
        .env("SWEETS_BASE_URL", "::nope::")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid server base URL"));
}
