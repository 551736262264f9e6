use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("shop.toml");
    fs::write(
        &path,
        r#"
[fruits.apple]
title = "Apple"
season = "autumn"

[fruits.cherry]
title = "Cherry"
season = "summer"
optgroup = "Stone"

[fruits.plum]
title = "Plum"
season = "autumn"
optgroup = "Stone"
"#,
    )
    .expect("write fixture");
    (dir, path)
}

fn cfgselect(config: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("cfgselect").expect("binary exists");
    cmd.env_remove("CFGSELECT_MAPPING_VALUE")
        .env_remove("CFGSELECT_MAPPING_TITLE")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn help_displays_usage() {
    Command::cargo_bin("cfgselect")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn renders_options_with_selection() {
    let (_dir, path) = fixture();
    cfgselect(&path)
        .args(["options", "fruits", "--selected", "plum"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<option value="apple">Apple</option><optgroup label="Stone">"#,
        ))
        .stdout(predicate::str::contains(
            r#"<option value="plum" selected="selected">Plum</option>"#,
        ));
}

#[test]
fn lists_filtered_keys() {
    let (_dir, path) = fixture();
    cfgselect(&path)
        .args(["keys", "fruits", "--where", "season=autumn"])
        .assert()
        .success()
        .stdout("apple\nplum\n");
}

#[test]
fn strict_key_fails_on_ambiguity() {
    let (_dir, path) = fixture();
    cfgselect(&path)
        .args(["keys", "fruits", "--where", "season=autumn", "--single"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be single"));
}

#[test]
fn reads_value_of_single_match() {
    let (_dir, path) = fixture();
    cfgselect(&path)
        .args(["value", "fruits", "--path", "title"])
        .args(["--where", "season=summer"])
        .assert()
        .success()
        .stdout("\"Cherry\"\n");
}

#[test]
fn unknown_key_reports_error() {
    let (_dir, path) = fixture();
    cfgselect(&path)
        .args(["keys", "vegetables"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be resolved"));
}
