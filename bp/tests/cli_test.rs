//! Command-line tests for the `bp` binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `bp` with logs and config lookups confined to a temp dir
fn bp(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bp").unwrap();
    cmd.current_dir(home.path())
        .env("XDG_DATA_HOME", home.path().join("share"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("HOME", home.path());
    cmd
}

fn data_dir(home: &TempDir) -> std::path::PathBuf {
    let dir = home.path().join("races");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("2024_天皇賞(秋).csv"),
        "number,name,winOdds,popularityRank\n1,A,2.0,1\n2,B,5.5,2\n",
    )
    .unwrap();
    fs::write(dir.join("2023_有馬記念.csv"), "number,name,winOdds,popularityRank\n1,C,3,1\n").unwrap();
    dir
}

#[test]
fn test_races_lists_labels_in_order() {
    let home = TempDir::new().unwrap();
    let dir = data_dir(&home);

    bp(&home)
        .arg("races")
        .arg("--data-dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. 2023: 有馬記念"))
        .stdout(predicate::str::contains("2. 2024: 天皇賞(秋)"));
}

#[test]
fn test_races_fails_on_empty_dir() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("empty");

    bp(&home)
        .args(["races", "--data-dir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No race CSV files found"));
    assert!(dir.is_dir());
}

#[test]
fn test_show_prints_entrants() {
    let home = TempDir::new().unwrap();
    let dir = data_dir(&home);

    bp(&home)
        .args(["show", "2024_天皇賞(秋)", "--data-dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024: 天皇賞(秋) (2 entrants)"))
        .stdout(predicate::str::contains("5.5倍"));
}

#[test]
fn test_show_unknown_race() {
    let home = TempDir::new().unwrap();
    let dir = data_dir(&home);

    bp(&home)
        .args(["show", "9", "--data-dir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Race not found: 9"));
}

#[test]
fn test_plan_rejects_unknown_strategy() {
    let home = TempDir::new().unwrap();
    let dir = data_dir(&home);

    bp(&home)
        .args(["plan", "--strategy", "yolo", "--data-dir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown strategy: yolo"));
}
