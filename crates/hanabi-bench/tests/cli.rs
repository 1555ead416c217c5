use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const CONFIG: &str = r#"
run_id: "cli_check"
games:
  seed: 7
  count: 2
agents:
  - name: "hat"
    kind: "hat"
outputs:
  jsonl: "OUT/games.jsonl"
  summary_md: "OUT/summary.md"
  plots_dir: "OUT/plots"
"#;

#[test]
fn validate_only_skips_the_run() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("out");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, CONFIG.replace("OUT", &out.display().to_string())).expect("write config");

    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .arg("--rainbow")
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded configuration 'cli_check'"))
        .stdout(predicate::str::contains("rainbow"))
        .stdout(predicate::str::contains("Validation-only mode"));

    assert!(!out.join("games.jsonl").exists());
}

#[test]
fn invalid_override_is_reported() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bench.yaml");
    fs::write(&path, CONFIG.replace("OUT", "out")).expect("write config");

    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&path)
        .args(["--players", "7", "--validate-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("games.players"));
}

#[test]
fn missing_config_fails() {
    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .args(["--config", "does/not/exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}
