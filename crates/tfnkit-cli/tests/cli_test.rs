use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_transforms_lists_builtins() {
    let dir = tempfile::tempdir().unwrap();

    // No tfnkit.yaml in the working directory: every builtin is registered
    cargo_bin_cmd!("tfnkit")
        .current_dir(dir.path())
        .arg("transforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("compressWhitespace"))
        .stdout(predicate::str::contains("length (whole list)"));
}

#[test]
fn test_apply_chain() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("tfnkit")
        .current_dir(dir.path())
        .args([
            "apply",
            "--value",
            "  SELECT \t *  FROM users ",
            "--chain",
            "lowercase,nosuchtransform,compressWhitespace,trim",
        ])
        .assert()
        .success()
        .stdout("select * from users\n");
}

#[test]
fn test_apply_with_config_restricting_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tfnkit.yaml");
    std::fs::write(&config, "builtins: [uppercase]\nchain:\n  on_step_error: fail\n").unwrap();

    cargo_bin_cmd!("tfnkit")
        .args(["--config", config.to_str().unwrap()])
        .args(["apply", "--value", "abc", "--chain", "uppercase"])
        .assert()
        .success()
        .stdout("ABC\n");

    cargo_bin_cmd!("tfnkit")
        .args(["--config", config.to_str().unwrap()])
        .args(["apply", "--value", "abc", "--chain", "uppercase,trim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trim"));
}

#[test]
fn test_eval_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = dir.path().join("fixture.yaml");
    std::fs::write(
        &fixture,
        r#"
fields:
  ARGS: "Hello  World"
  status: 200
queries:
  - field: ARGS
    chain: uppercase,compressWhitespace
  - field: ARGS
    chain: uppercase,compressWhitespace
  - field: ARGS
    chain: compressWhitespace,uppercase
  - field: status
    chain: trim
"#,
    )
    .unwrap();

    let output = cargo_bin_cmd!("tfnkit")
        .current_dir(dir.path())
        .args(["eval", fixture.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 4);

    assert_eq!(lines[0]["value"], "HELLO WORLD");
    assert_eq!(lines[0]["key"], "ARGS.t(uppercase,compressWhitespace)");
    assert_eq!(lines[0]["cache_hit"], false);

    assert_eq!(lines[1]["cache_hit"], true);

    assert_eq!(lines[2]["key"], "ARGS.t(compressWhitespace,uppercase)");
    assert_eq!(lines[2]["cache_hit"], false);

    assert!(lines[3]["value"].is_null());
    assert!(
        lines[3]["error"]
            .as_str()
            .unwrap()
            .contains("type mismatch")
    );
}

#[test]
fn test_validate() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tfnkit.yaml");

    std::fs::write(&config, "builtins: [lowercase, trim]\n").unwrap();
    cargo_bin_cmd!("tfnkit")
        .args(["--config", config.to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 transforms registered"));

    std::fs::write(&config, "builtins: [rot13]\n").unwrap();
    cargo_bin_cmd!("tfnkit")
        .args(["--config", config.to_str().unwrap(), "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rot13"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");

    cargo_bin_cmd!("tfnkit")
        .args(["--config", missing.to_str().unwrap(), "transforms"])
        .assert()
        .failure();
}
