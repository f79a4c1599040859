//! End-to-end tests for the padlock binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn padlock() -> Command {
    Command::cargo_bin("padlock").unwrap()
}

// Floor-level Argon2 costs keep these tests fast
const FAST_COSTS: [&str; 6] = [
    "--memory-cost",
    "8192",
    "--time-cost",
    "1",
    "--parallelism",
    "1",
];

#[test]
fn encrypt_then_decrypt_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, b"meet at dawn").unwrap();

    padlock()
        .arg("encrypt")
        .arg(&input)
        .args(FAST_COSTS)
        .env("PADLOCK_PASSPHRASE", "correct-horse")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt.plk"));

    std::fs::remove_file(&input).unwrap();

    padlock()
        .arg("decrypt")
        .arg(dir.path().join("notes.txt.plk"))
        .env("PADLOCK_PASSPHRASE", "correct-horse")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt"));

    assert_eq!(std::fs::read(&input).unwrap(), b"meet at dawn");
}

#[test]
fn wrong_passphrase_is_one_generic_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("secret.txt");
    std::fs::write(&input, b"payload").unwrap();

    padlock()
        .arg("encrypt")
        .arg(&input)
        .args(FAST_COSTS)
        .env("PADLOCK_PASSPHRASE", "correct-horse")
        .assert()
        .success();

    std::fs::remove_file(&input).unwrap();

    padlock()
        .arg("decrypt")
        .arg(dir.path().join("secret.txt.plk"))
        .env("PADLOCK_PASSPHRASE", "wrong-horse")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "wrong passphrase or corrupted file",
        ));

    assert!(!input.exists());
}

#[test]
fn encrypt_refuses_existing_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("a.txt");
    std::fs::write(&input, b"one").unwrap();
    std::fs::write(dir.path().join("a.txt.plk"), b"existing").unwrap();

    padlock()
        .arg("encrypt")
        .arg(&input)
        .args(FAST_COSTS)
        .env("PADLOCK_PASSPHRASE", "correct-horse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read(dir.path().join("a.txt.plk")).unwrap(),
        b"existing"
    );
}

#[test]
fn missing_input_is_an_input_error() {
    let dir = TempDir::new().unwrap();

    padlock()
        .arg("encrypt")
        .arg(dir.path().join("absent.txt"))
        .args(FAST_COSTS)
        .env("PADLOCK_PASSPHRASE", "correct-horse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input error"));
}

#[test]
fn cost_floor_is_enforced() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("a.txt");
    std::fs::write(&input, b"one").unwrap();

    padlock()
        .arg("encrypt")
        .arg(&input)
        .args(["--memory-cost", "16"])
        .env("PADLOCK_PASSPHRASE", "correct-horse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key derivation parameters"));
}

#[test]
fn gitignore_creates_then_reports_complete() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(".gitignore");

    padlock()
        .arg("gitignore")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let content = std::fs::read_to_string(&target).unwrap();
    assert!(content.contains("# Python"));
    assert!(content.contains("node_modules/"));

    padlock()
        .arg("gitignore")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("every reference entry"));
}

#[test]
fn gitignore_reports_missing_entries_with_section() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(".gitignore");
    std::fs::write(&target, "*.log\n").unwrap();

    padlock()
        .arg("gitignore")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("is missing"))
        .stdout(predicate::str::contains("__pycache__/"))
        .stdout(predicate::str::contains("section 'Python'"));
}
