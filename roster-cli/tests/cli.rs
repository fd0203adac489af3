//! Command-line surface tests

use assert_cmd::Command;
use predicates::prelude::*;

fn roster() -> Command {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    for var in ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASSWORD", "DB_NAME"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_commands() {
    roster()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("provision"));
}

#[test]
fn serve_requires_database_settings() {
    roster()
        .current_dir(std::env::temp_dir())
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--db-host"));
}

#[test]
fn provision_rejects_unsafe_database_name() {
    roster()
        .current_dir(std::env::temp_dir())
        .args([
            "provision",
            "--db-host",
            "127.0.0.1",
            "--db-port",
            "1",
            "--db-user",
            "nobody",
            "--db-password",
            "x",
            "--db-name",
            "users; DROP TABLE users",
            "--connect-attempts",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid database name"));
}
