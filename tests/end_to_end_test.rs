//! End-to-end tests for the psqlw binary
//!
//! `sh` stands in for psql (via PGW_CLIENT) and ordinary system tools stand
//! in for the password provider: `echo` prints its argument, so the password
//! for a user is the username itself, and `false` always fails.

#![cfg(unix)]

use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::{Command, Output};

/// psqlw with a clean environment and `sh` as the client
fn psqlw_command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_psqlw"));
    command
        .env_remove("PGUSER")
        .env_remove("PGPASSWORD")
        .env_remove("PGW_PASSWORD_PROVIDER")
        .env_remove("PGW_DEBUG")
        .env("PGW_CLIENT", "sh");
    command
}

fn psqlw(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = psqlw_command();
    command.args(args);
    for (name, value) in envs {
        command.env(name, value);
    }
    command.output().expect("failed to run psqlw")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Script for `sh -c` that records PGPASSWORD into `file`
fn record_password_script(file: &Path) -> String {
    format!(
        "printf %s \"${{PGPASSWORD-unset}}\" > '{}'",
        file.display()
    )
}

#[test]
fn test_password_injected_into_client() {
    let dir = tempfile::tempdir().unwrap();
    let recorded = dir.path().join("password");
    let script = record_password_script(&recorded);

    // sh -c <script> -U alice: psql reads -c's value and -U alice
    let output = psqlw(
        &["-c", &script, "-U", "alice"],
        &[("PGW_PASSWORD_PROVIDER", "echo")],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&recorded).unwrap(), "alice");
}

#[test]
fn test_pguser_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let recorded = dir.path().join("password");
    let script = record_password_script(&recorded);

    let output = psqlw(
        &["-c", &script],
        &[("PGW_PASSWORD_PROVIDER", "echo"), ("PGUSER", "frank")],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&recorded).unwrap(), "frank");
}

#[test]
fn test_no_username_runs_without_password() {
    let dir = tempfile::tempdir().unwrap();
    let recorded = dir.path().join("password");
    let script = record_password_script(&recorded);

    let output = psqlw(&["-c", &script], &[("PGW_PASSWORD_PROVIDER", "false")]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&recorded).unwrap(), "unset");
    assert!(stderr(&output).contains("psqlw: Cannot detect username to login"));
}

#[test]
fn test_missing_provider_exits_one_without_running_client() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let script = format!("touch '{}'", marker.display());

    let output = psqlw(&["-c", &script, "-U", "alice"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!marker.exists());
    assert_eq!(
        stderr(&output).trim_end(),
        "psqlw: environment variable PGW_PASSWORD_PROVIDER is undefined"
    );
}

#[test]
fn test_failing_provider_exits_one_without_running_client() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let script = format!("touch '{}'", marker.display());

    let output = psqlw(
        &["-c", &script, "-U", "alice"],
        &[("PGW_PASSWORD_PROVIDER", "false")],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(!marker.exists());
    assert!(stderr(&output).contains("password provider \"false\" exited with an error"));
}

#[test]
fn test_client_exit_codes_propagate() {
    for code in [0, 1, 2, 77] {
        let script = format!("exit {}", code);
        let output = psqlw(&["-c", &script], &[]);
        assert_eq!(output.status.code(), Some(code), "stderr: {}", stderr(&output));
    }
}

#[test]
fn test_client_stdout_passes_through() {
    let output = psqlw(&["-c", "echo from-client"], &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "from-client\n");
}

#[test]
fn test_client_not_found() {
    let output = psqlw(&["-l"], &[("PGW_CLIENT", "pgw-no-such-client-binary")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("psqlw: failed to run pgw-no-such-client-binary"));
}

#[test]
fn test_client_killed_by_signal() {
    let output = psqlw(&["-c", "kill -9 $$"], &[]);
    assert_eq!(output.status.code(), Some(137));
    assert!(stderr(&output).contains("psqlw: sh was terminated by signal 9"));
}

#[test]
fn test_non_utf8_argument_reaches_client_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let recorded = dir.path().join("argument");
    let script = format!(
        "printf %s \"$0\" > '{}'; printf %s \"$PGPASSWORD\" > '{}.pw'",
        recorded.display(),
        recorded.display()
    );
    let latin1 = OsStr::from_bytes(b"caf\xe9");

    // sh -c <script> <latin1> -U alice: the Latin-1 token lands in $0
    let output = psqlw_command()
        .arg("-c")
        .arg(&script)
        .arg(latin1)
        .args(["-U", "alice"])
        .env("PGW_PASSWORD_PROVIDER", "echo")
        .output()
        .expect("failed to run psqlw");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read(&recorded).unwrap(), b"caf\xe9");
    assert_eq!(
        fs::read_to_string(dir.path().join("argument.pw")).unwrap(),
        "alice"
    );
}
