//! Binary-level checks of the supervisor's fail-fast paths. These drive the
//! compiled binary directly and only exercise paths that abort before any
//! container or service is touched.

use std::process::Command;

fn run_supervisor(envs: &[(&str, &str)], dir: &std::path::Path) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_taskstack");
    let mut command = Command::new(exe);
    command.current_dir(dir);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("run taskstack binary")
}

#[test]
fn test_missing_venv_exits_1_before_any_launch() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_supervisor(&[("VENV_DIR", "does-not-exist")], dir.path());

    assert_eq!(
        output.status.code(),
        Some(1),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("virtual environment"));

    // The prerequisite check runs first: no seed directory was written.
    assert!(!dir.path().join("db").exists());
}

#[test]
fn test_unparsable_port_exits_1() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_supervisor(&[("API_PORT", "not-a-number")], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API_PORT"));
}

#[test]
fn test_colliding_ports_exit_1() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_supervisor(
        &[("API_PORT", "9000"), ("DASHBOARD_PORT", "9000")],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("distinct"));
}
