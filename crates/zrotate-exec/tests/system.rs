//! Runs ubiquitous binaries in place of zfs / zpool

#![cfg(unix)]

use std::path::Path;
use std::time::Duration;
use zrotate_domain::{args, ZfsExecutor};
use zrotate_exec::{ExecError, SystemExecutor};

fn echo_executor() -> SystemExecutor {
    SystemExecutor::new("echo", "echo", Duration::from_secs(10)).unwrap()
}

#[test]
fn passes_zfs_arguments() {
    let executor = echo_executor();

    let listing = executor.list_snapshots().unwrap();
    assert!(listing.success());
    assert_eq!(listing.lines, vec!["list -t snapshot"]);

    let create = executor.create_snapshot("tank/home@daily-2024-01-08", true).unwrap();
    assert_eq!(create.lines, vec!["snapshot -r tank/home@daily-2024-01-08"]);

    let destroy = executor.destroy_snapshot("tank/home@daily-2024-01-01", false).unwrap();
    assert_eq!(destroy.lines, vec!["destroy tank/home@daily-2024-01-01"]);
}

#[test]
fn passes_zpool_arguments() {
    let executor = echo_executor();

    assert_eq!(executor.scrub_start("tank").unwrap().lines, vec!["scrub tank"]);
    assert_eq!(executor.scrub_status("tank").unwrap().lines, vec!["status tank"]);
}

#[test]
fn runs_exactly_the_rendered_command_line() {
    let executor = echo_executor();
    let echo = Path::new("echo");

    let cases = [
        (executor.create_snapshot("tank/home@a", true).unwrap(), args::create_snapshot("tank/home@a", true)),
        (executor.destroy_snapshot("tank/home@a", false).unwrap(), args::destroy_snapshot("tank/home@a", false)),
        (executor.scrub_start("tank").unwrap(), args::scrub_start("tank")),
    ];

    for (output, argv) in cases {
        assert_eq!(format!("echo {}", output.lines[0]), args::command_line(echo, &argv));
    }
}

#[test]
fn non_zero_exit_is_not_an_error() {
    let executor = SystemExecutor::new("false", "false", Duration::from_secs(10)).unwrap();

    let output = executor.create_snapshot("tank/home@x", false).unwrap();
    assert!(!output.success());
    assert_eq!(output.status, 1);
}

#[test]
fn stderr_follows_stdout() {
    let executor = echo_executor();
    let output = executor
        .run(Path::new("sh"), &["-c", "echo out; echo err >&2; exit 3"])
        .unwrap();

    assert_eq!(output.status, 3);
    assert_eq!(output.lines, vec!["out", "err"]);
    assert_eq!(output.last_line(), Some("err"));
}

#[test]
fn signal_exit_maps_to_minus_one() {
    let executor = echo_executor();
    let output = executor.run(Path::new("sh"), &["-c", "kill -9 $$"]).unwrap();
    assert_eq!(output.status, -1);
}

#[test]
fn slow_command_times_out() {
    let executor = SystemExecutor::new("sleep", "sleep", Duration::from_millis(200)).unwrap();

    let err = executor.run(Path::new("sleep"), &["5"]).unwrap_err();
    match err {
        ExecError::Timeout { command, timeout } => {
            assert_eq!(command, "sleep 5");
            assert_eq!(timeout, Duration::from_millis(200));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn missing_binary_fails_to_spawn() {
    let executor = SystemExecutor::new(
        "/nonexistent/zfs",
        "/nonexistent/zpool",
        Duration::from_secs(1),
    )
    .unwrap();

    assert!(matches!(executor.list_snapshots(), Err(ExecError::Spawn { .. })));
    assert_eq!(executor.zfs_binary(), Path::new("/nonexistent/zfs"));
}
