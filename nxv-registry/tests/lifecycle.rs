//! Start/stop round-trips against a stand-in registry: a `sh` script that
//! prints a readiness line and then sleeps.
//!
//! Liveness checks after termination rely on `/proc` zombie detection because
//! the stand-in is a child of the test process.
#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use std::time::Duration;

use nxv_registry::process::is_alive;
use nxv_registry::{
    load_state, save_state, start_registry, stop_registry, EnvironmentState, RegistryError,
    RegistryServerOptions, StopOutcome,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const GRACE: Duration = Duration::from_secs(5);

fn stand_in(root: &Path, requested_port: u16, script: &str) -> RegistryServerOptions {
    let mut options = RegistryServerOptions::new("lib-a-e2e", root.join("lib-a-e2e"), requested_port);
    options.ready_timeout = Duration::from_secs(10);
    options.command = Some(vec!["sh".into(), "-c".into(), script.into()]);
    options
}

/// Prefix that starts a background "server" in the stand-in's process group
/// and records its PID in `pid_file`.
fn with_server(pid_file: &Path) -> String {
    format!("sleep 300 & echo $! > '{}'; ", pid_file.display())
}

fn read_pid(path: &Path) -> u32 {
    fs::read_to_string(path)
        .expect("read pid file")
        .trim()
        .parse()
        .expect("pid")
}

fn wait_until_dead(pid: u32) {
    for _ in 0..100 {
        if !is_alive(pid) {
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    panic!("pid {pid} still alive");
}

fn announcing(port: u16) -> String {
    format!("echo 'warn --- http address - http://localhost:{port}/ - verdaccio/5.31.1'; exec sleep 30")
}

// ---------------------------------------------------------------------------
// 1. Start
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_records_bound_port_from_output_not_requested_port() {
    let tmp = TempDir::new().expect("tempdir");
    let options = stand_in(tmp.path(), 4873, &announcing(4999));

    let state = start_registry(&options).await.expect("start");

    assert_eq!(state.host, "localhost");
    assert_eq!(state.port, 4999);
    assert!(is_alive(state.process_id));
    assert_eq!(load_state(&options.state_file()).expect("load"), Some(state.clone()));

    stop_registry(&options.state_file(), GRACE).expect("stop");
}

#[tokio::test]
async fn start_clears_previous_storage() {
    let tmp = TempDir::new().expect("tempdir");
    let options = stand_in(tmp.path(), 4873, &announcing(4873));
    fs::create_dir_all(&options.storage_dir).expect("mkdir storage");
    fs::write(options.storage_dir.join("leftover.tgz"), b"stale").expect("write leftover");

    start_registry(&options).await.expect("start");

    assert!(options.storage_dir.is_dir());
    assert!(!options.storage_dir.join("leftover.tgz").exists());
    stop_registry(&options.state_file(), GRACE).expect("stop");
}

#[tokio::test]
async fn early_exit_is_startup_error_with_output() {
    let tmp = TempDir::new().expect("tempdir");
    let options = stand_in(
        tmp.path(),
        4873,
        "echo 'listen EADDRINUSE: address already in use :::4873' >&2; exit 1",
    );

    let err = start_registry(&options).await.unwrap_err();
    assert!(matches!(err, RegistryError::Startup { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("exited before becoming ready"), "got: {msg}");
    assert!(msg.contains("EADDRINUSE"), "log tail must be included: {msg}");
    assert!(!options.state_file().exists());
}

#[tokio::test]
async fn early_exit_leaves_no_group_members_behind() {
    let tmp = TempDir::new().expect("tempdir");
    let server_pid_file = tmp.path().join("server.pid");
    let script = format!("{}exit 1", with_server(&server_pid_file));
    let options = stand_in(tmp.path(), 4873, &script);

    let err = start_registry(&options).await.unwrap_err();
    assert!(matches!(err, RegistryError::Startup { .. }), "got: {err}");
    assert!(!is_alive(read_pid(&server_pid_file)));
}

#[tokio::test]
async fn missing_readiness_times_out() {
    let tmp = TempDir::new().expect("tempdir");
    let mut options = stand_in(tmp.path(), 4873, "echo booting; exec sleep 30");
    options.ready_timeout = Duration::from_millis(400);

    let err = start_registry(&options).await.unwrap_err();
    assert!(matches!(err, RegistryError::Startup { .. }), "got: {err}");
    assert!(err.to_string().contains("no readiness line"), "got: {err}");
    assert!(!options.state_file().exists());
}

#[tokio::test]
async fn second_start_is_refused_while_first_is_alive() {
    let tmp = TempDir::new().expect("tempdir");
    let options = stand_in(tmp.path(), 4873, &announcing(4873));
    let first = start_registry(&options).await.expect("first start");

    let err = start_registry(&options).await.unwrap_err();
    assert!(err.to_string().contains("already running"), "got: {err}");
    assert_eq!(load_state(&options.state_file()).expect("load"), Some(first));

    stop_registry(&options.state_file(), GRACE).expect("stop");
}

#[tokio::test]
async fn stale_state_is_replaced_on_start() {
    let tmp = TempDir::new().expect("tempdir");
    let options = stand_in(tmp.path(), 4873, &announcing(4875));
    let mut finished = std::process::Command::new("true").spawn().expect("spawn");
    let dead_pid = finished.id();
    finished.wait().expect("reap");
    save_state(
        &options.state_file(),
        &EnvironmentState {
            host: "localhost".into(),
            port: 1234,
            process_id: dead_pid,
        },
    )
    .expect("seed stale state");

    let state = start_registry(&options).await.expect("start");
    assert_ne!(state.process_id, dead_pid);
    assert_eq!(state.port, 4875);

    stop_registry(&options.state_file(), GRACE).expect("stop");
}

// ---------------------------------------------------------------------------
// 2. Stop
// ---------------------------------------------------------------------------

#[test]
fn stop_before_start_is_a_no_op() {
    let tmp = TempDir::new().expect("tempdir");
    let state_file = tmp.path().join("verdaccio-registry.json");
    assert_eq!(
        stop_registry(&state_file, GRACE).expect("stop"),
        StopOutcome::NotRunning
    );
    assert!(!state_file.exists());
}

#[test]
fn unparsable_state_is_treated_as_stopped_and_removed() {
    let tmp = TempDir::new().expect("tempdir");
    let state_file = tmp.path().join("verdaccio-registry.json");
    fs::write(&state_file, "not json").expect("write");

    assert_eq!(
        stop_registry(&state_file, GRACE).expect("stop"),
        StopOutcome::NotRunning
    );
    assert!(!state_file.exists());
}

#[tokio::test]
async fn start_stop_round_trip_then_double_stop() {
    let tmp = TempDir::new().expect("tempdir");
    let options = stand_in(tmp.path(), 4873, &announcing(4873));
    let state = start_registry(&options).await.expect("start");

    let outcome = stop_registry(&options.state_file(), GRACE).expect("stop");
    assert_eq!(outcome, StopOutcome::Stopped { pid: state.process_id });
    assert!(!options.state_file().exists());
    assert!(!is_alive(state.process_id));

    assert_eq!(
        stop_registry(&options.state_file(), GRACE).expect("second stop"),
        StopOutcome::NotRunning
    );
}

#[tokio::test]
async fn registry_that_ignores_sigterm_is_killed() {
    let tmp = TempDir::new().expect("tempdir");
    let script = format!("trap '' TERM; {}", announcing(4873));
    let options = stand_in(tmp.path(), 4873, &script);
    let state = start_registry(&options).await.expect("start");

    let outcome =
        stop_registry(&options.state_file(), Duration::from_millis(300)).expect("stop");
    assert_eq!(outcome, StopOutcome::Stopped { pid: state.process_id });
    assert!(!is_alive(state.process_id));
}

#[tokio::test]
async fn stop_reaches_group_members_after_leader_died() {
    let tmp = TempDir::new().expect("tempdir");
    let server_pid_file = tmp.path().join("server.pid");
    let script = format!("{}{}", with_server(&server_pid_file), announcing(4873));
    let options = stand_in(tmp.path(), 4873, &script);
    let state = start_registry(&options).await.expect("start");
    let server_pid = read_pid(&server_pid_file);

    let killed = std::process::Command::new("kill")
        .args(["-KILL", &state.process_id.to_string()])
        .status()
        .expect("kill leader");
    assert!(killed.success());
    wait_until_dead(state.process_id);
    assert!(is_alive(server_pid), "server must outlive its leader");

    let outcome = stop_registry(&options.state_file(), GRACE).expect("stop");
    assert_eq!(outcome, StopOutcome::Stopped { pid: state.process_id });
    assert!(!is_alive(server_pid));
    assert!(!options.state_file().exists());
}

#[test]
fn stop_refuses_to_signal_init() {
    let tmp = TempDir::new().expect("tempdir");
    let state_file = tmp.path().join("verdaccio-registry.json");
    save_state(
        &state_file,
        &EnvironmentState {
            host: "localhost".into(),
            port: 4873,
            process_id: 1,
        },
    )
    .expect("seed state");

    let err = stop_registry(&state_file, GRACE).unwrap_err();
    assert!(matches!(err, RegistryError::Teardown { pid: 1, .. }), "got: {err}");
    assert!(state_file.exists());
}

#[tokio::test]
async fn environments_do_not_share_state() {
    let tmp = TempDir::new().expect("tempdir");
    let mut a = stand_in(tmp.path(), 4873, &announcing(4901));
    a.environment_root = tmp.path().join("a-e2e");
    a.storage_dir = a.environment_root.join("storage");
    let mut b = stand_in(tmp.path(), 4873, &announcing(4902));
    b.environment_root = tmp.path().join("b-e2e");
    b.storage_dir = b.environment_root.join("storage");

    let state_a = start_registry(&a).await.expect("start a");
    let state_b = start_registry(&b).await.expect("start b");

    stop_registry(&a.state_file(), GRACE).expect("stop a");
    assert!(!a.state_file().exists());
    assert_eq!(load_state(&b.state_file()).expect("load b"), Some(state_b.clone()));
    assert!(is_alive(state_b.process_id));
    assert!(!is_alive(state_a.process_id));

    stop_registry(&b.state_file(), GRACE).expect("stop b");
}
