//! Bootstrap, setup and package executors against stand-in processes:
//! a `sh` registry that announces an address, and `sh` scripts recording the
//! arguments they were given in place of npm and the host CLI.
#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use std::time::Duration;

use nxv_env::{
    bootstrap_environment, install_package, publish_package, setup_environment,
    BootstrapOptions, EnvError, PackageOptions, SetupOptions,
};
use nxv_registry::process::is_alive;
use nxv_registry::{load_state, stop_registry, RegistryServerOptions, StopOutcome};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registry(root: &Path, bound_port: u16) -> RegistryServerOptions {
    let mut options = RegistryServerOptions::new("lib-a-e2e", root.join("lib-a-e2e"), 4873);
    options.ready_timeout = Duration::from_secs(10);
    options.command = Some(vec![
        "sh".into(),
        "-c".into(),
        format!("echo 'http address - http://localhost:{bound_port}/ - verdaccio/5'; exec sleep 30"),
    ]);
    options
}

/// `sh -c <script> <name>` so the appended arguments land in `$@`.
fn recording(script: String, name: &str) -> Vec<String> {
    vec!["sh".into(), "-c".into(), script, name.into()]
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// 1. Bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bootstrap_configures_root_and_stops_registry_by_default() {
    let tmp = TempDir::new().expect("tempdir");
    let options = BootstrapOptions::new(registry(tmp.path(), 4990));
    let root = options.registry.environment_root.clone();

    let result = bootstrap_environment(&options).await.expect("bootstrap");

    assert_eq!(result.state.port, 4990);
    assert_eq!(
        result.stopped,
        Some(StopOutcome::Stopped {
            pid: result.state.process_id
        })
    );
    assert!(read(&root.join(".npmrc")).contains("registry=http://localhost:4990/"));
    assert!(root.join("package.json").is_file());
    assert!(!options.registry.state_file().exists());
    assert!(!is_alive(result.state.process_id));
}

#[tokio::test]
async fn bootstrap_can_keep_registry_running() {
    let tmp = TempDir::new().expect("tempdir");
    let mut options = BootstrapOptions::new(registry(tmp.path(), 4991));
    options.keep_server_running = true;

    let result = bootstrap_environment(&options).await.expect("bootstrap");

    assert!(result.stopped.is_none());
    assert_eq!(
        load_state(&options.registry.state_file()).expect("load"),
        Some(result.state.clone())
    );
    assert!(is_alive(result.state.process_id));

    stop_registry(&options.registry.state_file(), Duration::from_secs(5)).expect("stop");
}

// ---------------------------------------------------------------------------
// 2. Setup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn setup_runs_env_install_then_tears_registry_down() {
    let tmp = TempDir::new().expect("tempdir");
    let record = tmp.path().join("host-args");
    let mut options = SetupOptions::new(BootstrapOptions::new(registry(tmp.path(), 4992)));
    options.host_command = recording(format!("echo \"$@\" > '{}'", record.display()), "nx");

    let report = setup_environment(&options).await.expect("setup");

    let root = options.bootstrap.registry.environment_root.clone();
    assert_eq!(
        read(&record).trim(),
        format!(
            "run lib-a-e2e:nxv-env-install --environmentRoot={}",
            root.display()
        )
    );
    assert_eq!(report.stop, StopOutcome::Stopped { pid: report.state.process_id });
    assert!(!options.bootstrap.registry.state_file().exists());
    assert!(!is_alive(report.state.process_id));
    assert!(root.join(".npmrc").is_file());
}

#[tokio::test]
async fn failed_install_still_tears_registry_down() {
    let tmp = TempDir::new().expect("tempdir");
    let mut options = SetupOptions::new(BootstrapOptions::new(registry(tmp.path(), 4993)));
    options.host_command = recording("echo 'install exploded' >&2; exit 7".into(), "nx");

    let err = setup_environment(&options).await.unwrap_err();

    assert!(matches!(err, EnvError::CommandFailed { .. }), "got: {err}");
    assert!(err.to_string().contains("install exploded"));
    assert!(!options.bootstrap.registry.state_file().exists());
}

#[tokio::test]
async fn registry_startup_failure_skips_install() {
    let tmp = TempDir::new().expect("tempdir");
    let record = tmp.path().join("host-args");
    let mut bootstrap = BootstrapOptions::new(registry(tmp.path(), 4994));
    bootstrap.registry.command = Some(vec!["sh".into(), "-c".into(), "exit 1".into()]);
    let mut options = SetupOptions::new(bootstrap);
    options.host_command = recording(format!("touch '{}'", record.display()), "nx");

    let err = setup_environment(&options).await.unwrap_err();

    assert!(err.to_string().contains("failed to start"), "got: {err}");
    assert!(!record.exists(), "install must not run without a registry");
}

// ---------------------------------------------------------------------------
// 3. Package executors
// ---------------------------------------------------------------------------

fn dist(tmp: &TempDir) -> std::path::PathBuf {
    let dist = tmp.path().join("dist").join("lib-a");
    fs::create_dir_all(&dist).expect("mkdir dist");
    fs::write(
        dist.join("package.json"),
        r#"{"name": "@org/lib-a", "version": "0.1.0", "main": "index.js"}"#,
    )
    .expect("write manifest");
    dist
}

#[tokio::test]
async fn install_package_runs_npm_in_environment_root() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path().join("env");
    fs::create_dir_all(&root).expect("mkdir env");
    let record = tmp.path().join("npm-args");

    let mut options = PackageOptions::new(dist(&tmp), &root);
    options.pkg_version = Some("0.1.0-e2e".into());
    options.npm = recording(format!("echo \"$(pwd -P) $@\" > '{}'", record.display()), "npm");

    let manifest = install_package(&options).await.expect("install");

    assert_eq!(manifest.name, "@org/lib-a");
    assert_eq!(
        read(&record).trim(),
        format!(
            "{} install @org/lib-a@0.1.0-e2e --no-fund --no-shrinkwrap --save --userconfig=.npmrc",
            root.canonicalize().expect("canonical root").display()
        )
    );
}

#[tokio::test]
async fn publish_package_uses_environment_npmrc_from_dist() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path().join("env");
    let dist = dist(&tmp);
    let record = tmp.path().join("npm-args");

    let mut options = PackageOptions::new(&dist, &root);
    options.npm = recording(format!("echo \"$(pwd -P) $@\" > '{}'", record.display()), "npm");

    publish_package(&options).await.expect("publish");

    assert_eq!(
        read(&record).trim(),
        format!(
            "{} publish --userconfig={}",
            dist.canonicalize().expect("canonical dist").display(),
            root.join(".npmrc").display()
        )
    );
}
