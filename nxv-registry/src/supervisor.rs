use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use nxv_core::paths;

use crate::error::{io_err, RegistryError};
use crate::process::{self, KillFn, Termination};
use crate::readiness::{find_ready_address, RegistryAddress};
use crate::state::{clear_state, load_state, save_state, EnvironmentState};

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const LOG_TAIL_LINES: usize = 20;

/// Everything needed to launch one environment's registry.
#[derive(Debug, Clone)]
pub struct RegistryServerOptions {
    pub project_name: String,
    pub environment_root: PathBuf,
    pub config_path: PathBuf,
    /// Requested port. The server may bind a different one; the state file
    /// records what it reports.
    pub port: u16,
    pub storage_dir: PathBuf,
    /// Wipe `storage_dir` before starting.
    pub clear: bool,
    pub ready_timeout: Duration,
    /// Replaces the default `npx verdaccio` command line. Arguments may use
    /// `{port}`, `{config}`, `{storage}`, `{environmentRoot}` and `{projectName}`.
    pub command: Option<Vec<String>>,
}

impl RegistryServerOptions {
    pub fn new(
        project_name: impl Into<String>,
        environment_root: impl Into<PathBuf>,
        port: u16,
    ) -> Self {
        let environment_root = environment_root.into();
        Self {
            project_name: project_name.into(),
            storage_dir: paths::storage_dir(&environment_root),
            environment_root,
            config_path: PathBuf::from(paths::REGISTRY_CONFIG),
            port,
            clear: true,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            command: None,
        }
    }

    pub fn state_file(&self) -> PathBuf {
        paths::state_file_path(&self.environment_root)
    }

    pub fn log_file(&self) -> PathBuf {
        paths::registry_log_path(&self.environment_root)
    }

    fn command_line(&self) -> Vec<String> {
        match &self.command {
            Some(template) => template.iter().map(|arg| self.expand(arg)).collect(),
            None => vec![
                "npx".to_string(),
                "verdaccio".to_string(),
                "--config".to_string(),
                self.config_path.display().to_string(),
                "--listen".to_string(),
                self.port.to_string(),
            ],
        }
    }

    fn expand(&self, arg: &str) -> String {
        arg.replace("{port}", &self.port.to_string())
            .replace("{config}", &self.config_path.display().to_string())
            .replace("{storage}", &self.storage_dir.display().to_string())
            .replace(
                "{environmentRoot}",
                &self.environment_root.display().to_string(),
            )
            .replace("{projectName}", &self.project_name)
    }
}

/// What [`stop_registry`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No (parsable) state file.
    NotRunning,
    /// State was recorded but the process had already exited.
    AlreadyExited { pid: u32 },
    Stopped { pid: u32 },
}

/// Spawn the registry detached, wait for its readiness line, and persist the
/// bound address to the environment's state file.
///
/// Output goes to the environment's log file rather than a pipe so the server
/// outlives this invocation.
pub async fn start_registry(
    options: &RegistryServerOptions,
) -> Result<EnvironmentState, RegistryError> {
    let state_path = options.state_file();
    if let Some(existing) = load_state(&state_path)? {
        if process::is_alive(existing.process_id) {
            return Err(startup(
                options,
                format!(
                    "a registry is already running for this environment (pid {})",
                    existing.process_id
                ),
                vec![],
            ));
        }
        tracing::warn!(
            pid = existing.process_id,
            path = %state_path.display(),
            "discarding stale registry state"
        );
        clear_state(&state_path)?;
    }

    prepare_storage(options)?;

    let log_path = options.log_file();
    let log = std::fs::File::create(&log_path).map_err(|e| io_err(&log_path, e))?;
    let log_err = log.try_clone().map_err(|e| io_err(&log_path, e))?;

    let argv = options.command_line();
    let Some((program, args)) = argv.split_first() else {
        return Err(startup(options, "empty registry command".to_string(), vec![]));
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .env("VERDACCIO_STORAGE_PATH", &options.storage_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err));
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|e| {
        startup(
            options,
            format!("failed to spawn `{program}`: {e}"),
            vec![],
        )
    })?;
    let Some(pid) = child.id() else {
        return Err(startup(
            options,
            "registry process exited immediately".to_string(),
            read_log_tail(&log_path),
        ));
    };
    tracing::info!(
        pid,
        project = %options.project_name,
        requested_port = options.port,
        "registry process spawned"
    );

    let address =
        match tokio::time::timeout(options.ready_timeout, wait_for_ready(&mut child, &log_path))
            .await
        {
            Ok(Ok(address)) => address,
            Ok(Err(reason)) => {
                // The leader may be gone while the rest of its group runs on.
                abandon(child, pid).await;
                return Err(startup(options, reason, read_log_tail(&log_path)));
            }
            Err(_) => {
                abandon(child, pid).await;
                return Err(startup(
                    options,
                    format!(
                        "no readiness line within {}ms",
                        options.ready_timeout.as_millis()
                    ),
                    read_log_tail(&log_path),
                ));
            }
        };

    let state = EnvironmentState {
        host: address.host,
        port: address.port,
        process_id: pid,
    };
    if let Err(err) = save_state(&state_path, &state) {
        abandon(child, pid).await;
        return Err(err);
    }

    if state.port != options.port {
        tracing::warn!(
            requested = options.port,
            bound = state.port,
            "registry bound a different port than requested"
        );
    }
    tracing::info!(pid, url = %state.url(), path = %state_path.display(), "registry ready");
    Ok(state)
}

/// [`start_registry`] on a throwaway current-thread runtime.
pub fn start_registry_blocking(
    options: &RegistryServerOptions,
) -> Result<EnvironmentState, RegistryError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(start_registry(options))
}

/// Stop the registry recorded at `state_path`.
///
/// Missing or unparsable state, or a process group with nothing left running,
/// is success. A dead leader with live group members still gets its group
/// terminated. On [`RegistryError::Teardown`] the state file is kept so a
/// retry can still find the process.
pub fn stop_registry(state_path: &Path, grace: Duration) -> Result<StopOutcome, RegistryError> {
    stop_registry_with(state_path, grace, process::sys_kill)
}

pub(crate) fn stop_registry_with(
    state_path: &Path,
    grace: Duration,
    kill: KillFn,
) -> Result<StopOutcome, RegistryError> {
    let Some(state) = load_state(state_path)? else {
        clear_state(state_path)?;
        tracing::info!(path = %state_path.display(), "no registry state, nothing to stop");
        return Ok(StopOutcome::NotRunning);
    };
    let pid = state.process_id;

    let outcome = match process::terminate_with(pid, grace, kill) {
        Ok(Termination::AlreadyGone) => StopOutcome::AlreadyExited { pid },
        Ok(Termination::Terminated | Termination::Killed) => StopOutcome::Stopped { pid },
        Err(err) => {
            return Err(RegistryError::Teardown {
                pid,
                reason: err.to_string(),
            })
        }
    };

    clear_state(state_path)?;
    tracing::info!(pid, outcome = ?outcome, "registry stopped");
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

async fn wait_for_ready(child: &mut Child, log_path: &Path) -> Result<RegistryAddress, String> {
    loop {
        if let Some(address) = find_ready_address(&read_log(log_path)) {
            return Ok(address);
        }
        match child.try_wait() {
            Ok(Some(status)) => {
                return Err(format!("registry exited before becoming ready ({status})"));
            }
            Ok(None) => {}
            Err(err) => return Err(format!("failed to poll registry process: {err}")),
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

/// Best-effort cleanup of a registry that will not be recorded.
async fn abandon(mut child: Child, pid: u32) {
    let grace = Duration::from_millis(500);
    let _ = tokio::task::spawn_blocking(move || process::terminate(pid, grace)).await;
    let _ = child.start_kill();
    let _ = child.wait().await;
}

fn prepare_storage(options: &RegistryServerOptions) -> Result<(), RegistryError> {
    let root = &options.environment_root;
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

    let storage = &options.storage_dir;
    if options.clear && storage.exists() {
        std::fs::remove_dir_all(storage).map_err(|e| io_err(storage, e))?;
    }
    std::fs::create_dir_all(storage).map_err(|e| io_err(storage, e))?;
    Ok(())
}

fn read_log(path: &Path) -> String {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn read_log_tail(path: &Path) -> Vec<String> {
    let log = read_log(path);
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

fn startup(options: &RegistryServerOptions, reason: String, log_tail: Vec<String>) -> RegistryError {
    RegistryError::Startup {
        project: options.project_name.clone(),
        reason,
        log_tail,
    }
}
