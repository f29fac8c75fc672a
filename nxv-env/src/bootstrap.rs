//! Environment bootstrap: create the root, start its registry, and point the
//! root's package-manager config at it.

use std::path::PathBuf;
use std::time::Duration;

use nxv_registry::{
    start_registry, stop_registry, EnvironmentState, RegistryServerOptions, StopOutcome,
    DEFAULT_STOP_GRACE,
};

use crate::error::{io_err, EnvError};
use crate::npm::{configure_registry, ensure_package_json};

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub registry: RegistryServerOptions,
    /// Leave the registry running for later targets; otherwise stop it before
    /// returning.
    pub keep_server_running: bool,
    pub stop_grace: Duration,
}

impl BootstrapOptions {
    pub fn new(registry: RegistryServerOptions) -> Self {
        Self {
            registry,
            keep_server_running: false,
            stop_grace: DEFAULT_STOP_GRACE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapResult {
    pub state: EnvironmentState,
    pub npmrc: PathBuf,
    /// `Some` when the registry was stopped again before returning.
    pub stopped: Option<StopOutcome>,
}

/// Bootstrap one environment. If configuration fails after the registry
/// came up, the registry is stopped before the error is returned.
pub async fn bootstrap_environment(
    options: &BootstrapOptions,
) -> Result<BootstrapResult, EnvError> {
    let root = &options.registry.environment_root;
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

    let state = start_registry(&options.registry).await?;

    let configured = configure_registry(root, &state).and_then(|npmrc| {
        ensure_package_json(root, &options.registry.project_name)?;
        Ok(npmrc)
    });
    let npmrc = match configured {
        Ok(npmrc) => npmrc,
        Err(err) => {
            if let Err(stop_err) = stop(options).await {
                tracing::error!(
                    error = %stop_err,
                    "registry teardown after failed bootstrap also failed"
                );
            }
            return Err(err);
        }
    };
    tracing::info!(root = %root.display(), url = %state.url(), "environment bootstrapped");

    let stopped = if options.keep_server_running {
        None
    } else {
        Some(stop(options).await?)
    };

    Ok(BootstrapResult {
        state,
        npmrc,
        stopped,
    })
}

/// Stop this environment's registry off the async executor.
pub(crate) async fn stop(options: &BootstrapOptions) -> Result<StopOutcome, EnvError> {
    let state_file = options.registry.state_file();
    let grace = options.stop_grace;
    let outcome = tokio::task::spawn_blocking(move || stop_registry(&state_file, grace))
        .await
        .map_err(|e| io_err("registry-stop-task", std::io::Error::other(e)))??;
    Ok(outcome)
}
