//! Environment setup: bootstrap → dependency installs → registry teardown, as
//! one unit.
//!
//! Installs run through the host graph (`<host> run <project>:nxv-env-install`)
//! so every dependency's `nxv-pkg-install` executes in dependency order with
//! this environment's root forwarded. Once the registry is up it is stopped on
//! every path; the first error wins.

use nxv_plugin::constants::TARGET_ENVIRONMENT_INSTALL;
use nxv_registry::{EnvironmentState, StopOutcome};

use crate::bootstrap::{bootstrap_environment, stop, BootstrapOptions};
use crate::error::EnvError;
use crate::npm::Invocation;

/// Default host CLI used to run graph targets.
pub fn default_host_command() -> Vec<String> {
    vec!["npx".to_string(), "nx".to_string()]
}

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub bootstrap: BootstrapOptions,
    pub host_command: Vec<String>,
}

impl SetupOptions {
    pub fn new(bootstrap: BootstrapOptions) -> Self {
        Self {
            bootstrap,
            host_command: default_host_command(),
        }
    }

    /// `<host> run <project>:nxv-env-install --environmentRoot=<root>`,
    /// run from the workspace root.
    pub fn install_invocation(&self) -> Invocation {
        let registry = &self.bootstrap.registry;
        Invocation::new(
            &self.host_command,
            [
                "run".to_string(),
                format!("{}:{}", registry.project_name, TARGET_ENVIRONMENT_INSTALL),
                format!("--environmentRoot={}", registry.environment_root.display()),
            ],
            std::path::Path::new("."),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub state: EnvironmentState,
    pub stop: StopOutcome,
}

pub async fn setup_environment(options: &SetupOptions) -> Result<SetupReport, EnvError> {
    let mut bootstrap = options.bootstrap.clone();
    bootstrap.keep_server_running = true;
    let booted = bootstrap_environment(&bootstrap).await?;

    let installed = options.install_invocation().run().await;
    let stopped = stop(&bootstrap).await;

    match (installed, stopped) {
        (Ok(()), Ok(outcome)) => {
            tracing::info!(
                project = %bootstrap.registry.project_name,
                "environment setup complete"
            );
            Ok(SetupReport {
                state: booted.state,
                stop: outcome,
            })
        }
        (Ok(()), Err(stop_err)) => Err(stop_err),
        (Err(install_err), Ok(_)) => Err(install_err),
        (Err(install_err), Err(stop_err)) => {
            tracing::error!(
                error = %stop_err,
                "registry teardown after failed install also failed"
            );
            Err(install_err)
        }
    }
}
