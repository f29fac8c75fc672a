//! `nxv registry`: the registry start and kill-process executors.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use nxv_core::paths;
use nxv_plugin::unique_port;
use nxv_registry::{
    start_registry_blocking, stop_registry, RegistryServerOptions, StopOutcome,
    DEFAULT_READY_TIMEOUT, DEFAULT_STOP_GRACE,
};

use super::{load_options, print_json};

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Start the registry detached and record its address in the state file.
    Start(RegistryArgs),
    /// Stop the registry recorded in a state file.
    Stop(StopArgs),
}

/// Registry server options shared by every command that starts one.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    #[arg(long)]
    pub project_name: String,

    /// Defaults to `<environmentsDir>/<project-name>` from the options file.
    #[arg(long)]
    pub environment_root: Option<PathBuf>,

    /// Plugin options file consulted for the default environment root.
    #[arg(long = "options", default_value = "nxv.yaml")]
    pub options_file: PathBuf,

    /// Requested port; a random one from the allocator when omitted.
    #[arg(long)]
    pub port: Option<u16>,

    /// Registry server config file.
    #[arg(long, default_value = paths::REGISTRY_CONFIG)]
    pub config: PathBuf,

    /// Defaults to `<environment-root>/storage`.
    #[arg(long)]
    pub storage: Option<PathBuf>,

    /// Keep existing storage contents instead of wiping them.
    #[arg(long)]
    pub keep_storage: bool,

    #[arg(long, default_value_t = DEFAULT_READY_TIMEOUT.as_millis() as u64)]
    pub ready_timeout_ms: u64,

    /// Replacement server command line, after `--`. Placeholders: `{port}`,
    /// `{config}`, `{storage}`, `{environmentRoot}`, `{projectName}`.
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl RegistryArgs {
    pub fn server_options(&self) -> Result<RegistryServerOptions> {
        let environment_root = match &self.environment_root {
            Some(root) => root.clone(),
            None => load_options(&self.options_file)?
                .environments
                .environment_root(&self.project_name),
        };
        let port = self.port.unwrap_or_else(unique_port);

        let mut options = RegistryServerOptions::new(&self.project_name, environment_root, port);
        options.config_path = self.config.clone();
        if let Some(storage) = &self.storage {
            options.storage_dir = storage.clone();
        }
        options.clear = !self.keep_storage;
        options.ready_timeout = Duration::from_millis(self.ready_timeout_ms);
        if !self.command.is_empty() {
            options.command = Some(self.command.clone());
        }
        Ok(options)
    }
}

#[derive(Args, Debug)]
pub struct StopArgs {
    /// State file written by `registry start`.
    #[arg(long)]
    pub file_path: PathBuf,

    /// How long to wait after SIGTERM before sending SIGKILL.
    #[arg(long, default_value_t = DEFAULT_STOP_GRACE.as_millis() as u64)]
    pub grace_ms: u64,
}

pub fn run(command: RegistryCommand) -> Result<()> {
    match command {
        RegistryCommand::Start(args) => {
            let options = args.server_options()?;
            let state = start_registry_blocking(&options).with_context(|| {
                format!("failed to start registry for '{}'", options.project_name)
            })?;
            print_json(&state)?;
        }
        RegistryCommand::Stop(args) => {
            let outcome = stop_registry(&args.file_path, Duration::from_millis(args.grace_ms))
                .with_context(|| {
                    format!("failed to stop registry from {}", args.file_path.display())
                })?;
            println!("{}", describe_stop(&outcome));
        }
    }
    Ok(())
}

pub(crate) fn describe_stop(outcome: &StopOutcome) -> String {
    match outcome {
        StopOutcome::NotRunning => "registry not running".to_string(),
        StopOutcome::AlreadyExited { pid } => format!("registry already exited (pid {pid})"),
        StopOutcome::Stopped { pid } => format!("registry stopped (pid {pid})"),
    }
}
