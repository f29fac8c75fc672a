//! `nxv env`: the env-bootstrap and env-setup executors.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use nxv_env::setup::default_host_command;
use nxv_env::{bootstrap_environment, setup_environment, BootstrapOptions, SetupOptions};
use nxv_registry::DEFAULT_STOP_GRACE;

use super::print_json;
use super::registry::{describe_stop, RegistryArgs};
use crate::block_on;

#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Create the environment root, start its registry and configure npm.
    Bootstrap(BootstrapArgs),
    /// Bootstrap, install dependencies through the host CLI, then stop the
    /// registry.
    Setup(SetupArgs),
}

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Leave the registry running after bootstrap.
    #[arg(long)]
    pub keep_server_running: bool,

    #[arg(long, default_value_t = DEFAULT_STOP_GRACE.as_millis() as u64)]
    pub grace_ms: u64,
}

impl BootstrapArgs {
    fn options(&self) -> Result<BootstrapOptions> {
        let mut options = BootstrapOptions::new(self.registry.server_options()?);
        options.keep_server_running = self.keep_server_running;
        options.stop_grace = Duration::from_millis(self.grace_ms);
        Ok(options)
    }
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    /// Host CLI used to run `<project>:nxv-env-install`, split on whitespace.
    #[arg(long)]
    pub host_command: Option<String>,
}

pub fn run(command: EnvCommand) -> Result<()> {
    match command {
        EnvCommand::Bootstrap(args) => {
            let options = args.options()?;
            let result = block_on(bootstrap_environment(&options))?.with_context(|| {
                format!(
                    "failed to bootstrap environment {}",
                    options.registry.environment_root.display()
                )
            })?;
            print_json(&json!({
                "environmentRoot": options.registry.environment_root,
                "registry": result.state,
                "npmrc": result.npmrc,
                "stopped": result.stopped.as_ref().map(describe_stop),
            }))?;
        }
        EnvCommand::Setup(args) => {
            if args.bootstrap.keep_server_running {
                tracing::warn!("--keep-server-running is ignored by setup");
            }
            let mut options = SetupOptions::new(args.bootstrap.options()?);
            options.host_command = match &args.host_command {
                Some(command) => command.split_whitespace().map(str::to_string).collect(),
                None => default_host_command(),
            };
            let report = block_on(setup_environment(&options))?.with_context(|| {
                format!(
                    "environment setup failed for '{}'",
                    options.bootstrap.registry.project_name
                )
            })?;
            print_json(&json!({
                "environmentRoot": options.bootstrap.registry.environment_root,
                "registry": report.state,
                "stopped": describe_stop(&report.stop),
            }))?;
        }
    }
    Ok(())
}
