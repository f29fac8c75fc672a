//! `nxv pkg`: the pkg-publish and pkg-install executors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use nxv_env::{install_package, publish_package, PackageOptions};

use crate::block_on;

#[derive(Subcommand, Debug)]
pub enum PkgCommand {
    /// Publish the built package to the environment's registry.
    Publish(PkgArgs),
    /// Install the published package into the environment root.
    Install(PkgArgs),
}

#[derive(Args, Debug)]
pub struct PkgArgs {
    /// Build output directory containing the package's package.json.
    #[arg(long)]
    pub dist: PathBuf,

    #[arg(long)]
    pub environment_root: PathBuf,

    /// Version to install instead of the manifest's.
    #[arg(long)]
    pub pkg_version: Option<String>,

    /// Package-manager command, split on whitespace.
    #[arg(long, default_value = "npm")]
    pub npm: String,
}

impl PkgArgs {
    fn options(&self) -> PackageOptions {
        let mut options = PackageOptions::new(&self.dist, &self.environment_root);
        options.pkg_version = self.pkg_version.clone();
        options.npm = self.npm.split_whitespace().map(str::to_string).collect();
        options
    }
}

pub fn run(command: PkgCommand) -> Result<()> {
    match command {
        PkgCommand::Publish(args) => {
            let options = args.options();
            let manifest = block_on(publish_package(&options))?
                .with_context(|| format!("failed to publish {}", args.dist.display()))?;
            println!("published {}@{}", manifest.name, manifest.version);
        }
        PkgCommand::Install(args) => {
            let options = args.options();
            let manifest = block_on(install_package(&options))?.with_context(|| {
                format!("failed to install into {}", args.environment_root.display())
            })?;
            println!(
                "installed {}@{} into {}",
                manifest.name,
                options.pkg_version.as_deref().unwrap_or(&manifest.version),
                args.environment_root.display()
            );
        }
    }
    Ok(())
}
