//! `nxv graph`: run target synthesis over a workspace snapshot.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use nxv_core::{load_options_at, load_workspace_at};
use nxv_plugin::{apply, create_nodes};

use super::print_json;

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// YAML/JSON file listing the workspace's project descriptors.
    #[arg(long)]
    pub workspace: PathBuf,

    /// Plugin options file. Missing means defaults.
    #[arg(long, default_value = "nxv.yaml")]
    pub config: PathBuf,

    /// Print whole projects with synthesized targets merged in, instead of
    /// only the synthesized targets.
    #[arg(long)]
    pub merged: bool,
}

impl GraphArgs {
    pub fn run(self) -> Result<()> {
        let workspace = load_workspace_at(&self.workspace)
            .with_context(|| format!("failed to load workspace {}", self.workspace.display()))?;
        let options = load_options_at(&self.config)
            .with_context(|| format!("failed to load options {}", self.config.display()))?;

        let mut synthesized = create_nodes(&workspace.projects, options)
            .context("target synthesis failed")?;
        tracing::debug!(projects = synthesized.len(), "targets synthesized");

        if !self.merged {
            return print_json(&synthesized);
        }

        let merged: BTreeMap<_, _> = workspace
            .projects
            .iter()
            .map(|project| {
                let targets = synthesized.remove(&project.name).unwrap_or_default();
                (project.name.clone(), apply(project, targets))
            })
            .collect();
        print_json(&merged)
    }
}
