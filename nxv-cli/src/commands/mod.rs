pub mod env;
pub mod graph;
pub mod pkg;
pub mod registry;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use nxv_core::{load_options_at, NormalizedOptions};

/// Load and normalize plugin options; a missing file yields the defaults.
pub(crate) fn load_options(path: &Path) -> Result<NormalizedOptions> {
    load_options_at(path)
        .and_then(|raw| raw.normalize())
        .with_context(|| format!("invalid plugin options in {}", path.display()))
}

pub(crate) fn print_json(value: &impl Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to render JSON output")?
    );
    Ok(())
}
