//! Plugin options.
//!
//! [`PluginOptions`] mirrors the loosely-typed options block a user writes
//! (every field optional). [`PluginOptions::normalize`] validates it once and
//! yields [`NormalizedOptions`]; nothing downstream re-validates.
//!
//! ```yaml
//! environments:
//!   environmentsDir: tmp/environments
//!   targetNames: [e2e]
//!   filterByTags: [e2e]
//! packages:
//!   filterByTags: [publish]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Default root under which every environment gets its own directory.
pub const DEFAULT_ENVIRONMENTS_DIR: &str = "tmp/environments";

// ---------------------------------------------------------------------------
// Raw options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginOptions {
    #[serde(default)]
    pub environments: Option<EnvironmentsOptions>,
    #[serde(default)]
    pub packages: Option<PackagesOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvironmentsOptions {
    #[serde(default)]
    pub environments_dir: Option<PathBuf>,
    #[serde(default)]
    pub target_names: Option<Vec<String>>,
    #[serde(default)]
    pub filter_by_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackagesOptions {
    #[serde(default)]
    pub filter_by_tags: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Normalized options
// ---------------------------------------------------------------------------

/// Validated options for one synthesis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub environments: EnvironmentsConfig,
    pub packages: PackagesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentsConfig {
    pub environments_dir: PathBuf,
    /// Existing target names that mark a project as an environment project.
    pub target_names: Vec<String>,
    /// `None` when no tag filter applies. An empty list normalizes to `None`.
    pub filter_by_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagesConfig {
    pub filter_by_tags: Option<Vec<String>>,
}

impl EnvironmentsConfig {
    /// `<environmentsDir>/<project>`: the isolated root of one environment.
    pub fn environment_root(&self, project: &str) -> PathBuf {
        self.environments_dir.join(project)
    }
}

impl PluginOptions {
    pub fn normalize(self) -> Result<NormalizedOptions, ConfigError> {
        let environments = self.environments.unwrap_or_default();
        let packages = self.packages.unwrap_or_default();

        let environments_dir = environments
            .environments_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENVIRONMENTS_DIR));
        if environments_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "environments.environmentsDir",
            });
        }

        let target_names = environments.target_names.unwrap_or_default();
        check_entries("environments.targetNames", &target_names)?;

        Ok(NormalizedOptions {
            environments: EnvironmentsConfig {
                environments_dir,
                target_names,
                filter_by_tags: normalize_filter(
                    "environments.filterByTags",
                    environments.filter_by_tags,
                )?,
            },
            packages: PackagesConfig {
                filter_by_tags: normalize_filter("packages.filterByTags", packages.filter_by_tags)?,
            },
        })
    }
}

/// Load raw plugin options from a YAML (or JSON) file.
///
/// A missing file yields default options; a malformed one is a [`ConfigError::Parse`].
pub fn load_options_at(path: &Path) -> Result<PluginOptions, ConfigError> {
    if !path.exists() {
        return Ok(PluginOptions::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(PluginOptions::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn normalize_filter(
    field: &'static str,
    tags: Option<Vec<String>>,
) -> Result<Option<Vec<String>>, ConfigError> {
    match tags {
        Some(tags) if !tags.is_empty() => {
            check_entries(field, &tags)?;
            Ok(Some(tags))
        }
        _ => Ok(None),
    }
}

fn check_entries(field: &'static str, entries: &[String]) -> Result<(), ConfigError> {
    if let Some(pos) = entries.iter().position(|e| e.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("entry {pos} is blank"),
        });
    }
    Ok(())
}
