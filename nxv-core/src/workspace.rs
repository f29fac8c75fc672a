//! Read-only project descriptor source.
//!
//! The host graph owns project descriptors; this module only reads a snapshot
//! of them from a YAML/JSON file:
//!
//! ```yaml
//! projects:
//!   - name: lib-a
//!     root: projects/lib-a
//!     projectType: library
//!     targets:
//!       build: { executor: "@nx/js:tsc" }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::ProjectDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub projects: Vec<ProjectDescriptor>,
}

impl Workspace {
    pub fn project(&self, name: &str) -> Option<&ProjectDescriptor> {
        self.projects.iter().find(|p| p.name.0 == name)
    }
}

/// Load a workspace snapshot. Rejects duplicate project names.
pub fn load_workspace_at(path: &Path) -> Result<Workspace, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let workspace: Workspace =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut seen = HashSet::new();
    for project in &workspace.projects {
        if !seen.insert(project.name.0.as_str()) {
            return Err(ConfigError::DuplicateProject {
                name: project.name.0.clone(),
            });
        }
    }
    Ok(workspace)
}
