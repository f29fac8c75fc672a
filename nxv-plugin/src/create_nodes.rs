//! Whole-workspace synthesis.
//!
//! Options are normalized once up front; a [`ConfigError`] aborts the pass
//! before any project is touched, so a partial graph is never produced.

use std::collections::BTreeMap;

use nxv_core::{ConfigError, NormalizedOptions, PluginOptions, ProjectDescriptor, ProjectName, Targets};

use crate::eligibility::{is_env_project, is_pkg_project};
use crate::env_targets::{environment_targets, registry_targets};
use crate::package_targets::package_targets;
use crate::port::unique_port;
use crate::rewrite::update_env_target_names;

/// Synthesized targets per project, keyed by project name.
pub type ProjectTargets = BTreeMap<ProjectName, Targets>;

pub fn create_nodes(
    projects: &[ProjectDescriptor],
    options: PluginOptions,
) -> Result<ProjectTargets, ConfigError> {
    let options = options.normalize()?;
    Ok(projects
        .iter()
        .map(|project| (project.name.clone(), synthesize_project(project, &options)))
        .collect())
}

/// Targets to merge into `project`: new package/environment targets plus the
/// rewritten trigger targets. Projects that qualify for nothing get an empty map.
pub fn synthesize_project(project: &ProjectDescriptor, options: &NormalizedOptions) -> Targets {
    let mut targets = Targets::new();

    if is_pkg_project(project, &options.packages) {
        targets.extend(package_targets());
    }

    if is_env_project(project, &options.environments) {
        targets.extend(environment_targets(project, &options.environments));
        targets.extend(registry_targets(project, &options.environments, unique_port()));
        targets.extend(
            update_env_target_names(&project.targets, &options.environments.target_names)
                .into_iter()
                .filter(|(name, _)| options.environments.target_names.contains(name)),
        );
    }

    targets
}

/// Merge synthesized targets over a project's existing ones, the way the host
/// graph does when it applies a plugin's result.
pub fn apply(project: &ProjectDescriptor, synthesized: Targets) -> ProjectDescriptor {
    let mut merged = project.clone();
    merged.targets.extend(synthesized);
    merged
}
